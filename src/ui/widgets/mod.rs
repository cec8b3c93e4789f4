pub mod points_bar;

pub use points_bar::PointsBar;
