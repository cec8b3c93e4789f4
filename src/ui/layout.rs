use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::domain::surface::{ScreenArea, SurfaceRequest};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub main: Rect,
    pub list: Rect,
    pub summary: Rect,
    pub status_line: Rect,
    pub hint_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(vertical[1]);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        main: vertical[1],
        list: main_chunks[0],
        summary: main_chunks[1],
        status_line: footer_chunks[0],
        hint_line: footer_chunks[1],
    }
}

/// Where a driver surface lands on the terminal
pub fn surface_rect(request: &SurfaceRequest, screen: Rect) -> Rect {
    let area = request.placement(ScreenArea {
        x: screen.x,
        y: screen.y,
        width: screen.width,
        height: screen.height,
    });
    Rect::new(area.x, area.y, area.width, area.height)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_cover_screen() {
        let size = Rect::new(0, 0, 100, 30);
        let areas = areas(size);
        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.status_line.height, 1);
        assert_eq!(areas.hint_line.y, 29);
        assert_eq!(areas.list.width + areas.summary.width, 100);
    }

    #[test]
    fn test_surface_rect_centred() {
        let request = SurfaceRequest {
            title: "Connect X".into(),
            url: String::new(),
            width: 40,
            height: 10,
        };
        let rect = surface_rect(&request, Rect::new(0, 0, 100, 30));
        assert_eq!(rect, Rect::new(30, 10, 40, 10));
    }
}
