//! Single-line bar of Soul Points, one segment per connection

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::points::PointsEntry;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Each entry gets a segment proportional to its reward; connected
/// segments are drawn filled.
pub struct PointsBar<'a> {
    entries: &'a [PointsEntry],
    earned_style: Style,
    pending_style: Style,
}

impl<'a> PointsBar<'a> {
    pub fn new(entries: &'a [PointsEntry]) -> Self {
        Self {
            entries,
            earned_style: Style::default().fg(Color::Green),
            pending_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn earned_style(mut self, style: Style) -> Self {
        self.earned_style = style;
        self
    }

    pub fn pending_style(mut self, style: Style) -> Self {
        self.pending_style = style;
        self
    }
}

/// Cell span `[start, end)` of every entry across `width` cells
fn segments(entries: &[PointsEntry], width: usize) -> Vec<(usize, usize)> {
    let total: u64 = entries.iter().map(|e| u64::from(e.points)).sum();
    if total == 0 || width == 0 {
        return Vec::new();
    }
    let width = width as u64;
    let mut cumulative = 0u64;
    entries
        .iter()
        .map(|entry| {
            let start = cumulative * width / total;
            cumulative += u64::from(entry.points);
            let end = cumulative * width / total;
            (start as usize, end as usize)
        })
        .collect()
}

impl<'a> Widget for PointsBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for (entry, (start, end)) in self
            .entries
            .iter()
            .zip(segments(self.entries, area.width as usize))
        {
            let (ch, style) = if entry.connected {
                (FILLED, self.earned_style)
            } else {
                (EMPTY, self.pending_style)
            };
            for offset in start..end {
                let x = area.x + offset as u16;
                buf.get_mut(x, area.y).set_char(ch).set_style(style);
            }
        }
    }
}

/// Same bar as plain text (for status messages and tests)
pub fn points_bar_text(entries: &[PointsEntry], width: usize) -> String {
    let mut out = String::new();
    for (entry, (start, end)) in entries.iter().zip(segments(entries, width)) {
        let ch = if entry.connected { FILLED } else { EMPTY };
        out.extend(std::iter::repeat(ch).take(end - start));
    }
    out
}
