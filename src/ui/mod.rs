use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap,
};
use ratatui::Frame;

pub mod layout;
pub mod tabs;
pub mod widgets;

use crate::app::{App, Overlay};
use crate::config;
use crate::core::NotifyLevel;
use crate::domain::connection::LinkState;
use crate::domain::surface::SurfaceContent;
use crate::modules::ConnectionRow;
use widgets::PointsBar;

const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    tabs::draw_tab_bar(f, areas.header, app);
    draw_connection_list(f, areas.list, app);
    draw_points_panel(f, areas.summary, app);
    draw_status_line(f, areas.status_line, app);
    draw_hint_line(f, areas.hint_line);

    for overlay in &app.overlays {
        draw_connection_popup(f, areas.size, overlay, app.ticks);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn button_style(link: LinkState) -> Style {
    match link {
        LinkState::Connected => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        LinkState::Connecting => Style::default().fg(Color::Yellow),
        LinkState::Disconnected => Style::default().fg(Color::White),
    }
}

fn connection_item(row: &ConnectionRow, width: u16) -> ListItem<'static> {
    let button = format!("[ {} ]", row.link.label());
    let title = format!(" {}  {}", row.def.icon, row.def.name);
    let used = title.chars().count() + button.chars().count();
    let gap = (width as usize).saturating_sub(used + 3).max(1);

    let lines = vec![
        Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" ".repeat(gap)),
            Span::styled(button, button_style(row.link)),
        ]),
        Line::from(Span::styled(
            format!("     {}", row.def.description),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!("     +{} Soul Points", row.def.soul_points),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ];
    ListItem::new(lines)
}

fn draw_connection_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .connections
        .rows()
        .iter()
        .map(|row| connection_item(row, area.width))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} · Connections ", app.current_tab.title())),
        )
        .highlight_style(Style::default().bg(Color::Rgb(28, 29, 41)))
        .highlight_symbol("▌");

    let mut state = ListState::default();
    state.select(Some(app.connections.selected_index()));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_points_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title("SOUL POINTS");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // totals
            Constraint::Length(1), // gauge
            Constraint::Length(1), // spacer
            Constraint::Length(1), // bar
            Constraint::Min(0),    // entries
        ])
        .split(inner);

    let earned = app.points.earned();
    let available = app.points.available();
    let totals = vec![
        Line::from(vec![
            Span::styled(" Earned ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                earned.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" / {available}")),
        ]),
        Line::from(vec![
            Span::styled(" Linked ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{} of {}",
                app.points.connected_count(),
                app.points.points.len()
            )),
        ]),
        Line::from(vec![
            Span::styled(" Broadcasts ", Style::default().fg(Color::DarkGray)),
            Span::raw(app.broadcasts.to_string()),
        ]),
    ];
    f.render_widget(Paragraph::new(totals), chunks[0]);

    let ratio = if available == 0 {
        0.0
    } else {
        earned as f64 / available as f64
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{:.0}%", ratio * 100.0));
    f.render_widget(gauge, pad_horizontal(chunks[1]));

    f.render_widget(PointsBar::new(&app.points.points), pad_horizontal(chunks[3]));

    let entries: Vec<Line> = app
        .points
        .points
        .iter()
        .map(|entry| {
            let (mark, style) = if entry.connected {
                ("✓", Style::default().fg(Color::Green))
            } else {
                ("·", Style::default().fg(Color::DarkGray))
            };
            Line::from(vec![
                Span::styled(format!(" {mark} "), style),
                Span::raw(entry.name.clone()),
                Span::styled(
                    format!("  +{}", entry.points),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(entries), chunks[4]);
}

fn pad_horizontal(area: Rect) -> Rect {
    if area.width <= 2 {
        return area;
    }
    Rect::new(area.x + 1, area.y, area.width - 2, area.height)
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("Tab ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.current_tab.title())),
    ];
    if let Some(row) = app.connections.selected() {
        spans.push(Span::styled("Selected ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(format!("{}  ", row.def.name)));
    }
    if let Some((text, level)) = app.status_text() {
        let color = match level {
            NotifyLevel::Info => Color::Green,
            NotifyLevel::Warn => Color::Yellow,
            NotifyLevel::Error => Color::Red,
        };
        spans.push(Span::styled(text.to_string(), Style::default().fg(color)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_hint_line(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let line = Line::from(vec![
        Span::styled("1-6", key),
        Span::raw(" tabs  "),
        Span::styled("j/k", key),
        Span::raw(" select  "),
        Span::styled("Enter", key),
        Span::raw(" connect  "),
        Span::styled("y", key),
        Span::raw(" copy url  "),
        Span::styled("Esc", key),
        Span::raw(" close popup  "),
        Span::styled("?", key),
        Span::raw(" help  "),
        Span::styled("q", key),
        Span::raw(" quit"),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_connection_popup(f: &mut Frame, screen: Rect, overlay: &Overlay, ticks: u64) {
    let area = layout::surface_rect(&overlay.request, screen);
    f.render_widget(Clear, area);

    let spinner = SPINNER[(ticks % SPINNER.len() as u64) as usize];
    let mut lines = vec![Line::from("")];
    match &overlay.content {
        Some(content @ SurfaceContent::Connected { .. }) => {
            let mut body = content.lines().into_iter();
            if let Some(headline) = body.next() {
                lines.push(Line::from(Span::styled(
                    headline,
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            lines.extend(body.map(Line::from));
        }
        Some(content) => {
            let mut body = content.lines().into_iter();
            if let Some(headline) = body.next() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{spinner} "), Style::default().fg(Color::Green)),
                    Span::raw(headline),
                ]));
            }
            lines.extend(
                body.map(|l| Line::from(Span::styled(l, Style::default().fg(Color::DarkGray)))),
            );
        }
        None => lines.push(Line::from(Span::styled(
            overlay.request.url.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!(" {} ", overlay.request.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .style(Style::default().bg(Color::Rgb(10, 11, 20))),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = layout::centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let config_path = config::config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(unknown)".to_string());

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1-6        Jump to tab"),
        Line::from("  Tab / l →  Next tab"),
        Line::from("  S-Tab / h ← Previous tab"),
        Line::from("  j / k      Move selection"),
        Line::from("  g / G      Top / bottom"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  Enter / c  Connect or disconnect"),
        Line::from("  y          Copy target URL"),
        Line::from("  Esc        Close popup"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from(format!("Config: {config_path}")),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::domain::connection::ConnectionRegistry;
    use crate::domain::surface::SurfaceRequest;
    use crate::infrastructure::RuntimeEvent;

    fn render(app: &App) -> String {
        let backend = TestBackend::new(120, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_dashboard_renders_connections() {
        let app = App::new(&ConnectionRegistry::default());
        let screen = render(&app);
        assert!(screen.contains("On-chain Activities"));
        assert!(screen.contains("Sibil Score"));
        assert!(screen.contains("+150 Soul Points"));
        assert!(screen.contains("[ Connect ]"));
        assert!(screen.contains("SOUL POINTS"));
    }

    #[test]
    fn test_success_popup_renders() {
        let mut app = App::new(&ConnectionRegistry::default());
        app.apply_event(RuntimeEvent::SurfaceOpened {
            surface: 1,
            request: SurfaceRequest {
                title: "Connect Google".into(),
                url: "https://accounts.google.com/oauth".into(),
                width: 56,
                height: 9,
            },
        });
        app.apply_event(RuntimeEvent::SurfaceUpdated {
            surface: 1,
            content: SurfaceContent::Connected {
                name: "Google".into(),
                soul_points: 30,
            },
        });
        let screen = render(&app);
        assert!(screen.contains("Connect Google"));
        assert!(screen.contains("Connected Successfully!"));
        assert!(screen.contains("You've earned 30 Soul Points"));
    }
}
