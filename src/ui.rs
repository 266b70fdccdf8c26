use std::time::Duration;

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

use crate::domain::CMConfig;
use crate::model::{Model, RowView, UIData};

pub const PANEL_WIDTH: u16 = 34;
// Blank spacer + the Done button below the rows.
pub const PANEL_FOOTER_HEIGHT: u16 = 2;
pub const BUTTON_LABEL: &str = "[ Manage Column ";
pub const CHECK_MARK: &str = "✔";
// Stand-in for the 3x3 drag handle dot grid, purely cosmetic.
pub const DOT_GRID: &str = "⠿";

const CHECKED_COLOR: Color = Color::Rgb(230, 161, 5);
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct PanelUI {
    config: CMConfig,
}

struct ColumnPanelView<'a> {
    uidata: &'a UIData,
    animated: bool,
}

struct HelpPopup<'a> {
    message: &'a str,
}

impl PanelUI {
    pub fn new(config: &CMConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        frame.render_widget(
            ColumnPanelView {
                uidata,
                animated: self.config.animation_ms > 0,
            },
            frame.area(),
        );
        if uidata.show_popup {
            frame.render_widget(
                HelpPopup {
                    message: &uidata.popup_message,
                },
                frame.area(),
            );
        }
    }
}

// Rendered height of the panel for a given animation progress. The panel
// grows from zero to its full height while opening and shrinks back while
// closing.
fn panel_height(full: u16, progress: f64) -> u16 {
    if progress <= 0.0 {
        return 0;
    }
    std::cmp::min((f64::from(full) * progress).ceil() as u16, full)
}

// Fade-in of the panel content, approximated with a darker foreground
// while the transition is still running.
fn fade_style(progress: f64) -> Style {
    if progress < 0.4 {
        Style::new().fg(Color::DarkGray)
    } else if progress < 0.8 {
        Style::new().fg(Color::Gray)
    } else {
        Style::new()
    }
}

fn render_row(row: &RowView, selected: bool, width: u16) -> Line<'_> {
    let mark = if row.checked {
        Span::styled(CHECK_MARK, Style::new().fg(CHECKED_COLOR))
    } else {
        Span::raw(" ")
    };

    // "[x] ", the label, padding and the drag handle on the right edge.
    let used = 4 + row.label.chars().count() + 1;
    let pad = (width as usize).saturating_sub(used);

    let mut style = Style::new();
    if row.grabbed {
        style = Style::new().fg(CHECKED_COLOR).reversed().bold();
    } else if selected {
        style = Style::new().reversed();
    }

    Line::from(vec![
        Span::raw("["),
        mark,
        Span::raw("] "),
        Span::raw(row.label.clone()),
        Span::raw(" ".repeat(pad)),
        Span::styled(DOT_GRID, Style::new().fg(Color::DarkGray)),
    ])
    .style(style)
}

impl ColumnPanelView<'_> {
    fn render_button(&self, inner: Rect, buf: &mut Buffer) {
        let style = if self.uidata.button_focused {
            Style::new().reversed()
        } else {
            Style::new()
        };
        let arrow = if self.uidata.panel_visible { "▴" } else { "▾" };
        let button = Line::from(vec![
            Span::raw(BUTTON_LABEL),
            Span::raw(arrow),
            Span::raw(" ]"),
        ])
        .style(style);
        buf.set_line(inner.x, inner.y, &button, inner.width);
    }

    fn render_status(&self, inner: Rect, buf: &mut Buffer) {
        if self.uidata.status_message.is_empty()
            || self.uidata.last_status_message_update.elapsed() > STATUS_MESSAGE_TIMEOUT
        {
            return;
        }
        let status = Line::from(self.uidata.status_message.clone().dark_gray());
        buf.set_line(inner.x, inner.y + inner.height - 1, &status, inner.width);
    }

    fn render_panel(&self, inner: Rect, buf: &mut Buffer) {
        let full = self.uidata.rows.len() as u16 + PANEL_FOOTER_HEIGHT + 2;
        let height = if self.animated {
            panel_height(full, self.uidata.panel_progress)
        } else {
            full
        };
        if height < 2 {
            return;
        }

        let panel_area = Rect {
            x: inner.x + 1,
            y: inner.y + 1,
            width: PANEL_WIDTH.min(inner.width.saturating_sub(1)),
            height: height.min(inner.height.saturating_sub(1)),
        };
        if panel_area.width < 8 || panel_area.height < 2 {
            return;
        }

        let fade = fade_style(self.uidata.panel_progress);

        Clear.render(panel_area, buf);
        let panel_block = Block::bordered().border_style(fade);
        let panel_inner = panel_block.inner(panel_area);
        panel_block.render(panel_area, buf);

        let mut lines: Vec<Line> =
            Vec::with_capacity(self.uidata.rows.len() + PANEL_FOOTER_HEIGHT as usize);
        for (idx, row) in self.uidata.rows.iter().enumerate() {
            lines.push(render_row(row, idx == self.uidata.selected_row, panel_inner.width));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from("[ Done ]".bold()).right_aligned());

        Paragraph::new(Text::from(lines))
            .style(fade)
            .render(panel_inner, buf);
    }
}

impl Widget for ColumnPanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(" colman ".bold());
        let instructions = if self.uidata.panel_visible {
            Line::from(vec![
                " Toggle ".into(),
                "<Space>".blue().bold(),
                " Grab ".into(),
                "<G>".blue().bold(),
                " Done ".into(),
                "<Enter> ".blue().bold(),
            ])
        } else {
            Line::from(vec![
                " Open ".into(),
                "<Enter>".blue().bold(),
                " Copy ".into(),
                "<Y>".blue().bold(),
                " Help ".into(),
                "<?>".blue().bold(),
                " Quit ".into(),
                "<Q> ".blue().bold(),
            ])
        };
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 1 || inner.width < 4 {
            return;
        }

        self.render_button(inner, buf);
        self.render_status(inner, buf);
        if self.uidata.panel_visible {
            self.render_panel(inner, buf);
        }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = std::cmp::min(44, area.width);
        let height = std::cmp::min(self.message.lines().count() as u16 + 2, area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        Clear.render(popup, buf);
        let block = Block::bordered().title(Line::from(" Help ".bold()).centered());
        Paragraph::new(self.message).block(block).render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_height_follows_progress() {
        assert_eq!(panel_height(11, 0.0), 0);
        assert_eq!(panel_height(11, 1.0), 11);
        let half = panel_height(11, 0.5);
        assert!(half > 0 && half < 11);
        // Never overshoots the full height.
        assert_eq!(panel_height(11, 2.0), 11);
    }

    #[test]
    fn row_is_padded_to_width() {
        let row = RowView {
            label: "Location".to_string(),
            checked: true,
            grabbed: false,
        };
        let line = render_row(&row, false, 32);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered.chars().count(), 32);
        assert!(rendered.starts_with("[✔] Location"));
        assert!(rendered.ends_with(DOT_GRID));
    }

    #[test]
    fn unchecked_row_has_empty_box() {
        let row = RowView {
            label: "Category".to_string(),
            checked: false,
            grabbed: false,
        };
        let line = render_row(&row, false, 32);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(rendered.starts_with("[ ] Category"));
    }
}
