// Confirmation overlay widget.
//
// Renders a centered modal dialog on top of the main layout. Used for
// quit confirmation and for the destructive-delete confirmation.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

const DIALOG_HEIGHT: u16 = 5;
const MAX_DIALOG_WIDTH: u16 = 56;

/// Render a confirmation dialog centered on the screen.
pub fn render(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let width = dialog_width(message, area.width);
    let dialog_area = centered_rect(width, DIALOG_HEIGHT, area);

    // Clear the area behind the dialog so it renders cleanly on top
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Confirm ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(Line::from(message.to_string()))
        .wrap(Wrap { trim: true })
        .block(block)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, dialog_area);
}

/// Size the dialog to the message, capped for readability.
fn dialog_width(message: &str, available: u16) -> u16 {
    let wanted = (message.chars().count() as u16).saturating_add(4);
    wanted.min(MAX_DIALOG_WIDTH).min(available).max(20)
}

/// Compute a centered rectangle of the given size within `area`.
///
/// If the area is too small, the dialog is clamped to the available space.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let result = centered_rect(30, DIALOG_HEIGHT, area);
        let center_x = area.width / 2;
        let result_center_x = result.x + result.width / 2;
        assert!(
            (result_center_x as i32 - center_x as i32).unsigned_abs() <= 1,
            "dialog should be horizontally centered: {} vs {}",
            result_center_x,
            center_x,
        );
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 10, 3);
        let result = centered_rect(40, DIALOG_HEIGHT, area);
        assert!(result.width <= area.width);
        assert!(result.height <= area.height);
    }

    #[test]
    fn dialog_width_tracks_the_message() {
        // Short messages hit the minimum width floor.
        assert_eq!(dialog_width("Quit? [y/n]", 80), 20);
        assert_eq!(dialog_width(&"x".repeat(30), 80), 34);
        assert_eq!(dialog_width(&"x".repeat(200), 80), MAX_DIALOG_WIDTH);
        assert!(dialog_width("hi", 80) >= 20);
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                render(
                    frame,
                    "Delete 3 document(s)? This action cannot be undone. [y/n]",
                )
            })
            .unwrap();
    }
}
