// Widget rendering modules.
//
// Each widget exposes `render(frame, area, state)` and keeps its
// formatting logic in pure helper functions so tests can exercise them
// without a terminal.

pub mod auth_panel;
pub mod confirm;
pub mod connect;
pub mod documents;
pub mod ops_console;
pub mod query_console;
pub mod status_bar;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use crate::protocol::PanelId;
use crate::tui::ViewState;

/// Bordered block for a sidebar panel, highlighted when it has focus.
pub(crate) fn panel_block(state: &ViewState, panel: PanelId) -> Block<'static> {
    let focused = state.active_panel == panel;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", panel.label()), title_style))
}

/// Style for a form cell: focused cells get a highlight, and the cell
/// under edit gets an underline on top of it.
pub(crate) fn cell_style(focused: bool, editing: bool) -> Style {
    if focused && editing {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::UNDERLINED)
    } else if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_cell_styles_differ() {
        assert_ne!(cell_style(true, false), cell_style(false, false));
        assert_ne!(cell_style(true, true), cell_style(true, false));
    }
}
