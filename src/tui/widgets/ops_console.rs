// Operations console: batch set/unset rows plus duplicate and delete hints.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::firestore::value::truncate_cell;
use crate::protocol::{FieldEditForm, PanelId};
use crate::tui::ViewState;

use super::{cell_style, panel_block};

const CELL_WIDTH: usize = 14;

/// Render the batch operations console into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = panel_block(state, PanelId::Operations);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = state.active_panel == PanelId::Operations;
    let updates = state.update_rows.len();
    let mut lines = Vec::new();

    if state.update_rows.is_empty() && state.delete_rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "no pending edits (a: set field, A: unset field)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (row, edit) in state.update_rows.iter().enumerate() {
        lines.push(update_line(edit, state, focused, row));
    }
    for (i, field) in state.delete_rows.iter().enumerate() {
        let row = updates + i;
        let here = focused && state.ops_cursor.row == row;
        lines.push(Line::from(vec![
            Span::styled("unset ", Style::default().fg(Color::Red)),
            Span::styled(
                cell_text(field, "<field>"),
                cell_style(here, state.editing),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        summary(state.selected.len(), state.signed_in()),
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn update_line(
    edit: &FieldEditForm,
    state: &ViewState,
    focused: bool,
    row: usize,
) -> Line<'static> {
    let at = |col: usize| {
        let here = focused && state.ops_cursor.row == row && state.ops_cursor.col == col;
        cell_style(here, state.editing)
    };
    Line::from(vec![
        Span::styled("set ", Style::default().fg(Color::Green)),
        Span::styled(cell_text(&edit.field, "<field>"), at(0)),
        Span::raw(" = "),
        Span::styled(cell_text(&edit.value_text, "<value>"), at(1)),
        Span::raw(" "),
        Span::styled(format!("[{}]", edit.declared.label()), at(2)),
    ])
}

fn cell_text(text: &str, placeholder: &str) -> String {
    if text.is_empty() {
        placeholder.to_string()
    } else {
        truncate_cell(text, CELL_WIDTH)
    }
}

/// Footer line stating what the operations will target.
pub fn summary(selected: usize, signed_in: bool) -> String {
    if !signed_in {
        "sign in to enable write operations".to_string()
    } else if selected == 0 {
        "no documents selected".to_string()
    } else {
        format!("targets {selected} selected document(s)")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
