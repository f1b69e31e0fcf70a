// Query console: filter rows, order-by, and limit as an editable grid.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::firestore::query::FilterForm;
use crate::firestore::value::truncate_cell;
use crate::protocol::PanelId;
use crate::tui::ViewState;

use super::{cell_style, panel_block};

const CELL_WIDTH: usize = 14;

/// Render the query builder into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = panel_block(state, PanelId::Query);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = state.active_panel == PanelId::Query;
    let filters = state.query_form.filters.len();
    let mut lines = Vec::new();

    if filters == 0 {
        lines.push(Line::from(Span::styled(
            "no filters (a to add)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (row, filter) in state.query_form.filters.iter().enumerate() {
        lines.push(filter_line(filter, state, focused, row));
    }

    // Order-by row.
    let order_row = filters;
    lines.push(Line::from(vec![
        Span::styled("sort:  ", Style::default().fg(Color::Gray)),
        Span::styled(
            cell_text(&state.query_form.order_field, "<field>"),
            row_cell_style(state, focused, order_row, 0),
        ),
        Span::raw(" "),
        Span::styled(
            state.query_form.order_direction.label().to_string(),
            row_cell_style(state, focused, order_row, 1),
        ),
    ]));

    // Limit row.
    lines.push(Line::from(vec![
        Span::styled("limit: ", Style::default().fg(Color::Gray)),
        Span::styled(
            cell_text(&state.query_form.limit_text, "<none>"),
            row_cell_style(state, focused, order_row + 1, 0),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn filter_line(
    filter: &FilterForm,
    state: &ViewState,
    focused: bool,
    row: usize,
) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            cell_text(&filter.field, "<field>"),
            row_cell_style(state, focused, row, 0),
        ),
        Span::raw(" "),
        Span::styled(
            filter.op.symbol().to_string(),
            row_cell_style(state, focused, row, 1),
        ),
        Span::raw(" "),
        Span::styled(
            cell_text(&filter.value_text, "<value>"),
            row_cell_style(state, focused, row, 2),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", filter.declared.label()),
            row_cell_style(state, focused, row, 3),
        ),
    ])
}

fn row_cell_style(state: &ViewState, focused: bool, row: usize, col: usize) -> Style {
    let here = focused && state.query_cursor.row == row && state.query_cursor.col == col;
    cell_style(here, state.editing)
}

pub fn cell_text(text: &str, placeholder: &str) -> String {
    if text.is_empty() {
        placeholder.to_string()
    } else {
        truncate_cell(text, CELL_WIDTH)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::query::FilterOp;
    use crate::firestore::value::FieldType;

    #[test]
    fn cell_text_placeholder_and_truncation() {
        assert_eq!(cell_text("", "<field>"), "<field>");
        assert_eq!(cell_text("status", "<field>"), "status");
        let long = "a_very_long_field_name_indeed";
        assert!(cell_text(long, "<field>").chars().count() <= CELL_WIDTH);
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(50, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_filters() {
        let backend = ratatui::backend::TestBackend::new(50, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        state.query_form.filters.push(FilterForm {
            field: "status".to_string(),
            op: FilterOp::Equal,
            value_text: "open".to_string(),
            declared: FieldType::String,
        });
        state.query_form.filters.push(FilterForm::default());
        state.query_form.order_field = "createdAt".to_string();
        state.query_form.limit_text = "50".to_string();
        state.query_cursor = crate::tui::QueryCursor { row: 0, col: 2 };
        state.editing = true;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
