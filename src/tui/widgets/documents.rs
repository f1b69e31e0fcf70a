// Documents widget: table of loaded documents with selection marks.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::firestore::document::Document;
use crate::firestore::value::{self, truncate_cell};
use crate::protocol::PanelId;
use crate::tui::ViewState;

use super::panel_block;

/// Field columns shown beside the id and date columns.
const FIELD_COLUMNS: usize = 3;
const CELL_WIDTH: usize = 24;

/// Render the document table into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let columns = visible_columns(&state.field_names);

    let mut header_cells = vec![Cell::from(" "), Cell::from("ID")];
    header_cells.extend(columns.iter().map(|name| Cell::from(name.clone())));
    header_cells.push(Cell::from("Date"));
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = state
        .documents
        .iter()
        .map(|doc| {
            let selected = state.selected.contains(&doc.id);
            let mut cells = vec![
                Cell::from(selection_mark(selected)),
                Cell::from(truncate_cell(&doc.id, CELL_WIDTH)),
            ];
            cells.extend(
                columns
                    .iter()
                    .map(|name| Cell::from(field_cell(doc, name))),
            );
            cells.push(Cell::from(doc.date_info()));
            let style = if selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(3), Constraint::Length(24)];
    widths.extend(columns.iter().map(|_| Constraint::Min(12)));
    widths.push(Constraint::Min(18));

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel_block(state, PanelId::Documents))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    if !state.documents.is_empty() {
        table_state.select(Some(state.doc_cursor));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

pub fn selection_mark(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Show the first few fields as columns; the rest are reachable through
/// queries and the operations console.
pub fn visible_columns(field_names: &[String]) -> Vec<String> {
    field_names.iter().take(FIELD_COLUMNS).cloned().collect()
}

fn field_cell(doc: &Document, field: &str) -> String {
    match doc.fields.get(field) {
        Some(v) => truncate_cell(&value::preview(v), CELL_WIDTH),
        None => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DocumentsSnapshot;
    use serde_json::json;

    fn doc(id: &str) -> Document {
        Document::from_resource(&json!({
            "name": format!("projects/p/databases/(default)/documents/orders/{id}"),
            "fields": {
                "status": { "stringValue": "open" },
                "total": { "integerValue": "42" },
                "createdAt": { "timestampValue": "2024-03-01T10:30:00Z" },
            },
        }))
        .unwrap()
    }

    fn loaded_state(ids: &[&str]) -> ViewState {
        let mut state = ViewState::default();
        let documents: Vec<Document> = ids.iter().map(|id| doc(id)).collect();
        let field_names = crate::firestore::document::field_names(&documents);
        state.apply_snapshot(DocumentsSnapshot {
            collection: "orders".to_string(),
            documents,
            field_names,
            query_active: false,
        });
        state
    }

    #[test]
    fn selection_marks() {
        assert_eq!(selection_mark(true), "[x]");
        assert_eq!(selection_mark(false), "[ ]");
    }

    #[test]
    fn visible_columns_caps_the_field_count() {
        let names: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(visible_columns(&names), vec!["a", "b", "c"]);
        assert_eq!(visible_columns(&names[..2]), vec!["a", "b"]);
    }

    #[test]
    fn field_cell_previews_and_dashes_missing() {
        let document = doc("x");
        assert_eq!(field_cell(&document, "status"), "open");
        assert_eq!(field_cell(&document, "total"), "42");
        assert_eq!(field_cell(&document, "nope"), "-");
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_documents_and_selection() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = loaded_state(&["a", "b", "c"]);
        state.doc_cursor = 1;
        state.toggle_selection();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
