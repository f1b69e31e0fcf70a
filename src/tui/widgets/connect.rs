// Connect panel: pasted Firebase config blob and collection name form.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::firestore::value::truncate_cell;
use crate::protocol::PanelId;
use crate::tui::ViewState;

use super::{cell_style, panel_block};

/// Render the connect form into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = panel_block(state, PanelId::Connect);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = state.active_panel == PanelId::Connect;
    let width = inner.width.saturating_sub(12) as usize;

    let lines = vec![
        Line::from(vec![
            Span::styled("Config:     ", Style::default().fg(Color::Gray)),
            Span::styled(
                config_summary(&state.config_text, width),
                cell_style(focused && state.connect_field == 0, state.editing),
            ),
        ]),
        Line::from(vec![
            Span::styled("Collection: ", Style::default().fg(Color::Gray)),
            Span::styled(
                field_text(&state.collection_text, width),
                cell_style(focused && state.connect_field == 1, state.editing),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Paste the firebaseConfig JSON, then press c",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// One-line summary of the pasted config blob. The blob is multi-line
/// JSON, so show its length rather than the raw text.
pub fn config_summary(blob: &str, width: usize) -> String {
    if blob.trim().is_empty() {
        return "<paste config>".to_string();
    }
    let compact: String = blob.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_cell(&format!("{} ({} chars)", compact, blob.len()), width.max(8))
}

fn field_text(text: &str, width: usize) -> String {
    if text.is_empty() {
        "<empty>".to_string()
    } else {
        truncate_cell(text, width.max(8))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
