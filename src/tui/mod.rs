// TUI console: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors relevant parts of the application
// state. The app orchestrator pushes `UiUpdate` messages over an mpsc channel;
// the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::BTreeSet;
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyModifiers,
};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::firestore::document::Document;
use crate::firestore::query::QueryForm;
use crate::protocol::{
    AuthState, ConnectionStatus, DocumentsSnapshot, FieldEditForm, PanelId, StatusLine, UiUpdate,
    UserCommand,
};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Form cursors
// ---------------------------------------------------------------------------

/// Cursor into the query builder grid. Rows `0..filters.len()` are filter
/// rows (columns: field, operator, value, type); the next row is the
/// order-by row (columns: field, direction); the last row is the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCursor {
    pub row: usize,
    pub col: usize,
}

/// Cursor into the operations console. Rows `0..update_rows.len()` are
/// update rows (columns: field, value, type); the rows after them are the
/// single-column field-deletion rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpsCursor {
    pub row: usize,
    pub col: usize,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the console.
pub struct ViewState {
    pub connection_status: ConnectionStatus,
    pub auth: AuthState,
    /// Last status-bar message, if any.
    pub status: Option<StatusLine>,
    pub active_panel: PanelId,
    /// True while a text cell is being edited; printable keys go into the
    /// focused buffer instead of the key map.
    pub editing: bool,
    pub confirm_quit: bool,
    /// True while the delete confirmation modal is up.
    pub confirm_delete: bool,

    // -- connect form --
    pub config_text: String,
    pub collection_text: String,
    /// 0 = config blob, 1 = collection name.
    pub connect_field: usize,

    // -- loaded documents --
    pub collection: String,
    pub documents: Vec<Document>,
    pub field_names: Vec<String>,
    pub query_active: bool,
    pub doc_cursor: usize,
    /// Ids of the selected documents, ordered for stable display.
    pub selected: BTreeSet<String>,

    // -- query console --
    pub query_form: QueryForm,
    pub query_cursor: QueryCursor,

    // -- operations console --
    pub update_rows: Vec<FieldEditForm>,
    pub delete_rows: Vec<String>,
    pub ops_cursor: OpsCursor,

    // -- auth form --
    pub email_text: String,
    pub password_text: String,
    /// 0 = email, 1 = password.
    pub auth_field: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            connection_status: ConnectionStatus::Disconnected,
            auth: AuthState::SignedOut,
            status: None,
            active_panel: PanelId::Connect,
            editing: false,
            confirm_quit: false,
            confirm_delete: false,
            config_text: String::new(),
            collection_text: String::new(),
            connect_field: 0,
            collection: String::new(),
            documents: Vec::new(),
            field_names: Vec::new(),
            query_active: false,
            doc_cursor: 0,
            selected: BTreeSet::new(),
            query_form: QueryForm::default(),
            query_cursor: QueryCursor::default(),
            update_rows: Vec::new(),
            delete_rows: Vec::new(),
            ops_cursor: OpsCursor::default(),
            email_text: String::new(),
            password_text: String::new(),
            auth_field: 0,
        }
    }
}

impl ViewState {
    /// Apply a documents snapshot from the app orchestrator.
    ///
    /// Clamps the table cursor and drops selected ids that no longer exist
    /// in the loaded set.
    pub fn apply_snapshot(&mut self, snapshot: DocumentsSnapshot) {
        self.collection = snapshot.collection;
        self.documents = snapshot.documents;
        self.field_names = snapshot.field_names;
        self.query_active = snapshot.query_active;
        if self.doc_cursor >= self.documents.len() {
            self.doc_cursor = self.documents.len().saturating_sub(1);
        }
        let live: BTreeSet<&str> = self.documents.iter().map(|d| d.id.as_str()).collect();
        self.selected.retain(|id| live.contains(id.as_str()));
    }

    /// Selection as an ordered id list for commands.
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn toggle_selection(&mut self) {
        if let Some(doc) = self.documents.get(self.doc_cursor) {
            if !self.selected.remove(&doc.id) {
                self.selected.insert(doc.id.clone());
            }
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.documents.iter().map(|d| d.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn signed_in(&self) -> bool {
        matches!(self.auth, AuthState::SignedIn { .. })
    }

    /// Resolve the text buffer under the cursor, if the focused cell is
    /// editable. `None` means there is nothing to type into.
    pub fn edit_buffer(&mut self) -> Option<&mut String> {
        match self.active_panel {
            PanelId::Connect => match self.connect_field {
                0 => Some(&mut self.config_text),
                _ => Some(&mut self.collection_text),
            },
            PanelId::Auth => match self.auth_field {
                0 => Some(&mut self.email_text),
                _ => Some(&mut self.password_text),
            },
            PanelId::Query => {
                let filters = self.query_form.filters.len();
                let row = self.query_cursor.row;
                if row < filters {
                    match self.query_cursor.col {
                        0 => Some(&mut self.query_form.filters[row].field),
                        2 => Some(&mut self.query_form.filters[row].value_text),
                        _ => None, // operator and type columns cycle, not edit
                    }
                } else if row == filters {
                    match self.query_cursor.col {
                        0 => Some(&mut self.query_form.order_field),
                        _ => None, // direction column toggles
                    }
                } else {
                    Some(&mut self.query_form.limit_text)
                }
            }
            PanelId::Operations => {
                let updates = self.update_rows.len();
                let row = self.ops_cursor.row;
                if row < updates {
                    match self.ops_cursor.col {
                        0 => Some(&mut self.update_rows[row].field),
                        1 => Some(&mut self.update_rows[row].value_text),
                        _ => None, // type column cycles
                    }
                } else {
                    self.delete_rows.get_mut(row - updates)
                }
            }
            PanelId::Documents => None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::ConnectionStatus(status) => {
            state.connection_status = status;
            if status == ConnectionStatus::Connected
                && state.active_panel == PanelId::Connect
            {
                // Move focus to the data once the first load lands.
                state.active_panel = PanelId::Documents;
            }
        }
        UiUpdate::Documents(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::Status(line) => {
            state.status = Some(line);
        }
        UiUpdate::Auth(auth) => {
            if matches!(auth, AuthState::SignedIn { .. }) {
                // Never keep the password around after a sign-in.
                state.password_text.clear();
            }
            state.auth = auth;
        }
        UiUpdate::SelectionCleared => {
            state.selected.clear();
            state.update_rows.clear();
            state.delete_rows.clear();
            state.ops_cursor = OpsCursor::default();
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete console frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::documents::render(frame, layout.documents, state);
    widgets::connect::render(frame, layout.connect, state);
    widgets::query_console::render(frame, layout.query, state);
    widgets::ops_console::render(frame, layout.operations, state);
    widgets::auth_panel::render(frame, layout.auth, state);
    render_help_bar(frame, &layout, state);

    if state.confirm_delete {
        widgets::confirm::render(
            frame,
            &format!(
                "Delete {} document(s)? This action cannot be undone. [y/n]",
                state.selected.len()
            ),
        );
    } else if state.confirm_quit {
        widgets::confirm::render(frame, "Quit? [y/n]");
    }
}

fn render_help_bar(frame: &mut Frame, layout: &layout::AppLayout, state: &ViewState) {
    let text = if state.editing {
        " Enter:Done | Esc:Cancel | type to edit"
    } else {
        match state.active_panel {
            PanelId::Connect => " Tab:Panel | Up/Down:Field | Enter:Edit | c:Connect | q:Quit",
            PanelId::Documents => {
                " Tab:Panel | Up/Down:Move | Space:Select | a:All | n:None | r:Refresh | q:Quit"
            }
            PanelId::Query => {
                " Tab:Panel | a:+Filter | d:-Filter | o:Op | t:Type | s:Sort | e:Sample | g:Run | x:Clear | q:Quit"
            }
            PanelId::Operations => {
                " Tab:Panel | a:+Set | A:+Unset | d:-Row | t:Type | u:Update | y:Duplicate | D:Delete | q:Quit"
            }
            PanelId::Auth => " Tab:Panel | Up/Down:Field | Enter:Edit | s:Sign in | o:Sign out | q:Quit",
        }
    };
    let paragraph = ratatui::widgets::Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    // 1. Initialize terminal; bracketed paste delivers pasted text as one
    //    event instead of a burst of key presses.
    let mut terminal = ratatui::init();
    execute!(std::io::stdout(), EnableBracketedPaste)?;

    // 2. Set panic hook to restore the terminal on crash.
    //    We capture the original hook and chain ours before it.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableBracketedPaste);
        ratatui::restore();
        original_hook(panic_info);
    }));

    // 3. Create crossterm EventStream for async keyboard input
    let mut event_stream = EventStream::new();

    // 4. Create render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 5. Main loop
    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update);
                    }
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        // Ctrl+C always quits, regardless of mode
                        if key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            let _ = cmd_tx.send(UserCommand::Quit).await;
                            break;
                        }
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quitting = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quitting {
                                break;
                            }
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        apply_paste(&mut view_state, &text);
                    }
                    Some(Ok(_)) => {
                        // Mouse events, resize events, etc. -- ignore
                    }
                    Some(Err(_)) => {
                        break;
                    }
                    None => {
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 6. Restore terminal
    let _ = execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();

    Ok(())
}

/// Append bracketed-paste text to the focused text buffer, if any.
///
/// Pastes only land while editing (the config blob is usually pasted, not
/// typed); outside edit mode the text is discarded rather than replayed as
/// key presses.
fn apply_paste(view_state: &mut ViewState, text: &str) {
    if view_state.editing {
        if let Some(buffer) = view_state.edit_buffer() {
            buffer.push_str(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StatusKind;
    use serde_json::json;

    fn doc(id: &str) -> Document {
        Document::from_resource(&json!({
            "name": format!("projects/p/databases/(default)/documents/c/{id}"),
            "fields": { "status": { "stringValue": "x" } },
        }))
        .unwrap()
    }

    fn snapshot(ids: &[&str]) -> DocumentsSnapshot {
        DocumentsSnapshot {
            collection: "orders".to_string(),
            documents: ids.iter().map(|id| doc(id)).collect(),
            field_names: vec!["status".to_string()],
            query_active: false,
        }
    }

    #[test]
    fn paste_lands_in_the_focused_buffer_while_editing() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Connect;
        state.connect_field = 0;
        state.editing = true;
        apply_paste(&mut state, r#"{"projectId":"demo-project"}"#);
        assert_eq!(state.config_text, r#"{"projectId":"demo-project"}"#);

        // Outside edit mode pasted text is discarded.
        state.editing = false;
        apply_paste(&mut state, "junk");
        assert_eq!(state.config_text, r#"{"projectId":"demo-project"}"#);
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
        assert_eq!(state.auth, AuthState::SignedOut);
        assert_eq!(state.active_panel, PanelId::Connect);
        assert!(state.documents.is_empty());
        assert!(state.selected.is_empty());
        assert!(!state.editing);
        assert!(!state.confirm_quit);
        assert!(!state.confirm_delete);
        assert!(state.update_rows.is_empty());
        assert!(state.query_form.is_empty());
    }

    #[test]
    fn apply_snapshot_clamps_cursor_and_prunes_selection() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(&["a", "b", "c"]));
        state.doc_cursor = 2;
        state.selected.insert("a".to_string());
        state.selected.insert("c".to_string());

        state.apply_snapshot(snapshot(&["a"]));
        assert_eq!(state.doc_cursor, 0);
        assert_eq!(state.selected_ids(), vec!["a"]);
    }

    #[test]
    fn toggle_selection_flips_the_cursor_row() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(&["a", "b"]));
        state.doc_cursor = 1;
        state.toggle_selection();
        assert_eq!(state.selected_ids(), vec!["b"]);
        state.toggle_selection();
        assert!(state.selected.is_empty());
    }

    #[test]
    fn select_all_and_clear() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(&["a", "b", "c"]));
        state.select_all();
        assert_eq!(state.selected_ids(), vec!["a", "b", "c"]);
        state.clear_selection();
        assert!(state.selected.is_empty());
    }

    #[test]
    fn connected_update_moves_focus_to_documents() {
        let mut state = ViewState::default();
        assert_eq!(state.active_panel, PanelId::Connect);
        apply_ui_update(
            &mut state,
            UiUpdate::ConnectionStatus(ConnectionStatus::Connected),
        );
        assert_eq!(state.connection_status, ConnectionStatus::Connected);
        assert_eq!(state.active_panel, PanelId::Documents);
    }

    #[test]
    fn connected_update_keeps_focus_elsewhere() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        apply_ui_update(
            &mut state,
            UiUpdate::ConnectionStatus(ConnectionStatus::Connected),
        );
        assert_eq!(state.active_panel, PanelId::Query);
    }

    #[test]
    fn status_update_replaces_the_line() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Status(StatusLine::error("bad")));
        apply_ui_update(&mut state, UiUpdate::Status(StatusLine::success("good")));
        let line = state.status.unwrap();
        assert_eq!(line.text, "good");
        assert_eq!(line.kind, StatusKind::Success);
    }

    #[test]
    fn sign_in_clears_the_password_buffer() {
        let mut state = ViewState::default();
        state.password_text = "hunter2".to_string();
        apply_ui_update(
            &mut state,
            UiUpdate::Auth(AuthState::SignedIn {
                email: "admin@example.com".to_string(),
            }),
        );
        assert!(state.password_text.is_empty());
        assert!(state.signed_in());
    }

    #[test]
    fn selection_cleared_resets_forms() {
        let mut state = ViewState::default();
        state.selected.insert("a".to_string());
        state.update_rows.push(FieldEditForm::default());
        state.delete_rows.push("old".to_string());
        state.ops_cursor = OpsCursor { row: 1, col: 0 };

        apply_ui_update(&mut state, UiUpdate::SelectionCleared);
        assert!(state.selected.is_empty());
        assert!(state.update_rows.is_empty());
        assert!(state.delete_rows.is_empty());
        assert_eq!(state.ops_cursor, OpsCursor::default());
    }

    #[test]
    fn edit_buffer_resolves_connect_fields() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Connect;
        state.connect_field = 0;
        state.edit_buffer().unwrap().push_str("{}");
        assert_eq!(state.config_text, "{}");
        state.connect_field = 1;
        state.edit_buffer().unwrap().push_str("users");
        assert_eq!(state.collection_text, "users");
    }

    #[test]
    fn edit_buffer_skips_cycling_columns() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        state.query_form.filters.push(Default::default());
        // Operator column (1) and type column (3) cycle rather than edit.
        state.query_cursor = QueryCursor { row: 0, col: 1 };
        assert!(state.edit_buffer().is_none());
        state.query_cursor = QueryCursor { row: 0, col: 3 };
        assert!(state.edit_buffer().is_none());
        state.query_cursor = QueryCursor { row: 0, col: 2 };
        assert!(state.edit_buffer().is_some());
    }

    #[test]
    fn edit_buffer_resolves_delete_rows_after_update_rows() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Operations;
        state.update_rows.push(FieldEditForm::default());
        state.delete_rows.push(String::new());
        state.ops_cursor = OpsCursor { row: 1, col: 0 };
        state.edit_buffer().unwrap().push_str("legacy");
        assert_eq!(state.delete_rows[0], "legacy");
    }

    #[test]
    fn documents_panel_has_no_edit_buffer() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Documents;
        assert!(state.edit_buffer().is_none());
    }
}
