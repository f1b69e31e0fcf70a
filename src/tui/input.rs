// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (panel switching,
// form editing, selection).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{OpsCursor, QueryCursor, ViewState};
use crate::protocol::{PanelId, UserCommand};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the app orchestrator (connect, query, mutations, quit). Returns `None`
/// when the key press was handled locally by mutating `ViewState` (panel
/// switching, cursor movement, text editing).
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Quit confirmation mode: only y/q confirm, n/Esc cancel, everything else blocked
    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    // Delete confirmation mode
    if view_state.confirm_delete {
        return handle_confirm_delete(key_event, view_state);
    }

    // Edit mode: capture printable characters into the focused buffer
    if view_state.editing {
        return handle_edit_mode(key_event, view_state);
    }

    // Normal mode key dispatch
    match key_event.code {
        KeyCode::Tab => {
            view_state.active_panel = view_state.active_panel.next();
            None
        }
        KeyCode::BackTab => {
            view_state.active_panel = view_state.active_panel.prev();
            None
        }
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Char('r') => Some(UserCommand::Refresh),
        _ => match view_state.active_panel {
            PanelId::Connect => handle_connect_key(key_event, view_state),
            PanelId::Documents => handle_documents_key(key_event, view_state),
            PanelId::Query => handle_query_key(key_event, view_state),
            PanelId::Operations => handle_ops_key(key_event, view_state),
            PanelId::Auth => handle_auth_key(key_event, view_state),
        },
    }
}

// ---------------------------------------------------------------------------
// Modal handlers
// ---------------------------------------------------------------------------

/// In quit confirmation mode `y`/`q` confirm and `n`/`Esc` cancel; all
/// other keys are blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Delete is the one irreversible bulk action, so it gets the same
/// confirm-or-cancel gate as quitting.
fn handle_confirm_delete(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm_delete = false;
            Some(UserCommand::Delete {
                ids: view_state.selected_ids(),
            })
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_delete = false;
            None
        }
        _ => None,
    }
}

/// In edit mode printable characters go into the focused buffer;
/// Enter/Esc leave edit mode keeping the text.
fn handle_edit_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_state.editing = false;
            None
        }
        KeyCode::Backspace => {
            if let Some(buffer) = view_state.edit_buffer() {
                buffer.pop();
            }
            None
        }
        KeyCode::Char(c) => {
            if let Some(buffer) = view_state.edit_buffer() {
                buffer.push(c);
            }
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Per-panel handlers
// ---------------------------------------------------------------------------

fn handle_connect_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Up => {
            view_state.connect_field = 0;
            None
        }
        KeyCode::Down => {
            view_state.connect_field = 1;
            None
        }
        KeyCode::Enter => {
            view_state.editing = true;
            None
        }
        KeyCode::Char('c') => Some(UserCommand::Connect {
            config_blob: view_state.config_text.clone(),
            collection: view_state.collection_text.clone(),
        }),
        _ => None,
    }
}

fn handle_documents_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let last = view_state.documents.len().saturating_sub(1);
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.doc_cursor = view_state.doc_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.doc_cursor = (view_state.doc_cursor + 1).min(last);
            None
        }
        KeyCode::PageUp => {
            view_state.doc_cursor = view_state.doc_cursor.saturating_sub(10);
            None
        }
        KeyCode::PageDown => {
            view_state.doc_cursor = (view_state.doc_cursor + 10).min(last);
            None
        }
        KeyCode::Char(' ') => {
            view_state.toggle_selection();
            None
        }
        KeyCode::Char('a') => {
            view_state.select_all();
            None
        }
        KeyCode::Char('n') => {
            view_state.clear_selection();
            None
        }
        _ => None,
    }
}

fn handle_query_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let filters = view_state.query_form.filters.len();
    let row = view_state.query_cursor.row;
    match key_event.code {
        KeyCode::Char('a') => {
            view_state.query_form.filters.push(Default::default());
            view_state.query_cursor = QueryCursor {
                row: view_state.query_form.filters.len() - 1,
                col: 0,
            };
            None
        }
        KeyCode::Char('d') => {
            if row < filters {
                view_state.query_form.filters.remove(row);
                clamp_query_cursor(view_state);
            }
            None
        }
        KeyCode::Char('o') => {
            if let Some(filter) = view_state.query_form.filters.get_mut(row) {
                filter.op = filter.op.next();
            }
            None
        }
        KeyCode::Char('t') => {
            if let Some(filter) = view_state.query_form.filters.get_mut(row) {
                filter.declared = filter.declared.next();
            }
            None
        }
        KeyCode::Char('s') => {
            view_state.query_form.order_direction =
                view_state.query_form.order_direction.toggled();
            None
        }
        KeyCode::Char('x') => {
            view_state.query_form = Default::default();
            view_state.query_cursor = QueryCursor::default();
            Some(UserCommand::ClearQuery)
        }
        KeyCode::Char('e') => {
            view_state.query_form = sample_query_form();
            view_state.query_cursor = QueryCursor::default();
            None
        }
        KeyCode::Char('g') => Some(UserCommand::RunQuery(view_state.query_form.clone())),
        KeyCode::Up => {
            view_state.query_cursor.row = row.saturating_sub(1);
            clamp_query_cursor(view_state);
            None
        }
        KeyCode::Down => {
            view_state.query_cursor.row = (row + 1).min(filters + 1);
            clamp_query_cursor(view_state);
            None
        }
        KeyCode::Left => {
            view_state.query_cursor.col = view_state.query_cursor.col.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            view_state.query_cursor.col += 1;
            clamp_query_cursor(view_state);
            None
        }
        KeyCode::Enter => {
            if view_state.edit_buffer().is_some() {
                view_state.editing = true;
            }
            None
        }
        _ => None,
    }
}

/// Starter form showing the console's moving parts: one equality filter,
/// a descending sort, and a small limit.
fn sample_query_form() -> crate::firestore::QueryForm {
    let mut form = crate::firestore::QueryForm::default();
    form.filters.push(crate::firestore::FilterForm {
        field: "status".to_string(),
        value_text: "active".to_string(),
        ..Default::default()
    });
    form.order_field = "createdAt".to_string();
    form.order_direction = crate::firestore::SortDirection::Descending;
    form.limit_text = "10".to_string();
    form
}

/// Columns per query row: filter rows have field/op/value/type, the
/// order-by row has field/direction, the limit row has one cell.
fn query_row_width(view_state: &ViewState) -> usize {
    let filters = view_state.query_form.filters.len();
    let row = view_state.query_cursor.row;
    if row < filters {
        4
    } else if row == filters {
        2
    } else {
        1
    }
}

fn clamp_query_cursor(view_state: &mut ViewState) {
    let filters = view_state.query_form.filters.len();
    view_state.query_cursor.row = view_state.query_cursor.row.min(filters + 1);
    let width = query_row_width(view_state);
    view_state.query_cursor.col = view_state.query_cursor.col.min(width - 1);
}

fn handle_ops_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let updates = view_state.update_rows.len();
    let row = view_state.ops_cursor.row;
    match key_event.code {
        KeyCode::Char('a') => {
            view_state.update_rows.push(Default::default());
            view_state.ops_cursor = OpsCursor {
                row: view_state.update_rows.len() - 1,
                col: 0,
            };
            None
        }
        KeyCode::Char('A') => {
            view_state.delete_rows.push(String::new());
            view_state.ops_cursor = OpsCursor {
                row: view_state.update_rows.len() + view_state.delete_rows.len() - 1,
                col: 0,
            };
            None
        }
        KeyCode::Char('d') => {
            if row < updates {
                view_state.update_rows.remove(row);
            } else if row - updates < view_state.delete_rows.len() {
                view_state.delete_rows.remove(row - updates);
            }
            clamp_ops_cursor(view_state);
            None
        }
        KeyCode::Char('t') => {
            if let Some(edit) = view_state.update_rows.get_mut(row) {
                edit.declared = edit.declared.next();
            }
            None
        }
        KeyCode::Char('u') => Some(UserCommand::BatchUpdate {
            ids: view_state.selected_ids(),
            edits: view_state.update_rows.clone(),
            removed_fields: view_state.delete_rows.clone(),
        }),
        KeyCode::Char('y') => Some(UserCommand::Duplicate {
            ids: view_state.selected_ids(),
        }),
        KeyCode::Char('D') => {
            if view_state.selected.is_empty() {
                // Let the orchestrator report the empty-selection message.
                Some(UserCommand::Delete { ids: Vec::new() })
            } else {
                view_state.confirm_delete = true;
                None
            }
        }
        KeyCode::Up => {
            view_state.ops_cursor.row = row.saturating_sub(1);
            clamp_ops_cursor(view_state);
            None
        }
        KeyCode::Down => {
            view_state.ops_cursor.row = row + 1;
            clamp_ops_cursor(view_state);
            None
        }
        KeyCode::Left => {
            view_state.ops_cursor.col = view_state.ops_cursor.col.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            view_state.ops_cursor.col += 1;
            clamp_ops_cursor(view_state);
            None
        }
        KeyCode::Enter => {
            if view_state.edit_buffer().is_some() {
                view_state.editing = true;
            }
            None
        }
        _ => None,
    }
}

fn clamp_ops_cursor(view_state: &mut ViewState) {
    let updates = view_state.update_rows.len();
    let total = updates + view_state.delete_rows.len();
    if total == 0 {
        view_state.ops_cursor = OpsCursor::default();
        return;
    }
    view_state.ops_cursor.row = view_state.ops_cursor.row.min(total - 1);
    let width = if view_state.ops_cursor.row < updates { 3 } else { 1 };
    view_state.ops_cursor.col = view_state.ops_cursor.col.min(width - 1);
}

fn handle_auth_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Up => {
            view_state.auth_field = 0;
            None
        }
        KeyCode::Down => {
            view_state.auth_field = 1;
            None
        }
        KeyCode::Enter => {
            view_state.editing = true;
            None
        }
        KeyCode::Char('s') => Some(UserCommand::SignIn {
            email: view_state.email_text.clone(),
            password: view_state.password_text.clone(),
        }),
        KeyCode::Char('o') => Some(UserCommand::SignOut),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::query::{FilterOp, SortDirection};
    use crate::firestore::value::FieldType;
    use crate::protocol::DocumentsSnapshot;
    use crossterm::event::{KeyEventState, KeyModifiers};
    use serde_json::json;

    /// Helper to create a KeyEvent with no modifiers.
    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn state_with_documents(ids: &[&str]) -> ViewState {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Documents;
        state.apply_snapshot(DocumentsSnapshot {
            collection: "orders".to_string(),
            documents: ids
                .iter()
                .map(|id| {
                    crate::firestore::document::Document::from_resource(&json!({
                        "name": format!("projects/p/databases/(default)/documents/orders/{id}"),
                        "fields": {},
                    }))
                    .unwrap()
                })
                .collect(),
            field_names: vec![],
            query_active: false,
        });
        state
    }

    // -- panel switching --

    #[test]
    fn tab_cycles_panels() {
        let mut state = ViewState::default();
        assert_eq!(state.active_panel, PanelId::Connect);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.active_panel, PanelId::Documents);
        handle_key(key(KeyCode::BackTab), &mut state);
        assert_eq!(state.active_panel, PanelId::Connect);
    }

    // -- quit confirmation --

    #[test]
    fn q_enters_confirm_quit_mode() {
        let mut state = ViewState::default();
        let result = handle_key(key(KeyCode::Char('q')), &mut state);
        assert!(result.is_none(), "q should not send Quit immediately");
        assert!(state.confirm_quit);
    }

    #[test]
    fn confirm_quit_y_sends_quit() {
        let mut state = ViewState::default();
        state.confirm_quit = true;
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn confirm_quit_n_cancels_and_blocks_other_keys() {
        let mut state = ViewState::default();
        state.confirm_quit = true;
        assert!(handle_key(key(KeyCode::Char('r')), &mut state).is_none());
        assert!(state.confirm_quit, "other keys are blocked, not applied");
        assert!(handle_key(key(KeyCode::Char('n')), &mut state).is_none());
        assert!(!state.confirm_quit);
    }

    #[test]
    fn ctrl_c_quits_even_while_editing() {
        let mut state = ViewState::default();
        state.editing = true;
        assert_eq!(
            handle_key(ctrl_key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    // -- edit mode --

    #[test]
    fn edit_mode_captures_text() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Connect;
        state.connect_field = 1;
        state.editing = true;
        handle_key(key(KeyCode::Char('u')), &mut state);
        handle_key(key(KeyCode::Char('x')), &mut state);
        handle_key(key(KeyCode::Backspace), &mut state);
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(state.collection_text, "us");
        assert!(state.editing);
        handle_key(key(KeyCode::Enter), &mut state);
        assert!(!state.editing);
        assert_eq!(state.collection_text, "us", "Enter keeps the text");
    }

    #[test]
    fn edit_mode_q_is_text_not_quit() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Auth;
        state.auth_field = 0;
        state.editing = true;
        let result = handle_key(key(KeyCode::Char('q')), &mut state);
        assert!(result.is_none());
        assert_eq!(state.email_text, "q");
        assert!(!state.confirm_quit);
    }

    // -- connect panel --

    #[test]
    fn connect_c_sends_the_form() {
        let mut state = ViewState::default();
        state.config_text = "{}".to_string();
        state.collection_text = "users".to_string();
        let result = handle_key(key(KeyCode::Char('c')), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::Connect {
                config_blob: "{}".to_string(),
                collection: "users".to_string(),
            })
        );
    }

    // -- documents panel --

    #[test]
    fn document_cursor_moves_and_clamps() {
        let mut state = state_with_documents(&["a", "b", "c"]);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.doc_cursor, 2, "cursor stops at the last row");
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.doc_cursor, 1);
    }

    #[test]
    fn space_toggles_selection() {
        let mut state = state_with_documents(&["a", "b"]);
        handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(state.selected_ids(), vec!["a"]);
        handle_key(key(KeyCode::Char(' ')), &mut state);
        assert!(state.selected.is_empty());
    }

    #[test]
    fn select_all_and_none() {
        let mut state = state_with_documents(&["a", "b"]);
        handle_key(key(KeyCode::Char('a')), &mut state);
        assert_eq!(state.selected.len(), 2);
        handle_key(key(KeyCode::Char('n')), &mut state);
        assert!(state.selected.is_empty());
    }

    // -- query panel --

    #[test]
    fn query_add_and_remove_filter_rows() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        handle_key(key(KeyCode::Char('a')), &mut state);
        handle_key(key(KeyCode::Char('a')), &mut state);
        assert_eq!(state.query_form.filters.len(), 2);
        assert_eq!(state.query_cursor, QueryCursor { row: 1, col: 0 });
        handle_key(key(KeyCode::Char('d')), &mut state);
        assert_eq!(state.query_form.filters.len(), 1);
    }

    #[test]
    fn query_operator_and_type_cycle() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        handle_key(key(KeyCode::Char('a')), &mut state);
        handle_key(key(KeyCode::Char('o')), &mut state);
        assert_eq!(state.query_form.filters[0].op, FilterOp::NotEqual);
        handle_key(key(KeyCode::Char('t')), &mut state);
        assert_eq!(state.query_form.filters[0].declared, FieldType::Number);
    }

    #[test]
    fn query_sort_toggle() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(state.query_form.order_direction, SortDirection::Descending);
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(state.query_form.order_direction, SortDirection::Ascending);
    }

    #[test]
    fn query_g_runs_and_x_clears() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        state.query_form.limit_text = "10".to_string();
        let result = handle_key(key(KeyCode::Char('g')), &mut state);
        assert!(matches!(result, Some(UserCommand::RunQuery(form)) if form.limit_text == "10"));

        let result = handle_key(key(KeyCode::Char('x')), &mut state);
        assert_eq!(result, Some(UserCommand::ClearQuery));
        assert!(state.query_form.is_empty());
    }

    #[test]
    fn query_e_loads_the_sample() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        assert!(handle_key(key(KeyCode::Char('e')), &mut state).is_none());
        assert_eq!(state.query_form.filters.len(), 1);
        assert_eq!(state.query_form.filters[0].field, "status");
        assert_eq!(state.query_form.filters[0].value_text, "active");
        assert_eq!(state.query_form.order_field, "createdAt");
        assert_eq!(state.query_form.order_direction, SortDirection::Descending);
        assert_eq!(state.query_form.limit_text, "10");
    }

    #[test]
    fn query_cursor_clamps_per_row() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Query;
        handle_key(key(KeyCode::Char('a')), &mut state);
        // Filter row has 4 columns.
        for _ in 0..6 {
            handle_key(key(KeyCode::Right), &mut state);
        }
        assert_eq!(state.query_cursor.col, 3);
        // Moving down to the order row narrows the cursor to 2 columns.
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.query_cursor, QueryCursor { row: 1, col: 1 });
        // The limit row has a single cell.
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.query_cursor, QueryCursor { row: 2, col: 0 });
    }

    // -- operations panel --

    #[test]
    fn ops_rows_add_remove_and_cycle_type() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Operations;
        handle_key(key(KeyCode::Char('a')), &mut state);
        handle_key(key(KeyCode::Char('A')), &mut state);
        assert_eq!(state.update_rows.len(), 1);
        assert_eq!(state.delete_rows.len(), 1);
        assert_eq!(state.ops_cursor, OpsCursor { row: 1, col: 0 });

        // `t` only cycles on update rows.
        handle_key(key(KeyCode::Char('t')), &mut state);
        handle_key(key(KeyCode::Up), &mut state);
        handle_key(key(KeyCode::Char('t')), &mut state);
        assert_eq!(state.update_rows[0].declared, FieldType::Number);

        handle_key(key(KeyCode::Char('d')), &mut state);
        assert!(state.update_rows.is_empty());
        assert_eq!(state.delete_rows.len(), 1);
    }

    #[test]
    fn ops_u_sends_batch_update_with_selection() {
        let mut state = state_with_documents(&["a", "b"]);
        state.select_all();
        state.active_panel = PanelId::Operations;
        state.update_rows.push(crate::protocol::FieldEditForm {
            field: "status".to_string(),
            value_text: "done".to_string(),
            declared: FieldType::String,
        });
        let result = handle_key(key(KeyCode::Char('u')), &mut state);
        match result {
            Some(UserCommand::BatchUpdate { ids, edits, .. }) => {
                assert_eq!(ids, vec!["a", "b"]);
                assert_eq!(edits.len(), 1);
            }
            other => panic!("expected BatchUpdate, got: {other:?}"),
        }
    }

    #[test]
    fn ops_delete_requires_confirmation() {
        let mut state = state_with_documents(&["a"]);
        state.select_all();
        state.active_panel = PanelId::Operations;

        let result = handle_key(key(KeyCode::Char('D')), &mut state);
        assert!(result.is_none(), "D arms the confirmation modal");
        assert!(state.confirm_delete);

        let result = handle_key(key(KeyCode::Char('y')), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::Delete {
                ids: vec!["a".to_string()]
            })
        );
        assert!(!state.confirm_delete);
    }

    #[test]
    fn ops_delete_confirmation_can_be_cancelled() {
        let mut state = state_with_documents(&["a"]);
        state.select_all();
        state.active_panel = PanelId::Operations;
        handle_key(key(KeyCode::Char('D')), &mut state);
        let result = handle_key(key(KeyCode::Esc), &mut state);
        assert!(result.is_none());
        assert!(!state.confirm_delete);
        assert_eq!(state.selected.len(), 1, "selection survives a cancel");
    }

    #[test]
    fn ops_delete_with_empty_selection_skips_confirmation() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Operations;
        let result = handle_key(key(KeyCode::Char('D')), &mut state);
        assert_eq!(result, Some(UserCommand::Delete { ids: vec![] }));
        assert!(!state.confirm_delete);
    }

    #[test]
    fn ops_y_sends_duplicate() {
        let mut state = state_with_documents(&["a"]);
        state.select_all();
        state.active_panel = PanelId::Operations;
        let result = handle_key(key(KeyCode::Char('y')), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::Duplicate {
                ids: vec!["a".to_string()]
            })
        );
    }

    // -- auth panel --

    #[test]
    fn auth_s_sends_credentials() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Auth;
        state.email_text = "admin@example.com".to_string();
        state.password_text = "secret".to_string();
        let result = handle_key(key(KeyCode::Char('s')), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::SignIn {
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    fn auth_o_signs_out() {
        let mut state = ViewState::default();
        state.active_panel = PanelId::Auth;
        assert_eq!(
            handle_key(key(KeyCode::Char('o')), &mut state),
            Some(UserCommand::SignOut)
        );
    }

    // -- refresh --

    #[test]
    fn r_refreshes_from_any_panel() {
        for panel in [PanelId::Connect, PanelId::Documents, PanelId::Query] {
            let mut state = ViewState::default();
            state.active_panel = panel;
            assert_eq!(
                handle_key(key(KeyCode::Char('r')), &mut state),
                Some(UserCommand::Refresh),
                "r on {panel:?} should refresh"
            );
        }
    }

    // -- KeyEventKind filtering --

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let release_event = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(handle_key(release_event, &mut state).is_none());
        assert!(!state.confirm_quit);
    }
}
