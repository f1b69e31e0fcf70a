// Message types shared between the TUI and the orchestration loop.
//
// Three channels connect the halves of the app:
//   UserCommand  (TUI -> app)      intents raised by key handling
//   BackendEvent (tasks -> app)    results of spawned network tasks
//   UiUpdate     (app -> TUI)      state deltas the render loop applies

use crate::auth::AuthSession;
use crate::firestore::document::Document;
use crate::firestore::query::QueryForm;
use crate::firestore::value::FieldType;

// ---------------------------------------------------------------------------
// User commands (TUI -> app)
// ---------------------------------------------------------------------------

/// One row of the batch-update form: a field name, the raw text the
/// operator typed, and the type it should be coerced to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEditForm {
    pub field: String,
    pub value_text: String,
    pub declared: FieldType,
}

impl Default for FieldEditForm {
    fn default() -> Self {
        FieldEditForm {
            field: String::new(),
            value_text: String::new(),
            declared: FieldType::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Parse the pasted config blob and load the named collection.
    Connect {
        config_blob: String,
        collection: String,
    },
    /// Re-fetch the current view (active query if one is set, otherwise the
    /// plain collection).
    Refresh,
    /// Run the query built in the query console.
    RunQuery(QueryForm),
    /// Drop the active query and reload the full collection.
    ClearQuery,
    /// Apply field edits and field deletions to the selected documents.
    BatchUpdate {
        ids: Vec<String>,
        edits: Vec<FieldEditForm>,
        removed_fields: Vec<String>,
    },
    /// Copy the selected documents under fresh identifiers.
    Duplicate { ids: Vec<String> },
    /// Delete the selected documents.
    Delete { ids: Vec<String> },
    SignIn { email: String, password: String },
    SignOut,
    Quit,
}

// ---------------------------------------------------------------------------
// Backend events (spawned tasks -> app)
// ---------------------------------------------------------------------------

/// Which write operation a mutation event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Update,
    Duplicate,
    Delete,
}

/// Events from spawned network tasks. Every variant carries the generation
/// the task was spawned with; the app discards events whose generation no
/// longer matches.
#[derive(Debug)]
pub enum BackendEvent {
    Connected {
        generation: u64,
        collection: String,
        documents: Vec<Document>,
    },
    ConnectFailed {
        generation: u64,
        message: String,
    },
    Loaded {
        generation: u64,
        documents: Vec<Document>,
        query_active: bool,
    },
    LoadFailed {
        generation: u64,
        message: String,
    },
    Mutated {
        generation: u64,
        kind: MutationKind,
        message: String,
    },
    MutationFailed {
        generation: u64,
        kind: MutationKind,
        message: String,
    },
    SignedIn {
        generation: u64,
        session: AuthSession,
    },
    SignInFailed {
        generation: u64,
        message: String,
    },
}

impl BackendEvent {
    pub fn generation(&self) -> u64 {
        match self {
            BackendEvent::Connected { generation, .. }
            | BackendEvent::ConnectFailed { generation, .. }
            | BackendEvent::Loaded { generation, .. }
            | BackendEvent::LoadFailed { generation, .. }
            | BackendEvent::Mutated { generation, .. }
            | BackendEvent::MutationFailed { generation, .. }
            | BackendEvent::SignedIn { generation, .. }
            | BackendEvent::SignInFailed { generation, .. } => *generation,
        }
    }
}

// ---------------------------------------------------------------------------
// UI updates (app -> TUI)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Auth panel state as the TUI renders it.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedOut,
    Pending,
    SignedIn { email: String },
}

/// Severity of a status-bar message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        StatusLine { text: text.into(), kind: StatusKind::Info }
    }

    pub fn success(text: impl Into<String>) -> Self {
        StatusLine { text: text.into(), kind: StatusKind::Success }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusLine { text: text.into(), kind: StatusKind::Error }
    }
}

/// Everything the document table and the field dropdowns need after a
/// (re)load, applied by the TUI in one shot.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentsSnapshot {
    pub collection: String,
    pub documents: Vec<Document>,
    /// Sorted union of field names across the loaded documents.
    pub field_names: Vec<String>,
    /// True when the snapshot came from a query rather than a full load.
    pub query_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    ConnectionStatus(ConnectionStatus),
    Documents(Box<DocumentsSnapshot>),
    Status(StatusLine),
    Auth(AuthState),
    /// Mutation succeeded; the TUI clears its selection and pending forms.
    SelectionCleared,
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// The focusable panels, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    Connect,
    Documents,
    Query,
    Operations,
    Auth,
}

impl PanelId {
    pub fn label(&self) -> &'static str {
        match self {
            PanelId::Connect => "Connect",
            PanelId::Documents => "Documents",
            PanelId::Query => "Query",
            PanelId::Operations => "Operations",
            PanelId::Auth => "Auth",
        }
    }

    pub fn next(&self) -> PanelId {
        match self {
            PanelId::Connect => PanelId::Documents,
            PanelId::Documents => PanelId::Query,
            PanelId::Query => PanelId::Operations,
            PanelId::Operations => PanelId::Auth,
            PanelId::Auth => PanelId::Connect,
        }
    }

    pub fn prev(&self) -> PanelId {
        match self {
            PanelId::Connect => PanelId::Auth,
            PanelId::Documents => PanelId::Connect,
            PanelId::Query => PanelId::Documents,
            PanelId::Operations => PanelId::Query,
            PanelId::Auth => PanelId::Operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_order_is_a_cycle() {
        let mut panel = PanelId::Connect;
        for _ in 0..5 {
            panel = panel.next();
        }
        assert_eq!(panel, PanelId::Connect);

        assert_eq!(PanelId::Connect.prev(), PanelId::Auth);
        assert_eq!(PanelId::Auth.next(), PanelId::Connect);
        // prev is the inverse of next, so each round trip advances one panel.
        let mut panel = PanelId::Query;
        for _ in 0..3 {
            panel = panel.next().prev().next();
        }
        assert_eq!(panel, PanelId::Connect);
    }

    #[test]
    fn backend_events_expose_their_generation() {
        let event = BackendEvent::LoadFailed {
            generation: 7,
            message: "boom".to_string(),
        };
        assert_eq!(event.generation(), 7);
        let event = BackendEvent::Mutated {
            generation: 3,
            kind: MutationKind::Delete,
            message: "Successfully deleted 2 documents".to_string(),
        };
        assert_eq!(event.generation(), 3);
    }
}
