// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI with
// results from spawned network tasks. Holds the connection, the loaded
// documents, the active query, and the auth session, and pushes UI updates
// to the TUI render loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::{AuthClient, AuthSession};
use crate::config::{self, Settings};
use crate::firestore::client::FirestoreClient;
use crate::firestore::document::{self, Document};
use crate::firestore::query::QuerySpec;
use crate::firestore::value::{self, Value};
use crate::protocol::{
    AuthState, BackendEvent, ConnectionStatus, DocumentsSnapshot, FieldEditForm, MutationKind,
    StatusLine, UiUpdate, UserCommand,
};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub settings: Settings,
    /// Firestore client; `None` until a successful connect parses the
    /// config blob.
    pub client: Option<Arc<FirestoreClient>>,
    pub auth_client: Option<Arc<AuthClient>>,
    pub collection: String,
    pub documents: Vec<Document>,
    /// The query currently narrowing the document view, if any. A refresh
    /// re-runs it instead of reloading the whole collection.
    pub active_query: Option<QuerySpec>,
    pub session: Option<AuthSession>,
    pub connection_status: ConnectionStatus,
    pub current_task: Option<tokio::task::JoinHandle<()>>,
    /// Monotonically increasing counter identifying the current network
    /// task. Incremented each time a new task is spawned; events from
    /// stale generations are discarded in `handle_backend_event`.
    pub generation: u64,
    /// Sender for backend events; spawned tasks use a clone of this sender
    /// to report results back to the main event loop.
    pub backend_tx: mpsc::Sender<BackendEvent>,
    firestore_base_url: String,
    auth_base_url: String,
}

impl AppState {
    pub fn new(settings: Settings, backend_tx: mpsc::Sender<BackendEvent>) -> Self {
        Self::with_endpoints(
            settings,
            backend_tx,
            "https://firestore.googleapis.com/v1",
            "https://identitytoolkit.googleapis.com/v1",
        )
    }

    /// Construct against alternate endpoints (tests point these at local
    /// mock servers).
    pub fn with_endpoints(
        settings: Settings,
        backend_tx: mpsc::Sender<BackendEvent>,
        firestore_base_url: &str,
        auth_base_url: &str,
    ) -> Self {
        AppState {
            settings,
            client: None,
            auth_client: None,
            collection: String::new(),
            documents: Vec::new(),
            active_query: None,
            session: None,
            connection_status: ConnectionStatus::Disconnected,
            current_task: None,
            generation: 0,
            backend_tx,
            firestore_base_url: firestore_base_url.to_string(),
            auth_base_url: auth_base_url.to_string(),
        }
    }

    /// Cancel the in-flight network task if one is running.
    pub fn cancel_task(&mut self) {
        if let Some(handle) = self.current_task.take() {
            handle.abort();
            debug!("Cancelled in-flight network task");
        }
    }

    /// Bump the generation counter, cancelling any in-flight task so its
    /// late events are discarded.
    fn next_generation(&mut self) -> u64 {
        self.cancel_task();
        self.generation += 1;
        self.generation
    }

    fn bearer_token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.id_token.clone())
    }

    /// Build the snapshot the TUI applies after a (re)load.
    fn build_snapshot(&self) -> DocumentsSnapshot {
        DocumentsSnapshot {
            collection: self.collection.clone(),
            documents: self.documents.clone(),
            field_names: document::field_names(&self.documents),
            query_active: self.active_query.is_some(),
        }
    }

    /// Spawn a load of the current view: the active query when one is set,
    /// otherwise the plain collection.
    fn spawn_load(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let generation = self.next_generation();
        let collection = self.collection.clone();
        let token = self.bearer_token();
        let spec = self.active_query.clone();
        let tx = self.backend_tx.clone();
        self.current_task = Some(tokio::spawn(async move {
            let result = match &spec {
                Some(spec) => client.run_query(&collection, spec, token.as_deref()).await,
                None => client.list_documents(&collection, token.as_deref()).await,
            };
            let event = match result {
                Ok(documents) => BackendEvent::Loaded {
                    generation,
                    documents,
                    query_active: spec.is_some(),
                },
                Err(e) => BackendEvent::LoadFailed {
                    generation,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event).await;
        }));
    }

    /// Spawn a commit task and report the outcome with the given kind and
    /// success message.
    fn spawn_mutation<F>(&mut self, kind: MutationKind, success_message: String, op: F)
    where
        F: FnOnce(
                Arc<FirestoreClient>,
                String,
                Option<String>,
            ) -> futures_util::future::BoxFuture<
                'static,
                Result<usize, crate::firestore::FirestoreError>,
            > + Send
            + 'static,
    {
        let Some(client) = self.client.clone() else {
            return;
        };
        let generation = self.next_generation();
        let collection = self.collection.clone();
        let token = self.bearer_token();
        let tx = self.backend_tx.clone();
        self.current_task = Some(tokio::spawn(async move {
            let event = match op(client, collection, token).await {
                Ok(_) => BackendEvent::Mutated {
                    generation,
                    kind,
                    message: success_message,
                },
                Err(e) => BackendEvent::MutationFailed {
                    generation,
                    kind,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event).await;
        }));
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Results from spawned network tasks
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut backend_rx: mpsc::Receiver<BackendEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Backend task results ---
            event = backend_rx.recv() => {
                match event {
                    Some(event) => {
                        handle_backend_event(&mut state, event, &ui_tx).await;
                    }
                    None => {
                        info!("Backend channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    // Cleanup
    state.cancel_task();
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handling
// ---------------------------------------------------------------------------

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Connect {
            config_blob,
            collection,
        } => {
            handle_connect(state, &config_blob, &collection, ui_tx).await;
        }

        UserCommand::Refresh => {
            if state.client.is_none() {
                let _ = ui_tx
                    .send(UiUpdate::Status(StatusLine::error("Not connected")))
                    .await;
                return;
            }
            state.spawn_load();
        }

        UserCommand::RunQuery(form) => {
            if state.client.is_none() {
                let _ = ui_tx
                    .send(UiUpdate::Status(StatusLine::error("Not connected")))
                    .await;
                return;
            }
            match QuerySpec::from_form(&form) {
                Ok(spec) => {
                    info!(
                        filters = spec.filters.len(),
                        ordered = spec.order_by.is_some(),
                        "running query"
                    );
                    state.active_query = Some(spec);
                    state.spawn_load();
                }
                Err(e) => {
                    let _ = ui_tx
                        .send(UiUpdate::Status(StatusLine::error(e.to_string())))
                        .await;
                }
            }
        }

        UserCommand::ClearQuery => {
            if state.active_query.take().is_some() {
                info!("query cleared, reloading collection");
                state.spawn_load();
            }
        }

        UserCommand::BatchUpdate {
            ids,
            edits,
            removed_fields,
        } => {
            handle_batch_update(state, ids, edits, removed_fields, ui_tx).await;
        }

        UserCommand::Duplicate { ids } => {
            if !require_session(state, ui_tx).await {
                return;
            }
            if ids.is_empty() {
                let _ = ui_tx
                    .send(UiUpdate::Status(StatusLine::error(
                        "Select documents to duplicate",
                    )))
                    .await;
                return;
            }
            let message = format!("Successfully duplicated {} documents", ids.len());
            state.spawn_mutation(MutationKind::Duplicate, message, move |client, coll, token| {
                Box::pin(async move {
                    client
                        .duplicate_documents(&coll, &ids, token.as_deref())
                        .await
                })
            });
        }

        UserCommand::Delete { ids } => {
            if !require_session(state, ui_tx).await {
                return;
            }
            if ids.is_empty() {
                let _ = ui_tx
                    .send(UiUpdate::Status(StatusLine::error(
                        "Select documents to delete",
                    )))
                    .await;
                return;
            }
            let message = format!("Successfully deleted {} documents", ids.len());
            state.spawn_mutation(MutationKind::Delete, message, move |client, coll, token| {
                Box::pin(async move { client.delete_documents(&coll, &ids, token.as_deref()).await })
            });
        }

        UserCommand::SignIn { email, password } => {
            let Some(auth_client) = state.auth_client.clone() else {
                let _ = ui_tx
                    .send(UiUpdate::Status(StatusLine::error("Not connected")))
                    .await;
                return;
            };
            let generation = state.next_generation();
            let _ = ui_tx.send(UiUpdate::Auth(AuthState::Pending)).await;
            let tx = state.backend_tx.clone();
            state.current_task = Some(tokio::spawn(async move {
                let event = match auth_client.sign_in(&email, &password).await {
                    Ok(session) => BackendEvent::SignedIn {
                        generation,
                        session,
                    },
                    Err(e) => BackendEvent::SignInFailed {
                        generation,
                        message: e.to_string(),
                    },
                };
                let _ = tx.send(event).await;
            }));
        }

        UserCommand::SignOut => {
            state.session = None;
            info!("signed out");
            let _ = ui_tx.send(UiUpdate::Auth(AuthState::SignedOut)).await;
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::info("Signed out")))
                .await;
        }

        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Parse the pasted config blob, build the clients, and load the collection.
async fn handle_connect(
    state: &mut AppState,
    config_blob: &str,
    collection: &str,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if config_blob.trim().is_empty() || collection.trim().is_empty() {
        let _ = ui_tx
            .send(UiUpdate::Status(StatusLine::error(
                "Please provide both Firebase config and collection name",
            )))
            .await;
        return;
    }

    let project_config = match config::parse_project_config(config_blob) {
        Ok(c) => c,
        Err(e) => {
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(e.to_string())))
                .await;
            return;
        }
    };

    let client = match FirestoreClient::with_base_url(&project_config, &state.firestore_base_url) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(format!("Error: {e}"))))
                .await;
            return;
        }
    };

    info!(project_id = client.project_id(), collection, "connecting");
    state.auth_client = Some(Arc::new(AuthClient::with_base_url(
        &project_config.api_key,
        &state.auth_base_url,
    )));
    state.client = Some(client.clone());
    state.collection = collection.trim().to_string();
    state.active_query = None;
    state.connection_status = ConnectionStatus::Connecting;
    let _ = ui_tx
        .send(UiUpdate::ConnectionStatus(ConnectionStatus::Connecting))
        .await;

    let generation = state.next_generation();
    let coll = state.collection.clone();
    let token = state.bearer_token();
    let tx = state.backend_tx.clone();
    state.current_task = Some(tokio::spawn(async move {
        let event = match client.list_documents(&coll, token.as_deref()).await {
            Ok(documents) => BackendEvent::Connected {
                generation,
                collection: coll,
                documents,
            },
            Err(e) => BackendEvent::ConnectFailed {
                generation,
                message: e.to_string(),
            },
        };
        let _ = tx.send(event).await;
    }));
}

/// Validate and coerce the batch-update form, then spawn the commit.
async fn handle_batch_update(
    state: &mut AppState,
    ids: Vec<String>,
    edits: Vec<FieldEditForm>,
    removed_fields: Vec<String>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if !require_session(state, ui_tx).await {
        return;
    }
    if ids.is_empty() || (edits.is_empty() && removed_fields.is_empty()) {
        let _ = ui_tx
            .send(UiUpdate::Status(StatusLine::error(
                "Select documents and specify fields to update or delete",
            )))
            .await;
        return;
    }

    let coerced = match coerce_edits(&edits) {
        Ok(c) => c,
        Err(e) => {
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(e.to_string())))
                .await;
            return;
        }
    };
    let removed: Vec<String> = removed_fields
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    if coerced.is_empty() && removed.is_empty() {
        let _ = ui_tx
            .send(UiUpdate::Status(StatusLine::error(
                "No valid update or delete fields provided",
            )))
            .await;
        return;
    }

    let message = update_success_message(ids.len(), coerced.len(), removed.len());
    state.spawn_mutation(MutationKind::Update, message, move |client, coll, token| {
        Box::pin(async move {
            client
                .batch_update(&coll, &ids, &coerced, &removed, token.as_deref())
                .await
        })
    });
}

/// Coerce each filled form row to its declared type. Rows with a blank
/// field name are skipped.
fn coerce_edits(edits: &[FieldEditForm]) -> Result<Vec<(String, Value)>, value::CoerceError> {
    edits
        .iter()
        .filter(|edit| !edit.field.trim().is_empty())
        .map(|edit| {
            value::coerce(&edit.value_text, edit.declared)
                .map(|v| (edit.field.trim().to_string(), v))
        })
        .collect()
}

fn update_success_message(doc_count: usize, updated: usize, deleted: usize) -> String {
    if updated > 0 && deleted > 0 {
        format!(
            "Successfully updated {doc_count} documents ({updated} fields updated, {deleted} fields deleted)"
        )
    } else if deleted > 0 {
        format!("Successfully updated {doc_count} documents ({deleted} fields deleted)")
    } else {
        format!("Successfully updated {doc_count} documents ({updated} fields updated)")
    }
}

/// Write operations require a signed-in session. Reports the refusal to
/// the status bar and returns `false` when there is none.
async fn require_session(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> bool {
    if state.session.is_some() {
        return true;
    }
    warn!("write operation refused: not signed in");
    let _ = ui_tx
        .send(UiUpdate::Status(StatusLine::error(
            "Sign in to run write operations",
        )))
        .await;
    false
}

// ---------------------------------------------------------------------------
// Backend event handling
// ---------------------------------------------------------------------------

/// Handle a result from a spawned network task.
///
/// **Generation check**: every event carries the generation counter set
/// when its task was spawned. If it doesn't match `state.generation`, the
/// event is from a cancelled task and is discarded.
async fn handle_backend_event(
    state: &mut AppState,
    event: BackendEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if event.generation() != state.generation {
        debug!(
            event_generation = event.generation(),
            current_generation = state.generation,
            "Discarding stale backend event"
        );
        return;
    }

    match event {
        BackendEvent::Connected {
            collection,
            documents,
            ..
        } => {
            info!(collection, count = documents.len(), "connected");
            state.connection_status = ConnectionStatus::Connected;
            state.documents = documents;
            let _ = ui_tx
                .send(UiUpdate::ConnectionStatus(ConnectionStatus::Connected))
                .await;
            let _ = ui_tx
                .send(UiUpdate::Documents(Box::new(state.build_snapshot())))
                .await;
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::success(format!(
                    "Successfully connected and loaded {} documents from \"{}\"",
                    state.documents.len(),
                    collection
                ))))
                .await;
        }

        BackendEvent::ConnectFailed { message, .. } => {
            warn!(message, "connect failed");
            state.connection_status = ConnectionStatus::Disconnected;
            state.client = None;
            state.auth_client = None;
            let _ = ui_tx
                .send(UiUpdate::ConnectionStatus(ConnectionStatus::Disconnected))
                .await;
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(format!(
                    "Error: {message}"
                ))))
                .await;
        }

        BackendEvent::Loaded {
            documents,
            query_active,
            ..
        } => {
            state.documents = documents;
            let _ = ui_tx
                .send(UiUpdate::Documents(Box::new(state.build_snapshot())))
                .await;
            let status = if query_active {
                StatusLine::info(format!(
                    "Query returned {} documents",
                    state.documents.len()
                ))
            } else {
                StatusLine::info(format!(
                    "Loaded {} documents from \"{}\"",
                    state.documents.len(),
                    state.collection
                ))
            };
            let _ = ui_tx.send(UiUpdate::Status(status)).await;
        }

        BackendEvent::LoadFailed { message, .. } => {
            warn!(message, "load failed");
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(format!(
                    "Error: {message}"
                ))))
                .await;
        }

        BackendEvent::Mutated { kind, message, .. } => {
            info!(?kind, "mutation committed");
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::success(message)))
                .await;
            // Selection and pending forms survive a failure but are cleared
            // after a successful commit.
            let _ = ui_tx.send(UiUpdate::SelectionCleared).await;
            state.spawn_load();
        }

        BackendEvent::MutationFailed { kind, message, .. } => {
            warn!(?kind, message, "mutation failed");
            let prefix = match kind {
                MutationKind::Update => "Update failed",
                MutationKind::Duplicate => "Duplication failed",
                MutationKind::Delete => "Deletion failed",
            };
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(format!(
                    "{prefix}: {message}"
                ))))
                .await;
        }

        BackendEvent::SignedIn { session, .. } => {
            let email = session.email.clone();
            state.session = Some(session);
            let _ = ui_tx
                .send(UiUpdate::Auth(AuthState::SignedIn {
                    email: email.clone(),
                }))
                .await;
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::success(format!(
                    "Signed in as {email}"
                ))))
                .await;
        }

        BackendEvent::SignInFailed { message, .. } => {
            let _ = ui_tx.send(UiUpdate::Auth(AuthState::SignedOut)).await;
            let _ = ui_tx
                .send(UiUpdate::Status(StatusLine::error(message)))
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
