// Status bar widget: connection indicator, collection, session, last message.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{AuthState, ConnectionStatus, StatusKind};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [connection dot] [collection] [auth] | [last status message]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = connection_indicator(state.connection_status);
    spans.push(Span::styled(
        format!(" {} ", dot),
        Style::default().fg(dot_color),
    ));

    if state.collection.is_empty() {
        spans.push(Span::styled(
            "no collection",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            format!("{} ({})", state.collection, state.documents.len()),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        if state.query_active {
            spans.push(Span::styled(
                " [query]",
                Style::default().fg(Color::Yellow),
            ));
        }
        if !state.selected.is_empty() {
            spans.push(Span::styled(
                format!(" {} selected", state.selected.len()),
                Style::default().fg(Color::Cyan),
            ));
        }
    }

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        auth_label(&state.auth),
        Style::default().fg(auth_color(&state.auth)),
    ));

    if let Some(line) = &state.status {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            line.text.clone(),
            Style::default().fg(status_color(line.kind)),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the connection dot character and its color.
pub fn connection_indicator(status: ConnectionStatus) -> (&'static str, Color) {
    match status {
        ConnectionStatus::Connected => ("●", Color::Green),
        ConnectionStatus::Connecting => ("●", Color::Yellow),
        ConnectionStatus::Disconnected => ("●", Color::Red),
    }
}

pub fn auth_label(auth: &AuthState) -> String {
    match auth {
        AuthState::SignedOut => "signed out".to_string(),
        AuthState::Pending => "signing in...".to_string(),
        AuthState::SignedIn { email } => email.clone(),
    }
}

fn auth_color(auth: &AuthState) -> Color {
    match auth {
        AuthState::SignedOut => Color::DarkGray,
        AuthState::Pending => Color::Yellow,
        AuthState::SignedIn { .. } => Color::Green,
    }
}

fn status_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Info => Color::White,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StatusLine;

    #[test]
    fn connection_indicator_colors() {
        assert_eq!(
            connection_indicator(ConnectionStatus::Connected),
            ("●", Color::Green)
        );
        assert_eq!(
            connection_indicator(ConnectionStatus::Connecting),
            ("●", Color::Yellow)
        );
        assert_eq!(
            connection_indicator(ConnectionStatus::Disconnected),
            ("●", Color::Red)
        );
    }

    #[test]
    fn auth_label_shows_the_email_when_signed_in() {
        assert_eq!(auth_label(&AuthState::SignedOut), "signed out");
        assert_eq!(
            auth_label(&AuthState::SignedIn {
                email: "admin@example.com".to_string()
            }),
            "admin@example.com"
        );
    }

    #[test]
    fn status_colors_track_severity() {
        assert_eq!(status_color(StatusKind::Error), Color::Red);
        assert_eq!(status_color(StatusKind::Success), Color::Green);
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(120, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_when_connected() {
        let backend = ratatui::backend::TestBackend::new(120, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.connection_status = ConnectionStatus::Connected;
        state.collection = "orders".to_string();
        state.query_active = true;
        state.selected.insert("a".to_string());
        state.status = Some(StatusLine::success("Loaded 3 documents from \"orders\""));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
