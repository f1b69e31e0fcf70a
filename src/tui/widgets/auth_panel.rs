// Auth panel: email/password sign-in form and session line.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::firestore::value::truncate_cell;
use crate::protocol::{AuthState, PanelId};
use crate::tui::ViewState;

use super::{cell_style, panel_block};

/// Render the auth form into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = panel_block(state, PanelId::Auth);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = state.active_panel == PanelId::Auth;
    let width = inner.width.saturating_sub(11) as usize;

    let lines = vec![
        Line::from(vec![
            Span::styled("Email:    ", Style::default().fg(Color::Gray)),
            Span::styled(
                field_text(&state.email_text, width),
                cell_style(focused && state.auth_field == 0, state.editing),
            ),
        ]),
        Line::from(vec![
            Span::styled("Password: ", Style::default().fg(Color::Gray)),
            Span::styled(
                masked(&state.password_text),
                cell_style(focused && state.auth_field == 1, state.editing),
            ),
        ]),
        session_line(&state.auth),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the password as dots, never the typed characters.
pub fn masked(password: &str) -> String {
    if password.is_empty() {
        "<empty>".to_string()
    } else {
        "•".repeat(password.chars().count())
    }
}

fn field_text(text: &str, width: usize) -> String {
    if text.is_empty() {
        "<empty>".to_string()
    } else {
        truncate_cell(text, width.max(8))
    }
}

fn session_line(auth: &AuthState) -> Line<'static> {
    match auth {
        AuthState::SignedOut => Line::from(Span::styled(
            "not signed in",
            Style::default().fg(Color::DarkGray),
        )),
        AuthState::Pending => Line::from(Span::styled(
            "signing in...",
            Style::default().fg(Color::Yellow),
        )),
        AuthState::SignedIn { email } => Line::from(Span::styled(
            format!("signed in as {email}"),
            Style::default().fg(Color::Green),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_hides_the_password() {
        assert_eq!(masked(""), "<empty>");
        let m = masked("hunter2");
        assert_eq!(m.chars().count(), 7);
        assert!(!m.contains('h'));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(50, 6);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_when_signed_in() {
        let backend = ratatui::backend::TestBackend::new(50, 6);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.active_panel = PanelId::Auth;
        state.email_text = "admin@example.com".to_string();
        state.password_text = "secret".to_string();
        state.auth = AuthState::SignedIn {
            email: "admin@example.com".to_string(),
        };
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
