// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the console:
//
// +---------------------------------------------------+
// | Status Bar (1 row)                                 |
// +---------------------------+-----------------------+
// | Documents (60%)           | Sidebar (40%)         |
// |                           | +- Connect (8) ------+|
// |                           | +- Query (fill) -----+|
// |                           | +- Operations (fill)-+|
// |                           | +- Auth (6) ---------+|
// +---------------------------+-----------------------+
// | Help Bar (1 row)                                   |
// +---------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each console zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: connection indicator, collection name, panel bar.
    pub status_bar: Rect,
    /// Left side: the document table with selection marks.
    pub documents: Rect,
    /// Sidebar top: config blob + collection name form.
    pub connect: Rect,
    /// Sidebar second: filter/order/limit query builder.
    pub query: Rect,
    /// Sidebar third: batch update/duplicate/delete console.
    pub operations: Rect,
    /// Sidebar bottom: sign-in form and session line.
    pub auth: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the console layout from the available terminal area.
///
/// Fixed heights for the status bar, help bar, and the two fixed-size
/// sidebar forms; the query and operations consoles split the remaining
/// sidebar space.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(12),
            Constraint::Length(1),
        ])
        .split(area);

    let status_bar = vertical[0];
    let middle = vertical[1];
    let help_bar = vertical[2];

    // Horizontal: documents (60%) | sidebar (40%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(middle);

    let documents = horizontal[0];
    let sidebar = horizontal[1];

    // Sidebar vertical: connect (8) | query (fill) | operations (fill) | auth (6)
    let sidebar_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(6),
            Constraint::Min(6),
            Constraint::Length(6),
        ])
        .split(sidebar);

    AppLayout {
        status_bar,
        documents,
        connect: sidebar_sections[0],
        query: sidebar_sections[1],
        operations: sidebar_sections[2],
        auth: sidebar_sections[3],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// A reasonable terminal size for testing.
    fn test_area() -> Rect {
        Rect::new(0, 0, 160, 50)
    }

    fn all_rects(layout: &AppLayout) -> [(&'static str, Rect); 7] {
        [
            ("status_bar", layout.status_bar),
            ("documents", layout.documents),
            ("connect", layout.connect),
            ("query", layout.query),
            ("operations", layout.operations),
            ("auth", layout.auth),
            ("help_bar", layout.help_bar),
        ]
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for (name, rect) in &all_rects(&layout) {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_bars_are_one_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_documents_wider_than_sidebar() {
        let layout = build_layout(test_area());
        assert!(layout.documents.width > layout.connect.width);
    }

    #[test]
    fn layout_sidebar_sections_stack_vertically() {
        let layout = build_layout(test_area());
        assert!(layout.connect.y < layout.query.y);
        assert!(layout.query.y < layout.operations.y);
        assert!(layout.operations.y < layout.auth.y);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for (name, rect) in &all_rects(&layout) {
            assert!(
                rect.x + rect.width <= area.width && rect.y + rect.height <= area.height,
                "{} exceeds the terminal area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_small_terminal_still_valid() {
        let layout = build_layout(Rect::new(0, 0, 60, 24));
        for (name, rect) in &all_rects(&layout) {
            assert!(
                rect.width > 0 && rect.height > 0,
                "small terminal: {} has zero area",
                name
            );
        }
    }
}
