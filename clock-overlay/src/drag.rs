use crate::geometry::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    Idle,
    Dragging { cursor: Point, window: Point },
}

/// Left-button drag of the overlay window.
///
/// Positions are absolute screen coordinates. The window follows the cursor
/// by the raw cursor delta since the press.
#[derive(Debug, Clone, Default)]
pub struct DragGesture {
    state: DragState,
}

impl DragGesture {
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Record the anchor for a new drag.
    pub fn begin(&mut self, cursor: Point, window: Point) {
        self.state = DragState::Dragging { cursor, window };
    }

    /// Window location for the current cursor, or `None` when idle.
    pub fn follow(&self, cursor: Point) -> Option<Point> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging {
                cursor: anchor,
                window,
            } => Some(window.offset(cursor.x - anchor.x, cursor.y - anchor.y)),
        }
    }

    /// End the drag. Returns whether one was in progress.
    pub fn finish(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_cursor_delta() {
        let mut drag = DragGesture::default();
        drag.begin(Point::new(500, 500), Point::new(100, 100));
        assert_eq!(drag.follow(Point::new(520, 480)), Some(Point::new(120, 80)));
        assert_eq!(drag.follow(Point::new(400, 700)), Some(Point::new(0, 300)));
    }

    #[test]
    fn motion_while_idle_is_ignored() {
        let drag = DragGesture::default();
        assert!(!drag.is_dragging());
        assert_eq!(drag.follow(Point::new(10, 10)), None);
    }

    #[test]
    fn finish_reports_whether_dragging() {
        let mut drag = DragGesture::default();
        assert!(!drag.finish());
        drag.begin(Point::default(), Point::default());
        assert!(drag.finish());
        assert!(!drag.is_dragging());
        assert_eq!(drag.follow(Point::new(5, 5)), None);
    }
}
