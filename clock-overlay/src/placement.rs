//! Where the overlay sits on screen.
//!
//! In [`PlacementMode::Default`] the overlay is pinned near the top-right
//! corner of its screen. Once the user drags it, it switches to
//! [`PlacementMode::Manual`] and stays where it was dropped, only ever being
//! clamped back inside the screen bounds.

use crate::geometry::{Point, Rect, Size};

/// Gap between the overlay's right edge and the screen's right edge.
pub const RIGHT_MARGIN: i32 = 150;
pub const TOP_MARGIN: i32 = 0;

/// Used when the host reports no screens at all.
pub const FALLBACK_SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Default,
    Manual,
}

pub fn default_location(screen: Rect, window: Size) -> Point {
    Point::new(screen.right() - window.width - RIGHT_MARGIN, screen.top() + TOP_MARGIN)
}

/// Clamp each axis into `[screen min, screen max - window dimension]`.
///
/// A window larger than the screen on some axis is pinned to that axis'
/// minimum edge.
pub fn clamp_location(location: Point, screen: Rect, window: Size) -> Point {
    Point::new(
        clamp_axis(location.x, screen.left(), screen.right() - window.width),
        clamp_axis(location.y, screen.top(), screen.bottom() - window.height),
    )
}

fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    if max < min {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Screen containing `point`, or the nearest one when it lies on none.
pub fn screen_for_point(screens: &[Rect], point: Point) -> Option<Rect> {
    screens
        .iter()
        .find(|screen| screen.contains(point))
        .or_else(|| screens.iter().min_by_key(|screen| screen.distance_squared(point)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);
    const WINDOW: Size = Size::new(200, 60);

    #[test]
    fn default_location_is_offset_from_top_right() {
        assert_eq!(default_location(SCREEN, WINDOW), Point::new(1570, 0));
    }

    #[test]
    fn default_location_follows_secondary_screen() {
        let right = Rect::new(1920, -200, 2560, 1440);
        assert_eq!(default_location(right, WINDOW), Point::new(1920 + 2560 - 200 - 150, -200));
    }

    #[test]
    fn clamp_pulls_each_axis_inside() {
        assert_eq!(clamp_location(Point::new(-50, 2000), SCREEN, WINDOW), Point::new(0, 1020));
        assert_eq!(clamp_location(Point::new(5000, -10), SCREEN, WINDOW), Point::new(1720, 0));
    }

    #[test]
    fn clamp_leaves_inside_location_alone() {
        let inside = Point::new(640, 480);
        assert_eq!(clamp_location(inside, SCREEN, WINDOW), inside);
    }

    #[test]
    fn clamp_pins_oversized_window_to_screen_origin() {
        let tiny = Rect::new(100, 100, 150, 40);
        assert_eq!(clamp_location(Point::new(300, 300), tiny, WINDOW), Point::new(100, 100));
    }

    #[test]
    fn screen_lookup_prefers_containing_screen() {
        let screens = [SCREEN, Rect::new(1920, 0, 1280, 1024)];
        assert_eq!(screen_for_point(&screens, Point::new(2000, 500)), Some(screens[1]));
        assert_eq!(screen_for_point(&screens, Point::new(10, 10)), Some(screens[0]));
    }

    #[test]
    fn screen_lookup_falls_back_to_nearest() {
        let screens = [SCREEN, Rect::new(1920, 0, 1280, 1024)];
        assert_eq!(screen_for_point(&screens, Point::new(3300, 100)), Some(screens[1]));
        assert_eq!(screen_for_point(&screens, Point::new(-40, 2000)), Some(screens[0]));
        assert_eq!(screen_for_point(&[], Point::new(0, 0)), None);
    }
}
