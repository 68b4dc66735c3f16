/// An input event sent by the host to the shim for handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A new pointer (finger, or a mouse button standing in for one) went
    /// down at the given coordinates.
    PointerPressed(PointerId, f32, f32),
    /// A pointer that is currently down moved to the given coordinates.
    PointerMoved(PointerId, f32, f32),
    /// A pointer was lifted at the given coordinates.
    PointerReleased(PointerId, f32, f32),
    /// A pointer's gesture was taken over by the host (e.g. the window lost
    /// the touch stream). Handled like a release, but without a position and
    /// without triggering anything that requires an intentional release.
    PointerCancelled(PointerId),
    /// The drawable area changed to the given size. The shim should re-derive
    /// any layout it has computed from [`crate::Platform::draw_area`].
    Resized(f32, f32),
    /// The window lost input focus (the host-side analogue of the activity
    /// being paused).
    FocusLost,
}

/// A specific pointer taking part in a multi-touch gesture.
///
/// Identifiers are only meaningful while the pointer is down: the host may
/// recycle them between gestures, but never between two pointers that are
/// down at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerId(i64);

impl PointerId {
    /// Creates a new [`PointerId`]. Should only be created in the host
    /// implementation, which also knows how the inner value is going to be
    /// used.
    pub fn new(id: i64) -> PointerId {
        PointerId(id)
    }

    /// Returns the inner value passed into [`PointerId::new`]. Generally only
    /// relevant to the host implementation.
    pub fn inner(self) -> i64 {
        self.0
    }
}
