// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The on-screen touch controls for the embedded space-combat engine: a
//! radial analog stick that streams a normalized vector to the engine at
//! display-refresh cadence, a grid of key-bound and macro buttons, and the
//! three-state visibility cycle over them.
//!
//! Everything in here is synchronous, single-threaded state driven by
//! [`platform::Event`]s and a once-per-frame tick; the engine is only ever
//! reached through [`platform::EngineBridge`], and the window system only
//! through [`platform::Platform`]. That keeps the whole crate runnable under
//! the recording fakes in `test_support`, which is where the input-ordering
//! guarantees (button pairing, stick session bracketing) are pinned down.

#![warn(missing_docs)]

mod buttons;
mod geom;
mod stick;
#[cfg(test)]
mod test_support;
mod visibility;

use platform::{EngineBridge, Event, Platform};

pub use buttons::{spec, Binding, ButtonGrid, ButtonId, ButtonSpec, Group, Release, BUTTONS};
pub use geom::Rect;
pub use stick::{RadialStick, StickConfig};
pub use visibility::OverlayVisibility;

/// Overlay tunables carried over from the launch options.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlayConfig {
    /// Stick behavior; see [`StickConfig`].
    pub stick: StickConfig,
}

/// The whole overlay: stick, button grid, and the visibility state that
/// decides which of them can currently be seen and touched.
pub struct Overlay {
    visibility: OverlayVisibility,
    grid: ButtonGrid,
    stick: RadialStick,
    size: (f32, f32),
}

impl Overlay {
    /// Creates the overlay, laid out for the platform's current draw area.
    pub fn new(config: OverlayConfig, platform: &dyn Platform) -> Overlay {
        let mut overlay = Overlay {
            visibility: OverlayVisibility::default(),
            grid: ButtonGrid::new(),
            stick: RadialStick::new(config.stick),
            size: (0.0, 0.0),
        };
        let (w, h) = platform.draw_area();
        overlay.layout(w, h);
        overlay
    }

    /// The current visibility state.
    pub fn visibility(&self) -> OverlayVisibility {
        self.visibility
    }

    /// Handles one input event. Returns true if the overlay consumed it;
    /// unconsumed events belong to whatever is underneath.
    pub fn handle_event(
        &mut self,
        event: Event,
        platform: &dyn Platform,
        bridge: &dyn EngineBridge,
    ) -> bool {
        match event {
            Event::PointerPressed(pointer, x, y) => {
                if self.visibility.joystick_visible()
                    && self.stick.frame().contains(x, y)
                    && self.stick.pointer_down(pointer, x, y, platform, bridge)
                {
                    return true;
                }
                if let Some(id) = self.grid.hit_test(self.visibility, x, y, self.size) {
                    self.grid.pointer_down(id, pointer, bridge);
                    return true;
                }
                false
            }
            Event::PointerMoved(pointer, x, y) => {
                // Buttons don't track movement, only the stick does.
                if self.stick.owns(pointer) {
                    return self.stick.pointer_move(pointer, x, y);
                }
                false
            }
            Event::PointerReleased(pointer, x, y) => {
                if self.stick.owns(pointer) {
                    return self.stick.pointer_up(pointer, bridge);
                }
                match self
                    .grid
                    .pointer_up(pointer, x, y, self.size, platform, bridge)
                {
                    Some(release) => {
                        if release.id == ButtonId::Toggle && release.clicked {
                            self.set_visibility(self.visibility.toggled(), bridge);
                        }
                        true
                    }
                    None => false,
                }
            }
            Event::PointerCancelled(pointer) => {
                if self.stick.owns(pointer) {
                    return self.stick.pointer_cancel(pointer, bridge);
                }
                self.grid.pointer_cancel(pointer, bridge)
            }
            Event::Resized(w, h) => {
                self.layout(w, h);
                false
            }
            Event::FocusLost => false,
        }
    }

    /// Runs one frame: publishes the stick vector if a session is active,
    /// then draws the visible controls.
    pub fn run_frame(&mut self, platform: &dyn Platform, bridge: &dyn EngineBridge) {
        self.stick.tick(bridge);
        self.grid.render(self.visibility, self.size, platform);
        if self.visibility.joystick_visible() {
            self.stick.render(platform);
        }
    }

    /// Tears the overlay down mid-whatever: ends any in-flight stick
    /// session, releases any held buttons, and revokes running macros, so
    /// the bridge is left with everything paired and nothing streaming.
    pub fn detach(&mut self, bridge: &dyn EngineBridge) {
        self.stick.cancel_session(bridge);
        self.grid.release_all(bridge);
        bridge.cancel_macros();
    }

    fn set_visibility(&mut self, next: OverlayVisibility, bridge: &dyn EngineBridge) {
        if !next.joystick_visible() {
            self.stick.cancel_session(bridge);
        }
        self.grid.cancel_hidden(next, bridge);
        self.visibility = next;
    }

    fn layout(&mut self, w: f32, h: f32) {
        self.size = (w, h);
        // The stick gets a square frame in the bottom-left corner, sized
        // from the display height.
        let side = 0.45 * h;
        self.stick
            .set_frame(Rect::xywh(0.02 * w, h - side - 0.03 * h, side, side));
    }
}

#[cfg(test)]
mod tests {
    use platform::{Event, Platform, PointerId};

    use crate::test_support::{BridgeCall, RecordingBridge, TestPlatform};

    use super::{spec, ButtonId, Overlay, OverlayConfig, OverlayVisibility};

    fn overlay(platform: &TestPlatform) -> Overlay {
        Overlay::new(OverlayConfig::default(), platform)
    }

    fn tap(
        overlay: &mut Overlay,
        platform: &TestPlatform,
        bridge: &RecordingBridge,
        pointer: i64,
        (x, y): (f32, f32),
    ) {
        overlay.handle_event(Event::PointerPressed(PointerId::new(pointer), x, y), platform, bridge);
        overlay.handle_event(Event::PointerReleased(PointerId::new(pointer), x, y), platform, bridge);
    }

    fn toggle_center(platform: &TestPlatform) -> (f32, f32) {
        spec(ButtonId::Toggle).rect(platform.draw_area()).center()
    }

    #[test]
    fn toggle_cycles_hidden_topbar_joystick_hidden() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);
        let center = toggle_center(&platform);

        assert_eq!(overlay.visibility(), OverlayVisibility::Hidden);
        tap(&mut overlay, &platform, &bridge, 1, center);
        assert_eq!(overlay.visibility(), OverlayVisibility::TopBar);
        tap(&mut overlay, &platform, &bridge, 1, center);
        assert_eq!(overlay.visibility(), OverlayVisibility::Joystick);
        tap(&mut overlay, &platform, &bridge, 1, center);
        assert_eq!(overlay.visibility(), OverlayVisibility::Hidden);
    }

    #[test]
    fn hidden_overlay_passes_touches_through() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);
        let esc = spec(ButtonId::Esc).rect(platform.draw_area()).center();

        let consumed = overlay.handle_event(
            Event::PointerPressed(PointerId::new(1), esc.0, esc.1),
            &platform,
            &bridge,
        );
        assert!(!consumed);
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn top_bar_button_pairs_through_the_event_path() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);

        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        bridge.clear();

        let esc = spec(ButtonId::Esc).rect(platform.draw_area()).center();
        overlay.handle_event(Event::PointerPressed(PointerId::new(2), esc.0, esc.1), &platform, &bridge);
        overlay.handle_event(Event::PointerCancelled(PointerId::new(2)), &platform, &bridge);

        assert_eq!(
            bridge.calls(),
            [BridgeCall::Button(1, true), BridgeCall::Button(1, false)]
        );
    }

    #[test]
    fn stick_session_runs_through_the_event_path() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);

        // Hidden -> TopBar -> Joystick.
        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        bridge.clear();

        let p = PointerId::new(5);
        let (cx, cy) = (25.6 + 324.0 / 2.0, 374.4 + 324.0 / 2.0); // stick frame center at 1280x720
        assert!(overlay.handle_event(Event::PointerPressed(p, cx, cy), &platform, &bridge));
        overlay.handle_event(Event::PointerMoved(p, cx + 50.0, cy), &platform, &bridge);
        overlay.run_frame(&platform, &bridge);
        assert!(overlay.handle_event(Event::PointerReleased(p, cx + 50.0, cy), &platform, &bridge));

        let calls = bridge.calls();
        assert_eq!(calls[0], BridgeCall::MouseStart);
        assert!(matches!(calls[1], BridgeCall::MouseTick(_, _)));
        assert_eq!(calls[calls.len() - 2], BridgeCall::MouseTick(0.0, 0.0));
        assert_eq!(calls[calls.len() - 1], BridgeCall::MouseStop);
    }

    #[test]
    fn hiding_the_joystick_mid_gesture_ends_the_session() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);

        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));

        let p = PointerId::new(5);
        let (cx, cy) = (25.6 + 162.0, 374.4 + 162.0);
        overlay.handle_event(Event::PointerPressed(p, cx, cy), &platform, &bridge);
        bridge.clear();

        // A second finger presses the toggle while the stick is held.
        tap(&mut overlay, &platform, &bridge, 9, toggle_center(&platform));

        assert_eq!(overlay.visibility(), OverlayVisibility::Hidden);
        let calls = bridge.calls();
        assert_eq!(calls[0], BridgeCall::MouseTick(0.0, 0.0));
        assert_eq!(calls[1], BridgeCall::MouseStop);
    }

    #[test]
    fn detach_pairs_everything_and_revokes_macros() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);

        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        let esc = spec(ButtonId::Esc).rect(platform.draw_area()).center();
        overlay.handle_event(Event::PointerPressed(PointerId::new(2), esc.0, esc.1), &platform, &bridge);
        bridge.clear();

        overlay.detach(&bridge);
        assert_eq!(
            bridge.calls(),
            [BridgeCall::Button(1, false), BridgeCall::CancelMacros]
        );
    }

    #[test]
    fn render_projects_the_visibility_state() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);

        overlay.run_frame(&platform, &bridge);
        assert_eq!(platform.draw_calls(), 1, "hidden: only the toggle");

        platform.reset_draw_calls();
        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        overlay.run_frame(&platform, &bridge);
        assert_eq!(platform.draw_calls(), 12, "top bar: 11 buttons plus the toggle");

        platform.reset_draw_calls();
        tap(&mut overlay, &platform, &bridge, 1, toggle_center(&platform));
        overlay.run_frame(&platform, &bridge);
        assert_eq!(
            platform.draw_calls(),
            24,
            "joystick: 21 buttons, the toggle, and two stick disks"
        );
    }

    #[test]
    fn resize_relayouts_the_stick() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut overlay = overlay(&platform);

        overlay.handle_event(Event::Resized(1920.0, 1080.0), &platform, &bridge);
        let frame = overlay.stick.frame();
        assert_eq!(frame.w, 0.45 * 1080.0);
        assert_eq!(frame.h, frame.w);
    }
}
