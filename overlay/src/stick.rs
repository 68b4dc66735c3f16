// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::time::Duration;

use platform::{EngineBridge, Platform, PointerId};

use crate::geom::{fill_disk, Rect};

/// Alpha 26/255 white, the translucent base disk. Part of the visual
/// contract, do not tweak for taste.
const BASE_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 26];
/// Alpha 77/255 white, the knob disk. Same contract as [`BASE_COLOR`].
const KNOB_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 77];

const HAPTIC_PULSE: Duration = Duration::from_millis(25);

/// Tunables for [`RadialStick`], set once at startup from the launch
/// options.
#[derive(Debug, Clone, Copy)]
pub struct StickConfig {
    /// If true, the base recenters under the finger on every new gesture
    /// anywhere in the stick's frame, and the stick is only drawn during a
    /// gesture. If false, the base stays at the frame center and only
    /// touches starting inside the base disk are accepted.
    pub floating: bool,
    /// Radial fraction of the base inside which the published vector is
    /// forced to zero. Clamped to [0, 0.5].
    pub deadzone: f32,
    /// Whether a non-floating stick is drawn even while no gesture is in
    /// progress.
    pub always_visible_when_fixed: bool,
}

impl Default for StickConfig {
    fn default() -> StickConfig {
        StickConfig {
            floating: false,
            deadzone: 0.12,
            always_visible_when_fixed: true,
        }
    }
}

/// The radial analog stick: one owned pointer, tracked inside a bounded
/// disk, streamed to the engine bridge as a normalized 2D vector once per
/// frame for as long as the pointer is down.
///
/// The ordering the bridge relies on lives here: `mouse_start` strictly
/// before any tick of the session, a final `mouse_tick(0, 0)` immediately
/// before `mouse_stop`, and no ticks at all outside a session.
pub struct RadialStick {
    floating: bool,
    deadzone: f32,
    always_visible_when_fixed: bool,

    frame: Rect,
    cx: f32,
    cy: f32,
    r_base: f32,
    r_knob: f32,
    knob_x: f32,
    knob_y: f32,

    visible: bool,
    active_pointer: Option<PointerId>,
    current_nx: f32,
    current_ny: f32,
}

impl RadialStick {
    /// Creates a stick with no frame yet; call [`RadialStick::set_frame`]
    /// before routing touches to it.
    pub fn new(config: StickConfig) -> RadialStick {
        RadialStick {
            floating: config.floating,
            deadzone: config.deadzone.clamp(0.0, 0.5),
            always_visible_when_fixed: config.always_visible_when_fixed,
            frame: Rect::xywh(0.0, 0.0, 0.0, 0.0),
            cx: 0.0,
            cy: 0.0,
            r_base: 0.0,
            r_knob: 0.0,
            knob_x: 0.0,
            knob_y: 0.0,
            visible: false,
            active_pointer: None,
            current_nx: 0.0,
            current_ny: 0.0,
        }
    }

    /// Switches between floating and fixed mode. Takes effect between
    /// gestures; an in-progress session keeps its current center.
    pub fn set_floating(&mut self, floating: bool) {
        self.floating = floating;
        if self.active_pointer.is_none() {
            if floating {
                self.visible = false;
            } else {
                self.visible = self.always_visible_when_fixed;
                if self.visible {
                    self.reset_knob();
                }
            }
        }
    }

    /// Sets the deadzone fraction, clamped to [0, 0.5].
    pub fn set_deadzone(&mut self, deadzone: f32) {
        self.deadzone = deadzone.clamp(0.0, 0.5);
    }

    /// Returns the current deadzone fraction.
    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    /// Sets whether a fixed stick is drawn while idle.
    pub fn set_always_visible_when_fixed(&mut self, visible: bool) {
        self.always_visible_when_fixed = visible;
        if !self.floating && self.active_pointer.is_none() {
            self.visible = visible;
            self.reset_knob();
        }
    }

    /// Places the stick's square frame, recomputing the base and knob radii
    /// from the new size. A fixed, always-visible stick becomes visible
    /// right away with the knob centered.
    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.r_base = 0.5 * frame.w.min(frame.h) * 0.95;
        self.r_knob = self.r_base * 0.40;
        (self.cx, self.cy) = frame.center();
        self.reset_knob();
        if !self.floating && self.always_visible_when_fixed && self.active_pointer.is_none() {
            self.visible = true;
        }
    }

    /// The frame last passed to [`RadialStick::set_frame`].
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Radius of the base disk, as derived from the frame size.
    pub fn base_radius(&self) -> f32 {
        self.r_base
    }

    /// True while a pointer owns the stick.
    pub fn is_active(&self) -> bool {
        self.active_pointer.is_some()
    }

    /// True if this specific pointer owns the current session. The overlay
    /// routes move/release events by ownership, the way a windowing system
    /// would deliver them to the view that captured the gesture.
    pub fn owns(&self, pointer: PointerId) -> bool {
        self.active_pointer == Some(pointer)
    }

    /// The vector the next tick will publish.
    pub fn normalized(&self) -> (f32, f32) {
        (self.current_nx, self.current_ny)
    }

    /// A new pointer went down at (x, y). Returns true if the stick consumed
    /// the touch: either it started a session, or a session already owned by
    /// another pointer swallowed it.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        x: f32,
        y: f32,
        platform: &dyn Platform,
        bridge: &dyn EngineBridge,
    ) -> bool {
        if self.active_pointer.is_some() {
            return true;
        }
        if self.floating {
            self.cx = x;
            self.cy = y;
        } else if !self.inside_base(x, y) {
            return false;
        }
        self.active_pointer = Some(pointer);
        self.start_session(x, y, platform, bridge);
        true
    }

    /// The given pointer moved. Updates the vector if it owns the stick;
    /// returns true while a session is active.
    pub fn pointer_move(&mut self, pointer: PointerId, x: f32, y: f32) -> bool {
        if self.active_pointer == Some(pointer) {
            self.update_from_touch(x, y);
        }
        self.is_active()
    }

    /// The given pointer went up. Ends the session if it was the owner;
    /// returns true while (or until just now) a session was active.
    pub fn pointer_up(&mut self, pointer: PointerId, bridge: &dyn EngineBridge) -> bool {
        if self.active_pointer == Some(pointer) {
            self.stop_session(bridge);
            return true;
        }
        self.is_active()
    }

    /// A cancelled pointer is handled exactly like a released one.
    pub fn pointer_cancel(&mut self, pointer: PointerId, bridge: &dyn EngineBridge) -> bool {
        self.pointer_up(pointer, bridge)
    }

    /// Ends any in-flight session as if the pointer had been released. Used
    /// when the overlay is hidden or torn down mid-gesture, so the bridge
    /// never sees a session left open.
    pub fn cancel_session(&mut self, bridge: &dyn EngineBridge) {
        if self.active_pointer.is_some() {
            self.stop_session(bridge);
        }
    }

    /// Publishes the current vector for this frame. Called once per display
    /// refresh; does nothing while no session is active.
    pub fn tick(&self, bridge: &dyn EngineBridge) {
        if self.active_pointer.is_some() {
            bridge.mouse_tick(self.current_nx, self.current_ny);
        }
    }

    /// Draws the base and knob disks, or nothing at all when hidden.
    pub fn render(&self, platform: &dyn Platform) {
        if !self.visible {
            return;
        }
        fill_disk(platform, self.cx, self.cy, self.r_base, BASE_COLOR);
        fill_disk(platform, self.knob_x, self.knob_y, self.r_knob, KNOB_COLOR);
    }

    fn start_session(&mut self, x: f32, y: f32, platform: &dyn Platform, bridge: &dyn EngineBridge) {
        self.visible = true;
        self.reset_knob();
        self.current_nx = 0.0;
        self.current_ny = 0.0;
        platform.haptic_pulse(HAPTIC_PULSE);
        bridge.mouse_start();
        self.update_from_touch(x, y);
    }

    fn stop_session(&mut self, bridge: &dyn EngineBridge) {
        self.active_pointer = None;
        self.current_nx = 0.0;
        self.current_ny = 0.0;
        if !self.floating && self.always_visible_when_fixed {
            self.visible = true;
            self.reset_knob();
        } else {
            self.visible = false;
        }
        // The neutralising tick and the stop are a required ordered pair.
        bridge.mouse_tick(0.0, 0.0);
        bridge.mouse_stop();
    }

    fn update_from_touch(&mut self, x: f32, y: f32) {
        let mut dx = x - self.cx;
        let mut dy = y - self.cy;
        let mut len = (dx * dx + dy * dy).sqrt();
        if len > self.r_base {
            dx *= self.r_base / len;
            dy *= self.r_base / len;
            len = self.r_base;
        }
        self.knob_x = self.cx + dx;
        self.knob_y = self.cy + dy;

        let norm = if self.r_base > 0.0 { len / self.r_base } else { 0.0 };
        if norm < self.deadzone {
            self.current_nx = 0.0;
            self.current_ny = 0.0;
        } else {
            // Positive Y is forward: up on screen is negative pixel-Y.
            self.current_nx = dx / self.r_base;
            self.current_ny = -dy / self.r_base;
        }
    }

    fn reset_knob(&mut self) {
        self.knob_x = self.cx;
        self.knob_y = self.cy;
    }

    fn inside_base(&self, x: f32, y: f32) -> bool {
        let dx = x - self.cx;
        let dy = y - self.cy;
        dx * dx + dy * dy <= self.r_base * self.r_base
    }

    #[cfg(test)]
    pub(crate) fn set_geometry_for_test(&mut self, cx: f32, cy: f32, r_base: f32) {
        self.cx = cx;
        self.cy = cy;
        self.r_base = r_base;
        self.r_knob = r_base * 0.40;
        self.reset_knob();
    }
}

#[cfg(test)]
mod tests {
    use platform::PointerId;

    use crate::test_support::{BridgeCall, RecordingBridge, TestPlatform};

    use super::{RadialStick, StickConfig};

    fn fixed_stick(deadzone: f32) -> RadialStick {
        let mut stick = RadialStick::new(StickConfig {
            floating: false,
            deadzone,
            always_visible_when_fixed: true,
        });
        stick.set_geometry_for_test(200.0, 200.0, 100.0);
        stick
    }

    fn assert_tick(call: &BridgeCall, nx: f32, ny: f32) {
        match call {
            BridgeCall::MouseTick(x, y) => {
                assert!((x - nx).abs() < 1e-6 && (y - ny).abs() < 1e-6, "tick was ({x}, {y}), expected ({nx}, {ny})");
            }
            other => panic!("expected a tick, got {other:?}"),
        }
    }

    #[test]
    fn drag_session_brackets_and_inverts_y() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.2);
        let p = PointerId::new(1);

        assert!(stick.pointer_down(p, 200.0, 200.0, &platform, &bridge));
        stick.tick(&bridge);
        assert!(stick.pointer_move(p, 260.0, 140.0));
        stick.tick(&bridge);
        assert!(stick.pointer_up(p, &bridge));

        let calls = bridge.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], BridgeCall::MouseStart);
        assert_tick(&calls[1], 0.0, 0.0); // down at center, inside the deadzone
        assert_tick(&calls[2], 0.6, 0.6); // up-right drag: ny positive
        assert_tick(&calls[3], 0.0, 0.0); // neutralising tick
        assert_eq!(calls[4], BridgeCall::MouseStop);
    }

    #[test]
    fn fixed_stick_rejects_touch_outside_base() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.2);

        assert!(!stick.pointer_down(PointerId::new(1), 350.0, 350.0, &platform, &bridge));
        assert!(!stick.is_active());
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn floating_stick_recenters_on_touch() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = RadialStick::new(StickConfig {
            floating: true,
            ..StickConfig::default()
        });
        stick.set_geometry_for_test(200.0, 200.0, 100.0);

        assert!(stick.pointer_down(PointerId::new(7), 10.0, 10.0, &platform, &bridge));
        assert!(stick.is_active());
        assert_eq!(stick.normalized(), (0.0, 0.0));
        assert_eq!(bridge.calls()[0], BridgeCall::MouseStart);
    }

    #[test]
    fn deadzone_forces_zero_vector() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.5);
        let p = PointerId::new(1);

        stick.pointer_down(p, 200.0, 200.0, &platform, &bridge);
        stick.pointer_move(p, 230.0, 220.0); // norm ~0.36, under the deadzone
        assert_eq!(stick.normalized(), (0.0, 0.0));

        stick.pointer_move(p, 270.0, 200.0); // norm 0.7, past it
        let (nx, _) = stick.normalized();
        assert!((nx - 0.7).abs() < 1e-6);
    }

    #[test]
    fn vector_is_clamped_to_the_unit_disk() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.12);
        let p = PointerId::new(1);

        stick.pointer_down(p, 200.0, 200.0, &platform, &bridge);
        stick.pointer_move(p, 900.0, -500.0);
        let (nx, ny) = stick.normalized();
        assert!(nx * nx + ny * ny <= 1.0 + 1e-5);
        assert!(ny > 0.0, "drag towards the top of the screen must be positive ny");
    }

    #[test]
    fn cancel_ends_the_session_like_a_release() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.12);
        let p = PointerId::new(3);

        stick.pointer_down(p, 200.0, 200.0, &platform, &bridge);
        assert!(stick.pointer_cancel(p, &bridge));
        assert!(!stick.is_active());

        let calls = bridge.calls();
        assert_tick(&calls[calls.len() - 2], 0.0, 0.0);
        assert_eq!(calls[calls.len() - 1], BridgeCall::MouseStop);
    }

    #[test]
    fn no_ticks_outside_a_session() {
        let bridge = RecordingBridge::new();
        let stick = fixed_stick(0.12);
        stick.tick(&bridge);
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn second_pointer_is_swallowed_but_ignored() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.12);
        let owner = PointerId::new(1);
        let intruder = PointerId::new(2);

        stick.pointer_down(owner, 200.0, 200.0, &platform, &bridge);
        assert!(stick.pointer_down(intruder, 210.0, 210.0, &platform, &bridge));
        assert!(stick.pointer_up(intruder, &bridge));
        assert!(stick.is_active(), "only the owner may end the session");

        let starts = bridge
            .calls()
            .iter()
            .filter(|call| **call == BridgeCall::MouseStart)
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn session_start_pulses_haptics() {
        let platform = TestPlatform::new();
        let bridge = RecordingBridge::new();
        let mut stick = fixed_stick(0.12);

        stick.pointer_down(PointerId::new(1), 200.0, 200.0, &platform, &bridge);
        assert_eq!(platform.haptic_pulses(), 1);
    }

    #[test]
    fn deadzone_is_clamped_on_set() {
        let mut stick = fixed_stick(0.12);
        stick.set_deadzone(0.9);
        assert_eq!(stick.deadzone(), 0.5);
        stick.set_deadzone(-1.0);
        assert_eq!(stick.deadzone(), 0.0);
    }

    #[test]
    fn frame_size_drives_the_radii() {
        let mut stick = RadialStick::new(StickConfig::default());
        stick.set_frame(crate::geom::Rect::xywh(0.0, 0.0, 200.0, 300.0));
        // Base radius is 95% of half the smaller side.
        assert_eq!(stick.base_radius(), 0.5 * 200.0 * 0.95);
        assert_eq!(stick.normalized(), (0.0, 0.0));
        assert!(!stick.is_active());
    }
}
