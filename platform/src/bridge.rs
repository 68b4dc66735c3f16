// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

/// The one channel between the overlay and the embedded engine.
///
/// Implementations forward these calls into the engine's input queue, however
/// the engine in question takes its input. All calls are best-effort: nothing
/// is reported back, and callers may not assume success. In exchange, callers
/// guarantee some ordering on their side:
///
/// - Every `on_button(code, true)` is eventually paired with an
///   `on_button(code, false)` for the same code, and no two downs for the
///   same code happen without an up in between.
/// - `mouse_start` and `mouse_stop` bracket a streaming session. Sessions
///   never nest. Between them, zero or more `mouse_tick` calls happen with
///   both components in [-1, 1], and exactly one trailing `mouse_tick(0, 0)`
///   is sent before `mouse_stop`, to neutralise any residual velocity the
///   engine side has accumulated.
/// - All calls come from the thread running the host's event loop.
pub trait EngineBridge {
    /// A discrete button changed state. `down` is true on press, false on
    /// release.
    fn on_button(&self, code: KeyCode, down: bool);

    /// Begin an analog-stick streaming session.
    fn mouse_start(&self);

    /// End the current analog-stick streaming session.
    fn mouse_stop(&self);

    /// Publish the current normalized stick vector. Positive `ny` is
    /// "forward" (up on screen).
    fn mouse_tick(&self, nx: f32, ny: f32);

    /// Fire a scripted command sequence. Fire-and-forget; the engine side
    /// expands the id into the actual key sequence.
    fn run_macro(&self, id: MacroId);

    /// Revoke any scripted sequence still being expanded.
    fn cancel_macros(&self);

    /// Ask the engine's text-input subsystem to show or hide the soft
    /// keyboard. Idempotent.
    fn set_text_input_enabled(&self, enabled: bool);
}

/// A discrete action understood by the engine side of the bridge.
///
/// The numeric values are a wire-level contract shared with the engine's
/// input translation table and must not be renumbered between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode(i32);

#[allow(missing_docs)]
impl KeyCode {
    pub const ESC: KeyCode = KeyCode(1);
    pub const F3: KeyCode = KeyCode(2);
    pub const ALT_M: KeyCode = KeyCode(3);
    pub const ALT_H: KeyCode = KeyCode(4);
    pub const ALT_J: KeyCode = KeyCode(5);
    pub const ALT_A: KeyCode = KeyCode(6);

    // Weapons.
    pub const SPACE: KeyCode = KeyCode(20);
    pub const CTRL: KeyCode = KeyCode(21);
    pub const CYCLE_P: KeyCode = KeyCode(22);
    pub const CYCLE_S: KeyCode = KeyCode(23);

    // Targeting.
    pub const Y: KeyCode = KeyCode(30);
    pub const H: KeyCode = KeyCode(31);
    pub const B: KeyCode = KeyCode(32);
    pub const E: KeyCode = KeyCode(33);
    pub const F: KeyCode = KeyCode(34);
    pub const T: KeyCode = KeyCode(35);
    pub const S: KeyCode = KeyCode(36);

    // Movement and utility.
    pub const TAB: KeyCode = KeyCode(40);
    pub const PLUS: KeyCode = KeyCode(41);
    pub const MINUS: KeyCode = KeyCode(42);
    pub const Q: KeyCode = KeyCode(43);
    pub const X: KeyCode = KeyCode(44);
    pub const M: KeyCode = KeyCode(45);
    pub const A: KeyCode = KeyCode(46);
    pub const Z: KeyCode = KeyCode(47);
    pub const BACKSLASH: KeyCode = KeyCode(48);
    pub const BACKSPACE: KeyCode = KeyCode(49);

    /// Returns the wire-level value of this code.
    pub fn inner(self) -> i32 {
        self.0
    }
}

/// A scripted command sequence understood by the engine side of the bridge.
///
/// Like [`KeyCode`], the values are a wire-level contract. `C_3_6` has no
/// bound control but remains a valid id the engine side expands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroId(i32);

#[allow(missing_docs)]
impl MacroId {
    pub const C_3_1: MacroId = MacroId(1);
    pub const C_3_6: MacroId = MacroId(2);
    pub const C_3_9: MacroId = MacroId(3);
    pub const C_5: MacroId = MacroId(4);
    pub const C_3_5: MacroId = MacroId(5);

    /// Returns the wire-level value of this id.
    pub fn inner(self) -> i32 {
        self.0
    }
}
