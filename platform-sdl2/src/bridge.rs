// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The engine side of the bridge. The embedded engine takes all of its
//! input from the SDL event queue, so every bridge call becomes one or more
//! events pushed onto that queue: key presses for buttons and macros,
//! relative mouse motion for the analog stick.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use sdl2::event::{Event as SdlEvent, EventSender};
use sdl2::keyboard::{KeyboardUtil, Keycode, Mod, Scancode, TextInputUtil};
use sdl2::mouse::{MouseState, MouseUtil};

use platform::{EngineBridge, KeyCode, MacroId};

use crate::{Sdl2Platform, UNTRUSTED_MOUSE_ID};

/// Radial fraction of stick deflection below which no motion is produced.
const MOUSE_DEADZONE: f32 = 0.12;
/// Cursor speed at full deflection, in pixels per second.
const MOUSE_BASE_SPEED: f32 = 1100.0;
/// Response-curve exponent: deflection is raised to this power, which keeps
/// small corrections slow without capping the top speed.
const MOUSE_ACCEL_EXP: f32 = 1.6;

/// Duration a macro holds each tapped key down, in milliseconds.
const MACRO_TAP_MS: u64 = 45;
/// Pause between the keys of a macro sequence, long enough for the engine
/// to treat them as separate presses.
const MACRO_GAP_MS: u64 = 350;

/// [`EngineBridge`] over the SDL event queue.
pub struct SdlBridge {
    // EventSender is Send but not Sync; the mutex lets the macro worker
    // thread share it with the event-loop thread.
    sender: Arc<Mutex<EventSender>>,
    keyboard: KeyboardUtil,
    text_input: TextInputUtil,
    mouse: MouseUtil,
    window_id: u32,
    /// Time of the previous tick while a mouse session is active.
    session: Cell<Option<Instant>>,
    macros: Arc<MacroFlags>,
}

struct MacroFlags {
    cancel: AtomicBool,
    running: AtomicBool,
}

impl SdlBridge {
    /// Creates the bridge against the platform's SDL instance and window.
    pub fn new(platform: &Sdl2Platform) -> Result<SdlBridge, String> {
        let events = platform.sdl().event()?;
        Ok(SdlBridge {
            sender: Arc::new(Mutex::new(events.event_sender())),
            keyboard: platform.sdl().keyboard(),
            text_input: platform.video().text_input(),
            mouse: platform.sdl().mouse(),
            window_id: platform.window_id(),
            session: Cell::new(None),
            macros: Arc::new(MacroFlags {
                cancel: AtomicBool::new(false),
                running: AtomicBool::new(false),
            }),
        })
    }

    fn push_key(&self, down: bool, scancode: Scancode, keycode: Keycode) {
        push_key(
            &self.sender,
            self.window_id,
            self.keyboard.mod_state(),
            down,
            scancode,
            keycode,
        );
    }
}

impl EngineBridge for SdlBridge {
    fn on_button(&self, code: KeyCode, down: bool) {
        let Some(mapping) = key_mapping(code) else {
            tracing::warn!("unmapped key code {}", code.inner());
            return;
        };
        if mapping.alt_chord {
            // Alt goes down first and comes up last, so the engine always
            // sees the letter with the modifier held.
            if down {
                self.push_key(true, Scancode::LAlt, Keycode::LAlt);
                self.push_key(true, mapping.scancode, mapping.keycode);
            } else {
                self.push_key(false, mapping.scancode, mapping.keycode);
                self.push_key(false, Scancode::LAlt, Keycode::LAlt);
            }
        } else {
            self.push_key(down, mapping.scancode, mapping.keycode);
        }
    }

    fn mouse_start(&self) {
        self.mouse.set_relative_mouse_mode(true);
        self.session.set(Some(Instant::now()));
    }

    fn mouse_stop(&self) {
        self.session.set(None);
        self.mouse.set_relative_mouse_mode(false);
    }

    fn mouse_tick(&self, nx: f32, ny: f32) {
        let Some(last) = self.session.get() else {
            return;
        };
        let now = Instant::now();
        self.session.set(Some(now));

        let (dx, dy) = relative_motion(nx, ny, (now - last).as_secs_f32());
        if dx == 0 && dy == 0 {
            return;
        }
        let event = SdlEvent::MouseMotion {
            timestamp: 0,
            window_id: self.window_id,
            which: UNTRUSTED_MOUSE_ID,
            mousestate: MouseState::from_sdl_state(0),
            x: 0,
            y: 0,
            xrel: dx,
            yrel: dy,
        };
        let Ok(sender) = self.sender.lock() else {
            return;
        };
        if let Err(err) = sender.push_event(event) {
            tracing::warn!("dropped mouse motion: {err}");
        }
    }

    fn run_macro(&self, id: MacroId) {
        if self.macros.running.load(Ordering::Acquire) {
            return;
        }
        let steps = macro_steps(id);
        if steps.is_empty() {
            return;
        }
        self.macros.cancel.store(false, Ordering::Release);
        self.macros.running.store(true, Ordering::Release);

        let sender = Arc::clone(&self.sender);
        let flags = Arc::clone(&self.macros);
        let window_id = self.window_id;
        thread::spawn(move || {
            for step in steps {
                if flags.cancel.load(Ordering::Acquire) {
                    break;
                }
                match step {
                    MacroStep::Tap(scancode, keycode, hold_ms) => {
                        push_key(&sender, window_id, Mod::NOMOD, true, scancode, keycode);
                        thread::sleep(Duration::from_millis(hold_ms));
                        push_key(&sender, window_id, Mod::NOMOD, false, scancode, keycode);
                    }
                    MacroStep::Wait(millis) => {
                        thread::sleep(Duration::from_millis(millis));
                    }
                }
            }
            flags.running.store(false, Ordering::Release);
        });
    }

    fn cancel_macros(&self) {
        self.macros.cancel.store(true, Ordering::Release);
    }

    fn set_text_input_enabled(&self, enabled: bool) {
        if enabled {
            self.text_input.start();
        } else {
            self.text_input.stop();
        }
    }
}

fn push_key(
    sender: &Mutex<EventSender>,
    window_id: u32,
    keymod: Mod,
    down: bool,
    scancode: Scancode,
    keycode: Keycode,
) {
    let event = if down {
        SdlEvent::KeyDown {
            timestamp: 0,
            window_id,
            keycode: Some(keycode),
            scancode: Some(scancode),
            keymod,
            repeat: false,
        }
    } else {
        SdlEvent::KeyUp {
            timestamp: 0,
            window_id,
            keycode: Some(keycode),
            scancode: Some(scancode),
            keymod,
            repeat: false,
        }
    };
    let Ok(sender) = sender.lock() else {
        return;
    };
    if let Err(err) = sender.push_event(event) {
        tracing::warn!("dropped key event: {err}");
    }
}

struct KeyMapping {
    scancode: Scancode,
    keycode: Keycode,
    alt_chord: bool,
}

/// The wire-code translation table, the engine-facing half of the key-code
/// contract. One row per code; rows marked `true` are Alt chords.
const KEY_TABLE: [(KeyCode, Scancode, Keycode, bool); 27] = [
    (KeyCode::ESC, Scancode::Escape, Keycode::Escape, false),
    (KeyCode::F3, Scancode::F3, Keycode::F3, false),
    (KeyCode::ALT_M, Scancode::M, Keycode::M, true),
    (KeyCode::ALT_H, Scancode::H, Keycode::H, true),
    (KeyCode::ALT_J, Scancode::J, Keycode::J, true),
    (KeyCode::ALT_A, Scancode::A, Keycode::A, true),
    // Weapons.
    (KeyCode::SPACE, Scancode::Space, Keycode::Space, false),
    (KeyCode::CTRL, Scancode::LCtrl, Keycode::LCtrl, false),
    (KeyCode::CYCLE_P, Scancode::Period, Keycode::Period, false),
    (KeyCode::CYCLE_S, Scancode::Slash, Keycode::Slash, false),
    // Targeting.
    (KeyCode::Y, Scancode::Y, Keycode::Y, false),
    (KeyCode::H, Scancode::H, Keycode::H, false),
    (KeyCode::B, Scancode::B, Keycode::B, false),
    (KeyCode::E, Scancode::E, Keycode::E, false),
    (KeyCode::F, Scancode::F, Keycode::F, false),
    (KeyCode::T, Scancode::T, Keycode::T, false),
    (KeyCode::S, Scancode::S, Keycode::S, false),
    // Movement and utility.
    (KeyCode::TAB, Scancode::Tab, Keycode::Tab, false),
    (KeyCode::PLUS, Scancode::Equals, Keycode::Equals, false),
    (KeyCode::MINUS, Scancode::Minus, Keycode::Minus, false),
    (KeyCode::Q, Scancode::Q, Keycode::Q, false),
    (KeyCode::X, Scancode::X, Keycode::X, false),
    (KeyCode::M, Scancode::M, Keycode::M, false),
    (KeyCode::A, Scancode::A, Keycode::A, false),
    (KeyCode::Z, Scancode::Z, Keycode::Z, false),
    (KeyCode::BACKSLASH, Scancode::Backslash, Keycode::Backslash, false),
    (KeyCode::BACKSPACE, Scancode::Backspace, Keycode::Backspace, false),
];

fn key_mapping(code: KeyCode) -> Option<KeyMapping> {
    KEY_TABLE
        .iter()
        .find(|row| row.0 == code)
        .map(|&(_, scancode, keycode, alt_chord)| KeyMapping {
            scancode,
            keycode,
            alt_chord,
        })
}

enum MacroStep {
    /// Press, hold for the given milliseconds, release.
    Tap(Scancode, Keycode, u64),
    /// Do nothing for the given milliseconds.
    Wait(u64),
}

fn tap(scancode: Scancode, keycode: Keycode) -> MacroStep {
    MacroStep::Tap(scancode, keycode, MACRO_TAP_MS)
}

/// Expands a macro id into its step sequence. Every macro is a C tap
/// followed by one or two digit taps, with a gap before each digit.
fn macro_steps(id: MacroId) -> Vec<MacroStep> {
    let digits: &[(Scancode, Keycode)] = if id == MacroId::C_3_1 {
        &[(Scancode::Num3, Keycode::Num3), (Scancode::Num1, Keycode::Num1)]
    } else if id == MacroId::C_3_6 {
        &[(Scancode::Num3, Keycode::Num3), (Scancode::Num6, Keycode::Num6)]
    } else if id == MacroId::C_3_9 {
        &[(Scancode::Num3, Keycode::Num3), (Scancode::Num9, Keycode::Num9)]
    } else if id == MacroId::C_5 {
        &[(Scancode::Num5, Keycode::Num5)]
    } else if id == MacroId::C_3_5 {
        &[(Scancode::Num3, Keycode::Num3), (Scancode::Num5, Keycode::Num5)]
    } else {
        return Vec::new();
    };

    let mut steps = vec![tap(Scancode::C, Keycode::C)];
    for &(scancode, keycode) in digits {
        steps.push(MacroStep::Wait(MACRO_GAP_MS));
        steps.push(tap(scancode, keycode));
    }
    steps
}

/// Converts the normalized stick vector into a relative cursor step for a
/// frame `dt` seconds long. The vector's own deadzone has already been
/// applied by the overlay; this one matches the engine-side feel of the
/// original controls. Positive `ny` (forward) moves the cursor up, which is
/// negative y in screen coordinates.
fn relative_motion(nx: f32, ny: f32, dt: f32) -> (i32, i32) {
    let mut x = nx;
    let mut y = ny;
    let mut mag = (x * x + y * y).sqrt();
    if mag < MOUSE_DEADZONE {
        x = 0.0;
        y = 0.0;
        mag = 0.0;
    }
    if mag > 0.0 {
        x /= mag;
        y /= mag;
    }
    let speed = MOUSE_BASE_SPEED * mag.powf(MOUSE_ACCEL_EXP);
    let dx = (x * speed * dt).round() as i32;
    let dy = (-y * speed * dt).round() as i32;
    (dx, dy)
}
