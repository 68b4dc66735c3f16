// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recording fakes for the two capability traits, for driving the overlay
//! through scripted gestures in tests.

use core::fmt::Arguments;
use core::time::Duration;
use std::cell::{Cell, RefCell};

use platform::{DrawSettings2D, EngineBridge, KeyCode, MacroId, Platform, Vertex2D};

/// One observed call on a [`RecordingBridge`], wire-level values only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BridgeCall {
    Button(i32, bool),
    MouseStart,
    MouseTick(f32, f32),
    MouseStop,
    Macro(i32),
    CancelMacros,
    TextInput(bool),
}

/// An [`EngineBridge`] that does nothing but remember every call, in order.
pub struct RecordingBridge {
    calls: RefCell<Vec<BridgeCall>>,
}

impl RecordingBridge {
    pub fn new() -> RecordingBridge {
        RecordingBridge {
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl EngineBridge for RecordingBridge {
    fn on_button(&self, code: KeyCode, down: bool) {
        self.calls
            .borrow_mut()
            .push(BridgeCall::Button(code.inner(), down));
    }

    fn mouse_start(&self) {
        self.calls.borrow_mut().push(BridgeCall::MouseStart);
    }

    fn mouse_stop(&self) {
        self.calls.borrow_mut().push(BridgeCall::MouseStop);
    }

    fn mouse_tick(&self, nx: f32, ny: f32) {
        self.calls.borrow_mut().push(BridgeCall::MouseTick(nx, ny));
    }

    fn run_macro(&self, id: MacroId) {
        self.calls.borrow_mut().push(BridgeCall::Macro(id.inner()));
    }

    fn cancel_macros(&self) {
        self.calls.borrow_mut().push(BridgeCall::CancelMacros);
    }

    fn set_text_input_enabled(&self, enabled: bool) {
        self.calls.borrow_mut().push(BridgeCall::TextInput(enabled));
    }
}

/// A [`Platform`] with a settable IME state, counting the calls the
/// overlay is expected to make.
pub struct TestPlatform {
    area: Cell<(f32, f32)>,
    text_input: Cell<bool>,
    haptic_pulses: Cell<u32>,
    draw_calls: Cell<u32>,
}

impl TestPlatform {
    pub fn new() -> TestPlatform {
        TestPlatform {
            area: Cell::new((1280.0, 720.0)),
            text_input: Cell::new(false),
            haptic_pulses: Cell::new(0),
            draw_calls: Cell::new(0),
        }
    }

    pub fn set_text_input_active(&self, active: bool) {
        self.text_input.set(active);
    }

    pub fn haptic_pulses(&self) -> u32 {
        self.haptic_pulses.get()
    }

    pub fn draw_calls(&self) -> u32 {
        self.draw_calls.get()
    }

    pub fn reset_draw_calls(&self) {
        self.draw_calls.set(0);
    }
}

impl Platform for TestPlatform {
    fn draw_area(&self) -> (f32, f32) {
        self.area.get()
    }

    fn draw_2d(&self, _vertices: &[Vertex2D], _indices: &[u32], _settings: DrawSettings2D) {
        self.draw_calls.set(self.draw_calls.get() + 1);
    }

    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }

    fn haptic_pulse(&self, _duration: Duration) {
        self.haptic_pulses.set(self.haptic_pulses.get() + 1);
    }

    fn keep_screen_awake(&self, _awake: bool) {}

    fn request_sustained_performance(&self) {}

    fn enter_immersive_mode(&self) {}

    fn text_input_active(&self) -> bool {
        self.text_input.get()
    }

    fn println(&self, _message: Arguments) {}

    fn exit(&self, clean: bool) {
        panic!("TestPlatform::exit({clean}) was called");
    }
}
