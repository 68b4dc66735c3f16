// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! This crate mainly revolves around the [`Platform`] trait, which can be
//! implemented to provide a "host implementation" for the touch overlay, and
//! the [`EngineBridge`] trait, which is the one channel through which overlay
//! input reaches the embedded game engine. The overlay itself never talks to a
//! window system or to the engine directly; it only ever sees these traits.
//!
//! This is split off of the overlay crate so that the overlay logic and the
//! host implementation can be compiled independently, which appears to speed
//! up compilation time.

#![no_std]
#![warn(missing_docs)]

mod bridge;
mod input;
mod render;
mod speech;

use core::fmt::Arguments;
use core::time::Duration;

pub use bridge::*;
pub use input::*;
pub use render::*;
pub use speech::*;

/// Interface to the shim for the host implementation.
///
/// Used to let the overlay do its thing once per displayed frame, and to pass
/// input events to it. `run_frame` doubles as the vsync source for anything
/// that needs to publish at display-refresh cadence, so hosts must call it
/// from a loop that is actually paced by presentation, not a busy loop.
pub trait ShimCallbacks {
    /// Run one frame: advance per-frame streaming and draw the overlay.
    fn run_frame(&mut self, platform: &dyn Platform);

    /// Handle an event. The duration passed in should refer to the time the
    /// event happened, using the same clock as [`Platform::elapsed`].
    fn event(&mut self, event: Event, elapsed: Duration, platform: &dyn Platform);
}

/// A trait for using host-dependent features from the overlay without
/// depending on any host implementation directly. A host implementation
/// should implement this trait, and also call the shim's `run_frame` and
/// `event` methods at appropriate times.
///
/// All the functions have a `&self` parameter, so that the methods can access
/// some (possibly internally mutable) state, but still keeping the platform
/// object as widely usable as possible (a "platform" is about as global an
/// object as you get). Also, none of these functions are (supposed to be) hot,
/// and this trait is object safe, so using &dyn [`Platform`] should be fine
/// performance-wise, and will hopefully help with compilation times by
/// avoiding generics.
pub trait Platform {
    /// Get the current screen size. Could be physical pixels, could be
    /// "logical" pixels, depends on the platform, but it's the same coordinate
    /// system as the [`Vertex2D`]s passed into [`Platform::draw_2d`] and the
    /// pointer coordinates in [`Event`].
    fn draw_area(&self) -> (f32, f32);

    /// Render out a pile of colored 2D triangles.
    fn draw_2d(&self, vertices: &[Vertex2D], indices: &[u32], settings: DrawSettings2D);

    /// Returns the amount of time elapsed since the platform was initialized.
    fn elapsed(&self) -> Duration;

    /// Emit a short haptic pulse, if the hardware has anything to rumble.
    /// Best-effort: hosts without haptics do nothing.
    fn haptic_pulse(&self, duration: Duration);

    /// Ask the host to keep the screen from blanking while the game runs.
    /// Best-effort, failures are swallowed.
    fn keep_screen_awake(&self, awake: bool);

    /// Ask the host for a sustained (rather than bursty) performance profile.
    /// Best-effort, failures are swallowed.
    fn request_sustained_performance(&self);

    /// Ask the host to hide its system chrome and give the overlay the whole
    /// display, with any system bars only revealed transiently. Best-effort.
    fn enter_immersive_mode(&self);

    /// Returns true if the host's on-screen text input (IME) is currently
    /// being shown.
    fn text_input_active(&self) -> bool;

    /// Print out a string. For very crude debugging.
    fn println(&self, message: Arguments);

    /// Request the process to exit, with `clean: false` if intending to signal
    /// failure. On a clean exit, the exit may be delayed until a moment later,
    /// e.g. at the end of the current frame of the run loop.
    fn exit(&self, clean: bool);
}
