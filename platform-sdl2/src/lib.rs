// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SDL2-backed host implementation: the window the overlay draws into, the
//! run loop that feeds it pointer events and frames, and the
//! [`SdlBridge`], which forwards overlay input into the engine by pushing
//! events onto the same SDL event queue the engine reads its input from.

mod bridge;
mod speech;

use std::cell::{Cell, RefCell};
use std::mem::size_of;
use std::os::raw::{c_int, c_void};
use std::ptr;
use std::time::{Duration, Instant};

use sdl2::event::Event as SdlEvent;
use sdl2::event::WindowEvent;
use sdl2::haptic::Haptic;
use sdl2::mouse::MouseButton;
use sdl2::pixels::Color;
use sdl2::render::Canvas;
use sdl2::video::{FullscreenType, Window};
use sdl2::{Sdl, VideoSubsystem};

use platform::{
    BlendMode, DrawSettings2D, Event, Platform, PointerId, ShimCallbacks, Vertex2D,
};

pub use bridge::SdlBridge;
pub use speech::EspeakSpeech;

/// Pointer id used for the mouse when it stands in for a finger on hosts
/// without a touchscreen. Real fingers use their SDL finger ids, which SDL
/// allocates starting from zero.
const MOUSE_POINTER: i64 = -1;

/// Events carrying this mouse instance id are either synthesized from touch
/// by SDL or pushed by [`SdlBridge`]; neither must be routed back into the
/// overlay as pointer input.
const UNTRUSTED_MOUSE_ID: u32 = u32::MAX;

/// The SDL2 host: owns the window, the canvas, and the clock.
pub struct Sdl2Platform {
    sdl: Sdl,
    video: VideoSubsystem,
    canvas: RefCell<Canvas<Window>>,
    haptic: RefCell<Option<Haptic>>,
    start: Instant,
    exit_requested: Cell<bool>,
    window_id: u32,
}

impl Sdl2Platform {
    /// Initializes SDL and opens the game window.
    pub fn new(title: &str) -> Result<Sdl2Platform, String> {
        let sdl = sdl2::init()?;
        let video = sdl.video()?;
        let window = video
            .window(title, 1280, 720)
            .allow_highdpi()
            .position_centered()
            .resizable()
            .build()
            .map_err(|err| err.to_string())?;
        let window_id = window.id();
        let canvas = window
            .into_canvas()
            .present_vsync()
            .build()
            .map_err(|err| err.to_string())?;

        // Rumble is strictly optional; most desktops have nothing to open.
        let haptic = sdl
            .haptic()
            .ok()
            .and_then(|subsystem| subsystem.open_from_joystick_id(0).ok());
        if haptic.is_none() {
            tracing::debug!("no haptic device, stick pulses will be dropped");
        }

        Ok(Sdl2Platform {
            sdl,
            video,
            canvas: RefCell::new(canvas),
            haptic: RefCell::new(haptic),
            start: Instant::now(),
            exit_requested: Cell::new(false),
            window_id,
        })
    }

    pub(crate) fn sdl(&self) -> &Sdl {
        &self.sdl
    }

    pub(crate) fn video(&self) -> &VideoSubsystem {
        &self.video
    }

    pub(crate) fn window_id(&self) -> u32 {
        self.window_id
    }

    /// Pumps events into `callbacks` and runs one frame per vsync'd present
    /// until a quit is requested, either by the host window or through
    /// [`Platform::exit`].
    pub fn run_event_loop(&self, callbacks: &mut dyn ShimCallbacks) {
        let mut pump = match self.sdl.event_pump() {
            Ok(pump) => pump,
            Err(err) => {
                tracing::error!("no event pump, cannot run: {err}");
                return;
            }
        };

        let mut mouse_down = false;
        loop {
            for sdl_event in pump.poll_iter() {
                let elapsed = self.start.elapsed();
                let event = match sdl_event {
                    SdlEvent::Quit { .. } => return,

                    SdlEvent::FingerDown {
                        finger_id, x, y, ..
                    } => {
                        let (w, h) = self.draw_area();
                        Some(Event::PointerPressed(PointerId::new(finger_id), x * w, y * h))
                    }
                    SdlEvent::FingerMotion {
                        finger_id, x, y, ..
                    } => {
                        let (w, h) = self.draw_area();
                        Some(Event::PointerMoved(PointerId::new(finger_id), x * w, y * h))
                    }
                    SdlEvent::FingerUp {
                        finger_id, x, y, ..
                    } => {
                        let (w, h) = self.draw_area();
                        Some(Event::PointerReleased(PointerId::new(finger_id), x * w, y * h))
                    }

                    SdlEvent::MouseButtonDown {
                        which,
                        mouse_btn: MouseButton::Left,
                        x,
                        y,
                        ..
                    } if which != UNTRUSTED_MOUSE_ID => {
                        mouse_down = true;
                        Some(Event::PointerPressed(
                            PointerId::new(MOUSE_POINTER),
                            x as f32,
                            y as f32,
                        ))
                    }
                    SdlEvent::MouseMotion { which, x, y, .. }
                        if which != UNTRUSTED_MOUSE_ID && mouse_down =>
                    {
                        Some(Event::PointerMoved(
                            PointerId::new(MOUSE_POINTER),
                            x as f32,
                            y as f32,
                        ))
                    }
                    SdlEvent::MouseButtonUp {
                        which,
                        mouse_btn: MouseButton::Left,
                        x,
                        y,
                        ..
                    } if which != UNTRUSTED_MOUSE_ID => {
                        mouse_down = false;
                        Some(Event::PointerReleased(
                            PointerId::new(MOUSE_POINTER),
                            x as f32,
                            y as f32,
                        ))
                    }

                    SdlEvent::Window { win_event, .. } => match win_event {
                        WindowEvent::SizeChanged(w, h) | WindowEvent::Resized(w, h) => {
                            Some(Event::Resized(w as f32, h as f32))
                        }
                        WindowEvent::FocusLost => Some(Event::FocusLost),
                        _ => None,
                    },

                    _ => None,
                };
                if let Some(event) = event {
                    callbacks.event(event, elapsed, self);
                }
            }

            {
                let mut canvas = self.canvas.borrow_mut();
                canvas.set_draw_color(Color::RGBA(0, 0, 0, 255));
                canvas.clear();
            }
            callbacks.run_frame(self);
            self.canvas.borrow_mut().present();

            if self.exit_requested.get() {
                return;
            }
        }
    }
}

impl Platform for Sdl2Platform {
    fn draw_area(&self) -> (f32, f32) {
        let (w, h) = self.canvas.borrow().window().size();
        (w as f32, h as f32)
    }

    fn draw_2d(&self, vertices: &[Vertex2D], indices: &[u32], settings: DrawSettings2D) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }
        let canvas = self.canvas.borrow_mut();
        let blend = match settings.blend_mode {
            BlendMode::None => sdl2_sys::SDL_BlendMode::SDL_BLENDMODE_NONE,
            BlendMode::Blend => sdl2_sys::SDL_BlendMode::SDL_BLENDMODE_BLEND,
        };
        let stride = size_of::<Vertex2D>() as c_int;
        // Safety: the pointers are derived from a live slice of repr(C)
        // vertices with x/y floats at offset 0 and rgba bytes at offset 8,
        // and SDL only reads them for the duration of the call.
        unsafe {
            sdl2_sys::SDL_SetRenderDrawBlendMode(canvas.raw(), blend);
            let xy = vertices.as_ptr() as *const f32;
            let color = (vertices.as_ptr() as *const u8).add(8) as *const sdl2_sys::SDL_Color;
            // SDL insists on a non-null uv pointer even for untextured
            // geometry; the positions do fine as stand-in texcoords.
            let result = sdl2_sys::SDL_RenderGeometryRaw(
                canvas.raw(),
                ptr::null_mut(),
                xy,
                stride,
                color,
                stride,
                xy,
                stride,
                vertices.len() as c_int,
                indices.as_ptr() as *const c_void,
                indices.len() as c_int,
                size_of::<u32>() as c_int,
            );
            if result != 0 {
                tracing::debug!("SDL_RenderGeometryRaw failed: {}", sdl2::get_error());
            }
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn haptic_pulse(&self, duration: Duration) {
        if let Some(haptic) = self.haptic.borrow_mut().as_mut() {
            haptic.rumble_play(0.5, duration.as_millis() as u32);
        }
    }

    fn keep_screen_awake(&self, awake: bool) {
        if awake {
            self.video.disable_screen_saver();
        } else {
            self.video.enable_screen_saver();
        }
    }

    fn request_sustained_performance(&self) {
        // Nothing to request on a desktop; the contract is best-effort.
        tracing::debug!("sustained-performance mode not available on this host");
    }

    fn enter_immersive_mode(&self) {
        let mut canvas = self.canvas.borrow_mut();
        if let Err(err) = canvas.window_mut().set_fullscreen(FullscreenType::Desktop) {
            tracing::warn!("could not enter fullscreen: {err}");
        }
    }

    fn text_input_active(&self) -> bool {
        self.video.text_input().is_active()
    }

    fn println(&self, message: std::fmt::Arguments) {
        tracing::debug!("{message}");
    }

    fn exit(&self, clean: bool) {
        if !clean {
            tracing::warn!("exit requested with failure");
        }
        self.exit_requested.set(true);
    }
}
