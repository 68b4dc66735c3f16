// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use overlay::{Overlay, OverlayConfig};
use platform::{EngineBridge, Event, Platform, ShimCallbacks, SpeechSynth};
use tracing::info;

use crate::engine::EngineRun;

/// Glue between the host's run loop and everything with a lifecycle: the
/// overlay, speech, and the engine thread.
pub struct HostShim<'a> {
    bridge: &'a dyn EngineBridge,
    speech: &'a dyn SpeechSynth,
    overlay: Option<Overlay>,
    /// Set when the overlay was requested but not built yet; construction
    /// is deferred to the first frame of the run loop.
    pending_overlay: Option<OverlayConfig>,
    engine: Option<EngineRun>,
    engine_done: bool,
}

impl<'a> HostShim<'a> {
    /// `overlay_config` of `None` means the overlay was disabled in the
    /// launch options.
    pub fn new(
        bridge: &'a dyn EngineBridge,
        speech: &'a dyn SpeechSynth,
        overlay_config: Option<OverlayConfig>,
        engine: Option<EngineRun>,
    ) -> HostShim<'a> {
        HostShim {
            bridge,
            speech,
            overlay: None,
            pending_overlay: overlay_config,
            engine,
            engine_done: false,
        }
    }

    /// Tears down the overlay's input state after the run loop ends, so no
    /// bridge down or session is left unpaired.
    pub fn detach(&mut self) {
        if let Some(overlay) = &mut self.overlay {
            overlay.detach(self.bridge);
        }
    }

    /// True while `android_main` is still running.
    pub fn engine_running(&self) -> bool {
        matches!(&self.engine, Some(run) if !run.is_finished())
    }
}

impl ShimCallbacks for HostShim<'_> {
    fn run_frame(&mut self, platform: &dyn Platform) {
        if let Some(config) = self.pending_overlay.take() {
            // By now the engine has had its first frames and its view of
            // the window exists underneath the overlay.
            self.overlay = Some(Overlay::new(config, platform));
            platform.enter_immersive_mode();
            info!("touch overlay attached");
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.run_frame(platform, self.bridge);
        }
        if !self.engine_done {
            if let Some(run) = &self.engine {
                if run.is_finished() {
                    self.engine_done = true;
                    info!("engine main returned, leaving the run loop");
                    platform.exit(true);
                }
            }
        }
    }

    fn event(&mut self, event: Event, _elapsed: Duration, platform: &dyn Platform) {
        if event == Event::FocusLost {
            // The pause analogue stops playback; resuming restores nothing.
            self.speech.stop();
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.handle_event(event, platform, self.bridge);
        }
    }
}
