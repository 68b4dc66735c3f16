// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The host process for the embedded FreeSpace Open engine: stages the
//! native libraries, brings up the window, starts the engine's entry
//! point, and attaches the touch overlay on top of it.

mod cli;
mod engine;
mod loader;
mod shim;

use anyhow::{anyhow, Result};
use overlay::{OverlayConfig, StickConfig};
use platform::{Platform, SpeechSynth};
use platform_sdl2::{EspeakSpeech, Sdl2Platform, SdlBridge};
use tracing::{info, warn};

use crate::shim::HostShim;

fn main() -> Result<()> {
    let options = cli::options().run();
    tracing_subscriber::fmt()
        .with_max_level(options.verbosity_level)
        .init();

    // Native libraries first: the engine's shared object expects its
    // dependencies to be resident before it is opened.
    let natives = loader::load_natives(&options.natives_dir);
    info!("{} native libraries resident", natives.len());

    let platform = Sdl2Platform::new("FreeSpace Open").map_err(|err| anyhow!(err))?;
    platform.keep_screen_awake(true);
    platform.request_sustained_performance();

    let speech = EspeakSpeech::init();
    if options.tts_test && !speech.speak("Speech synthesis ready") {
        warn!("speech self-test failed");
    }

    let engine = match &options.engine_lib {
        Some(path) => Some(engine::start(path, &options.engine_args)?),
        None => {
            warn!("no engine library named, running the overlay alone");
            None
        }
    };

    let bridge = SdlBridge::new(&platform).map_err(|err| anyhow!(err))?;
    let overlay_config = options.touch_overlay.then(|| OverlayConfig {
        stick: StickConfig {
            floating: options.floating_stick,
            deadzone: options.stick_deadzone,
            always_visible_when_fixed: !options.hide_fixed_stick,
        },
    });

    let mut shim = HostShim::new(&bridge, &speech, overlay_config, engine);
    platform.run_event_loop(&mut shim);

    shim.detach();
    speech.shutdown();

    if shim.engine_running() {
        // The engine keeps global state that does not survive its host
        // going away; ending the process here is the only clean exit while
        // its thread still runs. The natives stay resident until then.
        info!("engine still running, ending the process");
        std::process::exit(0);
    }
    Ok(())
}
