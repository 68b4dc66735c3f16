// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Speech synthesis over an external `espeak-ng` process. One utterance at
//! a time: speaking flushes whatever was playing, matching the
//! queue-flushing behavior of the speech services this shim stands in for.

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use platform::SpeechSynth;

const SYNTH_BIN: &str = "espeak-ng";
/// Default language tag, matching the speech defaults of the launcher this
/// shim descends from. Rate and pitch stay at the synthesizer's neutral
/// 1.0.
const SYNTH_VOICE: &str = "en-us";

/// How often the watcher thread polls the synthesizer process.
const WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// [`SpeechSynth`] backed by the `espeak-ng` command-line synthesizer.
///
/// The "speaking" flag is written by a watcher thread that polls the child
/// process; that flag and the child handle are the only state shared across
/// threads.
pub struct EspeakSpeech {
    available: AtomicBool,
    speaking: Arc<AtomicBool>,
    child: Arc<Mutex<Option<Child>>>,
    /// Bumped for every new utterance so stale watcher threads stand down
    /// instead of clearing the flag of a newer utterance.
    generation: Arc<AtomicU64>,
    binary: &'static str,
}

impl EspeakSpeech {
    /// Probes for the synthesizer once. There should be one handle per
    /// process, owned by the launcher's lifecycle; creating it again later
    /// re-initializes the facility.
    pub fn init() -> EspeakSpeech {
        EspeakSpeech::with_binary(SYNTH_BIN)
    }

    fn with_binary(binary: &'static str) -> EspeakSpeech {
        let available = Command::new(binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !available {
            tracing::warn!("{binary} not found, speech synthesis unavailable");
        }
        EspeakSpeech {
            available: AtomicBool::new(available),
            speaking: Arc::new(AtomicBool::new(false)),
            child: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            binary,
        }
    }

    fn kill_current(&self) {
        if let Ok(mut slot) = self.child.lock() {
            if let Some(mut child) = slot.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
        self.speaking.store(false, Ordering::Release);
    }
}

impl SpeechSynth for EspeakSpeech {
    fn speak(&self, text: &str) -> bool {
        if !self.available.load(Ordering::Acquire) {
            return false;
        }
        // Flush semantics: whatever is still playing gets dropped.
        self.kill_current();

        let child = match Command::new(self.binary)
            .arg("-v")
            .arg(SYNTH_VOICE)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!("could not start {}: {err}", self.binary);
                return false;
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let Ok(mut slot) = self.child.lock() else {
            return false;
        };
        *slot = Some(child);
        drop(slot);
        self.speaking.store(true, Ordering::Release);

        let speaking = Arc::clone(&self.speaking);
        let child_slot = Arc::clone(&self.child);
        let generations = Arc::clone(&self.generation);
        thread::spawn(move || loop {
            thread::sleep(WATCH_INTERVAL);
            if generations.load(Ordering::Acquire) != generation {
                // A newer utterance owns the flag now.
                return;
            }
            let Ok(mut slot) = child_slot.lock() else {
                return;
            };
            match slot.as_mut().map(Child::try_wait) {
                Some(Ok(None)) => {}
                Some(Ok(Some(_))) => {
                    *slot = None;
                    speaking.store(false, Ordering::Release);
                    return;
                }
                Some(Err(_)) | None => {
                    speaking.store(false, Ordering::Release);
                    return;
                }
            }
        });
        true
    }

    fn stop(&self) -> bool {
        if !self.available.load(Ordering::Acquire) {
            return false;
        }
        self.kill_current();
        true
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.kill_current();
        self.available.store(false, Ordering::Release);
    }
}
