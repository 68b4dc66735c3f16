// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Opening the engine's main shared object and running its entry point.
//! The engine is a complete SDL program in a library; once entered it owns
//! its thread until the mission ends or the player quits.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use libloading::{Library, Symbol};
use tracing::{error, info};

/// The engine's entry point, SDL-main style: `android_main(argc, argv)`.
type AndroidMain = unsafe extern "C" fn(c_int, *mut *mut c_char) -> c_int;

const ENTRY_POINT: &[u8] = b"android_main\0";

/// A started engine. There is no way to stop it from outside; the handle
/// only answers whether the entry point has returned.
pub struct EngineRun {
    thread: JoinHandle<i32>,
}

impl EngineRun {
    /// True once `android_main` has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Opens the engine's main shared object, resolves its entry point, and
/// calls it on a dedicated thread with a C-style argument vector built
/// from `args`.
pub fn start(path: &Path, args: &[String]) -> Result<EngineRun> {
    // Safety: the engine object is the payload this process exists to run.
    let library = unsafe { Library::new(path) }
        .with_context(|| format!("loading engine {}", path.display()))?;
    // Resolve once up front, so a build without the entry point fails here
    // rather than on the engine thread.
    unsafe {
        library
            .get::<AndroidMain>(ENTRY_POINT)
            .context("engine has no android_main")?;
    }

    let mut argv_owned =
        vec![CString::new(path.to_string_lossy().as_bytes()).context("engine path contains NUL")?];
    for arg in args {
        argv_owned
            .push(CString::new(arg.as_str()).with_context(|| format!("argument {arg:?} contains NUL"))?);
    }

    let thread = thread::Builder::new()
        .name("android_main".into())
        .spawn(move || {
            let code = {
                let entry: Symbol<AndroidMain> = match unsafe { library.get(ENTRY_POINT) } {
                    Ok(symbol) => symbol,
                    Err(err) => {
                        error!("entry point vanished after the preflight check: {err}");
                        return -1;
                    }
                };
                let mut argv: Vec<*mut c_char> = argv_owned
                    .iter()
                    .map(|arg| arg.as_ptr() as *mut c_char)
                    .collect();
                argv.push(std::ptr::null_mut());
                info!("entering android_main with {} arguments", argv_owned.len() - 1);
                // Safety: argv and the strings it points at outlive the
                // call, and the vector is null-terminated.
                unsafe { entry(argv_owned.len() as c_int, argv.as_mut_ptr()) }
            };
            info!("android_main returned {code}");
            // Engine globals don't survive unloading; keep the object
            // resident for the rest of the process.
            std::mem::forget(library);
            code
        })
        .context("spawning the engine thread")?;

    Ok(EngineRun { thread })
}
