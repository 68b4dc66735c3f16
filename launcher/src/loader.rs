// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Native library staging. The engine's shared objects live in a private
//! directory and have to be made resident, in an order the dynamic linker
//! can cope with, before the engine's own shared object is opened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, error, warn};

/// Libraries with known inter-dependencies, loaded first and in exactly
/// this order when present.
pub const PREFERRED_ORDER: [&str; 8] = [
    "libSDL2.so",
    "libopenal.so",
    "libavutil.so",
    "libswresample.so",
    "libswscale.so",
    "libavcodec.so",
    "libavformat.so",
    "libavfilter.so",
];

/// True for names that are engine builds rather than support libraries.
/// Engine builds are never auto-loaded; the one being launched is named
/// explicitly in the options and opened separately.
pub fn is_engine_library(name: &str) -> bool {
    name.starts_with("libfso") || name.contains("libfs2")
}

/// Computes the load order over a directory's file names: the present
/// subset of [`PREFERRED_ORDER`] first, in its declared order, then every
/// other non-engine `.so` in enumeration order.
pub fn order_for_load(names: &[String]) -> Vec<String> {
    let mut ordered = Vec::new();
    for preferred in PREFERRED_ORDER {
        if names.iter().any(|name| name == preferred) {
            ordered.push(preferred.to_string());
        }
    }
    for name in names {
        if !name.ends_with(".so") || is_engine_library(name) {
            continue;
        }
        if !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    ordered
}

/// Enumerates the natives directory and returns the ordered load list. A
/// missing directory is just an empty list.
pub fn load_list(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
    }
    Ok(order_for_load(&names)
        .into_iter()
        .map(|name| dir.join(name))
        .collect())
}

/// Attempts to load every file once, then retries the failures once: a
/// library whose dependencies only became resident during the first pass
/// succeeds on the second. Returns whatever still failed.
pub fn load_with(files: &[PathBuf], try_load: &mut dyn FnMut(&Path) -> bool) -> Vec<PathBuf> {
    let mut failed: Vec<PathBuf> = files
        .iter()
        .filter(|file| !try_load(file))
        .cloned()
        .collect();
    if !failed.is_empty() {
        failed.retain(|file| !try_load(file));
    }
    failed
}

/// Makes the natives directory resident. Residual failures are logged and
/// swallowed; an optional library failing to load is not fatal to the
/// engine. The returned handles must be kept alive for as long as the
/// engine may run.
pub fn load_natives(dir: &Path) -> Vec<Library> {
    let files = match load_list(dir) {
        Ok(files) => files,
        Err(err) => {
            warn!("could not enumerate {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut libraries = Vec::new();
    let mut try_load = |path: &Path| {
        // Safety: these are the engine's own support libraries; their
        // initializers are what we are here to run.
        match unsafe { Library::new(path) } {
            Ok(library) => {
                debug!("loaded {}", path.display());
                libraries.push(library);
                true
            }
            Err(err) => {
                debug!("load failed, will retry: {} ({err})", path.display());
                false
            }
        }
    };
    let still_failing = load_with(&files, &mut try_load);
    for path in &still_failing {
        error!("still failing after retry: {}", path.display());
    }
    libraries
}
