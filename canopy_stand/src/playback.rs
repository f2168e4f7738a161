// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stepping through the years of a dataset.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::manager::PatchManager;
use crate::render::Frame;

/// Why playback ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The last year was shown.
    Finished,
    /// The stop flag was raised.
    Stopped,
    /// There is nothing to show.
    NoData,
}

/// Show years one after another, handing each frame to `on_frame`.
///
/// Playback continues from the current year and stops after the frame of the last
/// year, or before the next frame once `stop` is set. Returns how playback ended and
/// the number of frames shown.
pub fn play(
    manager: &mut PatchManager,
    stop: &AtomicBool,
    mut on_frame: impl FnMut(&Frame),
) -> (PlaybackEnd, usize) {
    let mut shown = 0;
    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::debug!(shown, "playback stopped");
            return (PlaybackEnd::Stopped, shown);
        }
        let Some(frame) = manager.next_year() else {
            return (PlaybackEnd::NoData, shown);
        };
        on_frame(&frame);
        shown += 1;
        if manager.is_last_year() {
            return (PlaybackEnd::Finished, shown);
        }
    }
}
