// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stand playback.
//!
//! Load a dataset from files (or a generated one) and play it, stopping from
//! another thread after a few frames.
//!
//! Run:
//! - `cargo run -p canopy_demos --example stand_playback`
//! - `cargo run -p canopy_demos --example stand_playback -- run_veg_struct.out climate.out`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use canopy_stand::{PatchManager, StandConfig, load_cohorts, load_dataset, play};
use tracing_subscriber::EnvFilter;

fn generated() -> String {
    let mut text = String::from("Year SID PID IID PFT Height Boleht Diam CrownA DensI Px Py\n");
    for year in 1900..1960 {
        let t = f64::from(year - 1900);
        for patch in 0..4 {
            for cohort in 0..6 {
                let crown = 2.0 + f64::from(cohort) * 3.0 + t * 0.1;
                let density = 0.002 + 0.001 * f64::from((cohort + year) % 6);
                text.push_str(&format!(
                    "{year} 1 {patch} {cohort} {} {:.1} {:.1} 0.3 {crown:.2} {density:.4} {} {}\n",
                    cohort % 8,
                    10.0 + t * 0.2,
                    4.0 + t * 0.05,
                    patch % 2,
                    patch / 2,
                ));
            }
        }
    }
    text
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let mut stand = if paths.is_empty() {
        let mut stand = PatchManager::new(StandConfig::default());
        load_cohorts(&mut stand, &generated()).unwrap();
        stand
    } else {
        match load_dataset(&paths, StandConfig::default()) {
            Ok(stand) => stand,
            Err(err) => {
                tracing::error!(%err, "cannot load dataset");
                return;
            }
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let shown = Arc::new(AtomicUsize::new(0));
    let watcher = {
        let stop = Arc::clone(&stop);
        let shown = Arc::clone(&shown);
        thread::spawn(move || {
            while shown.load(Ordering::Relaxed) < 25 {
                thread::sleep(Duration::from_millis(1));
            }
            stop.store(true, Ordering::Relaxed);
        })
    };

    let (end, frames) = play(&mut stand, &stop, |frame| {
        let trees: usize = frame
            .patches
            .iter()
            .flat_map(|p| &p.cohorts)
            .map(|c| c.live)
            .sum();
        println!(
            "{}: {trees} trees (+{} -{})",
            frame.year, frame.update.added, frame.update.removed
        );
        shown.fetch_add(1, Ordering::Relaxed);
        // Stand-in for rendering time.
        thread::sleep(Duration::from_millis(5));
    });
    println!("{end:?} after {frames} frames");

    // Release the watcher if playback finished first.
    shown.store(usize::MAX, Ordering::Relaxed);
    let _ = watcher.join();
}
