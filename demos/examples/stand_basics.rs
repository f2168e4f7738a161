// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stand basics.
//!
//! Load a few cohort rows, step through the years, select a cohort, and export the
//! placed trees.
//!
//! Run:
//! - `cargo run -p canopy_demos --example stand_basics`
//! - `RUST_LOG=debug cargo run -p canopy_demos --example stand_basics`

use canopy_cohort::CohortId;
use canopy_stand::{PatchManager, StandConfig, export_csv, load_cohorts, load_year_data};
use tracing_subscriber::EnvFilter;

const COHORTS: &str = "\
Year SID PID IID PFT Height Boleht Diam CrownA DensI Px Py Pheight LAI
1901   1   0   1   0   18.0    7.0 0.30  12.57 0.004  0  0     0.0 2.1
1901   1   0   2   4    9.0    3.0 0.12   3.10 0.010  0  0     0.0 1.4
1901   1   1   1   5   22.0    9.0 0.45  20.00 0.003  1  0     1.5 2.8
1901   1   1   9   0    0.0    0.0 0.00   1.00 1.000  1  0     1.5 0.3
1902   1   0   1   0   18.6    7.2 0.31  13.20 0.003  0  0     0.0 2.2
1902   1   0   2   4    9.8    3.4 0.13   3.40 0.012  0  0     0.0 1.5
1902   1   1   1   5   22.5    9.1 0.46  20.40 0.003  1  0     1.5 2.9
1905   1   0   2   4   11.0    4.0 0.15   4.00 0.015  0  0     0.0 1.7
1905   1   1   1   5   23.0    9.3 0.47  21.00 0.002  1  0     1.5 2.9
";

const CLIMATE: &str = "\
Year  Temp  Precip
1901   4.2   610
1902   3.9   655
1905   4.6   580
";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut stand = PatchManager::new(StandConfig {
        seed: 2026,
        ..StandConfig::default()
    });
    stand.set_dataset_name("stand_basics");
    load_cohorts(&mut stand, COHORTS).unwrap();
    load_year_data(&mut stand, CLIMATE).unwrap();

    // Walk forward through every year with data.
    while let Some(frame) = stand.next_year() {
        for patch in &frame.patches {
            let live: usize = patch.cohorts.iter().map(|c| c.live).sum();
            println!(
                "{} patch {} at ({:.1}, {:.1}, {:.1}): {live} trees{}",
                frame.year,
                patch.id,
                patch.origin.x,
                patch.origin.y,
                patch.origin.z,
                if patch.grassy { ", grassy" } else { "" },
            );
        }
        if stand.is_last_year() {
            break;
        }
    }

    // Inspect one cohort.
    stand.select_cohort(Some(CohortId::new(1, 0, 2)));
    if let Some(info) = stand.selected_cohort_info() {
        println!("cohort {}", info.id);
        for (name, value) in info.fields() {
            println!("  {name:>12} {value}");
        }
    }

    if let Some(centre) = stand.calc_patches_centre() {
        println!("stand centre: {centre}");
    }

    let mut out = std::io::stdout().lock();
    let rows = export_csv(&stand, &mut out, b',').unwrap();
    println!("exported {rows} trees");
}
