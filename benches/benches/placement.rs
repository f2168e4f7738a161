// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

use canopy_cohort::{CohortId, CohortRecord, Year};
use canopy_patch::{CellGrid, Patch, PatchConfig};
use canopy_stand::{PatchManager, StandConfig};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn row(patch: u32, cohort: u32, year: Year, crown_area: f64, density: f64) -> CohortRecord {
    CohortRecord {
        id: CohortId::new(1, patch, cohort),
        year,
        pft: cohort % 10,
        height: 20.0,
        bole_height: 8.0,
        diameter: 0.4,
        crown_area,
        density,
        patch_x: f64::from(patch % 4),
        patch_y: f64::from(patch / 4),
        patch_height: 0.0,
        extra: BTreeMap::new(),
    }
}

// Cohorts with crowns from 2 to 20 m², densities drifting year over year.
fn gen_patch(cohorts: u32, years: Year) -> Patch {
    let mut patch = Patch::new(0, PatchConfig::default());
    for c in 0..cohorts {
        let crown_area = 2.0 + f64::from(c % 10) * 2.0;
        for y in 0..years {
            let density = 0.004 + 0.002 * f64::from((c as i32 + y) % 5);
            patch
                .add_record(row(0, c, 2000 + y, crown_area, density), 1000)
                .unwrap();
        }
    }
    patch
}

fn bench_cells(c: &mut Criterion) {
    let mut group = c.benchmark_group("cells");
    for &step in &[0.6_f64, 0.3] {
        let grid = CellGrid::new(1000_f64.sqrt(), step);
        group.throughput(Throughput::Elements(grid.len() as u64));
        group.bench_function(format!("build_step{step}"), |b| {
            b.iter(|| black_box(CellGrid::new(1000_f64.sqrt(), step)));
        });
        group.bench_function(format!("within_r2_step{step}"), |b| {
            b.iter(|| black_box(grid.within(Point::new(15.0, 15.0), 2.0).count()));
        });
    }
    group.finish();
}

fn bench_place_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_all");
    for &cohorts in &[4_u32, 16, 64] {
        let patch = gen_patch(cohorts, 1);
        group.bench_function(format!("cohorts{cohorts}"), |b| {
            b.iter_batched(
                || (patch.clone(), StdRng::seed_from_u64(7)),
                |(mut patch, mut rng)| black_box(patch.place_all(2000, &mut rng)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_update_year(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_year");
    for &cohorts in &[4_u32, 16, 64] {
        let mut patch = gen_patch(cohorts, 2);
        let mut rng = StdRng::seed_from_u64(7);
        patch.update_year(2000, &mut rng);
        group.bench_function(format!("carry_forward_cohorts{cohorts}"), |b| {
            b.iter_batched(
                || (patch.clone(), StdRng::seed_from_u64(11)),
                |(mut patch, mut rng)| black_box(patch.update_year(2001, &mut rng)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_stand_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("stand");
    let years = 20;
    let mut rows = Vec::new();
    for p in 0..8 {
        for c in 0..8 {
            for y in 0..years {
                let density = 0.002 + 0.001 * f64::from((c as i32 + y) % 4);
                rows.push(row(p, c, 2000 + y, 4.0 + f64::from(c), density));
            }
        }
    }
    group.throughput(Throughput::Elements(years as u64));
    group.bench_function("next_year_all", |b| {
        b.iter_batched(
            || {
                let mut stand = PatchManager::new(StandConfig::default());
                for r in rows.iter().cloned() {
                    stand.add_data(r).unwrap();
                }
                stand
            },
            |mut stand| {
                while !stand.is_last_year() {
                    black_box(stand.next_year());
                }
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_cells,
    bench_place_all,
    bench_update_year,
    bench_stand_playback,
);
criterion_main!(benches);
