// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Randomized greedy placement of a single tree.

use kurbo::Point;
use rand::Rng;

use crate::cells::{CellGrid, Occupant};

/// How a tree ended up on the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Drawn from the available cells.
    Free,
    /// No cell was available; drawn from all cells and may overlap another crown.
    Overlapping,
    /// The grid has no cells at all. The tree sits at the patch corner.
    Unplaced,
}

/// Place one tree and close its exclusion zone to later trees.
///
/// The position is drawn uniformly from the available cells, or from every cell when
/// none is left. All cells within `exclusion_radius` of the drawn position are then
/// claimed by `occupant`.
pub fn place_tree<R: Rng + ?Sized>(
    grid: &mut CellGrid,
    exclusion_radius: f64,
    occupant: Occupant,
    rng: &mut R,
) -> (Point, Placement) {
    let (index, placement) = match grid.pick_available(rng) {
        Some(i) => (i, Placement::Free),
        None => match grid.pick_any(rng) {
            Some(i) => (i, Placement::Overlapping),
            None => return (Point::ZERO, Placement::Unplaced),
        },
    };
    let Some(position) = grid.cell(index).map(|c| c.position) else {
        return (Point::ZERO, Placement::Unplaced);
    };
    grid.claim(position, exclusion_radius, occupant);
    (position, placement)
}
