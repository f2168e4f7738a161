// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell layers: the candidate tree positions of one patch in one year.

use core::fmt::Debug;

use canopy_cohort::CohortId;
use kurbo::{Point, Rect, Vec2};
use rand::Rng;

/// Tree instance claiming a cell.
///
/// This is an identity, not a reference: resolve the cohort through the patch that owns
/// the layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Occupant {
    /// Cohort of the tree.
    pub cohort: CohortId,
    /// Instance index of the tree within its cohort.
    pub instance: usize,
}

/// A candidate position in the patch frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PatchCell {
    /// Position relative to the patch corner.
    pub position: Point,
    /// Tree whose footprint covers this cell, if any.
    pub occupant: Option<Occupant>,
}

impl PatchCell {
    /// Whether no tree claims this cell.
    pub fn is_available(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Regular grid of cells covering `[0, side) × [0, side)` plus the set of cells still
/// open for new trees.
///
/// Cells are stored in x-major order by integer grid coordinate, so a radius query only
/// visits the index rectangle covering the circle's bounding box. The available set
/// supports O(1) removal and O(1) uniform draws.
///
/// A layer carried into a later year may retire cells: they keep their index but are
/// no longer part of the layer, so no query, draw or count sees them.
#[derive(Clone)]
pub struct CellGrid {
    step: f64,
    columns: usize,
    rows: usize,
    cells: Vec<PatchCell>,
    retired: Vec<bool>,
    // Indices of the cells that are not retired, ascending.
    live: Vec<usize>,
    available: Vec<usize>,
    // Position of each cell in `available`, if present.
    slots: Vec<Option<usize>>,
}

impl CellGrid {
    /// Create a grid of unoccupied cells spaced `step` apart over a square of side
    /// `side_length`.
    ///
    /// A non-positive side gives an empty grid.
    pub fn new(side_length: f64, step: f64) -> Self {
        assert!(step > 0.0 && step.is_finite(), "cell side must be positive");
        let n = steps_below(side_length, step);
        let mut cells = Vec::with_capacity(n * n);
        for ix in 0..n {
            for iy in 0..n {
                cells.push(PatchCell {
                    position: Point::new(ix as f64 * step, iy as f64 * step),
                    occupant: None,
                });
            }
        }
        let retired = vec![false; cells.len()];
        Self::from_parts(step, n, n, cells, retired)
    }

    fn from_parts(
        step: f64,
        columns: usize,
        rows: usize,
        cells: Vec<PatchCell>,
        retired: Vec<bool>,
    ) -> Self {
        let live = (0..cells.len()).filter(|&i| !retired[i]).collect();
        let mut grid = Self {
            step,
            columns,
            rows,
            cells,
            retired,
            live,
            available: Vec::new(),
            slots: Vec::new(),
        };
        grid.rebuild_available();
        grid
    }

    /// Grid spacing.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of cells along x and y.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Number of cells in the layer.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True if the layer has no cells.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Every cell of the layer, available or not, in index order.
    pub fn cells(&self) -> impl Iterator<Item = &PatchCell> + '_ {
        self.live.iter().map(|&i| &self.cells[i])
    }

    /// Cell at `index`; `None` past the grid or for a retired cell.
    pub fn cell(&self, index: usize) -> Option<&PatchCell> {
        self.cells.get(index).filter(|_| !self.retired[index])
    }

    /// Number of cells retired from the full grid.
    pub fn retired_len(&self) -> usize {
        self.cells.len() - self.live.len()
    }

    /// Number of cells open for new trees.
    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    /// Cells open for new trees.
    pub fn available(&self) -> impl Iterator<Item = &PatchCell> + '_ {
        self.available.iter().map(|&i| &self.cells[i])
    }

    /// Cells claimed by a tree.
    pub fn occupied(&self) -> impl Iterator<Item = &PatchCell> + '_ {
        self.cells().filter(|c| !c.is_available())
    }

    /// Bounding rectangle of the cell positions' extent.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.columns as f64 * self.step,
            self.rows as f64 * self.step,
        )
    }

    /// Draw an available cell uniformly at random.
    pub fn pick_available<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.available.is_empty() {
            return None;
        }
        Some(self.available[rng.random_range(0..self.available.len())])
    }

    /// Draw any cell of the layer uniformly at random, occupied or not.
    pub fn pick_any<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.live.is_empty() {
            return None;
        }
        Some(self.live[rng.random_range(0..self.live.len())])
    }

    /// Indices of the cells within Euclidean distance `radius` of `center`.
    ///
    /// The radius is capped at the grid diagonal; a cap-sized radius reaches every cell
    /// from anywhere on the grid.
    pub fn within(&self, center: Point, radius: f64) -> impl Iterator<Item = usize> + '_ {
        let radius = if radius.is_nan() {
            0.0
        } else {
            radius.clamp(0.0, self.diagonal())
        };
        let xs = self.axis_range(center.x - radius, center.x + radius, self.columns);
        let ys = self.axis_range(center.y - radius, center.y + radius, self.rows);
        xs.flat_map(move |ix| ys.clone().map(move |iy| ix * self.rows + iy))
            .filter(move |&i| {
                !self.retired[i] && self.cells[i].position.distance(center) <= radius
            })
    }

    /// Mark every cell within `radius` of `center` as occupied by `occupant` and close
    /// them to later trees. Returns the number of cells claimed.
    ///
    /// Cells already claimed by another tree are taken over.
    pub fn claim(&mut self, center: Point, radius: f64, occupant: Occupant) -> usize {
        let hits: Vec<usize> = self.within(center, radius).collect();
        for &i in &hits {
            self.cells[i].occupant = Some(occupant);
            self.take_available(i);
        }
        hits.len()
    }

    /// Free every cell whose occupant matches `pred`, then recompute the available set.
    /// Returns the number of cells freed.
    pub fn release(&mut self, mut pred: impl FnMut(&Occupant) -> bool) -> usize {
        let mut freed = 0;
        // Retired cells carry no occupant.
        for cell in &mut self.cells {
            if cell.occupant.as_ref().is_some_and(&mut pred) {
                cell.occupant = None;
                freed += 1;
            }
        }
        if freed > 0 {
            self.rebuild_available();
        }
        freed
    }

    /// Copy this layer for another year.
    ///
    /// Cells whose occupant is rejected by `keep` are left out of the copy: they are
    /// retired, not freed. Retired cells stay retired in later copies.
    pub fn carry_forward(&self, mut keep: impl FnMut(&Occupant) -> bool) -> Self {
        let mut retired = self.retired.clone();
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let occupant = c.occupant.filter(|o| keep(o));
                if occupant.is_none() && c.occupant.is_some() {
                    retired[i] = true;
                }
                PatchCell {
                    position: c.position,
                    occupant,
                }
            })
            .collect();
        Self::from_parts(self.step, self.columns, self.rows, cells, retired)
    }

    /// Whether the available set is exactly the set of unoccupied cells of the layer.
    pub fn is_partitioned(&self) -> bool {
        let free = self.cells().filter(|c| c.is_available()).count();
        free == self.available.len()
            && self.available.iter().enumerate().all(|(pos, &i)| {
                self.cell(i).is_some_and(PatchCell::is_available)
                    && self.slots.get(i).copied().flatten() == Some(pos)
            })
    }

    fn diagonal(&self) -> f64 {
        let size = self.bounds().size();
        Vec2::new(size.width, size.height).hypot()
    }

    // Conservative index range covering [lo, hi] on one axis; the distance filter in
    // `within` does the exact test.
    fn axis_range(&self, lo: f64, hi: f64, len: usize) -> core::ops::Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let max = (len - 1) as f64;
        let first = (lo / self.step).floor().clamp(0.0, max);
        let last = (hi / self.step).ceil().clamp(0.0, max);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Both ends are clamped to valid indices."
        )]
        let range = (first as usize)..(last as usize + 1);
        range
    }

    fn take_available(&mut self, index: usize) {
        if let Some(pos) = self.slots[index].take() {
            self.available.swap_remove(pos);
            if let Some(&moved) = self.available.get(pos) {
                self.slots[moved] = Some(pos);
            }
        }
    }

    fn rebuild_available(&mut self) {
        self.available.clear();
        self.slots.clear();
        self.slots.resize(self.cells.len(), None);
        for &i in &self.live {
            if self.cells[i].is_available() {
                self.slots[i] = Some(self.available.len());
                self.available.push(i);
            }
        }
    }
}

// The available set is derived from the cells; its order depends on claim history.
impl PartialEq for CellGrid {
    fn eq(&self, other: &Self) -> bool {
        self.step == other.step
            && self.columns == other.columns
            && self.rows == other.rows
            && self.cells == other.cells
            && self.retired == other.retired
    }
}

impl Debug for CellGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellGrid")
            .field("step", &self.step)
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("cells", &self.live.len())
            .field("retired", &self.retired_len())
            .field("available", &self.available.len())
            .finish_non_exhaustive()
    }
}

/// Number of multiples of `step` (starting at zero) strictly below `side`.
fn steps_below(side: f64, step: f64) -> usize {
    if side.is_nan() || side <= 0.0 || side.is_infinite() {
        return 0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "side / step is positive and finite; grids this large do not fit in memory anyway."
    )]
    let mut n = (side / step).ceil() as usize;
    while n > 0 && (n - 1) as f64 * step >= side {
        n -= 1;
    }
    while (n as f64) * step < side {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn occupant(instance: usize) -> Occupant {
        Occupant {
            cohort: CohortId::new(1, 1, 1),
            instance,
        }
    }

    #[test]
    fn grid_covers_half_open_square() {
        let grid = CellGrid::new(1.0, 0.3);
        assert_eq!(grid.dimensions(), (4, 4));
        assert_eq!(grid.len(), 16);
        assert_eq!(grid.available_len(), 16);
        assert!(grid.cells().all(|c| c.position.x < 1.0 && c.position.y < 1.0));
        assert!(grid.is_partitioned());

        let grid = CellGrid::new(1000_f64.sqrt(), 0.3);
        assert_eq!(grid.dimensions(), (106, 106));
    }

    #[test]
    fn empty_side_gives_empty_grid() {
        let grid = CellGrid::new(0.0, 0.3);
        assert!(grid.is_empty());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(grid.pick_available(&mut rng), None);
        assert_eq!(grid.pick_any(&mut rng), None);
        assert_eq!(grid.within(Point::ZERO, 10.0).count(), 0);
    }

    #[test]
    fn within_matches_brute_force() {
        let grid = CellGrid::new(10.0, 0.5);
        let probes = [
            (Point::new(5.0, 5.0), 1.0),
            (Point::new(0.0, 0.0), 1.3),
            (Point::new(9.5, 0.2), 2.0),
            (Point::new(-1.0, 4.0), 1.5),
            (Point::new(3.25, 7.75), 0.0),
            (Point::new(2.0, 2.0), 0.5),
        ];
        for (center, radius) in probes {
            let mut fast: Vec<usize> = grid.within(center, radius).collect();
            fast.sort_unstable();
            let slow: Vec<usize> = (0..grid.len())
                .filter(|&i| grid.cell(i).unwrap().position.distance(center) <= radius)
                .collect();
            assert_eq!(fast, slow, "center {center:?} radius {radius}");
        }
    }

    #[test]
    fn claim_closes_cells_and_release_reopens_them() {
        let mut grid = CellGrid::new(5.0, 0.5);
        let total = grid.len();
        let claimed = grid.claim(Point::new(2.5, 2.5), 1.0, occupant(0));
        assert!(claimed > 1);
        assert_eq!(grid.available_len(), total - claimed);
        assert_eq!(grid.occupied().count(), claimed);
        assert!(grid.available().all(|c| c.position.distance(Point::new(2.5, 2.5)) > 1.0));
        assert!(grid.is_partitioned());

        let other = grid.claim(Point::new(0.0, 0.0), 0.5, occupant(1));
        assert!(grid.is_partitioned());

        assert_eq!(grid.release(|o| o.instance == 0), claimed);
        assert_eq!(grid.available_len(), total - other);
        assert!(grid.is_partitioned());
    }

    #[test]
    fn claim_takes_over_occupied_cells() {
        let mut grid = CellGrid::new(3.0, 1.0);
        grid.claim(Point::new(1.0, 1.0), 0.0, occupant(0));
        grid.claim(Point::new(1.0, 1.0), 0.0, occupant(1));
        let owners: Vec<_> = grid.occupied().map(|c| c.occupant).collect();
        assert_eq!(owners, [Some(occupant(1))]);
        assert!(grid.is_partitioned());
    }

    #[test]
    fn carry_forward_retires_rejected_cells() {
        let mut grid = CellGrid::new(4.0, 0.5);
        let dropped = grid.claim(Point::new(1.0, 1.0), 0.6, occupant(0));
        let kept = grid.claim(Point::new(3.0, 3.0), 0.6, occupant(1));
        let next = grid.carry_forward(|o| o.instance == 1);
        assert_eq!(next.len(), grid.len() - dropped);
        assert_eq!(next.retired_len(), dropped);
        assert_eq!(next.occupied().count(), kept);
        assert_eq!(next.available_len(), next.len() - kept);
        assert!(next.is_partitioned());
        // The source layer is untouched.
        assert_eq!(grid.occupied().count(), dropped + kept);
        assert_eq!(grid.retired_len(), 0);

        // Retired cells are invisible to queries and draws.
        assert_eq!(next.within(Point::new(1.0, 1.0), 0.6).count(), 0);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let i = next.pick_any(&mut rng).unwrap();
            assert!(next.cell(i).is_some());
        }

        // Claims leave them alone and later copies keep them out.
        let mut next = next;
        next.claim(Point::new(1.0, 1.0), 2.0, occupant(2));
        assert_eq!(next.retired_len(), dropped);
        let later = next.carry_forward(|_| true);
        assert_eq!(later.len(), next.len());
        assert!(later.is_partitioned());
    }

    #[test]
    fn picks_respect_availability() {
        let mut grid = CellGrid::new(2.0, 1.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..grid.len() {
            let i = grid.pick_available(&mut rng).unwrap();
            let cell = grid.cell(i).unwrap();
            assert!(cell.is_available());
            let center = cell.position;
            grid.claim(center, 0.0, occupant(i));
        }
        assert_eq!(grid.pick_available(&mut rng), None);
        assert!(grid.pick_any(&mut rng).is_some());
    }

    #[test]
    fn oversized_radius_reaches_every_cell() {
        let mut grid = CellGrid::new(3.0, 0.5);
        let claimed = grid.claim(Point::new(0.0, 0.0), 1.0e12, occupant(0));
        assert_eq!(claimed, grid.len());
        assert_eq!(grid.available_len(), 0);
        let claimed = grid.claim(Point::new(0.0, 0.0), f64::INFINITY, occupant(1));
        assert_eq!(claimed, grid.len());
    }
}
