// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render adapter: per-year instance transforms for an external renderer.
//!
//! Scene coordinates are y-up. A tree at patch position `(x, y)` stands at
//! `(x, elevation, y)` relative to its patch origin.

use bitflags::bitflags;
use canopy_cohort::{Cohort, CohortId, PatchId, Year};
use canopy_patch::{Patch, YearUpdate};
use glam::{DQuat, DVec3};

bitflags! {
    /// Cohort flags controlling display.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CohortFlags: u8 {
        /// Cohort has trees to draw this year.
        const VISIBLE  = 0b0000_0001;
        /// Cohort is the current selection and should be highlighted.
        const SELECTED = 0b0000_0010;
    }
}

impl Default for CohortFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Crown mesh to instance for a cohort.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrownShape {
    /// Needle-leaved types.
    Cone,
    /// Every other type.
    Sphere,
}

impl CrownShape {
    /// Shape for a plant functional type id.
    pub fn for_pft(pft: u32) -> Self {
        if pft <= 2 { Self::Cone } else { Self::Sphere }
    }
}

/// Placement of one mesh instance: unit mesh scaled, rotated, then translated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InstanceTransform {
    /// Translation relative to the patch origin.
    pub translation: DVec3,
    /// Rotation.
    pub rotation: DQuat,
    /// Non-uniform scale.
    pub scale: DVec3,
}

impl InstanceTransform {
    /// Zero-scaled transform for unused instance slots.
    pub const HIDDEN: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ZERO,
    };

    /// Whether this slot draws nothing.
    pub fn is_hidden(&self) -> bool {
        self.scale == DVec3::ZERO
    }
}

/// Instances of one cohort for one year.
///
/// `boles` and `crowns` always hold one transform per instance slot of the cohort;
/// slots at or beyond `live` are [`InstanceTransform::HIDDEN`].
#[derive(Clone, Debug, PartialEq)]
pub struct CohortInstances {
    /// Cohort identity.
    pub id: CohortId,
    /// Display flags.
    pub flags: CohortFlags,
    /// Crown mesh.
    pub crown_shape: CrownShape,
    /// Number of drawn trees.
    pub live: usize,
    /// Stem transforms.
    pub boles: Vec<InstanceTransform>,
    /// Crown transforms.
    pub crowns: Vec<InstanceTransform>,
}

impl CohortInstances {
    /// Build the instances of `cohort` in `year` from its resolved positions.
    ///
    /// Grass and cohorts without data this year are not visible.
    pub fn build(cohort: &Cohort, year: Year, selected: bool) -> Self {
        let capacity = cohort.max_tree_count();
        let mut boles = vec![InstanceTransform::HIDDEN; capacity];
        let mut crowns = vec![InstanceTransform::HIDDEN; capacity];
        let mut flags = CohortFlags::empty();
        flags.set(CohortFlags::SELECTED, selected);

        let step = cohort.timestep(year).filter(|_| !cohort.is_grass());
        let Some(step) = step else {
            return Self {
                id: cohort.id(),
                flags,
                crown_shape: CrownShape::Sphere,
                live: 0,
                boles,
                crowns,
            };
        };
        flags.insert(CohortFlags::VISIBLE);

        let record = step.record();
        let live = record.tree_count(capacity);
        let radius = record.crown_radius();
        let crown_depth = (record.height - record.bole_height).max(0.0);
        for (&instance, p) in step.positions().range(..live) {
            boles[instance] = InstanceTransform {
                translation: DVec3::new(p.x, record.height / 2.0, p.y),
                rotation: DQuat::from_rotation_y(instance as f64),
                scale: DVec3::new(record.diameter, record.height, record.diameter),
            };
            crowns[instance] = InstanceTransform {
                translation: DVec3::new(p.x, record.bole_height + crown_depth / 2.0, p.y),
                rotation: DQuat::IDENTITY,
                scale: DVec3::new(radius, crown_depth, radius),
            };
        }

        Self {
            id: cohort.id(),
            flags,
            crown_shape: CrownShape::for_pft(record.pft),
            live,
            boles,
            crowns,
        }
    }
}

/// One patch of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchFrame {
    /// Patch identifier.
    pub id: PatchId,
    /// Scene position of the patch corner.
    pub origin: DVec3,
    /// Ground cover is present this year.
    pub grassy: bool,
    /// Cohorts in insertion order.
    pub cohorts: Vec<CohortInstances>,
}

impl PatchFrame {
    /// Build the frame of `patch` for a resolved `year`.
    pub fn build(patch: &Patch, year: Year, margin: f64, selected: Option<CohortId>) -> Self {
        Self {
            id: patch.id(),
            origin: patch_origin(patch, margin),
            grassy: patch.is_grassy(year),
            cohorts: patch
                .cohorts()
                .map(|c| CohortInstances::build(c, year, selected == Some(c.id())))
                .collect(),
        }
    }
}

/// Everything a renderer needs to draw one year.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Year shown.
    pub year: Year,
    /// Changes made to resolve the year, summed over patches.
    pub update: YearUpdate,
    /// Patches in identifier order.
    pub patches: Vec<PatchFrame>,
}

impl Frame {
    /// Instances of one cohort.
    pub fn cohort(&self, id: CohortId) -> Option<&CohortInstances> {
        self.patches
            .iter()
            .filter(|p| p.id == id.patch)
            .flat_map(|p| &p.cohorts)
            .find(|c| c.id == id)
    }
}

/// Scene position of a patch corner.
///
/// Patches are laid out on their stand grid coordinates with `margin` spacing and the
/// base elevation as height.
pub fn patch_origin(patch: &Patch, margin: f64) -> DVec3 {
    let side = patch.side_length();
    let grid = patch.grid_position();
    DVec3::new(
        grid.x * side * margin - side,
        patch.base_height(),
        grid.y * side * margin - side,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_cohort::CohortRecord;
    use canopy_patch::PatchConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeMap;

    fn record(cohort: u32, pft: u32, density: f64) -> CohortRecord {
        CohortRecord {
            id: CohortId::new(1, 3, cohort),
            year: 1900,
            pft,
            height: 20.0,
            bole_height: 8.0,
            diameter: 0.4,
            crown_area: 12.57,
            density,
            patch_x: 2.0,
            patch_y: 1.0,
            patch_height: 5.0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn crown_shape_follows_pft() {
        assert_eq!(CrownShape::for_pft(0), CrownShape::Cone);
        assert_eq!(CrownShape::for_pft(2), CrownShape::Cone);
        assert_eq!(CrownShape::for_pft(3), CrownShape::Sphere);
    }

    #[test]
    fn origin_spaces_patches_by_margin() {
        let config = PatchConfig {
            area: 100.0,
            ..PatchConfig::default()
        };
        let patch = Patch::from_record(&record(1, 0, 0.01), config);
        let origin = patch_origin(&patch, 1.05);
        assert!((origin.x - (2.0 * 10.0 * 1.05 - 10.0)).abs() < 1e-12);
        assert_eq!(origin.y, 5.0);
        assert!((origin.z - (10.0 * 1.05 - 10.0)).abs() < 1e-12);
    }

    #[test]
    fn live_instances_are_drawn_and_the_rest_hidden() {
        let mut patch = Patch::new(3, PatchConfig::default());
        patch.add_record(record(1, 1, 0.03), 10).unwrap();
        patch.add_record(record(2, 5, 0.0), 10).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        patch.update_year(1900, &mut rng);

        let id = CohortId::new(1, 3, 1);
        let frame = PatchFrame::build(&patch, 1900, 1.05, Some(id));
        let c = &frame.cohorts[0];
        assert_eq!(c.flags, CohortFlags::VISIBLE | CohortFlags::SELECTED);
        assert_eq!(c.crown_shape, CrownShape::Cone);
        assert_eq!(c.live, 0);
        assert!(c.boles.iter().all(InstanceTransform::is_hidden));

        let patch_dense = {
            let mut p = Patch::new(3, PatchConfig::default());
            p.add_record(record(1, 1, 0.3), 10).unwrap();
            p.update_year(1900, &mut rng);
            p
        };
        let frame = PatchFrame::build(&patch_dense, 1900, 1.05, None);
        let c = &frame.cohorts[0];
        assert_eq!(c.live, 3);
        assert_eq!(c.boles.len(), 10);
        assert_eq!(c.boles.iter().filter(|t| !t.is_hidden()).count(), 3);
        assert!(c.crowns[3..].iter().all(InstanceTransform::is_hidden));

        let position = patch_dense
            .cohort(id)
            .and_then(|k| k.timestep(1900))
            .and_then(|t| t.position(1))
            .unwrap();
        let crown = c.crowns[1];
        assert_eq!(crown.translation, DVec3::new(position.x, 14.0, position.y));
        assert_eq!(crown.scale.y, 12.0);
        assert_eq!(c.boles[1].scale, DVec3::new(0.4, 20.0, 0.4));
        assert!(!c.flags.contains(CohortFlags::SELECTED));
    }

    #[test]
    fn absent_cohort_is_not_visible() {
        let mut patch = Patch::new(3, PatchConfig::default());
        patch.add_record(record(1, 4, 0.3), 10).unwrap();
        let frame = PatchFrame::build(&patch, 1950, 1.05, None);
        assert!(frame.cohorts[0].flags.is_empty());
        assert_eq!(frame.cohorts[0].live, 0);
    }
}
