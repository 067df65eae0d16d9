#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Field-of-view system that derives `View`, `Seen` and `Mark` for a level.
//!
//! The system never owns terrain. Each recompute reads a [`TerrainView`],
//! sweeps the shared [`VisibilityTable`] around the viewer, resolves lighting
//! and finally promotes seen features into the remembered map.

mod actor;
mod illumination;
mod map;
mod memory;
mod sweep;

use std::sync::Arc;

use sightline_core::{CellCoord, LightSource, SightFlags, TerrainView, Viewer};
use sightline_geometry::VisibilityTable;

pub use actor::{ActorSight, ViewField};
pub use map::SightMap;

use illumination::LightField;
use sweep::Sweep;

/// Counts produced by a single recompute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SightReport {
    /// Cells in geometric line of sight.
    pub in_view: u32,
    /// Cells in view and illuminated.
    pub seen: u32,
    /// Cells remembered for the first time.
    pub newly_marked: u32,
}

/// Cells whose `Seen` state changed during a recompute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SightDelta {
    /// Cells that became seen, in row-major order.
    pub revealed: Vec<CellCoord>,
    /// Cells that stopped being seen, in row-major order.
    pub concealed: Vec<CellCoord>,
}

impl SightDelta {
    /// Reports whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty() && self.concealed.is_empty()
    }

    fn clear(&mut self) {
        self.revealed.clear();
        self.concealed.clear();
    }
}

/// Recomputes the player's field of view against a level's terrain.
#[derive(Clone, Debug)]
pub struct Visibility {
    table: Arc<VisibilityTable>,
    sweep: Sweep,
    lights: LightField,
    was_seen: Vec<bool>,
}

impl Visibility {
    /// Creates the system around a shared geometry table.
    #[must_use]
    pub fn new(table: Arc<VisibilityTable>) -> Self {
        let sweep = Sweep::new(&table);
        Self {
            table,
            sweep,
            lights: LightField::default(),
            was_seen: Vec::new(),
        }
    }

    /// Geometry the system sweeps.
    #[must_use]
    pub fn table(&self) -> &Arc<VisibilityTable> {
        &self.table
    }

    /// Rebuilds `View` and `Seen` for the viewer and extends `Mark`.
    ///
    /// Without a viewer every cell leaves view. `delta` is overwritten with
    /// the cells whose `Seen` state flipped compared to the previous call.
    pub fn recompute(
        &mut self,
        terrain: TerrainView<'_>,
        viewer: Option<&Viewer>,
        lights: &[LightSource],
        map: &mut SightMap,
        delta: &mut SightDelta,
    ) -> SightReport {
        debug_assert_eq!(terrain.dimensions(), map.dimensions());

        self.was_seen.clear();
        self.was_seen
            .extend((0..map.len()).map(|index| map.get(index).contains(SightFlags::SEEN)));
        map.clear_view();

        let mut report = SightReport::default();
        if let Some(viewer) = viewer {
            let radius = self.table.radius();
            self.sweep.run(&self.table, terrain, viewer.position, radius, |index, _| {
                map.insert(index, SightFlags::VIEW);
            });
            report.in_view = u32::try_from(map.count(SightFlags::VIEW)).unwrap_or(u32::MAX);

            self.lights.cast(&mut self.sweep, &self.table, terrain, lights);
            report.seen = illumination::resolve_seen(map, terrain, viewer, &self.lights);
            report.newly_marked = memory::mark_seen(map, terrain);
        }

        delta.clear();
        for (index, was_seen) in self.was_seen.iter().copied().enumerate() {
            let seen = map.get(index).contains(SightFlags::SEEN);
            if seen && !was_seen {
                delta.revealed.push(map.cell_at(index));
            } else if was_seen && !seen {
                delta.concealed.push(map.cell_at(index));
            }
        }

        log::debug!(
            "sight recomputed: in_view={} seen={} newly_marked={} revealed={} concealed={}",
            report.in_view,
            report.seen,
            report.newly_marked,
            delta.revealed.len(),
            delta.concealed.len()
        );
        report
    }

    /// Clears every remembered cell.
    pub fn forget(&self, map: &mut SightMap) {
        let forgotten = map.count(SightFlags::MARK);
        map.clear_marks();
        log::info!("forgot {forgotten} remembered cells");
    }
}

#[cfg(test)]
mod tests {
    use sightline_core::{Terrain, TerrainKind};

    use super::*;

    fn system(radius: u32) -> Visibility {
        Visibility::new(Arc::new(VisibilityTable::build(radius).expect("table builds")))
    }

    fn viewer(row: u32, column: u32, light_radius: u32) -> Viewer {
        Viewer {
            position: CellCoord::new(row, column),
            light_radius,
            blind: false,
        }
    }

    #[test]
    fn moving_away_conceals_dark_floor_but_keeps_features() {
        let mut cells = vec![Terrain::FLOOR; 12];
        cells[2] = Terrain::new(TerrainKind::Trap);
        let terrain = TerrainView::new(&cells, 1, 12);
        let mut map = SightMap::new(1, 12);
        let mut delta = SightDelta::default();
        let mut visibility = system(10);

        let first =
            visibility.recompute(terrain, Some(&viewer(0, 1, 1)), &[], &mut map, &mut delta);
        assert_eq!(first.seen, 3);
        assert_eq!(first.newly_marked, 1);
        assert_eq!(delta.revealed.len(), 3);
        assert!(delta.concealed.is_empty());

        let _ = visibility.recompute(terrain, Some(&viewer(0, 8, 1)), &[], &mut map, &mut delta);
        assert!(delta.concealed.contains(&CellCoord::new(0, 2)));
        assert!(!map.seen(CellCoord::new(0, 2)));
        assert!(map.marked(CellCoord::new(0, 2)));
        assert!(!map.marked(CellCoord::new(0, 1)));
    }

    #[test]
    fn no_viewer_clears_the_view() {
        let cells = vec![Terrain::FLOOR; 9];
        let terrain = TerrainView::new(&cells, 3, 3);
        let mut map = SightMap::new(3, 3);
        let mut delta = SightDelta::default();
        let mut visibility = system(4);

        let _ = visibility.recompute(terrain, Some(&viewer(1, 1, 1)), &[], &mut map, &mut delta);
        assert_eq!(map.count(SightFlags::SEEN), 9);

        let report = visibility.recompute(terrain, None, &[], &mut map, &mut delta);
        assert_eq!(report, SightReport::default());
        assert_eq!(map.count(SightFlags::VIEW), 0);
        assert_eq!(delta.concealed.len(), 9);
    }

    #[test]
    fn forgetting_keeps_the_current_view() {
        let cells = vec![Terrain::WALL; 9];
        let terrain = TerrainView::new(&cells, 3, 3);
        let mut map = SightMap::new(3, 3);
        let mut delta = SightDelta::default();
        let mut visibility = system(4);

        let _ = visibility.recompute(terrain, Some(&viewer(1, 1, 1)), &[], &mut map, &mut delta);
        assert_eq!(map.count(SightFlags::MARK), 9);

        visibility.forget(&mut map);
        assert_eq!(map.count(SightFlags::MARK), 0);
        assert_eq!(map.count(SightFlags::SEEN), 9);
    }
}
