//! Octant sweep over the precomputed geometry.

use sightline_core::{CellCoord, TerrainView};
use sightline_geometry::{Octant, SlopeMask, VisibilityTable};

/// Reusable scratch for sweeping the canonical table around an origin.
///
/// `incoming[i]` holds the slopes that reach table entry `i` unblocked. Each
/// entry only ever receives slopes from its own two parents, so an occluder
/// removes its slopes from the branches that pass through it and from no
/// other branch.
#[derive(Clone, Debug)]
pub(crate) struct Sweep {
    incoming: Vec<SlopeMask>,
}

impl Sweep {
    pub(crate) fn new(table: &VisibilityTable) -> Self {
        Self {
            incoming: vec![SlopeMask::EMPTY; table.len()],
        }
    }

    /// Visits every cell within `radius` of `origin` that has line of sight.
    ///
    /// The origin and, for a positive radius, its eight neighbours are always
    /// visited. `visit` receives the row-major terrain index and the cell, and
    /// may be called more than once for cells on an octant boundary.
    pub(crate) fn run<F>(
        &mut self,
        table: &VisibilityTable,
        terrain: TerrainView<'_>,
        origin: CellCoord,
        radius: u32,
        mut visit: F,
    ) where
        F: FnMut(usize, CellCoord),
    {
        let Some(origin_index) = terrain.index(origin) else {
            return;
        };
        visit(origin_index, origin);

        if radius == 0 {
            return;
        }

        for octant in Octant::ALL {
            if let Some(neighbour) = octant.project(origin, 0, 1) {
                if let Some(index) = terrain.index(neighbour) {
                    visit(index, neighbour);
                }
            }
            if let Some(neighbour) = octant.project(origin, 1, 1) {
                if let Some(index) = terrain.index(neighbour) {
                    visit(index, neighbour);
                }
            }
        }

        if terrain.blocks_sight(origin) {
            return;
        }

        let limit = table.prefix_within(radius.min(table.radius()));
        let cells = &table.cells()[..limit];
        if self.incoming.len() != table.len() {
            self.incoming.resize(table.len(), SlopeMask::EMPTY);
        }

        for octant in Octant::ALL {
            self.incoming.fill(SlopeMask::EMPTY);
            self.incoming[0] = table.full_mask();

            for (entry, cell) in cells.iter().enumerate() {
                let visible = self.incoming[entry] & cell.mask();
                if visible.is_empty() {
                    continue;
                }

                let Some(target) = octant.project(origin, cell.dy(), cell.dx()) else {
                    continue;
                };
                let Some(index) = terrain.index(target) else {
                    continue;
                };

                visit(index, target);

                if terrain.blocks_sight(target) {
                    continue;
                }

                for next in cell.successors() {
                    self.incoming[next] |= visible;
                }
            }
        }
    }
}
