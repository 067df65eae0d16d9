//! Line of sight for actors other than the player.

use std::sync::Arc;

use sightline_core::{CellCoord, TerrainView};
use sightline_geometry::VisibilityTable;

use crate::sweep::Sweep;

/// Cells an actor has line of sight to, captured by [`ActorSight::compute`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewField {
    origin: Option<CellCoord>,
    rows: u32,
    columns: u32,
    visible: Vec<bool>,
}

impl ViewField {
    /// Cell the field was computed from, if any.
    #[must_use]
    pub const fn origin(&self) -> Option<CellCoord> {
        self.origin
    }

    /// Reports whether the actor can see the cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        sightline_core::grid_index(cell, self.rows, self.columns)
            .and_then(|index| self.visible.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of visible cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.iter().filter(|visible| **visible).count()
    }

    /// Reports whether no cell is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.visible.iter().any(|visible| *visible)
    }
}

/// Sight checks for monsters and other actors.
///
/// Runs the same sweep as the player's view but writes into its own
/// [`ViewField`], leaving every level flag untouched. One instance can be
/// reused for any number of actors in turn.
#[derive(Clone, Debug)]
pub struct ActorSight {
    table: Arc<VisibilityTable>,
    sweep: Sweep,
    field: ViewField,
}

impl ActorSight {
    /// Creates a sight checker sharing the provided geometry.
    #[must_use]
    pub fn new(table: Arc<VisibilityTable>) -> Self {
        let sweep = Sweep::new(&table);
        Self {
            table,
            sweep,
            field: ViewField::default(),
        }
    }

    /// Computes what an actor at `origin` sees within `radius`.
    ///
    /// The radius is clamped to the radius of the shared geometry.
    pub fn compute(
        &mut self,
        terrain: TerrainView<'_>,
        origin: CellCoord,
        radius: u32,
    ) -> &ViewField {
        let (rows, columns) = terrain.dimensions();
        let len = rows as usize * columns as usize;
        if self.field.visible.len() != len {
            self.field.visible = vec![false; len];
        } else {
            self.field.visible.fill(false);
        }
        self.field.rows = rows;
        self.field.columns = columns;
        self.field.origin = terrain.contains(origin).then_some(origin);

        let visible = &mut self.field.visible;
        self.sweep.run(&self.table, terrain, origin, radius, |index, _| {
            visible[index] = true;
        });

        &self.field
    }

    /// Reports whether an actor at `origin` can see `target` within `radius`.
    pub fn can_see(
        &mut self,
        terrain: TerrainView<'_>,
        origin: CellCoord,
        target: CellCoord,
        radius: u32,
    ) -> bool {
        if origin.distance(target) > radius.min(self.table.radius()) {
            return false;
        }
        self.compute(terrain, origin, radius).contains(target)
    }
}
