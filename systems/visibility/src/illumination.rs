//! Derives `Seen` from `View` and the light reaching each cell.

use sightline_core::{LightSource, SightFlags, TerrainView, Viewer};
use sightline_geometry::VisibilityTable;

use crate::{map::SightMap, sweep::Sweep};

/// Scratch grid of cells lit by transient light sources.
#[derive(Clone, Debug, Default)]
pub(crate) struct LightField {
    lit: Vec<bool>,
}

impl LightField {
    /// Clears the field and casts every light over the terrain.
    ///
    /// Lights are occluded by the same geometry as sight: a light only
    /// reaches cells it has an unblocked line to.
    pub(crate) fn cast(
        &mut self,
        sweep: &mut Sweep,
        table: &VisibilityTable,
        terrain: TerrainView<'_>,
        lights: &[LightSource],
    ) {
        let (rows, columns) = terrain.dimensions();
        let len = rows as usize * columns as usize;
        if self.lit.len() != len {
            self.lit = vec![false; len];
        } else {
            self.lit.fill(false);
        }

        for light in lights {
            let lit = &mut self.lit;
            sweep.run(table, terrain, light.center, light.radius, |index, _| {
                lit[index] = true;
            });
        }
    }

    pub(crate) fn is_lit(&self, index: usize) -> bool {
        self.lit.get(index).copied().unwrap_or(false)
    }
}

/// Sets `Seen` on every cell in view that is illuminated, returning the count.
///
/// A cell is illuminated when it glows permanently, lies within the light
/// the viewer carries, or is reached by a transient light. A blind viewer
/// perceives nothing.
pub(crate) fn resolve_seen(
    map: &mut SightMap,
    terrain: TerrainView<'_>,
    viewer: &Viewer,
    lights: &LightField,
) -> u32 {
    if viewer.blind {
        return 0;
    }

    let mut seen = 0;
    for index in 0..map.len() {
        if !map.get(index).contains(SightFlags::VIEW) {
            continue;
        }

        let cell = map.cell_at(index);
        let glowing = terrain.terrain(cell).is_some_and(|terrain| terrain.is_glowing());
        let carried =
            viewer.light_radius > 0 && viewer.position.distance(cell) <= viewer.light_radius;

        if glowing || carried || lights.is_lit(index) {
            map.insert(index, SightFlags::SEEN);
            seen += 1;
        }
    }
    seen
}
