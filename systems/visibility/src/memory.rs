//! Promotes seen cells into the viewer's permanent memory.

use sightline_core::{SightFlags, Terrain, TerrainView};

use crate::map::SightMap;

/// Reports whether a seen cell with this terrain is worth remembering.
///
/// Plain floor is only remembered while it glows; every other feature is
/// remembered once seen.
pub(crate) const fn is_memorable(terrain: Terrain) -> bool {
    terrain.kind().is_notable() || terrain.is_glowing()
}

/// Sets `Mark` on every seen, memorable cell and returns how many were new.
///
/// Marks are never cleared here.
pub(crate) fn mark_seen(map: &mut SightMap, terrain: TerrainView<'_>) -> u32 {
    let mut newly_marked = 0;
    for index in 0..map.len() {
        let flags = map.get(index);
        if !flags.contains(SightFlags::SEEN) || flags.contains(SightFlags::MARK) {
            continue;
        }

        let cell = map.cell_at(index);
        if terrain.terrain(cell).is_some_and(is_memorable) {
            map.insert(index, SightFlags::MARK);
            newly_marked += 1;
        }
    }
    newly_marked
}
