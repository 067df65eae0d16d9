#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Sightline.
//!
//! A [`Level`] owns the terrain grid, the viewer, transient lights and the
//! sight flags. It is mutated exclusively through [`apply`], which reports
//! every outcome as an [`Event`], and inspected through [`query`].

use std::sync::Arc;

use sightline_core::{
    CellCoord, Command, Event, LightId, LightSource, RejectionReason, Terrain, TerrainKind,
    TerrainView, Viewer, MAX_GRID_CELLS,
};
use sightline_geometry::VisibilityTable;
use sightline_system_visibility::{SightDelta, SightMap, Visibility};

/// Authoritative state of a single dungeon level.
#[derive(Debug)]
pub struct Level {
    rows: u32,
    columns: u32,
    cells: Vec<Terrain>,
    viewer: Option<CellCoord>,
    light_radius: u32,
    blind: bool,
    lights: Vec<LightSource>,
    next_light: u32,
    sight: SightMap,
    visibility: Visibility,
    delta: SightDelta,
}

impl Level {
    /// Creates an empty level that sweeps the provided geometry.
    ///
    /// The table's radius bounds every sweep; `light_radius` is the viewer's
    /// initial carried light. The grid has no cells until
    /// [`Command::ConfigureLevel`] is applied.
    #[must_use]
    pub fn new(table: Arc<VisibilityTable>, light_radius: u32) -> Self {
        Self {
            rows: 0,
            columns: 0,
            cells: Vec::new(),
            viewer: None,
            light_radius,
            blind: false,
            lights: Vec::new(),
            next_light: 0,
            sight: SightMap::new(0, 0),
            visibility: Visibility::new(table),
            delta: SightDelta::default(),
        }
    }

    fn terrain_view(&self) -> TerrainView<'_> {
        TerrainView::new(&self.cells, self.rows, self.columns)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        sightline_core::grid_index(cell, self.rows, self.columns)
    }

    fn current_viewer(&self) -> Option<Viewer> {
        self.viewer.map(|position| Viewer {
            position,
            light_radius: self.light_radius,
            blind: self.blind,
        })
    }

    fn reset(&mut self, rows: u32, columns: u32, capacity: usize) {
        self.rows = rows;
        self.columns = columns;
        self.cells = vec![Terrain::FLOOR; capacity];
        self.viewer = None;
        self.lights.clear();
        self.sight = SightMap::new(rows, columns);
        self.delta = SightDelta::default();
    }

    /// Recomputes sight for the current viewer, if any, and reports it.
    fn refresh(&mut self, out_events: &mut Vec<Event>) {
        let Some(viewer) = self.current_viewer() else {
            return;
        };

        let terrain = TerrainView::new(&self.cells, self.rows, self.columns);
        let report = self.visibility.recompute(
            terrain,
            Some(&viewer),
            &self.lights,
            &mut self.sight,
            &mut self.delta,
        );

        out_events.push(Event::SightRecomputed {
            in_view: report.in_view,
            seen: report.seen,
            newly_marked: report.newly_marked,
        });
        if !self.delta.is_empty() {
            out_events.push(Event::SightChanged {
                revealed: self.delta.revealed.clone(),
                concealed: self.delta.concealed.clone(),
            });
        }
    }

    fn replace_terrain(
        &mut self,
        index: usize,
        cell: CellCoord,
        terrain: Terrain,
        out_events: &mut Vec<Event>,
    ) {
        let previous = self.cells[index];
        self.cells[index] = terrain;
        out_events.push(Event::TerrainChanged { cell, terrain });

        if affects_sight(previous, terrain) {
            self.refresh(out_events);
        }
    }
}

/// Reports whether swapping `previous` for `next` can change any sight flag.
fn affects_sight(previous: Terrain, next: Terrain) -> bool {
    previous.blocks_sight() != next.blocks_sight()
        || previous.is_glowing() != next.is_glowing()
        || previous.kind().is_notable() != next.kind().is_notable()
}

fn grid_capacity(rows: u32, columns: u32) -> Option<usize> {
    let cells = u64::from(rows) * u64::from(columns);
    if cells > MAX_GRID_CELLS {
        return None;
    }
    usize::try_from(cells).ok()
}

fn reject(out_events: &mut Vec<Event>, command: &str, reason: RejectionReason) {
    log::warn!("rejected {command}: {reason:?}");
    out_events.push(Event::CommandRejected { reason });
}

/// Applies the provided command to the level, mutating state deterministically.
pub fn apply(level: &mut Level, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel { rows, columns } => {
            let Some(capacity) = grid_capacity(rows, columns) else {
                reject(out_events, "configure level", RejectionReason::GridTooLarge);
                return;
            };
            level.reset(rows, columns, capacity);
            log::info!("configured {rows}x{columns} level");
            out_events.push(Event::LevelConfigured { rows, columns });
        }
        Command::SetTerrain { cell, terrain } => {
            let Some(index) = level.index(cell) else {
                reject(out_events, "set terrain", RejectionReason::OutOfBounds);
                return;
            };
            level.replace_terrain(index, cell, terrain, out_events);
        }
        Command::OpenDoor { cell } => toggle_door(
            level,
            cell,
            TerrainKind::ClosedDoor,
            TerrainKind::OpenDoor,
            out_events,
        ),
        Command::CloseDoor { cell } => toggle_door(
            level,
            cell,
            TerrainKind::OpenDoor,
            TerrainKind::ClosedDoor,
            out_events,
        ),
        Command::PlaceViewer { cell } => recompute(level, cell, out_events),
        Command::StepViewer { direction } => {
            let Some(from) = level.viewer else {
                reject(out_events, "step", RejectionReason::NoViewer);
                return;
            };
            let Some(to) = from
                .step(direction)
                .filter(|cell| level.index(*cell).is_some())
            else {
                reject(out_events, "step", RejectionReason::OutOfBounds);
                return;
            };
            let passable = level
                .terrain_view()
                .terrain(to)
                .is_some_and(|terrain| terrain.kind().is_passable());
            if !passable {
                reject(out_events, "step", RejectionReason::Blocked);
                return;
            }
            recompute(level, to, out_events);
        }
        Command::SetLightRadius { radius } => {
            level.light_radius = radius;
            level.refresh(out_events);
        }
        Command::SetBlind { blind } => {
            level.blind = blind;
            level.refresh(out_events);
        }
        Command::AddLight { center, radius } => {
            if level.index(center).is_none() {
                reject(out_events, "add light", RejectionReason::OutOfBounds);
                return;
            }
            if radius > level.visibility.table().radius() {
                reject(out_events, "add light", RejectionReason::RadiusTooLarge);
                return;
            }

            let light = LightSource {
                id: LightId::new(level.next_light),
                center,
                radius,
            };
            level.next_light = level.next_light.wrapping_add(1);
            level.lights.push(light);
            out_events.push(Event::LightAdded { light });
            level.refresh(out_events);
        }
        Command::RemoveLight { light } => {
            let Some(position) = level.lights.iter().position(|source| source.id == light) else {
                reject(out_events, "remove light", RejectionReason::UnknownLight);
                return;
            };
            let _ = level.lights.remove(position);
            out_events.push(Event::LightRemoved { light });
            level.refresh(out_events);
        }
        Command::RecomputeSight => {
            if level.viewer.is_none() {
                reject(out_events, "recompute", RejectionReason::NoViewer);
                return;
            }
            level.refresh(out_events);
        }
        Command::ForgetMap => {
            level.visibility.forget(&mut level.sight);
            out_events.push(Event::MapForgotten);
        }
    }
}

fn toggle_door(
    level: &mut Level,
    cell: CellCoord,
    from: TerrainKind,
    to: TerrainKind,
    out_events: &mut Vec<Event>,
) {
    let Some(index) = level.index(cell) else {
        reject(out_events, "door toggle", RejectionReason::OutOfBounds);
        return;
    };
    let current = level.cells[index];
    if current.kind() != from {
        reject(out_events, "door toggle", RejectionReason::NotADoor);
        return;
    }
    let terrain = Terrain::new(to).with_glow(current.is_glowing());
    level.replace_terrain(index, cell, terrain, out_events);
}

/// Moves the viewer to `position` and recomputes its sight.
///
/// This is the entry point the turn loop calls after every viewer move. A
/// position outside the grid is rejected and leaves the level untouched.
pub fn recompute(level: &mut Level, position: CellCoord, out_events: &mut Vec<Event>) {
    if level.index(position).is_none() {
        reject(out_events, "place viewer", RejectionReason::OutOfBounds);
        return;
    }

    let from = level.viewer.replace(position);
    if from != Some(position) {
        out_events.push(Event::ViewerMoved { from, to: position });
    }
    level.refresh(out_events);
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use sightline_core::{CellCoord, LightSource, Terrain, TerrainView, Viewer};
    use sightline_system_visibility::SightMap;

    use super::Level;

    /// Dimensions of the grid as `(rows, columns)`.
    #[must_use]
    pub fn dimensions(level: &Level) -> (u32, u32) {
        (level.rows, level.columns)
    }

    /// Terrain stored at the cell, if it lies inside the grid.
    #[must_use]
    pub fn terrain(level: &Level, cell: CellCoord) -> Option<Terrain> {
        level.terrain_view().terrain(cell)
    }

    /// Read-only view of the terrain grid for sight systems.
    #[must_use]
    pub fn terrain_view(level: &Level) -> TerrainView<'_> {
        level.terrain_view()
    }

    /// Current viewer, if one has been placed.
    #[must_use]
    pub fn viewer(level: &Level) -> Option<Viewer> {
        level.current_viewer()
    }

    /// Transient lights currently burning, in insertion order.
    #[must_use]
    pub fn lights(level: &Level) -> &[LightSource] {
        &level.lights
    }

    /// Sight flags of every cell.
    #[must_use]
    pub fn sight_map(level: &Level) -> &SightMap {
        &level.sight
    }

    /// Reports whether the cell is in the viewer's line of sight.
    #[must_use]
    pub fn in_view(level: &Level, cell: CellCoord) -> bool {
        level.sight.in_view(cell)
    }

    /// Reports whether the viewer currently perceives the cell.
    #[must_use]
    pub fn seen(level: &Level, cell: CellCoord) -> bool {
        level.sight.seen(cell)
    }

    /// Reports whether the cell is remembered.
    #[must_use]
    pub fn marked(level: &Level, cell: CellCoord) -> bool {
        level.sight.marked(cell)
    }

    /// Octagonal distance from the viewer to the cell, if a viewer exists.
    #[must_use]
    pub fn distance_from_viewer(level: &Level, cell: CellCoord) -> Option<u32> {
        level.viewer.map(|position| position.distance(cell))
    }
}
