#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sightline engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level, and the pure sight systems. Adapters submit
//! [`Command`] values describing desired mutations, the level executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Systems read terrain through [`TerrainView`] and
//! never touch level storage directly.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Maximum sight radius used when no configuration overrides it.
pub const DEFAULT_MAX_SIGHT_RADIUS: u32 = 20;

/// Viewer light radius used when no configuration overrides it.
pub const DEFAULT_LIGHT_RADIUS: u32 = 1;

/// Largest number of cells a level grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Approximates the Euclidean distance between two grid positions.
///
/// The metric is octagonal: the longer axis delta plus half of the shorter
/// one, rounded down. It never needs a square root and is exposed to any
/// collaborator that wants cheap range checks.
#[must_use]
pub const fn distance(y1: i32, x1: i32, y2: i32, x2: i32) -> u32 {
    let dy = y1.abs_diff(y2);
    let dx = x1.abs_diff(x2);
    if dy > dx {
        dy + dx / 2
    } else {
        dx + dy / 2
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Octagonal distance between two cells, see [`distance`].
    #[must_use]
    pub const fn distance(self, other: CellCoord) -> u32 {
        let dy = self.row.abs_diff(other.row);
        let dx = self.column.abs_diff(other.column);
        if dy > dx {
            dy + dx / 2
        } else {
            dx + dy / 2
        }
    }

    /// Returns the neighbouring cell in the provided direction, if it exists.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dy, dx) = direction.delta();
        let row = i64::from(self.row) + i64::from(dy);
        let column = i64::from(self.column) + i64::from(dx);
        let row = u32::try_from(row).ok()?;
        let column = u32::try_from(column).ok()?;
        Some(Self { row, column })
    }
}

/// Compass directions available to a viewer taking a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Diagonal movement up and to the right.
    NorthEast,
    /// Movement toward increasing column indices.
    East,
    /// Diagonal movement down and to the right.
    SouthEast,
    /// Movement toward increasing row indices.
    South,
    /// Diagonal movement down and to the left.
    SouthWest,
    /// Movement toward decreasing column indices.
    West,
    /// Diagonal movement up and to the left.
    NorthWest,
}

impl Direction {
    /// All eight directions in clockwise order starting at north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Row and column delta applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::NorthEast => (-1, 1),
            Self::East => (0, 1),
            Self::SouthEast => (1, 1),
            Self::South => (1, 0),
            Self::SouthWest => (1, -1),
            Self::West => (0, -1),
            Self::NorthWest => (-1, -1),
        }
    }
}

/// Feature occupying a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Plain open floor.
    #[default]
    Floor,
    /// Ordinary granite wall.
    Wall,
    /// Wall that can never be tunnelled or destroyed.
    PermanentWall,
    /// Pile of rubble that blocks movement and sight.
    Rubble,
    /// Door standing open.
    OpenDoor,
    /// Door standing closed.
    ClosedDoor,
    /// Trap laid into the floor.
    Trap,
    /// Staircase leading to the level above.
    UpStaircase,
    /// Staircase leading to the level below.
    DownStaircase,
}

impl TerrainKind {
    /// Reports whether the feature stops line of sight.
    #[must_use]
    pub const fn blocks_sight(self) -> bool {
        matches!(
            self,
            Self::Wall | Self::PermanentWall | Self::Rubble | Self::ClosedDoor
        )
    }

    /// Reports whether a viewer may stand on the feature.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !self.blocks_sight()
    }

    /// Reports whether the feature is remembered once seen.
    ///
    /// Everything other than plain floor is notable.
    #[must_use]
    pub const fn is_notable(self) -> bool {
        !matches!(self, Self::Floor)
    }
}

/// Terrain classification of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terrain {
    kind: TerrainKind,
    glowing: bool,
}

impl Terrain {
    /// Plain, unlit floor.
    pub const FLOOR: Terrain = Terrain::new(TerrainKind::Floor);

    /// Ordinary unlit wall.
    pub const WALL: Terrain = Terrain::new(TerrainKind::Wall);

    /// Creates unlit terrain of the provided kind.
    #[must_use]
    pub const fn new(kind: TerrainKind) -> Self {
        Self {
            kind,
            glowing: false,
        }
    }

    /// Returns a copy of the terrain with the permanent glow set as requested.
    #[must_use]
    pub const fn with_glow(self, glowing: bool) -> Self {
        Self {
            kind: self.kind,
            glowing,
        }
    }

    /// Feature occupying the cell.
    #[must_use]
    pub const fn kind(&self) -> TerrainKind {
        self.kind
    }

    /// Reports whether the cell carries permanent ambient light.
    #[must_use]
    pub const fn is_glowing(&self) -> bool {
        self.glowing
    }

    /// Shorthand for [`TerrainKind::blocks_sight`].
    #[must_use]
    pub const fn blocks_sight(&self) -> bool {
        self.kind.blocks_sight()
    }
}

/// Read-only view into the dense terrain grid of a level.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    cells: &'a [Terrain],
    rows: u32,
    columns: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided row-major slice.
    ///
    /// The slice must hold exactly `rows * columns` cells.
    #[must_use]
    pub fn new(cells: &'a [Terrain], rows: u32, columns: u32) -> Self {
        debug_assert_eq!(
            cells.len() as u64,
            u64::from(rows) * u64::from(columns),
            "terrain slice does not match the grid dimensions"
        );
        Self {
            cells,
            rows,
            columns,
        }
    }

    /// Returns the terrain stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell stops sight. Cells outside the grid do.
    #[must_use]
    pub fn blocks_sight(&self, cell: CellCoord) -> bool {
        self.terrain(cell).map_or(true, |terrain| terrain.blocks_sight())
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row < self.rows && cell.column < self.columns
    }

    /// Provides the dimensions of the underlying grid as `(rows, columns)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    /// Row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        grid_index(cell, self.rows, self.columns)
    }
}

/// Converts a cell into a row-major index for a grid of the given dimensions.
#[must_use]
pub fn grid_index(cell: CellCoord, rows: u32, columns: u32) -> Option<usize> {
    if cell.row < rows && cell.column < columns {
        let row = usize::try_from(cell.row).ok()?;
        let column = usize::try_from(cell.column).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}

bitflags! {
    /// Per-cell visibility state written by the sight systems.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SightFlags: u8 {
        /// Geometric line of sight exists from the viewer.
        const VIEW = 0b001;
        /// In view and illuminated enough to be perceived.
        const SEEN = 0b010;
        /// Permanently remembered by the viewer.
        const MARK = 0b100;
    }
}

/// Unique identifier assigned to a transient light source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightId(u32);

impl LightId {
    /// Creates a new light identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Transient light effect such as a spell or a dropped torch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightSource {
    /// Identifier allocated by the level.
    pub id: LightId,
    /// Cell the light radiates from.
    pub center: CellCoord,
    /// Octagonal radius the light reaches.
    pub radius: u32,
}

/// Snapshot of the viewer state consumed by the sight systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewer {
    /// Cell the viewer occupies.
    pub position: CellCoord,
    /// Radius of the light the viewer carries.
    pub light_radius: u32,
    /// Blind viewers keep line of sight but perceive nothing.
    pub blind: bool,
}

/// Tunables for the sight engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    /// Radius the precomputed geometry table covers.
    pub max_sight_radius: u32,
    /// Light radius given to a freshly placed viewer.
    pub default_light_radius: u32,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            max_sight_radius: DEFAULT_MAX_SIGHT_RADIUS,
            default_light_radius: DEFAULT_LIGHT_RADIUS,
        }
    }
}

/// Commands that express all permissible level mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the level with a fresh all-floor grid of the provided size.
    ConfigureLevel {
        /// Number of rows in the new grid.
        rows: u32,
        /// Number of columns in the new grid.
        columns: u32,
    },
    /// Overwrites the terrain of a single cell.
    SetTerrain {
        /// Cell being edited.
        cell: CellCoord,
        /// Terrain written into the cell.
        terrain: Terrain,
    },
    /// Opens the closed door at the provided cell.
    OpenDoor {
        /// Cell holding the door.
        cell: CellCoord,
    },
    /// Closes the open door at the provided cell.
    CloseDoor {
        /// Cell holding the door.
        cell: CellCoord,
    },
    /// Places the viewer at the provided cell, teleporting if already placed.
    PlaceViewer {
        /// Destination cell.
        cell: CellCoord,
    },
    /// Moves the viewer a single step.
    StepViewer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Updates the radius of the light carried by the viewer.
    SetLightRadius {
        /// New light radius.
        radius: u32,
    },
    /// Blinds or unblinds the viewer.
    SetBlind {
        /// Whether the viewer is blind.
        blind: bool,
    },
    /// Adds a transient light effect.
    AddLight {
        /// Cell the light radiates from.
        center: CellCoord,
        /// Radius the light reaches.
        radius: u32,
    },
    /// Removes a transient light effect.
    RemoveLight {
        /// Identifier of the light to extinguish.
        light: LightId,
    },
    /// Forces a full recompute of the viewer's sight.
    RecomputeSight,
    /// Clears every remembered cell on the level.
    ForgetMap,
}

/// Events broadcast by the level after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a fresh level was configured.
    LevelConfigured {
        /// Number of rows in the grid.
        rows: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// Confirms that the terrain of a cell changed.
    TerrainChanged {
        /// Cell that was edited.
        cell: CellCoord,
        /// Terrain now stored in the cell.
        terrain: Terrain,
    },
    /// Confirms that the viewer moved.
    ViewerMoved {
        /// Previous cell, absent when the viewer was first placed.
        from: Option<CellCoord>,
        /// Cell the viewer now occupies.
        to: CellCoord,
    },
    /// Confirms that a transient light was added.
    LightAdded {
        /// Light that was added.
        light: LightSource,
    },
    /// Confirms that a transient light was removed.
    LightRemoved {
        /// Identifier of the removed light.
        light: LightId,
    },
    /// Summarises a completed sight recompute.
    SightRecomputed {
        /// Number of cells with `View` set.
        in_view: u32,
        /// Number of cells with `Seen` set.
        seen: u32,
        /// Number of cells that gained `Mark` during the recompute.
        newly_marked: u32,
    },
    /// Lists the cells whose `Seen` flag changed during a recompute.
    SightChanged {
        /// Cells that became seen, in row-major order.
        revealed: Vec<CellCoord>,
        /// Cells that stopped being seen, in row-major order.
        concealed: Vec<CellCoord>,
    },
    /// Confirms that every remembered cell was forgotten.
    MapForgotten,
    /// Reports that a command was rejected.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The addressed cell lies outside the grid.
    OutOfBounds,
    /// The command requires a viewer but none is placed.
    NoViewer,
    /// The addressed cell does not hold a door in the expected state.
    NotADoor,
    /// The destination cell cannot be entered.
    Blocked,
    /// No light with the provided identifier exists.
    UnknownLight,
    /// The requested radius exceeds the precomputed geometry.
    RadiusTooLarge,
    /// The requested grid holds more than [`MAX_GRID_CELLS`] cells.
    GridTooLarge,
}
