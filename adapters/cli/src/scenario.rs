//! Scenario files describing a level, its lights and a scripted turn loop.

use std::{fs, path::Path};

use serde::Deserialize;
use sightline_core::{CellCoord, Command, Direction, LightId, SightConfig, Terrain, TerrainKind};
use thiserror::Error;

/// Marker used in `glow` rows for cells that glow permanently.
const GLOW_GLYPH: char = '*';

/// Errors raised while loading or interpreting a scenario.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The scenario file could not be read.
    #[error("could not read scenario file")]
    Io(#[from] std::io::Error),
    /// The scenario file is not valid TOML for the expected schema.
    #[error("could not parse scenario file")]
    Parse(#[from] toml::de::Error),
    /// The level map contains no cells.
    #[error("level map is empty")]
    EmptyMap,
    /// A map row has a different width than the first row.
    #[error("map row {row} has {found} cells but the first row has {expected}")]
    RaggedMap {
        /// Offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A map glyph does not name any terrain.
    #[error("unknown glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Glyph that failed to parse.
        glyph: char,
        /// Row of the glyph.
        row: usize,
        /// Column of the glyph.
        column: usize,
    },
    /// A glow marker lies outside the map.
    #[error("glow marker at row {row}, column {column} lies outside the map")]
    GlowOutOfBounds {
        /// Row of the marker.
        row: usize,
        /// Column of the marker.
        column: usize,
    },
}

/// Scenario as written in TOML.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Scenario {
    /// Sight radii; defaults apply when the section is missing.
    #[serde(default)]
    pub(crate) sight: SightConfig,
    /// Map, glow markers and starting position.
    pub(crate) level: LevelSection,
    /// Transient lights burning from the start.
    #[serde(default)]
    pub(crate) lights: Vec<LightSection>,
    /// Turns replayed in order after setup.
    #[serde(default)]
    pub(crate) steps: Vec<Step>,
}

/// The `[level]` table: glyph rows plus optional glow rows.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct LevelSection {
    map: Vec<String>,
    #[serde(default)]
    glow: Vec<String>,
    viewer: [u32; 2],
}

/// One `[[lights]]` entry.
#[derive(Clone, Copy, Debug, Deserialize)]
pub(crate) struct LightSection {
    center: [u32; 2],
    radius: u32,
}

/// One scripted turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub(crate) enum Step {
    /// Moves the viewer one cell.
    Step { direction: Direction },
    /// Places the viewer on any cell.
    Teleport { to: [u32; 2] },
    /// Opens a closed door.
    Open { at: [u32; 2] },
    /// Closes an open door.
    Close { at: [u32; 2] },
    /// Changes the viewer's carried light.
    LightRadius { radius: u32 },
    /// Blinds or unblinds the viewer.
    Blind { blind: bool },
    /// Lights a transient source.
    AddLight { center: [u32; 2], radius: u32 },
    /// Extinguishes a transient source by id.
    RemoveLight { light: u32 },
    /// Forces a recompute.
    Recompute,
    /// Clears every remembered cell.
    Forget,
}

impl Step {
    /// Level command this turn issues.
    pub(crate) fn command(self) -> Command {
        match self {
            Self::Step { direction } => Command::StepViewer { direction },
            Self::Teleport { to } => Command::PlaceViewer { cell: cell(to) },
            Self::Open { at } => Command::OpenDoor { cell: cell(at) },
            Self::Close { at } => Command::CloseDoor { cell: cell(at) },
            Self::LightRadius { radius } => Command::SetLightRadius { radius },
            Self::Blind { blind } => Command::SetBlind { blind },
            Self::AddLight { center, radius } => Command::AddLight {
                center: cell(center),
                radius,
            },
            Self::RemoveLight { light } => Command::RemoveLight {
                light: LightId::new(light),
            },
            Self::Recompute => Command::RecomputeSight,
            Self::Forget => Command::ForgetMap,
        }
    }
}

fn cell([row, column]: [u32; 2]) -> CellCoord {
    CellCoord::new(row, column)
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses scenario text.
    pub(crate) fn parse(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Commands that build the level, light it and place the viewer.
    pub(crate) fn setup_commands(&self) -> Result<Vec<Command>, ScenarioError> {
        let grid = parse_map(&self.level.map, &self.level.glow)?;
        let mut commands = vec![Command::ConfigureLevel {
            rows: grid.rows,
            columns: grid.columns,
        }];

        commands.extend(
            grid.cells
                .into_iter()
                .filter(|(_, terrain)| *terrain != Terrain::FLOOR)
                .map(|(cell, terrain)| Command::SetTerrain { cell, terrain }),
        );
        commands.push(Command::SetLightRadius {
            radius: self.sight.default_light_radius,
        });
        commands.extend(self.lights.iter().map(|light| Command::AddLight {
            center: cell(light.center),
            radius: light.radius,
        }));
        commands.push(Command::PlaceViewer {
            cell: cell(self.level.viewer),
        });
        Ok(commands)
    }
}

struct ParsedMap {
    rows: u32,
    columns: u32,
    cells: Vec<(CellCoord, Terrain)>,
}

fn parse_map(map: &[String], glow: &[String]) -> Result<ParsedMap, ScenarioError> {
    let width = map.first().map_or(0, |row| row.chars().count());
    if width == 0 {
        return Err(ScenarioError::EmptyMap);
    }

    let mut cells = Vec::with_capacity(map.len() * width);
    for (row, line) in map.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(ScenarioError::RaggedMap {
                row,
                expected: width,
                found,
            });
        }
        for (column, glyph) in line.chars().enumerate() {
            let kind =
                terrain_kind(glyph).ok_or(ScenarioError::UnknownGlyph { glyph, row, column })?;
            cells.push((
                CellCoord::new(row as u32, column as u32),
                Terrain::new(kind),
            ));
        }
    }

    for (row, line) in glow.iter().enumerate() {
        for (column, glyph) in line.chars().enumerate() {
            if glyph != GLOW_GLYPH {
                continue;
            }
            if row >= map.len() || column >= width {
                return Err(ScenarioError::GlowOutOfBounds { row, column });
            }
            let slot = &mut cells[row * width + column].1;
            *slot = slot.with_glow(true);
        }
    }

    Ok(ParsedMap {
        rows: map.len() as u32,
        columns: width as u32,
        cells,
    })
}

/// Terrain named by a map glyph.
pub(crate) const fn terrain_kind(glyph: char) -> Option<TerrainKind> {
    let kind = match glyph {
        '.' => TerrainKind::Floor,
        '#' => TerrainKind::Wall,
        '%' => TerrainKind::PermanentWall,
        ':' => TerrainKind::Rubble,
        '\'' => TerrainKind::OpenDoor,
        '+' => TerrainKind::ClosedDoor,
        '^' => TerrainKind::Trap,
        '<' => TerrainKind::UpStaircase,
        '>' => TerrainKind::DownStaircase,
        _ => return None,
    };
    Some(kind)
}
