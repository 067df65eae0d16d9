use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use sightline_core::{
    CellCoord, Command, Direction, Event, LightId, SightFlags, Terrain, TerrainKind,
    DEFAULT_LIGHT_RADIUS,
};
use sightline_geometry::VisibilityTable;
use sightline_level::{self as level, query, Level};

#[test]
fn deterministic_replay_produces_identical_snapshots() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first.events.iter().all(|event| !matches!(event, EventRecord::Rejected)),
        "scripted commands should all be accepted"
    );
}

#[test]
fn replay_ends_with_the_far_room_remembered() {
    let outcome = replay(scripted_commands());
    let remembered: Vec<CellCoord> = outcome
        .flags
        .iter()
        .filter(|(_, flags)| flags & SightFlags::MARK.bits() != 0)
        .map(|(cell, _)| *cell)
        .collect();

    assert!(remembered.contains(&CellCoord::new(2, 8)), "the door is remembered");
    assert!(remembered.contains(&CellCoord::new(3, 14)), "the glowing floor is remembered");
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let table = Arc::new(VisibilityTable::build(20).expect("table builds"));
    let mut level = Level::new(table, DEFAULT_LIGHT_RADIUS);
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        level::apply(&mut level, command, &mut events);
        log.extend(events.iter().map(EventRecord::from));
    }

    let flags = query::sight_map(&level)
        .iter()
        .map(|(cell, flags)| (cell, flags.bits()))
        .collect();

    ReplayOutcome { flags, events: log }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![Command::ConfigureLevel {
        rows: 6,
        columns: 16,
    }];

    for column in 0..16 {
        for row in [0, 5] {
            commands.push(Command::SetTerrain {
                cell: CellCoord::new(row, column),
                terrain: Terrain::WALL,
            });
        }
    }
    for row in 1..5 {
        commands.push(Command::SetTerrain {
            cell: CellCoord::new(row, 8),
            terrain: Terrain::WALL,
        });
    }
    commands.push(Command::SetTerrain {
        cell: CellCoord::new(2, 8),
        terrain: Terrain::new(TerrainKind::ClosedDoor),
    });
    commands.push(Command::SetTerrain {
        cell: CellCoord::new(3, 14),
        terrain: Terrain::FLOOR.with_glow(true),
    });

    commands.extend([
        Command::PlaceViewer {
            cell: CellCoord::new(2, 2),
        },
        Command::StepViewer {
            direction: Direction::East,
        },
        Command::StepViewer {
            direction: Direction::SouthEast,
        },
        Command::SetLightRadius { radius: 2 },
        Command::StepViewer {
            direction: Direction::NorthEast,
        },
        Command::OpenDoor {
            cell: CellCoord::new(2, 8),
        },
        Command::AddLight {
            center: CellCoord::new(2, 11),
            radius: 2,
        },
        Command::StepViewer {
            direction: Direction::East,
        },
        Command::RemoveLight {
            light: LightId::new(0),
        },
        Command::CloseDoor {
            cell: CellCoord::new(2, 8),
        },
        Command::RecomputeSight,
    ]);
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    flags: Vec<(CellCoord, u8)>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Configured,
    TerrainChanged { cell: CellCoord },
    ViewerMoved { to: CellCoord },
    Light,
    Recomputed {
        in_view: u32,
        seen: u32,
        newly_marked: u32,
    },
    Changed { revealed: usize, concealed: usize },
    Forgotten,
    Rejected,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::LevelConfigured { .. } => Self::Configured,
            Event::TerrainChanged { cell, .. } => Self::TerrainChanged { cell: *cell },
            Event::ViewerMoved { to, .. } => Self::ViewerMoved { to: *to },
            Event::LightAdded { .. } | Event::LightRemoved { .. } => Self::Light,
            Event::SightRecomputed {
                in_view,
                seen,
                newly_marked,
            } => Self::Recomputed {
                in_view: *in_view,
                seen: *seen,
                newly_marked: *newly_marked,
            },
            Event::SightChanged {
                revealed,
                concealed,
            } => Self::Changed {
                revealed: revealed.len(),
                concealed: concealed.len(),
            },
            Event::MapForgotten => Self::Forgotten,
            Event::CommandRejected { .. } => Self::Rejected,
        }
    }
}
