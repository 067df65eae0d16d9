use std::sync::Arc;

use proptest::prelude::*;
use sightline_core::{
    CellCoord, Command, Direction, Event, SightFlags, Terrain, TerrainKind, DEFAULT_LIGHT_RADIUS,
};
use sightline_geometry::VisibilityTable;
use sightline_level::{self as level, query, Level};

fn open_level(rows: u32, columns: u32) -> Level {
    let table = Arc::new(VisibilityTable::build(20).expect("table builds"));
    let mut level = Level::new(table, DEFAULT_LIGHT_RADIUS);
    let mut events = Vec::new();
    level::apply(&mut level, Command::ConfigureLevel { rows, columns }, &mut events);
    level
}

fn in_view_cells(level: &Level) -> Vec<CellCoord> {
    query::sight_map(level).cells_with(SightFlags::VIEW).collect()
}

#[test]
fn door_toggle_only_changes_the_cells_behind_it() {
    let mut level = open_level(21, 21);
    let mut events = Vec::new();
    let door = CellCoord::new(10, 13);
    level::apply(
        &mut level,
        Command::SetTerrain {
            cell: door,
            terrain: Terrain::new(TerrainKind::ClosedDoor),
        },
        &mut events,
    );
    level::recompute(&mut level, CellCoord::new(10, 10), &mut events);
    let closed = in_view_cells(&level);
    assert!(!query::in_view(&level, CellCoord::new(10, 14)));

    level::apply(&mut level, Command::OpenDoor { cell: door }, &mut events);
    let open = in_view_cells(&level);

    assert!(query::in_view(&level, CellCoord::new(10, 14)));
    assert!(closed.iter().all(|cell| open.contains(cell)));
    assert!(open
        .iter()
        .filter(|cell| !closed.contains(cell))
        .all(|cell| cell.column() > door.column()));
}

#[test]
fn walking_down_a_dark_corridor_remembers_only_its_walls() {
    let mut level = open_level(3, 12);
    let mut events = Vec::new();
    for column in 0..12 {
        for row in [0, 2] {
            level::apply(
                &mut level,
                Command::SetTerrain {
                    cell: CellCoord::new(row, column),
                    terrain: Terrain::WALL,
                },
                &mut events,
            );
        }
    }
    level::recompute(&mut level, CellCoord::new(1, 0), &mut events);
    for _ in 0..11 {
        level::apply(
            &mut level,
            Command::StepViewer {
                direction: Direction::East,
            },
            &mut events,
        );
    }

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
    let sight = query::sight_map(&level);
    assert_eq!(sight.count(SightFlags::MARK), 24);
    assert!((0..12).all(|column| !sight.marked(CellCoord::new(1, column))));
}

#[test]
fn blinding_and_unblinding_restores_sight() {
    let mut level = open_level(7, 7);
    let mut events = Vec::new();
    level::recompute(&mut level, CellCoord::new(3, 3), &mut events);
    let seen_before = query::sight_map(&level).count(SightFlags::SEEN);

    events.clear();
    level::apply(&mut level, Command::SetBlind { blind: true }, &mut events);
    assert_eq!(query::sight_map(&level).count(SightFlags::SEEN), 0);
    assert!(events.iter().any(|event| match event {
        Event::SightChanged {
            revealed,
            concealed,
        } => revealed.is_empty() && concealed.len() == seen_before,
        _ => false,
    }));

    level::apply(&mut level, Command::SetBlind { blind: false }, &mut events);
    assert_eq!(query::sight_map(&level).count(SightFlags::SEEN), seen_before);
}

#[derive(Clone, Debug)]
enum Action {
    Step(Direction),
    Wall(CellCoord),
    Clear(CellCoord),
    Light(u32),
    Forget,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    let cell = (0u32..10, 0u32..10).prop_map(|(row, column)| CellCoord::new(row, column));
    prop_oneof![
        4 => prop::sample::select(Direction::ALL.to_vec()).prop_map(Action::Step),
        2 => cell.clone().prop_map(Action::Wall),
        1 => cell.prop_map(Action::Clear),
        1 => (0u32..5).prop_map(Action::Light),
        1 => Just(Action::Forget),
    ]
}

fn command(action: &Action) -> Command {
    match action {
        Action::Step(direction) => Command::StepViewer {
            direction: *direction,
        },
        Action::Wall(cell) => Command::SetTerrain {
            cell: *cell,
            terrain: Terrain::WALL,
        },
        Action::Clear(cell) => Command::SetTerrain {
            cell: *cell,
            terrain: Terrain::FLOOR,
        },
        Action::Light(radius) => Command::SetLightRadius { radius: *radius },
        Action::Forget => Command::ForgetMap,
    }
}

proptest! {
    #[test]
    fn flags_stay_consistent_under_random_play(
        actions in prop::collection::vec(action_strategy(), 1..40),
    ) {
        let mut level = open_level(10, 10);
        let mut events = Vec::new();
        level::recompute(&mut level, CellCoord::new(5, 5), &mut events);

        for action in &actions {
            let remembered: Vec<CellCoord> =
                query::sight_map(&level).cells_with(SightFlags::MARK).collect();
            level::apply(&mut level, command(action), &mut events);

            let sight = query::sight_map(&level);
            for (_, flags) in sight.iter() {
                if flags.contains(SightFlags::SEEN) {
                    prop_assert!(flags.contains(SightFlags::VIEW));
                }
            }
            if !matches!(action, Action::Forget) {
                for cell in &remembered {
                    prop_assert!(sight.marked(*cell));
                }
            }
            let viewer = query::viewer(&level).expect("viewer stays placed");
            prop_assert!(sight.in_view(viewer.position));
        }
    }
}
