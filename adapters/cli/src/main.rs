#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a Sightline scenario.

mod scenario;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use sightline_core::{Command, Event, SightFlags};
use sightline_geometry::VisibilityTable;
use sightline_level::{self as level, query, Level};

use crate::scenario::Scenario;

/// Replays a scenario file and reports what the viewer perceives each turn.
#[derive(Debug, Parser)]
#[command(name = "sightline", version, about)]
struct Args {
    /// Scenario TOML file to replay.
    scenario: PathBuf,
    /// Overrides the maximum sight radius from the scenario.
    #[arg(long)]
    radius: Option<u32>,
    /// Enables debug logging.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the Sightline command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;
    if let Some(radius) = args.radius {
        scenario.sight.max_sight_radius = radius;
    }

    let radius = scenario.sight.max_sight_radius;
    let table = VisibilityTable::build(radius)
        .with_context(|| format!("building the visibility table for radius {radius}"))?;
    let mut level = Level::new(Arc::new(table), scenario.sight.default_light_radius);

    let setup = scenario
        .setup_commands()
        .with_context(|| format!("interpreting scenario {}", args.scenario.display()))?;
    let mut events = Vec::new();
    for command in setup {
        level::apply(&mut level, command, &mut events);
    }
    println!("{}", summary("setup", &level, &events));

    for (turn, step) in scenario.steps.iter().enumerate() {
        events.clear();
        let command = step.command();
        let label = format!("turn {}: {}", turn + 1, describe(&command));
        level::apply(&mut level, command, &mut events);
        println!("{}", summary(&label, &level, &events));
    }

    Ok(())
}

fn describe(command: &Command) -> String {
    match command {
        Command::StepViewer { direction } => format!("step {direction:?}"),
        Command::PlaceViewer { cell } => format!("teleport to ({}, {})", cell.row(), cell.column()),
        Command::OpenDoor { cell } => format!("open ({}, {})", cell.row(), cell.column()),
        Command::CloseDoor { cell } => format!("close ({}, {})", cell.row(), cell.column()),
        Command::SetLightRadius { radius } => format!("light radius {radius}"),
        Command::SetBlind { blind } => format!("blind {blind}"),
        Command::AddLight { center, radius } => {
            format!("light ({}, {}) radius {radius}", center.row(), center.column())
        }
        Command::RemoveLight { light } => format!("remove light {}", light.get()),
        Command::RecomputeSight => "recompute".to_owned(),
        Command::ForgetMap => "forget".to_owned(),
        other => format!("{other:?}"),
    }
}

fn summary(label: &str, level: &Level, events: &[Event]) -> String {
    let sight = query::sight_map(level);
    let viewer = query::viewer(level).map_or_else(
        || "none".to_owned(),
        |viewer| format!("({}, {})", viewer.position.row(), viewer.position.column()),
    );
    let mut line = format!(
        "{label}: viewer {viewer} in_view={} seen={} marked={}",
        sight.count(SightFlags::VIEW),
        sight.count(SightFlags::SEEN),
        sight.count(SightFlags::MARK),
    );

    for event in events {
        match event {
            Event::SightChanged {
                revealed,
                concealed,
            } => line.push_str(&format!(
                " revealed={} concealed={}",
                revealed.len(),
                concealed.len()
            )),
            Event::CommandRejected { reason } => line.push_str(&format!(" rejected={reason:?}")),
            Event::MapForgotten => line.push_str(" forgotten"),
            _ => {}
        }
    }
    line
}
