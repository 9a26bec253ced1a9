#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Startup assembly for Gridfall levels.
//!
//! Bootstrap owns the configuration surface: it loads a level definition
//! from TOML, validates the numeric fields the simulation consumes, builds
//! the [`GridLevel`], scatters the configured obstacles, and attaches the
//! environment and obstacle-factory collaborators the level cannot run
//! without. Asset references in the definition stay opaque; they are passed
//! through for whichever rendering adapter the host attaches.

use std::{cell::RefCell, fs, path::Path, rc::Rc, time::Duration};

use anyhow::{bail, Context, Result};
use gridfall_core::{CellCoord, Difficulty};
use gridfall_level::{GridLevel, LevelParams, TimedEvent};
use gridfall_system_environment::{DecorationGroup, Environment};
use gridfall_system_obstacles::{place_obstacles, ObstacleFactory, ObstacleSpawn};
use serde::Deserialize;

/// Complete level definition as authored in a level TOML file.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelConfig {
    /// Display name of the level.
    pub name: String,
    /// Flavour text shown on the level select screen.
    #[serde(default)]
    pub description: String,
    /// Optional preview asset reference for the level select screen.
    #[serde(default)]
    pub preview: Option<String>,
    /// Difficulty rating attached to the level.
    pub difficulty: Difficulty,
    /// Simulated seconds the level runs for.
    pub duration_seconds: f32,
    /// Optional seed string; identical seeds reproduce every random draw.
    #[serde(default)]
    pub seed: Option<String>,
    /// Grid dimensions and cell size.
    pub grid: GridConfig,
    /// Timed events scheduled against the level duration.
    #[serde(default)]
    pub events: Vec<TimedEventConfig>,
    /// Obstacle batches scattered at startup.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

/// Grid geometry section of a level definition.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GridConfig {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Edge length of a square cell in world units.
    pub cell_size: f32,
}

/// One timed event entry of a level definition.
#[derive(Clone, Debug, Deserialize)]
pub struct TimedEventConfig {
    /// Name broadcast when the event starts.
    pub name: String,
    /// Start threshold as a percentage (0–100) of the level duration.
    pub start_percent: f32,
    /// Decoration asset references activated by the event.
    #[serde(default)]
    pub decorations: Vec<String>,
}

/// One obstacle batch entry of a level definition.
#[derive(Clone, Debug, Deserialize)]
pub struct ObstacleConfig {
    /// Number of obstacles to place.
    pub count: u32,
    /// Opaque asset reference resolved by the rendering adapter.
    pub prefab: String,
}

/// A fully assembled level together with shared handles to its required
/// collaborators.
#[derive(Debug)]
pub struct AssembledLevel {
    /// The running level with all collaborators attached.
    pub level: GridLevel,
    /// Shared handle to the attached environment collaborator.
    pub environment: Rc<RefCell<Environment>>,
    /// Shared handle to the attached obstacle factory.
    pub obstacle_factory: Rc<RefCell<ObstacleFactory>>,
    /// Cells claimed by obstacle placement, for the host's bookkeeping.
    pub placed_obstacles: Vec<CellCoord>,
}

/// Loads and validates a level definition from `path`.
pub fn load_level_config(path: &Path) -> Result<LevelConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    parse_level_config(&contents)
}

/// Parses and validates a level definition from TOML text.
pub fn parse_level_config(contents: &str) -> Result<LevelConfig> {
    let config: LevelConfig =
        toml::from_str(contents).context("failed to parse level toml contents")?;

    if !config.duration_seconds.is_finite() || config.duration_seconds <= 0.0 {
        bail!(
            "level duration must be positive, got {}",
            config.duration_seconds
        );
    }

    Ok(config)
}

/// Builds the level described by `config` and attaches its required
/// collaborators.
///
/// Obstacles are placed before any listener attaches, so the placement
/// writes are not observed as gameplay. Fails when the configuration is
/// rejected by the level or when a required collaborator check fails; any
/// failure aborts startup.
pub fn assemble(config: &LevelConfig) -> Result<AssembledLevel> {
    let mut level = GridLevel::new(level_params(config))?;

    let spawns: Vec<ObstacleSpawn> = config
        .obstacles
        .iter()
        .map(|entry| ObstacleSpawn {
            count: entry.count,
            prefab: entry.prefab.clone(),
        })
        .collect();
    let placed_obstacles = place_obstacles(&mut level, &spawns)?;

    let groups = config
        .events
        .iter()
        .map(|entry| DecorationGroup::new(entry.name.clone(), entry.decorations.clone()))
        .collect();
    let environment = Rc::new(RefCell::new(Environment::new(groups)));
    level.attach_listener(Box::new(Rc::clone(&environment)));

    let obstacle_factory = Rc::new(RefCell::new(ObstacleFactory::new(placed_obstacles.clone())));
    level.attach_listener(Box::new(Rc::clone(&obstacle_factory)));

    level.ensure_collaborators(&[
        gridfall_system_environment::LISTENER_NAME,
        gridfall_system_obstacles::LISTENER_NAME,
    ])?;

    Ok(AssembledLevel {
        level,
        environment,
        obstacle_factory,
        placed_obstacles,
    })
}

fn level_params(config: &LevelConfig) -> LevelParams {
    LevelParams {
        width: config.grid.width,
        height: config.grid.height,
        cell_size: config.grid.cell_size,
        duration: Duration::from_secs_f32(config.duration_seconds),
        seed: config.seed.clone(),
        timed_events: config
            .events
            .iter()
            .map(|entry| TimedEvent::new(entry.name.clone(), entry.start_percent))
            .collect(),
    }
}
