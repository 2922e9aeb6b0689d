//! Grid generation methods
//!
//! Every method fills a [`Grid`] through the same step-wise contract:
//!
//! - BSP (Binary Space Partitioning) rooms joined by dogleg corridors
//! - Cellular automata smoothing of a random water/ground field, with an
//!   optional mountain growth pass
//! - Noise-field terrain classified into water/sand/grass/rock bands
//! - Simple random room placement
//!
//! [`apply_generation`] drives a method one discrete step at a time. Between
//! steps it hands the grid to a [`StepObserver`] (for staged visualisation)
//! and checks a [`CancellationToken`]. A step in flight always finishes; a
//! cancelled run may leave the grid partially filled.

pub mod bsp;
pub mod cellular;
pub mod noise_terrain;
pub mod room_placement;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GenResult;
use crate::grid::Grid;
use crate::seeds::RandomSource;

pub use bsp::{BspGeneration, BspParams};
pub use cellular::{CellularGeneration, CellularParams};
pub use noise_terrain::{NoiseGeneration, NoiseParams};
pub use room_placement::{RoomPlacementGeneration, RoomPlacementParams};

/// The closed set of generation methods, each with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GenerationMethod {
    Bsp(BspParams),
    CellularAutomata(CellularParams),
    Noise(NoiseParams),
    RoomPlacement(RoomPlacementParams),
}

impl Default for GenerationMethod {
    fn default() -> Self {
        GenerationMethod::Bsp(BspParams::default())
    }
}

impl GenerationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationMethod::Bsp(_) => "BSP",
            GenerationMethod::CellularAutomata(_) => "Cellular Automata",
            GenerationMethod::Noise(_) => "Noise",
            GenerationMethod::RoomPlacement(_) => "Simple Room Placement",
        }
    }

    /// Check the parameters before a run.
    pub fn validate(&self) -> GenResult<()> {
        match self {
            GenerationMethod::Bsp(params) => params.validate(),
            GenerationMethod::CellularAutomata(params) => params.validate(),
            GenerationMethod::Noise(params) => params.validate(),
            GenerationMethod::RoomPlacement(params) => params.validate(),
        }
    }

    /// Prepare a run of this method over a grid of the given size.
    pub fn start(&self, grid: &Grid) -> Generation {
        match self {
            GenerationMethod::Bsp(params) => Generation::Bsp(BspGeneration::new(params.clone(), grid)),
            GenerationMethod::CellularAutomata(params) => {
                Generation::Cellular(CellularGeneration::new(params.clone(), grid))
            }
            GenerationMethod::Noise(params) => Generation::Noise(NoiseGeneration::new(params.clone(), grid)),
            GenerationMethod::RoomPlacement(params) => {
                Generation::RoomPlacement(RoomPlacementGeneration::new(params.clone(), grid))
            }
        }
    }
}

/// What a single step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub label: String,
    /// The run is complete after this step.
    pub finished: bool,
}

impl StepReport {
    pub fn progress(label: impl Into<String>) -> Self {
        Self { label: label.into(), finished: false }
    }

    pub fn last(label: impl Into<String>) -> Self {
        Self { label: label.into(), finished: true }
    }
}

/// One in-progress run of a method, advanced a step at a time.
pub trait StepGenerator {
    /// Perform exactly one discrete step, mutating the grid.
    fn step(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> StepReport;
}

/// In-progress run of any of the methods.
pub enum Generation {
    Bsp(BspGeneration),
    Cellular(CellularGeneration),
    Noise(NoiseGeneration),
    RoomPlacement(RoomPlacementGeneration),
}

impl StepGenerator for Generation {
    fn step(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> StepReport {
        match self {
            Generation::Bsp(run) => run.step(grid, rng),
            Generation::Cellular(run) => run.step(grid, rng),
            Generation::Noise(run) => run.step(grid, rng),
            Generation::RoomPlacement(run) => run.step(grid, rng),
        }
    }
}

/// Cooperative cancellation flag, shared between the caller and a run.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Receives the grid after every completed step.
pub trait StepObserver {
    fn on_step(&mut self, grid: &Grid, step: usize, label: &str);
}

impl<F> StepObserver for F
where
    F: FnMut(&Grid, usize, &str),
{
    fn on_step(&mut self, grid: &Grid, step: usize, label: &str) {
        self(grid, step, label)
    }
}

/// Observer that ignores every step.
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _grid: &Grid, _step: usize, _label: &str) {}
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Completed { steps: usize },
    Cancelled { steps_completed: usize },
}

impl GenerationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, GenerationOutcome::Completed { .. })
    }
}

/// Run `method` over `grid` until it completes or `cancel` is set.
///
/// The grid is cleared first, so a reused grid gives the same result as a
/// fresh one. Cancellation is checked before every step, never during one.
pub fn apply_generation<O>(
    method: &GenerationMethod,
    grid: &mut Grid,
    rng: &mut RandomSource,
    cancel: &CancellationToken,
    observer: &mut O,
) -> GenerationOutcome
where
    O: StepObserver + ?Sized,
{
    log::info!(
        "Starting {} generation on {}x{} grid (seed {})",
        method.name(),
        grid.width(),
        grid.length(),
        rng.seed()
    );

    grid.clear();
    let mut generation = method.start(grid);
    let mut steps = 0;

    loop {
        if cancel.is_cancelled() {
            log::info!("{} generation cancelled after {} steps", method.name(), steps);
            return GenerationOutcome::Cancelled { steps_completed: steps };
        }

        let report = generation.step(grid, rng);
        steps += 1;
        log::debug!("Step {}: {}", steps, report.label);
        observer.on_step(grid, steps, &report.label);

        if report.finished {
            break;
        }
    }

    log::info!("{} generation complete in {} steps", method.name(), steps);
    GenerationOutcome::Completed { steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::Tile;

    #[test]
    fn test_cancel_before_first_step() {
        let mut grid = Grid::new(20, 20);
        let mut rng = RandomSource::from_seed(42);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = apply_generation(
            &GenerationMethod::default(),
            &mut grid,
            &mut rng,
            &cancel,
            &mut NoopObserver,
        );

        assert_eq!(outcome, GenerationOutcome::Cancelled { steps_completed: 0 });
        assert_eq!(grid.count_empty(), 400);
    }

    #[test]
    fn test_cancel_between_steps() {
        let mut grid = Grid::new(10, 10);
        let mut rng = RandomSource::from_seed(42);
        let cancel = CancellationToken::new();
        let method = GenerationMethod::CellularAutomata(CellularParams {
            max_iterations: 10,
            ..Default::default()
        });

        let token = cancel.clone();
        let mut observer = |_: &Grid, step: usize, _: &str| {
            if step == 2 {
                token.cancel();
            }
        };

        let outcome = apply_generation(&method, &mut grid, &mut rng, &cancel, &mut observer);

        assert_eq!(outcome, GenerationOutcome::Cancelled { steps_completed: 2 });
        // The completed steps left a fully painted map behind
        assert_eq!(grid.count_empty(), 0);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let mut grid = Grid::new(16, 16);
        let mut rng = RandomSource::from_seed(3);
        let mut labels = Vec::new();
        let mut observer = |_: &Grid, step: usize, label: &str| labels.push((step, label.to_string()));

        let outcome = apply_generation(
            &GenerationMethod::default(),
            &mut grid,
            &mut rng,
            &CancellationToken::new(),
            &mut observer,
        );

        assert_eq!(outcome, GenerationOutcome::Completed { steps: 4 });
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_every_method_fills_grid() {
        let methods = [
            GenerationMethod::Bsp(BspParams::default()),
            GenerationMethod::CellularAutomata(CellularParams::default()),
            GenerationMethod::Noise(NoiseParams::default()),
            GenerationMethod::RoomPlacement(RoomPlacementParams::default()),
        ];

        for method in &methods {
            let mut grid = Grid::new(32, 24);
            let mut rng = RandomSource::from_seed(99);
            let outcome = apply_generation(method, &mut grid, &mut rng, &CancellationToken::new(), &mut NoopObserver);

            assert!(outcome.is_completed(), "{} did not complete", method.name());
            assert_eq!(grid.count_empty(), 0, "{} left empty cells", method.name());
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let method = GenerationMethod::Noise(NoiseParams { frequency: 0.15, ..Default::default() });

        let run = |seed: u64| {
            let mut grid = Grid::new(30, 30);
            let mut rng = RandomSource::from_seed(seed);
            apply_generation(&method, &mut grid, &mut rng, &CancellationToken::new(), &mut NoopObserver);
            grid
        };

        assert_eq!(run(5), run(5));
        assert_ne!(run(5), run(6));
        assert_eq!(run(5).count(Tile::Room), 0);
    }

    #[test]
    fn test_reused_grid_starts_empty() {
        let method = GenerationMethod::Bsp(BspParams::default());
        let run = |grid: &mut Grid| {
            let mut rng = RandomSource::from_seed(8);
            apply_generation(&method, grid, &mut rng, &CancellationToken::new(), &mut NoopObserver);
        };

        let mut fresh = Grid::new(24, 24);
        run(&mut fresh);

        let mut reused = Grid::new(24, 24);
        for (cell, _) in fresh.iter() {
            reused.place_tile(cell, Tile::Water, true);
        }
        run(&mut reused);

        assert_eq!(reused.count(Tile::Water), 0);
        assert_eq!(reused, fresh);

        // Cancelled before any step still leaves no stale tiles behind
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut rng = RandomSource::from_seed(8);
        apply_generation(&method, &mut reused, &mut rng, &cancel, &mut NoopObserver);
        assert_eq!(reused.count_empty(), 24 * 24);
    }

    #[test]
    fn test_method_json_tag() {
        let json = r#"{ "method": "cellular_automata", "noise_density": 60 }"#;
        let method: GenerationMethod = serde_json::from_str(json).unwrap();

        match method {
            GenerationMethod::CellularAutomata(params) => {
                assert_eq!(params.noise_density, 60);
                assert_eq!(params.max_iterations, CellularParams::default().max_iterations);
            }
            other => panic!("unexpected method {:?}", other),
        }
    }
}
