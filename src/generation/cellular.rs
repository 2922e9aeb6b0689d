//! Cellular automata terrain generation
//!
//! Seeds a random water/ground field and smooths it with an 8-neighbour
//! majority rule. Cells off the grid count as water, so the map tends to be
//! closed in by water at its edges. An optional final pass raises dense
//! ground clusters into mountains.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::grid::Grid;
use crate::seeds::RandomSource;
use crate::tilemap::{Boundary, Tilemap};
use crate::tileset::Tile;

use super::{StepGenerator, StepReport};

/// Parameters for cellular automata generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularParams {
    /// Number of smoothing steps
    pub max_iterations: u32,
    /// Chance (percent, 0-100) that a cell starts as water
    pub noise_density: u32,
    /// Ground neighbours needed to become a mountain; `None` skips the pass
    pub mountain_threshold: Option<u32>,
}

impl Default for CellularParams {
    fn default() -> Self {
        Self {
            max_iterations: 4,
            noise_density: 45,
            mountain_threshold: None,
        }
    }
}

impl CellularParams {
    pub fn validate(&self) -> GenResult<()> {
        if self.noise_density > 100 {
            return Err(GenError::InvalidConfig(format!(
                "cellular noise_density must be 0-100, got {}",
                self.noise_density
            )));
        }
        if let Some(threshold) = self.mountain_threshold {
            if threshold > 8 {
                return Err(GenError::InvalidConfig(format!(
                    "cellular mountain_threshold must be 0-8, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

/// State of one automaton cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellState {
    Water,
    #[default]
    Ground,
    Mountain,
}

impl CellState {
    pub fn is_water(&self) -> bool {
        *self == CellState::Water
    }

    pub fn is_ground(&self) -> bool {
        *self == CellState::Ground
    }

    pub fn tile(&self) -> Tile {
        match self {
            CellState::Water => Tile::Water,
            CellState::Ground => Tile::Grass,
            CellState::Mountain => Tile::Rock,
        }
    }
}

/// Double-buffered automaton state.
#[derive(Clone, Debug)]
pub struct Automaton {
    cells: Tilemap<CellState>,
    next: Tilemap<CellState>,
}

impl Automaton {
    pub fn new(width: usize, length: usize) -> Self {
        Self::from_cells(Tilemap::new(width, length))
    }

    pub fn from_cells(cells: Tilemap<CellState>) -> Self {
        let next = cells.clone();
        Self { cells, next }
    }

    pub fn cells(&self) -> &Tilemap<CellState> {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> CellState {
        *self.cells.get(x, y)
    }

    /// Random initial field: each cell is water with `noise_density`% chance.
    pub fn setup_area(&mut self, noise_density: u32, rng: &mut RandomSource) {
        for y in 0..self.cells.length {
            for x in 0..self.cells.width {
                let state = if rng.range(0, 100) < noise_density as i32 {
                    CellState::Water
                } else {
                    CellState::Ground
                };
                self.cells.set(x, y, state);
            }
        }
    }

    /// One smoothing pass over the whole field. Every cell reads only the
    /// previous state; the buffers swap once all cells are computed.
    pub fn cellular_step(&mut self) {
        for y in 0..self.cells.length {
            for x in 0..self.cells.width {
                let state = next_state(&self.cells, x, y);
                self.next.set(x, y, state);
            }
        }

        std::mem::swap(&mut self.cells, &mut self.next);
    }

    /// Promote ground cells with at least `threshold` ground neighbours to
    /// mountains. Decisions use the field as it was before the pass.
    /// Returns the number of promoted cells.
    pub fn generate_mountains(&mut self, threshold: u32) -> usize {
        let mut promotions: Vec<(usize, usize)> = Vec::new();

        for (x, y, state) in self.cells.iter() {
            if !state.is_ground() {
                continue;
            }
            let ground = self.cells.count_neighbors_8(x, y, Boundary::Ignore, |s| s.is_ground());
            if ground >= threshold as usize {
                promotions.push((x, y));
            }
        }

        for &(x, y) in &promotions {
            self.cells.set(x, y, CellState::Mountain);
        }

        promotions.len()
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|(_, _, s)| **s == state).count()
    }
}

/// Water neighbours of a cell; neighbours off the map count as water.
pub fn count_water_neighbors(cells: &Tilemap<CellState>, x: usize, y: usize) -> usize {
    cells.count_neighbors_8(x, y, Boundary::CountAsMatch, |s| s.is_water())
}

/// Majority rule: more than 4 water neighbours floods the cell, fewer than
/// 4 dries it, exactly 4 keeps its current state.
pub fn next_state(cells: &Tilemap<CellState>, x: usize, y: usize) -> CellState {
    let water = count_water_neighbors(cells, x, y);

    if water > 4 {
        CellState::Water
    } else if water < 4 {
        CellState::Ground
    } else {
        *cells.get(x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellularPhase {
    Setup,
    Smooth,
    Mountains,
    Finished,
}

/// Step-wise automaton run: seed, smooth `max_iterations` times, then
/// optionally grow mountains. The grid is repainted after every step.
pub struct CellularGeneration {
    params: CellularParams,
    automaton: Automaton,
    iteration: u32,
    phase: CellularPhase,
}

impl CellularGeneration {
    pub fn new(params: CellularParams, grid: &Grid) -> Self {
        Self {
            params,
            automaton: Automaton::new(grid.width(), grid.length()),
            iteration: 0,
            phase: CellularPhase::Setup,
        }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Skip phases that have nothing left to do.
    fn settle_phase(&mut self) {
        if self.phase == CellularPhase::Smooth && self.iteration >= self.params.max_iterations {
            self.phase = CellularPhase::Mountains;
        }
        if self.phase == CellularPhase::Mountains && self.params.mountain_threshold.is_none() {
            self.phase = CellularPhase::Finished;
        }
    }

    fn build_map(&self, grid: &mut Grid) {
        for (x, y, state) in self.automaton.cells().iter() {
            if let Some(cell) = grid.try_get_cell(x as i32, y as i32) {
                grid.place_tile(cell, state.tile(), true);
            }
        }
    }
}

impl StepGenerator for CellularGeneration {
    fn step(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> StepReport {
        let label = match self.phase {
            CellularPhase::Setup => {
                self.automaton.setup_area(self.params.noise_density, rng);
                self.phase = CellularPhase::Smooth;
                format!(
                    "Seeded {} water cells at {}% density",
                    self.automaton.count(CellState::Water),
                    self.params.noise_density
                )
            }
            CellularPhase::Smooth => {
                self.automaton.cellular_step();
                self.iteration += 1;
                format!("Cellular step {}/{}", self.iteration, self.params.max_iterations)
            }
            CellularPhase::Mountains => {
                let threshold = self.params.mountain_threshold.unwrap_or(8);
                let promoted = self.automaton.generate_mountains(threshold);
                self.phase = CellularPhase::Finished;
                format!("Raised {} mountain cells", promoted)
            }
            CellularPhase::Finished => return StepReport::last("Cellular automata already finished"),
        };

        self.settle_phase();
        self.build_map(grid);
        log::debug!(
            "{}: {} water, {} ground, {} mountain",
            label,
            self.automaton.count(CellState::Water),
            self.automaton.count(CellState::Ground),
            self.automaton.count(CellState::Mountain)
        );

        if self.phase == CellularPhase::Finished {
            StepReport::last(label)
        } else {
            StepReport::progress(label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(width: usize, length: usize, density: u32, seed: u64) -> Automaton {
        let mut automaton = Automaton::new(width, length);
        let mut rng = RandomSource::from_seed(seed);
        automaton.setup_area(density, &mut rng);
        automaton
    }

    #[test]
    fn test_full_density_stays_water() {
        let mut automaton = seeded(10, 10, 100, 1);
        assert_eq!(automaton.count(CellState::Water), 100);

        for _ in 0..6 {
            automaton.cellular_step();
            assert_eq!(automaton.count(CellState::Water), 100);
        }
    }

    #[test]
    fn test_zero_density_corners_flood() {
        let mut automaton = seeded(10, 10, 0, 1);
        assert_eq!(automaton.count(CellState::Ground), 100);

        automaton.cellular_step();

        for (x, y) in [(0, 0), (9, 0), (0, 9), (9, 9)] {
            assert_eq!(automaton.get(x, y), CellState::Water, "corner ({}, {})", x, y);
        }
        // Edge cells only miss 3 neighbours and stay ground
        assert_eq!(automaton.get(5, 0), CellState::Ground);
        assert_eq!(automaton.get(0, 5), CellState::Ground);
        assert_eq!(automaton.get(5, 5), CellState::Ground);
        assert_eq!(automaton.count(CellState::Water), 4);
    }

    #[test]
    fn test_tie_keeps_current_state() {
        // Centre cell of a 3x3 with exactly 4 water neighbours
        let mut cells = Tilemap::new_with(3, 3, CellState::Ground);
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1)] {
            cells.set(x, y, CellState::Water);
        }
        assert_eq!(count_water_neighbors(&cells, 1, 1), 4);
        assert_eq!(next_state(&cells, 1, 1), CellState::Ground);

        cells.set(1, 1, CellState::Water);
        assert_eq!(next_state(&cells, 1, 1), CellState::Water);
    }

    #[test]
    fn test_step_is_pure_function_of_buffer() {
        let automaton = seeded(24, 17, 45, 77);

        let mut a = automaton.clone();
        let mut b = automaton.clone();
        a.cellular_step();
        b.cellular_step();
        assert_eq!(a.cells(), b.cells());

        // Each cell's new state matches the rule applied to the old snapshot
        for (x, y, state) in a.cells().iter() {
            assert_eq!(*state, next_state(automaton.cells(), x, y));
        }
    }

    #[test]
    fn test_mountains_come_from_ground() {
        let mut automaton = seeded(30, 30, 40, 5);
        for _ in 0..4 {
            automaton.cellular_step();
        }
        let before = automaton.cells().clone();

        let promoted = automaton.generate_mountains(7);

        assert_eq!(automaton.count(CellState::Mountain), promoted);
        for (x, y, state) in automaton.cells().iter() {
            if *state == CellState::Mountain {
                assert_eq!(*before.get(x, y), CellState::Ground);
            } else {
                assert_eq!(state, before.get(x, y));
            }
        }
        assert_eq!(
            automaton.count(CellState::Ground) + promoted,
            before.iter().filter(|(_, _, s)| s.is_ground()).count()
        );
    }

    #[test]
    fn test_mountains_do_not_cascade() {
        // All ground: interior cells have 8 ground neighbours, edges fewer
        // because off-map cells are not counted here.
        let mut automaton = Automaton::from_cells(Tilemap::new_with(5, 5, CellState::Ground));
        let promoted = automaton.generate_mountains(8);

        assert_eq!(promoted, 9);
        assert_eq!(automaton.get(2, 2), CellState::Mountain);
        assert_eq!(automaton.get(0, 0), CellState::Ground);
        assert_eq!(automaton.get(0, 2), CellState::Ground);
    }

    #[test]
    fn test_generation_steps() {
        let grid = Grid::new(10, 10);
        let params = CellularParams { max_iterations: 3, noise_density: 45, mountain_threshold: Some(6) };
        let mut generation = CellularGeneration::new(params, &grid);
        let mut grid = grid;
        let mut rng = RandomSource::from_seed(12);

        let mut reports = Vec::new();
        loop {
            let report = generation.step(&mut grid, &mut rng);
            let finished = report.finished;
            reports.push(report);
            if finished {
                break;
            }
        }

        // setup + 3 smoothing steps + mountains
        assert_eq!(reports.len(), 5);
        assert_eq!(grid.count_empty(), 0);
        assert_eq!(grid.count(Tile::Rock), generation.automaton().count(CellState::Mountain));
        assert_eq!(grid.count(Tile::Water), generation.automaton().count(CellState::Water));
    }

    #[test]
    fn test_zero_iterations_finishes_after_setup() {
        let mut grid = Grid::new(6, 6);
        let params = CellularParams { max_iterations: 0, ..Default::default() };
        let mut generation = CellularGeneration::new(params, &grid);
        let mut rng = RandomSource::from_seed(12);

        assert!(generation.step(&mut grid, &mut rng).finished);
        assert_eq!(grid.count_empty(), 0);
    }

    #[test]
    fn test_validate_density() {
        assert!(CellularParams { noise_density: 101, ..Default::default() }.validate().is_err());
        assert!(CellularParams { mountain_threshold: Some(9), ..Default::default() }.validate().is_err());
        assert!(CellularParams::default().validate().is_ok());
    }
}
