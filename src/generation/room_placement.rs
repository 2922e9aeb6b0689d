//! Simple random room placement
//!
//! Each step throws one fixed-size room at a random position and keeps it if
//! it does not overlap a room placed earlier. A last step covers the
//! remaining cells with ground.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::grid::{Grid, Rect};
use crate::seeds::RandomSource;
use crate::tileset::Tile;

use super::{StepGenerator, StepReport};

/// Parameters for simple room placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomPlacementParams {
    /// Number of placement attempts
    pub max_steps: u32,
    /// Placement stops accepting rooms once this many exist
    pub max_rooms: usize,
    pub room_width: i32,
    pub room_height: i32,
}

impl Default for RoomPlacementParams {
    fn default() -> Self {
        Self {
            max_steps: 50,
            max_rooms: 10,
            room_width: 10,
            room_height: 10,
        }
    }
}

impl RoomPlacementParams {
    pub fn validate(&self) -> GenResult<()> {
        if self.room_width <= 0 || self.room_height <= 0 {
            return Err(GenError::InvalidConfig(format!(
                "room size must be positive, got {}x{}",
                self.room_width, self.room_height
            )));
        }
        Ok(())
    }
}

/// Step-wise room placement run.
pub struct RoomPlacementGeneration {
    params: RoomPlacementParams,
    rooms: Vec<Rect>,
    attempts: u32,
    finished: bool,
}

impl RoomPlacementGeneration {
    pub fn new(params: RoomPlacementParams, _grid: &Grid) -> Self {
        Self {
            params,
            rooms: Vec::new(),
            attempts: 0,
            finished: false,
        }
    }

    pub fn rooms(&self) -> &[Rect] {
        &self.rooms
    }

    /// Try one random room. Returns the room if it was placed.
    fn attempt(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> Option<Rect> {
        let x = rng.range(0, grid.width() as i32);
        let y = rng.range(0, grid.length() as i32);
        let room = Rect::new(x, y, self.params.room_width, self.params.room_height);

        if self.rooms.len() >= self.params.max_rooms {
            return None;
        }
        if self.rooms.iter().any(|existing| room.overlaps(existing)) {
            return None;
        }

        for (rx, ry) in room.cells() {
            grid.place_at(rx, ry, Tile::Room, true);
        }
        self.rooms.push(room);
        Some(room)
    }
}

impl StepGenerator for RoomPlacementGeneration {
    fn step(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> StepReport {
        if self.finished {
            return StepReport::last("Room placement already finished");
        }

        if self.attempts < self.params.max_steps {
            self.attempts += 1;
            let label = match self.attempt(grid, rng) {
                Some(room) => {
                    log::debug!("Room placed at {}", room);
                    format!("Attempt {}/{}: placed room at {}", self.attempts, self.params.max_steps, room)
                }
                None => format!("Attempt {}/{}: rejected", self.attempts, self.params.max_steps),
            };
            return StepReport::progress(label);
        }

        let cells: Vec<_> = grid.iter().map(|(cell, _)| cell).collect();
        for cell in cells {
            grid.place_tile(cell, Tile::Grass, false);
        }
        self.finished = true;
        StepReport::last(format!("Built ground around {} rooms", self.rooms.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(params: RoomPlacementParams, grid: &mut Grid, seed: u64) -> (RoomPlacementGeneration, usize) {
        let mut generation = RoomPlacementGeneration::new(params, grid);
        let mut rng = RandomSource::from_seed(seed);
        let mut steps = 1;
        while !generation.step(grid, &mut rng).finished {
            steps += 1;
        }
        (generation, steps)
    }

    #[test]
    fn test_rooms_never_overlap() {
        for seed in 0..10 {
            let mut grid = Grid::new(60, 60);
            let params = RoomPlacementParams { max_rooms: 100, ..Default::default() };
            let (generation, steps) = run(params, &mut grid, seed);

            assert_eq!(steps, 51);
            let rooms = generation.rooms();
            for (i, a) in rooms.iter().enumerate() {
                for b in &rooms[i + 1..] {
                    assert!(!a.overlaps(b), "{} overlaps {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_max_rooms_caps_placement() {
        let mut grid = Grid::new(200, 200);
        let params = RoomPlacementParams { max_steps: 200, max_rooms: 3, room_width: 2, room_height: 2 };
        let (generation, _) = run(params, &mut grid, 1);

        assert_eq!(generation.rooms().len(), 3);
        assert_eq!(grid.count(Tile::Room), 12);
    }

    #[test]
    fn test_rooms_clipped_at_grid_edge() {
        let mut grid = Grid::new(12, 12);
        let params = RoomPlacementParams { max_steps: 30, ..Default::default() };
        let (generation, _) = run(params, &mut grid, 2);

        let in_bounds: usize = generation
            .rooms()
            .iter()
            .map(|room| room.cells().filter(|&(x, y)| grid.try_get_cell(x, y).is_some()).count())
            .sum();
        assert_eq!(grid.count(Tile::Room), in_bounds);
        assert_eq!(grid.count(Tile::Room) + grid.count(Tile::Grass), 144);
    }

    #[test]
    fn test_zero_steps_only_builds_ground() {
        let mut grid = Grid::new(5, 5);
        let params = RoomPlacementParams { max_steps: 0, ..Default::default() };
        let (generation, steps) = run(params, &mut grid, 3);

        assert_eq!(steps, 1);
        assert!(generation.rooms().is_empty());
        assert_eq!(grid.count(Tile::Grass), 25);
    }
}
