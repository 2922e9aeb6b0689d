//! Grid model shared by every generation method
//!
//! A [`Grid`] is a fixed-size coordinate space whose cells may hold a
//! [`Tile`]. Generators never change its dimensions; they only look cells up
//! with [`Grid::try_get_cell`] and write tiles with [`Grid::place_tile`].

use std::fmt;

use crate::tilemap::Tilemap;
use crate::tileset::Tile;

/// Axis-aligned integer rectangle. `x_max`/`y_max` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn x_min(&self) -> i32 {
        self.x
    }

    pub fn x_max(&self) -> i32 {
        self.x + self.width
    }

    pub fn y_min(&self) -> i32 {
        self.y
    }

    pub fn y_max(&self) -> i32 {
        self.y + self.height
    }

    /// Integer center, rounded toward the min corner.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x_min() >= self.x_min()
            && other.y_min() >= self.y_min()
            && other.x_max() <= self.x_max()
            && other.y_max() <= self.y_max()
    }

    /// Whether the two rectangles share at least one cell.
    pub fn overlaps(&self, other: &Rect) -> bool {
        other.x_max() > self.x_min()
            && other.x_min() < self.x_max()
            && other.y_max() > self.y_min()
            && other.y_min() < self.y_max()
    }

    /// All cell coordinates covered by the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x_min, x_max) = (self.x_min(), self.x_max());
        (self.y_min()..self.y_max()).flat_map(move |y| (x_min..x_max).map(move |x| (x, y)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x:{}, y:{}, width:{}, height:{})", self.x, self.y, self.width, self.height)
    }
}

/// Handle to a cell that is known to lie inside the grid it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

/// Bounded 2D grid of optional tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    tiles: Tilemap<Option<Tile>>,
}

impl Grid {
    pub fn new(width: usize, length: usize) -> Self {
        Self {
            tiles: Tilemap::new(width, length),
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.width
    }

    pub fn length(&self) -> usize {
        self.tiles.length
    }

    /// Full extent of the grid as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.length() as i32)
    }

    /// Look up a cell. Coordinates off the grid yield `None`.
    pub fn try_get_cell(&self, x: i32, y: i32) -> Option<Cell> {
        if self.tiles.in_bounds(x, y) {
            Some(Cell { x: x as usize, y: y as usize })
        } else {
            None
        }
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        *self.tiles.get(cell.x, cell.y)
    }

    /// Tile at signed coordinates, `None` when empty or off the grid.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<Tile> {
        self.tiles.try_get(x, y).copied().flatten()
    }

    /// Write a tile into a cell. With `overwrite == false` an occupied cell
    /// keeps its tile. Returns whether the cell was written.
    pub fn place_tile(&mut self, cell: Cell, tile: Tile, overwrite: bool) -> bool {
        let slot = self.tiles.get_mut(cell.x, cell.y);
        if slot.is_some() && !overwrite {
            return false;
        }
        *slot = Some(tile);
        true
    }

    /// Place a tile at signed coordinates, skipping anything off the grid.
    pub fn place_at(&mut self, x: i32, y: i32, tile: Tile, overwrite: bool) -> bool {
        match self.try_get_cell(x, y) {
            Some(cell) => self.place_tile(cell, tile, overwrite),
            None => false,
        }
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|(_, _, t)| **t == Some(tile)).count()
    }

    pub fn count_empty(&self) -> usize {
        self.tiles.iter().filter(|(_, _, t)| t.is_none()).count()
    }

    pub fn clear(&mut self) {
        self.tiles.fill(None);
    }

    /// Iterate over every cell and its content.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Option<Tile>)> + '_ {
        self.tiles.iter().map(|(x, y, t)| (Cell { x, y }, *t))
    }
}
