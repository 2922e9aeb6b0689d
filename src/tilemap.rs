/// Offsets of the 8 cells surrounding a cell (Moore neighbourhood).
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// How a neighbour scan treats coordinates that fall outside the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Out-of-range neighbours count as matching the predicate (closed edge).
    CountAsMatch,
    /// Out-of-range neighbours are skipped.
    Ignore,
}

/// A bounded 2D tilemap grid. Nothing wraps: coordinates outside
/// `0..width` x `0..length` simply do not exist.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub length: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, length: usize) -> Self {
        Self {
            width,
            length,
            data: vec![T::default(); width * length],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, length: usize, value: T) -> Self {
        Self {
            width,
            length,
            data: vec![value; width * length],
        }
    }

    /// Whether signed coordinates address a cell of this map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.length
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.length, "({}, {}) out of bounds", x, y);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Lookup that tolerates any coordinate, returning `None` off the map.
    pub fn try_get(&self, x: i32, y: i32) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Count the 8-connected neighbours of `(x, y)` matching `pred`.
    /// `boundary` decides what missing neighbours contribute at the edges.
    pub fn count_neighbors_8<F>(&self, x: usize, y: usize, boundary: Boundary, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut count = 0;

        for (dx, dy) in NEIGHBORS_8 {
            match self.try_get(x as i32 + dx, y as i32 + dy) {
                Some(value) => {
                    if pred(value) {
                        count += 1;
                    }
                }
                None => {
                    if boundary == Boundary::CountAsMatch {
                        count += 1;
                    }
                }
            }
        }

        count
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_get_out_of_bounds() {
        let map = Tilemap::new_with(4, 3, 7u8);

        assert_eq!(map.try_get(0, 0), Some(&7));
        assert_eq!(map.try_get(3, 2), Some(&7));
        assert_eq!(map.try_get(-1, 0), None);
        assert_eq!(map.try_get(4, 0), None);
        assert_eq!(map.try_get(0, 3), None);
    }

    #[test]
    fn test_rows_do_not_wrap() {
        let mut map = Tilemap::new_with(3, 3, false);
        map.set(2, 0, true);

        // (2, 0) is not a neighbour of (0, 1)
        assert_eq!(map.count_neighbors_8(0, 1, Boundary::Ignore, |&v| v), 0);
        assert_eq!(map.count_neighbors_8(1, 1, Boundary::Ignore, |&v| v), 1);
    }

    #[test]
    fn test_boundary_policies() {
        let map = Tilemap::new_with(5, 5, false);

        // Corner: 5 of the 8 neighbours are missing
        assert_eq!(map.count_neighbors_8(0, 0, Boundary::CountAsMatch, |&v| v), 5);
        assert_eq!(map.count_neighbors_8(0, 0, Boundary::Ignore, |&v| v), 0);

        // Edge: 3 missing
        assert_eq!(map.count_neighbors_8(2, 0, Boundary::CountAsMatch, |&v| v), 3);

        // Interior: none missing
        assert_eq!(map.count_neighbors_8(2, 2, Boundary::CountAsMatch, |&v| v), 0);
    }

    #[test]
    fn test_iter_coordinates() {
        let mut map = Tilemap::new(3, 2);
        map.set(1, 1, 5i32);

        let found: Vec<_> = map.iter().filter(|(_, _, v)| **v == 5).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(found, vec![(1, 1)]);
    }
}
