//! Binary Space Partitioning (BSP) for room generation
//!
//! Splits the grid into a binary tree of regions, carves one room per leaf
//! and joins sibling subtrees with dogleg corridors. The tree lives in an
//! arena ([`BspTree`]) and nodes refer to their children by index.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::grid::{Grid, Rect};
use crate::seeds::RandomSource;
use crate::tileset::Tile;

use super::{StepGenerator, StepReport};

/// Parameters for BSP generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspParams {
    /// Maximum depth of the partition tree
    pub max_iterations: u32,
    /// Smallest side a split may leave, and the smallest room size
    pub min_room_size: i32,
    /// Gap kept between a room and the edge of its leaf
    pub room_padding: i32,
}

impl Default for BspParams {
    fn default() -> Self {
        Self {
            max_iterations: 4,
            min_room_size: 4,
            room_padding: 2,
        }
    }
}

impl BspParams {
    pub fn validate(&self) -> GenResult<()> {
        if self.min_room_size <= 0 {
            return Err(GenError::InvalidConfig(format!(
                "bsp min_room_size must be positive, got {}",
                self.min_room_size
            )));
        }
        if self.room_padding < 0 {
            return Err(GenError::InvalidConfig(format!(
                "bsp room_padding must not be negative, got {}",
                self.room_padding
            )));
        }
        Ok(())
    }
}

pub type NodeId = usize;

/// One region of the partition tree.
#[derive(Clone, Debug, PartialEq)]
pub struct BspNode {
    pub bounds: Rect,
    /// Carved room, only ever set on leaves
    pub room: Option<Rect>,
    /// Both children or none
    pub children: Option<(NodeId, NodeId)>,
    pub depth: u32,
}

impl BspNode {
    fn new(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            room: None,
            children: None,
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Whether a region is large enough to hold two children of `min_size`.
pub fn can_split(bounds: &Rect, min_size: i32) -> bool {
    bounds.width >= min_size * 2 && bounds.height >= min_size * 2
}

/// Partition tree stored as an arena. Node 0 is the root.
#[derive(Clone, Debug)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    pub fn new(bounds: Rect) -> Self {
        Self {
            nodes: vec![BspNode::new(bounds, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    /// Deepest node depth in the tree
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Leaf ids in pre-order (left subtree before right).
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root(), &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: NodeId, leaves: &mut Vec<NodeId>) {
        match self.nodes[id].children {
            None => leaves.push(id),
            Some((left, right)) => {
                self.collect_leaves(left, leaves);
                self.collect_leaves(right, leaves);
            }
        }
    }

    /// Recursively split a node until it reaches the depth limit or is too
    /// small. Both children are fully divided before this returns.
    pub fn divide(&mut self, id: NodeId, params: &BspParams, rng: &mut RandomSource) {
        let node = &self.nodes[id];
        if node.depth >= params.max_iterations {
            return;
        }
        if !can_split(&node.bounds, params.min_room_size) {
            return;
        }

        let (left, right) = self.split(id, params.min_room_size, rng);
        self.divide(left, params, rng);
        self.divide(right, params, rng);
    }

    /// Cut a node in two along its longer side. A square region picks the
    /// axis with a coin flip.
    fn split(&mut self, id: NodeId, min_size: i32, rng: &mut RandomSource) -> (NodeId, NodeId) {
        let bounds = self.nodes[id].bounds;
        let depth = self.nodes[id].depth + 1;

        let split_horizontally = if bounds.width > bounds.height {
            false
        } else if bounds.height > bounds.width {
            true
        } else {
            rng.chance(0.5)
        };

        let (first, second) = if split_horizontally {
            let split_y = rng.range_inclusive(bounds.y_min() + min_size, bounds.y_max() - min_size);
            (
                Rect::new(bounds.x, bounds.y, bounds.width, split_y - bounds.y),
                Rect::new(bounds.x, split_y, bounds.width, bounds.y_max() - split_y),
            )
        } else {
            let split_x = rng.range_inclusive(bounds.x_min() + min_size, bounds.x_max() - min_size);
            (
                Rect::new(bounds.x, bounds.y, split_x - bounds.x, bounds.height),
                Rect::new(split_x, bounds.y, bounds.x_max() - split_x, bounds.height),
            )
        };

        let left = self.nodes.len();
        self.nodes.push(BspNode::new(first, depth));
        let right = self.nodes.len();
        self.nodes.push(BspNode::new(second, depth));

        self.nodes[id].children = Some((left, right));
        (left, right)
    }

    /// Give every leaf a room, in pre-order.
    pub fn carve_rooms(&mut self, params: &BspParams, rng: &mut RandomSource) {
        for id in self.leaves() {
            let room = create_room(&self.nodes[id].bounds, params.min_room_size, params.room_padding, rng);
            self.nodes[id].room = Some(room);
        }
    }

    /// Point used to connect a subtree: the room center of a leaf, otherwise
    /// the representative point of the left child. The descent always ends
    /// at a leaf, so the point lies in a carved room once rooms exist.
    pub fn representative_point(&self, id: NodeId) -> (i32, i32) {
        let node = &self.nodes[id];
        match node.children {
            Some((left, _)) => self.representative_point(left),
            None => node.room.unwrap_or(node.bounds).center(),
        }
    }

    /// Corridors joining every pair of siblings, in post-order.
    pub fn connect_rooms(&self, rng: &mut RandomSource) -> Vec<Corridor> {
        let mut corridors = Vec::new();
        self.connect_recursive(self.root(), rng, &mut corridors);
        corridors
    }

    fn connect_recursive(&self, id: NodeId, rng: &mut RandomSource, corridors: &mut Vec<Corridor>) {
        let Some((left, right)) = self.nodes[id].children else {
            return;
        };

        self.connect_recursive(left, rng, corridors);
        self.connect_recursive(right, rng, corridors);

        corridors.push(Corridor {
            from: self.representative_point(left),
            to: self.representative_point(right),
            horizontal_first: rng.chance(0.5),
        });
    }
}

/// Room strictly inside `bounds`, inset by `padding` where the leaf allows it.
pub fn create_room(bounds: &Rect, min_room_size: i32, padding: i32, rng: &mut RandomSource) -> Rect {
    let (x, width) = room_span(bounds.x, bounds.width, min_room_size, padding, rng);
    let (y, height) = room_span(bounds.y, bounds.height, min_room_size, padding, rng);
    Rect::new(x, y, width, height)
}

/// Position and size of a room along one axis of a leaf.
fn room_span(start: i32, side: i32, min_room_size: i32, padding: i32, rng: &mut RandomSource) -> (i32, i32) {
    // Keep at least one cell between the paddings
    let pad = padding.clamp(0, ((side - 1) / 2).max(0));
    let inner = side - pad * 2;

    let size = rng.range_inclusive(min_room_size.min(inner), inner);
    let offset = rng.range_inclusive(0, inner - size);

    (start + pad + offset, size)
}

/// L-shaped corridor between two points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corridor {
    pub from: (i32, i32),
    pub to: (i32, i32),
    /// Horizontal run at `from.y` first, otherwise vertical run at `from.x` first
    pub horizontal_first: bool,
}

impl Corridor {
    /// Every cell on both runs, endpoints included.
    pub fn cells(&self) -> Vec<(i32, i32)> {
        let (x1, y1) = self.from;
        let (x2, y2) = self.to;
        let mut cells = Vec::new();

        if self.horizontal_first {
            horizontal_run(x1, x2, y1, &mut cells);
            vertical_run(y1, y2, x2, &mut cells);
        } else {
            vertical_run(y1, y2, x1, &mut cells);
            horizontal_run(x1, x2, y2, &mut cells);
        }

        cells
    }
}

fn horizontal_run(x1: i32, x2: i32, y: i32, cells: &mut Vec<(i32, i32)>) {
    for x in x1.min(x2)..=x1.max(x2) {
        cells.push((x, y));
    }
}

fn vertical_run(y1: i32, y2: i32, x: i32, cells: &mut Vec<(i32, i32)>) {
    for y in y1.min(y2)..=y1.max(y2) {
        cells.push((x, y));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BspPhase {
    Divide,
    CarveRooms,
    ConnectRooms,
    BuildGround,
    Finished,
}

/// Step-wise BSP run: divide, carve rooms, connect, fill ground.
pub struct BspGeneration {
    params: BspParams,
    bounds: Rect,
    tree: BspTree,
    corridors: Vec<Corridor>,
    phase: BspPhase,
}

impl BspGeneration {
    pub fn new(params: BspParams, grid: &Grid) -> Self {
        let bounds = grid.bounds();
        Self {
            params,
            bounds,
            tree: BspTree::new(bounds),
            corridors: Vec::new(),
            phase: BspPhase::Divide,
        }
    }

    /// The partition tree as built so far.
    pub fn tree(&self) -> &BspTree {
        &self.tree
    }

    /// Corridors carved by the connect step, empty before it runs.
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }
}

impl StepGenerator for BspGeneration {
    fn step(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> StepReport {
        match self.phase {
            BspPhase::Divide => {
                self.tree = BspTree::new(self.bounds);
                let root = self.tree.root();
                self.tree.divide(root, &self.params, rng);
                self.phase = BspPhase::CarveRooms;

                let leaves = self.tree.leaves().len();
                log::debug!("BSP tree: {} nodes, {} leaves, depth {}", self.tree.nodes().len(), leaves, self.tree.depth());
                StepReport::progress(format!("Divided grid into {} regions", leaves))
            }
            BspPhase::CarveRooms => {
                self.tree.carve_rooms(&self.params, rng);

                let mut rooms = 0;
                for id in self.tree.leaves() {
                    if let Some(room) = self.tree.node(id).room {
                        log::debug!("Room created at {}", room);
                        for (x, y) in room.cells() {
                            grid.place_at(x, y, Tile::Room, true);
                        }
                        rooms += 1;
                    }
                }
                self.phase = BspPhase::ConnectRooms;
                StepReport::progress(format!("Carved {} rooms", rooms))
            }
            BspPhase::ConnectRooms => {
                self.corridors = self.tree.connect_rooms(rng);
                for corridor in &self.corridors {
                    log::trace!("Corridor {:?} -> {:?}", corridor.from, corridor.to);
                    for (x, y) in corridor.cells() {
                        grid.place_at(x, y, Tile::Corridor, true);
                    }
                }
                self.phase = BspPhase::BuildGround;
                StepReport::progress(format!("Connected rooms with {} corridors", self.corridors.len()))
            }
            BspPhase::BuildGround => {
                let cells: Vec<_> = grid.iter().map(|(cell, _)| cell).collect();
                for cell in cells {
                    grid.place_tile(cell, Tile::Grass, false);
                }
                self.phase = BspPhase::Finished;
                StepReport::last("Built ground")
            }
            BspPhase::Finished => StepReport::last("BSP generation already finished"),
        }
    }
}
