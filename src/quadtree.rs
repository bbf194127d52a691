/*
 * Quadtree Module
 *
 * This module defines the region quadtree used for neighbor lookups. The tree
 * is rebuilt from the current positions every tick, queried read-only while
 * the flock steers, and reset before the next build.
 *
 * Nodes live in an arena owned by a `NodePool`; children are referenced by
 * index, never by pointer, and a reset hands them back to the pool's free list
 * so steady-state ticks do not allocate.
 *
 * Buckets hold boid ids only. Queries look positions up through
 * `PositionSource`, so the tree never keeps a copy that could go stale.
 *
 * When a full node takes another insert it subdivides and only the new entry
 * moves down; entries already in the bucket stay where they are. Nodes at
 * `MAX_DEPTH` never subdivide and take any number of entries, so stacks of
 * coincident boids cannot split the tree below f32 resolution.
 */

use crate::vector::Vec2;

/// Entries a node holds before it subdivides.
pub const DEFAULT_NODE_CAPACITY: usize = 16;

/// Deepest level a node may sit at, counting the root as level 1.
pub const MAX_DEPTH: usize = 16;

pub type NodeId = usize;

/// Anything that can resolve a boid id to its current position.
pub trait PositionSource {
    fn position_of(&self, id: usize) -> Vec2;
}

impl PositionSource for [Vec2] {
    #[inline]
    fn position_of(&self, id: usize) -> Vec2 {
        self[id]
    }
}

impl PositionSource for Vec<Vec2> {
    #[inline]
    fn position_of(&self, id: usize) -> Vec2 {
        self[id]
    }
}

/// Axis-aligned rectangle stored as center plus half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
}

impl Rect {
    pub const fn new(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            center,
            half_width,
            half_height,
        }
    }

    /// The whole world, `[0, width] x [0, height]`.
    pub fn world(width: f32, height: f32) -> Self {
        Self::new(Vec2::new(width / 2.0, height / 2.0), width / 2.0, height / 2.0)
    }

    /// Square window centered on `center`.
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        Self::new(center, half_extent, half_extent)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half_width
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half_width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half_height
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_height
    }

    /// Edges count as inside.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Touching edges count as intersecting.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.left() > self.right()
            || other.right() < self.left()
            || other.top() > self.bottom()
            || other.bottom() < self.top())
    }

    pub fn quadrant(&self, quadrant: Quadrant) -> Rect {
        let half_width = self.half_width / 2.0;
        let half_height = self.half_height / 2.0;
        let (sx, sy) = quadrant.offset_signs();
        Rect::new(
            Vec2::new(
                self.center.x + sx * half_width,
                self.center.y + sy * half_height,
            ),
            half_width,
            half_height,
        )
    }
}

/// Child slots, in the order inserts try them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    // y grows downward, so north is -y
    fn offset_signs(self) -> (f32, f32) {
        match self {
            Quadrant::NorthWest => (-1.0, -1.0),
            Quadrant::NorthEast => (1.0, -1.0),
            Quadrant::SouthWest => (-1.0, 1.0),
            Quadrant::SouthEast => (1.0, 1.0),
        }
    }
}

#[derive(Debug)]
struct Node {
    boundary: Rect,
    bucket: Vec<usize>,
    children: Option<[NodeId; 4]>,
}

impl Node {
    fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }
}

/// Arena of quadtree nodes with a free list.
#[derive(Debug)]
pub struct NodePool {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    bucket_capacity: usize,
}

impl NodePool {
    pub fn new(bucket_capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            bucket_capacity,
        }
    }

    fn acquire(&mut self, boundary: Rect) -> NodeId {
        if let Some(id) = self.free.pop() {
            let node = &mut self.nodes[id];
            debug_assert!(node.bucket.is_empty() && node.children.is_none());
            node.boundary = boundary;
            return id;
        }

        self.nodes.push(Node {
            boundary,
            bucket: Vec::with_capacity(self.bucket_capacity),
            children: None,
        });
        self.nodes.len() - 1
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.bucket.clear();
        node.children = None;
        self.free.push(id);
    }

    /// Nodes ever created by this pool.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes sitting on the free list.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn in_use(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

#[derive(Debug)]
pub struct QuadTree {
    pool: NodePool,
    root: Option<NodeId>,
    capacity: usize,
    len: usize,
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadTree {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NODE_CAPACITY)
    }

    /// A tree whose nodes subdivide after `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pool: NodePool::new(capacity),
            root: None,
            capacity,
            len: 0,
        }
    }

    /// Start a new, empty tree covering `boundary`. Any previous contents are
    /// reset first and the root node is reused.
    pub fn build(&mut self, boundary: Rect) {
        self.reset();
        match self.root {
            Some(root) => self.pool.nodes[root].boundary = boundary,
            None => self.root = Some(self.pool.acquire(boundary)),
        }
    }

    pub fn boundary(&self) -> Option<Rect> {
        self.root.map(|root| self.pool.nodes[root].boundary)
    }

    /// Insert boid `id` at `position`. Returns false only when the position
    /// lies outside the root boundary or no tree has been built.
    pub fn insert(&mut self, position: Vec2, id: usize) -> bool {
        let Some(mut node) = self.root else {
            return false;
        };

        if !self.pool.nodes[node].boundary.contains(position) {
            return false;
        }

        let mut level = 1;
        loop {
            if self.pool.nodes[node].bucket.len() < self.capacity || level >= MAX_DEPTH {
                break;
            }

            let children = match self.pool.nodes[node].children {
                Some(children) => children,
                None => self.subdivide(node),
            };

            // Rounded child edges can leave a sliver of the parent uncovered
            match children
                .iter()
                .copied()
                .find(|&child| self.pool.nodes[child].boundary.contains(position))
            {
                Some(child) => {
                    node = child;
                    level += 1;
                }
                None => break,
            }
        }

        self.pool.nodes[node].bucket.push(id);
        self.len += 1;
        true
    }

    fn subdivide(&mut self, node: NodeId) -> [NodeId; 4] {
        let boundary = self.pool.nodes[node].boundary;
        let children = Quadrant::ALL.map(|quadrant| self.pool.acquire(boundary.quadrant(quadrant)));
        self.pool.nodes[node].children = Some(children);
        children
    }

    /// Ids of every entry whose position lies inside `range`.
    pub fn query<S>(&self, range: &Rect, positions: &S) -> Vec<usize>
    where
        S: PositionSource + ?Sized,
    {
        let mut found = Vec::new();
        self.query_into(range, positions, &mut found);
        found
    }

    /// Like `query`, appending into a caller-owned buffer.
    pub fn query_into<S>(&self, range: &Rect, positions: &S, found: &mut Vec<usize>)
    where
        S: PositionSource + ?Sized,
    {
        if let Some(root) = self.root {
            self.query_node(root, range, positions, found);
        }
    }

    fn query_node<S>(&self, node: NodeId, range: &Rect, positions: &S, found: &mut Vec<usize>)
    where
        S: PositionSource + ?Sized,
    {
        let node = &self.pool.nodes[node];
        if !node.boundary.intersects(range) {
            return;
        }

        found.extend(
            node.bucket
                .iter()
                .copied()
                .filter(|&id| range.contains(positions.position_of(id))),
        );

        if let Some(children) = node.children {
            for child in children {
                self.query_node(child, range, positions, found);
            }
        }
    }

    /// Empty the tree: buckets cleared, children back in the pool. The root
    /// stays allocated for the next build. Safe to call repeatedly.
    pub fn reset(&mut self) {
        if let Some(root) = self.root {
            self.release_children(root);
            self.pool.nodes[root].bucket.clear();
        }
        self.len = 0;
    }

    fn release_children(&mut self, node: NodeId) {
        if let Some(children) = self.pool.nodes[node].children.take() {
            for child in children {
                self.release_children(child);
                self.pool.release(child);
            }
        }
    }

    /// Entries inserted since the last build.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Nodes currently linked into the tree.
    pub fn node_count(&self) -> usize {
        self.pool.in_use()
    }

    /// Levels below and including the root; zero before the first build.
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.depth_of(root))
    }

    fn depth_of(&self, node: NodeId) -> usize {
        match self.pool.nodes[node].children {
            Some(children) => 1 + children.iter().map(|&c| self.depth_of(c)).max().unwrap_or(0),
            None => 1,
        }
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    pub fn is_subdivided(&self) -> bool {
        self.root
            .map_or(false, |root| self.pool.nodes[root].is_subdivided())
    }
}

/// Linear scan reference for `QuadTree::query`.
pub fn scan_range(range: &Rect, positions: &[Vec2]) -> Vec<usize> {
    positions
        .iter()
        .enumerate()
        .filter(|(_, p)| range.contains(**p))
        .map(|(id, _)| id)
        .collect()
}
