//! Solvable grid generation.
//!
//! A grid is an N×N board with the start in the top-left corner, the goal in
//! the bottom-right corner, a number of collectible items and a number of
//! obstacles. Boards are produced by rejection sampling and accepted only when
//! an obstacle-free path joins start and goal; otherwise the whole board is
//! thrown away and rolled again, up to a fixed number of attempts.

use log::{debug, trace, warn};
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_GRID_SIZE: usize = 8;
pub const DEFAULT_ITEM_COUNT: usize = 5;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Cells reserved for start and goal.
const RESERVED_CELLS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Start,
    Goal,
    Item,
    Obstacle,
}

impl Tile {
    pub fn is_walkable(self) -> bool {
        self != Tile::Obstacle
    }
}

/// Cell coordinate: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Neighbor order of the reachability walk: +x, -x, +y, -y.
const WALK_ORDER: [Dir; 4] = [Dir::Right, Dir::Left, Dir::Down, Dir::Up];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    /// A board with only start and goal placed.
    pub fn open(size: usize) -> Self {
        let mut grid = Self {
            size,
            cells: vec![vec![Tile::Empty; size]; size],
        };
        let (start, goal) = (grid.start(), grid.goal());
        grid.set(start, Tile::Start);
        grid.set(goal, Tile::Goal);
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Pos {
        Pos::new(0, 0)
    }

    pub fn goal(&self) -> Pos {
        Pos::new(self.size - 1, self.size - 1)
    }

    pub fn get(&self, pos: Pos) -> Tile {
        self.cells[pos.y][pos.x]
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.cells[pos.y][pos.x] = tile;
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&cell| cell == tile)
            .count()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// The neighbor of `pos` in `dir`, if it lies on the board.
    pub fn step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x.checked_add_signed(dx)?;
        let ny = pos.y.checked_add_signed(dy)?;
        let next = Pos::new(nx, ny);
        self.contains(next).then_some(next)
    }

    fn random_pos(&self, rng: &mut impl Rng) -> Pos {
        Pos::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                let c = match cell {
                    Tile::Empty => '.',
                    Tile::Start => 'S',
                    Tile::Goal => 'G',
                    Tile::Item => '*',
                    Tile::Obstacle => '#',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub size: usize,
    pub items: usize,
    pub obstacles: usize,
    pub max_attempts: u32,
}

impl GridConfig {
    /// Default counts for a board of the given side length; obstacles scale as 2×N.
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            items: DEFAULT_ITEM_COUNT,
            obstacles: size.saturating_mul(2),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.size < 2 {
            return Err(GridError::InvalidConfiguration(format!(
                "grid size must be at least 2, got {}",
                self.size
            )));
        }
        if self.max_attempts == 0 {
            return Err(GridError::InvalidConfiguration(
                "retry cap must allow at least one attempt".to_string(),
            ));
        }
        let cells = self.size.checked_mul(self.size);
        let needed = self
            .items
            .checked_add(self.obstacles)
            .and_then(|n| n.checked_add(RESERVED_CELLS));
        match (cells, needed) {
            (Some(cells), Some(needed)) if needed <= cells => Ok(()),
            _ => Err(GridError::InvalidConfiguration(format!(
                "{} items and {} obstacles do not fit a {}x{} grid",
                self.items, self.obstacles, self.size, self.size
            ))),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::with_size(DEFAULT_GRID_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Requested counts cannot be placed on the board.
    InvalidConfiguration(String),
    /// No solvable board was rolled within the retry cap.
    GenerationExhausted { attempts: u32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidConfiguration(msg) => write!(f, "Invalid grid configuration: {}", msg),
            GridError::GenerationExhausted { attempts } => write!(
                f,
                "No solvable grid found after {} attempts; try fewer obstacles",
                attempts
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Roll boards until one is solvable or the retry cap runs out.
pub fn generate(rng: &mut impl Rng, config: &GridConfig) -> Result<Grid, GridError> {
    config.validate()?;

    for attempt in 1..=config.max_attempts {
        let grid = roll(rng, config);
        if is_solvable(&grid) {
            debug!(
                "accepted {}x{} grid on attempt {}",
                config.size, config.size, attempt
            );
            trace!("grid:\n{}", grid);
            return Ok(grid);
        }
        debug!("attempt {} produced an unsolvable grid, regenerating", attempt);
    }

    warn!(
        "gave up after {} attempts (size {}, items {}, obstacles {})",
        config.max_attempts, config.size, config.items, config.obstacles
    );
    Err(GridError::GenerationExhausted {
        attempts: config.max_attempts,
    })
}

/// One unchecked board. `config` must already be validated so that enough
/// empty cells remain for every placement.
fn roll(rng: &mut impl Rng, config: &GridConfig) -> Grid {
    let mut grid = Grid::open(config.size);
    let (start, goal) = (grid.start(), grid.goal());

    for _ in 0..config.items {
        let pos = sample_cell(rng, &grid, |_| true);
        grid.set(pos, Tile::Item);
    }
    for _ in 0..config.obstacles {
        let pos = sample_cell(rng, &grid, |pos| pos != start && pos != goal);
        grid.set(pos, Tile::Obstacle);
    }
    grid
}

fn sample_cell(
    rng: &mut impl Rng,
    grid: &Grid,
    allowed: impl Fn(Pos) -> bool,
) -> Pos {
    loop {
        let pos = grid.random_pos(rng);
        if grid.get(pos) == Tile::Empty && allowed(pos) {
            return pos;
        }
    }
}

/// Depth-first walk from start over non-obstacle cells.
pub fn is_solvable(grid: &Grid) -> bool {
    let goal = grid.goal();
    let mut seen = vec![vec![false; grid.size()]; grid.size()];
    let mut stack = vec![grid.start()];
    seen[0][0] = true;

    while let Some(pos) = stack.pop() {
        if pos == goal {
            return true;
        }
        // Reversed so the first direction in WALK_ORDER is popped first.
        for dir in WALK_ORDER.iter().rev() {
            let Some(next) = grid.step(pos, *dir) else {
                continue;
            };
            if seen[next.y][next.x] || !grid.get(next).is_walkable() {
                continue;
            }
            seen[next.y][next.x] = true;
            stack.push(next);
        }
    }
    false
}

/// Breadth-first step counts from `from` over non-obstacle cells.
pub fn distances_from(grid: &Grid, from: Pos) -> Vec<Vec<Option<usize>>> {
    let mut dist = vec![vec![None; grid.size()]; grid.size()];
    let mut q = VecDeque::new();
    dist[from.y][from.x] = Some(0);
    q.push_back(from);

    while let Some(pos) = q.pop_front() {
        let base = dist[pos.y][pos.x].unwrap_or(0);
        for dir in Dir::ALL {
            let Some(next) = grid.step(pos, dir) else {
                continue;
            };
            if !grid.get(next).is_walkable() || dist[next.y][next.x].is_some() {
                continue;
            }
            dist[next.y][next.x] = Some(base + 1);
            q.push_back(next);
        }
    }
    dist
}
