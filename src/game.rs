//! One trip through the maze.
//!
//! The session owns the board handed out by the generator. Walking onto an
//! item collects it (the cell turns empty); walking onto the goal wins, after
//! which further moves are ignored until a new game is started.

use crate::grid::{self, Dir, Grid, GridConfig, GridError, Pos, Tile};
use log::info;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
}

/// What a single move did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveEvent {
    /// The run is over, or the move would leave the board.
    Ignored,
    /// An obstacle is in the way; the player stays put.
    Blocked,
    Moved,
    Collected,
    Won,
}

#[derive(Clone, Debug)]
pub struct Session {
    config: GridConfig,
    grid: Grid,
    player: Pos,
    moves: u32,
    collected: usize,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(config: GridConfig, rng: &mut impl Rng) -> Result<Self, GridError> {
        let grid = grid::generate(rng, &config)?;
        Ok(Self::with_grid(config, grid))
    }

    fn with_grid(config: GridConfig, grid: Grid) -> Self {
        let player = grid.start();
        Self {
            config,
            grid,
            player,
            moves: 0,
            collected: 0,
            outcome: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    /// Items placed on the board at the start of the game.
    pub fn total_items(&self) -> usize {
        self.config.items
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn move_player(&mut self, dir: Dir) -> MoveEvent {
        if self.is_over() {
            return MoveEvent::Ignored;
        }
        let Some(next) = self.grid.step(self.player, dir) else {
            return MoveEvent::Ignored;
        };

        let tile = self.grid.get(next);
        if !tile.is_walkable() {
            return MoveEvent::Blocked;
        }
        self.player = next;
        self.moves += 1;

        match tile {
            Tile::Item => {
                self.grid.set(next, Tile::Empty);
                self.collected += 1;
                MoveEvent::Collected
            }
            Tile::Goal => {
                self.outcome = Some(Outcome::Won);
                info!(
                    "reached the goal in {} moves with {}/{} items",
                    self.moves, self.collected, self.config.items
                );
                MoveEvent::Won
            }
            _ => MoveEvent::Moved,
        }
    }

    /// Start over on a fresh board. On error the current game is left as is.
    pub fn restart(&mut self, rng: &mut impl Rng) -> Result<(), GridError> {
        let grid = grid::generate(rng, &self.config)?;
        *self = Self::with_grid(self.config, grid);
        Ok(())
    }

    /// Shortest walk from the player to the goal, if one exists.
    pub fn steps_to_goal(&self) -> Option<usize> {
        let goal = self.grid.goal();
        grid::distances_from(&self.grid, self.player)[goal.y][goal.x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GridConfig {
        GridConfig {
            size: 4,
            items: 2,
            obstacles: 3,
            max_attempts: 100,
        }
    }

    // S * # .
    // . . . .
    // . * . .
    // . . . G
    fn scripted_session() -> Session {
        let mut grid = Grid::open(4);
        grid.set(Pos::new(1, 0), Tile::Item);
        grid.set(Pos::new(1, 2), Tile::Item);
        grid.set(Pos::new(2, 0), Tile::Obstacle);
        Session::with_grid(small_config(), grid)
    }

    #[test]
    fn new_session_starts_on_start_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = Session::new(small_config(), &mut rng).unwrap();
        assert_eq!(session.player(), Pos::new(0, 0));
        assert_eq!(session.moves(), 0);
        assert_eq!(session.collected(), 0);
        assert_eq!(session.total_items(), 2);
        assert_eq!(session.outcome(), None);
        assert!(session.steps_to_goal().is_some());
    }

    #[test]
    fn collecting_an_item_empties_the_cell() {
        let mut session = scripted_session();

        assert_eq!(session.move_player(Dir::Right), MoveEvent::Collected);
        assert_eq!(session.player(), Pos::new(1, 0));
        assert_eq!(session.collected(), 1);
        assert_eq!(session.grid().get(Pos::new(1, 0)), Tile::Empty);
        assert_eq!(session.grid().count(Tile::Item), 1);
    }

    #[test]
    fn every_accepted_step_counts_as_a_move() {
        let mut session = scripted_session();
        session.move_player(Dir::Down);
        session.move_player(Dir::Right);
        session.move_player(Dir::Left);
        assert_eq!(session.moves(), 3);
        assert_eq!(session.player(), Pos::new(0, 1));
    }

    #[test]
    fn obstacles_block_without_counting() {
        let mut session = scripted_session();
        session.move_player(Dir::Right);

        assert_eq!(session.move_player(Dir::Right), MoveEvent::Blocked);
        assert_eq!(session.player(), Pos::new(1, 0));
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn edges_clamp_movement() {
        let mut session = scripted_session();
        assert_eq!(session.move_player(Dir::Up), MoveEvent::Ignored);
        assert_eq!(session.move_player(Dir::Left), MoveEvent::Ignored);
        assert_eq!(session.player(), Pos::new(0, 0));
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn reaching_the_goal_wins_and_freezes_the_board() {
        let mut session = scripted_session();
        for dir in [Dir::Down, Dir::Down, Dir::Right, Dir::Down, Dir::Right] {
            session.move_player(dir);
        }
        assert_eq!(session.collected(), 1);
        assert_eq!(session.steps_to_goal(), Some(1));

        assert_eq!(session.move_player(Dir::Right), MoveEvent::Won);
        assert_eq!(session.outcome(), Some(Outcome::Won));
        assert_eq!(session.player(), Pos::new(3, 3));
        assert_eq!(session.moves(), 6);

        assert_eq!(session.move_player(Dir::Up), MoveEvent::Ignored);
        assert_eq!(session.player(), Pos::new(3, 3));
        assert_eq!(session.moves(), 6);
    }

    #[test]
    fn restart_resets_progress() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut session = scripted_session();
        session.move_player(Dir::Right);
        session.restart(&mut rng).unwrap();
        assert_eq!(session.moves(), 0);
        assert_eq!(session.collected(), 0);
        assert_eq!(session.outcome(), None);
        assert_eq!(session.player(), Pos::new(0, 0));
        assert_eq!(session.grid().count(Tile::Item), 2);
    }

    #[test]
    fn failed_restart_keeps_the_current_game() {
        let impossible = GridConfig {
            size: 4,
            items: 0,
            obstacles: 14,
            max_attempts: 50,
        };
        let mut session = Session::with_grid(impossible, Grid::open(4));
        for dir in [Dir::Down, Dir::Down, Dir::Down, Dir::Right, Dir::Right] {
            session.move_player(dir);
        }
        assert_eq!(session.move_player(Dir::Right), MoveEvent::Won);
        let before = session.grid().clone();

        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(
            session.restart(&mut rng),
            Err(GridError::GenerationExhausted { attempts: 50 })
        );
        assert_eq!(session.grid(), &before);
        assert_eq!(session.player(), Pos::new(3, 3));
        assert_eq!(session.moves(), 6);
        assert_eq!(session.outcome(), Some(Outcome::Won));
    }
}
