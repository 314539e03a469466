//! Bee's Journey Home: guide the bee through a random maze to its hive.
//! Every board is generated solvable.

pub mod config;
pub mod game;
pub mod grid;

pub use config::Settings;
pub use game::{MoveEvent, Outcome, Session};
pub use grid::{generate, Dir, Grid, GridConfig, GridError, Pos, Tile};
