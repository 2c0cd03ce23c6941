//! A knowledge-based minesweeper player.
//!
//! The agent never guesses probabilities: every revealed clue becomes a
//! [`Statement`] ("exactly N of these cells are mines"), and new statements
//! are derived by subtracting one statement from another whenever its cells
//! are a subset of the other's. Cells proven safe or mined are collected in
//! the [`Agent`]'s global knowledge and fed back into every statement until
//! nothing new can be learned.
//!
//! ```
//! use minesweeper_kb::{Agent, BoardInfo};
//!
//! let mut agent = Agent::new(BoardInfo { height: 8, width: 8 });
//! agent.add_knowledge((0, 0), 0).unwrap();
//! assert!(agent.safes().contains(&(1, 1)));
//! assert_eq!(agent.make_safe_move(), Some((0, 1)));
//! ```
use std::error::Error;
use std::fmt;
use std::hash::Hash;

mod internal_util;
mod solve;
pub mod util;

pub use solve::{Agent, Inference, Statement};

/// A type that can be used to uniquely identify a cell on the board.
///
/// Automatically implemented for any eligible type.
pub trait Cell: Clone + Hash + Eq {}
impl<T: Clone + Hash + Eq> Cell for T {
}

/// A board position, as `(row, column)`
pub type Coord = (usize, usize);

/// Board geometry the agent reasons about
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardInfo {
    pub height: usize,
    pub width: usize,
}
impl BoardInfo {
    pub fn total_cells(&self) -> usize {
        self.height * self.width
    }

    pub fn contains(&self, (row, col): Coord) -> bool {
        row < self.height && col < self.width
    }
}

/// The state of the game is logically inconsistent.
///
/// Only produced when the clues fed to the agent contradict each other or the
/// agent's knowledge; truthful clues from a real board never cause it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct InconsistencyError(pub &'static str);

impl fmt::Display for InconsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "inconsistent knowledge: {}", self.0)
    }
}

impl Error for InconsistencyError {}
