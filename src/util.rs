use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::info;

use crate::internal_util::{adjacent, all_cells};
use crate::{Agent, BoardInfo, Coord, InconsistencyError};

/// The true layout of a game: where the mines are, and which of them the
/// player has flagged
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    info: BoardInfo,
    mines: HashSet<Coord>,
    mines_found: HashSet<Coord>,
}
impl Board {
    /// Create a game board from an ASCII-encoded layout, where:
    /// - `*` is a mine
    /// - `.` is a safe cell
    /// - Trailing or leading whitespace is ignored
    ///
    /// # Errors
    ///
    /// If the board is not rectangular, has a width or height of 0, or
    /// contains any other character, an error is returned.
    pub fn new(encoded: &str) -> Result<Self, String> {
        let lines = encoded.trim().lines().map(|l| l.trim()).collect_vec();
        let height = lines.len();
        if height == 0 {
            return Err("Board must have at least one row".to_string());
        }
        let width = lines[0].len();
        if width == 0 {
            return Err("Board must have at least one column".to_string());
        }
        if let Some(line) = lines.iter().find(|l| l.len() != width) {
            return Err(format!(
                concat!(
                    "Board must be rectangular (found line with length {},",
                    " expected length {})",
                ),
                line.len(),
                width,
            ));
        }
        let mut mines = HashSet::new();
        for (row, line) in lines.into_iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                match c {
                    '*' => {
                        mines.insert((row, col));
                    },
                    '.' => (),
                    _ => {
                        return Err(format!(
                            "Invalid character '{}' at ({}, {})",
                            c, row, col
                        ));
                    },
                }
            }
        }
        Ok(Self {
            info: BoardInfo {
                height,
                width,
            },
            mines,
            mines_found: HashSet::new(),
        })
    }

    /// Scatter `mines` mines uniformly over a `height` x `width` board
    ///
    /// # Errors
    ///
    /// If the board is empty, or there is no room left for a safe cell.
    pub fn random(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, String> {
        let info = BoardInfo {
            height,
            width,
        };
        if info.total_cells() == 0 {
            return Err("Board must have at least one cell".to_string());
        }
        if mines >= info.total_cells() {
            return Err(format!(
                "Board of {} cells cannot hold {} mines",
                info.total_cells(),
                mines
            ));
        }

        let mut placed = HashSet::with_capacity(mines);
        let mut mines_left = mines;
        for (cells_left, cell) in (1..=info.total_cells()).rev().zip(all_cells(info)) {
            if rng.random_ratio(mines_left as u32, cells_left as u32) {
                placed.insert(cell);
                mines_left -= 1;
            }
        }
        Ok(Self {
            info,
            mines: placed,
            mines_found: HashSet::new(),
        })
    }

    pub fn info(&self) -> BoardInfo {
        self.info
    }

    pub fn total_mines(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Coord) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines adjacent to `cell`, not counting the cell itself
    pub fn nearby_mines(&self, cell: Coord) -> usize {
        adjacent(cell, self.info)
            .filter(|adj| self.mines.contains(adj))
            .count()
    }

    /// Flag `cell` as a mine
    pub fn flag(&mut self, cell: Coord) {
        self.mines_found.insert(cell);
    }

    pub fn mines_found(&self) -> &HashSet<Coord> {
        &self.mines_found
    }

    /// Have all mines been flagged (and nothing else)?
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }

    /// Has every safe cell been revealed?
    pub fn cleared(&self, revealed: &HashSet<Coord>) -> bool {
        all_cells(self.info).all(|cell| self.is_mine(cell) || revealed.contains(&cell))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = format!("{}-", "--".repeat(self.info.width));
        for row in 0..self.info.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.info.width {
                write!(f, "{}", if self.is_mine((row, col)) { "|X" } else { "| " })?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "{rule}")
    }
}

/// How a game played by [`play`] ended
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Outcome {
    /// Every mine was found, or every safe cell revealed
    Won,
    /// The agent had to guess, and revealed a mine
    Lost(Coord),
    /// No cell was left to reveal
    Stuck,
}

/// Let `agent` play `board` until the game ends.
///
/// Safe moves are always preferred; when there are none, a cell is guessed
/// uniformly among those not known to be mines. Every mine the agent proves is
/// flagged on the board.
///
/// # Errors
///
/// If the agent's knowledge becomes inconsistent, which can only happen if it
/// was given knowledge that doesn't match `board`.
pub fn play(
    board: &mut Board,
    agent: &mut Agent,
    rng: &mut impl Rng,
) -> Result<Outcome, InconsistencyError> {
    loop {
        let cell = if let Some(cell) = agent.make_safe_move() {
            info!(?cell, "Making safe move");
            cell
        } else {
            let candidates = agent.unresolved_cells().collect_vec();
            let Some(&cell) = candidates.choose(rng) else {
                info!("No moves left");
                return Ok(Outcome::Stuck);
            };
            info!(?cell, candidates = candidates.len(), "No known safe move, guessing");
            cell
        };

        if board.is_mine(cell) {
            info!(?cell, "Revealed a mine");
            return Ok(Outcome::Lost(cell));
        }
        agent.add_knowledge(cell, board.nearby_mines(cell))?;
        for &mine in agent.mines() {
            board.flag(mine);
        }

        if board.won() || board.cleared(agent.moves_made()) {
            info!(
                moves = agent.moves_made().len(),
                mines = board.mines_found().len(),
                "Game won"
            );
            return Ok(Outcome::Won);
        }
    }
}
