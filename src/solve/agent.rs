use std::collections::HashSet;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::internal_util::adjacent;
use crate::solve::Statement;
use crate::{BoardInfo, Coord, InconsistencyError};

/// How far [`Agent::add_knowledge`] pushes its inference
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inference {
    /// Alternate extraction and subset derivation until a full pass learns
    /// nothing new
    #[default]
    FixedPoint,
    /// One extraction pass that only grows the safe/mine sets, then one
    /// round of subset derivation over the statements present before it
    SinglePass,
}

/// Minesweeper player that only ever acts on certain knowledge
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub(super) info: BoardInfo,
    pub(super) inference: Inference,
    /// Cells that have been revealed
    pub(super) moves_made: HashSet<Coord>,
    /// Cells proven to be safe
    pub(super) safes: HashSet<Coord>,
    /// Cells proven to be mines
    pub(super) mines: HashSet<Coord>,
    /// Everything known to be true about the board
    pub(super) statements: Vec<Statement<Coord>>,
}
impl Agent {
    pub fn new(info: BoardInfo) -> Self {
        Self::with_inference(info, Inference::default())
    }

    pub fn with_inference(info: BoardInfo, inference: Inference) -> Self {
        Self {
            info,
            inference,
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            statements: Vec::new(),
        }
    }

    pub fn info(&self) -> BoardInfo {
        self.info
    }

    pub fn inference(&self) -> Inference {
        self.inference
    }

    pub fn moves_made(&self) -> &HashSet<Coord> {
        &self.moves_made
    }

    pub fn safes(&self) -> &HashSet<Coord> {
        &self.safes
    }

    pub fn mines(&self) -> &HashSet<Coord> {
        &self.mines
    }

    pub fn statements(&self) -> &[Statement<Coord>] {
        &self.statements
    }

    /// Record `cell` as a mine, and remove it from every statement
    pub fn mark_mine(&mut self, cell: Coord) -> Result<(), InconsistencyError> {
        if self.safes.contains(&cell) {
            return Err(InconsistencyError("Cell is already known to be safe"));
        }
        self.mines.insert(cell);
        for statement in &mut self.statements {
            if statement.mark_mine(&cell)? {
                trace!(?cell, %statement, "Removed mine from statement");
            }
        }
        Ok(())
    }

    /// Record `cell` as safe, and remove it from every statement
    pub fn mark_safe(&mut self, cell: Coord) -> Result<(), InconsistencyError> {
        if self.mines.contains(&cell) {
            return Err(InconsistencyError("Cell is already known to be a mine"));
        }
        self.safes.insert(cell);
        for statement in &mut self.statements {
            if statement.mark_safe(&cell)? {
                trace!(?cell, %statement, "Removed safe cell from statement");
            }
        }
        Ok(())
    }

    /// Learn that `cell` was revealed and has `count` adjacent mines, then
    /// derive everything that follows.
    ///
    /// # Errors
    ///
    /// If `cell` is off the board, or `count` contradicts what is already
    /// known.
    pub fn add_knowledge(
        &mut self,
        cell: Coord,
        count: usize,
    ) -> Result<(), InconsistencyError> {
        if !self.info.contains(cell) {
            return Err(InconsistencyError("Revealed cell is off the board"));
        }
        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        let mut remaining = count;
        let mut unknown = Vec::new();
        for adj in adjacent(cell, self.info) {
            if self.mines.contains(&adj) {
                remaining = remaining.checked_sub(1).ok_or(InconsistencyError(
                    "Clue is lower than the number of known adjacent mines",
                ))?;
            } else if !self.safes.contains(&adj) {
                unknown.push(adj);
            }
        }
        let statement = Statement::new(unknown, remaining)?;
        debug!(?cell, count, %statement, "Adding statement");
        self.statements.push(statement);

        match self.inference {
            Inference::FixedPoint => {
                let mut passes = 0;
                loop {
                    passes += 1;
                    let learned = self.extract_known()?;
                    let derived = self.derive_subsets()?;
                    if !learned && !derived {
                        break;
                    }
                }
                debug!(passes, "Reached fixed point");
            },
            Inference::SinglePass => {
                self.collect_known()?;
                self.derive_subsets()?;
            },
        }
        Ok(())
    }

    /// Cells that some statement proves safe or mined, but which are not
    /// recorded as such yet
    fn newly_known(&self) -> (Vec<Coord>, Vec<Coord>) {
        let mut safes = HashSet::new();
        let mut mines = HashSet::new();
        for statement in &self.statements {
            if let Some(cells) = statement.known_safes() {
                safes.extend(cells.difference(&self.safes).copied());
            }
            if let Some(cells) = statement.known_mines() {
                mines.extend(cells.difference(&self.mines).copied());
            }
        }
        (
            safes.into_iter().sorted().collect(),
            mines.into_iter().sorted().collect(),
        )
    }

    /// Grow the global sets from every statement without touching the
    /// statements themselves
    fn collect_known(&mut self) -> Result<bool, InconsistencyError> {
        let (safes, mines) = self.newly_known();
        if safes.iter().any(|cell| self.mines.contains(cell))
            || mines.iter().any(|cell| self.safes.contains(cell))
        {
            return Err(InconsistencyError("Cell proven both safe and a mine"));
        }
        let learned = !safes.is_empty() || !mines.is_empty();
        if learned {
            debug!(?safes, ?mines, "Learned cells");
        }
        self.safes.extend(safes);
        self.mines.extend(mines);
        Ok(learned)
    }

    /// Grow the global sets from every statement, and feed the new cells
    /// back into every statement
    fn extract_known(&mut self) -> Result<bool, InconsistencyError> {
        let (safes, mines) = self.newly_known();
        let learned = !safes.is_empty() || !mines.is_empty();
        if learned {
            debug!(?safes, ?mines, "Learned cells");
        }
        for cell in safes {
            self.mark_safe(cell)?;
        }
        for cell in mines {
            self.mark_mine(cell)?;
        }
        Ok(learned)
    }

    /// Subtract every statement from each statement containing it, keeping
    /// the results that are informative and not already known
    fn derive_subsets(&mut self) -> Result<bool, InconsistencyError> {
        let mut derived = Vec::new();
        for (a, b) in self.statements.iter().tuple_combinations() {
            if a.is_empty() || b.is_empty() {
                continue;
            }
            let reduced = if a.is_subset_of(b) {
                b.subtract(a)?
            } else if b.is_subset_of(a) {
                a.subtract(b)?
            } else {
                continue;
            };
            // Statements over the same cells
            if reduced.is_empty() {
                continue;
            }
            if !self.statements.contains(&reduced) && !derived.contains(&reduced) {
                derived.push(reduced);
            }
        }
        for statement in &derived {
            debug!(%statement, "Derived statement");
        }
        let any = !derived.is_empty();
        self.statements.extend(derived);
        Ok(any)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const INFO: BoardInfo = BoardInfo {
        height: 8,
        width: 8,
    };

    fn set(cells: &[Coord]) -> HashSet<Coord> {
        cells.iter().copied().collect()
    }

    fn statement(cells: &[Coord], count: usize) -> Statement<Coord> {
        Statement::new(cells.iter().copied(), count).unwrap()
    }

    /// Check the invariants that must hold between any two operations
    fn check_invariants(agent: &Agent) {
        assert!(agent.safes.is_disjoint(&agent.mines));
        assert!(agent.moves_made.is_subset(&agent.safes));
        for statement in &agent.statements {
            assert!(statement.count() <= statement.len());
        }
    }

    #[test]
    fn reveal_zero_in_corner() {
        let mut agent = Agent::new(INFO);
        agent.add_knowledge((0, 0), 0).unwrap();
        assert_eq!(agent.safes, set(&[(0, 0), (0, 1), (1, 0), (1, 1)]));
        assert!(agent.mines.is_empty());
        assert_eq!(agent.moves_made, set(&[(0, 0)]));
        check_invariants(&agent);
    }

    #[test]
    fn single_pass_reveal_zero_in_corner() {
        let mut agent = Agent::with_inference(INFO, Inference::SinglePass);
        agent.add_knowledge((0, 0), 0).unwrap();
        assert_eq!(agent.safes, set(&[(0, 0), (0, 1), (1, 0), (1, 1)]));
        // the statement is left as it was
        assert_eq!(
            agent.statements,
            vec![statement(&[(0, 1), (1, 0), (1, 1)], 0)]
        );
    }

    #[test]
    fn statements_are_appended_even_when_empty() {
        let mut agent = Agent::new(BoardInfo {
            height: 1,
            width: 1,
        });
        agent.add_knowledge((0, 0), 0).unwrap();
        assert_eq!(agent.statements, vec![statement(&[], 0)]);
        assert_eq!(agent.safes, set(&[(0, 0)]));
    }

    #[test]
    fn full_statement_marks_mines() {
        let mut agent = Agent::new(BoardInfo {
            height: 1,
            width: 3,
        });
        agent.add_knowledge((0, 1), 2).unwrap();
        assert_eq!(agent.mines, set(&[(0, 0), (0, 2)]));
        assert_eq!(agent.safes, set(&[(0, 1)]));
        // propagated into the statement
        assert!(agent.statements.iter().all(Statement::is_empty));
        check_invariants(&agent);
    }

    #[test]
    fn known_cells_shape_new_statements() {
        let mut agent = Agent::new(INFO);
        agent.mark_mine((0, 1)).unwrap();
        agent.mark_safe((1, 0)).unwrap();
        agent.add_knowledge((0, 0), 2).unwrap();
        // (0, 1) counted as a mine, (1, 0) left out, so (1, 1) must be a mine
        assert!(agent.mines.contains(&(1, 1)));
        assert_eq!(agent.statements[0], statement(&[], 0));
        check_invariants(&agent);
    }

    #[test]
    fn subset_derivation() {
        // Two revealed cells over a row of unknowns:
        //   r r .
        //   . . .
        let mut agent = Agent::new(BoardInfo {
            height: 2,
            width: 3,
        });
        agent.add_knowledge((0, 0), 1).unwrap();
        agent.add_knowledge((0, 1), 1).unwrap();
        // {(1,0),(1,1)}=1 within {(0,2),(1,0),(1,1),(1,2)}=1 leaves
        // {(0,2),(1,2)}=0, which is then applied and emptied
        assert_eq!(agent.statements.len(), 3);
        assert!(agent.statements[2].is_empty());
        assert_eq!(agent.safes, set(&[(0, 0), (0, 1), (0, 2), (1, 2)]));
        assert!(agent.mines.is_empty());
        check_invariants(&agent);
    }

    #[test]
    fn subset_derivation_between_statements() {
        let mut agent = Agent::new(BoardInfo {
            height: 1,
            width: 6,
        });
        agent.statements.push(statement(&[(0, 1), (0, 2), (0, 3)], 1));
        agent
            .statements
            .push(statement(&[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)], 2));
        assert!(agent.derive_subsets().unwrap());
        assert_eq!(agent.statements[2], statement(&[(0, 4), (0, 5)], 1));
        // nothing further to conclude
        assert!(!agent.extract_known().unwrap());
        assert!(!agent.derive_subsets().unwrap());
        assert_eq!(agent.statements.len(), 3);
    }

    #[test]
    fn single_pass_leaves_derived_knowledge_unapplied() {
        let mut agent = Agent::with_inference(
            BoardInfo {
                height: 2,
                width: 3,
            },
            Inference::SinglePass,
        );
        agent.add_knowledge((0, 0), 1).unwrap();
        agent.add_knowledge((0, 1), 1).unwrap();
        assert!(agent
            .statements
            .contains(&statement(&[(0, 2), (1, 2)], 0)));
        assert_eq!(agent.safes, set(&[(0, 0), (0, 1)]));
        assert_eq!(agent.make_safe_move(), None);

        // the next reveal picks it up
        agent.add_knowledge((1, 0), 1).unwrap();
        assert!(agent.safes.contains(&(0, 2)));
        assert!(agent.safes.contains(&(1, 2)));
    }

    #[test]
    fn marks_are_idempotent() {
        let mut once = Agent::new(INFO);
        once.add_knowledge((3, 3), 2).unwrap();
        let mut twice = once.clone();

        once.mark_mine((2, 2)).unwrap();
        once.mark_safe((4, 4)).unwrap();
        twice.mark_mine((2, 2)).unwrap();
        twice.mark_mine((2, 2)).unwrap();
        twice.mark_safe((4, 4)).unwrap();
        twice.mark_safe((4, 4)).unwrap();

        assert_eq!(once.mines, twice.mines);
        assert_eq!(once.safes, twice.safes);
        assert_eq!(once.statements, twice.statements);
    }

    #[test]
    fn knowledge_only_grows() {
        let mut agent = Agent::new(INFO);
        let reveals = [((0, 0), 1), ((0, 1), 1), ((2, 2), 3), ((0, 2), 1)];
        let mut previous = agent.clone();
        for (cell, count) in reveals {
            agent.add_knowledge(cell, count).unwrap();
            assert!(previous.safes.is_subset(&agent.safes));
            assert!(previous.mines.is_subset(&agent.mines));
            assert!(previous.moves_made.is_subset(&agent.moves_made));
            check_invariants(&agent);
            previous = agent.clone();
        }
    }

    #[test]
    fn contradictions_are_reported() {
        let mut agent = Agent::new(INFO);
        agent.mark_mine((0, 1)).unwrap();
        assert!(agent.mark_safe((0, 1)).is_err());
        assert!(agent.add_knowledge((0, 0), 0).is_err());

        let mut agent = Agent::new(INFO);
        agent.mark_safe((0, 1)).unwrap();
        assert!(agent.mark_mine((0, 1)).is_err());

        let mut agent = Agent::new(INFO);
        assert!(agent.add_knowledge((0, 0), 4).is_err());
        assert!(agent.add_knowledge((8, 0), 0).is_err());
    }

    #[test]
    fn disagreeing_clues_are_reported() {
        let mut agent = Agent::new(BoardInfo {
            height: 1,
            width: 3,
        });
        agent.add_knowledge((0, 0), 1).unwrap();
        assert_eq!(agent.mines, set(&[(0, 1)]));
        assert!(agent.add_knowledge((0, 2), 0).is_err());
    }
}
