use crate::internal_util::all_cells;
use crate::solve::Agent;
use crate::Coord;

impl Agent {
    /// A cell known to be safe that has not been revealed yet.
    ///
    /// The smallest such cell is chosen, so the result only depends on what
    /// the agent knows. `None` means there is no certain move left.
    pub fn make_safe_move(&self) -> Option<Coord> {
        self.safes.difference(&self.moves_made).min().copied()
    }

    /// Every cell that has been neither revealed nor proven to be a mine, in
    /// row-major order
    pub fn unresolved_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        all_cells(self.info)
            .filter(move |cell| {
                !self.moves_made.contains(cell) && !self.mines.contains(cell)
            })
    }

    /// A move to fall back on when no cell is known to be safe.
    ///
    /// Returns the first unresolved cell; drivers wanting a uniform guess
    /// should pick from [`Agent::unresolved_cells`] instead.
    pub fn make_random_move(&self) -> Option<Coord> {
        self.unresolved_cells().next()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::BoardInfo;

    use super::*;

    fn agent(height: usize, width: usize) -> Agent {
        Agent::new(BoardInfo {
            height,
            width,
        })
    }

    #[test]
    fn no_safe_move_without_knowledge() {
        assert_eq!(agent(3, 3).make_safe_move(), None);
    }

    #[test]
    fn safe_move_skips_revealed_cells() {
        let mut agent = agent(3, 3);
        agent.add_knowledge((1, 1), 0).unwrap();
        let safe = agent.make_safe_move().unwrap();
        assert!(agent.safes().contains(&safe));
        assert!(!agent.moves_made().contains(&safe));
        assert_eq!(safe, (0, 0));
    }

    #[test]
    fn no_safe_move_once_all_safes_are_revealed() {
        let mut agent = agent(1, 3);
        agent.add_knowledge((0, 0), 1).unwrap();
        agent.mark_safe((0, 2)).unwrap();
        assert_eq!(agent.make_safe_move(), Some((0, 2)));
        agent.add_knowledge((0, 2), 1).unwrap();
        assert!(agent.safes().is_subset(agent.moves_made()));
        assert_eq!(agent.make_safe_move(), None);
    }

    #[test]
    fn random_move_avoids_moves_and_mines() {
        let mut agent = agent(2, 2);
        assert_eq!(agent.make_random_move(), Some((0, 0)));
        agent.mark_mine((0, 1)).unwrap();
        agent.add_knowledge((0, 0), 1).unwrap();
        assert_eq!(agent.make_random_move(), Some((1, 0)));
        assert_eq!(
            agent.unresolved_cells().collect::<Vec<_>>(),
            vec![(1, 0), (1, 1)]
        );
    }

    #[test]
    fn no_random_move_when_board_is_resolved() {
        let mut agent = agent(1, 2);
        agent.add_knowledge((0, 0), 1).unwrap();
        assert!(agent.mines().contains(&(0, 1)));
        assert_eq!(agent.make_random_move(), None);
        assert_eq!(agent.unresolved_cells().count(), 0);
    }
}
