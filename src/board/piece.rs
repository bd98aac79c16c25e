//! Pieces and per-team rosters.

use serde::{Deserialize, Serialize};

use super::geometry::Cell;

/// Maximum number of pieces a team may field.
pub const MAX_PIECES_PER_TEAM: usize = 5;

/// A single controllable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Identity, unique within the owning team.
    pub id: u8,
    pub pos: Cell,
    /// Where the piece returns to after a rescue or a zone teleport.
    pub start: Cell,
    pub alive: bool,
}

impl Piece {
    pub const fn new(id: u8, start: Cell) -> Self {
        Piece {
            id,
            pos: start,
            start,
            alive: true,
        }
    }

    /// Moves the piece back to its starting cell and marks it alive.
    pub fn reset(&mut self) {
        self.pos = self.start;
        self.alive = true;
    }
}

/// A team's pieces plus the ids of those currently in jail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub pieces: Vec<Piece>,
    pub jailed: Vec<u8>,
}

impl Roster {
    /// Creates a roster with every piece alive at its starting cell.
    pub fn new(starts: &[(u8, Cell)]) -> Self {
        Roster {
            pieces: starts.iter().map(|&(id, cell)| Piece::new(id, cell)).collect(),
            jailed: Vec::new(),
        }
    }

    pub fn get(&self, id: u8) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| p.alive)
    }

    /// Returns the first alive piece standing on `cell`.
    pub fn alive_at(&self, cell: Cell) -> Option<&Piece> {
        self.alive().find(|p| p.pos == cell)
    }

    pub fn is_alive(&self, id: u8) -> bool {
        self.get(id).is_some_and(|p| p.alive)
    }

    pub fn jailed_count(&self) -> usize {
        self.jailed.len()
    }

    /// Removes a piece from play. Returns false if it was unknown or already jailed.
    pub fn jail(&mut self, id: u8) -> bool {
        let Some(piece) = self.get_mut(id) else {
            return false;
        };
        let was_alive = piece.alive;
        piece.alive = false;
        if self.jailed.contains(&id) {
            return false;
        }
        self.jailed.push(id);
        was_alive
    }

    /// Resets every jailed piece to its start and empties the jail.
    /// Returns the freed ids in jailing order.
    pub fn release_all(&mut self) -> Vec<u8> {
        let freed = std::mem::take(&mut self.jailed);
        for &id in &freed {
            if let Some(piece) = self.get_mut(id) {
                piece.reset();
            }
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(&[(1, Cell::new(0, 0)), (2, Cell::new(3, 0)), (3, Cell::new(6, 0))])
    }

    #[test]
    fn new_roster_is_all_alive() {
        let r = roster();
        assert_eq!(r.pieces.len(), 3);
        assert_eq!(r.alive().count(), 3);
        assert!(r.jailed.is_empty());
    }

    #[test]
    fn jail_is_idempotent() {
        let mut r = roster();
        assert!(r.jail(2));
        assert!(!r.jail(2));
        assert_eq!(r.jailed, vec![2]);
        assert!(!r.is_alive(2));
    }

    #[test]
    fn jail_unknown_piece_is_ignored() {
        let mut r = roster();
        assert!(!r.jail(9));
        assert!(r.jailed.is_empty());
    }

    #[test]
    fn release_all_resets_to_start() {
        let mut r = roster();
        r.get_mut(1).unwrap().pos = Cell::new(5, 5);
        r.jail(1);
        r.jail(3);
        let freed = r.release_all();
        assert_eq!(freed, vec![1, 3]);
        assert!(r.jailed.is_empty());
        let p = r.get(1).unwrap();
        assert!(p.alive);
        assert_eq!(p.pos, Cell::new(0, 0));
    }

    #[test]
    fn alive_at_skips_jailed_pieces() {
        let mut r = roster();
        assert_eq!(r.alive_at(Cell::new(3, 0)).map(|p| p.id), Some(2));
        r.jail(2);
        assert!(r.alive_at(Cell::new(3, 0)).is_none());
    }
}
