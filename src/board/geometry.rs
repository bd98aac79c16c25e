//! Grid geometry: cells, directions, row bands and rectangles.
//!
//! Coordinates are signed so that a prospective step off the board is
//! representable and can be rejected by the bounds check.

use serde::{Deserialize, Serialize};

/// A single board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Returns the neighbouring cell one step in `dir`.
    pub const fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance between two cells.
    pub fn distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One of the four orthogonal movement directions.
///
/// `Up` decreases `y`; row 0 is the top edge of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// All four directions in notation order.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Returns the `(dx, dy)` offset of a single step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Returns the lowercase full name.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Returns the single-character move-notation abbreviation.
    pub const fn notation_char(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }

    /// Parses a direction from its lowercase full name.
    pub fn from_name(name: &str) -> Option<Direction> {
        match name {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Parses a direction from its single-character abbreviation.
    pub fn from_notation_char(c: char) -> Option<Direction> {
        match c {
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// An inclusive range of rows spanning the full board width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBand {
    pub first: i32,
    pub last: i32,
}

impl RowBand {
    pub const fn new(first: i32, last: i32) -> Self {
        RowBand { first, last }
    }

    pub const fn contains_row(self, y: i32) -> bool {
        y >= self.first && y <= self.last
    }

    pub const fn overlaps(self, other: RowBand) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// An inclusive axis-aligned rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Cell,
    pub max: Cell,
}

impl Rect {
    /// The square of half-width `radius` centred on `center`.
    pub const fn around(center: Cell, radius: i32) -> Self {
        Rect {
            min: Cell::new(center.x.saturating_sub(radius), center.y.saturating_sub(radius)),
            max: Cell::new(center.x.saturating_add(radius), center.y.saturating_add(radius)),
        }
    }

    pub const fn contains(self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_notation_roundtrip() {
        for d in ALL_DIRECTIONS {
            assert_eq!(Direction::from_notation_char(d.notation_char()), Some(d));
            assert_eq!(Direction::from_name(d.name()), Some(d));
        }
        assert_eq!(Direction::from_notation_char('x'), None);
        assert_eq!(Direction::from_name("north"), None);
    }

    #[test]
    fn step_follows_screen_coordinates() {
        let c = Cell::new(4, 4);
        assert_eq!(c.step(Direction::Up), Cell::new(4, 3));
        assert_eq!(c.step(Direction::Down), Cell::new(4, 5));
        assert_eq!(c.step(Direction::Left), Cell::new(3, 4));
        assert_eq!(c.step(Direction::Right), Cell::new(5, 4));
    }

    #[test]
    fn rect_around_is_inclusive() {
        let r = Rect::around(Cell::new(10, 2), 1);
        assert!(r.contains(Cell::new(9, 1)));
        assert!(r.contains(Cell::new(11, 3)));
        assert!(!r.contains(Cell::new(12, 2)));
        assert!(!r.contains(Cell::new(10, 4)));
    }

    #[test]
    fn rect_around_saturates() {
        let r = Rect::around(Cell::new(10, 2), i32::MAX);
        assert_eq!(r.max, Cell::new(i32::MAX, i32::MAX));
        assert!(r.contains(Cell::new(0, 0)));
    }

    #[test]
    fn row_band_overlap() {
        assert!(RowBand::new(0, 8).overlaps(RowBand::new(8, 12)));
        assert!(!RowBand::new(0, 8).overlaps(RowBand::new(11, 19)));
        assert!(RowBand::new(11, 19).contains_row(11));
        assert!(!RowBand::new(11, 19).contains_row(10));
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(Cell::new(0, 0).distance(Cell::new(3, -4)), 7);
    }
}
