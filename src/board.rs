//! Tic-tac-toe board model
//!
//! Pure game logic: a 3x3 grid of cells, move application and win
//! detection. Knows nothing about rooms or connections.

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Number of cells on the board
pub const CELL_COUNT: usize = 9;

/// The eight winning lines: rows, columns, diagonals
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// One of the two player slots in a game
///
/// On the wire a seat is its player id: 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    /// Seat for a position in the game's player list (0 or 1)
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::One),
            1 => Some(Seat::Two),
            _ => None,
        }
    }

    /// Position in the game's player list
    pub fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }

    /// Player id as sent to clients
    pub fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// The opposing seat
    pub fn other(self) -> Self {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

/// A single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Seat),
}

impl Cell {
    /// Wire encoding: 0 for empty, otherwise the owner's player id
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Taken(seat) => seat.id(),
        }
    }
}

/// Immutable copy of the board for the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// 0 = empty, 1 = player one, 2 = player two
    pub cells: [u8; CELL_COUNT],
    /// Player id expected to move next (informational)
    pub current_turn: u8,
}

/// Authoritative game board
///
/// `current_turn` is bookkeeping only: moves are not rejected when
/// made out of turn.
#[derive(Debug, Clone)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
    current_turn: Seat,
}

impl Board {
    /// Create an empty board with player one to move
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
            current_turn: Seat::One,
        }
    }

    /// Clear all cells for a new match
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; CELL_COUNT];
        self.current_turn = Seat::One;
    }

    /// Claim a cell for a player
    ///
    /// Returns `Ok(false)` without touching the board if the cell is
    /// already taken.
    pub fn make_move(&mut self, index: usize, seat: Seat) -> Result<bool, BoardError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(BoardError::CellOutOfRange(index))?;

        if *cell != Cell::Empty {
            return Ok(false);
        }

        *cell = Cell::Taken(seat);
        self.current_turn = seat.other();
        Ok(true)
    }

    /// Owner of the first completed line, if any
    ///
    /// A full board without a winner is a draw; see [`Board::is_full`].
    pub fn who_has_won(&self) -> Option<Seat> {
        LINES.iter().find_map(|[a, b, c]| match self.cells[*a] {
            Cell::Taken(seat)
                if self.cells[*b] == Cell::Taken(seat) && self.cells[*c] == Cell::Taken(seat) =>
            {
                Some(seat)
            }
            _ => None,
        })
    }

    /// True when no empty cell remains
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn current_turn(&self) -> Seat {
        self.current_turn
    }

    /// Export the board for the wire
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: self.cells.map(Cell::code),
            current_turn: self.current_turn.id(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
