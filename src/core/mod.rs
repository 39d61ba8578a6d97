pub mod registry;
pub mod session;
pub mod tic_tac_toe;

mod error;
mod grid;

use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use generic_array::typenum::U3;

pub use error::{MoveError, Rejection};
pub use grid::{Grid, GridIndex};

pub type MoveResult<T> = Result<T, MoveError>;

/// Symbol that a player puts on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Signed score used by the line check: `X` counts up, `O` counts down.
    pub fn score(&self) -> i8 {
        match self {
            Mark::X => 1,
            Mark::O => -1,
        }
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

/// One of the two fixed player identities of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn other(&self) -> Self {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }

    pub fn mark(&self) -> Mark {
        match self {
            Slot::First => Mark::X,
            Slot::Second => Mark::O,
        }
    }

    pub fn ordinal(&self) -> &'static str {
        match self {
            Slot::First => "first",
            Slot::Second => "second",
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} player", self.ordinal())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardCell<T>(pub Option<T>);

impl<T> Default for BoardCell<T> {
    fn default() -> Self {
        Self(Option::default())
    }
}

impl<T: Display> Display for BoardCell<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(val) => write!(f, "[{}]", val),
            None => f.write_str("[ ]"),
        }
    }
}

impl<T> From<T> for BoardCell<T> {
    fn from(value: T) -> Self {
        Self(Option::from(value))
    }
}

impl<T> Deref for BoardCell<T> {
    type Target = Option<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for BoardCell<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub type Board = Grid<BoardCell<Mark>, U3, U3>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WinReason {
    Line,
    OpponentDisconnected,
    OpponentResigned,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Win { winner: Slot, reason: WinReason },
    Tie,
}

impl Outcome {
    pub fn win(winner: Slot, reason: WinReason) -> Self {
        Self::Win { winner, reason }
    }

    pub fn winner(&self) -> Option<Slot> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            Outcome::Tie => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win { winner, reason } => {
                write!(f, "won by {}", winner)?;
                match reason {
                    WinReason::Line => Ok(()),
                    WinReason::OpponentDisconnected => f.write_str(" (opponent disconnected)"),
                    WinReason::OpponentResigned => f.write_str(" (opponent resigned)"),
                }
            }
            Outcome::Tie => f.write_str("tie"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameState {
    Turn(Slot),
    Finished(Outcome),
}

pub trait Game: Sized {
    fn new() -> Self;

    fn state(&self) -> GameState;
    fn set_state(&mut self, state: GameState);

    fn is_finished(&self) -> bool {
        matches!(self.state(), GameState::Finished(_))
    }

    fn set_draw(&mut self) -> GameState {
        self.set_state(GameState::Finished(Outcome::Tie));
        self.state()
    }

    fn set_winner(&mut self, winner: Slot, reason: WinReason) -> GameState {
        self.set_state(GameState::Finished(Outcome::win(winner, reason)));
        self.state()
    }

    /// Slot holding the turn token, `None` once the game is finished.
    fn current_slot(&self) -> Option<Slot> {
        match self.state() {
            GameState::Turn(slot) => Some(slot),
            GameState::Finished(_) => None,
        }
    }

    fn switch_player(&mut self) -> MoveResult<GameState> {
        let current = self.current_slot().ok_or(MoveError::GameIsFinished)?;
        self.set_state(GameState::Turn(current.other()));
        Ok(self.state())
    }
}
