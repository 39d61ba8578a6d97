use super::Slot;

/// Recoverable rejection of a single move, the turn token stays where it was.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MoveError {
    #[error("not your turn")]
    NotYourTurn { expected: Slot, found: Slot },
    #[error("unparseable — enter 1-9")]
    Unparseable { input: String },
    #[error("out of bounds — enter 1-9")]
    OutOfBounds { input: i64 },
    #[error("cell occupied — try again")]
    CellOccupied { position: usize },
    #[error("can't make turn on a finished game")]
    GameIsFinished,
}

impl MoveError {
    pub fn not_your_turn(expected: Slot, found: Slot) -> Self {
        Self::NotYourTurn { expected, found }
    }

    pub fn unparseable(input: impl Into<String>) -> Self {
        Self::Unparseable {
            input: input.into(),
        }
    }

    pub fn out_of_bounds(input: i64) -> Self {
        Self::OutOfBounds { input }
    }

    pub fn cell_occupied(position: usize) -> Self {
        Self::CellOccupied { position }
    }

    /// Whether the submitter still holds the turn and may resubmit.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotYourTurn { .. } | Self::GameIsFinished)
    }
}

/// Admission refused at the door.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Rejection {
    #[error("two players already connected")]
    SessionFull,
    #[error("connection {0} already holds a slot")]
    AlreadyConnected(u64),
}
