tonic::include_proto!("tictactoe");

use crate::core::session;
use crate::core::{self as game, Board, BoardCell};

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("session_descriptor");

pub type ProtobufResult<T> = Result<T, ProtobufError>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ProtobufError {
    #[error("invalid slot value: {0}")]
    InvalidSlot(i32),
    #[error("invalid mark value: {0}")]
    InvalidMark(i32),
    #[error("invalid board length: expected={expected}, found={found}")]
    InvalidBoardLength { expected: usize, found: usize },
    #[error("message data has missing field: {missing_field}")]
    MessageDataMissing { missing_field: String },
}

impl ProtobufError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MessageDataMissing {
            missing_field: field.into(),
        }
    }
}

impl From<game::Slot> for Slot {
    fn from(value: game::Slot) -> Self {
        match value {
            game::Slot::First => Self::First,
            game::Slot::Second => Self::Second,
        }
    }
}

impl From<BoardCell<game::Mark>> for Mark {
    fn from(value: BoardCell<game::Mark>) -> Self {
        match value.0 {
            Some(game::Mark::X) => Self::X,
            Some(game::Mark::O) => Self::O,
            None => Self::Empty,
        }
    }
}

pub fn decode_slot(value: i32) -> ProtobufResult<game::Slot> {
    match Slot::try_from(value) {
        Ok(Slot::First) => Ok(game::Slot::First),
        Ok(Slot::Second) => Ok(game::Slot::Second),
        Ok(Slot::Unspecified) | Err(_) => Err(ProtobufError::InvalidSlot(value)),
    }
}

pub fn decode_board(cells: &[i32]) -> ProtobufResult<Board> {
    let mut board = Board::default();
    if cells.len() != board.len() {
        return Err(ProtobufError::InvalidBoardLength {
            expected: board.len(),
            found: cells.len(),
        });
    }
    for (position, &value) in cells.iter().enumerate() {
        let mark = match Mark::try_from(value) {
            Ok(Mark::Empty) => continue,
            Ok(Mark::X) => game::Mark::X,
            Ok(Mark::O) => game::Mark::O,
            Err(_) => return Err(ProtobufError::InvalidMark(value)),
        };
        let index = board.flat_index(position).ok_or(ProtobufError::InvalidBoardLength {
            expected: board.len(),
            found: cells.len(),
        })?;
        board[index] = BoardCell::from(mark);
    }
    Ok(board)
}

fn encode_board(board: &Board) -> Vec<i32> {
    board
        .cells()
        .map(|&cell| Mark::from(cell) as i32)
        .collect()
}

impl From<session::Notification> for ServerEvent {
    fn from(value: session::Notification) -> Self {
        use server_event::Event;

        let event = match value {
            session::Notification::Reject { reason } => Event::Reject(Reject { reason }),
            session::Notification::GameStart { slot } => Event::GameStart(GameStart {
                slot: Slot::from(slot) as i32,
            }),
            session::Notification::Turn { prompt } => Event::Turn(Turn { prompt }),
            session::Notification::MoveRejected { reason } => {
                Event::MoveRejected(MoveRejected { reason })
            }
            session::Notification::BoardUpdate { board } => Event::BoardUpdate(BoardUpdate {
                cells: encode_board(&board),
            }),
            session::Notification::GameOver { outcome } => Event::GameOver(GameOver {
                outcome: outcome.to_string(),
                winner: outcome.winner().map(|slot| Slot::from(slot) as i32),
            }),
        };
        Self { event: Some(event) }
    }
}

impl From<ClientEvent> for session::ClientEvent {
    fn from(value: ClientEvent) -> Self {
        match value.event {
            Some(client_event::Event::TurnTaken(TurnTaken { raw_input })) => {
                Self::TurnTaken { raw_input }
            }
            Some(client_event::Event::TurnError(TurnError { reason })) => {
                Self::TurnError { reason }
            }
            Some(client_event::Event::Resign(_)) => Self::Resign,
            // a message we can't read means the input channel is broken
            None => Self::TurnError {
                reason: "received an empty event".to_string(),
            },
        }
    }
}

impl ClientEvent {
    pub fn turn_taken(raw_input: impl Into<String>) -> Self {
        Self {
            event: Some(client_event::Event::TurnTaken(TurnTaken {
                raw_input: raw_input.into(),
            })),
        }
    }

    pub fn turn_error(reason: impl Into<String>) -> Self {
        Self {
            event: Some(client_event::Event::TurnError(TurnError {
                reason: reason.into(),
            })),
        }
    }

    pub fn resign() -> Self {
        Self {
            event: Some(client_event::Event::Resign(Resign {})),
        }
    }
}
