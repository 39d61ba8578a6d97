use super::tic_tac_toe::{parse_position, TicTacToe};
use super::{Board, Game, GameState, MoveError, MoveResult, Outcome, Slot, WinReason};

/// Event received from the endpoint occupying a slot.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    TurnTaken { raw_input: String },
    /// The endpoint's input channel failed, handled as if it left.
    TurnError { reason: String },
    Resign,
    Disconnect,
}

/// Message sent to an endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    Reject { reason: String },
    GameStart { slot: Slot },
    /// Grants the turn, `prompt` explains why the previous move was rejected.
    Turn { prompt: Option<String> },
    MoveRejected { reason: String },
    BoardUpdate { board: Board },
    GameOver { outcome: Outcome },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recipient {
    Slot(Slot),
    Both,
}

impl Recipient {
    pub fn includes(&self, slot: Slot) -> bool {
        match self {
            Recipient::Slot(s) => *s == slot,
            Recipient::Both => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub to: Recipient,
    pub notification: Notification,
}

impl Envelope {
    pub fn to_slot(slot: Slot, notification: Notification) -> Self {
        Self {
            to: Recipient::Slot(slot),
            notification,
        }
    }

    pub fn to_both(notification: Notification) -> Self {
        Self {
            to: Recipient::Both,
            notification,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionPhase {
    InProgress,
    Terminated(Outcome),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveAccepted {
    pub board: Board,
    pub state: GameState,
}

/// Authoritative state of one game between the two slots.
#[derive(Clone, Debug)]
pub struct GameSession {
    game: TicTacToe,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a session with an empty board and the turn token on the first slot.
    pub fn new() -> Self {
        Self {
            game: TicTacToe::new(),
        }
    }

    /// Notifications that open the game.
    pub fn start(&self) -> Vec<Envelope> {
        vec![
            Envelope::to_slot(Slot::First, Notification::GameStart { slot: Slot::First }),
            Envelope::to_slot(Slot::Second, Notification::GameStart { slot: Slot::Second }),
            Envelope::to_slot(Slot::First, Notification::Turn { prompt: None }),
        ]
    }

    pub fn phase(&self) -> SessionPhase {
        match self.game.state() {
            GameState::Turn(_) => SessionPhase::InProgress,
            GameState::Finished(outcome) => SessionPhase::Terminated(outcome),
        }
    }

    pub fn board(&self) -> &Board {
        self.game.board()
    }

    /// Slot holding the turn token.
    pub fn turn(&self) -> Option<Slot> {
        self.game.current_slot()
    }

    pub fn submit_move(&mut self, slot: Slot, raw_input: &str) -> MoveResult<MoveAccepted> {
        let current = self.turn().ok_or(MoveError::GameIsFinished)?;
        if slot != current {
            return Err(MoveError::not_your_turn(current, slot));
        }
        let position = parse_position(raw_input)?;
        let state = self.game.place(slot, position)?;
        Ok(MoveAccepted {
            board: self.board().clone(),
            state,
        })
    }

    pub fn resign(&mut self, slot: Slot) -> Outcome {
        self.forfeit(slot, WinReason::OpponentResigned)
    }

    pub fn disconnect(&mut self, slot: Slot) -> Outcome {
        self.forfeit(slot, WinReason::OpponentDisconnected)
    }

    pub fn input_failed(&mut self, slot: Slot) -> Outcome {
        self.disconnect(slot)
    }

    fn forfeit(&mut self, slot: Slot, reason: WinReason) -> Outcome {
        match self.game.state() {
            GameState::Finished(outcome) => outcome,
            GameState::Turn(_) => {
                self.game.set_winner(slot.other(), reason);
                Outcome::win(slot.other(), reason)
            }
        }
    }

    /// Applies `event` from `slot` and returns what has to be sent out.
    /// `game_over` is not part of it, the owner reads the outcome from [`GameSession::phase`].
    pub fn handle(&mut self, slot: Slot, event: ClientEvent) -> Vec<Envelope> {
        match event {
            ClientEvent::TurnTaken { raw_input } => match self.submit_move(slot, &raw_input) {
                Ok(MoveAccepted { board, state }) => {
                    let update = Notification::BoardUpdate { board };
                    let mut envelopes = vec![Envelope::to_both(update)];
                    if let GameState::Turn(next) = state {
                        let turn = Notification::Turn { prompt: None };
                        envelopes.push(Envelope::to_slot(next, turn));
                    }
                    envelopes
                }
                Err(err) if err.is_retryable() => vec![Envelope::to_slot(
                    slot,
                    Notification::Turn {
                        prompt: Some(err.to_string()),
                    },
                )],
                Err(err) => vec![Envelope::to_slot(
                    slot,
                    Notification::MoveRejected {
                        reason: err.to_string(),
                    },
                )],
            },
            ClientEvent::TurnError { .. } => {
                self.input_failed(slot);
                vec![]
            }
            ClientEvent::Resign => {
                self.resign(slot);
                vec![]
            }
            ClientEvent::Disconnect => {
                self.disconnect(slot);
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{BoardCell, GridIndex, Mark};

    fn marks(session: &GameSession) -> Vec<Option<Mark>> {
        session.board().cells().map(|cell| cell.0).collect()
    }

    fn take_turn(session: &mut GameSession, slot: Slot, raw: &str) -> Vec<Envelope> {
        session.handle(
            slot,
            ClientEvent::TurnTaken {
                raw_input: raw.to_string(),
            },
        )
    }

    #[test]
    fn test_start_notifications() {
        let session = GameSession::new();
        itertools::assert_equal(
            session.start(),
            [
                Envelope::to_slot(Slot::First, Notification::GameStart { slot: Slot::First }),
                Envelope::to_slot(Slot::Second, Notification::GameStart { slot: Slot::Second }),
                Envelope::to_slot(Slot::First, Notification::Turn { prompt: None }),
            ],
        );
        assert_eq!(session.turn(), Some(Slot::First));
        assert!(session.board().cells().all(|cell| cell.is_none()));
    }

    #[test]
    fn test_example_trace() {
        let mut session = GameSession::new();
        for (slot, raw) in [
            (Slot::First, "1"),
            (Slot::Second, "5"),
            (Slot::First, "2"),
            (Slot::Second, "8"),
            (Slot::First, "3"),
        ] {
            session.submit_move(slot, raw).unwrap();
        }
        let outcome = Outcome::win(Slot::First, WinReason::Line);
        assert_eq!(session.phase(), SessionPhase::Terminated(outcome));
        assert_eq!(outcome.to_string(), "won by first player");
        assert_eq!(session.turn(), None);
    }

    #[test]
    fn test_tie_fills_board() {
        let mut session = GameSession::new();
        let mut slot = Slot::First;
        for raw in ["1", "2", "3", "5", "4", "6", "8", "7", "9"] {
            session.submit_move(slot, raw).unwrap();
            slot = slot.other();
        }
        assert_eq!(session.phase(), SessionPhase::Terminated(Outcome::Tie));
        assert!(marks(&session).iter().all(|mark| mark.is_some()));
    }

    #[test]
    fn test_accepted_move_broadcasts_board() {
        let mut session = GameSession::new();
        let envelopes = take_turn(&mut session, Slot::First, "5");

        let mut board = Board::default();
        board[GridIndex::new(1, 1)] = BoardCell::from(Mark::X);
        itertools::assert_equal(
            envelopes,
            [
                Envelope::to_both(Notification::BoardUpdate { board }),
                Envelope::to_slot(Slot::Second, Notification::Turn { prompt: None }),
            ],
        );
        assert_eq!(session.turn(), Some(Slot::Second));
    }

    #[test]
    fn test_out_of_turn_move() {
        let mut session = GameSession::new();
        assert_eq!(
            session.submit_move(Slot::Second, "abc"),
            Err(MoveError::not_your_turn(Slot::First, Slot::Second))
        );

        let envelopes = take_turn(&mut session, Slot::Second, "1");
        itertools::assert_equal(
            envelopes,
            [Envelope::to_slot(
                Slot::Second,
                Notification::MoveRejected {
                    reason: "not your turn".to_string(),
                },
            )],
        );
        assert_eq!(session.turn(), Some(Slot::First));
        assert!(marks(&session).iter().all(|mark| mark.is_none()));
    }

    #[test]
    fn test_invalid_input_prompts_retry() {
        let mut session = GameSession::new();
        for (raw, reason) in [
            ("0", "out of bounds — enter 1-9"),
            ("10", "out of bounds — enter 1-9"),
            ("-3", "out of bounds — enter 1-9"),
            ("abc", "unparseable — enter 1-9"),
        ] {
            let envelopes = take_turn(&mut session, Slot::First, raw);
            itertools::assert_equal(
                envelopes,
                [Envelope::to_slot(
                    Slot::First,
                    Notification::Turn {
                        prompt: Some(reason.to_string()),
                    },
                )],
            );
            assert_eq!(session.turn(), Some(Slot::First));
            assert!(marks(&session).iter().all(|mark| mark.is_none()));
        }
    }

    #[test]
    fn test_occupied_cell() {
        let mut session = GameSession::new();
        session.submit_move(Slot::First, "7").unwrap();
        let before = marks(&session);

        let envelopes = take_turn(&mut session, Slot::Second, "7");
        itertools::assert_equal(
            envelopes,
            [Envelope::to_slot(
                Slot::Second,
                Notification::Turn {
                    prompt: Some("cell occupied — try again".to_string()),
                },
            )],
        );
        assert_eq!(marks(&session), before);
        assert_eq!(session.turn(), Some(Slot::Second));
    }

    #[test]
    fn test_resign_by_turn_holder() {
        let mut session = GameSession::new();
        assert!(session.handle(Slot::First, ClientEvent::Resign).is_empty());
        assert_eq!(
            session.phase(),
            SessionPhase::Terminated(Outcome::win(Slot::Second, WinReason::OpponentResigned))
        );
    }

    #[test]
    fn test_disconnect_and_input_failure() {
        let mut session = GameSession::new();
        session.handle(Slot::Second, ClientEvent::Disconnect);
        assert_eq!(
            session.phase(),
            SessionPhase::Terminated(Outcome::win(
                Slot::First,
                WinReason::OpponentDisconnected
            ))
        );

        let mut session = GameSession::new();
        session.submit_move(Slot::First, "1").unwrap();
        session.handle(
            Slot::First,
            ClientEvent::TurnError {
                reason: "stdin closed".to_string(),
            },
        );
        assert_eq!(
            session.phase(),
            SessionPhase::Terminated(Outcome::win(
                Slot::Second,
                WinReason::OpponentDisconnected
            ))
        );
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let mut session = GameSession::new();
        let outcome = session.resign(Slot::Second);
        assert_eq!(outcome, Outcome::win(Slot::First, WinReason::OpponentResigned));

        // later events keep the recorded outcome
        assert_eq!(session.disconnect(Slot::First), outcome);
        assert_eq!(
            session.submit_move(Slot::First, "1"),
            Err(MoveError::GameIsFinished)
        );
        assert_eq!(session.phase(), SessionPhase::Terminated(outcome));
    }
}
