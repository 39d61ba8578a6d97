use super::{
    Board, BoardCell, Game, GameState, GridIndex, Mark, MoveError, MoveResult, Slot, WinReason,
};

/// Lines checked for a winner: rows, then columns, then both diagonals.
const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Reads a 1-based cell number as typed by a player and returns its 0-based position.
pub fn parse_position(raw: &str) -> MoveResult<usize> {
    let input: i64 = raw
        .trim()
        .parse()
        .map_err(|_| MoveError::unparseable(raw))?;
    match input.checked_sub(1) {
        Some(position @ 0..=8) => Ok(position as usize),
        _ => Err(MoveError::out_of_bounds(input)),
    }
}

#[derive(Clone, Debug)]
pub struct TicTacToe {
    state: GameState,
    field: Board,
}

impl Game for TicTacToe {
    fn new() -> Self {
        Self {
            state: GameState::Turn(Slot::First),
            field: Board::default(),
        }
    }

    fn state(&self) -> GameState {
        self.state
    }

    fn set_state(&mut self, state: GameState) {
        self.state = state;
    }
}

impl TicTacToe {
    pub fn board(&self) -> &Board {
        &self.field
    }

    /// Puts `slot`'s mark at the 0-based `position` and advances the game.
    pub fn place(&mut self, slot: Slot, position: usize) -> MoveResult<GameState> {
        let current = self.current_slot().ok_or(MoveError::GameIsFinished)?;
        if slot != current {
            return Err(MoveError::not_your_turn(current, slot));
        }
        let index = self
            .field
            .flat_index(position)
            .ok_or_else(|| {
                let input = i64::try_from(position).ok().and_then(|p| p.checked_add(1));
                MoveError::out_of_bounds(input.unwrap_or(i64::MAX))
            })?;
        let cell = self.get_cell_mut(index);
        if cell.is_some() {
            return Err(MoveError::cell_occupied(position));
        }
        *cell = BoardCell::from(slot.mark());

        self.update_state()
    }

    fn get_cell_mut(&mut self, index: GridIndex) -> &mut BoardCell<Mark> {
        &mut self.field[index]
    }

    fn line_score(&self, line: &[usize; 3]) -> i8 {
        line.iter()
            .filter_map(|&position| self.field.flat_index(position))
            .filter_map(|index| self.field[index].0.map(|mark| mark.score()))
            .sum()
    }

    fn update_state(&mut self) -> MoveResult<GameState> {
        for line in WINNING_LINES.iter() {
            match self.line_score(line) {
                3 => return Ok(self.set_winner(Slot::First, WinReason::Line)),
                -3 => return Ok(self.set_winner(Slot::Second, WinReason::Line)),
                _ => {}
            }
        }

        if self.field.cells().all(|cell| cell.is_some()) {
            return Ok(self.set_draw());
        }

        self.switch_player()
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::*;
    use crate::core::Outcome;

    fn play(positions: &[usize]) -> (TicTacToe, MoveResult<GameState>) {
        let mut game = TicTacToe::new();
        let mut slot = Slot::First;
        let mut last = Ok(game.state());
        for &position in positions {
            last = game.place(slot, position);
            slot = slot.other();
        }
        (game, last)
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("1"), Ok(0));
        assert_eq!(parse_position(" 9\n"), Ok(8));
        assert_eq!(parse_position("0"), Err(MoveError::out_of_bounds(0)));
        assert_eq!(parse_position("10"), Err(MoveError::out_of_bounds(10)));
        assert_eq!(parse_position("-3"), Err(MoveError::out_of_bounds(-3)));
        assert_eq!(parse_position("abc"), Err(MoveError::unparseable("abc")));
        assert_eq!(parse_position(""), Err(MoveError::unparseable("")));
        assert_eq!(
            parse_position("-9223372036854775808"),
            Err(MoveError::out_of_bounds(i64::MIN))
        );
    }

    #[test]
    fn test_row_win() {
        let (game, state) = play(&[0, 4, 1, 7, 2]);
        assert_eq!(
            state,
            Ok(GameState::Finished(Outcome::win(Slot::First, WinReason::Line)))
        );
        assert!(game.is_finished());
    }

    #[test]
    fn test_column_win_for_second() {
        let (_, state) = play(&[0, 1, 3, 4, 8, 7]);
        assert_eq!(
            state,
            Ok(GameState::Finished(Outcome::win(Slot::Second, WinReason::Line)))
        );
    }

    #[test]
    fn test_diagonal_wins() {
        let (_, state) = play(&[0, 1, 4, 2, 8]);
        assert_eq!(
            state,
            Ok(GameState::Finished(Outcome::win(Slot::First, WinReason::Line)))
        );
        let (_, state) = play(&[0, 2, 1, 4, 8, 6]);
        assert_eq!(
            state,
            Ok(GameState::Finished(Outcome::win(Slot::Second, WinReason::Line)))
        );
    }

    #[test]
    fn test_double_line_completion() {
        // last move at 2 completes both the top row and the right column
        let (_, state) = play(&[0, 3, 1, 4, 5, 7, 8, 6, 2]);
        assert_eq!(
            state,
            Ok(GameState::Finished(Outcome::win(Slot::First, WinReason::Line)))
        );
    }

    #[test]
    fn test_draw() {
        let (game, state) = play(&[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(state, Ok(GameState::Finished(Outcome::Tie)));
        assert!(game.board().cells().all(|cell| cell.is_some()));
    }

    #[test]
    fn test_turn_switches() {
        let mut game = TicTacToe::new();
        assert_eq!(game.place(Slot::First, 4), Ok(GameState::Turn(Slot::Second)));
        assert_eq!(game.place(Slot::Second, 0), Ok(GameState::Turn(Slot::First)));
    }

    #[test]
    fn test_invalid_moves_keep_state() {
        let mut game = TicTacToe::new();
        game.place(Slot::First, 4).unwrap();

        assert_eq!(
            game.place(Slot::First, 0),
            Err(MoveError::not_your_turn(Slot::Second, Slot::First))
        );
        assert_eq!(game.place(Slot::Second, 4), Err(MoveError::cell_occupied(4)));
        assert_eq!(game.place(Slot::Second, 9), Err(MoveError::out_of_bounds(10)));
        assert_eq!(game.state(), GameState::Turn(Slot::Second));
        assert_eq!(game.board().cells().filter(|cell| cell.is_some()).count(), 1);
    }

    #[test]
    fn test_finished_game_rejects_moves() {
        let (mut game, _) = play(&[0, 4, 1, 7, 2]);
        assert_eq!(game.place(Slot::Second, 5), Err(MoveError::GameIsFinished));
        assert_eq!(game.place(Slot::First, 5), Err(MoveError::GameIsFinished));
    }

    #[test]
    fn test_out_of_range_position() {
        let mut game = TicTacToe::new();
        assert_eq!(
            game.place(Slot::First, i64::MAX as usize),
            Err(MoveError::out_of_bounds(i64::MAX))
        );
        assert_eq!(
            game.place(Slot::First, usize::MAX),
            Err(MoveError::out_of_bounds(i64::MAX))
        );
        assert_eq!(game.state(), GameState::Turn(Slot::First));
    }

    /// Cells off `line` for the losing side that never complete a line of their own.
    fn filler(line: &[usize; 3], count: usize) -> Vec<usize> {
        let mut picked = Vec::new();
        for position in (0..9).filter(|position| !line.contains(position)) {
            picked.push(position);
            let completes_line = WINNING_LINES
                .iter()
                .any(|other| other.iter().all(|cell| picked.contains(cell)));
            if completes_line {
                picked.pop();
            }
            if picked.len() == count {
                break;
            }
        }
        picked
    }

    #[test]
    fn test_every_line_wins_in_any_order() {
        for line in WINNING_LINES.iter() {
            for winner in [Slot::First, Slot::Second] {
                let loser_moves = match winner {
                    Slot::First => 2,
                    Slot::Second => 3,
                };
                let fillers = filler(line, loser_moves);
                assert_eq!(fillers.len(), loser_moves);

                for order in line.iter().copied().permutations(3) {
                    let (first_moves, second_moves) = match winner {
                        Slot::First => (order.clone(), fillers.clone()),
                        Slot::Second => (fillers.clone(), order.clone()),
                    };
                    let moves: Vec<usize> = first_moves
                        .into_iter()
                        .interleave(second_moves)
                        .collect();

                    let (game, state) = play(&moves);
                    assert_eq!(
                        state,
                        Ok(GameState::Finished(Outcome::win(winner, WinReason::Line))),
                        "line {:?}, moves {:?}",
                        line,
                        moves
                    );
                    assert!(game.is_finished());
                }
            }
        }
    }
}
