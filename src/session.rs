//! One play-through of the game, from start to win or loss.
//!
//! The server is the only authority on whether a game is over. The session
//! records each decoded row on its board and then follows the `finished`/`won`
//! flags the server sent with that guess.

use crate::api::{Game, GuessResult};
use crate::board::{Board, BoardError, MAX_ATTEMPTS, Row, decode};
use thiserror::Error;

pub const MAX_GAMES_PER_DAY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no game in progress")]
    NotPlaying,
    #[error("a game is already in progress")]
    AlreadyActive,
    #[error("the last game is over, reset before starting another")]
    GameOver,
    #[error("you've reached the maximum limit of {0} games per day")]
    DailyLimitReached(usize),
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    Playing,
    Won,
    Lost,
}

impl SessionState {
    #[must_use]
    pub fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameSession {
    state: SessionState,
    board: Board,
    game: Option<Game>,
}

/// Refuse to start another game once `finished_today` reaches the daily cap.
pub fn check_daily_limit(finished_today: usize) -> Result<(), SessionError> {
    if finished_today >= MAX_GAMES_PER_DAY {
        Err(SessionError::DailyLimitReached(MAX_GAMES_PER_DAY))
    } else {
        Ok(())
    }
}

impl GameSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Latest server view of the game, if one was started.
    #[must_use]
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    #[must_use]
    pub fn game_id(&self) -> Option<i64> {
        self.game.as_ref().map(|g| g.id)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Enter `Playing` with a fresh board for the game the server just created.
    ///
    /// Only valid from `NotStarted`; a finished game must be [`reset`](Self::reset) first.
    pub fn start(&mut self, game: Game) -> Result<(), SessionError> {
        match self.state {
            SessionState::NotStarted => {}
            SessionState::Playing => return Err(SessionError::AlreadyActive),
            SessionState::Won | SessionState::Lost => return Err(SessionError::GameOver),
        }
        if game.guesses_allowed != 0 && game.guesses_allowed as usize != MAX_ATTEMPTS {
            log::warn!(
                "server allows {} guesses for game {} but the board has {} rows",
                game.guesses_allowed,
                game.id,
                MAX_ATTEMPTS
            );
        }
        if game.guesses_made > 0 {
            log::info!(
                "resuming game {} with {} earlier guesses not shown on the board",
                game.id,
                game.guesses_made
            );
        }
        log::info!("game {} started", game.id);
        self.board.reset();
        self.game = Some(game);
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Record the server's verdict for one guess and follow its game flags.
    ///
    /// Returns the decoded row. On error nothing changes.
    pub fn apply_result(&mut self, result: &GuessResult) -> Result<Row, SessionError> {
        if !self.is_playing() {
            return Err(SessionError::NotPlaying);
        }
        let row = decode(&result.guessed_word, &result.feedback)?;
        self.board.apply_guess(row)?;

        self.state = match (result.game.finished, result.game.won) {
            (_, true) => SessionState::Won,
            (true, false) => SessionState::Lost,
            (false, false) => SessionState::Playing,
        };
        log::debug!(
            "game {}: {} -> {} ({:?})",
            result.game.id,
            result.guessed_word,
            result.feedback,
            self.state
        );
        if self.state == SessionState::Playing && self.board.is_full() {
            log::warn!(
                "board is full but server reports game {} unfinished",
                result.game.id
            );
        }
        self.game = Some(result.game.clone());
        Ok(row)
    }

    /// Guesses the server still accepts, never more than the rows left on the
    /// board. A resumed game may already have spent some of its allowance.
    #[must_use]
    pub fn attempts_left(&self) -> usize {
        let board_left = self.board.remaining();
        match &self.game {
            Some(game) if game.guesses_allowed > 0 => {
                let server_left = game.guesses_allowed.saturating_sub(game.guesses_made);
                board_left.min(server_left as usize)
            }
            _ => board_left,
        }
    }

    /// Guesses made on this game before the board was installed.
    #[must_use]
    pub fn earlier_guesses(&self) -> u32 {
        match &self.game {
            Some(game) => game.guesses_made.saturating_sub(self.board.cursor() as u32),
            None => 0,
        }
    }

    /// Drop the current game and return to `NotStarted`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
