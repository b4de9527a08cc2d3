//! Board model for a single game: feedback decoding and row application.
//!
//! The server evaluates every guess and answers with a feedback code, one
//! character per letter (`G` correct, `O` present, `-` absent). This module
//! turns that code into a row of [`Cell`]s and writes it onto a fixed
//! [`MAX_ATTEMPTS`] × [`WORD_LENGTH`] board.

use thiserror::Error;

pub const MAX_ATTEMPTS: usize = 5;
pub const WORD_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("feedback '{feedback}' does not match guess '{guess}' (both must be 5 characters)")]
    InvalidFeedbackLength { guess: String, feedback: String },
    #[error("board is full, no attempts remain")]
    BoardFull,
}

/// Semantic classification of one board letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellStatus {
    #[default]
    Empty,
    Correct,
    Present,
    Absent,
}

impl CellStatus {
    /// Map one feedback code character. Unknown characters resolve to `Absent`.
    #[must_use]
    pub fn from_code(code: char) -> Self {
        match code {
            'G' => Self::Correct,
            'O' => Self::Present,
            '-' => Self::Absent,
            other => {
                log::warn!("unknown feedback character {other:?}, treating as absent");
                Self::Absent
            }
        }
    }

    #[must_use]
    pub fn to_code(self) -> char {
        match self {
            Self::Correct => 'G',
            Self::Present => 'O',
            Self::Absent => '-',
            Self::Empty => ' ',
        }
    }
}

/// One letter slot. A cell is either empty or carries both a letter and its
/// evaluated status; there is no filled-but-unevaluated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    letter: Option<char>,
    status: CellStatus,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        letter: None,
        status: CellStatus::Empty,
    };

    fn evaluated(letter: char, code: char) -> Self {
        Self {
            letter: Some(letter),
            status: CellStatus::from_code(code),
        }
    }

    #[must_use]
    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    #[must_use]
    pub fn status(&self) -> CellStatus {
        self.status
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letter.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Row([Cell; WORD_LENGTH]);

impl Row {
    pub const EMPTY: Row = Row([Cell::EMPTY; WORD_LENGTH]);

    #[must_use]
    pub fn cells(&self) -> &[Cell; WORD_LENGTH] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Cell::is_empty)
    }

    /// True when every cell is `Correct`, i.e. the row the server sends for a win.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.0.iter().all(|c| c.status == CellStatus::Correct)
    }

    /// The guessed word, or `None` for an unused row.
    #[must_use]
    pub fn word(&self) -> Option<String> {
        self.0.iter().map(Cell::letter).collect()
    }

    /// Feedback code this row was decoded from (`"-O---"` style).
    #[must_use]
    pub fn code(&self) -> String {
        self.0.iter().map(|c| c.status.to_code()).collect()
    }
}

/// Decode the server's feedback code for `guess` into a board row.
///
/// Lengths are compared in characters; both must be exactly [`WORD_LENGTH`].
pub fn decode(guess: &str, feedback: &str) -> Result<Row, BoardError> {
    let letters: Vec<char> = guess.chars().collect();
    let codes: Vec<char> = feedback.chars().collect();
    if letters.len() != WORD_LENGTH || codes.len() != WORD_LENGTH {
        return Err(BoardError::InvalidFeedbackLength {
            guess: guess.to_string(),
            feedback: feedback.to_string(),
        });
    }

    let mut row = Row::EMPTY;
    for (cell, (&letter, &code)) in row.0.iter_mut().zip(letters.iter().zip(&codes)) {
        *cell = Cell::evaluated(letter, code);
    }
    Ok(row)
}

/// Grid of attempt rows plus the index of the next row to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Row; MAX_ATTEMPTS],
    cursor: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: [Row::EMPTY; MAX_ATTEMPTS],
            cursor: 0,
        }
    }

    /// Clear every row and rewind the cursor.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write `row` at the cursor and advance it by one.
    ///
    /// Fails with [`BoardError::BoardFull`] once all rows are used; the board is
    /// left untouched in that case.
    pub fn apply_guess(&mut self, row: Row) -> Result<(), BoardError> {
        let slot = self.rows.get_mut(self.cursor).ok_or(BoardError::BoardFull)?;
        *slot = row;
        self.cursor += 1;
        Ok(())
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn rows(&self) -> &[Row; MAX_ATTEMPTS] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cursor >= MAX_ATTEMPTS
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        MAX_ATTEMPTS - self.cursor
    }
}
