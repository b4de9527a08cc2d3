//! Staggered reveal of freshly evaluated rows, and the canned demo board.
//!
//! A reveal is a queue of cells that are still drawn face-down. Each
//! [`RevealProgress::advance`] turns one cell over and tells the renderer how
//! long to wait before the next one.

use crate::board::{Board, BoardError, Row, WORD_LENGTH, decode};
use std::collections::VecDeque;
use std::time::Duration;

pub const CELL_STAGGER: Duration = Duration::from_millis(150);
pub const ROW_PAUSE: Duration = Duration::from_millis(300);

/// Guesses and feedback shown on the demo board.
pub const DEMO_GUESSES: [(&str, &str); 5] = [
    ("GRANA", "GGGGG"),
    ("APPLE", "O----"),
    ("BRAIN", "-GO--"),
    ("CRANE", "-GOG-"),
    ("DRAMA", "-GO-G"),
];

/// Order the progressive demo plays the game in, ending on the win.
pub const PROGRESSIVE_GUESSES: [(&str, &str); 5] = [
    ("APPLE", "O----"),
    ("BRAIN", "-GO--"),
    ("CRANE", "-GOG-"),
    ("DRAMA", "-GO-G"),
    ("GRANA", "GGGGG"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStep {
    pub row: usize,
    pub column: usize,
    /// Wait after this cell turns before turning the next.
    pub pause: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RevealProgress {
    pending: VecDeque<RevealStep>,
}

impl RevealProgress {
    /// Reveal one row left to right.
    #[must_use]
    pub fn row(row: usize) -> Self {
        Self::rows(row..row + 1)
    }

    /// Reveal several rows in order, pausing a little longer between rows.
    #[must_use]
    pub fn rows(rows: impl IntoIterator<Item = usize>) -> Self {
        let mut pending = VecDeque::new();
        for row in rows {
            for column in 0..WORD_LENGTH {
                let pause = if column + 1 == WORD_LENGTH {
                    ROW_PAUSE
                } else {
                    CELL_STAGGER
                };
                pending.push_back(RevealStep { row, column, pause });
            }
        }
        Self { pending }
    }

    /// Whether the cell at `(row, column)` is still face-down.
    #[must_use]
    pub fn is_hidden(&self, row: usize, column: usize) -> bool {
        self.pending
            .iter()
            .any(|step| step.row == row && step.column == column)
    }

    /// Turn over the next cell.
    pub fn advance(&mut self) -> Option<RevealStep> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

/// Board filled with [`DEMO_GUESSES`].
pub fn demo_board() -> Result<Board, BoardError> {
    let mut board = Board::new();
    for (guess, feedback) in DEMO_GUESSES {
        board.apply_guess(decode(guess, feedback)?)?;
    }
    Ok(board)
}

/// Rows of [`PROGRESSIVE_GUESSES`], decoded, in play order.
pub fn progressive_rows() -> Result<Vec<Row>, BoardError> {
    PROGRESSIVE_GUESSES
        .iter()
        .map(|(guess, feedback)| decode(guess, feedback))
        .collect()
}
