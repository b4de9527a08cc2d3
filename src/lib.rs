// Library interface for wordle-client
// The binary and the integration tests both build on these modules

pub mod admin;
pub mod api;
pub mod auth;
pub mod board;
pub mod cli;
pub mod config;
pub mod game_state;
pub mod logging;
pub mod reveal;
pub mod session;
pub mod storage;
pub mod tui;
pub mod validation;
pub mod wordlist;

// Re-export commonly used items for easier testing
pub use api::{ApiError, GameApi, HttpApi};
pub use auth::{AuthSession, Role, UserRecord, decode_user};
pub use board::{Board, Cell, CellStatus, MAX_ATTEMPTS, Row, WORD_LENGTH, decode};
pub use game_state::{GameInterface, PlaySummary, UserAction, game_loop};
pub use session::{GameSession, SessionState};
pub use storage::{FileStore, MemoryStore, SessionStore};
