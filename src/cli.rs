use crate::api::DEFAULT_API_URL;
use crate::auth::UserRecord;
use crate::board::{Board, CellStatus, Row};
use crate::game_state::{GameInterface, UserAction};
use crate::session::{GameSession, MAX_GAMES_PER_DAY, SessionState};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;

/// Terminal client for the Wordle game server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the game server API
    #[arg(long, env = "WORDLE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// File holding the login session
    #[arg(long, env = "WORDLE_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and log in
    Register {
        username: String,
        #[arg(long)]
        password: Option<String>,
        /// Register with the ADMIN role
        #[arg(long)]
        admin: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Play games against the server
    Play {
        /// Line-oriented mode instead of the full-screen board
        #[arg(long)]
        plain: bool,
    },
    /// Show the sample board with its reveal animation
    Demo,
    /// Word list and reports (ADMIN role)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Manage the word list
    Words {
        #[command(subcommand)]
        command: WordsCommand,
    },
    /// Usage reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// List registered players
    Players,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WordsCommand {
    List,
    Add {
        word: String,
        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: i64,
        word: String,
        #[arg(long)]
        inactive: bool,
    },
    Delete {
        id: i64,
    },
    /// Add every valid word from a newline-delimited file
    Import {
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    /// Totals for one day (default: today)
    Daily { date: Option<NaiveDate> },
    /// Per-day attempts and wins for one player
    Player {
        user_id: i64,
        /// Print CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

fn cell_text(letter: Option<char>, status: CellStatus) -> String {
    let letter = letter.unwrap_or('_');
    match status {
        CellStatus::Correct => format!("[{letter}]"),
        CellStatus::Present => format!("({letter})"),
        CellStatus::Absent | CellStatus::Empty => format!(" {letter} "),
    }
}

/// One row as text: `[A]` correct, `(A)` present, ` A ` absent, ` _ ` empty.
#[must_use]
pub fn format_row(row: &Row) -> String {
    row.cells()
        .iter()
        .map(|c| cell_text(c.letter(), c.status()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[must_use]
pub fn format_board(board: &Board) -> String {
    board
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let marker = if i == board.cursor() { '>' } else { ' ' };
            format!("{marker} {}", format_row(row))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_action(input: &str) -> UserAction {
    match input.trim().to_uppercase().as_str() {
        "EXIT" | "QUIT" => UserAction::Exit,
        "NEXT" | "NEW" => UserAction::NewGame,
        other => UserAction::Guess(other.to_string()),
    }
}

/// Line-oriented front-end: one guess or command per line.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_welcome(&mut self, user: &UserRecord, games_today: usize) {
        println!("Welcome, {}!", user.username);
        println!("Games finished today: {games_today}/{MAX_GAMES_PER_DAY}");
        println!("Legend: [A] correct, (A) wrong position, A not in word");
    }

    fn read_action(&mut self, session: &GameSession) -> Option<UserAction> {
        if session.is_playing() {
            println!(
                "\nEnter your guess ({} left, 'exit' to quit):",
                session.attempts_left()
            );
        } else {
            println!("\nType 'next' for a new game or 'exit' to quit:");
        }
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) => Some(UserAction::Exit),
            Ok(_) if input.trim().is_empty() => None,
            Ok(_) => Some(parse_action(&input)),
            Err(e) => {
                log::error!("failed to read input: {e}");
                Some(UserAction::Exit)
            }
        }
    }

    fn display_submitting(&mut self, guess: &str) {
        println!("Submitting {guess}...");
    }

    fn display_guess_result(&mut self, session: &GameSession) {
        println!("{}", format_board(session.board()));
    }

    fn display_game_over(&mut self, session: &GameSession, games_today: usize) {
        let target = session
            .game()
            .and_then(|g| g.target_word())
            .map(|w| format!(" The word was {w}."))
            .unwrap_or_default();
        match session.state() {
            SessionState::Won => println!(
                "You won in {} guesses!{target}",
                session.board().cursor()
            ),
            _ => println!("Game over.{target}"),
        }
        println!("Games finished today: {games_today}/{MAX_GAMES_PER_DAY}");
    }

    fn display_new_game(&mut self, session: &GameSession, games_today: usize) {
        let game_id = session.game_id().unwrap_or_default();
        match session.earlier_guesses() {
            0 => println!("New game started (game #{game_id})."),
            earlier => println!(
                "Resumed game #{game_id}: {earlier} earlier guesses are not shown, {} left.",
                session.attempts_left()
            ),
        }
        println!("Games finished today: {games_today}/{MAX_GAMES_PER_DAY}");
        println!("{}", format_board(session.board()));
    }

    fn display_error(&mut self, message: &str) {
        println!("Error: {message}");
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}
