//! Full-screen board built on Ratatui.
//!
//! # Architecture
//! - `TuiInterface`: owns the terminal, renders the board and implements
//!   [`GameInterface`] for [`crate::game_state::game_loop`]
//! - `InputLine`: key handling for the guess being typed, free of any terminal
//! - [`run_demo`]: the sample board with its reveal animation
//!
//! # Modes
//! `EnteringGuess` → `Submitting` → `Revealing` → back to `EnteringGuess`,
//! or `GameOver` once the server reports the game finished.

use crate::auth::UserRecord;
use crate::board::{Board, CellStatus, MAX_ATTEMPTS, WORD_LENGTH};
use crate::game_state::{GameInterface, UserAction};
use crate::reveal::{RevealProgress, demo_board, progressive_rows};
use crate::session::{GameSession, MAX_GAMES_PER_DAY, SessionState};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::thread;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ROW_SPACING: u16 = 2;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const HIDDEN_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

/// Background and foreground for a cell.
fn status_colors(status: CellStatus) -> (Color, Color) {
    match status {
        CellStatus::Empty => (Color::DarkGray, Color::White),
        CellStatus::Correct => (Color::Green, Color::Black),
        CellStatus::Present => (Color::Yellow, Color::Black),
        CellStatus::Absent => (Color::Gray, Color::White),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiMode {
    EnteringGuess,
    Submitting,
    Revealing,
    GameOver,
    Demo,
}

/// Key events worth handling: presses only, no stray control characters.
fn accept_event(event: Event) -> Option<KeyEvent> {
    let Event::Key(key) = event else {
        debug_log!("accept_event() - Ignoring non-key event: {:?}", event);
        return None;
    };
    if key.kind != KeyEventKind::Press {
        debug_log!("accept_event() - Ignoring non-Press key event: {:?}", key.kind);
        return None;
    }
    // Alt-tab can leak escape sequence garbage into the input stream
    if let KeyCode::Char(c) = key.code
        && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
    {
        debug_log!("accept_event() - Ignoring invalid character: {:?}", c);
        return None;
    }
    Some(key)
}

fn has_modifier_keys(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
}

/// The guess being typed, plus the last input complaint.
#[derive(Debug, Default)]
struct InputLine {
    text: String,
    error: String,
}

impl InputLine {
    fn handle_guess_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        self.error.clear();
        if has_modifier_keys(&key) {
            debug_log!("handle_guess_key() - Ignoring key with modifier: {:?}", key.modifiers);
            return None;
        }
        match key.code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() && self.text.len() < WORD_LENGTH => {
                self.text.push(c.to_ascii_uppercase());
            }
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {}
            KeyCode::Char(c) => {
                self.error = format!("Only letters are allowed! ('{c}' is not a letter)");
            }
            KeyCode::Backspace => {
                self.text.pop();
            }
            KeyCode::Enter if self.text.len() == WORD_LENGTH => {
                let guess = std::mem::take(&mut self.text);
                info_log!("handle_guess_key() - Submitting '{}'", guess);
                return Some(UserAction::Guess(guess));
            }
            KeyCode::Enter => {
                self.error = "Guess must be exactly 5 letters!".to_string();
            }
            KeyCode::Esc => return Some(UserAction::Exit),
            _ => {}
        }
        None
    }

    fn handle_game_over_key(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('n' | 'N') | KeyCode::Enter => Some(UserAction::NewGame),
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.text.clear();
        self.error.clear();
    }
}

/// Context for rendering the UI, grouped to keep the render functions small.
struct RenderContext<'a> {
    board: &'a Board,
    reveal: &'a RevealProgress,
    input: &'a InputLine,
    mode: TuiMode,
    title: &'a str,
    message: &'a str,
    status: &'a str,
}

/// Terminal front-end for the game and the demo board.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    board: Board,
    reveal: RevealProgress,
    input: InputLine,
    mode: TuiMode,
    title: String,
    message: String,
    status: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            board: Board::new(),
            reveal: RevealProgress::default(),
            input: InputLine::default(),
            mode: TuiMode::EnteringGuess,
            title: "WORDLE".to_string(),
            message: String::new(),
            status: "Ready".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            board: &self.board,
            reveal: &self.reveal,
            input: &self.input,
            mode: self.mode,
            title: &self.title,
            message: &self.message,
            status: &self.status,
        };
        self.terminal.draw(|f| Self::render_static(f, &ctx))?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    /// Turn over pending cells one at a time, redrawing after each.
    fn animate_reveal(&mut self) {
        let previous = self.mode;
        self.mode = TuiMode::Revealing;
        self.draw_or_log();
        while let Some(step) = self.reveal.advance() {
            self.draw_or_log();
            thread::sleep(step.pause);
        }
        self.mode = previous;
    }

    fn sync_board(&mut self, session: &GameSession) {
        self.board.clone_from(session.board());
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let board_height = MAX_ATTEMPTS as u16 * ROW_SPACING + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(board_height),
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx.title);
        Self::render_board(f, chunks[1], ctx);
        Self::render_info(f, chunks[2], ctx.message, &ctx.input.error);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(f, chunks[4], ctx.mode);
    }

    fn render_title(f: &mut Frame, area: Rect, title: &str) {
        let title = Paragraph::new(title.to_string())
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_board(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let block = Block::default().title("Board").borders(Borders::ALL);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let show_input = ctx.mode == TuiMode::EnteringGuess;
        for (index, row) in ctx.board.rows().iter().enumerate() {
            let y = inner.y + index as u16 * ROW_SPACING;
            if y >= inner.y + inner.height {
                return;
            }
            let mut spans = vec![Span::raw("  ")];
            for (column, cell) in row.cells().iter().enumerate() {
                let span = if show_input && index == ctx.board.cursor() {
                    let letter = ctx.input.text.chars().nth(column).unwrap_or(' ');
                    Span::styled(format!(" {letter} "), HIDDEN_STYLE)
                } else if ctx.reveal.is_hidden(index, column) {
                    let letter = cell.letter().unwrap_or(' ');
                    Span::styled(format!(" {letter} "), HIDDEN_STYLE)
                } else {
                    let (bg, fg) = status_colors(cell.status());
                    let letter = cell.letter().unwrap_or(' ');
                    Span::styled(format!(" {letter} "), Style::default().fg(fg).bg(bg))
                };
                spans.push(span);
                spans.push(Span::raw(" "));
            }
            f.render_widget(
                Paragraph::new(Line::from(spans)),
                Rect {
                    x: inner.x,
                    y,
                    width: inner.width,
                    height: 1,
                },
            );
        }
    }

    fn render_info(f: &mut Frame, area: Rect, message: &str, error: &str) {
        let mut lines = Vec::new();
        if !message.is_empty() {
            lines.push(Line::from(vec![Span::styled(message, MESSAGE_STYLE)]));
        }
        if !error.is_empty() {
            lines.push(Line::from(vec![Span::styled(error, ERROR_STYLE)]));
        }
        lines.push(Line::from(vec![
            Span::styled(" G ", Style::default().fg(Color::Black).bg(Color::Green)),
            Span::raw(" correct  "),
            Span::styled(" O ", Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::raw(" wrong position  "),
            Span::styled(" - ", Style::default().fg(Color::White).bg(Color::Gray)),
            Span::raw(" not in word"),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, mode: TuiMode) {
        let text = match mode {
            TuiMode::EnteringGuess => {
                "Type your 5-letter guess | ENTER: Submit | ESC: Quit"
            }
            TuiMode::Submitting => "Waiting for the server...",
            TuiMode::Revealing => "Revealing...",
            TuiMode::GameOver => "N: New game | ESC: Quit",
            TuiMode::Demo => "A: Animate | P: Progressive | F: Fill | R: Reset | ESC: Quit",
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn next_key(&mut self) -> Result<Option<KeyEvent>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }
        Ok(accept_event(event::read()?))
    }
}

impl GameInterface for TuiInterface {
    fn display_welcome(&mut self, user: &UserRecord, games_today: usize) {
        self.title = format!("WORDLE - {}", user.username);
        self.message = format!("Welcome, {}!", user.username);
        self.status = format!("Games finished today: {games_today}/{MAX_GAMES_PER_DAY}");
        self.draw_or_log();
    }

    fn read_action(&mut self, session: &GameSession) -> Option<UserAction> {
        if !session.is_playing() {
            self.mode = TuiMode::GameOver;
        }
        loop {
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }
            let key = match self.next_key() {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(e) => {
                    log::error!("failed to read terminal input: {e}");
                    return Some(UserAction::Exit);
                }
            };
            let action = match self.mode {
                TuiMode::GameOver => InputLine::handle_game_over_key(key),
                _ => self.input.handle_guess_key(key),
            };
            if action.is_some() {
                info_log!("read_action() - Action received: {:?}", action);
                return action;
            }
        }
    }

    fn display_submitting(&mut self, guess: &str) {
        self.mode = TuiMode::Submitting;
        self.status = format!("Submitting {guess}...");
        self.draw_or_log();
    }

    fn display_guess_result(&mut self, session: &GameSession) {
        self.sync_board(session);
        if let Some(row) = self.board.cursor().checked_sub(1) {
            self.reveal = RevealProgress::row(row);
            self.animate_reveal();
        }
        self.mode = if session.is_playing() {
            TuiMode::EnteringGuess
        } else {
            TuiMode::GameOver
        };
        self.status = format!("{} attempts left", session.attempts_left());
        self.draw_or_log();
    }

    fn display_game_over(&mut self, session: &GameSession, games_today: usize) {
        self.mode = TuiMode::GameOver;
        let target = session
            .game()
            .and_then(|g| g.target_word())
            .map(|w| format!(" The word was {w}."))
            .unwrap_or_default();
        self.message = match session.state() {
            SessionState::Won => format!("✓ Solved in {} guesses!{target}", self.board.cursor()),
            _ => format!("Out of guesses.{target}"),
        };
        self.status =
            format!("Game over - games finished today: {games_today}/{MAX_GAMES_PER_DAY}");
        self.draw_or_log();
    }

    fn display_new_game(&mut self, session: &GameSession, games_today: usize) {
        self.sync_board(session);
        self.reveal = RevealProgress::default();
        self.input.clear();
        self.mode = TuiMode::EnteringGuess;
        let game_id = session.game_id().unwrap_or_default();
        self.message = match session.earlier_guesses() {
            0 => format!("New game started (game #{game_id})."),
            earlier => format!("Resumed game #{game_id}: {earlier} earlier guesses are not shown."),
        };
        self.status = format!(
            "{} attempts left - games finished today: {games_today}/{MAX_GAMES_PER_DAY}",
            session.attempts_left()
        );
        self.draw_or_log();
    }

    fn display_error(&mut self, message: &str) {
        if self.mode == TuiMode::Submitting {
            self.mode = TuiMode::EnteringGuess;
        }
        self.input.error = message.to_string();
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.message = "Exiting...".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Show the sample board. A animates the reveal, P plays the game out row by
/// row, F fills it at once, R clears it, ESC quits.
pub fn run_demo() -> Result<(), io::Error> {
    let filled = demo_board().map_err(io::Error::other)?;
    let progressive = progressive_rows().map_err(io::Error::other)?;
    let mut tui = TuiInterface::new()?;
    tui.title = "WORDLE - demo".to_string();
    tui.mode = TuiMode::Demo;
    tui.status = "Press A to animate the board or P to play it out".to_string();

    loop {
        tui.draw()?;
        let Some(key) = tui.next_key()? else {
            continue;
        };
        match key.code {
            KeyCode::Char('a' | 'A') => {
                tui.board.clone_from(&filled);
                tui.reveal = RevealProgress::rows(0..MAX_ATTEMPTS);
                tui.status = "Revealing...".to_string();
                tui.animate_reveal();
                tui.status = "Done".to_string();
            }
            KeyCode::Char('p' | 'P') => {
                tui.board.reset();
                for row in &progressive {
                    let index = tui.board.cursor();
                    tui.board.apply_guess(*row).map_err(io::Error::other)?;
                    tui.reveal = RevealProgress::row(index);
                    tui.status = format!("Guess {} of {}", index + 1, progressive.len());
                    tui.animate_reveal();
                }
                tui.status = "Solved: GRANA".to_string();
            }
            KeyCode::Char('f' | 'F') => {
                tui.board.clone_from(&filled);
                tui.reveal = RevealProgress::default();
                tui.status = "Filled".to_string();
            }
            KeyCode::Char('r' | 'R') => {
                tui.board.reset();
                tui.reveal = RevealProgress::default();
                tui.status = "Reset".to_string();
            }
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => return Ok(()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_word(input: &mut InputLine, word: &str) {
        for c in word.chars() {
            assert_eq!(input.handle_guess_key(key(KeyCode::Char(c))), None);
        }
    }

    #[test]
    fn test_typing_uppercases_and_submits() {
        let mut input = InputLine::default();
        type_word(&mut input, "crane");
        assert_eq!(input.text, "CRANE");
        assert_eq!(
            input.handle_guess_key(key(KeyCode::Enter)),
            Some(UserAction::Guess("CRANE".to_string()))
        );
        assert!(input.text.is_empty());
    }

    #[test]
    fn test_input_capped_at_word_length() {
        let mut input = InputLine::default();
        type_word(&mut input, "cranes");
        assert_eq!(input.text, "CRANE");
    }

    #[test]
    fn test_short_guess_sets_error() {
        let mut input = InputLine::default();
        type_word(&mut input, "cra");
        assert_eq!(input.handle_guess_key(key(KeyCode::Enter)), None);
        assert_eq!(input.error, "Guess must be exactly 5 letters!");
        input.handle_guess_key(key(KeyCode::Backspace));
        assert_eq!(input.text, "CR");
        assert!(input.error.is_empty());
    }

    #[test]
    fn test_non_letter_rejected() {
        let mut input = InputLine::default();
        assert_eq!(input.handle_guess_key(key(KeyCode::Char('3'))), None);
        assert!(input.text.is_empty());
        assert!(input.error.contains("'3'"));
    }

    #[test]
    fn test_modifier_keys_ignored() {
        let mut input = InputLine::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_guess_key(ctrl_c), None);
        assert!(input.text.is_empty());
    }

    #[test]
    fn test_escape_exits_and_tab_ignored() {
        let mut input = InputLine::default();
        assert_eq!(input.handle_guess_key(key(KeyCode::Esc)), Some(UserAction::Exit));
        assert_eq!(input.handle_guess_key(key(KeyCode::Tab)), None);
    }

    #[test]
    fn test_game_over_keys() {
        assert_eq!(
            InputLine::handle_game_over_key(key(KeyCode::Char('n'))),
            Some(UserAction::NewGame)
        );
        assert_eq!(
            InputLine::handle_game_over_key(key(KeyCode::Esc)),
            Some(UserAction::Exit)
        );
        assert_eq!(InputLine::handle_game_over_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_accept_event_filters() {
        assert!(accept_event(Event::FocusGained).is_none());
        assert!(accept_event(Event::Resize(80, 24)).is_none());
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert!(accept_event(Event::Key(release)).is_none());
        assert!(accept_event(Event::Key(key(KeyCode::Char('\u{FFFD}')))).is_none());
        assert_eq!(
            accept_event(Event::Key(key(KeyCode::Char('a')))).map(|k| k.code),
            Some(KeyCode::Char('a'))
        );
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_colors(CellStatus::Correct).0, Color::Green);
        assert_eq!(status_colors(CellStatus::Present).0, Color::Yellow);
        assert_eq!(status_colors(CellStatus::Absent).0, Color::Gray);
        assert_eq!(status_colors(CellStatus::Empty).0, Color::DarkGray);
    }
}
