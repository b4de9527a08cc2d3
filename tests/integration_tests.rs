// Integration tests for the wordle-client library
// A fake in-process server stands in for the HTTP API

use chrono::NaiveDate;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use wordle_client::admin;
use wordle_client::api::{
    DailyReport, Game, GuessResult, LoginRequest, PlayerDayStats, PlayerSummary, RegisterRequest,
    Word, WordInput,
};
use wordle_client::auth::{self, AuthError};
use wordle_client::cli::{CliInterface, format_board};
use wordle_client::validation::ValidationError;
use wordle_client::*;

/// Scores guesses against a fixed target the way the game server does.
struct FakeServer {
    target: &'static str,
    games: RefCell<HashMap<i64, Game>>,
    finished: RefCell<Vec<Game>>,
    words: RefCell<Vec<Word>>,
    reject_token: bool,
}

impl FakeServer {
    fn new(target: &'static str) -> Self {
        Self {
            target,
            games: RefCell::new(HashMap::new()),
            finished: RefCell::new(Vec::new()),
            words: RefCell::new(Vec::new()),
            reject_token: false,
        }
    }

    fn feedback(&self, guess: &str) -> String {
        let target: Vec<char> = self.target.chars().collect();
        let guess: Vec<char> = guess.chars().collect();
        let mut code = vec!['-'; 5];
        let mut unused: Vec<Option<char>> = target.iter().copied().map(Some).collect();
        for i in 0..5 {
            if guess[i] == target[i] {
                code[i] = 'G';
                unused[i] = None;
            }
        }
        for i in 0..5 {
            if code[i] == 'G' {
                continue;
            }
            if let Some(slot) = unused.iter_mut().find(|c| **c == Some(guess[i])) {
                code[i] = 'O';
                *slot = None;
            }
        }
        code.into_iter().collect()
    }

    fn auth_payload(username: &str) -> Value {
        json!({ "token": "header.e30.sig", "userId": 42, "username": username })
    }
}

impl GameApi for FakeServer {
    fn register(&self, request: &RegisterRequest<'_>) -> Result<Value, ApiError> {
        Ok(json!({
            "token": "header.e30.sig",
            "userId": 42,
            "username": request.username,
            "role": request.role,
        }))
    }

    fn login(&self, request: &LoginRequest<'_>) -> Result<Value, ApiError> {
        if request.password != "Wordle12$" {
            return Err(ApiError::Status {
                code: 400,
                message: "Invalid credentials".to_string(),
            });
        }
        Ok(Self::auth_payload(request.username))
    }

    fn start_game(&self, _user_id: i64) -> Result<Game, ApiError> {
        if self.reject_token {
            return Err(ApiError::Unauthorized);
        }
        let mut games = self.games.borrow_mut();
        let id = games.len() as i64 + 1;
        let game = Game {
            id,
            word: None,
            won: false,
            finished: false,
            guesses_allowed: 5,
            guesses_made: 0,
            started_at: None,
            finished_at: None,
        };
        games.insert(id, game.clone());
        Ok(game)
    }

    fn make_guess(&self, game_id: i64, guess: &str) -> Result<GuessResult, ApiError> {
        let feedback = self.feedback(guess);
        let mut games = self.games.borrow_mut();
        let game = games.get_mut(&game_id).ok_or(ApiError::Status {
            code: 404,
            message: "Game not found".to_string(),
        })?;
        game.guesses_made += 1;
        game.won = feedback == "GGGGG";
        game.finished = game.won || game.guesses_made >= game.guesses_allowed;
        if game.finished {
            game.word = Some(Word {
                id: 1,
                word: self.target.to_string(),
                active: true,
                created_at: None,
                updated_at: None,
            });
            self.finished.borrow_mut().push(game.clone());
        }
        Ok(GuessResult {
            id: None,
            game: game.clone(),
            guessed_word: guess.to_string(),
            feedback,
            guessed_at: None,
        })
    }

    fn game_status(&self, game_id: i64) -> Result<Game, ApiError> {
        self.games
            .borrow()
            .get(&game_id)
            .cloned()
            .ok_or(ApiError::Status {
                code: 404,
                message: "Game not found".to_string(),
            })
    }

    fn games_today(&self, _user_id: i64) -> Result<Vec<Game>, ApiError> {
        Ok(self.finished.borrow().clone())
    }

    fn list_words(&self) -> Result<Vec<Word>, ApiError> {
        Ok(self.words.borrow().clone())
    }

    fn create_word(&self, input: &WordInput) -> Result<Word, ApiError> {
        let mut words = self.words.borrow_mut();
        let word = Word {
            id: words.len() as i64 + 1,
            word: input.word.clone(),
            active: input.active,
            created_at: None,
            updated_at: None,
        };
        words.push(word.clone());
        Ok(word)
    }

    fn update_word(&self, word_id: i64, input: &WordInput) -> Result<Word, ApiError> {
        let mut words = self.words.borrow_mut();
        let word = words
            .iter_mut()
            .find(|w| w.id == word_id)
            .ok_or(ApiError::Status {
                code: 404,
                message: "Word not found".to_string(),
            })?;
        word.word = input.word.clone();
        word.active = input.active;
        Ok(word.clone())
    }

    fn delete_word(&self, word_id: i64) -> Result<(), ApiError> {
        self.words.borrow_mut().retain(|w| w.id != word_id);
        Ok(())
    }

    fn daily_report(&self, date: NaiveDate) -> Result<DailyReport, ApiError> {
        let finished = self.finished.borrow();
        Ok(DailyReport {
            date,
            total_users: 1,
            total_games: finished.len() as u64,
            games_won: finished.iter().filter(|g| g.won).count() as u64,
        })
    }

    fn player_report(&self, _user_id: i64) -> Result<Vec<PlayerDayStats>, ApiError> {
        Ok(vec![PlayerDayStats {
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            attempts: 3,
            wins: 1,
        }])
    }

    fn players(&self) -> Result<Vec<PlayerSummary>, ApiError> {
        Ok(vec![PlayerSummary {
            id: 42,
            username: "PlayerOne".to_string(),
            created_at: None,
        }])
    }
}

fn logged_in(server: &FakeServer, store: &mut MemoryStore) -> UserRecord {
    auth::login(server, store, "PlayerOne", "Wordle12$")
        .unwrap()
        .user
}

#[test]
fn test_login_then_play_to_win() {
    let server = FakeServer::new("GRANA");
    let mut store = MemoryStore::new();
    let user = logged_in(&server, &mut store);
    assert_eq!(user.id, 42);
    assert_eq!(user.role, Role::Player);

    let mut interface = CliInterface::new(Cursor::new("apple\ngrana\nexit\n"));
    let summary = game_loop(&server, &user, &mut interface).unwrap();
    assert_eq!(
        summary,
        PlaySummary {
            games_started: 1,
            games_won: 1,
            games_lost: 0
        }
    );

    let game = server.game_status(1).unwrap();
    assert!(game.finished && game.won);
    assert_eq!(game.guesses_made, 2);
}

#[test]
fn test_five_misses_lose_and_reveal_target() {
    let server = FakeServer::new("GRANA");
    let user = logged_in(&server, &mut MemoryStore::new());

    let input = "apple\nbrain\ncrane\ndrama\nslate\nexit\n";
    let mut interface = CliInterface::new(Cursor::new(input));
    let summary = game_loop(&server, &user, &mut interface).unwrap();
    assert_eq!(summary.games_lost, 1);

    let game = server.game_status(1).unwrap();
    assert!(game.finished && !game.won);
    assert_eq!(game.target_word(), Some("GRANA"));
}

#[test]
fn test_invalid_guesses_never_reach_server() {
    let server = FakeServer::new("GRANA");
    let user = logged_in(&server, &mut MemoryStore::new());

    let mut interface = CliInterface::new(Cursor::new("gran\ngr4na\n\nexit\n"));
    game_loop(&server, &user, &mut interface).unwrap();
    assert_eq!(server.game_status(1).unwrap().guesses_made, 0);
}

#[test]
fn test_daily_limit_after_three_games() {
    let server = FakeServer::new("GRANA");
    let user = logged_in(&server, &mut MemoryStore::new());

    let input = "grana\nnext\ngrana\nnext\ngrana\nnext\nexit\n";
    let mut interface = CliInterface::new(Cursor::new(input));
    let summary = game_loop(&server, &user, &mut interface).unwrap();
    assert_eq!(summary.games_started, 3);
    assert_eq!(summary.games_won, 3);
    assert_eq!(server.games.borrow().len(), 3);
}

#[test]
fn test_session_board_matches_server_feedback() {
    let server = FakeServer::new("GRANA");
    let mut session = GameSession::new();
    session.start(server.start_game(42).unwrap()).unwrap();

    for guess in ["APPLE", "BRAIN"] {
        let result = server.make_guess(1, guess).unwrap();
        session.apply_result(&result).unwrap();
    }
    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(session.board().cursor(), 2);
    assert_eq!(session.board().rows()[0].code(), "O----");
    assert_eq!(session.board().rows()[1].code(), "-GG-O");

    let text = format_board(session.board());
    assert!(text.lines().next().unwrap().contains("(A)"));
    assert!(text.lines().nth(1).unwrap().contains("[R]"));
    assert!(text.lines().nth(2).unwrap().starts_with('>'));
}

#[test]
fn test_unauthorized_clears_stored_session() {
    let mut server = FakeServer::new("GRANA");
    let mut store = MemoryStore::new();
    let user = logged_in(&server, &mut store);
    server.reject_token = true;

    let mut interface = CliInterface::new(Cursor::new("exit\n"));
    let err = game_loop(&server, &user, &mut interface).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    auth::expire_on_unauthorized(&mut store, &err);
    assert!(matches!(
        auth::require_session(&mut store),
        Err(AuthError::NotLoggedIn)
    ));
}

#[test]
fn test_wrong_password_keeps_store_empty() {
    let server = FakeServer::new("GRANA");
    let mut store = MemoryStore::new();
    let err = auth::login(&server, &mut store, "PlayerOne", "nope").unwrap_err();
    assert!(matches!(err, AuthError::Api(ApiError::Status { code: 400, .. })));
    assert!(auth::restore(&mut store).unwrap().is_none());
}

#[test]
fn test_register_applies_form_rules_before_calling_server() {
    let server = FakeServer::new("GRANA");
    let mut store = MemoryStore::new();

    let err = auth::register(&server, &mut store, "alice_01", "Wordle12$", Role::Player);
    assert!(matches!(
        err,
        Err(AuthError::Invalid(ValidationError::UsernameCharacters))
    ));
    let err = auth::register(&server, &mut store, "AliceB", "Secret123", Role::Player);
    assert!(matches!(
        err,
        Err(AuthError::Invalid(ValidationError::PasswordNeedsSymbol))
    ));
    assert!(auth::restore(&mut store).unwrap().is_none());

    let session = auth::register(&server, &mut store, "AliceB", "abcd123$", Role::Player).unwrap();
    assert_eq!(session.user.username, "AliceB");
}

#[test]
fn test_session_survives_file_store_reopen() {
    let dir = std::env::temp_dir().join(format!("wordle-client-it-{}", std::process::id()));
    let path = dir.join("session.json");
    let server = FakeServer::new("GRANA");

    {
        let mut store = FileStore::open(&path).unwrap();
        auth::register(&server, &mut store, "AdminUser", "Wordle12$", Role::Admin).unwrap();
    }

    let mut store = FileStore::open(&path).unwrap();
    let session = auth::require_session(&mut store).unwrap();
    assert_eq!(session.user.username, "AdminUser");
    assert!(session.require(Role::Admin).is_ok());

    auth::logout(&mut store).unwrap();
    assert!(auth::restore(&mut FileStore::open(&path).unwrap()).unwrap().is_none());
}

#[test]
fn test_admin_word_management_and_reports() {
    let server = FakeServer::new("GRANA");
    admin::create_word(&server, "grana", true).unwrap();
    let list = wordle_client::wordlist::load_words_from_str("grana\ncrane\nslate\nxx\n");
    let summary = admin::import_words(&server, &list).unwrap();
    assert_eq!(summary.added, vec!["CRANE", "SLATE"]);
    assert_eq!(list.rejected, vec!["xx"]);

    admin::update_word(&server, 2, "brain", false).unwrap();
    server.delete_word(3).unwrap();
    let table = admin::format_words(&server.list_words().unwrap());
    assert!(table.contains("BRAIN"));
    assert!(table.ends_with("2 words, 1 active"));

    let rows = admin::player_report_rows(&server.player_report(42).unwrap());
    let csv = admin::player_report_csv(&rows);
    assert!(csv.ends_with("\"2026-10-18\",\"3\",\"1\",\"33.33\"\n"));
    assert!(admin::format_players(&server.players().unwrap()).contains("PlayerOne"));
}
