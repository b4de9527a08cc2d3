//! HTTP boundary to the game server.
//!
//! Every endpoint the client uses is a method on [`GameApi`]. [`HttpApi`] is the
//! real implementation; tests substitute scripted implementations.

use crate::debug_log;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:9090/api";
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach server: {0}")]
    Transport(String),
    #[error("server rejected request ({code}): {message}")]
    Status { code: u16, message: String },
    #[error("session expired or not authorized, please log in again")]
    Unauthorized,
    #[error("unexpected response from server: {0}")]
    Decode(String),
}

// Wire records. Field names follow the server's camelCase JSON.

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: i64,
    pub word: String,
    #[serde(rename = "isActive", alias = "active", default)]
    pub active: bool,
    #[serde(default, deserialize_with = "wire_time::optional_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "wire_time::optional_datetime")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordInput {
    pub word: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    #[serde(default)]
    pub word: Option<Word>,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub guesses_allowed: u32,
    #[serde(default)]
    pub guesses_made: u32,
    #[serde(default, deserialize_with = "wire_time::optional_datetime")]
    pub started_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "wire_time::optional_datetime")]
    pub finished_at: Option<NaiveDateTime>,
}

impl Game {
    /// Target word, once the server discloses it.
    #[must_use]
    pub fn target_word(&self) -> Option<&str> {
        self.word.as_ref().map(|w| w.word.as_str())
    }
}

/// Server reply to one guess: the evaluated feedback plus the updated game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    #[serde(default)]
    pub id: Option<i64>,
    pub game: Game,
    pub guessed_word: String,
    pub feedback: String,
    #[serde(default, deserialize_with = "wire_time::optional_datetime")]
    pub guessed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    #[serde(deserialize_with = "wire_time::date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_games: u64,
    #[serde(default)]
    pub games_won: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerDayStats {
    #[serde(deserialize_with = "wire_time::date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub attempts: u64,
    #[serde(default)]
    pub wins: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "wire_time::optional_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: crate::auth::Role,
}

#[derive(Serialize)]
struct GuessRequest<'a> {
    guess: &'a str,
}

/// Operations offered by the game server.
///
/// Auth endpoints return the raw JSON payload; turning it into a user record
/// is [`crate::auth::decode_user`]'s job.
pub trait GameApi {
    fn register(&self, request: &RegisterRequest<'_>) -> Result<Value, ApiError>;
    fn login(&self, request: &LoginRequest<'_>) -> Result<Value, ApiError>;

    fn start_game(&self, user_id: i64) -> Result<Game, ApiError>;
    fn make_guess(&self, game_id: i64, guess: &str) -> Result<GuessResult, ApiError>;
    fn game_status(&self, game_id: i64) -> Result<Game, ApiError>;
    fn games_today(&self, user_id: i64) -> Result<Vec<Game>, ApiError>;

    fn list_words(&self) -> Result<Vec<Word>, ApiError>;
    fn create_word(&self, input: &WordInput) -> Result<Word, ApiError>;
    fn update_word(&self, word_id: i64, input: &WordInput) -> Result<Word, ApiError>;
    fn delete_word(&self, word_id: i64) -> Result<(), ApiError>;

    fn daily_report(&self, date: NaiveDate) -> Result<DailyReport, ApiError>;
    fn player_report(&self, user_id: i64) -> Result<Vec<PlayerDayStats>, ApiError>;
    fn players(&self) -> Result<Vec<PlayerSummary>, ApiError>;
}

/// Blocking JSON client over `ureq`.
pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every subsequent request.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}{}", self.base_url, path);
        debug_log!("{} {} (token: {})", method, url, self.token.is_some());
        let request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request("GET", path).call().map_err(map_ureq_error)?;
        decode_body(response)
    }

    fn send<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(method, path)
            .send_json(body)
            .map_err(map_ureq_error)?;
        decode_body(response)
    }

    fn post_empty<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request("POST", path).call().map_err(map_ureq_error)?;
        decode_body(response)
    }
}

impl GameApi for HttpApi {
    fn register(&self, request: &RegisterRequest<'_>) -> Result<Value, ApiError> {
        self.send("POST", "/auth/register", request)
    }

    fn login(&self, request: &LoginRequest<'_>) -> Result<Value, ApiError> {
        self.send("POST", "/auth/login", request)
    }

    fn start_game(&self, user_id: i64) -> Result<Game, ApiError> {
        self.post_empty(&format!("/player/game/start?userId={user_id}"))
    }

    fn make_guess(&self, game_id: i64, guess: &str) -> Result<GuessResult, ApiError> {
        self.send(
            "POST",
            &format!("/player/game/{game_id}/guess"),
            &GuessRequest { guess },
        )
    }

    fn game_status(&self, game_id: i64) -> Result<Game, ApiError> {
        self.get(&format!("/player/game/{game_id}/status"))
    }

    fn games_today(&self, user_id: i64) -> Result<Vec<Game>, ApiError> {
        self.get(&format!("/player/{user_id}/games/today"))
    }

    fn list_words(&self) -> Result<Vec<Word>, ApiError> {
        self.get("/admin/words")
    }

    fn create_word(&self, input: &WordInput) -> Result<Word, ApiError> {
        self.send("POST", "/admin/words", input)
    }

    fn update_word(&self, word_id: i64, input: &WordInput) -> Result<Word, ApiError> {
        self.send("PUT", &format!("/admin/words/{word_id}"), input)
    }

    fn delete_word(&self, word_id: i64) -> Result<(), ApiError> {
        self.request("DELETE", &format!("/admin/words/{word_id}"))
            .call()
            .map_err(map_ureq_error)?;
        Ok(())
    }

    fn daily_report(&self, date: NaiveDate) -> Result<DailyReport, ApiError> {
        self.get(&format!("/admin/report/daily/{}", date.format("%Y-%m-%d")))
    }

    fn player_report(&self, user_id: i64) -> Result<Vec<PlayerDayStats>, ApiError> {
        self.get(&format!("/admin/report/player/{user_id}"))
    }

    fn players(&self) -> Result<Vec<PlayerSummary>, ApiError> {
        self.get("/admin/players")
    }
}

fn decode_body<T: for<'de> Deserialize<'de>>(response: ureq::Response) -> Result<T, ApiError> {
    let text = response
        .into_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

fn map_ureq_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Status(401, _) => ApiError::Unauthorized,
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            ApiError::Status {
                code,
                message: error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => {
            log::warn!("transport failure: {transport}");
            ApiError::Transport(transport.to_string())
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The server answers with `{"message": ..}`, `{"error": ..}`, an auth payload
/// carrying the message in `token`, or plain text.
pub(crate) fn error_message(body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "token"] {
            if let Some(Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }
    if body.is_empty() {
        "no details given".to_string()
    } else {
        body.to_string()
    }
}

/// The server's date fields arrive either as ISO strings or as `[y, m, d, ..]`
/// arrays depending on its Jackson configuration; accept both.
mod wire_time {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Parts(Vec<i64>),
    }

    fn to_date(parts: &[i64]) -> Option<NaiveDate> {
        let [y, m, d, ..] = parts else { return None };
        NaiveDate::from_ymd_opt(
            i32::try_from(*y).ok()?,
            u32::try_from(*m).ok()?,
            u32::try_from(*d).ok()?,
        )
    }

    fn parse_datetime(raw: Raw) -> Option<NaiveDateTime> {
        match raw {
            Raw::Text(text) => text
                .parse::<NaiveDateTime>()
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M").ok())
                .or_else(|| {
                    text.parse::<chrono::DateTime<chrono::Utc>>()
                        .ok()
                        .map(|dt| dt.naive_utc())
                }),
            Raw::Parts(parts) => {
                let date = to_date(&parts)?;
                let field = |i: usize| {
                    parts
                        .get(i)
                        .and_then(|v| u32::try_from(*v).ok())
                        .unwrap_or(0)
                };
                date.and_hms_nano_opt(field(3), field(4), field(5), field(6))
            }
        }
    }

    fn parse_date(raw: Raw) -> Option<NaiveDate> {
        match raw {
            Raw::Text(text) => text
                .parse::<NaiveDate>()
                .ok()
                .or_else(|| text.parse::<NaiveDateTime>().ok().map(|dt| dt.date())),
            Raw::Parts(parts) => to_date(&parts),
        }
    }

    pub fn optional_datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Ok(Option::<Raw>::deserialize(deserializer)?.and_then(parse_datetime))
    }

    pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = Raw::deserialize(deserializer)?;
        parse_date(raw).ok_or_else(|| serde::de::Error::custom("unrecognised date"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guess_result_decodes_server_payload() {
        let payload = json!({
            "id": 12,
            "game": {
                "id": 7,
                "player": {"id": 3, "username": "alice", "role": "PLAYER"},
                "word": {"id": 1, "word": "GRANA", "isActive": true,
                         "createdAt": "2026-10-18T09:00:00", "updatedAt": "2026-10-18T09:00:00"},
                "won": false,
                "guessesAllowed": 5,
                "guessesMade": 1,
                "finished": false,
                "startedAt": "2026-10-18T10:15:30.123456",
                "finishedAt": null
            },
            "guessedWord": "APPLE",
            "feedback": "-O---",
            "guessedAt": "2026-10-18T10:16:00"
        });
        let result: GuessResult = serde_json::from_value(payload).unwrap();
        assert_eq!(result.feedback, "-O---");
        assert_eq!(result.guessed_word, "APPLE");
        assert_eq!(result.game.id, 7);
        assert_eq!(result.game.guesses_allowed, 5);
        assert_eq!(result.game.target_word(), Some("GRANA"));
        assert!(result.game.started_at.is_some());
        assert!(result.game.finished_at.is_none());
    }

    #[test]
    fn test_dates_accept_array_form() {
        let report: DailyReport = serde_json::from_value(json!({
            "date": [2026, 10, 18],
            "totalUsers": 4,
            "totalGames": 9,
            "gamesWon": 6
        }))
        .unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(report.games_won, 6);

        let game: Game = serde_json::from_value(json!({
            "id": 1,
            "startedAt": [2026, 10, 18, 10, 15, 30]
        }))
        .unwrap();
        let started = game.started_at.unwrap();
        assert_eq!(started.format("%H:%M:%S").to_string(), "10:15:30");
    }

    #[test]
    fn test_word_accepts_both_active_spellings() {
        let a: Word =
            serde_json::from_value(json!({"id": 1, "word": "CRANE", "isActive": true})).unwrap();
        let b: Word =
            serde_json::from_value(json!({"id": 2, "word": "SLATE", "active": false})).unwrap();
        assert!(a.active);
        assert!(!b.active);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Game is already finished"}"#),
            "Game is already finished"
        );
        assert_eq!(error_message(r#"{"error":"boom"}"#), "boom");
        assert_eq!(
            error_message(r#"{"token":"Invalid credentials","userId":null}"#),
            "Invalid credentials"
        );
        assert_eq!(
            error_message("Maximum 3 games per day allowed"),
            "Maximum 3 games per day allowed"
        );
        assert_eq!(error_message("   "), "no details given");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpApi::new("http://localhost:9090/api/");
        assert_eq!(api.base_url, "http://localhost:9090/api");
    }
}
