use crate::api::{ApiError, GameApi};
use crate::auth::UserRecord;
use crate::session::{GameSession, SessionState, check_daily_limit};
use crate::validation::normalize_word;
use crate::{debug_log, info_log};

const GAME_IN_PROGRESS: &str = "Finish the current game before starting a new one.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Guess(String),
    NewGame,
    Exit,
}

/// Front-end seam for [`game_loop`]: a terminal UI or a line reader.
pub trait GameInterface {
    fn display_welcome(&mut self, user: &UserRecord, games_today: usize);
    /// Next user action. `None` means nothing usable was entered; the loop asks again.
    fn read_action(&mut self, session: &GameSession) -> Option<UserAction>;
    fn display_submitting(&mut self, guess: &str);
    fn display_guess_result(&mut self, session: &GameSession);
    fn display_game_over(&mut self, session: &GameSession, games_today: usize);
    fn display_new_game(&mut self, session: &GameSession, games_today: usize);
    fn display_error(&mut self, message: &str);
    fn display_exit_message(&mut self);
}

/// Tally of what happened during one [`game_loop`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub games_started: usize,
    pub games_won: usize,
    pub games_lost: usize,
}

/// Play until the user exits.
///
/// Server errors are shown and play continues, except `Unauthorized`, which
/// ends the loop so the caller can drop the stale session.
pub fn game_loop<A: GameApi, I: GameInterface>(
    api: &A,
    user: &UserRecord,
    interface: &mut I,
) -> Result<PlaySummary, ApiError> {
    let mut games_today = api.games_today(user.id)?.len();
    interface.display_welcome(user, games_today);

    let mut session = GameSession::new();
    let mut summary = PlaySummary::default();
    start_game(api, user, &mut session, games_today, interface, &mut summary)?;

    loop {
        let Some(action) = interface.read_action(&session) else {
            continue;
        };
        debug_log!("game_loop() - action: {:?}", action);

        match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::NewGame => {
                // The server hands back the unfinished game instead of a new one
                if session.is_playing() {
                    info_log!("new game refused, game {:?} still open", session.game_id());
                    interface.display_error(GAME_IN_PROGRESS);
                    continue;
                }
                session.reset();
                start_game(api, user, &mut session, games_today, interface, &mut summary)?;
            }
            UserAction::Guess(input) => {
                let guess = match normalize_word(&input) {
                    Ok(guess) => guess,
                    Err(e) => {
                        interface.display_error(&e.to_string());
                        continue;
                    }
                };
                let Some(game_id) = session.game_id().filter(|_| session.is_playing()) else {
                    interface.display_error("No game in progress. Start a new game first.");
                    continue;
                };

                interface.display_submitting(&guess);
                let Some(result) = recoverable(api.make_guess(game_id, &guess), interface)? else {
                    continue;
                };
                if let Err(e) = session.apply_result(&result) {
                    log::error!("could not apply server result for {guess}: {e}");
                    interface.display_error(&e.to_string());
                    continue;
                }
                interface.display_guess_result(&session);

                if !session.state().is_over() {
                    continue;
                }
                if session.state() == SessionState::Won {
                    summary.games_won += 1;
                } else {
                    summary.games_lost += 1;
                }
                games_today += 1;
                interface.display_game_over(&session, games_today);
            }
        }
    }

    Ok(summary)
}

fn start_game<A: GameApi, I: GameInterface>(
    api: &A,
    user: &UserRecord,
    session: &mut GameSession,
    games_today: usize,
    interface: &mut I,
    summary: &mut PlaySummary,
) -> Result<(), ApiError> {
    if let Err(e) = check_daily_limit(games_today) {
        interface.display_error(&e.to_string());
        return Ok(());
    }
    let Some(game) = recoverable(api.start_game(user.id), interface)? else {
        return Ok(());
    };
    match session.start(game) {
        Ok(()) => {
            summary.games_started += 1;
            interface.display_new_game(session, games_today);
        }
        Err(e) => interface.display_error(&e.to_string()),
    }
    Ok(())
}

/// Show a server error and carry on, unless the session is no longer valid.
fn recoverable<T, I: GameInterface>(
    result: Result<T, ApiError>,
    interface: &mut I,
) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(e) => {
            log::warn!("request failed: {e}");
            interface.display_error(&e.to_string());
            Ok(None)
        }
    }
}
