use chrono::Local;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use thiserror::Error;
use wordle_client::admin::{self, AdminError};
use wordle_client::api::{ApiError, GameApi, HttpApi};
use wordle_client::auth::{self, AuthError, AuthSession, Role};
use wordle_client::cli::{
    AdminCommand, Cli, CliInterface, Command, ReportCommand, WordsCommand, parse_cli,
};
use wordle_client::config::{Config, ConfigError};
use wordle_client::game_state::game_loop;
use wordle_client::storage::{FileStore, StoreError};
use wordle_client::tui::{TuiInterface, run_demo};
use wordle_client::wordlist::load_words_from_file;
use wordle_client::{info_log, logging};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl AppError {
    fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) | Self::Auth(AuthError::Api(e)) | Self::Admin(AdminError::Api(e)) => {
                Some(e)
            }
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = parse_cli();
    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(config.verbose, config.log_path()) {
        eprintln!("Warning: could not open log file: {e}");
    }
    info_log!("main() - api {} session {}", config.api_url, config.session_file.display());

    let mut store = match FileStore::open(&config.session_file) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &config, &mut store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(api_error) = e.api_error() {
                auth::expire_on_unauthorized(&mut store, api_error);
            }
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &Config, store: &mut FileStore) -> Result<(), AppError> {
    let mut api = HttpApi::new(&config.api_url);

    match cli.command {
        Command::Login { username, password } => {
            let password = password_or_prompt(password)?;
            let session = auth::login(&api, store, &username, &password)?;
            println!("Logged in as {} ({}).", session.user.username, session.user.role);
        }
        Command::Register {
            username,
            password,
            admin,
        } => {
            let password = password_or_prompt(password)?;
            let role = if admin { Role::Admin } else { Role::Player };
            let session = auth::register(&api, store, &username, &password, role)?;
            println!(
                "Registered and logged in as {} ({}).",
                session.user.username, session.user.role
            );
        }
        Command::Logout => {
            auth::logout(store)?;
            println!("Logged out. Session cleared from {}.", store.path().display());
        }
        Command::Whoami => match auth::restore(store)? {
            Some(session) => println!(
                "{} (id {}, {})",
                session.user.username, session.user.id, session.user.role
            ),
            None => println!("Not logged in."),
        },
        Command::Play { plain } => {
            let session = auth::require_session(store)?;
            api.set_token(Some(session.token.clone()));
            let summary = if plain {
                let stdin = io::stdin();
                let mut interface = CliInterface::new(stdin.lock());
                game_loop(&api, &session.user, &mut interface)?
            } else {
                let mut interface = TuiInterface::new()?;
                game_loop(&api, &session.user, &mut interface)?
            };
            println!(
                "Games started: {}, won: {}, lost: {}",
                summary.games_started, summary.games_won, summary.games_lost
            );
        }
        Command::Demo => run_demo()?,
        Command::Admin { command } => {
            let session = auth::require_session(store)?;
            session.require(Role::Admin)?;
            api.set_token(Some(session.token.clone()));
            run_admin(&api, &session, command)?;
        }
    }
    Ok(())
}

fn run_admin<A: GameApi>(
    api: &A,
    session: &AuthSession,
    command: AdminCommand,
) -> Result<(), AppError> {
    log::info!("admin {} runs {:?}", session.user.username, command);
    match command {
        AdminCommand::Words { command } => match command {
            WordsCommand::List => println!("{}", admin::format_words(&api.list_words()?)),
            WordsCommand::Add { word, inactive } => {
                let word = admin::create_word(api, &word, !inactive)?;
                println!("Added {} (id {}).", word.word, word.id);
            }
            WordsCommand::Update { id, word, inactive } => {
                let word = admin::update_word(api, id, &word, !inactive)?;
                println!("Updated word {} to {}.", word.id, word.word);
            }
            WordsCommand::Delete { id } => {
                api.delete_word(id)?;
                println!("Deleted word {id}.");
            }
            WordsCommand::Import { path } => {
                let list = load_words_from_file(&path)?;
                for line in &list.rejected {
                    eprintln!("Skipping invalid entry: {line}");
                }
                let summary = admin::import_words(api, &list)?;
                for (word, reason) in &summary.failed {
                    eprintln!("Failed to add {word}: {reason}");
                }
                println!(
                    "Added {}, already present {}, failed {}.",
                    summary.added.len(),
                    summary.already_present.len(),
                    summary.failed.len()
                );
            }
        },
        AdminCommand::Report { command } => match command {
            ReportCommand::Daily { date } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                println!("{}", admin::format_daily_report(&api.daily_report(date)?));
            }
            ReportCommand::Player { user_id, csv } => {
                let rows = admin::player_report_rows(&api.player_report(user_id)?);
                if csv {
                    print!("{}", admin::player_report_csv(&rows));
                } else {
                    println!("{}", admin::format_player_report(user_id, &rows));
                }
            }
        },
        AdminCommand::Players => println!("{}", admin::format_players(&api.players()?)),
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> io::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
