/// Main entry point for the mind diary CLI
///
/// This file sets up logging, parses command line arguments, builds the
/// diary service and runs one command. Results are printed to stdout as JSON;
/// logs go to stderr.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;

use mind_diary::config::{self, ProviderConfig};
use mind_diary::{
    AnalysisProvider, AppError, AppResult, DiaryEntry, DiaryService, DisabledProvider, EntryId,
    FileSessionStore, GeminiClient, Mood, SqliteStorage, YearMonth,
};

/// Command line arguments for the mind diary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Path to the session file; defaults to session.json next to the database
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// API key for the analysis provider; analysis is skipped without one
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// generateContent endpoint of the analysis provider
    #[arg(long, env = "GEMINI_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Seconds to wait for the analysis provider
    #[arg(long, global = true, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Continue as the device's anonymous identity
    Anon,
    /// Create an account and sign in
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        #[arg(long)]
        nickname: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Delete the signed-in account and all of its data
    Withdraw,
    /// Print the signed-in owner
    Whoami,
    /// Write (or rewrite) the entry for a day and print its mind card
    Write {
        /// Day of the entry; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        content: String,
        /// One of JOY, CONFIDENCE, CALM, NORMAL, DEPRESSED, ANGRY, TIRED
        #[arg(long)]
        mood: Mood,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Print one entry by id
    Entry { id: EntryId },
    /// Print the entry for a day
    Day { date: NaiveDate },
    Delete { id: EntryId },
    /// Entries of a month (YYYY-MM)
    Month { month: YearMonth },
    /// Entries between two days, inclusive
    Week { start: NaiveDate, end: NaiveDate },
    /// Mood per day of a month
    Moods { month: YearMonth },
    /// Re-run analysis for an entry
    Analyze { id: EntryId },
    /// Mind card preview for an entry
    Card { id: EntryId },
    /// Full analysis of an entry
    Detail { id: EntryId },
    Favorite {
        id: EntryId,
        /// Remove from favorites instead
        #[arg(long)]
        off: bool,
    },
    /// Favorite mind cards, newest first
    Archive,
    /// Monthly summary; last month when no month is given
    Summary { month: Option<YearMonth> },
    /// Stored monthly summaries of a year
    Year { year: i32 },
    /// Most used tag last month
    TopTag,
    Profile,
    Nickname { nickname: String },
    ProfileImage { uri: String },
    Badges,
    SelectBadge { id: i64 },
}

fn build_provider(config: &ProviderConfig) -> Box<dyn AnalysisProvider> {
    match GeminiClient::new(config) {
        Ok(client) => Box::new(client),
        Err(e) => {
            info!("Analysis disabled: {}", e);
            Box::new(DisabledProvider)
        }
    }
}

async fn run(service: &DiaryService, command: Command) -> AppResult<Value> {
    let value = match command {
        Command::Anon => json!({ "owner": service.start_anonymous_session()? }),
        Command::SignUp {
            email,
            password,
            confirm,
            nickname,
        } => json!({ "owner": service.sign_up(&email, &password, &confirm, &nickname)? }),
        Command::Login { email, password } => json!({ "owner": service.login(&email, &password)? }),
        Command::Logout => {
            service.logout()?;
            json!({ "logged_out": true })
        }
        Command::Withdraw => {
            service.withdraw_current_user()?;
            json!({ "withdrawn": true })
        }
        Command::Whoami => json!({ "owner": service.current_owner()? }),
        Command::Write {
            date,
            title,
            content,
            mood,
            tags,
        } => {
            let owner = service.require_owner()?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let is_temporary = owner.is_anonymous();
            let entry = DiaryEntry::new(owner, date, title, content, mood, tags)?.temporary(is_temporary);
            to_json(&service.save_entry_and_prepare_mind_card(entry).await?)?
        }
        Command::Entry { id } => {
            let owner = service.require_owner()?;
            to_json(&service.get_owned_entry(&owner, id)?)?
        }
        Command::Day { date } => {
            let owner = service.require_owner()?;
            to_json(&service.get_entry_by_date(&owner, date)?)?
        }
        Command::Delete { id } => {
            let owner = service.require_owner()?;
            service.delete_entry(&owner, id)?;
            json!({ "deleted": id })
        }
        Command::Month { month } => {
            let owner = service.require_owner()?;
            to_json(&service.get_entries_by_month(&owner, month)?)?
        }
        Command::Week { start, end } => {
            let owner = service.require_owner()?;
            to_json(&service.get_entries_by_week(&owner, start, end)?)?
        }
        Command::Moods { month } => {
            let owner = service.require_owner()?;
            let moods: BTreeMap<String, Mood> = service
                .get_mood_map_by_month(&owner, month)?
                .into_iter()
                .map(|(date, mood)| (date.to_string(), mood))
                .collect();
            to_json(&moods)?
        }
        Command::Analyze { id } => {
            let owner = service.require_owner()?;
            service.get_owned_entry(&owner, id)?;
            to_json(&service.run_analysis_safe(id).await?)?
        }
        Command::Card { id } => {
            let owner = service.require_owner()?;
            service.get_owned_entry(&owner, id)?;
            to_json(&service.get_mind_card_preview_by_entry_id(id)?)?
        }
        Command::Detail { id } => {
            let owner = service.require_owner()?;
            service.get_owned_entry(&owner, id)?;
            to_json(&service.get_mind_card_detail_by_entry_id(id)?)?
        }
        Command::Favorite { id, off } => {
            let owner = service.require_owner()?;
            let changed = service.set_entry_favorite(&owner, id, !off)?;
            json!({ "entry_id": id, "favorite": !off, "changed": changed })
        }
        Command::Archive => {
            let owner = service.require_owner()?;
            to_json(&service.get_mind_card_archive(&owner)?)?
        }
        Command::Summary { month } => {
            let owner = service.require_owner()?;
            let summary = match month {
                Some(month) => service.get_monthly_summary(&owner, month)?,
                None => service.ensure_last_month_monthly_summary(&owner)?,
            };
            to_json(&summary)?
        }
        Command::Year { year } => {
            let owner = service.require_owner()?;
            to_json(&service.get_monthly_summaries_for_year(&owner, year)?)?
        }
        Command::TopTag => {
            let owner = service.require_owner()?;
            json!({ "top_tag": service.get_last_month_top_tag(&owner)? })
        }
        Command::Profile => to_json(&service.get_user_profile()?)?,
        Command::Nickname { nickname } => {
            service.update_nickname(&nickname)?;
            to_json(&service.get_user_profile()?)?
        }
        Command::ProfileImage { uri } => {
            service.update_profile_image(&uri)?;
            to_json(&service.get_user_profile()?)?
        }
        Command::Badges => {
            let owner = service.require_owner()?;
            to_json(&service.get_badge_statuses(&owner)?)?
        }
        Command::SelectBadge { id } => {
            let owner = service.require_owner()?;
            service.select_badge(&owner, id)?;
            to_json(&service.get_badge_statuses(&owner)?)?
        }
    };
    Ok(value)
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("mind_diary={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for JSON output
        .init();

    // Determine database path
    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => config::default_database_path()?,
    };
    let session_path = args
        .session_file
        .unwrap_or_else(|| config::session_path_for(&db_path));

    info!("Using database at: {}", db_path.display());

    let mut provider_config = ProviderConfig::default().with_timeout(Duration::from_secs(args.timeout_secs));
    if let Some(key) = args.api_key {
        provider_config = provider_config.with_api_key(key);
    }
    if let Some(endpoint) = args.endpoint {
        provider_config = provider_config.with_endpoint(endpoint);
    }

    let service = DiaryService::new(
        SqliteStorage::new(db_path)?,
        build_provider(&provider_config),
        Box::new(FileSessionStore::new(session_path)),
    )
    .with_analysis_timeout(provider_config.timeout);

    match run(&service, args.command).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
