use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tsuiseki_api::mangaupdates::lists::{list_options, select_list, status_for_list_type, ListOption};
use tsuiseki_api::mangaupdates::Credentials;
use tsuiseki_api::{ScoreFormat, TrackEntryDraft, TrackStatus, TrackerId};
use tsuiseki_core::{logging, AppConfig, FileCredentialStore, TrackerKeys, TrackerService};

#[derive(Parser)]
#[command(
    name = "tsuiseki",
    about = "Manga list tracker sync",
    long_about = "Authenticate with AniList, MyAnimeList and MangaUpdates, search their catalogs and keep reading progress in sync."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file to use instead of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List supported trackers
    Trackers,

    /// Print the sign-in URL of every tracker
    AuthUrls,

    /// Sign in and store the resulting token
    Login {
        tracker: TrackerId,

        /// Authorization code or token; prompted for when omitted. A
        /// MyAnimeList code must come from the URL last printed by
        /// `auth-urls` or `login`.
        code: Option<String>,

        /// MangaUpdates username
        #[arg(long, requires = "password")]
        username: Option<String>,

        /// MangaUpdates password
        #[arg(long, requires = "username")]
        password: Option<String>,

        /// Do not open the sign-in page in a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Forget the stored token
    Logout { tracker: TrackerId },

    /// Show the signed-in user of one or all trackers
    Whoami { tracker: Option<TrackerId> },

    /// Search a tracker's catalog
    Search { tracker: TrackerId, query: String },

    /// Show the library entry for a remote series
    Entry {
        tracker: TrackerId,
        series_id: String,

        /// Print the starting entry instead of null when not in the list
        #[arg(long)]
        or_default: bool,
    },

    /// Add a series to the library
    Add {
        tracker: TrackerId,
        series_id: String,
        #[command(flatten)]
        changes: EntryChanges,
    },

    /// Change an existing library entry
    Update {
        tracker: TrackerId,
        series_id: String,
        #[command(flatten)]
        changes: EntryChanges,
    },

    /// MangaUpdates lists a series can be filed under
    Lists { series_id: String },

    /// Legal values of a score format
    Scores { format: ScoreFormat },

    /// Push chapter progress to every linked tracker
    Sync {
        /// Links as JSON, e.g. '{"MyAnimeList": "2", "AniList": ""}'
        #[arg(long)]
        keys: String,

        #[arg(long)]
        progress: u32,
    },
}

#[derive(clap::Args)]
struct EntryChanges {
    #[arg(long)]
    progress: Option<u32>,

    #[arg(long)]
    status: Option<TrackStatus>,

    /// Score text, checked against the entry's score format
    #[arg(long)]
    score: Option<String>,

    /// Score format for `--score` when adding
    #[arg(long)]
    score_format: Option<ScoreFormat>,

    /// MangaUpdates list id
    #[arg(long)]
    list: Option<String>,
}

#[derive(Serialize)]
struct ScoreOption {
    value: f64,
    label: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    let _log_guard = logging::init(&config.logging);

    let store = FileCredentialStore::new(AppConfig::credentials_path());
    let service = TrackerService::from_config(&config.trackers)?;
    service.restore_sessions(&store)?;

    match cli.command {
        Command::Trackers => print_json(&service.get_all()),
        Command::AuthUrls => {
            let urls = service.get_auth_urls();
            service.save_auth_state(&store)?;
            print_json(&urls)
        }
        Command::Login {
            tracker,
            code,
            username,
            password,
            no_browser,
        } => {
            let code = match (code, username, password) {
                (_, Some(username), Some(password)) => {
                    Credentials::new(username, password).to_access_code()
                }
                (Some(code), _, _) => code,
                _ => prompt_for_code(&service, &store, tracker, no_browser)?,
            };
            if !service.login(tracker, &code, &store).await? {
                bail!("{tracker} rejected the sign-in");
            }
            let name = service.get_username(tracker).await;
            print_json(&serde_json::json!({ "tracker": tracker, "username": name }))
        }
        Command::Logout { tracker } => {
            service.logout(tracker, &store)?;
            print_json(&serde_json::json!({ "tracker": tracker, "loggedOut": true }))
        }
        Command::Whoami { tracker } => {
            let trackers = match tracker {
                Some(id) => vec![id],
                None => TrackerId::ALL.to_vec(),
            };
            let mut users = serde_json::Map::new();
            for id in trackers {
                let name = service.get_username(id).await;
                users.insert(id.to_string(), serde_json::json!(name));
            }
            print_json(&users)
        }
        Command::Search { tracker, query } => print_json(&service.search(tracker, &query).await),
        Command::Entry {
            tracker,
            series_id,
            or_default,
        } => {
            if or_default {
                print_json(&service.entry_or_default(tracker, &series_id).await)
            } else {
                print_json(&service.get_library_entry(tracker, &series_id).await)
            }
        }
        Command::Add {
            tracker,
            series_id,
            changes,
        } => {
            let mut draft = TrackEntryDraft::new(series_id);
            draft.progress = changes.progress;
            draft.status = changes.status;
            draft.score_format = changes.score_format;
            if let Some(score) = &changes.score {
                let format = draft
                    .score_format
                    .or(service.metadata(tracker).score_format)
                    .unwrap_or_default();
                draft.score = Some(format.parse(score)?);
            }
            if let Some(list) = &changes.list {
                let entry = select_list(&draft.clone().into_entry(), list);
                draft = TrackEntryDraft {
                    status: changes.status.or(Some(entry.status)),
                    ..TrackEntryDraft::from(entry)
                };
            }
            print_json(&service.add_library_entry(tracker, draft).await?)
        }
        Command::Update {
            tracker,
            series_id,
            changes,
        } => {
            let mut entry = service.entry_or_default(tracker, &series_id).await;
            if let Some(list) = &changes.list {
                entry = select_list(&entry, list);
            }
            if let Some(progress) = changes.progress {
                entry.progress = progress;
            }
            if let Some(status) = changes.status {
                entry.status = status;
            }
            if let Some(format) = changes.score_format {
                entry.score_format = Some(format);
            }
            if let Some(score) = &changes.score {
                entry.set_score_input(score)?;
            }
            print_json(&service.update_library_entry(tracker, entry).await?)
        }
        Command::Lists { series_id } => {
            let entry = service
                .entry_or_default(TrackerId::MangaUpdates, &series_id)
                .await;
            let mut options = list_options(&entry);
            match service.registry().mangaupdates().get_lists().await {
                Ok(custom) => {
                    for list in custom {
                        let id = list.list_id.to_string();
                        if options.iter().all(|o| o.id != id) {
                            options.push(ListOption {
                                status: list
                                    .kind
                                    .as_deref()
                                    .map(status_for_list_type)
                                    .unwrap_or(TrackStatus::Reading),
                                id,
                                name: list.title,
                            });
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "custom lists unavailable"),
            }
            print_json(&options)
        }
        Command::Scores { format } => {
            let options: Vec<ScoreOption> = format
                .options()
                .into_iter()
                .map(|value| ScoreOption {
                    value,
                    label: format.label(value),
                })
                .collect();
            print_json(&options)
        }
        Command::Sync { keys, progress } => {
            if !config.general.tracker_auto_update {
                tracing::info!("tracker auto-update disabled, nothing pushed");
                return print_json(&serde_json::json!([]));
            }
            let keys: TrackerKeys =
                serde_json::from_str(&keys).context("--keys must be a JSON object")?;
            print_json(&service.push_progress(&keys, progress).await)
        }
    }
}

/// Show the sign-in page and read the code or token the user pastes back.
fn prompt_for_code(
    service: &TrackerService,
    store: &FileCredentialStore,
    tracker: TrackerId,
    no_browser: bool,
) -> Result<String> {
    if tracker == TrackerId::MangaUpdates {
        bail!("MangaUpdates signs in with --username and --password");
    }

    let url = service
        .get_auth_urls()
        .remove(&tracker)
        .context("tracker has no sign-in URL")?;
    service.save_auth_state(store)?;
    eprintln!("Sign in at:\n  {url}");
    if !no_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    eprint!("Paste the code: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let code = line.trim().to_string();
    if code.is_empty() {
        bail!("no code entered");
    }
    Ok(code)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
