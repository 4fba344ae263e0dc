use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use audiothek::home::Slot;
use audiothek::{
    AudiothekSearcher, CardWindow, DownloadRequestBuilder, EpisodeAction, HomePreferences,
    HomeSection, ModuleWindow, NextcloudAccount, NextcloudSyncService, NoopReporter, Podcast,
    ProgressEvent, ProgressReporter, ReqwestClient, SectionContent, SectionLoader, SectionState,
    SharedProgressReporter, SyncService, fetch_feed, is_url, parse_feed_file,
};

// Emoji with fallback for terminals without Unicode support
static RADIO: Emoji<'_, '_> = Emoji("📻 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static PLAY: Emoji<'_, '_> = Emoji("▶️  ", "[>] ");
static UPLOAD: Emoji<'_, '_> = Emoji("📤 ", "[^] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");

/// Browse the ARD Audiothek, parse podcast feeds and sync with Nextcloud
#[derive(Parser, Debug)]
#[command(name = "audiothek")]
#[command(about = "Browse the ARD Audiothek, parse podcast feeds and sync with Nextcloud")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the Audiothek home screen sections
    Home {
        /// Only show this section (hot, heute-wichtig, modules, live)
        #[arg(short, long)]
        section: Option<HomeSection>,

        /// Preferences file with section order and visibility
        #[arg(short, long)]
        prefs: Option<PathBuf>,

        /// Print normalized cards as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search Audiothek program sets
    Search {
        query: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch and parse an RSS or Audiothek JSON feed
    Feed {
        /// Feed URL or path to a downloaded feed file
        source: String,

        /// Feed URL a local file was downloaded from
        #[arg(long)]
        feed_url: Option<String>,

        /// Maximum number of episodes to list
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show the URL a feed download would request
    PrepareUrl {
        url: String,

        /// Treat the URL as a local feed
        #[arg(long)]
        local: bool,
    },

    /// Show or change the order and visibility of home sections
    Sections {
        /// Preferences file
        prefs: PathBuf,

        /// Comma-separated section tags to hide
        #[arg(long, value_delimiter = ',')]
        hide: Option<Vec<String>>,

        /// Comma-separated section tags in display order
        #[arg(long, value_delimiter = ',')]
        order: Option<Vec<String>>,
    },

    /// Synchronize subscriptions and episode actions with Nextcloud
    Sync {
        /// Nextcloud server URL
        #[arg(long)]
        server: String,

        /// Nextcloud account name
        #[arg(long)]
        user: String,

        /// App password of the account
        #[arg(long)]
        password: String,

        /// Only fetch changes after this timestamp (seconds)
        #[arg(long, default_value = "0")]
        since: i64,

        /// Feed URLs to report as subscribed
        #[arg(long)]
        add: Vec<String>,

        /// Feed URLs to report as unsubscribed
        #[arg(long)]
        remove: Vec<String>,

        /// JSON file with episode actions to upload
        #[arg(long)]
        actions: Option<PathBuf>,
    },
}

/// Progress reporter using indicatif for terminal output
struct IndicatifReporter {
    bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        Self { bar: spinner() }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Requesting { endpoint } => {
                self.bar
                    .set_message(format!("{SEARCH}Requesting {}", endpoint.cyan()));
            }

            ProgressEvent::SubscriptionsReceived { added, removed } => {
                self.bar.println(format!(
                    "{HEADPHONES}Subscriptions: {} added, {} removed",
                    added.to_string().green(),
                    removed.to_string().yellow()
                ));
            }

            ProgressEvent::EpisodeActionsReceived { count } => {
                self.bar.println(format!(
                    "{HEADPHONES}Episode actions: {}",
                    count.to_string().cyan()
                ));
            }

            ProgressEvent::UploadingBatch {
                batch_index,
                total_batches,
                actions_in_batch,
            } => {
                self.bar.set_message(format!(
                    "{UPLOAD}[{}/{}] uploading {} actions",
                    (batch_index + 1).to_string().cyan(),
                    total_batches.to_string().cyan(),
                    actions_in_batch
                ));
            }

            ProgressEvent::BatchUploaded { batch_index } => {
                self.bar
                    .println(format!("{SUCCESS}Batch {} uploaded", batch_index + 1));
            }

            ProgressEvent::BatchFailed { batch_index, error } => {
                self.bar.println(format!(
                    "{FAILURE}Batch {} failed - {}",
                    batch_index + 1,
                    error.red()
                ));
            }

            ProgressEvent::SyncCompleted { timestamp } => {
                self.bar.finish_and_clear();
                println!(
                    "\n{PARTY}{} server timestamp {}",
                    "Sync complete:".bold().green(),
                    timestamp.to_string().cyan()
                );
            }
        }
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        title.to_string()
    } else {
        let truncated: String = title.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

fn print_window(window: &CardWindow) {
    for position in 0..window.len() {
        match window.slot(position) {
            Some(Slot::Card(card)) => {
                let marker = if card.playable().is_some() {
                    PLAY.to_string()
                } else {
                    "  ".to_string()
                };
                println!(
                    "  {marker}{} {}",
                    truncate_title(&card.title, 50).bold(),
                    card.feed_url.dimmed()
                );
            }
            Some(Slot::Placeholder) => println!("  {}", "...".dimmed()),
            None => break,
        }
    }
}

fn print_section(section: HomeSection, content: SectionContent, json: bool) -> Result<()> {
    if json {
        let value = match &content {
            SectionContent::Cards(cards) => serde_json::to_string_pretty(cards)?,
            SectionContent::Modules(modules) => serde_json::to_string_pretty(modules)?,
        };
        println!("{value}");
        return Ok(());
    }

    println!("\n{HEADPHONES}{}", section.tag().bold().magenta());
    match content {
        SectionContent::Cards(cards) => {
            let mut window = CardWindow::new(section);
            window.update(cards);
            print_window(&window);
        }
        SectionContent::Modules(modules) => {
            let mut window = ModuleWindow::default();
            window.update(modules);
            for row in 0..window.len() {
                if let Some(title) = window.title(row) {
                    println!(" {}", title.underline());
                }
                if let Some(cards) = window.row(row) {
                    print_window(&cards);
                }
            }
        }
    }
    Ok(())
}

async fn show_home(
    client: Arc<ReqwestClient>,
    only: Option<HomeSection>,
    prefs: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let sections: Vec<HomeSection> = match only {
        Some(section) => vec![section],
        None => {
            let prefs = match prefs {
                Some(path) => HomePreferences::load(path).context("Failed to load preferences")?,
                None => HomePreferences::default(),
            };
            prefs
                .sorted_section_tags()
                .iter()
                .filter_map(|tag| HomeSection::from_tag(tag))
                .collect()
        }
    };

    let loaders: Vec<_> = sections
        .iter()
        .map(|section| SectionLoader::new(*section, Arc::clone(&client)))
        .collect();
    let receivers: Vec<_> = loaders.iter().map(SectionLoader::subscribe).collect();
    for loader in &loaders {
        loader.load();
    }

    let bar = (!quiet && !json).then(spinner);
    if let Some(bar) = &bar {
        bar.set_message(format!("{SEARCH}Loading {} sections", loaders.len()));
    }
    let states = join_all(receivers.into_iter().map(settled)).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    for (section, state) in sections.into_iter().zip(states) {
        match state {
            SectionState::Loaded(content) => print_section(section, content, json)?,
            _ if json => println!("[]"),
            _ => println!(
                "\n{HEADPHONES}{}\n  {}",
                section.tag().bold().magenta(),
                "Nothing to show".dimmed()
            ),
        }
    }
    Ok(())
}

/// Wait until a section has left its loading state
async fn settled(mut state: watch::Receiver<SectionState>) -> SectionState {
    match state
        .wait_for(|s| !matches!(s, SectionState::Loading { .. }))
        .await
    {
        Ok(current) => (*current).clone(),
        Err(_) => SectionState::Empty,
    }
}

async fn search(client: ReqwestClient, query: &str, json: bool) -> Result<()> {
    let searcher = AudiothekSearcher::new(client);
    let results = searcher
        .search(query)
        .await
        .with_context(|| format!("Search on {} failed", searcher.name()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{SEARCH}{} results for {}", results.len(), query.cyan());
    for result in &results {
        println!(
            "  {} {}\n    {}",
            result.title.bold(),
            result
                .author
                .as_deref()
                .map(|a| format!("({a})"))
                .unwrap_or_default()
                .dimmed(),
            result.feed_url.dimmed()
        );
    }
    Ok(())
}

fn print_podcast(podcast: &Podcast, limit: usize) {
    println!(
        "{HEADPHONES}{} • {} episodes",
        podcast.title.bold().green(),
        podcast.episodes.len().to_string().cyan()
    );
    if let Some(description) = &podcast.description {
        println!("  {}", truncate_title(description, 100).dimmed());
    }
    for episode in podcast.episodes.iter().take(limit) {
        let date = episode
            .pub_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        let media = episode
            .enclosure
            .as_ref()
            .map(|e| e.url.to_string())
            .unwrap_or_else(|| "no media".to_string());
        println!(
            "  {} {}\n    {}",
            date.cyan(),
            truncate_title(&episode.title, 60),
            media.dimmed()
        );
    }
}

async fn sync(
    client: ReqwestClient,
    account: NextcloudAccount,
    since: i64,
    added: Vec<String>,
    removed: Vec<String>,
    actions: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let actions: Vec<EpisodeAction> = match actions {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid episode actions in {}", path.display()))?
        }
        None => Vec::new(),
    };

    let reporter: SharedProgressReporter = if quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let mut service = NextcloudSyncService::new(client, Some(account)).with_reporter(reporter.clone());
    service.login().await.context("Failed to log in")?;

    let subscriptions = service.get_subscription_changes(since).await?;
    let episode_actions = service.get_episode_action_changes(since).await?;
    let mut timestamp = subscriptions.timestamp.max(episode_actions.timestamp);

    if !added.is_empty() || !removed.is_empty() {
        let response = service.upload_subscription_changes(&added, &removed).await?;
        timestamp = timestamp.max(response.timestamp);
    }
    if !actions.is_empty() {
        let response = service.upload_episode_actions(&actions).await?;
        timestamp = timestamp.max(response.timestamp);
    }
    service.logout().await;

    reporter.report(ProgressEvent::SyncCompleted { timestamp });
    if !quiet {
        for url in &subscriptions.add {
            println!("  {} {}", "+".green(), url);
        }
        for url in &subscriptions.remove {
            println!("  {} {}", "-".red(), url);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = ReqwestClient::try_new().context("Failed to create HTTP client")?;

    match args.command {
        Command::Home {
            section,
            prefs,
            json,
        } => {
            if !args.quiet && !json {
                println!(
                    "\n{}{} {}",
                    RADIO,
                    "audiothek".bold().magenta(),
                    "- ARD Audiothek".dimmed()
                );
            }
            show_home(Arc::new(client), section, prefs.as_deref(), json, args.quiet).await?;
        }

        Command::Search { query, json } => search(client, &query, json).await?,

        Command::Feed {
            source,
            feed_url,
            limit,
        } => {
            let podcast = if is_url(&source) {
                fetch_feed(&client, &source)
                    .await
                    .with_context(|| format!("Failed to fetch feed {source}"))?
            } else {
                let feed_url = feed_url
                    .as_deref()
                    .map(url::Url::parse)
                    .transpose()
                    .context("Invalid feed URL")?;
                parse_feed_file(Path::new(&source), feed_url)
                    .with_context(|| format!("Failed to parse feed file {source}"))?
            };
            print_podcast(&podcast, limit);
        }

        Command::PrepareUrl { url, local } => {
            let request = DownloadRequestBuilder::for_feed(".", &url, local, 0).build();
            println!("{}", request.source);
        }

        Command::Sections { prefs, hide, order } => {
            let mut preferences =
                HomePreferences::load(&prefs).context("Failed to load preferences")?;
            if hide.is_some() || order.is_some() {
                let hide = hide.unwrap_or_else(|| preferences.hidden_section_tags());
                let order = order.unwrap_or_else(|| preferences.section_order());
                preferences
                    .save_changes(&prefs, &hide, &order)
                    .context("Failed to save preferences")?;
            }
            for tag in preferences.sorted_section_tags() {
                println!("{tag}");
            }
        }

        Command::Sync {
            server,
            user,
            password,
            since,
            add,
            remove,
            actions,
        } => {
            if server.trim().is_empty() {
                bail!("A Nextcloud server URL is required");
            }
            let account = NextcloudAccount {
                server_url: server,
                username: user,
                app_password: password,
            };
            sync(client, account, since, add, remove, actions, args.quiet)
                .await
                .context("Failed to synchronize")?;
        }
    }

    Ok(())
}
