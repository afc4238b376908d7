use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use console::Term;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::board::{
    arrange, decode_results, HttpSource, PipelineResult, Poller, RefreshState, SnapshotSource,
    TokioClock, ViewState,
};
use crate::config::{Config, OutputFormat};
use crate::output::{board_table, render_board, LoadingSpinner};

#[derive(Parser)]
#[command(name = "pipeboard")]
#[command(author, version, about = "CD pipeline wall board", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./pipeboard.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the board and keep a live table on screen
    Watch {
        /// Board page URL; its query seeds the search
        #[arg(short, long, env = "PIPEBOARD_URL")]
        url: Option<String>,

        #[arg(short, long)]
        search: Option<String>,

        /// Delay between polls in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
    /// Fetch the board once and print it
    Snapshot {
        #[arg(short, long, env = "PIPEBOARD_URL")]
        url: Option<String>,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Print every row instead of the first page
        #[arg(short, long, default_value_t = false)]
        all: bool,
    },
    /// Show the view flags and share link derived from a board URL
    Link {
        #[arg(short, long, env = "PIPEBOARD_URL")]
        url: Option<String>,

        #[arg(short, long)]
        search: Option<String>,
    },
}

impl Cli {
    fn resolve_url(url: &Option<String>, config: &Config) -> Result<String> {
        url.clone()
            .or_else(|| config.board.url.clone())
            .context("No board URL given; pass --url or set board.url in the config file")
    }

    fn view_state(url: &str, search: &Option<String>, config: &Config) -> ViewState {
        ViewState::with_paging(url, config.board.initial_displayed, config.board.page_step)
            .with_search(search.clone())
    }

    async fn execute_watch(
        &self,
        config: &Config,
        url: &str,
        search: &Option<String>,
        interval_ms: Option<u64>,
    ) -> Result<()> {
        let mut view = Self::view_state(url, search, config);
        let source = HttpSource::new(
            url,
            Duration::from_secs(config.board.request_timeout_secs),
        )?;
        let interval = Duration::from_millis(interval_ms.unwrap_or(config.board.interval_ms));

        info!("Watching board at: {}", source.endpoint());
        let mut spinner = Some(LoadingSpinner::start(source.endpoint().as_str()));

        let (poller, mut rx) = Poller::new(Arc::new(source), Arc::new(TokioClock), interval);
        let cancel = CancellationToken::new();
        let poller_task = tokio::spawn(poller.run(cancel.clone()));

        let term = Term::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut state = RefreshState::default();
        let mut results: Vec<PipelineResult> = Vec::new();

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    state = rx.borrow_and_update().clone();
                    if state.stopped {
                        break;
                    }
                    if !state.loaded {
                        continue;
                    }
                    if let Some(spinner) = spinner.take() {
                        spinner.finish();
                    }
                    results = decode_results(&state.data).unwrap_or_else(|e| {
                        warn!("Ignoring snapshot: {e}");
                        Vec::new()
                    });
                    draw(&term, &view, &state, &results)?;
                }
                line = lines.next_line(), if stdin_open => {
                    match line? {
                        Some(_) => {
                            view.load_more();
                            if state.loaded {
                                draw(&term, &view, &state, &results)?;
                            }
                        }
                        None => stdin_open = false,
                    }
                }
                _ = &mut ctrl_c => {
                    info!("Interrupted, stopping poller");
                    break;
                }
            }
        }

        if let Some(spinner) = spinner.take() {
            spinner.finish();
        }
        cancel.cancel();
        poller_task.await.context("Poller task failed")?;

        Ok(())
    }

    async fn execute_snapshot(
        &self,
        config: &Config,
        url: &str,
        search: &Option<String>,
        format: Option<OutputFormat>,
        all: bool,
    ) -> Result<()> {
        let view = Self::view_state(url, search, config);
        let source = HttpSource::new(
            url,
            Duration::from_secs(config.board.request_timeout_secs),
        )?;

        info!("Fetching board snapshot from: {}", source.endpoint());
        let payload = source.fetch().await?;
        let results = decode_results(&payload)?;
        info!("Fetched {} pipeline results", results.len());

        let arranged = arrange(&results, &view);
        let rows = if all {
            &arranged[..]
        } else {
            view.visible(&arranged)
        };

        let rendered = match format.unwrap_or(config.output.format) {
            OutputFormat::Json if self.pretty || config.output.pretty => {
                serde_json::to_string_pretty(rows)?
            }
            OutputFormat::Json => serde_json::to_string(rows)?,
            OutputFormat::Table => board_table(rows, Utc::now()).to_string(),
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, rendered)?;
            info!("Snapshot written to: {}", output_path.display());
        } else {
            println!("{rendered}");
        }

        Ok(())
    }

    fn execute_link(url: &str, search: &Option<String>) {
        let view = ViewState::from_url(url).with_search(search.clone());

        println!("search bar:  {}", view.show_search_bar);
        println!("home button: {}", view.show_home_button);
        println!("search:      {}", view.search().unwrap_or("-"));
        println!("full url:    {}", view.full_url);
        println!("share link:  {}", view.share_link(view.search().unwrap_or("")));
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Watch {
                url,
                search,
                interval_ms,
            } => {
                let url = Self::resolve_url(url, &config)?;
                self.execute_watch(&config, &url, search, *interval_ms)
                    .await
            }
            Commands::Snapshot {
                url,
                search,
                format,
                all,
            } => {
                let url = Self::resolve_url(url, &config)?;
                self.execute_snapshot(&config, &url, search, *format, *all)
                    .await
            }
            Commands::Link { url, search } => {
                let url = Self::resolve_url(url, &config)?;
                Self::execute_link(&url, search);
                Ok(())
            }
        }
    }
}

fn draw(
    term: &Term,
    view: &ViewState,
    state: &RefreshState,
    results: &[PipelineResult],
) -> Result<()> {
    term.clear_screen()?;
    term.write_str(&render_board(view, state, results, Utc::now()))?;
    Ok(())
}
