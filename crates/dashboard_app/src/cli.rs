use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dashboard_core::{JobOutcome, NovelId, UnitId, ViewKind};
use dashboard_engine::{DashboardApi, EngineHandle, ReqwestApi};
use dashboard_logging::{dash_info, dash_warn};

use crate::config::DashboardConfig;
use crate::platform::app::Dashboard;
use crate::platform::logging;
use crate::platform::render::Renderer;

#[derive(Parser, Debug)]
#[command(name = "novel-dashboard")]
#[command(about = "Start and follow novel translation jobs on a translation server")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config RON. If omitted, uses ./dashboard.ron if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Translation server root, e.g. http://127.0.0.1:5000.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub poll_period_ms: Option<u64>,

    /// Consecutive failed progress polls to tolerate.
    #[arg(long, global = true)]
    pub max_poll_failures: Option<u32>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the batches or chapters of a novel.
    List {
        #[arg(long)]
        novel: NovelId,
        #[arg(long, default_value = "batch")]
        view: ViewKind,
    },
    /// Translate the given units and follow the job until it ends.
    Translate {
        #[arg(long)]
        novel: NovelId,
        #[arg(long, default_value = "batch")]
        view: ViewKind,
        /// Comma separated unit ids.
        #[arg(long, value_delimiter = ',', required = true)]
        units: Vec<UnitId>,
        /// Target language; defaults to the configured one.
        #[arg(long)]
        lang: Option<String>,
    },
    /// Print the full text of one batch or chapter.
    Content {
        #[command(flatten)]
        target: ContentTarget,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ContentTarget {
    #[arg(long)]
    pub batch: Option<UnitId>,
    #[arg(long)]
    pub chapter: Option<UnitId>,
}

pub fn dispatch(args: Args) -> Result<()> {
    let mut config = DashboardConfig::load(args.config.as_deref())?;
    config.apply_overrides(&args);
    config.validate()?;
    logging::initialize(config.log_destination, config.level_filter()?);
    dash_info!("using translation server at {}", config.base_url);

    match args.cmd {
        Command::List { novel, view } => list(&config, novel, view),
        Command::Translate {
            novel,
            view,
            units,
            lang,
        } => translate(&config, novel, view, &units, lang.as_deref()),
        Command::Content { target } => content(&config, &target),
    }
}

fn dashboard(config: &DashboardConfig) -> Result<Dashboard<std::io::Stdout>> {
    let engine = EngineHandle::new(&config.api_settings()).context("starting engine")?;
    let mut dashboard = Dashboard::new(
        config.monitor_settings(),
        engine,
        Renderer::new(std::io::stdout()),
    );
    dashboard.set_target_language(&config.target_language)?;
    Ok(dashboard)
}

fn list(config: &DashboardConfig, novel: NovelId, view: ViewKind) -> Result<()> {
    let mut dashboard = dashboard(config)?;
    dashboard.open_novel(novel)?;
    dashboard.show_units(view)
}

fn translate(
    config: &DashboardConfig,
    novel: NovelId,
    view: ViewKind,
    units: &[UnitId],
    lang: Option<&str>,
) -> Result<()> {
    let mut dashboard = dashboard(config)?;
    if let Some(lang) = lang {
        dashboard.set_target_language(lang)?;
    }
    dashboard.open_novel(novel)?;
    match dashboard.translate(view, units)? {
        JobOutcome::Completed => Ok(()),
        JobOutcome::Cancelled => {
            dash_warn!("translation cancelled by operator");
            Ok(())
        }
        JobOutcome::Failed { detail } => bail!("translation failed: {detail}"),
        JobOutcome::PollFailed => bail!("lost track of the translation job"),
        JobOutcome::LaunchFailed => bail!("translation did not start"),
    }
}

fn content(config: &DashboardConfig, target: &ContentTarget) -> Result<()> {
    let api = ReqwestApi::new(&config.api_settings())?;
    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    let document = match (target.batch, target.chapter) {
        (Some(batch), _) => runtime
            .block_on(api.batch_content(batch))
            .context("Error loading batch content")?,
        (None, Some(chapter)) => runtime
            .block_on(api.chapter_content(chapter))
            .context("Error loading chapter content")?,
        (None, None) => bail!("pass --batch or --chapter"),
    };
    let mut renderer = Renderer::new(std::io::stdout());
    renderer.render_content(&document)?;
    Ok(())
}
