use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::caches::default_cache_dir;
use crate::livetiming::{LIVETIMING_BASE_URL, LiveTiming};
use crate::pipeline::Sites;
use crate::tempus::{TEMPUS_BASE_URL, Tempus};

pub const SESSION_DATA_FILE: &str = "session_data.json";
pub const PAGE_FILE: &str = "index.html";
const DEFAULT_HEATS: u32 = 100;

/// Personal-best splits for every swimmer of an upcoming LiveTiming session.
#[derive(Parser, Debug)]
#[command(name = "swim_splits", version)]
pub struct Args {
    /// LiveTiming session page, e.g. https://www.livetiming.se/program.php?cid=8051&session=1
    #[arg(long, env = "SESSION_URL")]
    pub session_url: Option<String>,

    /// Number of heats per event to look up, counted from the last heat
    #[arg(long, env = "NUM_HEATS", default_value_t = DEFAULT_HEATS)]
    pub heats: u32,

    /// Skip retrieval and re-render the page from the saved session data
    #[arg(long)]
    pub render_only: bool,

    /// Use the caches but never write them back
    #[arg(long)]
    pub read_only_cache: bool,

    #[arg(long, env = "SWIM_SPLITS_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Where session_data.json and index.html are written
    #[arg(long, env = "SWIM_SPLITS_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long, env = "TEMPUS_BASE_URL", default_value = TEMPUS_BASE_URL, hide = true)]
    pub tempus_base_url: String,

    #[arg(long, env = "LIVETIMING_BASE_URL", default_value = LIVETIMING_BASE_URL, hide = true)]
    pub livetiming_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Retrieve { session_url: String },
    RenderOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    ReadWrite,
    /// Load the caches, never flush them.
    ReadOnly,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub heats: u32,
    pub cache_mode: CacheMode,
    pub cache_dir: PathBuf,
    pub out_dir: PathBuf,
    pub sites: Sites,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let mode = if args.render_only {
            Mode::RenderOnly
        } else {
            match args.session_url.map(|s| s.trim().to_string()) {
                Some(url) if !url.is_empty() => Mode::Retrieve { session_url: url },
                _ => bail!("a session url is required (--session-url or SESSION_URL)"),
            }
        };
        let cache_dir = match args.cache_dir {
            Some(dir) => dir,
            None => default_cache_dir()
                .context("no cache directory; set --cache-dir or SWIM_SPLITS_CACHE_DIR")?,
        };
        let cache_mode = if args.read_only_cache {
            CacheMode::ReadOnly
        } else {
            CacheMode::ReadWrite
        };
        let sites = Sites {
            tempus: Tempus::new(&args.tempus_base_url)?,
            livetiming: LiveTiming::new(&args.livetiming_base_url)?,
        };
        Ok(Self {
            mode,
            heats: args.heats.max(1),
            cache_mode,
            cache_dir,
            out_dir: args.out_dir,
            sites,
        })
    }

    pub fn session_data_path(&self) -> PathBuf {
        self.out_dir.join(SESSION_DATA_FILE)
    }

    pub fn page_path(&self) -> PathBuf {
        self.out_dir.join(PAGE_FILE)
    }
}
