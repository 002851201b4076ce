use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swim_splits::caches::IdentityCaches;
use swim_splits::config::{Args, CacheMode, Config, Mode};
use swim_splits::http_client::HttpSource;
use swim_splits::model::SessionResults;
use swim_splits::pipeline::Resolver;
use swim_splits::progress::Progress;
use swim_splits::render::render_page;
use swim_splits::session::SessionCrawler;

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    let started = Instant::now();

    let session = match &config.mode {
        Mode::Retrieve { session_url } => {
            let session = retrieve(&config, session_url)?;
            let json = serde_json::to_string_pretty(&session).context("serialize session data")?;
            fs::create_dir_all(&config.out_dir)
                .with_context(|| format!("create {}", config.out_dir.display()))?;
            let path = config.session_data_path();
            fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
            session
        }
        Mode::RenderOnly => {
            let path = config.session_data_path();
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?
        }
    };

    let page = config.page_path();
    fs::write(&page, render_page(&session)).with_context(|| format!("write {}", page.display()))?;
    info!(page = %page.display(), "page written");
    println!("Done in {:.1}s. Open {} in a browser.", started.elapsed().as_secs_f64(), page.display());
    Ok(())
}

fn retrieve(config: &Config, session_url: &str) -> Result<SessionResults> {
    let mut caches = IdentityCaches::load(&config.cache_dir);
    let source = HttpSource;
    let progress = Progress::new(0);

    let session = {
        let mut resolver = Resolver::new(&source, &config.sites, &mut caches);
        let crawler = SessionCrawler::new(&source, &config.sites, config.heats);
        crawler.crawl(session_url, &mut resolver, &progress)
    };
    progress.finish();

    // Flushed even when the crawl failed.
    if config.cache_mode == CacheMode::ReadWrite {
        caches.save(&config.cache_dir).context("save caches")?;
    }
    session
}
