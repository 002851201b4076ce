use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{MeetRef, SwimmerIdentity};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "swim_splits";
const SWIMMER_IDS_FILE: &str = "swimmer_ids.json";
const MEET_IDS_FILE: &str = "meet_ids.json";
const MEET_RESULTS_FILE: &str = "meet_results.json";

#[derive(Debug, Deserialize)]
struct CacheFile<T> {
    version: u32,
    entries: BTreeMap<String, T>,
}

/// The three identity lookups that are expensive to repeat: Tempus swimmer
/// ids, LiveTiming meets by Tempus meet name, and the flattened result rows
/// of each LiveTiming meet.
///
/// Entries are only ever added. Nothing is written to disk until [`save`]
/// is called.
///
/// [`save`]: IdentityCaches::save
#[derive(Debug, Default)]
pub struct IdentityCaches {
    swimmer_ids: BTreeMap<String, String>,
    meets: BTreeMap<String, MeetRef>,
    meet_results: BTreeMap<String, Vec<String>>,
    dirty: bool,
}

impl IdentityCaches {
    /// Load all three cache files from `dir`. Missing, corrupt or outdated
    /// files start out empty.
    pub fn load(dir: &Path) -> Self {
        let caches = Self {
            swimmer_ids: load_cache_file(&dir.join(SWIMMER_IDS_FILE)),
            meets: load_cache_file(&dir.join(MEET_IDS_FILE)),
            meet_results: load_cache_file(&dir.join(MEET_RESULTS_FILE)),
            dirty: false,
        };
        info!(
            swimmers = caches.swimmer_ids.len(),
            meets = caches.meets.len(),
            results = caches.meet_results.len(),
            dir = %dir.display(),
            "loaded caches"
        );
        caches
    }

    /// Flush all three caches to `dir`. A no-op when nothing was added since
    /// loading.
    pub fn save(&mut self, dir: &Path) -> Result<()> {
        if !self.dirty {
            debug!("caches unchanged, skipping save");
            return Ok(());
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("create cache dir {}", dir.display()))?;
        save_cache_file(&dir.join(SWIMMER_IDS_FILE), &self.swimmer_ids)?;
        save_cache_file(&dir.join(MEET_IDS_FILE), &self.meets)?;
        save_cache_file(&dir.join(MEET_RESULTS_FILE), &self.meet_results)?;
        self.dirty = false;
        Ok(())
    }

    pub fn swimmer_id(&self, swimmer: &SwimmerIdentity) -> Option<&str> {
        self.swimmer_ids.get(&swimmer.cache_key()).map(String::as_str)
    }

    pub fn insert_swimmer_id(&mut self, swimmer: &SwimmerIdentity, id: &str) {
        self.swimmer_ids.insert(swimmer.cache_key(), id.to_string());
        self.dirty = true;
    }

    pub fn meet(&self, meet_name: &str) -> Option<&MeetRef> {
        self.meets.get(meet_name)
    }

    pub fn insert_meet(&mut self, meet_name: &str, meet: MeetRef) {
        self.meets.insert(meet_name.to_string(), meet);
        self.dirty = true;
    }

    pub fn meet_results(&self, meet_id: &str) -> Option<&[String]> {
        self.meet_results.get(meet_id).map(Vec::as_slice)
    }

    pub fn insert_meet_results(&mut self, meet_id: &str, rows: Vec<String>) {
        self.meet_results.insert(meet_id.to_string(), rows);
        self.dirty = true;
    }
}

/// `$XDG_CACHE_HOME/swim_splits`, falling back to `~/.cache/swim_splits`.
pub fn default_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn load_cache_file<T: DeserializeOwned>(path: &Path) -> BTreeMap<String, T> {
    let Ok(raw) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    let cache = match serde_json::from_str::<CacheFile<T>>(&raw) {
        Ok(cache) => cache,
        Err(err) => {
            debug!(path = %path.display(), %err, "ignoring unreadable cache file");
            return BTreeMap::new();
        }
    };
    if cache.version != CACHE_VERSION {
        return BTreeMap::new();
    }
    cache.entries
}

fn save_cache_file<T: Serialize>(path: &Path, entries: &BTreeMap<String, T>) -> Result<()> {
    #[derive(Serialize)]
    struct CacheFileRef<'a, T> {
        version: u32,
        entries: &'a BTreeMap<String, T>,
    }

    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(&CacheFileRef {
        version: CACHE_VERSION,
        entries,
    })
    .context("serialize cache")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
