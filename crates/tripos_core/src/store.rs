//! Capacity-bounded store of shared itineraries.
//!
//! Records are keyed by a short random id. When an insert pushes the store
//! past its capacity the oldest record is evicted; an ordered index keyed by
//! `(created_at, sequence)` makes that a single pop instead of a sort.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::language::Language;

pub const DEFAULT_CAPACITY: usize = 50;
pub const ID_LEN: usize = 8;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// An itinerary as produced by the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub markdown: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedPlan {
    pub id: String,
    pub markdown: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub lang: Language,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

pub struct SharedPlanStore {
    plans: HashMap<String, SharedPlan>,
    by_age: BTreeMap<(i64, u64), String>,
    next_seq: u64,
    capacity: usize,
    directory: Option<PathBuf>,
}

impl SharedPlanStore {
    /// In-memory store.
    pub fn new(capacity: usize) -> Self {
        Self {
            plans: HashMap::new(),
            by_age: BTreeMap::new(),
            next_seq: 0,
            capacity: capacity.max(1),
            directory: None,
        }
    }

    /// Store backed by one `<id>.json` file per record in `dir`.
    ///
    /// Unreadable or malformed record files are skipped with a warning. If the
    /// directory holds more records than `capacity`, the oldest are evicted.
    pub fn open(dir: &Path, capacity: usize) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut loaded = Vec::new();
        let entries = fs::read_dir(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(plan) => loaded.push(plan),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping shared plan record"),
            }
        }
        loaded.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut store = Self::new(capacity);
        store.directory = Some(dir.to_path_buf());
        for plan in loaded {
            store.insert(plan)?;
        }
        debug!(dir = %dir.display(), records = store.len(), "opened shared plan store");
        Ok(store)
    }

    /// Save `plan` under a fresh id and return the id.
    pub fn save(&mut self, plan: &GeneratedPlan, lang: Language) -> Result<String> {
        let id = loop {
            let candidate = generate_id();
            if !self.plans.contains_key(&candidate) {
                break candidate;
            }
        };

        let shared = SharedPlan {
            id: id.clone(),
            markdown: plan.markdown.clone(),
            sources: plan.sources.clone(),
            lang,
            created_at: Utc::now().timestamp_millis(),
        };
        if let Some(dir) = &self.directory {
            write_record(dir, &shared)?;
        }
        self.insert(shared)?;
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&SharedPlan> {
        self.plans.get(id)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn insert(&mut self, plan: SharedPlan) -> Result<()> {
        let key = (plan.created_at, self.next_seq);
        self.next_seq += 1;
        self.by_age.insert(key, plan.id.clone());
        self.plans.insert(plan.id.clone(), plan);

        while self.plans.len() > self.capacity {
            let Some((_, oldest)) = self.by_age.pop_first() else {
                break;
            };
            self.plans.remove(&oldest);
            info!(id = %oldest, capacity = self.capacity, "evicted oldest shared plan");
            if let Some(dir) = &self.directory {
                let path = record_path(dir, &oldest);
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    // another handle on the same directory already evicted it
                    Err(err) if err.kind() == ErrorKind::NotFound => {
                        debug!(id = %oldest, "evicted record file already gone");
                    }
                    Err(source) => return Err(Error::Io { path, source }),
                }
            }
        }
        Ok(())
    }
}

/// `<origin>/?share=<id>&lang=<code>`
pub fn share_url(origin: &str, id: &str, lang: Language) -> String {
    format!(
        "{}/?share={}&lang={}",
        origin.trim_end_matches('/'),
        urlencoding::encode(id),
        urlencoding::encode(lang.code())
    )
}

fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
}

fn read_record(path: &Path) -> Result<SharedPlan> {
    let raw = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_record(dir: &Path, plan: &SharedPlan) -> Result<()> {
    let path = record_path(dir, &plan.id);
    fs::write(&path, serde_json::to_string_pretty(plan)?).map_err(|source| Error::Io { path, source })
}
