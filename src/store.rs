//! Local cache of downloaded statistics.
//!
//! Snapshots are stored as `{YYYY}-{MM}-{format}-{rating}.json`, optionally
//! gzip-compressed with a trailing `.gz`. Reads fall back transparently from
//! the plain file to the compressed one.

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::parser::{
    NameTable, ReferenceSpecies, UsageSnapshot, parse_name_table, parse_pokedex,
    parse_usage_snapshot,
};

pub const POKEDEX_FILE: &str = "pokedex.json";
pub const FORMAT_NAMES_FILE: &str = "meta_names.json";

/// A calendar month of published statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatsMonth {
    pub year: i32,
    pub month: u32,
}

impl StatsMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The most recent month whose statistics can be complete on `today`.
    pub fn last_complete(today: NaiveDate) -> Self {
        Self::new(today.year(), today.month()).previous()
    }
}

impl fmt::Display for StatsMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Identity of a cached snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub month: StatsMonth,
    pub format: String,
    pub rating: u32,
}

impl SnapshotFile {
    pub fn new(month: StatsMonth, format: &str, rating: u32) -> Self {
        Self {
            month,
            format: format.to_string(),
            rating,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}-{}-{}.json", self.month, self.format, self.rating)
    }

    /// Parses a cache file name; returns `None` for anything that is not a
    /// dated snapshot (dex files, name tables, stray files).
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_suffix(".json.gz")
            .or_else(|| file_name.strip_suffix(".json"))?;
        let mut parts = stem.splitn(3, '-');
        let year = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let (format, rating) = parts.next()?.rsplit_once('-')?;
        if format.is_empty() {
            return None;
        }
        Some(Self {
            month: StatsMonth::new(year, month),
            format: format.to_string(),
            rating: rating.parse().ok()?,
        })
    }
}

/// A usage snapshot read from the cache.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub month: StatsMonth,
    /// True when the last complete month was missing and an older one was used.
    pub stale: bool,
    pub snapshot: UsageSnapshot,
}

/// File-system cache rooted at a data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    fn gz_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(format!("{file_name}.gz"))
    }

    /// True if the file is cached either plain or compressed.
    pub fn contains(&self, file_name: &str) -> bool {
        self.path(file_name).exists() || self.gz_path(file_name).exists()
    }

    /// Reads a cached file, decompressing the `.gz` variant if that is the
    /// one present.
    pub fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        let plain = self.path(file_name);
        if plain.exists() {
            let bytes = fs::read(&plain).with_context(|| format!("reading {}", plain.display()))?;
            return Ok(Some(bytes));
        }

        let compressed = self.gz_path(file_name);
        if compressed.exists() {
            let file = fs::File::open(&compressed)
                .with_context(|| format!("opening {}", compressed.display()))?;
            let mut bytes = Vec::new();
            GzDecoder::new(file)
                .read_to_end(&mut bytes)
                .with_context(|| format!("decompressing {}", compressed.display()))?;
            return Ok(Some(bytes));
        }

        Ok(None)
    }

    /// Writes a file into the cache, gzip-compressing it when asked.
    pub fn write(&self, file_name: &str, contents: &[u8], gzip: bool) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;

        let (path, body) = if gzip {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(contents)?;
            (self.gz_path(file_name), encoder.finish()?)
        } else {
            (self.path(file_name), contents.to_vec())
        };

        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;

        // Reads prefer the plain file, so never leave an outdated sibling behind.
        let sibling = if gzip {
            self.path(file_name)
        } else {
            self.gz_path(file_name)
        };
        if sibling.exists() {
            fs::remove_file(&sibling)?;
        }

        debug!(path = %path.display(), gzip, "Cached file written");
        Ok(path)
    }

    /// Loads the usage snapshot for the last complete month before `today`,
    /// falling back one month with a warning.
    pub fn load_usage(
        &self,
        format: &str,
        rating: u32,
        today: NaiveDate,
    ) -> Result<Option<LoadedSnapshot>> {
        let current = StatsMonth::last_complete(today);

        for (month, stale) in [(current, false), (current.previous(), true)] {
            let file = SnapshotFile::new(month, format, rating);
            let Some(bytes) = self.read(&file.file_name())? else {
                continue;
            };

            let snapshot = parse_usage_snapshot(&bytes)
                .with_context(|| format!("parsing snapshot {}", file.file_name()))?;
            if stale {
                warn!(
                    format,
                    rating,
                    month = %month,
                    expected = %current,
                    "Using outdated statistics data"
                );
            }
            return Ok(Some(LoadedSnapshot {
                month,
                stale,
                snapshot,
            }));
        }

        Ok(None)
    }

    pub fn load_reference(&self) -> Result<ReferenceSpecies> {
        match self.read(POKEDEX_FILE)? {
            Some(bytes) => parse_pokedex(&bytes).context("parsing pokedex"),
            None => bail!(
                "{POKEDEX_FILE} not found in {}; run the update command first",
                self.data_dir.display()
            ),
        }
    }

    /// Loads a name table, treating a missing file as empty.
    pub fn load_name_table(&self, file_name: &str) -> Result<NameTable> {
        match self.read(file_name)? {
            Some(bytes) => {
                parse_name_table(&bytes).with_context(|| format!("parsing {file_name}"))
            }
            None => Ok(NameTable::new()),
        }
    }

    fn snapshot_files(&self) -> Result<Vec<(SnapshotFile, PathBuf)>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if let Some(file) = entry.file_name().to_str().and_then(SnapshotFile::parse) {
                files.push((file, entry.path()));
            }
        }
        Ok(files)
    }

    /// Snapshots [`load_usage`](Self::load_usage) can reach on `today`.
    fn loadable_files(&self, today: NaiveDate) -> Result<impl Iterator<Item = SnapshotFile>> {
        let current = StatsMonth::last_complete(today);
        let fallback = current.previous();
        Ok(self
            .snapshot_files()?
            .into_iter()
            .map(|(file, _)| file)
            .filter(move |f| f.month == current || f.month == fallback))
    }

    /// Formats that have an unfiltered (rating 0) snapshot loadable on
    /// `today`, sorted by code.
    pub fn available_formats(&self, today: NaiveDate) -> Result<Vec<String>> {
        let formats: BTreeSet<String> = self
            .loadable_files(today)?
            .filter(|f| f.rating == 0)
            .map(|f| f.format)
            .collect();
        Ok(formats.into_iter().collect())
    }

    /// Rating cutoffs loadable on `today` for `format`, ascending.
    pub fn available_ratings(&self, format: &str, today: NaiveDate) -> Result<Vec<u32>> {
        let ratings: BTreeSet<u32> = self
            .loadable_files(today)?
            .filter(|f| f.format == format)
            .map(|f| f.rating)
            .collect();
        Ok(ratings.into_iter().collect())
    }

    /// Deletes every cached snapshot from a month before `keep`.
    ///
    /// Returns the number of files removed.
    pub fn prune_before(&self, keep: StatsMonth) -> Result<usize> {
        let mut removed = 0;
        for (file, path) in self.snapshot_files()? {
            if file.month >= keep {
                continue;
            }
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            debug!(path = %path.display(), "Outdated snapshot removed");
            removed += 1;
        }
        Ok(removed)
    }
}
