//! Per-day price cache
//!
//! One JSON file per local date, holding the array of price points fetched for
//! that day. A file that cannot be read or does not describe its own date is
//! treated as absent; old files are evicted at the start of each fetch cycle.

use crate::config::CacheConfig;
use crate::error::{OctodashError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::tariff::types::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// File-backed cache keyed by local date
pub struct PriceCache {
    dir: PathBuf,
    prefix: String,
    logger: StructuredLogger,
}

impl PriceCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::in_dir(&config.dir, &config.file_prefix)
    }

    pub fn in_dir<P: AsRef<Path>>(dir: P, prefix: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            logger: get_logger("cache"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix>YYYY-MM-DD.json`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}{}.json",
            self.prefix,
            date.format(DATE_FORMAT)
        ))
    }

    /// Load the cached series for `date`; `Ok(None)` when no file exists
    pub fn load(&self, date: NaiveDate) -> Result<Option<PriceSeries>> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let series = parse_cache_document(&bytes, date)
            .map_err(|e| OctodashError::cache(format!("{}: {}", path.display(), e)))?;
        self.logger
            .debug(&format!("Loaded {} points from {}", series.len(), path.display()));
        Ok(Some(series))
    }

    /// Write `series` for `date`, replacing any previous file atomically
    pub fn store(&self, date: NaiveDate, series: &PriceSeries) -> Result<()> {
        if series.is_empty() {
            return Err(OctodashError::cache(format!(
                "Refusing to cache an empty series for {}",
                date
            )));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(series)?;
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        self.logger
            .debug(&format!("Cached {} points to {}", series.len(), path.display()));
        Ok(())
    }

    /// Delete cache files for dates strictly before `today`; returns the removed paths
    pub fn evict_before(&self, today: NaiveDate) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut removed = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(date) = self.date_of(&path) else {
                continue;
            };
            if date >= today {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    self.logger
                        .info(&format!("Removed stale cache file {}", path.display()));
                    removed.push(path);
                }
                Err(e) => self.logger.warn(&format!(
                    "Failed to remove stale cache file {}: {}",
                    path.display(),
                    e
                )),
            }
        }
        Ok(removed)
    }

    /// Date encoded in a cache file name, if the name matches this cache's pattern
    fn date_of(&self, path: &Path) -> Option<NaiveDate> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_prefix(&self.prefix)?.strip_suffix(".json")?;
        NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
    }
}

/// Parse and check a cache document for `date`.
///
/// Every point must carry `date`, a valid wall-clock slot and a timestamp whose
/// local date agrees; slots must be unique.
pub fn parse_cache_document(bytes: &[u8], date: NaiveDate) -> Result<PriceSeries> {
    let points: Vec<PricePoint> = serde_json::from_slice(bytes)?;
    let count = points.len();

    if let Some(bad) = points.iter().find(|p| {
        p.date != date
            || !p.is_on_grid()
            || !p.price.is_finite()
            || p.timestamp.date_naive() != p.date
    }) {
        return Err(OctodashError::cache(format!(
            "Point {:02}:{:02} on {} does not belong to {}",
            bad.hour, bad.minute, bad.date, date
        )));
    }

    let series = PriceSeries::from_points(points);
    if series.len() != count {
        return Err(OctodashError::cache(format!(
            "Duplicate slots in cache document for {}",
            date
        )));
    }
    Ok(series)
}
