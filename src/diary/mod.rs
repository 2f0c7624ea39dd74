//! Diary store: one JSON document per calendar day.
//!
//! Each day lives at `<dir>/YYYY-MM-DD.json` and holds a JSON array of
//! [`DiaryEntry`] values in insertion order. Files are created lazily on the
//! first entry and rewritten whole on every append (write to `*.json.tmp`,
//! then rename), so a crash mid-write never truncates an existing day.
//!
//! Reads go through [`DiaryScan`], a lazy iterator that visits day files in
//! date order. Corrupt files are skipped with a warning during scans; a direct
//! [`DiaryStore::load_day`] reports them as [`Error::Corrupt`].
//!
//! Appends within one process are serialized. Two processes appending to the
//! same day can still lose an entry.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time;

/// A single free-text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// `YYYY-MM-DD HH:MM:SS`, local time.
    pub datetime: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl DiaryEntry {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }

    fn mentions(&self, needle_lower: &str) -> bool {
        self.content.to_lowercase().contains(needle_lower)
    }
}

/// Every entry recorded for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaryDay {
    pub date: NaiveDate,
    pub entries: Vec<DiaryEntry>,
}

#[derive(Debug)]
pub struct DiaryStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DiaryStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        tracing::info!(dir = %dir.display(), "diary store ready");
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append an entry to `date`, stamped with the current local time of day.
    pub fn append(&self, date: NaiveDate, content: &str, tags: Vec<String>) -> Result<DiaryEntry> {
        let at = date.and_time(time::now().time());
        self.append_at(at, content, tags)
    }

    /// Append an entry with an explicit timestamp; the file is chosen by the
    /// timestamp's date.
    pub fn append_at(
        &self,
        datetime: NaiveDateTime,
        content: &str,
        tags: Vec<String>,
    ) -> Result<DiaryEntry> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::validation("diary content must not be empty"));
        }

        let tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let entry = DiaryEntry {
            datetime: time::format_datetime(datetime),
            content: content.to_string(),
            tags: (!tags.is_empty()).then_some(tags),
        };

        let date = datetime.date();
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = match self.load_day(date)? {
            Some(day) => day.entries,
            None => Vec::new(),
        };
        entries.push(entry.clone());
        self.write_day(date, &entries)?;

        tracing::debug!(%date, entries = entries.len(), "diary entry appended");
        Ok(entry)
    }

    /// Load one day. `Ok(None)` when nothing was ever written for `date`.
    pub fn load_day(&self, date: NaiveDate) -> Result<Option<DiaryDay>> {
        let path = self.day_path(date);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };

        let entries: Vec<DiaryEntry> =
            serde_json::from_slice(&bytes).map_err(|e| Error::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Some(DiaryDay { date, entries }))
    }

    /// Number of entries recorded on `date`.
    pub fn entry_count(&self, date: NaiveDate) -> Result<usize> {
        Ok(self.load_day(date)?.map_or(0, |day| day.entries.len()))
    }

    /// Entries whose content contains `keyword` (case-insensitive), restricted
    /// to the optional inclusive date range.
    pub fn search(
        &self,
        keyword: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DiaryScan> {
        let mut scan = self.scan(start, end)?;
        scan.keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);
        Ok(scan)
    }

    /// Every entry within the inclusive date range.
    pub fn read_range(&self, start: NaiveDate, end: NaiveDate) -> Result<DiaryScan> {
        self.scan(Some(start), Some(end))
    }

    fn scan(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DiaryScan> {
        let read_dir = std::fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let mut dates: Vec<NaiveDate> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| date_from_file_name(&entry.path()))
            .filter(|d| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
            .collect();
        dates.sort_unstable();
        dates.dedup();

        Ok(DiaryScan {
            dir: self.dir.clone(),
            dates: dates.into(),
            day_pos: 0,
            current: None,
            keyword: None,
            tag: None,
        })
    }

    fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", time::format_date(date)))
    }

    fn write_day(&self, date: NaiveDate, entries: &[DiaryEntry]) -> Result<()> {
        let path = self.day_path(date);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| Error::io(&tmp, std::io::Error::other(e)))?;
        std::fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
        Ok(())
    }
}

/// `2024-01-15.json` → 2024-01-15. Temp files and strays are ignored.
fn date_from_file_name(path: &Path) -> Option<NaiveDate> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    time::parse_date(stem).ok()
}

/// Lazy iterator over `(date, entry)` pairs in date order, then entry order.
///
/// Day files are read one at a time as the iterator advances. Cloning yields
/// an independent scan that restarts from the same position.
#[derive(Debug, Clone)]
pub struct DiaryScan {
    dir: PathBuf,
    dates: Arc<[NaiveDate]>,
    day_pos: usize,
    current: Option<(NaiveDate, std::vec::IntoIter<DiaryEntry>)>,
    keyword: Option<String>,
    tag: Option<String>,
}

impl DiaryScan {
    /// Keep only entries carrying `tag` (case-insensitive).
    pub fn with_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim();
        self.tag = (!tag.is_empty()).then(|| tag.to_string());
        self
    }

    fn load_next_day(&mut self) -> Option<(NaiveDate, Vec<DiaryEntry>)> {
        while let Some(&date) = self.dates.get(self.day_pos) {
            self.day_pos += 1;
            let path = self.dir.join(format!("{}.json", time::format_date(date)));

            let parsed = std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    serde_json::from_slice::<Vec<DiaryEntry>>(&bytes).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(entries) => return Some((date, entries)),
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipping unreadable diary file");
                }
            }
        }
        None
    }
}

impl Iterator for DiaryScan {
    type Item = (NaiveDate, DiaryEntry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((date, entries)) = self.current.as_mut() {
                let date = *date;
                // Field-level borrows: `current` is held mutably while the filters are read.
                for entry in entries.by_ref() {
                    if self.keyword.as_deref().is_none_or(|k| entry.mentions(k))
                        && self.tag.as_deref().is_none_or(|t| entry.has_tag(t))
                    {
                        return Some((date, entry));
                    }
                }
            }
            let (date, entries) = self.load_next_day()?;
            self.current = Some((date, entries.into_iter()));
        }
    }
}
