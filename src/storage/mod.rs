//! CSV persistence of market snapshots.
//!
//! One row per saved [`MarketSummary`], stamped with an RFC 3339 UTC time.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::market::MarketSummary;

/// How `save` treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Add a row, writing the header only for a new file.
    #[default]
    Append,
    /// Replace the file with header + row.
    Overwrite,
}

/// One stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// When the snapshot was saved (RFC 3339).
    pub timestamp: String,
    /// Market ticker.
    pub ticker: String,
    /// Market title.
    pub title: Option<String>,
    /// Lifecycle status.
    pub status: Option<String>,
    /// Close time.
    pub closes: Option<String>,
    /// YES bid in cents.
    pub yes_bid: Option<u32>,
    /// YES ask in cents.
    pub yes_ask: Option<u32>,
    /// NO bid in cents.
    pub no_bid: Option<u32>,
    /// NO ask in cents.
    pub no_ask: Option<u32>,
    /// Midpoint P(YES).
    pub implied_p_yes: Option<Decimal>,
    /// 24h volume.
    pub volume_24h: Option<i64>,
    /// Open interest.
    pub open_interest: Option<i64>,
    /// Liquidity in dollars.
    pub liquidity: Option<Decimal>,
}

impl MarketSnapshot {
    /// Stamp a summary with `at`.
    pub fn new(summary: &MarketSummary, at: OffsetDateTime) -> Result<Self, StorageError> {
        let timestamp = at
            .format(&Rfc3339)
            .map_err(|e| StorageError::Timestamp(e.to_string()))?;

        Ok(Self {
            timestamp,
            ticker: summary.ticker.clone(),
            title: summary.title.clone(),
            status: summary.status.clone(),
            closes: summary.closes.clone(),
            yes_bid: summary.yes_bid,
            yes_ask: summary.yes_ask,
            no_bid: summary.no_bid,
            no_ask: summary.no_ask,
            implied_p_yes: summary.implied_p_yes.map(|p| p.value()),
            volume_24h: summary.volume_24h,
            open_interest: summary.open_interest,
            liquidity: summary.liquidity,
        })
    }

    /// Parsed timestamp.
    pub fn saved_at(&self) -> Result<OffsetDateTime, StorageError> {
        OffsetDateTime::parse(&self.timestamp, &Rfc3339)
            .map_err(|e| StorageError::Timestamp(format!("{}: {}", self.timestamp, e)))
    }
}

/// Snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a summary stamped with the current time.
    pub fn save(&self, summary: &MarketSummary, mode: WriteMode) -> Result<(), StorageError> {
        self.save_snapshot(&MarketSnapshot::new(summary, OffsetDateTime::now_utc())?, mode)
    }

    /// Write one snapshot row.
    pub fn save_snapshot(
        &self,
        snapshot: &MarketSnapshot,
        mode: WriteMode,
    ) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // An empty file still needs its header
        let has_rows = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() > 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        let append = mode == WriteMode::Append && has_rows;
        let file = if append {
            OpenOptions::new().append(true).open(&self.path)?
        } else {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!append)
            .from_writer(file);
        writer.serialize(snapshot)?;
        writer.flush()?;

        info!(path = %self.path.display(), ticker = %snapshot.ticker, "Saved market snapshot");
        Ok(())
    }

    /// All stored snapshots, or `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<Vec<MarketSnapshot>>, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No snapshot file");
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let snapshots = reader
            .deserialize()
            .collect::<Result<Vec<MarketSnapshot>, csv::Error>>()?;
        Ok(Some(snapshots))
    }

    /// Most recent snapshot for `ticker`.
    pub fn latest(&self, ticker: &str) -> Result<Option<MarketSnapshot>, StorageError> {
        let Some(snapshots) = self.load()? else {
            return Ok(None);
        };

        let mut latest: Option<(OffsetDateTime, MarketSnapshot)> = None;
        for snapshot in snapshots.into_iter().filter(|s| s.ticker == ticker) {
            let saved_at = snapshot.saved_at()?;
            if latest.as_ref().map_or(true, |(best, _)| saved_at > *best) {
                latest = Some((saved_at, snapshot));
            }
        }

        Ok(latest.map(|(_, snapshot)| snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Market;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    fn summary(ticker: &str, yes_bid: u32) -> MarketSummary {
        MarketSummary::from_market(&Market {
            ticker: ticker.to_string(),
            title: Some("Title, with comma".to_string()),
            yes_bid: Some(yes_bid),
            yes_ask: Some(yes_bid + 2),
            liquidity_dollars: Some(dec!(10.5)),
            ..Default::default()
        })
    }

    fn snapshot(ticker: &str, yes_bid: u32, at: OffsetDateTime) -> MarketSnapshot {
        MarketSnapshot::new(&summary(ticker, yes_bid), at).unwrap()
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("markets.csv"));
        assert!(store.load().unwrap().is_none());
        assert!(store.latest("KXA").unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_and_round_trips_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("data").join("markets.csv"));

        store.save(&summary("KXA-26", 40), WriteMode::Append).unwrap();

        let rows = store.load().unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "KXA-26");
        assert_eq!(rows[0].title.as_deref(), Some("Title, with comma"));
        assert_eq!(rows[0].implied_p_yes, Some(dec!(0.41)));
        assert_eq!(rows[0].no_bid, None);
        assert_eq!(rows[0].liquidity, Some(dec!(10.5)));
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("markets.csv"));

        store.save(&summary("KXA-26", 40), WriteMode::Append).unwrap();
        store.save(&summary("KXB-26", 60), WriteMode::Append).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.matches("timestamp,ticker").count(), 1);
        assert_eq!(store.load().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn append_to_empty_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("markets.csv"));
        fs::write(store.path(), "").unwrap();

        store.save(&summary("KXA-26", 40), WriteMode::Append).unwrap();

        let rows = store.load().unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(store.latest("KXA-26").unwrap().unwrap().yes_bid, Some(40));
    }

    #[test]
    fn overwrite_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("markets.csv"));

        store.save(&summary("KXA-26", 40), WriteMode::Append).unwrap();
        store.save(&summary("KXB-26", 60), WriteMode::Overwrite).unwrap();

        let rows = store.load().unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "KXB-26");
    }

    #[test]
    fn latest_picks_most_recent_for_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("markets.csv"));

        let rows = [
            snapshot("KXA-26", 40, datetime!(2026-10-01 12:00 UTC)),
            snapshot("KXA-26", 55, datetime!(2026-10-03 12:00 UTC)),
            snapshot("KXB-26", 70, datetime!(2026-10-05 12:00 UTC)),
            snapshot("KXA-26", 48, datetime!(2026-10-02 12:00 UTC)),
        ];
        for row in &rows {
            store.save_snapshot(row, WriteMode::Append).unwrap();
        }

        let latest = store.latest("KXA-26").unwrap().unwrap();
        assert_eq!(latest.yes_bid, Some(55));
        assert!(store.latest("KXC-26").unwrap().is_none());
    }
}
