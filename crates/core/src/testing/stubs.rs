//! Deterministic stand-ins for the selector, clock and token provider.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::auth::{AuthError, TokenProvider};
use crate::clock::Clock;
use crate::selection::Selector;

/// Always picks the same index (wrapped into range).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSelector(pub usize);

impl Selector for FixedSelector {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Returns the given picks in order, then repeats the last one.
#[derive(Debug)]
pub struct SequenceSelector {
    picks: Vec<usize>,
    next: AtomicUsize,
}

impl SequenceSelector {
    pub fn new(picks: Vec<usize>) -> Self {
        Self {
            picks,
            next: AtomicUsize::new(0),
        }
    }

    /// Number of picks made so far.
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl Selector for SequenceSelector {
    fn pick(&self, len: usize) -> usize {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        let pick = self
            .picks
            .get(i)
            .or_else(|| self.picks.last())
            .copied()
            .unwrap_or(0);
        pick % len
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock at the given local date and time.
    ///
    /// Out-of-range times fall back to midnight; times skipped by a DST
    /// change are read as UTC.
    pub fn at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Self {
        let naive = date
            .and_hms_opt(hour, minute, second)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
        let now = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&naive));
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Token provider that hands out a fixed token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    fn kind(&self) -> &'static str {
        "static"
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}
