//! In-memory ledger store for testing.

use std::sync::Mutex;

use crate::ledger::{DailyCounter, LedgerError, LedgerStore, ProcessedSet, UploadHistory};

/// Which record a store operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerRecord {
    Processed,
    History,
    DailyCounter,
}

#[derive(Debug, Default)]
struct State {
    processed: Option<ProcessedSet>,
    history: Option<UploadHistory>,
    counter: Option<DailyCounter>,
    saves: Vec<LedgerRecord>,
    fail_load: Option<LedgerRecord>,
    fail_save: Option<LedgerRecord>,
}

/// LedgerStore that keeps the three records in memory.
///
/// Saves are recorded in order so tests can assert on bookkeeping order.
/// Failures can be injected per record.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: Mutex<State>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_processed(processed: ProcessedSet) -> Self {
        let store = Self::new();
        store.lock().processed = Some(processed);
        store
    }

    pub fn set_history(&self, history: UploadHistory) {
        self.lock().history = Some(history);
    }

    pub fn set_daily_counter(&self, counter: DailyCounter) {
        self.lock().counter = Some(counter);
    }

    /// Processed set as last saved (empty if never saved).
    pub fn processed(&self) -> ProcessedSet {
        self.lock().processed.clone().unwrap_or_default()
    }

    pub fn history(&self) -> UploadHistory {
        self.lock().history.clone().unwrap_or_default()
    }

    pub fn daily_counter(&self) -> Option<DailyCounter> {
        self.lock().counter
    }

    /// Records saved so far, in call order.
    pub fn saves(&self) -> Vec<LedgerRecord> {
        self.lock().saves.clone()
    }

    /// Make every load of `record` fail until cleared.
    pub fn fail_loads_of(&self, record: LedgerRecord) {
        self.lock().fail_load = Some(record);
    }

    /// Make the next save of `record` fail.
    pub fn fail_next_save_of(&self, record: LedgerRecord) {
        self.lock().fail_save = Some(record);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_load(state: &State, record: LedgerRecord) -> Result<(), LedgerError> {
        if state.fail_load == Some(record) {
            return Err(LedgerError::Unavailable(format!("{:?} load failed", record)));
        }
        Ok(())
    }

    fn check_save(state: &mut State, record: LedgerRecord) -> Result<(), LedgerError> {
        if state.fail_save == Some(record) {
            state.fail_save = None;
            return Err(LedgerError::Unavailable(format!("{:?} save failed", record)));
        }
        state.saves.push(record);
        Ok(())
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load_processed(&self) -> Result<ProcessedSet, LedgerError> {
        let state = self.lock();
        Self::check_load(&state, LedgerRecord::Processed)?;
        Ok(state.processed.clone().unwrap_or_default())
    }

    fn save_processed(&self, processed: &ProcessedSet) -> Result<(), LedgerError> {
        let mut state = self.lock();
        Self::check_save(&mut state, LedgerRecord::Processed)?;
        state.processed = Some(processed.clone());
        Ok(())
    }

    fn load_history(&self) -> Result<UploadHistory, LedgerError> {
        let state = self.lock();
        Self::check_load(&state, LedgerRecord::History)?;
        Ok(state.history.clone().unwrap_or_default())
    }

    fn save_history(&self, history: &UploadHistory) -> Result<(), LedgerError> {
        let mut state = self.lock();
        Self::check_save(&mut state, LedgerRecord::History)?;
        state.history = Some(history.clone());
        Ok(())
    }

    fn load_daily_counter(&self) -> Result<Option<DailyCounter>, LedgerError> {
        let state = self.lock();
        Self::check_load(&state, LedgerRecord::DailyCounter)?;
        Ok(state.counter)
    }

    fn save_daily_counter(&self, counter: &DailyCounter) -> Result<(), LedgerError> {
        let mut state = self.lock();
        Self::check_save(&mut state, LedgerRecord::DailyCounter)?;
        state.counter = Some(*counter);
        Ok(())
    }
}
