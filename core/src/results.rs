use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Summary of one completed game.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub total_clicks: u32,
    /// Whole seconds, stored as a float like the files written by earlier versions
    pub total_time_seconds: f64,
    pub pairs_found: u32,
    pub score: i32,
}

impl GameResult {
    pub fn new(total_clicks: u32, elapsed: Duration, pairs_found: u32, score: i32) -> Self {
        Self {
            total_clicks,
            total_time_seconds: elapsed.as_secs() as f64,
            pairs_found,
            score,
        }
    }
}

/// Append-only history of completed games.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultLog {
    results: Vec<GameResult>,
}

impl ResultLog {
    pub fn new(results: Vec<GameResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[GameResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Reads the stored log; an absent log is empty.
    pub fn load<S: SnapshotStore + ?Sized>(store: &S) -> core::result::Result<Self, StorageError> {
        Ok(store.load::<Self>()?.unwrap_or_default())
    }

    /// Adds one record to the stored log and returns the new record count.
    ///
    /// A log that exists but cannot be parsed is left untouched and reported as an error.
    pub fn append<S: SnapshotStore + ?Sized>(
        store: &mut S,
        result: GameResult,
    ) -> core::result::Result<usize, StorageError> {
        let mut log = Self::load(store)?;
        log.results.push(result);
        store.save(&log)?;
        log::info!("result saved to `{}` ({} records)", Self::KEY, log.len());
        Ok(log.len())
    }
}

impl StorageKey for ResultLog {
    const KEY: &'static str = "game_results.json";
}

impl Snapshot for ResultLog {
    fn decode(text: &str) -> core::result::Result<Self, DocumentError> {
        parse_results(text).map(Self::new)
    }

    fn encode(&self) -> core::result::Result<String, DocumentError> {
        results_to_json(&self.results)
    }
}
