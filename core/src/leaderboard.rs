use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScoreEntry {
    pub player_name: String,
    pub score: i32,
}

impl PlayerScoreEntry {
    pub fn new(player_name: impl Into<String>, score: i32) -> Self {
        Self {
            player_name: player_name.into(),
            score,
        }
    }
}

/// Top scores, best first, persisted in full after every change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<PlayerScoreEntry>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Leaderboard {
    pub const CAPACITY: usize = 3;
    pub const NAME_LENGTH: usize = 3;

    /// Table a fresh install starts with.
    pub fn defaults() -> Self {
        Self {
            entries: Vec::from([
                PlayerScoreEntry::new("AAA", 300),
                PlayerScoreEntry::new("BBB", 200),
                PlayerScoreEntry::new("CCC", 100),
            ]),
        }
    }

    /// Sorts descending by score, keeping the given order among ties, and drops entries past
    /// [`Self::CAPACITY`].
    pub fn from_entries(mut entries: Vec<PlayerScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(Self::CAPACITY);
        Self { entries }
    }

    /// Reads the persisted table.
    ///
    /// An absent table is seeded with [`Self::defaults`] and written back at once. A table that
    /// cannot be read or parsed falls back to the defaults without touching the store; the next
    /// [`Self::add_score`] replaces it.
    pub fn load<S: SnapshotStore + ?Sized>(store: &mut S) -> Self {
        match store.load::<Self>() {
            Ok(Some(board)) => {
                log::info!("leaderboard loaded from `{}`", Self::KEY);
                board
            }
            Ok(None) => {
                let board = Self::defaults();
                log::info!("no leaderboard at `{}`, seeding defaults", Self::KEY);
                if let Err(err) = store.save(&board) {
                    log::warn!("could not persist default leaderboard: {err}");
                }
                board
            }
            Err(err) => {
                log::warn!("leaderboard unreadable, using defaults: {err}");
                Self::defaults()
            }
        }
    }

    pub fn entries(&self) -> &[PlayerScoreEntry] {
        &self.entries
    }

    pub fn lowest_score(&self) -> Option<i32> {
        self.entries.last().map(|entry| entry.score)
    }

    /// Whether `score` would beat the lowest-ranked entry. An empty table accepts any score.
    pub fn is_high_score(&self, score: i32) -> bool {
        self.lowest_score().is_none_or(|lowest| score > lowest)
    }

    /// Inserts the entry below every entry scoring the same or higher, truncates and persists.
    ///
    /// Returns the zero-based rank of the new entry, or `None` if it fell off the table. When
    /// persisting fails the error is returned but the in-memory table keeps the change.
    pub fn add_score<S: SnapshotStore + ?Sized>(
        &mut self,
        store: &mut S,
        player_name: impl Into<String>,
        score: i32,
    ) -> core::result::Result<Option<usize>, StorageError> {
        let rank = self.entries.partition_point(|entry| entry.score >= score);
        self.entries
            .insert(rank, PlayerScoreEntry::new(player_name, score));
        self.entries.truncate(Self::CAPACITY);

        let rank = (rank < Self::CAPACITY).then_some(rank);
        log::debug!("score {score} ranked {rank:?}");

        store.save(self)?;
        Ok(rank)
    }
}

/// Cleans up a typed player name; `None` unless exactly [`Leaderboard::NAME_LENGTH`] characters
/// remain after trimming.
pub fn parse_player_name(input: &str) -> Option<String> {
    let name = input.trim();
    (name.chars().count() == Leaderboard::NAME_LENGTH).then(|| name.to_string())
}

impl StorageKey for Leaderboard {
    const KEY: &'static str = "Leaderboard.json";
}

impl Snapshot for Leaderboard {
    fn decode(text: &str) -> core::result::Result<Self, DocumentError> {
        parse_leaderboard(text).map(Self::from_entries)
    }

    fn encode(&self) -> core::result::Result<String, DocumentError> {
        leaderboard_to_json(&self.entries)
    }
}
