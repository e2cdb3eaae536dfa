use alloc::string::String;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Inputs a host feeds into a running session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostInput {
    Select(TileId),
    SelectAt { row: Coord, col: Coord },
    /// Time passed since the previous tick
    Tick(Duration),
    Restart,
}

/// One-shot cues for sound and particles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    TileFlip(TileId),
    MatchSuccess { first: TileId, second: TileId },
    MatchFailure { first: TileId, second: TileId },
    GameEnd,
}

/// Counters shown while playing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_clicks: u32,
    pub pairs_found: u32,
    pub total_pairs: usize,
    pub elapsed: Duration,
}

/// Host side of a [`GameSession`]: everything the player sees or is asked.
pub trait Presenter {
    fn tile_changed(&mut self, id: TileId, visual: TileVisual);

    fn effect(&mut self, _effect: Effect) {}

    fn stats_changed(&mut self, _stats: &SessionStats) {}

    fn game_finished(&mut self, result: &GameResult, high_score: bool);

    /// Blocks until the player answers; `None` means they declined.
    fn request_player_name(&mut self, score: i32) -> Option<String>;

    fn leaderboard_changed(&mut self, _entries: &[PlayerScoreEntry]) {}
}

/// Owns one game from grid load to leaderboard entry.
#[derive(Clone, Debug)]
pub struct GameSession<S: SnapshotStore> {
    engine: MatchEngine,
    leaderboard: Leaderboard,
    store: S,
}

impl<S: SnapshotStore> GameSession<S> {
    pub fn new(grid: ValidGrid, timing: EngineTiming, mut store: S) -> Self {
        let leaderboard = Leaderboard::load(&mut store);
        Self {
            engine: MatchEngine::with_timing(grid, timing),
            leaderboard,
            store,
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_clicks: self.engine.total_clicks(),
            pairs_found: self.engine.pairs_found(),
            total_pairs: self.engine.total_pairs(),
            elapsed: self.engine.elapsed(),
        }
    }

    /// Pushes the full current state to the presenter.
    pub fn start(&self, presenter: &mut impl Presenter) {
        for id in self.engine.grid().ids() {
            presenter.tile_changed(id, self.engine.visual(id).unwrap_or_default());
        }
        presenter.stats_changed(&self.stats());
        presenter.leaderboard_changed(self.leaderboard.entries());
    }

    pub fn handle(&mut self, input: HostInput, presenter: &mut impl Presenter) -> Result<()> {
        match input {
            HostInput::Select(id) => self.select(id, presenter)?,
            HostInput::SelectAt { row, col } => {
                let id = self.engine.grid().locate((row, col))?;
                self.select(id, presenter)?;
            }
            HostInput::Tick(dt) => {
                let events = self.engine.advance(dt);
                self.apply(events, presenter);
                presenter.stats_changed(&self.stats());
            }
            HostInput::Restart => {
                log::info!("restarting");
                self.engine.reset();
                self.start(presenter);
            }
        }
        Ok(())
    }

    fn select(&mut self, id: TileId, presenter: &mut impl Presenter) -> Result<()> {
        let outcome = self.engine.select(id)?;
        if !outcome.has_update() {
            return Ok(());
        }

        presenter.tile_changed(id, TileVisual::FaceUp);
        presenter.effect(Effect::TileFlip(id));
        presenter.stats_changed(&self.stats());

        if outcome == SelectOutcome::PairPending {
            // a zero settle time is already due
            let events = self.engine.advance(Duration::ZERO);
            self.apply(events, presenter);
        }
        Ok(())
    }

    fn apply(&mut self, events: EngineEvents, presenter: &mut impl Presenter) {
        for event in events {
            match event {
                EngineEvent::MatchFound { first, second } => {
                    presenter.tile_changed(first, TileVisual::Matched);
                    presenter.tile_changed(second, TileVisual::Matched);
                    presenter.effect(Effect::MatchSuccess { first, second });
                    presenter.stats_changed(&self.stats());
                }
                EngineEvent::MatchMissed { first, second } => {
                    presenter.tile_changed(first, TileVisual::FaceDown);
                    presenter.tile_changed(second, TileVisual::FaceDown);
                    presenter.effect(Effect::MatchFailure { first, second });
                }
                EngineEvent::Ready => {}
                EngineEvent::Completed(result) => self.finish(result, presenter),
            }
        }
    }

    fn finish(&mut self, result: GameResult, presenter: &mut impl Presenter) {
        presenter.effect(Effect::GameEnd);

        if let Err(err) = ResultLog::append(&mut self.store, result) {
            log::error!("could not save game result: {err}");
        }

        let high_score = self.leaderboard.is_high_score(result.score);
        presenter.game_finished(&result, high_score);
        if !high_score {
            return;
        }

        let Some(name) = prompt_player_name(result.score, presenter) else {
            log::info!("player declined to enter a name");
            return;
        };
        if let Err(err) = self
            .leaderboard
            .add_score(&mut self.store, name, result.score)
        {
            log::error!("could not save leaderboard: {err}");
        }
        presenter.leaderboard_changed(self.leaderboard.entries());
    }
}

fn prompt_player_name(score: i32, presenter: &mut impl Presenter) -> Option<String> {
    loop {
        let answer = presenter.request_player_name(score)?;
        match parse_player_name(&answer) {
            Some(name) => return Some(name),
            None => log::debug!("rejected player name {answer:?}"),
        }
    }
}
