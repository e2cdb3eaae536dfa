use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Idle -> OneSelected -> Resolving
/// - Resolving -> Cooldown -> Idle
/// - Resolving -> Complete
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No tile face up
    Idle,
    /// One tile face up, waiting for its partner
    OneSelected,
    /// Two tiles face up, resolution scheduled after the settle interval
    Resolving,
    /// Pair resolved, next selection blocked until the cooldown ends
    Cooldown,
    /// Every pair found, no further selections are accepted
    Complete,
}

impl EngineState {
    pub const fn accepts_selection(self) -> bool {
        matches!(self, Self::Idle | Self::OneSelected)
    }

    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Resolving | Self::Cooldown)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Delays that let the host animate a flipped pair before the engine moves on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTiming {
    pub settle: Duration,
    pub cooldown: Duration,
}

impl EngineTiming {
    pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2000);
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(600);

    /// Both deadlines fire on the next [`MatchEngine::advance`].
    pub const IMMEDIATE: Self = Self {
        settle: Duration::ZERO,
        cooldown: Duration::ZERO,
    };

    pub const fn new(settle: Duration, cooldown: Duration) -> Self {
        Self { settle, cooldown }
    }
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SETTLE, Self::DEFAULT_COOLDOWN)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    MatchFound { first: TileId, second: TileId },
    MatchMissed { first: TileId, second: TileId },
    /// Cooldown ended, selections are accepted again
    Ready,
    Completed(GameResult),
}

pub type EngineEvents = SmallVec<[EngineEvent; 2]>;

/// Selection and match-resolution state machine over a validated grid.
///
/// Time only moves through [`MatchEngine::advance`]; the engine never reads a clock.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchEngine {
    grid: ValidGrid,
    tiles: Vec<TileRuntimeState>,
    selection: SmallVec<[TileId; 2]>,
    state: EngineState,
    timing: EngineTiming,
    clock: Duration,
    deadline: Option<Duration>,
    started_at: Option<Duration>,
    finished_at: Option<Duration>,
    total_clicks: u32,
    pairs_found: u32,
    final_result: Option<GameResult>,
}

impl MatchEngine {
    pub fn new(grid: ValidGrid) -> Self {
        Self::with_timing(grid, EngineTiming::default())
    }

    pub fn with_timing(grid: ValidGrid, timing: EngineTiming) -> Self {
        let tiles = grid.tiles().iter().copied().map(TileRuntimeState::new).collect();
        Self {
            grid,
            tiles,
            selection: SmallVec::new(),
            state: Default::default(),
            timing,
            clock: Duration::ZERO,
            deadline: None,
            started_at: None,
            finished_at: None,
            total_clicks: 0,
            pairs_found: 0,
            final_result: None,
        }
    }

    pub fn grid(&self) -> &ValidGrid {
        &self.grid
    }

    pub fn timing(&self) -> EngineTiming {
        self.timing
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Tiles currently face up and not yet resolved, in selection order.
    pub fn selection(&self) -> &[TileId] {
        &self.selection
    }

    pub fn is_selected(&self, id: TileId) -> bool {
        self.selection.contains(&id)
    }

    pub fn is_matched(&self, id: TileId) -> bool {
        self.tiles.get(id.index()).is_some_and(|tile| tile.matched)
    }

    pub fn tile(&self, id: TileId) -> Option<&TileRuntimeState> {
        self.tiles.get(id.index())
    }

    pub fn visual(&self, id: TileId) -> Option<TileVisual> {
        let tile = self.tiles.get(id.index())?;
        Some(if tile.matched {
            TileVisual::Matched
        } else if self.is_selected(id) {
            TileVisual::FaceUp
        } else {
            TileVisual::FaceDown
        })
    }

    pub fn total_clicks(&self) -> u32 {
        self.total_clicks
    }

    pub fn pairs_found(&self) -> u32 {
        self.pairs_found
    }

    pub fn total_pairs(&self) -> usize {
        self.grid.pair_count()
    }

    /// Time since the first accepted selection, frozen once the grid is cleared.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self
                .finished_at
                .unwrap_or(self.clock)
                .saturating_sub(started_at),
            None => Duration::ZERO,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pairs_found as usize == self.grid.pair_count()
    }

    pub fn calculate_score(&self) -> i32 {
        calculate_score(self.pairs_found, self.total_clicks, self.elapsed())
    }

    pub fn final_result(&self) -> Option<GameResult> {
        self.final_result
    }

    pub fn select(&mut self, id: TileId) -> Result<SelectOutcome> {
        let id = self.grid.validate_id(id)?;

        if let Some(rejection) = self.rejection_for(id) {
            log::trace!("selection of tile {} ignored: {:?}", id, rejection);
            return Ok(SelectOutcome::Rejected(rejection));
        }

        self.selection.push(id);
        self.total_clicks = self.total_clicks.saturating_add(1);
        if self.started_at.is_none() {
            self.started_at = Some(self.clock);
        }
        log::debug!("tile {} face up, value {}", id, self.grid[id].value);

        Ok(if self.selection.len() == 2 {
            self.state = EngineState::Resolving;
            self.deadline = Some(self.clock.saturating_add(self.timing.settle));
            SelectOutcome::PairPending
        } else {
            self.state = EngineState::OneSelected;
            SelectOutcome::Selected
        })
    }

    pub fn select_at(&mut self, coords: Coord2) -> Result<SelectOutcome> {
        let id = self.grid.locate(coords)?;
        self.select(id)
    }

    /// Moves the timeline forward and fires every deadline reached, each at its own instant.
    pub fn advance(&mut self, dt: Duration) -> EngineEvents {
        self.clock = self.clock.saturating_add(dt);

        let mut events = EngineEvents::new();
        while let Some(deadline) = self.deadline.filter(|&deadline| deadline <= self.clock) {
            match self.state {
                EngineState::Resolving => self.resolve_at(deadline, &mut events),
                EngineState::Cooldown => {
                    self.deadline = None;
                    self.state = EngineState::Idle;
                    events.push(EngineEvent::Ready);
                }
                EngineState::Idle | EngineState::OneSelected | EngineState::Complete => {
                    self.deadline = None;
                }
            }
        }
        events
    }

    /// Resolves a pending pair now instead of waiting for the settle deadline.
    pub fn resolve(&mut self) -> EngineEvents {
        let mut events = EngineEvents::new();
        if matches!(self.state, EngineState::Resolving) {
            self.resolve_at(self.clock, &mut events);
        }
        events
    }

    /// Back to the freshly loaded grid. Calling it twice is the same as calling it once.
    pub fn reset(&mut self) {
        for tile in &mut self.tiles {
            tile.matched = false;
        }
        self.selection.clear();
        self.state = EngineState::Idle;
        self.clock = Duration::ZERO;
        self.deadline = None;
        self.started_at = None;
        self.finished_at = None;
        self.total_clicks = 0;
        self.pairs_found = 0;
        self.final_result = None;
    }

    fn rejection_for(&self, id: TileId) -> Option<Rejection> {
        use EngineState::*;

        match self.state {
            Complete => Some(Rejection::Finished),
            Resolving | Cooldown => Some(Rejection::Busy),
            Idle | OneSelected if self.is_matched(id) => Some(Rejection::AlreadyMatched),
            Idle | OneSelected if self.is_selected(id) => Some(Rejection::AlreadySelected),
            Idle | OneSelected => None,
        }
    }

    fn resolve_at(&mut self, now: Duration, events: &mut EngineEvents) {
        self.deadline = None;

        let &[first, second] = self.selection.as_slice() else {
            log::warn!("resolution without a full pair, dropping selection");
            self.selection.clear();
            self.state = EngineState::Idle;
            return;
        };
        self.selection.clear();

        if self.grid[first].value == self.grid[second].value {
            for id in [first, second] {
                self.tiles[id.index()].matched = true;
            }
            self.pairs_found = self.pairs_found.saturating_add(1);
            log::debug!("tiles {} and {} match", first, second);
            events.push(EngineEvent::MatchFound { first, second });

            if self.is_complete() {
                self.complete(now, events);
                return;
            }
        } else {
            log::debug!("tiles {} and {} do not match", first, second);
            events.push(EngineEvent::MatchMissed { first, second });
        }

        self.state = EngineState::Cooldown;
        self.deadline = Some(now.saturating_add(self.timing.cooldown));
    }

    fn complete(&mut self, now: Duration, events: &mut EngineEvents) {
        self.state = EngineState::Complete;
        self.finished_at = Some(now);

        let result = GameResult::new(
            self.total_clicks,
            self.elapsed(),
            self.pairs_found,
            self.calculate_score(),
        );
        log::info!(
            "grid cleared: {} pairs, {} clicks, {}s, score {}",
            result.pairs_found,
            result.total_clicks,
            result.total_time_seconds,
            result.score
        );
        self.final_result = Some(result);
        events.push(EngineEvent::Completed(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = EngineTiming::DEFAULT_SETTLE;
    const COOLDOWN: Duration = EngineTiming::DEFAULT_COOLDOWN;

    fn engine(specs: &[(Coord, Coord, TileValue)]) -> MatchEngine {
        let tiles: Vec<_> = specs
            .iter()
            .map(|&(row, col, value)| TileSpec::new(row, col, value))
            .collect();
        MatchEngine::new(validate(&tiles).unwrap())
    }

    fn reference() -> MatchEngine {
        engine(&[(1, 1, 1), (1, 2, 1), (2, 1, 2), (2, 2, 2)])
    }

    fn crossed() -> MatchEngine {
        engine(&[(1, 1, 1), (1, 2, 2), (2, 1, 1), (2, 2, 2)])
    }

    fn id(engine: &MatchEngine, coords: Coord2) -> TileId {
        engine.grid().tile_at(coords).unwrap()
    }

    #[test]
    fn reference_game_completes_with_score_1140() {
        let mut engine = reference();

        assert_eq!(engine.select_at((1, 1)).unwrap(), SelectOutcome::Selected);
        assert_eq!(engine.state(), EngineState::OneSelected);
        assert_eq!(engine.select_at((1, 2)).unwrap(), SelectOutcome::PairPending);
        assert_eq!(engine.state(), EngineState::Resolving);

        let events = engine.advance(SETTLE);
        assert_eq!(
            events.as_slice(),
            [EngineEvent::MatchFound {
                first: id(&engine, (1, 1)),
                second: id(&engine, (1, 2)),
            }]
        );
        assert_eq!(engine.pairs_found(), 1);
        assert!(engine.is_matched(id(&engine, (1, 1))));

        assert_eq!(engine.advance(COOLDOWN).as_slice(), [EngineEvent::Ready]);
        engine.advance(Duration::from_millis(5400));

        engine.select_at((2, 1)).unwrap();
        engine.select_at((2, 2)).unwrap();
        let events = engine.advance(SETTLE);

        assert_eq!(engine.state(), EngineState::Complete);
        assert!(engine.is_complete());
        assert_eq!(engine.elapsed(), Duration::from_secs(10));
        let expected = GameResult::new(4, Duration::from_secs(10), 2, 1140);
        assert_eq!(events.last(), Some(&EngineEvent::Completed(expected)));
        assert_eq!(engine.final_result(), Some(expected));
    }

    #[test]
    fn pair_stays_face_up_during_settle() {
        let mut engine = reference();
        engine.select_at((1, 1)).unwrap();
        engine.select_at((1, 2)).unwrap();

        let events = engine.advance(SETTLE - Duration::from_millis(1));

        assert!(events.is_empty());
        assert_eq!(engine.selection().len(), 2);
        assert_eq!(engine.visual(id(&engine, (1, 2))), Some(TileVisual::FaceUp));
        assert!(!engine.is_matched(id(&engine, (1, 1))));
        assert_eq!(engine.pairs_found(), 0);
    }

    #[test]
    fn mismatch_flips_tiles_back_and_allows_reselection() {
        let mut engine = crossed();
        engine.select_at((1, 1)).unwrap();
        engine.select_at((1, 2)).unwrap();

        let events = engine.advance(SETTLE);
        assert!(matches!(events[0], EngineEvent::MatchMissed { .. }));
        assert_eq!(engine.visual(id(&engine, (1, 1))), Some(TileVisual::FaceDown));
        assert_eq!(
            engine.select_at((1, 1)).unwrap(),
            SelectOutcome::Rejected(Rejection::Busy)
        );

        engine.advance(COOLDOWN);
        assert_eq!(engine.select_at((1, 1)).unwrap(), SelectOutcome::Selected);
        assert_eq!(engine.total_clicks(), 3);
    }

    #[test]
    fn invalid_selections_are_silent_no_ops() {
        let mut engine = reference();
        engine.select_at((1, 1)).unwrap();

        assert_eq!(
            engine.select_at((1, 1)).unwrap(),
            SelectOutcome::Rejected(Rejection::AlreadySelected)
        );
        assert_eq!(engine.total_clicks(), 1);

        engine.select_at((1, 2)).unwrap();
        assert_eq!(
            engine.select_at((2, 1)).unwrap(),
            SelectOutcome::Rejected(Rejection::Busy)
        );
        engine.advance(SETTLE + COOLDOWN);

        assert_eq!(
            engine.select_at((1, 2)).unwrap(),
            SelectOutcome::Rejected(Rejection::AlreadyMatched)
        );
        assert_eq!(engine.total_clicks(), 2);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn completed_engine_rejects_selection() {
        let mut engine = reference();
        for coords in [(1, 1), (1, 2)] {
            engine.select_at(coords).unwrap();
        }
        engine.advance(SETTLE + COOLDOWN);
        for coords in [(2, 1), (2, 2)] {
            engine.select_at(coords).unwrap();
        }
        engine.advance(SETTLE);

        assert_eq!(
            engine.select_at((1, 1)).unwrap(),
            SelectOutcome::Rejected(Rejection::Finished)
        );
        // clock is frozen once complete
        engine.advance(Duration::from_secs(60));
        assert_eq!(engine.elapsed(), SETTLE + COOLDOWN + SETTLE);
    }

    #[test]
    fn one_large_tick_matches_many_small_ones() {
        let mut coarse = crossed();
        let mut fine = crossed();
        for engine in [&mut coarse, &mut fine] {
            engine.select_at((1, 1)).unwrap();
            engine.select_at((2, 1)).unwrap();
        }

        let coarse_events = coarse.advance(Duration::from_secs(5));
        let mut fine_events = Vec::new();
        for _ in 0..50 {
            fine_events.extend(fine.advance(Duration::from_millis(100)));
        }

        assert_eq!(coarse_events.as_slice(), fine_events.as_slice());
        assert_eq!(coarse, fine);
        assert_eq!(coarse.state(), EngineState::Idle);
    }

    #[test]
    fn clock_starts_on_first_selection() {
        let mut engine = reference();
        engine.advance(Duration::from_secs(30));
        assert_eq!(engine.elapsed(), Duration::ZERO);

        engine.select_at((1, 1)).unwrap();
        engine.advance(Duration::from_millis(1500));

        assert_eq!(engine.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn resolve_skips_the_settle_interval() {
        let mut engine = reference();
        engine.select_at((2, 1)).unwrap();
        engine.select_at((2, 2)).unwrap();

        let events = engine.resolve();

        assert_eq!(events.len(), 1);
        assert_eq!(engine.pairs_found(), 1);
        assert_eq!(engine.state(), EngineState::Cooldown);
        assert!(engine.resolve().is_empty());
    }

    #[test]
    fn immediate_timing_resolves_on_next_advance() {
        let grid = reference().grid().clone();
        let mut engine = MatchEngine::with_timing(grid, EngineTiming::IMMEDIATE);
        engine.select_at((1, 1)).unwrap();
        engine.select_at((1, 2)).unwrap();

        let events = engine.advance(Duration::ZERO);

        assert!(matches!(events[0], EngineEvent::MatchFound { .. }));
        assert_eq!(events[1], EngineEvent::Ready);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn reset_discards_pending_pair() {
        let mut engine = reference();
        engine.select_at((1, 1)).unwrap();
        engine.select_at((1, 2)).unwrap();

        engine.reset();
        let events = engine.advance(Duration::from_secs(3));

        assert!(events.is_empty());
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.total_clicks(), 0);
        assert!(engine.selection().is_empty());
        assert_eq!(engine.elapsed(), Duration::ZERO);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut once = reference();
        for coords in [(1, 1), (1, 2)] {
            once.select_at(coords).unwrap();
        }
        once.advance(SETTLE);
        let mut twice = once.clone();

        once.reset();
        twice.reset();
        twice.reset();

        assert_eq!(once, twice);
        assert_eq!(once, reference());
    }

    #[test]
    fn unknown_tiles_are_errors() {
        let mut engine = reference();

        assert_eq!(engine.select(TileId::new(99)), Err(GameError::UnknownTile));
        assert_eq!(
            engine.select_at((5, 5)),
            Err(GameError::NoTileAt { row: 5, col: 5 })
        );
        assert_eq!(engine.total_clicks(), 0);
    }

    #[test]
    fn saved_engine_state_only_restores_through_its_grid() {
        let mut engine = reference();
        engine.select_at((1, 1)).unwrap();
        let mut saved = serde_json::to_value(&engine).unwrap();

        let grid: ValidGrid = serde_json::from_value(saved["grid"].take()).unwrap();
        assert_eq!(&grid, engine.grid());

        let mut restored = MatchEngine::new(grid);
        restored.select_at((1, 1)).unwrap();
        restored.select_at((1, 2)).unwrap();
        let events = restored.advance(EngineTiming::DEFAULT_SETTLE);
        assert!(matches!(events[0], EngineEvent::MatchFound { .. }));
    }
}
