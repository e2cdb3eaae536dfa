//! Line-based terminal host: draws the grid as text and reads commands from any `BufRead`.
//!
//! Input is read with blocking calls, so nothing is read while a revealed pair settles or during
//! the cooldown after it. A restart typed in that window runs once the engine is ready again.

use std::fmt;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use tilematch_core::*;
use web_time::Instant;

/// How often the pending pair is polled while the engine is busy.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Action {
    Select { row: Coord, col: Coord },
    Restart,
    Stats,
    Quit,
    Unknown(String),
}

impl Action {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "q" | "quit" => return Self::Quit,
            "r" | "restart" => return Self::Restart,
            "s" | "stats" => return Self::Stats,
            _ => {}
        }

        let mut parts = line.split_whitespace().map(str::parse::<Coord>);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(row)), Some(Ok(col)), None) => Self::Select { row, col },
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// Wall clock handing out the time since the previous lap.
struct Clock {
    last: Instant,
}

impl Clock {
    fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        dt
    }
}

pub struct Terminal<R, W> {
    input: R,
    output: W,
    visuals: Vec<TileVisual>,
    stats: SessionStats,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            visuals: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Output is best effort, the game goes on if the terminal goes away.
    fn say(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = self.output.write_fmt(args).and_then(|()| self.output.flush()) {
            log::warn!("could not write to terminal: {err}");
        }
    }

    /// Next line of input, `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.say(format_args!("{prompt}"));
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn render(&mut self, grid: &ValidGrid) {
        let bounds = grid.bounds();

        let header: String = (bounds.min_col..=bounds.max_col)
            .map(|col| format!("{col:>4}"))
            .collect();
        self.say(format_args!("\n    {header}\n"));

        for (row, coord) in (bounds.min_row..=bounds.max_row).enumerate() {
            let cells: String = grid
                .row_ids(row)
                .map(|id| {
                    let value = grid[id].value;
                    match self.visuals.get(id.index()).copied().unwrap_or_default() {
                        TileVisual::FaceDown => "   #".to_string(),
                        TileVisual::FaceUp => format!("{value:>4}"),
                        TileVisual::Matched => format!("  ({value})"),
                    }
                })
                .collect();
            self.say(format_args!("{coord:>4}{cells}\n"));
        }
    }

    fn show_stats(&mut self, score: i32) {
        let stats = self.stats;
        self.say(format_args!(
            "Clicks: {}  Pairs: {}/{}  Time: {}s  Score: {}\n",
            stats.total_clicks,
            stats.pairs_found,
            stats.total_pairs,
            stats.elapsed.as_secs(),
            score,
        ));
    }
}

impl<R: BufRead, W: Write> Presenter for Terminal<R, W> {
    fn tile_changed(&mut self, id: TileId, visual: TileVisual) {
        if self.visuals.len() <= id.index() {
            self.visuals.resize(id.index() + 1, TileVisual::default());
        }
        self.visuals[id.index()] = visual;
    }

    fn effect(&mut self, effect: Effect) {
        match effect {
            Effect::TileFlip(_) => {}
            Effect::MatchSuccess { .. } => self.say(format_args!("Match!\n")),
            Effect::MatchFailure { .. } => self.say(format_args!("No match.\n")),
            Effect::GameEnd => self.say(format_args!("\nAll pairs found!\n")),
        }
    }

    fn stats_changed(&mut self, stats: &SessionStats) {
        self.stats = *stats;
    }

    fn game_finished(&mut self, result: &GameResult, high_score: bool) {
        self.say(format_args!(
            "Score: {}  ({} clicks, {}s)\n",
            result.score, result.total_clicks, result.total_time_seconds
        ));
        if high_score {
            self.say(format_args!("New high score!\n"));
        }
    }

    fn request_player_name(&mut self, _score: i32) -> Option<String> {
        match self.prompt("Enter your initials (3 characters): ") {
            Ok(line) => line,
            Err(err) => {
                log::warn!("could not read player name: {err}");
                None
            }
        }
    }

    fn leaderboard_changed(&mut self, entries: &[PlayerScoreEntry]) {
        self.say(format_args!("Leaderboard:\n"));
        for (rank, entry) in entries.iter().enumerate() {
            self.say(format_args!(
                "{:>2}. {:<4}{:>6}\n",
                rank + 1,
                entry.player_name,
                entry.score
            ));
        }
    }
}

/// Plays until `q` or end of input. Time passes in real time, also while waiting for input.
pub fn run<S, R, W>(
    session: &mut GameSession<S>,
    terminal: &mut Terminal<R, W>,
) -> anyhow::Result<()>
where
    S: SnapshotStore,
    R: BufRead,
    W: Write,
{
    let mut clock = Clock::start();
    session.start(terminal);
    terminal.say(format_args!(
        "Enter `ROW COL` to flip a tile, `s` for stats, `r` to restart, `q` to quit.\n"
    ));

    loop {
        terminal.render(session.engine().grid());
        let Some(line) = terminal.prompt("> ")? else {
            break;
        };
        session.handle(HostInput::Tick(clock.lap()), terminal)?;

        match Action::parse(&line) {
            Action::Quit => break,
            Action::Restart => {
                session.handle(HostInput::Restart, terminal)?;
                clock.lap();
            }
            Action::Stats => {
                terminal.show_stats(session.engine().calculate_score());
            }
            Action::Select { row, col } => {
                match session.handle(HostInput::SelectAt { row, col }, terminal) {
                    Ok(()) => wait_until_ready(session, terminal, &mut clock)?,
                    Err(err) => terminal.say(format_args!("{err}\n")),
                }
            }
            Action::Unknown(text) => {
                terminal.say(format_args!("Unrecognised command `{text}`\n"));
            }
        }
    }
    Ok(())
}

/// Shows the face-up pair and blocks until the engine takes selections again.
fn wait_until_ready<S, R, W>(
    session: &mut GameSession<S>,
    terminal: &mut Terminal<R, W>,
    clock: &mut Clock,
) -> anyhow::Result<()>
where
    S: SnapshotStore,
    R: BufRead,
    W: Write,
{
    if !session.engine().is_busy() {
        return Ok(());
    }
    terminal.render(session.engine().grid());
    while session.engine().is_busy() {
        thread::sleep(POLL_INTERVAL);
        session.handle(HostInput::Tick(clock.lap()), terminal)?;
    }
    Ok(())
}
