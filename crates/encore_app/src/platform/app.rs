use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::Local;
use encore_core::{update, AppState, Msg, SearchPhase};
use encore_engine::{EngineConfig, EngineHandle};
use engine_logging::engine_debug;

use super::effects::EffectRunner;
use super::ui::{constants::CLEAR_SCREEN, render};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

struct App {
    state: AppState,
    effects: EffectRunner,
    /// Give up when the engine has been silent this long.
    idle_limit: Duration,
}

impl App {
    fn new(config: EngineConfig) -> anyhow::Result<Self> {
        let idle_limit = config.api.connect_timeout + config.api.request_timeout * 2;
        let state = AppState::with_featured_tour(Some(config.featured_tour.clone()));
        let engine = EngineHandle::new(config).context("starting engine")?;
        Ok(Self {
            state,
            effects: EffectRunner::new(engine),
            idle_limit,
        })
    }

    /// Runs `msg` through the update function and executes its effects.
    /// Returns whether the view changed.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.effects.apply(effects);
        let dirty = state.consume_dirty();
        self.state = state;
        dirty
    }

    fn tick(&mut self) -> bool {
        self.dispatch(Msg::Tick(Local::now().naive_local()))
    }

    /// Feeds engine events into the update loop until `done` holds.
    fn pump_until(
        &mut self,
        mut done: impl FnMut(&AppState) -> bool,
        mut on_dirty: impl FnMut(&AppState) -> io::Result<()>,
    ) -> anyhow::Result<()> {
        let mut last_event = Instant::now();
        while !done(&self.state) {
            match self.effects.next_msg(POLL_INTERVAL) {
                Some(msg) => {
                    last_event = Instant::now();
                    if self.dispatch(msg) {
                        on_dirty(&self.state)?;
                    }
                }
                None if last_event.elapsed() > self.idle_limit => {
                    bail!("backend did not answer within {:?}", self.idle_limit);
                }
                None => {}
            }
        }
        Ok(())
    }
}

pub fn run_tours(config: EngineConfig, watch: bool) -> anyhow::Result<()> {
    let mut app = App::new(config)?;
    app.tick();
    app.dispatch(Msg::ToursRequested);

    app.pump_until(|state| !state.tours_loading(), |_| Ok(()))?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render::render_tours(&app.state.view()))?;
    stdout.flush()?;

    if !watch {
        return Ok(());
    }
    loop {
        thread::sleep(WATCH_INTERVAL);
        if app.tick() {
            write!(
                stdout,
                "{}{}",
                CLEAR_SCREEN,
                render::render_tours(&app.state.view())
            )?;
            stdout.flush()?;
        }
    }
}

pub fn run_search(config: EngineConfig, name: &str) -> anyhow::Result<()> {
    let mut app = App::new(config)?;
    app.tick();
    if !app.dispatch(Msg::SearchSubmitted(name.to_string())) {
        bail!("nothing to search for");
    }

    let mut stderr = io::stderr();
    app.pump_until(is_settled, |state| {
        if let Some(line) = render::progress_line(&state.view()) {
            write!(stderr, "\r{line}")?;
            stderr.flush()?;
        }
        Ok(())
    })?;
    if app.state.view().progress.is_some() {
        writeln!(stderr)?;
    }
    engine_debug!(
        "search for {:?} settled in {:?}",
        app.state.query(),
        app.state.phase()
    );

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render::render_search(&app.state.view()))?;
    stdout.flush()?;
    Ok(())
}

fn is_settled(state: &AppState) -> bool {
    matches!(
        state.phase(),
        SearchPhase::Done | SearchPhase::NoSongs | SearchPhase::NotFound | SearchPhase::Failed
    )
}
