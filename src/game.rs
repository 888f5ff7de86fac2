//! Frame driver
//!
//! Owns the simulation state and the collaborators. Each `frame` runs one
//! tick, relays what happened to the display, and tells the host whether to
//! schedule another frame. When the server goes down it runs the one-time
//! game-over sequence: resolve the player's name, submit the score, show the
//! leaderboard and the restart control.

use std::rc::Rc;

use crate::consts::ANONYMOUS_PLAYER;
use crate::highscores::{LeaderboardWindow, ScoreSubmission};
use crate::platform::{self, Display, Identity, InputState, ScoreService};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, tick};

/// What the host scheduler should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Schedule another animation frame
    NextFrame,
    /// The run is over; wait for a reset
    Stop,
}

/// Game instance holding all state
pub struct Game<S, D, I>
where
    S: ScoreService,
    D: Display + 'static,
    I: Identity,
{
    pub state: GameState,
    pub input: InputState,
    settings: Settings,
    scores: S,
    display: Rc<D>,
    identity: I,
    /// Game-over sequence already ran for this run
    run_ended: bool,
}

impl<S, D, I> Game<S, D, I>
where
    S: ScoreService,
    D: Display + 'static,
    I: Identity,
{
    pub fn new(settings: Settings, scores: S, display: Rc<D>, identity: I) -> Self {
        let seed = settings.seed.unwrap_or_else(|| platform::now_ms() as u64);
        log::info!("Game initialized with seed: {}", seed);

        let mut input = InputState::new();
        input.idle_mode = settings.idle_mode;
        Self {
            state: GameState::new(settings.sim, seed),
            input,
            settings,
            scores,
            display,
            identity,
            run_ended: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }

    pub fn display(&self) -> &Rc<D> {
        &self.display
    }

    /// Run one animation frame at `timestamp` (ms)
    pub fn frame(&mut self, timestamp: f64) -> FrameRequest {
        if self.state.is_game_over() {
            return FrameRequest::Stop;
        }

        let input = self.input.snapshot();
        tick(&mut self.state, &input, timestamp);
        self.dispatch_events();

        self.display.show_stats(self.state.score, self.state.health);

        if self.state.is_game_over() {
            FrameRequest::Stop
        } else {
            FrameRequest::NextFrame
        }
    }

    fn dispatch_events(&mut self) {
        let events = std::mem::take(&mut self.state.events);
        let mut run_over = false;
        for event in &events {
            match event {
                GameEvent::PowerUpCollected(kind) => {
                    self.display
                        .show_message(kind.message(), self.settings.message_duration_ms);
                }
                GameEvent::ServerBreached { kind } => {
                    log::debug!("{:?} breached the server, health {}", kind, self.state.health);
                }
                GameEvent::GameOver { .. } => run_over = true,
                _ => {}
            }
        }
        if run_over {
            self.end_run();
        }
    }

    /// Enter game over and run the terminal sequence. Only the first call
    /// per run has any effect.
    pub fn end_run(&mut self) {
        if self.run_ended {
            return;
        }
        self.run_ended = true;
        self.state.trigger_game_over();

        let player_name = self.resolve_player_name();
        let score = self.state.score;
        log::info!("Game over: {} scored {}", player_name, score);

        let submission = ScoreSubmission {
            player_name,
            score,
            date_achieved: platform::now_ms(),
        };
        self.scores.submit_score(
            submission,
            Box::new(|result| {
                if let Err(err) = result {
                    log::warn!("Error posting high score: {}", err);
                }
            }),
        );

        self.request_leaderboard();
        self.display.set_leaderboard_visible(true);
        self.display.set_restart_visible(true);
    }

    /// Name from this session, else the stored one, else ask; falls back
    /// to an anonymous placeholder
    fn resolve_player_name(&mut self) -> String {
        if let Some(name) = &self.state.player_name {
            return name.clone();
        }

        let name = self
            .identity
            .stored_name()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                let answer = self
                    .identity
                    .prompt_name()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())?;
                self.identity.remember_name(&answer);
                Some(answer)
            })
            .unwrap_or_else(|| ANONYMOUS_PLAYER.to_string());

        self.state.player_name = Some(name.clone());
        name
    }

    fn request_leaderboard(&self) {
        let display = Rc::clone(&self.display);
        self.scores.fetch_leaderboard(Box::new(move |result| match result {
            Ok(entries) => display.show_leaderboard(&entries),
            Err(err) => log::warn!("Error fetching high scores: {}", err),
        }));
    }

    /// Fetch the leaderboard and show the dialog
    pub fn open_leaderboard(&self) {
        self.request_leaderboard();
        self.display.set_leaderboard_visible(true);
    }

    /// Fetch a time-windowed top 10 and show the dialog
    pub fn open_top(&self, window: LeaderboardWindow) {
        let display = Rc::clone(&self.display);
        self.scores.fetch_top(
            window,
            Box::new(move |result| match result {
                Ok(entries) => display.show_leaderboard(&entries),
                Err(err) => log::warn!("Error fetching {:?} high scores: {}", window, err),
            }),
        );
        self.display.set_leaderboard_visible(true);
    }

    pub fn close_leaderboard(&self) {
        self.display.set_leaderboard_visible(false);
    }

    /// Start a new run and process its first frame at time zero
    pub fn reset(&mut self) -> FrameRequest {
        self.state.reset();
        self.run_ended = false;
        self.display.set_restart_visible(false);
        self.display.set_leaderboard_visible(false);
        log::info!("Game restarted");
        self.frame(0.0)
    }
}
