//! Pipeline Invaders entry point
//!
//! On the web the page drives `WebGame` from the library. Natively this runs
//! a headless session with the autopilot at the controls and keeps the
//! leaderboard in the configured scores file.

#[cfg(not(target_arch = "wasm32"))]
mod headless_run {
    use std::rc::Rc;

    use pipeline_invaders::platform::headless::{FixedIdentity, LocalScores, LogDisplay};
    use pipeline_invaders::{FrameRequest, Game, HighScores, Settings};

    /// ~60 fps
    const FRAME_MS: f64 = 16.0;
    /// Ten minutes of play
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    fn load_board(path: Option<&str>) -> HighScores {
        let Some(path) = path else {
            return HighScores::new();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => match HighScores::from_json(&json) {
                Ok(board) => {
                    log::info!("Loaded {} high scores from {}", board.len(), path);
                    board
                }
                Err(err) => {
                    log::warn!("Ignoring high score file {}: {}", path, err);
                    HighScores::new()
                }
            },
            Err(_) => HighScores::new(),
        }
    }

    fn save_board(path: &str, board: &HighScores) {
        match board.to_json() {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("High scores saved to {}", path),
                Err(err) => log::error!("Failed to write {}: {}", path, err),
            },
            Err(err) => log::error!("Failed to serialize high scores: {}", err),
        }
    }

    pub fn run() {
        let mut settings = Settings::load();
        settings.idle_mode = true;
        let board = load_board(settings.scores_file.as_deref());
        let display = Rc::new(LogDisplay::new());
        let identity = FixedIdentity::new(Some("Autopilot".to_string()));
        let mut game = Game::new(settings, LocalScores::new(board), display, identity);

        let mut frames = 0;
        let mut timestamp = 0.0;
        while frames < MAX_FRAMES {
            timestamp += FRAME_MS;
            frames += 1;
            if game.frame(timestamp) == FrameRequest::Stop {
                break;
            }
        }

        if !game.state.is_game_over() {
            log::info!("Frame limit reached, ending run");
            game.end_run();
        }

        let (score, health) = game.display().stats();
        log::info!(
            "Run finished after {} frames (seed {}): score {}, server health {}",
            frames,
            game.state.seed,
            score,
            health
        );

        if let Some(path) = game.settings().scores_file.as_deref() {
            save_board(path, &game.scores().board());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pipeline Invaders (headless) starting...");
    headless_run::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `wasm_main` in the library
}
