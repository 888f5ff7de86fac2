//! Browser collaborators and the JS-facing game handle
//!
//! The page owns the canvas and the `requestAnimationFrame` loop: it calls
//! `WebGame::frame` with the frame timestamp, draws from `snapshot()`, and
//! keeps scheduling while `frame` returns true.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, HtmlElement, Request, RequestInit, Response, Storage};

use super::{Completion, Display, Identity, ScoreService, ScoreServiceError};
use crate::game::{FrameRequest, Game};
use crate::highscores::{LeaderboardWindow, ScoreEntry, ScoreSubmission};
use crate::settings::Settings;

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Display backed by the page's scoreboard, dialog and restart button
#[derive(Debug, Default)]
pub struct DomDisplay;

impl DomDisplay {
    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        let el = document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(el) = el {
            let display = if visible { "block" } else { "none" };
            let _ = el.style().set_property("display", display);
        }
    }
}

impl Display for DomDisplay {
    fn show_stats(&self, score: u64, health: u32) {
        Self::set_text("score", &score.to_string());
        Self::set_text("serverHealth", &health.to_string());
    }

    fn show_message(&self, text: &str, duration_ms: u32) {
        let Some(document) = document() else {
            return;
        };
        let Some(body) = document.body() else {
            return;
        };
        let Ok(div) = document.create_element("div") else {
            return;
        };
        // Text only; messages never go through innerHTML
        div.set_text_content(Some(text));
        let _ = div.set_attribute(
            "style",
            "position:absolute;top:10px;left:50%;transform:translateX(-50%);font-size:20px;color:#fff",
        );
        if body.append_child(&div).is_err() {
            return;
        }

        let remove = Closure::once_into_js(move || div.remove());
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                remove.unchecked_ref(),
                duration_ms as i32,
            );
        }
    }

    fn show_leaderboard(&self, entries: &[ScoreEntry]) {
        let Some(document) = document() else {
            return;
        };
        let Some(list) = document.get_element_by_id("highscoreList") else {
            return;
        };
        list.set_inner_html("");
        for entry in entries {
            if let Ok(li) = document.create_element("li") {
                li.set_text_content(Some(&format!("{}: {}", entry.player_name, entry.score)));
                let _ = list.append_child(&li);
            }
        }
    }

    fn set_leaderboard_visible(&self, visible: bool) {
        Self::set_visible("highscoreDialog", visible);
    }

    fn set_restart_visible(&self, visible: bool) {
        Self::set_visible("restartButton", visible);
    }
}

/// Body posted to the score endpoint; the server stamps the date itself
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostScore<'a> {
    player_name: &'a str,
    score: u64,
}

/// Listing row; the server formats dates as ISO strings, which the game
/// does not need
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedScore {
    player_name: String,
    score: u64,
}

/// Score service talking to the HTTP API with `fetch`
#[derive(Debug, Clone)]
pub struct HttpScores {
    base_url: String,
}

impl HttpScores {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl ScoreService for HttpScores {
    fn submit_score(&self, submission: ScoreSubmission, done: Completion<()>) {
        let url = self.base_url.clone();
        spawn_local(async move {
            done(post_score(&url, &submission).await);
        });
    }

    fn fetch_leaderboard(&self, done: Completion<Vec<ScoreEntry>>) {
        let url = self.base_url.clone();
        spawn_local(async move {
            done(fetch_scores(&url).await);
        });
    }

    fn fetch_top(&self, window: LeaderboardWindow, done: Completion<Vec<ScoreEntry>>) {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), window.path());
        spawn_local(async move {
            done(fetch_scores(&url).await);
        });
    }
}

async fn post_score(url: &str, submission: &ScoreSubmission) -> Result<(), ScoreServiceError> {
    let body = serde_json::to_string(&PostScore {
        player_name: &submission.player_name,
        score: submission.score,
    })
    .map_err(|err| ScoreServiceError::Decode(err.to_string()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(url, &init)
        .map_err(|err| ScoreServiceError::Transport(js_message(&err)))?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|err| ScoreServiceError::Transport(js_message(&err)))?;

    send(request).await.map(|_| ())
}

async fn fetch_scores(url: &str) -> Result<Vec<ScoreEntry>, ScoreServiceError> {
    let request =
        Request::new_with_str(url).map_err(|err| ScoreServiceError::Transport(js_message(&err)))?;
    let body = send(request).await?;
    let listed: Vec<ListedScore> =
        serde_json::from_str(&body).map_err(|err| ScoreServiceError::Decode(err.to_string()))?;
    Ok(listed
        .into_iter()
        .map(|row| ScoreEntry {
            player_name: row.player_name,
            score: row.score,
            date_achieved: 0.0,
        })
        .collect())
}

/// Run a request and return the response body, keeping non-2xx statuses
async fn send(request: Request) -> Result<String, ScoreServiceError> {
    let window = web_sys::window()
        .ok_or_else(|| ScoreServiceError::Transport("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|err| ScoreServiceError::Transport(js_message(&err)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|err| ScoreServiceError::Decode(js_message(&err)))?;

    let status = response.status();
    let text = response
        .text()
        .map_err(|err| ScoreServiceError::Decode(js_message(&err)))?;
    let body = JsFuture::from(text)
        .await
        .map_err(|err| ScoreServiceError::Decode(js_message(&err)))?
        .as_string()
        .unwrap_or_default();

    if !response.ok() {
        let message = (!body.is_empty()).then_some(body);
        return Err(ScoreServiceError::Upstream { status, message });
    }
    Ok(body)
}

/// Player name from LocalStorage, or `window.prompt`
#[derive(Debug, Clone)]
pub struct BrowserIdentity {
    key: String,
}

impl BrowserIdentity {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Identity for BrowserIdentity {
    fn stored_name(&self) -> Option<String> {
        local_storage()?.get_item(&self.key).ok().flatten()
    }

    fn prompt_name(&self) -> Option<String> {
        web_sys::window()?
            .prompt_with_message("Enter your name for the highscore:")
            .ok()
            .flatten()
    }

    fn remember_name(&self, name: &str) {
        if let Some(storage) = local_storage() {
            if storage.set_item(&self.key, name).is_err() {
                log::warn!("Could not store player name");
            }
        }
    }
}

/// Game handle exported to the page
#[wasm_bindgen]
pub struct WebGame {
    game: Game<HttpScores, DomDisplay, BrowserIdentity>,
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        let scores = HttpScores::new(settings.api_base_url.clone());
        let identity = BrowserIdentity::new(settings.player_name_key.clone());
        WebGame {
            game: Game::new(settings, scores, Rc::new(DomDisplay), identity),
        }
    }

    /// Run one frame; true means "request another animation frame"
    pub fn frame(&mut self, timestamp: f64) -> bool {
        self.game.frame(timestamp) == FrameRequest::NextFrame
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.game.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.game.input.key_up(key)
    }

    /// Window lost focus: release everything so the ship stops
    pub fn blur(&mut self) {
        self.game.input.release_all();
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        self.game.input.idle_mode = on;
        log::info!("Idle mode: {}", on);
    }

    /// Restart; true means "request another animation frame"
    pub fn reset(&mut self) -> bool {
        self.game.reset() == FrameRequest::NextFrame
    }

    pub fn open_leaderboard(&self) {
        self.game.open_leaderboard();
    }

    pub fn close_leaderboard(&self) {
        self.game.close_leaderboard();
    }

    /// Show one of the time-windowed listings (`top10byday`, `top10byweek`,
    /// `top10bymonth`). Returns false for an unknown window.
    pub fn open_top(&self, window: &str) -> bool {
        match LeaderboardWindow::from_path(window) {
            Some(window) => {
                self.game.open_top(window);
                true
            }
            None => {
                log::warn!("Unknown leaderboard window: {}", window);
                false
            }
        }
    }

    /// JSON view of the play field for the renderer
    pub fn snapshot(&self) -> String {
        match serde_json::to_string(&self.game.state.snapshot()) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Snapshot failed: {}", err);
                String::new()
            }
        }
    }
}

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Pipeline Invaders starting...");
}
