#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use segsync::kernel::event::{RequestId, SideEffect};
use segsync::kernel::media::{MediaClock, MediaPlayer};
use segsync::kernel::page::{parse_edit_page, EditPage};
use segsync::services::api::{
    ApiRequest, ApiResponse, HttpRequest, HttpResponse, SyncError, Transport, Verb,
};

pub const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
  <form><input type="hidden" name="csrfmiddlewaretoken" value="tok123"></form>
  <input class="form-control transcription-part" data-field="title" value="Interview">
  <input type="checkbox" id="autoplay" checked>
  <video id="media"></video>
  <div id="segments">
    <div class="segment" data-index="10">
      <input id="start-10" data-field="start" value="0:00.000">
      <input data-field="end" value="0:04.500">
      <input data-field="speaker" value="Alice">
      <textarea data-field="text">Hello there</textarea>
      <button data-type="play"></button><button data-type="pause"></button>
      <button data-type="rewind"></button><button data-type="add-before"></button>
      <button data-type="add-after"></button><button class="segment-delete" data-type="delete"></button>
    </div>
    <div class="segment" data-index="11">
      <input id="start-11" data-field="start" value="0:04.500">
      <input data-field="end" value="1:02.250">
      <input data-field="speaker" value="Bob">
      <textarea data-field="text">General Kenobi</textarea>
      <button data-type="play"></button><button data-type="pause"></button>
      <button data-type="rewind"></button><button data-type="add-before"></button>
      <button data-type="add-after"></button><button class="segment-delete" data-type="delete"></button>
    </div>
    <div class="segment" data-index="12">
      <input id="start-12" data-field="start" value="1:02.250">
      <input data-field="end" value="1:10.000">
      <input data-field="speaker" value="Alice">
      <textarea data-field="text">You are a bold one</textarea>
      <button data-type="play"></button><button data-type="pause"></button>
      <button data-type="rewind"></button><button data-type="add-before"></button>
      <button data-type="add-after"></button><button class="segment-delete" data-type="delete"></button>
    </div>
  </div>
</body>
</html>"#;

pub fn sample_page() -> EditPage {
    parse_edit_page(PAGE_HTML, 42).expect("fixture page parses")
}

pub fn ok(status: u16) -> Result<ApiResponse, SyncError> {
    Ok(ApiResponse::new(status, None))
}

pub fn ok_json(status: u16, body: &str) -> Result<ApiResponse, SyncError> {
    Ok(ApiResponse::new(status, Some(body.to_string())))
}

pub fn unreachable_server() -> Result<ApiResponse, SyncError> {
    Err(SyncError::Unavailable("connection refused".to_string()))
}

/// The single request among `effects`.
pub fn only_request(effects: &[SideEffect]) -> (RequestId, ApiRequest) {
    let requests: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            SideEffect::Request { id, request } => Some((*id, request.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(requests.len(), 1, "expected exactly one request in {:?}", effects);
    requests.into_iter().next().unwrap()
}

/// Media player that remembers every position it was sought to.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    clock: MediaClock,
    seeks: Vec<f64>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeks(&self) -> &[f64] {
        &self.seeks
    }
}

impl MediaPlayer for RecordingPlayer {
    fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    fn seek(&mut self, seconds: f64) {
        self.clock.seek(seconds);
        self.seeks.push(self.clock.current_time());
    }

    fn play(&mut self) {
        self.clock.play();
    }

    fn pause(&mut self) {
        self.clock.pause();
    }

    fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }
}

#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Scripted {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// In-memory transport: replays scripted responses per path and records
/// every request it sees. Unscripted paths answer 200 with no body.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, path: &str, response: Scripted) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn requests_to(&self, verb: Verb, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.verb == verb && request.path == path)
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SyncError> {
        self.seen.lock().unwrap().push(request.clone());
        let scripted = {
            let mut scripts = self.scripts.lock().unwrap();
            let next = scripts.get_mut(&request.path).and_then(VecDeque::pop_front);
            next
        };
        let scripted = scripted.unwrap_or_else(|| Scripted::status(200));

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        Ok(HttpResponse {
            status: scripted.status,
            body: scripted.body.into_bytes(),
        })
    }
}

pub fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(request.body.as_deref().unwrap_or(b"null")).unwrap()
}
