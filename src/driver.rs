use anyhow::{anyhow, Context};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::EditorConfig;
use crate::kernel::event::{Completion, SideEffect, UiEvent};
use crate::kernel::media::MediaPlayer;
use crate::kernel::page::{self, EditPage};
use crate::kernel::reactor::Reactor;
use crate::services::api::{SyncClient, Transport, Verb};

const COMPLETION_BUFFER: usize = 100;

/// What is left once the UI channel closes and every request has resolved.
pub struct Session<M> {
    pub reactor: Reactor<M>,
    pub alerts: Vec<String>,
    pub reloads: usize,
}

/// Runs requests for a reactor. Each request gets its own task so a slow
/// response never holds up the UI or other requests.
pub struct Driver<T> {
    client: SyncClient<T>,
}

impl<T: Transport> Driver<T> {
    pub fn new(client: SyncClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SyncClient<T> {
        &self.client
    }

    pub async fn run<M: MediaPlayer>(
        &self,
        mut reactor: Reactor<M>,
        mut ui: mpsc::Receiver<UiEvent>,
    ) -> Session<M> {
        let (done_tx, mut done_rx) = mpsc::channel::<Completion>(COMPLETION_BUFFER);
        let mut alerts = Vec::new();
        let mut reloads = 0;
        let mut ui_open = true;

        loop {
            if !ui_open && reactor.in_flight() == 0 {
                break;
            }

            let effects = tokio::select! {
                event = ui.recv(), if ui_open => match event {
                    Some(event) => reactor.handle(event),
                    None => {
                        ui_open = false;
                        Vec::new()
                    }
                },
                Some(completion) = done_rx.recv() => reactor.complete(completion),
            };

            for effect in effects {
                match effect {
                    SideEffect::Request { id, request } => {
                        let client = self.client.clone();
                        let tx = done_tx.clone();
                        tokio::spawn(async move {
                            let outcome = client.execute(&request).await;
                            if let Err(e) = &outcome {
                                warn!(request = %id, "request failed: {}", e);
                            }
                            let _ = tx.send(Completion { id, outcome }).await;
                        });
                    }
                    SideEffect::Alert(message) => {
                        error!("{}", message);
                        alerts.push(message);
                    }
                    SideEffect::Reload => {
                        info!("page reload requested");
                        reloads += 1;
                    }
                }
            }
        }

        Session {
            reactor,
            alerts,
            reloads,
        }
    }
}

/// Fetch (or read) the edit page and mirror it. The page's anti-forgery
/// token is handed to the client for every later mutation.
pub async fn load_page<T: Transport>(
    client: &mut SyncClient<T>,
    config: &EditorConfig,
) -> anyhow::Result<EditPage> {
    let transcription_id = page::transcription_id_from_path(&config.edit_path)
        .ok_or_else(|| anyhow!("no transcription id in edit path {}", config.edit_path))?;

    let html = match &config.page_path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading page snapshot {}", path.display()))?,
        None => {
            let response = client
                .request::<()>(&config.edit_path, None, Verb::Get)
                .await
                .context("fetching edit page")?;
            if response.status != 200 {
                return Err(anyhow!(
                    "edit page {} answered {}",
                    config.edit_path,
                    response.status
                ));
            }
            response.body.unwrap_or_default()
        }
    };

    let mut page = page::parse_edit_page(&html, transcription_id).context("parsing edit page")?;
    if let Some(autoplay) = config.autoplay {
        page.autoplay = autoplay;
    }
    client.set_csrf_token(page.csrf_token.clone());

    info!(
        transcription = transcription_id,
        segments = page.segments.len(),
        "edit page loaded"
    );
    Ok(page)
}
