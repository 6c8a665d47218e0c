use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use segsync::config::EditorConfig;
use segsync::console::{parse_command, USAGE};
use segsync::driver::{load_page, Driver};
use segsync::kernel::media::MediaClock;
use segsync::kernel::reactor::Reactor;
use segsync::services::api::{HttpTransport, SyncClient};
use segsync::timecode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EditorConfig::load()?;
    tracing::info!(base_url = %config.base_url, edit_path = %config.edit_path, "segsync starting");

    let transport = HttpTransport::new(&config.base_url, config.request_timeout())?;
    let mut client = SyncClient::new(transport);
    let page = load_page(&mut client, &config).await?;

    let mut reactor = Reactor::new(page, MediaClock::new());
    reactor.context.rewind_step = config.rewind_step_secs;
    tracing::info!(speakers = ?reactor.store.speakers(), "speakers on page");

    let (ui_tx, ui_rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();

        println!("{}", USAGE);

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(event) => {
                    if ui_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(message) => println!("{}", message),
            }
        }
    });

    let driver = Driver::new(client);
    let session = driver.run(reactor, ui_rx).await;

    for entry in session.reactor.store.entries() {
        let record = &entry.record;
        println!(
            "#{} [{} - {}] {}: {}",
            record.id,
            timecode::format_segment_time(record.start),
            timecode::format_segment_time(record.end),
            record.speaker,
            record.text
        );
    }
    if session.reloads > 0 {
        println!("page changed structurally, reload {}", config.edit_path);
    }

    Ok(())
}
