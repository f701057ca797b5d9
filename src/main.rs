use exam_engine::config::{get_config, init_config, Config, LogFormat};
use exam_engine::routes::{self, err, Request};
use exam_engine::store::InMemoryStore;
use exam_engine::AppState;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config);

    let store = match &config.question_bank_path {
        Some(path) => {
            info!(path = %path, "Loading question bank");
            InMemoryStore::from_bank_file(path).await?
        }
        None => InMemoryStore::new(),
    };
    let state = AppState::new(Arc::new(store), config);

    info!("exam-engine ready, reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<Request>(&line) {
            Ok(req) => routes::handle_request(&state, req).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable request line");
                err(
                    "",
                    json!({ "code": "bad_json", "message": e.to_string() }),
                )
            }
        };

        let mut out = serde_json::to_string(&resp)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Logs go to stderr; stdout is reserved for responses.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
