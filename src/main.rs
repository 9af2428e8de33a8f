use anyhow::Result;
use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use textgrab::config::AppConfig;
use textgrab::export::{self, ExportFormat};
use textgrab::extraction::ExtractionStore;
use textgrab::ingest;
use textgrab::ocr::TesseractBackend;
use textgrab::ocr_errors::OCR_FAILURE_PLACEHOLDER;
use textgrab::pipeline;
use textgrab::storage::LocalStorage;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber; LOG_FORMAT=json switches to JSON output
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_output = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    init_logging();

    // Load and validate configuration early
    let config = AppConfig::from_env()?;
    config.validate()?;
    info!("{}", config.summary());

    let mut args = env::args().skip(1);
    let input_path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("Usage: textgrab <image-path> [pdf|json|xml]"))?;
    let format = match args.next() {
        Some(raw) => Some(raw.parse::<ExportFormat>()?),
        None => None,
    };

    let storage = LocalStorage::new(&config.storage.upload_dir);
    let store = ExtractionStore::new();
    let recognizer = Arc::new(TesseractBackend::new(config.ocr.tessdata_path.clone()));

    // Ingest the input file as if it had arrived as an upload
    let bytes = fs::read(&input_path)?;
    let original_name = Path::new(&input_path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Input path '{}' has no usable file name", input_path))?;
    let filename = ingest::accept_upload(&storage, &config.storage, &bytes, original_name)?;
    store.register(&filename);
    info!(stored = %filename, "Input file ingested");

    match pipeline::extract(&storage, &store, recognizer, &config, &filename).await {
        Ok(result) => {
            let text = result.text.unwrap_or_default();
            let counts = textgrab::text::counts(&text);
            info!(
                characters = counts.characters,
                words = counts.words,
                lines = counts.lines,
                "Text extracted"
            );
            println!("{}", text);

            if let Some(format) = format {
                let file_info = storage.stat(&filename).ok();
                let artifact = export::export(
                    format,
                    &config.export,
                    &text,
                    &filename,
                    result.processed_at.unwrap_or_else(Utc::now),
                    file_info.as_ref(),
                )?;
                fs::write(&artifact.download_name, &artifact.bytes)?;
                info!(
                    artifact = %artifact.download_name,
                    size_bytes = artifact.bytes.len(),
                    "Export written"
                );
            }
        }
        Err(err) => {
            eprintln!("{}: {}", OCR_FAILURE_PLACEHOLDER, err);
            return Err(err.into());
        }
    }

    // Sweep expired uploads on the way out
    let report = storage.cleanup(&config.storage.cleanup)?;
    info!(
        deleted_count = report.deleted_count,
        "{}", report.message
    );

    Ok(())
}
