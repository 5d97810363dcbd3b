//! `photomask`: turn recorded brush strokes into mask files or quill edit
//! requests.
//!
//! Stroke documents are the JSON form of
//! [`photo_canvas::stroke::StrokeDocument`]: the source image size plus the
//! strokes in that image's pixel space.

mod backend;
mod config;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_canvas::error::MaskError;
use photo_canvas::payload::QuillPayload;
use photo_canvas::raster::{ColorBackground, MaskMode, MaskRequest, PixelSize, mask_filename, rasterize_async};
use photo_canvas::stroke::StrokeDocument;
use tracing::{info, warn};

use backend::{BackendError, BackendReply, EditBackend, HttpBackend};
use config::{BackendConfig, ConfigError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid stroke document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("--width and --height must be given together")]
    PartialTarget,
    #[error("no backend configured; set PHOTOMASK_BACKEND_URL or pass --backend-url")]
    MissingBackendUrl,
    #[error("payload task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Parser, Debug)]
#[command(name = "photomask", about = "Rasterize brush strokes into masks and quill edit requests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize a stroke document to a PNG mask.
    Mask(MaskArgs),
    /// Build a quill edit payload and optionally send it.
    Quill(QuillArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// White add/subtract strokes on black.
    Binary,
    /// Color strokes, optionally over a background image.
    Color,
    /// Every stroke erased out of opaque black.
    Alpha,
}

#[derive(Args, Debug)]
struct MaskArgs {
    /// Stroke document (JSON).
    #[arg(long)]
    strokes: PathBuf,

    #[arg(long, value_enum, default_value_t = ModeArg::Binary)]
    mode: ModeArg,

    /// Output width; defaults to the document's source width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height; defaults to the document's source height.
    #[arg(long)]
    height: Option<u32>,

    /// Image drawn under color strokes (`--mode color` only).
    #[arg(long)]
    background: Option<PathBuf>,

    /// Output file; defaults to `mask_<unix ms>.png`.
    #[arg(long, short)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct QuillArgs {
    /// Source photo.
    #[arg(long)]
    image: PathBuf,

    /// Stroke document (JSON) captured against the photo.
    #[arg(long)]
    strokes: PathBuf,

    #[arg(long, default_value = "")]
    positive: String,

    #[arg(long, default_value = "")]
    negative: String,

    /// Send the payload to the backend instead of writing it out.
    #[arg(long)]
    send: bool,

    #[arg(long, env = "PHOTOMASK_BACKEND_URL")]
    backend_url: Option<String>,

    /// Payload JSON (default `quill_<unix ms>.json`) or, with `--send`, the
    /// returned image (default `edit_<unix ms>.png`).
    #[arg(long, short)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Mask(args) => run_mask(args).await,
        Command::Quill(args) => run_quill(args).await,
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run_mask(args: MaskArgs) -> Result<(), CliError> {
    let document = read_document(&args.strokes).await?;
    let source = PixelSize::new(document.source_width, document.source_height);
    let target = match (args.width, args.height) {
        (Some(width), Some(height)) => PixelSize::new(width, height),
        (None, None) => source,
        _ => return Err(CliError::PartialTarget),
    };
    let mode = match args.mode {
        ModeArg::Binary => MaskMode::Binary,
        ModeArg::Alpha => MaskMode::AlphaPunch,
        ModeArg::Color => {
            let background = match &args.background {
                Some(path) => ColorBackground::Image(read_bytes(path).await?),
                None => ColorBackground::Transparent,
            };
            MaskMode::ColorComposite { background }
        }
    };
    if args.background.is_some() && args.mode != ModeArg::Color {
        warn!(mode = ?args.mode, "--background only applies to --mode color");
    }

    let request = MaskRequest { strokes: document.strokes, source, target, mode };
    let png = rasterize_async(request).await?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(mask_filename("mask", now_ms())));
    write_bytes(&out, &png).await?;
    info!(path = %out.display(), width = target.width, height = target.height, "mask written");
    Ok(())
}

async fn run_quill(args: QuillArgs) -> Result<(), CliError> {
    let config = BackendConfig::from_env()?;
    let document = read_document(&args.strokes).await?;
    let image = read_bytes(&args.image).await?;

    let size = config.mask_size;
    let strokes = document.strokes;
    let payload = tokio::task::spawn_blocking(move || QuillPayload::build(&image, &strokes, size))
        .await
        .map_err(|e| CliError::Task(e.to_string()))??
        .with_prompts(args.positive, args.negative);

    let original = payload.original_size;
    if (original.width, original.height) != (document.source_width, document.source_height) {
        warn!(
            doc_width = document.source_width,
            doc_height = document.source_height,
            image_width = original.width,
            image_height = original.height,
            "stroke document was captured against a different image size"
        );
    }

    if !args.send {
        let out = args.out.unwrap_or_else(|| PathBuf::from(format!("quill_{}.json", now_ms())));
        write_bytes(&out, &serde_json::to_vec_pretty(&payload)?).await?;
        info!(path = %out.display(), "payload written");
        return Ok(());
    }

    let base_url = args.backend_url.or(config.base_url).ok_or(CliError::MissingBackendUrl)?;
    let http = HttpBackend::new(&base_url, config.timeouts)?;
    info!(endpoint = http.endpoint(), "sending edit request");
    let backend: &dyn EditBackend = &http;
    match backend::edit(backend, &payload).await? {
        BackendReply::Image(bytes) => {
            let out = args.out.unwrap_or_else(|| PathBuf::from(mask_filename("edit", now_ms())));
            write_bytes(&out, &bytes).await?;
            info!(path = %out.display(), "edited image written");
        }
        BackendReply::Json(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

async fn read_document(path: &Path) -> Result<StrokeDocument, CliError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    let document = StrokeDocument::from_json(&raw)?;
    info!(path = %path.display(), strokes = document.strokes.len(), "stroke document loaded");
    Ok(document)
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_owned(), source })
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| CliError::Write { path: path.to_owned(), source })
}

fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis())
}
