use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thumbcraft::config;
use thumbcraft::output;
use thumbcraft::pipeline::ThumbnailPipeline;
use thumbcraft::request::{RequestParams, ThumbnailRequest};
use thumbcraft::response::ThumbnailResponse;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Layout flags, mirroring the upload form fields.
#[derive(clap::Args, Clone)]
struct LayoutArgs {
    /// Target platform: youtube, instagram, instagram-story, facebook, twitter, or custom
    #[arg(long, default_value = "custom")]
    platform: String,

    /// Aspect ratio W:H used when the platform is not a preset
    #[arg(long, default_value = "16:9")]
    aspect: String,

    /// Force a second resample pass to the target size
    #[arg(long)]
    upscale: bool,

    /// Title drawn centered on the thumbnail
    #[arg(long, default_value = "")]
    title: String,

    /// Link drawn in the top-left corner
    #[arg(long, default_value = "")]
    link: String,
}

impl From<LayoutArgs> for RequestParams {
    fn from(args: LayoutArgs) -> Self {
        RequestParams::from_fields([
            ("platform", args.platform.as_str()),
            ("aspect", args.aspect.as_str()),
            ("upscale", if args.upscale { "true" } else { "false" }),
            ("title", args.title.as_str()),
            ("link", args.link.as_str()),
        ])
    }
}

#[derive(Parser)]
#[command(name = "thumbcraft")]
#[command(version)]
#[command(about = "Platform-sized thumbnails with title, link, and watermark overlays")]
#[command(long_about = "\
Platform-sized thumbnails with title, link, and watermark overlays

The main image is scaled to cover the target size and center-cropped. The
title is drawn centered, the link in the top-left corner, and the watermark
(15% of the width) in the bottom-right corner. Output is AVIF, or JPEG if AVIF
encoding fails.

Without --output, the JSON response is printed to stdout:
  {\"thumbnail\": \"data:image/avif;base64,...\"}  or  {\"error\": \"...\"}

Logging goes to stderr; set RUST_LOG=debug for per-stage detail.")]
struct Cli {
    /// Directory holding config.toml and the assets it references
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one thumbnail
    Render {
        /// Main image (JPEG, PNG, TIFF, WebP, or AVIF)
        #[arg(long)]
        image: PathBuf,

        /// Optional watermark image; skipped with a warning if unreadable
        #[arg(long)]
        watermark: Option<PathBuf>,

        /// Write the encoded image here instead of printing JSON.
        /// The extension is replaced to match the output format.
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// List platform presets
    Platforms,
    /// Validate config and font without rendering
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            image,
            watermark,
            output: out_path,
            layout,
        } => {
            let pipeline = load_pipeline(&cli.config)?;
            let request = build_request(&image, watermark.as_deref(), layout.into());
            let result = pipeline.render(&request);

            if let (Some(path), Ok(encoded)) = (&out_path, &result) {
                let path = path.with_extension(encoded.format.extension());
                std::fs::write(&path, &encoded.bytes)?;
                output::print_written(encoded, &path);
                return Ok(ExitCode::SUCCESS);
            }

            let (status, body) = ThumbnailResponse::from_result(&result);
            println!("{}", body.to_json());
            if status.http_code() == 200 {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Platforms => {
            output::print_platforms();
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            ThumbnailPipeline::from_config(&config, &cli.config)?;
            output::print_check(
                &cli.config.join("config.toml"),
                &config.assets.font_path(&cli.config),
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load config and font; any failure stops the process before rendering.
fn load_pipeline(root: &Path) -> Result<ThumbnailPipeline, Box<dyn std::error::Error>> {
    let config = config::load_config(root)?;
    Ok(ThumbnailPipeline::from_config(&config, root)?)
}

/// Read upload files into a request.
///
/// An unreadable main image becomes an absent one, so it is reported the same
/// way as a missing upload. An unreadable watermark is dropped.
fn build_request(
    image: &Path,
    watermark: Option<&Path>,
    params: RequestParams,
) -> ThumbnailRequest {
    let main_image = std::fs::read(image)
        .inspect_err(|e| warn!(path = %image.display(), error = %e, "cannot read main image"))
        .ok();
    let watermark = watermark.and_then(|path| {
        std::fs::read(path)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "cannot read watermark"))
            .ok()
    });
    ThumbnailRequest {
        main_image,
        watermark,
        params,
    }
}
