//! CLI for Sketchlight - preview enhancement and photo generation.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sketchlight_core::{
    decode_image, encode_png, enhance, fit_to_width, EnhancementParams, PREVIEW_MAX_WIDTH,
};
use sketchlight_generate::{
    GenerateResponse, GenerationRequest, Orchestrator, DEFAULT_PROMPT, DEFAULT_STRENGTH,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sketchlight")]
#[command(about = "Turn sketches into lit previews and photoreal renderings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the local light/contrast/vignette pass to a sketch
    Enhance(EnhanceArgs),

    /// Render a sketch remotely with an image-to-image model
    Generate(GenerateArgs),
}

#[derive(Args)]
struct EnhanceArgs {
    /// Sketch image (PNG or JPEG)
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Key light intensity (0.0 to 1.0)
    #[arg(long, default_value_t = 0.25)]
    light: f32,

    /// Contrast (0.8 to 1.6)
    #[arg(long, default_value_t = 1.1)]
    contrast: f32,

    /// Vignette strength (0.0 to 0.8)
    #[arg(long, default_value_t = 0.2)]
    vignette: f32,

    /// Maximum preview width in pixels
    #[arg(long, default_value_t = PREVIEW_MAX_WIDTH)]
    max_width: u32,
}

#[derive(Args)]
struct GenerateArgs {
    /// Sketch image sent to the model as-is
    input: PathBuf,

    /// Text prompt
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Image strength (closer to 1 follows the prompt more than the sketch)
    #[arg(short, long, default_value_t = DEFAULT_STRENGTH)]
    strength: f64,

    /// Seed for deterministic generation (0 = random)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the response body as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance(args) => run_enhance(args).await?,
        Commands::Generate(args) => run_generate(args).await?,
    }

    Ok(())
}

async fn run_enhance(args: EnhanceArgs) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;

    let sketch = decode_image(&bytes)?;
    let preview = fit_to_width(&sketch, args.max_width)?;
    let params = EnhancementParams::new(args.light, args.contrast, args.vignette).clamped();
    tracing::debug!(?params, width = preview.width, height = preview.height, "Enhancing");

    let enhanced = enhance(&preview, &params)?;
    let png = encode_png(&enhanced)?;
    tokio::fs::write(&args.output, &png)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Enhanced preview: {} ({}x{}, {} bytes)",
        args.output.display(),
        enhanced.width,
        enhanced.height,
        png.len()
    );
    Ok(())
}

async fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let image = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;
    let request = GenerationRequest::new(image, args.prompt)
        .with_strength(args.strength)
        .with_seed(args.seed);

    // Missing credentials and client setup failures are reported like any other result
    let result = match Orchestrator::from_env() {
        Ok(orchestrator) => {
            let ctrl_c = async {
                // A failed signal hookup just means the run can't be interrupted
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            orchestrator.generate_with_cancel(request, ctrl_c).await
        }
        Err(err) => Err(err),
    };

    let (status, body) = GenerateResponse::from_result(&result);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else if let Some(url) = &body.image_url {
        println!("Generated image: {url}");
    } else if let Some(error) = &body.error {
        eprintln!("{error}");
    }

    if status != 200 {
        std::process::exit(1);
    }
    Ok(())
}
