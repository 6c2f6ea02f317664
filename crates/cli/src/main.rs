use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genga::{
    ArtStyle, EncodedImage, GeneratedFrame, Session, SessionError, StudioConfig, StudioServices,
    PRESETS,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "genga-cli")]
#[command(about = "Genga Studio CLI - Draw anime key frames from a description or a reference frame")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use the offline backend (placeholder frames, canned suggestions)
    #[arg(long, global = true)]
    offline: bool,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest follow-up prompts for a key frame
    Suggest {
        /// Reference key frame
        #[arg(short, long)]
        image: PathBuf,

        /// Print suggestions as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Generate key frames
    Generate {
        /// Scene description, or the modification when a reference frame is given
        #[arg(short, long)]
        description: String,

        /// Art style (see `styles`)
        #[arg(short, long, default_value = "Shonen Flame")]
        style: String,

        /// Number of key frames (1-5); forced to 1 with a reference frame
        #[arg(short, long, default_value = "3")]
        frames: u8,

        /// Reference key frame to continue
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "genga_frames")]
        output: PathBuf,
    },

    /// List available art styles
    Styles,

    /// List example scenes
    Presets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Suggest { image, json } => {
            let services = connect(cli.config.as_deref(), cli.offline)?;
            suggest_command(&services, image, json).await
        }
        Commands::Generate {
            description,
            style,
            frames,
            image,
            output,
        } => {
            let services = connect(cli.config.as_deref(), cli.offline)?;
            generate_command(&services, description, style, frames, image, output).await
        }
        Commands::Styles => {
            for style in ArtStyle::ALL {
                println!("{}", style);
            }
            Ok(())
        }
        Commands::Presets => {
            for (index, preset) in PRESETS.iter().enumerate() {
                println!("[{}] {} ({})\n    {}", index, preset.name, preset.style, preset.description);
            }
            Ok(())
        }
    }
}

fn connect(config_path: Option<&Path>, offline: bool) -> Result<StudioServices> {
    let mut config = StudioConfig::resolve(config_path)?;
    if offline {
        config = config.offline();
    }

    info!("Using {} backend", config.backend.backend_type);
    let (_, services) = genga::connect(&config)
        .context("backend unavailable; set GEMINI_API_KEY or pass --offline")?;
    Ok(services)
}

async fn suggest_command(services: &StudioServices, image_path: PathBuf, json: bool) -> Result<()> {
    let image = load_image(&image_path)?;

    let mut session = Session::new();
    session.upload_and_analyze(services, image).await?;

    if let Some(error) = session.last_error() {
        anyhow::bail!("{}", error);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(session.suggestions())?);
    } else if session.suggestions().is_empty() {
        println!("No suggestions. Write your own description.");
    } else {
        for (index, suggestion) in session.suggestions().iter().enumerate() {
            println!("{}. {}", index + 1, suggestion);
        }
    }

    Ok(())
}

async fn generate_command(
    services: &StudioServices,
    description: String,
    style: String,
    frames: u8,
    image_path: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let style: ArtStyle = style
        .parse()
        .map_err(|_| SessionError::UnknownStyle { name: style.clone() })?;

    let mut session = Session::new();
    session.set_style(style);
    session.set_frame_count(frames)?;

    if let Some(path) = image_path {
        let image = load_image(&path)?;
        session.upload_and_analyze(services, image).await?;

        match session.last_error() {
            Some(error) => warn!("{}", error),
            None if !session.suggestions().is_empty() => {
                info!("Suggested follow-ups: {}", session.suggestions().join(" | "));
            }
            None => {}
        }

        if frames != 1 {
            info!("Reference frame given; generating a single frame");
        }
    }

    session.set_description(description);
    session.generate(services).await?;

    if let Some(error) = session.last_error() {
        anyhow::bail!("{}", error);
    }

    let dir = output.join(chrono::Local::now().format("%Y%m%d_%H%M%S").to_string());
    let written = write_frames(session.frames(), &dir)?;

    for path in &written {
        println!("{}", path.display());
    }
    info!("Wrote {} frame(s) to {}", written.len(), dir.display());

    Ok(())
}

fn load_image(path: &Path) -> Result<EncodedImage> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    EncodedImage::from_file(path)
        .map_err(SessionError::from)
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Decode frames into `dir` as `frame_NN.<ext>`
fn write_frames(frames: &[GeneratedFrame], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    frames
        .iter()
        .map(|frame| {
            let path = dir.join(format!("frame_{:02}.{}", frame.position, frame.image.extension()));
            let bytes = frame
                .image
                .inline()
                .decode()
                .with_context(|| format!("frame {} is not valid base64", frame.position))?;
            std::fs::write(&path, bytes)?;
            Ok(path)
        })
        .collect()
}
