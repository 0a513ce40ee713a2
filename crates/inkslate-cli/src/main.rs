//! Command-line host: export and render whiteboard files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inkslate_core::{EditorConfig, EditorSession, FileStorage, MemoryStorage, StorageHost, Whiteboard};
use inkslate_render::{CanvasRenderer, PixmapSurface, SessionRender};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "inkslate")]
#[command(version, about = "Whiteboard export and rendering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the normalized export of a whiteboard file
    Export {
        /// Whiteboard JSON file
        board: PathBuf,

        /// Also save the board into this storage directory
        #[arg(long, value_name = "DIR")]
        into: Option<PathBuf>,
    },
    /// Render a whiteboard file to PNG
    Render {
        /// Whiteboard JSON file
        board: PathBuf,

        /// Output PNG path
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,

        /// Editor config (TOML)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Export { board, into } => export(&board, into.as_deref()),
        Command::Render { board, output, config } => render(&board, &output, config.as_deref()),
    }
}

fn read_board(path: &Path) -> Result<Whiteboard> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Whiteboard::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        log::debug!("No config given, using defaults");
        return Ok(EditorConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: EditorConfig =
        toml::from_str(&text).with_context(|| format!("Failed to parse config from {}", path.display()))?;
    let config = config
        .validate()
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

fn export(path: &Path, into: Option<&Path>) -> Result<()> {
    let board = read_board(path)?;
    println!("{}", board.to_pretty_json()?);

    if let Some(dir) = into {
        let storage = FileStorage::new(dir.to_path_buf())?;
        let mut session = EditorSession::open(board, StorageHost::new(storage), EditorConfig::default());
        pollster::block_on(session.save())?;
        log::info!("Saved {} into {}", session.id(), dir.display());
        session.close();
    }
    Ok(())
}

fn render(path: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let board = read_board(path)?;
    let session = EditorSession::open(board, StorageHost::new(MemoryStorage::new()), config);

    let mut surface = PixmapSurface::for_viewport(session.viewport())?;
    session.render(&CanvasRenderer::new(), &mut surface);
    if surface.skipped_text() > 0 {
        log::warn!("{} text runs were not rasterized", surface.skipped_text());
    }

    let png = surface.encode_png()?;
    fs::write(output, png).with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Rendered {} to {}", path.display(), output.display());
    session.close();
    Ok(())
}
