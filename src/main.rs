use clap::Parser;
use log::{error, info};
use scanline_renderer::app::{run_cli, run_gui, show_texture};
use scanline_renderer::io::config::Config;
use scanline_renderer::scene::context::RenderMode;
use std::path::PathBuf;
use std::process::ExitCode;

/// Software renderer for OBJ/MTL scenes: wireframe, scanline raster or ray traced.
#[derive(Parser, Debug)]
#[command(name = "scanline-renderer", version)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render a single frame to the output file instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Render mode: wireframe, raster or raytraced.
    #[arg(short, long)]
    mode: Option<RenderMode>,

    /// Output image path for headless renders.
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Show a texture map as-is instead of rendering the scene.
    #[arg(long, value_name = "FILE")]
    texture: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            Config::load(path)?
        }
        None => {
            info!("No configuration given, using defaults");
            Config::default()
        }
    };

    if let Some(mode) = cli.mode {
        config.render.mode = mode.to_string();
    }
    if let Some(output) = cli.output {
        config.render.output = output;
    }

    if let Some(texture) = &cli.texture {
        return show_texture(&config, texture, cli.headless);
    }

    if cli.headless {
        run_cli(config)
    } else {
        run_gui(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
