use std::path::PathBuf;

use clap::Parser;

/// Draws a colour-pulsing quad with shaders loaded from a single bundle file.
#[derive(Debug, Default, Parser)]
#[command(name = "sandbox", version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Shader bundle with `#shader vertex` and `#shader fragment` sections
    #[arg(long)]
    pub shader: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub title: Option<String>,
}
