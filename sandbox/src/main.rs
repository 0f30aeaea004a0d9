use clap::Parser;
use winit::dpi::LogicalSize;
use winit::window::WindowAttributes;

use common::{debug, run};

use crate::cli::Cli;
use crate::config::SandboxConfig;
use crate::sandbox::Sandbox;

mod cli;
mod config;
mod quad;
mod sandbox;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = SandboxConfig::load(cli.config.as_deref())?.with_overrides(&cli);
    debug::set_up_logging(config.log_level()?)?;

    let window_attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

    run::run::<Sandbox>(window_attributes, config.gl_settings(), config)
}
