use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use artgen::{Assembler, GlslDialect, SeededSource, ShaderStage};
use renderer::Renderer;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::paths::AppPaths;
use crate::settings::{FileSettings, Settings};

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let file = load_file_settings(cli.settings.config.as_deref())?;
    let settings = Settings::resolve(file, &cli.settings)?;
    let seed = settings.seed.unwrap_or_else(seed_from_clock);

    println!("SEED: {seed}");
    tracing::info!(
        seed,
        complexity = settings.complexity,
        config = %settings.render,
        "resolved settings"
    );

    match cli.command {
        Some(Command::Print(args)) => print_sources(&settings, seed, args.dialect),
        None => Renderer::new(settings.renderer_config(seed, cli.dump_source)).run(),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the seed and printed sources.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_file_settings(explicit: Option<&Path>) -> Result<FileSettings> {
    if let Some(path) = explicit {
        return FileSettings::load(path);
    }
    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved autoart paths");
    FileSettings::load_or_default(&paths.settings_file())
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn print_sources(settings: &Settings, seed: u64, dialect: GlslDialect) -> Result<()> {
    let assembler = Assembler::new(settings.complexity, dialect);
    let sources = assembler.assemble(&settings.render, &mut SeededSource::new(seed));

    let mut stdout = io::stdout().lock();
    for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
        writeln!(stdout, "// {stage} shader")?;
        stdout.write_all(sources.stage(stage).as_bytes())?;
        writeln!(stdout)?;
    }
    stdout.flush().context("failed to write shader sources")
}
