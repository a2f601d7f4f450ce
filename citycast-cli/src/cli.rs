use std::{io::IsTerminal, process::ExitCode};

use anyhow::{Context, bail};
use citycast_core::{AppState, Config, Pipeline, ThemePalette, palette_for};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use serde::Serialize;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather at a glance")]
pub struct Cli {
    /// Log pipeline activity to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and default city.
    Configure,

    /// Show weather for a city once.
    Show {
        /// City name; the configured default city when absent.
        city: Option<String>,

        /// Print the state and palette as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Load the default city, then keep prompting for cities to look up.
    Search,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    state: &'a AppState,
    palette: ThemePalette,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => show(city, json).await,
            Command::Search => search().await,
        }
    }
}

fn configure() -> anyhow::Result<ExitCode> {
    // Read the file directly so an env-provided key is not persisted.
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let city = Text::new("Default city:")
        .with_default(cfg.default_city())
        .prompt()
        .context("Failed to read default city")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());
    cfg.save_to(&path)?;
    tracing::debug!(path = %path.display(), "configuration saved");

    println!("Saved configuration to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn show(city: Option<String>, json: bool) -> anyhow::Result<ExitCode> {
    let cfg = Config::load()?;
    let pipeline = Pipeline::from_config(&cfg)?;

    let state = match city {
        Some(city) => {
            if !pipeline.submit(&city).await {
                bail!("City name must not be empty.");
            }
            pipeline.state()
        }
        None => pipeline.mount().await,
    };

    if json {
        let snapshot = Snapshot { state: &state, palette: palette_for(&state) };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render::state(&state, std::io::stdout().is_terminal()));
    }

    Ok(exit_code(&state))
}

async fn search() -> anyhow::Result<ExitCode> {
    let cfg = Config::load()?;
    let pipeline = Pipeline::from_config(&cfg)?;
    let color = std::io::stdout().is_terminal();

    let mut updates = pipeline.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if let AppState::Loading { city } = &*updates.borrow_and_update() {
                eprintln!("Loading weather for {city}...");
            }
        }
    });

    let initial = pipeline.mount().await;
    print!("{}", render::state(&initial, color));

    loop {
        let input = match Text::new("City:")
            .with_help_message("Enter to search, Esc to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        if pipeline.submit(&input).await {
            print!("{}", render::state(&pipeline.state(), color));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code(state: &AppState) -> ExitCode {
    match state {
        AppState::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
