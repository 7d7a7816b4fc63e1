// ABOUTME: Main entry point for the gifpeek application
// ABOUTME: Wires configuration, logging and the fetcher into each command

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use gifpeek::cli::{Cli, Commands};
use gifpeek::completions::generate_completions;
use gifpeek::config::{Config, Settings};
use gifpeek::extract::{self, STDOUT};
use gifpeek::image_protocols::{FetchError, ImageFetcher};
use gifpeek::output::{JsonFormatter, OutputFormat, TableFormatter};
use gifpeek::tui::{shutdown_signal, AppState, Browser, CrosstermHost};
use gifpeek_decode::{DecodeError, SheetOptions};
use log::LevelFilter;
use std::io::IsTerminal;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match init_logging(&cli) {
        Ok(()) => run(cli).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        if let Some(help) = help_text(&err) {
            eprintln!();
            eprintln!("{help}");
        }
        std::process::exit(1);
    }
}

/// stderr belongs to the UI while browsing, so only log there when a file is given
fn init_logging(cli: &Cli) -> Result<()> {
    let interactive = matches!(cli.command, Commands::Browse { .. });
    if interactive && cli.log_file.is_none() {
        return Ok(());
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(path) = &cli.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialise logging")?;
    Ok(())
}

fn help_text(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<DecodeError>()
            .and_then(DecodeError::help_text)
            .or_else(|| cause.downcast_ref::<FetchError>().and_then(FetchError::help_text))
    })
}

fn use_color(cli: &Cli) -> bool {
    if cli.no_color {
        return false;
    }
    cli.force_color
        || (std::io::stdout().is_terminal()
            && std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").unwrap_or_default() != "dumb")
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        return generate_completions(shell, &mut cmd, &mut std::io::stdout());
    }

    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&config);
    log::debug!("resolved settings: {settings:?}");

    let interactive = matches!(cli.command, Commands::Browse { .. });
    let fetcher = ImageFetcher::new(settings.fetch_timeout, settings.fetch_max_bytes)?
        .with_progress(!interactive && std::io::stderr().is_terminal());
    let use_color = use_color(&cli);

    match cli.command {
        Commands::Browse { sources } => browse(sources, fetcher, &settings).await,
        Commands::Still { source, at, output } => {
            let index = extract::still(&fetcher, &source, at, &output, &settings.limits).await?;
            if output != STDOUT {
                eprintln!("Wrote frame {index} to {output}");
            }
            Ok(())
        }
        Commands::Sheet {
            source,
            frames,
            cols,
            padding,
            output,
        } => {
            let options = SheetOptions::builder()
                .count(frames)
                .columns(cols)
                .padding(padding)
                .build();
            extract::sheet(&fetcher, &source, &options, &output, &settings.limits).await?;
            if output != STDOUT {
                eprintln!("Wrote contact sheet to {output}");
            }
            Ok(())
        }
        Commands::Info { source, json, pretty } => {
            let info = extract::info(&fetcher, &source, &settings.limits).await?;
            let text = if json {
                JsonFormatter::new(pretty).format_info(&info)?
            } else {
                TableFormatter::new(use_color).format_info(&info)?
            };
            println!("{text}");
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

async fn browse(sources: Vec<String>, fetcher: ImageFetcher, settings: &Settings) -> Result<()> {
    let mut host = CrosstermHost::new()?;
    let mut browser = Browser::new(
        AppState::new(sources),
        Arc::new(fetcher),
        settings.preview,
        settings.limits,
    );

    let mut out = std::io::BufWriter::new(std::io::stdout());
    let events = crossterm::event::EventStream::new();

    browser.run(&mut out, &mut host, events, shutdown_signal()).await?;
    Ok(())
}
