mod cli;
mod error;
mod output;

use crate::{
    cli::Args,
    error::{AppError, Result},
    output::OutputManager,
};
use clap::Parser;
use cuewatch_engine::{Session, validate_master_url};
use std::process;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    match run(args).await {
        Ok(()) => {}
        Err(e) if e.is_url_validation() => {
            println!("{e}");
        }
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let master_url = validate_master_url(&args.url)?;
    let output = OutputManager::new(args.output);
    let session = Session::new(args.monitor_config())?;

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping");
            ctrl_c_token.cancel();
        }
    });

    let (event_tx, mut event_rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(text) = output.render(&event)? {
                println!("{text}");
            }
        }
        Ok::<(), AppError>(())
    });

    info!(url = %master_url, "Starting ad-break monitoring");
    let result = session.run(&master_url, &event_tx, &token).await;
    drop(event_tx);
    printer.await??;

    let outcome = result?;
    info!(?outcome, "Monitoring finished");
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
