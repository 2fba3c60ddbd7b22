mod cli;
mod cmds;
mod harden;
mod hd;
mod input;
mod na;
mod ra;

use anyhow::{Result, anyhow, bail};
use clap::{CommandFactory, Parser};
use cli::{Cli, Cmd};
use nf_common::ForgeError;
use nf_engine::{CommandLists, ListenCommand, TransmitCommand, listener, scheduler};
use nf_net::SenderRegistry;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Gather every invocation before building anything, so file-driven and
    // direct subcommands go through the same path.
    let mut invocations: Vec<Cmd> = Vec::new();
    if let Some(path) = &cli.json {
        invocations.extend(input::from_json_file(path)?);
    }
    if let Some(path) = &cli.execute {
        invocations.extend(input::from_script_file(path)?);
    }
    if let Some(cmd) = cli.command {
        invocations.push(cmd);
    }
    if invocations.is_empty() {
        Cli::command().print_help()?;
        bail!("Too few arguments");
    }

    // Build both command lists completely before either peer starts. A bad
    // command aborts only itself; the rest still get built and reported.
    let mut registry = SenderRegistry::new();
    let mut lists = CommandLists::new();
    let mut failed = 0usize;
    for cmd in &invocations {
        if let Err(err) = cmds::append(cmd, &mut registry, &mut lists) {
            error!(error = %format!("{err:#}"), "skipping command");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} commands could not be built", invocations.len());
    }

    let (transmits, listens) = lists.into_parts();
    run_peers(transmits, listens).await
}

/// Split into a transmitter peer and a receiver peer joined by a control
/// channel; the channel currently carries only the transmitter's exit
/// status.
async fn run_peers(
    transmits: Vec<TransmitCommand>,
    listens: Vec<ListenCommand>,
) -> Result<()> {
    let has_transmits = !transmits.is_empty();
    let (status_tx, status_rx) = mpsc::channel::<Result<(), ForgeError>>(1);

    let transmitter = tokio::spawn(async move {
        harden::lock_down();
        let res = scheduler::run(transmits).await;
        // The receiver may already be gone in listen-only runs
        let _ = status_tx.send(res).await;
    });

    let receiver = tokio::spawn(receiver_peer(listens, status_rx, has_transmits));

    let received = receiver
        .await
        .map_err(|err| anyhow!("receiver peer died: {err}"))?;
    if let Err(err) = received {
        transmitter.abort();
        return Err(err.into());
    }
    transmitter
        .await
        .map_err(|err| anyhow!("transmitter peer died: {err}"))?;
    Ok(())
}

/// The supervising peer: drives the listeners and waits for the transmitter
/// to finish. A run with listeners but nothing to transmit keeps listening
/// until interrupted.
async fn receiver_peer(
    listens: Vec<ListenCommand>,
    mut status_rx: mpsc::Receiver<Result<(), ForgeError>>,
    has_transmits: bool,
) -> Result<(), ForgeError> {
    harden::lock_down();

    if listens.is_empty() {
        return status_rx.recv().await.unwrap_or(Ok(()));
    }

    let mut registry = SenderRegistry::new();
    if has_transmits {
        tokio::select! {
            res = listener::run(listens, &mut registry) => res,
            status = status_rx.recv() => {
                info!("transmitter finished, shutting down listeners");
                status.unwrap_or(Ok(()))
            }
        }
    } else {
        tokio::select! {
            res = listener::run(listens, &mut registry) => res,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down listeners");
                Ok(())
            }
        }
    }
}
