//! `run` command implementation.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::RosterBlueprint;
use junction::Models;
use tracing::{debug, info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Person, RosterJunction, RunStats};

/// Execute the `run` command
pub async fn run_roster(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading roster");

    if !args.config.exists() {
        anyhow::bail!("Roster file not found: {}", args.config.display());
    }

    let mut roster = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load roster from {}", args.config.display()))?;

    if let Some(ref name) = args.name {
        info!(name = %name, "Overriding junction name from CLI");
        roster.junction.name = name.clone();
    }

    info!(
        junction = %roster.junction.name,
        closure_policy = ?roster.junction.closure_policy,
        people = roster.people.len(),
        updates = roster.updates.len(),
        "Roster loaded"
    );

    if args.dry_run {
        info!("Dry run mode - roster is valid, exiting");
        print_roster_summary(&roster);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let start = Instant::now();
    let mut junction = RosterJunction::start(&roster, args.buffer_size)
        .context("Failed to start roster junction")?;
    let people = junction.people().to_vec();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut updates_sent = 0u64;
    let mut snapshots_printed = 0u64;
    let mut interrupted = false;

    for update in &roster.updates {
        junction.send(update).await?;
        updates_sent += 1;

        if !junction.knows(update.id()) {
            debug!(id = update.id(), "No person with this id, expecting no snapshot");
            continue;
        }

        let snapshot = tokio::select! {
            _ = &mut shutdown => {
                warn!(
                    published = junction.handle().metrics().published,
                    "Received shutdown signal, stopping junction..."
                );
                interrupted = true;
                break;
            }
            snapshot = junction.snapshots().recv() => snapshot,
        };

        match snapshot {
            Some(person) => {
                print_snapshot(&person, args.json)?;
                snapshots_printed += 1;
            }
            None => {
                warn!("Snapshot stream closed before the script finished");
                break;
            }
        }
    }

    let termination = if interrupted {
        junction.stop().await?
    } else {
        junction.finish().await?
    };

    let stats = RunStats {
        updates_sent,
        snapshots_printed,
        duration: start.elapsed(),
        metrics: termination.metrics,
        cause: termination.cause,
    };

    info!(
        cause = %stats.cause,
        published = stats.metrics.published,
        unresolved = stats.metrics.unresolved,
        "Roster run finished"
    );

    if !args.json {
        stats.print_summary();
        print_final_people(&termination.models, &people);
    }
    Ok(())
}

fn print_snapshot(person: &Person, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(person).context("Failed to serialize snapshot")?;
        println!("{line}");
    } else {
        println!("{:>6}  {} ({})", person.id, person.name, person.age);
    }
    Ok(())
}

fn print_final_people(models: &Models, people: &[junction::ModelRef<Person>]) {
    println!("Final roster:");
    for person in people.iter().filter_map(|r| models.get(*r)) {
        println!("  - {} {} ({})", person.id, person.name, person.age);
    }
    println!();
}

/// Ctrl+C and SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_roster_summary(roster: &RosterBlueprint) {
    println!("\n=== Roster Summary ===\n");
    println!("Junction: {}", roster.junction.name);
    println!("  Closure policy: {:?}", roster.junction.closure_policy);
    println!("\nPeople ({}):", roster.people.len());
    for person in &roster.people {
        println!("  - {} {} ({})", person.id, person.name, person.age);
    }
    println!("\nUpdates: {}", roster.updates.len());
    println!();
}
