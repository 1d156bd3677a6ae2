use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;

use linked_notes::{ActionOutcome, MenuAction, SequencerError, Target};

use crate::cli::utils::pluralize;
use crate::cli::App;

fn target(matches: &ArgMatches) -> Result<Target> {
    let path = matches
        .get_one::<PathBuf>("path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    Target::from_path(&path).with_context(|| format!("Invalid target {}", path.display()))
}

async fn run(app: &App, action: MenuAction, matches: &ArgMatches) -> Result<ActionOutcome> {
    let outcome = app
        .registry
        .dispatch(&app.sequencer, &app.settings, action, &target(matches)?)
        .await?;
    Ok(outcome)
}

pub async fn handle_new(app: &App, matches: &ArgMatches) -> Result<()> {
    if let ActionOutcome::Created(created) = run(app, MenuAction::NewUniqueNote, matches).await? {
        eprintln!("📝 Created {}", created.name);
        match &created.previous {
            Some(prev) => eprintln!("🔗 Linked with {}", prev.bare_name()),
            None => eprintln!("🔗 First note in folder, linked to itself"),
        }
    }
    Ok(())
}

pub async fn handle_last(app: &App, matches: &ArgMatches) -> Result<()> {
    if let ActionOutcome::Opened(None) = run(app, MenuAction::JumpToLast, matches).await? {
        eprintln!("No dated notes in {}", target(matches)?.folder().display());
    }
    Ok(())
}

pub async fn handle_conform(app: &App, matches: &ArgMatches) -> Result<()> {
    if !app.sequencer.reconcile_enabled() {
        return Err(SequencerError::ReconcileDisabled.into());
    }

    if let ActionOutcome::Conformed(count) = run(app, MenuAction::ConformFolder, matches).await? {
        eprintln!("✅ Conformed {}", pluralize("note", count));
    }
    Ok(())
}

pub fn handle_menu(app: &App, matches: &ArgMatches) -> Result<()> {
    for action in app.registry.menu_for(&target(matches)?) {
        println!("{}", action.title());
    }
    Ok(())
}
