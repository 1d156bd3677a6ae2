pub mod commands;
pub mod utils;

use anyhow::{Context, Result};
use linked_notes::config::Config;
use linked_notes::settings::load_settings;
use linked_notes::{CommandRegistry, ConsoleWorkspace, FsVault, JsonFileStore, Sequencer, Settings};
use std::sync::Arc;

/// Everything a command needs, built once per invocation
pub struct App {
    pub settings: Settings,
    pub store: JsonFileStore,
    pub sequencer: Sequencer,
    pub registry: CommandRegistry,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let store = JsonFileStore::new(&config.settings_file);
        let settings = load_settings(&store).with_context(|| {
            format!("Failed to load settings from {}", config.settings_file.display())
        })?;

        let reconcile_enabled = config.sequencer.reconcile_enabled;
        let sequencer = Sequencer::new(
            Arc::new(FsVault::new()),
            Arc::new(ConsoleWorkspace::new(config.workspace.open_with.clone())),
        )
        .with_reconcile(reconcile_enabled);

        Ok(Self {
            settings,
            store,
            sequencer,
            registry: CommandRegistry::standard(reconcile_enabled),
        })
    }
}
