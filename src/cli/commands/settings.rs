use anyhow::{Context, Result};
use clap::ArgMatches;

use linked_notes::SettingsPanel;

use crate::cli::App;

pub fn handle_settings(app: &mut App, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            let panel = SettingsPanel::new(&mut app.settings, &app.store);
            println!("{}", SettingsPanel::TITLE);
            for field in panel.fields() {
                println!();
                println!("{} ({})", field.name, field.key);
                println!("  {}", field.description);
                println!("  {:?}", field.value);
            }
            println!();
            println!("Settings file: {}", app.store.path().display());
        }
        Some(("set", sub_matches)) => {
            let key = sub_matches
                .get_one::<String>("key")
                .context("missing setting key")?;
            let value = sub_matches
                .get_one::<String>("value")
                .context("missing setting value")?;

            let mut panel = SettingsPanel::new(&mut app.settings, &app.store);
            panel
                .set(key, value)
                .with_context(|| format!("Failed to update {}", key))?;
            eprintln!("✅ Saved {} to {}", key, app.store.path().display());
        }
        _ => unreachable!("settings requires a subcommand"),
    }
    Ok(())
}
