use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use dotenv::dotenv;
use linked_notes::config::Config;
use linked_notes::logging::init_logging;
use std::path::PathBuf;
use std::process;

mod cli;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let matches = build_cli().get_matches();

    if let Err(e) = run_command(matches).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Folder of notes, or a note inside it")
        .index(1)
        .default_value(".")
        .value_parser(clap::value_parser!(PathBuf))
}

fn build_cli() -> Command {
    Command::new("linked-notes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Linked unique notes - timestamped notes chained to their predecessors")
        .long_about("Creates notes named by the current time, links each one to the previous note in its folder, and finds the latest note")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("new")
                .about("New unique note")
                .long_about("Create a note named by the current time and link it with the latest note in the folder")
                .arg(path_arg())
        )
        .subcommand(
            Command::new("last")
                .about("Jump to last unique note")
                .arg(path_arg())
        )
        .subcommand(
            Command::new("conform")
                .about("Conform folder to linked unique note")
                .long_about("Rewrite the header of every dated note in the folder to link its neighbours. Not idempotent; requires sequencer.reconcile_enabled")
                .arg(path_arg())
        )
        .subcommand(
            Command::new("menu")
                .about("List the actions available for a folder or note")
                .arg(path_arg())
        )
        .subcommand(
            Command::new("settings")
                .about("Show or edit note settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the current settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting and save it")
                        .arg(
                            Arg::new("key")
                                .help("Setting to change")
                                .required(true)
                                .index(1)
                                .value_parser(["date-format", "header-format"])
                        )
                        .arg(
                            Arg::new("value")
                                .help("New value")
                                .required(true)
                                .index(2)
                        )
                )
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .help("Settings file (JSON)")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("open-with")
                .long("open-with")
                .help("Command used to open notes; the note path is appended")
                .global(true)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue)
        )
}

async fn run_command(matches: ArgMatches) -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(settings_file) = matches.get_one::<PathBuf>("settings") {
        config.settings_file = settings_file.clone();
    }
    if let Some(open_with) = matches.get_one::<String>("open-with") {
        config.workspace.open_with = Some(open_with.clone());
    }

    init_logging(&config.logging, matches.get_flag("verbose"))
        .context("Failed to initialise logging")?;

    let mut app = cli::App::new(&config)?;

    match matches.subcommand() {
        Some(("new", sub_matches)) => cli::commands::note::handle_new(&app, sub_matches).await?,
        Some(("last", sub_matches)) => cli::commands::note::handle_last(&app, sub_matches).await?,
        Some(("conform", sub_matches)) => {
            cli::commands::note::handle_conform(&app, sub_matches).await?
        }
        Some(("menu", sub_matches)) => cli::commands::note::handle_menu(&app, sub_matches)?,
        Some(("settings", sub_matches)) => {
            cli::commands::settings::handle_settings(&mut app, sub_matches)?
        }
        _ => {
            unreachable!("Command parsing should ensure we never reach this");
        }
    }

    Ok(())
}
