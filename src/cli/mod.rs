pub mod picker;
pub mod watch;

use std::{env, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io;
use tracing::{level_filters::LevelFilter, warn};

use crate::{
    storage::{history::HistoryStorage, settings::Settings},
    tracker::manager::{SessionManager, StartOutcome, StopOutcome},
    utils::{
        clock::DefaultClock,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Workhours", version, long_about = None)]
#[command(about = "Personal time tracker with per-project session summaries", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Data directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start tracking a new session")]
    Start {
        #[arg(short, long, help = "Description recorded on the session")]
        description: Option<String>,
    },
    #[command(about = "Stop the session in progress and append it to the history")]
    Stop {},
    #[command(about = "Show the history length and the session in progress")]
    Show {},
    #[command(about = "Select the project new sessions are tagged with")]
    SelectProject {
        #[arg(help = "Project label. Prompts with the configured list when omitted")]
        project: Option<String>,
    },
    #[command(about = "Persist the currently selected project as the default")]
    SetDefaultProject {},
    #[command(about = "Open the history file in $VISUAL/$EDITOR")]
    Edit {},
    #[command(about = "Merge same-day sessions of the same project into summaries")]
    Summarize {},
    #[command(about = "Render the session status line, refreshed once per second")]
    Watch {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    // Creates the data directory, which the log appender also lives under.
    let storage = HistoryStorage::new(dir.clone())?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;
    let settings = Settings::load(&dir).await;
    let mut manager = SessionManager::load(storage, settings, Box::new(DefaultClock)).await;

    match args.commands {
        Commands::Start { description } => match manager.start(description).await {
            StartOutcome::Started { project: Some(p) } => {
                println!("Time tracking started! (project: {p})")
            }
            StartOutcome::Started { project: None } => println!("Time tracking started!"),
            StartOutcome::AlreadyRunning => println!("A session is already in progress."),
        },
        Commands::Stop {} => match manager.stop().await {
            StopOutcome::Stopped { hours } => {
                println!("Time tracking stopped. Total time: {hours:.2} hours.")
            }
            StopOutcome::NotRunning => println!("No session is currently in progress."),
        },
        Commands::Show {} => {
            println!("{} sessions in history.", manager.history_len());
            match manager.current_hours() {
                Some(hours) => println!("Current session duration: {hours:.2} hours."),
                None => println!("No session is currently in progress."),
            }
        }
        Commands::SelectProject { project } => {
            let project = match project {
                Some(project) => Some(project),
                None => picker::pick_project(manager.projects()).await?,
            };
            if let Some(project) = project {
                manager.select_project(project.clone()).await;
                println!("Current project set to: {project}");
            }
        }
        Commands::SetDefaultProject {} => match manager.set_default_project().await {
            Some(project) => println!("Default project set to: {project}"),
            None => println!("No project is currently selected."),
        },
        Commands::Edit {} => open_in_editor(&manager.history_path())?,
        Commands::Summarize {} => {
            let (before, after) = manager.summarize().await;
            println!("Merged {before} sessions into {after}.");
        }
        Commands::Watch {} => watch::run_status_line(&manager, &DefaultClock).await?,
    }
    Ok(())
}

/// Opens the history file in the user's editor for manual inspection.
fn open_in_editor(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        println!("No work hours file found to edit.");
        return Ok(());
    }

    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_owned());
    let status = std::process::Command::new(editor).arg(path).status()?;
    if !status.success() {
        warn!("Editor exited with {status}");
    }
    Ok(())
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("workhours");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("workhours");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
