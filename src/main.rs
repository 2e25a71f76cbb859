//! VoiceMemo CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_memo::cli::{
    app::{load_merged_config, run_session, EXIT_ERROR, EXIT_USAGE},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    control_cmd::{handle_control_command, ControlAction},
    presenter::Presenter,
    SessionOptions,
};
use voice_memo::domain::config::AppConfig;
use voice_memo::domain::recording::Duration;
use voice_memo::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    let control_action = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Record) => Some(ControlAction::ToggleRecord),
        Some(Commands::Play) => Some(ControlAction::TogglePlay),
        Some(Commands::Status) => Some(ControlAction::Status),
        None => None,
    };

    if let Some(action) = control_action {
        if let Err(e) = handle_control_command(action, &presenter).await {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        memo_path: cli.file.clone(),
        max_duration: cli.max_duration.clone(),
        notify: if cli.notify { Some(true) } else { None },
    };

    // Merge config
    let config = load_merged_config(cli_config).await;

    // Parse max duration
    let max_duration = match config.max_duration.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid max-duration: {}", e));
                return ExitCode::from(EXIT_USAGE);
            }
        },
        None => Duration::default_max_duration(),
    };

    let options = SessionOptions {
        artifact: config.memo_artifact_or_default(),
        max_duration,
        notify: config.notify_or_default(),
    };

    run_session(options).await
}
