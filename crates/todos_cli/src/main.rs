use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use std::path::Path;
use todos_cli::cli::{Cli, Command, ConfigOverrideTarget, normalize_args, parse_config_override};
use todos_cli::output;
use todos_core::config::{self, ConfigOverrides, Palette};
use todos_core::error::AppError;
use todos_core::storage::json_store;
use todos_core::task_api;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TODOS_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn normalize_parse_error(err: &clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn print_json(value: serde_json::Value) {
    println!("{value}");
}

fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::StorePath => overrides.store_path = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn palette_for_output(theme: Option<&str>, json: bool) -> Palette {
    if json || std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
        return Palette::PLAIN;
    }
    config::palette_for_theme(theme)
}

fn run_command(command: Command, path: &Path, palette: &Palette, json: bool) -> Result<(), AppError> {
    match command {
        Command::Add { text } => {
            let task = task_api::add_task(path, &text.join(" "))?;
            if json {
                print_json(output::task_json(&task));
            } else {
                println!("{}", output::added(&task));
            }
        }
        Command::List => {
            let collection = task_api::list_tasks(path);
            if json {
                print_json(output::list_json(&collection));
            } else {
                println!("{}", output::task_list(&collection, palette));
            }
        }
        Command::Complete { id } => {
            let completion = task_api::complete_task(path, id.as_deref().unwrap_or_default())?;
            if json {
                print_json(output::completion_json(&completion));
            } else {
                println!("{}", output::completed(&completion));
            }
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(path, id.as_deref().unwrap_or_default())?;
            if json {
                print_json(output::task_json(&task));
            } else {
                println!("{}", output::deleted(&task));
            }
        }
        Command::Clear => {
            let removed = task_api::clear_completed(path)?;
            if json {
                print_json(output::cleared_json(&removed));
            } else {
                println!("{}", output::cleared(&removed));
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let overrides = collect_overrides(&cli.config_override)?;
    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!("ignoring configuration: {}", err);
    }
    let config = config::merge_overrides(&loaded.config, &overrides);

    let path = json_store::store_path(&config)?;
    let palette = palette_for_output(config.theme.as_deref(), cli.json);
    run_command(command, &path, &palette, cli.json)
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            ErrorKind::InvalidSubcommand => {
                eprintln!("ERROR: {}", normalize_parse_error(&err));
                print_help();
                std::process::exit(1);
            }
            _ => {
                eprintln!("ERROR: {}", normalize_parse_error(&err));
                std::process::exit(1);
            }
        },
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
