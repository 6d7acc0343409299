use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::{OsStr, OsString};

const EXAMPLES: &str = "Examples:
  todo add \"Buy groceries\"
  todo list
  todo complete 1
  todo delete 2
  todo clear";

#[derive(Parser, Debug)]
#[command(
    name = "todo",
    author,
    version,
    about = "Todo CLI - Simple task management",
    long_about = None,
    after_help = EXAMPLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: todo add "Buy milk"
    Add {
        /// Task description; multiple words are joined with spaces
        #[arg(value_name = "TASK", trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// List all tasks
    #[command(visible_alias = "ls")]
    List,
    /// Mark a task as complete
    ///
    /// Example: todo complete 1
    #[command(visible_alias = "done")]
    Complete { id: Option<String> },
    /// Delete a task
    ///
    /// Example: todo delete 2
    #[command(visible_alias = "rm")]
    Delete { id: Option<String> },
    /// Remove all completed tasks
    Clear,
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| format!("{CONFIG_OVERRIDE_FLAG} must be in KEY=VALUE format"))?;

    let value = value_raw.trim().to_string();
    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "store_path" | "storepath" | "store" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if target == ConfigOverrideTarget::StorePath && value.is_empty() {
        return Err("store_path override cannot be empty".to_string());
    }

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Number of argv tokens taken by a global option, or `None` for anything else.
fn global_arg_len(arg: &OsStr) -> Option<usize> {
    match arg.to_str()? {
        "--json" => Some(1),
        CONFIG_OVERRIDE_FLAG => Some(2),
        flag if flag.starts_with("--config-override=") => Some(1),
        _ => None,
    }
}

fn is_command_name(name: &str) -> bool {
    name == "help"
        || Cli::command()
            .get_subcommands()
            .any(|cmd| cmd.get_name() == name || cmd.get_all_aliases().any(|alias| alias == name))
}

/// Rewrites argv before clap sees it. Command names are matched
/// case-insensitively, and global options written among the words of `add`
/// are moved ahead of the command so they are not read as task text. A `--`
/// ends that search; everything after it is text.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let mut index = 1;
    while let Some(len) = args.get(index).and_then(|arg| global_arg_len(arg)) {
        index += len;
    }

    let Some(verb) = args.get_mut(index) else {
        return args;
    };
    if let Some(lowered) = verb.to_str().map(str::to_ascii_lowercase)
        && is_command_name(&lowered)
    {
        *verb = lowered.into();
    }
    if args[index] != "add" {
        return args;
    }

    let words = args.split_off(index + 1);
    let verb = args.split_off(index);
    let mut text = Vec::with_capacity(words.len());
    let mut rest = words.into_iter();
    while let Some(arg) = rest.next() {
        if arg == "--" {
            text.push(arg);
            text.extend(rest.by_ref());
            break;
        }
        match global_arg_len(&arg) {
            Some(2) => {
                args.push(arg);
                args.extend(rest.next());
            }
            Some(_) => args.push(arg),
            None => text.push(arg),
        }
    }

    args.extend(verb);
    args.extend(text);
    args
}
