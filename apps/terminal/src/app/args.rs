use markpad_core::documents::SortKey;
use markpad_core::theme::Theme;
use std::path::PathBuf;

pub(crate) const USAGE: &str = "Usage: markpad [--data-dir <dir>] [--config <path>] <command>

Commands:
  list [--search <text>] [--sort date|title] [--json]
  new
  select <id>
  rename <id> <title>
  delete <id> [--yes]
  show [--html]
  edit
  export [--out <dir>]
  theme [toggle|light|dark]
  config [init]

Use -- to pass the remaining words verbatim, e.g. rename <id> -- --draft";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ThemeAction {
    Toggle,
    Set(Theme),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    List {
        search: Option<String>,
        sort: Option<SortKey>,
        json: bool,
    },
    New,
    Select {
        id: String,
    },
    Rename {
        id: String,
        title: String,
    },
    Delete {
        id: String,
        yes: bool,
    },
    Show {
        html: bool,
    },
    Edit,
    Export {
        out: Option<PathBuf>,
    },
    Theme {
        action: Option<ThemeAction>,
    },
    Config {
        init: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CliArgs {
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) command: Command,
}

fn take_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, String> {
    iter.next()
        .map(|value| value.to_string())
        .ok_or_else(|| format!("Missing {flag} value"))
}

/// Parses `args` including the program name at index 0. An empty error
/// string means help was requested.
pub(crate) fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut data_dir: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut command_name: Option<String> = None;
    let mut positionals: Vec<String> = Vec::new();
    let mut search: Option<String> = None;
    let mut sort: Option<SortKey> = None;
    let mut out: Option<PathBuf> = None;
    let mut json = false;
    let mut yes = false;
    let mut html = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        // Everything after `--`, and every word after `rename <id>`, is taken
        // verbatim so titles may look like flags.
        let title_words = command_name.as_deref() == Some("rename") && !positionals.is_empty();
        if arg == "--" || title_words {
            let rest = if arg == "--" { None } else { Some(arg) };
            for value in rest.into_iter().chain(iter.by_ref()) {
                if command_name.is_none() {
                    command_name = Some(value.to_string());
                } else {
                    positionals.push(value.to_string());
                }
            }
            break;
        }
        match arg.as_str() {
            "--data-dir" => data_dir = Some(PathBuf::from(take_value(&mut iter, "--data-dir")?)),
            "--config" => config_path = Some(PathBuf::from(take_value(&mut iter, "--config")?)),
            "--search" => search = Some(take_value(&mut iter, "--search")?),
            "--sort" => {
                let value = take_value(&mut iter, "--sort")?;
                sort = Some(
                    SortKey::from_str(&value)
                        .ok_or_else(|| format!("Unknown sort order: {value}"))?,
                );
            }
            "--out" => out = Some(PathBuf::from(take_value(&mut iter, "--out")?)),
            "--json" => json = true,
            "--yes" | "-y" => yes = true,
            "--html" => html = true,
            "--help" | "-h" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("Unknown argument: {flag}")),
            value => {
                if command_name.is_none() {
                    command_name = Some(value.to_string());
                } else {
                    positionals.push(value.to_string());
                }
            }
        }
    }

    let command_name = command_name.ok_or_else(|| "Missing command".to_string())?;
    let mut positionals = positionals.into_iter();
    let command = match command_name.as_str() {
        "list" | "ls" => Command::List { search, sort, json },
        "new" => Command::New,
        "select" => Command::Select {
            id: positionals
                .next()
                .ok_or_else(|| "select needs a document id".to_string())?,
        },
        "rename" => {
            let id = positionals
                .next()
                .ok_or_else(|| "rename needs a document id".to_string())?;
            let rest: Vec<String> = positionals.by_ref().collect();
            if rest.is_empty() {
                return Err("rename needs a title".to_string());
            }
            Command::Rename {
                id,
                title: rest.join(" "),
            }
        }
        "delete" | "rm" => Command::Delete {
            id: positionals
                .next()
                .ok_or_else(|| "delete needs a document id".to_string())?,
            yes,
        },
        "show" => Command::Show { html },
        "edit" => Command::Edit,
        "export" => Command::Export { out },
        "theme" => {
            let action = match positionals.next().as_deref() {
                None => None,
                Some("toggle") => Some(ThemeAction::Toggle),
                Some(other) => Some(ThemeAction::Set(
                    Theme::from_str(other).ok_or_else(|| format!("Unknown theme: {other}"))?,
                )),
            };
            Command::Theme { action }
        }
        "config" => {
            let init = match positionals.next().as_deref() {
                None => false,
                Some("init") => true,
                Some(other) => return Err(format!("Unknown config action: {other}")),
            };
            Command::Config { init }
        }
        other => return Err(format!("Unknown command: {other}")),
    };

    if let Some(extra) = positionals.next() {
        return Err(format!("Unexpected argument: {extra}"));
    }

    Ok(CliArgs {
        data_dir,
        config_path,
        command,
    })
}
