pub(crate) mod args;
pub(crate) mod store;

use crate::ui;
use anyhow::Context;
use args::{CliArgs, Command, ThemeAction};
use markpad_core::app::open_document_store;
use markpad_core::config::ConfigStore;
use markpad_core::storage::KeyValueStore;
use std::io::{BufRead, BufReader, Write};
use store::{AppStore, DeleteOutcome, DELETE_PROMPT, EMPTY_EDITOR_MESSAGE};

pub(crate) fn run(args: CliArgs) -> anyhow::Result<()> {
    let config_store = match args.config_path {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_store().context("locating config directory")?,
    };
    let mut config = config_store
        .load()
        .with_context(|| format!("reading {}", config_store.path().display()))?;
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir.to_string_lossy().to_string());
    }
    tracing::debug!(?config, "configuration loaded");

    let documents = open_document_store(&config)?;
    let mut app = AppStore::new(documents, &config);

    let stdout = std::io::stdout();
    run_command(
        &mut app,
        args.command,
        &config_store,
        &mut stdout.lock(),
        BufReader::new(std::io::stdin()),
    )
}

/// Applies one command to `app`, writing output to `out`. Confirmation
/// prompts read from `input`; `edit` hands it to the line reader thread.
pub(crate) fn run_command<S, R>(
    app: &mut AppStore<S>,
    command: Command,
    config_store: &ConfigStore,
    out: &mut impl Write,
    mut input: R,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    R: BufRead + Send + 'static,
{
    match command {
        Command::List { search, sort, json } => {
            if let Some(search) = search {
                app.set_search(&search);
            }
            if let Some(sort) = sort {
                app.sort = sort;
            }
            if json {
                let active_id = app.documents.active_id();
                let rows: Vec<serde_json::Value> = app
                    .documents
                    .visible_documents(app.sort)
                    .into_iter()
                    .map(|doc| {
                        serde_json::json!({
                            "id": doc.id,
                            "title": doc.title,
                            "createdAt": doc.created_at.to_rfc3339(),
                            "active": active_id == Some(doc.id.as_str()),
                        })
                    })
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
            } else {
                write!(
                    out,
                    "{}",
                    ui::sidebar::render_sidebar(&app.sidebar_rows(), app.documents.search(), app.sort)
                )?;
            }
        }
        Command::New => {
            let doc = app.create_document();
            writeln!(out, "Created {} ({})", doc.title, doc.id)?;
        }
        Command::Select { id } => {
            let id = app.select_document(&id);
            match app.documents.active_document() {
                Some(doc) => writeln!(out, "Selected {} ({})", doc.title, doc.id)?,
                None => {
                    tracing::debug!(%id, "selected id has no document");
                    writeln!(out, "{EMPTY_EDITOR_MESSAGE}")?;
                }
            }
        }
        Command::Rename { id, title } => {
            if app.rename_document(&id, &title) {
                writeln!(out, "Renamed to {title}")?;
            } else {
                writeln!(out, "No document matches {id}")?;
            }
        }
        Command::Delete { id, yes } => {
            let outcome = app.delete_document(&id, |doc| {
                yes || confirm_delete(&doc.title, &mut *out, &mut input).unwrap_or(false)
            });
            match outcome {
                DeleteOutcome::Deleted => writeln!(out, "Deleted")?,
                DeleteOutcome::Cancelled => writeln!(out, "Cancelled")?,
                DeleteOutcome::NotFound => writeln!(out, "No document matches {id}")?,
            }
        }
        Command::Show { html } => match app.editor_model() {
            Some(model) if html => write!(out, "{}", model.preview_html)?,
            _ => write!(out, "{}", ui::render_screen(app))?,
        },
        Command::Edit => {
            let events = store::editor::spawn_line_reader(input);
            let summary = store::editor::run_session(app, events, out)?;
            tracing::debug!(commits = summary.commits, discarded = summary.discarded, "edit session closed");
        }
        Command::Export { out: dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir().context("resolving current directory")?,
            };
            let path = app.export_active(&dir)?;
            writeln!(out, "Exported {}", path.display())?;
        }
        Command::Theme { action } => {
            let theme = match action {
                None => app.theme,
                Some(ThemeAction::Toggle) => app.toggle_theme(),
                Some(ThemeAction::Set(theme)) => {
                    app.set_theme(theme);
                    theme
                }
            };
            writeln!(out, "Theme: {}", theme.as_str())?;
        }
        Command::Config { init } => {
            let path = config_store.path();
            if !init {
                writeln!(out, "Config file: {}", path.display())?;
                writeln!(out, "{}", serde_json::to_string_pretty(&app.config)?)?;
            } else if path.exists() {
                writeln!(out, "Config already exists at {}", path.display())?;
            } else {
                config_store
                    .save(&app.config)
                    .with_context(|| format!("writing {}", path.display()))?;
                writeln!(out, "Wrote {}", path.display())?;
            }
        }
    }

    if let Some(err) = app.documents.last_persist_error() {
        writeln!(out, "warning: changes may not be saved: {err}")?;
    }
    Ok(())
}

fn confirm_delete(
    title: &str,
    out: &mut impl Write,
    input: &mut impl BufRead,
) -> std::io::Result<bool> {
    write!(out, "{title}: {DELETE_PROMPT} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
