use chrono::{DateTime, Local, TimeZone};
use markpad_core::app::AppError;
use markpad_core::config::AppConfig;
use markpad_core::documents::{Document, SortKey};
use markpad_core::export::MarkdownExport;
use markpad_core::markdown::render_html;
use markpad_core::storage::KeyValueStore;
use markpad_core::store::DocumentStore;
use markpad_core::theme::{load_theme, save_theme, Theme};
use std::path::{Path, PathBuf};
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

pub(crate) mod editor;

pub(crate) const APP_TITLE: &str = "Markdown Editor";
pub(crate) const EMPTY_EDITOR_MESSAGE: &str = "Select or create a document to start editing...";
pub(crate) const DELETE_PROMPT: &str = "Are you sure you want to delete this document?";
const SIDEBAR_TITLE_MAX: usize = 40;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SidebarRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created: String,
    pub(crate) active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeaderModel {
    pub(crate) title: &'static str,
    pub(crate) can_export: bool,
    pub(crate) theme: Theme,
}

impl HeaderModel {
    /// The toggle offers the other theme, as the button label does.
    pub(crate) fn theme_toggle_label(&self) -> &'static str {
        if self.theme.is_dark() {
            "☀ Light Mode"
        } else {
            "🌙 Dark Mode"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EditorPaneModel {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) preview_html: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeleteOutcome {
    Deleted,
    Cancelled,
    NotFound,
}

/// View-side state around the document store: theme, sort order, and the
/// models each pane renders from.
pub(crate) struct AppStore<S: KeyValueStore> {
    pub(crate) documents: DocumentStore<S>,
    pub(crate) theme: Theme,
    pub(crate) sort: SortKey,
    pub(crate) autosave_debounce: Duration,
    pub(crate) config: AppConfig,
}

impl<S: KeyValueStore> AppStore<S> {
    pub(crate) fn new(documents: DocumentStore<S>, config: &AppConfig) -> Self {
        let theme = load_theme(documents.storage(), config.default_theme);
        Self {
            documents,
            theme,
            sort: config.default_sort,
            autosave_debounce: config.autosave_debounce(),
            config: config.clone(),
        }
    }

    /// Full id for a unique prefix; anything else passes through unchanged.
    pub(crate) fn resolve_id(&self, input: &str) -> String {
        if self.documents.get(input).is_some() || input.is_empty() {
            return input.to_string();
        }
        let mut matches = self
            .documents
            .documents()
            .iter()
            .filter(|doc| doc.id.starts_with(input));
        match (matches.next(), matches.next()) {
            (Some(doc), None) => doc.id.clone(),
            _ => input.to_string(),
        }
    }

    pub(crate) fn create_document(&mut self) -> Document {
        self.documents.create().clone()
    }

    pub(crate) fn select_document(&mut self, input: &str) -> String {
        let id = self.resolve_id(input);
        self.documents.select(&id);
        id
    }

    pub(crate) fn rename_document(&mut self, input: &str, title: &str) -> bool {
        let id = self.resolve_id(input);
        self.documents.set_title(&id, title)
    }

    /// Deletes only after `confirm` agrees.
    pub(crate) fn delete_document(
        &mut self,
        input: &str,
        confirm: impl FnOnce(&Document) -> bool,
    ) -> DeleteOutcome {
        let id = self.resolve_id(input);
        let Some(doc) = self.documents.get(&id) else {
            return DeleteOutcome::NotFound;
        };
        if !confirm(doc) {
            return DeleteOutcome::Cancelled;
        }
        self.documents.delete(&id);
        DeleteOutcome::Deleted
    }

    pub(crate) fn set_search(&mut self, text: &str) {
        self.documents.set_search(text);
    }

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(err) = save_theme(self.documents.storage_mut(), theme) {
            tracing::warn!(error = %err, "failed to persist theme");
        }
    }

    pub(crate) fn toggle_theme(&mut self) -> Theme {
        let next = self.theme.toggled();
        self.set_theme(next);
        next
    }

    pub(crate) fn export_active(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let doc = self
            .documents
            .active_document()
            .ok_or(AppError::NoActiveDocument)?;
        let export = MarkdownExport::new(&doc.title, &doc.content);
        Ok(export.write_to_dir(dir)?)
    }

    pub(crate) fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let active_id = self.documents.active_id();
        self.documents
            .visible_documents(self.sort)
            .into_iter()
            .map(|doc| SidebarRow {
                id: doc.id.clone(),
                title: truncate_graphemes(&doc.title, SIDEBAR_TITLE_MAX),
                created: format_created(&doc.created_at.with_timezone(&Local)),
                active: active_id == Some(doc.id.as_str()),
            })
            .collect()
    }

    pub(crate) fn header_model(&self) -> HeaderModel {
        HeaderModel {
            title: APP_TITLE,
            can_export: self.documents.active_document().is_some(),
            theme: self.theme,
        }
    }

    pub(crate) fn editor_model(&self) -> Option<EditorPaneModel> {
        let doc = self.documents.active_document()?;
        Some(EditorPaneModel {
            id: doc.id.clone(),
            title: doc.title.clone(),
            content: doc.content.clone(),
            preview_html: render_html(&doc.content),
        })
    }
}

pub(crate) fn format_created<Tz: TimeZone>(created: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    created.format("%b %-d, %Y").to_string()
}

pub(crate) fn truncate_graphemes(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    let mut out: String = graphemes[..max.saturating_sub(1)].concat();
    out.push('…');
    out
}
