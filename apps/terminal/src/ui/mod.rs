//! Plain-text rendering of the three panes. Everything here is a pure
//! function of the models in `app::store`.

pub(crate) mod editor;
pub(crate) mod header;
pub(crate) mod sidebar;

use crate::app::store::AppStore;
use markpad_core::storage::KeyValueStore;

pub(crate) const PANE_WIDTH: usize = 72;

pub(crate) fn rule() -> String {
    "─".repeat(PANE_WIDTH)
}

/// Header, sidebar and editor stacked top to bottom.
pub(crate) fn render_screen<S: KeyValueStore>(app: &AppStore<S>) -> String {
    let mut out = header::render_header(&app.header_model());
    out.push_str(&sidebar::render_sidebar(
        &app.sidebar_rows(),
        app.documents.search(),
        app.sort,
    ));
    out.push_str(&rule());
    out.push('\n');
    out.push_str(&editor::render_editor(app.editor_model().as_ref()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use markpad_core::config::AppConfig;
    use markpad_core::storage::MemoryStorage;
    use markpad_core::store::DocumentStore;

    #[test]
    fn screen_contains_every_pane() {
        let mut app = AppStore::new(
            DocumentStore::load(MemoryStorage::new()),
            &AppConfig::default(),
        );
        let empty = render_screen(&app);
        assert!(empty.contains("Markdown Editor"));
        assert!(empty.contains("No documents"));
        assert!(empty.contains("Select or create a document to start editing..."));

        let doc = app.create_document();
        app.documents.set_content(&doc.id, "# Plan");
        let screen = render_screen(&app);
        assert!(screen.contains("▸ Untitled Document 1"));
        assert!(screen.contains("<h1>Plan</h1>"));
    }
}
