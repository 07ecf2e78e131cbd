use crate::app::store::{EditorPaneModel, EMPTY_EDITOR_MESSAGE};

/// Raw markdown above its rendered preview.
pub(crate) fn render_editor(model: Option<&EditorPaneModel>) -> String {
    let Some(model) = model else {
        return format!("{EMPTY_EDITOR_MESSAGE}\n");
    };
    let mut out = format!("# {}  ({})\n\n", model.title, model.id);
    out.push_str(&model.content);
    if !model.content.is_empty() && !model.content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\n--- preview ---\n");
    out.push_str(&model.preview_html);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_message() {
        assert_eq!(
            render_editor(None),
            "Select or create a document to start editing...\n"
        );
    }

    #[test]
    fn raw_text_then_preview() {
        let model = EditorPaneModel {
            id: "abc".to_string(),
            title: "Notes".to_string(),
            content: "**hi**".to_string(),
            preview_html: "<p><strong>hi</strong></p>\n".to_string(),
        };
        assert_eq!(
            render_editor(Some(&model)),
            "# Notes  (abc)\n\n**hi**\n\n--- preview ---\n<p><strong>hi</strong></p>\n"
        );
    }
}
