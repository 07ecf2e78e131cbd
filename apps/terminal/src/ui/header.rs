use super::PANE_WIDTH;
use crate::app::store::HeaderModel;
use unicode_segmentation::UnicodeSegmentation;

const EXPORT_LABEL: &str = "[Export .md]";

pub(crate) fn render_header(model: &HeaderModel) -> String {
    let mut actions = Vec::new();
    if model.can_export {
        actions.push(EXPORT_LABEL.to_string());
    }
    actions.push(format!("[{}]", model.theme_toggle_label()));
    let actions = actions.join(" ");

    let used = model.title.graphemes(true).count() + actions.graphemes(true).count();
    let gap = PANE_WIDTH.saturating_sub(used).max(1);
    format!(
        "{}{}{}\n{}\n",
        model.title,
        " ".repeat(gap),
        actions,
        "═".repeat(PANE_WIDTH)
    )
}
