use crate::app::store::SidebarRow;
use markpad_core::documents::SortKey;

const ID_PREFIX_LEN: usize = 8;

pub(crate) fn render_sidebar(rows: &[SidebarRow], search: &str, sort: SortKey) -> String {
    let mut out = String::new();
    if search.is_empty() {
        out.push_str(&format!("Documents (sorted by {})\n", sort.as_str()));
    } else {
        out.push_str(&format!(
            "Documents matching \"{search}\" (sorted by {})\n",
            sort.as_str()
        ));
    }

    if rows.is_empty() {
        out.push_str("  No documents\n");
        return out;
    }

    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

pub(crate) fn render_row(row: &SidebarRow) -> String {
    let marker = if row.active { '▸' } else { ' ' };
    let short_id: String = row.id.chars().take(ID_PREFIX_LEN).collect();
    format!("{marker} {}  {}  {short_id}", row.title, row.created)
}
