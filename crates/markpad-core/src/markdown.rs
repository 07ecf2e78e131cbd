//! Markdown to HTML for the preview pane.
//!
//! Covers the subset people type into notes: ATX headings, paragraphs,
//! fenced code, block quotes, ordered / unordered / task lists, rules,
//! pipe tables, and inline code, strong, emphasis, strikethrough, links and
//! images. All source text is escaped, so raw HTML never reaches the output.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InlineToken {
    Text(String),
    Link { href: String, label: String },
    Image { src: String, alt: String },
    Code(String),
    Bold(String),
    Italic(String),
    Strike(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    pub checked: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading { level: usize, text: String },
    Paragraph(String),
    Code { lang: Option<String>, content: String },
    Quote(Vec<Block>),
    List { kind: ListKind, items: Vec<ListItem> },
    Table {
        header: Vec<String>,
        align: Vec<Align>,
        rows: Vec<Vec<String>>,
    },
    Rule,
}

pub fn render_html(markdown: &str) -> String {
    let blocks = parse_blocks(markdown);
    let mut out = String::new();
    render_blocks(&blocks, &mut out);
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    parse_block_lines(&lines)
}

fn parse_block_lines(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut ix = 0usize;

    fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if paragraph.is_empty() {
            return;
        }
        let text = paragraph
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(Block::Paragraph(text));
        paragraph.clear();
    }

    while ix < lines.len() {
        let line = lines[ix];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            ix += 1;
            continue;
        }

        if let Some(fence) = parse_fence_open(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut content = Vec::new();
            ix += 1;
            while ix < lines.len() && !lines[ix].trim().starts_with(fence.marker) {
                content.push(lines[ix]);
                ix += 1;
            }
            // Skip the closing fence when present; an unclosed fence runs to the end.
            ix += 1;
            blocks.push(Block::Code {
                lang: fence.lang,
                content: content.join("\n"),
            });
            continue;
        }

        if let Some((level, text)) = parse_heading(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading { level, text });
            ix += 1;
            continue;
        }

        if is_rule(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Rule);
            ix += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut quoted = Vec::new();
            while ix < lines.len() {
                let Some(rest) = lines[ix].trim().strip_prefix('>') else {
                    break;
                };
                quoted.push(rest.strip_prefix(' ').unwrap_or(rest));
                ix += 1;
            }
            blocks.push(Block::Quote(parse_block_lines(&quoted)));
            continue;
        }

        if let Some(first) = parse_list_item(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let kind = first.0;
            let mut items = vec![first.1];
            ix += 1;
            while ix < lines.len() {
                match parse_list_item(lines[ix].trim()) {
                    Some((next_kind, item)) if next_kind == kind => {
                        items.push(item);
                        ix += 1;
                    }
                    _ => break,
                }
            }
            blocks.push(Block::List { kind, items });
            continue;
        }

        if ix + 1 < lines.len() && trimmed.contains('|') {
            if let Some(align) = parse_table_delimiter(lines[ix + 1].trim()) {
                let header = split_table_row(trimmed);
                if header.len() == align.len() {
                    flush_paragraph(&mut paragraph, &mut blocks);
                    ix += 2;
                    let mut rows = Vec::new();
                    while ix < lines.len() {
                        let row_line = lines[ix].trim();
                        if row_line.is_empty() || !row_line.contains('|') {
                            break;
                        }
                        let mut cells = split_table_row(row_line);
                        cells.resize(header.len(), String::new());
                        rows.push(cells);
                        ix += 1;
                    }
                    blocks.push(Block::Table {
                        header,
                        align,
                        rows,
                    });
                    continue;
                }
            }
        }

        paragraph.push(line);
        ix += 1;
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

struct FenceOpen {
    marker: &'static str,
    lang: Option<String>,
}

fn parse_fence_open(trimmed: &str) -> Option<FenceOpen> {
    let marker = if trimmed.starts_with("```") {
        "```"
    } else if trimmed.starts_with("~~~") {
        "~~~"
    } else {
        return None;
    };
    let info = trimmed[marker.len()..].trim();
    let lang = info
        .split_whitespace()
        .next()
        .map(|lang| lang.to_lowercase());
    Some(FenceOpen { marker, lang })
}

fn parse_heading(trimmed: &str) -> Option<(usize, String)> {
    let level = trimmed.chars().take_while(|ch| *ch == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    Some((level, text.to_string()))
}

fn is_rule(trimmed: &str) -> bool {
    let compact: String = trimmed.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.len() < 3 {
        return false;
    }
    ['-', '*', '_']
        .iter()
        .any(|marker| compact.chars().all(|ch| ch == *marker))
}

fn parse_ordered_list_item(trimmed: &str) -> Option<String> {
    let digits = trimmed.chars().take_while(|ch| ch.is_ascii_digit()).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &trimmed[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if !rest.starts_with(char::is_whitespace) && !rest.is_empty() {
        return None;
    }
    Some(rest.trim().to_string())
}

fn parse_unordered_list_item(trimmed: &str) -> Option<String> {
    let mut chars = trimmed.chars();
    let bullet = chars.next()?;
    if !matches!(bullet, '-' | '*' | '+') {
        return None;
    }
    let rest = chars.as_str();
    if !rest.starts_with(char::is_whitespace) && !rest.is_empty() {
        return None;
    }
    Some(rest.trim().to_string())
}

fn parse_task_marker(text: &str) -> (Option<bool>, String) {
    for (prefix, checked) in [("[ ] ", false), ("[x] ", true), ("[X] ", true)] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return (Some(checked), rest.to_string());
        }
    }
    match text {
        "[ ]" => (Some(false), String::new()),
        "[x]" | "[X]" => (Some(true), String::new()),
        _ => (None, text.to_string()),
    }
}

fn parse_list_item(trimmed: &str) -> Option<(ListKind, ListItem)> {
    if let Some(text) = parse_ordered_list_item(trimmed) {
        return Some((
            ListKind::Ordered,
            ListItem {
                text,
                checked: None,
            },
        ));
    }
    let text = parse_unordered_list_item(trimmed)?;
    let (checked, text) = parse_task_marker(&text);
    Some((ListKind::Unordered, ListItem { text, checked }))
}

fn split_table_row(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn parse_table_delimiter(line: &str) -> Option<Vec<Align>> {
    if !line.contains('-') {
        return None;
    }
    split_table_row(line)
        .iter()
        .map(|cell| {
            let left = cell.starts_with(':');
            let right = cell.ends_with(':');
            let dashes = cell.trim_matches(':');
            if dashes.is_empty() || !dashes.chars().all(|ch| ch == '-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Align::Center,
                (true, false) => Align::Left,
                (false, true) => Align::Right,
                (false, false) => Align::None,
            })
        })
        .collect()
}

fn render_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                out.push_str(&format!("<h{level}>"));
                render_inline(text, out);
                out.push_str(&format!("</h{level}>\n"));
            }
            Block::Paragraph(text) => {
                out.push_str("<p>");
                render_inline(text, out);
                out.push_str("</p>\n");
            }
            Block::Code { lang, content } => {
                match lang {
                    Some(lang) => out.push_str(&format!(
                        "<pre><code class=\"language-{}\">",
                        escape_html(lang)
                    )),
                    None => out.push_str("<pre><code>"),
                }
                out.push_str(&escape_html(content));
                if !content.is_empty() {
                    out.push('\n');
                }
                out.push_str("</code></pre>\n");
            }
            Block::Quote(inner) => {
                out.push_str("<blockquote>\n");
                render_blocks(inner, out);
                out.push_str("</blockquote>\n");
            }
            Block::List { kind, items } => {
                let tag = match kind {
                    ListKind::Ordered => "ol",
                    ListKind::Unordered => "ul",
                };
                out.push_str(&format!("<{tag}>\n"));
                for item in items {
                    out.push_str("<li>");
                    match item.checked {
                        Some(true) => {
                            out.push_str("<input type=\"checkbox\" checked=\"\" disabled=\"\" /> ")
                        }
                        Some(false) => out.push_str("<input type=\"checkbox\" disabled=\"\" /> "),
                        None => {}
                    }
                    render_inline(&item.text, out);
                    out.push_str("</li>\n");
                }
                out.push_str(&format!("</{tag}>\n"));
            }
            Block::Table {
                header,
                align,
                rows,
            } => {
                out.push_str("<table>\n<thead>\n<tr>\n");
                for (cell, align) in header.iter().zip(align) {
                    render_table_cell("th", cell, *align, out);
                }
                out.push_str("</tr>\n</thead>\n");
                if !rows.is_empty() {
                    out.push_str("<tbody>\n");
                    for row in rows {
                        out.push_str("<tr>\n");
                        for (cell, align) in row.iter().zip(align) {
                            render_table_cell("td", cell, *align, out);
                        }
                        out.push_str("</tr>\n");
                    }
                    out.push_str("</tbody>\n");
                }
                out.push_str("</table>\n");
            }
            Block::Rule => out.push_str("<hr />\n"),
        }
    }
}

fn render_table_cell(tag: &str, cell: &str, align: Align, out: &mut String) {
    let style = match align {
        Align::None => "",
        Align::Left => " style=\"text-align: left\"",
        Align::Center => " style=\"text-align: center\"",
        Align::Right => " style=\"text-align: right\"",
    };
    out.push_str(&format!("<{tag}{style}>"));
    render_inline(cell, out);
    out.push_str(&format!("</{tag}>\n"));
}

fn render_inline(text: &str, out: &mut String) {
    for token in parse_inline_tokens(text) {
        match token {
            InlineToken::Text(value) => {
                out.push_str(&escape_html(&value).replace('\n', "<br />\n"))
            }
            InlineToken::Link { href, label } => out.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                escape_html(&href),
                escape_html(&label)
            )),
            InlineToken::Image { src, alt } => out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\" />",
                escape_html(&src),
                escape_html(&alt)
            )),
            InlineToken::Code(value) => {
                out.push_str(&format!("<code>{}</code>", escape_html(&value)))
            }
            InlineToken::Bold(value) => {
                out.push_str("<strong>");
                render_inline(&value, out);
                out.push_str("</strong>");
            }
            InlineToken::Italic(value) => {
                out.push_str("<em>");
                render_inline(&value, out);
                out.push_str("</em>");
            }
            InlineToken::Strike(value) => {
                out.push_str("<del>");
                render_inline(&value, out);
                out.push_str("</del>");
            }
        }
    }
}

fn is_safe_href(href: &str) -> bool {
    let lowered = href.trim().to_lowercase();
    !(lowered.starts_with("javascript:")
        || lowered.starts_with("vbscript:")
        || lowered.starts_with("data:"))
}

/// Splits `[label](href)` at `start`, returning label, href and the end offset.
fn parse_bracket_link(text: &str, start: usize) -> Option<(String, String, usize)> {
    let inner_start = start + 1;
    let close_bracket = inner_start + text[inner_start..].find(']')?;
    if !text[close_bracket + 1..].starts_with('(') {
        return None;
    }
    let href_start = close_bracket + 2;
    let close_paren = href_start + text[href_start..].find(')')?;
    let label = text[inner_start..close_bracket].trim().to_string();
    let href = text[href_start..close_paren].trim().to_string();
    Some((label, href, close_paren + 1))
}

pub fn parse_inline_tokens(text: &str) -> Vec<InlineToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0usize;

    while cursor < text.len() {
        let remaining = &text[cursor..];

        let candidates = [("![", 0), ("[", 1), ("`", 2), ("**", 3), ("~~", 4), ("*", 5), ("_", 6)];

        let mut next: Option<(usize, &str, usize)> = None;
        for (needle, priority) in candidates {
            if let Some(rel) = remaining.find(needle) {
                let abs = cursor + rel;
                match next {
                    None => next = Some((abs, needle, priority)),
                    Some((best_abs, _best_needle, best_priority)) => {
                        if abs < best_abs || (abs == best_abs && priority < best_priority) {
                            next = Some((abs, needle, priority));
                        }
                    }
                }
            }
        }

        let Some((start, needle, _priority)) = next else {
            tokens.push(InlineToken::Text(text[cursor..].to_string()));
            break;
        };

        if start > cursor {
            tokens.push(InlineToken::Text(text[cursor..start].to_string()));
            cursor = start;
        }

        match needle {
            "![" => match parse_bracket_link(text, cursor + 1) {
                Some((alt, src, end)) if !src.is_empty() && is_safe_href(&src) => {
                    tokens.push(InlineToken::Image { src, alt });
                    cursor = end;
                }
                _ => {
                    tokens.push(InlineToken::Text("!".to_string()));
                    cursor += 1;
                }
            },
            "[" => match parse_bracket_link(text, cursor) {
                Some((label, href, end)) => {
                    if label.is_empty() || href.is_empty() || !is_safe_href(&href) {
                        tokens.push(InlineToken::Text(text[cursor..end].to_string()));
                    } else {
                        tokens.push(InlineToken::Link { href, label });
                    }
                    cursor = end;
                }
                None => {
                    tokens.push(InlineToken::Text("[".to_string()));
                    cursor += 1;
                }
            },
            "`" => {
                let inner_start = cursor + 1;
                let Some(rel_end) = text[inner_start..].find('`') else {
                    tokens.push(InlineToken::Text(text[cursor..].to_string()));
                    break;
                };
                let inner_end = inner_start + rel_end;
                let token_end = inner_end + 1;
                let inner = &text[inner_start..inner_end];
                if inner.is_empty() {
                    tokens.push(InlineToken::Text(text[cursor..token_end].to_string()));
                } else {
                    tokens.push(InlineToken::Code(inner.to_string()));
                }
                cursor = token_end;
            }
            "**" | "~~" | "*" | "_" => {
                if needle == "*" && text[cursor..].starts_with("**") {
                    tokens.push(InlineToken::Text("*".to_string()));
                    cursor += 1;
                    continue;
                }
                if needle == "_" && is_intraword(text, cursor) {
                    tokens.push(InlineToken::Text("_".to_string()));
                    cursor += 1;
                    continue;
                }
                let inner_start = cursor + needle.len();
                let Some(rel_end) = text[inner_start..].find(needle) else {
                    tokens.push(InlineToken::Text(needle.to_string()));
                    cursor = inner_start;
                    continue;
                };
                let inner_end = inner_start + rel_end;
                let token_end = inner_end + needle.len();
                let inner = &text[inner_start..inner_end];
                if inner.trim().is_empty() {
                    tokens.push(InlineToken::Text(text[cursor..token_end].to_string()));
                } else {
                    tokens.push(match needle {
                        "**" => InlineToken::Bold(inner.to_string()),
                        "~~" => InlineToken::Strike(inner.to_string()),
                        _ => InlineToken::Italic(inner.to_string()),
                    });
                }
                cursor = token_end;
            }
            _ => {
                tokens.push(InlineToken::Text(text[cursor..].to_string()));
                break;
            }
        }
    }

    let mut merged = Vec::new();
    for token in tokens.into_iter() {
        match token {
            InlineToken::Text(value) => {
                if let Some(InlineToken::Text(prev)) = merged.last_mut() {
                    prev.push_str(&value);
                } else {
                    merged.push(InlineToken::Text(value));
                }
            }
            other => merged.push(other),
        }
    }

    merged
}

fn is_intraword(text: &str, ix: usize) -> bool {
    let before = text[..ix].chars().next_back();
    before.is_some_and(|ch| ch.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inline_tokens_handles_links_and_formatting() {
        assert_eq!(
            parse_inline_tokens("See [Docs](https://example.com) then `x` **b** *i* ~~s~~."),
            vec![
                InlineToken::Text("See ".to_string()),
                InlineToken::Link {
                    href: "https://example.com".to_string(),
                    label: "Docs".to_string()
                },
                InlineToken::Text(" then ".to_string()),
                InlineToken::Code("x".to_string()),
                InlineToken::Text(" ".to_string()),
                InlineToken::Bold("b".to_string()),
                InlineToken::Text(" ".to_string()),
                InlineToken::Italic("i".to_string()),
                InlineToken::Text(" ".to_string()),
                InlineToken::Strike("s".to_string()),
                InlineToken::Text(".".to_string()),
            ]
        );

        assert_eq!(
            parse_inline_tokens("Ignore [X](javascript:alert(1))"),
            vec![InlineToken::Text(
                "Ignore [X](javascript:alert(1))".to_string()
            )]
        );
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(
            parse_inline_tokens("2 * 3 = 6 and snake_case_name"),
            vec![InlineToken::Text("2 * 3 = 6 and snake_case_name".to_string())]
        );
    }

    #[test]
    fn images_parse_before_links() {
        assert_eq!(
            parse_inline_tokens("![logo](img.png)"),
            vec![InlineToken::Image {
                src: "img.png".to_string(),
                alt: "logo".to_string()
            }]
        );
    }

    #[test]
    fn headings_and_paragraphs() {
        let html = render_html("# Title\n\nFirst line\nsecond line\n\n## Sub ##");
        assert_eq!(
            html,
            "<h1>Title</h1>\n<p>First line<br />\nsecond line</p>\n<h2>Sub</h2>\n"
        );
    }

    #[test]
    fn hash_without_space_is_text() {
        assert_eq!(render_html("#tag"), "<p>#tag</p>\n");
    }

    #[test]
    fn fenced_code_is_escaped_and_tagged() {
        let html = render_html("```Rust\nlet x = a < b;\n```\nafter");
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = a &lt; b;\n</code></pre>\n<p>after</p>\n"
        );
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let html = render_html("```\n# not a heading");
        assert_eq!(html, "<pre><code># not a heading\n</code></pre>\n");
    }

    #[test]
    fn lists_and_tasks() {
        let html = render_html("- [x] done\n- [ ] todo\n- plain\n\n1. one\n2. two");
        assert!(html.contains("<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>"));
        assert!(html.contains("<li><input type=\"checkbox\" disabled=\"\" /> todo</li>"));
        assert!(html.contains("<li>plain</li>"));
        assert!(html.contains("<ol>\n<li>one</li>\n<li>two</li>\n</ol>"));
    }

    #[test]
    fn quotes_nest_blocks() {
        let html = render_html("> **bold** quote\n> - item");
        assert_eq!(
            html,
            "<blockquote>\n<p><strong>bold</strong> quote</p>\n<ul>\n<li>item</li>\n</ul>\n</blockquote>\n"
        );
    }

    #[test]
    fn rules() {
        assert_eq!(render_html("---"), "<hr />\n");
        assert_eq!(render_html("* * *"), "<hr />\n");
        assert_eq!(render_html("--"), "<p>--</p>\n");
    }

    #[test]
    fn tables_with_alignment() {
        let html = render_html("| a | b |\n|:--|--:|\n| 1 | 2 |\n| 3 |");
        assert!(html.starts_with("<table>\n<thead>\n<tr>\n<th style=\"text-align: left\">a</th>"));
        assert!(html.contains("<td style=\"text-align: right\">2</td>"));
        assert!(html.contains("<td style=\"text-align: right\"></td>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_html("<script>alert('x')</script>");
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>\n"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_html(""), "");
        assert_eq!(render_html("\n\n  \n"), "");
    }
}
