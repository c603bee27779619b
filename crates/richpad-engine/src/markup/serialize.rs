use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::model::{Block, Document, Embed, Inline, List, Marks, Table, TextRun};

/// Serializes a document to markup. Equal documents always produce
/// identical strings.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        write_block(&mut out, block);
    }
    out
}

/// Serializes a single inline sequence, as it would appear inside a block.
pub fn serialize_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    write_inlines(&mut out, inlines);
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(inlines) => write_wrapped(out, "p", inlines),
        Block::Heading { level, inlines } => write_wrapped(out, &format!("h{level}"), inlines),
        Block::Quote(inlines) => write_wrapped(out, "blockquote", inlines),
        Block::List(list) => write_list(out, list),
        Block::CodeBlock(text) => {
            out.push_str("<pre><code>");
            out.push_str(&encode_text(text));
            out.push_str("</code></pre>");
        }
        Block::Table(table) => write_table(out, table),
        Block::Image(image) => {
            out.push_str("<img src=\"");
            out.push_str(&encode_double_quoted_attribute(&image.src));
            out.push_str("\" alt=\"");
            out.push_str(&encode_double_quoted_attribute(&image.alt));
            out.push_str("\">");
        }
        Block::Embed(Embed::Video {
            provider,
            resource_id,
        }) => {
            let id = encode_double_quoted_attribute(resource_id);
            let player = provider.player_url(resource_id);
            out.push_str(&format!(
                "<div data-embed=\"{}\" data-id=\"{id}\"><iframe src=\"{}\"></iframe></div>",
                provider.as_str(),
                encode_double_quoted_attribute(&player),
            ));
        }
        Block::Embed(Embed::Link { url }) => {
            let attr = encode_double_quoted_attribute(url);
            out.push_str(&format!(
                "<div data-embed=\"link\" data-url=\"{attr}\"><a href=\"{attr}\">{}</a></div>",
                encode_text(url),
            ));
        }
        Block::Divider => out.push_str("<hr>"),
    }
}

fn write_wrapped(out: &mut String, tag: &str, inlines: &[Inline]) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_inlines(out, inlines);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_list(out: &mut String, list: &List) {
    let tag = if list.ordered { "ol" } else { "ul" };
    out.push_str(&format!("<{tag}>"));
    for item in &list.items {
        out.push_str("<li>");
        write_inlines(out, &item.inlines);
        if let Some(children) = &item.children {
            write_list(out, children);
        }
        out.push_str("</li>");
    }
    out.push_str(&format!("</{tag}>"));
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in &row.cells {
            write_wrapped(out, "td", &cell.inlines);
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(run) => write_run(out, run),
            Inline::Mention(mention) => {
                out.push_str("<span data-mention=\"");
                out.push_str(&encode_double_quoted_attribute(&mention.user_id));
                out.push_str("\" contenteditable=\"false\">@");
                out.push_str(&encode_text(&mention.display_name));
                out.push_str("</span>");
            }
            Inline::Emoji(emoji) => {
                out.push_str("<span data-emoji>");
                out.push_str(&encode_text(&emoji.glyph));
                out.push_str("</span>");
            }
        }
    }
}

/// Mark tags, outermost first.
fn open_tags(marks: &Marks) -> Vec<String> {
    let mut tags = Vec::new();
    if let Some(href) = &marks.link {
        tags.push(format!("a href=\"{}\"", encode_double_quoted_attribute(href)));
    }
    for (on, tag) in [
        (marks.bold, "strong"),
        (marks.italic, "em"),
        (marks.underline, "u"),
        (marks.strikethrough, "s"),
        (marks.code, "code"),
    ] {
        if on {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn write_run(out: &mut String, run: &TextRun) {
    let tags = open_tags(&run.marks);
    for tag in &tags {
        out.push_str(&format!("<{tag}>"));
    }
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        out.push_str(&encode_text(line));
    }
    for tag in tags.iter().rev() {
        let name = tag.split(' ').next().unwrap_or(tag);
        out.push_str(&format!("</{name}>"));
    }
}
