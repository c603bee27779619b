use crate::model::{Block, Embed, Image, Inline, List, ListItem, Marks, Provider, Row, Table, TextRun};
use crate::model::{Cell, inline};

use super::token::{Token, tokenize};

/// Tags that start a new block when met in inline context.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre",
    "table", "hr", "img", "tr", "td", "th",
];

/// Parses serialized markup into blocks. Lenient: unknown tags are dropped
/// and their content kept, stray closing tags are ignored.
pub fn parse(markup: &str) -> Vec<Block> {
    let mut parser = Parser {
        tokens: tokenize(markup),
        pos: 0,
    };
    parser.blocks(None)
}

/// Why an inline run ended.
#[derive(Debug, PartialEq, Eq)]
enum Stop {
    /// The expected closing tag was consumed.
    Closed,
    /// A block-level tag was reached and left unconsumed.
    Block,
    Eof,
}

/// How block tags inside an inline run are handled.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// `p`/`div` open a new line inside the run (quotes, cells, items).
    Nested,
    /// Any block tag ends the run (loose top-level text).
    Loose,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn blocks(&mut self, until: Option<&str>) -> Vec<Block> {
        let mut out = Vec::new();
        while let Some(token) = self.peek().cloned() {
            match &token {
                Token::End { name } => {
                    self.bump();
                    if Some(name.as_str()) == until {
                        break;
                    }
                }
                Token::Text(text) if text.trim().is_empty() => {
                    self.bump();
                }
                Token::Start { name, .. } => match name.as_str() {
                    "p" => {
                        self.bump();
                        let (inlines, _) = self.inlines(Some("p"), Flow::Loose);
                        out.push(Block::Paragraph(inlines));
                    }
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        self.bump();
                        let level = name[1..].parse().unwrap_or(1);
                        let (inlines, _) = self.inlines(Some(name.as_str()), Flow::Loose);
                        out.push(Block::Heading { level, inlines });
                    }
                    "ul" | "ol" => {
                        self.bump();
                        out.push(Block::List(self.list(name == "ol")));
                    }
                    "blockquote" => {
                        self.bump();
                        let (inlines, _) = self.inlines(Some("blockquote"), Flow::Nested);
                        out.push(Block::Quote(inlines));
                    }
                    "pre" => {
                        self.bump();
                        out.push(Block::CodeBlock(self.code_text()));
                    }
                    "table" => {
                        self.bump();
                        out.push(Block::Table(self.table()));
                    }
                    "hr" => {
                        self.bump();
                        out.push(Block::Divider);
                    }
                    "img" => {
                        self.bump();
                        out.push(Block::Image(Image {
                            src: token.attr("src").unwrap_or_default().to_string(),
                            alt: token.attr("alt").unwrap_or_default().to_string(),
                        }));
                    }
                    "div" if token.attr("data-embed").is_some() => {
                        self.bump();
                        if let Some(embed) = embed_from_attrs(&token) {
                            out.push(Block::Embed(embed));
                        }
                        self.skip_element("div");
                    }
                    "div" | "tbody" | "thead" | "section" | "article" => {
                        self.bump();
                        out.extend(self.blocks(Some(name.as_str())));
                    }
                    "li" | "tr" | "td" | "th" => {
                        // Orphaned structural tag: keep its text.
                        self.bump();
                        let (inlines, _) = self.inlines(Some(name.as_str()), Flow::Nested);
                        out.push(Block::Paragraph(inlines));
                    }
                    _ => {
                        let (inlines, _) = self.inlines(None, Flow::Loose);
                        if inline::units(&inlines) > 0 {
                            out.push(Block::Paragraph(inlines));
                        }
                    }
                },
                Token::Text(_) => {
                    let (inlines, _) = self.inlines(None, Flow::Loose);
                    out.push(Block::Paragraph(inlines));
                }
            }
        }
        out
    }

    /// Reads inline content until `close` is consumed or a block tag is met.
    fn inlines(&mut self, close: Option<&str>, flow: Flow) -> (Vec<Inline>, Stop) {
        let mut out: Vec<Inline> = Vec::new();
        let mut frames: Vec<(String, Marks)> = Vec::new();
        let mut stop = Stop::Eof;

        while let Some(token) = self.peek().cloned() {
            let marks = frames.last().map(|(_, m)| m.clone()).unwrap_or_default();
            match &token {
                Token::Text(text) => {
                    self.bump();
                    let text = text.replace(['\r', '\n'], " ");
                    out.push(Inline::Text(TextRun::marked(text, marks)));
                }
                Token::End { name } => {
                    if let Some(depth) = frames.iter().rposition(|(tag, _)| tag == name) {
                        self.bump();
                        frames.truncate(depth);
                    } else if Some(name.as_str()) == close {
                        self.bump();
                        stop = Stop::Closed;
                        break;
                    } else if flow == Flow::Nested && matches!(name.as_str(), "p" | "div") {
                        self.bump();
                    } else if BLOCK_TAGS.contains(&name.as_str())
                        || matches!(name.as_str(), "tbody" | "thead")
                    {
                        // Closing tag of an enclosing block: let the caller see it.
                        stop = Stop::Block;
                        break;
                    } else {
                        self.bump();
                    }
                }
                Token::Start { name, void, .. } => {
                    let name = name.as_str();
                    if flow == Flow::Nested && matches!(name, "p" | "div") {
                        self.bump();
                        if inline::units(&out) > 0 {
                            out.push(Inline::Text(TextRun::marked("\n", marks)));
                        }
                        continue;
                    }
                    if BLOCK_TAGS.contains(&name) {
                        stop = Stop::Block;
                        break;
                    }
                    self.bump();
                    match name {
                        "br" => out.push(Inline::Text(TextRun::marked("\n", marks))),
                        "span" if token.attr("data-mention").is_some() => {
                            let user_id = token.attr("data-mention").unwrap_or_default();
                            let label = if *void { String::new() } else { self.element_text("span") };
                            let display_name = label.strip_prefix('@').unwrap_or(&label).to_string();
                            out.push(Inline::mention(user_id, display_name));
                        }
                        "span" if token.attr("data-emoji").is_some() => {
                            let glyph = if *void { String::new() } else { self.element_text("span") };
                            if !glyph.is_empty() {
                                out.push(Inline::emoji(glyph));
                            }
                        }
                        _ if *void => {}
                        _ => {
                            let mut next = marks;
                            match name {
                                "strong" | "b" => next.bold = true,
                                "em" | "i" => next.italic = true,
                                "u" => next.underline = true,
                                "s" | "del" | "strike" => next.strikethrough = true,
                                "code" => next.code = true,
                                "a" => next.link = token.attr("href").map(str::to_string),
                                _ => {}
                            }
                            frames.push((name.to_string(), next));
                        }
                    }
                }
            }
        }
        inline::normalize(&mut out);
        (out, stop)
    }

    /// Reads list items after `<ul>`/`<ol>` up to the matching close.
    fn list(&mut self, ordered: bool) -> List {
        let mut list = List::new(ordered, Vec::new());
        while let Some(token) = self.peek().cloned() {
            match &token {
                Token::End { name } if name == "ul" || name == "ol" => {
                    self.bump();
                    break;
                }
                Token::Start { name, .. } if name == "li" => {
                    self.bump();
                    list.items.push(self.list_item());
                }
                Token::Start { name, .. } if name == "ul" || name == "ol" => {
                    // A list nested directly in a list belongs to the previous item.
                    self.bump();
                    let nested = self.list(name == "ol");
                    if list.items.is_empty() {
                        list.items.push(ListItem::default());
                    }
                    if let Some(last) = list.items.last_mut() {
                        attach_children(last, nested);
                    }
                }
                Token::End { .. } if self.is_enclosing_close(&token) => break,
                _ => {
                    self.bump();
                }
            }
        }
        list
    }

    fn list_item(&mut self) -> ListItem {
        let (inlines, stop) = self.inlines(Some("li"), Flow::Nested);
        let mut item = ListItem::new(inlines);
        if stop == Stop::Closed {
            return item;
        }
        while let Some(token) = self.peek().cloned() {
            match &token {
                Token::End { name } if name == "li" => {
                    self.bump();
                    break;
                }
                Token::Start { name, .. } if name == "ul" || name == "ol" => {
                    self.bump();
                    let nested = self.list(name == "ol");
                    attach_children(&mut item, nested);
                }
                Token::Start { name, .. } if name == "li" => break,
                Token::End { name } if name == "ul" || name == "ol" => break,
                Token::End { .. } => {
                    self.bump();
                }
                Token::Text(text) if text.trim().is_empty() => {
                    self.bump();
                }
                Token::Start { name, void, .. } if BLOCK_TAGS.contains(&name.as_str()) => {
                    // Block content inside an item keeps its text on new lines.
                    self.bump();
                    let lines = match name.as_str() {
                        "pre" => vec![vec![Inline::text(self.code_text())]],
                        "table" => self
                            .table()
                            .rows
                            .into_iter()
                            .flat_map(|row| row.cells)
                            .map(|cell| cell.inlines)
                            .collect(),
                        _ if *void => Vec::new(),
                        tag => vec![self.inlines(Some(tag), Flow::Nested).0],
                    };
                    for line in lines {
                        append_line(&mut item.inlines, line);
                    }
                }
                _ => {
                    let (more, stop) = self.inlines(Some("li"), Flow::Nested);
                    append_line(&mut item.inlines, more);
                    if stop == Stop::Closed {
                        break;
                    }
                }
            }
        }
        item
    }

    fn table(&mut self) -> Table {
        let mut table = Table { rows: Vec::new() };
        while let Some(token) = self.bump() {
            match &token {
                Token::End { name } if name == "table" => break,
                Token::Start { name, .. } if name == "tr" => table.rows.push(Row::default()),
                Token::Start { name, .. } if name == "td" || name == "th" => {
                    let (inlines, _) = self.inlines(Some(name.as_str()), Flow::Nested);
                    if table.rows.is_empty() {
                        table.rows.push(Row::default());
                    }
                    if let Some(row) = table.rows.last_mut() {
                        row.cells.push(Cell { inlines });
                    }
                }
                _ => {}
            }
        }
        table
    }

    /// Raw text of a `<pre>` element; `<br>` becomes a newline.
    fn code_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(token) = self.bump() {
            match &token {
                Token::End { name } if name == "pre" => break,
                Token::Text(t) => text.push_str(t),
                Token::Start { name, .. } if name == "br" => text.push('\n'),
                _ => {}
            }
        }
        text
    }

    /// Concatenated text up to the close of `tag`.
    fn element_text(&mut self, tag: &str) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            match &token {
                Token::Text(t) => text.push_str(t),
                Token::Start { name, void, .. } if name == tag && !*void => depth += 1,
                Token::End { name } if name == tag => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        text
    }

    fn skip_element(&mut self, tag: &str) {
        self.element_text(tag);
    }

    fn is_enclosing_close(&self, token: &Token) -> bool {
        matches!(token, Token::End { name } if matches!(name.as_str(), "li" | "blockquote" | "td" | "th" | "table" | "div"))
    }
}

/// Appends `line` after a soft break, skipping empty lines.
fn append_line(inlines: &mut Vec<Inline>, line: Vec<Inline>) {
    if inline::units(&line) == 0 {
        return;
    }
    if inline::units(inlines) > 0 {
        inlines.push(Inline::text("\n"));
    }
    inlines.extend(line);
    inline::normalize(inlines);
}

fn attach_children(item: &mut ListItem, nested: List) {
    match &mut item.children {
        Some(children) => children.items.extend(nested.items),
        None => item.children = Some(nested),
    }
}

fn embed_from_attrs(token: &Token) -> Option<Embed> {
    match token.attr("data-embed")? {
        "link" => Some(Embed::Link {
            url: token.attr("data-url")?.to_string(),
        }),
        other => Some(Embed::Video {
            provider: Provider::from_name(other)?,
            resource_id: token.attr("data-id")?.to_string(),
        }),
    }
}
