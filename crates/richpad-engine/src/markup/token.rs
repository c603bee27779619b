use super::cursor::Cursor;

/// Elements that never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "col", "source", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        /// Written as `<x/>` or a void element.
        void: bool,
    },
    End {
        name: String,
    },
    /// Entity-decoded text.
    Text(String),
}

impl Token {
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Start { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// Splits markup into tags and text. Comments and doctypes are dropped; a
/// `<` that does not open a tag is kept as text.
pub fn tokenize(markup: &str) -> Vec<Token> {
    let mut cur = Cursor::new(markup);
    let mut out = Vec::new();
    let mut text = String::new();

    while !cur.eof() {
        if cur.starts_with(b"<!--") {
            cur.bump_n(4);
            cur.eat_until(b"-->");
            cur.bump_n(3);
            continue;
        }
        if cur.starts_with(b"<!") || cur.starts_with(b"<?") {
            cur.eat_until(b">");
            cur.bump();
            continue;
        }
        if cur.peek() == Some(b'<') {
            let saved = cur.clone();
            if let Some(tag) = try_tag(&mut cur) {
                flush_text(&mut out, &mut text);
                out.push(tag);
                continue;
            }
            cur = saved;
            cur.bump();
            text.push('<');
            continue;
        }
        text.push_str(cur.eat_until(b"<"));
    }
    flush_text(&mut out, &mut text);
    out
}

fn flush_text(out: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        let decoded = html_escape::decode_html_entities(text.as_str()).into_owned();
        out.push(Token::Text(decoded));
        text.clear();
    }
}

fn try_tag(cur: &mut Cursor<'_>) -> Option<Token> {
    cur.bump(); // <
    let closing = cur.peek() == Some(b'/');
    if closing {
        cur.bump();
    }
    if !cur.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let name = cur
        .eat_while(|b| b.is_ascii_alphanumeric() || b == b'-')
        .to_ascii_lowercase();

    if closing {
        cur.eat_until(b">");
        cur.bump()?;
        return Some(Token::End { name });
    }

    let mut attrs = Vec::new();
    let mut self_closing = false;
    loop {
        cur.skip_whitespace();
        match cur.peek()? {
            b'>' => {
                cur.bump();
                break;
            }
            b'/' => {
                cur.bump();
                self_closing = true;
            }
            _ => {
                let key = cur
                    .eat_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
                    .to_ascii_lowercase();
                if key.is_empty() {
                    cur.bump();
                    continue;
                }
                cur.skip_whitespace();
                let value = if cur.peek() == Some(b'=') {
                    cur.bump();
                    cur.skip_whitespace();
                    attr_value(cur)
                } else {
                    String::new()
                };
                attrs.push((key, value));
            }
        }
    }

    let void = self_closing || VOID_ELEMENTS.contains(&name.as_str());
    Some(Token::Start { name, attrs, void })
}

fn attr_value(cur: &mut Cursor<'_>) -> String {
    let raw = match cur.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cur.bump();
            let value = cur.eat_until(&[quote]);
            cur.bump();
            value
        }
        _ => cur.eat_while(|b| !b.is_ascii_whitespace() && b != b'>'),
    };
    html_escape::decode_html_entities(raw).into_owned()
}
