use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A formatting mark that can be toggled on a range of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Link(String),
}

/// The set of marks carried by a text run.
///
/// At most one link can apply to a run, so the set is stored as flags plus
/// an optional href rather than as a collection of [`Mark`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: Option<String>,
}

impl Marks {
    /// True if the mark is present. Any link satisfies `Mark::Link(_)`.
    pub fn has(&self, mark: &Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
            Mark::Link(_) => self.link.is_some(),
        }
    }

    pub fn set(&mut self, mark: &Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
            Mark::Strikethrough => self.strikethrough = on,
            Mark::Code => self.code = on,
            Mark::Link(href) => self.link = on.then(|| href.clone()),
        }
    }

    pub fn with(mut self, mark: &Mark, on: bool) -> Self {
        self.set(mark, on);
        self
    }
}

/// A run of text sharing one set of marks. A `'\n'` is a soft line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub marks: Marks,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

/// Atomic reference to a person. The caret can sit before or after a
/// mention but never inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub user_id: String,
    pub display_name: String,
}

/// A single emoji glyph, one caret unit wide regardless of its codepoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiGlyph {
    pub glyph: String,
}

impl EmojiGlyph {
    /// Codepoints in `U+XXXX` form, space separated.
    pub fn codepoints(&self) -> String {
        self.glyph
            .chars()
            .map(|c| format!("U+{:04X}", c as u32))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Content within a text-holding block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(TextRun),
    Mention(Mention),
    Emoji(EmojiGlyph),
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::plain(text))
    }

    pub fn mention(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Inline::Mention(Mention {
            user_id: user_id.into(),
            display_name: display_name.into(),
        })
    }

    pub fn emoji(glyph: impl Into<String>) -> Self {
        Inline::Emoji(EmojiGlyph {
            glyph: glyph.into(),
        })
    }

    /// Number of caret positions this node spans.
    pub fn units(&self) -> usize {
        match self {
            Inline::Text(run) => run.text.chars().count(),
            Inline::Mention(_) | Inline::Emoji(_) => 1,
        }
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::Mention(m) => {
                out.push('@');
                out.push_str(&m.display_name);
            }
            Inline::Emoji(e) => out.push_str(&e.glyph),
        }
    }
}

/// Total caret units of an inline sequence.
pub fn units(inlines: &[Inline]) -> usize {
    inlines.iter().map(Inline::units).sum()
}

/// Plain-text projection: mentions render as `@Name`, emoji as their glyph.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_plain_text(&mut out);
    }
    out
}

/// Byte index of the `chars`-th char of `text`, or `text.len()` past the end.
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Splits the sequence at a caret offset, leaving the head in place and
/// returning the tail. A text run straddling the offset is cut in two.
pub fn split_off(inlines: &mut Vec<Inline>, offset: usize) -> Vec<Inline> {
    let mut consumed = 0;
    for idx in 0..inlines.len() {
        if offset <= consumed {
            return inlines.split_off(idx);
        }
        let len = inlines[idx].units();
        if offset < consumed + len {
            let local = offset - consumed;
            let mut tail = inlines.split_off(idx + 1);
            if let Inline::Text(run) = &mut inlines[idx] {
                let at = byte_offset(&run.text, local);
                let rest = run.text.split_off(at);
                tail.insert(0, Inline::Text(TextRun::marked(rest, run.marks.clone())));
            }
            return tail;
        }
        consumed += len;
    }
    Vec::new()
}

/// Inserts nodes at a caret offset.
pub fn insert(inlines: &mut Vec<Inline>, offset: usize, nodes: Vec<Inline>) {
    let tail = split_off(inlines, offset);
    inlines.extend(nodes);
    inlines.extend(tail);
    normalize(inlines);
}

/// Removes a caret range and returns the removed nodes.
pub fn remove_range(inlines: &mut Vec<Inline>, range: Range<usize>) -> Vec<Inline> {
    let tail = split_off(inlines, range.end);
    let removed = split_off(inlines, range.start);
    inlines.extend(tail);
    normalize(inlines);
    removed
}

/// Copies the nodes covering a caret range.
pub fn slice(inlines: &[Inline], range: Range<usize>) -> Vec<Inline> {
    let mut head = inlines.to_vec();
    split_off(&mut head, range.end);
    split_off(&mut head, range.start)
}

/// Drops empty text runs and merges neighbours with identical marks.
pub fn normalize(inlines: &mut Vec<Inline>) {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines.drain(..) {
        match inline {
            Inline::Text(run) if run.text.is_empty() => {}
            Inline::Text(run) => {
                if let Some(Inline::Text(prev)) = out.last_mut()
                    && prev.marks == run.marks
                {
                    prev.text.push_str(&run.text);
                } else {
                    out.push(Inline::Text(run));
                }
            }
            other => out.push(other),
        }
    }
    *inlines = out;
}

/// Marks that typing at `offset` should inherit: those of the text just
/// before the caret, or just after it at the start of the sequence.
pub fn marks_at(inlines: &[Inline], offset: usize) -> Marks {
    let mut consumed = 0;
    for inline in inlines {
        let len = inline.units();
        let inside = if offset == 0 {
            consumed == 0
        } else {
            offset > consumed && offset <= consumed + len
        };
        if inside {
            return match inline {
                Inline::Text(run) => run.marks.clone(),
                _ => Marks::default(),
            };
        }
        consumed += len;
    }
    Marks::default()
}

/// Whether every text run in the range carries `mark`.
///
/// Returns `None` when the range holds no text at all (only atoms, or empty).
pub fn range_has_mark(inlines: &[Inline], range: Range<usize>, mark: &Mark) -> Option<bool> {
    let covered = slice(inlines, range);
    let mut runs = covered
        .iter()
        .filter_map(|inline| match inline {
            Inline::Text(run) => Some(run),
            _ => None,
        })
        .peekable();
    runs.peek()?;
    Some(runs.all(|run| run.marks.has(mark)))
}

/// Applies `f` to the marks of every text run inside the range.
pub fn map_marks(inlines: &mut Vec<Inline>, range: Range<usize>, f: impl Fn(&mut Marks)) {
    let tail = split_off(inlines, range.end);
    let mut middle = split_off(inlines, range.start);
    for inline in &mut middle {
        if let Inline::Text(run) = inline {
            f(&mut run.marks);
        }
    }
    inlines.extend(middle);
    inlines.extend(tail);
    normalize(inlines);
}

/// Splits the sequence at soft line breaks, one entry per line.
pub fn split_lines(inlines: Vec<Inline>) -> Vec<Vec<Inline>> {
    let mut lines = vec![Vec::new()];
    for inline in inlines {
        match inline {
            Inline::Text(run) if run.text.contains('\n') => {
                let mut parts = run.text.split('\n');
                if let Some(first) = parts.next()
                    && let Some(line) = lines.last_mut()
                {
                    line.push(Inline::Text(TextRun::marked(first, run.marks.clone())));
                }
                for part in parts {
                    lines.push(vec![Inline::Text(TextRun::marked(part, run.marks.clone()))]);
                }
            }
            other => {
                if let Some(line) = lines.last_mut() {
                    line.push(other);
                }
            }
        }
    }
    for line in &mut lines {
        normalize(line);
    }
    lines
}
