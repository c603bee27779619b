//! Formatting marks, links, mention chips and emoji.

use crate::editing::Editor;
use crate::model::inline::{self, Inline, Mark, Mention, TextRun};
use crate::model::Container;

impl Editor {
    /// Toggles `mark` over the selection. On a collapsed caret the toggle is
    /// kept as a pending mark for the next typed text.
    ///
    /// The mark is removed when every selected text run already carries it,
    /// otherwise added everywhere, so toggling twice restores the original.
    pub(crate) fn toggle_mark(&mut self, mark: &Mark) -> bool {
        if self.selection.is_collapsed() {
            let base = self.marks_at(&self.caret());
            let current = self.pending.clone().unwrap_or_else(|| base.clone());
            let next = current.clone().with(mark, !current.has(mark));
            self.pending = (next != base).then_some(next);
            return false;
        }

        let (start, end) = self.range();
        let segments = self.segments(&start, &end);
        let states: Vec<bool> = segments
            .iter()
            .filter_map(|(path, range)| match self.doc.container(path)? {
                Container::Inlines(inlines) => inline::range_has_mark(inlines, range.clone(), mark),
                Container::Code(_) => None,
            })
            .collect();
        if states.is_empty() {
            return false;
        }
        let on = !states.iter().all(|has| *has);
        for (path, range) in segments {
            if let Some(inlines) = self.doc.inlines_mut(&path) {
                inline::map_marks(inlines, range, |marks| marks.set(mark, on));
            }
        }
        true
    }

    /// Links the selection to `href`, or unlinks it when it is already fully
    /// linked or `href` is empty. A collapsed caret inserts `href` as linked
    /// text.
    pub(crate) fn set_link(&mut self, href: &str) -> bool {
        let href = href.trim();
        if self.selection.is_collapsed() {
            if href.is_empty() {
                return false;
            }
            let caret = self.caret();
            let marks = self.marks_at(&caret).with(&Mark::Link(href.to_string()), true);
            let run = Inline::Text(TextRun::marked(href, marks));
            return self.insert_nodes(&caret, vec![run]);
        }

        let (start, end) = self.range();
        let segments = self.segments(&start, &end);
        let fully_linked = segments.iter().all(|(path, range)| match self.doc.container(path) {
            Some(Container::Inlines(inlines)) => {
                inline::range_has_mark(inlines, range.clone(), &Mark::Link(String::new()))
                    .unwrap_or(true)
            }
            _ => true,
        });
        let link = (!href.is_empty() && !fully_linked).then(|| href.to_string());
        let mut changed = false;
        for (path, range) in segments {
            if let Some(inlines) = self.doc.inlines_mut(&path) {
                inline::map_marks(inlines, range, |marks| marks.link = link.clone());
                changed = true;
            }
        }
        changed
    }

    /// A mention chip followed by a space.
    pub(crate) fn insert_mention(&mut self, mention: Mention) -> bool {
        self.delete_selection();
        let caret = self.caret();
        self.insert_nodes(&caret, vec![Inline::Mention(mention), Inline::text(" ")])
    }

    pub(crate) fn insert_emoji(&mut self, glyph: String) -> bool {
        if glyph.is_empty() {
            return false;
        }
        self.delete_selection();
        let caret = self.caret();
        self.insert_nodes(&caret, vec![Inline::Emoji(inline::EmojiGlyph { glyph })])
    }
}
