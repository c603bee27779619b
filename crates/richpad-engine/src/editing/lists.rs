//! List item state machine.
//!
//! An item is *Empty* when it holds no inline content, otherwise it *has
//! content*. Enter on content adds a sibling; Enter on an empty nested item
//! outdents it; Enter on an empty top-level item exits the list. Tab and
//! Shift+Tab only act inside list items.

use crate::editing::{Editor, Selection};
use crate::model::inline::{self, Inline};
use crate::model::{Block, List, ListItem, NodePath, Position};

impl Editor {
    /// Enter inside the list item at `caret`.
    pub(crate) fn commit_in_list(&mut self, caret: &Position) -> bool {
        let Some(item) = self.doc.list_item(&caret.path) else {
            return false;
        };
        if inline::units(&item.inlines) == 0 {
            return if caret.path.rest().len() > 1 {
                self.outdent_item(caret)
            } else {
                self.exit_item(caret)
            };
        }

        let rest = caret.path.rest().to_vec();
        let Some((&index, _)) = rest.split_last() else {
            return false;
        };
        let Some(list) = self.doc.list_mut(caret.path.block()) else {
            return false;
        };
        let Some(item) = list.item_mut(&rest) else {
            return false;
        };
        // Content after the caret and the nested list move to the new item,
        // keeping document order.
        let tail = inline::split_off(&mut item.inlines, caret.offset);
        let children = item.children.take();
        let Some(siblings) = list.parent_of_mut(&rest) else {
            return false;
        };
        siblings.items.insert(
            index + 1,
            ListItem {
                inlines: tail,
                children,
            },
        );
        self.move_caret(caret.path.with_last(index + 1), 0);
        true
    }

    /// Removes a top-level item and continues in a paragraph holding its
    /// content.
    ///
    /// An empty item's paragraph goes in place of the list when it was the
    /// sole item, otherwise right after the list, and its nested children
    /// stay in the list where the item was. An item with content is lifted
    /// out where it stands, splitting the list around it.
    pub(crate) fn exit_item(&mut self, caret: &Position) -> bool {
        let b = caret.path.block();
        let Some(&index) = caret.path.rest().first() else {
            return false;
        };
        let has_content = self
            .doc
            .list_item(&caret.path)
            .is_some_and(|item| inline::units(&item.inlines) > 0);
        if has_content {
            return self.lift_item(caret);
        }
        let Some(list) = self.doc.list_mut(b) else {
            return false;
        };
        if index >= list.items.len() {
            return false;
        }
        let item = list.items.remove(index);
        if let Some(children) = item.children {
            list.items.splice(index..index, children.items);
        }
        let paragraph = Block::Paragraph(item.inlines);
        let target = if list.items.is_empty() {
            self.doc.blocks[b] = paragraph;
            b
        } else {
            self.doc.blocks.insert(b + 1, paragraph);
            b + 1
        };
        self.move_caret(vec![target], caret.offset);
        true
    }

    /// Turns a top-level item into a paragraph at its own place in the
    /// document: items before it stay in the list, its nested children and
    /// the items after it continue in a new list below the paragraph.
    fn lift_item(&mut self, caret: &Position) -> bool {
        let b = caret.path.block();
        let Some(&index) = caret.path.rest().first() else {
            return false;
        };
        let Some(list) = self.doc.list_mut(b) else {
            return false;
        };
        if index >= list.items.len() {
            return false;
        }
        let ordered = list.ordered;
        let mut after = list.items.split_off(index);
        let item = after.remove(0);
        if let Some(children) = item.children {
            after.splice(0..0, children.items);
        }
        let before = std::mem::take(&mut list.items);

        let mut replacement = Vec::with_capacity(3);
        if !before.is_empty() {
            replacement.push(Block::List(List::new(ordered, before)));
        }
        let target = b + replacement.len();
        replacement.push(Block::Paragraph(item.inlines));
        if !after.is_empty() {
            replacement.push(Block::List(List::new(ordered, after)));
        }
        self.doc.blocks.splice(b..=b, replacement);
        self.move_caret(vec![target], caret.offset);
        true
    }

    /// Removes the list item at `path`, lifting its nested items into its
    /// place, and returns its inline content.
    pub(crate) fn take_item(&mut self, path: &NodePath) -> Option<Vec<Inline>> {
        let rest = path.rest();
        let (&index, _) = rest.split_last()?;
        let siblings = self.doc.list_mut(path.block())?.parent_of_mut(rest)?;
        if index >= siblings.items.len() {
            return None;
        }
        let item = siblings.items.remove(index);
        if let Some(children) = item.children {
            siblings.items.splice(index..index, children.items);
        }
        Some(item.inlines)
    }

    /// Backspace at the start of a list item. A nested item outdents, the
    /// first top-level item becomes a paragraph in place, any other item is
    /// merged onto the end of the item before it.
    pub(crate) fn backspace_in_list(&mut self, caret: &Position) -> bool {
        if caret.path.rest().len() > 1 {
            return self.outdent_item(caret);
        }
        if caret.path.rest().first() == Some(&0) {
            return self.lift_item(caret);
        }
        let paths = self.doc.container_paths();
        let Some(previous) = paths
            .iter()
            .position(|p| *p == caret.path)
            .and_then(|i| i.checked_sub(1))
            .map(|i| paths[i].clone())
        else {
            return false;
        };
        let offset = self.doc.container(&previous).map_or(0, |c| c.units());
        let Some(content) = self.take_item(&caret.path) else {
            return false;
        };
        let Some(inlines) = self.doc.inlines_mut(&previous) else {
            return false;
        };
        inlines.extend(content);
        inline::normalize(inlines);
        self.move_caret(previous, offset);
        true
    }

    pub(crate) fn outdent(&mut self) -> bool {
        let caret = self.caret();
        if self.doc.list_item(&caret.path).is_none() {
            return false;
        }
        if caret.path.rest().len() == 1 {
            self.exit_item(&caret)
        } else {
            self.outdent_item(&caret)
        }
    }

    /// Moves a nested item up one level, right after its parent. Siblings
    /// that followed it become its own nested items.
    fn outdent_item(&mut self, caret: &Position) -> bool {
        let rest = caret.path.rest();
        let Some((&index, parent_rest)) = rest.split_last() else {
            return false;
        };
        let parent_rest = parent_rest.to_vec();
        let Some(&parent_index) = parent_rest.last() else {
            return false;
        };
        let Some(list) = self.doc.list_mut(caret.path.block()) else {
            return false;
        };
        if list.parent_of(&parent_rest).is_none() {
            return false;
        }
        let Some(parent) = list.item_mut(&parent_rest) else {
            return false;
        };
        let Some(siblings) = parent.children.as_mut() else {
            return false;
        };
        if index >= siblings.items.len() {
            return false;
        }
        let ordered = siblings.ordered;
        let following = siblings.items.split_off(index + 1);
        let mut item = siblings.items.remove(index);
        if siblings.items.is_empty() {
            parent.children = None;
        }
        if !following.is_empty() {
            match &mut item.children {
                Some(children) => children.items.extend(following),
                None => item.children = Some(List::new(ordered, following)),
            }
        }
        if let Some(outer) = list.parent_of_mut(&parent_rest) {
            outer.items.insert(parent_index + 1, item);
        }

        let parent_path = caret.path.parent().unwrap_or_default();
        self.move_caret(parent_path.with_last(parent_index + 1), caret.offset);
        true
    }

    /// Nests the caret's item under its previous sibling.
    pub(crate) fn indent(&mut self) -> bool {
        let caret = self.caret();
        if self.doc.list_item(&caret.path).is_none() {
            return false;
        }
        let rest = caret.path.rest().to_vec();
        let Some(&index) = rest.last() else {
            return false;
        };
        if index == 0 {
            return false;
        }
        let Some(siblings) = self
            .doc
            .list_mut(caret.path.block())
            .and_then(|list| list.parent_of_mut(&rest))
        else {
            return false;
        };
        let ordered = siblings.ordered;
        let item = siblings.items.remove(index);
        let nested = siblings.items[index - 1]
            .children
            .get_or_insert_with(|| List::new(ordered, Vec::new()));
        nested.items.push(item);
        let new_index = nested.items.len() - 1;

        self.move_caret(caret.path.with_last(index - 1).child(new_index), caret.offset);
        true
    }

    /// bulletList / orderedList.
    pub(crate) fn toggle_list(&mut self, ordered: bool) -> bool {
        let caret = self.caret();
        let b = caret.path.block();

        if self.doc.list_item(&caret.path).is_some() {
            let rest = caret.path.rest().to_vec();
            if let Some(nearest) = self
                .doc
                .list_mut(b)
                .and_then(|list| list.parent_of_mut(&rest))
                && nearest.ordered != ordered
            {
                nearest.ordered = ordered;
                return true;
            }
            return self.unwrap_list(&caret);
        }

        let (start, end) = self.range();
        let text_blocks = start.path.len() == 1
            && end.path.len() == 1
            && (start.path.block()..=end.path.block())
                .all(|i| self.doc.blocks.get(i).and_then(Block::text_inlines).is_some());
        if !text_blocks {
            // Code block, table cell or a mixed range: a new list goes after.
            let list = Block::List(List::new(ordered, vec![ListItem::default()]));
            let at = self.place_blocks(&caret, vec![list]);
            self.move_caret(vec![at, 0], 0);
            return true;
        }

        if self.selection.is_collapsed() {
            let inlines = self.doc.blocks[b].text_inlines().cloned().unwrap_or_default();
            self.doc.blocks[b] = Block::List(List::new(ordered, vec![ListItem::new(inlines)]));
            self.move_caret(vec![b, 0], caret.offset);
            return true;
        }

        // One item per line of every block in the range.
        let (first, last) = (start.path.block(), end.path.block());
        let items: Vec<ListItem> = self
            .doc
            .blocks
            .drain(first..=last)
            .flat_map(|block| inline::split_lines(block.text_inlines().cloned().unwrap_or_default()))
            .map(ListItem::new)
            .collect();
        let last_item = items.len().saturating_sub(1);
        let last_units = items.last().map_or(0, |item| inline::units(&item.inlines));
        self.doc.blocks.insert(first, Block::List(List::new(ordered, items)));
        self.selection = Selection::range(
            Position::new(vec![first, 0], 0),
            Position::new(vec![first, last_item], last_units),
        );
        true
    }

    /// Replaces the caret's top-level list with one paragraph per item.
    fn unwrap_list(&mut self, caret: &Position) -> bool {
        let b = caret.path.block();
        let ordinal = self
            .doc
            .container_paths()
            .into_iter()
            .filter(|path| path.block() == b)
            .position(|path| path == caret.path)
            .unwrap_or(0);
        let Some(Block::List(list)) = self.doc.blocks.get(b).cloned() else {
            return false;
        };
        let paragraphs: Vec<Block> = list
            .flatten()
            .into_iter()
            .map(|(_, inlines)| Block::Paragraph(inlines))
            .collect();
        self.doc.blocks.splice(b..=b, paragraphs);
        self.move_caret(NodePath::root(b + ordinal), caret.offset);
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::{Cmd, Selection};
    use crate::model::{Position, format_outline};
    use crate::tests::{editor_at, markup_of, type_text};
    use pretty_assertions::assert_eq;

    #[test]
    fn enter_on_content_adds_sibling() {
        let mut editor = editor_at("<ul><li>ab</li></ul>", vec![0, 0], 1);
        editor.apply(Cmd::Commit);
        assert_eq!(markup_of(&editor), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 1], 0)));
    }

    #[test]
    fn enter_on_sole_empty_item_replaces_list() {
        let mut editor = editor_at("<ul><li></li></ul>", vec![0, 0], 0);
        editor.apply(Cmd::Commit);
        assert_eq!(markup_of(&editor), "<p></p>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0], 0)));
    }

    #[test]
    fn enter_on_last_empty_item_exits_after_list() {
        let mut editor = editor_at("<ol><li>a</li><li></li></ol><p>z</p>", vec![0, 1], 0);
        editor.apply(Cmd::Commit);
        assert_eq!(markup_of(&editor), "<ol><li>a</li></ol><p></p><p>z</p>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![1], 0)));
    }

    #[test]
    fn enter_on_empty_nested_item_outdents() {
        let mut editor = editor_at("<ul><li>a<ul><li></li></ul></li></ul>", vec![0, 0, 0], 0);
        editor.apply(Cmd::Commit);
        assert_eq!(markup_of(&editor), "<ul><li>a</li><li></li></ul>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 1], 0)));

        editor.apply(Cmd::Commit);
        assert_eq!(markup_of(&editor), "<ul><li>a</li></ul><p></p>");
    }

    #[test]
    fn tab_nests_under_previous_sibling() {
        let mut editor = editor_at("<ul><li>a</li><li>b</li></ul>", vec![0, 1], 1);
        editor.apply(Cmd::Indent);
        assert_eq!(markup_of(&editor), "<ul><li>a<ul><li>b</li></ul></li></ul>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 0, 0], 1)));
    }

    #[test]
    fn tab_on_first_item_or_outside_lists_is_noop() {
        let mut editor = editor_at("<ul><li>a</li></ul>", vec![0, 0], 0);
        assert!(!editor.apply(Cmd::Indent).changed);

        let mut editor = editor_at("<p>a</p>", vec![0], 0);
        assert!(!editor.apply(Cmd::Indent).changed);
        assert!(!editor.apply(Cmd::Outdent).changed);
    }

    #[test]
    fn outdent_adopts_following_siblings() {
        let mut editor = editor_at(
            "<ul><li>a<ul><li>b</li><li>c</li><li>d</li></ul></li></ul>",
            vec![0, 0, 1],
            0,
        );
        editor.apply(Cmd::Outdent);
        insta::assert_snapshot!(format_outline(editor.document()), @r#"
        List ordered=false
          Item "a"
            List ordered=false
              Item "b"
          Item "c"
            List ordered=false
              Item "d"
        "#);
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 1], 0)));
    }

    #[test]
    fn top_level_outdent_carries_content_out() {
        let mut editor = editor_at("<ul><li>a</li><li>bc</li></ul>", vec![0, 1], 1);
        editor.apply(Cmd::Outdent);
        assert_eq!(markup_of(&editor), "<ul><li>a</li></ul><p>bc</p>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![1], 1)));
    }

    #[test]
    fn outdent_of_middle_item_splits_the_list() {
        let mut editor = editor_at(
            "<ol><li>a</li><li>b<ol><li>c</li></ol></li><li>d</li></ol>",
            vec![0, 1],
            0,
        );
        editor.apply(Cmd::Outdent);
        assert_eq!(
            markup_of(&editor),
            "<ol><li>a</li></ol><p>b</p><ol><li>c</li><li>d</li></ol>"
        );
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![1], 0)));
    }

    #[test]
    fn exiting_item_keeps_its_children_in_place() {
        let mut editor = editor_at("<ul><li><ul><li>x</li></ul></li><li>y</li></ul>", vec![0, 0], 0);
        editor.apply(Cmd::Commit);
        assert_eq!(markup_of(&editor), "<ul><li>x</li><li>y</li></ul><p></p>");
    }

    #[test]
    fn toggle_wraps_paragraph_and_keeps_caret() {
        let mut editor = editor_at("<p>abc</p>", vec![0], 2);
        editor.apply(Cmd::ToggleList { ordered: false });
        assert_eq!(markup_of(&editor), "<ul><li>abc</li></ul>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 0], 2)));
    }

    #[test]
    fn toggle_splits_selected_lines_into_items() {
        let mut editor = editor_at("<p>one<br>two</p><p>three</p>", vec![0], 0);
        editor.set_selection(Selection::range(
            Position::new(vec![0], 1),
            Position::new(vec![1], 2),
        ));
        editor.apply(Cmd::ToggleList { ordered: true });
        assert_eq!(
            markup_of(&editor),
            "<ol><li>one</li><li>two</li><li>three</li></ol>"
        );
    }

    #[test]
    fn toggle_same_kind_unwraps_other_kind_switches() {
        let mut editor = editor_at("<ul><li>a<ul><li>b</li></ul></li></ul>", vec![0, 0, 0], 1);
        editor.apply(Cmd::ToggleList { ordered: true });
        assert_eq!(markup_of(&editor), "<ul><li>a<ol><li>b</li></ol></li></ul>");

        editor.apply(Cmd::ToggleList { ordered: true });
        assert_eq!(markup_of(&editor), "<p>a</p><p>b</p>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![1], 1)));
    }

    #[test]
    fn toggle_in_code_block_adds_list_after() {
        let mut editor = editor_at("<pre><code>x</code></pre>", vec![0], 1);
        editor.apply(Cmd::ToggleList { ordered: false });
        type_text(&mut editor, "item");
        assert_eq!(
            markup_of(&editor),
            "<pre><code>x</code></pre><ul><li>item</li></ul>"
        );
    }

    #[test]
    fn backspace_at_nested_item_start_outdents() {
        let mut editor = editor_at("<ul><li>a<ul><li>b</li></ul></li></ul>", vec![0, 0, 0], 0);
        editor.apply(Cmd::DeleteBackward);
        assert_eq!(markup_of(&editor), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn backspace_at_middle_item_start_merges_into_previous() {
        let mut editor = editor_at("<ul><li>a</li><li>b</li><li>c</li></ul>", vec![0, 1], 0);
        editor.apply(Cmd::DeleteBackward);
        assert_eq!(markup_of(&editor), "<ul><li>ab</li><li>c</li></ul>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 0], 1)));
    }

    #[test]
    fn backspace_merges_into_deepest_previous_item() {
        let mut editor = editor_at(
            "<ul><li>a<ul><li>b</li></ul></li><li>c<ul><li>d</li></ul></li></ul>",
            vec![0, 1],
            0,
        );
        editor.apply(Cmd::DeleteBackward);
        assert_eq!(
            markup_of(&editor),
            "<ul><li>a<ul><li>bc</li></ul></li><li>d</li></ul>"
        );
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![0, 0, 0], 1)));
    }

    #[test]
    fn backspace_on_first_item_keeps_document_order() {
        let mut editor = editor_at("<p>x</p><ul><li>a</li><li>b</li></ul>", vec![1, 0], 0);
        editor.apply(Cmd::DeleteBackward);
        assert_eq!(markup_of(&editor), "<p>x</p><p>a</p><ul><li>b</li></ul>");
        assert_eq!(editor.selection(), &Selection::caret(Position::new(vec![1], 0)));
    }

    #[test]
    fn backspace_on_empty_sole_item_leaves_a_paragraph() {
        let mut editor = editor_at("<ul><li></li></ul>", vec![0, 0], 0);
        editor.apply(Cmd::DeleteBackward);
        assert_eq!(markup_of(&editor), "<p></p>");
    }
}
