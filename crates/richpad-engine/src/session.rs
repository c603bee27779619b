//! One editing session: a document bound to a host surface.
//!
//! The session owns the [`Editor`], remembers the selection across overlays
//! and routes toolbar actions through the [`Dispatcher`]. Every committed
//! change is reported to the [`Host`] as serialized markup.
//!
//! Async work (image reads, mention lookups, AI calls) happens outside the
//! session. It hands out a ticket when the work starts and accepts the
//! result only while the overlay that issued the ticket is still open.

use uuid::Uuid;

use crate::ai::{AiError, AiPanel, FollowUp, InstructionKind, TransformRequest};
use crate::config::EditorConfig;
use crate::dispatch::{Action, CommandArgs, CommandId, Dispatcher, OverlayKind};
use crate::editing::{Cmd, Editor, Patch, Selection, SelectionTracker};
use crate::error::EditorError;
use crate::host::{Host, HostError, NoopHost};
use crate::model::inline;
use crate::model::{Container, Document, Position};
use crate::pickers::{
    EmojiCategory, EmojiEntry, EmojiPicker, MentionCandidate, MentionPicker, MentionQuery,
};

const MENTION_TRIGGER: char = '@';
const EMOJI_TRIGGER: char = ':';

/// What a session call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(Patch),
    /// An overlay opened; its ticket ties later completions to it.
    Opened(Uuid),
    Ignored,
}

impl Outcome {
    pub fn patch(&self) -> Option<&Patch> {
        match self {
            Outcome::Applied(patch) => Some(patch),
            _ => None,
        }
    }

    pub fn is_change(&self) -> bool {
        self.patch().is_some_and(|patch| patch.changed)
    }
}

/// An AI request the host should run, tagged with the panel's ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequest {
    pub ticket: Uuid,
    pub request: TransformRequest,
}

#[derive(Debug, Clone)]
enum Overlay {
    Mention(MentionPicker),
    Emoji(EmojiPicker),
    ImageUpload { ticket: Uuid, selection: Selection },
}

impl Overlay {
    fn ticket(&self) -> Uuid {
        match self {
            Overlay::Mention(picker) => picker.ticket(),
            Overlay::Emoji(picker) => picker.ticket(),
            Overlay::ImageUpload { ticket, .. } => *ticket,
        }
    }
}

pub struct Session<H: Host = NoopHost> {
    editor: Editor,
    tracker: SelectionTracker,
    dispatcher: Dispatcher,
    config: EditorConfig,
    host: H,
    focused: bool,
    overlay: Option<Overlay>,
    ai: AiPanel,
}

impl<H: Host> Session<H> {
    pub fn new(config: EditorConfig, host: H) -> Self {
        let editor = Editor::new(Document::from_markup(&config.initial_content));
        let mut tracker = SelectionTracker::new();
        tracker.capture(editor.selection().clone());
        log::debug!(
            "session with {} toolbar and {} insert-menu commands",
            config.toolbar.len(),
            config.insert_menu.len()
        );
        Self {
            editor,
            tracker,
            dispatcher: Dispatcher::new(&config),
            focused: config.autofocus,
            config,
            host,
            overlay: None,
            ai: AiPanel::Closed,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn markup(&self) -> String {
        self.editor.document().to_markup()
    }

    pub fn selection(&self) -> &Selection {
        self.editor.selection()
    }

    pub fn version(&self) -> u64 {
        self.editor.version()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The placeholder, while the document is empty.
    pub fn placeholder(&self) -> Option<&str> {
        let text = self.config.placeholder.as_str();
        (!text.is_empty() && self.document().is_blank()).then_some(text)
    }

    // -- focus and selection --

    pub fn focus(&mut self) {
        self.focused = true;
        self.restore_selection();
    }

    pub fn blur(&mut self) {
        self.tracker.capture(self.editor.selection().clone());
        self.focused = false;
        self.host.on_blur();
    }

    /// Moves the caret or range and captures it.
    pub fn set_selection(&mut self, selection: Selection) -> Selection {
        let applied = self.editor.set_selection(selection).clone();
        self.tracker.capture(applied.clone());
        applied
    }

    fn restore_selection(&mut self) {
        let restored = self.tracker.restore(self.editor.document());
        self.editor.set_selection(restored);
    }

    // -- keyboard editing, always available --

    /// Types `text` at the caret. A lone `@` or `:` typed at the start of a
    /// word opens the mention or emoji picker when that command is enabled.
    pub fn type_text(&mut self, text: &str) -> Outcome {
        let outcome = self.edit(Cmd::InsertText {
            text: text.to_string(),
        });
        if outcome.is_change() {
            let trigger = match text {
                "@" => Some((MENTION_TRIGGER, CommandId::Mention)),
                ":" => Some((EMOJI_TRIGGER, CommandId::Emoji)),
                _ => None,
            };
            if let Some((ch, id)) = trigger
                && self.dispatcher.is_enabled(id)
                && self.at_word_start_after(ch)
            {
                let caret = self.editor.selection().focus.clone();
                match id {
                    CommandId::Mention => self.open_mention_picker(Some(caret)),
                    _ => self.open_emoji_picker(Some(caret)),
                };
            }
        }
        outcome
    }

    pub fn commit(&mut self) -> Outcome {
        self.edit(Cmd::Commit)
    }

    pub fn delete_backward(&mut self) -> Outcome {
        self.edit(Cmd::DeleteBackward)
    }

    pub fn indent(&mut self) -> Outcome {
        self.edit(Cmd::Indent)
    }

    pub fn outdent(&mut self) -> Outcome {
        self.edit(Cmd::Outdent)
    }

    // -- toolbar and insert menu --

    /// Runs a toolbar or insert-menu command by id. Unknown, disabled or
    /// malformed commands are logged and ignored.
    pub fn execute(&mut self, id: &str, args: &CommandArgs) -> Outcome {
        let action = match self.dispatcher.resolve_str(id, args) {
            Ok(action) => action,
            Err(err) => {
                log::warn!("ignoring command {id:?}: {err}");
                return Outcome::Ignored;
            }
        };
        if self.is_read_only() {
            log::warn!("ignoring command {id:?}: {}", EditorError::ReadOnly);
            return Outcome::Ignored;
        }
        self.restore_selection();
        log::debug!("execute {id} as {action:?}");
        match action {
            Action::Edit(cmd) => self.edit(cmd),
            Action::Open(kind) => self.open(kind),
        }
    }

    /// Applies a command to the editor and reports a change to the host.
    fn edit(&mut self, cmd: Cmd) -> Outcome {
        if self.is_read_only() {
            log::warn!("ignoring {cmd:?}: {}", EditorError::ReadOnly);
            return Outcome::Ignored;
        }
        let patch = self.editor.apply(cmd);
        if patch.changed {
            self.tracker.invalidate();
            let markup = self.markup();
            self.host.on_change(&markup);
        }
        self.tracker.capture(patch.new_selection.clone());
        Outcome::Applied(patch)
    }

    fn open(&mut self, kind: OverlayKind) -> Outcome {
        let ticket = match kind {
            OverlayKind::MentionPicker => Some(self.open_mention_picker(None)),
            OverlayKind::EmojiPicker => Some(self.open_emoji_picker(None)),
            OverlayKind::ImageUpload => self.begin_image_upload(),
            OverlayKind::AiPanel => self.open_ai_panel(),
        };
        ticket.map_or(Outcome::Ignored, Outcome::Opened)
    }

    pub fn overlay_ticket(&self) -> Option<Uuid> {
        self.overlay.as_ref().map(Overlay::ticket)
    }

    /// Closes any picker or pending upload without touching the document.
    pub fn close_overlay(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            log::debug!("closed overlay {}", overlay.ticket());
        }
        self.restore_selection();
    }

    // -- mentions --

    pub fn open_mention_picker(&mut self, trigger: Option<Position>) -> Uuid {
        let picker = MentionPicker::open(self.config.mention_source.clone(), trigger);
        let ticket = picker.ticket();
        self.overlay = Some(Overlay::Mention(picker));
        ticket
    }

    pub fn mention_picker(&self) -> Option<&MentionPicker> {
        match &self.overlay {
            Some(Overlay::Mention(picker)) => Some(picker),
            _ => None,
        }
    }

    /// Updates the picker's search text. Returns the lookup to run when
    /// candidates come from the host.
    pub fn set_mention_query(&mut self, text: &str) -> Option<MentionQuery> {
        match &mut self.overlay {
            Some(Overlay::Mention(picker)) => picker.set_query(text),
            _ => None,
        }
    }

    /// Delivers lookup results. Results for a closed picker are dropped.
    pub fn receive_mention_results(
        &mut self,
        query: &MentionQuery,
        result: Result<Vec<MentionCandidate>, HostError>,
    ) -> bool {
        match &mut self.overlay {
            Some(Overlay::Mention(picker)) => picker.receive(query, result),
            _ => {
                log::debug!("mention picker closed, dropping results for {:?}", query.text);
                false
            }
        }
    }

    pub fn select_mention(&mut self, ticket: Uuid, candidate: &MentionCandidate) -> Outcome {
        let trigger = match &self.overlay {
            Some(Overlay::Mention(picker)) if picker.ticket() == ticket => picker.trigger().cloned(),
            _ => {
                log::debug!("no open mention picker for {ticket}");
                return Outcome::Ignored;
            }
        };
        self.overlay = None;
        self.restore_over_trigger(trigger, MENTION_TRIGGER);
        self.edit(Cmd::InsertMention(candidate.to_mention()))
    }

    // -- emoji --

    pub fn open_emoji_picker(&mut self, trigger: Option<Position>) -> Uuid {
        let picker = EmojiPicker::open(trigger);
        let ticket = picker.ticket();
        self.overlay = Some(Overlay::Emoji(picker));
        ticket
    }

    pub fn set_emoji_query(&mut self, text: &str) {
        if let Some(Overlay::Emoji(picker)) = &mut self.overlay {
            picker.set_query(text);
        }
    }

    pub fn set_emoji_category(&mut self, category: Option<EmojiCategory>) {
        if let Some(Overlay::Emoji(picker)) = &mut self.overlay {
            picker.set_category(category);
        }
    }

    pub fn emoji_results(&self) -> Vec<&'static EmojiEntry> {
        match &self.overlay {
            Some(Overlay::Emoji(picker)) => picker.results(),
            _ => Vec::new(),
        }
    }

    pub fn select_emoji(&mut self, ticket: Uuid, glyph: &str) -> Outcome {
        let trigger = match &self.overlay {
            Some(Overlay::Emoji(picker)) if picker.ticket() == ticket => picker.trigger().cloned(),
            _ => {
                log::debug!("no open emoji picker for {ticket}");
                return Outcome::Ignored;
            }
        };
        self.overlay = None;
        self.restore_over_trigger(trigger, EMOJI_TRIGGER);
        self.edit(Cmd::InsertEmoji {
            glyph: glyph.to_string(),
        })
    }

    /// Restores the selection, then selects the trigger character before
    /// `trigger` so the insertion replaces it.
    fn restore_over_trigger(&mut self, trigger: Option<Position>, ch: char) {
        self.restore_selection();
        let Some(pos) = trigger else {
            return;
        };
        if pos.offset == 0 || self.unit_before(&pos) != Some(ch) {
            return;
        }
        let start = Position::new(pos.path.clone(), pos.offset - 1);
        self.editor.set_selection(Selection::range(start, pos));
    }

    /// The character just before `pos`, when it is plain text.
    fn unit_before(&self, pos: &Position) -> Option<char> {
        let Container::Inlines(inlines) = self.document().container(&pos.path)? else {
            return None;
        };
        let before = inline::slice(inlines, pos.offset.checked_sub(1)?..pos.offset);
        match before.as_slice() {
            [inline::Inline::Text(run)] => run.text.chars().next(),
            _ => None,
        }
    }

    /// True when the caret sits right after `ch` and `ch` starts a word.
    fn at_word_start_after(&self, ch: char) -> bool {
        let caret = &self.editor.selection().focus;
        if self.unit_before(caret) != Some(ch) {
            return false;
        }
        if caret.offset < 2 {
            return true;
        }
        let previous = Position::new(caret.path.clone(), caret.offset - 1);
        self.unit_before(&previous).is_some_and(char::is_whitespace)
    }

    // -- image upload --

    /// Captures the selection for an upload and returns its ticket. The host
    /// reads the file, then calls [`Session::complete_image_upload`].
    pub fn begin_image_upload(&mut self) -> Option<Uuid> {
        if self.is_read_only() {
            return None;
        }
        let ticket = Uuid::new_v4();
        let selection = self.editor.selection().clone();
        self.tracker.capture(selection.clone());
        self.overlay = Some(Overlay::ImageUpload { ticket, selection });
        Some(ticket)
    }

    /// Inserts the uploaded image at the captured selection. A failed read
    /// or a stale ticket inserts nothing.
    pub fn complete_image_upload(
        &mut self,
        ticket: Uuid,
        result: Result<String, HostError>,
        alt: &str,
    ) -> Outcome {
        let selection = match &self.overlay {
            Some(Overlay::ImageUpload { ticket: open, selection }) if *open == ticket => {
                selection.clone()
            }
            _ => {
                log::warn!("dropping stale image upload {ticket}");
                return Outcome::Ignored;
            }
        };
        self.overlay = None;
        let src = match result {
            Ok(src) => src,
            Err(err) => {
                log::warn!("image upload failed: {err}");
                return Outcome::Ignored;
            }
        };
        self.editor.set_selection(selection);
        self.edit(Cmd::InsertImage {
            src,
            alt: alt.to_string(),
        })
    }

    // -- AI assist --

    pub fn ai_panel(&self) -> &AiPanel {
        &self.ai
    }

    /// Opens the AI panel over the current selection.
    pub fn open_ai_panel(&mut self) -> Option<Uuid> {
        if self.is_read_only() || !self.dispatcher.is_enabled(CommandId::AiAssist) {
            return None;
        }
        let ticket = Uuid::new_v4();
        self.ai = AiPanel::Open {
            ticket,
            range: self.editor.selection().clone(),
        };
        Some(ticket)
    }

    /// Starts a transform of the panel's range. An empty range fails the
    /// panel with a visible message.
    pub fn begin_transform(&mut self, kind: InstructionKind) -> Option<AiRequest> {
        let (ticket, range) = match &self.ai {
            AiPanel::Closed | AiPanel::Pending { .. } => return None,
            AiPanel::Open { ticket, range }
            | AiPanel::Ready { ticket, range, .. }
            | AiPanel::Failed { ticket, range, .. } => (*ticket, range.clone()),
        };
        self.editor.set_selection(range.clone());
        let source_text = self.editor.selected_text();
        if source_text.trim().is_empty() {
            self.ai = AiPanel::Failed {
                ticket,
                range,
                message: AiError::EmptySelection.to_string(),
            };
            return None;
        }
        self.ai = AiPanel::Pending {
            ticket,
            range,
            kind,
        };
        Some(AiRequest {
            ticket,
            request: TransformRequest {
                instruction_kind: kind,
                source_text,
            },
        })
    }

    /// Delivers a transform result. Answers for a panel that was closed or
    /// reopened meanwhile are dropped.
    pub fn finish_transform(&mut self, ticket: Uuid, result: Result<String, AiError>) -> bool {
        let range = match &self.ai {
            AiPanel::Pending { ticket: open, range, .. } if *open == ticket => range.clone(),
            _ => {
                log::warn!("dropping stale AI result for {ticket}");
                return false;
            }
        };
        let result = result.and_then(|text| {
            if text.trim().is_empty() {
                Err(AiError::EmptyResult)
            } else {
                Ok(text)
            }
        });
        self.ai = match result {
            Ok(result) => AiPanel::Ready {
                ticket,
                range,
                result,
            },
            Err(err) => {
                log::warn!("AI transform failed: {err}");
                AiPanel::Failed {
                    ticket,
                    range,
                    message: err.to_string(),
                }
            }
        };
        true
    }

    /// Applies a ready result and closes the panel.
    pub fn apply_transform(&mut self, follow_up: FollowUp) -> Outcome {
        let (range, result) = match &self.ai {
            AiPanel::Ready { range, result, .. } => (range.clone(), result.clone()),
            _ => {
                log::debug!("no AI result to apply");
                return Outcome::Ignored;
            }
        };
        self.ai = AiPanel::Closed;
        self.editor.set_selection(range.clone());
        let cmd = match follow_up {
            FollowUp::Replace => Cmd::ReplaceSelection { text: result },
            FollowUp::InsertBelow => {
                let (_, end) = self.editor.range();
                Cmd::InsertParagraphsBelow {
                    after: end.path.block(),
                    text: result,
                }
            }
        };
        self.edit(cmd)
    }

    pub fn close_ai_panel(&mut self) {
        self.ai = AiPanel::Closed;
        self.restore_selection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, Template};
    use crate::host::RecordingHost;
    use crate::pickers::MentionSource;
    use pretty_assertions::assert_eq;

    fn session(markup: &str) -> Session<RecordingHost> {
        let config = EditorConfig {
            initial_content: markup.into(),
            mention_source: MentionSource::Static {
                candidates: vec![
                    MentionCandidate::new("u1", "Ada"),
                    MentionCandidate::new("u2", "Grace"),
                ],
            },
            ..Preset::TaskDescription.config()
        };
        Session::new(config, RecordingHost::default())
    }

    fn select(session: &mut Session<RecordingHost>, path: Vec<usize>, from: usize, to: usize) {
        session.set_selection(Selection::range(
            Position::new(path.clone(), from),
            Position::new(path, to),
        ));
    }

    #[test]
    fn execute_restores_the_captured_selection() {
        let mut session = session("<p>hello world</p>");
        select(&mut session, vec![0], 0, 5);
        session.blur();
        // Focus moved to the toolbar; the live selection is lost.
        session.editor.set_selection(Selection::default());

        session.execute("bold", &CommandArgs::default());
        assert_eq!(session.markup(), "<p><strong>hello</strong> world</p>");
        assert_eq!(session.host().blurs, 1);
    }

    #[test]
    fn changes_are_reported_to_the_host() {
        let mut session = session("<p></p>");
        session.type_text("a");
        session.type_text("b");
        session.execute("bold", &CommandArgs::default());

        assert_eq!(
            session.host().changes,
            vec!["<p>a</p>".to_string(), "<p>ab</p>".to_string()]
        );
    }

    #[test]
    fn unknown_and_disabled_commands_are_ignored() {
        let mut session = Session::new(Preset::Notepad.config(), RecordingHost::default());
        assert_eq!(session.execute("sparkle", &CommandArgs::default()), Outcome::Ignored);
        assert_eq!(session.execute("table", &CommandArgs::default()), Outcome::Ignored);
        assert!(session.host().changes.is_empty());
    }

    #[test]
    fn read_only_ignores_edits() {
        let config = EditorConfig {
            initial_content: "<p>fixed</p>".into(),
            read_only: true,
            ..Preset::TaskDescription.config()
        };
        let mut session = Session::new(config, NoopHost);
        assert_eq!(session.type_text("x"), Outcome::Ignored);
        assert_eq!(session.execute("divider", &CommandArgs::default()), Outcome::Ignored);
        assert_eq!(session.begin_image_upload(), None);
        assert_eq!(session.markup(), "<p>fixed</p>");
    }

    #[test]
    fn placeholder_shows_only_while_empty() {
        let mut session = session("");
        assert!(session.placeholder().is_some());
        session.type_text("x");
        assert_eq!(session.placeholder(), None);
    }

    #[test]
    fn inline_trigger_is_replaced_by_the_mention() {
        let mut session = session("<p>hi </p>");
        session.set_selection(Selection::caret(Position::new(vec![0], 3)));
        session.type_text("@");
        let picker = session.mention_picker().expect("picker opens on @");
        let ticket = picker.ticket();

        session.set_mention_query("gra");
        let candidate = session.mention_picker().unwrap().candidates()[0].clone();
        session.select_mention(ticket, &candidate);

        assert_eq!(
            session.markup(),
            r#"<p>hi <span data-mention="u2" contenteditable="false">@Grace</span> </p>"#
        );
        assert_eq!(session.overlay_ticket(), None);
    }

    #[test]
    fn at_sign_inside_a_word_does_not_open_the_picker() {
        let mut session = session("<p>mail</p>");
        session.type_text("@");
        assert!(session.mention_picker().is_none());
    }

    #[test]
    fn closing_a_picker_changes_nothing() {
        let mut session = session("<p>x</p>");
        let outcome = session.execute("emoji", &CommandArgs::default());
        assert!(matches!(outcome, Outcome::Opened(_)));
        let version = session.version();

        session.close_overlay();
        assert_eq!(session.markup(), "<p>x</p>");
        assert_eq!(session.version(), version);
    }

    #[test]
    fn emoji_picker_inserts_the_glyph() {
        let mut session = session("<p>done </p>");
        session.set_selection(Selection::caret(Position::new(vec![0], 5)));
        session.type_text(":");
        let ticket = session.overlay_ticket().expect("picker opens on :");
        session.set_emoji_query("check");
        let glyph = session.emoji_results()[0].glyph;

        session.select_emoji(ticket, glyph);
        assert_eq!(session.markup(), "<p>done <span data-emoji>✅</span></p>");
    }

    #[test]
    fn emoji_backspace_is_the_same_after_a_reload() {
        let mut live = session("<p>x</p>");
        live.set_selection(Selection::caret(Position::new(vec![0], 1)));
        live.execute(
            "emoji",
            &CommandArgs {
                glyph: Some("❤️".into()),
                ..Default::default()
            },
        );
        let mut reloaded = session(&live.markup());
        reloaded.set_selection(Selection::caret(Position::new(vec![0], 2)));

        live.delete_backward();
        reloaded.delete_backward();
        assert_eq!(live.markup(), "<p>x</p>");
        assert_eq!(reloaded.markup(), "<p>x</p>");
    }

    #[test]
    fn image_upload_inserts_at_the_captured_caret() {
        let mut session = session("<p>ab</p><p>cd</p>");
        session.set_selection(Selection::caret(Position::new(vec![0], 2)));
        let Outcome::Opened(ticket) = session.execute("image", &CommandArgs::default()) else {
            panic!("image without src opens the upload");
        };
        // The user clicks elsewhere while the file is read.
        session.set_selection(Selection::caret(Position::new(vec![1], 1)));

        session.complete_image_upload(ticket, Ok("data:image/png;base64,AA==".into()), "dot");
        assert_eq!(
            session.markup(),
            r#"<p>ab</p><img src="data:image/png;base64,AA==" alt="dot"><p></p><p>cd</p>"#
        );
    }

    #[test]
    fn failed_or_stale_upload_inserts_nothing() {
        let mut session = session("<p>ab</p>");
        let ticket = session.begin_image_upload().unwrap();
        let failed = session.complete_image_upload(
            ticket,
            Err(HostError::Read {
                name: "a.png".into(),
                reason: "gone".into(),
            }),
            "",
        );
        assert_eq!(failed, Outcome::Ignored);

        let stale = session.begin_image_upload().unwrap();
        session.begin_image_upload();
        assert_eq!(
            session.complete_image_upload(stale, Ok("x.png".into()), ""),
            Outcome::Ignored
        );
        assert_eq!(session.markup(), "<p>ab</p>");
    }

    #[test]
    fn ai_replace_overwrites_the_original_range() {
        let mut session = session("<p>hello world</p><p>next</p>");
        select(&mut session, vec![0], 0, 11);
        let Outcome::Opened(_) = session.execute("aiAssist", &CommandArgs::default()) else {
            panic!("aiAssist opens the panel");
        };
        let request = session.begin_transform(InstructionKind::FixGrammar).unwrap();
        assert_eq!(request.request.source_text, "hello world");

        assert!(session.finish_transform(request.ticket, Ok("Hello world.".into())));
        session.apply_transform(FollowUp::Replace);

        assert_eq!(session.markup(), "<p>Hello world.</p><p>next</p>");
        assert_eq!(session.ai_panel(), &AiPanel::Closed);
    }

    #[test]
    fn ai_replace_across_list_items_leaves_no_blank_rows() {
        let mut session = session("<ul><li>ab</li><li>cd</li><li>ef</li></ul>");
        session.set_selection(Selection::range(
            Position::new(vec![0, 0], 1),
            Position::new(vec![0, 2], 1),
        ));
        session.execute("aiAssist", &CommandArgs::default());
        let request = session.begin_transform(InstructionKind::Summarize).unwrap();
        session.finish_transform(request.ticket, Ok("X".into()));
        session.apply_transform(FollowUp::Replace);

        assert_eq!(session.markup(), "<ul><li>aXf</li></ul>");
    }

    #[test]
    fn ai_insert_below_keeps_the_original() {
        let mut session = session("<p>notes</p><p>end</p>");
        select(&mut session, vec![0], 0, 5);
        session.execute("aiAssist", &CommandArgs::default());
        let request = session.begin_transform(InstructionKind::Expand).unwrap();
        session.finish_transform(request.ticket, Ok("one\ntwo".into()));
        session.apply_transform(FollowUp::InsertBelow);

        assert_eq!(session.markup(), "<p>notes</p><p>one</p><p>two</p><p>end</p>");
    }

    #[test]
    fn ai_failure_is_visible_and_leaves_the_document() {
        let mut session = session("<p>text</p>");
        select(&mut session, vec![0], 0, 4);
        session.execute("aiAssist", &CommandArgs::default());
        let request = session.begin_transform(InstructionKind::Improve).unwrap();
        session.finish_transform(request.ticket, Err(AiError::Service("timeout".into())));

        assert_eq!(session.ai_panel().error(), Some("AI request failed: timeout"));
        assert_eq!(session.apply_transform(FollowUp::Replace), Outcome::Ignored);
        assert_eq!(session.markup(), "<p>text</p>");
        assert!(session.ai_panel().error().is_some());
    }

    #[test]
    fn ai_needs_a_selection() {
        let mut session = session("<p>text</p>");
        session.execute("aiAssist", &CommandArgs::default());
        assert_eq!(session.begin_transform(InstructionKind::Summarize), None);
        assert_eq!(session.ai_panel().error(), Some("Select some text first"));
    }

    #[test]
    fn late_ai_result_after_close_is_dropped() {
        let mut session = session("<p>text</p>");
        select(&mut session, vec![0], 0, 4);
        session.execute("aiAssist", &CommandArgs::default());
        let request = session.begin_transform(InstructionKind::Improve).unwrap();
        session.close_ai_panel();
        assert!(!session.finish_transform(request.ticket, Ok("Text".into())));
    }

    #[test]
    fn template_inserts_its_blocks() {
        let config = EditorConfig {
            initial_content: "<p>intro</p>".into(),
            templates: vec![Template {
                name: "checklist".into(),
                markup: "<ul><li>first</li></ul>".into(),
            }],
            ..Preset::TaskDescription.config()
        };
        let mut session = Session::new(config, NoopHost);
        session.execute(
            "template",
            &CommandArgs {
                name: Some("checklist".into()),
                ..Default::default()
            },
        );
        assert_eq!(session.markup(), "<p>intro</p><ul><li>first</li></ul>");
    }
}
