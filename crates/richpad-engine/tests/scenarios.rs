use pretty_assertions::assert_eq;
use richpad_engine::media::classify_embed;
use richpad_engine::{
    AiPanel, CommandArgs, EditorConfig, Embed, FollowUp, InstructionKind, NoopHost, Position,
    Preset, Provider, Selection, SelectionTracker, Session, format_outline,
};
use rstest::rstest;

fn task_session(markup: &str) -> Session {
    let config = EditorConfig {
        initial_content: markup.into(),
        ..Preset::TaskDescription.config()
    };
    Session::new(config, NoopHost)
}

fn run(session: &mut Session, id: &str) {
    session.execute(id, &CommandArgs::default());
}

#[test]
fn bullet_list_typed_and_exited() {
    let mut session = task_session("");
    run(&mut session, "bulletList");
    session.type_text("a");
    session.commit();
    session.type_text("b");
    session.commit();
    session.commit();

    insta::assert_snapshot!(format_outline(session.document()), @r#"
    List ordered=false
      Item "a"
      Item "b"
    Paragraph ""
    "#);
    assert_eq!(
        session.selection(),
        &Selection::caret(Position::new(vec![1], 0))
    );
}

#[test]
fn enter_on_sole_empty_item_leaves_one_paragraph() {
    let mut session = task_session("<ul><li></li></ul>");
    session.set_selection(Selection::caret(Position::new(vec![0, 0], 0)));
    session.commit();
    assert_eq!(session.markup(), "<p></p>");
}

#[test]
fn nested_empty_item_outdents_before_exiting() {
    let mut session = task_session("<ul><li>a<ul><li>b</li></ul></li></ul>");
    session.set_selection(Selection::caret(Position::new(vec![0, 0, 0], 1)));
    session.commit();
    session.commit();
    assert_eq!(session.markup(), "<ul><li>a<ul><li>b</li></ul></li><li></li></ul>");

    session.commit();
    assert_eq!(session.markup(), "<ul><li>a<ul><li>b</li></ul></li></ul><p></p>");
}

#[test]
fn ai_fix_grammar_replaces_only_the_selection() {
    let mut session = task_session("<p>hello world</p>");
    session.set_selection(Selection::range(
        Position::new(vec![0], 0),
        Position::new(vec![0], 11),
    ));
    run(&mut session, "aiAssist");
    let request = session
        .begin_transform(InstructionKind::FixGrammar)
        .expect("selection is not empty");
    session.finish_transform(request.ticket, Ok("Hello world.".into()));
    assert!(matches!(session.ai_panel(), AiPanel::Ready { .. }));

    session.apply_transform(FollowUp::Replace);
    assert_eq!(session.markup(), "<p>Hello world.</p>");
}

#[rstest]
#[case::bold("bold")]
#[case::italic("italic")]
#[case::underline("underline")]
#[case::strike("strike")]
#[case::inline_code("inlineCode")]
fn toggling_twice_is_a_round_trip(#[case] id: &str) {
    let original = r#"<p>one <a href="https://x.test">two</a> three</p><ul><li>four</li></ul>"#;
    let mut session = task_session(original);
    session.set_selection(Selection::range(
        Position::new(vec![0], 2),
        Position::new(vec![1, 0], 2),
    ));
    run(&mut session, id);
    assert_ne!(session.markup(), original);
    run(&mut session, id);
    assert_eq!(session.markup(), original);
}

#[test]
fn capture_then_restore_is_identity() {
    let mut session = task_session("<p>abc</p><ul><li>de</li></ul>");
    let selection = Selection::range(Position::new(vec![0], 1), Position::new(vec![1, 0], 1));
    session.set_selection(selection.clone());

    let mut tracker = SelectionTracker::new();
    tracker.capture(session.selection().clone());
    assert_eq!(tracker.restore(session.document()), selection);
}

#[rstest]
#[case(1, 1)]
#[case(2, 3)]
#[case(5, 2)]
fn table_has_requested_shape(#[case] rows: usize, #[case] cols: usize) {
    let mut session = task_session("<p></p>");
    session.execute(
        "table",
        &CommandArgs {
            rows: Some(rows),
            cols: Some(cols),
            ..Default::default()
        },
    );

    let richpad_engine::Block::Table(table) = &session.document().blocks()[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.shape(), (rows, cols));
    assert!(table.rows.iter().flat_map(|r| &r.cells).all(|c| c.inlines.is_empty()));
    assert_eq!(
        session.selection(),
        &Selection::caret(Position::new(vec![0, 0, 0], 0))
    );
}

#[rstest]
#[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Provider::YouTube, "dQw4w9WgXcQ")]
#[case("https://youtu.be/dQw4w9WgXcQ", Provider::YouTube, "dQw4w9WgXcQ")]
#[case("https://www.youtube.com/shorts/abc123XYZ_-", Provider::YouTube, "abc123XYZ_-")]
#[case("https://vimeo.com/76979871", Provider::Vimeo, "76979871")]
#[case("https://www.loom.com/share/0281766fa2d04bb788eaf19e65135184", Provider::Loom, "0281766fa2d04bb788eaf19e65135184")]
fn known_video_urls_become_players(
    #[case] url: &str,
    #[case] provider: Provider,
    #[case] id: &str,
) {
    assert_eq!(
        classify_embed(url),
        Embed::Video {
            provider,
            resource_id: id.to_string(),
        }
    );
}

#[test]
fn other_urls_become_link_cards() {
    let mut session = task_session("<p></p>");
    session.execute(
        "embed",
        &CommandArgs {
            url: Some("https://example.com/video".into()),
            ..Default::default()
        },
    );
    assert_eq!(
        session.markup(),
        r#"<div data-embed="link" data-url="https://example.com/video"><a href="https://example.com/video">https://example.com/video</a></div><p></p>"#
    );
}
