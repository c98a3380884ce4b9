use super::*;
use super::assert_eq;

#[test]
fn incremental_equals_batch_for_close_events() {
    let text = well_formed_response();

    let mut incremental = StreamParser::new();
    let (inc_output, inc_sink) = parse_by_char(&mut incremental, "m1", &text);

    let mut batch = StreamParser::new();
    let (batch_output, batch_sink) = parse_batch(&mut batch, "m1", &text);

    assert_eq!(inc_sink.action_closes(), batch_sink.action_closes());
    assert_eq!(inc_sink.artifact_closes(), batch_sink.artifact_closes());
    assert_eq!(inc_output, batch_output);
}

#[test]
fn two_chunk_file_action_streams_partial_then_final_content() {
    let chunk1 = concat!(
        "Hello",
        r#"<boltArtifact id="a" title="t">"#,
        r#"<boltAction type="file" filePath="x.txt">ab"#,
    );
    let chunk2 = format!("{chunk1}c</boltAction></boltArtifact>");

    let mut parser = StreamParser::new();
    let mut sink = RecordingSink::default();

    let output = parser
        .parse("m1", chunk1, &mut sink)
        .expect("parse should succeed");
    assert_eq!(output, format!("Hello{}", artifact_placeholder("m1")));

    let opens: Vec<&SinkCall> = sink
        .calls
        .iter()
        .filter(|call| matches!(call, SinkCall::ActionOpen(_)))
        .collect();
    assert_eq!(opens.len(), 1);
    let streams = sink.action_streams();
    assert_eq!(streams.len(), 1);
    assert_eq!(
        streams[0].action,
        ArtifactAction::File {
            file_path: "x.txt".to_string(),
            content: "ab".to_string(),
        }
    );

    parser
        .parse("m1", &chunk2, &mut sink)
        .expect("parse should succeed");
    let streams = sink.action_streams();
    assert_eq!(streams.len(), 2);
    assert_eq!(
        streams[1].action,
        ArtifactAction::File {
            file_path: "x.txt".to_string(),
            content: "abc".to_string(),
        }
    );
    assert_eq!(sink.artifact_closes(), 1);
    assert_eq!(sink.action_closes(), Vec::<ActionEvent>::new());
}

#[test]
fn shell_closed_in_one_chunk_fires_exactly_one_close_and_no_stream() {
    let text = concat!(
        r#"<boltArtifact id="a" title="t">"#,
        r#"<boltAction type="shell">npm install</boltAction>"#,
        r#"</boltArtifact>"#,
    );

    let mut parser = StreamParser::new();
    let (_, sink) = parse_batch(&mut parser, "m1", text);

    let closes = sink.action_closes();
    assert_eq!(closes.len(), 1);
    assert_eq!(
        closes[0].action,
        ArtifactAction::Shell {
            content: "npm install".to_string(),
        }
    );
    assert_eq!(sink.action_streams(), Vec::<ActionEvent>::new());
}

#[test]
fn closed_actions_are_never_redelivered() {
    let text = well_formed_response();
    let mut parser = StreamParser::new();
    let mut sink = RecordingSink::default();

    parser
        .parse("m1", &text, &mut sink)
        .expect("parse should succeed");
    let closes_after_first = sink.action_closes().len();
    let streams_after_first = sink.action_streams().len();

    let output = parser
        .parse("m1", &text, &mut sink)
        .expect("parse should succeed");
    assert_eq!(output, "");
    assert_eq!(sink.action_closes().len(), closes_after_first);
    assert_eq!(sink.action_streams().len(), streams_after_first);
}

#[test]
fn streamed_file_content_is_always_a_prefix_of_the_closed_content() {
    let body = "line one\nline two\nline three";
    let text = format!(
        r#"<boltArtifact id="a" title="t"><boltAction type="file" filePath="notes.txt">{body}</boltAction></boltArtifact>"#
    );

    let mut parser = StreamParser::new();
    let (_, sink) = parse_by_char(&mut parser, "m1", &text);

    let streams = sink.action_streams();
    assert!(!streams.is_empty());
    for event in &streams {
        let ArtifactAction::File { content, .. } = &event.action else {
            panic!("expected file action");
        };
        assert!(body.starts_with(content.as_str()), "{content:?} is not a prefix");
    }
    let last = &streams[streams.len() - 1];
    assert_eq!(last.action.content(), body);
}

#[test]
fn open_marker_split_across_chunks_does_not_leak_markup() {
    let chunk1 = "Look: <bolt";
    let chunk2 = r#"Look: <boltArtifact id="a" title="t"></boltArtifact>"#;

    let mut parser = StreamParser::new();
    let mut sink = RecordingSink::default();

    let out1 = parser
        .parse("m1", chunk1, &mut sink)
        .expect("parse should succeed");
    assert_eq!(out1, "Look: ");

    let out2 = parser
        .parse("m1", chunk2, &mut sink)
        .expect("parse should succeed");
    assert_eq!(out2, artifact_placeholder("m1"));
    assert_eq!(sink.artifact_closes(), 1);
}

#[test]
fn action_ids_are_assigned_in_open_order() {
    let text = well_formed_response();
    let mut parser = StreamParser::new();
    let (_, sink) = parse_batch(&mut parser, "m1", &text);

    let ids: Vec<u64> = sink
        .calls
        .iter()
        .filter_map(|call| match call {
            SinkCall::ActionOpen(event) => Some(event.action_id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn every_call_reflushes_live_file_content() {
    let open = r#"<boltArtifact id="a" title="t"><boltAction type="file" filePath="x.txt">ab"#;
    let longer = format!("{open}cd");

    let mut parser = StreamParser::new();
    let mut sink = RecordingSink::default();

    parser
        .parse("m1", open, &mut sink)
        .expect("parse should succeed");
    parser
        .parse("m1", &longer, &mut sink)
        .expect("parse should succeed");
    parser
        .parse("m1", &longer, &mut sink)
        .expect("parse should succeed");

    let contents: Vec<String> = sink
        .action_streams()
        .iter()
        .map(|event| event.action.content().to_string())
        .collect();
    assert_eq!(
        contents,
        vec!["ab".to_string(), "abcd".to_string(), "abcd".to_string()]
    );
}

#[test]
fn reset_then_reparse_matches_a_fresh_message_id() {
    let text = well_formed_response();

    let mut parser = StreamParser::new();
    let (_, first) = parse_by_char(&mut parser, "m1", &text);
    parser.reset();
    let (_, again) = parse_by_char(&mut parser, "m1", &text);

    let mut fresh = StreamParser::new();
    let (_, fresh_sink) = parse_by_char(&mut fresh, "m2", &text);

    assert_eq!(again.action_closes(), first.action_closes());
    assert_eq!(again.calls.len(), fresh_sink.calls.len());
}

#[test]
fn distinct_message_ids_do_not_share_state() {
    let text_a = r#"<boltArtifact id="a" title="t"><boltAction type="shell">echo a</boltAction></boltArtifact>"#;
    let text_b = r#"<boltArtifact id="b" title="t"><boltAction type="shell">echo b</boltAction></boltArtifact>"#;

    let mut parser = StreamParser::new();
    let mut sink = RecordingSink::default();
    parser
        .parse("m1", text_a, &mut sink)
        .expect("parse should succeed");
    parser
        .parse("m2", text_b, &mut sink)
        .expect("parse should succeed");

    let closes = sink.action_closes();
    assert_eq!(closes.len(), 2);
    assert_eq!(closes[0].action_id, 0);
    assert_eq!(closes[1].action_id, 0);
    assert_eq!(closes[0].message_id, "m1");
    assert_eq!(closes[1].message_id, "m2");
}

#[test]
fn sequential_artifacts_in_one_message_each_get_a_placeholder() {
    let text = concat!(
        r#"first <boltArtifact id="a" title="one"></boltArtifact>"#,
        r#" then <boltArtifact id="b" title="two"></boltArtifact> done"#,
    );

    let mut parser = StreamParser::new();
    let (output, sink) = parse_batch(&mut parser, "m1", text);

    let placeholder = artifact_placeholder("m1");
    assert_eq!(output, format!("first {placeholder} then {placeholder} done"));
    assert_eq!(sink.artifact_closes(), 2);
}

#[test]
fn failed_command_close_propagates_and_is_not_retried() {
    let text = concat!(
        r#"<boltArtifact id="a" title="t">"#,
        r#"<boltAction type="shell">exit 1</boltAction>"#,
        r#"</boltArtifact>"#,
    );

    let mut parser = StreamParser::new();
    let mut sink = RecordingSink::default();
    sink.fail_close_with = Some(SinkError::command("exit status 1"));

    let err = parser
        .parse("m1", text, &mut sink)
        .expect_err("close failure should propagate");
    assert_eq!(err, SinkError::command("exit status 1"));
    assert_eq!(sink.action_closes().len(), 1);

    sink.fail_close_with = None;
    parser
        .parse("m1", text, &mut sink)
        .expect("parse should succeed");
    assert_eq!(sink.action_closes().len(), 1);
}
