use alloc::{string::ToString, vec, vec::Vec};

use rstest::rstest;

use crate::{CsvEvent, CsvParser, EventLog, ParseOutcome, ParserOptions, TextEncoding};

/// Collects the full event sequence for `input`, panicking on any failure.
fn events(input: &[u8], options: ParserOptions) -> Vec<CsvEvent> {
    CsvParser::new(input, options)
        .unwrap()
        .collect::<Result<_, _>>()
        .expect("input should parse cleanly")
}

fn ls(line: usize) -> CsvEvent {
    CsvEvent::LineStart { line }
}

fn le(line: usize) -> CsvEvent {
    CsvEvent::LineEnd { line }
}

fn field(value: &str) -> CsvEvent {
    CsvEvent::Field {
        value: value.to_string(),
    }
}

fn comment(text: &str) -> CsvEvent {
    CsvEvent::Comment {
        text: text.to_string(),
    }
}

fn utf16_bytes(text: &str, big_endian: bool) -> Vec<u8> {
    let mut bytes: Vec<u8> = if big_endian {
        vec![0xFE, 0xFF]
    } else {
        vec![0xFF, 0xFE]
    };
    for unit in text.encode_utf16() {
        let pair = if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        };
        bytes.extend_from_slice(&pair);
    }
    bytes
}

fn utf32_bytes(text: &str, big_endian: bool) -> Vec<u8> {
    let mut bytes: Vec<u8> = if big_endian {
        vec![0x00, 0x00, 0xFE, 0xFF]
    } else {
        vec![0xFF, 0xFE, 0x00, 0x00]
    };
    for ch in text.chars() {
        let quad = if big_endian {
            u32::from(ch).to_be_bytes()
        } else {
            u32::from(ch).to_le_bytes()
        };
        bytes.extend_from_slice(&quad);
    }
    bytes
}

#[test]
fn structure_of_a_mixed_document() {
    assert_eq!(
        events(b"a,b,\"c,d\"\n#note\ne,f", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a"),
            field("b"),
            field("c,d"),
            le(1),
            ls(2),
            comment("note"),
            le(2),
            ls(3),
            field("e"),
            field("f"),
            le(3),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn empty_input_is_a_bare_document() {
    assert_eq!(
        events(b"", ParserOptions::default()),
        vec![CsvEvent::DocumentStart, CsvEvent::DocumentEnd]
    );
}

#[rstest]
#[case::utf8(&[0xEF, 0xBB, 0xBF], TextEncoding::Utf8)]
#[case::utf16be(&[0xFE, 0xFF], TextEncoding::Utf16Be)]
#[case::utf16le(&[0xFF, 0xFE], TextEncoding::Utf16Le)]
#[case::utf32be(&[0x00, 0x00, 0xFE, 0xFF], TextEncoding::Utf32Be)]
#[case::utf32le(&[0xFF, 0xFE, 0x00, 0x00], TextEncoding::Utf32Le)]
fn bom_only_input_is_a_bare_document(
    #[case] bytes: &'static [u8],
    #[case] encoding: TextEncoding,
) {
    let parser = CsvParser::new(bytes, ParserOptions::default()).unwrap();
    assert_eq!(parser.encoding(), encoding);
    let actual: Vec<CsvEvent> = parser.collect::<Result<_, _>>().unwrap();
    assert_eq!(actual, vec![CsvEvent::DocumentStart, CsvEvent::DocumentEnd]);
}

#[test]
fn final_line_without_terminator_is_complete() {
    assert_eq!(
        events(b"a,b\nc,d", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a"),
            field("b"),
            le(1),
            ls(2),
            field("c"),
            field("d"),
            le(2),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn empty_fields_are_reported() {
    assert_eq!(
        events(b"a,,b", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a"),
            field(""),
            field("b"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
    assert_eq!(
        events(b"a,", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a"),
            field(""),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn bare_terminator_is_a_line_with_one_empty_field() {
    assert_eq!(
        events(b"\n", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field(""),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn crlf_collapses_to_one_line_end() {
    assert_eq!(
        events(b"a\r\nb", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a"),
            le(1),
            ls(2),
            field("b"),
            le(2),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn lone_carriage_returns_do_not_pair_up() {
    // CR CR is two line ends, and LF CR is two as well: only the exact CR LF
    // pair collapses.
    let evs = events(b"a\r\rb", ParserOptions::default());
    let ends = evs
        .iter()
        .filter(|event| matches!(event, CsvEvent::LineEnd { .. }))
        .count();
    assert_eq!(ends, 3);

    let evs = events(b"a\n\rb", ParserOptions::default());
    let ends = evs
        .iter()
        .filter(|event| matches!(event, CsvEvent::LineEnd { .. }))
        .count();
    assert_eq!(ends, 3);
}

#[test]
fn line_numbers_are_sequential() {
    let evs = events(b"a\nb\r\nc\rd", ParserOptions::default());
    let starts: Vec<usize> = evs
        .iter()
        .filter_map(|event| match event {
            CsvEvent::LineStart { line } => Some(*line),
            _ => None,
        })
        .collect();
    let ends: Vec<usize> = evs
        .iter()
        .filter_map(|event| match event {
            CsvEvent::LineEnd { line } => Some(*line),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![1, 2, 3, 4]);
    assert_eq!(ends, vec![1, 2, 3, 4]);
}

#[test]
fn quoted_fields_hide_delimiters_and_terminators() {
    assert_eq!(
        events(b"\"a,b\",c", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a,b"),
            field("c"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn quoted_fields_span_physical_lines() {
    assert_eq!(
        events(b"\"a\nb\"\nc", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a\nb"),
            le(1),
            ls(2),
            field("c"),
            le(2),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn doubled_quotes_collapse_to_one() {
    assert_eq!(
        events(b"\"say \"\"hi\"\"\",x", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("say \"hi\""),
            field("x"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn fields_made_only_of_quotes_collapse() {
    // `"""a"""` is the quoted form of `"a"`.
    assert_eq!(
        events(b"\"\"\"a\"\"\"", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("\"a\""),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn quotes_after_the_first_character_are_literal() {
    assert_eq!(
        events(b"say \"hi\",x", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("say \"hi\""),
            field("x"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn text_after_a_closing_quote_keeps_the_field_raw() {
    assert_eq!(
        events(b"\"a\"x,y", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("\"a\"x"),
            field("y"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn comments_start_lines_and_lose_their_marker() {
    assert_eq!(
        events(b"#c\na,#x", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            comment("c"),
            le(1),
            ls(2),
            field("a"),
            field("#x"),
            le(2),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn comment_without_terminator_ends_the_document() {
    assert_eq!(
        events(b"#just a note", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            comment("just a note"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn empty_comments_are_events_too() {
    assert_eq!(
        events(b"#\n", ParserOptions::default()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            comment(""),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn custom_dialects_rebind_every_role() {
    let options = ParserOptions {
        delimiter: ';',
        line_terminators: vec!['|'],
        comment_marker: '%',
        ..Default::default()
    };
    assert_eq!(
        events(b"a;b|%note|c", options.clone()),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("a"),
            field("b"),
            le(1),
            ls(2),
            comment("note"),
            le(2),
            ls(3),
            field("c"),
            le(3),
            CsvEvent::DocumentEnd,
        ]
    );

    // With `|` as the only terminator, a newline is ordinary field data.
    assert_eq!(
        events(b"x\ny|z", options),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("x\ny"),
            le(1),
            ls(2),
            field("z"),
            le(2),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn non_ascii_dialect_characters_work() {
    let options = ParserOptions {
        delimiter: '·',
        ..Default::default()
    };
    assert_eq!(
        events("é·😀".as_bytes(), options),
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("é"),
            field("😀"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn all_encodings_yield_identical_events() {
    let text = "á,😀\n\"q,q\"";
    let expected = events(text.as_bytes(), ParserOptions::default());

    let mut utf8 = vec![0xEF, 0xBB, 0xBF];
    utf8.extend_from_slice(text.as_bytes());

    let sources = [
        (utf8, TextEncoding::Utf8),
        (utf16_bytes(text, false), TextEncoding::Utf16Le),
        (utf16_bytes(text, true), TextEncoding::Utf16Be),
        (utf32_bytes(text, false), TextEncoding::Utf32Le),
        (utf32_bytes(text, true), TextEncoding::Utf32Be),
    ];
    for (bytes, encoding) in sources {
        let parser = CsvParser::new(bytes.as_slice(), ParserOptions::default()).unwrap();
        assert_eq!(parser.encoding(), encoding);
        let actual: Vec<CsvEvent> = parser.collect::<Result<_, _>>().unwrap();
        assert_eq!(actual, expected, "{encoding:?}");
    }
}

#[test]
fn encoding_hint_keeps_signature_bytes_as_data() {
    let options = ParserOptions {
        encoding: Some(TextEncoding::Utf16Le),
        ..Default::default()
    };
    let parser = CsvParser::new([0xFF, 0xFE, 0x61, 0x00].as_slice(), options).unwrap();
    let actual: Vec<CsvEvent> = parser.collect::<Result<_, _>>().unwrap();
    assert_eq!(
        actual,
        vec![
            CsvEvent::DocumentStart,
            ls(1),
            field("\u{FEFF}a"),
            le(1),
            CsvEvent::DocumentEnd,
        ]
    );
}

#[test]
fn sink_receives_the_iterator_sequence() {
    let input: &[u8] = b"a,\"b\nc\"\n#note\nd";
    let expected = events(input, ParserOptions::default());

    let mut log = EventLog::default();
    let outcome = CsvParser::new(input, ParserOptions::default())
        .unwrap()
        .parse(&mut log)
        .unwrap();

    assert_eq!(outcome, ParseOutcome::Finished);
    assert_eq!(log.events, expected);
    assert_eq!(log.failure, None);
}

#[cfg(feature = "std")]
#[test]
fn io_sources_parse_like_slices() {
    use std::io::Cursor;

    use crate::IoSource;

    let input: &[u8] = b"a,b\n\"c\nd\",e";
    let expected = events(input, ParserOptions::default());

    let parser = CsvParser::new(
        IoSource::new(Cursor::new(input.to_vec())),
        ParserOptions::default(),
    )
    .unwrap();
    let actual: Vec<CsvEvent> = parser.collect::<Result<_, _>>().unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn events_serialize_tagged_by_kind() {
    assert_eq!(
        serde_json::to_value(ls(2)).unwrap(),
        serde_json::json!({ "kind": "LineStart", "line": 2 })
    );
    assert_eq!(
        serde_json::to_value(field("a")).unwrap(),
        serde_json::json!({ "kind": "Field", "value": "a" })
    );
    let parsed: CsvEvent =
        serde_json::from_value(serde_json::json!({ "kind": "DocumentEnd" })).unwrap();
    assert_eq!(parsed, CsvEvent::DocumentEnd);
}
