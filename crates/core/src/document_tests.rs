// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::section::Value;
use proptest::prelude::*;

fn sample() -> Section {
    let mut root = Section::new();
    root.set("data-version", 3);
    root.set_path("1.type", "beacon").unwrap();
    root.set_path("1.name", "north").unwrap();
    root.set_path("2.type", "gate").unwrap();
    root.set_path("2.pos.x", 10).unwrap();
    root
}

#[test]
fn render_starts_with_header_comment() {
    let doc = Document::new("Entity data.\n\nDo not edit.", sample());
    let text = doc.render().unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("# Entity data."));
    assert_eq!(lines.next(), Some("#"));
    assert_eq!(lines.next(), Some("# Do not edit."));
    assert_eq!(lines.next(), Some(""));
}

#[test]
fn parse_ignores_header_and_restores_tree() {
    let doc = Document::new("header", sample());
    let text = doc.render().unwrap();

    let root = Document::parse(&text).unwrap();
    assert_eq!(root, sample());
    assert_eq!(root.get_path("2.pos.x"), Some(&Value::Integer(10)));
}

#[test]
fn parse_reports_malformed_text() {
    let err = Document::parse("[1\nname = ").unwrap_err();
    assert!(matches!(err, DocumentError::Parse(_)));
}

#[test]
fn empty_document_renders_only_header() {
    let doc = Document::new("h", Section::new());
    assert_eq!(doc.render().unwrap(), "# h\n\n");
    assert!(Document::parse("# h\n\n").unwrap().is_empty());
}

fn arb_record() -> impl Strategy<Value = Section> {
    (
        "[a-z]{1,8}",
        any::<i64>(),
        any::<bool>(),
        proptest::collection::vec("[ -~]{0,12}", 0..4),
    )
        .prop_map(|(kind, n, flag, tags)| {
            let mut s = Section::new();
            s.set("type", kind);
            s.set("n", n);
            s.set("flag", flag);
            s.set("tags", tags);
            s.set_path("nested.deep.n", n).unwrap();
            s
        })
}

proptest! {
    #[test]
    fn render_parse_render_is_stable(
        records in proptest::collection::btree_map(1u32..10_000, arb_record(), 0..20)
    ) {
        let mut root = Section::new();
        root.set("data-version", 1);
        for (id, record) in records {
            root.set_child(id.to_string(), record);
        }

        let first = Document::new("h", root.clone()).render().unwrap();
        let parsed = Document::parse(&first).unwrap();
        prop_assert_eq!(&parsed, &root);

        let second = Document::new("h", parsed).render().unwrap();
        prop_assert_eq!(first, second);
    }
}
