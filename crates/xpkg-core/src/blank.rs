//! Detection of documents that carry no content.

use crate::splitter::{is_end_marker, is_start_marker, COMMENT};

/// Returns `true` if every line of the document, after trimming leading
/// whitespace, is empty, a comment, or a document marker (with or without a
/// trailing comment). A trailing `\r` is ignored, so CRLF input behaves like
/// LF input.
///
/// Blank documents are skipped before classification; handing one to a
/// registry would fail to decode.
pub fn is_blank_document(document: &[u8]) -> bool {
    String::from_utf8_lossy(document).split('\n').all(|line| {
        let trimmed = line.trim_start().trim_end_matches('\r');
        trimmed.is_empty()
            || trimmed.starts_with(COMMENT)
            || is_start_marker(trimmed)
            || is_end_marker(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_is_blank() {
        assert!(is_blank_document(b""));
        assert!(is_blank_document(b"\n\n   \n\t\n"));
    }

    #[test]
    fn markers_and_comments_are_blank() {
        assert!(is_blank_document(b"---\n# comment\n  # indented comment\n...\n"));
    }

    #[test]
    fn markers_with_comments_are_blank() {
        assert!(is_blank_document(b"--- # start\n... # end\n"));
    }

    #[test]
    fn crlf_markers_are_blank() {
        assert!(is_blank_document(b"  ---\r\n# c\r\n  ...\r\n\r\n"));
    }

    #[test]
    fn content_is_not_blank() {
        assert!(!is_blank_document(b"# header\nkind: Foo\n"));
        assert!(!is_blank_document(b"foo"));
    }

    #[test]
    fn marker_with_trailing_text_is_not_blank() {
        assert!(!is_blank_document(b"--- !tag\n"));
        assert!(!is_blank_document(b"....\n"));
    }

    proptest! {
        #[test]
        fn blank_lines_compose(lines in prop::collection::vec(
            prop_oneof![
                Just(String::new()),
                Just("---".to_string()),
                Just("...".to_string()),
                "[ \t]{0,4}#[a-z ]{0,12}",
                "[ \t]{1,4}",
            ],
            0..16,
        )) {
            prop_assert!(is_blank_document(lines.join("\n").as_bytes()));
        }

        #[test]
        fn any_key_makes_it_non_blank(prefix in "[ \t]{0,4}", key in "[a-z]{1,8}") {
            let doc = format!("# comment\n{prefix}{key}: value\n");
            prop_assert!(!is_blank_document(doc.as_bytes()));
        }
    }
}
