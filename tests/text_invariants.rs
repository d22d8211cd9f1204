//! Property tests over the public text-buffer/edit-buffer surface: round
//! trips and line-count bookkeeping under randomized text.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use termrope::{EditBuffer, TextBuffer};

fn arb_line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}"
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..8).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn set_text_round_trips_through_plain_text(text in arb_text()) {
        let mut buf = TextBuffer::new();
        buf.set_text(&text).unwrap();
        let mut out = String::new();
        buf.get_plain_text_into_buffer(&mut out);
        prop_assert_eq!(out, text);
    }

    #[test]
    fn line_count_matches_newline_count_plus_one(text in arb_text()) {
        let mut buf = TextBuffer::new();
        buf.set_text(&text).unwrap();
        let expected = text.matches('\n').count() as u32 + 1;
        prop_assert_eq!(buf.get_line_count(), expected);
    }

    #[test]
    fn insert_text_preserves_length_additivity(first in arb_text(), second in "[a-zA-Z0-9]{0,10}") {
        let mut edit = EditBuffer::new(Rc::new(RefCell::new(TextBuffer::new())));
        edit.set_text(&first, false);
        edit.insert_text(&second);
        let mut out = String::new();
        edit.get_text(&mut out);
        prop_assert_eq!(out.len(), first.len() + second.len());
    }

    #[test]
    fn backspace_after_insert_is_identity(text in "[a-zA-Z0-9]{1,20}") {
        let mut edit = EditBuffer::new(Rc::new(RefCell::new(TextBuffer::new())));
        edit.insert_text(&text);
        edit.insert_text("X");
        edit.backspace();
        let mut out = String::new();
        edit.get_text(&mut out);
        prop_assert_eq!(out, text);
    }
}
