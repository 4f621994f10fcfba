use super::*;

#[test]
fn single_line_commits_every_append() {
    let mut a = MergeRule::Single.compile();
    assert!(a.append(b"hello"));
    assert_eq!(a.line(), b"hello");
    assert!(a.null());
}

#[test]
fn multi_line_emits_previous_record_on_next_start_line() {
    let mut a = MergeRule::Multi {
        start: Regex::new("^err ").expect("valid regex"),
    }
    .compile();

    assert!(!a.append(b"err stack"));
    assert!(!a.append(b"  at frame1"));
    assert!(!a.append(b"  at frame2"));
    assert!(a.append(b"err other"));
    assert_eq!(a.line(), b"err stack\n  at frame1\n  at frame2");

    assert!(!a.null());
    assert_eq!(a.line(), b"err other");
    assert!(a.null());
}

#[test]
fn multi_line_residue_is_empty_when_stream_ends_cleanly() {
    let mut a = MergeRule::Multi {
        start: Regex::new("^err ").expect("valid regex"),
    }
    .compile();
    assert!(a.null());
}

#[test]
fn multi_line_first_start_line_does_not_emit_early() {
    let mut a = MergeRule::Multi {
        start: Regex::new("^err ").expect("valid regex"),
    }
    .compile();
    assert!(!a.append(b"err stack"));
}
