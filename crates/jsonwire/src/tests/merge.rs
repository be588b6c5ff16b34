use super::{Table, test_options};
use crate::{from_slice, from_slice_to};

#[test]
fn merge_appends_where_fresh_decode_replaces() {
    let options = test_options();
    let mut existing = vec![1, 2, 3];
    from_slice_to(b"[4,5]", &mut existing, &options).unwrap();
    assert_eq!(existing.len(), 5);

    let fresh: Vec<i32> = from_slice(b"[4,5]", &options).unwrap();
    assert_eq!(fresh.len(), 2);
}

#[test]
fn scalar_targets_are_replaced() {
    let options = test_options();
    let mut value = 10u32;
    from_slice_to(b"42", &mut value, &options).unwrap();
    assert_eq!(value, 42);

    let mut text = "old".to_owned();
    from_slice_to(br#""new""#, &mut text, &options).unwrap();
    assert_eq!(text, "new");
}

#[test]
fn map_merge_overwrites_and_inserts() {
    let options = test_options();
    let mut table: Table = [("a".to_owned(), vec![1]), ("b".to_owned(), vec![2])].into();
    from_slice_to(br#"{"b":[3],"c":[]}"#, &mut table, &options).unwrap();
    assert_eq!(table["a"], [1]);
    assert_eq!(table["b"], [3]);
    assert!(table["c"].is_empty());
}

#[test]
fn optional_list_merge_creates_then_appends() {
    let options = test_options();
    let mut target: Option<Vec<i32>> = None;
    from_slice_to(b"[1]", &mut target, &options).unwrap();
    from_slice_to(b"[2,3]", &mut target, &options).unwrap();
    assert_eq!(target, Some(vec![1, 2, 3]));
}

#[test]
fn trailing_content_fails_after_merge() {
    let options = test_options();
    let mut existing = vec![1];
    assert!(from_slice_to(b"[2] [3]", &mut existing, &options).is_err());
}
