use insta::assert_snapshot;
use rstest::rstest;

use super::{Record, Table, test_options};
use crate::{Error, Found, StructuralError, from_slice, to_string, to_vec};

#[test]
fn nested_records() {
    let options = test_options();
    let records: Vec<Record> = vec![(1, "a".to_owned(), None), (-2, "b\nc".to_owned(), Some(0.25))];
    assert_snapshot!(
        to_string(&records, &options).unwrap(),
        @r#"[{"Item1":1,"Item2":"a","Item3":null},{"Item1":-2,"Item2":"b\nc","Item3":0.25}]"#
    );
}

#[test]
fn dictionary_of_lists() {
    let options = test_options();
    let table: Table = [("x".to_owned(), vec![]), ("y".to_owned(), vec![1, 2])].into();
    assert_snapshot!(to_string(&table, &options).unwrap(), @r#"{"x":[],"y":[1,2]}"#);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(300)]
fn separators_between_elements(#[case] len: usize) {
    let options = test_options();
    let values: Vec<Vec<String>> = (0..len).map(|_| Vec::new()).collect();
    let bytes = to_vec(&values, &options).unwrap();
    let separators = bytes.iter().filter(|&&b| b == b',').count();
    assert_eq!(separators, len.saturating_sub(1));
    if len == 0 {
        assert_eq!(bytes, b"[]");
    }
}

#[test]
fn absent_values_are_null() {
    let options = test_options();
    assert_eq!(to_vec(&None::<Vec<i32>>, &options).unwrap(), b"null");
    assert_eq!(to_vec(&vec![Some(1), None], &options).unwrap(), b"[1,null]");
}

#[test]
fn byte_order_mark_is_skipped() {
    let options = test_options();
    let values: Vec<i32> = from_slice(b"\xEF\xBB\xBF [1, 2]\n", &options).unwrap();
    assert_eq!(values, [1, 2]);
}

#[rstest]
#[case::truncated(
    b"[1,2".as_slice(),
    StructuralError::ExpectedSeparatorOrEnd { close: ']', found: Found(None) },
    4
)]
#[case::trailing_separator(b"[1,2,]".as_slice(), StructuralError::TrailingSeparator { close: ']' }, 5)]
#[case::missing_separator(
    b"[1 2]".as_slice(),
    StructuralError::ExpectedSeparatorOrEnd { close: ']', found: Found(Some(b'2')) },
    3
)]
#[case::trailing_characters(b"[1] x".as_slice(), StructuralError::TrailingCharacters, 4)]
fn structural_errors_carry_positions(
    #[case] input: &[u8],
    #[case] kind: StructuralError,
    #[case] position: usize,
) {
    let options = test_options();
    assert_eq!(
        from_slice::<Vec<i32>>(input, &options),
        Err(Error::Structural { kind, position })
    );
}

#[test]
fn format_errors_point_at_the_offending_token() {
    let options = test_options();
    let err = from_slice::<Vec<u8>>(b"[1, 256]", &options).unwrap_err();
    assert_eq!(err.position(), Some(4));
    assert_snapshot!(err, @"number out of range for u8 at byte 4");
}
