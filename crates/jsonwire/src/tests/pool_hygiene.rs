use std::thread;

use rstest::rstest;

use super::{Record, test_options};
use crate::{
    ErrorCategory, from_slice, to_vec,
    formatters::BitVector,
};

#[rstest]
#[case::truncated(b"[1,2,3".as_slice())]
#[case::bad_element(b"[1,\"two\",3]".as_slice())]
#[case::trailing_separator(b"[1,2,]".as_slice())]
#[case::missing_separator(b"[1 2]".as_slice())]
#[case::overflow(b"[1,99999999999]".as_slice())]
fn failed_decodes_return_every_buffer(#[case] input: &[u8]) {
    let options = test_options();
    assert!(from_slice::<Vec<i32>>(input, &options).is_err());
    assert!(from_slice::<Box<[i32]>>(input, &options).is_err());
    let stats = options.pool.stats();
    assert!(stats.rented >= 2);
    assert_eq!(stats.outstanding(), 0);
}

#[test]
fn nested_failure_returns_inner_and_outer_buffers() {
    let options = test_options();
    let mut input = b"[".to_vec();
    for i in 0..300 {
        input.extend_from_slice(format!(r#"{{"Item1":{i},"Item2":"x","Item3":null}},"#).as_bytes());
    }
    input.extend_from_slice(br#"{"Item1":"oops"}]"#);
    let err = from_slice::<Vec<Record>>(&input, &options).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Format);
    assert_eq!(options.pool.stats().outstanding(), 0);
}

#[test]
fn successful_decodes_reuse_buffers() {
    let options = test_options();
    let bytes = to_vec(&(0..1000).collect::<Vec<i32>>(), &options).unwrap();
    for _ in 0..10 {
        let decoded: Vec<i32> = from_slice(&bytes, &options).unwrap();
        assert_eq!(decoded.len(), 1000);
    }
    let stats = options.pool.stats();
    assert_eq!(stats.outstanding(), 0);
    assert!(stats.allocated < stats.rented);
}

#[test]
fn scratch_is_not_shared_between_threads() {
    let options = test_options();

    let handles: Vec<_> = (0..8)
        .map(|id: i64| {
            let options = options.clone();
            thread::spawn(move || {
                for len in 0..200 {
                    let values: Vec<i64> = (0..len).map(|i| id * 1_000 + i).collect();
                    let bytes = to_vec(&values, &options).unwrap();
                    let decoded: Vec<i64> = from_slice(&bytes, &options).unwrap();
                    assert_eq!(decoded, values);

                    let bits: BitVector = (0..len).map(|i| (i + id) % 2 == 0).collect();
                    let bytes = to_vec(&bits, &options).unwrap();
                    assert_eq!(from_slice::<BitVector>(&bytes, &options).unwrap(), bits);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(options.pool.stats().outstanding(), 0);
}
