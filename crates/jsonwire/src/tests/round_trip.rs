use std::{collections::BTreeMap, fmt::Debug};

use quickcheck::QuickCheck;
use rstest::rstest;

use super::{Record, Table, quickcheck_tests, test_options};
use crate::{JsonOptions, from_slice, to_vec};

fn round_trips<T: PartialEq + Debug + 'static>(value: &T, options: &JsonOptions) -> bool {
    let bytes = to_vec(value, options).unwrap();
    // Everything written must be JSON an independent parser accepts.
    if serde_json::from_slice::<serde_json::Value>(&bytes).is_err() {
        return false;
    }
    from_slice::<T>(&bytes, options).as_ref() == Ok(value)
}

fn same_float(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

#[test]
fn integers_and_strings_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(ints: Vec<i64>, unsigned: Vec<u64>, strings: Vec<String>, nested: Vec<Vec<String>>) -> bool {
        let options = test_options();
        round_trips(&ints, &options)
            && round_trips(&unsigned, &options)
            && round_trips(&strings, &options)
            && round_trips(&nested, &options)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<i64>, Vec<u64>, Vec<String>, Vec<Vec<String>>) -> bool);
}

#[test]
fn floats_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(values: Vec<f64>, single: Vec<f32>) -> bool {
        let options = test_options();
        let bytes = to_vec(&values, &options).unwrap();
        let Ok(decoded) = from_slice::<Vec<f64>>(&bytes, &options) else {
            return false;
        };
        let bytes = to_vec(&single, &options).unwrap();
        let Ok(decoded_single) = from_slice::<Vec<f32>>(&bytes, &options) else {
            return false;
        };
        decoded.len() == values.len()
            && decoded.iter().zip(&values).all(|(a, b)| same_float(*a, *b))
            && decoded_single
                .iter()
                .zip(&single)
                .all(|(a, b)| same_float(f64::from(*a), f64::from(*b)))
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<f64>, Vec<f32>) -> bool);
}

#[test]
fn composites_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(records: Vec<(i64, String)>, optional: Vec<Option<i32>>, table: BTreeMap<String, Vec<i32>>) -> bool {
        let options = test_options();
        let records: Vec<Record> = records
            .into_iter()
            .enumerate()
            .map(|(i, (n, s))| (n, s, (i % 2 == 0).then_some(i as f64 / 4.0)))
            .collect();
        let table: Table = table;
        round_trips(&records, &options) && round_trips(&optional, &options) && round_trips(&table, &options)
    }

    QuickCheck::new()
        .tests(quickcheck_tests() / 10)
        .quickcheck(prop as fn(Vec<(i64, String)>, Vec<Option<i32>>, BTreeMap<String, Vec<i32>>) -> bool);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(255)]
#[case(256)]
#[case(257)]
#[case(2000)]
fn list_lengths_across_scratch_growth(#[case] len: usize) {
    let options = test_options();
    let values: Vec<String> = (0..len).map(|i| format!("item {i}")).collect();
    assert!(round_trips(&values, &options));
    let boxed: Box<[u16]> = (0..len).map(|i| i as u16).collect();
    assert!(round_trips(&boxed, &options));
}

#[test]
fn option_null_round_trips() {
    let options = test_options();
    assert!(round_trips(&None::<String>, &options));
    assert!(round_trips(&Some(String::new()), &options));
    assert!(round_trips(&None::<Vec<i32>>, &options));
    assert!(round_trips(&Some(vec![1, 2]), &options));
}
