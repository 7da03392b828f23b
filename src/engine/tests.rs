use super::*;
use crate::records::Record;
use proptest::prelude::*;
use std::cell::Cell;

fn sample() -> Vec<Record> {
    vec![
        Record::new(3, "a", "x"),
        Record::new(1, "b", "y"),
        Record::new(2, "c", "z"),
    ]
}

fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

fn run(algorithm: Algorithm, data: Vec<Record>, spec: SortSpec) -> Vec<Record> {
    algorithm
        .sort(data, &spec, &CancelObserver::never())
        .expect("not cancelled")
}

// ---- comparator ----

#[test]
fn test_should_swap_ascending_is_strict() {
    assert!(should_swap(&2, &1, true));
    assert!(!should_swap(&1, &2, true));
    assert!(!should_swap(&1, &1, true));
}

#[test]
fn test_should_swap_descending_is_strict() {
    assert!(should_swap(&1, &2, false));
    assert!(!should_swap(&2, &1, false));
    assert!(!should_swap(&1, &1, false));
}

#[test]
fn test_should_swap_on_str() {
    assert!(should_swap("b", "a", true));
    assert!(!should_swap("B", "a", true));
}

#[test]
fn test_is_ordered_by() {
    assert!(is_ordered_by(&[1, 2, 2, 3], |a, b| a > b));
    assert!(!is_ordered_by(&[1, 3, 2], |a, b| a > b));
    assert!(is_ordered_by::<i32, _>(&[], |a, b| a > b));
}

// ---- key selection ----

#[test]
fn test_sort_key_from_index() {
    assert_eq!(SortKey::from_index(0), Some(SortKey::Id));
    assert_eq!(SortKey::from_index(1), Some(SortKey::FirstName));
    assert_eq!(SortKey::from_index(2), Some(SortKey::LastName));
    assert_eq!(SortKey::from_index(3), None);
    for key in SortKey::ALL {
        assert_eq!(SortKey::from_index(key.index()), Some(key));
    }
}

#[test]
fn test_sort_key_select() {
    let r = Record::new(9, "Ada", "Lovelace");
    assert_eq!(SortKey::Id.select(&r), KeyRef::Int(9));
    assert_eq!(SortKey::FirstName.select(&r), KeyRef::Text("Ada"));
    assert_eq!(SortKey::LastName.select(&r), KeyRef::Text("Lovelace"));
}

#[test]
fn test_id_key_compares_numerically() {
    let spec = SortSpec::ascending(SortKey::Id);
    assert!(spec.should_swap(&Record::new(10, "", ""), &Record::new(9, "", "")));
    assert!(!spec.should_swap(&Record::new(-5, "", ""), &Record::new(3, "", "")));
}

#[test]
fn test_spec_display() {
    assert_eq!(SortSpec::descending(SortKey::LastName).to_string(), "LastName descending");
    assert_eq!(SortSpec::default(), SortSpec::ascending(SortKey::Id));
}

// ---- scenarios ----

#[test]
fn test_scenario_ascending_by_id() {
    for algorithm in Algorithm::ALL {
        let sorted = run(algorithm, sample(), SortSpec::ascending(SortKey::Id));
        assert_eq!(
            sorted,
            vec![
                Record::new(1, "b", "y"),
                Record::new(2, "c", "z"),
                Record::new(3, "a", "x"),
            ],
            "{}",
            algorithm
        );
    }
}

#[test]
fn test_scenario_descending_by_id() {
    for algorithm in Algorithm::ALL {
        let sorted = run(algorithm, sample(), SortSpec::descending(SortKey::Id));
        assert_eq!(
            sorted,
            vec![
                Record::new(3, "a", "x"),
                Record::new(2, "c", "z"),
                Record::new(1, "b", "y"),
            ],
            "{}",
            algorithm
        );
    }
}

#[test]
fn test_sort_by_first_and_last_name() {
    for algorithm in Algorithm::ALL {
        let by_first = run(algorithm, sample(), SortSpec::descending(SortKey::FirstName));
        assert_eq!(ids(&by_first), vec![2, 1, 3], "{}", algorithm);
        let by_last = run(algorithm, sample(), SortSpec::ascending(SortKey::LastName));
        assert_eq!(ids(&by_last), vec![3, 1, 2], "{}", algorithm);
    }
}

#[test]
fn test_free_function_sort() {
    let sorted = sort(
        Algorithm::Merge,
        sample(),
        &SortSpec::ascending(SortKey::Id),
        &CancelObserver::never(),
    )
    .unwrap();
    assert_eq!(ids(&sorted), vec![1, 2, 3]);
}

// ---- tie-break ----

#[test]
fn test_equal_keys_keep_input_order() {
    let data = vec![
        Record::new(1, "same", "first"),
        Record::new(2, "same", "second"),
        Record::new(0, "aaa", "x"),
        Record::new(3, "same", "third"),
    ];
    for algorithm in Algorithm::ALL {
        for ascending in [true, false] {
            let sorted = run(
                algorithm,
                data.clone(),
                SortSpec::new(SortKey::FirstName, ascending),
            );
            let same: Vec<&str> = sorted
                .iter()
                .filter(|r| r.first_name == "same")
                .map(|r| r.last_name.as_str())
                .collect();
            assert_eq!(same, vec!["first", "second", "third"], "{} asc={}", algorithm, ascending);
        }
    }
}

#[test]
fn test_merge_takes_left_run_on_tie() {
    // Two runs of length one: [(5,"L")] and [(5,"R")].
    let data = vec![(5, 'L'), (5, 'R')];
    let sorted = merge_sort(data, |a, b| a.0 > b.0, &CancelObserver::never()).unwrap();
    assert_eq!(sorted, vec![(5, 'L'), (5, 'R')]);
}

// ---- trivial inputs ----

#[test]
fn test_empty_and_single_make_no_comparisons() {
    for algorithm in Algorithm::ALL {
        let calls = Cell::new(0usize);
        let count = |a: &i32, b: &i32| {
            calls.set(calls.get() + 1);
            a > b
        };

        let empty = algorithm
            .sort_by(Vec::new(), count, &CancelObserver::never())
            .unwrap();
        assert!(empty.is_empty());

        let single = algorithm
            .sort_by(vec![7], count, &CancelObserver::never())
            .unwrap();
        assert_eq!(single, vec![7]);

        assert_eq!(calls.get(), 0, "{}", algorithm);
    }
}

#[test]
fn test_already_sorted_unchanged() {
    let data: Vec<Record> = (0..50)
        .map(|i| Record::new(i, format!("f{:02}", i), "l"))
        .collect();
    for algorithm in Algorithm::ALL {
        let sorted = run(algorithm, data.clone(), SortSpec::ascending(SortKey::Id));
        assert_eq!(sorted, data, "{}", algorithm);
    }
}

// ---- cancellation ----

#[test]
fn test_cancel_before_first_check_point() {
    let token = CancellationToken::new();
    token.request();
    let data: Vec<Record> = (0..100).rev().map(|i| Record::new(i, "f", "l")).collect();
    for algorithm in Algorithm::ALL {
        let result = algorithm.sort(data.clone(), &SortSpec::default(), &token.observer());
        assert!(result.is_none(), "{}", algorithm);
    }
}

#[test]
fn test_cancel_mid_exchange_sort_stops_at_next_pass() {
    let token = CancellationToken::new();
    let observer = token.observer();
    let comparisons = Cell::new(0usize);
    let n = 200;
    let data: Vec<u32> = (0..n).rev().collect();

    let result = Algorithm::Exchange.sort_by(
        data,
        |a, b| {
            comparisons.set(comparisons.get() + 1);
            if comparisons.get() == 10 {
                token.request();
            }
            a > b
        },
        &observer,
    );

    assert!(result.is_none());
    // Cancellation raised inside the first pass is seen before the second.
    assert_eq!(comparisons.get(), (n - 1) as usize);
}

#[test]
fn test_cancel_mid_insertion_sort_stops_at_next_element() {
    let token = CancellationToken::new();
    let observer = token.observer();
    let comparisons = Cell::new(0usize);
    let data: Vec<u32> = (0..100).rev().collect();

    let result = Algorithm::Insertion.sort_by(
        data,
        |a, b| {
            comparisons.set(comparisons.get() + 1);
            // Element i = 4 makes 4 comparisons on reversed input; 1+2+3+4 = 10.
            if comparisons.get() == 10 {
                token.request();
            }
            a > b
        },
        &observer,
    );

    assert!(result.is_none());
    assert_eq!(comparisons.get(), 10);
}

#[test]
fn test_cancel_mid_merge_stops_at_next_comparison() {
    let token = CancellationToken::new();
    let observer = token.observer();
    let comparisons = Cell::new(0usize);
    let data: Vec<u32> = (0..1000).rev().collect();

    let result = Algorithm::Merge.sort_by(
        data,
        |a, b| {
            comparisons.set(comparisons.get() + 1);
            if comparisons.get() == 3 {
                token.request();
            }
            a > b
        },
        &observer,
    );

    assert!(result.is_none());
    assert_eq!(comparisons.get(), 3);
}

#[test]
fn test_token_request_is_idempotent_and_visible() {
    let token = CancellationToken::new();
    let observer = token.observer();
    let other = observer.clone();
    assert!(!token.is_requested());
    assert!(!observer.is_requested());
    token.request();
    token.request();
    assert!(token.is_requested());
    assert!(observer.is_requested());
    assert!(other.is_requested());
}

#[test]
fn test_fresh_token_not_affected_by_previous() {
    let first = CancellationToken::new();
    first.request();
    let second = CancellationToken::new();
    assert!(!second.observer().is_requested());
}

#[test]
fn test_cancel_visible_across_threads() {
    let token = CancellationToken::new();
    let observer = token.observer();
    let handle = std::thread::spawn(move || {
        while !observer.is_requested() {
            std::thread::yield_now();
        }
        true
    });
    token.request();
    assert!(handle.join().unwrap());
}

#[test]
fn test_algorithm_metadata() {
    assert!(Algorithm::Exchange.is_quadratic());
    assert!(Algorithm::Insertion.is_quadratic());
    assert!(!Algorithm::Merge.is_quadratic());
    assert_eq!(Algorithm::Merge.to_string(), "Merge Sort");
}

// ---- properties ----

fn record_strategy() -> impl Strategy<Value = Record> {
    (-50i64..50, "[a-c]{0,2}", "[x-z]{0,2}").prop_map(|(id, f, l)| Record::new(id, f, l))
}

fn algorithm_strategy() -> impl Strategy<Value = Algorithm> {
    prop_oneof![
        Just(Algorithm::Exchange),
        Just(Algorithm::Insertion),
        Just(Algorithm::Merge),
    ]
}

fn spec_strategy() -> impl Strategy<Value = SortSpec> {
    (0usize..3, any::<bool>())
        .prop_map(|(k, asc)| SortSpec::new(SortKey::from_index(k).unwrap(), asc))
}

proptest! {
    #[test]
    fn prop_output_is_ordered_permutation(
        data in prop::collection::vec(record_strategy(), 0..60),
        algorithm in algorithm_strategy(),
        spec in spec_strategy(),
    ) {
        let sorted = run(algorithm, data.clone(), spec);

        prop_assert!(is_ordered_by(&sorted, |a, b| spec.should_swap(a, b)));

        let mut expected = data;
        let mut actual = sorted.clone();
        expected.sort_by_key(|r| (r.id, r.first_name.clone(), r.last_name.clone()));
        actual.sort_by_key(|r| (r.id, r.first_name.clone(), r.last_name.clone()));
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn prop_matches_std_stable_sort(
        data in prop::collection::vec(record_strategy(), 0..60),
        algorithm in algorithm_strategy(),
        spec in spec_strategy(),
    ) {
        let sorted = run(algorithm, data.clone(), spec);
        let mut expected = data;
        expected.sort_by(|a, b| {
            let ord = spec.key.select(a).cmp(&spec.key.select(b));
            if spec.ascending { ord } else { ord.reverse() }
        });
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn prop_sorting_twice_is_idempotent(
        data in prop::collection::vec(record_strategy(), 0..40),
        algorithm in algorithm_strategy(),
        spec in spec_strategy(),
    ) {
        let once = run(algorithm, data, spec);
        let twice = run(algorithm, once.clone(), spec);
        prop_assert_eq!(once, twice);
    }
}
