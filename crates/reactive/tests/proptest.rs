//! Property-based tests for brook-reactive using proptest.

use brook_core::{Error, Result};
use brook_reactive::{observe, ObserverRegistry, QueryExt, QueryStreamExt};
use brook_testing::{employees_query, CountingQuery, Employee, EmployeesQuery, NullQuery, MAPPER};
use futures::stream;
use futures::{FutureExt, StreamExt};
use proptest::prelude::*;
use std::future::Future;
use std::sync::Arc;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

/// `n` employees named user0..userN.
fn employees(n: usize) -> CountingQuery<EmployeesQuery> {
    let values: Vec<String> = (0..n)
        .flat_map(|i| [format!("user{}", i), format!("User {}", i)])
        .collect();
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    CountingQuery::new(employees_query(&refs))
}

fn expected(n: usize) -> Vec<Employee> {
    (0..n)
        .map(|i| Employee::new(format!("user{}", i), format!("User {}", i)))
        .collect()
}

fn once<Q: Unpin>(query: Q) -> stream::Iter<std::vec::IntoIter<Result<Q>>> {
    stream::iter(vec![Ok(query)])
}

proptest! {
    /// map_to_one: nothing for 0 rows, the row for 1, a violation beyond.
    #[test]
    fn map_to_one_cardinality(n in 0usize..6) {
        let query = employees(n);
        let probe = query.probe();
        let items: Vec<_> = block_on(once(query).map_to_one(MAPPER).collect());

        match n {
            0 => prop_assert!(items.is_empty()),
            1 => prop_assert_eq!(items, vec![Ok(expected(1).remove(0))]),
            _ => prop_assert_eq!(items, vec![Err(Error::CardinalityViolation)]),
        }
        prop_assert_eq!(probe.closes(), 1);
        prop_assert!(probe.rows_fetched() <= 2);
    }

    /// map_to_one_or_default: the default replaces the empty case only.
    #[test]
    fn map_to_one_or_default_cardinality(n in 0usize..6) {
        let fallback = Employee::new("fred", "Fred Frederson");
        let query = employees(n);
        let probe = query.probe();
        let items: Vec<_> = block_on(
            once(query).map_to_one_or_default(fallback.clone(), MAPPER).collect(),
        );

        match n {
            0 => prop_assert_eq!(items, vec![Ok(fallback)]),
            1 => prop_assert_eq!(items, vec![Ok(expected(1).remove(0))]),
            _ => prop_assert_eq!(items, vec![Err(Error::CardinalityViolation)]),
        }
        prop_assert_eq!(probe.closes(), 1);
    }

    /// map_to_optional: exactly one emission for every non-absent result.
    #[test]
    fn map_to_optional_cardinality(n in 0usize..6) {
        let query = employees(n);
        let probe = query.probe();
        let items: Vec<_> = block_on(once(query).map_to_optional(MAPPER).collect());

        match n {
            0 => prop_assert_eq!(items, vec![Ok(None)]),
            1 => prop_assert_eq!(items, vec![Ok(Some(expected(1).remove(0)))]),
            _ => prop_assert_eq!(items, vec![Err(Error::CardinalityViolation)]),
        }
        prop_assert_eq!(probe.closes(), 1);
    }

    /// map_to_list: one list holding every row in order.
    #[test]
    fn map_to_list_preserves_rows(n in 0usize..64) {
        let query = employees(n);
        let probe = query.probe();
        let items: Vec<_> = block_on(once(query).map_to_list(MAPPER).collect());

        prop_assert_eq!(items, vec![Ok(expected(n))]);
        prop_assert_eq!(probe.closes(), 1);
        prop_assert_eq!(probe.rows_fetched(), n);
    }

    /// Absent results never emit, whatever the operator.
    #[test]
    fn absent_results_emit_nothing(repeats in 1usize..5) {
        let queries = || stream::iter((0..repeats).map(|_| Ok::<_, Error>(NullQuery)));
        block_on(async {
            prop_assert!(queries().map_to_one(MAPPER).collect::<Vec<_>>().await.is_empty());
            prop_assert!(queries().map_to_list(MAPPER).collect::<Vec<_>>().await.is_empty());
            prop_assert!(queries().map_to_optional(MAPPER).collect::<Vec<_>>().await.is_empty());
            Ok(())
        })?;
    }

    /// as_rows: a consumer taking k of n rows causes at most k + 1 fetches.
    #[test]
    fn as_rows_fetches_on_demand(n in 1usize..32, k in 0usize..32) {
        let k = k.min(n);
        let query = employees(n);
        let probe = query.probe();

        let items: Vec<_> = block_on(async {
            let items: Vec<_> = query.as_rows(MAPPER).take(k).collect().await;
            if k > 0 {
                probe.closed(1).await;
            }
            items
        });

        let rows: Vec<Employee> = items.into_iter().map(|item| item.unwrap()).collect();
        prop_assert_eq!(rows, expected(k));
        prop_assert!(probe.rows_fetched() <= k + 1);
        prop_assert!(probe.closes() <= 1);
    }

    /// Bridge: bursts between pulls collapse to one emission each.
    #[test]
    fn bridge_conflates_bursts(bursts in prop::collection::vec(0usize..20, 1..10)) {
        let registry = Arc::new(ObserverRegistry::new());
        let uri = brook_testing::InMemoryProvider::table();
        let mut stream = observe(registry.clone(), uri.clone(), false, NullQuery);

        let notifications: usize = bursts.iter().sum();
        let emitted = block_on(async {
            let mut emitted = 0usize;
            prop_assert!(stream.next().await.is_some());
            emitted += 1;

            for &burst in &bursts {
                for _ in 0..burst {
                    registry.notify_change(&uri);
                }
                let expected = usize::from(burst > 0);
                let mut seen = 0;
                while let Some(Some(item)) = stream.next().now_or_never() {
                    prop_assert!(item.is_ok());
                    seen += 1;
                }
                prop_assert_eq!(seen, expected);
                emitted += seen;
            }
            Ok(emitted)
        })?;

        prop_assert!(emitted <= notifications + 1);
        prop_assert_eq!(stream.emitted() as usize, emitted);
        drop(stream);
        prop_assert!(registry.is_empty());
    }
}
