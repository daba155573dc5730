//! Integration tests for per-row streaming.

use brook_core::{Error, Result, RowCursor};
use brook_reactive::{as_rows, QueryExt, WorkerContext};
use brook_testing::{employees_query, CountingQuery, Employee, NullQuery, MAPPER};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn three_employees() -> CountingQuery<brook_testing::EmployeesQuery> {
    CountingQuery::new(employees_query(&[
        "alice",
        "Alice Allison",
        "bob",
        "Bob Bobberson",
        "eve",
        "Eve Evenson",
    ]))
}

#[tokio::test]
async fn test_as_rows_empty() {
    let query = CountingQuery::new(employees_query(&[]));
    let probe = query.probe();
    let items: Vec<_> = query.as_rows(MAPPER).collect().await;
    assert!(items.is_empty());
    probe.closed(1).await;
}

#[tokio::test]
async fn test_as_rows() {
    let items: Vec<_> = employees_query(&["alice", "Alice Allison", "bob", "Bob Bobberson"])
        .as_rows(MAPPER)
        .collect()
        .await;
    assert_eq!(
        items,
        vec![
            Ok(Employee::new("alice", "Alice Allison")),
            Ok(Employee::new("bob", "Bob Bobberson")),
        ]
    );
}

#[tokio::test]
async fn test_as_rows_stops_when_cancelled() {
    let query = three_employees();
    let probe = query.probe();
    let mapped = Arc::new(AtomicUsize::new(0));
    let mapped_clone = mapped.clone();

    let items: Vec<_> = as_rows(query, move |row: &dyn RowCursor| {
        mapped_clone.fetch_add(1, Ordering::SeqCst);
        MAPPER(row)
    })
    .take(1)
    .collect()
    .await;

    assert_eq!(items, vec![Ok(Employee::new("alice", "Alice Allison"))]);
    probe.closed(1).await;
    assert!(probe.rows_fetched() <= 2);
    assert!(mapped.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_as_rows_empty_when_absent() {
    let mapped = Arc::new(AtomicUsize::new(0));
    let mapped_clone = mapped.clone();
    let items: Vec<_> = NullQuery
        .as_rows(move |row: &dyn RowCursor| {
            mapped_clone.fetch_add(1, Ordering::SeqCst);
            MAPPER(row)
        })
        .collect()
        .await;
    assert!(items.is_empty());
    assert_eq!(mapped.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_as_rows_mapper_failure_is_last() {
    let query = three_employees();
    let probe = query.probe();
    let items: Vec<Result<Employee>> = query
        .as_rows(|row: &dyn RowCursor| {
            let employee = MAPPER(row)?;
            if employee.username == "bob" {
                return Err(Error::mapper("bob is on leave"));
            }
            Ok(employee)
        })
        .collect()
        .await;

    assert_eq!(
        items,
        vec![
            Ok(Employee::new("alice", "Alice Allison")),
            Err(Error::mapper("bob is on leave")),
        ]
    );
    probe.closed(1).await;
    assert_eq!(probe.rows_fetched(), 2);
}

#[tokio::test]
async fn test_dropping_stream_closes_cursor() {
    let query = three_employees();
    let probe = query.probe();
    let mut rows = query.as_rows(MAPPER);

    assert!(rows.next().await.is_some());
    assert!(rows.next().await.is_some());
    drop(rows);

    probe.closed(1).await;
    assert!(probe.rows_fetched() <= 3);
    assert_eq!(probe.closes(), 1);
}

#[test]
fn test_as_rows_on_explicit_worker() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap();
    let worker = WorkerContext::new(runtime.handle().clone());

    let items: Vec<_> = futures::executor::block_on(
        employees_query(&["alice", "Alice Allison"])
            .as_rows(MAPPER)
            .on(worker)
            .collect(),
    );
    assert_eq!(items, vec![Ok(Employee::new("alice", "Alice Allison"))]);
}
