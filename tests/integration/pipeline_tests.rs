/*
 *  Copyright 2025 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! End-to-end pipeline tests: dispatch through the queue seam into the
//! greeter, exercising the at-most-once guarantee under redelivery.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::fixtures::{
    seed_birthday, test_database, FailingClient, FailingQueue, RecordingClient, RecordingQueue,
};
use natalis::error::DispatchError;
use natalis::queue::QueuedGreeting;
use natalis::{DispatchService, GreetingConfig, IdempotentGreeter, DAL};

/// 12:55 UTC on 2025-10-29 is 08:55 in America/New_York (EDT) — five minutes
/// before the default 09:00 target, inside the 20-minute window.
fn oct_29_window() -> DateTime<Utc> {
    "2025-10-29T12:55:00Z".parse().unwrap()
}

fn catalog() -> Vec<Tz> {
    vec![Tz::UTC, Tz::America__New_York, Tz::Asia__Tokyo]
}

fn dispatch_service(dal: DAL, queue: Arc<RecordingQueue>) -> DispatchService {
    DispatchService::with_catalog(dal, queue, &GreetingConfig::default(), catalog())
}

#[tokio::test]
async fn test_dispatch_count_matches_candidates() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;
    seed_birthday(&dal, "John", "Roe", 10, 29, "America/New_York", None).await;
    // Wrong date: not a candidate.
    seed_birthday(&dal, "Mia", "Poe", 1, 2, "America/New_York", None).await;

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal, queue.clone());

    let count = service.dispatch_due_at(oct_29_window()).await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(queue.entries().len(), 2);
}

#[tokio::test]
async fn test_dispatch_returns_zero_when_no_zone_matches() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    let queue = Arc::new(RecordingQueue::default());
    // Catalog without the matching zone: nothing is inside the window.
    let service = DispatchService::with_catalog(
        dal,
        queue.clone(),
        &GreetingConfig::default(),
        vec![Tz::Asia__Tokyo],
    );

    let count = service.dispatch_due_at(oct_29_window()).await.unwrap();
    assert_eq!(count, 0);
    assert!(queue.entries().is_empty());
}

#[tokio::test]
async fn test_dispatch_delays_target_send_time_and_stagger() {
    let dal = DAL::new(test_database().await);
    for name in ["Ada", "Ben", "Cal"] {
        seed_birthday(&dal, name, "Doe", 10, 29, "America/New_York", None).await;
    }

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal, queue.clone());

    service.dispatch_due_at(oct_29_window()).await.unwrap();

    // Base delay is 300s (08:55 -> 09:00 local); stagger adds floor(i/3 * 300).
    // Candidate order is unspecified, so compare the sorted delays.
    let mut delays: Vec<u32> = queue.entries().iter().map(|(_, d)| *d).collect();
    delays.sort_unstable();
    assert_eq!(delays, vec![300, 400, 500]);
}

#[tokio::test]
async fn test_dispatch_enqueue_failure_is_fatal() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    let service = DispatchService::with_catalog(
        dal.clone(),
        Arc::new(FailingQueue),
        &GreetingConfig::default(),
        catalog(),
    );

    let result = service.dispatch_due_at(oct_29_window()).await;
    assert!(matches!(result, Err(DispatchError::Queue(_))));

    // Dispatch wrote nothing: the candidate is still due for the next cycle.
    let candidates = dal
        .birthdays()
        .find_due_candidates(&["America/New_York".to_string()], 10, 29, 2025)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn test_full_pipeline_with_duplicate_delivery() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal.clone(), queue.clone());
    assert_eq!(service.dispatch_due_at(oct_29_window()).await.unwrap(), 1);

    let (body, _) = queue.entries().remove(0);
    let client = Arc::new(RecordingClient::default());
    let greeter = IdempotentGreeter::new(dal, client.clone());

    // First delivery greets.
    let outcome = greeter
        .process_batch(&[QueuedGreeting::new("msg-1", body.clone())])
        .await;
    assert_eq!(outcome.delivered, 1);
    assert!(outcome.failed_ids.is_empty());

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].message, "Hey, Jane Doe it's your birthday!");

    // Redelivery of the same task is a no-op.
    let outcome = greeter
        .process_batch(&[QueuedGreeting::new("msg-1", body)])
        .await;
    assert_eq!(outcome.skipped, 1);
    assert!(outcome.failed_ids.is_empty());
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_already_greeted_user_is_not_dispatched() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", Some(2025)).await;

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal, queue.clone());

    assert_eq!(service.dispatch_due_at(oct_29_window()).await.unwrap(), 0);
    assert!(queue.entries().is_empty());
}

#[tokio::test]
async fn test_greeted_last_year_is_dispatched_again() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", Some(2024)).await;

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal, queue.clone());

    assert_eq!(service.dispatch_due_at(oct_29_window()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_client_failure_reverts_mark_and_allows_retry() {
    let dal = DAL::new(test_database().await);
    let user_id = seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal.clone(), queue.clone());
    service.dispatch_due_at(oct_29_window()).await.unwrap();
    let (body, _) = queue.entries().remove(0);

    // Endpoint down: the task fails and the mark is reverted.
    let greeter = IdempotentGreeter::new(dal.clone(), Arc::new(FailingClient));
    let outcome = greeter
        .process_batch(&[QueuedGreeting::new("msg-1", body.clone())])
        .await;
    assert_eq!(outcome.failed_ids, vec!["msg-1".to_string()]);

    let candidates = dal
        .birthdays()
        .find_due_candidates(&["America/New_York".to_string()], 10, 29, 2025)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].user_id, user_id);
    assert_eq!(candidates[0].sent_year, None);

    // Redelivery after recovery greets exactly once.
    let client = Arc::new(RecordingClient::default());
    let greeter = IdempotentGreeter::new(dal, client.clone());
    let outcome = greeter
        .process_batch(&[QueuedGreeting::new("msg-1", body)])
        .await;
    assert_eq!(outcome.delivered, 1);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_invalid_payloads_fail_without_blocking_siblings() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    let queue = Arc::new(RecordingQueue::default());
    let service = dispatch_service(dal.clone(), queue.clone());
    service.dispatch_due_at(oct_29_window()).await.unwrap();
    let (good_body, _) = queue.entries().remove(0);

    let client = Arc::new(RecordingClient::default());
    let greeter = IdempotentGreeter::new(dal, client.clone());

    let records = [
        QueuedGreeting::new("msg-garbage", "not json at all"),
        QueuedGreeting::new(
            "msg-empty-name",
            r#"{"userId":"7c96fdfe-41ee-4a07-bf43-0ca175358b95","firstName":"","lastName":"Doe","year":2025}"#,
        ),
        QueuedGreeting::new("msg-good", good_body),
    ];

    let outcome = greeter.process_batch(&records).await;
    assert_eq!(outcome.delivered, 1);
    assert_eq!(
        outcome.failed_ids,
        vec!["msg-garbage".to_string(), "msg-empty-name".to_string()]
    );
    // Only the valid task reached the endpoint.
    assert_eq!(client.calls().len(), 1);
}
