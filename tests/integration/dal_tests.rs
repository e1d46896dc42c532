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

//! DAL tests for candidate queries and the conditional greeting-state writes.

use crate::fixtures::{seed_birthday, test_database};
use natalis::database::universal_types::UniversalUuid;
use natalis::DAL;

fn zones(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_find_due_candidates_filters_by_zone_and_date() {
    let dal = DAL::new(test_database().await);

    let in_zone = seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;
    seed_birthday(&dal, "Tomo", "Sato", 10, 29, "Asia/Tokyo", None).await;
    seed_birthday(&dal, "Jan", "Novak", 3, 29, "America/New_York", None).await;

    let candidates = dal
        .birthdays()
        .find_due_candidates(&zones(&["America/New_York"]), 10, 29, 2025)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].user_id, in_zone);
    assert_eq!(candidates[0].first_name, "Jane");
    assert_eq!(candidates[0].last_name, "Doe");
    assert_eq!(candidates[0].timezone, "America/New_York");
}

#[tokio::test]
async fn test_find_due_candidates_empty_zone_set_short_circuits() {
    let dal = DAL::new(test_database().await);
    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    let candidates = dal
        .birthdays()
        .find_due_candidates(&[], 10, 29, 2025)
        .await
        .unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_greeted_this_year_excluded_previous_year_included() {
    let dal = DAL::new(test_database().await);

    seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", Some(2025)).await;
    let due = seed_birthday(&dal, "John", "Roe", 10, 29, "America/New_York", Some(2024)).await;

    let candidates = dal
        .birthdays()
        .find_due_candidates(&zones(&["America/New_York"]), 10, 29, 2025)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].user_id, due);
    assert_eq!(candidates[0].sent_year, Some(2024));
}

#[tokio::test]
async fn test_mark_greeted_is_idempotent() {
    let dal = DAL::new(test_database().await);
    let user_id = seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    assert!(dal.birthdays().mark_greeted(user_id, 2025).await.unwrap());
    // Second call changes nothing.
    assert!(!dal.birthdays().mark_greeted(user_id, 2025).await.unwrap());

    let candidates = dal
        .birthdays()
        .find_due_candidates(&zones(&["America/New_York"]), 10, 29, 2026)
        .await
        .unwrap();
    assert_eq!(candidates[0].sent_year, Some(2025));
}

#[tokio::test]
async fn test_mark_greeted_is_monotonic() {
    let dal = DAL::new(test_database().await);
    let user_id = seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    assert!(dal.birthdays().mark_greeted(user_id, 2025).await.unwrap());
    // An older year never regresses the stored value.
    assert!(!dal.birthdays().mark_greeted(user_id, 2024).await.unwrap());
    // A newer year advances it.
    assert!(dal.birthdays().mark_greeted(user_id, 2026).await.unwrap());

    let candidates = dal
        .birthdays()
        .find_due_candidates(&zones(&["America/New_York"]), 10, 29, 2027)
        .await
        .unwrap();
    assert_eq!(candidates[0].sent_year, Some(2026));
}

#[tokio::test]
async fn test_mark_greeted_unknown_user_returns_false() {
    let dal = DAL::new(test_database().await);
    let ghost = UniversalUuid::new_v4();
    assert!(!dal.birthdays().mark_greeted(ghost, 2025).await.unwrap());
}

#[tokio::test]
async fn test_clear_greeted_only_reverts_matching_year() {
    let dal = DAL::new(test_database().await);
    let user_id = seed_birthday(&dal, "Jane", "Doe", 10, 29, "America/New_York", None).await;

    assert!(dal.birthdays().mark_greeted(user_id, 2025).await.unwrap());
    // A stale revert for a different year is a no-op.
    assert!(!dal.birthdays().clear_greeted(user_id, 2024).await.unwrap());
    // Reverting the year just written makes the record due again.
    assert!(dal.birthdays().clear_greeted(user_id, 2025).await.unwrap());

    let candidates = dal
        .birthdays()
        .find_due_candidates(&zones(&["America/New_York"]), 10, 29, 2025)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].sent_year, None);
}
