use std::future::Future;
use std::sync::Arc;

use serde_json::json;

use super::TestResult;
use crate::{DraftStorage, StorageError};

/// Number of concurrent savers in the race test.
const N: usize = 10;

pub(super) async fn run_occ_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "occ",
            "matching_etag_succeeds",
            matching_etag_succeeds(factory).await,
        ),
        TestResult::from_result(
            "occ",
            "stale_etag_is_rejected",
            stale_etag_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "occ",
            "stale_save_does_not_write",
            stale_save_does_not_write(factory).await,
        ),
        TestResult::from_result(
            "occ",
            "expected_etag_on_missing_draft",
            expected_etag_on_missing_draft(factory).await,
        ),
        TestResult::from_result(
            "occ",
            "concurrent_saves_exactly_one_wins",
            concurrent_saves_exactly_one_wins(factory).await,
        ),
    ]
}

async fn matching_etag_succeeds<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let first = s
        .save_draft("d", json!({"v": 1}), None)
        .await
        .map_err(|e| e.to_string())?;
    s.save_draft("d", json!({"v": 2}), Some(&first.etag))
        .await
        .map_err(|e| format!("save with current etag failed: {e}"))?;
    Ok(())
}

async fn stale_etag_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let first = s
        .save_draft("d", json!({"v": 1}), None)
        .await
        .map_err(|e| e.to_string())?;
    let second = s
        .save_draft("d", json!({"v": 2}), None)
        .await
        .map_err(|e| e.to_string())?;
    match s.save_draft("d", json!({"v": 3}), Some(&first.etag)).await {
        Err(StorageError::StaleDraft {
            draft_id,
            expected,
            actual,
        }) => {
            if draft_id != "d" || expected != first.etag || actual.as_deref() != Some(second.etag.as_str()) {
                return Err(format!(
                    "wrong StaleDraft fields: {draft_id} {expected} {actual:?}"
                ));
            }
            Ok(())
        }
        Err(e) => Err(format!("expected StaleDraft, got {e}")),
        Ok(_) => Err("stale save succeeded".to_string()),
    }
}

async fn stale_save_does_not_write<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.save_draft("d", json!({"v": 1}), None)
        .await
        .map_err(|e| e.to_string())?;
    let _ = s.save_draft("d", json!({"v": 9}), Some("not-an-etag")).await;
    let rec = s.load_draft("d").await.map_err(|e| e.to_string())?;
    if rec.answers != json!({"v": 1}) {
        return Err(format!("stale save overwrote answers: {}", rec.answers));
    }
    Ok(())
}

async fn expected_etag_on_missing_draft<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.save_draft("new", json!({}), Some("abc")).await {
        Err(StorageError::StaleDraft { actual: None, .. }) => {}
        Err(e) => return Err(format!("expected StaleDraft without actual, got {e}")),
        Ok(_) => return Err("save against a missing draft succeeded".to_string()),
    }
    match s.load_draft("new").await {
        Err(StorageError::DraftNotFound { .. }) => Ok(()),
        other => Err(format!("expected no draft to be written, got {other:?}")),
    }
}

/// N tasks race to save over the same etag. Exactly one must win.
async fn concurrent_saves_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    let base = storage
        .save_draft("shared", json!({"writer": null}), None)
        .await
        .map_err(|e| format!("initial save: {e}"))?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let etag = base.etag.clone();
        handles.push(tokio::spawn(async move {
            s.save_draft("shared", json!({"writer": i}), Some(&etag))
                .await
        }));
    }

    let mut wins = 0;
    let mut stale = 0;
    for h in handles {
        match h.await.map_err(|e| format!("task panicked: {e}"))? {
            Ok(_) => wins += 1,
            Err(StorageError::StaleDraft { .. }) => stale += 1,
            Err(e) => return Err(format!("unexpected error: {e}")),
        }
    }
    if wins != 1 || stale != N - 1 {
        return Err(format!("expected 1 win and {} stale, got {wins} and {stale}", N - 1));
    }
    Ok(())
}
