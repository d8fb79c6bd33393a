use std::future::Future;

use serde_json::json;

use super::TestResult;
use crate::{DraftStorage, StorageError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "error",
            "load_missing_returns_not_found",
            load_missing_returns_not_found(factory).await,
        ),
        TestResult::from_result(
            "error",
            "delete_missing_returns_not_found",
            delete_missing_returns_not_found(factory).await,
        ),
        TestResult::from_result(
            "error",
            "invalid_ids_are_rejected",
            invalid_ids_are_rejected(factory).await,
        ),
    ]
}

async fn load_missing_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.load_draft("ghost").await {
        Err(StorageError::DraftNotFound { draft_id }) if draft_id == "ghost" => Ok(()),
        other => Err(format!("expected DraftNotFound(ghost), got {other:?}")),
    }
}

async fn delete_missing_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.delete_draft("ghost").await {
        Err(StorageError::DraftNotFound { .. }) => Ok(()),
        other => Err(format!("expected DraftNotFound, got {other:?}")),
    }
}

async fn invalid_ids_are_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for id in ["", "../escape", "with space", "dot.json"] {
        if !matches!(
            s.save_draft(id, json!({}), None).await,
            Err(StorageError::InvalidDraftId { .. })
        ) {
            return Err(format!("save accepted invalid id {id:?}"));
        }
        if !matches!(s.load_draft(id).await, Err(StorageError::InvalidDraftId { .. })) {
            return Err(format!("load accepted invalid id {id:?}"));
        }
        if !matches!(s.delete_draft(id).await, Err(StorageError::InvalidDraftId { .. })) {
            return Err(format!("delete accepted invalid id {id:?}"));
        }
    }
    Ok(())
}
