use std::future::Future;

use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::TestResult;
use crate::{compute_etag, DraftStorage};

pub(super) async fn run_roundtrip_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "roundtrip",
            "save_then_load_returns_answers",
            save_then_load_returns_answers(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "etag_matches_answers",
            etag_matches_answers(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "saved_at_is_rfc3339",
            saved_at_is_rfc3339(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "resave_replaces_answers",
            resave_replaces_answers(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "list_is_empty_initially",
            list_is_empty_initially(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "list_is_sorted_and_skips_deleted",
            list_is_sorted_and_skips_deleted(factory).await,
        ),
    ]
}

async fn save_then_load_returns_answers<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let answers = json!({
        "fullName": "Jane Doe",
        "executorsSection": [{"id": "e1", "fullDetails": "Sam Roe"}],
        "giftAmount": 2500
    });
    s.save_draft("jane", answers.clone(), None)
        .await
        .map_err(|e| e.to_string())?;
    let rec = s.load_draft("jane").await.map_err(|e| e.to_string())?;
    if rec.answers != answers {
        return Err(format!("answers changed: {}", rec.answers));
    }
    if rec.draft_id != "jane" {
        return Err(format!("expected draft id 'jane', got '{}'", rec.draft_id));
    }
    Ok(())
}

async fn etag_matches_answers<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let answers = json!({"b": 1, "a": 2});
    let saved = s
        .save_draft("d", answers.clone(), None)
        .await
        .map_err(|e| e.to_string())?;
    let loaded = s.load_draft("d").await.map_err(|e| e.to_string())?;
    let expected = compute_etag(&answers);
    if saved.etag != expected || loaded.etag != expected {
        return Err(format!(
            "etag mismatch: saved {}, loaded {}, expected {}",
            saved.etag, loaded.etag, expected
        ));
    }
    Ok(())
}

async fn saved_at_is_rfc3339<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let rec = s
        .save_draft("d", json!({}), None)
        .await
        .map_err(|e| e.to_string())?;
    OffsetDateTime::parse(&rec.saved_at, &Rfc3339)
        .map(|_| ())
        .map_err(|e| format!("saved_at '{}' is not RFC 3339: {}", rec.saved_at, e))
}

async fn resave_replaces_answers<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let first = s
        .save_draft("d", json!({"step": 1}), None)
        .await
        .map_err(|e| e.to_string())?;
    let second = s
        .save_draft("d", json!({"step": 2}), None)
        .await
        .map_err(|e| e.to_string())?;
    if first.etag == second.etag {
        return Err("etag did not change after resave".to_string());
    }
    let rec = s.load_draft("d").await.map_err(|e| e.to_string())?;
    if rec.answers != json!({"step": 2}) {
        return Err(format!("expected second answers, got {}", rec.answers));
    }
    Ok(())
}

async fn list_is_empty_initially<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let list = s.list_drafts().await.map_err(|e| e.to_string())?;
    if !list.is_empty() {
        return Err(format!("expected no drafts, got {}", list.len()));
    }
    Ok(())
}

async fn list_is_sorted_and_skips_deleted<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DraftStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for id in ["zeta", "alpha", "mid"] {
        s.save_draft(id, json!({"id": id}), None)
            .await
            .map_err(|e| e.to_string())?;
    }
    s.delete_draft("mid").await.map_err(|e| e.to_string())?;
    let ids: Vec<String> = s
        .list_drafts()
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|d| d.draft_id)
        .collect();
    if ids != ["alpha", "zeta"] {
        return Err(format!("expected [alpha, zeta], got {:?}", ids));
    }
    Ok(())
}
