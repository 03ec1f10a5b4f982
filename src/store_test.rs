use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use designer::camera::{Point, Rect};
use designer::doc::{Pose, Section, SectionKind, Shape};
use designer::layout;

use super::*;

fn venue() -> (Layout, Uuid, Uuid) {
    let mut layout = Layout::new(800.0, 600.0);
    let mut floor =
        Section::new("Floor", SectionKind::Standard, Pose::from_rect(Rect::new(0.0, 0.0, 400.0, 300.0)), Shape::Rectangle);
    let seats = layout::generate_linear_row(Point::new(0.0, 50.0), Point::new(350.0, 50.0), 15.0, 20.0);
    let row = layout::build_row(&floor, seats, None, &[]);
    floor.rows.push(row);
    let stage = Section::new("Stage", SectionKind::Stage, Pose::from_rect(Rect::new(500.0, 0.0, 200.0, 100.0)), Shape::Rectangle);
    let (floor_id, stage_id) = (floor.id, stage.id);
    layout.sections.push(floor);
    layout.sections.push(stage);
    (layout, floor_id, stage_id)
}

// =============================================================================
// MemoryStore
// =============================================================================

#[tokio::test]
async fn memory_fetch_unknown_is_not_found() {
    let store = MemoryStore::default();
    let id = Uuid::new_v4();
    assert!(matches!(store.fetch_layout(id).await, Err(StoreError::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn memory_apply_updates_stored_copy() {
    let (layout, floor, _) = venue();
    let id = Uuid::new_v4();
    let store = MemoryStore::with_layout(id, layout);

    let reply = store.apply(id, &Mutation::MoveSection { id: floor, dx: 5.0, dy: 0.0 }).await.unwrap();
    assert!(reply.is_none());
    let stored = store.snapshot(id).await.unwrap();
    assert!((stored.section(&floor).unwrap().pose.x - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn memory_structural_apply_returns_layout() {
    let (layout, floor, _) = venue();
    let id = Uuid::new_v4();
    let store = MemoryStore::with_layout(id, layout);
    let reply = store.apply(id, &Mutation::RecalculateRows { section_id: floor, tolerance: 15.0 }).await.unwrap();
    assert_eq!(reply, store.snapshot(id).await);
}

#[tokio::test]
async fn memory_rejects_rows_in_stage() {
    let (layout, _, stage) = venue();
    let id = Uuid::new_v4();
    let store = MemoryStore::with_layout(id, layout.clone());
    let row = designer::doc::Row::new("A", 0.0);
    let err = store.apply(id, &Mutation::CreateRow { section_id: stage, row }).await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected(DesignerError::StructuralConflict(SectionKind::Stage))));
    assert_eq!(store.snapshot(id).await, Some(layout));
}

#[tokio::test]
async fn memory_unavailable_fails_requests() {
    let (layout, floor, _) = venue();
    let id = Uuid::new_v4();
    let store = MemoryStore::with_layout(id, layout);
    store.set_unavailable(true);
    assert!(matches!(store.fetch_layout(id).await, Err(StoreError::Request(_))));
    assert!(matches!(
        store.apply(id, &Mutation::DeleteSection { id: floor }).await,
        Err(StoreError::Request(_))
    ));
    store.set_unavailable(false);
    assert!(store.fetch_layout(id).await.is_ok());
}

// =============================================================================
// Response parsing
// =============================================================================

#[test]
fn patch_ack_without_layout() {
    assert!(parse_patch_response("").unwrap().is_none());
    assert!(parse_patch_response("{}").unwrap().is_none());
    assert!(parse_patch_response(r#"{"ok":true}"#).unwrap().is_none());
}

#[test]
fn patch_with_layout() {
    let (layout, ..) = venue();
    let body = serde_json::json!({ "layout": layout }).to_string();
    assert_eq!(parse_patch_response(&body).unwrap(), Some(layout));
}

#[test]
fn patch_garbage_is_decode_error() {
    assert!(matches!(parse_patch_response("<html>"), Err(StoreError::Decode(_))));
}

#[test]
fn invalid_layout_is_rejected() {
    let body = serde_json::json!({ "canvas_width": 0.0, "canvas_height": 10.0, "sections": [] }).to_string();
    assert!(matches!(parse_layout(&body), Err(StoreError::Rejected(DesignerError::Import(_)))));
}

#[test]
fn layout_url_trims_trailing_slash() {
    let store = HttpStore::new("http://store.test/api/", 5).unwrap();
    let id = Uuid::nil();
    assert_eq!(store.layout_url(id), format!("http://store.test/api/layouts/{id}"));
}

// =============================================================================
// HttpStore against a local fake
// =============================================================================

async fn fake_get(State(store): State<Arc<MemoryStore>>, Path(id): Path<Uuid>) -> Result<Json<Layout>, StatusCode> {
    store.fetch_layout(id).await.map(Json).map_err(|_| StatusCode::NOT_FOUND)
}

async fn fake_patch(
    State(store): State<Arc<MemoryStore>>,
    Path(id): Path<Uuid>,
    Json(mutation): Json<Mutation>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match store.apply(id, &mutation).await {
        Ok(Some(layout)) => Ok(Json(serde_json::json!({ "layout": layout }))),
        Ok(None) => Ok(Json(serde_json::json!({}))),
        Err(StoreError::NotFound(_)) => Err((StatusCode::NOT_FOUND, String::new())),
        Err(e) => Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string())),
    }
}

async fn spawn_fake(store: Arc<MemoryStore>) -> String {
    let app = Router::new().route("/layouts/{id}", get(fake_get).patch(fake_patch)).with_state(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_round_trip() {
    let (layout, floor, stage) = venue();
    let id = Uuid::new_v4();
    let backing = Arc::new(MemoryStore::with_layout(id, layout.clone()));
    let store = HttpStore::new(&spawn_fake(backing.clone()).await, 5).unwrap();

    assert_eq!(store.fetch_layout(id).await.unwrap(), layout);

    let moved = store.apply(id, &Mutation::MoveSection { id: floor, dx: 0.0, dy: 12.0 }).await.unwrap();
    assert!(moved.is_none());

    let recalculated = store.apply(id, &Mutation::RecalculateRows { section_id: floor, tolerance: 15.0 }).await.unwrap();
    let recalculated = recalculated.unwrap();
    assert!((recalculated.section(&floor).unwrap().pose.y - 12.0).abs() < f64::EPSILON);
    assert_eq!(Some(recalculated), backing.snapshot(id).await);

    let row = designer::doc::Row::new("A", 0.0);
    let err = store.apply(id, &Mutation::CreateRow { section_id: stage, row }).await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 422, .. }), "{err}");

    let missing = Uuid::new_v4();
    assert!(matches!(store.fetch_layout(missing).await, Err(StoreError::NotFound(m)) if m == missing));
}
