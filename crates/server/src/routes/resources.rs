//! Handlers shared by every collection, instantiated once per resource type.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::types::Message;
use serde_json::Value;
use service::{engine::validate::INVALID_IDS, Collection, Resource};
use tracing::warn;

use crate::errors::JsonApiError;

type Body = Result<Json<Value>, JsonRejection>;

/// Routes for one collection:
/// `GET|POST /{c}`, `POST /{c}/eliminar`, `GET|PUT|DELETE /{c}/:id`.
///
/// `creatable = false` leaves `POST /{c}` unrouted.
pub fn resource_routes<R: Resource>(collection: Arc<Collection<R>>, creatable: bool) -> Router {
    let base = format!("/{}", R::COLLECTION);
    let listing = if creatable { get(list::<R>).post(create::<R>) } else { get(list::<R>) };

    Router::new()
        .route(&base, listing)
        .route(&format!("{base}/eliminar"), post(bulk_delete::<R>))
        .route(&format!("{base}/:id"), get(fetch::<R>).put(update::<R>).delete(remove::<R>))
        .with_state(collection)
}

fn payload<R: Resource>(body: Body, message: &str) -> Result<Value, JsonApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        warn!(collection = R::COLLECTION, error = %rejection, "unreadable request body");
        JsonApiError::bad_request(message)
    })
}

pub async fn list<R: Resource>(State(collection): State<Arc<Collection<R>>>) -> Json<Vec<Value>> {
    Json(collection.list().await)
}

pub async fn fetch<R: Resource>(
    State(collection): State<Arc<Collection<R>>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    Ok(Json(collection.get(&id).await?))
}

pub async fn create<R: Resource>(
    State(collection): State<Arc<Collection<R>>>,
    body: Body,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let input = payload::<R>(body, R::MISSING_DATA)?;
    let created = collection.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<R: Resource>(
    State(collection): State<Arc<Collection<R>>>,
    Path(id): Path<String>,
    body: Body,
) -> Result<Json<Value>, JsonApiError> {
    let input = payload::<R>(body, R::MISSING_DATA)?;
    Ok(Json(collection.update(&id, input).await?))
}

pub async fn bulk_delete<R: Resource>(
    State(collection): State<Arc<Collection<R>>>,
    body: Body,
) -> Result<Json<Message>, JsonApiError> {
    let input = payload::<R>(body, INVALID_IDS)?;
    collection.bulk_delete(&input).await?;
    Ok(Json(Message { message: R::DELETED.to_string() }))
}

pub async fn remove<R: Resource>(
    State(collection): State<Arc<Collection<R>>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    collection.delete(&id).await?;
    Ok(Json(serde_json::json!({})))
}
