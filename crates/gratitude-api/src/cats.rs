//! Demo in-memory cat resource, unrelated to the gratitude statistics.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/` | Pointer to `/cats` |
//! | `GET`    | `/cats` | `{"cats": {<uuid>: Cat}}` |
//! | `POST`   | `/cats` | Body: [`Cat`]; returns `{"uuid": ...}` |
//! | `GET`    | `/cats/{id}` | 404 if unknown |
//! | `PUT`    | `/cats/{id}` | Replaces the cat; 404 if unknown |
//! | `DELETE` | `/cats/{id}` | Returns `{"uuid": ...}`; 404 if unknown |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json, Router,
  extract::{Path, State, rejection::JsonRejection},
  routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;

const BAD_BODY: &str = "problem with posted data";
const NO_SUCH_CAT: &str = "no such cat";

// ─── Model ───────────────────────────────────────────────────────────────────

/// A cat. Every field is optional; whatever the client posts is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub genus:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_hungry:     Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_fed_date: Option<DateTime<Utc>>,
}

impl Cat {
  fn hungry_feline(name: &str) -> Self {
    Self {
      genus:         Some("feline".to_owned()),
      name:          Some(name.to_owned()),
      is_hungry:     Some(true),
      last_fed_date: Some(Utc::now()),
    }
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Process-lifetime cat storage.
#[derive(Debug, Default)]
pub struct CatRegistry {
  cats: RwLock<BTreeMap<Uuid, Cat>>,
}

impl CatRegistry {
  /// A registry holding Cosmo and Emmy.
  pub fn seeded() -> Self {
    let cats = ["Cosmo", "Emmy"]
      .into_iter()
      .map(|name| (Uuid::new_v4(), Cat::hungry_feline(name)))
      .collect();
    Self {
      cats: RwLock::new(cats),
    }
  }

  pub async fn list(&self) -> BTreeMap<Uuid, Cat> { self.cats.read().await.clone() }

  pub async fn get(&self, id: Uuid) -> Option<Cat> {
    self.cats.read().await.get(&id).cloned()
  }

  pub async fn insert(&self, cat: Cat) -> Uuid {
    let id = Uuid::new_v4();
    self.cats.write().await.insert(id, cat);
    id
  }

  /// Replace an existing cat. Returns `false` if `id` is unknown.
  pub async fn replace(&self, id: Uuid, cat: Cat) -> bool {
    match self.cats.write().await.get_mut(&id) {
      Some(slot) => {
        *slot = cat;
        true
      }
      None => false,
    }
  }

  pub async fn remove(&self, id: Uuid) -> Option<Cat> {
    self.cats.write().await.remove(&id)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

pub fn cats_router(registry: Arc<CatRegistry>) -> Router<()> {
  Router::new()
    .route("/", get(index))
    .route("/cats", get(list).post(create))
    .route("/cats/{id}", get(get_one).put(update).delete(remove))
    .with_state(registry)
}

fn cat_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(NO_SUCH_CAT.to_owned()))
}

fn cat_body(body: Result<Json<Cat>, JsonRejection>) -> Result<Cat, ApiError> {
  match body {
    Ok(Json(cat)) => Ok(cat),
    Err(rejection) => {
      tracing::debug!(%rejection, "rejected cat body");
      Err(ApiError::BadRequest(BAD_BODY.to_owned()))
    }
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn index() -> Json<Value> {
  Json(json!({ "message": "Nothing to see here, [url]/cats instead." }))
}

/// `GET /cats`
pub async fn list(State(registry): State<Arc<CatRegistry>>) -> Json<Value> {
  Json(json!({ "cats": registry.list().await }))
}

/// `POST /cats`
pub async fn create(
  State(registry): State<Arc<CatRegistry>>,
  body: Result<Json<Cat>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let cat = cat_body(body)?;
  let id = registry.insert(cat).await;
  Ok(Json(json!({ "uuid": id })))
}

/// `GET /cats/{id}`
pub async fn get_one(
  State(registry): State<Arc<CatRegistry>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let cat = registry
    .get(cat_id(&id)?)
    .await
    .ok_or_else(|| ApiError::NotFound(NO_SUCH_CAT.to_owned()))?;
  Ok(Json(json!({ "cat": cat })))
}

/// `PUT /cats/{id}`
pub async fn update(
  State(registry): State<Arc<CatRegistry>>,
  Path(id): Path<String>,
  body: Result<Json<Cat>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let id = cat_id(&id)?;
  if registry.get(id).await.is_none() {
    return Err(ApiError::NotFound(NO_SUCH_CAT.to_owned()));
  }
  let cat = cat_body(body)?;
  if !registry.replace(id, cat.clone()).await {
    return Err(ApiError::NotFound(NO_SUCH_CAT.to_owned()));
  }
  Ok(Json(json!({ "cat": cat })))
}

/// `DELETE /cats/{id}`
pub async fn remove(
  State(registry): State<Arc<CatRegistry>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let id = cat_id(&id)?;
  registry
    .remove(id)
    .await
    .ok_or_else(|| ApiError::NotFound(NO_SUCH_CAT.to_owned()))?;
  Ok(Json(json!({ "uuid": id })))
}
