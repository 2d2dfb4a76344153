//! API Handlers
//!
//! HTTP request handlers exposing the sample `Enemy` cache.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheManager, Enemy};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    EnemiesResponse, EnemyRequest, HasResponse, HealthResponse, InsertResponse, RemoveResponse,
    StatsResponse, UpdateResponse,
};

/// Application state shared across all handlers.
///
/// The manager synchronizes itself; handlers only share ownership.
#[derive(Clone)]
pub struct AppState {
    /// Durable enemy cache
    pub cache: Arc<CacheManager<Enemy>>,
}

impl AppState {
    /// Creates a new AppState around an opened manager.
    pub fn new(cache: CacheManager<Enemy>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the manager described by the configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(CacheManager::with_config(config)?))
    }

    /// Runs a manager call on the blocking pool; every call may wait on disk I/O.
    async fn run<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&CacheManager<Enemy>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || f(&cache))
            .await
            .map_err(|err| CacheError::Internal(format!("Cache task failed: {}", err)))?
    }
}

/// Handler for PUT /enemy
///
/// Inserts a record unless its address is already cached.
pub async fn insert_handler(
    State(state): State<AppState>,
    Json(req): Json<EnemyRequest>,
) -> Result<Json<InsertResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let address = req.address.clone();
    let enemy = req.into_enemy();
    let inserted = state.run(move |cache| cache.insert(enemy)).await?;

    Ok(Json(InsertResponse::new(address, inserted)))
}

/// Handler for POST /enemy
///
/// Replaces the record sharing the request's address, or inserts it.
pub async fn update_handler(
    State(state): State<AppState>,
    Json(req): Json<EnemyRequest>,
) -> Result<Json<UpdateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let enemy = req.into_enemy();
    let stored = enemy.clone();
    state.run(move |cache| cache.update(enemy)).await?;

    Ok(Json(UpdateResponse::new(stored)))
}

/// Handler for GET /enemy/:address
pub async fn get_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Enemy>> {
    let lookup = address.clone();
    state
        .run(move |cache| Ok(cache.get(&lookup)))
        .await?
        .map(Json)
        .ok_or(CacheError::NotFound(address))
}

/// Handler for GET /enemies
///
/// Returns the collection in its current order.
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<EnemiesResponse>> {
    let enemies = state.run(|cache| Ok(cache.snapshot())).await?;
    Ok(Json(EnemiesResponse::new(enemies)))
}

/// Handler for GET /has/:address
pub async fn has_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<HasResponse>> {
    let lookup = address.clone();
    let present = state.run(move |cache| Ok(cache.contains(&lookup))).await?;
    Ok(Json(HasResponse { address, present }))
}

/// Handler for DELETE /enemy/:address
///
/// Removing an absent address still rewrites the durable slot.
pub async fn remove_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let target = address.clone();
    let removed = state.run(move |cache| cache.remove(&target)).await?;
    Ok(Json(RemoveResponse::new(address, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let (key, stats) = state
        .run(|cache| Ok((cache.key().to_string(), cache.stats())))
        .await?;
    Ok(Json(StatsResponse { key, stats }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
