use axum::{
    extract::{Query, State},
    Json,
};
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::{EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::artists::ArtistSummary;
use super::venues::VenueSummary;
use crate::error::ApiError;
use gigboard_db::entities::{artist, venue};
use gigboard_db::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub term: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<T: Serialize> {
    pub count: usize,
    pub data: Vec<T>,
}

/// Escape SQL LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('%', "\\%").replace('_', "\\_")
}

/// Case-insensitive substring pattern over the name column. An empty term
/// yields `%%`, which matches every record.
fn name_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// GET /api/venues/search?term=...
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse<VenueSummary>>, ApiError> {
    let pattern = name_pattern(params.term.as_deref().unwrap_or(""));

    let venues = venue::Entity::find()
        .filter(Expr::col(venue::Column::Name).ilike(pattern.as_str()))
        .order_by_asc(venue::Column::Id)
        .all(&state.db)
        .await?;

    let data: Vec<VenueSummary> = venues
        .into_iter()
        .map(|v| VenueSummary {
            id: v.id,
            name: v.name,
        })
        .collect();

    Ok(Json(SearchResponse {
        count: data.len(),
        data,
    }))
}

/// GET /api/artists/search?term=...
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse<ArtistSummary>>, ApiError> {
    let pattern = name_pattern(params.term.as_deref().unwrap_or(""));

    let artists = artist::Entity::find()
        .filter(Expr::col(artist::Column::Name).ilike(pattern.as_str()))
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?;

    let data: Vec<ArtistSummary> = artists
        .into_iter()
        .map(|a| ArtistSummary {
            id: a.id,
            name: a.name,
        })
        .collect();

    Ok(Json(SearchResponse {
        count: data.len(),
        data,
    }))
}
