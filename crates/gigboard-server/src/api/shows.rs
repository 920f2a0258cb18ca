use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ApiError;
use crate::schedule;
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::AppState;

/// One row of the flat show listing, joined with both counterparts.
#[derive(Debug, Serialize)]
pub struct ShowListEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateShowRequest {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: chrono::NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct ShowResponse {
    pub id: i32,
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: String,
}

impl From<show::Model> for ShowResponse {
    fn from(s: show::Model) -> Self {
        Self {
            id: s.id,
            venue_id: s.venue_id,
            artist_id: s.artist_id,
            start_time: schedule::format_start_time(s.start_time),
        }
    }
}

/// GET /api/shows
///
/// Flat chronological listing in insertion order; no past/upcoming split.
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListEntry>>, ApiError> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::Id)
        .all(&state.db)
        .await?;

    let venue_ids: Vec<i32> = shows
        .iter()
        .map(|s| s.venue_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let artist_ids: Vec<i32> = shows
        .iter()
        .map(|s| s.artist_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let venues: HashMap<i32, venue::Model> = if venue_ids.is_empty() {
        HashMap::new()
    } else {
        venue::Entity::find()
            .filter(venue::Column::Id.is_in(venue_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect()
    };

    let artists: HashMap<i32, artist::Model> = if artist_ids.is_empty() {
        HashMap::new()
    } else {
        artist::Entity::find()
            .filter(artist::Column::Id.is_in(artist_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect()
    };

    let mut entries = Vec::with_capacity(shows.len());
    for s in shows {
        if let (Some(v), Some(a)) = (venues.get(&s.venue_id), artists.get(&s.artist_id)) {
            entries.push(ShowListEntry {
                venue_id: v.id,
                venue_name: v.name.clone(),
                artist_id: a.id,
                artist_name: a.name.clone(),
                artist_image_link: a.image_link.clone(),
                start_time: schedule::format_start_time(s.start_time),
            });
        }
    }

    Ok(Json(entries))
}

/// POST /api/shows
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateShowRequest>,
) -> Result<(StatusCode, Json<ShowResponse>), ApiError> {
    venue::Entity::find_by_id(body.venue_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::Referential("venue"))?;

    artist::Entity::find_by_id(body.artist_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::Referential("artist"))?;

    let txn = state.db.begin().await?;

    let new_show = show::ActiveModel {
        venue_id: Set(body.venue_id),
        artist_id: Set(body.artist_id),
        start_time: Set(body.start_time),
        ..Default::default()
    };

    let created = new_show.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(show_id = created.id, "show listed");
    Ok((StatusCode::CREATED, Json(ShowResponse::from(created))))
}
