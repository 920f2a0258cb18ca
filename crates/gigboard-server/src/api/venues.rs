use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
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

#[derive(Debug, Serialize)]
pub struct VenueResponse {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub genres: Vec<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl From<venue::Model> for VenueResponse {
    fn from(v: venue::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            genres: v.genres,
            phone: v.phone,
            image_link: v.image_link,
            facebook_link: v.facebook_link,
            website: v.website,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

/// Minimal `{id, name}` projection used in group and search listings.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LocationGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

/// A show on a venue page, joined with its artist counterpart.
#[derive(Debug, Serialize)]
pub struct ArtistShowEntry {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct VenueDetailResponse {
    #[serde(flatten)]
    pub venue: VenueResponse,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Full-field venue payload, used by both create and update. Update is
/// replace-all: omitted optional fields are written as absent, not kept.
#[derive(Debug, Deserialize)]
pub struct VenuePayload {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenuePayload {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("state", &self.state),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteVenueResponse {
    pub success: bool,
}

/// Group venues by their exact (city, state) pair, in first-appearance
/// order. Pairs differing only in case or whitespace form distinct groups.
fn group_by_location(venues: Vec<venue::Model>) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    for v in venues {
        let summary = VenueSummary {
            id: v.id,
            name: v.name,
        };
        match groups
            .iter_mut()
            .find(|g| g.city == v.city && g.state == v.state)
        {
            Some(group) => group.venues.push(summary),
            None => groups.push(LocationGroup {
                city: v.city,
                state: v.state,
                venues: vec![summary],
            }),
        }
    }
    groups
}

/// GET /api/venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LocationGroup>>, ApiError> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(group_by_location(venues)))
}

/// GET /api/venues/:id
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueDetailResponse>, ApiError> {
    let venue_model = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("venue"))?;

    let shows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .order_by_asc(show::Column::Id)
        .all(&state.db)
        .await?;

    // Batch-fetch the artist counterparts and join in memory
    let artist_ids: Vec<i32> = shows
        .iter()
        .map(|s| s.artist_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

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

    let mut entries: Vec<(chrono::NaiveDateTime, ArtistShowEntry)> = Vec::new();
    for s in shows {
        if let Some(a) = artists.get(&s.artist_id) {
            entries.push((
                s.start_time,
                ArtistShowEntry {
                    artist_id: a.id,
                    artist_name: a.name.clone(),
                    artist_image_link: a.image_link.clone(),
                    start_time: schedule::format_start_time(s.start_time),
                },
            ));
        }
    }

    let now = chrono::Utc::now().naive_utc();
    let (past, upcoming) = schedule::partition_by_start(entries, now, |(start, _)| *start);
    let past_shows: Vec<ArtistShowEntry> = past.into_iter().map(|(_, e)| e).collect();
    let upcoming_shows: Vec<ArtistShowEntry> = upcoming.into_iter().map(|(_, e)| e).collect();

    Ok(Json(VenueDetailResponse {
        venue: VenueResponse::from(venue_model),
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }))
}

/// POST /api/venues
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VenuePayload>,
) -> Result<(StatusCode, Json<VenueResponse>), ApiError> {
    payload.validate()?;

    let txn = state.db.begin().await?;

    let new_venue = venue::ActiveModel {
        name: Set(payload.name),
        city: Set(payload.city),
        state: Set(payload.state),
        address: Set(payload.address),
        genres: Set(payload.genres),
        phone: Set(payload.phone),
        image_link: Set(payload.image_link),
        facebook_link: Set(payload.facebook_link),
        website: Set(payload.website),
        seeking_talent: Set(payload.seeking_talent),
        seeking_description: Set(payload.seeking_description),
        ..Default::default()
    };

    let created = new_venue.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = created.id, "venue listed");
    Ok((StatusCode::CREATED, Json(VenueResponse::from(created))))
}

/// PUT /api/venues/:id
///
/// Replace-all semantics: every column is overwritten from the payload.
pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<VenuePayload>,
) -> Result<Json<VenueResponse>, ApiError> {
    payload.validate()?;

    let existing = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("venue"))?;

    let txn = state.db.begin().await?;

    let mut active: venue::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    active.address = Set(payload.address);
    active.genres = Set(payload.genres);
    active.phone = Set(payload.phone);
    active.image_link = Set(payload.image_link);
    active.facebook_link = Set(payload.facebook_link);
    active.website = Set(payload.website);
    active.seeking_talent = Set(payload.seeking_talent);
    active.seeking_description = Set(payload.seeking_description);

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(VenueResponse::from(updated)))
}

/// DELETE /api/venues/:id
///
/// Associated shows are removed by the store's ON DELETE CASCADE.
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteVenueResponse>, ApiError> {
    venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("venue"))?;

    let txn = state.db.begin().await?;
    venue::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = id, "venue deleted");
    Ok(Json(DeleteVenueResponse { success: true }))
}
