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
pub struct ArtistResponse {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub genres: Vec<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl From<artist::Model> for ArtistResponse {
    fn from(a: artist::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            city: a.city,
            state: a.state,
            genres: a.genres,
            phone: a.phone,
            image_link: a.image_link,
            facebook_link: a.facebook_link,
            website: a.website,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

/// Minimal `{id, name}` projection used in the flat listing and search.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
}

/// A show on an artist page, joined with its venue counterpart.
#[derive(Debug, Serialize)]
pub struct VenueShowEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistDetailResponse {
    #[serde(flatten)]
    pub artist: ArtistResponse,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Full-field artist payload, used by both create and update. Update is
/// replace-all: omitted optional fields are written as absent, not kept.
#[derive(Debug, Deserialize)]
pub struct ArtistPayload {
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl ArtistPayload {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("state", &self.state),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// GET /api/artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistSummary>>, ApiError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        artists
            .into_iter()
            .map(|a| ArtistSummary {
                id: a.id,
                name: a.name,
            })
            .collect(),
    ))
}

/// GET /api/artists/:id
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistDetailResponse>, ApiError> {
    let artist_model = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("artist"))?;

    let shows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .order_by_asc(show::Column::Id)
        .all(&state.db)
        .await?;

    // Batch-fetch the venue counterparts and join in memory
    let venue_ids: Vec<i32> = shows
        .iter()
        .map(|s| s.venue_id)
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

    let mut entries: Vec<(chrono::NaiveDateTime, VenueShowEntry)> = Vec::new();
    for s in shows {
        if let Some(v) = venues.get(&s.venue_id) {
            entries.push((
                s.start_time,
                VenueShowEntry {
                    venue_id: v.id,
                    venue_name: v.name.clone(),
                    venue_image_link: v.image_link.clone(),
                    start_time: schedule::format_start_time(s.start_time),
                },
            ));
        }
    }

    let now = chrono::Utc::now().naive_utc();
    let (past, upcoming) = schedule::partition_by_start(entries, now, |(start, _)| *start);
    let past_shows: Vec<VenueShowEntry> = past.into_iter().map(|(_, e)| e).collect();
    let upcoming_shows: Vec<VenueShowEntry> = upcoming.into_iter().map(|(_, e)| e).collect();

    Ok(Json(ArtistDetailResponse {
        artist: ArtistResponse::from(artist_model),
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }))
}

/// POST /api/artists
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ArtistPayload>,
) -> Result<(StatusCode, Json<ArtistResponse>), ApiError> {
    payload.validate()?;

    let txn = state.db.begin().await?;

    let new_artist = artist::ActiveModel {
        name: Set(payload.name),
        city: Set(payload.city),
        state: Set(payload.state),
        genres: Set(payload.genres),
        phone: Set(payload.phone),
        image_link: Set(payload.image_link),
        facebook_link: Set(payload.facebook_link),
        website: Set(payload.website),
        seeking_venue: Set(payload.seeking_venue),
        seeking_description: Set(payload.seeking_description),
        ..Default::default()
    };

    let created = new_artist.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(artist_id = created.id, "artist listed");
    Ok((StatusCode::CREATED, Json(ArtistResponse::from(created))))
}

/// PUT /api/artists/:id
///
/// Replace-all semantics: every column is overwritten from the payload.
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<ArtistPayload>,
) -> Result<Json<ArtistResponse>, ApiError> {
    payload.validate()?;

    let existing = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("artist"))?;

    let txn = state.db.begin().await?;

    let mut active: artist::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    active.genres = Set(payload.genres);
    active.phone = Set(payload.phone);
    active.image_link = Set(payload.image_link);
    active.facebook_link = Set(payload.facebook_link);
    active.website = Set(payload.website);
    active.seeking_venue = Set(payload.seeking_venue);
    active.seeking_description = Set(payload.seeking_description);

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ArtistResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn make_artist_model(id: i32, name: &str) -> artist::Model {
        artist::Model {
            id,
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            genres: vec!["Rock n Roll".into()],
            phone: Some("326-123-5000".into()),
            image_link: Some("https://img.example.com/artist.jpg".into()),
            facebook_link: Some("https://www.facebook.com/GunsNPetals".into()),
            website: Some("https://www.gunsnpetalsband.com".into()),
            seeking_venue: true,
            seeking_description: Some("Looking for shows in the Bay Area.".into()),
        }
    }

    fn make_venue_model(id: i32, name: &str) -> venue::Model {
        venue::Model {
            id,
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            genres: vec!["Jazz".into()],
            phone: None,
            image_link: Some("https://img.example.com/venue.jpg".into()),
            facebook_link: None,
            website: None,
            seeking_talent: false,
            seeking_description: None,
        }
    }

    fn make_show_model(id: i32, venue_id: i32, artist_id: i32, start: chrono::NaiveDateTime) -> show::Model {
        show::Model {
            id,
            venue_id,
            artist_id,
            start_time: start,
        }
    }

    fn test_state(db: sea_orm::DatabaseConnection) -> Arc<AppState> {
        Arc::new(AppState { db })
    }

    #[test]
    fn test_artist_response_from_model() {
        let model = make_artist_model(4, "Guns N Petals");
        let resp = ArtistResponse::from(model);
        assert_eq!(resp.id, 4);
        assert_eq!(resp.name, "Guns N Petals");
        assert!(resp.seeking_venue);
        assert_eq!(resp.genres, vec!["Rock n Roll".to_string()]);
    }

    #[test]
    fn test_artist_payload_minimal_defaults() {
        let json = r#"{"name": "Guns N Petals", "city": "San Francisco", "state": "CA"}"#;
        let payload: ArtistPayload = serde_json::from_str(json).unwrap();
        assert!(payload.genres.is_empty());
        assert!(!payload.seeking_venue);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_artist_payload_rejects_empty_city() {
        let json = r#"{"name": "Guns N Petals", "city": "", "state": "CA"}"#;
        let payload: ArtistPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(
            payload.validate(),
            Err(ApiError::Validation(msg)) if msg.contains("city")
        ));
    }

    #[test]
    fn test_detail_response_flattens_artist_fields() {
        let detail = ArtistDetailResponse {
            artist: ArtistResponse::from(make_artist_model(4, "Guns N Petals")),
            past_shows: vec![],
            upcoming_shows: vec![],
            past_shows_count: 0,
            upcoming_shows_count: 0,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Guns N Petals");
        assert_eq!(json["upcoming_shows_count"], 0);
    }

    #[tokio::test]
    async fn test_list_artists_returns_summaries() {
        let artists = vec![
            make_artist_model(4, "Guns N Petals"),
            make_artist_model(5, "Matt Quevedo"),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([artists])
            .into_connection();

        let Json(listed) = list_artists(State(test_state(db))).await.unwrap();
        assert_eq!(
            listed,
            vec![
                ArtistSummary {
                    id: 4,
                    name: "Guns N Petals".into()
                },
                ArtistSummary {
                    id: 5,
                    name: "Matt Quevedo".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_get_artist_partitions_shows() {
        let now = Utc::now().naive_utc();
        let artist = make_artist_model(6, "The Wild Sax Band");
        let shows = vec![
            make_show_model(20, 3, 6, now - Duration::days(7)),
            make_show_model(21, 3, 6, now + Duration::days(7)),
        ];
        let venues = vec![make_venue_model(3, "Park Square Live Music & Coffee")];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![artist]])
            .append_query_results([shows])
            .append_query_results([venues])
            .into_connection();

        let Json(detail) = get_artist(State(test_state(db)), Path(6)).await.unwrap();

        assert_eq!(detail.past_shows_count, 1);
        assert_eq!(detail.upcoming_shows_count, 1);
        assert_eq!(detail.past_shows[0].venue_id, 3);
        assert_eq!(detail.past_shows[0].venue_name, "Park Square Live Music & Coffee");
        assert!(detail.upcoming_shows[0].start_time.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_get_artist_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<artist::Model>::new()])
            .into_connection();

        let err = get_artist(State(test_state(db)), Path(99)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("artist")));
    }
}
