// src/handlers/ai.rs

use axum::{extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    extract::Json,
    handlers::mentor::listing_query,
    models::{
        ai::{PathwayRequest, Recommendation, RecommendRequest},
        mentor::MentorListing,
    },
    utils::pathway::{self, PathwayInput},
};

const MAX_RECOMMENDATIONS: usize = 5;

/// Keyword overlap plus a small boost for well-rated, experienced mentors.
fn match_score(keywords: &[String], mentor: &MentorListing) -> f64 {
    let m = &mentor.mentor;
    let text = format!(
        "{} {} {} {}",
        m.name,
        m.domain,
        m.bio.as_deref().unwrap_or_default(),
        m.experience.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    let hits = keywords.iter().filter(|k| text.contains(k.as_str())).count() as f64;
    hits + m.rating * 0.5 + mentor.total_sessions.min(10) as f64 * 0.1
}

/// Ranks mentors against a free-text description of what the user wants to learn.
pub async fn recommend_mentors(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RecommendRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload
        .user_input
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("User input is required".to_string()))?;

    let keywords: Vec<String> = input
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mentors = listing_query()
        .build_query_as::<MentorListing>()
        .fetch_all(&pool)
        .await?;

    let mut ranked: Vec<Recommendation> = mentors
        .into_iter()
        .map(|mentor| Recommendation {
            match_score: match_score(&keywords, &mentor),
            mentor,
        })
        .filter(|r| r.match_score > 0.0)
        .collect();

    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    ranked.truncate(MAX_RECOMMENDATIONS);

    Ok(Json(json!({ "mentors": ranked })))
}

/// Asks the external engine for a learning pathway and relays its JSON verbatim.
pub async fn generate_pathway(
    State(config): State<Config>,
    Json(payload): Json<PathwayRequest>,
) -> Result<impl IntoResponse, AppError> {
    let aspiration = payload
        .aspiration
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Aspiration is required".to_string()))?;

    let input = PathwayInput {
        aspiration,
        skills: payload.skills.map(|s| s.into_vec()).unwrap_or_default(),
    };

    let pathway = pathway::generate(&config, &input).await?;
    Ok(Json(pathway))
}
