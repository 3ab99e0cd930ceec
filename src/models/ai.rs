// src/models/ai.rs

use serde::{Deserialize, Serialize};

use super::mentor::MentorListing;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub user_input: Option<String>,
    pub user_id: Option<i64>,
}

/// A mentor with its keyword match score.
#[derive(Debug, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub mentor: MentorListing,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
}

/// Skills may arrive as a single string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    One(String),
    Many(Vec<String>),
}

impl SkillsInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SkillsInput::One(skill) => vec![skill],
            SkillsInput::Many(skills) => skills,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathwayRequest {
    pub aspiration: Option<String>,
    pub skills: Option<SkillsInput>,
}
