//! Requests, model responses and wiring used across tests.

use super::mock_model::MockModelClient;
use serde_json::json;
use sprout_cache::InMemoryCacheStore;
use sprout_config::{CacheSettings, GenerationSettings, SproutConfig};
use sprout_core::{ContentType, GenerationRequest, LearningStyle, RecommendationRequest};
use sprout_interface::CacheStore;
use sprout_security::{
    ApprovalWorkflow, InMemoryApprovalRepository, InMemoryContentRatings,
    InMemoryGuardianDirectory,
};
use sprout_generation::{GenerationCache, GenerationOrchestrator};
use std::sync::Arc;

pub const CHILD_ID: &str = "child-1";
pub const PARENT_ID: &str = "parent-1";

pub fn math_request() -> GenerationRequest {
    GenerationRequest::builder()
        .child_id(CHILD_ID)
        .subject("Mathematics")
        .grade_level(Some("1st grade".to_string()))
        .child_age(6u8)
        .learning_style(LearningStyle::new(0.4, 0.2, 0.3, 0.1))
        .duration_minutes(30u32)
        .objectives(vec!["count to 20".to_string(), "recognize numbers".to_string()])
        .build()
        .unwrap()
}

pub fn recommendation_request() -> RecommendationRequest {
    RecommendationRequest::builder()
        .child_id(CHILD_ID)
        .subject("Mathematics")
        .topic("Counting")
        .child_age(6u8)
        .content_types(vec![ContentType::Video])
        .build()
        .unwrap()
}

fn counting_song() -> serde_json::Value {
    json!({
        "type": "video",
        "title": "Counting to 20 song",
        "url": "https://videos.example.com/counting-20",
        "duration": 5,
        "ageAppropriate": true,
        "safetyScore": 0.95,
        "source": "Example Kids",
        "tags": ["counting", "music"],
        "difficulty": 1
    })
}

fn battle_video() -> serde_json::Value {
    json!({
        "type": "video",
        "title": "Ancient battles and violence",
        "url": "https://videos.example.com/battles",
        "duration": 10,
        "ageAppropriate": true,
        "safetyScore": 0.9,
        "source": "History Hub",
        "tags": ["history"],
        "difficulty": 3
    })
}

fn activities() -> serde_json::Value {
    json!([
        {
            "id": "count-blocks",
            "title": "Count the blocks",
            "description": "Build towers and count every block",
            "type": "interactive",
            "duration": 15,
            "difficulty": 2,
            "objectives": ["count to 20"],
            "instructions": "Stack blocks and count them aloud",
            "materials": ["blocks"],
            "assessmentCriteria": ["counts to 20 without skipping"]
        },
        {
            "id": "number-song",
            "title": "Number song",
            "type": "video",
            "duration": 10,
            "difficulty": 1,
            "objectives": ["recognize numbers"]
        }
    ])
}

/// Clean plan for a six-year-old, wrapped in commentary like a real model.
pub fn clean_plan_response() -> String {
    let plan = json!({
        "title": "Counting Adventures",
        "description": "Practice counting to 20 with games",
        "activities": activities(),
        "recommendations": [counting_song()],
        "learningObjectives": ["count to 20", "recognize numbers"]
    });
    format!("Here is the plan you asked for:\n```json\n{}\n```\nHave fun!", plan)
}

/// Plan whose second recommendation mentions violence.
pub fn violent_recommendation_response() -> String {
    json!({
        "title": "Counting Adventures",
        "activities": activities(),
        "recommendations": [counting_song(), battle_video()]
    })
    .to_string()
}

/// Plan with an activity far too hard and long for a six-year-old.
pub fn hard_activity_response() -> String {
    let mut items = activities();
    if let Some(list) = items.as_array_mut() {
        list.push(json!({
            "id": "long-division",
            "title": "Long division drills",
            "type": "exercise",
            "duration": 45,
            "difficulty": 9
        }));
    }
    json!({
        "title": "Counting Adventures",
        "activities": items,
        "recommendations": [counting_song()]
    })
    .to_string()
}

pub fn recommendations_response() -> String {
    json!([counting_song(), battle_video()]).to_string()
}

pub struct Harness {
    pub orchestrator: GenerationOrchestrator,
    pub model: MockModelClient,
    pub ratings: Arc<InMemoryContentRatings>,
    pub repository: Arc<InMemoryApprovalRepository>,
}

pub async fn approvals() -> (ApprovalWorkflow, Arc<InMemoryContentRatings>, Arc<InMemoryApprovalRepository>) {
    let guardians = Arc::new(InMemoryGuardianDirectory::new());
    guardians.link(PARENT_ID, CHILD_ID).await;
    let ratings = Arc::new(InMemoryContentRatings::new());
    let repository = Arc::new(InMemoryApprovalRepository::new());
    let workflow = ApprovalWorkflow::new(repository.clone(), guardians, ratings.clone());
    (workflow, ratings, repository)
}

pub async fn harness_with_config(model: MockModelClient, config: &SproutConfig) -> Harness {
    let (workflow, ratings, repository) = approvals().await;
    let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::from_settings(config.cache()));
    let orchestrator =
        GenerationOrchestrator::from_config(config, Arc::new(model.clone()), store, workflow)
            .unwrap();
    Harness {
        orchestrator,
        model,
        ratings,
        repository,
    }
}

pub async fn harness(model: MockModelClient) -> Harness {
    harness_with_config(model, &SproutConfig::default()).await
}

pub fn cache_over(store: Arc<dyn CacheStore>, model: &MockModelClient) -> GenerationCache {
    GenerationCache::new(
        store,
        Arc::new(model.clone()),
        &CacheSettings::default(),
        &GenerationSettings::default(),
    )
}
