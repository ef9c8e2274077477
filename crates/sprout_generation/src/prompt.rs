//! Prompt construction.

use sprout_core::{GenerationRequest, RecommendationRequest};
use std::fmt::Write;

const PLAN_SCHEMA: &str = r#"{
  "title": string,
  "description": string,
  "activities": [{
    "id": string,
    "title": string,
    "description": string,
    "type": "video" | "article" | "interactive" | "quiz" | "exercise",
    "duration": minutes,
    "difficulty": 1-10,
    "objectives": [string],
    "instructions": string,
    "materials": [string],
    "assessmentCriteria": [string]
  }],
  "recommendations": [RECOMMENDATION],
  "learningObjectives": [string]
}"#;

const RECOMMENDATION_SCHEMA: &str = r#"{
  "type": "video" | "article" | "interactive",
  "title": string,
  "description": string,
  "url": string,
  "duration": minutes,
  "ageAppropriate": boolean,
  "safetyScore": 0.0-1.0,
  "source": string,
  "tags": [string],
  "difficulty": 1-10
}"#;

const VERDICT_SCHEMA: &str = r#"{
  "isAppropriate": boolean,
  "ageAppropriate": boolean,
  "safetyScore": 0.0-1.0,
  "educationalValue": 0.0-1.0,
  "flaggedConcerns": [string],
  "reasons": [string]
}"#;

/// Prompt asking for a study plan.
pub fn study_plan_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Create a personalized study plan for a {}-year-old child.\n\nSubject: {}\n",
        request.child_age, request.subject
    );
    if let Some(topic) = &request.topic {
        let _ = writeln!(prompt, "Topic: {}", topic);
    }
    if let Some(grade) = &request.grade_level {
        let _ = writeln!(prompt, "Grade level: {}", grade);
    }
    let _ = writeln!(
        prompt,
        "Target session length: {} minutes",
        request.duration_minutes
    );

    let style = request.learning_style.non_negative();
    let _ = writeln!(
        prompt,
        "Learning style weights: visual {:.2}, auditory {:.2}, kinesthetic {:.2}, reading/writing {:.2}",
        style.visual, style.auditory, style.kinesthetic, style.reading_writing
    );

    if !request.objectives.is_empty() {
        prompt.push_str("\nLearning objectives:\n");
        for objective in &request.objectives {
            let _ = writeln!(prompt, "- {}", objective);
        }
    }
    if let Some(performance) = &request.prior_performance {
        let _ = writeln!(prompt, "\nRecent performance: {}", performance);
    }
    if !request.content_preferences.is_empty() {
        let _ = writeln!(
            prompt,
            "\nPreferred content: {}",
            request.content_preferences.join(", ")
        );
    }

    let _ = write!(
        prompt,
        "\nAll content must be safe, encouraging and suitable for the child's age.\n\
         Respond with ONLY valid JSON in this shape:\n{}\n\nwhere RECOMMENDATION is:\n{}\n",
        PLAN_SCHEMA, RECOMMENDATION_SCHEMA
    );
    prompt
}

/// Prompt asking for standalone content recommendations.
pub fn recommendations_prompt(request: &RecommendationRequest) -> String {
    let mut prompt = format!(
        "Recommend learning content for a {}-year-old child.\n\nSubject: {}\nTopic: {}\n",
        request.child_age, request.subject, request.topic
    );
    if !request.content_types.is_empty() {
        let kinds: Vec<String> = request.content_types.iter().map(|t| t.to_string()).collect();
        let _ = writeln!(prompt, "Content types: {}", kinds.join(", "));
    }
    let _ = write!(
        prompt,
        "\nOnly recommend content that is safe and suitable for the child's age.\n\
         Respond with ONLY a valid JSON array of objects in this shape:\n{}\n",
        RECOMMENDATION_SCHEMA
    );
    prompt
}

/// Prompt asking the model to classify text for a child.
pub fn safety_prompt(text: &str, child_age: u8) -> String {
    format!(
        "You review learning material for children. Decide whether the text between the \
         markers is appropriate for a {}-year-old child.\n\n<<<TEXT\n{}\nTEXT>>>\n\n\
         Respond with ONLY valid JSON in this shape:\n{}\n",
        child_age, text, VERDICT_SCHEMA
    )
}
