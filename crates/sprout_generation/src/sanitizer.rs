//! Turning untrusted model output into bounded records.

use crate::extraction::{extract_json, parse_json};
use serde_json::{Map, Value};
use sprout_core::{
    ACTIVITY_DURATION_RANGE, ActivityType, ContentRecommendation, ContentType, DIFFICULTY_RANGE,
    GeneratedActivity, GeneratedStudyPlan, GenerationRequest, RECOMMENDATION_DURATION_RANGE,
};
use sprout_error::{ParseError, SproutResult};
use std::ops::RangeInclusive;
use tracing::{debug, instrument};

const DEFAULT_ACTIVITY_MINUTES: u32 = 15;
const DEFAULT_RECOMMENDATION_MINUTES: u32 = 15;
const DEFAULT_DIFFICULTY: u8 = 5;

/// Parses model responses into study plans and recommendations.
///
/// Parsing is pure: the same text always yields the same record. Missing or
/// malformed fields fall back to defaults, numbers are clamped into range
/// and unknown labels degrade to the safest variant. Only a response with
/// no decodable JSON at all is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    /// Parse a study plan generated for `request`.
    ///
    /// A top-level array is read as the activity list. The plan's subject
    /// always comes from the request.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the response holds no JSON object or
    /// array, or the JSON does not decode.
    #[instrument(skip(raw, request), fields(raw_len = raw.len(), subject = %request.subject))]
    pub fn parse(raw: &str, request: &GenerationRequest) -> SproutResult<GeneratedStudyPlan> {
        let value: Value = parse_json(extract_json(raw)?)?;
        let plan = match &value {
            Value::Array(items) => GeneratedStudyPlan::new(
                default_title(request),
                String::new(),
                request.subject.clone(),
                activities(items),
                Vec::new(),
                request.objectives.clone(),
            ),
            Value::Object(map) => {
                let fields = Fields(map);
                let objectives = fields.list(&["learningObjectives", "learning_objectives", "objectives"]);
                GeneratedStudyPlan::new(
                    fields
                        .text(&["title", "name"])
                        .unwrap_or_else(|| default_title(request)),
                    fields.text(&["description", "summary"]).unwrap_or_default(),
                    request.subject.clone(),
                    fields
                        .array(&["activities"])
                        .map(|items| activities(items))
                        .unwrap_or_default(),
                    fields
                        .array(&["recommendations", "contentRecommendations"])
                        .map(|items| recommendations(items))
                        .unwrap_or_default(),
                    if objectives.is_empty() {
                        request.objectives.clone()
                    } else {
                        objectives
                    },
                )
            }
            _ => return Err(ParseError::new("Expected a JSON object or array").into()),
        };

        debug!(
            activities = plan.activities().len(),
            recommendations = plan.recommendations().len(),
            total_minutes = plan.total_duration_minutes(),
            "Parsed study plan"
        );
        Ok(plan)
    }

    /// Parse a standalone list of recommendations.
    ///
    /// Accepts a top-level array, an object holding a `recommendations`
    /// array, or a single recommendation object.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the response holds no JSON object or
    /// array, or the JSON does not decode.
    #[instrument(skip(raw), fields(raw_len = raw.len()))]
    pub fn parse_recommendations(raw: &str) -> SproutResult<Vec<ContentRecommendation>> {
        let value: Value = parse_json(extract_json(raw)?)?;
        let parsed = match &value {
            Value::Array(items) => recommendations(items),
            Value::Object(map) => {
                let fields = Fields(map);
                match fields.array(&["recommendations", "contentRecommendations", "items"]) {
                    Some(items) => recommendations(items),
                    None => recommendation(map).into_iter().collect(),
                }
            }
            _ => return Err(ParseError::new("Expected a JSON object or array").into()),
        };
        debug!(count = parsed.len(), "Parsed recommendations");
        Ok(parsed)
    }
}

fn default_title(request: &GenerationRequest) -> String {
    match &request.topic {
        Some(topic) => format!("{}: {}", request.subject, topic),
        None => format!("{} study plan", request.subject),
    }
}

fn activities(items: &[Value]) -> Vec<GeneratedActivity> {
    items
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(i, map)| activity(map, i + 1))
        .collect()
}

fn activity(map: &Map<String, Value>, position: usize) -> GeneratedActivity {
    let fields = Fields(map);
    GeneratedActivity {
        id: fields
            .text(&["id"])
            .unwrap_or_else(|| format!("activity-{}", position)),
        title: fields
            .text(&["title", "name"])
            .unwrap_or_else(|| format!("Activity {}", position)),
        description: fields.text(&["description"]).unwrap_or_default(),
        activity_type: fields
            .text(&["type", "activityType", "activity_type"])
            .map(|label| ActivityType::from_label(&label))
            .unwrap_or_default(),
        duration_minutes: clamp_u32(
            fields.number(&["duration", "durationMinutes", "duration_minutes"]),
            &ACTIVITY_DURATION_RANGE,
            DEFAULT_ACTIVITY_MINUTES,
        ),
        difficulty: clamp_u8(
            fields.number(&["difficulty", "difficultyLevel", "difficulty_level"]),
            &DIFFICULTY_RANGE,
            DEFAULT_DIFFICULTY,
        ),
        objectives: fields.list(&["objectives", "learningObjectives"]),
        instructions: fields.text_or_lines(&["instructions", "steps"]),
        materials: fields.list(&["materials"]),
        assessment_criteria: fields.list(&["assessmentCriteria", "assessment_criteria", "assessment"]),
    }
}

fn recommendations(items: &[Value]) -> Vec<ContentRecommendation> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(recommendation)
        .collect()
}

/// `None` when the item has neither a title nor a URL to identify it.
fn recommendation(map: &Map<String, Value>) -> Option<ContentRecommendation> {
    let fields = Fields(map);
    let url = fields.text(&["url", "link"]);
    let Some(title) = fields.text(&["title", "name"]).or_else(|| url.clone()) else {
        debug!("Dropping recommendation without title or url");
        return None;
    };

    Some(ContentRecommendation {
        content_type: fields
            .text(&["type", "contentType", "content_type"])
            .map(|label| ContentType::from_label(&label))
            .unwrap_or_default(),
        title,
        description: fields.text(&["description"]).unwrap_or_default(),
        url,
        duration_minutes: clamp_u32(
            fields.number(&["duration", "durationMinutes", "duration_minutes"]),
            &RECOMMENDATION_DURATION_RANGE,
            DEFAULT_RECOMMENDATION_MINUTES,
        ),
        age_appropriate: fields
            .flag(&["ageAppropriate", "age_appropriate"])
            .unwrap_or(false),
        safety_score: fields
            .number(&["safetyScore", "safety_score"])
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or(0.0),
        source: fields.text(&["source", "provider"]).unwrap_or_default(),
        tags: fields.list(&["tags", "keywords"]),
        difficulty: clamp_u8(
            fields.number(&["difficulty", "difficultyLevel", "difficulty_level"]),
            &DIFFICULTY_RANGE,
            DEFAULT_DIFFICULTY,
        ),
    })
}

fn clamp_u32(value: Option<f64>, range: &RangeInclusive<u32>, default: u32) -> u32 {
    value
        .map(|v| v.round().clamp(f64::from(*range.start()), f64::from(*range.end())) as u32)
        .unwrap_or(default)
}

fn clamp_u8(value: Option<f64>, range: &RangeInclusive<u8>, default: u8) -> u8 {
    value
        .map(|v| v.round().clamp(f64::from(*range.start()), f64::from(*range.end())) as u8)
        .unwrap_or(default)
}

/// Lenient accessors over one JSON object. Each takes candidate key
/// spellings and uses the first present, non-null one.
struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| !v.is_null())
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        match self.value(keys)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Finite number, also accepted as a numeric string.
    fn number(&self, keys: &[&str]) -> Option<f64> {
        let number = match self.value(keys)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        number.is_finite().then_some(number)
    }

    fn flag(&self, keys: &[&str]) -> Option<bool> {
        match self.value(keys)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn array(&self, keys: &[&str]) -> Option<&Vec<Value>> {
        self.value(keys)?.as_array()
    }

    /// String items only; other items are dropped. A bare string is a
    /// one-item list.
    fn list(&self, keys: &[&str]) -> Vec<String> {
        match self.value(keys) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        }
    }

    /// Text, or a list of lines joined with newlines.
    fn text_or_lines(&self, keys: &[&str]) -> String {
        match self.value(keys) {
            Some(Value::Array(_)) => self.list(keys).join("\n"),
            _ => self.text(keys).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::builder()
            .child_id("child-1")
            .subject("Mathematics")
            .child_age(6u8)
            .objectives(vec!["count to 20".to_string()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_plan() {
        let raw = r#"Here you go!
```json
{
  "title": "Counting Fun",
  "description": "Learn to count",
  "activities": [
    {"id": "a1", "title": "Count blocks", "type": "Interactive", "duration": 10, "difficulty": 2,
     "objectives": ["count to 10"], "instructions": ["Stack", "Count"], "materials": ["blocks"],
     "assessmentCriteria": ["counts correctly"]},
    {"title": "Song", "type": "video", "duration": "12", "difficulty": "3"}
  ],
  "recommendations": [
    {"type": "video", "title": "Counting song", "url": "https://example.com/song", "duration": 5,
     "ageAppropriate": true, "safetyScore": 0.95, "source": "Example", "tags": ["music"], "difficulty": 1}
  ],
  "learningObjectives": ["count to 20", "recognize numbers"]
}
```"#;
        let plan = ResponseSanitizer::parse(raw, &request()).unwrap();

        assert_eq!(plan.title(), "Counting Fun");
        assert_eq!(plan.subject(), "Mathematics");
        assert_eq!(*plan.total_duration_minutes(), 22);
        assert_eq!(plan.learning_objectives().len(), 2);

        let first = &plan.activities()[0];
        assert_eq!(first.id, "a1");
        assert_eq!(first.activity_type, ActivityType::Interactive);
        assert_eq!(first.instructions, "Stack\nCount");
        assert_eq!(first.assessment_criteria, vec!["counts correctly"]);

        let second = &plan.activities()[1];
        assert_eq!(second.id, "activity-2");
        assert_eq!(second.duration_minutes, 12);
        assert_eq!(second.difficulty, 3);

        let rec = &plan.recommendations()[0];
        assert_eq!(rec.content_key(), "https://example.com/song");
        assert_eq!(rec.safety_score, 0.95);
        assert!(rec.age_appropriate);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let raw = r#"{"activities": [
            {"title": "Marathon", "duration": 500, "difficulty": 42},
            {"title": "Blink", "duration": -3, "difficulty": 0},
            {"title": "Odd", "duration": "soon", "difficulty": null, "type": "hologram"}
        ]}"#;
        let plan = ResponseSanitizer::parse(raw, &request()).unwrap();
        let a = plan.activities();

        assert_eq!((a[0].duration_minutes, a[0].difficulty), (120, 10));
        assert_eq!((a[1].duration_minutes, a[1].difficulty), (1, 1));
        assert_eq!((a[2].duration_minutes, a[2].difficulty), (15, 5));
        assert_eq!(a[2].activity_type, ActivityType::Exercise);
        for activity in a {
            assert!(ACTIVITY_DURATION_RANGE.contains(&activity.duration_minutes));
            assert!(DIFFICULTY_RANGE.contains(&activity.difficulty));
        }
    }

    #[test]
    fn test_top_level_array_is_activity_list() {
        let raw = r#"[{"title": "Shapes"}, "stray", {"title": "Colors"}]"#;
        let plan = ResponseSanitizer::parse(raw, &request()).unwrap();

        assert_eq!(plan.title(), "Mathematics study plan");
        assert_eq!(plan.activities().len(), 2);
        assert_eq!(plan.activities()[1].id, "activity-2");
        assert_eq!(plan.learning_objectives(), &vec!["count to 20".to_string()]);
    }

    #[test]
    fn test_missing_fields_default() {
        let plan = ResponseSanitizer::parse("{}", &request()).unwrap();
        assert!(plan.activities().is_empty());
        assert!(plan.recommendations().is_empty());
        assert_eq!(*plan.total_duration_minutes(), 0);
        assert_eq!(plan.description(), "");
    }

    #[test]
    fn test_non_string_list_items_are_dropped() {
        let raw = r#"{"activities": [{"title": "Mix", "materials": ["paper", 3, null, " glue "]}]}"#;
        let plan = ResponseSanitizer::parse(raw, &request()).unwrap();
        assert_eq!(plan.activities()[0].materials, vec!["paper", "glue"]);
    }

    #[test]
    fn test_recommendation_defaults_are_conservative() {
        let recs = ResponseSanitizer::parse_recommendations(r#"[{"title": "Mystery", "type": "podcast"}]"#)
            .unwrap();
        let rec = &recs[0];

        assert_eq!(rec.content_type, ContentType::Article);
        assert_eq!(rec.duration_minutes, 15);
        assert_eq!(rec.difficulty, 5);
        assert_eq!(rec.safety_score, 0.0);
        assert!(!rec.age_appropriate);
    }

    #[test]
    fn test_recommendation_shapes() {
        let wrapped = r#"{"recommendations": [{"title": "A"}, {"url": "https://b.test"}, {"description": "no id"}]}"#;
        let recs = ResponseSanitizer::parse_recommendations(wrapped).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].title, "https://b.test");

        let single = r#"{"title": "Solo", "safetyScore": "1.5", "duration": 999}"#;
        let recs = ResponseSanitizer::parse_recommendations(single).unwrap();
        assert_eq!(recs[0].safety_score, 1.0);
        assert_eq!(recs[0].duration_minutes, 180);
    }

    #[test]
    fn test_prose_is_rejected() {
        assert!(ResponseSanitizer::parse("Sorry, I can't help with that.", &request()).is_err());
        assert!(ResponseSanitizer::parse_recommendations("nothing here").is_err());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(ResponseSanitizer::parse(r#"{"title": "Broken", }"#, &request()).is_err());
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let raw = r#"{"title": "Same", "activities": [{"title": "One"}]}"#;
        assert_eq!(
            ResponseSanitizer::parse(raw, &request()).unwrap(),
            ResponseSanitizer::parse(raw, &request()).unwrap()
        );
    }
}
