// src/model.rs
//! Canonical video records and the normalizer that produces them.
//!
//! The backend, the local dataset and older deployments disagree on the
//! envelope around the video list, so everything funnels through
//! [`classify_payload`] first and only then through one extraction path.
//! Normalization is total: whatever comes in, every emitted record has every
//! field populated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_TITLE: &str = "Untitled Video";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_LEVEL: &str = "Beginner";
pub const DEFAULT_INSTRUCTOR: &str = "Unknown";
pub const DEFAULT_STATUS: &str = "active";

/// Record identifier as it appears on the wire: either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoId {
    Num(i64),
    Text(String),
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoId::Num(n) => write!(f, "{n}"),
            VideoId::Text(s) => f.write_str(s),
        }
    }
}

/// One playable item, fully populated. Immutable once produced; the UI layer
/// holds read-only references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub src: String,
    pub duration: u32,
    pub thumbnail: String,
    pub category: String,
    pub level: String,
    pub instructor: String,
    pub tags: Vec<String>,
    pub status: String,
}

/// The envelope shapes we accept, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape {
    /// `{ success: true, videos: [...] }`
    SuccessEnvelope(Vec<Value>),
    /// A bare JSON array (local dataset format).
    BareSequence(Vec<Value>),
    /// `{ videos: [...] }` with the success flag absent or false.
    KeyedEnvelope(Vec<Value>),
    Unrecognized,
}

impl PayloadShape {
    pub fn into_videos(self) -> Vec<Value> {
        match self {
            PayloadShape::SuccessEnvelope(v)
            | PayloadShape::BareSequence(v)
            | PayloadShape::KeyedEnvelope(v) => v,
            PayloadShape::Unrecognized => Vec::new(),
        }
    }
}

/// Classify a raw payload into one of the known shapes.
pub fn classify_payload(payload: &Value) -> PayloadShape {
    if let Some(obj) = payload.as_object() {
        let success = obj.get("success").and_then(Value::as_bool).unwrap_or(false);
        if let Some(videos) = obj.get("videos").and_then(Value::as_array) {
            if success {
                return PayloadShape::SuccessEnvelope(videos.clone());
            }
            return PayloadShape::KeyedEnvelope(videos.clone());
        }
        return PayloadShape::Unrecognized;
    }
    if let Some(arr) = payload.as_array() {
        return PayloadShape::BareSequence(arr.clone());
    }
    PayloadShape::Unrecognized
}

/// Convert a raw payload into canonical records. Total: unrecognized shapes
/// yield an empty list, missing fields fall to their defaults.
pub fn normalize(payload: &Value) -> Vec<VideoRecord> {
    classify_payload(payload)
        .into_videos()
        .iter()
        .map(normalize_one)
        .collect()
}

fn normalize_one(video: &Value) -> VideoRecord {
    VideoRecord {
        id: extract_id(video.get("id")),
        title: string_or(video.get("title"), DEFAULT_TITLE),
        description: string_or(video.get("description"), DEFAULT_DESCRIPTION),
        // Older records carry the media URI under `url`
        src: non_empty_string(video.get("src"))
            .or_else(|| non_empty_string(video.get("url")))
            .unwrap_or_default(),
        duration: parse_duration(video.get("duration")),
        thumbnail: string_or(video.get("thumbnail"), ""),
        category: string_or(video.get("category"), DEFAULT_CATEGORY),
        level: string_or(video.get("level"), DEFAULT_LEVEL),
        instructor: string_or(video.get("instructor"), DEFAULT_INSTRUCTOR),
        tags: extract_tags(video.get("tags")),
        status: string_or(video.get("status"), DEFAULT_STATUS),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    non_empty_string(value).unwrap_or_else(|| default.to_string())
}

fn extract_id(value: Option<&Value>) -> VideoId {
    match value {
        Some(Value::String(s)) if !s.is_empty() => VideoId::Text(s.clone()),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) | None => generated_id(),
            Some(i) => VideoId::Num(i),
        },
        _ => generated_id(),
    }
}

/// Unique at generation time only: records without an id get a fresh one on
/// every reload, so these ids must not be used as persistence keys.
fn generated_id() -> VideoId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    VideoId::Text(format!("gen-{millis}-{:08x}", rand::random::<u32>()))
}

fn extract_tags(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(arr) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Duration in seconds from the formats seen in the wild:
/// a number, `"MM:SS"`, or a plain integer string. Anything else is 0.
pub fn parse_duration(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        Some(Value::String(s)) => parse_duration_str(s),
        _ => 0,
    }
}

fn parse_duration_str(s: &str) -> u32 {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() == 2 {
        let minutes: u32 = parts[0].trim().parse().unwrap_or(0);
        let seconds: u32 = parts[1].trim().parse().unwrap_or(0);
        // Saturate: the string comes from an untrusted payload
        return minutes.saturating_mul(60).saturating_add(seconds);
    }
    s.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_parses_known_formats() {
        assert_eq!(parse_duration(Some(&json!("2:30"))), 150);
        assert_eq!(parse_duration(Some(&json!("45"))), 45);
        assert_eq!(parse_duration(Some(&json!("abc"))), 0);
        assert_eq!(parse_duration(Some(&json!(90))), 90);
        assert_eq!(parse_duration(Some(&json!(null))), 0);
        assert_eq!(parse_duration(None), 0);
    }

    #[test]
    fn duration_mmss_with_bad_side_treats_it_as_zero() {
        assert_eq!(parse_duration(Some(&json!("x:30"))), 30);
        assert_eq!(parse_duration(Some(&json!("2:x"))), 120);
        // Three segments is not MM:SS and not a plain integer
        assert_eq!(parse_duration(Some(&json!("1:2:3"))), 0);
    }

    #[test]
    fn duration_with_huge_minutes_saturates_instead_of_overflowing() {
        assert_eq!(parse_duration(Some(&json!("100000000:00"))), u32::MAX);
        assert_eq!(
            parse_duration(Some(&json!(format!("{}:59", u32::MAX)))),
            u32::MAX
        );
        // Normalization stays total on such records
        let records = normalize(&json!([{ "duration": "100000000:00" }]));
        assert_eq!(records[0].duration, u32::MAX);
    }

    #[test]
    fn success_envelope_is_preferred_shape() {
        let payload = json!({ "success": true, "videos": [ { "title": "A" } ] });
        match classify_payload(&payload) {
            PayloadShape::SuccessEnvelope(v) => assert_eq!(v.len(), 1),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn bare_array_and_keyed_envelope_are_accepted() {
        let bare = json!([ { "title": "A" }, { "title": "B" } ]);
        assert!(matches!(
            classify_payload(&bare),
            PayloadShape::BareSequence(ref v) if v.len() == 2
        ));

        let keyed = json!({ "success": false, "videos": [ { "title": "A" } ] });
        assert!(matches!(
            classify_payload(&keyed),
            PayloadShape::KeyedEnvelope(ref v) if v.len() == 1
        ));
    }

    #[test]
    fn unrecognized_shapes_yield_empty_output() {
        for payload in [
            json!({ "success": true }),
            json!({ "items": [] }),
            json!("just a string"),
            json!(42),
            json!(null),
        ] {
            assert!(normalize(&payload).is_empty(), "payload: {payload}");
        }
    }

    #[test]
    fn missing_fields_fall_to_defaults() {
        let records = normalize(&json!([{}]));
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title, DEFAULT_TITLE);
        assert_eq!(r.description, DEFAULT_DESCRIPTION);
        assert_eq!(r.src, "");
        assert_eq!(r.duration, 0);
        assert_eq!(r.thumbnail, "");
        assert_eq!(r.category, DEFAULT_CATEGORY);
        assert_eq!(r.level, DEFAULT_LEVEL);
        assert_eq!(r.instructor, DEFAULT_INSTRUCTOR);
        assert!(r.tags.is_empty());
        assert_eq!(r.status, DEFAULT_STATUS);
        assert!(matches!(r.id, VideoId::Text(ref s) if s.starts_with("gen-")));
    }

    #[test]
    fn provided_values_are_never_overwritten() {
        let payload = json!([{
            "id": 7,
            "title": "Prenatal Care Basics",
            "description": "First trimester overview",
            "src": "assets/videos/prenatal.mp4",
            "duration": "12:05",
            "thumbnail": "assets/thumbs/prenatal.jpg",
            "category": "Pregnancy",
            "level": "Intermediate",
            "instructor": "dr. Sari",
            "tags": ["prenatal", "health"],
            "status": "active"
        }]);
        let records = normalize(&payload);
        let r = &records[0];
        assert_eq!(r.id, VideoId::Num(7));
        assert_eq!(r.title, "Prenatal Care Basics");
        assert_eq!(r.description, "First trimester overview");
        assert_eq!(r.src, "assets/videos/prenatal.mp4");
        assert_eq!(r.duration, 725);
        assert_eq!(r.thumbnail, "assets/thumbs/prenatal.jpg");
        assert_eq!(r.category, "Pregnancy");
        assert_eq!(r.level, "Intermediate");
        assert_eq!(r.instructor, "dr. Sari");
        assert_eq!(r.tags, vec!["prenatal".to_string(), "health".to_string()]);
        assert_eq!(r.status, "active");
    }

    #[test]
    fn url_field_backs_up_missing_src() {
        let records = normalize(&json!([{ "url": "https://cdn.test/v.mp4" }]));
        assert_eq!(records[0].src, "https://cdn.test/v.mp4");

        // Empty src string also falls through to url
        let records = normalize(&json!([{ "src": "", "url": "https://cdn.test/v2.mp4" }]));
        assert_eq!(records[0].src, "https://cdn.test/v2.mp4");
    }

    #[test]
    fn generated_ids_are_unique_within_a_batch() {
        let records = normalize(&json!([{}, {}, {}]));
        let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn non_string_tags_are_dropped() {
        let records = normalize(&json!([{ "tags": ["ok", 3, null, "fine"] }]));
        assert_eq!(records[0].tags, vec!["ok".to_string(), "fine".to_string()]);
    }
}
