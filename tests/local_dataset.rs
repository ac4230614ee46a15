//! Sanity checks on the bundled dataset and the normalizer contract every
//! accepted payload shape has to satisfy.

use serde_json::{json, Value};
use video_playlist_data::local::LocalDataReader;
use video_playlist_data::{normalize, VideoId};

#[tokio::test]
async fn bundled_dataset_loads_and_normalizes() {
    let reader = LocalDataReader::new("data/videos.json");
    let payload = reader.fetch().await.expect("bundled dataset must load");
    let videos = normalize(&payload);
    assert!(!videos.is_empty());

    for v in &videos {
        assert!(!v.title.is_empty());
        assert!(!v.description.is_empty());
        assert!(!v.category.is_empty());
        assert!(!v.level.is_empty());
        assert!(!v.instructor.is_empty());
        assert!(!v.status.is_empty());
        if let VideoId::Text(s) = &v.id {
            assert!(!s.is_empty());
        }
    }

    // Known entries from the shipped file
    assert_eq!(videos[0].title, "Senam Hamil Trimester Ketiga");
    assert_eq!(videos[0].duration, 12 * 60 + 30);
    // Third entry only has `url`, which backs up `src`
    assert_eq!(videos[2].src, "assets/videos/perawatan-bayi.mp4");
    // Last entry omits id, instructor, tags and status
    let last = videos.last().unwrap();
    assert!(matches!(&last.id, VideoId::Text(s) if s.starts_with("gen-")));
    assert_eq!(last.instructor, "Unknown");
    assert_eq!(last.status, "active");
}

#[test]
fn every_accepted_shape_yields_one_record_per_element() {
    let elems = || vec![json!({ "title": "A" }); 3];
    let shapes: Vec<Value> = vec![
        json!({ "success": true, "videos": elems() }),
        json!(elems()),
        json!({ "videos": elems() }),
    ];

    for payload in shapes {
        let videos = normalize(&payload);
        assert_eq!(videos.len(), 3, "payload: {payload}");
        for v in videos {
            assert_eq!(v.title, "A");
            // Every other field must be populated with its default
            assert!(!v.description.is_empty());
            assert!(!v.category.is_empty());
            assert!(!v.level.is_empty());
            assert!(!v.instructor.is_empty());
            assert!(!v.status.is_empty());
            assert_eq!(v.duration, 0);
            assert!(v.tags.is_empty());
        }
    }
}
