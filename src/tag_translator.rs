use chrono::DateTime;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::sidecar::{SchemaError, SidecarRecord};

/// Exiftool tag names mapped to the values to write. BTreeMap keeps the keys
/// sorted, which makes the canonical serialization (and so the payload hash)
/// independent of insertion order.
pub type MetadataPayload = BTreeMap<String, Value>;

/// Converts Unix seconds to exiftool's datetime layout, pinned to UTC.
pub fn to_exif_datetime(timestamp: i64) -> Result<String, SchemaError> {
    let datetime = DateTime::from_timestamp(timestamp, 0)
        .ok_or(SchemaError::InvalidTimestamp(timestamp))?;
    Ok(datetime.format("%Y:%m:%d %H:%M:%S").to_string())
}

/// Pure translation from a Takeout sidecar record to the tags the metadata
/// engine writes. Geodata, title and description are copied verbatim.
pub fn translate(
    record: &SidecarRecord,
    require_image_views: bool,
) -> Result<MetadataPayload, SchemaError> {
    let mut tags = MetadataPayload::new();

    tags.insert("XMP:Title".to_string(), json!(record.title));
    tags.insert("XMP:Description".to_string(), json!(record.description));
    tags.insert(
        "EXIF:DateTimeOriginal".to_string(),
        json!(to_exif_datetime(record.photo_taken_time.timestamp)?),
    );
    tags.insert(
        "XMP:CreateDate".to_string(),
        json!(to_exif_datetime(record.creation_time.timestamp)?),
    );
    tags.insert("EXIF:GPSLatitude".to_string(), json!(record.geo_data.latitude));
    tags.insert(
        "EXIF:GPSLongitude".to_string(),
        json!(record.geo_data.longitude),
    );
    tags.insert("EXIF:GPSAltitude".to_string(), json!(record.geo_data.altitude));

    // Not every export carries a view count.
    match record.image_views {
        Some(views) => {
            tags.insert("XMP:ImageViews".to_string(), json!(views));
        }
        None if require_image_views => return Err(SchemaError::MissingField("imageViews")),
        None => {}
    }

    Ok(tags)
}

/// Stable pretty-printed serialization. Payload equality is defined as these
/// strings being byte-identical.
pub fn canonical_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Hex SHA-256 over the canonical serialization; the idempotence key.
pub fn payload_hash(payload: &MetadataPayload) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(payload).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(image_views: Option<i64>) -> SidecarRecord {
        serde_json::from_value(json!({
            "title": "IMG_0001.jpg",
            "description": "Lake hike",
            "photoTakenTime": {"timestamp": "1700000000"},
            "creationTime": {"timestamp": "1699999000"},
            "geoData": {"latitude": 47.37, "longitude": 8.54, "altitude": 408.0},
            "imageViews": image_views,
        }))
        .unwrap()
    }

    #[test]
    fn test_unix_timestamp_to_utc_calendar_string() {
        assert_eq!(to_exif_datetime(1_700_000_000).unwrap(), "2023:11:14 22:13:20");
        assert_eq!(to_exif_datetime(0).unwrap(), "1970:01:01 00:00:00");
        // Repeated calls must not drift.
        assert_eq!(
            to_exif_datetime(1_700_000_000).unwrap(),
            to_exif_datetime(1_700_000_000).unwrap()
        );
    }

    #[test]
    fn test_translate_maps_all_fields() {
        let tags = translate(&sample_record(Some(7)), false).unwrap();

        assert_eq!(tags["XMP:Title"], json!("IMG_0001.jpg"));
        assert_eq!(tags["XMP:Description"], json!("Lake hike"));
        assert_eq!(tags["EXIF:DateTimeOriginal"], json!("2023:11:14 22:13:20"));
        assert_eq!(tags["XMP:CreateDate"], json!("2023:11:14 21:56:40"));
        assert_eq!(tags["EXIF:GPSLatitude"], json!(47.37));
        assert_eq!(tags["EXIF:GPSLongitude"], json!(8.54));
        assert_eq!(tags["EXIF:GPSAltitude"], json!(408.0));
        assert_eq!(tags["XMP:ImageViews"], json!(7));
    }

    #[test]
    fn test_missing_image_views_omitted_by_default() {
        let tags = translate(&sample_record(None), false).unwrap();
        assert!(!tags.contains_key("XMP:ImageViews"));
    }

    #[test]
    fn test_missing_image_views_rejected_when_required() {
        let err = translate(&sample_record(None), true).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField("imageViews")));
    }

    #[test]
    fn test_hash_ignores_input_key_order() {
        // Same document, keys shuffled.
        let a: SidecarRecord = serde_json::from_str(
            r#"{
                "title": "t", "description": "d",
                "photoTakenTime": {"timestamp": "1700000000"},
                "creationTime": {"timestamp": "1700000000"},
                "geoData": {"latitude": 1.0, "longitude": 2.0, "altitude": 3.0}
            }"#,
        )
        .unwrap();
        let b: SidecarRecord = serde_json::from_str(
            r#"{
                "geoData": {"altitude": 3.0, "longitude": 2.0, "latitude": 1.0},
                "creationTime": {"timestamp": "1700000000"},
                "photoTakenTime": {"timestamp": "1700000000"},
                "description": "d", "title": "t"
            }"#,
        )
        .unwrap();

        let hash_a = payload_hash(&translate(&a, false).unwrap());
        let hash_b = payload_hash(&translate(&b, false).unwrap());
        assert_eq!(hash_a, hash_b);
        assert_eq!(hash_a.len(), 64);
    }

    #[test]
    fn test_hash_changes_with_payload() {
        let base = translate(&sample_record(None), false).unwrap();
        let mut other = base.clone();
        other.insert("XMP:Title".to_string(), json!("renamed.jpg"));
        assert_ne!(payload_hash(&base), payload_hash(&other));
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        assert!(matches!(
            to_exif_datetime(i64::MAX),
            Err(SchemaError::InvalidTimestamp(_))
        ));
    }
}
