use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Sidecar problems abort the affected pair only, never the batch.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read sidecar: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid sidecar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Required field missing: {0}")]
    MissingField(&'static str),
    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

/// The fields consumed from a Takeout supplemental-metadata document. All of
/// them except `imageViews` are required; a sidecar missing one fails to
/// deserialize and the pair is reported as failed.
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarRecord {
    pub title: String,
    pub description: String,
    #[serde(rename = "photoTakenTime")]
    pub photo_taken_time: TimestampField,
    #[serde(rename = "creationTime")]
    pub creation_time: TimestampField,
    #[serde(rename = "geoData")]
    pub geo_data: GeoData,
    #[serde(
        rename = "imageViews",
        default,
        deserialize_with = "opt_string_or_number"
    )]
    pub image_views: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimestampField {
    /// Unix seconds. Takeout exports these as strings, older dumps as numbers.
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoData {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(i64),
    Text(String),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
        Some(StringOrNumber::Text(s)) => {
            s.trim().parse().map(Some).map_err(serde::de::Error::custom)
        }
    }
}

/// Reads and parses a sidecar file. `Ok(None)` means there is nothing to
/// apply: the file is gone (pairing raced a move) or holds an empty object.
pub fn load(path: &Path) -> Result<Option<SidecarRecord>, SchemaError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if value.as_object().is_some_and(|obj| obj.is_empty()) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const FULL_SIDECAR: &str = r#"{
        "title": "IMG_0001.jpg",
        "description": "Lake hike",
        "imageViews": "12",
        "photoTakenTime": {"timestamp": "1700000000", "formatted": "Nov 14, 2023"},
        "creationTime": {"timestamp": 1700000100},
        "geoData": {"latitude": 47.37, "longitude": 8.54, "altitude": 408.0}
    }"#;

    fn write_sidecar(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_full_record() {
        let dir = TempDir::new().unwrap();
        let path = write_sidecar(&dir, "a.jpg.json", FULL_SIDECAR);

        let record = load(&path).unwrap().unwrap();
        assert_eq!(record.title, "IMG_0001.jpg");
        assert_eq!(record.photo_taken_time.timestamp, 1_700_000_000);
        assert_eq!(record.creation_time.timestamp, 1_700_000_100);
        assert_eq!(record.geo_data.latitude, 47.37);
        assert_eq!(record.image_views, Some(12));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("gone.json")).unwrap().is_none());
    }

    #[test]
    fn test_load_empty_object_is_none() {
        let dir = TempDir::new().unwrap();
        let path = write_sidecar(&dir, "empty.json", "{}");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_missing_geodata_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write_sidecar(
            &dir,
            "nogeo.json",
            r#"{
                "title": "t", "description": "d",
                "photoTakenTime": {"timestamp": "1"},
                "creationTime": {"timestamp": "2"}
            }"#,
        );
        let err = load(&path).unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
        assert!(err.to_string().contains("geoData"));
    }

    #[test]
    fn test_missing_image_views_is_ok() {
        let record: SidecarRecord = serde_json::from_str(
            r#"{
                "title": "t", "description": "d",
                "photoTakenTime": {"timestamp": "1"},
                "creationTime": {"timestamp": "2"},
                "geoData": {"latitude": 0.0, "longitude": 0.0, "altitude": 0.0}
            }"#,
        )
        .unwrap();
        assert_eq!(record.image_views, None);
    }
}
