// src/event.rs

use serde::Deserialize;
use std::fmt;

/// One uploaded image, identified by its bucket and object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Bucket notification payload, in the S3 event shape. Fields this service
/// does not read (event name, timestamps, requester) are ignored.
#[derive(Debug, Deserialize, Default)]
pub struct UploadNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationRecord {
    #[serde(default)]
    pub s3: Option<S3Entity>,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub bucket: Option<BucketEntity>,
    #[serde(default)]
    pub object: Option<ObjectEntity>,
}

#[derive(Debug, Deserialize)]
pub struct BucketEntity {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectEntity {
    #[serde(default)]
    pub key: Option<String>,
}

impl UploadNotification {
    /// Extracts one `ImageReference` per usable record. Records missing the
    /// bucket name or object key are skipped, so a malformed notification
    /// yields an empty list rather than an error.
    pub fn image_references(&self) -> Vec<ImageReference> {
        self.records
            .iter()
            .filter_map(NotificationRecord::image_reference)
            .collect()
    }
}

impl NotificationRecord {
    fn image_reference(&self) -> Option<ImageReference> {
        let s3 = self.s3.as_ref()?;
        let bucket = s3.bucket.as_ref()?.name.as_ref()?;
        let key = s3.object.as_ref()?.key.as_ref()?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(ImageReference {
            bucket: bucket.clone(),
            key: key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_standard_upload_notification() {
        let payload = serde_json::json!({
            "Records": [{
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "guest-uploads" },
                    "object": { "key": "cam7/visitor.jpg", "size": 48213 }
                }
            }]
        });

        let notification: UploadNotification = serde_json::from_value(payload).unwrap();
        let references = notification.image_references();
        assert_eq!(
            references,
            vec![ImageReference {
                bucket: "guest-uploads".to_string(),
                key: "cam7/visitor.jpg".to_string(),
            }]
        );
    }

    #[test]
    fn notification_without_records_yields_nothing() {
        let notification: UploadNotification = serde_json::from_str("{}").unwrap();
        assert!(notification.image_references().is_empty());
    }

    #[test]
    fn records_missing_bucket_or_key_are_skipped() {
        let payload = serde_json::json!({
            "Records": [
                { "s3": { "bucket": { "name": "guest-uploads" } } },
                { "s3": { "object": { "key": "visitor.jpg" } } },
                { "s3": { "bucket": { "name": "" }, "object": { "key": "visitor.jpg" } } },
                { "eventName": "ObjectCreated:Put" }
            ]
        });

        let notification: UploadNotification = serde_json::from_value(payload).unwrap();
        assert!(notification.image_references().is_empty());
    }

    #[test]
    fn usable_records_survive_malformed_neighbours() {
        let payload = serde_json::json!({
            "Records": [
                { "s3": {} },
                { "s3": {
                    "bucket": { "name": "guest-uploads" },
                    "object": { "key": "a.jpg" }
                } }
            ]
        });

        let notification: UploadNotification = serde_json::from_value(payload).unwrap();
        assert_eq!(notification.image_references().len(), 1);
    }
}
