//! # Utility Functions
//!
//! Small helpers shared by the widget and its hosts: identifiers for
//! widgets and synthetic forms, upload URL composition and `data:` URLs for
//! blob responses opened outside a browser.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

/// Generates a unique identifier for a widget instance or a synthetic form.
///
/// The identifier is `{timestamp_millis}-{uuid_v4}`, so identifiers sort by
/// creation time and never collide between acquisitions.
pub fn generate_unique_identifier() -> String {
    let uuid_part = Uuid::new_v4().to_string();
    let timestamp = Utc::now().timestamp_millis();
    format!("{}-{}", timestamp, uuid_part)
}

/// Composes the upload URL. The base URL and target path are concatenated
/// as-is, so `"/myServer"` and `"/upload"` give `"/myServer/upload"`.
pub fn upload_url(base_url: &str, target_path: &str) -> String {
    format!("{}{}", base_url, target_path)
}

/// Encodes `bytes` as a `data:` URL of the given MIME type.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
