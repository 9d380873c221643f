use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

/// Content of an acquired file.
///
/// Browser files stay unread until the upload is sent, so a file rejected by
/// size is never copied into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileContent {
    Bytes(Vec<u8>),
    #[cfg(target_arch = "wasm32")]
    Browser(web_sys::File),
}

impl FileContent {
    /// Reads the whole content.
    ///
    /// # Errors
    ///
    /// - `Host`: the browser could not read the file
    pub async fn read(self) -> AppResult<Vec<u8>> {
        match self {
            FileContent::Bytes(bytes) => Ok(bytes),
            #[cfg(target_arch = "wasm32")]
            FileContent::Browser(file) => {
                let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
                    .await
                    .map_err(|e| crate::errors::UploadError::Host(format!("reading {}: {:?}", file.name(), e)))?;
                Ok(js_sys::Uint8Array::new(&buffer).to_vec())
            }
        }
    }
}

/// A file picked from the native chooser or dropped onto the widget.
///
/// Owned by the acquisition that produced it and dropped once the upload
/// attempt finishes or validation rejects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcquiredFile {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub content: FileContent,
}

impl AcquiredFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: None,
            content: FileContent::Bytes(bytes),
        }
    }

    /// Wraps a browser file without reading it.
    #[cfg(target_arch = "wasm32")]
    pub fn from_browser(file: web_sys::File) -> Self {
        let content_type = Some(file.type_()).filter(|ct| !ct.is_empty());
        Self {
            name: file.name(),
            size: file.size() as u64,
            content_type,
            content: FileContent::Browser(file),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Status and body of a completed upload request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// How an interaction ended when it did not fail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The chooser closed without a selection.
    Cancelled,
    /// The gesture is not bound on this widget, or the widget was torn down.
    Ignored,
    /// No target path: the file went to the pre-action callback.
    Handed { file_name: String },
    /// The server accepted the upload.
    Uploaded { status: u16, opened_url: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_defaults_to_content_length() {
        let file = AcquiredFile::new("a.txt", b"hello".to_vec());
        assert_eq!(file.size, 5);
    }

    #[test]
    fn in_memory_content_reads_back() {
        let file = AcquiredFile::new("a.txt", b"hello".to_vec());
        let bytes = futures::executor::block_on(file.content.read()).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn response_body_helpers() {
        let response = RawResponse::new(200, r#"{"url":"https://example.com/f"}"#);
        assert_eq!(response.json().unwrap()["url"], "https://example.com/f");
        assert!(response.text().contains("example.com"));
    }
}
