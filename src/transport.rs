//! # Upload Transmission
//!
//! Builds the multipart request for an accepted file and sends it.
//!
//! ## Wire Format
//!
//! ```text
//! POST {base_url}{target_path}
//! Content-Type: multipart/form-data; boundary=...
//! {extra headers}
//!
//! file=<file bytes, filename="<original name>">
//! {extra param}=<value>...
//! ```
//!
//! [`Transport`] is the seam between the widget and the network so the
//! widget can be driven without a server; [`HttpTransport`] is the
//! `reqwest` implementation used in browsers and natively.

use async_trait::async_trait;
use http::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use crate::config::{UploadSettings, WidgetConfig};
use crate::constants::FILE_FIELD_NAME;
use crate::errors::{AppResult, UploadError};
use crate::models::{AcquiredFile, RawResponse};
use crate::utils::upload_url;

/// Everything needed to send one upload.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub url: String,
    pub file: AcquiredFile,
    /// Extra form fields, sent after the file part in key order.
    pub fields: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl UploadRequest {
    /// Assembles the request posting `file` to `settings.base_url + target_path`.
    pub fn build(file: AcquiredFile, target_path: &str, config: &WidgetConfig, settings: &UploadSettings) -> Self {
        let fields = config
            .extra_params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();

        Self {
            url: upload_url(&settings.base_url, target_path),
            file,
            fields,
            headers: config.extra_headers.clone(),
        }
    }
}

/// Sends upload requests. Completion is reported through the returned future.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: UploadRequest) -> AppResult<RawResponse>;
}

/// `reqwest`-backed transport.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    origin: Option<Url>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative upload URLs such as `/myServer/upload` against `origin`.
    pub fn with_origin(origin: &str) -> AppResult<Self> {
        Self::with_client(reqwest::Client::new(), Some(origin))
    }

    /// Uses a preconfigured client, e.g. with timeouts or proxy settings.
    pub fn with_client(client: reqwest::Client, origin: Option<&str>) -> AppResult<Self> {
        let origin = match origin {
            Some(origin) => Some(
                Url::parse(origin).map_err(|e| UploadError::Config(format!("invalid origin {}: {}", origin, e)))?,
            ),
            None => None,
        };
        Ok(Self { client, origin })
    }

    pub fn resolve(&self, url: &str) -> AppResult<Url> {
        let resolved = match &self.origin {
            Some(origin) => origin.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| UploadError::Config(format!("invalid upload URL {}: {}", url, e)))
    }

    /// Builds the multipart body. This is where a browser file is first read.
    async fn form(file: AcquiredFile, fields: Vec<(String, String)>) -> AppResult<Form> {
        let bytes = file.content.read().await?;
        let mut part = Part::bytes(bytes).file_name(file.name);
        if let Some(content_type) = file.content_type.as_deref().filter(|ct| !ct.is_empty()) {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().part(FILE_FIELD_NAME, part);
        for (key, value) in fields {
            form = form.text(key, value);
        }
        Ok(form)
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: UploadRequest) -> AppResult<RawResponse> {
        let url = self.resolve(&request.url)?;
        let form = Self::form(request.file, request.fields).await?;

        let response = self
            .client
            .post(url)
            .headers(request.headers)
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> UploadSettings {
        UploadSettings {
            max_file_size: 1_000,
            base_url: "https://api.example.com".to_string(),
        }
    }

    #[test]
    fn build_composes_url_fields_and_headers() {
        let config = WidgetConfig::new()
            .with_target_path("/upload")
            .with_param("folder", "docs")
            .with_param("version", 2)
            .with_header("X-Token", "abc")
            .unwrap();

        let request = UploadRequest::build(AcquiredFile::new("a.pdf", vec![1]), "/upload", &config, &settings());

        assert_eq!(request.url, "https://api.example.com/upload");
        assert_eq!(
            request.fields,
            vec![
                ("folder".to_string(), "docs".to_string()),
                ("version".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(request.headers["x-token"], "abc");
    }

    #[test]
    fn build_without_params_has_no_fields() {
        let config = WidgetConfig::new().with_target_path("/files");
        let request = UploadRequest::build(AcquiredFile::new("a.pdf", vec![]), "/files", &config, &settings());
        assert!(request.fields.is_empty());
        assert!(request.headers.is_empty());
    }

    #[test]
    fn relative_urls_resolve_against_origin() {
        let transport = HttpTransport::with_origin("https://app.example.com/page").unwrap();
        assert_eq!(
            transport.resolve("/myServer/upload").unwrap().as_str(),
            "https://app.example.com/myServer/upload"
        );
    }

    #[test]
    fn relative_urls_without_origin_are_rejected() {
        assert!(matches!(
            HttpTransport::new().resolve("/myServer/upload"),
            Err(UploadError::Config(_))
        ));
    }
}
