//! # Configuration Management
//!
//! Two layers of configuration drive the widget:
//!
//! 1. **[`UploadSettings`]**: process-wide values (size ceiling, base URL)
//!    installed once at startup and read by every widget.
//! 2. **[`WidgetConfig`]**: per-widget values (target path, allowed
//!    extensions, callbacks, extra fields and headers, trigger mode),
//!    fixed for the widget's lifetime.
//!
//! Host pages describe widgets through `file-*` attributes; these are
//! captured by [`WidgetAttributes`] and converted with
//! [`WidgetConfig::from_attributes`]. Callbacks are never resolved by
//! name: the embedding code passes typed closures.
//!
//! ## Example
//!
//! ```rust
//! use file_upload_widget::config::{TriggerMode, WidgetConfig};
//!
//! let config = WidgetConfig::new()
//!     .with_target_path("/upload")
//!     .with_allowed_extensions(["pdf", "png"])
//!     .with_trigger_mode(TriggerMode::Both);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use http::header::{HeaderMap, HeaderName, HeaderValue};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_MAX_FILE_SIZE};
use crate::errors::{AppResult, UploadError};
use crate::models::{AcquiredFile, RawResponse};

static SETTINGS: OnceLock<Arc<UploadSettings>> = OnceLock::new();

/// Process-wide upload settings.
///
/// All fields are public so deployments can build the value directly;
/// [`UploadSettings::from_json`] covers the case where the page ships the
/// settings as a JSON blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Maximum allowed file size in bytes.
    /// Larger files are rejected before any request is issued.
    pub max_file_size: u64,

    /// Prefix of every upload URL. A widget posts to `base_url + target_path`.
    pub base_url: String,
}

impl Default for UploadSettings {
    /// 500KB ceiling and the `/myServer` placeholder base URL.
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl UploadSettings {
    /// Parses settings from JSON, falling back to defaults for missing fields.
    ///
    /// # Configuration Format
    ///
    /// ```json
    /// {
    ///   "max_file_size": 500000,
    ///   "base_url": "/myServer"
    /// }
    /// ```
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let settings: Self = serde_json::from_str(raw)?;
        Ok(settings)
    }
}

/// Installs the process-wide settings.
///
/// Only the first call takes effect; later calls return the settings that
/// were already installed.
pub fn init_settings(settings: UploadSettings) -> Arc<UploadSettings> {
    SETTINGS.get_or_init(|| Arc::new(settings)).clone()
}

/// Returns the installed settings, or the defaults when none were installed.
pub fn settings() -> Arc<UploadSettings> {
    match SETTINGS.get() {
        Some(settings) => settings.clone(),
        None => Arc::new(UploadSettings::default()),
    }
}

/// Which user gestures start an acquisition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    #[default]
    Click,
    Drop,
    Both,
}

impl TriggerMode {
    pub fn binds_click(self) -> bool {
        matches!(self, TriggerMode::Click | TriggerMode::Both)
    }

    pub fn binds_drop(self) -> bool {
        matches!(self, TriggerMode::Drop | TriggerMode::Both)
    }
}

impl FromStr for TriggerMode {
    type Err = UploadError;

    /// An empty value means click, matching an element without `file-event`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "click" => Ok(TriggerMode::Click),
            "drop" => Ok(TriggerMode::Drop),
            "both" => Ok(TriggerMode::Both),
            other => Err(UploadError::Config(format!("unknown trigger mode: {}", other))),
        }
    }
}

/// Called with the acquired file when no target path is configured.
pub type PreActionCallback = Rc<dyn Fn(&AcquiredFile)>;

/// Called with the raw response of a successful upload.
pub type SuccessCallback = Rc<dyn Fn(&RawResponse)>;

/// Per-widget configuration, immutable once the widget is built.
#[derive(Clone, Default)]
pub struct WidgetConfig {
    pub target_path: Option<String>,
    pub allowed_extensions: Vec<String>,
    pub pre_action: Option<PreActionCallback>,
    pub on_success: Option<SuccessCallback>,
    pub blob_response_mime: Option<String>,
    pub extra_params: serde_json::Map<String, serde_json::Value>,
    pub extra_headers: HeaderMap,
    pub trigger_mode: TriggerMode,
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("target_path", &self.target_path)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("pre_action", &self.pre_action.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("blob_response_mime", &self.blob_response_mime)
            .field("extra_params", &self.extra_params)
            .field("extra_headers", &self.extra_headers)
            .field("trigger_mode", &self.trigger_mode)
            .finish()
    }
}

impl WidgetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_path(mut self, path: impl Into<String>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    /// Extensions are stored lowercase without a leading dot.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    pub fn with_pre_action(mut self, callback: impl Fn(&AcquiredFile) + 'static) -> Self {
        self.pre_action = Some(Rc::new(callback));
        self
    }

    pub fn with_success_callback(mut self, callback: impl Fn(&RawResponse) + 'static) -> Self {
        self.on_success = Some(Rc::new(callback));
        self
    }

    pub fn with_blob_response(mut self, mime: impl Into<String>) -> Self {
        self.blob_response_mime = Some(mime.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    /// Adds a precomputed header value, rejecting names or values HTTP cannot carry.
    pub fn with_header(mut self, name: &str, value: &str) -> AppResult<Self> {
        let (name, value) = parse_header(name, value)?;
        self.extra_headers.insert(name, value);
        Ok(self)
    }

    pub fn with_trigger_mode(mut self, mode: TriggerMode) -> Self {
        self.trigger_mode = mode;
        self
    }

    /// Checks that the widget has something to do with an accepted file.
    ///
    /// # Errors
    ///
    /// - `Config`: neither a target path nor a pre-action callback is set
    /// - `Config`: the target path is present but empty
    pub fn validate(&self) -> AppResult<()> {
        match (&self.target_path, &self.pre_action) {
            (None, None) => Err(UploadError::Config(
                "either a target path or a pre-action callback is required".to_string(),
            )),
            (Some(path), _) if path.trim().is_empty() => {
                Err(UploadError::Config("target path must not be empty".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Builds a configuration from host attributes. Callbacks are attached
    /// afterwards with the `with_*` builders.
    pub fn from_attributes(attributes: &WidgetAttributes) -> AppResult<Self> {
        let mut config = WidgetConfig::new();

        config.target_path = attributes
            .file_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string);

        if let Some(raw) = attributes.file_extensions.as_deref() {
            config.allowed_extensions = parse_extensions(raw);
        }

        config.blob_response_mime = attributes
            .file_blob_response
            .as_deref()
            .filter(|mime| !mime.trim().is_empty())
            .map(str::to_string);

        if let Some(raw) = attributes.file_params.as_deref() {
            // Only an object contributes fields, anything else is ignored.
            if let serde_json::Value::Object(params) = serde_json::from_str(raw)? {
                config.extra_params = params;
            }
        }

        if let Some(raw) = attributes.file_headers.as_deref() {
            if let serde_json::Value::Object(headers) = serde_json::from_str(raw)? {
                for (name, value) in headers {
                    let value = match value {
                        serde_json::Value::String(text) => text,
                        other => other.to_string(),
                    };
                    let (name, value) = parse_header(&name, &value)?;
                    config.extra_headers.insert(name, value);
                }
            }
        }

        if let Some(raw) = attributes.file_event.as_deref() {
            config.trigger_mode = raw.parse()?;
        }

        Ok(config)
    }
}

/// Raw `file-*` attributes read from the host element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WidgetAttributes {
    pub file_path: Option<String>,
    pub file_extensions: Option<String>,
    pub file_blob_response: Option<String>,
    pub file_params: Option<String>,
    pub file_headers: Option<String>,
    pub file_event: Option<String>,
}

/// Parses an extension list attribute such as `"[jpg, PNG, .gif]"`.
///
/// Every alphanumeric run becomes one lowercase extension.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();

    match TOKEN.get_or_init(|| Regex::new("[A-Za-z0-9]+").ok()) {
        Some(token) => token
            .find_iter(raw)
            .map(|m| m.as_str().to_lowercase())
            .collect(),
        None => Vec::new(),
    }
}

fn parse_header(name: &str, value: &str) -> AppResult<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| UploadError::Config(format!("invalid header name {}: {}", name, e)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| UploadError::Config(format!("invalid value for header {}: {}", name, e)))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = UploadSettings::default();
        assert_eq!(settings.max_file_size, 500_000);
        assert_eq!(settings.base_url, "/myServer");
    }

    #[test]
    fn settings_json_fills_missing_fields() {
        let settings = UploadSettings::from_json(r#"{"base_url":"https://api.example.com"}"#).unwrap();
        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn settings_json_rejects_garbage() {
        assert!(matches!(UploadSettings::from_json("nope"), Err(UploadError::Config(_))));
    }

    #[test]
    fn trigger_mode_parsing() {
        assert_eq!("".parse::<TriggerMode>().unwrap(), TriggerMode::Click);
        assert_eq!("drop".parse::<TriggerMode>().unwrap(), TriggerMode::Drop);
        assert_eq!("Both".parse::<TriggerMode>().unwrap(), TriggerMode::Both);
        assert!("hover".parse::<TriggerMode>().is_err());
    }

    #[test]
    fn trigger_mode_bindings() {
        assert!(TriggerMode::Click.binds_click() && !TriggerMode::Click.binds_drop());
        assert!(!TriggerMode::Drop.binds_click() && TriggerMode::Drop.binds_drop());
        assert!(TriggerMode::Both.binds_click() && TriggerMode::Both.binds_drop());
    }

    #[test]
    fn parse_extensions_accepts_bracketed_lists() {
        assert_eq!(parse_extensions("[jpg, PNG, .gif]"), vec!["jpg", "png", "gif"]);
        assert!(parse_extensions("[]").is_empty());
    }

    #[test]
    fn validate_requires_an_action() {
        assert!(matches!(WidgetConfig::new().validate(), Err(UploadError::Config(_))));
        assert!(WidgetConfig::new().with_pre_action(|_| {}).validate().is_ok());
        assert!(WidgetConfig::new().with_target_path("  ").validate().is_err());
    }

    #[test]
    fn header_values_are_checked_up_front() {
        assert!(WidgetConfig::new().with_header("X-Token", "abc").is_ok());
        assert!(WidgetConfig::new().with_header("bad header", "abc").is_err());
        assert!(WidgetConfig::new().with_header("X-Token", "line\nbreak").is_err());
    }

    #[test]
    fn from_attributes_reads_every_field() {
        let attributes = WidgetAttributes {
            file_path: Some("/upload".to_string()),
            file_extensions: Some("[pdf, png]".to_string()),
            file_blob_response: Some("application/pdf".to_string()),
            file_params: Some(r#"{"folder":"docs","version":2}"#.to_string()),
            file_headers: Some(r#"{"X-Token":"abc"}"#.to_string()),
            file_event: Some("both".to_string()),
        };

        let config = WidgetConfig::from_attributes(&attributes).unwrap();
        assert_eq!(config.target_path.as_deref(), Some("/upload"));
        assert_eq!(config.allowed_extensions, vec!["pdf", "png"]);
        assert_eq!(config.blob_response_mime.as_deref(), Some("application/pdf"));
        assert_eq!(config.extra_params["folder"], "docs");
        assert_eq!(config.extra_headers["x-token"], "abc");
        assert_eq!(config.trigger_mode, TriggerMode::Both);
    }

    #[test]
    fn from_attributes_ignores_non_object_params() {
        let attributes = WidgetAttributes {
            file_path: Some("/upload".to_string()),
            file_params: Some("[1, 2]".to_string()),
            ..Default::default()
        };
        let config = WidgetConfig::from_attributes(&attributes).unwrap();
        assert!(config.extra_params.is_empty());
    }

    #[test]
    fn attributes_deserialize_from_kebab_case() {
        let attributes: WidgetAttributes =
            serde_json::from_str(r#"{"file-path":"/upload","file-event":"drop"}"#).unwrap();
        assert_eq!(attributes.file_path.as_deref(), Some("/upload"));
        assert_eq!(attributes.file_event.as_deref(), Some("drop"));
    }
}
