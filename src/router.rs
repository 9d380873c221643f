//! # Response Routing
//!
//! Dispatches a completed upload by status code:
//!
//! - **200–208**: success callback, or blob response, then open the `url`
//!   field of a JSON object body if there is one
//! - **409**: server-side validation errors, reported as one message
//! - **anything else**: reported as a transmission failure
//!
//! ## Example Flow
//!
//! ```text
//! 200 {"url":"https://example.com/f"}
//! ↓
//! route()
//! ↓
//! Host::open_url("https://example.com/f")
//! ```

use http::StatusCode;

use crate::config::SuccessCallback;
use crate::constants::{CONFLICT_STATUS, RESPONSE_ERRORS_FIELD, RESPONSE_URL_FIELD, SUCCESS_STATUSES};
use crate::errors::{AppResult, UploadError};
use crate::host::Host;
use crate::log_data;
use crate::logging::Logger;
use crate::models::{RawResponse, UploadOutcome};

/// Routes one response on behalf of a widget.
pub struct ResponseRouter<'a> {
    pub host: &'a dyn Host,
    pub logger: &'a Logger,
    pub on_success: Option<&'a SuccessCallback>,
    pub blob_response_mime: Option<&'a str>,
    /// Name of the uploaded file, used to name a blob context.
    pub file_name: &'a str,
}

impl ResponseRouter<'_> {
    /// Handles a completed request.
    ///
    /// # Returns
    ///
    /// `Uploaded` for a success status, with the link opened from the body if any.
    ///
    /// # Errors
    ///
    /// - `Conflict`: status 409; the joined server errors were already reported
    /// - `Transmission`: any status outside 200–208 and 409, already reported
    pub fn route(&self, response: &RawResponse) -> AppResult<UploadOutcome> {
        match response.status {
            status if SUCCESS_STATUSES.contains(&status) => self.on_success(response),
            CONFLICT_STATUS => {
                let message = conflict_message(response);
                self.logger.error("Upload rejected by server", log_data!("errors" => message));
                self.host.report_error(&message);
                Err(UploadError::Conflict { message })
            }
            status => {
                let error = UploadError::Transmission { status };
                self.logger.warn("Upload failed", log_data!("status" => status, "body" => response.text()));
                self.host.report_error(&error.to_string());
                Err(error)
            }
        }
    }

    fn on_success(&self, response: &RawResponse) -> AppResult<UploadOutcome> {
        if let Some(callback) = self.on_success {
            callback(response);
        } else if let Some(mime) = self.blob_response_mime {
            if let Err(e) = self.host.open_blob(&response.body, mime, self.file_name) {
                self.logger.warn(
                    "Could not open blob response",
                    log_data!("mime" => mime, "file_name" => self.file_name, "error" => e.to_string()),
                );
                self.host.report_error(&e.to_string());
            }
        }

        let opened_url = response_url(response);
        if let Some(url) = &opened_url {
            // Best effort: a blocked popup does not fail the upload.
            if let Err(e) = self.host.open_url(url) {
                self.logger.warn("Could not open response URL", log_data!("url" => url, "error" => e.to_string()));
            }
        }

        self.logger.info(
            "Upload completed",
            log_data!("status" => response.status, "opened_url" => opened_url),
        );
        Ok(UploadOutcome::Uploaded {
            status: response.status,
            opened_url,
        })
    }
}

/// The string `url` field of a JSON object body. Anything else yields `None`.
pub fn response_url(response: &RawResponse) -> Option<String> {
    let body = response.json().ok()?;
    body.get(RESPONSE_URL_FIELD)?.as_str().map(str::to_string)
}

/// Joins the `errors` of a conflict body, one per line, each line terminated
/// by `\n`. `errors` may be an array or an object; strings are used as-is and
/// other values as JSON text.
///
/// A body without usable errors falls back to its trimmed text, then to the
/// status reason, so the message is never empty.
pub fn conflict_message(response: &RawResponse) -> String {
    let joined: String = response
        .json()
        .map(|body| error_values(&body))
        .unwrap_or_default()
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(text) => format!("{}\n", text),
            other => format!("{}\n", other),
        })
        .collect();

    if !joined.is_empty() {
        return joined;
    }

    let text = response.text();
    if !text.trim().is_empty() {
        return text.trim().to_string();
    }

    StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}

fn error_values(body: &serde_json::Value) -> Vec<serde_json::Value> {
    match body.get(RESPONSE_ERRORS_FIELD) {
        Some(serde_json::Value::Array(items)) => items.clone(),
        Some(serde_json::Value::Object(map)) => map.values().cloned().collect(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    }
}
