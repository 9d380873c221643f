//! # Application Constants
//!
//! This module defines constants shared by the upload widget: default
//! settings, the names used on the wire and in the DOM, and the
//! localization keys used for user-facing errors.
//!
//! ## Defaults
//!
//! Values used when the embedding application does not install its own
//! [`UploadSettings`](crate::config::UploadSettings).
//!
//! ## DOM Names
//!
//! Identifiers of the synthetic form used to open the native file chooser.
//! They must stay stable because a new acquisition looks up and removes a
//! stale form by id.

use std::ops::RangeInclusive;

/// Default maximum file size (500KB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500_000;

/// Default base URL prepended to every widget target path
pub const DEFAULT_BASE_URL: &str = "/myServer";

/// Multipart field carrying the file payload
pub const FILE_FIELD_NAME: &str = "file";

/// DOM id of the synthetic form
pub const PENDING_FORM_ID: &str = "formFileId";

/// DOM id of the file input inside the synthetic form
pub const FILE_INPUT_ID: &str = "fileField";

/// Data attribute carrying the token of the acquisition that created the form
pub const FORM_TOKEN_ATTRIBUTE: &str = "data-upload-token";

/// CSS class applied while a drag hovers the bound element
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Statuses treated as a successful upload
pub const SUCCESS_STATUSES: RangeInclusive<u16> = 200..=208;

/// Status carrying server-side validation errors
pub const CONFLICT_STATUS: u16 = 409;

/// Field of a success body holding a link to open
pub const RESPONSE_URL_FIELD: &str = "url";

/// Field of a conflict body holding the validation errors
pub const RESPONSE_ERRORS_FIELD: &str = "errors";

/// Localization key for the bad extension error
pub const KEY_BAD_FILE_EXT: &str = "BAD_FILE_EXT";

/// Localization key for the allowed extensions hint
pub const KEY_FILE_EXT_ADMITTED: &str = "FILE_EXT_ADMITTED";

/// Localization key for the size ceiling error
pub const KEY_MAX_FILE_SIZE: &str = "MAX_FILE_SIZE";

/// Language used when none is requested
pub const DEFAULT_LANGUAGE: &str = "en";
