//! # File Upload Widget
//!
//! Turns any clickable or drop-target element into a file picker and
//! uploader. A chosen or dropped file is checked against an extension
//! allow-list and a size ceiling, then posted as `multipart/form-data` to a
//! configurable endpoint; the response is routed to caller callbacks.
//!
//! ## Architecture
//!
//! - **Config**: process-wide [`UploadSettings`] and per-widget [`WidgetConfig`]
//! - **Selector**: bound events, the synthetic form guard and drag highlight
//! - **Validator**: extension pattern and size checks
//! - **Transport**: multipart request construction and sending (`reqwest`)
//! - **Router**: status-based response dispatch
//! - **Widget**: [`UploadWidget`] composing the above for one element
//! - **Host**: the page seam; [`HeadlessHost`] in memory, `web::BrowserHost` on `wasm32`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use file_upload_widget::{HeadlessHost, HttpTransport, UploadWidget, WidgetConfig};
//!
//! # fn main() -> file_upload_widget::AppResult<()> {
//! let config = WidgetConfig::new()
//!     .with_target_path("/upload")
//!     .with_allowed_extensions(["pdf", "png"])
//!     .with_success_callback(|response| println!("uploaded: {}", response.status));
//!
//! let widget = UploadWidget::new(config, Rc::new(HeadlessHost::new()), HttpTransport::new())?;
//! widget.bind();
//! widget.handle_click()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod host;
pub mod i18n;
pub mod logging;
pub mod models;
pub mod router;
pub mod selector;
pub mod transport;
pub mod utils;
pub mod validator;
pub mod widget;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{init_settings, settings, TriggerMode, UploadSettings, WidgetAttributes, WidgetConfig};
pub use errors::{AppResult, UploadError, ValidationError};
pub use host::{HeadlessHost, Host};
pub use models::{AcquiredFile, FileContent, RawResponse, UploadOutcome};
pub use selector::DomEvent;
pub use transport::{HttpTransport, Transport, UploadRequest};
pub use widget::UploadWidget;
