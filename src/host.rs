//! # Host Integration
//!
//! The widget never touches a document or window directly. Everything it
//! needs from the page goes through the [`Host`] trait:
//!
//! - **Synthetic form**: mount the hidden form whose input opens the native
//!   file chooser, and remove it again
//! - **Drag feedback**: toggle the highlight class on the bound element
//! - **New contexts**: open a returned link or a blob response
//! - **Error reporting**: surface user-facing messages
//!
//! [`HeadlessHost`] implements the trait in memory. It backs native use and
//! tests; the browser implementation lives in `web` and is only built for
//! `wasm32`.

use std::cell::RefCell;

use crate::errors::AppResult;
use crate::utils::data_url;

/// Page-side operations the widget depends on.
pub trait Host {
    /// Removes any synthetic form left in the document, mounts a fresh one
    /// tagged with `token` and opens the native file chooser from it.
    fn mount_file_form(&self, token: &str) -> AppResult<()>;

    /// Removes the synthetic form if it is still the one tagged with `token`.
    fn remove_file_form(&self, token: &str);

    /// Adds or removes the drag highlight. Repeated calls are harmless.
    fn set_highlight(&self, active: bool);

    /// Opens `url` in a new browsing context.
    fn open_url(&self, url: &str) -> AppResult<()>;

    /// Opens `bytes` as a blob of type `mime` in a new context named `file_name`.
    fn open_blob(&self, bytes: &[u8], mime: &str, file_name: &str) -> AppResult<()>;

    /// Shows a user-facing error message.
    fn report_error(&self, message: &str);
}

/// A context opened by [`HeadlessHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedContext {
    pub url: String,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    forms: Vec<String>,
    choosers_opened: usize,
    highlighted: bool,
    opened: Vec<OpenedContext>,
    errors: Vec<String>,
}

/// In-memory [`Host`] that records every interaction.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    state: RefCell<HeadlessState>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of the synthetic forms currently in the document.
    pub fn forms(&self) -> Vec<String> {
        self.state.borrow().forms.clone()
    }

    pub fn choosers_opened(&self) -> usize {
        self.state.borrow().choosers_opened
    }

    pub fn is_highlighted(&self) -> bool {
        self.state.borrow().highlighted
    }

    pub fn opened(&self) -> Vec<OpenedContext> {
        self.state.borrow().opened.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }
}

impl Host for HeadlessHost {
    fn mount_file_form(&self, token: &str) -> AppResult<()> {
        let mut state = self.state.borrow_mut();
        state.forms.clear();
        state.forms.push(token.to_string());
        state.choosers_opened += 1;
        Ok(())
    }

    fn remove_file_form(&self, token: &str) {
        self.state.borrow_mut().forms.retain(|form| form != token);
    }

    fn set_highlight(&self, active: bool) {
        self.state.borrow_mut().highlighted = active;
    }

    fn open_url(&self, url: &str) -> AppResult<()> {
        self.state.borrow_mut().opened.push(OpenedContext {
            url: url.to_string(),
            name: None,
        });
        Ok(())
    }

    fn open_blob(&self, bytes: &[u8], mime: &str, file_name: &str) -> AppResult<()> {
        self.state.borrow_mut().opened.push(OpenedContext {
            url: data_url(mime, bytes),
            name: Some(file_name.to_string()),
        });
        Ok(())
    }

    fn report_error(&self, message: &str) {
        self.state.borrow_mut().errors.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounting_replaces_a_stale_form() {
        let host = HeadlessHost::new();
        host.mount_file_form("a").unwrap();
        host.mount_file_form("b").unwrap();
        assert_eq!(host.forms(), vec!["b".to_string()]);
        assert_eq!(host.choosers_opened(), 2);
    }

    #[test]
    fn removing_with_a_stale_token_keeps_the_current_form() {
        let host = HeadlessHost::new();
        host.mount_file_form("a").unwrap();
        host.mount_file_form("b").unwrap();
        host.remove_file_form("a");
        assert_eq!(host.forms(), vec!["b".to_string()]);
        host.remove_file_form("b");
        assert!(host.forms().is_empty());
    }

    #[test]
    fn blobs_open_as_data_urls() {
        let host = HeadlessHost::new();
        host.open_blob(b"hi", "text/plain", "notes.txt").unwrap();
        assert_eq!(
            host.opened(),
            vec![OpenedContext {
                url: "data:text/plain;base64,aGk=".to_string(),
                name: Some("notes.txt".to_string()),
            }]
        );
    }
}
