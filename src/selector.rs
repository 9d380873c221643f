//! # File Selection
//!
//! Acquisition state for one widget: which DOM events are bound, the
//! synthetic form opened by the last click, and the drag highlight.
//!
//! ## Pending Form Lifecycle
//!
//! ```text
//! click → PendingForm::open (stale form removed, new one mounted, chooser opened)
//!       → files selected / cancelled → guard dropped → form removed
//! teardown → guard dropped → form removed
//! ```
//!
//! The guard is tagged with a fresh token, so an old guard released after a
//! newer click leaves the newer form in place.

use std::rc::Rc;

use crate::config::TriggerMode;
use crate::errors::AppResult;
use crate::host::Host;
use crate::models::AcquiredFile;
use crate::utils::generate_unique_identifier;

/// DOM events the widget listens to on its element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Click,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
}

impl DomEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            DomEvent::Click => "click",
            DomEvent::DragEnter => "dragenter",
            DomEvent::DragOver => "dragover",
            DomEvent::DragLeave => "dragleave",
            DomEvent::Drop => "drop",
        }
    }

    /// Events to bind for a trigger mode.
    pub fn bindings(mode: TriggerMode) -> Vec<DomEvent> {
        let mut events = Vec::new();
        if mode.binds_drop() {
            events.extend([
                DomEvent::Drop,
                DomEvent::DragEnter,
                DomEvent::DragOver,
                DomEvent::DragLeave,
            ]);
        }
        if mode.binds_click() {
            events.push(DomEvent::Click);
        }
        events
    }
}

/// Scoped handle on the synthetic form. Dropping it removes the form.
pub struct PendingForm {
    host: Rc<dyn Host>,
    token: String,
}

impl PendingForm {
    /// Mounts a new synthetic form and opens the native chooser.
    pub fn open(host: Rc<dyn Host>) -> AppResult<Self> {
        let token = generate_unique_identifier();
        host.mount_file_form(&token)?;
        Ok(Self { host, token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for PendingForm {
    fn drop(&mut self) {
        self.host.remove_file_form(&self.token);
    }
}

/// Per-widget acquisition state.
#[derive(Default)]
pub struct Selector {
    bound: Vec<DomEvent>,
    pending: Option<PendingForm>,
    highlighted: bool,
}

impl Selector {
    pub fn bind(&mut self, mode: TriggerMode) -> Vec<DomEvent> {
        self.bound = DomEvent::bindings(mode);
        self.bound.clone()
    }

    pub fn is_bound(&self, event: DomEvent) -> bool {
        self.bound.contains(&event)
    }

    pub fn bound(&self) -> &[DomEvent] {
        &self.bound
    }

    /// Replaces any pending form with a fresh one.
    pub fn begin_click(&mut self, host: Rc<dyn Host>) -> AppResult<()> {
        // Release the previous form before mounting so at most one exists.
        self.pending = None;
        self.pending = Some(PendingForm::open(host)?);
        Ok(())
    }

    /// Takes the pending form if it is the one tagged with `token`. A
    /// selection from a replaced form leaves the newer form alone.
    pub fn take_pending(&mut self, token: &str) -> Option<PendingForm> {
        if self.pending_token() == Some(token) {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn pending_token(&self) -> Option<&str> {
        self.pending.as_ref().map(PendingForm::token)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_highlight(&mut self, host: &dyn Host, active: bool) {
        self.highlighted = active;
        host.set_highlight(active);
    }

    /// Unbinds every event, drops the pending form and clears the highlight.
    /// Returns the events that were bound.
    pub fn unbind(&mut self, host: &dyn Host) -> Vec<DomEvent> {
        self.pending = None;
        if self.highlighted {
            self.set_highlight(host, false);
        }
        std::mem::take(&mut self.bound)
    }

    /// Keeps the first file of a selection; the rest are ignored.
    pub fn first_file(files: Vec<AcquiredFile>) -> Option<AcquiredFile> {
        files.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    #[test]
    fn bindings_follow_trigger_mode() {
        assert_eq!(DomEvent::bindings(TriggerMode::Click), vec![DomEvent::Click]);
        assert_eq!(DomEvent::bindings(TriggerMode::Drop).len(), 4);
        assert!(!DomEvent::bindings(TriggerMode::Drop).contains(&DomEvent::Click));
        assert_eq!(DomEvent::bindings(TriggerMode::Both).len(), 5);
    }

    #[test]
    fn dropping_the_guard_removes_the_form() {
        let host = Rc::new(HeadlessHost::new());
        let form = PendingForm::open(host.clone()).unwrap();
        assert_eq!(host.forms(), vec![form.token().to_string()]);
        drop(form);
        assert!(host.forms().is_empty());
    }

    #[test]
    fn repeated_clicks_keep_a_single_form() {
        let host = Rc::new(HeadlessHost::new());
        let mut selector = Selector::default();
        for _ in 0..5 {
            selector.begin_click(host.clone()).unwrap();
            assert_eq!(host.forms().len(), 1);
        }
        assert_eq!(host.choosers_opened(), 5);
    }

    #[test]
    fn stale_token_does_not_take_the_newer_form() {
        let host = Rc::new(HeadlessHost::new());
        let mut selector = Selector::default();
        selector.begin_click(host.clone()).unwrap();
        let first = selector.pending_token().unwrap().to_string();
        selector.begin_click(host.clone()).unwrap();
        let second = selector.pending_token().unwrap().to_string();

        assert!(selector.take_pending(&first).is_none());
        assert_eq!(host.forms(), vec![second.clone()]);

        drop(selector.take_pending(&second));
        assert!(host.forms().is_empty());
    }

    #[test]
    fn unbind_clears_everything() {
        let host = Rc::new(HeadlessHost::new());
        let mut selector = Selector::default();
        selector.bind(TriggerMode::Both);
        selector.begin_click(host.clone()).unwrap();
        selector.set_highlight(&*host, true);

        let unbound = selector.unbind(&*host);
        assert_eq!(unbound.len(), 5);
        assert!(selector.bound().is_empty());
        assert!(!selector.has_pending());
        assert!(host.forms().is_empty());
        assert!(!host.is_highlighted());
    }

    #[test]
    fn only_the_first_file_is_kept() {
        let files = vec![
            AcquiredFile::new("a.pdf", vec![1]),
            AcquiredFile::new("b.pdf", vec![2]),
        ];
        assert_eq!(Selector::first_file(files).unwrap().name, "a.pdf");
        assert!(Selector::first_file(Vec::new()).is_none());
    }
}
