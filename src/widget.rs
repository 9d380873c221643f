//! # Upload Widget
//!
//! [`UploadWidget`] ties the pieces together for one bound element:
//!
//! ```text
//! click ──► synthetic form ──► files selected ─┐
//!                                              ├─► validate ─► upload ─► route response
//! drop ───────────────────────────────────────┘            └─► pre-action callback
//! ```
//!
//! Event handlers take `&self`: the widget is shared between DOM listeners on
//! a single thread, so mutable state sits behind `RefCell`s that are never
//! held across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::{parse_extensions, settings, UploadSettings, WidgetConfig};
use crate::constants::{KEY_BAD_FILE_EXT, KEY_FILE_EXT_ADMITTED, KEY_MAX_FILE_SIZE};
use crate::errors::{AppResult, ValidationError};
use crate::host::Host;
use crate::i18n::{StaticTranslator, Translator};
use crate::log_data;
use crate::logging::Logger;
use crate::models::{AcquiredFile, UploadOutcome};
use crate::router::ResponseRouter;
use crate::selector::{DomEvent, PendingForm, Selector};
use crate::transport::{Transport, UploadRequest};
use crate::utils::generate_unique_identifier;
use crate::validator::FileValidator;

pub struct UploadWidget<H: Host + 'static, T: Transport> {
    config: WidgetConfig,
    extensions: RefCell<Vec<String>>,
    settings: Arc<UploadSettings>,
    host: Rc<H>,
    transport: T,
    translator: Box<dyn Translator>,
    logger: Logger,
    selector: RefCell<Selector>,
}

impl<H: Host + 'static, T: Transport> UploadWidget<H, T> {
    /// Builds a widget using the process-wide [`UploadSettings`].
    ///
    /// # Errors
    ///
    /// - `Config`: the configuration gives the widget nothing to do with a file
    pub fn new(config: WidgetConfig, host: Rc<H>, transport: T) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            extensions: RefCell::new(config.allowed_extensions.clone()),
            config,
            settings: settings(),
            host,
            transport,
            translator: Box::new(StaticTranslator::default()),
            logger: Logger::new(generate_unique_identifier()),
            selector: RefCell::new(Selector::default()),
        })
    }

    pub fn with_settings(mut self, settings: Arc<UploadSettings>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Shares a logger with the host so both write under one widget id.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Binds the events selected by the trigger mode and returns them so the
    /// host can attach listeners.
    pub fn bind(&self) -> Vec<DomEvent> {
        let events = self.selector.borrow_mut().bind(self.config.trigger_mode);
        self.logger.info(
            "Widget bound",
            log_data!("events" => events.iter().map(|e| e.as_str()).collect::<Vec<_>>()),
        );
        events
    }

    pub fn bound_events(&self) -> Vec<DomEvent> {
        self.selector.borrow().bound().to_vec()
    }

    pub fn has_pending_form(&self) -> bool {
        self.selector.borrow().has_pending()
    }

    /// Token of the synthetic form opened by the last click, if still pending.
    pub fn pending_token(&self) -> Option<String> {
        self.selector.borrow().pending_token().map(str::to_string)
    }

    pub fn allowed_extensions(&self) -> Vec<String> {
        self.extensions.borrow().clone()
    }

    /// Re-reads the extension list, for hosts whose attribute changes after binding.
    pub fn set_allowed_extensions(&self, raw: &str) {
        *self.extensions.borrow_mut() = parse_extensions(raw);
    }

    /// Click trigger: opens the native chooser through a fresh synthetic form.
    pub fn handle_click(&self) -> AppResult<()> {
        if !self.selector.borrow().is_bound(DomEvent::Click) {
            return Ok(());
        }
        let host: Rc<dyn Host> = self.host.clone();
        self.selector.borrow_mut().begin_click(host)
    }

    /// Selection from the synthetic form tagged with `token`. An empty list
    /// means the chooser was cancelled.
    ///
    /// Only that form is released; if a later click already replaced it, the
    /// newer form stays open.
    pub async fn handle_files_selected(&self, token: &str, files: Vec<AcquiredFile>) -> AppResult<UploadOutcome> {
        let pending = {
            let mut selector = self.selector.borrow_mut();
            if !selector.is_bound(DomEvent::Click) {
                return Ok(UploadOutcome::Ignored);
            }
            selector.take_pending(token)
        };
        self.attach(files, pending).await
    }

    pub fn handle_drag_enter(&self) {
        self.set_highlight(true);
    }

    pub fn handle_drag_over(&self) {
        self.set_highlight(true);
    }

    pub fn handle_drag_leave(&self) {
        self.set_highlight(false);
    }

    pub async fn handle_drop(&self, files: Vec<AcquiredFile>) -> AppResult<UploadOutcome> {
        if !self.selector.borrow().is_bound(DomEvent::Drop) {
            return Ok(UploadOutcome::Ignored);
        }
        self.set_highlight(false);
        self.attach(files, None).await
    }

    /// Unbinds every listener and removes the synthetic form.
    pub fn teardown(&self) -> Vec<DomEvent> {
        let unbound = self.selector.borrow_mut().unbind(&*self.host);
        self.logger.info("Widget torn down", None);
        unbound
    }

    fn set_highlight(&self, active: bool) {
        let mut selector = self.selector.borrow_mut();
        let bound = selector.is_bound(DomEvent::Drop);
        if bound {
            selector.set_highlight(&*self.host, active);
        }
    }

    /// Validates the first file and hands it to the upload or the pre-action.
    /// `pending` is released when this returns, whatever the outcome.
    async fn attach(&self, files: Vec<AcquiredFile>, pending: Option<PendingForm>) -> AppResult<UploadOutcome> {
        let _pending = pending;

        let Some(file) = Selector::first_file(files) else {
            return Ok(UploadOutcome::Cancelled);
        };

        let allowed = self.allowed_extensions();
        if let Err(error) = FileValidator::validate(&file, &allowed, self.settings.max_file_size) {
            self.report_validation(&error);
            return Err(error.into());
        }

        match self.config.target_path.as_deref() {
            Some(target_path) => {
                let request = UploadRequest::build(file, target_path, &self.config, &self.settings);
                self.upload(request).await
            }
            None => Ok(self.hand_over(file)),
        }
    }

    fn hand_over(&self, file: AcquiredFile) -> UploadOutcome {
        if let Some(action) = &self.config.pre_action {
            action(&file);
        }
        self.logger.info("File handed to pre-action", log_data!("file_name" => file.name));
        UploadOutcome::Handed { file_name: file.name }
    }

    async fn upload(&self, request: UploadRequest) -> AppResult<UploadOutcome> {
        let file_name = request.file.name.clone();
        self.logger.info(
            "Uploading file",
            log_data!("url" => request.url, "file_name" => file_name, "size" => request.file.size),
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                self.logger.error("Upload request failed", log_data!("error" => error.to_string()));
                self.host.report_error(&error.to_string());
                return Err(error);
            }
        };

        ResponseRouter {
            host: &*self.host,
            logger: &self.logger,
            on_success: self.config.on_success.as_ref(),
            blob_response_mime: self.config.blob_response_mime.as_deref(),
            file_name: &file_name,
        }
        .route(&response)
    }

    fn report_validation(&self, error: &ValidationError) {
        match error {
            ValidationError::BadExtension { allowed, .. } => {
                let first = self.translator.translate(KEY_BAD_FILE_EXT);
                let second = format!("{} {}", self.translator.translate(KEY_FILE_EXT_ADMITTED), allowed.join(", "));
                self.logger.error(&first, log_data!("allowed" => allowed));
                self.logger.error(&second, None);
                self.host.report_error(&first);
                self.host.report_error(&second);
            }
            ValidationError::FileTooLarge { size, max } => {
                let message = self.translator.translate(KEY_MAX_FILE_SIZE);
                self.logger.error(&message, log_data!("size" => size, "max" => max));
                self.host.report_error(&message);
            }
        }
    }
}
