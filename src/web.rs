//! # Browser Binding
//!
//! `wasm32` glue between the widget and a real page:
//!
//! - [`BrowserHost`] implements [`Host`] with `web-sys`
//! - [`mount`] reads the element's `file-*` attributes, builds the widget and
//!   attaches one DOM listener per bound event
//! - [`FileUpload`] exposes the same to JavaScript
//!
//! ```html
//! <button file-upload file-path="/upload" file-extensions="[pdf, png]" file-event="both">
//!   Upload file
//! </button>
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Blob, BlobPropertyBag, Document, DragEvent, Event, FileList, HtmlElement, HtmlFormElement,
    HtmlInputElement, Url, Window,
};

use crate::config::{init_settings, UploadSettings, WidgetAttributes, WidgetConfig};
use crate::constants::{
    FILE_FIELD_NAME, FILE_INPUT_ID, FORM_TOKEN_ATTRIBUTE, HIGHLIGHT_CLASS, PENDING_FORM_ID,
};
use crate::errors::{AppResult, UploadError};
use crate::host::Host;
use crate::log_data;
use crate::logging::Logger;
use crate::models::{AcquiredFile, FileContent, UploadOutcome};
use crate::selector::DomEvent;
use crate::transport::HttpTransport;
use crate::utils::generate_unique_identifier;
use crate::widget::UploadWidget;

pub type BrowserWidget = UploadWidget<BrowserHost, HttpTransport>;

/// Receives the token of the form whose input fired, and its files.
type FilesHandler = Rc<dyn Fn(String, Option<FileList>)>;

fn js_error(context: &str, value: JsValue) -> UploadError {
    UploadError::Host(format!("{}: {:?}", context, value))
}

/// [`Host`] backed by the page document.
pub struct BrowserHost {
    window: Window,
    document: Document,
    element: HtmlElement,
    logger: Logger,
    on_files: RefCell<Option<FilesHandler>>,
    input_listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
}

impl BrowserHost {
    pub fn new(element: HtmlElement, logger: Logger) -> AppResult<Self> {
        let window = web_sys::window().ok_or_else(|| UploadError::Host("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| UploadError::Host("no document".to_string()))?;

        Ok(Self {
            window,
            document,
            element,
            logger,
            on_files: RefCell::new(None),
            input_listeners: RefCell::new(Vec::new()),
        })
    }

    fn set_files_handler(&self, handler: Option<FilesHandler>) {
        *self.on_files.borrow_mut() = handler;
    }

    fn build_form(&self, token: &str) -> Result<(HtmlFormElement, HtmlInputElement), JsValue> {
        let form: HtmlFormElement = self.document.create_element("form")?.dyn_into()?;
        form.set_id(PENDING_FORM_ID);
        form.set_attribute("action", "")?;
        form.set_attribute("method", "POST")?;
        form.set_attribute("enctype", "multipart/form-data")?;
        form.set_attribute(FORM_TOKEN_ATTRIBUTE, token)?;
        form.style().set_property("opacity", "0")?;

        let input: HtmlInputElement = self.document.create_element("input")?.dyn_into()?;
        input.set_type("file");
        input.set_name(FILE_FIELD_NAME);
        input.set_id(FILE_INPUT_ID);
        form.append_child(&input)?;

        Ok((form, input))
    }

    fn listen_for_selection(&self, input: &HtmlInputElement, token: &str) -> Result<(), JsValue> {
        let handler = self.on_files.borrow().clone();
        let selected = input.clone();
        let form_token = token.to_string();
        let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(handler) = &handler {
                handler(form_token.clone(), selected.files());
            }
        });

        let handler = self.on_files.borrow().clone();
        let form_token = token.to_string();
        let on_cancel = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(handler) = &handler {
                handler(form_token.clone(), None);
            }
        });

        input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        input.add_event_listener_with_callback("cancel", on_cancel.as_ref().unchecked_ref())?;

        let mut listeners = self.input_listeners.borrow_mut();
        listeners.clear();
        listeners.push(on_change);
        listeners.push(on_cancel);
        Ok(())
    }
}

impl Host for BrowserHost {
    fn mount_file_form(&self, token: &str) -> AppResult<()> {
        if let Some(stale) = self.document.get_element_by_id(PENDING_FORM_ID) {
            stale.remove();
        }

        let (form, input) = self
            .build_form(token)
            .map_err(|e| js_error("building the file form", e))?;
        let body = self
            .document
            .body()
            .ok_or_else(|| UploadError::Host("document has no body".to_string()))?;
        body.append_child(&form)
            .map_err(|e| js_error("attaching the file form", e))?;
        self.listen_for_selection(&input, token)
            .map_err(|e| js_error("listening on the file input", e))?;

        input.click();
        Ok(())
    }

    fn remove_file_form(&self, token: &str) {
        if let Some(form) = self.document.get_element_by_id(PENDING_FORM_ID) {
            if form.get_attribute(FORM_TOKEN_ATTRIBUTE).as_deref() == Some(token) {
                form.remove();
                self.input_listeners.borrow_mut().clear();
            }
        }
    }

    fn set_highlight(&self, active: bool) {
        let classes = self.element.class_list();
        let result = if active {
            classes.add_1(HIGHLIGHT_CLASS)
        } else {
            classes.remove_1(HIGHLIGHT_CLASS)
        };
        if let Err(e) = result {
            self.logger.warn(
                "Could not toggle the highlight class",
                log_data!("active" => active, "error" => format!("{:?}", e)),
            );
        }
    }

    fn open_url(&self, url: &str) -> AppResult<()> {
        self.window
            .open_with_url(url)
            .map_err(|e| js_error("opening the response url", e))?;
        Ok(())
    }

    fn open_blob(&self, bytes: &[u8], mime: &str, file_name: &str) -> AppResult<()> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(bytes));

        let options = BlobPropertyBag::new();
        options.set_type(mime);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| js_error("building the response blob", e))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|e| js_error("creating the blob url", e))?;
        self.window
            .open_with_url_and_target(&url, file_name)
            .map_err(|e| js_error("opening the blob", e))?;
        Ok(())
    }

    fn report_error(&self, message: &str) {
        web_sys::console::error_1(&JsValue::from_str(message));
    }
}

/// Wraps the first file of a selection. Nothing is read until the upload is sent.
fn first_of(files: Option<FileList>) -> Vec<AcquiredFile> {
    files
        .and_then(|list| list.get(0))
        .map(AcquiredFile::from_browser)
        .into_iter()
        .collect()
}

/// Logs how an interaction ended. Validation failures were already reported
/// to the user, so they are logged at info level.
fn log_outcome(widget: &BrowserWidget, result: AppResult<UploadOutcome>) {
    match result {
        Ok(outcome) => widget
            .logger()
            .info("Interaction finished", log_data!("outcome" => outcome)),
        Err(error) if error.is_validation() => widget
            .logger()
            .info("File rejected", log_data!("error" => error.to_string())),
        Err(error) => widget
            .logger()
            .warn("Upload did not complete", log_data!("error" => error.to_string())),
    }
}

/// Reads the `file-*` attributes of an element.
pub fn read_attributes(element: &HtmlElement) -> WidgetAttributes {
    WidgetAttributes {
        file_path: element.get_attribute("file-path"),
        file_extensions: element.get_attribute("file-extensions"),
        file_blob_response: element.get_attribute("file-blob-response"),
        file_params: element.get_attribute("file-params"),
        file_headers: element.get_attribute("file-headers"),
        file_event: element.get_attribute("file-event"),
    }
}

/// A widget bound to an element. Dropping it unbinds everything.
pub struct MountedWidget {
    element: HtmlElement,
    host: Rc<BrowserHost>,
    widget: Rc<BrowserWidget>,
    listeners: Vec<(DomEvent, Closure<dyn FnMut(Event)>)>,
}

impl MountedWidget {
    pub fn widget(&self) -> &BrowserWidget {
        &self.widget
    }
}

impl Drop for MountedWidget {
    fn drop(&mut self) {
        for (event, listener) in self.listeners.drain(..) {
            if let Err(e) = self
                .element
                .remove_event_listener_with_callback(event.as_str(), listener.as_ref().unchecked_ref())
            {
                self.widget.logger().warn(
                    "Could not remove a listener",
                    log_data!("event" => event.as_str(), "error" => format!("{:?}", e)),
                );
            }
        }
        self.widget.teardown();
        self.host.set_files_handler(None);
    }
}

/// Builds a widget from `element`'s attributes and binds its listeners.
///
/// `configure` receives the attribute-derived configuration and attaches the
/// callbacks before the configuration is validated.
pub fn mount(
    element: HtmlElement,
    configure: impl FnOnce(WidgetConfig) -> WidgetConfig,
) -> AppResult<MountedWidget> {
    let config = configure(WidgetConfig::from_attributes(&read_attributes(&element))?);
    let logger = Logger::new(generate_unique_identifier());
    let host = Rc::new(BrowserHost::new(element.clone(), logger.clone())?);
    let origin = host
        .window
        .location()
        .origin()
        .map_err(|e| js_error("reading the page origin", e))?;
    let transport = HttpTransport::with_origin(&origin)?;
    let widget = Rc::new(UploadWidget::new(config, host.clone(), transport)?.with_logger(logger));

    let weak = Rc::downgrade(&widget);
    host.set_files_handler(Some(Rc::new(move |token: String, files: Option<FileList>| {
        let Some(widget) = weak.upgrade() else {
            return;
        };
        let files = first_of(files);
        spawn_local(async move {
            let result = widget.handle_files_selected(&token, files).await;
            log_outcome(&widget, result);
        });
    })));

    let mut listeners = Vec::new();
    for event in widget.bind() {
        let listener = listener(event, Rc::downgrade(&widget));
        element
            .add_event_listener_with_callback(event.as_str(), listener.as_ref().unchecked_ref())
            .map_err(|e| js_error("binding a listener", e))?;
        listeners.push((event, listener));
    }

    Ok(MountedWidget {
        element,
        host,
        widget,
        listeners,
    })
}

fn listener(event: DomEvent, widget: Weak<BrowserWidget>) -> Closure<dyn FnMut(Event)> {
    Closure::new(move |e: Event| {
        let Some(widget) = widget.upgrade() else {
            return;
        };
        e.prevent_default();

        match event {
            DomEvent::Click => {
                if let Err(error) = widget.handle_click() {
                    widget
                        .logger()
                        .error("Could not open the file chooser", log_data!("error" => error.to_string()));
                }
            }
            DomEvent::DragEnter => widget.handle_drag_enter(),
            DomEvent::DragOver => widget.handle_drag_over(),
            DomEvent::DragLeave => widget.handle_drag_leave(),
            DomEvent::Drop => {
                let files = e
                    .dyn_ref::<DragEvent>()
                    .and_then(|drag| drag.data_transfer())
                    .and_then(|transfer| transfer.files());
                let files = first_of(files);
                spawn_local(async move {
                    let result = widget.handle_drop(files).await;
                    log_outcome(&widget, result);
                });
            }
        }
    })
}

/// The browser `File` behind an acquired file, or its bytes when it came from memory.
fn file_value(file: &AcquiredFile) -> JsValue {
    match &file.content {
        FileContent::Browser(file) => file.clone().into(),
        FileContent::Bytes(bytes) => Uint8Array::from(bytes.as_slice()).into(),
    }
}

/// Installs the process-wide settings from an optional JSON blob.
#[wasm_bindgen(js_name = initUploadSettings)]
pub fn init_upload_settings(raw: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let settings = match raw {
        Some(raw) => UploadSettings::from_json(&raw).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => UploadSettings::default(),
    };
    init_settings(settings);
    Ok(())
}

/// JavaScript handle on a mounted widget.
#[wasm_bindgen]
pub struct FileUpload {
    mounted: MountedWidget,
}

#[wasm_bindgen]
impl FileUpload {
    /// `on_success(status, body)` and `pre_action(file)` are optional.
    /// `pre_action` receives the selected `File`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlElement,
        on_success: Option<Function>,
        pre_action: Option<Function>,
    ) -> Result<FileUpload, JsValue> {
        let mounted = mount(element, move |mut config| {
            if let Some(callback) = on_success {
                config = config.with_success_callback(move |response| {
                    let result = callback.call2(
                        &JsValue::NULL,
                        &JsValue::from(response.status),
                        &JsValue::from_str(&response.text()),
                    );
                    if let Err(e) = result {
                        web_sys::console::error_2(&JsValue::from_str("success callback threw"), &e);
                    }
                });
            }
            if let Some(callback) = pre_action {
                config = config.with_pre_action(move |file| {
                    let result = callback.call1(&JsValue::NULL, &file_value(file));
                    if let Err(e) = result {
                        web_sys::console::error_2(&JsValue::from_str("pre-action callback threw"), &e);
                    }
                });
            }
            config
        })
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self { mounted })
    }

    /// Re-reads the allowed extensions, e.g. after the attribute changed.
    #[wasm_bindgen(js_name = setExtensions)]
    pub fn set_extensions(&self, raw: &str) {
        self.mounted.widget().set_allowed_extensions(raw);
    }

    /// Unbinds the widget and removes any pending file form.
    pub fn destroy(self) {}
}
