use chrono::Utc;
use serde_json::json;

/// Logger struct for handling structured logging
#[derive(Clone, Debug)]
pub struct Logger {
    widget_id: String,
}

impl Logger {
    /// Create a new Logger instance
    ///
    /// # Arguments
    ///
    /// * `widget_id` - A unique identifier for the widget instance emitting the logs
    pub fn new(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
        }
    }

    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    /// Log an info message
    ///
    /// # Arguments
    ///
    /// * `message` - The log message
    /// * `data` - Optional additional data to include in the log
    pub fn info(&self, message: &str, data: Option<serde_json::Value>) {
        self.log("INFO", message, data);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str, data: Option<serde_json::Value>) {
        self.log("WARN", message, data);
    }

    /// Log an error message
    pub fn error(&self, message: &str, data: Option<serde_json::Value>) {
        self.log("ERROR", message, data);
    }

    /// Builds the JSON line emitted for one log call.
    pub fn entry(&self, level: &str, message: &str, data: Option<serde_json::Value>) -> serde_json::Value {
        json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "widget_id": self.widget_id,
            "message": message,
            "data": data
        })
    }

    fn log(&self, level: &str, message: &str, data: Option<serde_json::Value>) {
        let line = self.entry(level, message, data).to_string();

        cfg_if::cfg_if! {
            if #[cfg(target_arch = "wasm32")] {
                let value = wasm_bindgen::JsValue::from_str(&line);
                match level {
                    "WARN" => web_sys::console::warn_1(&value),
                    "ERROR" => web_sys::console::error_1(&value),
                    _ => web_sys::console::log_1(&value),
                }
            } else {
                eprintln!("{}", line);
            }
        }
    }
}

/// Macro to create a JSON object for additional log data
///
/// Usage: log_data!("key1" => "value1", "key2" => 42)
#[macro_export]
macro_rules! log_data {
    ($($key:expr => $value:expr),*) => {
        Some(serde_json::json!({ $($key: $value),* }))
    };
}
