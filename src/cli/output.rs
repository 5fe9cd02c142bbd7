//! Output formatting for CLI commands

use serde::Serialize;
use tracing::warn;

pub use crate::storage::OutputFormat;

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints a non-fatal notice (a request that was ignored)
    pub fn notice(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("Note: {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "ignored": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints an error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message
                    })
                );
            }
        }
    }

    /// Prints structured data, reporting serialization failures as errors
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.render(data) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                warn!("Failed to serialize output: {}", e);
                self.error(&format!("Failed to serialize output: {}", e));
            }
        }
    }

    /// Serializes `data` as JSON; pretty-printed in text mode
    fn render<T: Serialize>(&self, data: &T) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        }
    }

    /// Prints pre-rendered text (text only, ignored in JSON mode)
    pub fn text(&self, text: &str) {
        if self.format == OutputFormat::Text {
            print!("{}", text);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
