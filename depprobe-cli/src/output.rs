//! Output formatting abstraction for text, JSON and SARIF rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of command handlers entirely.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text / SARIF).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use depprobe_cli::output::OutputWriter;
    /// use depprobe_cli::cli::OutputFormat;
    ///
    /// let writer = OutputWriter::new(OutputFormat::Text);
    /// ```
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write(&mut handle, payload)
    }

    /// Render a payload into a string (for payload-carrying errors).
    pub fn render_to_string<T: Render + Serialize>(&self, payload: &T) -> Result<String, CliError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, payload)?;
        String::from_utf8(buffer).map_err(|e| CliError::Command(format!("invalid UTF-8 output: {e}")))
    }

    /// Render a payload into any writer.
    ///
    /// For `Text`, delegates to `Render::render_text()`.
    /// For `Json`, serialises via `serde_json`.
    /// For `Sarif`, uses `Render::render_sarif()` and falls back to JSON
    /// for payloads without a SARIF form.
    pub fn write<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
            OutputFormat::Sarif => {
                match payload.render_sarif() {
                    Some(log) => serde_json::to_writer_pretty(&mut *w, &log)?,
                    None => serde_json::to_writer_pretty(&mut *w, payload)?,
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;

    /// SARIF 2.1.0 log for this payload, if it has one.
    fn render_sarif(&self) -> Option<serde_json::Value> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestPayload {
        field1: String,
        field2: u32,
    }

    impl Render for TestPayload {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "Field1: {}", self.field1)?;
            writeln!(w, "Field2: {}", self.field2)?;
            Ok(())
        }
    }

    #[derive(Serialize)]
    struct SarifPayload;

    impl Render for SarifPayload {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "sarif payload")
        }

        fn render_sarif(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({"version": "2.1.0", "runs": []}))
        }
    }

    fn payload() -> TestPayload {
        TestPayload {
            field1: "test value".to_owned(),
            field2: 42,
        }
    }

    #[test]
    fn test_output_writer_text_format() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let output = writer.render_to_string(&payload()).expect("text rendering should succeed");
        assert!(output.contains("Field1: test value"), "should render field1");
        assert!(output.contains("Field2: 42"), "should render field2");
    }

    #[test]
    fn test_output_writer_json_format_structure() {
        let writer = OutputWriter::new(OutputFormat::Json);
        let output = writer.render_to_string(&payload()).expect("json rendering should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("should parse back to JSON");

        assert_eq!(parsed["field1"].as_str(), Some("test value"));
        assert_eq!(parsed["field2"].as_u64(), Some(42));
        assert!(output.contains('\n'), "pretty JSON should contain newlines");
    }

    #[test]
    fn test_output_writer_sarif_uses_sarif_form() {
        let writer = OutputWriter::new(OutputFormat::Sarif);
        let output = writer.render_to_string(&SarifPayload).expect("sarif rendering should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
    }

    #[test]
    fn test_output_writer_sarif_falls_back_to_json() {
        let writer = OutputWriter::new(OutputFormat::Sarif);
        let output = writer.render_to_string(&payload()).expect("fallback rendering should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["field2"].as_u64(), Some(42));
    }

    #[test]
    fn test_render_text_unicode_content() {
        let payload = TestPayload {
            field1: "Unicode: 日本語 한글 🦀".to_owned(),
            field2: 0,
        };
        let mut buffer = Vec::new();
        payload.render_text(&mut buffer).expect("rendering unicode should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("日本語"));
        assert!(output.contains("🦀"));
    }
}
