use std::io::{self, Write};

use serde::Serialize;

use crate::config::OutputFormat;
use crate::error::AppError;

const JSON_INDENT: &[u8] = b"    ";

/// Render `data` as a single document without a trailing newline.
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => Ok(to_json_pretty(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?.trim_end().to_string()),
    }
}

fn to_json_pretty<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a rendered document followed by a newline to stdout.
pub fn output_document(text: &str) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{text}")?;
    out.flush()?;
    Ok(())
}

pub fn print_error(message: &str) {
    eprintln!("\x1b[31m❌ Error: {}\x1b[0m", message);
}
