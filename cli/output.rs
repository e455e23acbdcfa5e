use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use projsnap_core::AppError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Writes `content` to `path`, replacing whatever was there.
pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    let file_write_error = |source: io::Error| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(file_write_error)?;
    }
    let mut file = File::create(path).map_err(file_write_error)?;
    file.write_all(content.as_bytes())
        .map_err(file_write_error)?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn serialize_structured<T: Serialize>(data: &T, format: &str) -> Result<String> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yml::to_string(data).context("Failed to serialize to YAML"),
        _ => serde_json::to_string_pretty(data).context("Failed to serialize to JSON"),
    }
}

pub fn print_structured<T: Serialize>(data: &T, format: &str) -> Result<()> {
    let content = serialize_structured(data, format)?;
    write_to_stdout(&content)
}

pub fn human_size(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{:.2}", adjusted)
}

pub fn snapshot_table(output_file: &Path, size_bytes: u64) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Property").fg(Color::Green),
        Cell::new("Value").fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Output File"),
        Cell::new(output_file.display()).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("File Size"),
        Cell::new(human_size(size_bytes)).fg(Color::Cyan),
    ]);
    table
}

pub fn print_snapshot_table(output_file: &Path, size_bytes: u64) {
    println!("{}", snapshot_table(output_file, size_bytes));
}
