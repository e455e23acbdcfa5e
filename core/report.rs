//! Assembly of the plain-text snapshot report.

use crate::error::AppError;
use crate::gather::FileEntry;
use crate::tree::render_tree;
use log;
use serde::Serialize;
use std::fs;

const SECTION_RULE: &str =
    "================================================================================";
const FILE_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────";
pub const OMITTED_PLACEHOLDER: &str =
    "[CONTENT OMITTED - File referenced for structure, large or vendor file]";
pub const READ_ERROR_PREFIX: &str = "// Error reading file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub total_files: usize,
    pub files_with_content: usize,
    pub files_without_content: usize,
}

impl SnapshotSummary {
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let files_without_content = entries.iter().filter(|e| !e.include_content).count();
        Self {
            total_files: entries.len(),
            files_with_content: entries.len() - files_without_content,
            files_without_content,
        }
    }
}

/// Builds the complete report. Tree and content sections are rendered from
/// the same slice, so they always describe the same files in the same order.
pub fn render_report(entries: &[FileEntry], generated: &str) -> String {
    let summary = SnapshotSummary::from_entries(entries);
    let mut output = render_header(&summary, generated);
    output.push_str(&render_structure(entries));
    output.push_str(&render_contents(entries, &summary));
    output
}

pub fn render_header(summary: &SnapshotSummary, generated: &str) -> String {
    let mut output = String::from("PROJECT SNAPSHOT\n");
    output.push_str(SECTION_RULE);
    output.push_str("\n\n");
    output.push_str(&format!("Generated: {}\n", generated));
    output.push_str(&format!("Total files in snapshot: {}\n", summary.total_files));
    output.push_str(&format!(
        "  - With full content: {}\n",
        summary.files_with_content
    ));
    output.push_str(&format!(
        "  - Referenced only (no content): {}\n",
        summary.files_without_content
    ));
    output.push('\n');
    output.push_str("This snapshot is optimized for AI model consumption.\n");
    output.push_str(
        "Large vendor files are referenced in the structure but their content is omitted.\n",
    );
    output.push('\n');
    output.push_str(SECTION_RULE);
    output.push_str("\n\n");
    output
}

pub fn render_structure(entries: &[FileEntry]) -> String {
    let mut output = String::from("FILE STRUCTURE\n");
    output.push_str(SECTION_RULE);
    output.push_str("\n\n");
    output.push_str(&render_tree(entries));
    output.push('\n');
    output.push_str(SECTION_RULE);
    output.push_str("\n\n");
    output
}

pub fn render_contents(entries: &[FileEntry], summary: &SnapshotSummary) -> String {
    let mut output = String::from("FILE CONTENTS\n");
    output.push_str(SECTION_RULE);
    output.push_str("\n\n");

    for entry in entries {
        output.push_str(FILE_RULE);
        output.push('\n');
        output.push_str(&format!("FILE: {}\n", entry.relative_path));

        if !entry.include_content {
            output.push_str(OMITTED_PLACEHOLDER);
            output.push_str("\n\n");
            continue;
        }

        output.push_str(FILE_RULE);
        output.push_str("\n\n");
        output.push_str(&read_content(entry));
        output.push_str("\n\n");
    }

    output.push_str(SECTION_RULE);
    output.push('\n');
    output.push_str("END OF SNAPSHOT\n");
    output.push_str(&format!(
        "Files with content: {}\n",
        summary.files_with_content
    ));
    output.push_str(&format!(
        "Files referenced (no content): {}\n",
        summary.files_without_content
    ));
    output.push_str(SECTION_RULE);
    output.push('\n');
    output
}

/// Reads a file for the report. Failures become a placeholder line.
fn read_content(entry: &FileEntry) -> String {
    match fs::read(&entry.absolute_path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                log::debug!(
                    "Non-UTF-8 content in {}, converting lossily",
                    entry.relative_path
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        },
        Err(e) => {
            let err = AppError::FileRead {
                path: entry.absolute_path.clone(),
                source: e,
            };
            log::warn!("{}", err);
            format!("{}: {}\n", READ_ERROR_PREFIX, err)
        }
    }
}
