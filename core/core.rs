pub mod config;
pub mod defaults;
pub mod error;
pub mod gather;
pub mod pattern;
pub mod report;
pub mod rules;
pub mod snapshot;
pub mod tree;

pub use config::{Config, FiltersConfig, OutputConfig, SnapshotConfig};
pub use error::{AppError, Result};
pub use gather::{FileEntry, collect_files};
pub use pattern::{CompiledPattern, PatternSet, matches};
pub use report::{SnapshotSummary, render_report};
pub use rules::ExclusionRules;
pub use snapshot::{Snapshot, SnapshotGenerator, generate};
pub use tree::{TreeNode, render_tree};
