//! Line-oriented scanner for declarative pipeline files.
//!
//! Recovers `pipeline -> stage -> steps -> directive` nesting from raw text
//! using single-line pattern matching and a small amount of carried state.
//! There is no grammar: unrecognised lines are skipped and nothing is rejected.
//!
//! # Example
//! ```
//! let text = "stage('Build') {\n  steps {\n    sh('make')\n  }\n}\n";
//! let out = jenkaudit_scan::scan(text);
//! assert_eq!(out.directives.get("sh"), 1);
//! ```

pub mod classify;
pub mod scanner;

pub use classify::{classify, LineShape};
pub use scanner::{scan, scan_file, ScanState};
