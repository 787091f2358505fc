//! Scan state machine.
//!
//! Transition table, applied once per line in file order:
//!
//! | shape        | current stage     | in step block | effect                              |
//! |--------------|-------------------|---------------|-------------------------------------|
//! | `StageOpen`  | set to name       | false         | stage sequence reset to empty       |
//! | `StepsOpen`  | unchanged         | true          |                                     |
//! | `Directive`  | unchanged         | unchanged     | recorded if stage set and in block  |
//! | `Trigger`    | unchanged         | unchanged     | counted unconditionally             |
//! | `Other`      | unchanged         | unchanged     |                                     |
//!
//! Brace depth is not tracked. Once `steps {` is seen, every directive-shaped
//! line is attributed to the current stage until the next `stage(...) {`.

use std::path::Path;

use jenkaudit_types::{Aggregates, AuditError};

use crate::classify::{classify, LineShape};

/// State carried from one line to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub current_stage: Option<String>,
    pub in_step_block: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one classified line to the state and the aggregates.
    ///
    /// Re-opening a stage subtracts its discarded directives from the global
    /// counts, so the Build Steps total excludes them.
    pub fn apply(&mut self, shape: LineShape<'_>, out: &mut Aggregates) {
        match shape {
            LineShape::StageOpen(name) => {
                tracing::debug!(stage = name, "stage opened");
                for discarded in out.structure.open_stage(name) {
                    out.directives.decrement(discarded.as_str());
                }
                self.current_stage = Some(name.to_string());
                self.in_step_block = false;
            }
            LineShape::StepsOpen => {
                tracing::debug!(stage = ?self.current_stage, "step block opened");
                self.in_step_block = true;
            }
            LineShape::Directive(name) => {
                if !self.in_step_block {
                    return;
                }
                if let Some(stage) = self.current_stage.as_deref() {
                    tracing::trace!(stage, directive = name, "directive recorded");
                    out.structure.record(stage, name);
                    out.directives.increment(name.to_string());
                }
            }
            LineShape::Trigger(trigger) => {
                tracing::trace!(%trigger, "trigger recorded");
                out.triggers.increment(trigger);
            }
            LineShape::Other => {}
        }
    }
}

/// Scan the full text of a pipeline file.
///
/// Never fails: lines that match no recognised shape are skipped.
pub fn scan(text: &str) -> Aggregates {
    let mut state = ScanState::new();
    let mut out = Aggregates::default();

    // Bare `\r` also ends a line; the empty piece inside `\r\n` classifies as `Other`.
    for line in text.split(['\r', '\n']) {
        state.apply(classify(line), &mut out);
    }

    tracing::info!(
        stages = out.structure.len(),
        directives = out.directives.total(),
        triggers = out.triggers.total(),
        "scan complete"
    );
    out
}

/// Read `path` and scan its contents.
pub fn scan_file(path: &Path) -> jenkaudit_types::Result<Aggregates> {
    let text = std::fs::read_to_string(path).map_err(|source| AuditError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "pipeline file loaded");
    Ok(scan(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jenkaudit_types::Trigger;

    const SCENARIO: &str = r#"stage("Build") {
  steps {
    sh("make")
    sh("make test")
  }
}
stage("Deploy") {
  steps {
    cron("H H * * *")
    deployStep()
  }
}
"#;

    #[test]
    fn scenario_aggregates() {
        let out = scan(SCENARIO);
        assert_eq!(
            out.structure.get("Build"),
            Some(&["sh".to_string(), "sh".to_string()][..])
        );
        assert_eq!(out.structure.get("Deploy"), Some(&["deployStep".to_string()][..]));
        assert_eq!(out.structure.len(), 2);
        assert_eq!(out.directives.get("sh"), 2);
        assert_eq!(out.directives.get("deployStep"), 1);
        assert_eq!(out.directives.len(), 2);
        assert_eq!(out.triggers.get(&Trigger::Cron), 1);
        assert_eq!(out.triggers.len(), 1);
        assert!(out.is_consistent());
    }

    #[test]
    fn stage_open_resets_step_block() {
        let mut state = ScanState::new();
        let mut out = Aggregates::default();
        state.apply(LineShape::StageOpen("A"), &mut out);
        state.apply(LineShape::StepsOpen, &mut out);
        assert!(state.in_step_block);
        state.apply(LineShape::StageOpen("B"), &mut out);
        assert!(!state.in_step_block);
        assert_eq!(state.current_stage.as_deref(), Some("B"));

        state.apply(LineShape::Directive("sh"), &mut out);
        assert_eq!(out.structure.total_directives(), 0);
        assert!(out.directives.is_empty());
    }

    #[test]
    fn directive_outside_step_block_is_ignored() {
        let out = scan("stage('Build') {\n  sh('make')\n  steps {\n    sh('make')\n  }\n}\n");
        assert_eq!(out.directives.get("sh"), 1);
    }

    #[test]
    fn directive_before_any_stage_is_ignored() {
        let out = scan("steps {\n  sh('make')\n}\nstage('Build') {\n}\n");
        assert!(out.directives.is_empty());
        assert_eq!(out.structure.get("Build"), Some(&[][..]));
    }

    #[test]
    fn step_block_is_never_closed_by_braces() {
        let text = r#"stage('Build') {
  steps {
    sh('make')
  }
  post {
    always {
      junit('reports/*.xml')
    }
  }
}


cleanWs()
"#;
        let out = scan(text);
        assert_eq!(
            out.structure.get("Build"),
            Some(&["sh".to_string(), "junit".to_string(), "cleanWs".to_string()][..])
        );
    }

    #[test]
    fn reopened_stage_keeps_only_later_directives() {
        let text = r#"stage('Build') {
  steps {
    sh('one')
    echo('two')
  }
}
stage('Build') {
  steps {
    mvn('three')
  }
}
"#;
        let out = scan(text);
        assert_eq!(out.structure.len(), 1);
        assert_eq!(out.structure.get("Build"), Some(&["mvn".to_string()][..]));
        assert_eq!(out.directives.get("sh"), 0);
        assert_eq!(out.directives.get("mvn"), 1);
        assert_eq!(out.directives.total(), 1);
        assert!(out.is_consistent());
    }

    #[test]
    fn triggers_counted_at_top_level() {
        let text = "pipeline {\n  triggers {\n    cron('H 4 * * 1-5')\n    pollSCM('H/15 * * * *')\n    cron('@midnight')\n  }\n}\n";
        let out = scan(text);
        assert_eq!(out.triggers.get(&Trigger::Cron), 2);
        assert_eq!(out.triggers.get(&Trigger::PollScm), 1);
        assert!(out.structure.is_empty());
        assert!(out.directives.is_empty());
    }

    #[test]
    fn crlf_line_endings() {
        let out = scan("stage('Build') {\r\n  steps {\r\n    sh('make')\r\n  }\r\n}\r\n");
        assert_eq!(out.directives.get("sh"), 1);
    }

    #[test]
    fn lone_cr_line_endings() {
        let out = scan("stage('Build') {\r  steps {\r    sh('make')\r  }\r}\r");
        assert_eq!(out.structure.get("Build"), Some(&["sh".to_string()][..]));
        assert_eq!(out.directives.get("sh"), 1);
    }

    #[test]
    fn mixed_line_endings() {
        let out = scan("stage('Build') {\n  steps {\r\n    sh('a')\r    cron('H H * * *')\n    mvn('b')\r\n}");
        assert_eq!(out.directives.get("sh"), 1);
        assert_eq!(out.directives.get("mvn"), 1);
        assert_eq!(out.triggers.get(&Trigger::Cron), 1);
    }

    #[test]
    fn scanning_is_repeatable() {
        assert_eq!(scan(SCENARIO), scan(SCENARIO));
    }

    #[test]
    fn scan_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Jenkinsfile");
        std::fs::write(&path, SCENARIO).unwrap();
        let out = scan_file(&path).unwrap();
        assert_eq!(out, scan(SCENARIO));
    }

    #[test]
    fn scan_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_file(&dir.path().join("Jenkinsfile")).unwrap_err();
        assert!(matches!(err, AuditError::Read { .. }));
    }
}
