//! Single-line shape classifier.
//!
//! Each line of a pipeline file is matched against four anchored patterns and
//! tagged with exactly one [`LineShape`]. Shapes are tested in precedence order:
//!
//! ```text
//! StageOpen  ::= ws* 'stage' ws* '(' ws* QUOTE name QUOTE ws* ')' ws* '{'
//! StepsOpen  ::= ws* 'steps' ws* '{'
//! Trigger    ::= ws* ('cron' | 'pollSCM') ws* '(' .* ')'
//! Directive  ::= ws* [A-Za-z0-9]+ ws* '('
//! ```
//!
//! Closing braces carry no shape, so block ends are invisible to the scanner.

use lazy_static::lazy_static;
use regex::Regex;

use jenkaudit_types::Trigger;

lazy_static! {
    static ref STAGE_OPEN: Regex =
        Regex::new(r#"^\s*stage\s*\(\s*["']([^"']+)["']\s*\)\s*\{"#).unwrap();
    static ref STEPS_OPEN: Regex = Regex::new(r"^\s*steps\s*\{").unwrap();
    static ref TRIGGER: Regex = Regex::new(r"^\s*(cron|pollSCM)\s*\(.*\)").unwrap();
    static ref DIRECTIVE: Regex = Regex::new(r"^\s*([a-zA-Z0-9]+)\s*\(").unwrap();
}

/// The recognised shape of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape<'a> {
    /// `stage("name") {` — carries the quoted stage name.
    StageOpen(&'a str),
    /// `steps {`
    StepsOpen,
    /// `cron(...)` or `pollSCM(...)`
    Trigger(Trigger),
    /// `identifier(` — carries the identifier.
    Directive(&'a str),
    /// Anything else, including closing braces and blank lines.
    Other,
}

/// Tag a single line with its shape.
pub fn classify(line: &str) -> LineShape<'_> {
    if let Some(caps) = STAGE_OPEN.captures(line) {
        if let Some(name) = caps.get(1) {
            return LineShape::StageOpen(name.as_str());
        }
    }

    if STEPS_OPEN.is_match(line) {
        return LineShape::StepsOpen;
    }

    if let Some(trigger) = TRIGGER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Trigger::from_keyword(m.as_str()))
    {
        return LineShape::Trigger(trigger);
    }

    if let Some(caps) = DIRECTIVE.captures(line) {
        if let Some(name) = caps.get(1) {
            return LineShape::Directive(name.as_str());
        }
    }

    LineShape::Other
}
