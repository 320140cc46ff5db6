//! Progress reporting
//!
//! Every user-visible action emits a "Verb-ing X..." line before the
//! provider call and a "Verb-ed X" (or "X already exists" / "No X to
//! remove") line after. The wording is a contract: operators grep for it
//! and the integration tests assert the exact sequence. Internal detail
//! goes to `tracing`, not here.

use crate::error::Result;

/// Sink for user-facing progress lines
pub trait Reporter: Send + Sync {
    fn line(&self, text: &str);
}

/// Prints progress lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn line(&self, text: &str) {
        println!("{}", text);
    }
}

/// Discards progress lines. For callers that only want the result.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn line(&self, _text: &str) {}
}

/// Surface a provider failure with the resource that caused it, then
/// propagate. The run aborts here; nothing is rolled back.
pub(crate) fn check<T>(
    reporter: &dyn Reporter,
    result: stratus_cloud::Result<T>,
    verb: &str,
    kind: &str,
    name: &str,
) -> Result<T> {
    result.map_err(|err| {
        reporter.line(&format!("Failed to {} {} {}!", verb, kind, name));
        err.into()
    })
}

/// "log project" -> "Log project", for lines that start with the kind
pub(crate) fn capitalize(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
