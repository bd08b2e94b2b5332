use serde::Serialize;
use std::path::{Path, PathBuf};

/// Edge Functions deployed on every run, in deployment order
pub const FUNCTIONS: [&str; 7] = [
    "start-trip",
    "checkin",
    "extend",
    "ping-location",
    "test-sms",
    "sos",
    "cron-check-deadlines",
];

/// Entry file inside each function directory
pub const ENTRY_FILE: &str = "index.ts";

/// Default functions root, relative to the working directory
pub const DEFAULT_FUNCTIONS_ROOT: &str = "supabase/functions";

/// Path to a function's entry file: `<root>/<name>/index.ts`
pub fn function_path(root: &Path, name: &str) -> PathBuf {
    root.join(name).join(ENTRY_FILE)
}

/// A function and its source, read fresh for each run
#[derive(Debug, Clone)]
pub struct EdgeFunction {
    pub name: String,
    pub code: String,
}

impl EdgeFunction {
    pub fn payload(&self) -> FunctionPayload<'_> {
        FunctionPayload {
            name: &self.name,
            slug: &self.name,
            body: &self.code,
            verify_jwt: true,
        }
    }
}

/// Request body for both create and update calls
#[derive(Debug, Serialize)]
pub struct FunctionPayload<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub body: &'a str,
    pub verify_jwt: bool,
}

/// Result of deploying a single function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Create call accepted
    Created,
    /// Create returned 409 and the follow-up update was accepted
    Updated,
    /// Anything else, with a human-readable reason
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }
}

/// Per-run tally of outcomes
#[derive(Debug, Default)]
pub struct Summary {
    pub results: Vec<(String, Outcome)>,
    pub deployed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, name: &str, outcome: Outcome) {
        if outcome.is_success() {
            self.deployed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push((name.to_string(), outcome));
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_deployed(&self) -> bool {
        self.failed == 0
    }
}
