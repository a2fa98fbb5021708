// src/mirror/report.rs

//! Per-run error collection
//!
//! Resolution and mirroring failures never stop a run. They are collected
//! here in the order they happen and turned into a single failure when the
//! run finishes.

use crate::error::{Error, Result};

/// Headline of the aggregated failure
pub const FAILURE_HEADLINE: &str = "Mirroring completed with errors.";

/// Ordered, append-only list of error messages for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    errors: Vec<String>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn record(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn extend<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.errors.extend(messages);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    /// Finish the run
    ///
    /// `Ok(())` when nothing was recorded, otherwise one
    /// [`Error::MirroringFailed`] listing every message, each terminated by a
    /// period, in recording order.
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }

        let list = self
            .errors
            .iter()
            .map(|e| terminate_sentence(e))
            .collect::<Vec<_>>()
            .join("\n");

        Err(Error::MirroringFailed(format!(
            "{FAILURE_HEADLINE}\nThe following errors occurred while mirroring:\n{list}"
        )))
    }
}

fn terminate_sentence(message: &str) -> String {
    if message.ends_with('.') {
        message.to_string()
    } else {
        format!("{message}.")
    }
}
