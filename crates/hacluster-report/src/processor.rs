//! Report accumulation and the abort decision

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use crate::error::LibraryError;
use crate::item::{ForceCode, ReportItem, Severity};

/// Position in a processor's item list
///
/// Lets a command inspect only the items it added itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMark(usize);

/// Ordered accumulator of [`ReportItem`]s for one library call
///
/// Insertion order is preserved. Forceable errors whose category the caller
/// supplied up front are recorded as warnings.
#[derive(Debug, Default)]
pub struct ReportProcessor {
    items: Vec<ReportItem>,
    forced: BTreeSet<ForceCode>,
    error_count: usize,
}

impl ReportProcessor {
    /// Create a processor without any caller overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor honoring the given force categories
    #[must_use]
    pub fn with_force(codes: impl IntoIterator<Item = ForceCode>) -> Self {
        Self {
            forced: codes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Check whether the caller supplied `code`
    #[must_use]
    pub fn is_forced(&self, code: ForceCode) -> bool {
        self.forced.contains(&code)
    }

    /// Record one report
    pub fn process(&mut self, item: ReportItem) {
        let item = match item.forceable {
            Some(code) if item.is_error() && self.forced.contains(&code) => item.downgraded(),
            _ => item,
        };

        let code = item.code();
        let node = item.message.node().unwrap_or_default();
        match item.severity {
            Severity::Debug => debug!(code = %code, node = %node, "report"),
            Severity::Info => info!(code = %code, node = %node, "report"),
            Severity::Warning => warn!(code = %code, node = %node, "report"),
            Severity::Error => {
                error!(code = %code, node = %node, forceable = ?item.forceable, "report");
                self.error_count += 1;
            }
        }

        self.items.push(item);
    }

    /// Record several reports in order
    pub fn process_list(&mut self, items: impl IntoIterator<Item = ReportItem>) {
        for item in items {
            self.process(item);
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if an error has been recorded, meaning the caller must stop
    #[must_use]
    pub fn must_abort(&self) -> bool {
        self.has_errors()
    }

    /// Number of error-severity reports recorded
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// All recorded reports in insertion order
    #[must_use]
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    /// Error-severity reports in insertion order
    pub fn errors(&self) -> impl Iterator<Item = &ReportItem> {
        self.items.iter().filter(|item| item.is_error())
    }

    /// Current end of the item list
    #[must_use]
    pub fn mark(&self) -> ReportMark {
        ReportMark(self.items.len())
    }

    /// Reports recorded after `mark` was taken
    #[must_use]
    pub fn since(&self, mark: ReportMark) -> &[ReportItem] {
        self.items.get(mark.0..).unwrap_or_default()
    }

    /// Build the abort error from the errors recorded so far
    #[must_use]
    pub fn aborted(&self) -> LibraryError {
        LibraryError::OperationAborted {
            errors: self.errors().cloned().collect(),
        }
    }

    /// Fail with every recorded error if there is any
    ///
    /// # Errors
    /// Returns `LibraryError::OperationAborted` when an error was recorded.
    pub fn raise_if_errors(&self) -> Result<(), LibraryError> {
        if self.must_abort() {
            return Err(self.aborted());
        }
        Ok(())
    }

    /// Take the recorded reports
    #[must_use]
    pub fn into_items(self) -> Vec<ReportItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ReportCode, ReportMessage};

    fn node_error(node: &str) -> ReportMessage {
        ReportMessage::CorosyncConfigDistributionNodeError {
            node: node.to_string(),
        }
    }

    #[test]
    fn test_preserves_order() {
        let mut processor = ReportProcessor::new();
        processor.process(ReportItem::info(ReportMessage::CorosyncConfigDistributionStarted));
        processor.process(ReportItem::warning(node_error("node2")));
        processor.process(ReportItem::info(ReportMessage::CorosyncConfigReloaded));

        let codes: Vec<_> = processor.items().iter().map(ReportItem::code).collect();
        assert_eq!(
            codes,
            vec![
                ReportCode::CorosyncConfigDistributionStarted,
                ReportCode::CorosyncConfigDistributionNodeError,
                ReportCode::CorosyncConfigReloaded,
            ]
        );
        assert!(!processor.must_abort());
    }

    #[test]
    fn test_error_triggers_abort() {
        let mut processor = ReportProcessor::new();
        processor.process(ReportItem::warning(node_error("node1")));
        assert!(processor.raise_if_errors().is_ok());

        processor.process(ReportItem::error(node_error("node2")));
        assert!(processor.must_abort());
        assert_eq!(processor.error_count(), 1);

        match processor.raise_if_errors() {
            Err(LibraryError::OperationAborted { errors }) => {
                assert_eq!(errors, vec![ReportItem::error(node_error("node2"))]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_forced_error_becomes_warning() {
        let mut processor = ReportProcessor::with_force([ForceCode::SkipOfflineNodes]);
        processor.process(ReportItem::forceable_error(
            ForceCode::SkipOfflineNodes,
            node_error("node1"),
        ));
        processor.process(ReportItem::forceable_error(ForceCode::Force, node_error("node2")));

        assert_eq!(processor.items()[0].severity, Severity::Warning);
        assert_eq!(processor.items()[0].forceable, None);
        assert_eq!(processor.items()[1].severity, Severity::Error);
        assert_eq!(processor.error_count(), 1);
    }

    #[test]
    fn test_since_mark() {
        let mut processor = ReportProcessor::new();
        processor.process(ReportItem::info(ReportMessage::CorosyncConfigReloaded));
        let mark = processor.mark();
        assert!(processor.since(mark).is_empty());

        processor.process(ReportItem::error(node_error("node1")));
        assert_eq!(processor.since(mark).len(), 1);
        assert_eq!(processor.items().len(), 2);
    }
}
