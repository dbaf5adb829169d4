use super::failure_kind::FailureKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Failure counts grouped by kind. Raw messages are kept per kind, so failures that
/// differ only in their dynamic text still add up under the same kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorTally {
    kinds: BTreeMap<FailureKind, FailureKindTally>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureKindTally {
    pub count: u64,
    pub messages: BTreeMap<String, u64>,
}

impl ErrorTally {
    pub fn record(&mut self, kind: FailureKind, message: &str) {
        let tally = self.kinds.entry(kind).or_default();
        tally.count += 1;
        *tally.messages.entry(message.to_owned()).or_insert(0) += 1;
    }

    pub fn count(&self, kind: FailureKind) -> u64 {
        self.kinds.get(&kind).map(|tally| tally.count).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.kinds.values().map(|tally| tally.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn get(&self, kind: FailureKind) -> Option<&FailureKindTally> {
        self.kinds.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FailureKind, &FailureKindTally)> {
        self.kinds.iter()
    }
}

impl FailureKindTally {
    /// Messages ordered by descending count, ties broken alphabetically.
    pub fn messages_by_count(&self) -> Vec<(&str, u64)> {
        let mut messages = self
            .messages
            .iter()
            .map(|(message, count)| (message.as_str(), *count))
            .collect::<Vec<_>>();
        messages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        messages
    }
}
