//! The interception policy: which event types must never reach
//! page-registered handlers. Membership is fixed at construction.

use std::collections::HashSet;

/// Lower-cased set of event-type names to block. Consulted case-insensitively
/// on every registration attempt for the life of the page.
#[derive(Debug, Clone)]
pub struct InterceptionPolicy {
    blocked: HashSet<String>,
}

/// Event types pages commonly abuse to break selection and clipboard use.
const DEFAULT_BLOCKLIST: &[&str] = &[
    "copy",
    "cut",
    "paste",
    "selectstart",
    "contextmenu",
    "keydown",
    "keyup",
];

impl InterceptionPolicy {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether `event_type` must be dropped. Case-insensitive.
    pub fn blocks(&self, event_type: &str) -> bool {
        self.blocked.contains(&event_type.to_ascii_lowercase())
    }

    pub fn blocked_events(&self) -> impl Iterator<Item = &str> {
        self.blocked.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }
}

impl Default for InterceptionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKLIST.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_blocklist_members() {
        let policy = InterceptionPolicy::default();
        for ev in ["copy", "cut", "paste", "selectstart", "contextmenu", "keydown", "keyup"] {
            assert!(policy.blocks(ev), "expected '{ev}' to be blocked");
        }
        assert!(!policy.blocks("click"));
        assert!(!policy.blocks("mousemove"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let policy = InterceptionPolicy::default();
        assert!(policy.blocks("Copy"));
        assert!(policy.blocks("SELECTSTART"));
        assert!(policy.blocks("ContextMenu"));
    }

    #[test]
    fn custom_membership_is_fixed() {
        let policy = InterceptionPolicy::new(["copy", "DragStart"]);
        assert!(policy.blocks("copy"));
        assert!(policy.blocks("dragstart"));
        assert!(!policy.blocks("paste"));
        assert_eq!(policy.len(), 2);
    }
}
