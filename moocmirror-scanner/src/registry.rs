use std::collections::HashSet;

/// Identities already constructed or scheduled during one run.
///
/// Owned by a single traversal; created empty and never pruned.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-insert. Returns `true` when `identity` had not been seen.
    pub fn register(&mut self, identity: &str) -> bool {
        if self.seen.contains(identity) {
            return false;
        }
        self.seen.insert(identity.to_string());
        self.order.push(identity.to_string());
        true
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Identities in registration order.
    pub fn identities(&self) -> &[String] {
        &self.order
    }
}
