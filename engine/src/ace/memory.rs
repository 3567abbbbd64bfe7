//! Context Memory
//!
//! Append-only, ordered log of context items accumulated over one optimization
//! run. Insertion order is the chronological order in which the curator emitted
//! items. The engine never truncates, reorders or deduplicates it; there is no
//! removal API at all.

use serde::{Deserialize, Serialize};

use super::types::ContextItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextMemory {
    items: Vec<ContextItem>,
}

impl ContextMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one item at the end
    pub fn push(&mut self, item: ContextItem) {
        self.items.push(item);
    }

    /// Append items at the end, preserving their order
    pub fn extend(&mut self, items: impl IntoIterator<Item = ContextItem>) {
        self.items.extend(items);
    }

    pub fn items(&self) -> &[ContextItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item contents joined with ", ", the form embedded into prompts
    pub fn joined_contents(&self) -> String {
        self.items
            .iter()
            .map(ContextItem::content)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Item contents in insertion order
    pub fn contents(&self) -> Vec<String> {
        self.items.iter().map(|i| i.content().to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a ContextMemory {
    type Item = &'a ContextItem;
    type IntoIter = std::slice::Iter<'a, ContextItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut memory = ContextMemory::new();
        memory.push(ContextItem::concept("first"));
        memory.extend(vec![
            ContextItem::concept("second"),
            ContextItem::fact("third"),
        ]);

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.contents(), vec!["first", "second", "third"]);
        assert_eq!(memory.joined_contents(), "first, second, third");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut memory = ContextMemory::new();
        memory.push(ContextItem::concept("same"));
        memory.push(ContextItem::concept("same"));
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_empty_memory_joins_to_empty_string() {
        let memory = ContextMemory::new();
        assert!(memory.is_empty());
        assert_eq!(memory.joined_contents(), "");
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut memory = ContextMemory::new();
        memory.push(ContextItem::observation("seen"));
        let json = serde_json::to_string(&memory).unwrap();
        assert_eq!(json, r#"[{"type":"observation","content":"seen"}]"#);
    }
}
