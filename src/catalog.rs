//! Tracked events and legal event pairs.
//!
//! The catalog is a view over configuration ∩ alphabet: symbols described
//! in the target configuration but absent from the automaton's alphabet are
//! dropped silently. The pair catalog is derived purely from the automaton's
//! transition table.

use crate::automaton::Dfa;
use crate::target::EventInfo;
use std::collections::{BTreeMap, BTreeSet};

/// Descriptive metadata for one tracked symbol.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    pub symbol: char,
    pub description: String,
    pub reason: String,
    pub dependency: String,
    pub warning: Option<String>,
}

/// Tracked symbols with their descriptors, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    entries: BTreeMap<char, EventDescriptor>,
}

impl EventCatalog {
    /// Build the catalog from per-symbol configuration, restricted to the
    /// automaton's alphabet. A missing alphabet yields an empty catalog,
    /// not an error.
    pub fn from_config(
        dfa: &Dfa,
        events: &BTreeMap<String, EventInfo>,
        warnings: &BTreeMap<String, String>,
    ) -> Self {
        let mut entries = BTreeMap::new();
        for (id, info) in events {
            let Some(symbol) = single_char(id) else {
                continue;
            };
            if !dfa.contains_symbol(symbol) {
                continue;
            }
            entries.insert(
                symbol,
                EventDescriptor {
                    symbol,
                    description: info.info.clone(),
                    reason: info.reason.clone(),
                    dependency: info.dependency.clone(),
                    warning: warnings.get(id).cloned(),
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, symbol: char) -> Option<&EventDescriptor> {
        self.entries.get(&symbol)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.entries.values()
    }

    /// Tracked symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.keys().copied()
    }
}

/// Ordered symbol pairs `(a, b)` such that some state has a non-dead
/// transition on `a` to a state that itself has a non-dead transition
/// on `b`.
#[derive(Debug, Clone, Default)]
pub struct EventPairCatalog {
    pairs: BTreeSet<(char, char)>,
}

impl EventPairCatalog {
    /// Compute the legal pair set from the automaton's transition table.
    pub fn from_dfa(dfa: &Dfa) -> Self {
        let mut pairs = BTreeSet::new();
        for state in 0..dfa.state_count() {
            for &first in dfa.alphabet() {
                let Some(middle) = dfa.step(state, first) else {
                    continue;
                };
                for &second in dfa.alphabet() {
                    if dfa.step(middle, second).is_some() {
                        pairs.insert((first, second));
                    }
                }
            }
        }
        Self { pairs }
    }

    pub fn contains(&self, first: char, second: char) -> bool {
        self.pairs.contains(&(first, second))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.pairs.iter().copied()
    }
}

fn single_char(id: &str) -> Option<char> {
    let mut chars = id.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::AutomatonDescription;

    fn linear_dfa() -> Dfa {
        // q0 --a--> q1 --b--> q2(final)
        let description: AutomatonDescription = serde_json::from_str(
            r#"{
                "states": [
                    {"id": 0, "name": "q0", "type": "INITIAL"},
                    {"id": 1, "name": "q1", "type": "NORMAL"},
                    {"id": 2, "name": "q2", "type": "FINAL"}
                ],
                "transitions": [
                    {"from": 0, "to": 1, "read": "a"},
                    {"from": 1, "to": 2, "read": "b"}
                ]
            }"#,
        )
        .unwrap();
        crate::automaton::build(&description).unwrap().0
    }

    #[test]
    fn catalog_drops_symbols_outside_alphabet() {
        let dfa = linear_dfa();
        let mut events = BTreeMap::new();
        for id in ["a", "b", "z"] {
            events.insert(
                id.to_string(),
                EventInfo {
                    info: format!("event {id}"),
                    reason: String::new(),
                    dependency: String::new(),
                },
            );
        }
        let catalog = EventCatalog::from_config(&dfa, &events, &BTreeMap::new());
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains('a'));
        assert!(catalog.contains('b'));
        assert!(!catalog.contains('z'));
    }

    #[test]
    fn catalog_attaches_warning_text() {
        let dfa = linear_dfa();
        let mut events = BTreeMap::new();
        events.insert(
            "a".to_string(),
            EventInfo {
                info: "first".into(),
                reason: "r".into(),
                dependency: "d".into(),
            },
        );
        let mut warnings = BTreeMap::new();
        warnings.insert("a".to_string(), "careful".to_string());

        let catalog = EventCatalog::from_config(&dfa, &events, &warnings);
        assert_eq!(catalog.get('a').unwrap().warning.as_deref(), Some("careful"));
    }

    #[test]
    fn pair_catalog_follows_transition_table() {
        let dfa = linear_dfa();
        let pairs = EventPairCatalog::from_dfa(&dfa);
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains('a', 'b'));
        assert!(!pairs.contains('b', 'a'));
    }
}
