//! Raw automaton description documents.
//!
//! The upstream converter (PutFlap) turns an authored `.jff` diagram into a
//! JSON document with a list of states and a list of transitions. That
//! document is consumed here as-is; this module only deserializes and
//! validates it into a nondeterministic transition table for the builder.

use crate::error::AutomatonBuildError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Raw state id as declared in the description document.
pub type RawStateId = u32;

/// One state of the raw nondeterministic description.
#[derive(Debug, Clone, Deserialize)]
pub struct RawState {
    pub id: RawStateId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StateKind,
}

/// Declared role of a raw state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateKind {
    Normal,
    Initial,
    Final,
}

/// One edge of the raw nondeterministic description.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransition {
    pub from: RawStateId,
    pub to: RawStateId,
    pub read: String,
}

/// The states-and-transitions document produced by the converter.
#[derive(Debug, Clone, Deserialize)]
pub struct AutomatonDescription {
    pub states: Vec<RawState>,
    pub transitions: Vec<RawTransition>,
}

/// PutFlap wraps the converted automaton in a conversion report; the
/// loader accepts both the wrapped and the plain document shape.
#[derive(Debug, Deserialize)]
struct ConversionReport {
    conversions: Vec<Conversion>,
}

#[derive(Debug, Deserialize)]
struct Conversion {
    result: AutomatonDescription,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionDocument {
    Report(ConversionReport),
    Plain(AutomatonDescription),
}

impl AutomatonDescription {
    /// Load a description document from disk.
    ///
    /// Accepts either the plain `{states, transitions}` shape or the
    /// PutFlap conversion-report wrapper (`conversions[0].result`).
    pub fn load(path: &Path) -> Result<Self, AutomatonBuildError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AutomatonBuildError::Document {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let document: DescriptionDocument =
            serde_json::from_str(&content).map_err(|e| AutomatonBuildError::Document {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        match document {
            DescriptionDocument::Plain(description) => Ok(description),
            DescriptionDocument::Report(report) => report
                .conversions
                .into_iter()
                .next()
                .map(|c| c.result)
                .ok_or_else(|| AutomatonBuildError::EmptyConversionReport {
                    path: path.to_path_buf(),
                }),
        }
    }

    /// Validate the description and reconstruct the nondeterministic
    /// transition table the subset construction starts from.
    pub(crate) fn validate(&self) -> Result<Nfa, AutomatonBuildError> {
        let mut names: BTreeMap<RawStateId, String> = BTreeMap::new();
        let mut initial: Option<RawStateId> = None;
        let mut finals: BTreeSet<RawStateId> = BTreeSet::new();

        for state in &self.states {
            names.insert(state.id, state.name.clone());
            match state.kind {
                StateKind::Initial => {
                    if let Some(first) = initial {
                        return Err(AutomatonBuildError::MultipleInitial {
                            first,
                            second: state.id,
                        });
                    }
                    initial = Some(state.id);
                }
                StateKind::Final => {
                    finals.insert(state.id);
                }
                StateKind::Normal => {}
            }
        }

        let initial = initial.ok_or(AutomatonBuildError::MissingInitial)?;
        if finals.is_empty() {
            return Err(AutomatonBuildError::MissingFinal);
        }

        let mut alphabet: BTreeSet<char> = BTreeSet::new();
        let mut transitions: BTreeMap<(RawStateId, char), BTreeSet<RawStateId>> = BTreeMap::new();

        for edge in &self.transitions {
            for endpoint in [edge.from, edge.to] {
                if !names.contains_key(&endpoint) {
                    return Err(AutomatonBuildError::DanglingStateRef {
                        from: edge.from,
                        to: edge.to,
                        unknown: endpoint,
                    });
                }
            }

            let mut chars = edge.read.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(symbol), None) => symbol,
                (None, _) => {
                    return Err(AutomatonBuildError::EmptySymbol {
                        from: edge.from,
                        to: edge.to,
                    })
                }
                (Some(_), Some(_)) => {
                    return Err(AutomatonBuildError::MultiCharSymbol {
                        from: edge.from,
                        to: edge.to,
                        read: edge.read.clone(),
                    })
                }
            };

            alphabet.insert(symbol);
            transitions
                .entry((edge.from, symbol))
                .or_default()
                .insert(edge.to);
        }

        debug!(
            states = self.states.len(),
            edges = self.transitions.len(),
            symbols = alphabet.len(),
            "Validated raw automaton description"
        );

        Ok(Nfa {
            names,
            alphabet,
            initial,
            finals,
            transitions,
        })
    }
}

/// Validated nondeterministic transition table, input to the subset
/// construction.
pub(crate) struct Nfa {
    pub names: BTreeMap<RawStateId, String>,
    pub alphabet: BTreeSet<char>,
    pub initial: RawStateId,
    pub finals: BTreeSet<RawStateId>,
    pub transitions: BTreeMap<(RawStateId, char), BTreeSet<RawStateId>>,
}
