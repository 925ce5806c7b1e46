//! Deterministic-automaton construction.
//!
//! Subset construction over the validated nondeterministic table, followed
//! by all-pairs shortest paths (Floyd–Warshall) projected onto the chosen
//! final state. Construction is fully deterministic: the alphabet is
//! iterated in sorted order and the worklist is FIFO, so repeated builds
//! assign identical state ids.

use super::description::{AutomatonDescription, Nfa, RawStateId};
use super::{Dfa, DistanceTable, StateId};
use crate::error::AutomatonBuildError;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// Build the deterministic automaton and its distance table from a raw
/// description.
pub fn build(
    description: &AutomatonDescription,
) -> Result<(Dfa, DistanceTable), AutomatonBuildError> {
    let nfa = description.validate()?;
    let dfa = determinize(&nfa);
    let distances = minimal_distances(&dfa);

    info!(
        states = dfa.state_count(),
        symbols = dfa.alphabet().len(),
        finals = dfa.finals().len(),
        target = dfa.label(distances.target()),
        "Built deterministic automaton"
    );

    Ok((dfa, distances))
}

/// Subset construction. Deterministic states are canonically sorted
/// subsets of raw state ids, interned in discovery order; the empty
/// subset is DEAD and never materialized.
fn determinize(nfa: &Nfa) -> Dfa {
    let alphabet: Vec<char> = nfa.alphabet.iter().copied().collect();

    let mut subsets: Vec<Vec<RawStateId>> = Vec::new();
    let mut index: HashMap<Vec<RawStateId>, StateId> = HashMap::new();
    let mut queue: VecDeque<StateId> = VecDeque::new();

    let start = vec![nfa.initial];
    index.insert(start.clone(), 0);
    subsets.push(start);
    queue.push_back(0);

    let mut transitions: Vec<Vec<Option<StateId>>> = Vec::new();

    while let Some(state) = queue.pop_front() {
        let subset = subsets[state].clone();
        let mut row: Vec<Option<StateId>> = Vec::with_capacity(alphabet.len());

        for &symbol in &alphabet {
            let mut destinations: Vec<RawStateId> = Vec::new();
            for &raw in &subset {
                if let Some(targets) = nfa.transitions.get(&(raw, symbol)) {
                    for &target in targets {
                        if !destinations.contains(&target) {
                            destinations.push(target);
                        }
                    }
                }
            }

            if destinations.is_empty() {
                row.push(None);
                continue;
            }

            destinations.sort_unstable();
            let next = match index.get(&destinations) {
                Some(&existing) => existing,
                None => {
                    let id = subsets.len();
                    index.insert(destinations.clone(), id);
                    subsets.push(destinations);
                    queue.push_back(id);
                    id
                }
            };
            row.push(Some(next));
        }

        // Rows are produced in FIFO discovery order, so indices line up.
        debug_assert_eq!(transitions.len(), state);
        transitions.push(row);
    }

    let finals: Vec<StateId> = subsets
        .iter()
        .enumerate()
        .filter(|(_, subset)| subset.iter().any(|raw| nfa.finals.contains(raw)))
        .map(|(id, _)| id)
        .collect();

    let labels: Vec<String> = subsets.iter().map(|subset| subset_label(nfa, subset)).collect();

    Dfa::new(alphabet, 0, finals, transitions, labels)
}

fn subset_label(nfa: &Nfa, subset: &[RawStateId]) -> String {
    let names: Vec<&str> = subset
        .iter()
        .map(|raw| nfa.names.get(raw).map_or("?", String::as_str))
        .collect();
    format!("{{{}}}", names.join(","))
}

/// All-pairs shortest paths over the deterministic states (DEAD excluded),
/// projected onto the chosen final state.
///
/// Each existing transition has weight 1 regardless of symbol; a state is
/// at distance 0 from itself. When several final states exist the one with
/// the smallest id (first discovered) is chosen.
fn minimal_distances(dfa: &Dfa) -> DistanceTable {
    const INF: u32 = DistanceTable::UNREACHABLE;
    let n = dfa.state_count();

    let mut dist = vec![vec![INF; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = 0;
        for &symbol in dfa.alphabet() {
            if let Some(j) = dfa.step(i, symbol) {
                if j != i {
                    row[j] = 1;
                }
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }

    // finals() is sorted and non-empty once validation has passed.
    let target = dfa.finals()[0];
    if dfa.finals().len() > 1 {
        debug!(
            finals = dfa.finals().len(),
            target = dfa.label(target),
            "Multiple final states, distances measured to the first discovered"
        );
    }

    let distances: Vec<u32> = (0..n).map(|i| dist[i][target]).collect();
    DistanceTable::new(distances, target)
}
