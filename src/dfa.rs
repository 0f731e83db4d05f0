/* Perform subset construction to convert the terminal NFA into a DFA. The
 * construction runs the full fixed point: every discovered subset goes back
 * on the work list until no new subsets appear, so terminals sharing a
 * common prefix of any length end up disambiguated. */

use crate::fa::{Symbol, FA};
use crate::nfa::NFA;
use bitvec::prelude::*;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::VecDeque;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::Write;
use std::process::Command;

/// A struct which is a bitvec and its hash stored together to ease fetching
/// the hash of the bitvec quickly instead of calculating it each time.
#[derive(Clone)]
struct HashedBitVec {
    bv: BitVec<u8>,
    hash: u64,
}

impl HashedBitVec {
    fn new(bv: BitVec<u8>) -> Self {
        let mut hasher = DefaultHasher::new();
        bv.hash(&mut hasher);
        let hash = hasher.finish();
        Self { bv, hash }
    }
}

impl Hash for HashedBitVec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for HashedBitVec {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bv == other.bv
    }
}

impl Eq for HashedBitVec {}

#[derive(Debug)]
pub struct DFA {
    states: Vec<DFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    alphabet: HashSet<char>,
}

#[derive(Debug, Clone)]
pub struct DFAState {
    transitions: HashMap<Symbol, usize>,
    terminal: String,
}

impl FA for DFA {
    fn show_fa(&self, filename: &str) {
        let mut graph: DiGraph<String, String> = DiGraph::new();

        for state_idx in 0..self.states.len() {
            graph.add_node(format!("State {}", state_idx));
        }

        // Merge parallel transitions into one labeled edge per state pair

        let mut edge_labels: HashMap<(usize, usize), String> = HashMap::new();

        for (state_idx, state) in self.states.iter().enumerate() {
            let mut symbols: Vec<(&Symbol, &usize)> = state.transitions.iter().collect();
            symbols.sort_by_key(|(symbol, _)| match symbol {
                Symbol::Char(ch) => *ch,
                Symbol::Epsilon => char::MAX,
            });

            for (symbol, target) in symbols {
                let symbol_str = match symbol {
                    Symbol::Char(ch) => ch.to_string(),
                    Symbol::Epsilon => "eps".to_string(),
                };

                let label = edge_labels.entry((state_idx, *target)).or_default();

                if label.is_empty() {
                    *label = symbol_str;
                } else {
                    *label = format!("{}, {}", label, symbol_str);
                }
            }
        }

        for ((from, to), label) in edge_labels {
            graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), label);
        }

        let start_state = self.get_start_state();
        graph[NodeIndex::new(start_state)] = format!("Start\nState {}", start_state);

        for accept in self.accept_states.iter_ones() {
            graph[NodeIndex::new(accept)] = format!("Accept\nState {}", accept);
        }

        let dot = Dot::new(&graph);

        // Write dot to file
        let dot_filename = format!("{}.dot", filename);
        let mut dot_file = File::create(&dot_filename).expect("Failed to create dot file");

        dot_file
            .write_all(dot.to_string().as_bytes())
            .expect("Failed to write dot file");

        Command::new("dot")
            .args(["-Tjpg", &dot_filename, "-o", &format!("{}.jpg", filename)])
            .output()
            .expect("Failed to execute Graphviz");

        println!("DFA visualization saved as {}.jpg", filename);
    }

    fn add_state(&mut self) -> usize {
        let state_id = self.states.len();
        let new_state: DFAState = DFAState::new();
        self.states.push(new_state);
        self.accept_states.push(false);
        state_id
    }

    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet(&self) -> &HashSet<char> {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }
}

impl DFAState {
    fn new() -> Self {
        DFAState {
            transitions: HashMap::new(),
            terminal: String::new(),
        }
    }

    /// Get a list of all outgoing transitions for the given state
    pub fn get_transitions(&self) -> &HashMap<Symbol, usize> {
        &self.transitions
    }

    fn set_terminal(&mut self, terminal: &str) {
        self.terminal = terminal.to_string();
    }

    /// Get the terminal which this DFA state accepts if it is an accept
    /// state. Otherwise it returns an empty string.
    pub fn get_terminal(&self) -> &String {
        &self.terminal
    }
}

impl DFA {
    fn new() -> Self {
        DFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            alphabet: HashSet::new(),
        }
    }

    /// Returns a reference to the DFA state whose id is provided
    pub fn get_state(&self, id: usize) -> &DFAState {
        self.states.get(id).unwrap()
    }
}

fn get_epsilon_closure(nfa: &NFA, nfa_states: BitVec<u8>) -> HashedBitVec {
    let num_states: usize = nfa.get_num_states();

    let mut epsilon_closure: BitVec<u8, Lsb0> = BitVec::repeat(false, num_states);

    let mut visited: BitVec<u8, Lsb0> = BitVec::repeat(false, num_states);

    let mut work_list: VecDeque<usize> = nfa_states.iter_ones().collect();

    while let Some(state_id) = work_list.pop_front() {
        let state = nfa.get_state(state_id).unwrap();

        if let Some(targets) = state.get_transitions().get(&Symbol::Epsilon) {
            for target in targets {
                let target = *target;
                if !visited[target] {
                    visited.set(target, true);
                    work_list.push_back(target);
                }
            }
        }

        epsilon_closure.set(state.get_id(), true); // Adding the state itself to the epsilon closure
    }

    HashedBitVec::new(epsilon_closure)
}

// This function returns the set of states accessible via char c within the set q

fn delta(nfa: &NFA, q: &HashedBitVec, c: char) -> BitVec<u8> {
    let mut result = BitVec::repeat(false, q.bv.len());

    for node in q.bv.iter_ones() {
        let nfa_state = nfa.get_state(node).unwrap();

        let target_state_ids = match nfa_state.get_transitions().get(&Symbol::Char(c)) {
            None => continue,
            Some(state_ids) => state_ids,
        };

        for state_id in target_state_ids {
            result.set(*state_id, true);
        }
    }

    result
}

// A subset accepts if any member NFA state accepts. When chain ends of
// several terminals share the subset, the earliest registered terminal
// supplies the label.
fn mark_accepting(dfa: &mut DFA, nfa: &NFA, di: usize, subset: &HashedBitVec) {
    let nfa_accepts = nfa.get_acceptor_states();

    let mut best_priority = usize::MAX;

    for state_id in subset.bv.iter_ones() {
        if !nfa_accepts[state_id] {
            continue;
        }

        let state = nfa.get_state(state_id).unwrap();

        if state.get_priority() < best_priority {
            best_priority = state.get_priority();
            dfa.accept_states.set(di, true);
            dfa.states[di].set_terminal(state.get_terminal());
        }
    }
}

///  Apply the subset construction algorithm on an NFA to build a DFA. If
///  save_dfa is set to true, the constructed DFA is saved as a jpg.
pub fn construct_dfa(nfa: &NFA, save_dfa: bool) -> DFA {
    let mut result = DFA::new(); // Create new DFA
    result.alphabet = nfa.get_alphabet().clone(); // DFA has same alphabet as NFA

    let di = result.add_state(); // Add an initial state

    result.start_state = di;
    let n0: usize = nfa.get_start_state(); // Get n0
    let mut q_list = HashMap::new(); // Mapping from nfa state set to DFA state
    let mut work_list = VecDeque::new();

    let mut nfa_states = BitVec::repeat(false, nfa.get_num_states()); // Get the initial nfa states
    nfa_states.set(n0, true); // Add the start state to nfa states set

    let q0 = get_epsilon_closure(nfa, nfa_states); // Get its epsilon closure
    q_list.insert(q0.clone(), di); // Add it to the mapping
    work_list.push_back(q0.clone()); // Add the first nfa states set to the work list

    mark_accepting(&mut result, nfa, di, &q0);

    while let Some(q) = work_list.pop_front() {
        for c in nfa.get_alphabet().iter() {
            // Since NFAs and DFAs have the same alphabet, and we cannot
            // borrow the DFAs alphabet as immutable we borrow the NFAs
            // alphabet
            let end_states = delta(nfa, &q, *c);
            if end_states.not_any() {
                continue;
            }

            let t = get_epsilon_closure(nfa, end_states);

            let di = if let Some(&existing_di) = q_list.get(&t) {
                // This is an expensive operation
                existing_di
            } else {
                let di = result.add_state();

                q_list.insert(t.clone(), di); // This is an expensive operation

                work_list.push_back(t.clone());

                mark_accepting(&mut result, nfa, di, &t);

                di
            };

            // add a transition from dq to di
            let dq = *q_list.get(&q).unwrap(); // This is an expensive operation
            result.states[dq].transitions.insert(Symbol::Char(*c), di);
        }
    }

    if save_dfa {
        result.show_fa("constructed_dfa");
    }

    result
}
