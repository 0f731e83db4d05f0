use bitvec::prelude::*;
use color_eyre::eyre::{Report, Result};
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::Write;
use std::process::Command;

use crate::fa::{FAState, Symbol, FA};
use crate::terminals::{Terminal, TerminalError};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NFAState {
    id: usize,
    transitions: HashMap<Symbol, HashSet<usize>>, // Store by reference is not a thing in Rust
    terminal: String,
    priority: usize,
}

#[derive(Debug)]
pub struct NFA {
    states: Vec<NFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    alphabet: HashSet<char>,
}

impl FA for NFA {
    fn show_fa(&self, filename: &str) {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        // Add nodes
        for state in &self.states {
            let node = graph.add_node(format!("State {}", state.id));
            node_map.insert(state.id, node);
        }

        // Add edges
        for state in &self.states {
            for (symbol, targets) in &state.transitions {
                for target in targets {
                    let symbol_str = match symbol {
                        Symbol::Char(c) => c.to_string(),
                        Symbol::Epsilon => "eps".to_string(),
                    };
                    graph.add_edge(node_map[&state.id], node_map[target], symbol_str);
                }
            }
        }

        // Mark Start and Accept States

        let start_node = node_map[&self.get_start_state()];
        graph[start_node] = format!("Start\nState {}", self.get_start_state());

        let accept_states: Vec<usize> = self.accept_states.iter_ones().collect();

        for accept in accept_states {
            let accept_node = node_map[&accept];
            graph[accept_node] = format!("Accept\nState {}", accept);
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

        println!("NFA visualization saved as {filename}.jpg");
    }

    fn add_state(&mut self) -> usize {
        let state_id = self.get_num_states();
        let new_state: NFAState = NFAState::new(state_id);
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

impl FAState for NFAState {
    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.entry(symbol).or_default().insert(to);
    }
}

impl NFAState {
    fn new(id: usize) -> Self {
        NFAState {
            id,
            transitions: HashMap::new(),
            terminal: String::new(),
            priority: usize::MAX,
        }
    }

    pub fn get_transitions(&self) -> &HashMap<Symbol, HashSet<usize>> {
        &self.transitions
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    /// The terminal recognized at this state. Empty unless the state is the
    /// end of a terminal chain.
    pub fn get_terminal(&self) -> &String {
        &self.terminal
    }

    /// Registration index of the recognized terminal. Lower indices win
    /// when a determinized state holds several accepting chain ends.
    pub fn get_priority(&self) -> usize {
        self.priority
    }
}

impl NFA {
    fn new() -> Self {
        NFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            alphabet: HashSet::new(),
        }
    }

    fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize) {
        self.states[from].add_transition(symbol, to);
    }

    fn set_accept_state(&mut self, state_id: usize) {
        self.accept_states.set(state_id, true);
    }

    fn add_alphabet(&mut self, ch: char) {
        self.alphabet.insert(ch);
    }

    fn set_accept_terminal(&mut self, state_id: usize, terminal: &str, priority: usize) {
        let state = &mut self.states[state_id];
        state.terminal = terminal.to_string();
        state.priority = priority;
    }

    pub fn get_state(&self, id: usize) -> Option<&NFAState> {
        self.states.get(id)
    }
}

/// Assemble an NFA from the terminal list. Each terminal becomes a disjoint
/// linear chain of states, one transition per pattern character, whose final
/// state accepts with the terminal's name. The chains are unioned under
/// state 0 with an epsilon transition to each chain start, so state 0 keeps
/// no outgoing character transition of its own. If save_nfa is set to true,
/// the constructed NFA is saved as a jpg.
pub fn construct_nfa(mut terminal_list: VecDeque<Terminal>, save_nfa: bool) -> Result<NFA> {
    if terminal_list.is_empty() {
        return Err(Report::new(TerminalError::EmptyTerminalList));
    }

    let mut result = NFA::new();

    let start = result.add_state(); // state 0 is reserved for the start state

    let mut fake_initial_states: Vec<usize> = Vec::new();

    let mut priority = 0;

    while let Some(terminal) = terminal_list.pop_front() {
        let chain_start = result.add_state();
        fake_initial_states.push(chain_start);

        let mut current = chain_start;

        for ch in terminal.get_pattern().chars() {
            let next = result.add_state();
            result.add_alphabet(ch);
            result.add_transition(current, Symbol::Char(ch), next);
            current = next;
        }

        result.set_accept_state(current);
        result.set_accept_terminal(current, terminal.get_name(), priority);

        priority += 1;
    }

    // Union the per-terminal chains under the start state
    for fake_initial in fake_initial_states {
        result.add_transition(start, Symbol::Epsilon, fake_initial);
    }

    if save_nfa {
        result.show_fa("constructed_nfa");
    }

    Ok(result)
}
