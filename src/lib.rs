//! # keylex
//!
//! A lexical analyser generator for fixed keyword lists.
//!
//! This library provides functionality to:
//! - Validate lists of literal terminals and read terminal files
//! - Assemble the terminals into an NFA, one chain per terminal unioned
//!   under a single start state with epsilon transitions
//! - Convert the NFA to a DFA using Subset Construction
//! - Compile the DFA into a compressed transition table and tokenize
//!   character streams, stopping each match at the first accepting state

// Re-export the modules
pub mod dfa;
pub mod fa;
pub mod nfa;
pub mod terminals;
pub mod tokenizer;

// Re-export commonly used functions for convenience
pub use dfa::construct_dfa;
pub use nfa::construct_nfa;
pub use terminals::{parse_terminal_list, read_terminal_file};
pub use tokenizer::{construct_tokenizer, load_tokenizer};
