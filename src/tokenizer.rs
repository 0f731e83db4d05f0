/* Implementation of the table driven tokenizer. The DFA built from the
 * terminal list is compressed into a dense transition table which the
 * runtime walks over a character source, discarding whitespace between
 * tokens. Matching stops at the first accepting state reached, so when one
 * terminal is a literal prefix of another the shorter one is reported. */

use bitvec::vec::BitVec;

use serde::{Deserialize, Serialize};

use crate::dfa::DFA;
use crate::fa::{Symbol, FA};
use color_eyre::eyre::{Report, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::{BufReader, Read, Write};

/// Characters discarded between tokens.
const WHITESPACE: [char; 4] = [' ', '\n', '\r', '\t'];

/// Outcome of one successful next_token call.
#[derive(Debug, PartialEq, Eq)]
pub enum Scan {
    /// Name of the terminal matched next in the stream
    Terminal(String),
    /// Clean end of stream reached between tokens
    Eof,
}

impl fmt::Display for Scan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scan::Terminal(name) => write!(f, "{}", name),
            Scan::Eof => write!(f, "EOF"),
        }
    }
}

/// List of possible errors in the tokenizer
#[derive(Debug)]
pub enum TokenizerError {
    /// Found an epsilon transition in a DFA
    EpsilonInDFA,
    /// The stream ended in the middle of a token match
    EndOfStream(String),
    /// No transition is defined for the current state and character
    InvalidInput(String),
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::EpsilonInDFA => {
                write!(f, "Error: Found an epsilon transition in a DFA!")
            }
            TokenizerError::EndOfStream(lexeme) => write!(
                f,
                "Error: Input ended in the middle of a token! Read {} so far",
                lexeme
            ),
            TokenizerError::InvalidInput(lexeme) => {
                write!(f, "Error: {} does not start any known terminal!", lexeme)
            }
        }
    }
}

impl std::error::Error for TokenizerError {}

#[derive(Debug)]
pub enum SourceError {
    ReadFailed,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "Error: Reading from the input source failed!"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A sequential character source. One character is handed out per call and
/// the end of the stream is signalled once with None.
pub trait CharSource {
    fn next_char(&mut self) -> Result<Option<char>>;
}

impl CharSource for std::str::Chars<'_> {
    fn next_char(&mut self) -> Result<Option<char>> {
        Ok(self.next())
    }
}

/// Byte at a time source over any reader. Terminal alphabets are ASCII so
/// every byte is one character.
pub struct ReaderSource<R: Read> {
    buf_reader: BufReader<R>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        ReaderSource {
            buf_reader: BufReader::new(inner),
        }
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        let mut byte = [0u8; 1];

        match self.buf_reader.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0].into())),
            Err(_) => Err(Report::new(SourceError::ReadFailed)),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Tokenizer {
    transition_table: Vec<Vec<usize>>, // Matrix of character classes and dfa states
    classifier_table: HashMap<char, usize>, // Mapping from alphabet to its class id
    terminal_table: HashMap<usize, String>, // Mapping of accept state number and terminal name
    error_state: usize,
    accept_states: BitVec<u8>,
    start_state: usize,
}

impl Tokenizer {
    fn new() -> Self {
        Tokenizer {
            transition_table: vec![],
            classifier_table: HashMap::new(),
            terminal_table: HashMap::new(),
            error_state: 0,
            accept_states: BitVec::new(),
            start_state: 0,
        }
    }

    fn compress_init_table(&mut self, init_table: &[Vec<usize>], alphabet: &[char]) {
        // Generate a 64 bit hash for each column based on contents
        // Map each hash with a class id
        // If 2 columns get the same hash, they will have the same class id.
        // We can use this to map the alphabet with the class id in the classifier table
        // Fill in the compressed transition table using the init table and the grouping table

        let num_rows = init_table.len();

        let mut hash_to_class_map: HashMap<u64, usize> = HashMap::new();

        for (col_id, ch) in alphabet.iter().enumerate() {
            let mut hasher = DefaultHasher::new();

            for row in init_table.iter() {
                row[col_id].hash(&mut hasher);
            }

            let hash = hasher.finish(); // Generate the 64 bit hash for the column
            let next_class = hash_to_class_map.len(); // Map the hash with a class id
            let class_id = *hash_to_class_map.entry(hash).or_insert(next_class);
            self.classifier_table.insert(*ch, class_id);
        }

        // Add nstates number of rows and nclasses number of columns for the transition table

        let num_classes = hash_to_class_map.len();

        self.transition_table = vec![vec![self.error_state; num_classes]; num_rows];

        // Compress the transition table columns by getting the class id for each character

        for (row_id, row) in init_table.iter().enumerate() {
            for (col_id, target) in row.iter().enumerate() {
                let class_id = self.classifier_table.get(&alphabet[col_id]).unwrap();
                self.transition_table[row_id][*class_id] = *target;
            }
        }
    }

    fn init_transition_table(&mut self, dfa: &DFA) -> Result<(), TokenizerError> {
        // Add a column for every character in the alphabet and a row for
        // every state in the DFA, plus one explicit error row. Missing
        // transitions land in the error state.

        let mut alphabet: Vec<char> = dfa.get_alphabet().iter().cloned().collect();
        let num_states = dfa.get_num_states(); // The number of rows in the transition table

        alphabet.sort(); // Sort the alphabet so that the transition table is in order

        let mut init_transition_table: Vec<Vec<usize>> =
            vec![vec![num_states; alphabet.len()]; num_states + 1];

        for (state_id, row) in init_transition_table
            .iter_mut()
            .enumerate()
            .take(num_states)
        {
            // For all states
            let dfa_state = dfa.get_state(state_id);

            for (symbol, target) in dfa_state.get_transitions() {
                // And all transitions for that state
                let symbol = match symbol {
                    Symbol::Epsilon => return Err(TokenizerError::EpsilonInDFA),
                    Symbol::Char(ch) => ch,
                };

                let char_index = alphabet.binary_search(symbol).unwrap(); // Get the index in the sorted alphabet set for the character

                row[char_index] = *target;
            }
        }

        self.error_state = num_states;

        self.start_state = dfa.get_start_state();

        self.accept_states = dfa.get_acceptor_states().clone();

        self.accept_states.push(false); // The error state never accepts

        self.compress_init_table(&init_transition_table, &alphabet);

        Ok(())
    }

    fn init_terminal_table(&mut self, dfa: &DFA) {
        let accept_states = dfa.get_acceptor_states();

        for accept_state in accept_states.iter_ones() {
            let terminal = dfa.get_state(accept_state).get_terminal();
            self.terminal_table
                .insert(accept_state, terminal.to_string());
        }
    }

    /// Return the name of the terminal matched next in the source, or
    /// Scan::Eof on a clean end of stream between tokens. The match ends at
    /// the first accepting state reached; no longer match is attempted.
    pub fn next_token(&self, source: &mut impl CharSource) -> Result<Scan> {
        // Skip phase: discard separators. End of stream here is a
        // successful EOF, not an error.
        let mut ch;
        loop {
            match source.next_char()? {
                None => return Ok(Scan::Eof),
                Some(next) => {
                    if WHITESPACE.contains(&next) {
                        continue;
                    }
                    ch = next;
                    break;
                }
            }
        }

        // Match phase: walk the table from the start state until the first
        // accepting state
        let mut state = self.start_state;
        let mut lexeme = String::new();

        loop {
            lexeme.push(ch);

            let next_state = match self.classifier_table.get(&ch) {
                None => self.error_state,
                Some(class_id) => self.transition_table[state][*class_id],
            };

            if next_state == self.error_state {
                return Err(Report::new(TokenizerError::InvalidInput(lexeme)));
            }

            let is_accept = self.accept_states.get(next_state).unwrap();

            if *is_accept {
                let terminal = self.terminal_table.get(&next_state).unwrap();
                return Ok(Scan::Terminal(terminal.to_string()));
            }

            state = next_state;

            ch = match source.next_char()? {
                None => return Err(Report::new(TokenizerError::EndOfStream(lexeme))),
                Some(next) => next,
            };
        }
    }

    /// Collect the terminal names matched in the source until a clean end
    /// of stream.
    pub fn tokenize(&self, source: &mut impl CharSource) -> Result<Vec<String>> {
        let mut name_list: Vec<String> = Vec::new();

        loop {
            match self.next_token(source)? {
                Scan::Terminal(name) => name_list.push(name),
                Scan::Eof => return Ok(name_list),
            }
        }
    }

    /// Save the compiled tokenizer tables as json
    pub fn save_tokenizer(&self, file_name: &str) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;

        let mut file = File::create(file_name)?;

        writeln!(file, "{}", json_string)?;

        Ok(())
    }
}

/// Construct a tokenizer for the provided DFA.
pub fn construct_tokenizer(dfa: &DFA) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::new();

    tokenizer.init_transition_table(dfa)?;

    tokenizer.init_terminal_table(dfa);

    Ok(tokenizer)
}

/// Load a tokenizer from a saved json file
pub fn load_tokenizer(file_name: &str) -> Result<Tokenizer> {
    let file = File::open(file_name)?;

    let buf_reader = BufReader::new(file);

    let tokenizer: Tokenizer = serde_json::from_reader(buf_reader)?;

    Ok(tokenizer)
}

#[cfg(test)]
mod tokenizer_test_helpers {
    use super::{construct_tokenizer, Tokenizer};
    use crate::dfa::construct_dfa;
    use crate::nfa::construct_nfa;
    use crate::terminals::parse_terminal_list;

    pub fn setup_tokenizer(pairs: &[(&str, &str)]) -> Tokenizer {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(pattern, name)| (pattern.to_string(), name.to_string()))
            .collect();

        let terminal_list = parse_terminal_list(pairs).unwrap();
        let nfa = construct_nfa(terminal_list, false).unwrap();
        let dfa = construct_dfa(&nfa, false);

        construct_tokenizer(&dfa).unwrap()
    }
}

#[cfg(test)]
mod source_tests {
    use super::{CharSource, ReaderSource};

    #[test]
    fn test_chars_source() {
        let mut source = "ab".chars();

        assert_eq!(source.next_char().unwrap(), Some('a'));
        assert_eq!(source.next_char().unwrap(), Some('b'));
        assert_eq!(source.next_char().unwrap(), None);
    }

    #[test]
    fn test_reader_source() {
        let mut source = ReaderSource::new("if x".as_bytes());
        let mut contents = String::new();

        while let Some(ch) = source.next_char().unwrap() {
            contents.push(ch);
        }

        assert_eq!(contents, "if x");
    }
}

#[cfg(test)]
mod tokenizer_tests {
    use super::tokenizer_test_helpers::setup_tokenizer;
    use super::{Scan, TokenizerError};

    #[test]
    fn test_classifier_covers_alphabet() {
        let tokenizer = setup_tokenizer(&[("if", "IF"), ("in", "IN")]);

        for ch in ['i', 'f', 'n'] {
            assert!(tokenizer.classifier_table.contains_key(&ch));
        }
        assert!(!tokenizer.classifier_table.contains_key(&'x'));

        // One row per DFA state plus the error row, one column per class
        let num_classes = tokenizer
            .classifier_table
            .values()
            .max()
            .unwrap()
            + 1;

        assert_eq!(tokenizer.transition_table.len(), tokenizer.error_state + 1);

        for row in tokenizer.transition_table.iter() {
            assert_eq!(row.len(), num_classes);
        }
    }

    #[test]
    fn test_error_row_rejects_everything() {
        let tokenizer = setup_tokenizer(&[("if", "IF")]);

        let error_row = &tokenizer.transition_table[tokenizer.error_state];

        for target in error_row {
            assert_eq!(*target, tokenizer.error_state);
        }
    }

    #[test]
    fn test_whitespace_only_stream() {
        let tokenizer = setup_tokenizer(&[("if", "IF")]);

        let mut source = " \t\r\n ".chars();

        assert_eq!(tokenizer.next_token(&mut source).unwrap(), Scan::Eof);

        // The EOF signal repeats on further calls
        assert_eq!(tokenizer.next_token(&mut source).unwrap(), Scan::Eof);
    }

    #[test]
    fn test_end_of_stream_mid_match() {
        let tokenizer = setup_tokenizer(&[("while", "WHILE")]);

        let mut source = "whi".chars();

        let err = tokenizer.next_token(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::EndOfStream(lexeme)) => assert_eq!(lexeme, "whi"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_invalid_input_keeps_offending_lexeme() {
        let tokenizer = setup_tokenizer(&[("while", "WHILE")]);

        let mut source = "whale".chars();

        let err = tokenizer.next_token(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::InvalidInput(lexeme)) => assert_eq!(lexeme, "wha"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_whitespace_inside_token_is_invalid() {
        let tokenizer = setup_tokenizer(&[("while", "WHILE")]);

        let mut source = "whi le".chars();

        let err = tokenizer.next_token(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::InvalidInput(lexeme)) => assert_eq!(lexeme, "whi "),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_scan_displays_eof_sentinel() {
        assert_eq!(format!("{}", Scan::Eof), "EOF");
        assert_eq!(
            format!("{}", Scan::Terminal("WHILE".to_string())),
            "WHILE"
        );
    }
}
