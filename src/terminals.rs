/* The terminal list front end. A terminal is a literal pattern paired with
 * the name reported when the pattern is matched. Terminals are kept in the
 * order they were registered; that order decides which terminal wins when
 * several could accept at once. */

use color_eyre::eyre::{Report, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// A literal terminal: the exact character sequence to recognize and the
/// name returned for it by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pattern: String,
    name: String,
}

#[derive(Debug)]
pub enum TerminalError {
    EmptyTerminalList,
    EmptyPattern(String),
    EmptyName(String),
    UnsupportedCharacter(String, char),
    MalformedTerminalEntry(String),
    FileOpenError(String),
    FileReadError(String),
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalError::EmptyTerminalList => {
                write!(f, "Error: At least one terminal should be provided!")
            }
            TerminalError::EmptyPattern(name) => {
                write!(f, "Error: Terminal {} has an empty pattern!", name)
            }
            TerminalError::EmptyName(pattern) => {
                write!(f, "Error: Pattern {} has an empty terminal name!", pattern)
            }
            TerminalError::UnsupportedCharacter(pattern, ch) => write!(
                f,
                "Error: Pattern {} contains {:?} which is outside the terminal alphabet!",
                pattern, ch
            ),
            TerminalError::MalformedTerminalEntry(line) => write!(
                f,
                "Error: Malformed terminal entry detected: {}",
                line
            ),
            TerminalError::FileOpenError(err_line) => write!(f, "{}", err_line),
            TerminalError::FileReadError(err_line) => write!(f, "{}", err_line),
        }
    }
}

impl std::error::Error for TerminalError {}

impl Terminal {
    /// Validate and build a terminal. Patterns are non-empty and drawn from
    /// the printable ASCII alphabet; whitespace separates tokens in the
    /// input stream and can never appear inside a pattern.
    pub fn new(pattern: &str, name: &str) -> Result<Self, TerminalError> {
        if pattern.is_empty() {
            return Err(TerminalError::EmptyPattern(name.to_string()));
        }

        if name.is_empty() {
            return Err(TerminalError::EmptyName(pattern.to_string()));
        }

        for ch in pattern.chars() {
            if !ch.is_ascii_graphic() {
                return Err(TerminalError::UnsupportedCharacter(
                    pattern.to_string(),
                    ch,
                ));
            }
        }

        Ok(Terminal {
            pattern: pattern.to_string(),
            name: name.to_string(),
        })
    }

    pub fn get_pattern(&self) -> &str {
        &self.pattern
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

/// Validate a list of (pattern, name) pairs and return the terminals in
/// registration order.
pub fn parse_terminal_list(terminal_list: Vec<(String, String)>) -> Result<VecDeque<Terminal>> {
    if terminal_list.is_empty() {
        return Err(Report::new(TerminalError::EmptyTerminalList));
    }

    let mut terminals = VecDeque::new();

    for (pattern, name) in terminal_list {
        let terminal = Terminal::new(&pattern, &name)?;
        terminals.push_back(terminal);
    }

    Ok(terminals)
}

/// Read a terminal file and return the list of (pattern, name) pairs it
/// holds. Each line is a PATTERN::NAME entry; the list order decides the
/// terminal priority during tokenizing.
pub fn read_terminal_file(file_path: String) -> Result<Vec<(String, String)>> {
    let file_path = PathBuf::from(file_path);

    let file = match File::open(&file_path) {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!(
                "Error: Failed to open the terminal file {:?}! {:?}",
                file_path, error
            );
            return Err(Report::new(TerminalError::FileOpenError(err_line)));
        }
    };

    let reader = BufReader::new(file);

    let mut terminal_list: Vec<(String, String)> = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                let err_line = format!(
                    "Error: Failed to read line number {:?} in the terminal file! {:?}",
                    line_number, error
                );
                return Err(Report::new(TerminalError::FileReadError(err_line)));
            }
        };

        if line.is_empty() {
            continue;
        }

        let content: Vec<&str> = line.split("::").collect();

        if content.len() != 2 {
            return Err(Report::new(TerminalError::MalformedTerminalEntry(line)));
        }

        let pattern = content[0].replace("\\:\\:", "::"); // Escape the double colons itself
        let name = content[1];

        terminal_list.push((pattern, name.to_string()));
    }

    Ok(terminal_list)
}
