mod integration_tests_helper {

    use keylex::{
        construct_dfa, construct_nfa, construct_tokenizer, parse_terminal_list,
        read_terminal_file,
    };

    use keylex::tokenizer::Tokenizer;

    pub fn terminal_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(pattern, name)| (pattern.to_string(), name.to_string()))
            .collect()
    }

    pub fn get_tokenizer(pairs: &[(&str, &str)]) -> Tokenizer {
        let terminal_list = parse_terminal_list(terminal_pairs(pairs));

        // assert that validating the terminal list was successful
        assert!(terminal_list.is_ok());

        let terminal_list = terminal_list.unwrap();

        let nfa = construct_nfa(terminal_list, false);

        // assert that nfa construction was successful
        assert!(nfa.is_ok());

        let nfa = nfa.unwrap();

        let dfa = construct_dfa(&nfa, false);

        let tokenizer = construct_tokenizer(&dfa);

        // assert that table compilation was successful
        assert!(tokenizer.is_ok());

        tokenizer.unwrap()
    }

    pub fn get_file_tokenizer(mst_path: &str) -> Tokenizer {
        let terminal_pairs = read_terminal_file(mst_path.to_string());

        // assert that reading the file was successful
        assert!(terminal_pairs.is_ok());

        let terminal_list = parse_terminal_list(terminal_pairs.unwrap()).unwrap();

        let nfa = construct_nfa(terminal_list, false).unwrap();

        let dfa = construct_dfa(&nfa, false);

        construct_tokenizer(&dfa).unwrap()
    }
}

mod integration_tests {
    use crate::integration_tests_helper::{get_file_tokenizer, get_tokenizer};

    use keylex::tokenizer::{ReaderSource, Scan, TokenizerError};
    use std::fs::File;

    fn terminal(name: &str) -> Scan {
        Scan::Terminal(name.to_string())
    }

    #[test]
    fn test_keyword_stream() {
        let tokenizer = get_tokenizer(&[("if", "IF"), ("else", "ELSE"), ("while", "WHILE")]);

        let mut source = "while if".chars();

        assert_eq!(tokenizer.next_token(&mut source).unwrap(), terminal("WHILE"));
        assert_eq!(tokenizer.next_token(&mut source).unwrap(), terminal("IF"));
        assert_eq!(tokenizer.next_token(&mut source).unwrap(), Scan::Eof);
    }

    #[test]
    fn test_separated_terminals_round_trip() {
        let pairs = [
            ("fn", "FN"),
            ("let", "LET"),
            ("match", "MATCH"),
            ("loop", "LOOP"),
        ];
        let tokenizer = get_tokenizer(&pairs);

        // Concatenate every terminal with single whitespace separators and
        // expect exactly the registered names back
        let mut source = "fn let\nmatch\tloop\r".chars();

        let names = tokenizer.tokenize(&mut source).unwrap();

        assert_eq!(names, vec!["FN", "LET", "MATCH", "LOOP"]);
    }

    #[test]
    fn test_first_accept_over_longer_match() {
        let tokenizer = get_tokenizer(&[("a", "A"), ("ab", "AB")]);

        let mut source = "ab".chars();

        // The match stops at the first accepting state, so the single
        // character terminal wins and b stays in the stream
        assert_eq!(tokenizer.next_token(&mut source).unwrap(), terminal("A"));

        let err = tokenizer.next_token(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::InvalidInput(lexeme)) => assert_eq!(lexeme, "b"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_deep_shared_prefix() {
        // int and inline diverge only after their second character, which
        // needs the subset construction fixed point to run past the first
        // merge
        let tokenizer = get_tokenizer(&[("int", "INT"), ("inline", "INLINE")]);

        let mut source = "inline int".chars();

        assert_eq!(
            tokenizer.next_token(&mut source).unwrap(),
            terminal("INLINE")
        );
        assert_eq!(tokenizer.next_token(&mut source).unwrap(), terminal("INT"));
        assert_eq!(tokenizer.next_token(&mut source).unwrap(), Scan::Eof);
    }

    #[test]
    fn test_nested_prefix_reports_shorter_terminal() {
        // With one terminal a literal prefix of another, the shorter one
        // accepts first and ends the match
        let tokenizer = get_tokenizer(&[("int", "INT"), ("integer", "INTEGER")]);

        let mut source = "integer ".chars();

        assert_eq!(tokenizer.next_token(&mut source).unwrap(), terminal("INT"));
    }

    #[test]
    fn test_whitespace_only_stream() {
        let tokenizer = get_tokenizer(&[("if", "IF"), ("else", "ELSE")]);

        let mut source = " \t \n\r ".chars();

        assert_eq!(tokenizer.next_token(&mut source).unwrap(), Scan::Eof);
    }

    #[test]
    fn test_unrecognized_character() {
        let tokenizer = get_tokenizer(&[("if", "IF"), ("else", "ELSE")]);

        let mut source = "x".chars();

        let err = tokenizer.next_token(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::InvalidInput(lexeme)) => assert_eq!(lexeme, "x"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_truncated_token() {
        let tokenizer = get_tokenizer(&[("while", "WHILE")]);

        let mut source = "whi".chars();

        let err = tokenizer.next_token(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::EndOfStream(lexeme)) => assert_eq!(lexeme, "whi"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_duplicate_pattern_first_registered_wins() {
        let tokenizer = get_tokenizer(&[("do", "FIRST"), ("do", "SECOND")]);

        let mut source = "do do".chars();

        let names = tokenizer.tokenize(&mut source).unwrap();

        assert_eq!(names, vec!["FIRST", "FIRST"]);
    }

    #[test]
    fn test_construction_is_idempotent() {
        let pairs = [("if", "IF"), ("in", "IN"), ("int", "INT"), ("else", "ELSE")];

        let first = get_tokenizer(&pairs);
        let second = get_tokenizer(&pairs);

        for input in ["if in else", "in if", "  \t", "else else else"] {
            let first_names = first.tokenize(&mut input.chars()).unwrap();
            let second_names = second.tokenize(&mut input.chars()).unwrap();

            assert_eq!(first_names, second_names);
        }

        // Both builds also fail identically. The int input fails because in
        // accepts first and leaves a dangling t behind
        for input in ["q", "ifx", "int"] {
            let first_err = first.tokenize(&mut input.chars()).unwrap_err();
            let second_err = second.tokenize(&mut input.chars()).unwrap_err();

            assert_eq!(first_err.to_string(), second_err.to_string());
        }
    }

    #[test]
    fn test_terminal_file_scanning() {
        let tokenizer = get_file_tokenizer("test_data/keywords.mst");

        let mut source = ReaderSource::new(File::open("test_data/valid.src").unwrap());

        let names = tokenizer.tokenize(&mut source).unwrap();

        assert_eq!(names, vec!["WHILE", "IF", "RETURN", "ELSE"]);
    }

    #[test]
    fn test_terminal_file_scanning_invalid_source() {
        let tokenizer = get_file_tokenizer("test_data/keywords.mst");

        let mut source = ReaderSource::new(File::open("test_data/invalid.src").unwrap());

        let err = tokenizer.tokenize(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::InvalidInput(lexeme)) => assert_eq!(lexeme, "$"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_terminal_file_scanning_truncated_source() {
        let tokenizer = get_file_tokenizer("test_data/keywords.mst");

        let mut source = ReaderSource::new(File::open("test_data/truncated.src").unwrap());

        let err = tokenizer.tokenize(&mut source).unwrap_err();

        match err.downcast_ref() {
            Some(TokenizerError::EndOfStream(lexeme)) => assert_eq!(lexeme, "whi"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_malformed_terminal_file() {
        let terminal_pairs = keylex::read_terminal_file("test_data/malformed.mst".to_string());

        assert!(terminal_pairs.is_err());

        let err = terminal_pairs.unwrap_err();

        match err.downcast_ref() {
            Some(keylex::terminals::TerminalError::MalformedTerminalEntry(line)) => {
                assert_eq!(line, "while:WHILE")
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let tokenizer = get_tokenizer(&[("if", "IF"), ("else", "ELSE"), ("while", "WHILE")]);

        let save_path = std::env::temp_dir().join("keylex_round_trip.tok");
        let save_path = save_path.to_str().unwrap();

        tokenizer.save_tokenizer(save_path).unwrap();

        let loaded = keylex::load_tokenizer(save_path).unwrap();

        for input in ["while if", "else", " \n"] {
            let names = tokenizer.tokenize(&mut input.chars()).unwrap();
            let loaded_names = loaded.tokenize(&mut input.chars()).unwrap();

            assert_eq!(names, loaded_names);
        }
    }
}
