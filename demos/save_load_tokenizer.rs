use keylex::{
    construct_dfa, construct_nfa, construct_tokenizer, load_tokenizer, parse_terminal_list,
};

fn main() {
    let terminal_list: Vec<(String, String)> = vec![
        ("if".to_string(), "IF".to_string()),
        ("else".to_string(), "ELSE".to_string()),
    ];

    let terminals = parse_terminal_list(terminal_list).unwrap();

    let nfa = construct_nfa(terminals, false).unwrap();

    let dfa = construct_dfa(&nfa, false);

    let tokenizer = construct_tokenizer(&dfa).unwrap();

    // Save the tokenizer and reload it just to demonstrate the save and load feature

    let result = tokenizer.save_tokenizer("demos/if_else_tokenizer.tok");

    assert!(result.is_ok());

    let tokenizer = load_tokenizer("demos/if_else_tokenizer.tok").unwrap();

    let mut source = "if else".chars();

    let name_list = tokenizer.tokenize(&mut source).unwrap();

    for name in name_list {
        println!("The terminal matched is {}", name);
    }
}
