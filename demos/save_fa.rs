use keylex::{construct_dfa, construct_nfa, construct_tokenizer, parse_terminal_list};

fn main() {
    let mut terminal_list: Vec<(String, String)> = Vec::new();

    terminal_list.push(("if".to_string(), "IF".to_string()));
    terminal_list.push(("in".to_string(), "IN".to_string()));
    terminal_list.push(("int".to_string(), "INT".to_string()));

    let terminals = parse_terminal_list(terminal_list).unwrap();

    let nfa = construct_nfa(terminals, true).unwrap();

    let dfa = construct_dfa(&nfa, true);

    let tokenizer = construct_tokenizer(&dfa).unwrap();

    let mut source = "in if int".chars();

    let name_list = tokenizer.tokenize(&mut source).unwrap();

    for name in name_list {
        println!("The terminal matched is {}", name);
    }
}
