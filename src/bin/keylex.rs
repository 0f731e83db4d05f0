use clap::{Arg, Command};
use color_eyre::eyre::Result;
use keylex::tokenizer::{CharSource, ReaderSource, Scan, Tokenizer};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

fn tokenize_source(
    tokenizer: &Tokenizer,
    source: &mut impl CharSource,
    out: &mut dyn Write,
) -> Result<()> {
    loop {
        let scan = tokenizer.next_token(source)?;

        writeln!(out, "{}", scan)?;

        if scan == Scan::Eof {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Command::new("keylex")
                        .version("1.0")
                        .author("Nagendra Kumar Jamadagni")
                        .about("A keyword tokenizer generator which compiles a list of literal terminals into a DFA backed scanner")
                        .arg(
                            Arg::new("terminal")
                                .short('t')
                                .long("terminal")
                                .value_name("[PATTERN, TERMINAL NAME]")
                                .num_args(2)
                                .action(clap::ArgAction::Append)
                                .value_parser(clap::value_parser!(String))
                                .help("Pair of literal pattern and the terminal name reported when it is matched. Both must be provided")
                        )
                        .arg(
                            Arg::new("terminal-file")
                                .short('f')
                                .long("terminal-file")
                                .help("Provide a file with one PATTERN::NAME entry per line. The order of the list determines the priority of the terminals when several accept at once")
                                .value_name("TERMINAL FILE")
                                .value_parser(clap::value_parser!(PathBuf))
                        )
                        .arg(
                            Arg::new("save-nfa")
                                .short('n')
                                .long("save-nfa")
                                .help("Save the NFA constructed from the terminal list")
                                .action(clap::ArgAction::SetTrue)
                        )
                        .arg(
                            Arg::new("save-dfa")
                                .short('d')
                                .long("save-dfa")
                                .help("Save the DFA obtained after Subset Construction of the NFA")
                                .action(clap::ArgAction::SetTrue)
                        )
                        .arg(
                            Arg::new("input")
                            .short('i')
                            .long("input")
                            .help("The source file which should be scanned and tokenized. Standard input is read when absent")
                            .value_name("INPUT SOURCE FILE")
                            .value_parser(clap::value_parser!(PathBuf))
                        )
                        .arg(
                            Arg::new("output")
                            .short('o')
                            .long("output")
                            .help("The output file for the matched terminal names, one per line. Standard output when absent")
                            .value_name("OUTPUT RESULT FILE")
                            .value_parser(clap::value_parser!(PathBuf))
                        )
                        .get_matches();

    let mut terminal_pairs: Vec<(String, String)> = Vec::new();

    if let Some(terminal_file_path) = args.get_one::<PathBuf>("terminal-file") {
        terminal_pairs =
            keylex::read_terminal_file(terminal_file_path.to_string_lossy().to_string())?;
    } else if let Some(values) = args.get_occurrences::<String>("terminal") {
        for value_group in values {
            let value_vec: Vec<_> = value_group.collect();

            if value_vec.len() == 2 {
                terminal_pairs.push((value_vec[0].clone(), value_vec[1].clone()));
            } else {
                panic!("Error: Both pattern and terminal name should be provided");
            }
        }
    } else {
        panic!("Error: Either a terminal file or a list of terminals should be provided!");
    }

    let terminal_list = keylex::parse_terminal_list(terminal_pairs)?;

    let save_nfa = args.get_flag("save-nfa");

    let save_dfa = args.get_flag("save-dfa");

    let nfa = keylex::construct_nfa(terminal_list, save_nfa)?;

    let dfa = keylex::construct_dfa(&nfa, save_dfa);

    let tokenizer = keylex::construct_tokenizer(&dfa)?;

    let mut out: Box<dyn Write> = match args.get_one::<PathBuf>("output") {
        Some(out_path) => Box::new(File::create(out_path)?),
        None => Box::new(io::stdout()),
    };

    match args.get_one::<PathBuf>("input") {
        Some(src_path) => {
            let mut source = ReaderSource::new(File::open(src_path)?);
            tokenize_source(&tokenizer, &mut source, &mut *out)?;
        }
        None => {
            let mut source = ReaderSource::new(io::stdin());
            tokenize_source(&tokenizer, &mut source, &mut *out)?;
        }
    }

    Ok(())
}
