use std::io::{self, BufRead, Write};

use calclog::{
    cli::{self, Flow},
    config::CalculatorConfig,
    core::calculator::Calculator,
};

fn main() {
    env_logger::init();

    let config = CalculatorConfig::from_env().unwrap_or_else(|err| {
        eprintln!("Configuration error: {err}. Using defaults.");
        CalculatorConfig::default()
    });

    let mut calc = match Calculator::open(&config) {
        Ok((calc, outcome)) => {
            for row in outcome.corrupt_rows() {
                eprintln!("Warning: {row}");
            }
            calc
        }
        Err(err) => {
            // Keep the unreadable file intact: run without a history file.
            eprintln!(
                "Cannot load {}: {err}. History will not be saved.",
                config.history_file.display()
            );
            Calculator::new(&config)
        }
    };

    println!("Calculator ready. Type 'help' for instructions or 'exit' to quit.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("calculator> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                eprintln!("Input error: {err}");
                break;
            }
            None => break,
        };

        match cli::parse_command(&line).and_then(|cmd| cli::dispatch(&mut calc, cmd)) {
            Ok(Flow::Continue(out)) => {
                if !out.is_empty() {
                    println!("{out}");
                }
            }
            Ok(Flow::Exit(out)) => {
                println!("{out}");
                return;
            }
            Err(err) => println!("Error: {err}"),
        }
    }
    println!();
}
