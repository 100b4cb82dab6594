//! REPL command parsing, dispatch and display formatting.

use std::fmt::Write as _;

use crate::{
    core::{
        calculator::Calculator,
        stats::{Statistics, Summary},
    },
    error::CalcError,
    persist::LoadOutcome,
    record::CalculationRecord,
    types::Operation,
};

/// Rows shown by the `history` command.
pub const HISTORY_DISPLAY_LIMIT: usize = 20;

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Blank line.
    Empty,
    Help,
    History,
    Clear,
    Undo,
    Redo,
    Save,
    Load,
    /// `stats` or `stats json`.
    Stats { json: bool },
    Exit,
    /// `<operation> <a> [<b>]`; the name is checked on execution.
    Calculate { operation: String, operands: Vec<f64> },
}

/// What the REPL should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Print and keep reading.
    Continue(String),
    /// Print and stop.
    Exit(String),
}

pub fn parse_command(line: &str) -> Result<CliCommand, CalcError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(CliCommand::Empty);
    };
    let rest: Vec<&str> = words.collect();
    let keyword = head.to_ascii_lowercase();

    let bare = |cmd: CliCommand| {
        if rest.is_empty() {
            Ok(cmd)
        } else {
            Err(CalcError::validation(format!("'{keyword}' takes no arguments")))
        }
    };

    match keyword.as_str() {
        "help" => bare(CliCommand::Help),
        "history" => bare(CliCommand::History),
        "clear" => bare(CliCommand::Clear),
        "undo" => bare(CliCommand::Undo),
        "redo" => bare(CliCommand::Redo),
        "save" => bare(CliCommand::Save),
        "load" => bare(CliCommand::Load),
        "exit" | "quit" => bare(CliCommand::Exit),
        "stats" => match rest.as_slice() {
            [] => Ok(CliCommand::Stats { json: false }),
            [fmt] if fmt.eq_ignore_ascii_case("json") => Ok(CliCommand::Stats { json: true }),
            _ => Err(CalcError::validation("usage: stats [json]")),
        },
        _ => {
            if rest.len() > 2 {
                return Err(CalcError::validation(
                    "expected: <operation> <number> [<number>]",
                ));
            }
            let operands = rest
                .iter()
                .map(|raw| {
                    raw.parse::<f64>()
                        .map_err(|_| CalcError::validation(format!("'{raw}' is not a number")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CliCommand::Calculate {
                operation: keyword.clone(),
                operands,
            })
        }
    }
}

/// Runs `cmd` against `calc` and renders the reply.
pub fn dispatch(calc: &mut Calculator, cmd: CliCommand) -> Result<Flow, CalcError> {
    let mut out = match cmd {
        CliCommand::Empty => String::new(),
        CliCommand::Help => help_text(),
        CliCommand::History => format_history(&calc.recent(HISTORY_DISPLAY_LIMIT), calc.len()),
        CliCommand::Clear => {
            calc.clear();
            "History cleared.".to_string()
        }
        CliCommand::Undo => {
            let history = calc.undo()?;
            format!("Undone. {} calculation(s) in history.", history.len())
        }
        CliCommand::Redo => {
            let history = calc.redo()?;
            format!("Redone. {} calculation(s) in history.", history.len())
        }
        CliCommand::Save => {
            let path = calc.save()?;
            format!("History saved to {}", path.display())
        }
        CliCommand::Load => format_load(&calc.load()?),
        CliCommand::Stats { json: false } => format_statistics(&calc.statistics()),
        CliCommand::Stats { json: true } => serde_json::to_string_pretty(&calc.statistics())
            .map_err(|e| CalcError::validation(format!("cannot render statistics: {e}")))?,
        CliCommand::Exit => return Ok(Flow::Exit("Goodbye!".to_string())),
        CliCommand::Calculate {
            operation,
            operands,
        } => {
            let rec = calc.execute(&operation, &operands)?;
            format!("Result: {}", rec.result())
        }
    };

    for failure in calc.take_listener_failures() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(out, "Warning: {failure}");
    }
    Ok(Flow::Continue(out))
}

pub fn format_history(records: &[CalculationRecord], total: usize) -> String {
    if records.is_empty() {
        return "No calculations in history yet.".to_string();
    }
    let first = total - records.len() + 1;
    let mut out = String::new();
    for (i, rec) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {rec}", first + i);
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn format_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total calculations: {}", stats.overall.count);
    if stats.overall.count == 0 {
        return out.trim_end().to_string();
    }
    let _ = writeln!(out, "{}", summary_line("overall", &stats.overall));
    for (op, summary) in &stats.per_operation {
        let _ = writeln!(out, "{}", summary_line(op.name(), summary));
    }
    out.trim_end().to_string()
}

fn summary_line(label: &str, s: &Summary) -> String {
    let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "  {label:<9} count={} sum={} mean={} min={} max={}",
        s.count,
        s.sum,
        opt(s.mean),
        opt(s.min),
        opt(s.max)
    )
}

fn format_load(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Missing => "No history file found; history is empty.".to_string(),
        LoadOutcome::Loaded { records, corrupt } if corrupt.is_empty() => {
            format!("Loaded {} calculation(s).", records.len())
        }
        LoadOutcome::Loaded { records, corrupt } => format!(
            "Loaded {} calculation(s), skipped {} corrupt row(s).",
            records.len(),
            corrupt.len()
        ),
    }
}

pub fn help_text() -> String {
    let mut out = String::from(
        "Commands:\n  \
         help          show this help\n  \
         history       show recent calculations\n  \
         clear         clear history\n  \
         undo / redo   step through history changes\n  \
         save / load   write or reload the history file\n  \
         stats [json]  result statistics\n  \
         exit          quit\n\
         Operations:\n",
    );
    for op in Operation::ALL {
        let usage = match op.arity() {
            crate::types::Arity::Unary => "<a>",
            crate::types::Arity::Binary => "<a> <b>",
            crate::types::Arity::UnaryOrBinary => "<a> [<b>]",
        };
        let _ = writeln!(out, "  {} {usage}", op.name());
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_operations() {
        assert_eq!(parse_command("  ").unwrap(), CliCommand::Empty);
        assert_eq!(parse_command("UNDO").unwrap(), CliCommand::Undo);
        assert_eq!(parse_command("stats json").unwrap(), CliCommand::Stats { json: true });
        assert_eq!(
            parse_command("add 2 3.5").unwrap(),
            CliCommand::Calculate {
                operation: "add".to_string(),
                operands: vec![2.0, 3.5],
            }
        );
        assert_eq!(
            parse_command("root 9").unwrap(),
            CliCommand::Calculate {
                operation: "root".to_string(),
                operands: vec![9.0],
            }
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse_command("add two 3"), Err(CalcError::Validation(_))));
        assert!(matches!(parse_command("add 1 2 3"), Err(CalcError::Validation(_))));
        assert!(matches!(parse_command("undo now"), Err(CalcError::Validation(_))));
    }

    #[test]
    fn history_numbering_counts_from_oldest_shown() {
        let mut calc = Calculator::new(&crate::config::CalculatorConfig::default());
        for i in 0..3i32 {
            calc.execute("add", &[f64::from(i), 1.0]).unwrap();
        }
        let text = format_history(&calc.recent(2), calc.len());
        assert!(text.starts_with("2. add 1 1 = 2"));
        assert!(text.ends_with("3. add 2 1 = 3"));
    }
}
