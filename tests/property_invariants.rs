use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tempfile::TempDir;

use calclog::{
    config::CalculatorConfig,
    core::calculator::Calculator,
    error::CalcError,
    operations,
    persist::csv,
    record::CalculationRecord,
    types::{Arity, Operation},
};

#[derive(Debug, Clone)]
enum Action {
    Execute { op_idx: u8, a: f64, b: Option<f64> },
    Undo,
    Redo,
    Clear,
}

fn operand() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1000i32..1000).prop_map(f64::from),
        -1.0e6f64..1.0e6,
        Just(0.0),
    ]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => (0u8..9, operand(), prop::option::of(operand()))
            .prop_map(|(op_idx, a, b)| Action::Execute { op_idx, a, b }),
        2 => Just(Action::Undo),
        2 => Just(Action::Redo),
        1 => Just(Action::Clear),
    ]
}

fn record_strategy() -> impl Strategy<Value = CalculationRecord> {
    (0u8..9, operand(), operand(), operand(), 0i64..4_000_000_000, 0u32..1_000_000_000).prop_map(
        |(op_idx, a, b, result, secs, nanos)| {
            let op = Operation::ALL[usize::from(op_idx)];
            let b = match op.arity() {
                Arity::Unary => None,
                Arity::Binary => Some(b),
                Arity::UnaryOrBinary => (secs % 2 == 0).then_some(b),
            };
            let ts = Utc.timestamp_opt(secs, nanos).single().unwrap_or_else(Utc::now);
            CalculationRecord::new(op, a, b, result, ts)
        },
    )
}

proptest! {
    #[test]
    fn history_stays_bounded_and_undo_redo_are_inverse(
        actions in prop::collection::vec(action_strategy(), 1..120),
        max_history in 1usize..8,
    ) {
        let cfg = CalculatorConfig { max_history, ..CalculatorConfig::default() };
        let mut calc = Calculator::new(&cfg);

        for action in actions {
            match action {
                Action::Execute { op_idx, a, b } => {
                    let op = Operation::ALL[usize::from(op_idx)];
                    let operands: Vec<f64> = std::iter::once(a).chain(b).collect();
                    let before = calc.history();
                    match calc.execute_op(op, &operands) {
                        Ok(rec) => {
                            let after = calc.history();
                            prop_assert_eq!(after.last().copied(), Some(rec));
                            prop_assert_eq!(calc.undo().expect("undo"), before);
                            prop_assert_eq!(calc.redo().expect("redo"), after);
                            prop_assert!(matches!(calc.redo(), Err(CalcError::NothingToRedo)));
                        }
                        Err(CalcError::Domain(_) | CalcError::Validation(_)) => {
                            prop_assert_eq!(calc.history(), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                    }
                }
                Action::Undo => match calc.undo() {
                    Ok(_) | Err(CalcError::NothingToUndo) => {}
                    Err(other) => prop_assert!(false, "unexpected undo error: {other:?}"),
                },
                Action::Redo => match calc.redo() {
                    Ok(_) | Err(CalcError::NothingToRedo) => {}
                    Err(other) => prop_assert!(false, "unexpected redo error: {other:?}"),
                },
                Action::Clear => calc.clear(),
            }
            prop_assert!(calc.len() <= max_history);
        }

        let target = calc.history();
        while calc.undo().is_ok() {}
        while calc.redo().is_ok() {}
        prop_assert_eq!(calc.history(), target);
    }

    #[test]
    fn results_match_direct_computation(
        op_idx in 0u8..9,
        a in operand(),
        b in operand(),
        places in 0u32..6,
    ) {
        let op = Operation::ALL[usize::from(op_idx)];
        let operands: Vec<f64> = match op.arity() {
            Arity::Unary => vec![a],
            _ => vec![a, b],
        };
        let cfg = CalculatorConfig { decimal_places: places, ..CalculatorConfig::default() };
        let mut calc = Calculator::new(&cfg);

        let checked = operations::validate_operands(op, &operands).expect("valid operands");
        match (operations::apply(op, checked), calc.execute_op(op, &operands)) {
            (Ok(raw), Ok(rec)) => {
                prop_assert_eq!(rec.result(), operations::round_to(raw, places));
                prop_assert_eq!(rec.operand_a(), a);
            }
            (Err(_), Err(CalcError::Domain(_))) => prop_assert!(calc.is_empty()),
            (direct, recorded) => prop_assert!(false, "mismatch: {direct:?} vs {recorded:?}"),
        }
    }

    #[test]
    fn csv_round_trip_preserves_history(
        records in prop::collection::vec(record_strategy(), 0..40),
    ) {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("history.csv");
        csv::save(&records, &path).expect("save");
        let loaded = csv::load(&path).expect("load");
        prop_assert!(loaded.corrupt_rows().is_empty());
        prop_assert_eq!(loaded.records(), records.as_slice());
    }
}
