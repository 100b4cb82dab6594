use calclog::{
    error::CalcError,
    operations::{evaluate, round_to},
    types::{Operation, UnknownOperation},
};

fn eval(op: Operation, operands: &[f64]) -> Result<f64, CalcError> {
    evaluate(op, operands, 2).map(|(_, result)| result)
}

#[test]
fn binary_operations_compute_directly() {
    assert_eq!(eval(Operation::Add, &[2.0, 3.0]).unwrap(), 5.0);
    assert_eq!(eval(Operation::Subtract, &[2.0, 3.0]).unwrap(), -1.0);
    assert_eq!(eval(Operation::Multiply, &[2.5, 4.0]).unwrap(), 10.0);
    assert_eq!(eval(Operation::Divide, &[7.0, 2.0]).unwrap(), 3.5);
    assert_eq!(eval(Operation::Power, &[2.0, 8.0]).unwrap(), 256.0);
    assert_eq!(eval(Operation::Modulus, &[10.0, 3.0]).unwrap(), 1.0);
}

#[test]
fn modulus_takes_sign_of_divisor() {
    assert_eq!(eval(Operation::Modulus, &[-7.0, 3.0]).unwrap(), 2.0);
    assert_eq!(eval(Operation::Modulus, &[7.0, -3.0]).unwrap(), -2.0);
    assert_eq!(eval(Operation::Modulus, &[6.0, 3.0]).unwrap(), 0.0);
}

#[test]
fn roots() {
    assert_eq!(eval(Operation::Root, &[16.0]).unwrap(), 4.0);
    assert_eq!(eval(Operation::Root, &[27.0, 3.0]).unwrap(), 3.0);
    assert_eq!(eval(Operation::Root, &[-8.0, 3.0]).unwrap(), -2.0);
}

#[test]
fn domain_errors() {
    for (op, operands) in [
        (Operation::Divide, vec![5.0, 0.0]),
        (Operation::Modulus, vec![5.0, 0.0]),
        (Operation::Modulus, vec![5.5, 2.0]),
        (Operation::Root, vec![9.0, 0.0]),
        (Operation::Root, vec![-4.0]),
        (Operation::Root, vec![-16.0, 4.0]),
        (Operation::Root, vec![-8.0, 1.5]),
        (Operation::Power, vec![0.0, -1.0]),
        (Operation::Power, vec![-8.0, 0.5]),
        (Operation::Power, vec![10.0, 400.0]),
    ] {
        assert!(
            matches!(eval(op, &operands), Err(CalcError::Domain(_))),
            "{op} {operands:?} should be a domain error"
        );
    }
}

#[test]
fn validation_errors() {
    assert!(matches!(eval(Operation::Add, &[1.0]), Err(CalcError::Validation(_))));
    assert!(matches!(eval(Operation::Negate, &[1.0, 2.0]), Err(CalcError::Validation(_))));
    assert!(matches!(eval(Operation::Root, &[]), Err(CalcError::Validation(_))));
    assert!(matches!(
        eval(Operation::Add, &[f64::INFINITY, 1.0]),
        Err(CalcError::Validation(_))
    ));
}

#[test]
fn names_parse_case_insensitively() {
    assert_eq!(" Divide ".parse::<Operation>().unwrap(), Operation::Divide);
    let err = "sqrt".parse::<Operation>().unwrap_err();
    assert_eq!(err, UnknownOperation("sqrt".to_string()));
    assert_eq!(err.to_string(), "unknown operation 'sqrt'");
    for op in Operation::ALL {
        assert_eq!(op.name().parse::<Operation>().unwrap(), op);
    }
}

#[test]
fn rounding_is_half_away_from_zero_and_normalises_negative_zero() {
    assert_eq!(round_to(2.345, 1), 2.3);
    assert_eq!(round_to(0.125, 2), 0.13);
    assert_eq!(round_to(-0.125, 2), -0.13);
    assert_eq!(round_to(1.0 / 3.0, 0), 0.0);
    assert!(round_to(-0.001, 2).is_sign_positive());
    assert_eq!(round_to(1e300, 2), 1e300);
}

#[test]
fn huge_precision_leaves_value_unrounded() {
    let third = 1.0 / 3.0;
    assert_eq!(round_to(third, u32::MAX), third);
    assert_eq!(round_to(third, i32::MAX as u32 + 1), third);
}
