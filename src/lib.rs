//! Arithmetic calculator with bounded history, snapshot undo/redo and CSV
//! persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::calculator::Calculator`]:
//! ```
//! use calclog::{config::CalculatorConfig, core::calculator::Calculator};
//!
//! let mut calc = Calculator::new(&CalculatorConfig::default());
//! let rec = calc.execute("add", &[2.0, 3.0]).expect("add");
//! assert_eq!(rec.result(), 5.0);
//! calc.execute("multiply", &[5.0, 4.0]).expect("multiply");
//!
//! assert_eq!(calc.undo().expect("undo").len(), 1);
//! assert_eq!(calc.redo().expect("redo").len(), 2);
//! ```
//!
//! Runtime usage with a history file:
//! ```no_run
//! use calclog::{
//!     config::CalculatorConfig,
//!     core::calculator::Calculator,
//!     runtime::handle::{spawn_calculator, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cfg = CalculatorConfig::from_env().expect("config");
//! let (calc, _outcome) = Calculator::open(&cfg).expect("open history");
//! let handle = spawn_calculator(calc, RuntimeConfig::default());
//! let rec = handle.execute("divide", [9.0, 4.0]).await.expect("divide");
//! assert_eq!(rec.result(), 2.25);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// REPL parsing and formatting.
pub mod cli;
/// Environment-driven settings.
pub mod config;
/// History store, snapshots, statistics and the calculator facade.
pub mod core;
/// Calculator error taxonomy.
pub mod error;
/// Listener registry for history events.
pub mod notify;
/// Operation registry.
pub mod operations;
/// History persistence.
pub mod persist;
/// Calculation record type.
pub mod record;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Operation names and arity.
pub mod types;
