use std::time::Duration;

use tempfile::TempDir;

use calclog::{
    config::CalculatorConfig,
    core::calculator::Calculator,
    error::CalcError,
    persist::csv,
    runtime::{
        events::CalcEvent,
        handle::{RuntimeConfig, RuntimeError, spawn_calculator},
    },
};

async fn next_event(sub: &mut tokio::sync::broadcast::Receiver<CalcEvent>) -> CalcEvent {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event")
        .expect("recv")
}

#[tokio::test]
async fn runtime_executes_commands_and_emits_events_in_order() {
    let handle = spawn_calculator(
        Calculator::new(&CalculatorConfig::default()),
        RuntimeConfig::default(),
    );
    let mut sub = handle.subscribe();

    let add = handle.execute("add", [2.0, 3.0]).await.expect("add");
    assert_eq!(add.result(), 5.0);
    let mul = handle.execute("multiply", vec![5.0, 4.0]).await.expect("multiply");
    assert_eq!(mul.result(), 20.0);

    assert_eq!(handle.undo().await.expect("undo"), vec![add]);
    assert_eq!(handle.redo().await.expect("redo"), vec![add, mul]);
    handle.clear().await.expect("clear");

    assert_eq!(next_event(&mut sub).await, CalcEvent::CalculationAdded { record: add });
    assert_eq!(next_event(&mut sub).await, CalcEvent::CalculationAdded { record: mul });
    assert_eq!(next_event(&mut sub).await, CalcEvent::UndoApplied { len: 1 });
    assert_eq!(next_event(&mut sub).await, CalcEvent::RedoApplied { len: 2 });
    assert_eq!(next_event(&mut sub).await, CalcEvent::HistoryCleared);

    assert!(handle.history().await.expect("history").is_empty());
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn runtime_surfaces_calculator_errors() {
    let handle = spawn_calculator(
        Calculator::new(&CalculatorConfig::default()),
        RuntimeConfig::default(),
    );

    let err = handle.execute("divide", [5.0, 0.0]).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Calc(CalcError::Domain(_))));
    let err = handle.undo().await.unwrap_err();
    assert!(matches!(err, RuntimeError::Calc(CalcError::NothingToUndo)));
    assert_eq!(handle.statistics().await.expect("stats").overall.count, 0);

    handle.shutdown().await.expect("shutdown");
    let err = handle.history().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ChannelClosed));
}

#[tokio::test]
async fn concurrent_handles_are_serialised() {
    let cfg = CalculatorConfig {
        max_history: 1000,
        ..CalculatorConfig::default()
    };
    let handle = spawn_calculator(Calculator::new(&cfg), RuntimeConfig::default());

    let mut tasks = Vec::new();
    for worker in 0..8i32 {
        let h = handle.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..25i32 {
                h.execute("add", [f64::from(worker), f64::from(i)])
                    .await
                    .expect("add");
            }
        }));
    }
    for task in tasks {
        task.await.expect("join");
    }

    assert_eq!(handle.history().await.expect("history").len(), 200);
    assert_eq!(handle.recent(5).await.expect("recent").len(), 5);
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn shutdown_saves_attached_history() {
    let tmp = TempDir::new().expect("tmp");
    let cfg = CalculatorConfig {
        history_file: tmp.path().join("history.csv"),
        auto_save: false,
        ..CalculatorConfig::default()
    };
    let (calc, _) = Calculator::open(&cfg).expect("open");
    let handle = spawn_calculator(calc, RuntimeConfig::default());

    handle.execute("power", [2.0, 5.0]).await.expect("power");
    assert!(!cfg.history_file.exists());
    handle.shutdown().await.expect("shutdown");

    let loaded = csv::load(&cfg.history_file).expect("load");
    assert_eq!(loaded.records().len(), 1);
    assert_eq!(loaded.records()[0].result(), 32.0);
}
