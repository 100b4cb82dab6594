use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    core::{calculator::Calculator, stats::Statistics},
    error::CalcError,
    notify::EventKind,
    persist::LoadOutcome,
    record::CalculationRecord,
};

use super::events::CalcEvent;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("calculator runtime has stopped")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pending commands before senders wait.
    pub command_queue_bound: usize,
    /// Broadcast buffer; slow subscribers lag past this.
    pub event_capacity: usize,
    /// Save once more on shutdown when a history file is attached.
    pub save_on_shutdown: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
            save_on_shutdown: true,
        }
    }
}

/// Cloneable handle to a calculator owned by a background task.
///
/// Commands are processed one at a time, so each snapshot, mutation and
/// notification sequence is atomic with respect to other handles.
#[derive(Clone)]
pub struct CalculatorHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<CalcEvent>,
}

enum Command {
    Execute {
        name: String,
        operands: Vec<f64>,
        resp: oneshot::Sender<Result<CalculationRecord, CalcError>>,
    },
    Undo {
        resp: oneshot::Sender<Result<Vec<CalculationRecord>, CalcError>>,
    },
    Redo {
        resp: oneshot::Sender<Result<Vec<CalculationRecord>, CalcError>>,
    },
    Clear {
        resp: oneshot::Sender<()>,
    },
    Save {
        resp: oneshot::Sender<Result<PathBuf, CalcError>>,
    },
    Load {
        resp: oneshot::Sender<Result<LoadOutcome, CalcError>>,
    },
    History {
        resp: oneshot::Sender<Vec<CalculationRecord>>,
    },
    Recent {
        n: usize,
        resp: oneshot::Sender<Vec<CalculationRecord>>,
    },
    Statistics {
        resp: oneshot::Sender<Statistics>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), CalcError>>,
    },
}

/// Moves `calc` onto a tokio task and returns a handle to it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_calculator(calc: Calculator, config: RuntimeConfig) -> CalculatorHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<CalcEvent>(config.event_capacity.max(1));

    let mut calc = calc;
    forward_events(&mut calc, &events_tx);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut calc, &config) {
                break;
            }
        }
        log::debug!("calculator runtime stopped");
    });

    CalculatorHandle { cmd_tx, events_tx }
}

impl CalculatorHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<CalcEvent> {
        self.events_tx.subscribe()
    }

    pub async fn execute(
        &self,
        name: impl Into<String>,
        operands: impl Into<Vec<f64>>,
    ) -> Result<CalculationRecord, RuntimeError> {
        let (name, operands) = (name.into(), operands.into());
        Ok(self
            .request(|resp| Command::Execute { name, operands, resp })
            .await??)
    }

    pub async fn undo(&self) -> Result<Vec<CalculationRecord>, RuntimeError> {
        Ok(self.request(|resp| Command::Undo { resp }).await??)
    }

    pub async fn redo(&self) -> Result<Vec<CalculationRecord>, RuntimeError> {
        Ok(self.request(|resp| Command::Redo { resp }).await??)
    }

    pub async fn clear(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Clear { resp }).await
    }

    pub async fn save(&self) -> Result<PathBuf, RuntimeError> {
        Ok(self.request(|resp| Command::Save { resp }).await??)
    }

    pub async fn load(&self) -> Result<LoadOutcome, RuntimeError> {
        Ok(self.request(|resp| Command::Load { resp }).await??)
    }

    pub async fn history(&self) -> Result<Vec<CalculationRecord>, RuntimeError> {
        self.request(|resp| Command::History { resp }).await
    }

    pub async fn recent(&self, n: usize) -> Result<Vec<CalculationRecord>, RuntimeError> {
        self.request(|resp| Command::Recent { n, resp }).await
    }

    pub async fn statistics(&self) -> Result<Statistics, RuntimeError> {
        self.request(|resp| Command::Statistics { resp }).await
    }

    /// Stops the runtime after pending commands, saving first if configured.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        Ok(self.request(|resp| Command::Shutdown { resp }).await??)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn forward_events(calc: &mut Calculator, events_tx: &broadcast::Sender<CalcEvent>) {
    for kind in EventKind::ALL {
        let tx = events_tx.clone();
        calc.subscribe(kind, move |note| {
            let event = match note.kind {
                EventKind::CalculationAdded => match note.record {
                    Some(record) => CalcEvent::CalculationAdded { record },
                    None => return Ok(()),
                },
                EventKind::HistoryCleared => CalcEvent::HistoryCleared,
                EventKind::UndoPerformed => CalcEvent::UndoApplied {
                    len: note.history.len(),
                },
                EventKind::RedoPerformed => CalcEvent::RedoApplied {
                    len: note.history.len(),
                },
            };
            // No subscribers is not an error.
            let _ = tx.send(event);
            Ok(())
        });
    }
}

fn handle_command(cmd: Command, calc: &mut Calculator, config: &RuntimeConfig) -> bool {
    match cmd {
        Command::Execute { name, operands, resp } => {
            let _ = resp.send(calc.execute(&name, &operands));
        }
        Command::Undo { resp } => {
            let _ = resp.send(calc.undo());
        }
        Command::Redo { resp } => {
            let _ = resp.send(calc.redo());
        }
        Command::Clear { resp } => {
            calc.clear();
            let _ = resp.send(());
        }
        Command::Save { resp } => {
            let _ = resp.send(calc.save());
        }
        Command::Load { resp } => {
            let _ = resp.send(calc.load());
        }
        Command::History { resp } => {
            let _ = resp.send(calc.history());
        }
        Command::Recent { n, resp } => {
            let _ = resp.send(calc.recent(n));
        }
        Command::Statistics { resp } => {
            let _ = resp.send(calc.statistics());
        }
        Command::Shutdown { resp } => {
            let out = if config.save_on_shutdown && calc.history_location().is_some() {
                calc.save().map(|_| ())
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    for failure in calc.take_listener_failures() {
        log::warn!("runtime: {failure}");
    }
    false
}
