//! Async driver for `.await`

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use super::Interrupt;
use crate::error::EvalError;
use crate::value::Value;

/// Runtime that drives native futures to completion.
///
/// The runtime keeps one worker thread so tasks spawned by awaited futures
/// progress while the interpreter is busy evaluating synchronous code.
#[derive(Debug)]
pub struct Driver {
    runtime: Runtime,
}

impl Driver {
    /// Build a driver with its own runtime.
    pub fn new() -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("doctide-driver")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    /// Run `future` to completion on the calling thread.
    ///
    /// Returns [`EvalError::Interrupted`] as soon as `interrupt` trips and
    /// [`EvalError::Timeout`] once `timeout` elapses.
    pub fn block_on<F>(
        &self,
        future: F,
        interrupt: &Interrupt,
        timeout: Option<Duration>,
    ) -> Result<Value, EvalError>
    where
        F: Future<Output = Result<Value, String>>,
    {
        self.runtime.block_on(async {
            let notified = interrupt.notify().notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if interrupt.is_tripped() {
                return Err(EvalError::Interrupted);
            }

            let completion = async {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, future)
                        .await
                        .map_err(|_| EvalError::Timeout {
                            millis: limit.as_millis(),
                        })?,
                    None => future.await,
                }
                .map_err(|message| EvalError::Future { message })
            };

            tokio::select! {
                _ = &mut notified => Err(EvalError::Interrupted),
                result = completion => result,
            }
        })
    }
}

/// Trip `interrupt` on every Ctrl-C for the rest of the process.
///
/// The listener runs on its own thread and runtime, so it outlives every
/// session and also covers the time between documents.
pub fn listen_for_ctrl_c(interrupt: Interrupt) -> std::io::Result<()> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    std::thread::Builder::new()
        .name("doctide-ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                loop {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            tracing::debug!("received Ctrl-C, interrupting evaluation");
                            interrupt.trip();
                        }
                        Err(e) => {
                            tracing::warn!("unable to listen for Ctrl-C: {e}");
                            break;
                        }
                    }
                }
            })
        })?;
    Ok(())
}
