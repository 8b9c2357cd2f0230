//! Background session liveness monitor.
//!
//! Runs on its own thread with its own connection and re-validates the
//! persisted auth record every interval until stopped.

use crate::auth::store::{check_persisted_session, SessionCheck};
use crate::db::{now_epoch_ms, open_db};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Handle to a running monitor. Dropping it stops the thread.
pub struct SessionMonitor {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionMonitor {
    /// Starts a monitor that only logs outcomes.
    pub fn start(db_path: impl Into<PathBuf>, interval: Duration) -> std::io::Result<Self> {
        Self::start_with_listener(db_path, interval, |_| {})
    }

    /// Starts a monitor that reports every check outcome to `listener`.
    pub fn start_with_listener(
        db_path: impl Into<PathBuf>,
        interval: Duration,
        listener: impl Fn(SessionCheck) + Send + 'static,
    ) -> std::io::Result<Self> {
        let db_path = db_path.into();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("pms-session-monitor".to_string())
            .spawn(move || {
                info!(
                    "event=session_monitor module=auth status=start interval_ms={}",
                    interval.as_millis()
                );
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if let Some(check) = run_check(&db_path) {
                                listener(check);
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("event=session_monitor module=auth status=stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops the monitor and waits for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=session_monitor module=auth status=error error_code=thread_panicked");
            }
        }
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_check(db_path: &Path) -> Option<SessionCheck> {
    let conn = match open_db(db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=session_check module=auth status=error error_code=db_open_failed error={err}"
            );
            return None;
        }
    };
    match check_persisted_session(&conn, now_epoch_ms()) {
        Ok(check) => Some(check),
        Err(err) => {
            error!("event=session_check module=auth status=error error={err}");
            None
        }
    }
}
