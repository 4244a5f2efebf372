//! Async wrapper around [`Fareboard`] for use inside a Tokio runtime.
//!
//! Runs the blocking pipeline via [`tokio::task::spawn_blocking`] so a
//! scheduler or web handler can trigger runs without stalling its event loop.
//! Runs are serialized by a mutex: the read-modify-write of the history and
//! run counter must never interleave.
//!
//! # Example
//!
//! ```no_run
//! use fareboard::{AsyncFareboard, Fareboard};
//!
//! #[tokio::main]
//! async fn main() {
//!     let board = AsyncFareboard::build(Fareboard::builder()).await.unwrap();
//!     let outcome = board.run().await.unwrap();
//!     println!("{} observations", outcome.observations);
//! }
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::{FareError, Result};
use crate::pipeline::RunOutcome;
use crate::{Fareboard, FareboardBuilder};

/// Async, cloneable handle to a shared [`Fareboard`].
#[derive(Clone)]
pub struct AsyncFareboard {
    inner: Arc<Mutex<Fareboard>>,
}

impl From<Fareboard> for AsyncFareboard {
    fn from(board: Fareboard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(board)),
        }
    }
}

impl AsyncFareboard {
    /// Finish `builder` on the blocking pool (it may open files and build
    /// HTTP clients).
    pub async fn build(builder: FareboardBuilder) -> Result<Self> {
        tokio::task::spawn_blocking(move || builder.build().map(AsyncFareboard::from))
            .await
            .map_err(|e| FareError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Run a sync operation against the board on the blocking thread pool,
    /// holding the run lock for its whole duration.
    pub async fn with<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Fareboard) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let board = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = board
                .lock()
                .map_err(|_| FareError::InvalidArgument("Fareboard lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| FareError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.with(|b| b.run()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        self.with(move |b| b.run_at(now)).await
    }

    pub async fn render_report(&self, now: DateTime<Utc>) -> Result<bool> {
        self.with(move |b| b.render_report(now)).await
    }
}
