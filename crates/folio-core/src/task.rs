//! Background work that reports back to the UI thread through messages.
//!
//! The widget tree has a single writer. A [`Worker`] never sees it: the job
//! gets a [`CancelFlag`] to poll between units of work and a [`Sink`] to post
//! progress into, and the main loop applies those messages on its own turn.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

/// Destination for messages posted from a worker thread.
pub trait Sink<M>: Send + 'static {
    /// Returns `false` once the receiving side is gone.
    fn post(&self, msg: M) -> bool;
}

impl<M: Send + 'static> Sink<M> for mpsc::Sender<M> {
    fn post(&self, msg: M) -> bool {
        self.send(msg).is_ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Messages every job posts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Step { current: usize, total: usize },
    Finished { cancelled: bool },
}

pub struct Worker {
    name: String,
    cancel: CancelFlag,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Runs `job` on a named thread. The job must post its own terminal
    /// message, including when it stops early because of cancellation.
    pub fn spawn<F>(name: impl Into<String>, job: F) -> std::io::Result<Self>
    where
        F: FnOnce(CancelFlag) + Send + 'static,
    {
        let name = name.into();
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || job(flag))?;
        log::info!("worker '{name}' started");
        Ok(Self {
            name,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(&self) {
        log::debug!("worker '{}' cancel requested", self.name);
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the thread. Call after the terminal message arrived.
    pub fn join(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("worker '{}' panicked", self.name);
            } else {
                log::info!("worker '{}' finished", self.name);
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
            self.finish();
        }
    }
}
