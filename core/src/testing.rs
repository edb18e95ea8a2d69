//! Recording doubles for [`CommandRunner`] and [`ProcessReplacer`].
//!
//! The runner delegates to a behavior closure, which may touch the
//! filesystem the way a real tool would (write `package.json`, create
//! `node_modules`) before returning a status.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::Result;
use crate::process::{CommandRunner, CommandStatus, Invocation, ProcessReplacer};

type Behavior = Box<dyn Fn(&Invocation) -> CommandStatus + Send + Sync>;

pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    behavior: Behavior,
}

impl RecordingRunner {
    pub fn new<F>(behavior: F) -> Self
    where
        F: Fn(&Invocation) -> CommandStatus + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            behavior: Box::new(behavior),
        }
    }

    /// Every command exits 0 and changes nothing.
    pub fn succeeding() -> Self {
        Self::new(|_| CommandStatus::SUCCESS)
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        Ok((self.behavior)(invocation))
    }
}

/// Records the handoff instead of performing it.
#[derive(Default)]
pub struct RecordingReplacer {
    launched: Mutex<Vec<Invocation>>,
}

impl RecordingReplacer {
    pub fn launched(&self) -> Vec<Invocation> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProcessReplacer for RecordingReplacer {
    fn replace(&self, invocation: &Invocation) -> Result<()> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        Ok(())
    }
}
