use std::{path::PathBuf, sync::Mutex};

use async_trait::async_trait;

use crate::{
    client::{ClientError, ComposeClient},
    context::OpContext,
    testkit::{CallJournal, lock},
};

/// Compose backend that records `down` calls.
#[derive(Default)]
pub struct FakeComposeClient {
    downs: Mutex<Vec<(String, Vec<PathBuf>)>>,
    down_error: Mutex<Option<String>>,
    journal: Option<CallJournal>,
}

impl FakeComposeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Make every following `down` fail with `msg`.
    pub fn fail_downs(&self, msg: impl Into<String>) {
        *lock(&self.down_error) = Some(msg.into());
    }

    /// `(project, config_paths)` of each successful `down`, in call order.
    pub fn down_calls(&self) -> Vec<(String, Vec<PathBuf>)> {
        lock(&self.downs).clone()
    }
}

#[async_trait]
impl ComposeClient for FakeComposeClient {
    fn name(&self) -> &'static str {
        "fake-compose"
    }

    async fn down(
        &self,
        _ctx: &OpContext,
        project: &str,
        config_paths: &[PathBuf],
    ) -> Result<(), ClientError> {
        if let Some(journal) = &self.journal {
            journal.record(format!("compose.down({project})"));
        }
        if let Some(msg) = lock(&self.down_error).clone() {
            return Err(ClientError::Backend(msg));
        }
        lock(&self.downs).push((project.to_string(), config_paths.to_vec()));
        Ok(())
    }
}
