#![allow(dead_code)]

use async_trait::async_trait;
use puzzle_server::{Executor, TransportError, Transport};
use puzzle_solver::{Identifier, Update, UpdateKind};
use std::sync::Arc;
use std::time::Duration;

pub fn identifier(set: &str, problem: &str) -> Identifier {
    Identifier::new("Test", 2023, "tester", set, problem).unwrap()
}

pub fn executor() -> Arc<Executor> {
    Arc::new(Executor::new(4).unwrap())
}

/// In-memory transport recording everything it is sent
#[derive(Default)]
pub struct RecordingTransport {
    pub input: Option<String>,
    pub sent: Vec<Update>,
    pub closed: bool,
    /// Fail every send after this many successful ones
    pub fail_after: Option<usize>,
    /// Pause before each send
    pub send_delay: Duration,
}

impl RecordingTransport {
    pub fn with_input(input: &str) -> Self {
        Self {
            input: Some(input.to_string()),
            ..Default::default()
        }
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent.iter().map(|update| kind_name(&update.kind)).collect()
    }

    pub fn finished(&self) -> (bool, Option<String>, Option<String>, Option<i64>) {
        match &self.sent.last().unwrap().kind {
            UpdateKind::Finished {
                successful,
                solution,
                error,
                elapsed_nanoseconds,
            } => (*successful, solution.clone(), error.clone(), *elapsed_nanoseconds),
            other => panic!("last update is {other:?}"),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .iter()
            .filter_map(|update| match &update.kind {
                UpdateKind::Text { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

pub fn kind_name(kind: &UpdateKind) -> &'static str {
    match kind {
        UpdateKind::Start => "start",
        UpdateKind::Text { .. } => "text",
        UpdateKind::Grid { .. } => "grid",
        UpdateKind::GlyphGrid { .. } => "glyph-grid",
        UpdateKind::Table { .. } => "table",
        UpdateKind::Finished { .. } => "finished",
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn receive_input(&mut self) -> Result<String, TransportError> {
        self.input.take().ok_or(TransportError::Closed)
    }

    async fn send(&mut self, update: &Update) -> Result<(), TransportError> {
        if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
            return Err(TransportError::Io("connection reset".to_string()));
        }
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        self.sent.push(update.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}
