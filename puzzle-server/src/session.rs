//! One client request: read input, run the problem, stream its updates
//!
//! Ordering on the wire is fixed: one `start`, then every non-terminal update in
//! the order it was reported, then exactly one `finished` carrying the elapsed
//! time of the solve call. A `finished` reported by the problem is held back
//! until the worker has returned and the queue is drained.

use crate::error::TransportError;
use crate::executor::{Executor, Outcome};
use async_trait::async_trait;
use puzzle_solver::{Identifier, Problem, Update, update_channel};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Message sent when a problem returns without ever reporting a result
pub const NO_RESULT_MESSAGE: &str = "solver completed without reporting a result";

/// Bidirectional channel to the client of one session
#[async_trait]
pub trait Transport: Send {
    /// Wait for the single input message
    async fn receive_input(&mut self) -> Result<String, TransportError>;

    /// Deliver one update
    async fn send(&mut self, update: &Update) -> Result<(), TransportError>;

    /// Close the channel after the last update
    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// What a session delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub successful: bool,
    pub elapsed: Duration,
    /// Updates handed to the transport without error, `start` and `finished` included
    pub delivered: usize,
}

/// A request bound to a resolved problem, waiting for its input
pub struct Session {
    id: Identifier,
    problem: Arc<dyn Problem>,
    executor: Arc<Executor>,
}

impl Session {
    pub fn new(id: Identifier, problem: Arc<dyn Problem>, executor: Arc<Executor>) -> Self {
        Self {
            id,
            problem,
            executor,
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Drive the session to completion
    ///
    /// Fails only if no input arrives. Once the problem is running, a broken
    /// transport is logged and the run is still awaited to the end.
    pub async fn run<T>(self, transport: &mut T) -> Result<SessionSummary, TransportError>
    where
        T: Transport + ?Sized,
    {
        let input = match transport.receive_input().await {
            Ok(input) => input,
            Err(e) => {
                warn!(id = %self.id, error = %e, "session ended before input was received");
                let _ = transport.close().await;
                return Err(e);
            }
        };

        let session_start = Instant::now();
        info!(id = %self.id, input_bytes = input.len(), "starting solver");

        let (reporter, mut updates) = update_channel(self.id.clone());
        let mut relay = Relay::new(transport, &self.id);
        relay.deliver(Update::start(self.id.clone())).await;

        let mut worker = self.executor.spawn(Arc::clone(&self.problem), input, reporter);
        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut worker => break outcome.unwrap_or_else(|_| Outcome::lost()),
                Some(update) = updates.read() => relay.offer(update).await,
            }
        };

        for update in updates.read_all_current() {
            relay.offer(update).await;
        }

        let successful;
        let finished = match outcome.result {
            Ok(()) => match relay.held.take() {
                Some(finished) => {
                    successful = is_successful(&finished);
                    finished
                }
                None => {
                    warn!(id = %self.id, "{NO_RESULT_MESSAGE}");
                    successful = false;
                    Update::failed(self.id.clone(), NO_RESULT_MESSAGE)
                }
            },
            Err(failure) => {
                if failure.panicked {
                    error!(id = %self.id, error = %failure.message, trace = ?failure.trace, "solver panicked");
                } else {
                    error!(id = %self.id, error = %failure.message, trace = ?failure.trace, "solver failed");
                }
                successful = false;
                Update::failed(self.id.clone(), failure.message)
            }
        };
        relay.deliver(finished.with_elapsed(outcome.elapsed)).await;
        relay.close().await;

        info!(
            id = %self.id,
            successful,
            solve_ms = outcome.elapsed.as_millis() as u64,
            session_ms = session_start.elapsed().as_millis() as u64,
            "session finished"
        );

        Ok(SessionSummary {
            successful,
            elapsed: outcome.elapsed,
            delivered: relay.delivered,
        })
    }
}

fn is_successful(update: &Update) -> bool {
    matches!(
        update.kind,
        puzzle_solver::UpdateKind::Finished {
            successful: true,
            ..
        }
    )
}

/// Forwards updates while the transport works and holds back the terminal one
struct Relay<'a, T: ?Sized> {
    transport: &'a mut T,
    id: &'a Identifier,
    open: bool,
    delivered: usize,
    held: Option<Update>,
}

impl<'a, T> Relay<'a, T>
where
    T: Transport + ?Sized,
{
    fn new(transport: &'a mut T, id: &'a Identifier) -> Self {
        Self {
            transport,
            id,
            open: true,
            delivered: 0,
            held: None,
        }
    }

    async fn offer(&mut self, update: Update) {
        if update.is_finished() {
            if self.held.replace(update).is_some() {
                debug!(id = %self.id, "solver reported more than one result; keeping the latest");
            }
        } else {
            self.deliver(update).await;
        }
    }

    async fn deliver(&mut self, update: Update) {
        if !self.open {
            return;
        }
        match self.transport.send(&update).await {
            Ok(()) => self.delivered += 1,
            Err(e) => {
                warn!(id = %self.id, error = %e, "client unreachable; discarding further updates");
                self.open = false;
            }
        }
    }

    async fn close(&mut self) {
        if !self.open {
            return;
        }
        if let Err(e) = self.transport.close().await {
            debug!(id = %self.id, error = %e, "closing transport failed");
        }
    }
}
