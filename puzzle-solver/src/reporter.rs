//! Per-execution update channel
//!
//! A running problem holds a [`Reporter`] (any number of clones, from any thread) and
//! the session loop holds the single [`Updates`] reader. The queue is unbounded: a
//! problem never blocks on a slow transport, and every reported update is read exactly
//! once.

use crate::identifier::Identifier;
use crate::update::{Glyph, Update, UpdateKind};
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// Create a fresh channel for one execution of the problem addressed by `id`
pub fn update_channel(id: Identifier) -> (Reporter, Updates) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Reporter {
            id: Arc::new(id),
            tx,
        },
        Updates { rx },
    )
}

/// Producer side of the update channel
///
/// Cheap to clone; clones may report concurrently from nested worker threads.
#[derive(Debug, Clone)]
pub struct Reporter {
    id: Arc<Identifier>,
    tx: UnboundedSender<Update>,
}

impl Reporter {
    /// The identifier stamped onto every update produced through this reporter
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Enqueue an update
    ///
    /// Never blocks. Updates reported after the session went away are dropped.
    pub fn report(&self, update: Update) {
        if self.tx.send(update).is_err() {
            tracing::trace!(id = %self.id, "update reported after reader was dropped");
        }
    }

    fn report_kind(&self, kind: UpdateKind) {
        self.report(Update::new(Identifier::clone(&self.id), kind));
    }

    pub fn text(&self, text: impl Into<String>) {
        self.report_kind(UpdateKind::Text { text: text.into() });
    }

    pub fn grid<I, S>(&self, rows: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.report_kind(UpdateKind::Grid {
            rows: rows.into_iter().map(Into::into).collect(),
        });
    }

    pub fn glyph_grid(&self, rows: Vec<Vec<Glyph>>) {
        self.report_kind(UpdateKind::GlyphGrid { rows });
    }

    pub fn table(&self, headers: Vec<String>, rows: Vec<Vec<String>>) {
        self.report_kind(UpdateKind::Table { headers, rows });
    }

    /// Report the final answer
    pub fn solved(&self, solution: impl Into<String>) {
        self.report(Update::solved(Identifier::clone(&self.id), solution));
    }

    /// Report a handled failure without aborting the problem body
    pub fn failed(&self, error: impl Into<String>) {
        self.report(Update::failed(Identifier::clone(&self.id), error));
    }
}

/// Consumer side of the update channel
///
/// Reading takes `&mut self`, so at most one reader can be outstanding.
#[derive(Debug)]
pub struct Updates {
    rx: UnboundedReceiver<Update>,
}

impl Updates {
    /// Wait for the next update and remove it from the queue
    ///
    /// Returns `None` once every [`Reporter`] is dropped and the queue is empty.
    /// Cancel safe: dropping the future never loses an update.
    pub async fn read(&mut self) -> Option<Update> {
        self.rx.recv().await
    }

    /// Remove and return everything currently buffered without waiting
    pub fn read_all_current(&mut self) -> Vec<Update> {
        let mut drained = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(update) => drained.push(update),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    /// Yield updates as they arrive, up to and including the first `finished` update
    pub fn read_all(&mut self) -> impl Stream<Item = Update> + '_ {
        futures::stream::unfold((self, false), |(updates, done)| async move {
            if done {
                return None;
            }
            let update = updates.read().await?;
            let finished = update.is_finished();
            Some((update, (updates, finished)))
        })
    }
}
