use std::sync::{Arc, mpsc};

use crate::{
    assets::decode::{PreparedFrame, decode_frame},
    assets::source::FrameSource,
    config::reel::SequenceSpec,
    foundation::core::FrameIndex,
    foundation::error::ReelResult,
};

/// Load state of one sequence slot.
#[derive(Clone, Debug)]
pub enum LoadState {
    /// Not requested yet, or fetch/decode still in flight.
    Pending,
    /// Decoded and drawable.
    Ready(PreparedFrame),
    /// Fetch or decode failed. Never retried.
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

struct LoadDone {
    index: FrameIndex,
    result: ReelResult<PreparedFrame>,
}

/// Holds every frame of the sequence, in index order, together with its load state.
///
/// Loads run on the rayon pool and report back over a channel; [`FrameStore::poll`] applies
/// them on the owning thread.
pub struct FrameStore {
    sequence: SequenceSpec,
    source: Arc<dyn FrameSource>,
    slots: Vec<LoadState>,
    started: bool,
    in_flight: usize,
    tx: mpsc::Sender<LoadDone>,
    rx: mpsc::Receiver<LoadDone>,
}

impl std::fmt::Debug for FrameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStore")
            .field("frames", &self.slots.len())
            .field("ready", &self.ready_count())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl FrameStore {
    pub fn new(sequence: SequenceSpec, source: Arc<dyn FrameSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        let slots = vec![LoadState::Pending; sequence.frame_count as usize];
        Self {
            sequence,
            source,
            slots,
            started: false,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Start loading every frame, index 0 first. Later calls are no-ops.
    pub fn preload(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        for index in self.sequence.indices() {
            let path = self.sequence.frame_path(index);
            let source = Arc::clone(&self.source);
            let tx = self.tx.clone();
            self.in_flight += 1;
            rayon::spawn(move || {
                let result = source.fetch(&path).and_then(|bytes| decode_frame(&bytes));
                // The store may already be gone; nobody is waiting then.
                let _ = tx.send(LoadDone { index, result });
            });
        }
        tracing::debug!(frames = self.slots.len(), "preload started");
    }

    /// Apply completed loads without blocking. Returns the indices that settled.
    pub fn poll(&mut self) -> Vec<FrameIndex> {
        let mut settled = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            settled.push(self.settle(done));
        }
        settled
    }

    /// Block until every started load has settled. Returns the indices that settled.
    pub fn wait_all(&mut self) -> Vec<FrameIndex> {
        let mut settled = self.poll();
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(done) => settled.push(self.settle(done)),
                Err(_) => break,
            }
        }
        settled
    }

    fn settle(&mut self, done: LoadDone) -> FrameIndex {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Some(slot) = self.slots.get_mut(done.index.as_usize()) else {
            return done.index;
        };
        *slot = match done.result {
            Ok(frame) => {
                tracing::trace!(frame = %done.index, "frame loaded");
                LoadState::Ready(frame)
            }
            Err(e) => {
                tracing::warn!(frame = %done.index, error = %e, "frame failed to load");
                LoadState::Failed(e.to_string())
            }
        };
        done.index
    }

    /// The decoded frame at `index`, if it has finished loading.
    pub fn get(&self, index: FrameIndex) -> Option<&PreparedFrame> {
        match self.slots.get(index.as_usize()) {
            Some(LoadState::Ready(frame)) => Some(frame),
            _ => None,
        }
    }

    pub fn state(&self, index: FrameIndex) -> Option<&LoadState> {
        self.slots.get(index.as_usize())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_ready()).count()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn sequence(&self) -> &SequenceSpec {
        &self.sequence
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
