//! Per-frame coalescing of dimension changes.

use crate::model::{DimensionSnapshot, ObservationId, Region, TransitionSource};
use crate::ports::ResizeSource;
use tracing::debug;

/// Owns the current [`DimensionSnapshot`] and the region observations.
///
/// Any number of changes between two frames produce a single snapshot from
/// [`on_frame`](Self::on_frame). The snapshot is tagged with the most
/// significant source seen: a viewport or max-height change wins over element
/// resizes.
#[derive(Debug, Clone)]
pub struct DimensionTracker {
    snapshot: DimensionSnapshot,
    max_height_override: Option<f64>,
    observations: Vec<(Region, ObservationId)>,
    dirty: Option<TransitionSource>,
}

impl DimensionTracker {
    /// Tracker for a viewport of the given height, nothing measured yet.
    pub fn new(viewport_height: f64, max_height_override: Option<f64>) -> Self {
        let mut snapshot = DimensionSnapshot::new(viewport_height, 0.0, 0.0, 0.0);
        if let Some(max) = max_height_override {
            snapshot = snapshot.with_max_height(max);
        }
        Self {
            snapshot,
            max_height_override,
            observations: Vec::new(),
            dirty: None,
        }
    }

    /// The latest snapshot, including changes not yet flushed by a frame.
    pub fn snapshot(&self) -> DimensionSnapshot {
        self.snapshot
    }

    /// Whether regions are currently observed.
    pub fn is_observing(&self) -> bool {
        !self.observations.is_empty()
    }

    /// Start observing every region. No-op if already observing.
    pub fn activate(&mut self, source: &mut dyn ResizeSource) {
        if self.is_observing() {
            return;
        }
        self.observations = Region::ALL
            .iter()
            .map(|&region| (region, source.observe(region)))
            .collect();
        debug!(count = self.observations.len(), "Observing sheet regions");
    }

    /// Release every observation handle.
    pub fn deactivate(&mut self, source: &mut dyn ResizeSource) {
        for (_, id) in self.observations.drain(..) {
            source.unobserve(id);
        }
    }

    /// A region's border-box height changed.
    pub fn record(&mut self, region: Region, height: f64) {
        let before = self.snapshot.region(region);
        self.snapshot.set_region(region, height);
        if self.snapshot.region(region) != before {
            self.mark(TransitionSource::Element);
        }
    }

    /// The viewport height changed.
    pub fn viewport_resized(&mut self, height: f64) {
        let before = self.snapshot;
        let mut next = DimensionSnapshot::new(
            height,
            before.header_height,
            before.content_height,
            before.footer_height,
        );
        if let Some(max) = self.max_height_override {
            debug!(height, max, "Viewport changed under a max height override");
            next = next.with_max_height(max);
        }
        self.snapshot = next;
        if next != before {
            self.mark(TransitionSource::Window);
        }
    }

    /// Set or clear the controlled max height.
    pub fn set_max_height(&mut self, max_height: Option<f64>) {
        let before = self.snapshot;
        self.max_height_override = max_height;
        let max = max_height.unwrap_or(before.viewport_height);
        self.snapshot = before.with_max_height(max);
        if self.snapshot != before {
            self.mark(TransitionSource::MaxHeight);
        }
    }

    /// Take the coalesced change for this frame, if any.
    pub fn on_frame(&mut self) -> Option<(DimensionSnapshot, TransitionSource)> {
        self.dirty.take().map(|source| (self.snapshot, source))
    }

    fn mark(&mut self, source: TransitionSource) {
        self.dirty = match self.dirty.take() {
            Some(existing) if source == TransitionSource::Element => Some(existing),
            _ => Some(source),
        };
    }
}
