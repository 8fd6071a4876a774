//! Window arithmetic for the slideshow loader.
//!
//! Everything here is synchronous and side-effect free: given the per-position
//! load states and the focused index, a [`WindowPolicy`] decides which
//! positions to evict and which to request.

use crate::config::SlideshowConfig;
use crate::media::Thumbnail;
use std::ops::Range;

/// Identifier of one batch task.
pub type BatchId = u64;

/// Thumbnail slot of a single position.
///
/// `Unrequested -> Pending -> Resident | Failed`, and `Resident -> Unrequested`
/// when the position leaves the retained window.
#[derive(Debug, Clone, Default)]
pub enum Slot {
    #[default]
    Unrequested,
    Pending(BatchId),
    Resident(Thumbnail),
    Failed,
}

/// Data-free view of a [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unrequested,
    Pending,
    Resident,
    Failed,
}

impl Slot {
    pub fn state(&self) -> LoadState {
        match self {
            Slot::Unrequested => LoadState::Unrequested,
            Slot::Pending(_) => LoadState::Pending,
            Slot::Resident(_) => LoadState::Resident,
            Slot::Failed => LoadState::Failed,
        }
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        match self {
            Slot::Resident(thumbnail) => Some(thumbnail),
            _ => None,
        }
    }

    pub fn is_resident(&self) -> bool {
        matches!(self, Slot::Resident(_))
    }

    pub fn is_pending_for(&self, batch: BatchId) -> bool {
        matches!(self, Slot::Pending(id) if *id == batch)
    }
}

impl LoadState {
    /// Whether a pass should (re)issue an acquisition for this position.
    pub fn wants_request(self) -> bool {
        matches!(self, LoadState::Unrequested | LoadState::Failed)
    }

    /// Whether the position holds, or is about to hold, a thumbnail.
    pub fn occupies(self) -> bool {
        matches!(self, LoadState::Pending | LoadState::Resident)
    }
}

/// Outcome of one window pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowPlan {
    /// Look-ahead range opened by this pass, if the loaded tail was near.
    pub look_ahead: Option<Range<usize>>,
    /// Positions to clear, in ascending order.
    pub evict: Vec<usize>,
    /// Positions to acquire, nearest to the focus first.
    pub request: Vec<usize>,
}

/// Exclusive end of the run of pending or resident positions starting at `current`.
pub fn loaded_tail(states: &[LoadState], current: usize) -> usize {
    states
        .get(current..)
        .and_then(|rest| rest.iter().position(|state| !state.occupies()))
        .map_or(states.len().max(current), |offset| current + offset)
}

/// Batch and buffer sizes that shape the sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub advance_batch_size: usize,
    pub retention_buffer_size: usize,
}

impl From<&SlideshowConfig> for WindowPolicy {
    fn from(config: &SlideshowConfig) -> Self {
        Self {
            advance_batch_size: config.advance_batch_size,
            retention_buffer_size: config.retention_buffer_size,
        }
    }
}

impl WindowPolicy {
    /// Positions requested by the initial load.
    pub fn initial_range(&self, len: usize) -> Range<usize> {
        0..self.advance_batch_size.min(len)
    }

    /// Positions strictly closer than the buffer size to `current`.
    pub fn retention_range(&self, current: usize, len: usize) -> Range<usize> {
        let start = (current + 1).saturating_sub(self.retention_buffer_size);
        let end = current.saturating_add(self.retention_buffer_size).min(len);
        start..end
    }

    /// Retention range extended forward by one batch of unconsumed look-ahead.
    pub fn retained_range(&self, current: usize, len: usize) -> Range<usize> {
        let start = (current + 1).saturating_sub(self.retention_buffer_size);
        let end = current
            .saturating_add(self.retention_buffer_size)
            .saturating_add(self.advance_batch_size)
            .min(len);
        start..end
    }

    /// Next look-ahead batch once `current` is within one batch of `tail`.
    pub fn look_ahead(&self, current: usize, tail: usize, len: usize) -> Option<Range<usize>> {
        if tail.saturating_sub(current) > self.advance_batch_size {
            return None;
        }
        let start = tail.max(current);
        let end = start
            .saturating_add(self.advance_batch_size)
            .min(self.retained_range(current, len).end);
        (start < end).then_some(start..end)
    }

    /// Plans the evictions and requests for a focus change to `current`.
    pub fn plan(&self, states: &[LoadState], current: usize) -> WindowPlan {
        let len = states.len();
        let retained = self.retained_range(current, len);
        let retention = self.retention_range(current, len);
        let look_ahead = self.look_ahead(current, loaded_tail(states, current), len);

        let evict = states
            .iter()
            .enumerate()
            .filter(|(index, state)| state.occupies() && !retained.contains(index))
            .map(|(index, _)| index)
            .collect();

        let mut request: Vec<usize> = retention
            .chain(look_ahead.clone().unwrap_or_default())
            .filter(|&index| states[index].wants_request())
            .collect();
        request.sort_unstable_by_key(|&index| (index.abs_diff(current), index < current));
        request.dedup();

        WindowPlan {
            look_ahead,
            evict,
            request,
        }
    }
}
