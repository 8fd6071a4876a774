//! Sliding-window thumbnail loader for a slideshow.
//!
//! Keeps a bounded set of thumbnails resident around the focused position:
//! - `start_initial_load` requests the first batch
//! - `on_index_changed` evicts what fell out of the window and requests what
//!   came into it, including the next look-ahead batch
//! - acquisitions of one pass run concurrently inside a single batch task that
//!   can be awaited or aborted as a unit
//!
//! Window bookkeeping happens synchronously under one lock; the only
//! suspension points are the acquisitions themselves.

use crate::config::SlideshowConfig;
use crate::error::Result;
use crate::events::{EventHub, SlideshowEvent, Subscription};
use crate::media::{ItemId, MediaItem, Thumbnail};
use crate::services::ThumbnailSource;
use crate::state::{BatchId, LoadState, NodeSequence, OrderMode, Slot, WindowPolicy};
use async_std::task::{self, JoinHandle};
use futures_util::future::{AbortHandle, Aborted, abortable};
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Read-only view of one position for rendering.
#[derive(Debug, Clone)]
pub struct SlideView {
    pub index: usize,
    pub item: MediaItem,
    pub state: LoadState,
    pub thumbnail: Option<Thumbnail>,
}

/// State shared between the service and its batch tasks.
struct Window {
    sequence: NodeSequence,
    next_batch: BatchId,
    active: HashSet<BatchId>,
}

/// A batch marked pending but not yet spawned.
struct BatchRequest {
    id: BatchId,
    items: Vec<MediaItem>,
}

struct BatchTask {
    id: BatchId,
    abort: AbortHandle,
    handle: JoinHandle<std::result::Result<(), Aborted>>,
}

impl Window {
    /// Marks every requestable position in `positions` as pending for a new batch.
    ///
    /// Positions that are already pending or resident are skipped, so no
    /// position is ever pending for two batches at once.
    fn mark_pending(&mut self, positions: impl IntoIterator<Item = usize>) -> Option<BatchRequest> {
        let id = self.next_batch;
        let mut items = Vec::new();

        for index in positions {
            let Some(slide) = self.sequence.slide(index) else {
                continue;
            };
            if !slide.slot.state().wants_request() {
                continue;
            }
            items.push(slide.item.clone());
            if let Some(slot) = self.sequence.slot_mut(index) {
                *slot = Slot::Pending(id);
            }
        }

        if items.is_empty() {
            return None;
        }
        self.next_batch += 1;
        self.active.insert(id);
        Some(BatchRequest { id, items })
    }

    /// Clears a position and reports it if it held or awaited a thumbnail.
    fn evict(&mut self, index: usize, events: &EventHub) {
        let Some(id) = self.sequence.slide(index).map(|slide| slide.item.id) else {
            return;
        };
        if let Some(slot) = self.sequence.slot_mut(index) {
            if slot.state().occupies() {
                *slot = Slot::Unrequested;
                events.emit(SlideshowEvent::Evicted { index, id });
            }
        }
    }

    /// Reverts every pending slot, so late results from aborted batches are dropped.
    fn revert_pending(&mut self) -> usize {
        let mut reverted = 0;
        for index in 0..self.sequence.len() {
            if let Some(slot) = self.sequence.slot_mut(index) {
                if matches!(slot, Slot::Pending(_)) {
                    *slot = Slot::Unrequested;
                    reverted += 1;
                }
            }
        }
        self.active.clear();
        reverted
    }

    fn resident_indices(&self) -> Vec<usize> {
        self.sequence
            .slides()
            .iter()
            .enumerate()
            .filter(|(_, slide)| slide.slot.is_resident())
            .map(|(index, _)| index)
            .collect()
    }
}

fn lock(window: &Mutex<Window>) -> MutexGuard<'_, Window> {
    window.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Whether `item` is still waiting on `batch`. Evicted or cancelled items are skipped.
fn still_wanted(window: &Mutex<Window>, batch: BatchId, item: &MediaItem) -> bool {
    let window = lock(window);
    window
        .sequence
        .position_of(item.id)
        .and_then(|index| window.sequence.slide(index))
        .is_some_and(|slide| slide.slot.is_pending_for(batch))
}

/// Writes one acquisition result to wherever the item currently sits.
///
/// The write only lands if the slot is still pending for `batch`; anything
/// else means the position was evicted or the batch was cancelled meanwhile.
fn apply_result(
    window: &Mutex<Window>,
    events: &EventHub,
    batch: BatchId,
    item: &MediaItem,
    result: Result<Thumbnail>,
) {
    let mut window = lock(window);
    let Some(index) = window.sequence.position_of(item.id) else {
        return;
    };
    let Some(slot) = window.sequence.slot_mut(index) else {
        return;
    };
    if !slot.is_pending_for(batch) {
        debug!("Discarding stale result for {} from batch {}", item.id, batch);
        return;
    }

    match result {
        Ok(thumbnail) => {
            *slot = Slot::Resident(thumbnail);
            events.emit(SlideshowEvent::Loaded { index, id: item.id });
        }
        Err(e) => {
            warn!("Thumbnail for {} ({}) failed: {}", item.id, item.name, e);
            *slot = Slot::Failed;
            events.emit(SlideshowEvent::Failed { index, id: item.id });
        }
    }
}

async fn run_batch<S: ThumbnailSource>(
    request: BatchRequest,
    window: Arc<Mutex<Window>>,
    source: Arc<S>,
    events: EventHub,
    concurrency: usize,
) {
    let batch = request.id;
    let count = request.items.len();
    let done = Arc::clone(&window);

    stream::iter(request.items)
        .for_each_concurrent(concurrency, move |item| {
            let window = Arc::clone(&window);
            let source = Arc::clone(&source);
            let events = events.clone();
            async move {
                if !still_wanted(&window, batch, &item) {
                    return;
                }
                let result = source.acquire(&item).await;
                apply_result(&window, &events, batch, &item, result);
            }
        })
        .await;

    lock(&done).active.remove(&batch);
    debug!("Batch {} finished ({} items)", batch, count);
}

/// Sliding-window loader over a [`NodeSequence`].
///
/// Calls are expected from a single owner (the view driving the slideshow).
/// Dropping the service aborts every outstanding batch.
pub struct SlideshowService<S: ThumbnailSource> {
    window: Arc<Mutex<Window>>,
    source: Arc<S>,
    config: SlideshowConfig,
    policy: WindowPolicy,
    events: EventHub,
    batches: Vec<BatchTask>,
}

impl<S: ThumbnailSource> SlideshowService<S> {
    /// Creates a loader over `sequence`. Nothing is requested until
    /// [`start_initial_load`](Self::start_initial_load).
    pub fn new(sequence: NodeSequence, source: S, config: SlideshowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: Arc::new(Mutex::new(Window {
                sequence,
                next_batch: 0,
                active: HashSet::new(),
            })),
            source: Arc::new(source),
            policy: WindowPolicy::from(&config),
            config,
            events: EventHub::new(),
            batches: Vec::new(),
        })
    }

    /// Builds the sequence from `items` focused on `start` and wraps it.
    pub fn from_items(
        items: Vec<MediaItem>,
        start: ItemId,
        source: S,
        config: SlideshowConfig,
    ) -> Result<Self> {
        Self::new(NodeSequence::new(items, start)?, source, config)
    }

    pub fn config(&self) -> &SlideshowConfig {
        &self.config
    }

    /// Requests the first `advance_batch_size` positions.
    ///
    /// Supersedes any batch still in flight from an earlier call.
    pub fn start_initial_load(&mut self) {
        self.cancel_pending();

        let request = {
            let mut window = lock(&self.window);
            let range = self.policy.initial_range(window.sequence.len());
            info!("Initial load of positions {:?}", range);
            window.mark_pending(range)
        };
        self.spawn(request);
    }

    /// Returns whether the focused item's thumbnail is resident.
    ///
    /// If it is neither resident nor pending, a single-item batch is started
    /// for it so the caller can show a placeholder in the meantime.
    pub fn load_current_item_preview(&mut self) -> bool {
        let request = {
            let mut window = lock(&self.window);
            let current = window.sequence.current_index();
            if window
                .sequence
                .slide(current)
                .is_some_and(|slide| slide.slot.is_resident())
            {
                return true;
            }
            window.mark_pending([current])
        };
        self.spawn(request);
        false
    }

    /// Moves the focus from `old_index` to `new_index` and reshapes the window.
    ///
    /// Evictions happen before this returns; requests run in one new batch.
    pub fn on_index_changed(&mut self, new_index: usize, old_index: usize) -> Result<()> {
        let request = {
            let mut window = lock(&self.window);
            window.sequence.set_focus(new_index, old_index)?;

            let states = window.sequence.load_states();
            let plan = self.policy.plan(&states, new_index);

            for &index in &plan.evict {
                window.evict(index, &self.events);
            }
            if !plan.evict.is_empty() {
                debug!("Evicted {} positions around {}", plan.evict.len(), new_index);
            }
            if let Some(range) = &plan.look_ahead {
                info!("Look-ahead from {} opens {:?}", new_index, range);
            }
            window.mark_pending(plan.request)
        };

        self.events.emit(SlideshowEvent::FocusChanged {
            index: new_index,
            previous: old_index,
        });
        self.spawn(request);
        Ok(())
    }

    /// Re-sorts the items. Slots stay with their items and nothing is loaded
    /// or evicted until the next focus change.
    pub fn sort(&mut self, order: OrderMode) {
        lock(&self.window).sequence.sort(order);
    }

    fn spawn(&mut self, request: Option<BatchRequest>) {
        let Some(request) = request else {
            return;
        };

        {
            let window = lock(&self.window);
            self.batches.retain(|task| window.active.contains(&task.id));
        }

        let id = request.id;
        debug!("Spawning batch {} with {} items", id, request.items.len());
        let (future, abort) = abortable(run_batch(
            request,
            Arc::clone(&self.window),
            Arc::clone(&self.source),
            self.events.clone(),
            self.config.max_concurrent_acquisitions,
        ));
        let handle = task::spawn(future);
        self.batches.push(BatchTask { id, abort, handle });
    }

    /// Waits until every batch spawned so far has finished or been aborted.
    pub async fn wait_for_pending(&mut self) {
        for task in std::mem::take(&mut self.batches) {
            if task.handle.await.is_err() {
                debug!("Batch {} was aborted", task.id);
            }
        }
    }

    /// Aborts every outstanding batch. Pending positions go back to
    /// unrequested and any result still in flight is discarded.
    pub fn cancel_pending(&mut self) {
        for task in &self.batches {
            task.abort.abort();
        }
        let cancelled = self.batches.len();
        self.batches.clear();

        let reverted = lock(&self.window).revert_pending();
        if cancelled > 0 || reverted > 0 {
            info!(
                "Cancelled {} batches, {} positions back to unrequested",
                cancelled, reverted
            );
        }
    }

    /// Tears the slideshow down, cancelling outstanding acquisitions.
    pub fn dismiss(mut self) {
        info!(
            "Dismissing slideshow with {} listeners attached",
            self.events.listener_count()
        );
        self.cancel_pending();
    }

    /// Adds a listener for window events.
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        lock(&self.window).sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.window).sequence.is_empty()
    }

    pub fn current_index(&self) -> usize {
        lock(&self.window).sequence.current_index()
    }

    pub fn previous_index(&self) -> Option<usize> {
        lock(&self.window).sequence.previous_index()
    }

    /// The focused item.
    pub fn current_item(&self) -> MediaItem {
        lock(&self.window).sequence.current_item().clone()
    }

    pub fn state_at(&self, index: usize) -> Option<LoadState> {
        lock(&self.window)
            .sequence
            .slide(index)
            .map(|slide| slide.slot.state())
    }

    pub fn thumbnail_at(&self, index: usize) -> Option<Thumbnail> {
        lock(&self.window)
            .sequence
            .slide(index)
            .and_then(|slide| slide.slot.thumbnail().cloned())
    }

    pub fn resident_indices(&self) -> Vec<usize> {
        lock(&self.window).resident_indices()
    }

    pub fn resident_count(&self) -> usize {
        self.resident_indices().len()
    }

    /// Items in display order with their current load state.
    pub fn snapshot(&self) -> Vec<SlideView> {
        lock(&self.window)
            .sequence
            .slides()
            .iter()
            .enumerate()
            .map(|(index, slide)| SlideView {
                index,
                item: slide.item.clone(),
                state: slide.slot.state(),
                thumbnail: slide.slot.thumbnail().cloned(),
            })
            .collect()
    }
}

impl<S: ThumbnailSource> Drop for SlideshowService<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
