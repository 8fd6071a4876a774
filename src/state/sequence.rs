//! Ordered list of slideshow items and the focused position.

use crate::error::{AppError, Result};
use crate::media::{ItemId, MediaItem};
use crate::state::window::{LoadState, Slot};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Sort direction over modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    NewestFirst,
    OldestFirst,
}

/// An item together with its thumbnail slot.
#[derive(Debug, Clone)]
pub struct Slide {
    pub item: MediaItem,
    pub slot: Slot,
}

/// Owns the slideshow items in display order and tracks the focused one.
///
/// Slots travel with their item, so a re-sort never detaches a loaded
/// thumbnail from the item it belongs to.
#[derive(Debug)]
pub struct NodeSequence {
    slides: Vec<Slide>,
    positions: HashMap<ItemId, usize>,
    current: usize,
    previous: Option<usize>,
}

impl NodeSequence {
    /// Builds a sequence focused on `start`.
    ///
    /// Fails with [`AppError::StartItemNotFound`] if `start` is not one of `items`,
    /// and with [`AppError::DuplicateItem`] if two items share an id.
    pub fn new(items: Vec<MediaItem>, start: ItemId) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        if let Some(item) = items.iter().find(|item| !seen.insert(item.id)) {
            return Err(AppError::DuplicateItem(item.id));
        }

        let current = items
            .iter()
            .position(|item| item.id == start)
            .ok_or(AppError::StartItemNotFound(start))?;

        let slides: Vec<Slide> = items
            .into_iter()
            .map(|item| Slide {
                item,
                slot: Slot::Unrequested,
            })
            .collect();

        let mut sequence = Self {
            slides,
            positions: HashMap::new(),
            current,
            previous: None,
        };
        sequence.reindex();
        debug!(
            "Created sequence of {} items focused on {}",
            sequence.len(),
            current
        );
        Ok(sequence)
    }

    fn reindex(&mut self) {
        self.positions = self
            .slides
            .iter()
            .enumerate()
            .map(|(index, slide)| (slide.item.id, index))
            .collect();
    }

    /// Stably reorders by modification time and re-resolves the focused item.
    ///
    /// Only the order changes; slot contents are untouched.
    pub fn sort(&mut self, order: OrderMode) {
        let current_id = self.slides[self.current].item.id;
        let previous_id = self.previous.map(|index| self.slides[index].item.id);

        match order {
            OrderMode::NewestFirst => self
                .slides
                .sort_by(|a, b| b.item.modified.cmp(&a.item.modified)),
            OrderMode::OldestFirst => self
                .slides
                .sort_by(|a, b| a.item.modified.cmp(&b.item.modified)),
        }
        self.reindex();

        self.current = self.positions[&current_id];
        self.previous = previous_id.map(|id| self.positions[&id]);
        debug!("Sorted {} items by {:?}, focus now at {}", self.len(), order, self.current);
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the focused item.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Index focused before the last focus change, if any.
    pub fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    pub fn current_item(&self) -> &MediaItem {
        &self.slides[self.current].item
    }

    /// Moves the focus to `index`, recording `previous` as the prior focus.
    pub fn set_focus(&mut self, index: usize, previous: usize) -> Result<()> {
        self.check_index(index)?;
        self.check_index(previous)?;
        self.current = index;
        self.previous = Some(previous);
        Ok(())
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(AppError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    /// Current position of the item with `id`.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slides.get_mut(index).map(|slide| &mut slide.slot)
    }

    /// Data-free load state of every position, in display order.
    pub fn load_states(&self) -> Vec<LoadState> {
        self.slides.iter().map(|slide| slide.slot.state()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use chrono::{TimeZone, Utc};

    fn item(id: u64, minute: u32) -> MediaItem {
        MediaItem::new(
            ItemId(id),
            format!("{}.png", id),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            MediaKind::Image,
        )
    }

    fn ids(sequence: &NodeSequence) -> Vec<u64> {
        sequence.slides().iter().map(|slide| slide.item.id.0).collect()
    }

    #[test]
    fn rejects_missing_start_item() {
        let err = NodeSequence::new(vec![item(1, 0), item(2, 1)], ItemId(9)).unwrap_err();
        assert_eq!(err, AppError::StartItemNotFound(ItemId(9)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let items = vec![item(1, 0), item(2, 1), item(1, 2)];
        let err = NodeSequence::new(items, ItemId(2)).unwrap_err();
        assert_eq!(err, AppError::DuplicateItem(ItemId(1)));
    }

    #[test]
    fn rejects_empty_list() {
        assert!(NodeSequence::new(Vec::new(), ItemId(1)).is_err());
    }

    #[test]
    fn records_start_index() {
        let sequence = NodeSequence::new(vec![item(1, 0), item(2, 1), item(3, 2)], ItemId(3)).unwrap();
        assert_eq!(sequence.current_index(), 2);
        assert_eq!(sequence.previous_index(), None);
    }

    #[test]
    fn sort_is_a_permutation_and_keeps_focus() {
        let items = vec![item(1, 5), item(2, 1), item(3, 9), item(4, 3)];
        let mut sequence = NodeSequence::new(items, ItemId(4)).unwrap();

        sequence.sort(OrderMode::NewestFirst);
        assert_eq!(ids(&sequence), vec![3, 1, 4, 2]);
        assert_eq!(sequence.current_item().id, ItemId(4));
        assert_eq!(sequence.current_index(), 2);

        sequence.sort(OrderMode::OldestFirst);
        assert_eq!(ids(&sequence), vec![2, 4, 1, 3]);
        assert_eq!(sequence.current_index(), 1);

        let mut sorted = ids(&sequence);
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let items = vec![item(1, 0), item(2, 0), item(3, 0)];
        let mut sequence = NodeSequence::new(items, ItemId(2)).unwrap();
        sequence.sort(OrderMode::NewestFirst);
        assert_eq!(ids(&sequence), vec![1, 2, 3]);
        sequence.sort(OrderMode::OldestFirst);
        assert_eq!(ids(&sequence), vec![1, 2, 3]);
    }

    #[test]
    fn sort_re_resolves_previous_focus() {
        let items = vec![item(1, 0), item(2, 1), item(3, 2)];
        let mut sequence = NodeSequence::new(items, ItemId(1)).unwrap();
        sequence.set_focus(1, 0).unwrap();
        sequence.sort(OrderMode::NewestFirst);
        assert_eq!(sequence.current_index(), 1);
        assert_eq!(sequence.previous_index(), Some(2));
        assert_eq!(sequence.position_of(ItemId(1)), Some(2));
    }

    #[test]
    fn focus_outside_range_is_rejected() {
        let mut sequence = NodeSequence::new(vec![item(1, 0)], ItemId(1)).unwrap();
        assert_eq!(
            sequence.set_focus(3, 0),
            Err(AppError::IndexOutOfRange { index: 3, len: 1 })
        );
    }
}
