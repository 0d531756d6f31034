//! Batched mutation queue for ephemeral artifacts.
//!
//! Watcher handlers never talk to the store directly: they queue adds,
//! updates and deletes of local items here, and the dispatcher flushes the
//! queue once per scene batch. That way a batch touching many targets
//! commits all of its derived-artifact changes in one round-trip per
//! operation kind, and handler code stays synchronous.

use crate::id::ItemId;
use crate::item::Item;
use crate::store::{ItemStore, StoreError};

type LocalUpdate = (ItemId, Box<dyn FnOnce(&mut Item)>);

/// Command queue of pending local-item mutations.
#[derive(Default)]
pub struct Patcher {
    add_local: Vec<Item>,
    update_local: Vec<LocalUpdate>,
    delete_local: Vec<ItemId>,
}

impl Patcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a local item for creation.
    pub fn add_local(&mut self, item: Item) {
        self.add_local.push(item);
    }

    /// Queues an in-place mutation of the local item `id`.
    pub fn update_local(&mut self, id: ItemId, apply: impl FnOnce(&mut Item) + 'static) {
        self.update_local.push((id, Box::new(apply)));
    }

    /// Queues local items for deletion.
    pub fn delete_local(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.delete_local.extend(ids);
    }

    pub fn is_empty(&self) -> bool {
        self.add_local.is_empty() && self.update_local.is_empty() && self.delete_local.is_empty()
    }

    /// Applies the queued operations: all adds, then all updates as one
    /// combined write, then all deletes.
    pub async fn flush<S: ItemStore>(self, store: &S) -> Result<(), StoreError> {
        if !self.add_local.is_empty() {
            store.add_local_items(self.add_local).await?;
        }
        if !self.update_local.is_empty() {
            let mut pending = self.update_local;
            let ids: Vec<ItemId> = {
                let mut ids: Vec<ItemId> = pending.iter().map(|(id, _)| *id).collect();
                ids.dedup();
                ids
            };
            store
                .update_local_items(&ids, |item| {
                    // Apply every queued mutation for this item, in queue
                    // order.
                    let mut i = 0;
                    while i < pending.len() {
                        if pending[i].0 == item.id {
                            let (_, apply) = pending.remove(i);
                            apply(item);
                        } else {
                            i += 1;
                        }
                    }
                })
                .await?;
        }
        if !self.delete_local.is_empty() {
            store.delete_local_items(&self.delete_local).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemKind, MarkerData};
    use crate::math::Vec2;
    use crate::store::MemoryStore;
    use futures::executor::block_on;

    fn marker() -> Item {
        Item::builder(ItemKind::Marker(MarkerData { max_view_scale: 1.0 })).build()
    }

    #[test]
    fn flush_applies_adds_updates_and_deletes() {
        let store = MemoryStore::new();
        let existing = marker();
        let existing_id = existing.id;
        block_on(store.add_local_items(vec![existing])).unwrap();

        let added = marker();
        let added_id = added.id;
        let doomed = marker();
        let doomed_id = doomed.id;
        block_on(store.add_local_items(vec![doomed])).unwrap();

        let mut patcher = Patcher::new();
        assert!(patcher.is_empty());
        patcher.add_local(added);
        patcher.update_local(existing_id, |item| item.position = Vec2::new(5.0, 5.0));
        patcher.update_local(existing_id, |item| item.position.x += 1.0);
        patcher.delete_local([doomed_id]);
        assert!(!patcher.is_empty());

        block_on(patcher.flush(&store)).unwrap();
        assert!(store.local_item(added_id).is_some());
        assert!(store.local_item(doomed_id).is_none());
        // Both queued updates applied, in order.
        assert_eq!(
            store.local_item(existing_id).unwrap().position,
            Vec2::new(6.0, 5.0),
        );
    }
}
