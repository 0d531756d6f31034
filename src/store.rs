//! The host scene-store interface, and an in-process reference store.
//!
//! Everything this crate derives lives in a scene store it does not own:
//! persisted items shared with other editors, and local-only items (effects,
//! handles) visible to this client alone. [`ItemStore`] is the async facade
//! over that store; its methods are the only suspension points in the crate,
//! and anything captured before one of those awaits must be treated as
//! possibly stale after it.
//!
//! [`MemoryStore`] is the in-process implementation backing the integration
//! tests and host-less embedding. It reproduces the one store behavior the
//! watcher relies on: deleting a persisted item also deletes the local items
//! attached to it.

use crate::gradient::ToolConfig;
use crate::id::ItemId;
use crate::item::{Item, Metadata, MetadataValue, METADATA_KEY_TOOL};
use crate::math::{BoundingBox, Vec2};
use ahash::{HashMap, HashMapExt};
use std::cell::RefCell;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by store round-trips. Propagated to the caller, never
/// retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// One batch from the scene-change subscription: items created, mutated and
/// deleted since the previous batch. Batches arrive strictly in order and
/// are processed one at a time.
#[derive(Debug, Clone, Default)]
pub struct SceneChange {
    pub added: Vec<Item>,
    pub updated: Vec<Item>,
    pub removed: Vec<ItemId>,
}

impl SceneChange {
    pub fn added(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            added: items.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn updated(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            updated: items.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn removed(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            removed: ids.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Async facade over the host's item store.
///
/// The crate runs on one logical thread of control, so returned futures are
/// not required to be `Send`; implementations may suspend on real transport
/// or resolve immediately.
#[allow(async_fn_in_trait)]
pub trait ItemStore {
    /// Fetches persisted items by id. Ids that no longer exist are simply
    /// absent from the result.
    async fn get_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, StoreError>;

    /// World-space bounding box covering the given persisted items.
    async fn get_item_bounds(&self, ids: &[ItemId]) -> Result<BoundingBox, StoreError>;

    /// Applies `apply` to each matching persisted item, as one batched,
    /// shared write (other observers see the result).
    async fn update_items<F>(&self, ids: &[ItemId], apply: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut Item);

    /// Local-only items matching `filter`.
    async fn local_items<F>(&self, filter: F) -> Result<Vec<Item>, StoreError>
    where
        F: Fn(&Item) -> bool;

    /// Adds local-only items.
    async fn add_local_items(&self, items: Vec<Item>) -> Result<(), StoreError>;

    /// Applies `apply` to each matching local-only item.
    async fn update_local_items<F>(&self, ids: &[ItemId], apply: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut Item);

    /// Deletes local-only items. Unknown ids are ignored.
    async fn delete_local_items(&self, ids: &[ItemId]) -> Result<(), StoreError>;

    /// The last-used tool configuration, if one was ever persisted.
    async fn tool_config(&self) -> Result<Option<ToolConfig>, StoreError>;

    /// Persists the tool configuration. (The settings panel debounces its
    /// writes; by the time they reach the store they are plain sets.)
    async fn set_tool_config(&self, config: ToolConfig) -> Result<(), StoreError>;
}

// ── In-process reference store ───────────────────────────────────────────────

/// In-process [`ItemStore`] with single-threaded interior mutability.
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// use tinta::{Item, ItemKind, ItemStore, MemoryStore, Style};
///
/// let store = MemoryStore::new();
/// let id = store.insert(Item::builder(ItemKind::Shape(Style::default())).build());
/// let fetched = block_on(store.get_items(&[id])).unwrap();
/// assert_eq!(fetched.len(), 1);
/// ```
#[derive(Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<ItemId, Item>>,
    local: RefCell<HashMap<ItemId, Item>>,
    /// Extension-scoped blobs keyed by their fixed metadata keys, the way
    /// the host's tool-metadata store addresses them.
    tool_metadata: RefCell<Metadata>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(HashMap::new()),
            local: RefCell::new(HashMap::new()),
            tool_metadata: RefCell::new(Metadata::default()),
        }
    }

    /// Seeds a persisted item, returning its id.
    pub fn insert(&self, item: Item) -> ItemId {
        let id = item.id;
        self.items.borrow_mut().insert(id, item);
        id
    }

    /// Deletes persisted items, cascading to local items attached to them —
    /// the attachment-lifecycle cleanup the watcher's delete handler counts
    /// on.
    pub fn delete_items(&self, ids: &[ItemId]) {
        let mut items = self.items.borrow_mut();
        for id in ids {
            items.remove(id);
        }
        self.local
            .borrow_mut()
            .retain(|_, item| match item.attached_to {
                Some(parent) => !ids.contains(&parent),
                None => true,
            });
    }

    /// Snapshot of one persisted item, for test inspection.
    pub fn item(&self, id: ItemId) -> Option<Item> {
        self.items.borrow().get(&id).cloned()
    }

    /// Snapshot of one local item, for test inspection.
    pub fn local_item(&self, id: ItemId) -> Option<Item> {
        self.local.borrow().get(&id).cloned()
    }

    /// Number of live local items.
    pub fn local_len(&self) -> usize {
        self.local.borrow().len()
    }

    fn item_world_bounds(item: &Item) -> BoundingBox {
        let transform = item.transform();
        let half = Vec2::new(item.size.x / 2.0, item.size.y / 2.0);
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ];
        BoundingBox::from_points(corners.into_iter().map(|c| transform.apply(c)))
            .unwrap_or(BoundingBox::new(item.position, item.position))
    }
}

impl ItemStore for MemoryStore {
    async fn get_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, StoreError> {
        let items = self.items.borrow();
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    async fn get_item_bounds(&self, ids: &[ItemId]) -> Result<BoundingBox, StoreError> {
        let items = self.items.borrow();
        let mut bounds: Option<BoundingBox> = None;
        for id in ids {
            let item = items
                .get(id)
                .ok_or(StoreError::ItemNotFound(*id))?;
            let item_bounds = Self::item_world_bounds(item);
            bounds = Some(match bounds {
                Some(b) => b.union(&item_bounds),
                None => item_bounds,
            });
        }
        bounds.ok_or_else(|| StoreError::Backend("empty bounds query".to_owned()))
    }

    async fn update_items<F>(&self, ids: &[ItemId], mut apply: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut Item),
    {
        let mut items = self.items.borrow_mut();
        for id in ids {
            if let Some(item) = items.get_mut(id) {
                apply(item);
            }
        }
        Ok(())
    }

    async fn local_items<F>(&self, filter: F) -> Result<Vec<Item>, StoreError>
    where
        F: Fn(&Item) -> bool,
    {
        let mut matching: Vec<Item> = self
            .local
            .borrow()
            .values()
            .filter(|item| filter(item))
            .cloned()
            .collect();
        // Deterministic order for callers that take the first match.
        matching.sort_by_key(|item| item.id);
        Ok(matching)
    }

    async fn add_local_items(&self, items: Vec<Item>) -> Result<(), StoreError> {
        let mut local = self.local.borrow_mut();
        for item in items {
            debug!(id = %item.id, name = %item.name, "adding local item");
            local.insert(item.id, item);
        }
        Ok(())
    }

    async fn update_local_items<F>(&self, ids: &[ItemId], mut apply: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut Item),
    {
        let mut local = self.local.borrow_mut();
        for id in ids {
            if let Some(item) = local.get_mut(id) {
                apply(item);
            }
        }
        Ok(())
    }

    async fn delete_local_items(&self, ids: &[ItemId]) -> Result<(), StoreError> {
        let mut local = self.local.borrow_mut();
        for id in ids {
            if local.remove(id).is_some() {
                debug!(id = %id, "deleting local item");
            }
        }
        Ok(())
    }

    async fn tool_config(&self) -> Result<Option<ToolConfig>, StoreError> {
        match self.tool_metadata.borrow().get(METADATA_KEY_TOOL) {
            Some(MetadataValue::Tool(config)) => Ok(Some(config.clone())),
            _ => Ok(None),
        }
    }

    async fn set_tool_config(&self, config: ToolConfig) -> Result<(), StoreError> {
        self.tool_metadata
            .borrow_mut()
            .insert(METADATA_KEY_TOOL.to_owned(), MetadataValue::Tool(config));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemKind, MarkerData, Style};
    use futures::executor::block_on;

    #[test]
    fn missing_ids_are_skipped_not_errors() {
        let store = MemoryStore::new();
        let id = store.insert(Item::builder(ItemKind::Shape(Style::default())).build());
        let items = block_on(store.get_items(&[id, ItemId(9999)])).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn bounds_cover_scaled_and_rotated_items() {
        let store = MemoryStore::new();
        let id = store.insert(
            Item::builder(ItemKind::Shape(Style::default()))
                .position(Vec2::new(10.0, 10.0))
                .size(Vec2::new(4.0, 2.0))
                .scale(Vec2::new(2.0, 2.0))
                .rotation(90.0)
                .build(),
        );
        let bounds = block_on(store.get_item_bounds(&[id])).unwrap();
        // 4x2 local extent, doubled, quarter-turned: 4 wide, 8 tall.
        assert!((bounds.width() - 4.0).abs() < 1e-3);
        assert!((bounds.height() - 8.0).abs() < 1e-3);
        assert_eq!(bounds.center(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn deleting_a_parent_cascades_to_attachments() {
        let store = MemoryStore::new();
        let parent = store.insert(Item::builder(ItemKind::Shape(Style::default())).build());
        let attached = Item::builder(ItemKind::Marker(MarkerData { max_view_scale: 1.0 }))
            .attached_to(parent)
            .build();
        let loose = Item::builder(ItemKind::Marker(MarkerData { max_view_scale: 1.0 })).build();
        let loose_id = loose.id;
        block_on(store.add_local_items(vec![attached, loose])).unwrap();
        assert_eq!(store.local_len(), 2);

        store.delete_items(&[parent]);
        assert_eq!(store.local_len(), 1);
        assert!(store.local_item(loose_id).is_some());
    }
}
