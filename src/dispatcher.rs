//! Scene-batch routing to per-target watchers.
//!
//! The dispatcher owns the table of live [`GradientWatcher`] instances and
//! keeps it aligned with the scene: exactly one watcher per qualifying
//! persisted shape. Each incoming batch is processed synchronously against
//! one [`Patcher`], which is then flushed as a single combined write, so
//! changes to many targets commit in one round-trip; deferred control-point
//! builds run after the flush.

use crate::id::ItemId;
use crate::item::Item;
use crate::patcher::Patcher;
use crate::store::{ItemStore, SceneChange, StoreError};
use crate::watcher::GradientWatcher;
use ahash::{HashMap, HashMapExt};
use tracing::debug;

/// Routes scene-change batches and broadcasts to per-target watchers.
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// use tinta::{
///     Item, ItemKind, MemoryStore, SceneChange, Style, WatcherDispatcher,
/// };
///
/// let store = MemoryStore::new();
/// let shape = Item::builder(ItemKind::Shape(Style::default())).build();
/// store.insert(shape.clone());
///
/// let mut dispatcher = WatcherDispatcher::new();
/// block_on(dispatcher.handle_change(&store, &SceneChange::added([shape]))).unwrap();
/// assert_eq!(dispatcher.len(), 1);
/// ```
#[derive(Default)]
pub struct WatcherDispatcher {
    watchers: HashMap<ItemId, GradientWatcher>,
}

impl WatcherDispatcher {
    pub fn new() -> Self {
        Self {
            watchers: HashMap::new(),
        }
    }

    /// Number of live watcher instances.
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// The watcher tracking `id`, when one exists.
    pub fn watcher(&self, id: ItemId) -> Option<&GradientWatcher> {
        self.watchers.get(&id)
    }

    /// Processes one scene-change batch. Must be called with batches in
    /// arrival order; `&mut self` keeps batches from interleaving.
    pub async fn handle_change<S: ItemStore>(
        &mut self,
        store: &S,
        change: &SceneChange,
    ) -> Result<(), StoreError> {
        let mut patcher = Patcher::new();

        for item in &change.added {
            if GradientWatcher::is_target(item) {
                self.insert_watcher(item, &mut patcher);
            }
        }

        for id in &change.removed {
            if let Some(mut watcher) = self.watchers.remove(id) {
                debug!(shape = %id, "discarding watcher");
                watcher.handle_delete(&mut patcher);
            }
        }

        for item in &change.updated {
            if let Some(watcher) = self.watchers.get_mut(&item.id) {
                watcher.handle_update(item, &mut patcher);
            } else if GradientWatcher::is_target(item) {
                // An update can be the first we hear of a qualifying item
                // (another editor reshaped it); treat it as an add.
                self.insert_watcher(item, &mut patcher);
            }
        }

        patcher.flush(store).await?;
        self.finish_pending(store).await
    }

    /// Fans the handle-visibility message out to every live watcher.
    pub async fn broadcast<S: ItemStore>(
        &mut self,
        store: &S,
        show_control_points: bool,
    ) -> Result<(), StoreError> {
        let mut patcher = Patcher::new();
        for watcher in self.watchers.values_mut() {
            watcher.handle_message(show_control_points, &mut patcher);
        }
        patcher.flush(store).await?;
        self.finish_pending(store).await
    }

    fn insert_watcher(&mut self, item: &Item, patcher: &mut Patcher) {
        debug!(shape = %item.id, "watching gradient target");
        let watcher = GradientWatcher::new(item, patcher);
        self.watchers.insert(item.id, watcher);
    }

    async fn finish_pending<S: ItemStore>(&mut self, store: &S) -> Result<(), StoreError> {
        for watcher in self.watchers.values_mut() {
            watcher.finish_pending(store).await?;
        }
        Ok(())
    }
}
