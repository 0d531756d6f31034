//! Per-target gradient watcher.
//!
//! One watcher instance tracks one persisted shape and owns its derived
//! state: at most one gradient effect, and zero or two control-point
//! handles. It reacts to item updates by creating, refreshing or destroying
//! the effect, and to the handle-visibility broadcast by building or tearing
//! down the handles. All mutations are queued on the [`Patcher`]; the only
//! store access the watcher performs itself is the deferred control-point
//! build, which re-fetches the target after the batch flush.

use crate::control_point::build_control_point;
use crate::effect::{fix_effect, synthesize_effect};
use crate::gradient::BlendMode;
use crate::id::ItemId;
use crate::item::{is_gradient_target, Item, ItemKind};
use crate::patcher::Patcher;
use crate::store::{ItemStore, StoreError};
use tracing::debug;

/// Watches one gradient target and maintains its derived artifacts.
pub struct GradientWatcher {
    target_id: ItemId,
    effect_id: Option<ItemId>,
    previous_blend_mode: Option<BlendMode>,
    show_control_points: bool,
    control_points: Option<[ItemId; 2]>,
    /// Handles were requested but not built yet; resolved by
    /// [`GradientWatcher::finish_pending`] after the batch flush.
    pending_control_points: bool,
}

impl GradientWatcher {
    /// The qualifying predicate the dispatcher routes by.
    pub fn is_target(item: &Item) -> bool {
        is_gradient_target(item)
    }

    /// Constructs the watcher for `target`, deriving an effect immediately
    /// when the target already carries gradient metadata.
    pub fn new(target: &Item, patcher: &mut Patcher) -> Self {
        let mut watcher = Self {
            target_id: target.id,
            effect_id: None,
            previous_blend_mode: None,
            show_control_points: false,
            control_points: None,
            pending_control_points: false,
        };
        if target.gradient_metadata().is_some() {
            watcher.create_effect(target, patcher);
        }
        watcher
    }

    pub fn target_id(&self) -> ItemId {
        self.target_id
    }

    /// Id of the live effect, when one exists.
    pub fn effect_id(&self) -> Option<ItemId> {
        self.effect_id
    }

    /// Ids of the live control-point handles, when shown.
    pub fn control_point_ids(&self) -> Option<[ItemId; 2]> {
        self.control_points
    }

    fn create_effect(&mut self, target: &Item, patcher: &mut Patcher) {
        // Structurally incomplete metadata synthesizes nothing; the watcher
        // stays effect-less until a later update completes it.
        let Some(effect) = synthesize_effect(target) else {
            return;
        };
        debug!(shape = %self.target_id, effect = %effect.id, "creating gradient effect");
        self.effect_id = Some(effect.id);
        self.previous_blend_mode = target.gradient_metadata().and_then(|m| m.blend_mode);
        patcher.add_local(effect);
    }

    /// Reacts to an update of the watched target.
    pub fn handle_update(&mut self, target: &Item, patcher: &mut Patcher) {
        let metadata = target.gradient_metadata();
        let effect_should_exist = metadata.is_some();

        // The host cannot change the blend mode of a live effect, so a blend
        // change tears the effect down here and rebuilds it below under a
        // fresh id.
        let blend_mode = metadata.and_then(|m| m.blend_mode);
        if let Some(effect_id) = self.effect_id {
            if blend_mode != self.previous_blend_mode {
                debug!(shape = %self.target_id, effect = %effect_id, "blend mode changed, recreating effect");
                patcher.delete_local([effect_id]);
                self.effect_id = None;
                self.previous_blend_mode = None;
            }
        }

        match (self.effect_id, effect_should_exist) {
            (None, true) => self.create_effect(target, patcher),
            (Some(effect_id), false) => {
                debug!(shape = %self.target_id, effect = %effect_id, "destroying gradient effect");
                patcher.delete_local([effect_id]);
                self.effect_id = None;
                if let Some(points) = self.control_points.take() {
                    patcher.delete_local(points);
                }
            }
            (Some(effect_id), true) => {
                let target = target.clone();
                patcher.update_local(effect_id, move |effect| {
                    if matches!(effect.kind, ItemKind::Effect(_)) {
                        fix_effect(&target, effect);
                    }
                });
            }
            (None, false) => {}
        }

        self.fix_control_points(patcher);
    }

    /// Reacts to the watched target being deleted. Intentionally a no-op:
    /// the store's attachment-lifecycle cleanup removes the effect and
    /// handles along with their parent.
    pub fn handle_delete(&mut self, _patcher: &mut Patcher) {}

    /// Reacts to the handle-visibility broadcast.
    pub fn handle_message(&mut self, show_control_points: bool, patcher: &mut Patcher) {
        self.show_control_points = show_control_points;
        self.fix_control_points(patcher);
    }

    fn fix_control_points(&mut self, patcher: &mut Patcher) {
        if self.show_control_points && self.control_points.is_none() {
            self.pending_control_points = true;
        } else if !self.show_control_points {
            self.pending_control_points = false;
            if let Some(points) = self.control_points.take() {
                patcher.delete_local(points);
            }
        }
    }

    /// Builds requested control points after the batch flush.
    ///
    /// The target is re-fetched rather than trusted from the triggering
    /// update: by the time the flush has run, the shape may have moved,
    /// lost its metadata, or been deleted — each of which silently skips
    /// the build.
    pub(crate) async fn finish_pending<S: ItemStore>(&mut self, store: &S) -> Result<(), StoreError> {
        if !self.pending_control_points {
            return Ok(());
        }
        self.pending_control_points = false;

        let Some(target) = store.get_items(&[self.target_id]).await?.into_iter().next() else {
            return Ok(());
        };
        if !is_gradient_target(&target) {
            return Ok(());
        }
        let Some(metadata) = target.gradient_metadata() else {
            return Ok(());
        };
        if metadata.control_point_offsets.len() < 2 {
            return Ok(());
        }
        let offsets = [
            metadata.control_point_offsets[0],
            metadata.control_point_offsets[1],
        ];

        let a = build_control_point(&target, offsets[0], 0);
        let b = build_control_point(&target, offsets[1], 1);
        let ids = [a.id, b.id];
        debug!(shape = %self.target_id, "showing control points");
        store.add_local_items(vec![a, b]).await?;
        self.control_points = Some(ids);
        Ok(())
    }
}
