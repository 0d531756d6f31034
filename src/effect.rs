//! Gradient effect synthesis.
//!
//! An effect is the ephemeral, local-only item that actually renders a
//! painted shape's gradient: a generated fragment program plus its uniform
//! table, attached to the target and stacked one z step above it. The
//! watcher owns the effect's lifecycle; this module only knows how to build
//! one and keep it in sync with its target.

use crate::cache::cached_compile;
use crate::compiler::{control_point_uniform, UniformValue};
use crate::item::{
    AttachmentBehavior, EffectData, Item, ItemKind, MetadataValue, METADATA_KEY_IS_GRADIENT,
};
use crate::math::Vec2;
use smallvec::SmallVec;
use tracing::trace;

/// Builds the effect artifact for `target` and syncs it from the target's
/// current gradient metadata. Returns `None` when the metadata is absent or
/// structurally incomplete — there is nothing to render, so no artifact is
/// created at all.
///
/// The effect rides the target: same layer, z-index one above, attached so
/// the host moves and deletes it with its parent — while opting out of copy
/// and lock propagation, since a copied or locked target must not drag an
/// unowned effect along.
pub fn synthesize_effect(target: &Item) -> Option<Item> {
    let metadata = target.gradient_metadata()?;
    if !metadata.is_complete() {
        return None;
    }
    let mut effect = Item::builder(ItemKind::Effect(EffectData {
        source: String::new(),
        uniforms: SmallVec::new(),
        blend_mode: metadata.blend_mode,
    }))
    .name("Gradient Fill")
    .metadata(METADATA_KEY_IS_GRADIENT, MetadataValue::Bool(true))
    .position(target.position)
    .attached_to(target.id)
    .disable_attachment_behaviors(&[AttachmentBehavior::Copy, AttachmentBehavior::Locked])
    .z_index(target.z_index + 1)
    .layer(target.layer)
    .locked(true)
    .disable_hit(true)
    .build();
    fix_effect(target, &mut effect);
    Some(effect)
}

/// Re-syncs `effect` from `target` in place, preserving its identity.
///
/// Layer and z-index are re-synced unconditionally — the target may have
/// moved layers since the last refresh. The program and uniforms are only
/// (re)installed when the target's metadata is structurally complete;
/// otherwise the effect keeps whatever it last had.
pub fn fix_effect(target: &Item, effect: &mut Item) {
    effect.layer = target.layer;
    effect.z_index = target.z_index + 1;

    let Some(metadata) = target.gradient_metadata() else {
        return;
    };
    let Some(program) = cached_compile(metadata) else {
        return;
    };
    trace!(shape = %target.id, effect = %effect.id, "refreshing gradient program");
    if let Some(data) = effect.effect_mut() {
        data.source = program.source;
        data.uniforms = program.uniforms;
    }
}

/// Rewrites the `cp{index}` uniform on `effect` to `offset` (target-local
/// space). A missing uniform is silently ignored — the effect may not have
/// been compiled yet.
pub fn move_control_point(effect: &mut Item, index: usize, offset: Vec2) {
    let name = control_point_uniform(index);
    if let Some(data) = effect.effect_mut() {
        if let Some(uniform) = data.uniforms.iter_mut().find(|u| u.name == name) {
            uniform.value = UniformValue::Vec2(offset);
        }
    }
}
