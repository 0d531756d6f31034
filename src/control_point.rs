//! Control-point handle construction.
//!
//! A control point is a small billboard marker the user drags to move one of
//! the two gradient axis endpoints. It lives on the control layer, pinned to
//! its target's world position for the offset it represents, and is locked
//! against general manipulation — only the drag state machine moves it.

use crate::item::{
    AttachmentBehavior, Item, ItemKind, MarkerData, Layer, MetadataValue,
    METADATA_KEY_CONTROL_POINT_INDEX,
};
use crate::math::Vec2;

/// Untransformed marker extent; the 0.3 build scale brings it down to a
/// handle-sized dot.
const MARKER_SIZE: f32 = 512.0;
const MARKER_SCALE: f32 = 0.3;

/// Builds the handle for axis endpoint `index` of `target`, where `offset`
/// is the endpoint in the target's local space.
///
/// Copy, scale and lock propagation from the target are disabled: a copied
/// target must not spawn orphan handles, a huge target must not produce a
/// huge handle, and locking the target must not freeze its handles.
pub fn build_control_point(target: &Item, offset: Vec2, index: usize) -> Item {
    let transform = target.transform();
    Item::builder(ItemKind::Marker(MarkerData { max_view_scale: 1.0 }))
        .name("Gradient Control Point")
        .metadata(
            METADATA_KEY_CONTROL_POINT_INDEX,
            MetadataValue::Index(index as u32),
        )
        .layer(Layer::Control)
        .attached_to(target.id)
        .position(transform.apply(offset))
        .size(Vec2::new(MARKER_SIZE, MARKER_SIZE))
        .scale(Vec2::new(MARKER_SCALE, MARKER_SCALE))
        .disable_attachment_behaviors(&[
            AttachmentBehavior::Copy,
            AttachmentBehavior::Scale,
            AttachmentBehavior::Locked,
        ])
        .locked(true)
        .build()
}
