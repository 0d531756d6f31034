//! The interactive paint-bucket tool.
//!
//! Click a shape to paint it with the last-used gradient, modifier-click or
//! double-click to strip the gradient off, and drag a control point to aim
//! the gradient axis. Dragging previews through local-only writes — the
//! handle position and one shader uniform — so other observers never see
//! intermediate state; only drag-end persists the moved offset.

use crate::color::Color;
use crate::dispatcher::WatcherDispatcher;
use crate::effect;
use crate::gradient::{GradientMetadata, GradientShape, GradientStop, ToolConfig};
use crate::id::ItemId;
use crate::item::{is_control_point, is_gradient_effect, is_gradient_target, Item};
use crate::math::{rotate, BoundingBox, Vec2};
use crate::store::{ItemStore, StoreError};
use crate::transform::Transform;
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.alt || self.ctrl || self.shift || self.meta
    }
}

/// A pointer event delivered to the tool, with the item under the pointer
/// already resolved by the host.
#[derive(Debug, Clone, Default)]
pub struct ToolEvent {
    pub target: Option<Item>,
    pub pointer_position: Vec2,
    pub modifiers: Modifiers,
}

/// State captured at drag start, alive until drag end/cancel.
struct DragSession {
    start_position: Vec2,
    target_id: ItemId,
    target_inverse_transform: Transform,
    control_point_id: ItemId,
    control_point_index: usize,
    effect_id: ItemId,
}

/// The paint-bucket tool's state machine: idle, or dragging one control
/// point.
///
/// # Examples
///
/// ```
/// use tinta::BucketTool;
///
/// let tool = BucketTool::new();
/// assert!(!tool.is_dragging());
/// ```
#[derive(Default)]
pub struct BucketTool {
    drag: Option<DragSession>,
    config: Option<ToolConfig>,
}

impl BucketTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The configuration loaded on activation, when one was stored.
    pub fn config(&self) -> Option<&ToolConfig> {
        self.config.as_ref()
    }

    /// Activates the tool: loads the last-used configuration and shows
    /// control points on every watched target.
    pub async fn on_activate<S: ItemStore>(
        &mut self,
        store: &S,
        dispatcher: &mut WatcherDispatcher,
    ) -> Result<(), StoreError> {
        self.config = store.tool_config().await?;
        dispatcher.broadcast(store, true).await
    }

    /// Deactivates the tool: hides control points and drops any in-flight
    /// drag without persisting it.
    pub async fn on_deactivate<S: ItemStore>(
        &mut self,
        store: &S,
        dispatcher: &mut WatcherDispatcher,
    ) -> Result<(), StoreError> {
        self.drag = None;
        dispatcher.broadcast(store, false).await
    }

    /// Handles a click. With a modifier held, strips the gradient from the
    /// clicked shape; otherwise paints the shape with the active (or
    /// default) configuration. Clicks on control points and non-drawables do
    /// nothing.
    pub async fn on_click<S: ItemStore>(
        &mut self,
        store: &S,
        event: &ToolEvent,
    ) -> Result<(), StoreError> {
        if event.modifiers.any() {
            return self.remove_gradient(store, event.target.as_ref()).await;
        }
        let Some(target) = &event.target else {
            return Ok(());
        };
        if !is_gradient_target(target) || is_control_point(target) {
            return Ok(());
        }
        let Some(inverse_transform) = target.transform().inverse() else {
            return Ok(());
        };

        let bounds = store.get_item_bounds(&[target.id]).await?;
        debug!(shape = %target.id, "painting gradient");

        let config = self.config.clone();
        store
            .update_items(&[target.id], move |target| {
                // Dim the native fill so the effect reads as the shape's
                // fill, while hit testing still sees a filled shape.
                let fill_color = target
                    .style()
                    .map(|style| style.fill_color)
                    .unwrap_or(Color::WHITE);
                if let Some(style) = target.style_mut() {
                    style.fill_color = Color::BLACK;
                    style.fill_opacity = 0.01;
                }

                // Re-painting keeps the aim the user already set up.
                let control_point_offsets = target
                    .gradient_metadata()
                    .map(|m| m.control_point_offsets.clone())
                    .filter(|offsets| offsets.len() >= 2)
                    .unwrap_or_else(|| {
                        default_control_points(config.as_ref(), &inverse_transform, &bounds)
                    });

                target.set_gradient_metadata(GradientMetadata {
                    shape: config.as_ref().map(|c| c.shape).unwrap_or_default(),
                    pattern: config.as_ref().and_then(|c| c.pattern),
                    blend_mode: config.as_ref().and_then(|c| c.blend_mode),
                    control_point_offsets,
                    stops: config
                        .as_ref()
                        .map(|c| c.stops.clone())
                        .unwrap_or_else(|| default_stops(fill_color)),
                });
            })
            .await
    }

    /// Double-click strips the gradient, like modifier-click.
    pub async fn on_double_click<S: ItemStore>(
        &mut self,
        store: &S,
        event: &ToolEvent,
    ) -> Result<(), StoreError> {
        self.remove_gradient(store, event.target.as_ref()).await
    }

    async fn remove_gradient<S: ItemStore>(
        &self,
        store: &S,
        target: Option<&Item>,
    ) -> Result<(), StoreError> {
        let Some(target) = target else {
            return Ok(());
        };
        if !is_gradient_target(target) {
            return Ok(());
        }
        debug!(shape = %target.id, "removing gradient");
        store
            .update_items(&[target.id], |target| target.clear_gradient_metadata())
            .await
    }

    /// Begins a drag when the pointer is on a control point whose target and
    /// effect still resolve; otherwise stays idle. Every link in the chain
    /// (attachment, target, effect) is re-fetched, since the handle under
    /// the pointer can outlive any of them.
    pub async fn on_drag_start<S: ItemStore>(
        &mut self,
        store: &S,
        event: &ToolEvent,
    ) -> Result<(), StoreError> {
        let Some(handle) = event.target.as_ref().filter(|t| is_control_point(t)) else {
            return Ok(());
        };
        let Some(index) = handle.control_point_index() else {
            return Ok(());
        };
        let Some(target_id) = handle.attached_to else {
            return Ok(());
        };
        let Some(target) = store.get_items(&[target_id]).await?.into_iter().next() else {
            trace!(shape = %target_id, "drag target vanished, staying idle");
            return Ok(());
        };
        let effects = store
            .local_items(|item| is_gradient_effect(item) && item.attached_to == Some(target_id))
            .await?;
        let Some(effect) = effects.into_iter().next() else {
            trace!(shape = %target_id, "no live effect, staying idle");
            return Ok(());
        };
        let Some(target_inverse_transform) = target.transform().inverse() else {
            return Ok(());
        };

        trace!(shape = %target_id, index, "drag start");
        self.drag = Some(DragSession {
            start_position: handle.position,
            target_id,
            target_inverse_transform,
            control_point_id: handle.id,
            control_point_index: index,
            effect_id: effect.id,
        });
        Ok(())
    }

    /// Live preview: moves the handle and the effect uniform, local-only.
    pub async fn on_drag_move<S: ItemStore>(
        &mut self,
        store: &S,
        pointer_position: Vec2,
    ) -> Result<(), StoreError> {
        self.apply_drag(store, pointer_position).await?;
        Ok(())
    }

    /// Commits the drag: applies the final preview position, then persists
    /// the moved offset into the target's metadata. The target is mutated
    /// through a fresh fetch (last write wins on shared state).
    pub async fn on_drag_end<S: ItemStore>(
        &mut self,
        store: &S,
        pointer_position: Vec2,
    ) -> Result<(), StoreError> {
        let local_offset = self.apply_drag(store, pointer_position).await?;
        let session = self.drag.take();
        if let (Some(session), Some(local_offset)) = (session, local_offset) {
            let index = session.control_point_index;
            trace!(shape = %session.target_id, index, "drag end");
            store
                .update_items(&[session.target_id], move |target| {
                    if !is_gradient_target(target) {
                        return;
                    }
                    if let Some(metadata) = target.gradient_metadata_mut() {
                        if let Some(offset) = metadata.control_point_offsets.get_mut(index) {
                            *offset = local_offset;
                        }
                    }
                })
                .await?;
        }
        Ok(())
    }

    /// Abandons the drag: replays the start position into the preview and
    /// persists nothing.
    pub async fn on_drag_cancel<S: ItemStore>(&mut self, store: &S) -> Result<(), StoreError> {
        if let Some(start_position) = self.drag.as_ref().map(|s| s.start_position) {
            trace!("drag cancel");
            self.apply_drag(store, start_position).await?;
            self.drag = None;
        }
        Ok(())
    }

    /// Writes `pointer_position` into the dragged handle (world space) and
    /// the effect's axis uniform (local space), in one local batch. Returns
    /// the local-space offset, or `None` when no drag is active.
    async fn apply_drag<S: ItemStore>(
        &mut self,
        store: &S,
        pointer_position: Vec2,
    ) -> Result<Option<Vec2>, StoreError> {
        let Some(session) = &self.drag else {
            return Ok(None);
        };
        let local_offset = session.target_inverse_transform.apply(pointer_position);
        let control_point_id = session.control_point_id;
        let effect_id = session.effect_id;
        let index = session.control_point_index;
        store
            .update_local_items(&[control_point_id, effect_id], move |item| {
                if item.id == control_point_id && is_control_point(item) {
                    item.position = pointer_position;
                } else if item.id == effect_id && is_gradient_effect(item) {
                    effect::move_control_point(item, index, local_offset);
                }
            })
            .await?;
        Ok(Some(local_offset))
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

/// White fading into the shape's own fill color.
fn default_stops(fill_color: Color) -> Vec<GradientStop> {
    vec![
        GradientStop {
            color: Color::WHITE,
            alpha: 0.0,
            left: 0.0,
        },
        GradientStop {
            color: fill_color,
            alpha: 1.0,
            left: 1.0,
        },
    ]
}

/// Axis endpoints derived from the target's bounds: half the smaller extent,
/// rotated to the configured angle. Radial runs center→ring; linear runs
/// symmetrically through the center. Both are mapped into the target's
/// local space.
fn default_control_points(
    config: Option<&ToolConfig>,
    inverse_transform: &Transform,
    bounds: &BoundingBox,
) -> SmallVec<[Vec2; 2]> {
    let shape = config.map(|c| c.shape).unwrap_or_default();
    let angle = config.map(|c| c.angle).unwrap_or(0.0);
    let center = bounds.center();
    let center_offset = rotate(
        Vec2::new(0.0, bounds.width().min(bounds.height()) / 2.0),
        Vec2::ZERO,
        angle,
    );
    let world_points = match shape {
        GradientShape::Radial => [center, center + center_offset],
        GradientShape::Linear => [center + center_offset, center - center_offset],
    };
    world_points
        .into_iter()
        .map(|p| inverse_transform.apply(p))
        .collect()
}
