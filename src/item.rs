//! The scene item model shared with the host store.
//!
//! Items are one flat record type distinguished by [`ItemKind`] plus
//! capability predicates over their metadata, rather than a type hierarchy:
//! anything drawable can become a gradient target, an effect is a gradient
//! effect if it carries the flag, and a marker is a control point if it
//! carries an index. Predicates are how the watcher and tool decide what an
//! item *is*, so they stay total over arbitrary items.

use crate::color::Color;
use crate::compiler::Uniform;
use crate::gradient::{BlendMode, GradientMetadata, ToolConfig};
use crate::id::ItemId;
use crate::math::Vec2;
use crate::transform::Transform;
use ahash::HashMap;
use smallvec::SmallVec;

// ── Metadata keys ────────────────────────────────────────────────────────────

/// Gradient configuration blob on a painted target.
pub const METADATA_KEY_GRADIENT: &str = "com.tinta.gradient/style";
/// Marks an effect item as one of ours.
pub const METADATA_KEY_IS_GRADIENT: &str = "com.tinta.gradient/isEffect";
/// Which axis endpoint a control-point marker represents (0 or 1).
pub const METADATA_KEY_CONTROL_POINT_INDEX: &str = "com.tinta.gradient/controlPointIndex";
/// Last-used tool configuration blob.
pub const METADATA_KEY_TOOL: &str = "com.tinta.gradient/tool";

/// String-keyed metadata attached to an item.
pub type Metadata = HashMap<String, MetadataValue>;

/// A value stored under a metadata key.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Index(u32),
    Gradient(GradientMetadata),
    Tool(ToolConfig),
}

// ── Item record ──────────────────────────────────────────────────────────────

/// The scene layer an item renders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    Map,
    #[default]
    Drawing,
    Prop,
    Character,
    Attachment,
    Note,
    Control,
    Pointer,
}

/// A behavior an attachment normally inherits from its parent, which an
/// attached item can opt out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentBehavior {
    Visible,
    Copy,
    Scale,
    Rotation,
    Locked,
    Delete,
}

/// Fill styling of a drawable item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill_color: Color,
    pub fill_opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: Color::WHITE,
            fill_opacity: 1.0,
        }
    }
}

/// Payload of a shader-bearing effect item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectData {
    /// Generated fragment program source.
    pub source: String,
    /// Ordered uniform table matching the program's declarations.
    pub uniforms: SmallVec<[Uniform; 8]>,
    /// Compositing mode. The host cannot change this on a live effect, which
    /// is why a blend change recreates the effect (see the watcher).
    pub blend_mode: Option<BlendMode>,
}

/// Payload of a billboard marker item (used for drag handles).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerData {
    /// The marker never grows past this factor when the view zooms in.
    pub max_view_scale: f32,
}

/// What an item is, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Shape(Style),
    Curve(Style),
    Path(Style),
    Effect(EffectData),
    Marker(MarkerData),
}

/// One item in the shared scene, persisted or local-only.
///
/// # Examples
///
/// ```
/// use tinta::{Item, ItemKind, Layer, Style, Vec2};
///
/// let shape = Item::builder(ItemKind::Shape(Style::default()))
///     .name("Pond")
///     .position(Vec2::new(100.0, 40.0))
///     .size(Vec2::new(60.0, 30.0))
///     .z_index(3)
///     .build();
/// assert_eq!(shape.layer, Layer::Drawing);
/// assert!(tinta::is_gradient_target(&shape));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    pub scale: Vec2,
    /// Untransformed extent (width, height) of the item's own geometry.
    pub size: Vec2,
    pub layer: Layer,
    pub z_index: i32,
    pub attached_to: Option<ItemId>,
    pub disabled_attachment_behaviors: SmallVec<[AttachmentBehavior; 3]>,
    pub locked: bool,
    pub disable_hit: bool,
    pub metadata: Metadata,
}

impl Item {
    /// Creates a new [`ItemBuilder`] for the given kind.
    pub fn builder(kind: ItemKind) -> ItemBuilder {
        ItemBuilder::new(kind)
    }

    /// The item's local→world transform.
    pub fn transform(&self) -> Transform {
        Transform::from_parts(self.position, self.rotation, self.scale)
    }

    pub fn style(&self) -> Option<&Style> {
        match &self.kind {
            ItemKind::Shape(style) | ItemKind::Curve(style) | ItemKind::Path(style) => Some(style),
            _ => None,
        }
    }

    pub fn style_mut(&mut self) -> Option<&mut Style> {
        match &mut self.kind {
            ItemKind::Shape(style) | ItemKind::Curve(style) | ItemKind::Path(style) => Some(style),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&EffectData> {
        match &self.kind {
            ItemKind::Effect(data) => Some(data),
            _ => None,
        }
    }

    pub fn effect_mut(&mut self) -> Option<&mut EffectData> {
        match &mut self.kind {
            ItemKind::Effect(data) => Some(data),
            _ => None,
        }
    }

    /// The gradient configuration blob, when present.
    pub fn gradient_metadata(&self) -> Option<&GradientMetadata> {
        match self.metadata.get(METADATA_KEY_GRADIENT) {
            Some(MetadataValue::Gradient(metadata)) => Some(metadata),
            _ => None,
        }
    }

    pub fn gradient_metadata_mut(&mut self) -> Option<&mut GradientMetadata> {
        match self.metadata.get_mut(METADATA_KEY_GRADIENT) {
            Some(MetadataValue::Gradient(metadata)) => Some(metadata),
            _ => None,
        }
    }

    pub fn set_gradient_metadata(&mut self, metadata: GradientMetadata) {
        self.metadata
            .insert(METADATA_KEY_GRADIENT.to_owned(), MetadataValue::Gradient(metadata));
    }

    pub fn clear_gradient_metadata(&mut self) {
        self.metadata.remove(METADATA_KEY_GRADIENT);
    }

    /// Which axis endpoint this item represents, when it is a control point.
    pub fn control_point_index(&self) -> Option<usize> {
        match self.metadata.get(METADATA_KEY_CONTROL_POINT_INDEX) {
            Some(MetadataValue::Index(index)) => Some(*index as usize),
            _ => None,
        }
    }
}

// ── Capability predicates ────────────────────────────────────────────────────

/// Whether the item is a drawable vector shape (shape, curve or path).
pub fn is_drawable(item: &Item) -> bool {
    matches!(
        item.kind,
        ItemKind::Shape(_) | ItemKind::Curve(_) | ItemKind::Path(_)
    )
}

/// Whether the item can carry a gradient: any drawable qualifies, painted or
/// not.
pub fn is_gradient_target(item: &Item) -> bool {
    is_drawable(item)
}

/// Whether the item is one of our derived gradient effects.
pub fn is_gradient_effect(item: &Item) -> bool {
    matches!(item.kind, ItemKind::Effect(_))
        && matches!(
            item.metadata.get(METADATA_KEY_IS_GRADIENT),
            Some(MetadataValue::Bool(true))
        )
}

/// Whether the item is a gradient control-point handle.
pub fn is_control_point(item: &Item) -> bool {
    item.control_point_index().is_some()
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Fluent builder for [`Item`]. Ids are minted at [`ItemBuilder::build`].
///
/// # Examples
///
/// ```
/// use tinta::{Item, ItemKind, MarkerData, Layer, Vec2};
///
/// let marker = Item::builder(ItemKind::Marker(MarkerData { max_view_scale: 1.0 }))
///     .name("Handle")
///     .layer(Layer::Control)
///     .scale(Vec2::new(0.3, 0.3))
///     .locked(true)
///     .build();
/// assert!(marker.locked);
/// ```
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    fn new(kind: ItemKind) -> Self {
        Self {
            item: Item {
                id: ItemId(0),
                name: String::new(),
                kind,
                position: Vec2::ZERO,
                rotation: 0.0,
                scale: Vec2::new(1.0, 1.0),
                size: Vec2::ZERO,
                layer: Layer::default(),
                z_index: 0,
                attached_to: None,
                disabled_attachment_behaviors: SmallVec::new(),
                locked: false,
                disable_hit: false,
                metadata: Metadata::default(),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.item.name = name.into();
        self
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.item.position = position;
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.item.rotation = degrees;
        self
    }

    pub fn scale(mut self, scale: Vec2) -> Self {
        self.item.scale = scale;
        self
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.item.size = size;
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.item.layer = layer;
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.item.z_index = z_index;
        self
    }

    pub fn attached_to(mut self, id: ItemId) -> Self {
        self.item.attached_to = Some(id);
        self
    }

    pub fn disable_attachment_behaviors(mut self, behaviors: &[AttachmentBehavior]) -> Self {
        self.item
            .disabled_attachment_behaviors
            .extend_from_slice(behaviors);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.item.locked = locked;
        self
    }

    pub fn disable_hit(mut self, disable_hit: bool) -> Self {
        self.item.disable_hit = disable_hit;
        self
    }

    pub fn metadata(mut self, key: &str, value: MetadataValue) -> Self {
        self.item.metadata.insert(key.to_owned(), value);
        self
    }

    pub fn build(mut self) -> Item {
        self.item.id = ItemId::next();
        self.item
    }
}
