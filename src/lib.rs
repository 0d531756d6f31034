//! Incremental gradient-fill synchronization engine for shared vector
//! scenes.
//!
//! A user paints a multi-stop gradient onto a shape; this crate keeps the
//! derived pieces in sync with it for as long as the scene lives: a
//! generated shader effect ([`compile`], [`synthesize_effect`]), a pair
//! of draggable axis handles ([`build_control_point`]), a per-shape watcher
//! and batch dispatcher ([`GradientWatcher`], [`WatcherDispatcher`]), and
//! the interactive tool that paints, strips and re-aims gradients
//! ([`BucketTool`]). The scene itself lives behind the host's [`ItemStore`];
//! [`MemoryStore`] is the in-process implementation.

mod cache;
mod color;
mod compiler;
mod control_point;
mod dispatcher;
mod effect;
mod gradient;
mod id;
mod item;
mod math;
mod patcher;
mod store;
mod tool;
mod transform;
mod watcher;

pub use cache::{global_program_cache, ProgramCache};
pub use color::{Color, ColorError};
pub use compiler::{compile, CompiledProgram, Uniform, UniformValue};
pub use control_point::build_control_point;
pub use dispatcher::WatcherDispatcher;
pub use effect::{fix_effect, move_control_point, synthesize_effect};
pub use gradient::{
    BlendMode, GradientMetadata, GradientShape, GradientStop, Pattern, ToolConfig,
};
pub use id::ItemId;
pub use item::{
    is_control_point, is_drawable, is_gradient_effect, is_gradient_target, AttachmentBehavior,
    EffectData, Item, ItemBuilder, ItemKind, Layer, MarkerData, Metadata, MetadataValue, Style,
    METADATA_KEY_CONTROL_POINT_INDEX, METADATA_KEY_GRADIENT, METADATA_KEY_IS_GRADIENT,
    METADATA_KEY_TOOL,
};
pub use math::{rotate, BoundingBox, Vec2};
pub use patcher::Patcher;
pub use store::{ItemStore, MemoryStore, SceneChange, StoreError};
pub use tool::{BucketTool, Modifiers, ToolEvent};
pub use transform::Transform;
pub use watcher::GradientWatcher;
