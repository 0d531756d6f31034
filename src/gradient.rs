//! The gradient configuration model: what a painted shape remembers about
//! its fill, and the last-used tool configuration restored on activation.

use crate::color::Color;
use crate::math::Vec2;
use smallvec::SmallVec;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// How the two control points frame the gradient.
///
/// `Linear` reads them as the endpoints of the gradient axis; `Radial` reads
/// them as the center and a point on the outer ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradientShape {
    Linear,
    #[default]
    Radial,
}

/// Optional repeating pattern applied on top of the base gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Stripe,
    Sin,
    TriangleWave,
    Hatch,
    Checker,
}

/// Compositing mode for the derived effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

/// A color anchored at a normalized position along the gradient axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    /// Opacity in `[0, 1]`; stops are composited premultiplied.
    pub alpha: f32,
    /// Normalized position along the axis in `[0, 1]`. Callers conventionally
    /// keep stops non-decreasing by `left`; this is not validated, and
    /// unsorted stops sample by first matching bracket.
    pub left: f32,
}

/// The gradient configuration persisted on a painted shape.
///
/// Stored as a metadata blob on the target item; either entirely absent or,
/// for an effect to be derived, structurally complete (see
/// [`GradientMetadata::is_complete`]). An incomplete value — possible when
/// another editor writes a partial blob — silently derives nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradientMetadata {
    pub shape: GradientShape,
    pub pattern: Option<Pattern>,
    pub blend_mode: Option<BlendMode>,
    /// The two axis endpoints, in the target's own local space.
    pub control_point_offsets: SmallVec<[Vec2; 2]>,
    pub stops: Vec<GradientStop>,
}

impl GradientMetadata {
    /// Whether the configuration carries enough structure to render: at least
    /// two stops and both control points.
    pub fn is_complete(&self) -> bool {
        self.stops.len() >= 2 && self.control_point_offsets.len() >= 2
    }

    /// Stable content hash for program caching. Two metadata values with the
    /// same bits always compile to the same program.
    pub fn cache_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.shape.hash(&mut hasher);
        self.pattern.hash(&mut hasher);
        self.blend_mode.hash(&mut hasher);
        self.control_point_offsets.len().hash(&mut hasher);
        for offset in &self.control_point_offsets {
            offset.x.to_bits().hash(&mut hasher);
            offset.y.to_bits().hash(&mut hasher);
        }
        self.stops.len().hash(&mut hasher);
        for stop in &self.stops {
            stop.color.hash(&mut hasher);
            stop.alpha.to_bits().hash(&mut hasher);
            stop.left.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// The "last used" gradient configuration the settings panel persists and the
/// tool reads back on activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub shape: GradientShape,
    /// Axis angle in degrees, applied when deriving default control points.
    pub angle: f32,
    pub pattern: Option<Pattern>,
    pub blend_mode: Option<BlendMode>,
    pub stops: Vec<GradientStop>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            shape: GradientShape::default(),
            angle: 0.0,
            pattern: None,
            blend_mode: None,
            stops: vec![
                GradientStop {
                    color: Color::WHITE,
                    alpha: 0.0,
                    left: 0.0,
                },
                GradientStop {
                    color: Color::WHITE,
                    alpha: 1.0,
                    left: 1.0,
                },
            ],
        }
    }
}
