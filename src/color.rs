use regex::Regex;
use thiserror::Error;

/// Errors raised while parsing user-supplied color text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The string is not a recognizable `#rgb` / `#rrggbb` hex color.
    #[error("malformed hex color: {0:?}")]
    InvalidHex(String),
}

/// Represents a color in RGB format.
///
/// Gradient stops carry their alpha separately, so the color itself is three
/// 8-bit channels. Shader uniforms take the normalized `[0.0, 1.0]` form.
///
/// # Examples
///
/// Creating and manipulating colors:
///
/// ```
/// use tinta::Color;
///
/// // Create a red color
/// let red = Color::rgb(255, 0, 0);
///
/// // Normalize the color values to [0.0, 1.0]
/// let normalized = red.normalize();
/// assert_eq!(normalized, [1.0, 0.0, 0.0]);
///
/// // Parse a hex color string
/// let parsed = Color::from_hex("#ff0000").unwrap();
/// assert_eq!(parsed, red);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub [u8; 3]);

impl Color {
    /// A black color.
    pub const BLACK: Self = Self([0, 0, 0]);
    /// A white color.
    pub const WHITE: Self = Self([255, 255, 255]);

    /// Creates a new color with the specified RGB values.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinta::Color;
    ///
    /// let green = Color::rgb(0, 255, 0);
    /// assert_eq!(green, Color([0, 255, 0]));
    /// ```
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Parses a `#rgb` or `#rrggbb` hex color (the leading `#` is optional,
    /// case is ignored).
    ///
    /// This is the hard-failure path of the error model: colors arriving from
    /// UI text must already be valid by the time they reach gradient
    /// metadata, so a malformed string is an error here, never later.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinta::Color;
    ///
    /// assert_eq!(Color::from_hex("#1a2b3c").unwrap(), Color([0x1a, 0x2b, 0x3c]));
    /// assert_eq!(Color::from_hex("fff").unwrap(), Color::WHITE);
    /// assert!(Color::from_hex("#12345").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let pattern = Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").unwrap();
        let digits = pattern
            .captures(hex)
            .map(|captures| captures[1].to_owned())
            .ok_or_else(|| ColorError::InvalidHex(hex.to_owned()))?;

        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap();
        if digits.len() == 3 {
            // Short form doubles each digit: #abc == #aabbcc
            let expand = |s: &str| channel(s) * 0x11;
            Ok(Self([
                expand(&digits[0..1]),
                expand(&digits[1..2]),
                expand(&digits[2..3]),
            ]))
        } else {
            Ok(Self([
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
            ]))
        }
    }

    /// Normalizes the color values to the range [0.0, 1.0].
    ///
    /// This is the form bound into shader uniforms.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinta::Color;
    ///
    /// let gray = Color::rgb(51, 51, 51);
    /// assert_eq!(gray.normalize(), [0.2, 0.2, 0.2]);
    /// ```
    pub fn normalize(&self) -> [f32; 3] {
        [
            self.0[0] as f32 / 255.0,
            self.0[1] as f32 / 255.0,
            self.0[2] as f32 / 255.0,
        ]
    }

    /// Returns the color as an array of 3 `u8` values.
    pub fn to_array(&self) -> [u8; 3] {
        self.0
    }
}
