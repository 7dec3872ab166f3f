//! RGBA color with CSS parsing and blending.
//!
//! Red, green and blue are integers in `0..=255`; alpha is a float in
//! `[0, 1]`. Every constructor clamps, so a `Color` is always in range and
//! its serde form is exactly the `ColorIO` wire shape `{ r, g, b, a }`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by color parsing and blending.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    /// The input is not a CSS color string this parser understands.
    #[error("Unable to parse color string: {0}")]
    Parse(String),

    /// Interpolation distance outside `[0, 1]`.
    #[error("distance must be between 0 and 1: {0}")]
    InvalidDistance(f64),
}

/// Basic CSS named colors.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("aqua", (0, 255, 255)),
    ("black", (0, 0, 0)),
    ("blue", (0, 0, 255)),
    ("fuchsia", (255, 0, 255)),
    ("gray", (128, 128, 128)),
    ("green", (0, 128, 0)),
    ("lime", (0, 255, 0)),
    ("maroon", (128, 0, 0)),
    ("navy", (0, 0, 128)),
    ("olive", (128, 128, 0)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("red", (255, 0, 0)),
    ("silver", (192, 192, 192)),
    ("teal", (0, 128, 128)),
    ("white", (255, 255, 255)),
    ("yellow", (255, 255, 0)),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// Creates a color, rounding and clamping each component into range.
    #[must_use]
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            a: clamp_alpha(a),
        }
    }

    /// Opaque color from integer channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opaque color from a packed `0xRRGGBB` number.
    #[must_use]
    pub fn from_hex_number(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Parses a CSS color string.
    pub fn from_css(css: &str) -> Result<Self, ColorError> {
        let mut color = Self::BLACK;
        color.set_css(css)?;
        Ok(color)
    }

    #[must_use]
    pub fn red(&self) -> u8 {
        self.r
    }

    #[must_use]
    pub fn green(&self) -> u8 {
        self.g
    }

    #[must_use]
    pub fn blue(&self) -> u8 {
        self.b
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.a
    }

    /// Overwrites all four components, clamping like [`Color::new`].
    pub fn set_rgba(&mut self, r: f64, g: f64, b: f64, a: f64) {
        *self = Self::new(r, g, b, a);
    }

    /// Replaces this color with the parsed CSS string.
    ///
    /// Leaves the color untouched when parsing fails.
    pub fn set_css(&mut self, css: &str) -> Result<(), ColorError> {
        *self = parse_css(css)?;
        Ok(())
    }

    /// Whether [`Color::set_css`] would accept the string.
    #[must_use]
    pub fn is_css_color_string(css: &str) -> bool {
        parse_css(css).is_ok()
    }

    /// CSS form: `rgb(r,g,b)` when opaque, `rgba(r,g,b,a)` otherwise.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }

    #[must_use]
    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self {
            a: clamp_alpha(alpha),
            ..*self
        }
    }

    /// Brighter color, dividing each channel by `factor` in `(0, 1]`.
    #[must_use]
    pub fn brighter_color(&self, factor: f64) -> Self {
        let factor = factor.clamp(f64::EPSILON, 1.0);
        Self::new(
            (f64::from(self.r) / factor).floor().min(255.0),
            (f64::from(self.g) / factor).floor().min(255.0),
            (f64::from(self.b) / factor).floor().min(255.0),
            self.a,
        )
    }

    /// Darker color, multiplying each channel by `factor` in `[0, 1]`.
    #[must_use]
    pub fn darker_color(&self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self::new(
            (f64::from(self.r) * factor).floor(),
            (f64::from(self.g) * factor).floor(),
            (f64::from(self.b) * factor).floor(),
            self.a,
        )
    }

    /// Relative luminance in `0..=255` using Rec. 709 weights.
    #[must_use]
    pub fn luminance(&self) -> f64 {
        0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b)
    }

    /// Linear blend between two colors.
    ///
    /// Channels are floored after blending, alpha is blended exactly.
    /// `distance` must lie in `[0, 1]`.
    pub fn interpolate_rgba(
        color1: &Color,
        color2: &Color,
        distance: f64,
    ) -> Result<Color, ColorError> {
        if !(0.0..=1.0).contains(&distance) {
            return Err(ColorError::InvalidDistance(distance));
        }
        // weighted form keeps both endpoints exact
        let blend = |a: f64, b: f64| a * (1.0 - distance) + b * distance;
        Ok(Color::new(
            blend(f64::from(color1.r), f64::from(color2.r)).floor(),
            blend(f64::from(color1.g), f64::from(color2.g)).floor(),
            blend(f64::from(color1.b), f64::from(color2.b)).floor(),
            blend(color1.a, color2.a),
        ))
    }
}

fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

fn clamp_alpha(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn parse_css(css: &str) -> Result<Color, ColorError> {
    let normalized: String = css
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let fail = || ColorError::Parse(css.to_string());

    if normalized == "transparent" {
        return Ok(Color::TRANSPARENT);
    }
    if let Some(&(_, (r, g, b))) = NAMED_COLORS.iter().find(|(name, _)| *name == normalized) {
        return Ok(Color::rgb(r, g, b));
    }
    if let Some(digits) = normalized.strip_prefix('#') {
        return parse_hex(digits).ok_or_else(fail);
    }
    if let Some(args) = function_args(&normalized, "rgba") {
        let [r, g, b, a] = parse_components::<4>(args).ok_or_else(fail)?;
        return Ok(Color::new(
            rgb_component(r).ok_or_else(fail)?,
            rgb_component(g).ok_or_else(fail)?,
            rgb_component(b).ok_or_else(fail)?,
            number(a).ok_or_else(fail)?,
        ));
    }
    if let Some(args) = function_args(&normalized, "rgb") {
        let [r, g, b] = parse_components::<3>(args).ok_or_else(fail)?;
        return Ok(Color::new(
            rgb_component(r).ok_or_else(fail)?,
            rgb_component(g).ok_or_else(fail)?,
            rgb_component(b).ok_or_else(fail)?,
            1.0,
        ));
    }
    if let Some(args) = function_args(&normalized, "hsla") {
        let [h, s, l, a] = parse_components::<4>(args).ok_or_else(fail)?;
        return hsl_to_color(
            number(h).ok_or_else(fail)?,
            percent(s).ok_or_else(fail)?,
            percent(l).ok_or_else(fail)?,
            number(a).ok_or_else(fail)?,
        )
        .ok_or_else(fail);
    }
    if let Some(args) = function_args(&normalized, "hsl") {
        let [h, s, l] = parse_components::<3>(args).ok_or_else(fail)?;
        return hsl_to_color(
            number(h).ok_or_else(fail)?,
            percent(s).ok_or_else(fail)?,
            percent(l).ok_or_else(fail)?,
            1.0,
        )
        .ok_or_else(fail);
    }
    Err(fail())
}

fn parse_hex(digits: &str) -> Option<Color> {
    match digits.len() {
        3 => {
            // #abc is shorthand for #aabbcc
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            parse_hex(&expanded)
        }
        6 => {
            let bytes = hex::decode(digits).ok()?;
            Some(Color::rgb(bytes[0], bytes[1], bytes[2]))
        }
        _ => None,
    }
}

fn function_args<'a>(css: &'a str, name: &str) -> Option<&'a str> {
    css.strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_components<const N: usize>(args: &str) -> Option<[&str; N]> {
    let parts: Vec<&str> = args.split(',').collect();
    parts.try_into().ok()
}

fn number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `rgb()` channels accept either `0..=255` or a percentage.
fn rgb_component(raw: &str) -> Option<f64> {
    match raw.strip_suffix('%') {
        Some(pct) => number(pct).map(|v| v * 255.0 / 100.0),
        None => number(raw),
    }
}

fn percent(raw: &str) -> Option<f64> {
    number(raw.strip_suffix('%')?).map(|v| v / 100.0)
}

fn hsl_to_color(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Option<Color> {
    let hue = (((hue % 360.0) + 360.0) % 360.0) / 360.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;

    Some(Color::new(
        hue_to_rgb(m1, m2, hue + 1.0 / 3.0) * 255.0,
        hue_to_rgb(m1, m2, hue) * 255.0,
        hue_to_rgb(m1, m2, hue - 1.0 / 3.0) * 255.0,
        alpha,
    ))
}

fn hue_to_rgb(m1: f64, m2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}
