#![forbid(unsafe_code)]

//! Colors, attribute flags, and the class-name stylesheet contract.
//!
//! Overlay elements carry *class names*, never concrete colors. What a
//! class looks like is decided by the host through a [`Stylesheet`]; the
//! overlay layer only guarantees consistent application and removal of the
//! class names it documents. [`ClassMap`] is the plain map-backed
//! implementation most hosts will use.

use ahash::AHashMap;
use bitflags::bitflags;

/// A packed RGBA color. Alpha is a hint for compositing hosts; the cell
/// buffer itself does not blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scale this color's alpha by `opacity` in `[0.0, 1.0]`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let clamped = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * clamped).round() as u8,
            ..self
        }
    }
}

bitflags! {
    /// Text attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 1 << 0;
        const DIM       = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const REVERSE   = 1 << 4;
    }
}

/// A partial style; unset fields inherit from whatever is underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    pub attrs: Option<StyleFlags>,
}

impl Style {
    /// An empty style (all fields unset).
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    /// Set the foreground color.
    pub fn fg(mut self, color: Rgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    pub fn bg(mut self, color: Rgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add the bold attribute.
    pub fn bold(self) -> Self {
        self.flag(StyleFlags::BOLD)
    }

    /// Add the reverse-video attribute.
    pub fn reverse(self) -> Self {
        self.flag(StyleFlags::REVERSE)
    }

    fn flag(mut self, flag: StyleFlags) -> Self {
        self.attrs = Some(self.attrs.unwrap_or_default() | flag);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn patch(mut self, other: Style) -> Self {
        if let Some(fg) = other.fg {
            self.fg = Some(fg);
        }
        if let Some(bg) = other.bg {
            self.bg = Some(bg);
        }
        if let Some(attrs) = other.attrs {
            self.attrs = Some(self.attrs.unwrap_or_default() | attrs);
        }
        self
    }
}

/// Resolves style class names to concrete styles.
///
/// The class names an overlay applies are a presentation contract; hosts
/// style them however they like. Unknown classes resolve to `None` and
/// contribute nothing.
pub trait Stylesheet {
    /// Resolve a single class name.
    fn resolve(&self, class: &str) -> Option<Style>;

    /// Merge the styles of `classes` in order (later classes win per field).
    fn resolve_all<'a>(&self, classes: impl Iterator<Item = &'a str>) -> Style {
        classes.fold(Style::new(), |acc, class| {
            match self.resolve(class) {
                Some(style) => acc.patch(style),
                None => acc,
            }
        })
    }
}

/// A map-backed stylesheet.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    rules: AHashMap<String, Style>,
}

impl ClassMap {
    /// Create an empty class map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a class name with a style, replacing any prior rule.
    pub fn set(&mut self, class: impl Into<String>, style: Style) -> &mut Self {
        self.rules.insert(class.into(), style);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the map holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Stylesheet for ClassMap {
    fn resolve(&self, class: &str) -> Option<Style> {
        self.rules.get(class).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_opacity_scales_alpha() {
        let c = Rgba::rgb(10, 20, 30).with_opacity(0.5);
        assert_eq!(c.a, 128);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    }

    #[test]
    fn with_opacity_clamps() {
        assert_eq!(Rgba::rgb(0, 0, 0).with_opacity(2.0).a, 255);
        assert_eq!(Rgba::rgb(0, 0, 0).with_opacity(-1.0).a, 0);
    }

    #[test]
    fn patch_set_fields_win() {
        let base = Style::new().fg(Rgba::rgb(1, 1, 1)).bg(Rgba::rgb(2, 2, 2));
        let over = Style::new().fg(Rgba::rgb(9, 9, 9));
        let merged = base.patch(over);
        assert_eq!(merged.fg, Some(Rgba::rgb(9, 9, 9)));
        assert_eq!(merged.bg, Some(Rgba::rgb(2, 2, 2)));
    }

    #[test]
    fn patch_unions_attrs() {
        let merged = Style::new().bold().patch(Style::new().reverse());
        assert_eq!(merged.attrs, Some(StyleFlags::BOLD | StyleFlags::REVERSE));
    }

    #[test]
    fn class_map_resolves_in_order() {
        let mut sheet = ClassMap::new();
        sheet.set("a", Style::new().fg(Rgba::rgb(1, 0, 0)));
        sheet.set("b", Style::new().fg(Rgba::rgb(0, 1, 0)));

        let merged = sheet.resolve_all(["a", "b"].into_iter());
        assert_eq!(merged.fg, Some(Rgba::rgb(0, 1, 0)));
    }

    #[test]
    fn unknown_class_contributes_nothing() {
        let sheet = ClassMap::new();
        assert!(sheet.resolve("missing").is_none());
        assert!(sheet.resolve_all(["missing"].into_iter()).is_empty());
    }
}
