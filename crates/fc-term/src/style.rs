// SPDX-License-Identifier: MIT
//
// Colors and text attributes for terminal cells.
//
// A cell's look is a `Style`: foreground, background and a small set of SGR
// attributes. Colors are either the terminal default, a 256-color palette
// index, or 24-bit RGB. The shell mostly uses RGB parsed from `#rrggbb`
// strings so its palette reads like the console it imitates.

// ─── Color ───────────────────────────────────────────────────────────────────

/// A resolved terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// Terminal default (inherits the user's theme).
    #[default]
    Default,
    /// ANSI 256-color palette index.
    Indexed(u8),
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Pure black.
    pub const BLACK: Self = Self::Rgb(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::Rgb(255, 255, 255);

    /// Parse `#rrggbb` (the leading `#` is optional).
    ///
    /// ```
    /// use fc_term::style::Color;
    ///
    /// assert_eq!(Color::hex("#1E1E1E"), Some(Color::Rgb(0x1e, 0x1e, 0x1e)));
    /// assert_eq!(Color::hex("00ff00"), Some(Color::Rgb(0, 255, 0)));
    /// assert_eq!(Color::hex("#fff"), None);
    /// ```
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Build an RGB color from `0xRRGGBB`, for palette constants.
    #[must_use]
    pub const fn from_u32(rgb: u32) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR text attributes as a bitfield.
    ///
    /// ```
    /// use fc_term::style::Attr;
    ///
    /// let a = Attr::BOLD | Attr::INVERSE;
    /// assert!(a.contains(Attr::BOLD));
    /// assert!(!a.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 3.
        const ITALIC    = 1 << 2;
        /// SGR 4.
        const UNDERLINE = 1 << 3;
        /// SGR 7, swap foreground and background.
        const INVERSE   = 1 << 4;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground, background and attributes for painted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    /// Default colors, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Add attributes on top of the current ones.
    #[inline]
    #[must_use]
    pub const fn with(self, attrs: Attr) -> Self {
        Self {
            attrs: self.attrs.union(attrs),
            ..self
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
