use std::fmt;

/// A 32-bit color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb(u32);

impl Argb {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

// The settings file stores colors as signed 32-bit integers.
impl From<i32> for Argb {
    fn from(value: i32) -> Self {
        Self(value as u32)
    }
}

impl From<Argb> for i32 {
    fn from(color: Argb) -> Self {
        color.0 as i32
    }
}

impl fmt::Debug for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Argb(#{:08X})", self.0)
    }
}

/// Opaque `#00FF00`.
pub const DEFAULT_FOREGROUND: Argb = Argb::opaque(0x00, 0xFF, 0x00);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub hex: &'static str,
    pub color: Argb,
}

impl PaletteEntry {
    const fn new(name: &'static str, hex: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            name,
            hex,
            color: Argb::opaque(r, g, b),
        }
    }

    pub fn menu_label(&self) -> String {
        format!("{} ({})", self.name, self.hex)
    }
}

/// Colors offered in the tray menu, in display order.
pub const PALETTE: [PaletteEntry; 12] = [
    PaletteEntry::new("Soft White", "#F2F2F2", 0xF2, 0xF2, 0xF2),
    PaletteEntry::new("Ice Blue", "#DDF4FF", 0xDD, 0xF4, 0xFF),
    PaletteEntry::new("Mint", "#D9FFE8", 0xD9, 0xFF, 0xE8),
    PaletteEntry::new("Lemon", "#FFF6B8", 0xFF, 0xF6, 0xB8),
    PaletteEntry::new("Peach", "#FFDAB8", 0xFF, 0xDA, 0xB8),
    PaletteEntry::new("Sky", "#87CEFF", 0x87, 0xCE, 0xFF),
    PaletteEntry::new("Lime", "#7CFC00", 0x7C, 0xFC, 0x00),
    PaletteEntry::new("Amber", "#FFC107", 0xFF, 0xC1, 0x07),
    PaletteEntry::new("Orange", "#FF8C00", 0xFF, 0x8C, 0x00),
    PaletteEntry::new("Red", "#FF3B30", 0xFF, 0x3B, 0x30),
    PaletteEntry::new("Magenta", "#FF00AA", 0xFF, 0x00, 0xAA),
    PaletteEntry::new("Neon Green", "#00FF00", 0x00, 0xFF, 0x00),
];

pub fn index_of(color: Argb) -> Option<usize> {
    PALETTE.iter().position(|entry| entry.color == color)
}

/// Menu entry that carries the checkmark for `color`.
///
/// Colors outside the palette (a hand-edited settings file, for instance)
/// check the first entry so the menu never shows an empty selection.
pub fn checked_index(color: Argb) -> usize {
    index_of(color).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_foreground_matches_stored_integer() {
        assert_eq!(i32::from(DEFAULT_FOREGROUND), -16_711_936);
        assert_eq!(Argb::from(-16_711_936), DEFAULT_FOREGROUND);
    }

    #[test]
    fn default_foreground_is_neon_green() {
        assert_eq!(index_of(DEFAULT_FOREGROUND), Some(11));
        assert_eq!(PALETTE[11].name, "Neon Green");
    }

    #[test]
    fn channels_unpack() {
        let amber = PALETTE[7].color;
        assert_eq!(amber.alpha(), 0xFF);
        assert_eq!(amber.red(), 0xFF);
        assert_eq!(amber.green(), 0xC1);
        assert_eq!(amber.blue(), 0x07);
    }

    #[test]
    fn unknown_color_checks_soft_white() {
        let odd = Argb::opaque(0x12, 0x34, 0x56);
        assert_eq!(index_of(odd), None);
        assert_eq!(PALETTE[checked_index(odd)].name, "Soft White");
    }

    #[test]
    fn translucent_variant_is_not_a_palette_member() {
        let faded = Argb::from_bits(PALETTE[5].color.bits() & 0x80FF_FFFF);
        assert_eq!(checked_index(faded), 0);
    }

    #[test]
    fn menu_labels_include_hex() {
        assert_eq!(PALETTE[0].menu_label(), "Soft White (#F2F2F2)");
        assert_eq!(PALETTE[9].menu_label(), "Red (#FF3B30)");
    }
}
