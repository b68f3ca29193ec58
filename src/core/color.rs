/// An 8-bit-per-channel RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Colour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0, 0, 0);
    pub const WHITE: Colour = Colour::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Builds a colour from `[0, 1]` components, truncating after scaling by 255.
    pub fn from_unit(rgb: [f32; 3]) -> Self {
        let channel = |v: f32| (v * 255.0).clamp(0.0, 255.0) as u8;
        Self::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// Multiplies every channel by `factor`, saturating at 255.
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |v: u8| (v as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::new(channel(self.red), channel(self.green), channel(self.blue))
    }

    pub fn pack(self, alpha: u8) -> u32 {
        pack(self.red, self.green, self.blue, alpha)
    }
}

impl From<[u8; 3]> for Colour {
    fn from(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

/// Packs four 8-bit channels into a single ARGB word.
#[inline]
pub fn pack(red: u8, green: u8, blue: u8, alpha: u8) -> u32 {
    ((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Splits an ARGB word back into `[red, green, blue, alpha]`.
#[inline]
pub fn unpack(colour: u32) -> [u8; 4] {
    [
        ((colour >> 16) & 0xFF) as u8,
        ((colour >> 8) & 0xFF) as u8,
        (colour & 0xFF) as u8,
        (colour >> 24) as u8,
    ]
}
