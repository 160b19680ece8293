use serde::Deserialize;

/// The fixed 16-colour EGA palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EgaColor {
    #[default]
    Black = 0,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Brown,
    LightGray,
    DarkGray,
    LightBlue,
    LightGreen,
    LightCyan,
    LightRed,
    LightMagenta,
    Yellow,
    White,
}

const PALETTE_RGB: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0xAA],
    [0x00, 0xAA, 0x00],
    [0x00, 0xAA, 0xAA],
    [0xAA, 0x00, 0x00],
    [0xAA, 0x00, 0xAA],
    [0xAA, 0x55, 0x00],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x55, 0x55, 0xFF],
    [0x55, 0xFF, 0x55],
    [0x55, 0xFF, 0xFF],
    [0xFF, 0x55, 0x55],
    [0xFF, 0x55, 0xFF],
    [0xFF, 0xFF, 0x55],
    [0xFF, 0xFF, 0xFF],
];

impl EgaColor {
    pub const ALL: [EgaColor; 16] = [
        EgaColor::Black,
        EgaColor::Blue,
        EgaColor::Green,
        EgaColor::Cyan,
        EgaColor::Red,
        EgaColor::Magenta,
        EgaColor::Brown,
        EgaColor::LightGray,
        EgaColor::DarkGray,
        EgaColor::LightBlue,
        EgaColor::LightGreen,
        EgaColor::LightCyan,
        EgaColor::LightRed,
        EgaColor::LightMagenta,
        EgaColor::Yellow,
        EgaColor::White,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn rgba(self) -> [u8; 4] {
        let [r, g, b] = PALETTE_RGB[self as usize];
        [r, g, b, 0xFF]
    }

    /// Shade used for the sides of a lit face.
    pub fn darker(self) -> Self {
        match self {
            EgaColor::LightBlue => EgaColor::Blue,
            EgaColor::LightGreen => EgaColor::Green,
            EgaColor::LightCyan => EgaColor::Cyan,
            EgaColor::LightRed => EgaColor::Red,
            EgaColor::LightMagenta => EgaColor::Magenta,
            EgaColor::Yellow => EgaColor::Brown,
            EgaColor::White => EgaColor::LightGray,
            EgaColor::LightGray => EgaColor::DarkGray,
            _ => EgaColor::Black,
        }
    }

    /// Closest palette entry by squared RGB distance.
    pub fn nearest(r: u8, g: u8, b: u8) -> Self {
        let distance = |color: &EgaColor| {
            let [pr, pg, pb] = PALETTE_RGB[*color as usize];
            let dr = i32::from(pr) - i32::from(r);
            let dg = i32::from(pg) - i32::from(g);
            let db = i32::from(pb) - i32::from(b);
            dr * dr + dg * dg + db * db
        };
        Self::ALL
            .iter()
            .copied()
            .min_by_key(distance)
            .unwrap_or_default()
    }
}
