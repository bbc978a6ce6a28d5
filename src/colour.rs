/// Cycled per slide so every cell from one slide shares a background.
/// Packed as `A<<24 | B<<16 | G<<8 | R`.
pub const SLIDE_COLOURS: [u32; 20] = [
    4294951115, 4294934323, 4294945095, 4294956885, 4294956630,
    4294946615, 4294935067, 4294951370, 4294967040, 4289374890,
    4291624735, 4286611584, 4294962099, 4290822336, 4282477025,
    4286578816, 4290019584, 4294309340, 4280150535, 4287245282,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colours: Vec<u32>,
}

impl Palette {
    /// An empty list falls back to the slide palette.
    pub fn new(colours: Vec<u32>) -> Self {
        if colours.is_empty() {
            return Self::default();
        }
        Self { colours }
    }

    /// Groups are 1-based; group 0 wraps to the last colour.
    pub fn colour_for(&self, group: u32) -> u32 {
        let len = self.colours.len() as i64;
        let index = (i64::from(group) - 1).rem_euclid(len);
        self.colours[index as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colours: SLIDE_COLOURS.to_vec(),
        }
    }
}

pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(b) << 16) | (u32::from(g) << 8) | u32::from(r)
}

pub fn unpack_rgba(colour: u32) -> (u8, u8, u8, u8) {
    (
        (colour & 0xFF) as u8,
        ((colour >> 8) & 0xFF) as u8,
        ((colour >> 16) & 0xFF) as u8,
        ((colour >> 24) & 0xFF) as u8,
    )
}
