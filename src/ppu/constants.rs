// PPU timing and geometry constants (NTSC)

/// PPU register address mask
///
/// The eight registers repeat throughout $2000-$3FFF; `addr & 0x0007`
/// selects the register.
pub(crate) const PPU_REGISTER_MASK: u16 = 0x0007;

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Bytes per output pixel (RGBA)
pub const BYTES_PER_PIXEL: usize = 4;

/// Size of the output framebuffer in bytes
pub const FRAME_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL;

/// Physical nametable RAM (two 1KB tables)
pub(crate) const NAMETABLE_RAM_SIZE: usize = 0x800;

/// Palette RAM size in bytes
pub(crate) const PALETTE_RAM_SIZE: usize = 32;

/// Dots per scanline (0-340)
pub(crate) const DOTS_PER_SCANLINE: u16 = 341;

/// Scanlines per frame (0-261)
pub(crate) const SCANLINES_PER_FRAME: u16 = 262;

/// Last visible scanline
pub(crate) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// Post-render scanline; the finished frame is handed off at dot 0
pub(crate) const POSTRENDER_SCANLINE: u16 = 240;

/// Scanline whose dot 1 sets the VBlank flag (and NMI, when enabled)
pub(crate) const VBLANK_SCANLINE: u16 = 241;

/// Pre-render scanline
pub(crate) const PRERENDER_SCANLINE: u16 = 261;

/// Dot of each visible scanline on which the mapper scanline hook fires
pub(crate) const MAPPER_SCANLINE_DOT: u16 = 260;
