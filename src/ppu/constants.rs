// PPU constants

/// PPU register address mask for mirroring
///
/// PPU registers are 8 bytes ($2000-$2007) but mirrored throughout $2000-$3FFF.
/// Use this mask to get the actual register address: `addr & 0x0007`
pub(super) const PPU_REGISTER_MASK: u16 = 0x0007;

/// Size of nametable in bytes (1KB)
pub(super) const NAMETABLE_SIZE: usize = 1024;

/// Size of palette RAM in bytes
pub(super) const PALETTE_SIZE: usize = 32;

/// Screen width in pixels
pub(super) const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub(super) const SCREEN_HEIGHT: usize = 240;

/// Nametable width in tiles (32 tiles)
pub(super) const NAMETABLE_WIDTH: usize = 32;

/// Nametable height in tiles (30 tiles)
pub(super) const NAMETABLE_HEIGHT: usize = 30;

/// Tile size in pixels (8x8)
pub(super) const TILE_SIZE: usize = 8;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================
//
// The core schedules at scanline granularity, not per sub-cycle, so these
// name only the scanline boundaries a tick needs to distinguish.

/// Number of scanlines per frame (NTSC)
pub(super) const SCANLINES_PER_FRAME: u16 = 262;

/// Pre-render scanline number
pub(super) const PRERENDER_SCANLINE: u16 = 261;

/// First visible scanline
pub(super) const FIRST_VISIBLE_SCANLINE: u16 = 0;

/// Last visible scanline
pub(super) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// Post-render scanline (idle)
pub(super) const POSTRENDER_SCANLINE: u16 = 240;

/// First VBlank scanline
pub(super) const FIRST_VBLANK_SCANLINE: u16 = 241;

/// Last VBlank scanline
pub(super) const LAST_VBLANK_SCANLINE: u16 = 260;

/// Size of the CHR space the PPU owns a private copy of (pattern tables).
pub(super) const CHR_SIZE: usize = 8 * 1024;
