// Display module - Frame buffer and palette conversion
//
// This core exposes pixels, not a window: the PPU's frame buffer is a
// slice of palette indices, and this module supplies the conversion to RGB
// for whatever the caller uses to actually put pixels on screen.
//
// - NES color palette (64 entries, 52 unique colors)
// - Frame buffer (256×240 pixels) and RGBA conversion

pub mod framebuffer;
pub mod palette;

pub use framebuffer::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use palette::{palette_to_rgb, palette_to_rgba, NES_PALETTE};
