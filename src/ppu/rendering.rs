// PPU rendering logic
//
// The core schedules at scanline granularity rather than per dot: each
// visible scanline is rendered in one call by walking the nametable row it
// corresponds to, instead of by shifting per-cycle shift registers. Scroll
// position is read from `t`/`fine_x` once per row, so this core does not
// reproduce mid-frame raster scroll tricks that depend on per-dot timing.

use super::constants::{NAMETABLE_HEIGHT, NAMETABLE_WIDTH, SCREEN_WIDTH, TILE_SIZE};
use super::Ppu;

/// Represents a parsed sprite from OAM
#[derive(Debug, Clone, Copy)]
struct Sprite {
    /// Y position (top edge - 1)
    y: u8,
    /// Tile index (or tile bank for 8x16 mode)
    tile_index: u8,
    /// Attribute byte
    attributes: u8,
    /// X position (left edge)
    x: u8,
    /// Original OAM index (for sprite 0 detection)
    oam_index: usize,
}

impl Sprite {
    /// Check if sprite has vertical flip enabled
    fn is_vflip(&self) -> bool {
        (self.attributes & 0x80) != 0
    }

    /// Check if sprite has horizontal flip enabled
    fn is_hflip(&self) -> bool {
        (self.attributes & 0x40) != 0
    }

    /// Check if sprite is behind background
    fn is_behind_background(&self) -> bool {
        (self.attributes & 0x20) != 0
    }

    /// Get sprite palette index (0-3, for sprite palettes 4-7)
    fn palette(&self) -> u8 {
        self.attributes & 0x03
    }

    /// Check if this is sprite 0
    fn is_sprite_zero(&self) -> bool {
        self.oam_index == 0
    }
}

impl Ppu {
    /// Render one row of background pixels (`screen_y` in 0..240) into the
    /// frame buffer, using the scroll position currently latched in
    /// `t`/`fine_x`.
    pub(super) fn render_background_row(&mut self, screen_y: usize) {
        let row_start = screen_y * SCREEN_WIDTH;

        if (self.ppumask & 0x08) == 0 {
            self.frame_buffer[row_start..row_start + SCREEN_WIDTH].fill(0);
            return;
        }

        let coarse_x = (self.t & 0x001F) as usize;
        let coarse_y = ((self.t & 0x03E0) >> 5) as usize;
        let fine_x = self.fine_x as usize;
        let fine_y = ((self.t >> 12) & 0x07) as usize;

        let nametable_select = ((self.t >> 10) & 0x03) as usize;
        let base_nt_x = nametable_select & 0x01;
        let base_nt_y = (nametable_select >> 1) & 0x01;

        let scroll_x = base_nt_x * NAMETABLE_WIDTH * TILE_SIZE + coarse_x * TILE_SIZE + fine_x;
        let scroll_y = base_nt_y * NAMETABLE_HEIGHT * TILE_SIZE + coarse_y * TILE_SIZE + fine_y;

        let nt_y = (screen_y + scroll_y) % (NAMETABLE_HEIGHT * TILE_SIZE * 2);

        for screen_x in 0..SCREEN_WIDTH {
            let nt_x = (screen_x + scroll_x) % (NAMETABLE_WIDTH * TILE_SIZE * 2);

            let nt_index =
                (nt_y / (NAMETABLE_HEIGHT * TILE_SIZE)) * 2 + (nt_x / (NAMETABLE_WIDTH * TILE_SIZE));
            let nametable_addr = 0x2000 | ((nt_index as u16) << 10);

            let tile_x = (nt_x % (NAMETABLE_WIDTH * TILE_SIZE)) / TILE_SIZE;
            let tile_y = (nt_y % (NAMETABLE_HEIGHT * TILE_SIZE)) / TILE_SIZE;

            let pixel_x = nt_x % TILE_SIZE;
            let pixel_y = nt_y % TILE_SIZE;

            let tile_addr = nametable_addr + (tile_y * NAMETABLE_WIDTH + tile_x) as u16;
            let tile_index = self.read_nametable_tile(tile_addr);

            let palette_index = self.read_attribute_byte(nametable_addr, tile_x, tile_y);

            let pattern_table_base = if (self.ppuctrl & 0x10) != 0 {
                0x1000
            } else {
                0x0000
            };
            let color_index =
                self.fetch_tile_pixel(pattern_table_base, tile_index, pixel_x, pixel_y);

            let palette_color = self.get_background_color(palette_index, color_index);

            self.frame_buffer[row_start + screen_x] = palette_color;
        }
    }

    /// Read a tile index from the nametable
    pub(super) fn read_nametable_tile(&self, addr: u16) -> u8 {
        self.read_ppu_memory(addr)
    }

    /// Read attribute byte for palette selection
    ///
    /// The attribute table covers 2x2 tile blocks, with each byte containing
    /// palette information for four 2x2 tile blocks.
    pub(super) fn read_attribute_byte(
        &self,
        nametable_base: u16,
        tile_x: usize,
        tile_y: usize,
    ) -> u8 {
        let attr_table_base = nametable_base + 0x3C0;

        let attr_x = tile_x / 4;
        let attr_y = tile_y / 4;
        let attr_addr = attr_table_base + (attr_y * 8 + attr_x) as u16;

        let attr_byte = self.read_ppu_memory(attr_addr);

        let block_x = (tile_x % 4) / 2;
        let block_y = (tile_y % 4) / 2;
        let shift = (block_y * 2 + block_x) * 2;

        (attr_byte >> shift) & 0x03
    }

    /// Fetch a pixel color index from the pattern table
    ///
    /// Each tile is 8x8 pixels stored as two bitplanes (16 bytes total),
    /// combined to form a 2-bit color index.
    pub(super) fn fetch_tile_pixel(
        &self,
        pattern_table_base: u16,
        tile_index: u8,
        pixel_x: usize,
        pixel_y: usize,
    ) -> u8 {
        let tile_addr = pattern_table_base + (tile_index as u16) * 16;

        let bitplane_0 = self.read_ppu_memory(tile_addr + pixel_y as u16);
        let bitplane_1 = self.read_ppu_memory(tile_addr + pixel_y as u16 + 8);

        let bit_pos = 7 - pixel_x;
        let bit_0 = (bitplane_0 >> bit_pos) & 0x01;
        let bit_1 = (bitplane_1 >> bit_pos) & 0x01;

        (bit_1 << 1) | bit_0
    }

    /// Get the final background color from palette RAM. Color index 0
    /// always resolves to the universal background color regardless of
    /// palette selection.
    pub(super) fn get_background_color(&self, palette_index: u8, color_index: u8) -> u8 {
        if color_index == 0 {
            return self.palette_ram[0];
        }
        let palette_addr = (palette_index as usize) * 4 + (color_index as usize);
        self.palette_ram[palette_addr]
    }

    /// Parse all 64 sprites from OAM memory
    fn parse_sprites(&self) -> [Sprite; 64] {
        let mut sprites = [Sprite {
            y: 0xFF,
            tile_index: 0,
            attributes: 0,
            x: 0xFF,
            oam_index: 0,
        }; 64];

        for (i, sprite) in sprites.iter_mut().enumerate() {
            let base = i * 4;
            *sprite = Sprite {
                y: self.oam[base],
                tile_index: self.oam[base + 1],
                attributes: self.oam[base + 2],
                x: self.oam[base + 3],
                oam_index: i,
            };
        }

        sprites
    }

    /// Evaluate sprites for a specific scanline. The NES PPU can only render
    /// up to 8 sprites per scanline; a ninth sets the overflow flag.
    fn evaluate_sprites_for_scanline(
        &self,
        scanline: usize,
        sprites: &[Sprite; 64],
    ) -> (Vec<Sprite>, bool) {
        let mut visible_sprites = Vec::with_capacity(8);
        let sprite_height = self.get_sprite_height();

        for sprite in sprites.iter() {
            let sprite_y = sprite.y as usize + 1; // Y position is top - 1

            if scanline >= sprite_y && scanline < sprite_y + sprite_height {
                if visible_sprites.len() < 8 {
                    visible_sprites.push(*sprite);
                } else {
                    return (visible_sprites, true);
                }
            }
        }

        (visible_sprites, false)
    }

    /// Sprite height in pixels: 16 in 8x16 mode, 8 otherwise.
    fn get_sprite_height(&self) -> usize {
        if (self.ppuctrl & 0x20) != 0 {
            16
        } else {
            8
        }
    }

    fn fetch_sprite_pixel(&self, sprite: &Sprite, pixel_x: usize, pixel_y: usize) -> u8 {
        let sprite_height = self.get_sprite_height();

        let pixel_y = if sprite.is_vflip() {
            sprite_height - 1 - pixel_y
        } else {
            pixel_y
        };

        let pixel_x = if sprite.is_hflip() { 7 - pixel_x } else { pixel_x };

        if sprite_height == 8 {
            let pattern_table_base = if (self.ppuctrl & 0x08) != 0 {
                0x1000
            } else {
                0x0000
            };
            self.fetch_tile_pixel(pattern_table_base, sprite.tile_index, pixel_x, pixel_y)
        } else {
            // 8x16 mode: bit 0 of tile_index selects pattern table, the
            // remaining bits select the (top, bottom) tile pair.
            let pattern_table_base = if (sprite.tile_index & 0x01) != 0 {
                0x1000
            } else {
                0x0000
            };

            let tile_pair = sprite.tile_index & 0xFE;
            let (tile_index, tile_y) = if pixel_y < 8 {
                (tile_pair, pixel_y)
            } else {
                (tile_pair + 1, pixel_y - 8)
            };

            self.fetch_tile_pixel(pattern_table_base, tile_index, pixel_x, tile_y)
        }
    }

    /// Sprite palettes are at $3F10-$3F1F (offset by 16 from background).
    /// Color index 0 is always transparent.
    fn get_sprite_color(&self, palette_index: u8, color_index: u8) -> u8 {
        if color_index == 0 {
            return 0;
        }
        let palette_addr = 16 + (palette_index as usize) * 4 + (color_index as usize);
        self.palette_ram[palette_addr]
    }

    /// Composite sprites onto a row that already holds the rendered
    /// background for `scanline`, returning `(sprite_0_hit, overflow)` for
    /// that row. PPUSTATUS is updated by the caller.
    pub(super) fn render_sprite_row(&mut self, scanline: usize) -> (bool, bool) {
        if (self.ppumask & 0x10) == 0 {
            return (false, false);
        }

        let sprites = self.parse_sprites();
        let (visible_sprites, overflow) = self.evaluate_sprites_for_scanline(scanline, &sprites);

        let mut sprite_0_hit = false;

        // Lower OAM index has priority; render in reverse so it paints last.
        for sprite in visible_sprites.iter().rev() {
            let sprite_y = sprite.y as usize + 1;
            let pixel_y = scanline - sprite_y;

            for pixel_x in 0..8 {
                let screen_x = sprite.x as usize + pixel_x;
                if screen_x >= SCREEN_WIDTH {
                    continue;
                }

                let color_index = self.fetch_sprite_pixel(sprite, pixel_x, pixel_y);
                if color_index == 0 {
                    continue;
                }

                let sprite_color = self.get_sprite_color(sprite.palette(), color_index);
                let buffer_index = scanline * SCREEN_WIDTH + screen_x;
                let background_color = self.frame_buffer[buffer_index];

                if sprite.is_sprite_zero()
                    && background_color != self.palette_ram[0]
                    && screen_x != 255
                {
                    sprite_0_hit = true;
                }

                if sprite.is_behind_background() {
                    if background_color == self.palette_ram[0] {
                        self.frame_buffer[buffer_index] = sprite_color;
                    }
                } else {
                    self.frame_buffer[buffer_index] = sprite_color;
                }
            }
        }

        (sprite_0_hit, overflow)
    }

    /// Render one visible scanline (background then sprites), updating the
    /// sprite-0-hit and sprite-overflow status bits for the row.
    pub(super) fn render_scanline(&mut self, scanline: usize) {
        self.render_background_row(scanline);
        let (sprite_0_hit, overflow) = self.render_sprite_row(scanline);

        if sprite_0_hit {
            self.ppustatus |= 0x40;
        }
        if overflow {
            self.ppustatus |= 0x20;
        }
    }
}
