// Cartridge container: iNES header parsing plus the trivial fixed
// (NROM-style) PRG/CHR mapping. This core supports no bank switching and no
// generalized mapper abstraction; the fixed layout is inlined directly on
// `Cartridge` rather than dispatched through a `Mapper` trait.

use crate::error::Error;
use std::fs;
use std::path::Path;

const HEADER_SIZE: usize = 16;
const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A]; // "NES\x1A"
const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 8 * 1024;

/// Nametable arrangement, from header byte 6 bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// The 16-byte iNES header, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct INesHeader {
    /// PRG-ROM size in 16 KiB units.
    pub prg_rom_units: u8,
    /// CHR-ROM size in 8 KiB units. Zero means the cartridge supplies
    /// CHR-RAM instead of a fixed pattern table.
    pub chr_rom_units: u8,
    pub mirroring: Mirroring,
    /// True when byte 7 bits 2..3 read 0b10 (NES 2.0). The core accepts
    /// but does not interpret the extension fields this implies.
    pub is_nes2: bool,
}

impl INesHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::InvalidRom(format!(
                "header truncated: expected {HEADER_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0..4] != MAGIC {
            return Err(Error::InvalidRom(format!(
                "bad magic: {:02X?}, expected {:02X?}",
                &bytes[0..4],
                MAGIC
            )));
        }

        let mirroring = if bytes[6] & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let is_nes2 = bytes[7] & 0x0C == 0x08;

        Ok(INesHeader {
            prg_rom_units: bytes[4],
            chr_rom_units: bytes[5],
            mirroring,
            is_nes2,
        })
    }

    pub fn prg_rom_size(&self) -> usize {
        self.prg_rom_units as usize * PRG_BANK_SIZE
    }

    pub fn chr_rom_size(&self) -> usize {
        self.chr_rom_units as usize * CHR_BANK_SIZE
    }
}

/// A loaded ROM image: the decoded header plus PRG-ROM and CHR-ROM/RAM.
///
/// PRG-ROM is addressed starting at CPU 0x8000; if the image is a single
/// 16 KiB bank, reads above 0xC000 mirror it so the reset/NMI/IRQ vectors
/// at the top of the address space resolve. CHR space is addressed
/// starting at PPU 0x0000 and is writable exactly when the header declares
/// zero CHR-ROM banks (CHR-RAM).
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub header: INesHeader,
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
}

impl Cartridge {
    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let header = INesHeader::from_bytes(bytes)?;

        let prg_size = header.prg_rom_size();
        let prg_start = HEADER_SIZE;
        let prg_end = prg_start + prg_size;
        if bytes.len() < prg_end {
            return Err(Error::InvalidRom(format!(
                "PRG-ROM truncated: expected {prg_size} bytes after header, got {}",
                bytes.len().saturating_sub(prg_start)
            )));
        }
        let prg_rom = bytes[prg_start..prg_end].to_vec();

        let chr_is_ram = header.chr_rom_units == 0;
        let chr = if chr_is_ram {
            vec![0u8; CHR_BANK_SIZE]
        } else {
            let chr_size = header.chr_rom_size();
            let chr_start = prg_end;
            let chr_end = chr_start + chr_size;
            if bytes.len() < chr_end {
                return Err(Error::InvalidRom(format!(
                    "CHR-ROM truncated: expected {chr_size} bytes after PRG-ROM, got {}",
                    bytes.len().saturating_sub(chr_start)
                )));
            }
            bytes[chr_start..chr_end].to_vec()
        };

        Ok(Cartridge {
            header,
            prg_rom,
            chr,
            chr_is_ram,
        })
    }

    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path.as_ref())
            .map_err(|e| Error::InvalidRom(format!("could not read {:?}: {e}", path.as_ref())))?;
        Self::from_ines_bytes(&bytes)
    }

    pub fn mirroring(&self) -> Mirroring {
        self.header.mirroring
    }

    /// The cartridge's full CHR image, for copying into the PPU's own
    /// pattern-table memory when the cartridge is loaded onto the bus.
    pub fn chr_data(&self) -> &[u8] {
        &self.chr
    }

    /// Whether the CHR image above is writable (CHR-RAM) or fixed (CHR-ROM).
    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    /// Read from CPU cartridge space (0x4020..=0xFFFF). Only the PRG-ROM
    /// window (0x8000..=0xFFFF) is backed; anything below reads open bus
    /// as zero, since this core targets the trivial fixed mapping with no
    /// cartridge-resident RAM or registers below 0x8000.
    pub fn read_prg(&self, addr: u16) -> u8 {
        if addr < 0x8000 || self.prg_rom.is_empty() {
            return 0;
        }
        let offset = (addr - 0x8000) as usize;
        let offset = if self.prg_rom.len() == PRG_BANK_SIZE {
            offset % PRG_BANK_SIZE
        } else {
            offset % self.prg_rom.len()
        };
        self.prg_rom[offset]
    }

    /// Writes to PRG space are a no-op: no bank-switching registers exist
    /// in the trivial fixed mapping this core supports.
    pub fn write_prg(&mut self, _addr: u16, _value: u8) {}

    /// Read from PPU pattern-table space (0x0000..=0x1FFF).
    pub fn read_chr(&self, addr: u16) -> u8 {
        let offset = addr as usize % self.chr.len().max(1);
        self.chr.get(offset).copied().unwrap_or(0)
    }

    /// Write to PPU pattern-table space. Only effective for CHR-RAM
    /// cartridges; CHR-ROM writes are dropped.
    pub fn write_chr(&mut self, addr: u16, value: u8) {
        if !self.chr_is_ram {
            return;
        }
        let len = self.chr.len();
        if len == 0 {
            return;
        }
        self.chr[addr as usize % len] = value;
    }
}

impl Default for Cartridge {
    /// An empty cartridge: all PRG/CHR reads return 0. Useful for unit
    /// tests that exercise the bus/CPU without a ROM loaded.
    fn default() -> Self {
        Cartridge {
            header: INesHeader {
                prg_rom_units: 0,
                chr_rom_units: 0,
                mirroring: Mirroring::Horizontal,
                is_nes2: false,
            },
            prg_rom: Vec::new(),
            chr: vec![0u8; CHR_BANK_SIZE],
            chr_is_ram: true,
        }
    }
}
