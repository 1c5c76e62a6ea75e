// NES Emulator Library
// Core library for the NES emulator implementation

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod display;
pub mod emulator;
pub mod error;
pub mod ppu;
pub mod ram;

// Re-export main types for convenience
pub use bus::{Bus, MemoryMappedDevice};
pub use cartridge::{Cartridge, INesHeader, Mirroring};
pub use cpu::Cpu;
pub use debug::{
    disassemble_count, disassemble_instruction, disassemble_range, CpuDebugger, CpuState,
    Debugger, DisassembledInstruction, LogLevel, Logger, MemoryRegion, MemoryViewer, PpuDebugger,
    PpuState, SpriteInfo, TraceEntry,
};
pub use display::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use emulator::{Emulator, EmulatorConfig};
pub use error::Error;
pub use ppu::Ppu;
pub use ram::Ram;
