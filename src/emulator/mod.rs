// Emulator module - Main emulator coordinator
//
// This module provides the main emulator interface: it owns the MPU and the
// bus (which in turn owns RAM, the PPU, and the cartridge) and implements
// the frame scheduler that alternates MPU instructions against PPU
// scanlines at the right ratio, polling for NMI delivery at scanline
// boundaries the way real hardware raises it between instructions.

mod config;

pub use config::EmulatorConfig;

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::error::Error;
use std::path::{Path, PathBuf};

/// Approximate CPU cycles per PPU scanline (341 PPU dots / 3 dots per CPU
/// cycle). This core ticks the PPU scanline-at-a-time rather than
/// dot-at-a-time, so the ratio is tracked as a cycle debt rather than
/// walked cycle-by-cycle.
const CPU_CYCLES_PER_SCANLINE: u32 = 113;

/// The result of running the emulator for one MPU instruction or one frame:
/// either it completed normally, or the MPU hit an unhandled fault (an
/// unofficial opcode) that the caller should report and stop on.
pub type StepResult<T> = Result<T, EmulatorFault>;

/// An MPU fault the emulator cannot recover from: the program counter and
/// opcode at the point of the fault, captured so the caller can report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatorFault {
    pub pc: u16,
    pub opcode: u8,
}

/// Main emulator structure.
///
/// Coordinates the MPU and the bus, and drives the frame scheduler.
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    config: EmulatorConfig,
    rom_path: Option<PathBuf>,
    /// CPU cycles accumulated since the last scanline tick.
    scanline_cycle_debt: u32,
}

impl Emulator {
    /// Create a new emulator instance, power-on state, no cartridge loaded.
    ///
    /// # Example
    ///
    /// ```
    /// use nescore::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// ```
    pub fn new() -> Self {
        Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            config: EmulatorConfig::new(),
            rom_path: None,
            scanline_cycle_debt: 0,
        }
    }

    pub fn with_config(config: EmulatorConfig) -> Self {
        Emulator {
            config,
            ..Self::new()
        }
    }

    /// Load a ROM file and reset the emulator to begin executing it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nescore::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.load_rom("game.nes").expect("failed to load ROM");
    /// ```
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.bus.load_cartridge(cartridge);
        self.rom_path = Some(path.to_path_buf());
        self.reset();
        Ok(())
    }

    /// Reset the MPU, the PPU, and the scheduler's cycle debt, as if
    /// pressing the reset button.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.bus.ppu_mut().reset();
        self.scanline_cycle_debt = 0;
    }

    /// Execute a single MPU instruction, advancing the PPU by whatever
    /// number of scanlines the instruction's cycles accumulate to, and
    /// delivering a pending NMI after each scanline tick.
    ///
    /// Returns `Ok(cycles)` consumed by the instruction. RTI is not a
    /// fault: it surfaces from `Cpu::step` as `Error::ReturnFromInterrupt`
    /// purely so callers that care (an instruction trace, say) can observe
    /// it, and is folded back into a normal `Ok` here. Any other MPU error
    /// is an unhandled fault (currently: an unofficial opcode).
    pub fn step_instruction(&mut self) -> StepResult<u8> {
        let fetch_pc = self.cpu.pc;
        let cycles = match self.cpu.step(&mut self.bus) {
            Ok(cycles) => cycles,
            Err(Error::ReturnFromInterrupt) => 6, // RTI's fixed cycle count
            Err(Error::EndOfExecution { opcode, pc }) => {
                return Err(EmulatorFault { pc, opcode });
            }
            Err(_) => {
                return Err(EmulatorFault {
                    pc: fetch_pc,
                    opcode: self.bus.read(fetch_pc),
                });
            }
        };

        self.advance_ppu(cycles as u32);
        Ok(cycles)
    }

    /// Run the MPU until a full PPU frame (scanline 261 wrapping back to 0)
    /// has completed, or a fault is hit.
    pub fn run_frame(&mut self) -> StepResult<()> {
        let starting_frame = self.bus.ppu().frame_count();
        while self.bus.ppu().frame_count() == starting_frame {
            self.step_instruction()?;
        }
        Ok(())
    }

    /// Advance the PPU by one scanline for every `CPU_CYCLES_PER_SCANLINE`
    /// cycles of debt accumulated, polling for and delivering a pending NMI
    /// after each tick.
    fn advance_ppu(&mut self, cpu_cycles: u32) {
        self.scanline_cycle_debt += cpu_cycles;
        while self.scanline_cycle_debt >= CPU_CYCLES_PER_SCANLINE {
            self.scanline_cycle_debt -= CPU_CYCLES_PER_SCANLINE;
            self.bus.ppu_mut().tick_scanline();
            if self.bus.poll_nmi() {
                self.cpu.nmi(&mut self.bus);
            }
        }
    }

    /// Reference to the MPU.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable reference to the MPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Reference to the bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Reference to configuration.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Mutable reference to configuration.
    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    /// The currently loaded ROM's path, if any.
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
