// NES Emulator - CLI front-end
//
// Loads an iNES ROM, runs it to completion (or until interrupted), and on
// an unhandled MPU fault prints a register/stack dump plus a hex/ASCII dump
// of the first kilobyte of RAM before exiting non-zero.

use clap::Parser;
use nescore::debug::{CpuDebugger, LogLevel, Logger, MemoryViewer};
use nescore::emulator::{Emulator, EmulatorConfig};
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "nescore")]
#[command(about = "A NES MPU/PPU emulation core")]
struct Cli {
    /// Path to the iNES ROM (.nes) to run
    #[arg(short = 'f', long = "file")]
    rom_path: String,

    /// Emit an instruction trace (PC, bytes, disassembly, registers, cycles)
    #[arg(short = 't', long = "trace")]
    trace: bool,

    /// Halt after each instruction, waiting for Enter on stdin to continue
    #[arg(short = 's', long = "single-step")]
    single_step: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = EmulatorConfig {
        trace: cli.trace,
        single_step: cli.single_step,
    };
    let mut emulator = Emulator::with_config(config);

    if let Err(e) = emulator.load_rom(&cli.rom_path) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let mut logger = Logger::new();
    if cli.trace {
        logger.set_log_level(LogLevel::Trace);
        logger.enable_cpu_trace();
    }

    loop {
        if cli.trace {
            let state = CpuDebugger::new().capture_state(emulator.cpu(), emulator.bus_mut());
            logger.log_cpu_state(&state);
            println!("{state}");
        }

        match emulator.step_instruction() {
            Ok(_) => {}
            Err(fault) => {
                report_fault(&mut emulator, fault.pc, fault.opcode);
                return ExitCode::FAILURE;
            }
        }

        if cli.single_step {
            print!("(nescore) ");
            io::stdout().flush().ok();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

fn report_fault(emulator: &mut Emulator, pc: u16, opcode: u8) {
    eprintln!("unhandled MPU fault: opcode 0x{opcode:02X} at 0x{pc:04X}");
    eprintln!();

    let debugger = CpuDebugger::new();
    eprintln!("{}", debugger.dump_registers(emulator.cpu()));
    eprintln!("{}", debugger.dump_stack(emulator.cpu(), emulator.bus_mut()));
    eprintln!();

    let viewer = MemoryViewer::new();
    eprintln!("{}", viewer.dump_cpu_memory(emulator.bus_mut(), 0x0000, 1024));
}
