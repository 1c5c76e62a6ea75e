// CPU execution and trace logging module

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::OPCODE_TABLE;
use crate::cpu::Cpu;
use crate::error::Error;

impl Cpu {
    /// Execute one CPU instruction.
    ///
    /// Fetches the next opcode, decodes its addressing mode, dispatches to
    /// the instruction body, and updates the cycle counter. Returns the
    /// number of cycles consumed.
    ///
    /// An opcode byte with no documented 6502 meaning ends execution with
    /// `Error::EndOfExecution`, carrying the opcode and the PC it was
    /// fetched from. `RTI` ends execution with `Error::ReturnFromInterrupt`
    /// after performing its side effects, so a frame scheduler driving a
    /// test program through an interrupt handler can detect the return.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u8, Error> {
        let fetch_pc = self.pc;
        let opcode = bus.read(self.pc);
        let opcode_info = &OPCODE_TABLE[opcode as usize];

        if !opcode_info.official {
            return Err(Error::EndOfExecution {
                opcode,
                pc: fetch_pc,
            });
        }

        // Move PC past the opcode
        self.pc = self.pc.wrapping_add(1);

        // Calculate effective address based on addressing mode
        let addr_result = match opcode_info.mode {
            AddressingMode::Implied => self.addr_implied(),
            AddressingMode::Accumulator => self.addr_accumulator(),
            AddressingMode::Immediate => self.addr_immediate(bus),
            AddressingMode::ZeroPage => self.addr_zero_page(bus),
            AddressingMode::ZeroPageX => self.addr_zero_page_x(bus),
            AddressingMode::ZeroPageY => self.addr_zero_page_y(bus),
            AddressingMode::Relative => self.addr_relative(bus),
            AddressingMode::Absolute => self.addr_absolute(bus),
            AddressingMode::AbsoluteX => self.addr_absolute_x(bus),
            AddressingMode::AbsoluteY => self.addr_absolute_y(bus),
            AddressingMode::Indirect => self.addr_indirect(bus),
            AddressingMode::IndexedIndirect => self.addr_indexed_indirect(bus),
            AddressingMode::IndirectIndexed => self.addr_indirect_indexed(bus),
        };

        // Execute the instruction (may return extra cycles for branches)
        let extra_cycles = self.execute_instruction(opcode, &addr_result, bus);

        // Calculate actual cycles (base + page crossing penalty + branch cycles)
        let mut cycles = opcode_info.cycles;
        if opcode_info.page_cycle
            && addr_result.page_crossed
            && opcode_info.mode != AddressingMode::Relative
        {
            cycles += 1;
        }
        cycles += extra_cycles;

        // Update total cycle counter
        self.cycles = self.cycles.wrapping_add(cycles as u64);

        if opcode == 0x40 {
            return Err(Error::ReturnFromInterrupt);
        }

        Ok(cycles)
    }

    /// Execute a specific instruction based on its opcode
    /// Returns the number of extra cycles consumed (used by branch instructions)
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        opcode: u8,
        addr_result: &crate::cpu::addressing::AddressingResult,
        bus: &mut Bus,
    ) -> u8 {
        match opcode {
            // Load/Store instructions
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(bus, addr_result),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(bus, addr_result),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(bus, addr_result),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(bus, addr_result),
            0x86 | 0x96 | 0x8E => self.stx(bus, addr_result),
            0x84 | 0x94 | 0x8C => self.sty(bus, addr_result),

            // Arithmetic instructions
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(bus, addr_result),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 => self.sbc(bus, addr_result),
            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(bus, addr_result),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(bus, addr_result),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logical instructions
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(bus, addr_result),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(bus, addr_result),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(bus, addr_result),
            0x24 | 0x2C => self.bit(bus, addr_result),

            // Shift/Rotate instructions
            0x0A => self.asl(bus, addr_result, true),
            0x06 | 0x16 | 0x0E | 0x1E => self.asl(bus, addr_result, false),
            0x4A => self.lsr(bus, addr_result, true),
            0x46 | 0x56 | 0x4E | 0x5E => self.lsr(bus, addr_result, false),
            0x2A => self.rol(bus, addr_result, true),
            0x26 | 0x36 | 0x2E | 0x3E => self.rol(bus, addr_result, false),
            0x6A => self.ror(bus, addr_result, true),
            0x66 | 0x76 | 0x6E | 0x7E => self.ror(bus, addr_result, false),

            // Compare instructions
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(bus, addr_result),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, addr_result),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, addr_result),

            // Branch instructions (return extra cycles)
            0x90 => return self.bcc(bus, addr_result),
            0xB0 => return self.bcs(bus, addr_result),
            0xF0 => return self.beq(bus, addr_result),
            0x30 => return self.bmi(bus, addr_result),
            0xD0 => return self.bne(bus, addr_result),
            0x10 => return self.bpl(bus, addr_result),
            0x50 => return self.bvc(bus, addr_result),
            0x70 => return self.bvs(bus, addr_result),

            // Jump/Subroutine instructions
            0x4C | 0x6C => return self.jmp(bus, addr_result),
            0x20 => return self.jsr(bus, addr_result),
            0x60 => return self.rts(bus, addr_result),

            // Stack instructions
            0x48 => return self.pha(bus, addr_result),
            0x68 => return self.pla(bus, addr_result),
            0x08 => return self.php(bus, addr_result),
            0x28 => return self.plp(bus, addr_result),
            0x9A => self.txs(),
            0xBA => self.tsx(),

            // Transfer instructions
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),

            // Flag instructions
            0x18 => return self.clc(bus, addr_result),
            0xD8 => return self.cld(bus, addr_result),
            0x58 => return self.cli(bus, addr_result),
            0xB8 => return self.clv(bus, addr_result),
            0x38 => return self.sec(bus, addr_result),
            0xF8 => return self.sed(bus, addr_result),
            0x78 => return self.sei(bus, addr_result),

            // Miscellaneous instructions
            0x00 => return self.brk(bus, addr_result),
            0x40 => return self.rti(bus, addr_result),
            0xEA => return self.nop(bus, addr_result),

            // Every byte value with `official: true` in OPCODE_TABLE is
            // matched above; `step` already rejected anything else.
            _ => unreachable!("official opcode {opcode:#04X} has no dispatch arm"),
        }
        0 // No extra cycles for non-branch instructions
    }
}
