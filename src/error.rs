// Error types shared by the core and the CLI front-end.
//
// None of these are meant to be caught and retried. `ReturnFromInterrupt`
// in particular is a control-flow sentinel, not a fault: RTI raises it so
// the frame scheduler can unwind the interrupt nesting, and it is expected
// to be matched, not logged.

use std::fmt;

/// Addressing modes an instruction handler can be invoked with.
///
/// Used only to annotate `IllegalAddressingMode`; see
/// [`crate::cpu::addressing::AddressingMode`] for the mode actually taken
/// during decode.
pub type OpcodeByte = u8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The iNES header failed validation (bad magic, truncated body).
    InvalidRom(String),

    /// A handler was invoked with an addressing mode it does not accept.
    /// Indicates a corrupt dispatch table, not a runtime condition a
    /// well-formed program can trigger.
    IllegalAddressingMode { opcode: OpcodeByte, mode: &'static str },

    /// The fetched opcode has no entry in the dispatch table. Unofficial
    /// opcodes trap here; test harnesses treat this as the program's
    /// terminator.
    EndOfExecution { opcode: OpcodeByte, pc: u16 },

    /// RTI executed. Not a fault: the frame scheduler uses this to unwind
    /// interrupt nesting. Never meant to surface to a user.
    ReturnFromInterrupt,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRom(reason) => write!(f, "invalid ROM image: {reason}"),
            Error::IllegalAddressingMode { opcode, mode } => write!(
                f,
                "illegal addressing mode: opcode 0x{opcode:02X} does not accept {mode}"
            ),
            Error::EndOfExecution { opcode, pc } => write!(
                f,
                "end of execution: unmapped opcode 0x{opcode:02X} at 0x{pc:04X}"
            ),
            Error::ReturnFromInterrupt => write!(f, "return from interrupt"),
        }
    }
}

impl std::error::Error for Error {}
