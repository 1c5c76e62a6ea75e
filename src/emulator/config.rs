// Emulator configuration
//
// The host-facing settings this core still owns after dropping the
// display/audio/save-state/screenshot surface: whether to emit a
// nestest-style instruction trace and whether to halt after each
// instruction for single-stepping. Both are CLI flags (see `main.rs`),
// not a persisted settings file, so there is nothing here for a
// serialization crate to round-trip.

/// Emulator configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatorConfig {
    /// Emit a trace line (PC, bytes, disassembly, registers, cycle count)
    /// for every instruction executed.
    pub trace: bool,

    /// Halt after each instruction instead of running freely.
    pub single_step: bool,
}

impl EmulatorConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
