pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;

/// Monochrome framebuffer, row-major (true = pixel on).
pub type Display = [[bool; DISPLAY_X]; DISPLAY_Y];

/// Pressed state of the 16 hex keys 0x0-0xF.
pub type Keypad = [bool; 16];

/// Faults raised by ROM loading and instruction execution.
///
/// None of these are recoverable from inside the machine; the run loop stops
/// at the first fault and hands it to the host.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("call stack overflow at {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("return with empty call stack at {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("invalid opcode {opcode:#06X} at {pc:#05X}")]
    InvalidOpcode { opcode: u16, pc: u16 },
}
