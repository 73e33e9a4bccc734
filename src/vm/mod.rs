mod chip8;
mod execute;
mod font;
mod opcode;
mod quirks;
mod types;

pub use chip8::*;
pub use font::*;
pub use opcode::*;
pub use quirks::*;
pub use types::*;
