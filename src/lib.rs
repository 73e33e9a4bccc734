//! CHIP-8 virtual machine with an accumulator-paced scheduler.
//!
//! The [`vm`] module holds the machine state, the opcode decoder and the
//! instruction handlers. The [`sched`] module paces execution against
//! wall-clock time and talks to the host through injected input, render,
//! clock and sleep collaborators, so the whole machine can be driven by a
//! simulated clock in tests.

mod nibble;

pub mod sched;
pub mod vm;

pub use nibble::u4;
