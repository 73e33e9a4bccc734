//! Real-time scheduling and the seams to the host.
//!
//! The machine core never talks to a window, a keyboard or the OS clock
//! directly. Each of those concerns is one trait here, implemented by the
//! frontends (and by deterministic fakes in tests).

mod host;
mod runner;

pub use host::*;
pub use runner::*;

use std::time::Duration;

use crate::vm::{Display, Keypad};

/// Whether the run loop should keep going after an input poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputControl {
    Continue,
    Stop,
}

/// Host input collaborator.
///
/// Polled once per outer loop iteration; updates the pressed-key state and
/// returns the termination signal. This is the only way the loop ends short
/// of an execution fault.
pub trait InputSource {
    fn poll(&mut self, keypad: &mut Keypad) -> InputControl;
}

/// Host render collaborator. Receives the framebuffer whenever it changed
/// since the last frame, at most once per timer period.
pub trait RenderTarget {
    fn present(&mut self, display: &Display);
}

/// Monotonic clock. Injected so the scheduler can be driven by a simulated
/// clock in tests.
pub trait Clock {
    /// Time elapsed since some fixed origin.
    fn now(&self) -> Duration;
}

/// Blocking sleep primitive, the run loop's only suspension point.
pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}
