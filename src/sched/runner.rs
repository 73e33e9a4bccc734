use std::time::Duration;

use crate::sched::{Clock, InputControl, InputSource, RenderTarget, Sleep};
use crate::vm::{Chip8, Chip8Error};

/// Default instruction rate.
pub const CPU_HZ: u32 = 700;
/// Timer and frame rate, fixed by the platform.
pub const TIMER_HZ: u32 = 60;

/// Paces the machine against wall-clock time.
///
/// Elapsed time is collected into two accumulators and drained in whole
/// instruction and timer periods, so the emulation rate is decoupled from the
/// host loop rate: a late iteration catches up by running several
/// instructions instead of dropping cycles.
pub struct Runner {
    chip8: Chip8,

    cpu_time_step: f32,
    timer_time_step: f32,

    cpu_accumulator: f32,
    timer_accumulator: f32,
}

impl Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self::with_cpu_hz(chip8, CPU_HZ)
    }

    /// Creates a runner with a non-default instruction rate.
    pub fn with_cpu_hz(chip8: Chip8, cpu_hz: u32) -> Self {
        Self {
            chip8,
            cpu_time_step: 1.0 / cpu_hz.max(1) as f32,
            timer_time_step: 1.0 / TIMER_HZ as f32,
            cpu_accumulator: 0.0,
            timer_accumulator: 0.0,
        }
    }

    /// Advances the machine by `dt` seconds of wall-clock time.
    ///
    /// For hosts that own the outer loop (such as a windowing event loop):
    /// drains as many instruction steps and timer ticks as the elapsed time
    /// covers, leaving the remainder in the accumulators.
    pub fn update(&mut self, dt: f32) -> Result<(), Chip8Error> {
        self.cpu_accumulator += dt;
        self.timer_accumulator += dt;

        while self.cpu_accumulator >= self.cpu_time_step {
            self.cpu_accumulator -= self.cpu_time_step;
            self.chip8.cpu_cycle()?;
        }

        while self.timer_accumulator >= self.timer_time_step {
            self.timer_accumulator -= self.timer_time_step;
            self.chip8.timers_cycle();
        }

        Ok(())
    }

    /// The scheduler-owned run loop.
    ///
    /// Each iteration polls the input collaborator (whose return value is the
    /// sole termination signal), measures elapsed time, drains the
    /// instruction budget, drains the timer budget (presenting the
    /// framebuffer when it is dirty), and sleeps until the nearer of the two
    /// next-due thresholds.
    pub fn run(
        &mut self,
        input: &mut dyn InputSource,
        render: &mut dyn RenderTarget,
        clock: &dyn Clock,
        sleep: &mut dyn Sleep,
    ) -> Result<(), Chip8Error> {
        let mut last = clock.now();

        while input.poll(&mut self.chip8.keypad) == InputControl::Continue {
            let now = clock.now();
            let dt = now.saturating_sub(last).as_secs_f32();
            last = now;

            self.cpu_accumulator += dt;
            self.timer_accumulator += dt;

            while self.cpu_accumulator >= self.cpu_time_step {
                self.cpu_accumulator -= self.cpu_time_step;
                self.chip8.cpu_cycle()?;
            }

            while self.timer_accumulator >= self.timer_time_step {
                self.timer_accumulator -= self.timer_time_step;
                self.chip8.timers_cycle();

                if self.chip8.draw_flag {
                    render.present(&self.chip8.display);
                    self.chip8.draw_flag = false;
                }
            }

            let until_cpu = self.cpu_time_step - self.cpu_accumulator;
            let until_timer = self.timer_time_step - self.timer_accumulator;
            let idle = until_cpu.min(until_timer).max(0.0);
            sleep.sleep(Duration::from_secs_f32(idle));
        }

        Ok(())
    }

    /// True while the sound timer is running.
    pub fn should_beep(&self) -> bool {
        self.chip8.should_beep()
    }

    pub fn chip8(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}
