use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    DefaultTerminal,
    layout::Alignment,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use chip8_vm::{
    sched::{InputControl, InputSource, MonotonicClock, RenderTarget, Runner, Sleep, ThreadSleep},
    vm::{Chip8, Display, Keypad, Quirks},
};

/// Terminal character for each CHIP-8 keypad key 0x0-0xF, mirroring the
/// 1234/QWER/ASDF/ZXCV layout of the windowed frontend.
const KEY_MAP: [char; 16] = [
    'x', '1', '2', '3', 'q', 'w', 'e', 'a', 's', 'd', 'z', 'c', '4', 'r', 'f', 'v',
];

// Terminals report no key-up events on Linux, so a key counts as held until
// this long after its last press event.
const KEY_RELEASE_TIMEOUT: Duration = Duration::from_millis(50);

/// Input collaborator over crossterm events.
struct TerminalInput {
    key_press_times: [Option<Instant>; 16],
    error: Option<io::Error>,
}

impl TerminalInput {
    fn new() -> Self {
        Self {
            key_press_times: [None; 16],
            error: None,
        }
    }

    fn try_poll(&mut self, keypad: &mut Keypad) -> io::Result<InputControl> {
        let now = Instant::now();

        // Expire synthetic key releases
        for (idx, press_time) in self.key_press_times.iter_mut().enumerate() {
            if press_time.is_some_and(|time| now.duration_since(time) > KEY_RELEASE_TIMEOUT) {
                *press_time = None;
                keypad[idx] = false;
            }
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || key.code == KeyCode::Esc {
                    return Ok(InputControl::Stop);
                }

                if let KeyCode::Char(c) = key.code
                    && let Some(idx) = KEY_MAP.iter().position(|&k| k == c.to_ascii_lowercase())
                {
                    keypad[idx] = true;
                    self.key_press_times[idx] = Some(now);
                }
            }
        }

        Ok(InputControl::Continue)
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self, keypad: &mut Keypad) -> InputControl {
        match self.try_poll(keypad) {
            Ok(control) => control,
            Err(e) => {
                self.error = Some(e);
                InputControl::Stop
            }
        }
    }
}

/// Render collaborator drawing the framebuffer into the terminal.
struct TerminalDisplay {
    terminal: DefaultTerminal,
    error: Option<io::Error>,
}

impl TerminalDisplay {
    fn new(terminal: DefaultTerminal) -> Self {
        Self {
            terminal,
            error: None,
        }
    }
}

impl RenderTarget for TerminalDisplay {
    fn present(&mut self, display: &Display) {
        let result = self.terminal.draw(|frame| {
            let text: Vec<Line> = display
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|&pixel| {
                            Span::styled(if pixel { "█" } else { " " }, Style::default().green())
                        })
                        .collect()
                })
                .collect();

            let widget = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::bordered().title(" chip8-vm (Esc quits) "));

            frame.render_widget(widget, frame.area());
        });

        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

/// Terminal CHIP-8 emulator.
///
/// Keys 1-4, Q-R, A-F, Z-V map to the hex keypad. Escape or Ctrl+C exits.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Instruction rate in instructions per second
    #[arg(long, default_value_t = 700)]
    cpu_hz: u32,

    /// Shift instructions (8XY6/8XYE) operate on VX instead of VY
    #[arg(long)]
    shift_vx: bool,

    /// FX55/FX65 advance I past the copied registers
    #[arg(long)]
    advance_index: bool,

    /// Logic instructions (8XY1/8XY2/8XY3) clear VF
    #[arg(long)]
    clear_vf: bool,
}

impl Args {
    fn quirks(&self) -> Quirks {
        Quirks {
            shift_reads_vy: !self.shift_vx,
            save_load_advances_i: self.advance_index,
            logic_clears_vf: self.clear_vf,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let rom = std::fs::read(&args.rom_path).context("Failed to read ROM file")?;

    let mut chip8 = Chip8::with_quirks(args.quirks());
    chip8
        .load(&rom)
        .context("Failed to load ROM into CHIP-8 memory")?;
    let mut runner = Runner::with_cpu_hz(chip8, args.cpu_hz);

    let mut input = TerminalInput::new();
    let mut display = TerminalDisplay::new(ratatui::init());
    let clock = MonotonicClock::new();
    let mut sleep = ThreadSleep;

    // Paint the empty screen before the first draw instruction lands.
    display.present(&runner.chip8().display);

    let run_result = runner.run(&mut input, &mut display, &clock, &mut sleep);
    ratatui::restore();

    run_result.context("CHIP-8 execution fault")?;

    if let Some(e) = input.error {
        return Err(e).context("Terminal input error");
    }
    if let Some(e) = display.error {
        return Err(e).context("Terminal render error");
    }

    Ok(())
}
