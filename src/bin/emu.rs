use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey},
    window::{Window, WindowId},
};

use chip8_vm::{
    sched::Runner,
    u4,
    vm::{Chip8, DISPLAY_X, DISPLAY_Y, Display, Quirks},
};

const WINDOW_SCALE: u32 = 10;
const WINDOW_TITLE: &str = "chip8-vm";

const PIXEL_ON: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const PIXEL_OFF: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// Physical key for each CHIP-8 keypad key 0x0-0xF.
///
/// The left-hand block 1234/QWER/ASDF/ZXCV maps to the COSMAC VIP hex layout.
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x0
    KeyCode::Digit1, // 0x1
    KeyCode::Digit2, // 0x2
    KeyCode::Digit3, // 0x3
    KeyCode::KeyQ,   // 0x4
    KeyCode::KeyW,   // 0x5
    KeyCode::KeyE,   // 0x6
    KeyCode::KeyA,   // 0x7
    KeyCode::KeyS,   // 0x8
    KeyCode::KeyD,   // 0x9
    KeyCode::KeyZ,   // 0xA
    KeyCode::KeyC,   // 0xB
    KeyCode::Digit4, // 0xC
    KeyCode::KeyR,   // 0xD
    KeyCode::KeyF,   // 0xE
    KeyCode::KeyV,   // 0xF
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,

    runner: Runner,
    /// Used for delta time calculation between redraws.
    last_frame_instant: Instant,
    /// Whether the window title currently shows the beep marker.
    beep_shown: bool,

    /// Result to return from main once the event loop winds down.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(rom: &[u8], quirks: Quirks, cpu_hz: u32) -> anyhow::Result<Self> {
        let mut chip8 = Chip8::with_quirks(quirks);
        chip8
            .load(rom)
            .context("Failed to load ROM into CHIP-8 memory")?;

        Ok(Self {
            pixels: None,
            window: None,
            runner: Runner::with_cpu_hz(chip8, cpu_hz),
            last_frame_instant: Instant::now(),
            beep_shown: false,
            exit_result: Ok(()),
        })
    }

    /// Copies the framebuffer into the pixel surface.
    fn paint_display(pixels: &mut Pixels<'_>, display: &Display) {
        for (i, pxl) in pixels.frame_mut().chunks_exact_mut(4).enumerate() {
            let x = i % DISPLAY_X;
            let y = i / DISPLAY_X;

            pxl.copy_from_slice(if display[y][x] { &PIXEL_ON } else { &PIXEL_OFF });
        }
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let size = LogicalSize::new(
                DISPLAY_X as u32 * WINDOW_SCALE,
                DISPLAY_Y as u32 * WINDOW_SCALE,
            );
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title(WINDOW_TITLE)
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());

        let mut pixels = Pixels::new(DISPLAY_X as u32, DISPLAY_Y as u32, surface_texture)
            .context("Failed to create pixels surface")?;

        Self::paint_display(&mut pixels, &self.runner.chip8().display);

        self.window = Some(window.clone());
        self.pixels = Some(pixels);
        window.request_redraw();

        // Avoid a large first delta time
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        let (Some(pixels), Some(window)) = (self.pixels.as_mut(), self.window.as_ref()) else {
            return Ok(());
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                pixels
                    .resize_surface(size.width, size.height)
                    .context("Failed to resize pixels surface")?;
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame_instant).as_secs_f32();
                self.last_frame_instant = now;

                self.runner.update(dt).context("CHIP-8 execution fault")?;

                let chip8 = self.runner.chip8_mut();
                if chip8.draw_flag {
                    chip8.draw_flag = false;
                    Self::paint_display(pixels, &chip8.display);
                }

                // No audio backend; surface the sound timer in the title.
                let beeping = self.runner.should_beep();
                if beeping != self.beep_shown {
                    self.beep_shown = beeping;
                    window.set_title(if beeping { "chip8-vm ♪" } else { WINDOW_TITLE });
                }

                pixels.render().context("Pixels render error")?;

                window.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                    let pressed = event.state == ElementState::Pressed;
                    self.runner.chip8_mut().set_key(u4::new(key as u8), pressed);
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

/// Windowed CHIP-8 emulator.
///
/// Keys 1-4, Q-R, A-F, Z-V map to the hex keypad. Escape exits.
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

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app =
        App::new(&rom, args.quirks(), args.cpu_hz).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    app.exit_result
}
