use crate::u4;
use crate::vm::{
    Chip8Error, DISPLAY_X, DISPLAY_Y, Display, FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, Keypad,
    Opcode, Quirks,
};

/// ROMs are loaded at this address; everything below is reserved.
pub const ROM_START_ADDRESS: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
/// Depth of the return-address stack.
pub const STACK_SIZE: usize = 16;

/// CHIP-8 machine state.
///
/// A plain data aggregate: all behavior beyond fetch and the timer tick lives
/// in the instruction handlers, and the whole struct is owned by a single run
/// loop at a time.
pub struct Chip8 {
    pub memory: [u8; MEMORY_SIZE],
    /// 64x32 monochrome framebuffer, mutated only by 00E0 and DXYN.
    pub display: Display,
    /// Set when the framebuffer changed since it was last presented.
    pub draw_flag: bool,

    /// Program counter, address of the next instruction to fetch.
    pub pc: u16,
    /// Index register, conventionally a 12-bit memory address.
    pub i: u16,
    /// General-purpose registers V0-VF. VF doubles as the
    /// carry/borrow/collision flag.
    pub v: [u8; 16],
    /// Bounded return-address stack; `sp` indexes the next free slot.
    pub stack: [u16; STACK_SIZE],
    pub sp: u8,

    /// Decrements at 60Hz until it reaches 0.
    pub delay_timer: u8,
    /// Decrements at 60Hz; a beep should play while non-zero.
    pub sound_timer: u8,

    /// Keypad state, written by the host input collaborator.
    pub keypad: Keypad,

    pub quirks: Quirks,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        Chip8 {
            memory: [0; MEMORY_SIZE],
            display: [[false; DISPLAY_X]; DISPLAY_Y],
            draw_flag: false,
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
            quirks,
        }
    }

    /// Loads the font set and a ROM image into memory.
    ///
    /// An image that does not fit between the ROM start address and the end
    /// of memory is rejected without partial loading.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);

        let rom_end = ROM_START_ADDRESS + rom.len();
        self.memory
            .get_mut(ROM_START_ADDRESS..rom_end)
            .ok_or(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size: MEMORY_SIZE - ROM_START_ADDRESS,
            })?
            .copy_from_slice(rom);

        self.pc = ROM_START_ADDRESS as u16;

        Ok(())
    }

    /// Runs one fetch-decode-execute step.
    pub fn cpu_cycle(&mut self) -> Result<(), Chip8Error> {
        let opcode = self.fetch()?;
        let decoded = Opcode::decode(opcode);
        self.execute(decoded)
    }

    /// Counts both timers down toward zero. Called at 60Hz by the scheduler.
    pub fn timers_cycle(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// True while the sound timer is running.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    /// Sets the pressed state of one keypad key.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    /// Fetches the big-endian 16-bit opcode at `pc`. Does not advance `pc`;
    /// the handlers own that.
    fn fetch(&mut self) -> Result<u16, Chip8Error> {
        let high = *self.mem_get(self.pc)?;
        let low = *self.mem_get(self.pc.wrapping_add(1))?;

        Ok(u16::from_be_bytes([high, low]))
    }

    /// Bounds-checked access to one memory cell. An address past the end of
    /// memory indicates a ROM or decoder bug and faults instead of wrapping.
    pub(crate) fn mem_get(&mut self, addr: u16) -> Result<&mut u8, Chip8Error> {
        self.memory
            .get_mut(addr as usize)
            .ok_or(Chip8Error::MemoryOutOfBounds { address: addr })
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
