use crate::u4;
use crate::vm::{
    AluOp, Chip8, Chip8Error, DISPLAY_X, DISPLAY_Y, FONT_GLYPH_SIZE, FONT_START_ADDRESS, Opcode,
    STACK_SIZE,
};

impl Chip8 {
    /// Executes one decoded instruction.
    ///
    /// `pc` is advanced by 2 up front, so a conditional skip is one more
    /// advance and a jump is a plain overwrite.
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<(), Chip8Error> {
        self.pc = self.pc.wrapping_add(2);

        match opcode {
            Opcode::ClearScreen => {
                self.display = [[false; DISPLAY_X]; DISPLAY_Y];
                self.draw_flag = true;
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::JumpOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                if self.sp as usize == STACK_SIZE {
                    return Err(Chip8Error::StackOverflow { pc: self.current_pc() });
                }
                self.stack[self.sp as usize] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            Opcode::Return => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow { pc: self.current_pc() });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
            }
            Opcode::SkipEqImm { x, nn } => {
                if self.v[x] == nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipNeImm { x, nn } => {
                if self.v[x] != nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipEqReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipNeReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::LoadImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::LoadIndex { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndex { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Rand { x, nn } => {
                let byte: u8 = rand::random();
                self.v[x] = byte & nn;
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n)?;
            }
            Opcode::SkipKeyPressed { x } => {
                if self.keypad[u4::from_low(self.v[x])] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipKeyReleased { x } => {
                if !self.keypad[u4::from_low(self.v[x])] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::WaitKey { x } => {
                self.execute_wait_key(x);
            }
            Opcode::LoadDelay { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::StoreDelay { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::StoreSound { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::FontAddr { x } => {
                let digit = self.v[x] & 0x0F;
                self.i = (FONT_START_ADDRESS + digit as usize * FONT_GLYPH_SIZE) as u16;
            }
            Opcode::StoreBcd { x } => {
                let value = self.v[x];
                *self.mem_get(self.i)? = value / 100;
                *self.mem_get(self.i.wrapping_add(1))? = value / 10 % 10;
                *self.mem_get(self.i.wrapping_add(2))? = value % 10;
            }
            Opcode::SaveRegs { x } => {
                for idx in 0..=usize::from(x) {
                    *self.mem_get(self.i.wrapping_add(idx as u16))? = self.v[idx];
                }
                if self.quirks.save_load_advances_i {
                    self.i = self.i.wrapping_add(u16::from(x) + 1);
                }
            }
            Opcode::RestoreRegs { x } => {
                for idx in 0..=usize::from(x) {
                    self.v[idx] = *self.mem_get(self.i.wrapping_add(idx as u16))?;
                }
                if self.quirks.save_load_advances_i {
                    self.i = self.i.wrapping_add(u16::from(x) + 1);
                }
            }
            Opcode::Invalid(opcode) => {
                return Err(Chip8Error::InvalidOpcode {
                    opcode,
                    pc: self.current_pc(),
                });
            }
        }

        Ok(())
    }

    /// Address of the instruction currently executing, after the up-front
    /// advance.
    fn current_pc(&self) -> u16 {
        self.pc.wrapping_sub(2)
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        match op {
            AluOp::Assign => self.v[x] = self.v[y],
            AluOp::Or => {
                self.v[x] |= self.v[y];
                if self.quirks.logic_clears_vf {
                    self.v[0xF] = 0;
                }
            }
            AluOp::And => {
                self.v[x] &= self.v[y];
                if self.quirks.logic_clears_vf {
                    self.v[0xF] = 0;
                }
            }
            AluOp::Xor => {
                self.v[x] ^= self.v[y];
                if self.quirks.logic_clears_vf {
                    self.v[0xF] = 0;
                }
            }
            AluOp::Add => {
                let (res, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = carry as u8;
            }
            AluOp::Sub => {
                let (res, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = res;
                // VF holds "no borrow"
                self.v[0xF] = !borrow as u8;
            }
            AluOp::SubRev => {
                let (res, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = res;
                self.v[0xF] = !borrow as u8;
            }
            AluOp::Shr => {
                let src = if self.quirks.shift_reads_vy {
                    self.v[y]
                } else {
                    self.v[x]
                };
                self.v[0xF] = src & 1;
                self.v[x] = src >> 1;
            }
            AluOp::Shl => {
                let src = if self.quirks.shift_reads_vy {
                    self.v[y]
                } else {
                    self.v[x]
                };
                self.v[0xF] = (src >> 7) & 1;
                self.v[x] = src << 1;
            }
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<(), Chip8Error> {
        let x_pos = self.v[x] as usize % DISPLAY_X;
        let y_pos = self.v[y] as usize % DISPLAY_Y;

        // Sprites are clipped at the display edges, not wrapped.
        let rows = usize::from(n).min(DISPLAY_Y - y_pos);
        let cols = 8.min(DISPLAY_X - x_pos);

        let mut collision = false;
        for row in 0..rows {
            let sprite_byte = *self.mem_get(self.i.wrapping_add(row as u16))?;

            for col in 0..cols {
                // MSB is the leftmost pixel
                if sprite_byte & (0x80 >> col) != 0 {
                    let pixel = &mut self.display[y_pos + row][x_pos + col];
                    *pixel ^= true;
                    collision |= !*pixel;
                }
            }
        }

        self.v[0xF] = collision as u8;
        self.draw_flag = true;

        Ok(())
    }

    /// FX0A blocks the instruction stream only: the instruction re-runs every
    /// cycle until a key is down, so the host input path keeps being polled.
    fn execute_wait_key(&mut self, x: u4) {
        if let Some(key) = self.keypad.iter().position(|&pressed| pressed) {
            self.v[x] = key as u8;
        } else {
            self.pc = self.pc.wrapping_sub(2);
        }
    }
}
