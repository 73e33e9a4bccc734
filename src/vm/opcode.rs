use crate::u4;

/// A decoded CHIP-8 instruction.
///
/// The fields carry the operands encoded in the raw opcode: `x`/`y` are
/// register selectors, `n` a 4-bit immediate, `nn` an 8-bit immediate and
/// `nnn` a 12-bit address.
pub enum Opcode {
    /// 00E0 - Clear the display.
    ClearScreen,
    /// 00EE - Return from a subroutine.
    Return,

    /// 1NNN - Jump to address NNN.
    Jump { nnn: u16 },
    /// BNNN - Jump to address NNN + V0.
    JumpOffset { nnn: u16 },
    /// 2NNN - Call the subroutine at NNN.
    Call { nnn: u16 },

    /// 3XNN - Skip the next instruction if VX == NN.
    SkipEqImm { x: u4, nn: u8 },
    /// 4XNN - Skip the next instruction if VX != NN.
    SkipNeImm { x: u4, nn: u8 },
    /// 5XY0 - Skip the next instruction if VX == VY.
    SkipEqReg { x: u4, y: u4 },
    /// 9XY0 - Skip the next instruction if VX != VY.
    SkipNeReg { x: u4, y: u4 },

    /// 6XNN - Set VX = NN.
    LoadImm { x: u4, nn: u8 },
    /// 7XNN - Set VX = VX + NN (no carry flag).
    AddImm { x: u4, nn: u8 },
    /// ANNN - Set I = NNN.
    LoadIndex { nnn: u16 },
    /// FX1E - Set I = I + VX.
    AddIndex { x: u4 },

    /// 8XYn - Register-register arithmetic and logic.
    Alu { x: u4, y: u4, op: AluOp },
    /// CXNN - Set VX to a random byte masked with NN.
    Rand { x: u4, nn: u8 },

    /// DXYN - XOR an N-row sprite from memory[I..] at (VX, VY).
    Draw { x: u4, y: u4, n: u4 },

    /// EX9E - Skip the next instruction if key VX is pressed.
    SkipKeyPressed { x: u4 },
    /// EXA1 - Skip the next instruction if key VX is not pressed.
    SkipKeyReleased { x: u4 },
    /// FX0A - Wait for a key press and store the key in VX.
    WaitKey { x: u4 },

    /// FX07 - Set VX to the delay timer.
    LoadDelay { x: u4 },
    /// FX15 - Set the delay timer to VX.
    StoreDelay { x: u4 },
    /// FX18 - Set the sound timer to VX.
    StoreSound { x: u4 },

    /// FX29 - Point I at the built-in sprite for hex digit VX.
    FontAddr { x: u4 },
    /// FX33 - Store the decimal digits of VX at memory[I..I+3].
    StoreBcd { x: u4 },

    /// FX55 - Copy V0..=VX into memory starting at I.
    SaveRegs { x: u4 },
    /// FX65 - Copy memory starting at I into V0..=VX.
    RestoreRegs { x: u4 },

    /// Decode gap: no instruction has this encoding.
    Invalid(u16),
}

/// Operation selector for the 8XYn instruction group.
pub enum AluOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    SubRev,
    Shr,
    Shl,
}

impl Opcode {
    /// Decodes a raw 16-bit opcode.
    ///
    /// Dispatch follows the two-level table structure of the instruction set:
    /// most top nibbles map one-to-one, while groups 0, 8, E and F select the
    /// handler by their low byte or low nibble. Encodings with no handler
    /// decode to [`Opcode::Invalid`] and fault when executed.
    pub fn decode(opcode: u16) -> Self {
        let nibble = (
            ((opcode >> 12) & 0xF) as u8,
            ((opcode >> 8) & 0xF) as u8,
            ((opcode >> 4) & 0xF) as u8,
            (opcode & 0xF) as u8,
        );

        let x = u4::new(nibble.1);
        let y = u4::new(nibble.2);
        let n = u4::new(nibble.3);
        let nn = (opcode & 0x00FF) as u8;
        let nnn = opcode & 0x0FFF;

        match (nibble.0, nibble.1, nibble.2, nibble.3) {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x1, _, _, _) => Opcode::Jump { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, _, _, _) => Opcode::SkipEqImm { x, nn },
            (0x4, _, _, _) => Opcode::SkipNeImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SkipEqReg { x, y },
            (0x6, _, _, _) => Opcode::LoadImm { x, nn },
            (0x7, _, _, _) => Opcode::AddImm { x, nn },
            (0x8, _, _, _) => Opcode::Alu {
                x,
                y,
                op: match nibble.3 {
                    0x0 => AluOp::Assign,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::Shr,
                    0x7 => AluOp::SubRev,
                    0xE => AluOp::Shl,
                    _ => return Opcode::Invalid(opcode),
                },
            },
            (0x9, _, _, 0x0) => Opcode::SkipNeReg { x, y },
            (0xA, _, _, _) => Opcode::LoadIndex { nnn },
            (0xB, _, _, _) => Opcode::JumpOffset { nnn },
            (0xC, _, _, _) => Opcode::Rand { x, nn },
            (0xD, _, _, _) => Opcode::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Opcode::SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => Opcode::SkipKeyReleased { x },
            (0xF, _, 0x0, 0x7) => Opcode::LoadDelay { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Opcode::StoreDelay { x },
            (0xF, _, 0x1, 0x8) => Opcode::StoreSound { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Opcode::FontAddr { x },
            (0xF, _, 0x3, 0x3) => Opcode::StoreBcd { x },
            (0xF, _, 0x5, 0x5) => Opcode::SaveRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::RestoreRegs { x },

            _ => Opcode::Invalid(opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operand_fields() {
        match Opcode::decode(0x3A5C) {
            Opcode::SkipEqImm { x, nn } => {
                assert_eq!(x, u4::new(0xA));
                assert_eq!(nn, 0x5C);
            }
            _ => panic!("expected SkipEqImm"),
        }

        match Opcode::decode(0xB123) {
            Opcode::JumpOffset { nnn } => assert_eq!(nnn, 0x123),
            _ => panic!("expected JumpOffset"),
        }

        match Opcode::decode(0xD12F) {
            Opcode::Draw { x, y, n } => {
                assert_eq!(x, u4::new(1));
                assert_eq!(y, u4::new(2));
                assert_eq!(n, u4::new(0xF));
            }
            _ => panic!("expected Draw"),
        }
    }

    #[test]
    fn decodes_secondary_selectors() {
        assert!(matches!(Opcode::decode(0x00E0), Opcode::ClearScreen));
        assert!(matches!(Opcode::decode(0x00EE), Opcode::Return));
        assert!(matches!(
            Opcode::decode(0x8127),
            Opcode::Alu { op: AluOp::SubRev, .. }
        ));
        assert!(matches!(Opcode::decode(0xE29E), Opcode::SkipKeyPressed { .. }));
        assert!(matches!(Opcode::decode(0xE2A1), Opcode::SkipKeyReleased { .. }));
        assert!(matches!(Opcode::decode(0xF265), Opcode::RestoreRegs { .. }));
    }

    #[test]
    fn unmapped_encodings_decode_to_invalid() {
        // One gap per secondary table, plus a bad 5XYn variant.
        for raw in [0x0123, 0x00E1, 0x5121, 0x8008, 0x812F, 0x9ab1, 0xE19F, 0xE1A2, 0xF0FF] {
            assert!(
                matches!(Opcode::decode(raw), Opcode::Invalid(op) if op == raw),
                "{raw:#06X} should not decode"
            );
        }
    }
}
