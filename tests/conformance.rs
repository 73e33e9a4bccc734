//! Whole-machine tests: small programs assembled into ROM images and run
//! through the public API.

use chip8_vm::vm::{Chip8, Chip8Error, DISPLAY_X, MEMORY_SIZE, ROM_START_ADDRESS};

/// Assembles a sequence of opcode words into a big-endian ROM image.
fn rom(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Boots a machine with the given program loaded.
fn boot(words: &[u16]) -> Chip8 {
    let mut chip = Chip8::new();
    chip.load(&rom(words)).unwrap();
    chip
}

fn step(chip: &mut Chip8, cycles: usize) {
    for _ in 0..cycles {
        chip.cpu_cycle().unwrap();
    }
}

#[test]
fn register_arithmetic_program_sets_carry() {
    // V0 = 0xFF; V1 = 0x01; V0 += V1
    let mut chip = boot(&[0x60FF, 0x6101, 0x8014]);
    step(&mut chip, 3);

    assert_eq!(chip.v[0], 0x00);
    assert_eq!(chip.v[0xF], 1);
    assert_eq!(chip.pc, 0x206);
}

#[test]
fn double_draw_restores_background_and_reports_collision() {
    // V0 = 5; V1 = 6; I = 0x20A; draw the same 8x1 sprite twice
    let mut chip = boot(&[0x6005, 0x6106, 0xA20A, 0xD011, 0xD011, 0xFF00]);
    step(&mut chip, 4);

    assert!(chip.display[6][5..13].iter().all(|&p| p));
    assert_eq!(chip.v[0xF], 0);

    let before: Vec<bool> = chip.display.iter().flatten().copied().collect();
    step(&mut chip, 1);
    let after: Vec<bool> = chip.display.iter().flatten().copied().collect();

    assert_eq!(chip.v[0xF], 1);
    assert!(after.iter().all(|&p| !p));
    assert_ne!(before, after);
}

#[test]
fn bcd_program_decomposes_into_digits() {
    // V2 = 156; I = 0x300; store BCD
    let mut chip = boot(&[0x629C, 0xA300, 0xF233]);
    step(&mut chip, 3);

    assert_eq!(&chip.memory[0x300..0x303], &[1, 5, 6]);
}

#[test]
fn save_restore_round_trip_preserves_registers() {
    // Fill V0..V3, save, clobber, restore
    let mut chip = boot(&[
        0x6011, 0x6122, 0x6233, 0x6344, // V0..V3
        0xA400, 0xF355, // I = 0x400; save V0..=V3
        0x6000, 0x6100, 0x6200, 0x6300, // clobber
        0xF365, // restore V0..=V3
    ]);
    step(&mut chip, 11);

    assert_eq!(&chip.v[..4], &[0x11, 0x22, 0x33, 0x44]);
    // Default quirks: I is left where ANNN put it.
    assert_eq!(chip.i, 0x400);
}

#[test]
fn call_and_return_restore_pc_and_sp() {
    // 0x200: call 0x204; 0x202: spin; 0x204: return
    let mut chip = boot(&[0x2204, 0x1202, 0x00EE]);

    step(&mut chip, 1);
    assert_eq!(chip.pc, 0x204);
    assert_eq!(chip.sp, 1);

    step(&mut chip, 1);
    assert_eq!(chip.pc, 0x202);
    assert_eq!(chip.sp, 0);
}

#[test]
fn recursion_without_return_overflows_the_stack() {
    // 0x200: call 0x200
    let mut chip = boot(&[0x2200]);

    for _ in 0..16 {
        chip.cpu_cycle().unwrap();
    }
    assert_eq!(
        chip.cpu_cycle(),
        Err(Chip8Error::StackOverflow { pc: 0x200 })
    );
}

#[test]
fn key_state_selects_the_skip_branch() {
    // Skip-if-pressed on key V0 = 0xA, then two landing slots
    let mut chip = boot(&[0x600A, 0xE09E, 0x6101, 0x6202]);

    chip.keypad[0xA] = true;
    step(&mut chip, 2);
    assert_eq!(chip.pc, 0x206);

    let mut chip = boot(&[0x600A, 0xE09E, 0x6101, 0x6202]);
    step(&mut chip, 3);
    assert_eq!(chip.v[1], 1);
}

#[test]
fn decode_gap_is_a_reported_fault() {
    let mut chip = boot(&[0x0123]);

    assert_eq!(
        chip.cpu_cycle(),
        Err(Chip8Error::InvalidOpcode {
            opcode: 0x0123,
            pc: 0x200,
        })
    );
}

#[test]
fn oversized_rom_is_rejected_before_execution() {
    let mut chip = Chip8::new();
    let max = MEMORY_SIZE - ROM_START_ADDRESS;

    let err = chip.load(&vec![0; max + 1]).unwrap_err();
    assert_eq!(
        err,
        Chip8Error::RomTooLarge {
            size: max + 1,
            max_size: max,
        }
    );
    // No partial load happened.
    assert!(chip.memory[ROM_START_ADDRESS..].iter().all(|&b| b == 0));
}

#[test]
fn font_digits_render_distinct_sprites() {
    // Draw glyph V0 at the left edge: I = sprite(V0); draw 5 rows
    let program = [0x6000, 0xF029, 0xD115, 0x1206];

    let mut lit_patterns = Vec::new();
    for digit in 0..16u16 {
        let mut chip = boot(&program);
        chip.memory[0x201] = digit as u8; // patch the 6xNN immediate
        step(&mut chip, 3);

        let pattern: Vec<bool> = chip.display[..5]
            .iter()
            .flat_map(|row| row[..8].iter().copied())
            .collect();
        assert!(pattern.iter().any(|&p| p), "digit {digit:X} drew nothing");
        lit_patterns.push(pattern);
    }

    lit_patterns.sort();
    lit_patterns.dedup();
    assert_eq!(lit_patterns.len(), 16);
}

#[test]
fn sprite_clips_at_the_right_edge() {
    // V0 = 62, V1 = 0, I = sprite data, draw one row of 0xFF
    let mut chip = boot(&[0x603E, 0x6100, 0xA208, 0xD011, 0xFF00]);
    step(&mut chip, 4);

    let lit: usize = chip.display.iter().flatten().filter(|&&p| p).count();
    assert_eq!(lit, 2);
    assert!(chip.display[0][DISPLAY_X - 2] && chip.display[0][DISPLAY_X - 1]);
}
