/// Behavior switches for the points where real CHIP-8 implementations
/// disagree.
///
/// The defaults match the behavior this machine was modeled on: shifts read
/// VY, register save/load leaves the index register untouched, and the logic
/// instructions do not clobber VF. ROMs written for other interpreters may
/// need different settings.
#[derive(Clone, Copy, Debug)]
pub struct Quirks {
    /// 8XY6/8XYE shift the value of VY (original COSMAC VIP). When false
    /// they shift VX in place, as on later interpreters.
    pub shift_reads_vy: bool,

    /// FX55/FX65 advance I past the copied registers (I += X + 1) when true.
    /// When false I is left unchanged.
    pub save_load_advances_i: bool,

    /// 8XY1/8XY2/8XY3 additionally reset VF to 0 (original COSMAC VIP).
    pub logic_clears_vf: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            shift_reads_vy: true,
            save_load_advances_i: false,
            logic_clears_vf: false,
        }
    }
}
