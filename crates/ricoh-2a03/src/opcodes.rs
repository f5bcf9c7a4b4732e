//! Opcode dispatch table.
//!
//! Maps each of the 256 opcode bytes to its operation, addressing mode, base
//! cycle count and timing flags. The table mirrors the fixed microcode of the
//! hardware: dispatch is a single index, never a branch cascade.
//!
//! Base cycle counts are the no-penalty costs; page crossings and taken
//! branches add ticks at execution time. Undocumented opcodes are included
//! in full; shipped cartridges depend on them.

use crate::addressing::AddrMode;

/// Operation pads one extra cycle (the multi-byte NOP family).
pub(crate) const EXTRA_CYCLE: u8 = 1 << 0;

/// Absolute-indexed / indirect-indexed addressing always performs the
/// pre-page-fix dummy read, regardless of crossing (write and
/// read-modify-write operations).
pub(crate) const DOUBLE_READ: u8 = 1 << 1;

/// Every operation the 2A03 can execute, documented or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    // Official set
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented hybrids and quirks
    Alr, Anc, Arr, Axs, Dcp, Isb, Kil, Las, Lax, Rla, Rra, Sax, Sha, Shx,
    Shy, Slo, Sre, Tas, Xaa,
}

/// One dispatch table entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpEntry {
    pub op: Op,
    pub mode: AddrMode,
    /// Base cycle count (documentation and test cross-check; actual timing
    /// falls out of the per-access ticks).
    pub cycles: u8,
    /// `EXTRA_CYCLE` / `DOUBLE_READ` timing flags.
    pub flags: u8,
}

const fn e(op: Op, mode: AddrMode, cycles: u8, flags: u8) -> OpEntry {
    OpEntry {
        op,
        mode,
        cycles,
        flags,
    }
}

pub(crate) static OPCODE_TABLE: [OpEntry; 256] = build_table();

#[allow(clippy::enum_glob_use)]
const fn build_table() -> [OpEntry; 256] {
    use AddrMode::*;
    use Op::*;

    // Placeholder overwritten below; every byte gets an explicit entry.
    let mut t = [e(Kil, Implied, 2, 0); 256];

    // No-operation family (single-, two- and three-byte forms)
    t[0xEA] = e(Nop, Implied, 2, 0);
    t[0x1A] = e(Nop, Implied, 2, 0);
    t[0x3A] = e(Nop, Implied, 2, 0);
    t[0x5A] = e(Nop, Implied, 2, 0);
    t[0x7A] = e(Nop, Implied, 2, 0);
    t[0xDA] = e(Nop, Implied, 2, 0);
    t[0xFA] = e(Nop, Implied, 2, 0);
    t[0x80] = e(Nop, Immediate, 2, EXTRA_CYCLE);
    t[0x82] = e(Nop, Immediate, 2, EXTRA_CYCLE);
    t[0x89] = e(Nop, Immediate, 2, EXTRA_CYCLE);
    t[0xC2] = e(Nop, Immediate, 2, EXTRA_CYCLE);
    t[0xE2] = e(Nop, Immediate, 2, EXTRA_CYCLE);
    t[0x04] = e(Nop, ZeroPage, 3, EXTRA_CYCLE);
    t[0x44] = e(Nop, ZeroPage, 3, EXTRA_CYCLE);
    t[0x64] = e(Nop, ZeroPage, 3, EXTRA_CYCLE);
    t[0x14] = e(Nop, ZeroPageX, 4, EXTRA_CYCLE);
    t[0x34] = e(Nop, ZeroPageX, 4, EXTRA_CYCLE);
    t[0x54] = e(Nop, ZeroPageX, 4, EXTRA_CYCLE);
    t[0x74] = e(Nop, ZeroPageX, 4, EXTRA_CYCLE);
    t[0xD4] = e(Nop, ZeroPageX, 4, EXTRA_CYCLE);
    t[0xF4] = e(Nop, ZeroPageX, 4, EXTRA_CYCLE);
    t[0x0C] = e(Nop, Absolute, 4, EXTRA_CYCLE);
    t[0x1C] = e(Nop, AbsoluteX, 4, EXTRA_CYCLE);
    t[0x3C] = e(Nop, AbsoluteX, 4, EXTRA_CYCLE);
    t[0x5C] = e(Nop, AbsoluteX, 4, EXTRA_CYCLE);
    t[0x7C] = e(Nop, AbsoluteX, 4, EXTRA_CYCLE);
    t[0xDC] = e(Nop, AbsoluteX, 4, EXTRA_CYCLE);
    t[0xFC] = e(Nop, AbsoluteX, 4, EXTRA_CYCLE);

    // Flag clear / set
    t[0x18] = e(Clc, Implied, 2, 0);
    t[0x58] = e(Cli, Implied, 2, 0);
    t[0xD8] = e(Cld, Implied, 2, 0);
    t[0xB8] = e(Clv, Implied, 2, 0);
    t[0x38] = e(Sec, Implied, 2, 0);
    t[0x78] = e(Sei, Implied, 2, 0);
    t[0xF8] = e(Sed, Implied, 2, 0);

    // Stores
    t[0x85] = e(Sta, ZeroPage, 3, 0);
    t[0x95] = e(Sta, ZeroPageX, 4, 0);
    t[0x8D] = e(Sta, Absolute, 4, 0);
    t[0x9D] = e(Sta, AbsoluteX, 5, DOUBLE_READ);
    t[0x99] = e(Sta, AbsoluteY, 5, DOUBLE_READ);
    t[0x81] = e(Sta, IndirectX, 6, 0);
    t[0x91] = e(Sta, IndirectY, 6, DOUBLE_READ);
    t[0x86] = e(Stx, ZeroPage, 3, 0);
    t[0x96] = e(Stx, ZeroPageY, 4, 0);
    t[0x8E] = e(Stx, Absolute, 4, 0);
    t[0x84] = e(Sty, ZeroPage, 3, 0);
    t[0x94] = e(Sty, ZeroPageX, 4, 0);
    t[0x8C] = e(Sty, Absolute, 4, 0);
    t[0x87] = e(Sax, ZeroPage, 3, 0);
    t[0x97] = e(Sax, ZeroPageY, 4, 0);
    t[0x8F] = e(Sax, Absolute, 4, 0);
    t[0x83] = e(Sax, IndirectX, 6, 0);
    t[0x93] = e(Sha, IndirectY, 6, DOUBLE_READ);
    t[0x9F] = e(Sha, AbsoluteY, 5, DOUBLE_READ);
    t[0x9E] = e(Shx, AbsoluteY, 5, DOUBLE_READ);
    t[0x9C] = e(Shy, AbsoluteX, 5, DOUBLE_READ);
    t[0x9B] = e(Tas, AbsoluteY, 5, DOUBLE_READ);

    // Loads
    t[0xA9] = e(Lda, Immediate, 2, 0);
    t[0xA5] = e(Lda, ZeroPage, 3, 0);
    t[0xB5] = e(Lda, ZeroPageX, 4, 0);
    t[0xAD] = e(Lda, Absolute, 4, 0);
    t[0xBD] = e(Lda, AbsoluteX, 4, 0);
    t[0xB9] = e(Lda, AbsoluteY, 4, 0);
    t[0xA1] = e(Lda, IndirectX, 6, 0);
    t[0xB1] = e(Lda, IndirectY, 5, 0);
    t[0xA2] = e(Ldx, Immediate, 2, 0);
    t[0xA6] = e(Ldx, ZeroPage, 3, 0);
    t[0xB6] = e(Ldx, ZeroPageY, 4, 0);
    t[0xAE] = e(Ldx, Absolute, 4, 0);
    t[0xBE] = e(Ldx, AbsoluteY, 4, 0);
    t[0xA0] = e(Ldy, Immediate, 2, 0);
    t[0xA4] = e(Ldy, ZeroPage, 3, 0);
    t[0xB4] = e(Ldy, ZeroPageX, 4, 0);
    t[0xAC] = e(Ldy, Absolute, 4, 0);
    t[0xBC] = e(Ldy, AbsoluteX, 4, 0);
    t[0xAB] = e(Lax, Immediate, 2, 0);
    t[0xA7] = e(Lax, ZeroPage, 3, 0);
    t[0xB7] = e(Lax, ZeroPageY, 4, 0);
    t[0xAF] = e(Lax, Absolute, 4, 0);
    t[0xBF] = e(Lax, AbsoluteY, 4, 0);
    t[0xA3] = e(Lax, IndirectX, 6, 0);
    t[0xB3] = e(Lax, IndirectY, 5, 0);
    t[0xBB] = e(Las, AbsoluteY, 4, 0);

    // Register transfers
    t[0xAA] = e(Tax, Implied, 2, 0);
    t[0xA8] = e(Tay, Implied, 2, 0);
    t[0x8A] = e(Txa, Implied, 2, 0);
    t[0x98] = e(Tya, Implied, 2, 0);
    t[0x9A] = e(Txs, Implied, 2, 0);
    t[0xBA] = e(Tsx, Implied, 2, 0);

    // Stack
    t[0x48] = e(Pha, Implied, 3, 0);
    t[0x08] = e(Php, Implied, 3, 0);
    t[0x68] = e(Pla, Implied, 4, 0);
    t[0x28] = e(Plp, Implied, 4, 0);

    // Accumulator bitwise
    t[0x29] = e(And, Immediate, 2, 0);
    t[0x25] = e(And, ZeroPage, 3, 0);
    t[0x35] = e(And, ZeroPageX, 4, 0);
    t[0x2D] = e(And, Absolute, 4, 0);
    t[0x3D] = e(And, AbsoluteX, 4, 0);
    t[0x39] = e(And, AbsoluteY, 4, 0);
    t[0x21] = e(And, IndirectX, 6, 0);
    t[0x31] = e(And, IndirectY, 5, 0);
    t[0x09] = e(Ora, Immediate, 2, 0);
    t[0x05] = e(Ora, ZeroPage, 3, 0);
    t[0x15] = e(Ora, ZeroPageX, 4, 0);
    t[0x0D] = e(Ora, Absolute, 4, 0);
    t[0x1D] = e(Ora, AbsoluteX, 4, 0);
    t[0x19] = e(Ora, AbsoluteY, 4, 0);
    t[0x01] = e(Ora, IndirectX, 6, 0);
    t[0x11] = e(Ora, IndirectY, 5, 0);
    t[0x49] = e(Eor, Immediate, 2, 0);
    t[0x45] = e(Eor, ZeroPage, 3, 0);
    t[0x55] = e(Eor, ZeroPageX, 4, 0);
    t[0x4D] = e(Eor, Absolute, 4, 0);
    t[0x5D] = e(Eor, AbsoluteX, 4, 0);
    t[0x59] = e(Eor, AbsoluteY, 4, 0);
    t[0x41] = e(Eor, IndirectX, 6, 0);
    t[0x51] = e(Eor, IndirectY, 5, 0);
    t[0x24] = e(Bit, ZeroPage, 3, 0);
    t[0x2C] = e(Bit, Absolute, 4, 0);

    // Increment / decrement
    t[0xE6] = e(Inc, ZeroPage, 5, 0);
    t[0xF6] = e(Inc, ZeroPageX, 6, 0);
    t[0xEE] = e(Inc, Absolute, 6, 0);
    t[0xFE] = e(Inc, AbsoluteX, 7, DOUBLE_READ);
    t[0xE8] = e(Inx, Implied, 2, 0);
    t[0xC8] = e(Iny, Implied, 2, 0);
    t[0xC6] = e(Dec, ZeroPage, 5, 0);
    t[0xD6] = e(Dec, ZeroPageX, 6, 0);
    t[0xCE] = e(Dec, Absolute, 6, 0);
    t[0xDE] = e(Dec, AbsoluteX, 7, DOUBLE_READ);
    t[0xCA] = e(Dex, Implied, 2, 0);
    t[0x88] = e(Dey, Implied, 2, 0);

    // Comparisons
    t[0xC9] = e(Cmp, Immediate, 2, 0);
    t[0xC5] = e(Cmp, ZeroPage, 3, 0);
    t[0xD5] = e(Cmp, ZeroPageX, 4, 0);
    t[0xCD] = e(Cmp, Absolute, 4, 0);
    t[0xDD] = e(Cmp, AbsoluteX, 4, 0);
    t[0xD9] = e(Cmp, AbsoluteY, 4, 0);
    t[0xC1] = e(Cmp, IndirectX, 6, 0);
    t[0xD1] = e(Cmp, IndirectY, 5, 0);
    t[0xE0] = e(Cpx, Immediate, 2, 0);
    t[0xE4] = e(Cpx, ZeroPage, 3, 0);
    t[0xEC] = e(Cpx, Absolute, 4, 0);
    t[0xC0] = e(Cpy, Immediate, 2, 0);
    t[0xC4] = e(Cpy, ZeroPage, 3, 0);
    t[0xCC] = e(Cpy, Absolute, 4, 0);

    // Branches (+1 when taken, +2 when taken across a page)
    t[0x90] = e(Bcc, Relative, 2, 0);
    t[0xB0] = e(Bcs, Relative, 2, 0);
    t[0xD0] = e(Bne, Relative, 2, 0);
    t[0xF0] = e(Beq, Relative, 2, 0);
    t[0x50] = e(Bvc, Relative, 2, 0);
    t[0x70] = e(Bvs, Relative, 2, 0);
    t[0x10] = e(Bpl, Relative, 2, 0);
    t[0x30] = e(Bmi, Relative, 2, 0);

    // Jumps / subroutines
    t[0x4C] = e(Jmp, Absolute, 3, 0);
    t[0x6C] = e(Jmp, Indirect, 5, 0);
    t[0x20] = e(Jsr, Absolute, 6, 0);
    t[0x60] = e(Rts, Implied, 6, 0);

    // Interrupt control
    t[0x00] = e(Brk, Implied, 7, 0);
    t[0x40] = e(Rti, Implied, 6, 0);

    // Addition / subtraction
    t[0x69] = e(Adc, Immediate, 2, 0);
    t[0x65] = e(Adc, ZeroPage, 3, 0);
    t[0x75] = e(Adc, ZeroPageX, 4, 0);
    t[0x6D] = e(Adc, Absolute, 4, 0);
    t[0x7D] = e(Adc, AbsoluteX, 4, 0);
    t[0x79] = e(Adc, AbsoluteY, 4, 0);
    t[0x61] = e(Adc, IndirectX, 6, 0);
    t[0x71] = e(Adc, IndirectY, 5, 0);
    t[0xE9] = e(Sbc, Immediate, 2, 0);
    t[0xEB] = e(Sbc, Immediate, 2, 0);
    t[0xE5] = e(Sbc, ZeroPage, 3, 0);
    t[0xF5] = e(Sbc, ZeroPageX, 4, 0);
    t[0xED] = e(Sbc, Absolute, 4, 0);
    t[0xFD] = e(Sbc, AbsoluteX, 4, 0);
    t[0xF9] = e(Sbc, AbsoluteY, 4, 0);
    t[0xE1] = e(Sbc, IndirectX, 6, 0);
    t[0xF1] = e(Sbc, IndirectY, 5, 0);

    // Shifts / rotations
    t[0x0A] = e(Asl, Accumulator, 2, 0);
    t[0x06] = e(Asl, ZeroPage, 5, 0);
    t[0x16] = e(Asl, ZeroPageX, 6, 0);
    t[0x0E] = e(Asl, Absolute, 6, 0);
    t[0x1E] = e(Asl, AbsoluteX, 7, DOUBLE_READ);
    t[0x4A] = e(Lsr, Accumulator, 2, 0);
    t[0x46] = e(Lsr, ZeroPage, 5, 0);
    t[0x56] = e(Lsr, ZeroPageX, 6, 0);
    t[0x4E] = e(Lsr, Absolute, 6, 0);
    t[0x5E] = e(Lsr, AbsoluteX, 7, DOUBLE_READ);
    t[0x2A] = e(Rol, Accumulator, 2, 0);
    t[0x26] = e(Rol, ZeroPage, 5, 0);
    t[0x36] = e(Rol, ZeroPageX, 6, 0);
    t[0x2E] = e(Rol, Absolute, 6, 0);
    t[0x3E] = e(Rol, AbsoluteX, 7, DOUBLE_READ);
    t[0x6A] = e(Ror, Accumulator, 2, 0);
    t[0x66] = e(Ror, ZeroPage, 5, 0);
    t[0x76] = e(Ror, ZeroPageX, 6, 0);
    t[0x6E] = e(Ror, Absolute, 6, 0);
    t[0x7E] = e(Ror, AbsoluteX, 7, DOUBLE_READ);

    // Read-modify-write hybrids
    t[0xC7] = e(Dcp, ZeroPage, 5, 0);
    t[0xD7] = e(Dcp, ZeroPageX, 6, 0);
    t[0xCF] = e(Dcp, Absolute, 6, 0);
    t[0xDF] = e(Dcp, AbsoluteX, 7, DOUBLE_READ);
    t[0xDB] = e(Dcp, AbsoluteY, 7, DOUBLE_READ);
    t[0xC3] = e(Dcp, IndirectX, 8, 0);
    t[0xD3] = e(Dcp, IndirectY, 8, DOUBLE_READ);
    t[0xE7] = e(Isb, ZeroPage, 5, 0);
    t[0xF7] = e(Isb, ZeroPageX, 6, 0);
    t[0xEF] = e(Isb, Absolute, 6, 0);
    t[0xFF] = e(Isb, AbsoluteX, 7, DOUBLE_READ);
    t[0xFB] = e(Isb, AbsoluteY, 7, DOUBLE_READ);
    t[0xE3] = e(Isb, IndirectX, 8, 0);
    t[0xF3] = e(Isb, IndirectY, 8, DOUBLE_READ);
    t[0x07] = e(Slo, ZeroPage, 5, 0);
    t[0x17] = e(Slo, ZeroPageX, 6, 0);
    t[0x0F] = e(Slo, Absolute, 6, 0);
    t[0x1F] = e(Slo, AbsoluteX, 7, DOUBLE_READ);
    t[0x1B] = e(Slo, AbsoluteY, 7, DOUBLE_READ);
    t[0x03] = e(Slo, IndirectX, 8, 0);
    t[0x13] = e(Slo, IndirectY, 8, DOUBLE_READ);
    t[0x47] = e(Sre, ZeroPage, 5, 0);
    t[0x57] = e(Sre, ZeroPageX, 6, 0);
    t[0x4F] = e(Sre, Absolute, 6, 0);
    t[0x5F] = e(Sre, AbsoluteX, 7, DOUBLE_READ);
    t[0x5B] = e(Sre, AbsoluteY, 7, DOUBLE_READ);
    t[0x43] = e(Sre, IndirectX, 8, 0);
    t[0x53] = e(Sre, IndirectY, 8, DOUBLE_READ);
    t[0x27] = e(Rla, ZeroPage, 5, 0);
    t[0x37] = e(Rla, ZeroPageX, 6, 0);
    t[0x2F] = e(Rla, Absolute, 6, 0);
    t[0x3F] = e(Rla, AbsoluteX, 7, DOUBLE_READ);
    t[0x3B] = e(Rla, AbsoluteY, 7, DOUBLE_READ);
    t[0x23] = e(Rla, IndirectX, 8, 0);
    t[0x33] = e(Rla, IndirectY, 8, DOUBLE_READ);
    t[0x67] = e(Rra, ZeroPage, 5, 0);
    t[0x77] = e(Rra, ZeroPageX, 6, 0);
    t[0x6F] = e(Rra, Absolute, 6, 0);
    t[0x7F] = e(Rra, AbsoluteX, 7, DOUBLE_READ);
    t[0x7B] = e(Rra, AbsoluteY, 7, DOUBLE_READ);
    t[0x63] = e(Rra, IndirectX, 8, 0);
    t[0x73] = e(Rra, IndirectY, 8, DOUBLE_READ);

    // Immediate-mode oddities
    t[0x8B] = e(Xaa, Immediate, 2, 0);
    t[0xCB] = e(Axs, Immediate, 2, 0);
    t[0x0B] = e(Anc, Immediate, 2, 0);
    t[0x2B] = e(Anc, Immediate, 2, 0);
    t[0x4B] = e(Alr, Immediate, 2, 0);
    t[0x6B] = e(Arr, Immediate, 2, 0);

    // Halt family: the CPU jams until reset
    t[0x02] = e(Kil, Implied, 2, 0);
    t[0x12] = e(Kil, Implied, 2, 0);
    t[0x22] = e(Kil, Implied, 2, 0);
    t[0x32] = e(Kil, Implied, 2, 0);
    t[0x42] = e(Kil, Implied, 2, 0);
    t[0x52] = e(Kil, Implied, 2, 0);
    t[0x62] = e(Kil, Implied, 2, 0);
    t[0x72] = e(Kil, Implied, 2, 0);
    t[0x92] = e(Kil, Implied, 2, 0);
    t[0xB2] = e(Kil, Implied, 2, 0);
    t[0xD2] = e(Kil, Implied, 2, 0);
    t[0xF2] = e(Kil, Implied, 2, 0);

    t
}
