//! Instruction execution.
//!
//! Semantics follow the NMOS 6502 exactly, including the undocumented
//! hybrids: each behaves as its two constituent operations applied to the
//! same effective address with a single read and a single (final) write.

use crate::addressing::{Operand, is_different_page};
use crate::interrupts::Interrupt;
use crate::opcodes::EXTRA_CYCLE;
use crate::opcodes::Op;
use crate::status::Status;
use crate::{CpuBus, Ricoh2a03};

impl Ricoh2a03 {
    pub(crate) fn execute<B: CpuBus>(&mut self, bus: &mut B, op: Op, operand: Operand, flags: u8) {
        match operand.addr {
            Some(addr) => self.execute_addressed(bus, op, addr, operand.page_crossed, flags),
            None => self.execute_implied(bus, op, flags),
        }
    }

    fn execute_implied<B: CpuBus>(&mut self, bus: &mut B, op: Op, flags: u8) {
        match op {
            Op::Nop => {
                if flags & EXTRA_CYCLE != 0 {
                    self.cycle(bus);
                }
            }
            Op::Kil => self.halted = true,

            Op::Clc => self.regs.p.carry = false,
            Op::Cld => self.regs.p.decimal = false,
            Op::Clv => self.regs.p.overflow = false,
            Op::Sec => self.regs.p.carry = true,
            Op::Sed => self.regs.p.decimal = true,
            // CLI/SEI change the I flag only after the already-latched value
            // has been used for the next interrupt decision.
            Op::Cli => {
                self.irq_latch = self.regs.p.interrupt_disable;
                self.regs.p.interrupt_disable = false;
            }
            Op::Sei => {
                self.irq_latch = self.regs.p.interrupt_disable;
                self.regs.p.interrupt_disable = true;
            }

            Op::Tax => {
                let a = self.regs.a;
                self.load_x(a);
            }
            Op::Tay => {
                let a = self.regs.a;
                self.load_y(a);
            }
            Op::Txa => {
                let x = self.regs.x;
                self.load_a(x);
            }
            Op::Tya => {
                let y = self.regs.y;
                self.load_a(y);
            }
            Op::Tsx => {
                let s = self.regs.s;
                self.load_x(s);
            }
            // TXS is the one transfer that updates no flags.
            Op::Txs => self.regs.s = self.regs.x,

            Op::Pha => {
                let a = self.regs.a;
                self.push_byte(bus, a);
            }
            Op::Php => {
                let packed = self.regs.p.to_pushed_byte(true);
                self.push_byte(bus, packed);
            }
            Op::Pla => {
                self.cycle(bus);
                let value = self.pull_byte(bus);
                self.load_a(value);
            }
            Op::Plp => {
                self.cycle(bus);
                self.irq_latch = self.regs.p.interrupt_disable;
                let value = self.pull_byte(bus);
                self.regs.p = Status::from_byte(value);
            }

            Op::Inx => {
                let value = self.regs.x.wrapping_add(1);
                self.load_x(value);
            }
            Op::Iny => {
                let value = self.regs.y.wrapping_add(1);
                self.load_y(value);
            }
            Op::Dex => {
                let value = self.regs.x.wrapping_sub(1);
                self.load_x(value);
            }
            Op::Dey => {
                let value = self.regs.y.wrapping_sub(1);
                self.load_y(value);
            }

            Op::Asl => {
                let result = self.shift_left(self.regs.a, false);
                self.load_a(result);
            }
            Op::Lsr => {
                let result = self.shift_right(self.regs.a, false);
                self.load_a(result);
            }
            Op::Rol => {
                let result = self.shift_left(self.regs.a, true);
                self.load_a(result);
            }
            Op::Ror => {
                let result = self.shift_right(self.regs.a, true);
                self.load_a(result);
            }

            Op::Rts => {
                self.cycle(bus);
                self.cycle(bus);
                // The address pushed by JSR is the last byte of that
                // instruction, so return lands one past it.
                let addr = self.pull_word(bus);
                self.regs.pc = addr.wrapping_add(1);
            }
            Op::Rti => {
                self.cycle(bus);
                let status = self.pull_byte(bus);
                self.regs.p = Status::from_byte(status);
                // Unlike CLI/SEI, the restored I flag is visible to the very
                // next interrupt decision.
                self.irq_latch = self.regs.p.interrupt_disable;
                self.regs.pc = self.pull_word(bus);
            }
            Op::Brk => {
                // BRK is a two-byte instruction; the padding byte is skipped.
                self.advance_pc(1);
                let pc = self.regs.pc;
                self.push_word(bus, pc);
                let packed = self.regs.p.to_pushed_byte(true);
                self.push_byte(bus, packed);
                self.irq_latch = true;
                self.regs.p.interrupt_disable = true;
                // A pending NMI hijacks the vector fetch.
                let vector = if self.lines.is_raised(Interrupt::Nmi) {
                    Interrupt::Nmi.vector()
                } else {
                    Interrupt::Irq.vector()
                };
                self.regs.pc = self.read_word(bus, vector);
            }

            // Decode gap: consume the cycles, change nothing.
            _ => {}
        }
    }

    fn execute_addressed<B: CpuBus>(
        &mut self,
        bus: &mut B,
        op: Op,
        addr: u16,
        page_crossed: bool,
        flags: u8,
    ) {
        match op {
            Op::Nop => {
                if flags & EXTRA_CYCLE != 0 {
                    self.cycle(bus);
                }
            }

            Op::Sta => {
                let a = self.regs.a;
                self.write_byte(bus, addr, a);
            }
            Op::Stx => {
                let x = self.regs.x;
                self.write_byte(bus, addr, x);
            }
            Op::Sty => {
                let y = self.regs.y;
                self.write_byte(bus, addr, y);
            }
            Op::Sax => {
                let value = self.regs.a & self.regs.x;
                self.write_byte(bus, addr, value);
            }
            Op::Sha => {
                let value = self.regs.a & self.regs.x;
                self.store_high_quirk(bus, addr, page_crossed, value);
            }
            Op::Shx => {
                let x = self.regs.x;
                self.store_high_quirk(bus, addr, page_crossed, x);
            }
            Op::Shy => {
                let y = self.regs.y;
                self.store_high_quirk(bus, addr, page_crossed, y);
            }
            Op::Tas => {
                self.regs.s = self.regs.a & self.regs.x;
                let value = self.regs.s;
                self.store_high_quirk(bus, addr, page_crossed, value);
            }

            Op::Lda => {
                let value = self.read_byte(bus, addr);
                self.load_a(value);
            }
            Op::Ldx => {
                let value = self.read_byte(bus, addr);
                self.load_x(value);
            }
            Op::Ldy => {
                let value = self.read_byte(bus, addr);
                self.load_y(value);
            }
            Op::Lax => {
                let value = self.read_byte(bus, addr);
                self.load_a(value);
                self.load_x(value);
            }
            Op::Las => {
                let value = self.read_byte(bus, addr);
                self.regs.s &= value;
                let s = self.regs.s;
                self.load_a(s);
                self.load_x(s);
            }

            Op::And => {
                let value = self.read_byte(bus, addr);
                let result = self.regs.a & value;
                self.load_a(result);
            }
            Op::Ora => {
                let value = self.read_byte(bus, addr);
                let result = self.regs.a | value;
                self.load_a(result);
            }
            Op::Eor => {
                let value = self.read_byte(bus, addr);
                let result = self.regs.a ^ value;
                self.load_a(result);
            }
            Op::Bit => {
                let value = self.read_byte(bus, addr);
                self.regs.p.zero = self.regs.a & value == 0;
                self.regs.p.overflow = value & 0x40 != 0;
                self.regs.p.negative = value & 0x80 != 0;
            }

            Op::Inc => {
                self.increment_memory(bus, addr);
            }
            Op::Dec => {
                self.decrement_memory(bus, addr);
            }

            Op::Cmp => {
                let value = self.read_byte(bus, addr);
                self.compare(self.regs.a, value);
            }
            Op::Cpx => {
                let value = self.read_byte(bus, addr);
                self.compare(self.regs.x, value);
            }
            Op::Cpy => {
                let value = self.read_byte(bus, addr);
                self.compare(self.regs.y, value);
            }

            Op::Bcc => self.branch_if(bus, !self.regs.p.carry, addr),
            Op::Bcs => self.branch_if(bus, self.regs.p.carry, addr),
            Op::Bne => self.branch_if(bus, !self.regs.p.zero, addr),
            Op::Beq => self.branch_if(bus, self.regs.p.zero, addr),
            Op::Bvc => self.branch_if(bus, !self.regs.p.overflow, addr),
            Op::Bvs => self.branch_if(bus, self.regs.p.overflow, addr),
            Op::Bpl => self.branch_if(bus, !self.regs.p.negative, addr),
            Op::Bmi => self.branch_if(bus, self.regs.p.negative, addr),

            Op::Jmp => self.regs.pc = addr,
            Op::Jsr => {
                self.cycle(bus);
                let return_addr = self.regs.pc.wrapping_sub(1);
                self.push_word(bus, return_addr);
                self.regs.pc = addr;
            }

            Op::Adc => {
                let value = self.read_byte(bus, addr);
                self.add_to_accumulator(value);
            }
            // Subtraction is addition of the complement: the carry-in then
            // acts as the borrow, reusing the same carry/overflow logic.
            Op::Sbc => {
                let value = self.read_byte(bus, addr);
                self.add_to_accumulator(value ^ 0xFF);
            }

            Op::Asl => {
                self.shift_memory_left(bus, addr, false);
            }
            Op::Lsr => {
                self.shift_memory_right(bus, addr, false);
            }
            Op::Rol => {
                self.shift_memory_left(bus, addr, true);
            }
            Op::Ror => {
                self.shift_memory_right(bus, addr, true);
            }

            Op::Dcp => {
                let result = self.decrement_memory(bus, addr);
                self.compare(self.regs.a, result);
            }
            Op::Isb => {
                let result = self.increment_memory(bus, addr);
                self.add_to_accumulator(result ^ 0xFF);
            }
            Op::Slo => {
                let shifted = self.shift_memory_left(bus, addr, false);
                let result = self.regs.a | shifted;
                self.load_a(result);
            }
            Op::Sre => {
                let shifted = self.shift_memory_right(bus, addr, false);
                let result = self.regs.a ^ shifted;
                self.load_a(result);
            }
            Op::Rla => {
                let shifted = self.shift_memory_left(bus, addr, true);
                let result = self.regs.a & shifted;
                self.load_a(result);
            }
            Op::Rra => {
                let shifted = self.shift_memory_right(bus, addr, true);
                self.add_to_accumulator(shifted);
            }

            Op::Xaa => {
                let value = self.read_byte(bus, addr);
                let result = self.regs.x & (self.regs.a & value);
                self.load_a(result);
            }
            Op::Axs => {
                let value = self.read_byte(bus, addr);
                let result = self.compare(self.regs.a & self.regs.x, value);
                self.regs.x = result;
            }
            Op::Anc => {
                let value = self.read_byte(bus, addr);
                let result = self.regs.a & value;
                self.load_a(result);
                self.regs.p.carry = result & 0x80 != 0;
            }
            Op::Alr => {
                let value = self.read_byte(bus, addr);
                let anded = self.regs.a & value;
                self.load_a(anded);
                let result = self.shift_right(anded, false);
                self.load_a(result);
            }
            Op::Arr => {
                let value = self.read_byte(bus, addr);
                let anded = self.regs.a & value;
                self.load_a(anded);
                let result = self.shift_right(anded, true);
                self.load_a(result);
                // Carry and overflow come from interior bits of the rotated
                // result, an artifact of the ADC circuitry being half-engaged.
                let bit6 = result & 0x40 != 0;
                let bit5 = result & 0x20 != 0;
                self.regs.p.carry = bit6;
                self.regs.p.overflow = bit5 != bit6;
            }

            // Decode gap: consume the cycles, change nothing.
            _ => {}
        }
    }

    // -- Shared instruction helpers --

    fn load_a(&mut self, value: u8) {
        self.regs.p.set_zn(value);
        self.regs.a = value;
    }

    fn load_x(&mut self, value: u8) {
        self.regs.p.set_zn(value);
        self.regs.x = value;
    }

    fn load_y(&mut self, value: u8) {
        self.regs.p.set_zn(value);
        self.regs.y = value;
    }

    /// Write an ALU result to memory, updating Z and N.
    fn write_result<B: CpuBus>(&mut self, bus: &mut B, addr: u16, value: u8) -> u8 {
        self.regs.p.set_zn(value);
        self.write_byte(bus, addr, value);
        value
    }

    /// The read half of a read-modify-write: read the operand, then write
    /// the unmodified value back while the ALU works on it.
    fn read_modify<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        let value = self.read_byte(bus, addr);
        self.write_byte(bus, addr, value);
        value
    }

    fn increment_memory<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        let value = self.read_modify(bus, addr).wrapping_add(1);
        self.write_result(bus, addr, value)
    }

    fn decrement_memory<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        let value = self.read_modify(bus, addr).wrapping_sub(1);
        self.write_result(bus, addr, value)
    }

    fn shift_memory_left<B: CpuBus>(&mut self, bus: &mut B, addr: u16, rotate: bool) -> u8 {
        let value = self.read_modify(bus, addr);
        let result = self.shift_left(value, rotate);
        self.write_result(bus, addr, result)
    }

    fn shift_memory_right<B: CpuBus>(&mut self, bus: &mut B, addr: u16, rotate: bool) -> u8 {
        let value = self.read_modify(bus, addr);
        let result = self.shift_right(value, rotate);
        self.write_result(bus, addr, result)
    }

    /// Shift left, optionally rotating the old carry into bit 0. Updates the
    /// carry flag from bit 7.
    fn shift_left(&mut self, value: u8, rotate: bool) -> u8 {
        let carry_in = u8::from(rotate && self.regs.p.carry);
        self.regs.p.carry = value & 0x80 != 0;
        (value << 1) | carry_in
    }

    /// Shift right, optionally rotating the old carry into bit 7. Updates
    /// the carry flag from bit 0.
    fn shift_right(&mut self, value: u8, rotate: bool) -> u8 {
        let carry_in = if rotate && self.regs.p.carry { 0x80 } else { 0 };
        self.regs.p.carry = value & 0x01 != 0;
        (value >> 1) | carry_in
    }

    /// Add an operand and the carry into the accumulator.
    ///
    /// Overflow is signed two's-complement overflow: the sign of the result
    /// differs from both inputs' signs.
    fn add_to_accumulator(&mut self, operand: u8) {
        let a = u16::from(self.regs.a);
        let result = a + u16::from(operand) + u16::from(self.regs.p.carry);
        self.regs.p.carry = result > 0xFF;
        self.regs.p.overflow = (a ^ result) & (u16::from(operand) ^ result) & 0x80 != 0;
        self.load_a(result as u8);
    }

    /// Compare a register against a value, returning the raw difference for
    /// the hybrid opcodes that keep it.
    fn compare(&mut self, register: u8, value: u8) -> u8 {
        let result = register.wrapping_sub(value);
        self.regs.p.carry = register >= value;
        self.regs.p.set_zn(result);
        result
    }

    /// Taken branches cost one extra cycle, two when the target is on a
    /// different page than the next instruction.
    fn branch_if<B: CpuBus>(&mut self, bus: &mut B, condition: bool, target: u16) {
        if condition {
            self.cycle(bus);
            if is_different_page(self.regs.pc, target) {
                self.cycle(bus);
            }
            self.regs.pc = target;
        }
    }

    /// SHA/SHX/SHY store `register & (high byte of address + 1)`, unless
    /// the index pushed the address across a page, in which case the
    /// unmodified memory byte is written back instead of the intended value.
    fn store_high_quirk<B: CpuBus>(
        &mut self,
        bus: &mut B,
        addr: u16,
        page_crossed: bool,
        register: u8,
    ) {
        if page_crossed {
            let current = bus.read(addr);
            self.write_byte(bus, addr, current);
        } else {
            let value = register & ((addr >> 8) as u8).wrapping_add(1);
            self.write_byte(bus, addr, value);
        }
    }
}
