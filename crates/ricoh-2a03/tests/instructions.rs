//! Unit tests for 2A03 instruction behavior.

use famicore_core::{Bus, SimpleBus, Tickable, Ticks};
use ricoh_2a03::{CpuBus, Interrupt, Ricoh2a03, StepOutcome, flags};

/// Load a program at $0200 and point PC there.
fn setup_program(bus: &mut SimpleBus, cpu: &mut Ricoh2a03, program: &[u8]) {
    bus.load(0x0200, program);
    cpu.regs.pc = 0x0200;
}

#[test]
fn lda_sta_end_to_end() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // LDA #$05; STA $10
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x05, 0x85, 0x10]);

    assert_eq!(cpu.step(&mut bus), StepOutcome::Instruction);
    assert_eq!(cpu.step(&mut bus), StepOutcome::Instruction);

    assert_eq!(cpu.regs.a, 0x05);
    assert_eq!(bus.peek(0x0010), 0x05);
    assert!(!cpu.regs.p.zero);
    assert!(!cpu.regs.p.negative);
    // LDA immediate is 2 cycles, STA zero page is 3.
    assert_eq!(bus.ticks(), Ticks::new(5));
}

#[test]
fn load_flags() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // LDA #$00; LDA #$80; LDA #$7F
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x00, 0xA9, 0x80, 0xA9, 0x7F]);

    cpu.step(&mut bus);
    assert!(cpu.regs.p.zero);
    assert!(!cpu.regs.p.negative);

    cpu.step(&mut bus);
    assert!(!cpu.regs.p.zero);
    assert!(cpu.regs.p.negative);

    cpu.step(&mut bus);
    assert!(!cpu.regs.p.zero);
    assert!(!cpu.regs.p.negative);
}

#[test]
fn stack_pha_pla() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // LDA #$42; LDX #$FF; TXS; PHA; LDA #$00; PLA
    let program = [
        0xA9, 0x42, // LDA #$42
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x48, // PHA
        0xA9, 0x00, // LDA #$00
        0x68, // PLA
    ];
    setup_program(&mut bus, &mut cpu, &program);

    for _ in 0..6 {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.regs.a, 0x42, "PLA should restore A");
    assert_eq!(cpu.regs.s, 0xFF, "SP should be back to $FF after PLA");
}

#[test]
fn php_plp_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // SEC; SED; PHP; CLC; CLD; PLP
    let program = [0x38, 0xF8, 0x08, 0x18, 0xD8, 0x28];
    setup_program(&mut bus, &mut cpu, &program);
    cpu.regs.s = 0xFF;

    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    // The pushed byte carries the write-only artifacts.
    let pushed = bus.peek(0x01FF);
    assert_ne!(pushed & flags::B, 0);
    assert_ne!(pushed & flags::U, 0);

    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert!(cpu.regs.p.carry, "PLP should restore carry");
    assert!(cpu.regs.p.decimal, "PLP should restore decimal");
    assert_eq!(cpu.regs.s, 0xFF);
}

#[test]
fn adc_signed_overflow() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // LDA #$50; ADC #$50: 0x50 + 0x50 = 0xA0: positive + positive gives a
    // negative result, so V must be set.
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x50, 0x69, 0x50]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(cpu.regs.a, 0xA0);
    assert!(cpu.regs.p.overflow);
    assert!(cpu.regs.p.negative);
    assert!(!cpu.regs.p.carry);
}

#[test]
fn adc_uses_carry_in() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // SEC; LDA #$FF; ADC #$00: carry-in wraps the accumulator to 0.
    setup_program(&mut bus, &mut cpu, &[0x38, 0xA9, 0xFF, 0x69, 0x00]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.regs.p.carry);
    assert!(cpu.regs.p.zero);
    assert!(!cpu.regs.p.overflow);
}

#[test]
fn sbc_is_complement_addition() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // SEC; LDA #$50; SBC #$10: with carry set SBC is exact subtraction.
    setup_program(&mut bus, &mut cpu, &[0x38, 0xA9, 0x50, 0xE9, 0x10]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.regs.a, 0x40);
    assert!(cpu.regs.p.carry, "no borrow occurred");
    assert!(!cpu.regs.p.overflow);

    // CLC; SBC #$40: borrow in, 0x40 - 0x40 - 1 = 0xFF with borrow out.
    bus.load(0x0205, &[0x18, 0xE9, 0x40]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert!(!cpu.regs.p.carry, "borrow occurred");
}

#[test]
fn decimal_flag_never_changes_arithmetic() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();

    // SED; LDA #$09; ADC #$01: on a 6502 this would be BCD $10; the 2A03
    // always adds in binary.
    setup_program(&mut bus, &mut cpu, &[0xF8, 0xA9, 0x09, 0x69, 0x01]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }

    assert!(cpu.regs.p.decimal, "flag itself is tracked");
    assert_eq!(cpu.regs.a, 0x0A, "arithmetic stays binary");
}

#[test]
fn absolute_x_page_cross_costs_one_cycle() {
    // Same instruction, with and without a page crossing.
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0xBD, 0x00, 0x12]); // LDA $1200,X
    cpu.regs.x = 0x05;
    cpu.step(&mut bus);
    assert_eq!(bus.ticks(), Ticks::new(4));

    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0xBD, 0xF0, 0x12]); // LDA $12F0,X
    cpu.regs.x = 0x20;
    cpu.step(&mut bus);
    assert_eq!(bus.ticks(), Ticks::new(5));
}

#[test]
fn store_absolute_x_always_pays_the_fix_cycle() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0x9D, 0x00, 0x12]); // STA $1200,X
    cpu.regs.x = 0x05;
    cpu.regs.a = 0xAB;
    cpu.step(&mut bus);

    assert_eq!(bus.peek(0x1205), 0xAB);
    assert_eq!(bus.ticks(), Ticks::new(5));
}

#[test]
fn zero_page_x_wraps_within_page_zero() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    bus.write(0x0010, 0x99);
    setup_program(&mut bus, &mut cpu, &[0xB5, 0xF0]); // LDA $F0,X
    cpu.regs.x = 0x20;
    cpu.step(&mut bus);

    assert_eq!(cpu.regs.a, 0x99, "$F0 + $20 wraps to $10, not $110");
}

#[test]
fn indirect_jmp_pointer_wraps_within_page() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    // Pointer at $02FF: low byte from $02FF, high byte from $0200 (not $0300).
    bus.write(0x02FF, 0x34);
    bus.write(0x0200, 0x12);
    bus.write(0x0300, 0x99); // Would be read by a non-buggy CPU
    bus.load(0x0400, &[0x6C, 0xFF, 0x02]); // JMP ($02FF)
    cpu.regs.pc = 0x0400;
    cpu.step(&mut bus);

    assert_eq!(cpu.regs.pc, 0x1234);
}

#[test]
fn branch_timing() {
    // Not taken: 2 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0xF0, 0x10]); // BEQ +16 (Z clear)
    cpu.step(&mut bus);
    assert_eq!(bus.ticks(), Ticks::new(2));
    assert_eq!(cpu.regs.pc, 0x0202);

    // Taken, same page: 3 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0xD0, 0x10]); // BNE +16
    cpu.step(&mut bus);
    assert_eq!(bus.ticks(), Ticks::new(3));
    assert_eq!(cpu.regs.pc, 0x0212);

    // Taken across a page: 4 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0xD0, 0xFC]); // BNE -4
    cpu.step(&mut bus);
    assert_eq!(bus.ticks(), Ticks::new(4));
    assert_eq!(cpu.regs.pc, 0x01FE);
}

#[test]
fn jsr_rts_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    cpu.regs.s = 0xFF;

    // $0200: JSR $0300; NOP    $0300: RTS
    setup_program(&mut bus, &mut cpu, &[0x20, 0x00, 0x03, 0xEA]);
    bus.write(0x0300, 0x60);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0300);
    // The pushed return address is the JSR's last byte ($0202).
    assert_eq!(bus.peek(0x01FF), 0x02);
    assert_eq!(bus.peek(0x01FE), 0x02);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0203, "RTS lands one past the pushed address");
    assert_eq!(cpu.regs.s, 0xFF);
    assert_eq!(bus.ticks(), Ticks::new(12));
}

#[test]
fn brk_rti_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    cpu.regs.s = 0xFF;
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x03);
    bus.write(0x0300, 0x40); // RTI

    // BRK (with a padding byte at $0201)
    setup_program(&mut bus, &mut cpu, &[0x00, 0xEA]);
    cpu.regs.p.carry = true;

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0300);
    assert!(cpu.regs.p.interrupt_disable);
    assert_eq!(bus.ticks(), Ticks::new(7));
    // Pushed: PCH=$02, PCL=$02 (BRK skips its padding byte), P with B set.
    assert_eq!(bus.peek(0x01FF), 0x02);
    assert_eq!(bus.peek(0x01FE), 0x02);
    let pushed_p = bus.peek(0x01FD);
    assert_ne!(pushed_p & flags::B, 0);
    assert_ne!(pushed_p & flags::C, 0);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0202, "RTI returns past the padding byte");
    assert!(cpu.regs.p.carry);
    assert!(!cpu.regs.p.interrupt_disable, "RTI restored the pre-BRK I flag");
}

#[test]
fn sei_masks_only_from_the_second_instruction() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    cpu.regs.s = 0xFF;
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x03);

    // SEI; NOP; NOP. IRQ arrives while SEI executes.
    setup_program(&mut bus, &mut cpu, &[0x78, 0xEA, 0xEA]);

    assert_eq!(cpu.step(&mut bus), StepOutcome::Instruction);
    assert!(cpu.regs.p.interrupt_disable);
    cpu.raise_interrupt(Interrupt::Irq);

    // The latch still holds the pre-SEI value: the IRQ goes through.
    assert_eq!(cpu.step(&mut bus), StepOutcome::Interrupt(Interrupt::Irq));
    assert_eq!(cpu.regs.pc, 0x0300);
}

#[test]
fn sei_masks_after_one_more_instruction() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    cpu.regs.s = 0xFF;

    // SEI; NOP; NOP. IRQ raised after the NOP following SEI.
    setup_program(&mut bus, &mut cpu, &[0x78, 0xEA, 0xEA]);
    cpu.step(&mut bus); // SEI
    cpu.step(&mut bus); // NOP latches I = 1
    cpu.raise_interrupt(Interrupt::Irq);

    assert_eq!(cpu.step(&mut bus), StepOutcome::MaskedIrq);
    assert_eq!(cpu.regs.pc, 0x0203, "the slot still executed its instruction");
}

#[test]
fn cli_unmasks_with_one_instruction_delay() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    cpu.regs.s = 0xFF;
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x03);

    // SEI; NOP; CLI; NOP; NOP
    setup_program(&mut bus, &mut cpu, &[0x78, 0xEA, 0x58, 0xEA, 0xEA]);
    cpu.step(&mut bus); // SEI
    cpu.step(&mut bus); // NOP (latch = 1)
    cpu.step(&mut bus); // CLI: I = 0, but latch keeps the old 1
    cpu.raise_interrupt(Interrupt::Irq);

    // Still masked for the instruction right after CLI.
    assert_eq!(cpu.step(&mut bus), StepOutcome::MaskedIrq);
    // That instruction latched I = 0, so now the IRQ is taken.
    assert_eq!(cpu.step(&mut bus), StepOutcome::Interrupt(Interrupt::Irq));
    assert_eq!(cpu.regs.pc, 0x0300);
}

#[test]
fn dcp_decrements_then_compares() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    bus.write(0x0010, 0x41);
    setup_program(&mut bus, &mut cpu, &[0xC7, 0x10]); // DCP $10
    cpu.regs.a = 0x40;
    cpu.step(&mut bus);

    assert_eq!(bus.peek(0x0010), 0x40);
    assert!(cpu.regs.p.zero, "A compares equal to the decremented value");
    assert!(cpu.regs.p.carry);
    assert_eq!(bus.ticks(), Ticks::new(5));
}

#[test]
fn isb_increments_then_subtracts() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    bus.write(0x0010, 0x0F);
    setup_program(&mut bus, &mut cpu, &[0xE7, 0x10]); // ISB $10
    cpu.regs.a = 0x30;
    cpu.regs.p.carry = true;
    cpu.step(&mut bus);

    assert_eq!(bus.peek(0x0010), 0x10);
    assert_eq!(cpu.regs.a, 0x20);
}

#[test]
fn slo_shifts_then_ors() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    bus.write(0x0010, 0x81);
    setup_program(&mut bus, &mut cpu, &[0x07, 0x10]); // SLO $10
    cpu.regs.a = 0x01;
    cpu.step(&mut bus);

    assert_eq!(bus.peek(0x0010), 0x02, "memory holds the shifted value");
    assert_eq!(cpu.regs.a, 0x03, "accumulator ORs it in");
    assert!(cpu.regs.p.carry, "bit 7 fell into carry");
}

#[test]
fn lax_loads_both_registers() {
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    bus.write(0x0010, 0x8F);
    setup_program(&mut bus, &mut cpu, &[0xA7, 0x10]); // LAX $10
    cpu.step(&mut bus);

    assert_eq!(cpu.regs.a, 0x8F);
    assert_eq!(cpu.regs.x, 0x8F);
    assert!(cpu.regs.p.negative);
}

#[test]
fn sha_page_cross_copies_memory_instead() {
    // No crossing: writes A & X & (high + 1).
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    setup_program(&mut bus, &mut cpu, &[0x9F, 0x00, 0x12]); // SHA $1200,Y
    cpu.regs.a = 0xFF;
    cpu.regs.x = 0xFF;
    cpu.regs.y = 0x10;
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x1210), 0x13, "A & X & ($12 + 1)");

    // Crossing: the unmodified byte is written back.
    let mut bus = SimpleBus::new();
    let mut cpu = Ricoh2a03::new();
    bus.write(0x1310, 0x77);
    setup_program(&mut bus, &mut cpu, &[0x9F, 0xF0, 0x12]); // SHA $12F0,Y
    cpu.regs.a = 0xFF;
    cpu.regs.x = 0xFF;
    cpu.regs.y = 0x20;
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x1310), 0x77);
}

/// A bus that raises the NMI edge after a fixed number of ticks, to exercise
/// mid-instruction interrupt arrival.
struct NmiAtTick {
    inner: SimpleBus,
    nmi_at: u64,
    delivered: bool,
}

impl Bus for NmiAtTick {
    fn read(&mut self, address: u16) -> u8 {
        self.inner.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.inner.write(address, value);
    }
}

impl Tickable for NmiAtTick {
    fn tick(&mut self) {
        self.inner.tick();
    }
}

impl CpuBus for NmiAtTick {
    fn take_nmi(&mut self) -> bool {
        if !self.delivered && self.inner.ticks().get() >= self.nmi_at {
            self.delivered = true;
            return true;
        }
        false
    }
}

#[test]
fn nmi_hijacks_brk_vector_fetch() {
    let mut bus = NmiAtTick {
        inner: SimpleBus::new(),
        nmi_at: 3, // During BRK's stack pushes, before the vector fetch
        delivered: false,
    };
    bus.inner.write(0xFFFE, 0x00);
    bus.inner.write(0xFFFF, 0x03); // IRQ/BRK handler at $0300
    bus.inner.write(0xFFFA, 0x00);
    bus.inner.write(0xFFFB, 0x04); // NMI handler at $0400
    bus.inner.load(0x0200, &[0x00]); // BRK

    let mut cpu = Ricoh2a03::new();
    cpu.regs.s = 0xFF;
    cpu.regs.pc = 0x0200;
    cpu.step(&mut bus);

    assert_eq!(cpu.regs.pc, 0x0400, "BRK read the NMI vector");
}
