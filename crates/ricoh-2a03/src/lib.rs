//! Ricoh 2A03 CPU emulator (the NES processor).
//!
//! This implements the NMOS 6502 core inside the 2A03, cycle-accurately:
//! every memory access, dummy read and internal dead cycle consumes exactly
//! one clock tick, and every tick is fanned out to the rest of the machine
//! through the bus before the CPU proceeds. The decimal flag exists and is
//! toggled by SED/CLD, but, as in the silicon, never affects arithmetic.
//!
//! The full undocumented opcode set is implemented (LAX, SAX, DCP, ISB, SLO,
//! SRE, RLA, RRA, ANC, ALR, ARR, XAA, AXS, LAS, TAS, SHA/SHX/SHY, the
//! multi-byte NOPs and the KIL halt family); cartridge software in the wild
//! depends on them.
//!
//! # Interrupt latency
//!
//! IRQ recognition uses the interrupt-disable flag value *latched at each
//! instruction fetch*, not the live flag. SEI/CLI/PLP therefore take effect
//! one instruction late, while RTI, BRK and hardware interrupt entry update
//! the latch immediately. Getting this wrong breaks real games.

mod addressing;
mod execute;
mod interrupts;
mod opcodes;
mod registers;
mod status;

pub use interrupts::{Interrupt, InterruptLines};
pub use registers::Registers;
pub use status::{Status, flags};

use famicore_core::{Bus, Observable, SimpleBus, Tickable, Value};

use crate::opcodes::OPCODE_TABLE;

/// Audio-chip status register: written with 0 during reset to silence all
/// channels.
const APU_STATUS: u16 = 0x4015;
/// Audio-chip frame counter register: restored to its last written value
/// during reset.
const APU_FRAME_COUNTER: u16 = 0x4017;

/// Everything the CPU needs from the rest of the machine.
///
/// `read`/`write` route memory accesses; `tick` advances the other chips by
/// one CPU cycle (the clock fan-out). The remaining methods are the few
/// signals the CPU samples each cycle.
pub trait CpuBus: Bus + Tickable {
    /// True while the sprite DMA engine owns the bus.
    fn dma_active(&self) -> bool {
        false
    }

    /// Edge-triggered NMI signal; must report each edge exactly once.
    fn take_nmi(&mut self) -> bool {
        false
    }

    /// Level-triggered IRQ line from peripherals.
    fn irq_asserted(&self) -> bool {
        false
    }

    /// Last value written to the audio frame-counter register.
    fn audio_frame_counter(&self) -> u8 {
        0
    }
}

// The flat test bus has no peripherals; all signal defaults apply.
impl CpuBus for SimpleBus {}

/// What a single `step` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction was fetched and executed.
    Instruction,
    /// An interrupt was resolved instead of fetching an instruction.
    Interrupt(Interrupt),
    /// The CPU idled for one cycle (halted, or sprite DMA owns the bus).
    Idle,
    /// An IRQ is pending but masked by the latched interrupt-disable flag.
    /// The slot otherwise proceeded normally; a frame loop should yield.
    MaskedIrq,
}

/// The Ricoh 2A03 CPU state.
pub struct Ricoh2a03 {
    /// Architectural registers.
    pub regs: Registers,
    /// Set by the KIL opcode family; only reset clears it.
    halted: bool,
    /// Pending interrupt requests.
    lines: InterruptLines,
    /// The interrupt-disable flag value IRQ recognition actually sees,
    /// latched at each instruction fetch (see module docs).
    irq_latch: bool,
}

impl Ricoh2a03 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            halted: false,
            lines: InterruptLines::new(),
            irq_latch: false,
        }
    }

    /// Whether the CPU has been jammed by a KIL opcode.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Currently pending interrupt lines.
    #[must_use]
    pub fn interrupts(&self) -> InterruptLines {
        self.lines
    }

    /// Raise an interrupt line.
    pub fn raise_interrupt(&mut self, interrupt: Interrupt) {
        self.lines.raise(interrupt);
    }

    /// Clear an interrupt line (for level-triggered sources that deassert).
    pub fn clear_interrupt(&mut self, interrupt: Interrupt) {
        self.lines.clear(interrupt);
    }

    // ---------------------------------------------------------------------
    // Reset
    // ---------------------------------------------------------------------

    /// Power-on reset: clear state, write the documented RAM power-up
    /// pattern, then run the reset handler entry (5 cycles).
    ///
    /// A soft reset instead raises [`Interrupt::Reset`] and lets the next
    /// `step` resolve it.
    pub fn reset<B: CpuBus>(&mut self, bus: &mut B) {
        self.reset_state();
        self.reset_memory(bus);
        self.handle_reset(bus);
    }

    fn reset_state(&mut self) {
        self.regs = Registers::new();
        self.lines.clear_all();
        self.halted = false;
        self.irq_latch = false;
    }

    /// RAM content after power-on is not random: this is the well-known
    /// pattern observed on the real machine. Written without consuming
    /// cycles; the clock is not running yet.
    fn reset_memory<B: CpuBus>(&mut self, bus: &mut B) {
        for addr in 0x0000..0x0008 {
            bus.write(addr, 0xFF);
        }
        bus.write(0x0008, 0xF7);
        bus.write(0x0009, 0xEF);
        bus.write(0x000A, 0xDF);
        bus.write(0x000F, 0xBF);
        for addr in 0x0010..0x0800 {
            bus.write(addr, 0xFF);
        }
        for addr in 0x4000..0x4010 {
            bus.write(addr, 0x00);
        }
        // $4015 and $4017 are written by the reset handler entry.
    }

    // ---------------------------------------------------------------------
    // Execution step
    // ---------------------------------------------------------------------

    /// Execute one instruction slot.
    ///
    /// 1. If an interrupt is pending and sprite DMA is not blocking, resolve
    ///    it instead of fetching an instruction (a masked IRQ resolves to
    ///    nothing and falls through).
    /// 2. If halted or DMA-blocked, consume exactly one externally-idle tick
    ///    (the other chips still advance).
    /// 3. Otherwise fetch, decode and execute the next instruction.
    pub fn step<B: CpuBus>(&mut self, bus: &mut B) -> StepOutcome {
        let blocked = bus.dma_active();
        let mut masked_irq = false;
        if self.lines.any() && !blocked {
            match self.resolve_interrupt(bus) {
                Some(interrupt) => return StepOutcome::Interrupt(interrupt),
                None => masked_irq = true,
            }
        }
        if self.halted || blocked {
            self.cycle(bus);
            if masked_irq {
                StepOutcome::MaskedIrq
            } else {
                StepOutcome::Idle
            }
        } else {
            self.fetch_and_execute(bus);
            if masked_irq {
                StepOutcome::MaskedIrq
            } else {
                StepOutcome::Instruction
            }
        }
    }

    fn fetch_and_execute<B: CpuBus>(&mut self, bus: &mut B) {
        let opcode = self.fetch(bus);
        // Latch the I flag for the next interrupt decision; most
        // instructions leave it at the live value.
        self.irq_latch = self.regs.p.interrupt_disable;
        let entry = OPCODE_TABLE[usize::from(opcode)];
        let operand = self.resolve(bus, entry.mode, entry.flags);
        self.execute(bus, entry.op, operand, entry.flags);
    }

    // ---------------------------------------------------------------------
    // Interrupt handling
    // ---------------------------------------------------------------------

    /// Resolve the highest-priority pending interrupt. Returns `None` when
    /// the only pending request is an IRQ masked by the latch.
    fn resolve_interrupt<B: CpuBus>(&mut self, bus: &mut B) -> Option<Interrupt> {
        let taken = if self.lines.is_raised(Interrupt::Reset) {
            self.handle_reset(bus);
            Interrupt::Reset
        } else if self.lines.is_raised(Interrupt::Nmi) {
            self.handle_nmi(bus);
            Interrupt::Nmi
        } else if self.irq_latch {
            return None;
        } else {
            self.handle_irq(bus);
            Interrupt::Irq
        };
        // Every interrupt costs 7 cycles; the handler entries account for 5.
        self.cycle(bus);
        self.cycle(bus);
        Some(taken)
    }

    fn handle_reset<B: CpuBus>(&mut self, bus: &mut B) {
        // Silence the audio chip and restore its frame counter register.
        let frame_counter = bus.audio_frame_counter();
        self.write_byte(bus, APU_STATUS, 0x00);
        self.write_byte(bus, APU_FRAME_COUNTER, frame_counter);
        // Reset performs the same three stack pushes as an interrupt but
        // with writes suppressed: only the stack pointer moves.
        self.regs.s = self.regs.s.wrapping_sub(3);
        self.enter_handler(bus, Interrupt::Reset);
        self.lines.clear(Interrupt::Reset);
        self.cycle(bus);
        self.halted = false;
    }

    fn handle_nmi<B: CpuBus>(&mut self, bus: &mut B) {
        self.push_interrupt_state(bus);
        self.enter_handler(bus, Interrupt::Nmi);
        self.lines.clear(Interrupt::Nmi);
    }

    fn handle_irq<B: CpuBus>(&mut self, bus: &mut B) {
        self.push_interrupt_state(bus);
        self.enter_handler(bus, Interrupt::Irq);
        // The IRQ line is level-triggered; the source deasserts it.
    }

    fn push_interrupt_state<B: CpuBus>(&mut self, bus: &mut B) {
        let pc = self.regs.pc;
        self.push_word(bus, pc);
        // Hardware interrupts push the status with the break bit clear.
        let packed = self.regs.p.to_pushed_byte(false);
        self.push_byte(bus, packed);
    }

    fn enter_handler<B: CpuBus>(&mut self, bus: &mut B, interrupt: Interrupt) {
        self.regs.p.interrupt_disable = true;
        // Handler entry masks IRQs for the very next decision, unlike SEI.
        self.irq_latch = true;
        self.regs.pc = self.read_word(bus, interrupt.vector());
    }

    // ---------------------------------------------------------------------
    // Cycle and memory access primitives
    // ---------------------------------------------------------------------

    /// Consume one clock cycle: fan the tick out to the rest of the machine
    /// and sample the interrupt signals. Every cycle the CPU spends anywhere
    /// goes through here.
    pub(crate) fn cycle<B: CpuBus>(&mut self, bus: &mut B) {
        bus.tick();
        if bus.take_nmi() {
            self.lines.raise(Interrupt::Nmi);
        }
        if bus.irq_asserted() {
            self.lines.raise(Interrupt::Irq);
        }
    }

    pub(crate) fn read_byte<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.cycle(bus);
        bus.read(addr)
    }

    pub(crate) fn write_byte<B: CpuBus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        self.cycle(bus);
        bus.write(addr, value);
    }

    pub(crate) fn read_word<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let low = self.read_byte(bus, addr);
        let high = self.read_byte(bus, addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Read a word whose high byte wraps within the same page, the pointer
    /// behavior of indirect addressing on this hardware.
    pub(crate) fn read_word_same_page<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let low = self.read_byte(bus, addr);
        let high = self.read_byte(bus, high_addr);
        u16::from_le_bytes([low, high])
    }

    /// Advance PC by `delta` (wrapping), returning the previous value.
    pub(crate) fn advance_pc(&mut self, delta: u16) -> u16 {
        let previous = self.regs.pc;
        self.regs.pc = self.regs.pc.wrapping_add(delta);
        previous
    }

    pub(crate) fn fetch<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.advance_pc(1);
        self.read_byte(bus, addr)
    }

    pub(crate) fn fetch_word<B: CpuBus>(&mut self, bus: &mut B) -> u16 {
        let low = self.fetch(bus);
        let high = self.fetch(bus);
        u16::from_le_bytes([low, high])
    }

    // ---------------------------------------------------------------------
    // Stack access
    // ---------------------------------------------------------------------

    pub(crate) fn push_byte<B: CpuBus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        self.write_byte(bus, addr, value);
    }

    pub(crate) fn push_word<B: CpuBus>(&mut self, bus: &mut B, value: u16) {
        self.push_byte(bus, (value >> 8) as u8);
        self.push_byte(bus, value as u8);
    }

    pub(crate) fn pull_byte<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pull();
        self.read_byte(bus, addr)
    }

    pub(crate) fn pull_word<B: CpuBus>(&mut self, bus: &mut B) -> u16 {
        let low = self.pull_byte(bus);
        let high = self.pull_byte(bus);
        u16::from_le_bytes([low, high])
    }
}

impl Default for Ricoh2a03 {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for Ricoh2a03 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" => Some(self.regs.s.into()),
            "p" => Some(self.regs.p.to_pushed_byte(false).into()),
            "halted" => Some(self.halted.into()),
            "flags.c" => Some(self.regs.p.carry.into()),
            "flags.z" => Some(self.regs.p.zero.into()),
            "flags.i" => Some(self.regs.p.interrupt_disable.into()),
            "flags.d" => Some(self.regs.p.decimal.into()),
            "flags.v" => Some(self.regs.p.overflow.into()),
            "flags.n" => Some(self.regs.p.negative.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "halted", "flags.c", "flags.z", "flags.i", "flags.d",
            "flags.v", "flags.n",
        ]
    }
}
