//! NES bus: CPU address routing and the per-cycle clock fan-out.
//!
//! Implements `famicore_core::Bus` for address decoding and
//! `famicore_core::Tickable` for the tick fan-out: every CPU cycle advances
//! the sprite DMA engine by one half-cycle and the video chip by exactly
//! three ticks, in that order, before the CPU touches the bus again. The
//! fan-out is atomic from the CPU's point of view: no instruction observes
//! a partially-advanced machine.
//!
//! The NES is fully memory-mapped — there is no separate I/O address space.

use famicore_core::{Bus, Tickable, Ticks};
use ricoh_2a03::CpuBus;

use crate::apu::Apu;
use crate::cartridge::Mapper;
use crate::config::NesRegion;
use crate::dma::OamDma;
use crate::ppu::Ppu;

/// Sprite DMA trigger register.
const OAM_DMA: u16 = 0x4014;

/// The NES bus.
pub struct NesBus {
    /// 2K internal RAM ($0000-$07FF, mirrored to $1FFF).
    pub ram: [u8; 2048],
    /// Video chip (narrow model).
    pub ppu: Ppu,
    /// Audio chip register stub.
    pub apu: Apu,
    /// Sprite DMA engine.
    pub dma: OamDma,
    /// Cartridge mapper.
    pub cartridge: Box<dyn Mapper>,
    /// CPU cycles consumed since power-on.
    cycles: Ticks,
}

impl NesBus {
    #[must_use]
    pub fn new(cartridge: Box<dyn Mapper>, region: NesRegion) -> Self {
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(region),
            apu: Apu::new(),
            dma: OamDma::new(),
            cartridge,
            cycles: Ticks::ZERO,
        }
    }

    /// Peek a byte from RAM without side effects (for observation).
    #[must_use]
    pub fn peek_ram(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr & 0x07FF)]
    }

    /// CPU cycles consumed since power-on.
    #[must_use]
    pub fn cycles(&self) -> Ticks {
        self.cycles
    }

    /// One sprite-DMA half-cycle: on carrying half-cycles, move a byte from
    /// the source page into primary OAM. Reads below $2000 go through the
    /// internal RAM mirror; anything else takes the full bus path. Deposits
    /// are suppressed while the video chip is rendering, but the OAM cursor
    /// advances regardless.
    fn dma_half_cycle(&mut self) {
        let Some(addr) = self.dma.advance() else {
            return;
        };
        let data = if addr < 0x2000 {
            self.ram[usize::from(addr & 0x07FF)]
        } else {
            self.read(addr)
        };
        if !self.ppu.rendering_active() {
            self.ppu.oam[usize::from(self.ppu.oam_addr)] = data;
        }
        self.ppu.oam_addr = self.ppu.oam_addr.wrapping_add(1);
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => self.ppu.read_register(addr & 0x0007),
            OAM_DMA => 0, // Write-only
            0x4000..=0x4017 => self.apu.read(addr),
            0x4018..=0x401F => 0, // Normally disabled test mode
            0x4020..=0xFFFF => self.cartridge.cpu_read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)] = value,
            0x2000..=0x3FFF => self.ppu.write_register(addr & 0x0007, value),
            OAM_DMA => self.dma.begin_transfer(value),
            0x4000..=0x4017 => self.apu.write(addr, value),
            0x4018..=0x401F => {} // Test mode registers
            0x4020..=0xFFFF => self.cartridge.cpu_write(addr, value),
        }
    }
}

impl Tickable for NesBus {
    /// The clock coordinator: one CPU cycle fans out to one DMA half-cycle,
    /// then three video ticks.
    fn tick(&mut self) {
        self.cycles += Ticks::new(1);
        self.dma_half_cycle();
        self.ppu.tick();
        self.ppu.tick();
        self.ppu.tick();
    }
}

impl CpuBus for NesBus {
    fn dma_active(&self) -> bool {
        self.dma.is_blocking()
    }

    fn take_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }

    fn irq_asserted(&self) -> bool {
        self.cartridge.irq_pending()
    }

    fn audio_frame_counter(&self) -> u8 {
        self.apu.frame_counter_last()
    }
}
