//! Top-level NES system.
//!
//! Owns the CPU and the bus and wires them into the single clock domain:
//! every cycle the CPU consumes anywhere (instruction fetch, dummy read,
//! idle stall, interrupt entry) fans out through the bus tick to the DMA
//! engine and the video chip. The frame loop here only calls `step`; it
//! never duplicates the fan-out.

use famicore_core::{Observable, Ticks, Value};
use ricoh_2a03::{Interrupt, Ricoh2a03, StepOutcome};

use crate::bus::NesBus;
use crate::cartridge::{self, Mapper};
use crate::config::{NesConfig, NesRegion};

/// Why `run_frame` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The video chip reported a completed frame.
    Completed,
    /// An IRQ is pending but masked; control yields to the caller.
    IrqMasked,
}

/// NES system.
pub struct Nes {
    cpu: Ricoh2a03,
    bus: NesBus,
}

impl Nes {
    /// Create a NES from a configuration, parsing the cartridge image.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM data is not a loadable iNES image.
    pub fn new(config: &NesConfig) -> Result<Self, String> {
        let mapper = cartridge::parse_ines(&config.rom_data)?;
        Ok(Self::from_mapper(mapper, config.region))
    }

    /// Create a NES from a pre-parsed mapper and power it up.
    #[must_use]
    pub fn from_mapper(mapper: Box<dyn Mapper>, region: NesRegion) -> Self {
        let mut nes = Self {
            cpu: Ricoh2a03::new(),
            bus: NesBus::new(mapper, region),
        };
        nes.power_up();
        nes
    }

    /// Power-on: reset every unit, mapper first, CPU last. The CPU reset
    /// writes the RAM power-up pattern and runs the reset handler entry.
    pub fn power_up(&mut self) {
        self.bus.ram = [0; 2048];
        self.bus.cartridge.reset();
        self.bus.ppu.reset();
        self.bus.apu.reset();
        self.bus.dma.reset();
        self.cpu.reset(&mut self.bus);
    }

    /// Soft reset: raise the RESET line; the next step resolves it.
    pub fn reset(&mut self) {
        self.cpu.raise_interrupt(Interrupt::Reset);
    }

    /// Execute one CPU instruction slot.
    pub fn step(&mut self) -> StepOutcome {
        self.cpu.step(&mut self.bus)
    }

    /// Step until the video chip reports a completed frame, or until an IRQ
    /// is pending but masked, at which point control returns to the caller.
    pub fn run_frame(&mut self) -> FrameOutcome {
        self.bus.ppu.start_frame();
        loop {
            if self.cpu.step(&mut self.bus) == StepOutcome::MaskedIrq {
                return FrameOutcome::IrqMasked;
            }
            if self.bus.ppu.frame_ready() {
                return FrameOutcome::Completed;
            }
        }
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Ricoh2a03 {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut Ricoh2a03 {
        &mut self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }

    /// CPU cycles consumed since power-on.
    #[must_use]
    pub fn cycles(&self) -> Ticks {
        self.bus.cycles()
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.bus.ppu.frames()
    }
}

impl Observable for Nes {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("ppu.") {
            match rest {
                "scanline" => Some(self.bus.ppu.scanline().into()),
                "dot" => Some(self.bus.ppu.dot().into()),
                "vblank" => Some(self.bus.ppu.vblank_active().into()),
                "oam_addr" => Some(self.bus.ppu.oam_addr.into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
            {
                u16::from_str_radix(hex, 16).ok()
            } else if let Some(hex) = rest.strip_prefix('$') {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.bus.peek_ram(a)))
        } else {
            match path {
                "cycles" => Some(self.bus.cycles().get().into()),
                "frame_count" => Some(self.frame_count().into()),
                "dma.half_cycle" => Some(u64::from(self.bus.dma.half_cycle()).into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<2a03_paths>",
            "ppu.scanline",
            "ppu.dot",
            "ppu.vblank",
            "ppu.oam_addr",
            "memory.<address>",
            "dma.half_cycle",
            "cycles",
            "frame_count",
        ]
    }
}
