//! iNES cartridge parsing and the mapper seam.
//!
//! The core consumes cartridges through the `Mapper` trait only; banking
//! schemes beyond NROM are external concerns. Malformed images are rejected
//! here, at load time; nothing invalid ever reaches the processor.

/// Mapper trait: translates CPU-space cartridge accesses ($4020-$FFFF).
pub trait Mapper: std::fmt::Debug {
    fn cpu_read(&self, addr: u16) -> u8;
    fn cpu_write(&mut self, addr: u16, value: u8);

    /// Invoked once after power-on/cartridge insert, before the other units
    /// reset. Default: stateless mappers have nothing to do.
    fn reset(&mut self) {}

    /// Whether the mapper is asserting the IRQ line. Default: no IRQ.
    fn irq_pending(&self) -> bool {
        false
    }
}

/// NROM (mapper 0): no bank switching.
///
/// 16K PRG is mirrored at $8000-$FFFF; 32K maps directly.
#[derive(Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
}

impl Nrom {
    #[must_use]
    pub fn new(prg_rom: Vec<u8>) -> Self {
        Self { prg_rom }
    }
}

impl Mapper for Nrom {
    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => {
                let offset = usize::from(addr - 0x8000);
                self.prg_rom[offset % self.prg_rom.len()]
            }
            _ => 0,
        }
    }

    fn cpu_write(&mut self, _addr: u16, _value: u8) {
        // NROM has no writable PRG area.
    }
}

const INES_MAGIC: [u8; 4] = *b"NES\x1a";
const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_BANK_LEN: usize = 16384;
const CHR_BANK_LEN: usize = 8192;

/// Parse an iNES image into a mapper.
///
/// # Errors
///
/// Returns an error for a missing/invalid header, a truncated image, a
/// PRG-less image, or an unsupported mapper number.
pub fn parse_ines(data: &[u8]) -> Result<Box<dyn Mapper>, String> {
    if data.len() < HEADER_LEN || data[0..4] != INES_MAGIC {
        return Err("not an iNES file".into());
    }

    let prg_banks = usize::from(data[4]);
    let chr_banks = usize::from(data[5]);
    if prg_banks == 0 {
        return Err("iNES image has no PRG ROM".into());
    }

    let mapper_number = (data[6] >> 4) | (data[7] & 0xF0);
    let has_trainer = data[6] & 0x04 != 0;

    let prg_start = HEADER_LEN + if has_trainer { TRAINER_LEN } else { 0 };
    let prg_len = prg_banks * PRG_BANK_LEN;
    let chr_len = chr_banks * CHR_BANK_LEN;
    if data.len() < prg_start + prg_len + chr_len {
        return Err(format!(
            "iNES image truncated: expected {} bytes of PRG+CHR",
            prg_len + chr_len
        ));
    }

    let prg_rom = data[prg_start..prg_start + prg_len].to_vec();
    // CHR data is validated but not kept: nothing in this core reads
    // PPU-side memory.

    match mapper_number {
        0 => Ok(Box::new(Nrom::new(prg_rom))),
        n => Err(format!("unsupported mapper {n}")),
    }
}
