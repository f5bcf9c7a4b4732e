//! Cycle-accurate NES machine core.
//!
//! Wires the Ricoh 2A03 CPU to the machine around it: the memory-mapped
//! bus, the sprite DMA engine and the video chip's clock, all advancing in
//! lockstep at the hardware's 1 CPU : 3 PPU cycle ratio. Pixel rendering
//! and audio synthesis are out of scope; their chips are modeled down to
//! exactly the state this core can observe.

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod dma;
pub mod nes;
pub mod ppu;

pub use bus::NesBus;
pub use config::{NesConfig, NesRegion};
pub use nes::{FrameOutcome, Nes};
