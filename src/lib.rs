// NES emulator core
//
// A cycle-stepped emulation of the NES: 6502 CPU, 2C02 PPU, the four
// common cartridge mapper families, and the controller serial ports,
// composed behind a small host-facing instance type. The host feeds in
// raw iNES bytes and controller snapshots and receives a 256x240 RGBA
// frame 60 times a second; presentation, audio, and input acquisition
// stay on the host side.

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod emulator;
pub mod input;
pub mod ppu;

// Re-export the main types for convenience
pub use bus::{Bus, FrameCallback, InputSource};
pub use cartridge::{Cartridge, Mapper, Mirroring, RomError};
pub use cpu::Cpu;
pub use emulator::{ConfigError, Emulator, EmulatorConfig};
pub use input::{ButtonState, Controller};
pub use ppu::constants::{FRAME_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use ppu::Ppu;
