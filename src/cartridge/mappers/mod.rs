// Mappers module - cartridge address decoding circuits
//
// Each supported board lives in its own file; `Mapper` folds them into one
// closed set so the rest of the console can hold a concrete, cheaply
// cloneable value instead of a trait object. Mirroring changes and the IRQ
// level are exposed as queryable state and picked up by the scheduler after
// every access, which keeps the CPU, PPU, and mapper free of reference
// cycles.

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper4;

use super::{Cartridge, Mirroring, RomError};

pub use mapper0::{Nrom128, Nrom256};
pub use mapper1::Mmc1;
pub use mapper2::Uxrom;
pub use mapper4::Mmc3;

/// The closed set of supported cartridge boards
#[derive(Debug, Clone)]
pub enum Mapper {
    Nrom128(Nrom128),
    Nrom256(Nrom256),
    Uxrom(Uxrom),
    Mmc1(Mmc1),
    Mmc3(Mmc3),
}

impl Mapper {
    /// Read from CPU-visible cartridge space ($4020-$FFFF)
    pub fn read_prg(&self, addr: u16) -> u8 {
        match self {
            Mapper::Nrom128(m) => m.read_prg(addr),
            Mapper::Nrom256(m) => m.read_prg(addr),
            Mapper::Uxrom(m) => m.read_prg(addr),
            Mapper::Mmc1(m) => m.read_prg(addr),
            Mapper::Mmc3(m) => m.read_prg(addr),
        }
    }

    /// Write to CPU-visible cartridge space; may reconfigure banking
    pub fn write_prg(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::Nrom128(m) => m.write_prg(addr, value),
            Mapper::Nrom256(m) => m.write_prg(addr, value),
            Mapper::Uxrom(m) => m.write_prg(addr, value),
            Mapper::Mmc1(m) => m.write_prg(addr, value),
            Mapper::Mmc3(m) => m.write_prg(addr, value),
        }
    }

    /// Read pattern-table space ($0000-$1FFF)
    pub fn read_chr(&self, addr: u16) -> u8 {
        match self {
            Mapper::Nrom128(m) => m.read_chr(addr),
            Mapper::Nrom256(m) => m.read_chr(addr),
            Mapper::Uxrom(m) => m.read_chr(addr),
            Mapper::Mmc1(m) => m.read_chr(addr),
            Mapper::Mmc3(m) => m.read_chr(addr),
        }
    }

    /// Write pattern-table space (effective on CHR-RAM boards only)
    pub fn write_chr(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::Nrom128(m) => m.write_chr(addr, value),
            Mapper::Nrom256(m) => m.write_chr(addr, value),
            Mapper::Uxrom(m) => m.write_chr(addr, value),
            Mapper::Mmc1(m) => m.write_chr(addr, value),
            Mapper::Mmc3(m) => m.write_chr(addr, value),
        }
    }

    /// Per-scanline clock from the PPU (only MMC3 listens)
    pub fn on_scanline(&mut self) {
        if let Mapper::Mmc3(m) = self {
            m.on_scanline();
        }
    }

    /// Current nametable mirroring (MMC1 and MMC3 can change it at runtime)
    pub fn mirroring(&self) -> Mirroring {
        match self {
            Mapper::Nrom128(m) => m.mirroring(),
            Mapper::Nrom256(m) => m.mirroring(),
            Mapper::Uxrom(m) => m.mirroring(),
            Mapper::Mmc1(m) => m.mirroring(),
            Mapper::Mmc3(m) => m.mirroring(),
        }
    }

    /// Level of the cartridge IRQ line
    pub fn irq_line(&self) -> bool {
        match self {
            Mapper::Mmc3(m) => m.irq_line(),
            _ => false,
        }
    }
}

/// Build the mapper for a parsed cartridge
///
/// Mapper 0 splits on PRG size: a single 16KB bank selects NROM-128,
/// anything larger NROM-256.
///
/// # Errors
///
/// Returns [`RomError::UnsupportedMapper`] for numbers outside the
/// supported set.
pub fn create_mapper(cartridge: Cartridge) -> Result<Mapper, RomError> {
    match cartridge.mapper {
        0 => {
            if cartridge.prg_rom.len() <= 16 * 1024 {
                Ok(Mapper::Nrom128(Nrom128::new(cartridge)))
            } else {
                Ok(Mapper::Nrom256(Nrom256::new(cartridge)))
            }
        }
        1 => Ok(Mapper::Mmc1(Mmc1::new(cartridge))),
        2 => Ok(Mapper::Uxrom(Uxrom::new(cartridge))),
        4 => Ok(Mapper::Mmc3(Mmc3::new(cartridge))),
        number => Err(RomError::UnsupportedMapper(number)),
    }
}
