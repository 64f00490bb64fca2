//! PPU unit tests
//!
//! Organized by functionality: register behavior, scroll hardware,
//! frame timing, and the rendering pipeline.

use super::constants::*;
use super::*;
use crate::cartridge::{create_mapper, Cartridge, Mapper, Mirroring};

// ========================================
// Test helpers
// ========================================

/// A CHR-RAM NROM-256 board, enough for every PPU test
pub(crate) fn test_mapper() -> Mapper {
    let cartridge = Cartridge {
        prg_rom: vec![0; 32 * 1024],
        chr_rom: Vec::new(),
        mapper: 0,
        mirroring: Mirroring::Horizontal,
    };
    create_mapper(cartridge).unwrap()
}

/// Write one byte through PPUADDR/PPUDATA
pub(crate) fn vram_write(ppu: &mut Ppu, mapper: &mut Mapper, addr: u16, value: u8) {
    ppu.write_register(mapper, 6, (addr >> 8) as u8);
    ppu.write_register(mapper, 6, (addr & 0xFF) as u8);
    ppu.write_register(mapper, 7, value);
}

/// Read one byte through PPUADDR/PPUDATA (buffered for non-palette)
pub(crate) fn vram_read(ppu: &mut Ppu, mapper: &mut Mapper, addr: u16) -> u8 {
    ppu.write_register(mapper, 6, (addr >> 8) as u8);
    ppu.write_register(mapper, 6, (addr & 0xFF) as u8);
    if addr < 0x3F00 {
        ppu.read_register(mapper, 7); // prime the buffer
    }
    ppu.read_register(mapper, 7)
}

/// Step until the given scanline/dot position comes up next
pub(crate) fn step_to(ppu: &mut Ppu, mapper: &mut Mapper, scanline: u16, dot: u16) {
    while !(ppu.scanline() == scanline && ppu.dot() == dot) {
        ppu.step(mapper);
    }
}

/// Run a full frame, returning how many times the frame flag fired
pub(crate) fn run_frame(ppu: &mut Ppu, mapper: &mut Mapper) -> u32 {
    let mut frames = 0;
    let start = ppu.frame_count();
    while ppu.frame_count() == start {
        if ppu.step(mapper) {
            frames += 1;
        }
    }
    frames
}

// ========================================
// Test modules
// ========================================

mod scrolling;
