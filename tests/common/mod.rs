// Shared helpers for the integration suites: build iNES images in memory
// and hand-assemble the small 6502 programs the scenarios need.

#![allow(dead_code)]

use nes_core::{Emulator, EmulatorConfig};

/// iNES header size
pub const HEADER_SIZE: usize = 16;

/// Route `log` output through the test harness (RUST_LOG to enable)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a zero-filled iNES image
pub fn build_ines(mapper: u8, prg_banks: u8, chr_banks: u8, vertical: bool) -> Vec<u8> {
    let mut rom = vec![0u8; HEADER_SIZE];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = prg_banks;
    rom[5] = chr_banks;
    rom[6] = ((mapper & 0x0F) << 4) | (vertical as u8);
    rom[7] = mapper & 0xF0;
    rom.extend(vec![0u8; prg_banks as usize * 16 * 1024]);
    rom.extend(vec![0u8; chr_banks as usize * 8 * 1024]);
    rom
}

/// Patch bytes at an offset into PRG-ROM
pub fn patch_prg(rom: &mut [u8], offset: usize, bytes: &[u8]) {
    let start = HEADER_SIZE + offset;
    rom[start..start + bytes.len()].copy_from_slice(bytes);
}

/// Write the interrupt vectors into the last PRG bytes
pub fn set_vectors(rom: &mut [u8], prg_banks: u8, nmi: u16, reset: u16, irq: u16) {
    let prg_end = prg_banks as usize * 16 * 1024;
    patch_prg(
        rom,
        prg_end - 6,
        &[
            nmi as u8,
            (nmi >> 8) as u8,
            reset as u8,
            (reset >> 8) as u8,
            irq as u8,
            (irq >> 8) as u8,
        ],
    );
}

/// A powered NROM-256 instance running `program` from $8000
///
/// The NMI vector points at $8080 and the IRQ vector at $80C0, so tests
/// can drop handlers there with [`patch_prg`] before construction, or use
/// this helper's sibling below.
pub fn nrom_instance(program: &[u8]) -> Emulator {
    nrom_instance_with_handlers(program, &[0x40], &[0x40]) // bare RTIs
}

/// Like [`nrom_instance`], with explicit NMI and IRQ handler bodies
pub fn nrom_instance_with_handlers(program: &[u8], nmi: &[u8], irq: &[u8]) -> Emulator {
    let mut rom = build_ines(0, 2, 0, false);
    patch_prg(&mut rom, 0x0000, program);
    patch_prg(&mut rom, 0x0080, nmi);
    patch_prg(&mut rom, 0x00C0, irq);
    set_vectors(&mut rom, 2, 0x8080, 0x8000, 0x80C0);

    let mut nes = Emulator::new(&rom, EmulatorConfig::default()).unwrap();
    nes.power();
    nes
}
