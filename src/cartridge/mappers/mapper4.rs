// Mapper 4 (MMC3 / TxROM) - 8KB PRG banking, fine CHR banking, scanline IRQ
//
// Memory layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$9FFF: 8KB PRG bank (switchable, or second-to-last in mode 1)
// - CPU $A000-$BFFF: 8KB PRG bank (always switchable)
// - CPU $C000-$DFFF: 8KB PRG bank (second-to-last, or switchable in mode 1)
// - CPU $E000-$FFFF: 8KB PRG bank, fixed to the last bank
// - PPU $0000-$1FFF: eight 1KB CHR slots, filled from two 2KB and four 1KB
//   banks whose halves swap with the CHR mode bit
//
// Register decode uses `addr & 0xE001`:
//   $8000 bank select   $8001 bank data      $A000 mirroring
//   $C000 IRQ period    $C001 IRQ reload     $E000 IRQ disable+ack
//   $E001 IRQ enable
//
// The IRQ counter is clocked once per visible scanline by the PPU; it
// reloads from the period at zero, otherwise decrements, and raises the
// CPU IRQ line when it reaches zero while enabled.

use crate::cartridge::{Cartridge, Mirroring};

/// PRG bank size (8KB)
const PRG_BANK_SIZE: usize = 8 * 1024;

/// CHR slot size (1KB)
const CHR_SLOT_SIZE: usize = 1024;

/// PRG-RAM size (8KB)
const PRG_RAM_SIZE: usize = 8 * 1024;

/// Mapper 4 implementation (MMC3)
#[derive(Debug, Clone)]
pub struct Mmc3 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,

    /// Bank data registers R0-R7
    regs: [u8; 8],
    /// Bank select register ($8000): target in bits 0-2, PRG mode bit 6,
    /// CHR mode bit 7
    reg_control: u8,
    mirroring: Mirroring,

    /// Resolved PRG offsets for the four 8KB windows
    prg_slot: [usize; 4],
    /// Resolved CHR offsets for the eight 1KB slots
    chr_slot: [usize; 8],

    irq_period: u8,
    irq_counter: u8,
    irq_enabled: bool,
    irq_line: bool,
}

impl Mmc3 {
    pub fn new(cartridge: Cartridge) -> Self {
        let chr_is_ram = cartridge.chr_rom.is_empty();
        let mut mapper = Mmc3 {
            prg_rom: cartridge.prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr: if chr_is_ram {
                vec![0; 8 * 1024]
            } else {
                cartridge.chr_rom
            },
            chr_is_ram,
            regs: [0; 8],
            reg_control: 0,
            mirroring: cartridge.mirroring,
            prg_slot: [0; 4],
            chr_slot: [0; 8],
            irq_period: 0,
            irq_counter: 0,
            irq_enabled: false,
            irq_line: false,
        };
        mapper.update_slots();
        mapper
    }

    /// Recompute the bank windows from the registers
    fn update_slots(&mut self) {
        let prg_len = self.prg_rom.len();
        let chr_len = self.chr.len();
        let bank = |reg: u8| (reg as usize * PRG_BANK_SIZE) % prg_len;

        // $A000 window is switchable in both modes; $E000 is pinned last
        self.prg_slot[1] = bank(self.regs[7]);
        self.prg_slot[3] = prg_len.saturating_sub(PRG_BANK_SIZE);

        if self.reg_control & 0x40 == 0 {
            // PRG mode 0: switchable at $8000, second-to-last at $C000
            self.prg_slot[0] = bank(self.regs[6]);
            self.prg_slot[2] = prg_len.saturating_sub(2 * PRG_BANK_SIZE);
        } else {
            // PRG mode 1: the two windows swap
            self.prg_slot[0] = prg_len.saturating_sub(2 * PRG_BANK_SIZE);
            self.prg_slot[2] = bank(self.regs[6]);
        }

        // R0/R1 address 2KB banks (low bit ignored), R2-R5 address 1KB banks
        let wide = |reg: u8| ((reg as usize >> 1) * 2 * CHR_SLOT_SIZE) % chr_len;
        let narrow = |reg: u8| (reg as usize * CHR_SLOT_SIZE) % chr_len;

        if self.reg_control & 0x80 == 0 {
            // CHR mode 0: 2KB banks low, 1KB banks high
            self.chr_slot[0] = wide(self.regs[0]);
            self.chr_slot[1] = self.chr_slot[0] + CHR_SLOT_SIZE;
            self.chr_slot[2] = wide(self.regs[1]);
            self.chr_slot[3] = self.chr_slot[2] + CHR_SLOT_SIZE;
            self.chr_slot[4] = narrow(self.regs[2]);
            self.chr_slot[5] = narrow(self.regs[3]);
            self.chr_slot[6] = narrow(self.regs[4]);
            self.chr_slot[7] = narrow(self.regs[5]);
        } else {
            // CHR mode 1: 1KB banks low, 2KB banks high
            self.chr_slot[0] = narrow(self.regs[2]);
            self.chr_slot[1] = narrow(self.regs[3]);
            self.chr_slot[2] = narrow(self.regs[4]);
            self.chr_slot[3] = narrow(self.regs[5]);
            self.chr_slot[4] = wide(self.regs[0]);
            self.chr_slot[5] = self.chr_slot[4] + CHR_SLOT_SIZE;
            self.chr_slot[6] = wide(self.regs[1]);
            self.chr_slot[7] = self.chr_slot[6] + CHR_SLOT_SIZE;
        }
    }

    fn chr_offset(&self, addr: u16) -> usize {
        let slot = (addr as usize / CHR_SLOT_SIZE) & 0x07;
        (self.chr_slot[slot] + addr as usize % CHR_SLOT_SIZE) % self.chr.len()
    }

    pub fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[addr as usize % PRG_RAM_SIZE],
            0x8000..=0xFFFF => {
                let slot = ((addr as usize - 0x8000) / PRG_BANK_SIZE) & 0x03;
                let offset = self.prg_slot[slot] + addr as usize % PRG_BANK_SIZE;
                self.prg_rom[offset % self.prg_rom.len()]
            }
            _ => 0,
        }
    }

    pub fn write_prg(&mut self, addr: u16, value: u8) {
        if addr < 0x6000 {
            return;
        }
        if addr < 0x8000 {
            self.prg_ram[addr as usize % PRG_RAM_SIZE] = value;
            return;
        }

        match addr & 0xE001 {
            0x8000 => self.reg_control = value,
            0x8001 => self.regs[(self.reg_control & 0x07) as usize] = value,
            0xA000 => {
                self.mirroring = if value & 0x01 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                };
            }
            0xC000 => self.irq_period = value,
            0xC001 => self.irq_counter = 0,
            0xE000 => {
                // Disabling also acknowledges a pending IRQ
                self.irq_enabled = false;
                self.irq_line = false;
            }
            0xE001 => self.irq_enabled = true,
            _ => {}
        }
        self.update_slots();
    }

    pub fn read_chr(&self, addr: u16) -> u8 {
        if addr >= 0x2000 {
            return 0;
        }
        self.chr[self.chr_offset(addr)]
    }

    pub fn write_chr(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram && addr < 0x2000 {
            let offset = self.chr_offset(addr);
            self.chr[offset] = value;
        }
    }

    /// Scanline clock from the PPU (A12 rising-edge proxy)
    pub fn on_scanline(&mut self) {
        if self.irq_counter == 0 {
            self.irq_counter = self.irq_period;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_enabled && self.irq_counter == 0 {
            self.irq_line = true;
        }
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn irq_line(&self) -> bool {
        self.irq_line
    }
}
