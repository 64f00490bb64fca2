// Bus module - CPU memory map and the tick fan-out
//
// The bus owns everything the CPU can see and is also the system's clock:
// every CPU bus access (and every internal idle cycle) calls `tick`, which
// advances the PPU three dots, delivers a finished frame to the host,
// latches the PPU's NMI edge, and burns one cycle of the frame budget.
// Mapper writes reconfigure address translation immediately, and the
// mapper's IRQ level is read through on demand, so no component stores a
// reference to any other.
//
// # CPU memory map
//
// ```text
// $0000-$1FFF: 2KB internal RAM, mirrored every $0800
// $2000-$3FFF: PPU registers, mirrored every 8 bytes
// $4014:       OAM DMA trigger (write only)
// $4016:       Controller strobe (write) / port 1 data (read)
// $4017:       Port 2 data (read)
// $4020-$FFFF: Cartridge space (PRG-ROM, PRG-RAM, mapper registers)
// ```

use crate::cartridge::Mapper;
use crate::input::{ButtonState, Controller};
use crate::ppu::Ppu;
use std::cell::RefCell;
use std::rc::Rc;

/// Host hook receiving a borrowed RGBA frame once per video frame
///
/// Shared handles survive `clone_state`: both copies keep delivering
/// frames to the same host.
pub type FrameCallback = Rc<RefCell<dyn FnMut(&[u8])>>;

/// Host hook polled for the controller state on each strobe latch
pub type InputSource = Rc<RefCell<dyn FnMut() -> ButtonState>>;

/// Internal RAM size (2KB)
const RAM_SIZE: usize = 0x800;

/// The CPU-visible system: RAM, PPU, cartridge, controllers, and the clock
#[derive(Clone)]
pub struct Bus {
    ram: [u8; RAM_SIZE],
    pub(crate) ppu: Ppu,
    pub(crate) mapper: Mapper,
    pub(crate) controller: Controller,

    frame_callback: Option<FrameCallback>,
    input_source: Option<InputSource>,

    /// CPU cycles elapsed since power-on
    cycles: u64,
    /// Frame budget; `run_frame` returns when it reaches zero
    remaining: i32,
    /// NMI edge latched from the PPU, cleared when the CPU takes it
    nmi_pending: bool,

    #[cfg(test)]
    irq_override: Option<bool>,
}

impl Bus {
    pub fn new(mapper: Mapper) -> Self {
        Bus {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            mapper,
            controller: Controller::new(),
            frame_callback: None,
            input_source: None,
            cycles: 0,
            remaining: 0,
            nmi_pending: false,
            #[cfg(test)]
            irq_override: None,
        }
    }

    /// Install the per-frame pixel hook
    pub fn set_frame_callback(&mut self, callback: FrameCallback) {
        self.frame_callback = Some(callback);
    }

    /// Install the controller-state provider
    pub fn set_input_source(&mut self, source: InputSource) {
        self.input_source = Some(source);
    }

    /// Borrow the PPU, e.g. to inspect timing or the framebuffer
    pub fn ppu(&self) -> &crate::ppu::Ppu {
        &self.ppu
    }

    // ========================================
    // Clock
    // ========================================

    /// Advance one CPU cycle: three PPU dots, then the budget
    pub fn tick(&mut self) {
        self.cycles = self.cycles.wrapping_add(1);
        self.remaining -= 1;

        for _ in 0..3 {
            if self.ppu.step(&mut self.mapper) {
                if let Some(callback) = &self.frame_callback {
                    (callback.borrow_mut())(self.ppu.pixels());
                }
            }
        }

        if self.ppu.take_nmi() {
            self.nmi_pending = true;
        }
    }

    /// Add to the frame budget (29,781 per video frame)
    pub fn add_cycles(&mut self, cycles: i32) {
        self.remaining += cycles;
    }

    pub fn remaining_cycles(&self) -> i32 {
        self.remaining
    }

    /// Total CPU cycles since power-on
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    /// Zero the clock at power-on
    pub(crate) fn reset_counters(&mut self) {
        self.cycles = 0;
        self.remaining = 0;
        self.nmi_pending = false;
    }

    // ========================================
    // Interrupt plumbing
    // ========================================

    /// Consume the latched NMI edge
    pub fn take_nmi(&mut self) -> bool {
        let pending = self.nmi_pending;
        self.nmi_pending = false;
        pending
    }

    /// Level of the IRQ line (cartridge mappers are the only source here)
    pub fn irq_line(&self) -> bool {
        #[cfg(test)]
        if let Some(level) = self.irq_override {
            return level;
        }
        self.mapper.irq_line()
    }

    #[cfg(test)]
    pub(crate) fn force_irq_line(&mut self, level: bool) {
        self.irq_override = Some(level);
    }

    // ========================================
    // Memory access
    // ========================================

    /// Read a byte; costs one cycle
    pub fn read(&mut self, addr: u16) -> u8 {
        self.tick();
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self
                .ppu
                .read_register(&mut self.mapper, addr & crate::ppu::constants::PPU_REGISTER_MASK),
            0x4016 => self.controller.read(0),
            0x4017 => self.controller.read(1),
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
            // Unpopulated APU/I-O space
            _ => 0,
        }
    }

    /// Write a byte; costs one cycle (plus 512 for an OAM DMA burst)
    pub fn write(&mut self, addr: u16, value: u8) {
        self.tick();
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => self.ppu.write_register(
                &mut self.mapper,
                addr & crate::ppu::constants::PPU_REGISTER_MASK,
                value,
            ),
            0x4014 => self.oam_dma(value),
            0x4016 => self.write_controller(value),
            0x4020..=0xFFFF => self.mapper.write_prg(addr, value),
            _ => {}
        }
    }

    /// Side-effect-free read for trace and debug paths
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.bus_latch,
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
            _ => 0,
        }
    }

    /// Stream 256 bytes from `page * $100` into OAM through OAMDATA
    ///
    /// Every byte is one ticked read plus one ticked write, so the burst
    /// costs 512 cycles on top of the triggering store.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for offset in 0..256 {
            let value = self.read(base + offset);
            self.write(0x2004, value);
        }
    }

    /// $4016 write: strobe the controllers, polling the host on the
    /// falling edge
    fn write_controller(&mut self, value: u8) {
        if self.controller.strobe() && value & 0x01 == 0 {
            if let Some(source) = &self.input_source {
                let state = (source.borrow_mut())();
                self.controller.set_snapshot(0, state.bits());
            }
        }
        self.controller.write(value);
    }
}
