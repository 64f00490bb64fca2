// Emulator module - the assembled console
//
// `Emulator` owns the CPU and the bus (which in turn owns the PPU, the
// mapper, and the controllers) and exposes the host-facing surface: power,
// one-frame stepping, push-style input, frame pixels, and live state
// cloning. There are no reference cycles anywhere in the machine; the CPU
// and PPU meet only through method calls on the bus.

mod config;

pub use config::{ConfigError, EmulatorConfig};

use crate::bus::{Bus, FrameCallback, InputSource};
use crate::cartridge::{create_mapper, Cartridge, RomError};
use crate::cpu::Cpu;
use crate::input::ButtonState;

/// A powered NES: cartridge in, controllers wired, ready to run frames
#[derive(Clone)]
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    config: EmulatorConfig,
}

impl Emulator {
    /// Build an instance from raw iNES bytes
    ///
    /// The caller still has to [`power`](Self::power) it before running
    /// frames, mirroring the real console's power switch.
    ///
    /// # Errors
    ///
    /// Returns [`RomError`] for malformed images and unsupported mappers.
    pub fn new(rom_bytes: &[u8], config: EmulatorConfig) -> Result<Self, RomError> {
        let mut cartridge = Cartridge::from_ines_bytes(rom_bytes)?;
        if let Some(mapper) = config.mapper_override {
            log::info!(
                "overriding header mapper {} with {}",
                cartridge.mapper,
                mapper
            );
            cartridge.mapper = mapper;
        }

        let mapper = create_mapper(cartridge)?;
        let mut bus = Bus::new(mapper);
        bus.controller.connect_second(config.connect_second_controller);

        Ok(Emulator {
            cpu: Cpu::new(),
            bus,
            config,
        })
    }

    /// Install the per-frame pixel hook (shared with clones)
    pub fn with_frame_callback(mut self, callback: FrameCallback) -> Self {
        self.bus.set_frame_callback(callback);
        self
    }

    /// Install the controller-state provider (shared with clones)
    pub fn with_input_source(mut self, source: InputSource) -> Self {
        self.bus.set_input_source(source);
        self
    }

    /// Run the power-on sequence
    ///
    /// The CPU executes its RESET sequence (loading PC from $FFFC), then
    /// the PPU and the clock return to dot zero of frame zero.
    pub fn power(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.bus.ppu.reset();
        self.bus.reset_counters();
    }

    /// Emulate exactly one video frame (29,781 CPU cycles)
    ///
    /// The frame callback fires once from inside this call, at dot 0 of
    /// scanline 240.
    pub fn run_frame(&mut self) {
        self.cpu.run_frame(&mut self.bus);
    }

    /// Execute a single CPU instruction; for tools and tests
    ///
    /// Polls interrupts first, exactly as the frame loop does, so stepped
    /// and free-running execution follow the same path.
    pub fn step_instruction(&mut self) {
        self.cpu.poll_interrupts(&mut self.bus);
        self.cpu.step_instruction(&mut self.bus);
    }

    /// Deep-copy the machine for save-state use
    ///
    /// All hardware state is duplicated; the host hooks are shared, so
    /// both copies keep talking to the same front-end. Running identical
    /// frames on both copies yields bit-identical results.
    pub fn clone_state(&self) -> Emulator {
        self.clone()
    }

    /// Push a controller snapshot for port 1
    ///
    /// Latched by the next strobe; an installed input source takes
    /// precedence at latch time.
    pub fn set_input(&mut self, state: ButtonState) {
        self.bus.controller.set_snapshot(0, state.bits());
    }

    /// Push a controller snapshot for port 2
    pub fn set_input2(&mut self, state: ButtonState) {
        self.bus.controller.set_snapshot(1, state.bits());
    }

    /// Borrow the current 256x240 RGBA framebuffer
    pub fn pixels(&self) -> &[u8] {
        self.bus.ppu.pixels()
    }

    /// Frames completed since power-on
    pub fn frame_count(&self) -> u64 {
        self.bus.ppu.frame_count()
    }

    /// CPU cycles elapsed since power-on
    pub fn cycle_count(&self) -> u64 {
        self.bus.cycle_count()
    }

    /// One nestest-style trace line for the instruction at PC
    pub fn trace(&self) -> String {
        self.cpu.trace(&self.bus)
    }

    /// Active configuration
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}
