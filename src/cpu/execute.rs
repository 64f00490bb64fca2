// Opcode dispatch and trace logging
//
// One match arm per official encoding, in the layout of the 6502 data
// sheet. Anything outside the official set is logged and executed as a
// one-byte NOP that costs only its fetch cycle, so a runaway program can
// never wedge the emulator.

use super::addressing::AddressingMode;
use super::{flags, Cpu};
use crate::bus::Bus;

impl Cpu {
    /// Fetch, decode, and execute one instruction
    pub fn step_instruction(&mut self, bus: &mut Bus) {
        use AddressingMode::*;

        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        match opcode {
            // Loads
            0xA9 => self.lda(bus, Immediate),
            0xA5 => self.lda(bus, ZeroPage),
            0xB5 => self.lda(bus, ZeroPageX),
            0xAD => self.lda(bus, Absolute),
            0xBD => self.lda(bus, AbsoluteX),
            0xB9 => self.lda(bus, AbsoluteY),
            0xA1 => self.lda(bus, IndexedIndirect),
            0xB1 => self.lda(bus, IndirectIndexed),
            0xA2 => self.ldx(bus, Immediate),
            0xA6 => self.ldx(bus, ZeroPage),
            0xB6 => self.ldx(bus, ZeroPageY),
            0xAE => self.ldx(bus, Absolute),
            0xBE => self.ldx(bus, AbsoluteY),
            0xA0 => self.ldy(bus, Immediate),
            0xA4 => self.ldy(bus, ZeroPage),
            0xB4 => self.ldy(bus, ZeroPageX),
            0xAC => self.ldy(bus, Absolute),
            0xBC => self.ldy(bus, AbsoluteX),

            // Stores
            0x85 => self.sta(bus, ZeroPage),
            0x95 => self.sta(bus, ZeroPageX),
            0x8D => self.sta(bus, Absolute),
            0x9D => self.sta(bus, AbsoluteX),
            0x99 => self.sta(bus, AbsoluteY),
            0x81 => self.sta(bus, IndexedIndirect),
            0x91 => self.sta(bus, IndirectIndexed),
            0x86 => self.stx(bus, ZeroPage),
            0x96 => self.stx(bus, ZeroPageY),
            0x8E => self.stx(bus, Absolute),
            0x84 => self.sty(bus, ZeroPage),
            0x94 => self.sty(bus, ZeroPageX),
            0x8C => self.sty(bus, Absolute),

            // Arithmetic
            0x69 => self.adc(bus, Immediate),
            0x65 => self.adc(bus, ZeroPage),
            0x75 => self.adc(bus, ZeroPageX),
            0x6D => self.adc(bus, Absolute),
            0x7D => self.adc(bus, AbsoluteX),
            0x79 => self.adc(bus, AbsoluteY),
            0x61 => self.adc(bus, IndexedIndirect),
            0x71 => self.adc(bus, IndirectIndexed),
            0xE9 => self.sbc(bus, Immediate),
            0xE5 => self.sbc(bus, ZeroPage),
            0xF5 => self.sbc(bus, ZeroPageX),
            0xED => self.sbc(bus, Absolute),
            0xFD => self.sbc(bus, AbsoluteX),
            0xF9 => self.sbc(bus, AbsoluteY),
            0xE1 => self.sbc(bus, IndexedIndirect),
            0xF1 => self.sbc(bus, IndirectIndexed),

            // Compares
            0xC9 => self.cmp(bus, Immediate),
            0xC5 => self.cmp(bus, ZeroPage),
            0xD5 => self.cmp(bus, ZeroPageX),
            0xCD => self.cmp(bus, Absolute),
            0xDD => self.cmp(bus, AbsoluteX),
            0xD9 => self.cmp(bus, AbsoluteY),
            0xC1 => self.cmp(bus, IndexedIndirect),
            0xD1 => self.cmp(bus, IndirectIndexed),
            0xE0 => self.cpx(bus, Immediate),
            0xE4 => self.cpx(bus, ZeroPage),
            0xEC => self.cpx(bus, Absolute),
            0xC0 => self.cpy(bus, Immediate),
            0xC4 => self.cpy(bus, ZeroPage),
            0xCC => self.cpy(bus, Absolute),

            // Increments / decrements
            0xE6 => self.inc(bus, ZeroPage),
            0xF6 => self.inc(bus, ZeroPageX),
            0xEE => self.inc(bus, Absolute),
            0xFE => self.inc(bus, AbsoluteX),
            0xE8 => self.inx(bus),
            0xC8 => self.iny(bus),
            0xC6 => self.dec(bus, ZeroPage),
            0xD6 => self.dec(bus, ZeroPageX),
            0xCE => self.dec(bus, Absolute),
            0xDE => self.dec(bus, AbsoluteX),
            0xCA => self.dex(bus),
            0x88 => self.dey(bus),

            // Logic
            0x29 => self.and(bus, Immediate),
            0x25 => self.and(bus, ZeroPage),
            0x35 => self.and(bus, ZeroPageX),
            0x2D => self.and(bus, Absolute),
            0x3D => self.and(bus, AbsoluteX),
            0x39 => self.and(bus, AbsoluteY),
            0x21 => self.and(bus, IndexedIndirect),
            0x31 => self.and(bus, IndirectIndexed),
            0x09 => self.ora(bus, Immediate),
            0x05 => self.ora(bus, ZeroPage),
            0x15 => self.ora(bus, ZeroPageX),
            0x0D => self.ora(bus, Absolute),
            0x1D => self.ora(bus, AbsoluteX),
            0x19 => self.ora(bus, AbsoluteY),
            0x01 => self.ora(bus, IndexedIndirect),
            0x11 => self.ora(bus, IndirectIndexed),
            0x49 => self.eor(bus, Immediate),
            0x45 => self.eor(bus, ZeroPage),
            0x55 => self.eor(bus, ZeroPageX),
            0x4D => self.eor(bus, Absolute),
            0x5D => self.eor(bus, AbsoluteX),
            0x59 => self.eor(bus, AbsoluteY),
            0x41 => self.eor(bus, IndexedIndirect),
            0x51 => self.eor(bus, IndirectIndexed),
            0x24 => self.bit(bus, ZeroPage),
            0x2C => self.bit(bus, Absolute),

            // Shifts and rotates
            0x0A => self.asl_accumulator(bus),
            0x06 => self.asl(bus, ZeroPage),
            0x16 => self.asl(bus, ZeroPageX),
            0x0E => self.asl(bus, Absolute),
            0x1E => self.asl(bus, AbsoluteX),
            0x4A => self.lsr_accumulator(bus),
            0x46 => self.lsr(bus, ZeroPage),
            0x56 => self.lsr(bus, ZeroPageX),
            0x4E => self.lsr(bus, Absolute),
            0x5E => self.lsr(bus, AbsoluteX),
            0x2A => self.rol_accumulator(bus),
            0x26 => self.rol(bus, ZeroPage),
            0x36 => self.rol(bus, ZeroPageX),
            0x2E => self.rol(bus, Absolute),
            0x3E => self.rol(bus, AbsoluteX),
            0x6A => self.ror_accumulator(bus),
            0x66 => self.ror(bus, ZeroPage),
            0x76 => self.ror(bus, ZeroPageX),
            0x6E => self.ror(bus, Absolute),
            0x7E => self.ror(bus, AbsoluteX),

            // Branches
            0x10 => {
                let taken = !self.get_flag(flags::NEGATIVE);
                self.branch(bus, taken);
            }
            0x30 => {
                let taken = self.get_flag(flags::NEGATIVE);
                self.branch(bus, taken);
            }
            0x50 => {
                let taken = !self.get_flag(flags::OVERFLOW);
                self.branch(bus, taken);
            }
            0x70 => {
                let taken = self.get_flag(flags::OVERFLOW);
                self.branch(bus, taken);
            }
            0x90 => {
                let taken = !self.get_flag(flags::CARRY);
                self.branch(bus, taken);
            }
            0xB0 => {
                let taken = self.get_flag(flags::CARRY);
                self.branch(bus, taken);
            }
            0xD0 => {
                let taken = !self.get_flag(flags::ZERO);
                self.branch(bus, taken);
            }
            0xF0 => {
                let taken = self.get_flag(flags::ZERO);
                self.branch(bus, taken);
            }

            // Flow control
            0x4C => self.jmp(bus, Absolute),
            0x6C => self.jmp(bus, Indirect),
            0x20 => self.jsr(bus),
            0x60 => self.rts(bus),
            0x40 => self.rti(bus),
            0x00 => self.brk(bus),

            // Stack
            0x48 => self.pha(bus),
            0x68 => self.pla(bus),
            0x08 => self.php(bus),
            0x28 => self.plp(bus),

            // Transfers
            0xAA => self.tax(bus),
            0xA8 => self.tay(bus),
            0x8A => self.txa(bus),
            0x98 => self.tya(bus),
            0xBA => self.tsx(bus),
            0x9A => self.txs(bus),

            // Flags
            0x18 => self.clear_flag_op(bus, flags::CARRY),
            0x38 => self.set_flag_op(bus, flags::CARRY),
            0x58 => self.clear_flag_op(bus, flags::INTERRUPT_DISABLE),
            0x78 => self.set_flag_op(bus, flags::INTERRUPT_DISABLE),
            0xB8 => self.clear_flag_op(bus, flags::OVERFLOW),
            0xD8 => self.clear_flag_op(bus, flags::DECIMAL),
            0xF8 => self.set_flag_op(bus, flags::DECIMAL),

            0xEA => self.nop(bus),

            _ => {
                // Fetch cycle already spent; nothing else happens
                log::warn!(
                    "illegal opcode {:#04X} at {:#06X}, executing as NOP",
                    opcode,
                    self.pc.wrapping_sub(1)
                );
            }
        }
    }

    /// Render one nestest-style trace line for the instruction at PC
    ///
    /// Uses side-effect-free peeks, so tracing never perturbs PPU or
    /// mapper state.
    pub fn trace(&self, bus: &Bus) -> String {
        let opcode = bus.peek(self.pc);
        let (mnemonic, bytes) = opcode_info(opcode);

        let hex = match bytes {
            1 => format!("{:02X}      ", opcode),
            2 => format!("{:02X} {:02X}   ", opcode, bus.peek(self.pc.wrapping_add(1))),
            _ => format!(
                "{:02X} {:02X} {:02X}",
                opcode,
                bus.peek(self.pc.wrapping_add(1)),
                bus.peek(self.pc.wrapping_add(2))
            ),
        };

        format!(
            "{:04X}  {}  {:<4} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            hex,
            mnemonic,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            bus.cycle_count()
        )
    }
}

/// Mnemonic and instruction length for a trace line
pub(crate) fn opcode_info(opcode: u8) -> (&'static str, u8) {
    match opcode {
        0xA9 | 0xA5 | 0xB5 | 0xA1 | 0xB1 => ("LDA", 2),
        0xAD | 0xBD | 0xB9 => ("LDA", 3),
        0xA2 | 0xA6 | 0xB6 => ("LDX", 2),
        0xAE | 0xBE => ("LDX", 3),
        0xA0 | 0xA4 | 0xB4 => ("LDY", 2),
        0xAC | 0xBC => ("LDY", 3),
        0x85 | 0x95 | 0x81 | 0x91 => ("STA", 2),
        0x8D | 0x9D | 0x99 => ("STA", 3),
        0x86 | 0x96 => ("STX", 2),
        0x8E => ("STX", 3),
        0x84 | 0x94 => ("STY", 2),
        0x8C => ("STY", 3),
        0x69 | 0x65 | 0x75 | 0x61 | 0x71 => ("ADC", 2),
        0x6D | 0x7D | 0x79 => ("ADC", 3),
        0xE9 | 0xE5 | 0xF5 | 0xE1 | 0xF1 => ("SBC", 2),
        0xED | 0xFD | 0xF9 => ("SBC", 3),
        0xC9 | 0xC5 | 0xD5 | 0xC1 | 0xD1 => ("CMP", 2),
        0xCD | 0xDD | 0xD9 => ("CMP", 3),
        0xE0 | 0xE4 => ("CPX", 2),
        0xEC => ("CPX", 3),
        0xC0 | 0xC4 => ("CPY", 2),
        0xCC => ("CPY", 3),
        0xE6 | 0xF6 => ("INC", 2),
        0xEE | 0xFE => ("INC", 3),
        0xC6 | 0xD6 => ("DEC", 2),
        0xCE | 0xDE => ("DEC", 3),
        0xE8 => ("INX", 1),
        0xC8 => ("INY", 1),
        0xCA => ("DEX", 1),
        0x88 => ("DEY", 1),
        0x29 | 0x25 | 0x35 | 0x21 | 0x31 => ("AND", 2),
        0x2D | 0x3D | 0x39 => ("AND", 3),
        0x09 | 0x05 | 0x15 | 0x01 | 0x11 => ("ORA", 2),
        0x0D | 0x1D | 0x19 => ("ORA", 3),
        0x49 | 0x45 | 0x55 | 0x41 | 0x51 => ("EOR", 2),
        0x4D | 0x5D | 0x59 => ("EOR", 3),
        0x24 => ("BIT", 2),
        0x2C => ("BIT", 3),
        0x0A => ("ASL", 1),
        0x06 | 0x16 => ("ASL", 2),
        0x0E | 0x1E => ("ASL", 3),
        0x4A => ("LSR", 1),
        0x46 | 0x56 => ("LSR", 2),
        0x4E | 0x5E => ("LSR", 3),
        0x2A => ("ROL", 1),
        0x26 | 0x36 => ("ROL", 2),
        0x2E | 0x3E => ("ROL", 3),
        0x6A => ("ROR", 1),
        0x66 | 0x76 => ("ROR", 2),
        0x6E | 0x7E => ("ROR", 3),
        0x10 => ("BPL", 2),
        0x30 => ("BMI", 2),
        0x50 => ("BVC", 2),
        0x70 => ("BVS", 2),
        0x90 => ("BCC", 2),
        0xB0 => ("BCS", 2),
        0xD0 => ("BNE", 2),
        0xF0 => ("BEQ", 2),
        0x4C | 0x6C => ("JMP", 3),
        0x20 => ("JSR", 3),
        0x60 => ("RTS", 1),
        0x40 => ("RTI", 1),
        0x00 => ("BRK", 1),
        0x48 => ("PHA", 1),
        0x68 => ("PLA", 1),
        0x08 => ("PHP", 1),
        0x28 => ("PLP", 1),
        0xAA => ("TAX", 1),
        0xA8 => ("TAY", 1),
        0x8A => ("TXA", 1),
        0x98 => ("TYA", 1),
        0xBA => ("TSX", 1),
        0x9A => ("TXS", 1),
        0x18 => ("CLC", 1),
        0x38 => ("SEC", 1),
        0x58 => ("CLI", 1),
        0x78 => ("SEI", 1),
        0xB8 => ("CLV", 1),
        0xD8 => ("CLD", 1),
        0xF8 => ("SED", 1),
        0xEA => ("NOP", 1),
        _ => ("???", 1),
    }
}
