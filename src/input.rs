// Input module - controller shift registers
//
// The console sees each controller as a serial shift register behind two
// memory-mapped ports:
//
// | Address | Access | Description                |
// |---------|--------|----------------------------|
// | $4016   | R/W    | Port 1 data / strobe latch |
// | $4017   | R      | Port 2 data                |
//
// Writing bit 0 of $4016 drives the strobe line. While the strobe is high
// the register continuously reloads, so reads return the live A button. On
// the 1 -> 0 transition both registers latch an 8-bit snapshot of the
// buttons; each subsequent read then shifts out one bit in the order
// A, B, Select, Start, Up, Down, Left, Right, after which the stream reads
// all ones.

/// An 8-button snapshot, one frame of controller state
///
/// `bits()` packs the buttons in hardware shift order:
/// A(0), B(1), Select(2), Start(3), Up(4), Down(5), Left(6), Right(7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ButtonState {
    /// Snapshot with every button released
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack into the 8-bit wire format
    pub fn bits(&self) -> u8 {
        (self.a as u8)
            | (self.b as u8) << 1
            | (self.select as u8) << 2
            | (self.start as u8) << 3
            | (self.up as u8) << 4
            | (self.down as u8) << 5
            | (self.left as u8) << 6
            | (self.right as u8) << 7
    }

    /// Unpack from the 8-bit wire format
    pub fn from_bits(bits: u8) -> Self {
        ButtonState {
            a: bits & 0x01 != 0,
            b: bits & 0x02 != 0,
            select: bits & 0x04 != 0,
            start: bits & 0x08 != 0,
            up: bits & 0x10 != 0,
            down: bits & 0x20 != 0,
            left: bits & 0x40 != 0,
            right: bits & 0x80 != 0,
        }
    }
}

/// Strobe latch plus the two shift registers
#[derive(Debug, Clone)]
pub struct Controller {
    /// Strobe line level
    strobe: bool,
    /// Shift registers for ports 1 and 2
    shift: [u8; 2],
    /// Snapshots latched on the next strobe fall
    snapshot: [u8; 2],
    /// Whether a second controller is plugged in
    second_connected: bool,
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            strobe: false,
            shift: [0; 2],
            snapshot: [0; 2],
            second_connected: false,
        }
    }

    /// Current strobe level (the bus watches for the falling edge)
    pub fn strobe(&self) -> bool {
        self.strobe
    }

    /// Replace the pending snapshot for a port
    pub fn set_snapshot(&mut self, port: usize, bits: u8) {
        if port < 2 {
            self.snapshot[port] = bits;
        }
    }

    /// Plug in or remove the second controller
    pub fn connect_second(&mut self, connected: bool) {
        self.second_connected = connected;
    }

    /// Handle a write to $4016
    ///
    /// Latches both shift registers from the pending snapshots on the
    /// strobe's 1 -> 0 transition.
    pub fn write(&mut self, value: u8) {
        let level = value & 0x01 != 0;
        if self.strobe && !level {
            self.shift = self.snapshot;
        }
        self.strobe = level;
    }

    /// Handle a read from $4016 (port 0) or $4017 (port 1)
    ///
    /// Bit 0 carries the button data; bit 6 reflects the open bus the
    /// joypad lines float on. A disconnected second controller reads 0.
    pub fn read(&mut self, port: usize) -> u8 {
        if port == 1 && !self.second_connected {
            return 0;
        }

        if self.strobe {
            // Reloading continuously: always the A button
            return 0x40 | (self.snapshot[port] & 0x01);
        }

        let bit = self.shift[port] & 0x01;
        // Shift out, refilling with 1s so reads past the 8th return 1
        self.shift[port] = 0x80 | (self.shift[port] >> 1);
        0x40 | bit
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
