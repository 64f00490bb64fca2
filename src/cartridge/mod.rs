// Cartridge module - iNES ROM parsing and mapper selection
//
// A cartridge is constructed from the raw bytes of a ROM dump in the iNES 1.0
// format and then handed to `create_mapper`, which wraps it in the address
// decoding circuit the title shipped with.
//
// # iNES 1.0 layout
//
// ```text
// Offset  Size      Contents
// 0       4         Magic "NES\x1A"
// 4       1         PRG-ROM size in 16KB units
// 5       1         CHR-ROM size in 8KB units (0 = board uses CHR-RAM)
// 6       1         Flags: bit 0 mirroring, bit 2 trainer, bits 4-7 mapper low
// 7       1         Flags: bits 4-7 mapper high
// 16      N*16KB    PRG-ROM
// 16+PRG  M*8KB     CHR-ROM
// ```

pub mod mappers;

pub use mappers::{create_mapper, Mapper};

/// Size of the iNES header in bytes
const HEADER_SIZE: usize = 16;

/// Size of one PRG-ROM bank (16KB)
const PRG_BANK_SIZE: usize = 16 * 1024;

/// Size of one CHR-ROM bank (8KB)
const CHR_BANK_SIZE: usize = 8 * 1024;

/// Nametable mirroring arrangement
///
/// The PPU address space has room for four nametables but the console only
/// carries 2KB of nametable RAM; the cartridge decides how the four logical
/// tables fold onto the two physical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000=$2400 and $2800=$2C00 (scrolls vertically)
    Horizontal,
    /// $2000=$2800 and $2400=$2C00 (scrolls horizontally)
    Vertical,
    /// All four tables map to the first physical table
    SingleScreen,
}

/// Errors raised while building an instance from ROM bytes
#[derive(Debug)]
pub enum RomError {
    /// The buffer is shorter than a header or the magic bytes are missing
    BadHeader,
    /// The header declares a 512-byte trainer, which is not supported
    TrainerPresent,
    /// The declared PRG/CHR sizes run past the end of the buffer
    SizeMismatch { expected: usize, actual: usize },
    /// The mapper number is outside the supported set (0, 1, 2, 4)
    UnsupportedMapper(u8),
}

impl std::fmt::Display for RomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RomError::BadHeader => write!(f, "missing or malformed iNES header"),
            RomError::TrainerPresent => write!(f, "ROMs with trainers are not supported"),
            RomError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "header declares {} bytes but file holds {}",
                    expected, actual
                )
            }
            RomError::UnsupportedMapper(num) => write!(f, "mapper {} is not supported", num),
        }
    }
}

impl std::error::Error for RomError {}

/// A parsed ROM image
///
/// Holds the PRG and CHR data exactly as they appear in the dump, plus the
/// decoded header fields the mappers care about.
#[derive(Debug, Clone)]
pub struct Cartridge {
    /// PRG-ROM data (code and CPU-visible tables)
    pub prg_rom: Vec<u8>,
    /// CHR-ROM data (pattern tables); empty when the board uses CHR-RAM
    pub chr_rom: Vec<u8>,
    /// Mapper number from the header
    pub mapper: u8,
    /// Nametable mirroring from the header
    pub mirroring: Mirroring,
}

impl Cartridge {
    /// Parse a ROM image from raw iNES bytes
    ///
    /// # Errors
    ///
    /// Returns [`RomError`] when the header is malformed, a trainer is
    /// present, or the declared sizes exceed the buffer.
    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, RomError> {
        if bytes.len() < HEADER_SIZE || &bytes[0..4] != b"NES\x1A" {
            return Err(RomError::BadHeader);
        }

        let prg_banks = bytes[4] as usize;
        let chr_banks = bytes[5] as usize;
        let flags6 = bytes[6];
        let flags7 = bytes[7];

        if prg_banks == 0 {
            return Err(RomError::BadHeader);
        }
        if flags6 & 0x04 != 0 {
            return Err(RomError::TrainerPresent);
        }

        let prg_size = prg_banks * PRG_BANK_SIZE;
        let chr_size = chr_banks * CHR_BANK_SIZE;
        let expected = HEADER_SIZE + prg_size + chr_size;
        if bytes.len() < expected {
            return Err(RomError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let prg_rom = bytes[HEADER_SIZE..HEADER_SIZE + prg_size].to_vec();
        let chr_rom = bytes[HEADER_SIZE + prg_size..HEADER_SIZE + prg_size + chr_size].to_vec();

        let mapper = (flags7 & 0xF0) | (flags6 >> 4);
        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        log::debug!(
            "parsed ROM: {} PRG banks, {} CHR banks, mapper {}, {:?} mirroring",
            prg_banks,
            chr_banks,
            mapper,
            mirroring
        );

        Ok(Cartridge {
            prg_rom,
            chr_rom,
            mapper,
            mirroring,
        })
    }
}
