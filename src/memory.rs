use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::fault::Fault;

pub mod parse;

pub type Byte = u8; // 1 byte

/// Number of addressable bytes
pub const MEMORY_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: usize) -> Result<Byte, Fault> {
        self.data
            .get(position)
            .copied()
            .ok_or(Fault::AddressOutOfRange { address: position })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: usize, value: Byte) -> Result<(), Fault> {
        let cell = self
            .data
            .get_mut(position)
            .ok_or(Fault::AddressOutOfRange { address: position })?;
        *cell = value;
        Ok(())
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: usize, data: &[Byte]) -> Result<(), Fault> {
        let end = position + data.len();
        if end > S {
            return Err(Fault::AddressOutOfRange { address: end - 1 });
        }

        self.data[position..end].copy_from_slice(data);
        Ok(())
    }

    /// Loads a program image from `path`, starting at address 0.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read program `{}`", path.display()))?;

        Self::from_str(&source).map_err(|errors| {
            eyre!(
                "{} error(s) while loading `{}`, first: {}",
                errors.len(),
                path.display(),
                errors[0]
            )
        })
    }

    /// Logs the memory contents, 16 bytes per row. Rows which are all zero
    /// are skipped.
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            if chunk.iter().all(|&byte| byte == 0) {
                continue;
            }

            let bytes: Vec<String> = chunk.iter().map(|byte| format!("{:02X}", byte)).collect();
            log::info!("{:02X}: {}", row * 16, bytes.join(" "));
        }
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = Vec<parse::ParseError>;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse::Parser::new(s, Self::default()).parse()
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}
