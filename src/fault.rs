use std::{error, fmt};

use crate::memory::Byte;

/// Unrecoverable conditions which stop the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// A memory access outside of the address space
    AddressOutOfRange { address: usize },
    /// A register index outside of the register file
    InvalidRegister { index: Byte },
    /// The fetched byte is not a known instruction
    UnknownOpcode { opcode: Byte },
    /// The ALU was asked for an operation it does not implement
    UnsupportedOperation,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::AddressOutOfRange { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            Fault::InvalidRegister { index } => write!(f, "there is no register R{}", index),
            Fault::UnknownOpcode { opcode } => {
                write!(f, "unknown instruction: {} (0b{:08b})", opcode, opcode)
            }
            Fault::UnsupportedOperation => f.write_str("unsupported ALU operation"),
        }
    }
}

impl error::Error for Fault {}
