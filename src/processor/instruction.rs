use std::convert::TryFrom;

use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

use super::{Control, Processor};
use crate::fault::Fault;
use crate::memory::Byte;

/// Executes one instruction given its two operand bytes
pub type Handler = fn(&mut Processor, Byte, Byte) -> Result<Control, Fault>;

/// Result of decoding an opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Known(Instruction),
    Unknown(Byte),
}

impl From<Byte> for Decoded {
    fn from(opcode: Byte) -> Self {
        match Instruction::try_from(opcode) {
            Ok(instruction) => Decoded::Known(instruction),
            Err(_) => Decoded::Unknown(opcode),
        }
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , $size:literal => $handler:ident , )+ ) => {
        /// Defines the instructions
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            /// Encoded length in bytes, opcode included
            pub fn size(&self) -> Byte {
                match self {
                    $( Self::$name => $size , )+
                }
            }

            /// The handler which executes this instruction
            pub fn handler(&self) -> Handler {
                match self {
                    $( Self::$name => Processor::$handler , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001, 1 => hlt,
    /// Return from a subroutine
    RET = 0b0001_0001, 1 => ret,
    /// Push a register onto the stack
    /// @param register The register to push
    PUSH = 0b0100_0101, 2 => push,
    /// Pop the top of the stack into a register
    /// @param register The register to pop into
    POP = 0b0100_0110, 2 => pop,
    /// Print the decimal value of a register
    /// @param register The register to print
    PRN = 0b0100_0111, 2 => prn,
    /// Call the subroutine at the address held in a register
    /// @param register The register holding the address
    CALL = 0b0101_0000, 2 => call,
    /// Jump to the address held in a register
    /// @param register The register holding the address
    JMP = 0b0101_0100, 2 => jmp,
    /// Load an immediate value into a register
    /// @param register The register to load
    /// @param value The value to load
    LDI = 0b1000_0010, 3 => ldi,
    /// Add register B to register A
    ADD = 0b1010_0000, 3 => add,
    /// Subtract register B from register A
    SUB = 0b1010_0001, 3 => sub,
    /// Multiply register A by register B
    MUL = 0b1010_0010, 3 => mul,
    /// Compare register A with register B and set the flags
    CMP = 0b1010_0111, 3 => cmp,
}
