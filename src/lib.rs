//! An emulator for the LS-8, a tiny 8-bit processor with 256 bytes of
//! memory, eight registers and a downward growing stack.

pub mod alu;
pub mod fault;
pub mod memory;
pub mod processor;
pub mod registers;
