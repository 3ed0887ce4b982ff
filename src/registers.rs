use std::cmp::Ordering;
use std::fmt;

use crate::fault::Fault;
use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Interrupt mask. Reserved, never interpreted.
pub const IM: Byte = 5;
/// Interrupt status. Reserved, never interpreted.
pub const IS: Byte = 6;
/// Stack pointer
pub const SP: Byte = 7;

/// Initial value of the stack pointer
pub const STACK_START: Byte = 0xF4;

/// The register file, R0 to R7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    data: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut data = [0; REGISTER_COUNT];
        data[SP as usize] = STACK_START;
        Self { data }
    }
}

impl Registers {
    /// Reads register `index`
    pub fn get(&self, index: Byte) -> Result<Byte, Fault> {
        self.data
            .get(index as usize)
            .copied()
            .ok_or(Fault::InvalidRegister { index })
    }

    /// Writes `value` into register `index`
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<(), Fault> {
        let register = self
            .data
            .get_mut(index as usize)
            .ok_or(Fault::InvalidRegister { index })?;
        *register = value;
        Ok(())
    }

    pub fn sp(&self) -> Byte {
        self.data[SP as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP as usize] = value;
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.data
    }
}

/// The flags register, laid out as `00000LGE`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(Byte);

impl Flags {
    pub const EQUAL: Byte = 0b0000_0001;
    pub const GREATER: Byte = 0b0000_0010;
    pub const LESS: Byte = 0b0000_0100;

    /// Flags as left behind by a compare of `a` against `b`. Exactly one
    /// bit is set.
    pub fn compare(a: Byte, b: Byte) -> Self {
        match a.cmp(&b) {
            Ordering::Equal => Self(Self::EQUAL),
            Ordering::Greater => Self(Self::GREATER),
            Ordering::Less => Self(Self::LESS),
        }
    }

    pub fn bits(&self) -> Byte {
        self.0
    }

    pub fn is_equal(&self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn is_greater(&self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn is_less(&self) -> bool {
        self.0 & Self::LESS != 0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_initial_state() -> Result<()> {
        let regs = Registers::default();

        assert_eq!(regs.sp(), 0xF4);
        assert_eq!(regs.get(SP)?, 0xF4);
        assert_eq!(regs.get(IM)?, 0);
        assert_eq!(regs.get(IS)?, 0);
        assert_eq!(&regs.as_slice()[..5], &[0; 5]);

        Ok(())
    }

    #[test]
    fn test_set_get() -> Result<()> {
        let mut regs = Registers::default();
        regs.set(3, 42)?;
        regs.set(IS, 7)?;

        assert_eq!(regs.get(3)?, 42);
        assert_eq!(regs.get(IS)?, 7);

        Ok(())
    }

    #[test]
    fn test_invalid_register() -> Result<()> {
        let mut regs = Registers::default();

        assert_eq!(regs.get(8), Err(Fault::InvalidRegister { index: 8 }));
        assert_eq!(regs.set(255, 1), Err(Fault::InvalidRegister { index: 255 }));
        assert_eq!(regs, Registers::default());

        Ok(())
    }

    #[test]
    fn test_compare_sets_one_flag() -> Result<()> {
        for &(a, b) in &[(0, 0), (1, 0), (0, 1), (255, 0), (0, 255), (128, 128)] {
            let flags = Flags::compare(a, b);
            assert_eq!(flags.bits().count_ones(), 1);
            assert_eq!(flags.is_equal(), a == b);
            assert_eq!(flags.is_greater(), a > b);
            assert_eq!(flags.is_less(), a < b);
        }

        assert_eq!(Flags::default().bits(), 0);
        assert_eq!(Flags::compare(2, 1).to_string(), "00000010");

        Ok(())
    }
}
