//! Arithmetic/logic unit. Operations read two registers and describe the
//! resulting change without applying it.

use std::fmt;
use std::str::FromStr;

use crate::fault::Fault;
use crate::memory::Byte;
use crate::registers::{Flags, Registers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Cmp,
}

impl AluOp {
    pub fn name(&self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Cmp => "CMP",
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AluOp {
    type Err = Fault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(AluOp::Add),
            "SUB" => Ok(AluOp::Sub),
            "MUL" => Ok(AluOp::Mul),
            "CMP" => Ok(AluOp::Cmp),
            _ => Err(Fault::UnsupportedOperation),
        }
    }
}

/// What an ALU operation changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOutput {
    /// New value for the first operand register
    Register(Byte),
    /// New state of the flags register
    Flags(Flags),
}

/// Runs `op` over registers `reg_a` and `reg_b`. Arithmetic wraps at 256.
pub fn execute(op: AluOp, reg_a: Byte, reg_b: Byte, registers: &Registers) -> Result<AluOutput, Fault> {
    let a = registers.get(reg_a)?;
    let b = registers.get(reg_b)?;

    let output = match op {
        AluOp::Add => AluOutput::Register(a.wrapping_add(b)),
        AluOp::Sub => AluOutput::Register(a.wrapping_sub(b)),
        AluOp::Mul => AluOutput::Register(a.wrapping_mul(b)),
        AluOp::Cmp => AluOutput::Flags(Flags::compare(a, b)),
    };

    log::debug!("ALU {} {} {}: {:?}", op, a, b, output);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    fn registers(a: Byte, b: Byte) -> Result<Registers> {
        let mut regs = Registers::default();
        regs.set(0, a)?;
        regs.set(1, b)?;
        Ok(regs)
    }

    #[test]
    fn test_arithmetic_wraps() -> Result<()> {
        let samples: &[(Byte, Byte)] = &[(5, 3), (200, 100), (3, 5), (0, 1), (16, 16), (255, 255)];

        for &(a, b) in samples {
            let regs = registers(a, b)?;

            assert_eq!(
                execute(AluOp::Add, 0, 1, &regs)?,
                AluOutput::Register(((a as u32 + b as u32) % 256) as Byte)
            );
            assert_eq!(
                execute(AluOp::Sub, 0, 1, &regs)?,
                AluOutput::Register(((a as i32 - b as i32).rem_euclid(256)) as Byte)
            );
            assert_eq!(
                execute(AluOp::Mul, 0, 1, &regs)?,
                AluOutput::Register(((a as u32 * b as u32) % 256) as Byte)
            );
        }

        Ok(())
    }

    #[test]
    fn test_compare() -> Result<()> {
        let regs = registers(10, 20)?;

        assert_eq!(
            execute(AluOp::Cmp, 0, 1, &regs)?,
            AluOutput::Flags(Flags::compare(10, 20))
        );
        match execute(AluOp::Cmp, 1, 0, &regs)? {
            AluOutput::Flags(flags) => assert!(flags.is_greater()),
            other => panic!("unexpected output {:?}", other),
        }
        match execute(AluOp::Cmp, 0, 0, &regs)? {
            AluOutput::Flags(flags) => assert_eq!(flags.bits(), Flags::EQUAL),
            other => panic!("unexpected output {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_invalid_register() -> Result<()> {
        let regs = Registers::default();

        assert_eq!(
            execute(AluOp::Add, 0, 9, &regs),
            Err(Fault::InvalidRegister { index: 9 })
        );

        Ok(())
    }

    #[test]
    fn test_op_names() -> Result<()> {
        assert_eq!("MUL".parse::<AluOp>(), Ok(AluOp::Mul));
        assert_eq!("CMP".parse::<AluOp>(), Ok(AluOp::Cmp));
        assert_eq!("DIV".parse::<AluOp>(), Err(Fault::UnsupportedOperation));
        assert_eq!(AluOp::Sub.to_string(), "SUB");

        Ok(())
    }
}
