use std::io::Write;

use crate::alu::{self, AluOp, AluOutput};
use crate::fault::Fault;
use crate::memory::{Byte, StdMem};
use crate::registers::{Flags, Registers};
use color_eyre::eyre::{Result, WrapErr};
use log::*;

pub mod instruction;

pub use instruction::{Decoded, Handler, Instruction};

/// Lifecycle of the processor. `Halted` and `Faulted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    Halted,
    Faulted(Fault),
}

/// What the loop should do after an instruction has been executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Fetch the next instruction
    Continue,
    /// Output a value, then fetch the next instruction
    Emit(Byte),
    /// Stop fetching
    Halt,
}

/// Emulates a CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Main memory, holding both the program and the stack
    pub memory: StdMem,
    /// General purpose registers, R7 doubles as the stack pointer
    pub registers: Registers,
    /// Program counter
    pub pc: Byte,
    /// Result of the last compare
    pub flags: Flags,
    pub state: State,
}

impl Default for Processor {
    /// Initializes a new CPU with empty memory
    fn default() -> Self {
        Self::with_memory(StdMem::default())
    }
}

impl Processor {
    /// Initializes a new CPU which will start executing at address 0 of
    /// `memory`
    pub fn with_memory(memory: StdMem) -> Self {
        Self {
            memory,
            registers: Registers::default(),
            pc: 0x00,
            flags: Flags::default(),
            state: State::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Reads the opcode at PC and the two bytes following it
    pub fn fetch(&self) -> Result<(Byte, Byte, Byte), Fault> {
        let opcode = self.memory.read_byte(self.pc.into())?;
        let operand_a = self.memory.read_byte(self.pc.wrapping_add(1).into())?;
        let operand_b = self.memory.read_byte(self.pc.wrapping_add(2).into())?;

        Ok((opcode, operand_a, operand_b))
    }

    /// Renders PC, the bytes at PC and all registers as hex:
    /// `TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4`
    pub fn trace(&self) -> String {
        let bytes: Vec<String> = (0..3)
            .map(|offset| self.pc.wrapping_add(offset))
            .map(|address| format!("{:02X}", self.memory.data[address as usize]))
            .collect();
        let registers: Vec<String> = self
            .registers
            .as_slice()
            .iter()
            .map(|value| format!("{:02X}", value))
            .collect();

        format!(
            "TRACE: {:02X} | {} | {}",
            self.pc,
            bytes.join(" "),
            registers.join(" ")
        )
    }

    /// Executes a single decoded instruction
    pub fn execute_instruction(
        &mut self,
        instruction: Instruction,
        operand_a: Byte,
        operand_b: Byte,
    ) -> Result<Control, Fault> {
        let handler = instruction.handler();
        handler(self, operand_a, operand_b)
    }

    /// Runs one execution step. A fault moves the processor into
    /// [`State::Faulted`] and is returned.
    pub fn execute(&mut self) -> Result<Control, Fault> {
        match self.state {
            State::Running => {}
            State::Halted => return Ok(Control::Halt),
            State::Faulted(fault) => return Err(fault),
        }

        match self.fetch_and_execute() {
            Ok(Control::Halt) => {
                self.state = State::Halted;
                Ok(Control::Halt)
            }
            Ok(control) => Ok(control),
            Err(fault) => {
                self.state = State::Faulted(fault);
                Err(fault)
            }
        }
    }

    fn fetch_and_execute(&mut self) -> Result<Control, Fault> {
        if log_enabled!(Level::Trace) {
            trace!("{}", self.trace());
        }

        let (opcode, operand_a, operand_b) = self.fetch()?;

        match Decoded::from(opcode) {
            Decoded::Known(instruction) => {
                self.execute_instruction(instruction, operand_a, operand_b)
            }
            Decoded::Unknown(opcode) => Err(Fault::UnknownOpcode { opcode }),
        }
    }

    /// Run program until it halts, writing every printed value to `out`.
    pub fn execute_until_halt<W: Write>(&mut self, out: &mut W) -> Result<()> {
        loop {
            let pc = self.pc;

            match self.execute() {
                Ok(Control::Emit(value)) => {
                    writeln!(out, "{}", value).wrap_err("Failed to write output")?;
                }
                Ok(Control::Continue) => {}
                Ok(Control::Halt) => break,
                Err(fault) => {
                    return Err(fault).wrap_err_with(|| format!("Fault at PC 0x{:02X}", pc));
                }
            }
        }

        info!("Program halted at PC 0x{:02X}", self.pc);

        Ok(())
    }

    /// Moves PC past `instruction`
    fn advance(&mut self, instruction: Instruction) -> Control {
        self.pc = self.pc.wrapping_add(instruction.size());
        Control::Continue
    }

    fn push_value(&mut self, value: Byte) -> Result<(), Fault> {
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        self.memory.write_byte(sp.into(), value)
    }

    fn ldi(&mut self, register: Byte, value: Byte) -> Result<Control, Fault> {
        self.registers.set(register, value)?;

        debug!("LDI R{} {}", register, value);

        Ok(self.advance(Instruction::LDI))
    }

    fn prn(&mut self, register: Byte, _: Byte) -> Result<Control, Fault> {
        let value = self.registers.get(register)?;
        self.advance(Instruction::PRN);

        debug!("PRN R{}: {}", register, value);

        Ok(Control::Emit(value))
    }

    fn hlt(&mut self, _: Byte, _: Byte) -> Result<Control, Fault> {
        self.advance(Instruction::HLT);

        debug!("HLT");

        Ok(Control::Halt)
    }

    fn push(&mut self, register: Byte, _: Byte) -> Result<Control, Fault> {
        // SP moves first, so pushing R7 stores the already decremented value
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        let value = self.registers.get(register)?;
        self.memory.write_byte(sp.into(), value)?;

        debug!("PUSH R{}: {} -> 0x{:02X}", register, value, sp);

        Ok(self.advance(Instruction::PUSH))
    }

    fn pop(&mut self, register: Byte, _: Byte) -> Result<Control, Fault> {
        let sp = self.registers.sp();
        let value = self.memory.read_byte(sp.into())?;
        self.registers.set(register, value)?;
        self.registers.set_sp(self.registers.sp().wrapping_add(1));

        debug!("POP R{}: {} <- 0x{:02X}", register, value, sp);

        Ok(self.advance(Instruction::POP))
    }

    fn call(&mut self, register: Byte, _: Byte) -> Result<Control, Fault> {
        let return_address = self.pc.wrapping_add(Instruction::CALL.size());
        self.push_value(return_address)?;
        self.pc = self.registers.get(register)?;

        debug!("CALL R{}: 0x{:02X}", register, self.pc);

        Ok(Control::Continue)
    }

    fn ret(&mut self, _: Byte, _: Byte) -> Result<Control, Fault> {
        let sp = self.registers.sp();
        self.pc = self.memory.read_byte(sp.into())?;
        self.registers.set_sp(sp.wrapping_add(1));

        debug!("RET 0x{:02X}", self.pc);

        Ok(Control::Continue)
    }

    fn jmp(&mut self, register: Byte, _: Byte) -> Result<Control, Fault> {
        self.pc = self.registers.get(register)?;

        debug!("JMP R{}: 0x{:02X}", register, self.pc);

        Ok(Control::Continue)
    }

    fn add(&mut self, reg_a: Byte, reg_b: Byte) -> Result<Control, Fault> {
        self.alu(AluOp::Add, reg_a, reg_b, Instruction::ADD)
    }

    fn sub(&mut self, reg_a: Byte, reg_b: Byte) -> Result<Control, Fault> {
        self.alu(AluOp::Sub, reg_a, reg_b, Instruction::SUB)
    }

    fn mul(&mut self, reg_a: Byte, reg_b: Byte) -> Result<Control, Fault> {
        self.alu(AluOp::Mul, reg_a, reg_b, Instruction::MUL)
    }

    fn cmp(&mut self, reg_a: Byte, reg_b: Byte) -> Result<Control, Fault> {
        self.alu(AluOp::Cmp, reg_a, reg_b, Instruction::CMP)
    }

    /// Applies an ALU operation. Arithmetic results land in `reg_a`, a
    /// compare replaces the flags.
    fn alu(
        &mut self,
        op: AluOp,
        reg_a: Byte,
        reg_b: Byte,
        instruction: Instruction,
    ) -> Result<Control, Fault> {
        match alu::execute(op, reg_a, reg_b, &self.registers)? {
            AluOutput::Register(value) => self.registers.set(reg_a, value)?,
            AluOutput::Flags(flags) => self.flags = flags,
        }

        debug!("{} R{} R{}", instruction, reg_a, reg_b);

        Ok(self.advance(instruction))
    }
}
