//! PDP-11 general registers.
//!
//! The PDP-11 has eight 16-bit general registers. All eight are usable by
//! any instruction, but two carry fixed roles by convention: R6 is the
//! stack pointer and R7 is the program counter.

use serde::{Deserialize, Serialize};

/// A register code, R0 through R7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    /// Stack pointer alias.
    pub const SP: Reg = Reg::R6;
    /// Program counter alias.
    pub const PC: Reg = Reg::R7;

    /// All register codes in order.
    pub const ALL: [Reg; 8] = [
        Reg::R0,
        Reg::R1,
        Reg::R2,
        Reg::R3,
        Reg::R4,
        Reg::R5,
        Reg::R6,
        Reg::R7,
    ];

    /// Index into the register file.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The register file: eight independent 16-bit words.
///
/// Registers live as long as the processor owning them. They are zeroed at
/// construction and only ever change by explicit assignment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegFile {
    regs: [u16; 8],
}

impl RegFile {
    /// Create a register file with all registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the contents of a register.
    #[inline]
    pub fn get(&self, reg: Reg) -> u16 {
        self.regs[reg.index()]
    }

    /// Set the contents of a register.
    #[inline]
    pub fn set(&mut self, reg: Reg, value: u16) {
        self.regs[reg.index()] = value;
    }

    /// Current program counter (R7).
    #[inline]
    pub fn pc(&self) -> u16 {
        self.get(Reg::PC)
    }

    /// Load the program counter (R7).
    #[inline]
    pub fn set_pc(&mut self, value: u16) {
        self.set(Reg::PC, value);
    }

    /// Current stack pointer (R6).
    #[inline]
    pub fn sp(&self) -> u16 {
        self.get(Reg::SP)
    }

    /// Load the stack pointer (R6).
    #[inline]
    pub fn set_sp(&mut self, value: u16) {
        self.set(Reg::SP, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registers_are_zero() {
        let regs = RegFile::new();
        for r in Reg::ALL {
            assert_eq!(regs.get(r), 0);
        }
    }

    #[test]
    fn test_set_get() {
        let mut regs = RegFile::new();
        regs.set(Reg::R0, 0xf00f);
        regs.set(Reg::R1, 0xc7c8);

        assert_eq!(regs.get(Reg::R0), 0xf00f);
        assert_eq!(regs.get(Reg::R1), 0xc7c8);
        for r in &Reg::ALL[2..] {
            assert_eq!(regs.get(*r), 0);
        }
    }

    #[test]
    fn test_sp_pc_aliases() {
        let mut regs = RegFile::new();
        regs.set_sp(0o1000);
        regs.set_pc(0o200);

        assert_eq!(regs.get(Reg::R6), 0o1000);
        assert_eq!(regs.get(Reg::R7), 0o200);
        assert_eq!(regs.sp(), 0o1000);
        assert_eq!(regs.pc(), 0o200);
        assert_eq!(Reg::SP, Reg::R6);
        assert_eq!(Reg::PC, Reg::R7);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut regs = RegFile::new();
        regs.set(Reg::R0, 0xf00f);

        let copy = regs.clone();
        regs.set(Reg::R0, 0);

        assert_eq!(copy.get(Reg::R0), 0xf00f);
    }
}
