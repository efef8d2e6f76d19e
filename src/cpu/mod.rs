//! CPU emulation for the PDP-11.
//!
//! This module implements the execution core of the architecture:
//! - a byte-addressable memory capability with a flat core-memory device
//! - eight 16-bit general registers (R6 the stack pointer, R7 the program
//!   counter)
//! - the status word with N/Z/V/C condition codes and processor priority
//! - the data, branch, and control-transfer instruction catalog

pub mod execute;
pub mod memory;
pub mod registers;
pub mod status;

pub use execute::{CpuError, Operand, Processor, State};
pub use execute::{BPT_VECTOR, EMT_VECTOR, IOT_VECTOR};
pub use memory::{Core, MemoryDevice};
pub use registers::{Reg, RegFile};
pub use status::StatusWord;
