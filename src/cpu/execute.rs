//! The processor and its instruction catalog.
//!
//! A [`Processor`] owns the register file, the status word, and one memory
//! device. Its public methods are the instruction set: an external
//! fetch/decode loop resolves each encoded instruction's operand specifiers
//! into [`Operand`] locations and calls the matching method. No method here
//! performs address decoding.
//!
//! All arithmetic is exact 16-bit two's complement, computed from the word
//! values themselves with explicit masks and shifts.

use crate::cpu::memory::{Core, MemoryDevice};
use crate::cpu::registers::{Reg, RegFile};
use crate::cpu::status::StatusWord;
use crate::word;
use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Breakpoint trap vector.
pub const BPT_VECTOR: u16 = 0o14;
/// I/O trap vector. Architecturally fixed.
pub const IOT_VECTOR: u16 = 0o20;
/// Emulator trap vector. Architecturally fixed.
pub const EMT_VECTOR: u16 = 0o30;

/// Processor run state.
///
/// `halt` and `wait` stop instruction issue; resumption is an external
/// event. The dispatch loop observes this state between instructions and,
/// for [`State::Waiting`], may call [`Processor::resume`] when an interrupt
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Instructions may be issued.
    Running,
    /// Stopped by `halt`; restart requires an external reset.
    Halted,
    /// Stopped by `wait`; restart on external interrupt.
    Waiting,
}

/// A caller-resolved operand location: a register or a memory address.
///
/// Instructions commit through the location directly; they never copy the
/// referenced value into storage of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// One of the eight general registers.
    Reg(Reg),
    /// A byte address of a word in the owned memory device.
    Mem(u16),
}

/// Errors surfaced by instruction execution.
///
/// Out-of-range accesses are non-fatal: the failing instruction leaves all
/// processor and memory state unmodified, and the dispatch loop may choose
/// to synthesize a trap from the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("out-of-range memory access: {len} byte(s) at {addr:#08o}")]
    OutOfRange { addr: u16, len: u16 },
}

/// A PDP-11 processor: register file, status word, and one owned memory
/// device.
///
/// Cloning a processor deep-copies everything, including the memory
/// contents; two processors never alias storage. One `Processor` per
/// emulated machine, accessed by one thread of control at a time.
#[derive(Clone, Serialize, Deserialize)]
pub struct Processor<M = Core> {
    /// General registers R0-R7.
    pub regs: RegFile,
    /// Processor status word.
    pub psw: StatusWord,
    /// The owned memory device.
    pub mem: M,
    /// Current run state.
    pub state: State,
    /// Latched by `rtt`; consumed by the dispatch loop.
    trace_inhibit: bool,
}

impl Processor<Core> {
    /// Create a processor with a fresh zeroed core memory of `size` bytes.
    pub fn new(size: u16) -> Self {
        Self::with_memory(Core::new(size))
    }
}

impl<M: MemoryDevice> Processor<M> {
    /// Create a processor taking ownership of an existing memory device.
    pub fn with_memory(mem: M) -> Self {
        Self {
            regs: RegFile::new(),
            psw: StatusWord::new(),
            mem,
            state: State::Running,
            trace_inhibit: false,
        }
    }

    // ==================== Register & status access ====================

    /// Get the contents of a register.
    #[inline]
    pub fn reg(&self, reg: Reg) -> u16 {
        self.regs.get(reg)
    }

    /// Set the contents of a register.
    #[inline]
    pub fn set_reg(&mut self, reg: Reg, value: u16) {
        self.regs.set(reg, value);
    }

    /// The raw processor status word.
    #[inline]
    pub fn pstat(&self) -> u16 {
        self.psw.raw()
    }

    /// Whether the last operation carried out of the most significant bit.
    #[inline]
    pub fn pstat_carry(&self) -> bool {
        self.psw.carry()
    }

    /// Whether the last operation caused an arithmetic overflow.
    #[inline]
    pub fn pstat_overf(&self) -> bool {
        self.psw.overflow()
    }

    /// Whether the result of the last operation was zero.
    #[inline]
    pub fn pstat_zero(&self) -> bool {
        self.psw.zero()
    }

    /// Whether the result of the last operation was negative.
    #[inline]
    pub fn pstat_neg(&self) -> bool {
        self.psw.negative()
    }

    /// Whether the trap flag is set.
    #[inline]
    pub fn pstat_trap(&self) -> bool {
        self.psw.trap_flag()
    }

    /// Processor priority, 0-7.
    #[inline]
    pub fn priority(&self) -> u16 {
        self.psw.priority()
    }

    /// Set the processor priority. Levels above 7 are silently ignored.
    #[inline]
    pub fn set_priority(&mut self, level: u16) {
        self.psw.set_priority(level);
    }

    /// Current run state.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the processor has halted.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Whether the processor is waiting for an interrupt.
    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.state == State::Waiting
    }

    /// Restart instruction issue after `halt` or `wait`. Called by the
    /// embedding system on reset or interrupt delivery.
    pub fn resume(&mut self) {
        self.state = State::Running;
    }

    /// Consume the trace-inhibit latch set by `rtt`.
    ///
    /// The dispatch loop checks this before synthesizing a trace trap for
    /// the instruction following the return.
    pub fn take_trace_inhibit(&mut self) -> bool {
        std::mem::take(&mut self.trace_inhibit)
    }

    // ==================== Operand plumbing ====================

    fn read_word(&self, addr: u16) -> Result<u16, CpuError> {
        let bytes = self
            .mem
            .read(addr, 2)
            .ok_or(CpuError::OutOfRange { addr, len: 2 })?;
        Ok(word::from_bytes(bytes[0], bytes[1]))
    }

    fn write_word(&mut self, addr: u16, value: u16) -> Result<(), CpuError> {
        if self.mem.write(addr, &word::to_bytes(value)) {
            Ok(())
        } else {
            Err(CpuError::OutOfRange { addr, len: 2 })
        }
    }

    fn load(&self, op: Operand) -> Result<u16, CpuError> {
        match op {
            Operand::Reg(r) => Ok(self.regs.get(r)),
            Operand::Mem(addr) => self.read_word(addr),
        }
    }

    fn store(&mut self, op: Operand, value: u16) -> Result<(), CpuError> {
        match op {
            Operand::Reg(r) => {
                self.regs.set(r, value);
                Ok(())
            }
            Operand::Mem(addr) => self.write_word(addr, value),
        }
    }

    /// The stack grows downward; a push commits the stack pointer only
    /// after the word has landed.
    fn push_word(&mut self, value: u16) -> Result<(), CpuError> {
        let sp = self.regs.sp().wrapping_sub(2);
        self.write_word(sp, value)?;
        self.regs.set_sp(sp);
        Ok(())
    }

    fn shift_flags(&mut self, result: u16, carry: bool) {
        self.psw.set_negative(word::sign_bit(result));
        self.psw.set_zero(result == 0);
        self.psw.set_carry(carry);
        self.psw.set_overflow(word::sign_bit(result) ^ carry);
    }

    // ==================== Zero-operand instructions ====================

    /// Stop instruction issue until externally restarted.
    pub fn halt(&mut self) {
        trace!("halt at pc {:#08o}", self.regs.pc());
        self.state = State::Halted;
    }

    /// Stop instruction issue until an external interrupt restarts it.
    pub fn wait(&mut self) {
        trace!("wait at pc {:#08o}", self.regs.pc());
        self.state = State::Waiting;
    }

    /// Bus device reset. Peripheral devices are not modeled at this layer,
    /// so there is nothing to reset; the method exists so a dispatch loop
    /// can issue the instruction uniformly.
    pub fn reset(&mut self) {}

    /// No operation.
    pub fn nop(&mut self) {}

    // ==================== One-operand instructions ====================

    /// Clear: `dst := 0`.
    pub fn clr(&mut self, dst: Operand) -> Result<(), CpuError> {
        self.store(dst, 0)?;
        self.psw.set_negative(false);
        self.psw.set_zero(true);
        self.psw.set_overflow(false);
        self.psw.set_carry(false);
        Ok(())
    }

    /// Increment: `dst := dst + 1`.
    pub fn inc(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.wrapping_add(1);
        self.store(dst, result)?;
        self.psw.set_arith_flags(old, old, result);
        Ok(())
    }

    /// Decrement: `dst := dst - 1`.
    pub fn dec(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.wrapping_sub(1);
        self.store(dst, result)?;
        self.psw.set_arith_flags(old, old, result);
        Ok(())
    }

    /// Add carry: `dst := dst + C`.
    pub fn adc(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.wrapping_add(self.psw.carry() as u16);
        self.store(dst, result)?;
        self.psw.set_arith_flags(old, old, result);
        Ok(())
    }

    /// Subtract carry: `dst := dst - C`.
    pub fn sbc(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.wrapping_sub(self.psw.carry() as u16);
        self.store(dst, result)?;
        self.psw.set_arith_flags(old, old, result);
        Ok(())
    }

    /// Test: set N/Z from the value, clear V and C. No mutation.
    pub fn tst(&mut self, src: Operand) -> Result<(), CpuError> {
        let value = self.load(src)?;
        self.psw.set_negative(word::sign_bit(value));
        self.psw.set_zero(value == 0);
        self.psw.set_overflow(false);
        self.psw.set_carry(false);
        Ok(())
    }

    /// Negate: `dst := -dst` (two's complement).
    ///
    /// Overflow is possible only for the one value that is its own
    /// negation, 0o100000. Carry is set unless the result is zero.
    pub fn neg(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.wrapping_neg();
        self.store(dst, result)?;
        self.psw.set_negative(word::sign_bit(result));
        self.psw.set_zero(result == 0);
        self.psw.set_overflow(result == word::SIGN);
        self.psw.set_carry(result != 0);
        Ok(())
    }

    /// Complement: `dst := !dst`. Always sets Carry.
    pub fn com(&mut self, dst: Operand) -> Result<(), CpuError> {
        let result = !self.load(dst)?;
        self.store(dst, result)?;
        self.psw.set_logic_flags(result);
        self.psw.set_carry(true);
        Ok(())
    }

    /// Rotate right one bit; the vacated bit 0 moves into Carry.
    pub fn ror(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.rotate_right(1);
        self.store(dst, result)?;
        self.shift_flags(result, old & 1 != 0);
        Ok(())
    }

    /// Rotate left one bit; the vacated bit 15 moves into Carry.
    pub fn rol(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old.rotate_left(1);
        self.store(dst, result)?;
        self.shift_flags(result, word::sign_bit(old));
        Ok(())
    }

    /// Arithmetic shift right one bit. The sign bit is preserved; the old
    /// bit 0 moves into Carry.
    pub fn asr(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = ((old as i16) >> 1) as u16;
        self.store(dst, result)?;
        self.shift_flags(result, old & 1 != 0);
        Ok(())
    }

    /// Arithmetic shift left one bit. Zero fills bit 0; the old bit 15
    /// moves into Carry.
    pub fn asl(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = old << 1;
        self.store(dst, result)?;
        self.shift_flags(result, word::sign_bit(old));
        Ok(())
    }

    /// Swap bytes: exchange the high and low halves of the word. N and Z
    /// reflect the new low byte.
    pub fn swab(&mut self, dst: Operand) -> Result<(), CpuError> {
        let old = self.load(dst)?;
        let result = word::from_bytes(word::high_byte(old), word::low_byte(old));
        self.store(dst, result)?;
        self.psw.set_negative(word::low_byte(result) & 0x80 != 0);
        self.psw.set_zero(word::low_byte(result) == 0);
        self.psw.set_overflow(false);
        self.psw.set_carry(false);
        Ok(())
    }

    /// Sign extend: fill the word with the Negative flag.
    pub fn sxt(&mut self, dst: Operand) -> Result<(), CpuError> {
        let result = if self.psw.negative() { 0xffff } else { 0 };
        self.store(dst, result)?;
        self.psw.set_zero(result == 0);
        Ok(())
    }

    // ==================== Register-operand instructions ====================

    /// Multiply: `reg := reg * src` (low 16 bits).
    ///
    /// Carry-on-overflow is not modeled; only N/Z are derived and V is
    /// cleared.
    pub fn mul(&mut self, reg: Reg, src: Operand) -> Result<(), CpuError> {
        let value = self.load(src)?;
        let result = (self.regs.get(reg) as i16).wrapping_mul(value as i16) as u16;
        self.regs.set(reg, result);
        self.psw.set_logic_flags(result);
        Ok(())
    }

    /// Divide: `reg := reg / src` (signed, truncating).
    ///
    /// A zero divisor performs no division and sets Carry and Overflow;
    /// this is defined machine behavior, not an error.
    pub fn div(&mut self, reg: Reg, src: Operand) -> Result<(), CpuError> {
        let divisor = self.load(src)?;
        if divisor == 0 {
            self.psw.set_carry(true);
            self.psw.set_overflow(true);
            return Ok(());
        }
        let dividend = self.regs.get(reg);
        let quotient = (dividend as i16).wrapping_div(divisor as i16) as u16;
        self.regs.set(reg, quotient);
        self.psw.set_arith_flags(dividend, divisor, quotient);
        Ok(())
    }

    /// Arithmetic shift: shift `reg` by a signed 6-bit count taken from the
    /// low bits of `src`. Positive counts shift left, negative right.
    ///
    /// V reports a sign change; C holds the last bit shifted out and is
    /// untouched for a zero count.
    pub fn ash(&mut self, reg: Reg, src: Operand) -> Result<(), CpuError> {
        let count = word::sext6(self.load(src)?);
        let old = self.regs.get(reg);
        let (result, carry) = if count == 0 {
            (old, self.psw.carry())
        } else if count > 0 {
            let n = count as u32;
            let result = if n >= 16 { 0 } else { old << n };
            let carry = n <= 16 && old & (1 << (16 - n)) != 0;
            (result, carry)
        } else {
            let n = (-count) as u32;
            let result = ((old as i16) >> n.min(15)) as u16;
            let carry = if n <= 16 {
                old & (1 << (n - 1)) != 0
            } else {
                word::sign_bit(old)
            };
            (result, carry)
        };
        self.regs.set(reg, result);
        self.psw.set_negative(word::sign_bit(result));
        self.psw.set_zero(result == 0);
        self.psw.set_overflow(word::sign_bit(old ^ result));
        self.psw.set_carry(carry);
        Ok(())
    }

    /// Double-word arithmetic shift. Reserved: the 32-bit register pair it
    /// operates on is not modeled at this layer, so the instruction is an
    /// explicit no-op.
    pub fn ashc(&mut self, _reg: Reg, _src: Operand) {}

    /// Exclusive or: `reg := reg ^ src`.
    pub fn xor(&mut self, reg: Reg, src: Operand) -> Result<(), CpuError> {
        let result = self.regs.get(reg) ^ self.load(src)?;
        self.regs.set(reg, result);
        self.psw.set_logic_flags(result);
        Ok(())
    }

    // ==================== Two-operand instructions ====================

    /// Move: `dst := src`.
    pub fn mov(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let value = self.load(src)?;
        self.store(dst, value)?;
        self.psw.set_logic_flags(value);
        Ok(())
    }

    /// Add: `dst := dst + src`.
    pub fn add(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let s = self.load(src)?;
        let d = self.load(dst)?;
        let result = d.wrapping_add(s);
        self.store(dst, result)?;
        self.psw.set_arith_flags(s, d, result);
        Ok(())
    }

    /// Subtract: `dst := dst - src`.
    pub fn sub(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let s = self.load(src)?;
        let d = self.load(dst)?;
        let result = d.wrapping_sub(s);
        self.store(dst, result)?;
        self.psw.set_arith_flags(s, d, result);
        Ok(())
    }

    /// Compare: flags from `src - dst`, destination unmodified. Note the
    /// operand order is the reverse of `sub`.
    pub fn cmp(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let s = self.load(src)?;
        let d = self.load(dst)?;
        let result = s.wrapping_sub(d);
        self.psw.set_arith_flags(s, d, result);
        Ok(())
    }

    /// Bit set: `dst := dst | src`.
    pub fn bis(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let result = self.load(dst)? | self.load(src)?;
        self.store(dst, result)?;
        self.psw.set_logic_flags(result);
        Ok(())
    }

    /// Bit clear: `dst := dst & !src`.
    pub fn bic(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let result = self.load(dst)? & !self.load(src)?;
        self.store(dst, result)?;
        self.psw.set_logic_flags(result);
        Ok(())
    }

    /// Bit test: flags from `dst & src`, destination unmodified.
    pub fn bit(&mut self, src: Operand, dst: Operand) -> Result<(), CpuError> {
        let result = self.load(dst)? & self.load(src)?;
        self.psw.set_logic_flags(result);
        Ok(())
    }

    // ==================== Branch instructions ====================

    fn branch(&mut self, offset: i16) {
        let displacement = (offset as u16).wrapping_mul(2);
        self.regs.set_pc(self.regs.pc().wrapping_add(displacement));
    }

    /// Branch always.
    pub fn br(&mut self, offset: i16) {
        self.branch(offset);
    }

    /// Branch if not equal (Z clear).
    pub fn bne(&mut self, offset: i16) {
        if !self.psw.zero() {
            self.branch(offset);
        }
    }

    /// Branch if equal (Z set).
    pub fn beq(&mut self, offset: i16) {
        if self.psw.zero() {
            self.branch(offset);
        }
    }

    /// Branch if plus (N clear).
    pub fn bpl(&mut self, offset: i16) {
        if !self.psw.negative() {
            self.branch(offset);
        }
    }

    /// Branch if minus (N set).
    pub fn bmi(&mut self, offset: i16) {
        if self.psw.negative() {
            self.branch(offset);
        }
    }

    /// Branch if overflow clear.
    pub fn bvc(&mut self, offset: i16) {
        if !self.psw.overflow() {
            self.branch(offset);
        }
    }

    /// Branch if overflow set.
    pub fn bvs(&mut self, offset: i16) {
        if self.psw.overflow() {
            self.branch(offset);
        }
    }

    /// Branch if carry clear.
    pub fn bcc(&mut self, offset: i16) {
        if !self.psw.carry() {
            self.branch(offset);
        }
    }

    /// Branch if carry set.
    pub fn bcs(&mut self, offset: i16) {
        if self.psw.carry() {
            self.branch(offset);
        }
    }

    /// Branch if higher or same (unsigned). Synonym for `bcc`.
    pub fn bhis(&mut self, offset: i16) {
        self.bcc(offset);
    }

    /// Branch if lower (unsigned). Synonym for `bcs`.
    pub fn blo(&mut self, offset: i16) {
        self.bcs(offset);
    }

    /// Branch if greater or equal (signed): N xor V clear.
    pub fn bge(&mut self, offset: i16) {
        if !(self.psw.negative() ^ self.psw.overflow()) {
            self.branch(offset);
        }
    }

    /// Branch if less than (signed): N xor V set.
    pub fn blt(&mut self, offset: i16) {
        if self.psw.negative() ^ self.psw.overflow() {
            self.branch(offset);
        }
    }

    /// Branch if greater than (signed): Z clear and N xor V clear.
    pub fn bgt(&mut self, offset: i16) {
        if !(self.psw.zero() || (self.psw.negative() ^ self.psw.overflow())) {
            self.branch(offset);
        }
    }

    /// Branch if less or equal (signed): Z set or N xor V set.
    pub fn ble(&mut self, offset: i16) {
        if self.psw.zero() || (self.psw.negative() ^ self.psw.overflow()) {
            self.branch(offset);
        }
    }

    /// Branch if higher (unsigned): C clear and Z clear.
    pub fn bhi(&mut self, offset: i16) {
        if !(self.psw.carry() || self.psw.zero()) {
            self.branch(offset);
        }
    }

    /// Branch if lower or same (unsigned): C set or Z set.
    pub fn blos(&mut self, offset: i16) {
        if self.psw.carry() || self.psw.zero() {
            self.branch(offset);
        }
    }

    // ==================== Control transfer ====================

    /// Jump: `PC := target`.
    pub fn jmp(&mut self, target: u16) {
        self.regs.set_pc(target);
    }

    /// Subtract one and branch: decrement `reg`; jump to `target` while it
    /// remains nonzero. The loop primitive. Flags are untouched.
    pub fn sob(&mut self, reg: Reg, target: u16) {
        let value = self.regs.get(reg).wrapping_sub(1);
        self.regs.set(reg, value);
        if value != 0 {
            self.regs.set_pc(target);
        }
    }

    /// Jump to subroutine: push the link register, save the return address
    /// in it, and load PC from `target`.
    pub fn jsr(&mut self, reg: Reg, target: u16) -> Result<(), CpuError> {
        let link = self.regs.get(reg);
        self.push_word(link)?;
        let ret = self.regs.pc();
        self.regs.set(reg, ret);
        self.regs.set_pc(target);
        Ok(())
    }

    /// Return from subroutine: restore PC from the link register, then pop
    /// its saved value back from the stack.
    pub fn rts(&mut self, reg: Reg) -> Result<(), CpuError> {
        let saved = self.read_word(self.regs.sp())?;
        self.regs.set_pc(self.regs.get(reg));
        self.regs.set(reg, saved);
        self.regs.set_sp(self.regs.sp().wrapping_add(2));
        Ok(())
    }

    /// Trap: push PC, push the status word, and transfer control to
    /// `vector`.
    ///
    /// The two words land contiguously below the old stack pointer (status
    /// word lowest) and are committed with a single bounds-checked write,
    /// so a faulting trap mutates nothing. Fetching a new status word from
    /// a vector table is the dispatch loop's business.
    pub fn trap(&mut self, vector: u16) -> Result<(), CpuError> {
        trace!("trap to vector {:#o} from pc {:#08o}", vector, self.regs.pc());
        let sp = self.regs.sp().wrapping_sub(4);
        let [ps_lo, ps_hi] = word::to_bytes(self.psw.raw());
        let [pc_lo, pc_hi] = word::to_bytes(self.regs.pc());
        if !self.mem.write(sp, &[ps_lo, ps_hi, pc_lo, pc_hi]) {
            return Err(CpuError::OutOfRange { addr: sp, len: 4 });
        }
        self.regs.set_sp(sp);
        self.regs.set_pc(vector);
        Ok(())
    }

    /// Breakpoint trap.
    pub fn bpt(&mut self) -> Result<(), CpuError> {
        self.trap(BPT_VECTOR)
    }

    /// Input/output trap.
    pub fn iot(&mut self) -> Result<(), CpuError> {
        self.trap(IOT_VECTOR)
    }

    /// Emulator trap.
    pub fn emt(&mut self) -> Result<(), CpuError> {
        self.trap(EMT_VECTOR)
    }

    /// Return from interrupt: pop the status word, then pop PC, the exact
    /// inverse of `trap`.
    pub fn rti(&mut self) -> Result<(), CpuError> {
        self.return_from_trap()
    }

    /// Return from interrupt, inhibiting the trace trap that would
    /// otherwise follow. See [`Processor::take_trace_inhibit`].
    pub fn rtt(&mut self) -> Result<(), CpuError> {
        self.return_from_trap()?;
        self.trace_inhibit = true;
        Ok(())
    }

    fn return_from_trap(&mut self) -> Result<(), CpuError> {
        let sp = self.regs.sp();
        let frame = self
            .mem
            .read(sp, 4)
            .ok_or(CpuError::OutOfRange { addr: sp, len: 4 })?;
        let ps = word::from_bytes(frame[0], frame[1]);
        let pc = word::from_bytes(frame[2], frame[3]);
        self.psw = StatusWord::from_raw(ps);
        self.regs.set_pc(pc);
        self.regs.set_sp(sp.wrapping_add(4));
        Ok(())
    }

    // ==================== Status-word instructions ====================

    /// Set priority level.
    pub fn spl(&mut self, level: u16) {
        self.psw.set_priority(level);
    }

    /// Clear Carry.
    pub fn clc(&mut self) {
        self.psw.set_carry(false);
    }

    /// Clear Overflow.
    pub fn clv(&mut self) {
        self.psw.set_overflow(false);
    }

    /// Clear Zero.
    pub fn clz(&mut self) {
        self.psw.set_zero(false);
    }

    /// Clear Negative.
    pub fn cln(&mut self) {
        self.psw.set_negative(false);
    }

    /// Set Carry.
    pub fn sec(&mut self) {
        self.psw.set_carry(true);
    }

    /// Set Overflow.
    pub fn sev(&mut self) {
        self.psw.set_overflow(true);
    }

    /// Set Zero.
    pub fn sez(&mut self) {
        self.psw.set_zero(true);
    }

    /// Set Negative.
    pub fn sen(&mut self) {
        self.psw.set_negative(true);
    }

    /// Clear all four condition codes.
    pub fn ccc(&mut self) {
        self.psw.clear_condition_flags();
    }

    /// Set all four condition codes.
    pub fn scc(&mut self) {
        self.psw.set_condition_flags();
    }
}

impl<M> std::fmt::Debug for Processor<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("regs", &self.regs)
            .field("psw", &self.psw)
            .field("state", &self.state)
            .finish()
    }
}
