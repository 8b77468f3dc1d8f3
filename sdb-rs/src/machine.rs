//! The emulated machine the monitor inspects.
//!
//! An RV32-shaped register file and a sparse, little-endian physical memory
//! starting at [`MEM_BASE`].  There is no instruction decoder: a step
//! fetches the word at `pc`, stops on `ebreak`, and otherwise moves on to the
//! next word.  That is enough to exercise stepping, watchpoints and memory
//! inspection from the monitor.

use std::collections::HashMap;

use crate::expr::{EvalContext, MemError, UnknownRegister, Word};

/// First byte of physical memory.
pub const MEM_BASE: Word = 0x8000_0000;
/// Default memory size in bytes (1 MiB).
pub const DEFAULT_MEM_SIZE: Word = 0x0010_0000;
/// `ebreak` encoding; executing it halts the machine.
pub const EBREAK: Word = 0x0010_0073;

/// General-purpose register ABI names, indexed by register number.
pub const GPR_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

// ── RunState ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Paused by the monitor (step count exhausted or watchpoint hit).
    Stopped,
    /// `ebreak` executed; `code` is the value of `a0` at that point.
    Halted { code: Word },
    /// Instruction fetch failed.
    Aborted { pc: Word },
}

impl RunState {
    pub fn has_ended(self) -> bool {
        matches!(self, RunState::Halted { .. } | RunState::Aborted { .. })
    }
}

// ── Machine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Machine {
    gpr: [Word; 32],
    pc: Word,
    mem: HashMap<Word, u8>,
    mem_size: Word,
    state: RunState,
    /// Instructions retired so far.
    instret: u64,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(DEFAULT_MEM_SIZE)
    }
}

impl Machine {
    pub fn new(mem_size: Word) -> Self {
        Self {
            gpr: [0; 32],
            pc: MEM_BASE,
            mem: HashMap::new(),
            mem_size,
            state: RunState::Stopped,
            instret: 0,
        }
    }

    pub fn pc(&self) -> Word {
        self.pc
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    pub fn instret(&self) -> u64 {
        self.instret
    }

    pub fn mem_size(&self) -> Word {
        self.mem_size
    }

    fn in_bounds(&self, addr: Word, len: u64) -> bool {
        addr >= MEM_BASE && u64::from(addr - MEM_BASE) + len <= u64::from(self.mem_size)
    }

    /// Write a little-endian word.  `x0` semantics do not apply to memory.
    pub fn write_word(&mut self, addr: Word, value: Word) -> Result<(), MemError> {
        if !self.in_bounds(addr, 4) {
            return Err(MemError::OutOfBounds { addr });
        }
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.mem.insert(addr + i as Word, b);
        }
        Ok(())
    }

    /// Copy a program image to the start of memory.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), MemError> {
        if !self.in_bounds(MEM_BASE, image.len() as u64) {
            return Err(MemError::OutOfBounds {
                addr: MEM_BASE.wrapping_add(image.len() as Word),
            });
        }
        for (i, &b) in image.iter().enumerate() {
            self.mem.insert(MEM_BASE + i as Word, b);
        }
        Ok(())
    }

    /// Look up a register number by name: ABI names, `x<N>`, or `0`.
    fn gpr_index(name: &str) -> Option<usize> {
        if name == "0" {
            return Some(0);
        }
        if let Some(i) = GPR_NAMES.iter().position(|&n| n == name) {
            return Some(i);
        }
        name.strip_prefix('x')
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&i| i < 32)
    }

    pub fn set_register(&mut self, name: &str, value: Word) -> Result<(), UnknownRegister> {
        if name == "pc" {
            self.pc = value;
            return Ok(());
        }
        match Self::gpr_index(name) {
            // x0 is hard-wired to zero
            Some(0) => Ok(()),
            Some(i) => {
                self.gpr[i] = value;
                Ok(())
            }
            None => Err(UnknownRegister(name.to_owned())),
        }
    }

    /// All registers in display order, `pc` last.
    pub fn registers(&self) -> impl Iterator<Item = (&'static str, Word)> + '_ {
        GPR_NAMES
            .iter()
            .copied()
            .zip(self.gpr.iter().copied())
            .chain(std::iter::once(("pc", self.pc)))
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> RunState {
        if self.state.has_ended() {
            return self.state;
        }
        self.state = match self.read_word(self.pc) {
            Err(_) => RunState::Aborted { pc: self.pc },
            Ok(EBREAK) => RunState::Halted { code: self.gpr[10] },
            Ok(_) => {
                self.pc = self.pc.wrapping_add(4);
                RunState::Running
            }
        };
        self.instret += 1;
        self.state
    }
}

impl EvalContext for Machine {
    fn resolve_register(&self, name: &str) -> Result<Word, UnknownRegister> {
        if name == "pc" {
            return Ok(self.pc);
        }
        Self::gpr_index(name)
            .map(|i| self.gpr[i])
            .ok_or_else(|| UnknownRegister(name.to_owned()))
    }

    fn read_word(&self, addr: Word) -> Result<Word, MemError> {
        if !self.in_bounds(addr, 4) {
            return Err(MemError::OutOfBounds { addr });
        }
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.mem.get(&(addr + i as Word)).copied().unwrap_or(0);
        }
        Ok(Word::from_le_bytes(bytes))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_by_name() {
        let mut m = Machine::default();
        m.set_register("a0", 5).unwrap();
        assert_eq!(m.resolve_register("a0"), Ok(5));
        assert_eq!(m.resolve_register("x10"), Ok(5));
        assert_eq!(m.resolve_register("pc"), Ok(MEM_BASE));
        assert!(m.resolve_register("x32").is_err());
        assert!(m.resolve_register("foo").is_err());
    }

    #[test]
    fn zero_register_is_hardwired() {
        let mut m = Machine::default();
        m.set_register("zero", 9).unwrap();
        assert_eq!(m.resolve_register("0"), Ok(0));
        assert_eq!(m.resolve_register("zero"), Ok(0));
    }

    #[test]
    fn memory_little_endian() {
        let mut m = Machine::default();
        m.write_word(MEM_BASE, 0x1234_5678).unwrap();
        assert_eq!(m.read_word(MEM_BASE), Ok(0x1234_5678));
        assert_eq!(m.read_word(MEM_BASE + 1), Ok(0x0012_3456));
        assert_eq!(m.read_word(MEM_BASE + 8), Ok(0));
    }

    #[test]
    fn memory_bounds() {
        let mut m = Machine::new(16);
        assert!(m.read_word(MEM_BASE + 12).is_ok());
        assert_eq!(
            m.read_word(MEM_BASE + 13),
            Err(MemError::OutOfBounds { addr: MEM_BASE + 13 })
        );
        assert!(m.read_word(0).is_err());
        assert!(m.write_word(MEM_BASE + 16, 1).is_err());
        assert!(m.load_image(&[0; 17]).is_err());
        assert!(m.load_image(&[0; 16]).is_ok());
    }

    #[test]
    fn step_until_ebreak() {
        let mut m = Machine::default();
        m.write_word(MEM_BASE + 8, EBREAK).unwrap();
        m.set_register("a0", 0).unwrap();
        assert_eq!(m.step(), RunState::Running);
        assert_eq!(m.step(), RunState::Running);
        assert_eq!(m.pc(), MEM_BASE + 8);
        assert_eq!(m.step(), RunState::Halted { code: 0 });
        assert_eq!(m.instret(), 3);
        // stays halted
        assert_eq!(m.step(), RunState::Halted { code: 0 });
        assert_eq!(m.instret(), 3);
    }

    #[test]
    fn step_past_end_aborts() {
        let mut m = Machine::new(8);
        m.step();
        m.step();
        assert_eq!(m.step(), RunState::Aborted { pc: MEM_BASE + 8 });
    }

    #[test]
    fn image_loads_at_base() {
        let mut m = Machine::default();
        m.load_image(&EBREAK.to_le_bytes()).unwrap();
        assert_eq!(m.read_word(MEM_BASE), Ok(EBREAK));
        assert_eq!(m.step(), RunState::Halted { code: 0 });
    }
}
