//! Structural instruction-text tokenization.
//!
//! Disassembly text is tokenized exactly once, at load time, into a
//! `{mnemonic, operands[]}` record. All downstream matching (register-name
//! detection, `[frame-pointer ± offset]` detection, immediate extraction) is
//! structural pattern matching over [`Instruction`] instead of repeated string
//! scanning, which centralizes the instruction-text grammar in this file.
//!
//! The grammar is deliberately small: it covers the mnemonic-plus-comma-separated
//! operand form the simulator and common disassemblers emit. Operands that do not
//! match a known form are kept as opaque text rather than rejected, so unknown
//! instructions still flow through the engine.

/// x86/x64 general-purpose register names recognized by the tokenizer,
/// lowercase, all widths.
const GP_REGISTERS: &[&str] = &[
    // 64-bit
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
    // 32-bit
    "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi",
    // 16-bit
    "ax", "cx", "dx", "bx", "sp", "bp", "si", "di",
    // 8-bit
    "al", "cl", "dl", "bl", "ah", "ch", "dh", "bh",
];

/// Frame-pointer register names, the fixed reference axis for slot offsets.
const FRAME_POINTERS: &[&str] = &["rbp", "ebp", "bp"];

/// Returns `true` if `name` is a recognized general-purpose register name.
#[must_use]
pub fn is_register_name(name: &str) -> bool {
    GP_REGISTERS.iter().any(|reg| name.eq_ignore_ascii_case(reg))
}

/// Returns `true` if `name` is a frame-pointer register name.
#[must_use]
pub fn is_frame_pointer_name(name: &str) -> bool {
    FRAME_POINTERS
        .iter()
        .any(|reg| name.eq_ignore_ascii_case(reg))
}

/// One parsed instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A general-purpose register, canonical lowercase name.
    Register(String),
    /// An integer immediate, hex (`0x2a`) or decimal (`42`), optionally negative.
    Immediate(i64),
    /// A frame-pointer-relative memory operand, e.g. `[rbp-0x20]`.
    FrameRef {
        /// Signed byte offset from the frame pointer.
        offset: i64,
    },
    /// A memory operand with a non-frame-pointer base, kept as its inner text.
    Memory(String),
    /// Anything else (labels, symbols, unsupported addressing forms).
    Other(String),
}

impl Operand {
    /// Returns the register name if this is a register operand.
    #[must_use]
    pub fn as_register(&self) -> Option<&str> {
        match self {
            Operand::Register(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the immediate value if this is an immediate operand.
    #[must_use]
    pub fn as_immediate(&self) -> Option<i64> {
        match self {
            Operand::Immediate(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the frame-pointer-relative offset if this is a frame reference.
    #[must_use]
    pub fn as_frame_offset(&self) -> Option<i64> {
        match self {
            Operand::FrameRef { offset } => Some(*offset),
            _ => None,
        }
    }

    fn parse(text: &str) -> Operand {
        let trimmed = text.trim();
        if let Some(inner) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return Operand::parse_memory(inner);
        }
        if is_register_name(trimmed) {
            return Operand::Register(trimmed.to_ascii_lowercase());
        }
        if let Some(value) = parse_immediate(trimmed) {
            return Operand::Immediate(value);
        }
        Operand::Other(trimmed.to_string())
    }

    fn parse_memory(inner: &str) -> Operand {
        let compact: String = inner
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        let (base, rest) = match compact.find(['+', '-']) {
            Some(split) => (&compact[..split], &compact[split..]),
            None => (compact.as_str(), ""),
        };

        if !is_frame_pointer_name(base) {
            return Operand::Memory(compact);
        }
        if rest.is_empty() {
            return Operand::FrameRef { offset: 0 };
        }
        match parse_immediate(rest) {
            Some(offset) => Operand::FrameRef { offset },
            // A frame-pointer base with an index or unparseable displacement
            // is beyond the grammar; keep it opaque.
            None => Operand::Memory(compact),
        }
    }
}

/// Parses a signed immediate: `0x` hex or decimal, with an optional leading sign.
fn parse_immediate(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(sign * magnitude)
}

/// A tokenized instruction: lowercase mnemonic plus parsed operands.
///
/// # Examples
///
/// ```rust
/// use stackscope::disasm::{Instruction, Operand};
///
/// let instr = Instruction::parse("cmp eax, 0x2a");
/// assert_eq!(instr.mnemonic, "cmp");
/// assert_eq!(instr.operands[0], Operand::Register("eax".into()));
/// assert_eq!(instr.operands[1], Operand::Immediate(0x2a));
///
/// let load = Instruction::parse("mov eax, [rbp-0x10]");
/// assert_eq!(load.operands[1], Operand::FrameRef { offset: -0x10 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Lowercase mnemonic (first whitespace-separated token).
    pub mnemonic: String,
    /// Parsed operands, in order.
    pub operands: Vec<Operand>,
    /// The original instruction text, untouched.
    pub text: String,
}

impl Instruction {
    /// Tokenizes one line of instruction text.
    ///
    /// Never fails; text that does not fit the grammar ends up with opaque
    /// [`Operand::Other`] operands or, for an empty line, no operands at all.
    #[must_use]
    pub fn parse(text: &str) -> Instruction {
        let trimmed = text.trim();
        let (head, tail) = match trimmed.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (trimmed, ""),
        };

        let operands = if tail.is_empty() {
            Vec::new()
        } else {
            tail.split(',').map(Operand::parse).collect()
        };

        Instruction {
            mnemonic: head.to_ascii_lowercase(),
            operands,
            text: trimmed.to_string(),
        }
    }

    /// Returns `true` if this is a comparison instruction.
    #[must_use]
    pub fn is_cmp(&self) -> bool {
        self.mnemonic == "cmp"
    }

    /// Returns the first frame-pointer-relative operand offset, if any.
    #[must_use]
    pub fn frame_operand(&self) -> Option<i64> {
        self.operands.iter().find_map(Operand::as_frame_offset)
    }

    /// Returns the first register operand name, if any.
    #[must_use]
    pub fn register_operand(&self) -> Option<&str> {
        self.operands.iter().find_map(Operand::as_register)
    }

    /// Returns `true` if this instruction loads `register` from a
    /// frame-pointer-relative slot (a `mov`-family `reg, [fp±off]` form).
    #[must_use]
    pub fn loads_register_from_frame(&self, register: &str) -> bool {
        matches!(self.mnemonic.as_str(), "mov" | "movzx" | "movsx")
            && self.operands.first().and_then(Operand::as_register) == Some(register)
            && self
                .operands
                .get(1)
                .and_then(Operand::as_frame_offset)
                .is_some()
    }

    /// Classifies how this instruction moves or reshapes the stack.
    #[must_use]
    pub fn stack_effect(&self) -> StackEffect {
        let touches_sp = || {
            self.operands
                .iter()
                .filter_map(Operand::as_register)
                .any(|reg| matches!(reg, "rsp" | "esp" | "sp"))
        };
        let touches_fp = || {
            self.operands
                .iter()
                .filter_map(Operand::as_register)
                .any(is_frame_pointer_name)
        };

        match self.mnemonic.as_str() {
            "push" => StackEffect::Push,
            "pop" => StackEffect::Pop,
            "call" => StackEffect::Call,
            "ret" => StackEffect::Return,
            "leave" => StackEffect::Leave,
            "sub" if touches_sp() => StackEffect::Reserve,
            "add" if touches_sp() => StackEffect::Release,
            "mov" if touches_sp() || touches_fp() => StackEffect::FrameAdjust,
            _ => StackEffect::None,
        }
    }
}

/// How an instruction affects the stack, for step-by-step explanation panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StackEffect {
    /// Reserves one word and writes a value onto the stack.
    Push,
    /// Reads the top word and releases it.
    Pop,
    /// Pushes the return address and transfers control.
    Call,
    /// Pops the return address and transfers control.
    Return,
    /// Resets the stack pointer to the frame pointer and pops the saved frame pointer.
    Leave,
    /// Explicitly reserves stack space (`sub sp, n`).
    Reserve,
    /// Explicitly releases stack space (`add sp, n`).
    Release,
    /// Adjusts the stack or frame pointer (prologue/epilogue `mov`).
    FrameAdjust,
    /// No direct stack effect detected.
    None,
}
