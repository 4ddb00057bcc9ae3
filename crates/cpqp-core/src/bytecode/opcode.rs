//! Bytecode instruction set for the cpqp virtual machine

/// Bytecode operation codes
///
/// This is a stack-based instruction set. The discriminant of each variant
/// is its encoded byte, so the declaration order below is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Stop execution successfully
    Return,

    /// Push a constant from the constant pool onto the stack
    /// Operand: u8 constant index
    Constant,

    /// Pop and discard the top of stack
    Pop,

    /// Pop a number, push its negation
    Negate,

    /// Pop two values, push their sum (or concatenation when either is a string)
    Add,

    /// Pop two values (right, left), push left - right
    Subtract,

    /// Pop two values, push their product
    Multiply,

    /// Pop two values (right, left), push left / right
    Divide,

    /// Push nil onto the stack
    Nil,

    /// Push true onto the stack
    True,

    /// Push false onto the stack
    False,

    /// Pop a value, push its logical negation
    Not,

    /// Pop two values, push whether they are equal
    Equal,

    /// Pop two numbers (right, left), push left > right
    Greater,

    /// Pop two numbers (right, left), push left < right
    Less,

    /// Pop a value and bind it to a global
    /// Operand: u8 constant index (name)
    DefineGlobal,

    /// Push the value of a global
    /// Operand: u8 constant index (name)
    GetGlobal,

    /// Store top of stack into an existing global (does not pop)
    /// Operand: u8 constant index (name)
    SetGlobal,

    /// Reserved for slot-indexed locals; never emitted
    /// Operand: u8 slot index
    GetLocal,

    /// Reserved for slot-indexed locals; never emitted
    /// Operand: u8 slot index
    SetLocal,

    /// Unconditional forward jump
    /// Operand: u16 offset (big-endian)
    Jump,

    /// Forward jump if the top of stack is falsy (does not pop)
    /// Operand: u16 offset (big-endian)
    JumpIfFalse,

    /// Backward jump
    /// Operand: u16 offset (big-endian)
    Loop,

    /// Pop a value and write it as one output line
    Print,

    /// Read one line of input and push it
    Input,
}

impl OpCode {
    /// Number of operand bytes following the opcode byte
    pub const fn operand_width(self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::DefineGlobal
            | OpCode::GetGlobal
            | OpCode::SetGlobal
            | OpCode::GetLocal
            | OpCode::SetLocal => 1,

            OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => 2,

            _ => 0,
        }
    }

    /// Size of the whole instruction in bytes
    pub const fn size(self) -> usize {
        1 + self.operand_width()
    }

    /// Get the name of this opcode for disassembly
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Return => "RETURN",
            OpCode::Constant => "CONSTANT",
            OpCode::Pop => "POP",
            OpCode::Negate => "NEGATE",
            OpCode::Add => "ADD",
            OpCode::Subtract => "SUBTRACT",
            OpCode::Multiply => "MULTIPLY",
            OpCode::Divide => "DIVIDE",
            OpCode::Nil => "NIL",
            OpCode::True => "TRUE",
            OpCode::False => "FALSE",
            OpCode::Not => "NOT",
            OpCode::Equal => "EQUAL",
            OpCode::Greater => "GREATER",
            OpCode::Less => "LESS",
            OpCode::DefineGlobal => "DEFINE_GLOBAL",
            OpCode::GetGlobal => "GET_GLOBAL",
            OpCode::SetGlobal => "SET_GLOBAL",
            OpCode::GetLocal => "GET_LOCAL",
            OpCode::SetLocal => "SET_LOCAL",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::Loop => "LOOP",
            OpCode::Print => "PRINT",
            OpCode::Input => "INPUT",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OpCode::Return),
            1 => Ok(OpCode::Constant),
            2 => Ok(OpCode::Pop),
            3 => Ok(OpCode::Negate),
            4 => Ok(OpCode::Add),
            5 => Ok(OpCode::Subtract),
            6 => Ok(OpCode::Multiply),
            7 => Ok(OpCode::Divide),
            8 => Ok(OpCode::Nil),
            9 => Ok(OpCode::True),
            10 => Ok(OpCode::False),
            11 => Ok(OpCode::Not),
            12 => Ok(OpCode::Equal),
            13 => Ok(OpCode::Greater),
            14 => Ok(OpCode::Less),
            15 => Ok(OpCode::DefineGlobal),
            16 => Ok(OpCode::GetGlobal),
            17 => Ok(OpCode::SetGlobal),
            18 => Ok(OpCode::GetLocal),
            19 => Ok(OpCode::SetLocal),
            20 => Ok(OpCode::Jump),
            21 => Ok(OpCode::JumpIfFalse),
            22 => Ok(OpCode::Loop),
            23 => Ok(OpCode::Print),
            24 => Ok(OpCode::Input),
            _ => Err(value),
        }
    }
}
