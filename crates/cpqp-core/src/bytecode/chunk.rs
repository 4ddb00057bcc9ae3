//! Bytecode chunk - a sequence of instructions with constants and debug info

use super::opcode::OpCode;
use super::value::Value;

/// Maximum number of entries in a chunk's constant pool (indices are one byte)
pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

/// Largest distance a 16-bit jump operand can encode
pub const MAX_JUMP: usize = u16::MAX as usize;

/// Sentinel written into a jump operand until it is patched
const JUMP_PLACEHOLDER: u8 = 0xFF;

/// A chunk of bytecode
///
/// Contains the raw bytecode instructions, a constant pool, and one source
/// line per code byte for error messages.
#[derive(Clone, Default)]
pub struct Chunk {
    /// Raw bytecode instructions
    code: Vec<u8>,

    /// Constant pool
    constants: Vec<Value>,

    /// Source line of every byte in `code`; always the same length
    lines: Vec<u32>,
}

impl Chunk {
    /// Create a new empty chunk
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bytes in the chunk
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the chunk is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Returns the raw bytecode
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Returns the constant pool
    #[must_use]
    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    /// Returns the line table, parallel to [`Chunk::code`]
    #[must_use]
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get a constant by index
    #[must_use]
    pub fn get_constant(&self, index: u8) -> Option<&Value> {
        self.constants.get(usize::from(index))
    }

    /// Write a single byte to the chunk
    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write an opcode to the chunk
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.write_byte(op as u8, line);
    }

    /// Write an opcode with a u8 operand
    pub fn write_op_u8(&mut self, op: OpCode, operand: u8, line: u32) {
        self.write_byte(op as u8, line);
        self.write_byte(operand, line);
    }

    /// Read a byte at a position
    #[must_use]
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Read a u16 at a position (big-endian)
    #[must_use]
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let high = self.read_byte(offset)?;
        let low = self.read_byte(offset + 1)?;
        Some(u16::from_be_bytes([high, low]))
    }

    /// Patch a u16 value at a position (big-endian)
    ///
    /// The two bytes must already have been written.
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.code[offset] = high;
        self.code[offset + 1] = low;
    }

    /// Add a constant to the pool and return its index
    ///
    /// Every call allocates a new slot, identical values included.
    /// Returns `None` if the constant pool is full (256 constants).
    pub fn add_constant(&mut self, value: Value) -> Option<u8> {
        let index = u8::try_from(self.constants.len()).ok()?;
        self.constants.push(value);
        Some(index)
    }

    /// Get the line number for a bytecode offset
    ///
    /// Offsets past the end map to the last recorded line, or 0 for an
    /// empty chunk.
    #[must_use]
    pub fn get_line(&self, offset: usize) -> u32 {
        self.lines
            .get(offset)
            .or_else(|| self.lines.last())
            .copied()
            .unwrap_or(0)
    }

    /// Get the current bytecode offset (for jump targets)
    #[must_use]
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Emit a jump instruction and return the offset of its operand
    ///
    /// The operand holds `0xFFFF` until [`Chunk::patch_jump`] rewrites it.
    pub fn emit_jump(&mut self, op: OpCode, line: u32) -> usize {
        self.write_op(op, line);
        let patch_offset = self.code.len();
        self.write_byte(JUMP_PLACEHOLDER, line);
        self.write_byte(JUMP_PLACEHOLDER, line);
        patch_offset
    }

    /// Patch a jump operand so the jump lands at the current position
    ///
    /// Returns the required distance as the error when it does not fit in
    /// 16 bits.
    pub fn patch_jump(&mut self, patch_offset: usize) -> Result<(), usize> {
        let distance = self.code.len() - patch_offset - 2;
        let encoded = u16::try_from(distance).map_err(|_| distance)?;
        self.patch_u16(patch_offset, encoded);
        Ok(())
    }

    /// Emit a loop instruction that jumps back to `loop_start`
    ///
    /// The distance counts the loop operand itself, since the VM subtracts
    /// it after reading both operand bytes.
    pub fn emit_loop(&mut self, loop_start: usize, line: u32) -> Result<(), usize> {
        self.write_op(OpCode::Loop, line);
        let distance = self.code.len() - loop_start + 2;
        let encoded = u16::try_from(distance).map_err(|_| distance)?;
        let [high, low] = encoded.to_be_bytes();
        self.write_byte(high, line);
        self.write_byte(low, line);
        Ok(())
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("code_len", &self.code.len())
            .field("constants_len", &self.constants.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_write_read() {
        let mut chunk = Chunk::new();

        chunk.write_op(OpCode::Jump, 1);
        chunk.write_byte(0x12, 1);
        chunk.write_byte(0x34, 1);

        assert_eq!(chunk.read_byte(0), Some(OpCode::Jump as u8));
        assert_eq!(chunk.read_u16(1), Some(0x1234));
        assert_eq!(chunk.read_u16(2), None);
    }

    #[test]
    fn chunk_constants_are_not_deduplicated() {
        let mut chunk = Chunk::new();

        let idx1 = chunk.add_constant(Value::Int(1)).unwrap();
        let idx2 = chunk.add_constant(Value::Int(1)).unwrap();

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(chunk.constants(), &[Value::Int(1), Value::Int(1)]);
    }

    #[test]
    fn chunk_constant_pool_is_capped() {
        let mut chunk = Chunk::new();
        for i in 0..MAX_CONSTANTS {
            assert!(chunk.add_constant(Value::Int(i as i32)).is_some());
        }
        assert_eq!(chunk.add_constant(Value::Nil), None);
        assert_eq!(chunk.constants().len(), MAX_CONSTANTS);
    }

    #[test]
    fn chunk_line_info() {
        let mut chunk = Chunk::new();

        chunk.write_op_u8(OpCode::Constant, 0, 1);
        chunk.write_op(OpCode::Return, 2);

        assert_eq!(chunk.code().len(), chunk.lines().len());
        assert_eq!(chunk.get_line(0), 1);
        assert_eq!(chunk.get_line(1), 1);
        assert_eq!(chunk.get_line(2), 2);
        assert_eq!(chunk.get_line(99), 2);
        assert_eq!(Chunk::new().get_line(0), 0);
    }

    #[test]
    fn chunk_jump_patching() {
        let mut chunk = Chunk::new();

        chunk.write_op(OpCode::Nil, 1);
        let patch = chunk.emit_jump(OpCode::JumpIfFalse, 1);
        assert_eq!(chunk.read_u16(patch), Some(0xFFFF));
        chunk.write_op(OpCode::Nil, 2);
        chunk.write_op(OpCode::Pop, 2);
        chunk.patch_jump(patch).unwrap();

        // Jump should skip 2 bytes (Nil + Pop)
        assert_eq!(chunk.read_u16(patch), Some(2));
    }

    #[test]
    fn chunk_jump_too_far() {
        let mut chunk = Chunk::new();
        let patch = chunk.emit_jump(OpCode::Jump, 1);
        for _ in 0..=MAX_JUMP {
            chunk.write_op(OpCode::Nil, 1);
        }
        assert_eq!(chunk.patch_jump(patch), Err(MAX_JUMP + 1));
    }

    #[test]
    fn chunk_loop() {
        let mut chunk = Chunk::new();

        let loop_start = chunk.current_offset();
        chunk.write_op(OpCode::Nil, 1);
        chunk.write_op(OpCode::Pop, 1);
        chunk.emit_loop(loop_start, 1).unwrap();

        // Nil(0), Pop(1), Loop(2), offset(3-4): ip is 5 after the operand
        assert_eq!(chunk.read_byte(2), Some(OpCode::Loop as u8));
        assert_eq!(chunk.read_u16(3), Some(5));
    }
}
