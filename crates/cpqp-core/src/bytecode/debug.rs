//! Bytecode disassembler for debugging

use std::fmt::{self, Write};

use super::chunk::Chunk;
use super::opcode::OpCode;
use super::value::Value;

/// Disassemble a chunk to a string
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail
    let _ = write_chunk(chunk, name, &mut output);
    output
}

fn write_chunk(chunk: &Chunk, name: &str, output: &mut String) -> fmt::Result {
    writeln!(output, "== {name} ==")?;

    let mut offset = 0;
    while offset < chunk.len() {
        offset = write_instruction(chunk, offset, output)?;
    }

    writeln!(output, "-- constantes --")?;
    for (index, constant) in chunk.constants().iter().enumerate() {
        writeln!(output, "{index:4} {}", format_constant(Some(constant)))?;
    }
    Ok(())
}

/// Disassemble the instruction at `offset` as a single line (used for tracing)
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> String {
    let mut output = String::new();
    let _ = write_instruction(chunk, offset, &mut output);
    output.trim_end().to_string()
}

/// Disassemble a single instruction, returning the next offset
fn write_instruction(chunk: &Chunk, offset: usize, output: &mut String) -> Result<usize, fmt::Error> {
    write!(output, "{offset:04} ")?;

    // Print line number (or | if same as previous)
    let line = chunk.get_line(offset);
    if offset > 0 && line == chunk.get_line(offset - 1) {
        write!(output, "   | ")?;
    } else {
        write!(output, "{line:4} ")?;
    }

    let Some(byte) = chunk.read_byte(offset) else {
        writeln!(output, "Invalid offset")?;
        return Ok(offset + 1);
    };

    let Ok(opcode) = OpCode::try_from(byte) else {
        writeln!(output, "Unknown opcode {byte}")?;
        return Ok(offset + 1);
    };

    match opcode.operand_width() {
        0 => writeln!(output, "{}", opcode.name())?,

        1 => {
            let Some(operand) = chunk.read_byte(offset + 1) else {
                writeln!(output, "{:16} <truncated>", opcode.name())?;
                return Ok(chunk.len());
            };
            if matches!(opcode, OpCode::GetLocal | OpCode::SetLocal) {
                writeln!(output, "{:16} {operand:4}", opcode.name())?;
            } else {
                writeln!(
                    output,
                    "{:16} {:4} {}",
                    opcode.name(),
                    operand,
                    format_constant(chunk.get_constant(operand))
                )?;
            }
        }

        _ => {
            let Some(jump) = chunk.read_u16(offset + 1) else {
                writeln!(output, "{:16} <truncated>", opcode.name())?;
                return Ok(chunk.len());
            };
            let after = offset + opcode.size();
            let target = if opcode == OpCode::Loop {
                after.checked_sub(usize::from(jump))
            } else {
                Some(after + usize::from(jump))
            };
            match target {
                Some(target) => writeln!(output, "{:16} {:4} -> {target}", opcode.name(), jump)?,
                None => writeln!(output, "{:16} {:4} -> <invalid>", opcode.name(), jump)?,
            }
        }
    }

    Ok(offset + opcode.size())
}

/// Format a constant for display
fn format_constant(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => format!("\"{s}\""),
        Some(v) => format!("{v}"),
        None => "<invalid>".to_string(),
    }
}
