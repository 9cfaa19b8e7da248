// trace.rs
//
// Turns a program trace (one 4-hex-digit 16-bit word per non-blank,
// non-`#` line) into an ordered Vec<DecodedInstruction>. Bit layout and
// opcode table match readTraceFile in tomsim.cpp. Unknown opcodes are
// skipped, not an error; malformed hex is fatal.

use std::fs;
use std::path::Path;

use log::trace;

use crate::errors::SimError;
use crate::scheduler::{DecodedInstruction, Operands, UnitClass};

pub fn decode_program(path: &Path) -> Result<Vec<DecodedInstruction>, SimError> {
    let contents = fs::read_to_string(path)?;
    let mut program = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let word = u16::from_str_radix(line, 16).map_err(|_| {
            SimError::TraceError(format!("line {}: `{}` is not a 16-bit hex word", line_no + 1, line))
        })?;
        if let Some(decoded) = decode_word(word) {
            trace!("trace: line {} -> {:?}", line_no + 1, decoded);
            program.push(decoded);
        } else {
            trace!("trace: line {} -> unknown opcode, skipped", line_no + 1);
        }
    }
    Ok(program)
}

/// Decodes one 16-bit instruction word: `opcode[15:11] | rd[10:8] |
/// rs[7:5] | rt[4:2] | func[1:0]`. Returns `None` for an opcode this
/// machine doesn't define; the caller treats that as silently skipped.
fn decode_word(word: u16) -> Option<DecodedInstruction> {
    let opcode = (word >> 11) & 0x1F;
    let rd = ((word >> 8) & 0x7) as u32;
    let rs = ((word >> 5) & 0x7) as u32;
    let rt = ((word >> 2) & 0x7) as u32;

    match opcode {
        0..=3 => Some(DecodedInstruction::new(UnitClass::Integer, Operands::Rrr { rd, rs, rt })),
        4 | 6 | 7 => Some(DecodedInstruction::new(UnitClass::Divider, Operands::Rrr { rd, rs, rt })),
        5 => Some(DecodedInstruction::new(UnitClass::Multiplier, Operands::Rrr { rd, rs, rt })),
        8 => Some(DecodedInstruction::new(UnitClass::Load, Operands::LoadRr { rd, rs })),
        9 => Some(DecodedInstruction::new(UnitClass::Store, Operands::StoreRr { rt, rs })),
        13 => Some(DecodedInstruction::new(UnitClass::Integer, Operands::None)),
        14 => Some(DecodedInstruction::new(UnitClass::Integer, Operands::SrcOnly { rs })),
        16 | 17 => Some(DecodedInstruction::new(UnitClass::Integer, Operands::ImmDest { rd })),
        18 => Some(DecodedInstruction::new(UnitClass::Integer, Operands::DestSrc { rd, rs: rd })),
        _ => None,
    }
}
