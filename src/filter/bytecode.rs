use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

pub const MAGIC: &[u8] = b"INFISCRIPT-V1";
pub const VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    PushField = 0,
    PushConst = 1,
    Pop = 2,
    Dup = 3,
    Eq = 4,
    Neq = 5,
    Lt = 6,
    Lte = 7,
    Gt = 8,
    Gte = 9,
    And = 10,
    Or = 11,
    Not = 12,
    Contains = 13,
    StartsWith = 14,
    EndsWith = 15,
    Like = 16,
    Matches = 17,
    In = 18,
    Between = 19,
    IsNull = 20,
    IsNotNull = 21,
    Jump = 22,
    JumpIfFalse = 23,
    JumpIfTrue = 24,
    Halt = 25,
}

impl Opcode {
    pub fn takes_operand(self) -> bool {
        matches!(self, Opcode::PushField | Opcode::PushConst | Opcode::Jump | Opcode::JumpIfFalse | Opcode::JumpIfTrue)
    }

    fn from_u8(byte: u8) -> Result<Self> {
        Ok(match byte {
            0 => Opcode::PushField,
            1 => Opcode::PushConst,
            2 => Opcode::Pop,
            3 => Opcode::Dup,
            4 => Opcode::Eq,
            5 => Opcode::Neq,
            6 => Opcode::Lt,
            7 => Opcode::Lte,
            8 => Opcode::Gt,
            9 => Opcode::Gte,
            10 => Opcode::And,
            11 => Opcode::Or,
            12 => Opcode::Not,
            13 => Opcode::Contains,
            14 => Opcode::StartsWith,
            15 => Opcode::EndsWith,
            16 => Opcode::Like,
            17 => Opcode::Matches,
            18 => Opcode::In,
            19 => Opcode::Between,
            20 => Opcode::IsNull,
            21 => Opcode::IsNotNull,
            22 => Opcode::Jump,
            23 => Opcode::JumpIfFalse,
            24 => Opcode::JumpIfTrue,
            25 => Opcode::Halt,
            other => return Err(Error::new(ErrorKind::InvalidBytecode, format!("unknown opcode {}", other))),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Instr {
    pub opcode: Opcode,
    pub operand: u32,
}

impl Instr {
    pub fn new(opcode: Opcode) -> Self {
        Instr { opcode, operand: 0 }
    }

    pub fn with_operand(opcode: Opcode, operand: u32) -> Self {
        Instr { opcode, operand }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BytecodeConstant {
    Str(String),
    Number(f64),
    StrList(Vec<String>),
}

/// A value-deduplicating sequence: repeated `intern` calls for an equal
/// constant return the same index, keeping PUSH_FIELD/PUSH_CONST operands
/// compact even for filters that reference the same field repeatedly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstantPool {
    values: Vec<BytecodeConstant>,
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool { values: Vec::new() }
    }

    pub fn intern(&mut self, constant: BytecodeConstant) -> u32 {
        if let Some(pos) = self.values.iter().position(|v| v == &constant) {
            return pos as u32;
        }
        self.values.push(constant);
        (self.values.len() - 1) as u32
    }

    pub fn get(&self, index: u32) -> Option<&BytecodeConstant> {
        self.values.get(index as usize)
    }
}

/// `(constants, instructions)` pair produced by the compiler and executed
/// by the VM. Cached by AST identity; serialized with the
/// `"INFISCRIPT-V1"` magic + version header (§4.8).
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub constants: ConstantPool,
    pub instructions: Vec<Instr>,
}

impl CompiledFilter {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());

        let pool_bytes = bincode::serialize(&self.constants)?;
        out.extend_from_slice(&(pool_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&pool_bytes);

        out.extend_from_slice(&(self.instructions.len() as u32).to_le_bytes());
        for instr in &self.instructions {
            out.push(instr.opcode as u8);
            if instr.opcode.takes_operand() {
                out.extend_from_slice(&instr.operand.to_le_bytes());
            }
        }

        Ok(out)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MAGIC.len() + 2 || &bytes[..MAGIC.len()] != MAGIC {
            return Err(Error::new(ErrorKind::InvalidBytecode, "bad magic".into()));
        }
        let mut cursor = MAGIC.len();

        let version = u16::from_le_bytes([bytes[cursor], bytes[cursor + 1]]);
        cursor += 2;
        if version != VERSION {
            return Err(Error::new(ErrorKind::InvalidBytecode, format!("unsupported bytecode version {}", version)));
        }

        let pool_len = read_u32(bytes, &mut cursor)? as usize;
        if cursor + pool_len > bytes.len() {
            return Err(Error::new(ErrorKind::InvalidBytecode, "truncated constant pool".into()));
        }
        let constants: ConstantPool = bincode::deserialize(&bytes[cursor..cursor + pool_len])?;
        cursor += pool_len;

        let instr_count = read_u32(bytes, &mut cursor)? as usize;
        let mut instructions = Vec::with_capacity(instr_count);
        for _ in 0..instr_count {
            if cursor >= bytes.len() {
                return Err(Error::new(ErrorKind::InvalidBytecode, "truncated instruction stream".into()));
            }
            let opcode = Opcode::from_u8(bytes[cursor])?;
            cursor += 1;
            let operand = if opcode.takes_operand() {
                read_u32(bytes, &mut cursor)?
            } else {
                0
            };
            instructions.push(Instr { opcode, operand });
        }

        Ok(CompiledFilter { constants, instructions })
    }
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32> {
    if *cursor + 4 > bytes.len() {
        return Err(Error::new(ErrorKind::InvalidBytecode, "truncated u32".into()));
    }
    let value = u32::from_le_bytes([bytes[*cursor], bytes[*cursor + 1], bytes[*cursor + 2], bytes[*cursor + 3]]);
    *cursor += 4;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_program() {
        let mut constants = ConstantPool::new();
        let field_idx = constants.intern(BytecodeConstant::Str("year".into()));
        let value_idx = constants.intern(BytecodeConstant::Number(2000.0));
        let filter = CompiledFilter {
            constants,
            instructions: vec![
                Instr::with_operand(Opcode::PushField, field_idx),
                Instr::with_operand(Opcode::PushConst, value_idx),
                Instr::new(Opcode::Gte),
                Instr::new(Opcode::Halt),
            ],
        };

        let bytes = filter.serialize().unwrap();
        let restored = CompiledFilter::deserialize(&bytes).unwrap();
        assert_eq!(restored.instructions.len(), filter.instructions.len());
        assert_eq!(restored.constants.get(field_idx), Some(&BytecodeConstant::Str("year".into())));
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = vec![0u8; 20];
        assert!(CompiledFilter::deserialize(&bytes).is_err());
    }
}
