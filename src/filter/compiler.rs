use regex::Regex;
use crate::core::error::{Error, ErrorKind, Result};
use crate::filter::ast::{BooleanOp, CompareOp, Constant, Filter, StringOp};
use crate::filter::bytecode::{BytecodeConstant, CompiledFilter, ConstantPool, Instr, Opcode};

/// Compiles a typed filter AST into bytecode, short-circuiting AND/OR by
/// duplicating the left branch's result and conditionally jumping over the
/// right branch rather than always evaluating both sides.
pub fn compile(filter: &Filter) -> Result<CompiledFilter> {
    let mut constants = ConstantPool::new();
    let mut instructions = Vec::new();
    emit(filter, &mut constants, &mut instructions)?;
    instructions.push(Instr::new(Opcode::Halt));
    Ok(CompiledFilter { constants, instructions })
}

fn emit(filter: &Filter, constants: &mut ConstantPool, out: &mut Vec<Instr>) -> Result<()> {
    match filter {
        Filter::Literal(value) => {
            let idx = constants.intern(BytecodeConstant::Number(if *value { 1.0 } else { 0.0 }));
            out.push(Instr::with_operand(Opcode::PushConst, idx));
        }

        Filter::Value { field, op, value } => {
            push_field(field, constants, out);
            push_constant(value, constants, out);
            out.push(Instr::new(compare_opcode(*op)));
        }

        Filter::Range { field, min, max } => {
            push_field(field, constants, out);
            push_constant(min, constants, out);
            push_constant(max, constants, out);
            out.push(Instr::new(Opcode::Between));
        }

        Filter::In { field, values } => {
            push_field(field, constants, out);
            let strings: Vec<String> = values.iter().map(constant_to_string).collect();
            let idx = constants.intern(BytecodeConstant::StrList(strings));
            out.push(Instr::with_operand(Opcode::PushConst, idx));
            out.push(Instr::new(Opcode::In));
        }

        Filter::String { field, op, value } => {
            push_field(field, constants, out);
            let idx = constants.intern(BytecodeConstant::Str(value.clone()));
            out.push(Instr::with_operand(Opcode::PushConst, idx));
            out.push(Instr::new(string_opcode(*op)));
        }

        Filter::Regex { field, pattern } => {
            Regex::new(pattern).map_err(Error::from)?;
            push_field(field, constants, out);
            let idx = constants.intern(BytecodeConstant::Str(pattern.clone()));
            out.push(Instr::with_operand(Opcode::PushConst, idx));
            out.push(Instr::new(Opcode::Matches));
        }

        Filter::Null { field, is_null } => {
            push_field(field, constants, out);
            out.push(Instr::new(if *is_null { Opcode::IsNull } else { Opcode::IsNotNull }));
        }

        Filter::Not(inner) => {
            emit(inner, constants, out)?;
            out.push(Instr::new(Opcode::Not));
        }

        Filter::Composite { op, left, right } => {
            emit(left, constants, out)?;
            out.push(Instr::new(Opcode::Dup));
            let jump_idx = out.len();
            out.push(Instr::with_operand(
                match op {
                    BooleanOp::And => Opcode::JumpIfFalse,
                    BooleanOp::Or => Opcode::JumpIfTrue,
                },
                0,
            ));
            out.push(Instr::new(Opcode::Pop));
            emit(right, constants, out)?;
            let after = out.len() as u32;
            out[jump_idx].operand = after;
        }

        Filter::Ternary { condition, if_true, if_false } => {
            emit(condition, constants, out)?;
            let jump_to_false = out.len();
            out.push(Instr::with_operand(Opcode::JumpIfFalse, 0));
            emit(if_true, constants, out)?;
            let jump_to_end = out.len();
            out.push(Instr::with_operand(Opcode::Jump, 0));
            let false_branch = out.len() as u32;
            out[jump_to_false].operand = false_branch;
            emit(if_false, constants, out)?;
            let end = out.len() as u32;
            out[jump_to_end].operand = end;
        }
    }

    Ok(())
}

fn push_field(field: &str, constants: &mut ConstantPool, out: &mut Vec<Instr>) {
    let idx = constants.intern(BytecodeConstant::Str(field.to_string()));
    out.push(Instr::with_operand(Opcode::PushField, idx));
}

fn push_constant(value: &Constant, constants: &mut ConstantPool, out: &mut Vec<Instr>) {
    let bc = match value {
        Constant::String(s) => BytecodeConstant::Str(s.clone()),
        Constant::Number(n) => BytecodeConstant::Number(*n),
        Constant::Boolean(b) => BytecodeConstant::Number(if *b { 1.0 } else { 0.0 }),
        Constant::StringList(items) => BytecodeConstant::StrList(items.clone()),
    };
    let idx = constants.intern(bc);
    out.push(Instr::with_operand(Opcode::PushConst, idx));
}

fn constant_to_string(value: &Constant) -> String {
    match value {
        Constant::String(s) => s.clone(),
        Constant::Number(n) => n.to_string(),
        Constant::Boolean(b) => b.to_string(),
        Constant::StringList(items) => items.join(","),
    }
}

fn compare_opcode(op: CompareOp) -> Opcode {
    match op {
        CompareOp::Eq => Opcode::Eq,
        CompareOp::Neq => Opcode::Neq,
        CompareOp::Lt => Opcode::Lt,
        CompareOp::Lte => Opcode::Lte,
        CompareOp::Gt => Opcode::Gt,
        CompareOp::Gte => Opcode::Gte,
    }
}

fn string_opcode(op: StringOp) -> Opcode {
    match op {
        StringOp::Contains => Opcode::Contains,
        StringOp::StartsWith => Opcode::StartsWith,
        StringOp::EndsWith => Opcode::EndsWith,
        StringOp::Like => Opcode::Like,
    }
}

/// Converts a SQL-style LIKE pattern (`%` = any run, `_` = any one char)
/// into an anchored, case-insensitive regex source.
pub fn like_pattern_to_regex(pattern: &str) -> String {
    let mut out = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            c if ".+*?()|[]{}^$\\".contains(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_simple_comparison() {
        let filter = Filter::Value { field: "genre".into(), op: CompareOp::Eq, value: Constant::String("Fantasy".into()) };
        let compiled = compile(&filter).unwrap();
        assert!(matches!(compiled.instructions.last().unwrap().opcode, Opcode::Halt));
    }

    #[test]
    fn and_composite_patches_jump_target() {
        let left = Filter::Value { field: "genre".into(), op: CompareOp::Eq, value: Constant::String("Fantasy".into()) };
        let right = Filter::Range { field: "year".into(), min: Constant::Number(2000.0), max: Constant::Number(2020.0) };
        let filter = left.and(right);
        let compiled = compile(&filter).unwrap();
        let jump = compiled.instructions.iter().find(|i| i.opcode == Opcode::JumpIfFalse).unwrap();
        assert!((jump.operand as usize) < compiled.instructions.len());
    }

    #[test]
    fn like_pattern_translates_wildcards() {
        assert_eq!(like_pattern_to_regex("mag_c%"), "(?i)^mag.c.*$");
    }
}
