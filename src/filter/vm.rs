use regex::Regex;
use crate::core::document::Document;
use crate::core::types::FieldValue;
use crate::filter::bytecode::{BytecodeConstant, CompiledFilter, Opcode};

#[derive(Debug, Clone)]
enum VmValue {
    Str(String),
    Number(f64),
    Bool(bool),
    StrList(Vec<String>),
    Null,
}

impl VmValue {
    fn truthy(&self) -> bool {
        match self {
            VmValue::Str(s) => !s.is_empty(),
            VmValue::Number(n) => *n != 0.0,
            VmValue::Bool(b) => *b,
            VmValue::StrList(items) => !items.is_empty(),
            VmValue::Null => false,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            VmValue::Number(n) => Some(*n),
            VmValue::Str(s) => s.parse::<f64>().ok(),
            VmValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn as_str_lower(&self) -> String {
        match self {
            VmValue::Str(s) => s.to_lowercase(),
            VmValue::Number(n) => n.to_string(),
            VmValue::Bool(b) => b.to_string(),
            VmValue::StrList(items) => items.join(",").to_lowercase(),
            VmValue::Null => String::new(),
        }
    }
}

impl From<&FieldValue> for VmValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => VmValue::Str(s.clone()),
            FieldValue::List(items) => VmValue::StrList(items.clone()),
            FieldValue::Number(n) => VmValue::Number(*n),
            FieldValue::Boolean(b) => VmValue::Bool(*b),
            FieldValue::Null => VmValue::Null,
        }
    }
}

fn field_name(filter: &CompiledFilter, idx: u32) -> &str {
    match filter.constants.get(idx) {
        Some(BytecodeConstant::Str(s)) => s.as_str(),
        _ => "",
    }
}

fn constant_value(filter: &CompiledFilter, idx: u32) -> VmValue {
    match filter.constants.get(idx) {
        Some(BytecodeConstant::Str(s)) => VmValue::Str(s.clone()),
        Some(BytecodeConstant::Number(n)) => VmValue::Number(*n),
        Some(BytecodeConstant::StrList(items)) => VmValue::StrList(items.clone()),
        None => VmValue::Null,
    }
}

/// Executes compiled filter bytecode against a single document. All
/// comparisons are case-insensitive string equals, or numeric if both
/// operands parse as doubles. Execution halts on `HALT` or end-of-program;
/// the result is the top of stack interpreted as boolean.
pub struct FilterVm<'a> {
    filter: &'a CompiledFilter,
}

impl<'a> FilterVm<'a> {
    pub fn new(filter: &'a CompiledFilter) -> Self {
        FilterVm { filter }
    }

    pub fn run(&self, doc: &Document) -> bool {
        let mut stack: Vec<VmValue> = Vec::new();
        let mut pc = 0usize;

        while pc < self.filter.instructions.len() {
            let instr = &self.filter.instructions[pc];
            match instr.opcode {
                Opcode::Halt => break,

                Opcode::PushField => {
                    let name = field_name(self.filter, instr.operand);
                    let value = doc.fields.get(name).map(|f| VmValue::from(&f.value)).unwrap_or(VmValue::Null);
                    stack.push(value);
                }
                Opcode::PushConst => stack.push(constant_value(self.filter, instr.operand)),
                Opcode::Pop => {
                    stack.pop();
                }
                Opcode::Dup => {
                    if let Some(top) = stack.last().cloned() {
                        stack.push(top);
                    }
                }

                Opcode::Eq | Opcode::Neq | Opcode::Lt | Opcode::Lte | Opcode::Gt | Opcode::Gte => {
                    let b = stack.pop().unwrap_or(VmValue::Null);
                    let a = stack.pop().unwrap_or(VmValue::Null);
                    stack.push(VmValue::Bool(compare(&a, &b, instr.opcode)));
                }

                Opcode::And => {
                    let b = stack.pop().map(|v| v.truthy()).unwrap_or(false);
                    let a = stack.pop().map(|v| v.truthy()).unwrap_or(false);
                    stack.push(VmValue::Bool(a && b));
                }
                Opcode::Or => {
                    let b = stack.pop().map(|v| v.truthy()).unwrap_or(false);
                    let a = stack.pop().map(|v| v.truthy()).unwrap_or(false);
                    stack.push(VmValue::Bool(a || b));
                }
                Opcode::Not => {
                    let a = stack.pop().map(|v| v.truthy()).unwrap_or(false);
                    stack.push(VmValue::Bool(!a));
                }

                Opcode::Contains => {
                    let needle = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let haystack = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    stack.push(VmValue::Bool(haystack.contains(&needle)));
                }
                Opcode::StartsWith => {
                    let needle = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let haystack = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    stack.push(VmValue::Bool(haystack.starts_with(&needle)));
                }
                Opcode::EndsWith => {
                    let needle = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let haystack = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    stack.push(VmValue::Bool(haystack.ends_with(&needle)));
                }
                Opcode::Like => {
                    let pattern = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let haystack = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let translated = crate::filter::compiler::like_pattern_to_regex(&pattern);
                    stack.push(VmValue::Bool(regex_matches(&translated, &haystack)));
                }
                Opcode::Matches => {
                    let pattern = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let haystack = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    stack.push(VmValue::Bool(regex_matches(&pattern, &haystack)));
                }

                Opcode::In => {
                    let set = stack.pop().unwrap_or(VmValue::Null);
                    let needle = stack.pop().unwrap_or(VmValue::Null).as_str_lower();
                    let found = match set {
                        VmValue::StrList(items) => items.iter().any(|v| v.to_lowercase() == needle),
                        other => other.as_str_lower() == needle,
                    };
                    stack.push(VmValue::Bool(found));
                }
                Opcode::Between => {
                    let max = stack.pop().unwrap_or(VmValue::Null);
                    let min = stack.pop().unwrap_or(VmValue::Null);
                    let value = stack.pop().unwrap_or(VmValue::Null);
                    let result = match (value.as_number(), min.as_number(), max.as_number()) {
                        (Some(v), Some(lo), Some(hi)) => v >= lo && v <= hi,
                        _ => false,
                    };
                    stack.push(VmValue::Bool(result));
                }

                Opcode::IsNull => {
                    let value = stack.pop().unwrap_or(VmValue::Null);
                    stack.push(VmValue::Bool(matches!(value, VmValue::Null)));
                }
                Opcode::IsNotNull => {
                    let value = stack.pop().unwrap_or(VmValue::Null);
                    stack.push(VmValue::Bool(!matches!(value, VmValue::Null)));
                }

                Opcode::Jump => {
                    pc = instr.operand as usize;
                    continue;
                }
                Opcode::JumpIfFalse => {
                    let cond = stack.last().map(|v| v.truthy()).unwrap_or(false);
                    if !cond {
                        pc = instr.operand as usize;
                        continue;
                    }
                }
                Opcode::JumpIfTrue => {
                    let cond = stack.last().map(|v| v.truthy()).unwrap_or(false);
                    if cond {
                        pc = instr.operand as usize;
                        continue;
                    }
                }
            }
            pc += 1;
        }

        stack.last().map(|v| v.truthy()).unwrap_or(false)
    }
}

fn regex_matches(pattern: &str, haystack: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(haystack),
        Err(_) => false,
    }
}

fn compare(a: &VmValue, b: &VmValue, op: Opcode) -> bool {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return match op {
            Opcode::Eq => x == y,
            Opcode::Neq => x != y,
            Opcode::Lt => x < y,
            Opcode::Lte => x <= y,
            Opcode::Gt => x > y,
            Opcode::Gte => x >= y,
            _ => false,
        };
    }
    let (x, y) = (a.as_str_lower(), b.as_str_lower());
    match op {
        Opcode::Eq => x == y,
        Opcode::Neq => x != y,
        Opcode::Lt => x < y,
        Opcode::Lte => x <= y,
        Opcode::Gt => x > y,
        Opcode::Gte => x >= y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{DocumentFields, Field};
    use crate::core::types::DocumentKey;
    use crate::filter::ast::{CompareOp, Constant, Filter};
    use crate::filter::compiler::compile;

    fn doc_with_year(year: f64) -> Document {
        let mut fields = DocumentFields::new();
        let mut field = Field::keyword("");
        field.value = FieldValue::Number(year);
        fields.insert("year", field);
        Document::new(DocumentKey(1), 1, fields)
    }

    #[test]
    fn evaluates_numeric_comparison() {
        let filter = Filter::Value { field: "year".into(), op: CompareOp::Gte, value: Constant::Number(2000.0) };
        let compiled = compile(&filter).unwrap();
        let vm = FilterVm::new(&compiled);
        assert!(vm.run(&doc_with_year(2005.0)));
        assert!(!vm.run(&doc_with_year(1990.0)));
    }

    #[test]
    fn evaluates_and_composite() {
        let left = Filter::Value { field: "year".into(), op: CompareOp::Gte, value: Constant::Number(2000.0) };
        let right = Filter::Value { field: "year".into(), op: CompareOp::Lt, value: Constant::Number(2010.0) };
        let filter = left.and(right);
        let compiled = compile(&filter).unwrap();
        let vm = FilterVm::new(&compiled);
        assert!(vm.run(&doc_with_year(2005.0)));
        assert!(!vm.run(&doc_with_year(2015.0)));
    }
}
