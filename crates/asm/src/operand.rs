use ptxk_core::{DataType, Instruction, Opcode, Operand, Slot};

const SPECIAL_REGISTERS: [&str; 8] =
    ["%tid", "%ntid", "%ctaid", "%nctaid", "%laneid", "%warpid", "%clock", "%smid"];

/// Splits on top level commas, `{a, b}` and `[a+4]` stay in one piece.
pub(crate) fn split_args(args: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0_u32;
    let mut start = 0;

    for (idx, c) in args.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(args[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }

    let last = args[start..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last);
    }

    out
}

pub(crate) fn parse_integer(src: &str) -> Result<i64, String> {
    let (digits, negative) = match src.strip_prefix('-') {
        Some(digits) => (digits, true),
        None => (src, false),
    };

    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| format!("invalid integer literal: `{src}`"))?;

    Ok(if negative { -value } else { value })
}

fn is_predicate_name(name: &str) -> bool {
    name.strip_prefix("%p").is_some_and(|it| !it.is_empty() && it.bytes().all(|b| b.is_ascii_digit()))
}

fn register(name: &str, ty: DataType) -> Operand {
    let base = name.split('.').next().unwrap_or(name);
    if SPECIAL_REGISTERS.contains(&base) {
        return Operand::special(name, DataType::U32);
    }

    match is_predicate_name(name) {
        true => Operand::predicate(name),
        false => Operand::register(name, ty),
    }
}

fn memory(inner: &str, ty: DataType) -> Result<Operand, String> {
    let inner = inner.trim();

    // skip the first char so a leading sign is never taken as the offset separator.
    let split = inner.char_indices().skip(1).find(|(_, c)| matches!(c, '+' | '-')).map(|(i, _)| i);

    let (base, offset) = match split {
        Some(idx) => {
            let (base, offset) = inner.split_at(idx);
            let offset = offset.strip_prefix('+').unwrap_or(offset).trim();
            let offset = parse_integer(offset)?;
            let offset =
                i32::try_from(offset).map_err(|_| format!("offset out of range: `{offset}`"))?;
            (base.trim(), offset)
        }
        None => (inner, 0),
    };

    if base.is_empty() {
        return Err(format!("missing base in address `[{inner}]`"));
    }

    Ok(match base.starts_with('%') {
        true => Operand::indirect(base, offset, ty),
        false => Operand::address(base, offset, ty),
    })
}

pub(crate) fn parse_operand(token: &str, ty: DataType) -> Result<Operand, String> {
    if let Some(inner) = token.strip_prefix('{') {
        let inner = inner.strip_suffix('}').ok_or_else(|| format!("unclosed vector `{token}`"))?;

        let elements = inner
            .split(',')
            .map(str::trim)
            .map(|it| match it.starts_with('%') {
                true => Ok(register(it, ty)),
                false => Err(format!("vector elements must be registers, found `{it}`")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(Operand::vector(elements));
    }

    if let Some(inner) = token.strip_prefix('[') {
        let inner = inner.strip_suffix(']').ok_or_else(|| format!("unclosed address `{token}`"))?;
        return memory(inner, ty);
    }

    if token.starts_with('%') {
        return Ok(register(token, ty));
    }

    if token.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return parse_integer(token).map(|imm| Operand::immediate(imm, ty));
    }

    if crate::is_label(token) {
        return Ok(Operand::label(token));
    }

    Err(format!("Unexpected operand `{token}`"))
}

pub(crate) fn slot_operand(
    instruction: &mut Instruction,
    slot: Slot,
    token: &str,
) -> Result<(), String> {
    if token.is_empty() {
        return Err(format!("missing operand for `{}`", instruction.opcode));
    }

    let ty = instruction.ty.unwrap_or_default();

    match (instruction.opcode, slot) {
        (Opcode::Setp, Slot::D) => {
            let (d, pq) = match token.split_once('|') {
                Some((d, pq)) => (d.trim(), Some(pq.trim())),
                None => (token, None),
            };

            instruction.d = Operand::predicate(d);
            if let Some(pq) = pq {
                instruction.pq = Operand::predicate(pq);
            }
        }
        (Opcode::Selp, Slot::C) => instruction.c = parse_operand(token, DataType::Pred)?,
        (Opcode::Bra | Opcode::Call, Slot::D) => instruction.d = Operand::label(token),
        _ => instruction.set_operand(slot, parse_operand(token, ty)?),
    }

    Ok(())
}
