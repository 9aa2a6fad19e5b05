//! A line tokenizer for kernel listings.
//!
//! Not a full PTX front end, it understands one kernel per input,
//! one statement per `;`, and just enough directives to build a [`Statement`] stream.

#![forbid(unsafe_code)]
#![allow(clippy::match_bool)]
#![warn(clippy::must_use_candidate)]

use ptxk_core::{Instruction, Opcode, Operand, Slot, Statement};

mod directive;
mod operand;


#[derive(Debug, Default)]
struct ParseContext {
    statements: Vec<Statement>,
    errors: Vec<String>,
    in_block_comment: bool,
}

impl ParseContext {
    fn consume<T>(&mut self, res: Result<T, String>) -> Option<T> {
        match res {
            Ok(it) => Some(it),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }
}

#[derive(Debug)]
pub struct ParseOutput {
    pub statements: Vec<Statement>,
    pub errors: Vec<String>,
}

impl From<ParseContext> for ParseOutput {
    fn from(context: ParseContext) -> Self {
        Self { statements: context.statements, errors: context.errors }
    }
}

#[must_use]
pub fn tokenize(input: &str) -> ParseOutput {
    let mut output = ParseContext::default();

    for line in input.lines() {
        let line = strip_comments(&mut output.in_block_comment, line);

        for statement in line.split(';') {
            tokenize_statement(&mut output, statement.trim());
        }
    }

    output.into()
}

fn strip_comments(in_block_comment: &mut bool, mut line: &str) -> String {
    let mut out = String::with_capacity(line.len());

    loop {
        if *in_block_comment {
            match line.split_once("*/") {
                Some((_, rest)) => {
                    *in_block_comment = false;
                    line = rest;
                }
                None => return out,
            }
        }

        let block = line.find("/*");
        let eol = line.find("//");

        match (block, eol) {
            (Some(block), Some(eol)) if eol < block => {
                out.push_str(&line[..eol]);
                return out;
            }
            (None, Some(eol)) => {
                out.push_str(&line[..eol]);
                return out;
            }
            (Some(block), _) => {
                out.push_str(&line[..block]);
                // keep tokens on either side of the comment apart.
                out.push(' ');
                *in_block_comment = true;
                line = &line[block + 2..];
            }
            (None, None) => {
                out.push_str(line);
                return out;
            }
        }
    }
}

fn is_label(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

fn tokenize_statement(context: &mut ParseContext, statement: &str) {
    let mut statement = statement.trim();

    while let Some((label, rest)) = statement.split_once(':') {
        let label = label.trim();
        if !is_label(label) {
            break;
        }

        context.push(Statement::Label(label.to_owned()));
        statement = rest.trim();
    }

    // kernel body braces, and the `)` closing a parameter list split over several lines.
    if matches!(statement, "" | "{" | "}" | ")") {
        return;
    }

    if statement.starts_with('.') {
        directive::directive(context, statement);
        return;
    }

    if let Some(instruction) = tokenize_instruction(context, statement) {
        context.push(Statement::Instruction(instruction));
    }
}

fn guard(token: &str) -> Result<Operand, String> {
    let (negated, name) = match token.strip_prefix('!') {
        Some(name) => (true, name),
        None => (false, token),
    };

    let pg = match name {
        "pt" => Operand::always_true(),
        _ if name.starts_with('%') => Operand::predicate(name),
        _ => return Err(format!("Invalid guard predicate `@{token}`")),
    };

    Ok(match negated {
        true => pg.negated(),
        false => pg,
    })
}

fn tokenize_instruction(context: &mut ParseContext, line: &str) -> Option<Instruction> {
    let (pg, line) = match line.strip_prefix('@') {
        Some(rest) => {
            let (token, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            (context.consume(guard(token))?, rest.trim_start())
        }
        None => (Operand::always_true(), line),
    };

    let (full_op, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let mut parts = full_op.split('.');
    let op = parts.next().unwrap_or_default();
    let Ok(opcode) = op.parse::<Opcode>() else {
        context.errors.push(format!("Unknown instruction `{full_op}`"));
        return None;
    };

    let mut suffixes: Vec<&str> = parts.collect();
    let ty = suffixes.last().and_then(|it| it.parse().ok());
    if ty.is_some() {
        suffixes.pop();
    }

    let mut instruction = Instruction::new(opcode).with_guard(pg);
    instruction.ty = ty;
    instruction.modifiers = suffixes.iter().map(|it| format!(".{it}")).collect();

    let args = operand::split_args(args);
    if args.len() > 4 {
        context.errors.push(format!(
            "Expected at most 4 argument(s) for `{full_op}`, found `{}`",
            args.len()
        ));
        return None;
    }

    let mut failed = false;
    for (slot, arg) in [Slot::D, Slot::A, Slot::B, Slot::C].into_iter().zip(args) {
        let res = operand::slot_operand(&mut instruction, slot, arg);
        failed |= context.consume(res).is_none();
    }

    match failed {
        true => None,
        false => Some(instruction),
    }
}
