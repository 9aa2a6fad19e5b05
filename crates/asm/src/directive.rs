use ptxk_core::{DataType, Parameter, StateSpace, Statement, Variable};

use crate::ParseContext;
use crate::operand::parse_integer;

fn data_type(token: Option<&str>) -> Result<DataType, String> {
    let token = token.ok_or("missing type")?;

    token
        .strip_prefix('.')
        .and_then(|it| it.parse().ok())
        .ok_or_else(|| format!("Invalid type `{token}`"))
}

fn name(token: Option<&str>) -> Result<&str, String> {
    match token.map(|it| it.trim_end_matches(',')) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err("missing name".to_owned()),
    }
}

fn param(args: &str) -> Result<Parameter, String> {
    let mut tokens = args.split_whitespace();

    let ty = data_type(tokens.next())?;
    let name = name(tokens.next())?;

    if let Some(extra) = tokens.next() {
        return Err(format!("Unexpected token after parameter `{name}`: `{extra}`"));
    }

    Ok(Parameter { name: name.to_owned(), ty })
}

fn variable(space: StateSpace, args: &str) -> Result<Variable, String> {
    let mut tokens = args.split_whitespace().peekable();

    let align = match tokens.next_if_eq(&".align") {
        Some(_) => {
            let align = tokens.next().ok_or("missing alignment")?;
            let align = parse_integer(align)?;
            Some(u32::try_from(align).map_err(|_| format!("invalid alignment `{align}`"))?)
        }
        None => None,
    };

    let ty = data_type(tokens.next())?;
    let name = name(tokens.next())?;

    let (name, elements) = match name.split_once('[') {
        Some((name, count)) => {
            let count = count.strip_suffix(']').ok_or_else(|| format!("unclosed `[` in `{name}`"))?;
            let count = parse_integer(count)?;
            let count = u32::try_from(count).map_err(|_| format!("invalid array size `{count}`"))?;
            (name, Some(count))
        }
        None => (name, None),
    };

    Ok(Variable { space, name: name.to_owned(), ty, align, elements })
}

/// `.entry name` or `.entry name(.param .u32 a, .param .u32 b)`.
///
/// The name may be left out when a parameter list follows, as in the `.entry ()` printed
/// for a kernel that never had one.
fn entry(context: &mut ParseContext, args: &str) {
    let (name, params) = match args.split_once('(') {
        Some((name, params)) => (name.trim(), Some(params.trim_end().trim_end_matches(')'))),
        None => (args.trim(), None),
    };

    match (name.is_empty(), params.is_some()) {
        (false, _) => context.push(Statement::Entry(name.to_owned())),
        (true, true) => {}
        (true, false) => {
            context.errors.push("missing kernel name after `.entry`".to_owned());
            return;
        }
    }

    for param_decl in params.into_iter().flat_map(|it| it.split(',')) {
        let param_decl = param_decl.trim();
        if param_decl.is_empty() {
            continue;
        }

        let res = match param_decl.strip_prefix(".param") {
            Some(rest) => param(rest),
            None => Err(format!("Expected `.param`, found `{param_decl}`")),
        };

        if let Some(param) = context.consume(res) {
            context.push(Statement::Param(param));
        }
    }
}

pub(crate) fn directive(context: &mut ParseContext, line: &str) {
    let (keyword, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match keyword {
        ".entry" => entry(context, args),
        ".param" => {
            if let Some(param) = context.consume(param(args)) {
                context.push(Statement::Param(param));
            }
        }
        ".local" => {
            if let Some(var) = context.consume(variable(StateSpace::Local, args)) {
                context.push(Statement::Local(var));
            }
        }
        ".shared" => {
            if let Some(var) = context.consume(variable(StateSpace::Shared, args)) {
                context.push(Statement::Shared(var));
            }
        }
        // register declarations are recomputed from the body, module level directives don't
        // belong to a kernel.
        ".reg" | ".version" | ".target" | ".address_size" => {}
        _ => context.errors.push(format!("Unknown directive `{keyword}`")),
    }
}
