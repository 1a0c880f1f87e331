use crate::compile::{CompilerError, ErrorKind};
use crate::decl::{ArgDecl, FunctionDecl, RawArgTypes};
use crate::diagnostics::Stage;
use crate::language;

/// Lines whose first non-whitespace characters are this prefix are directives;
/// everything else is host code and passes through untouched.
pub const DIRECTIVE_PREFIX: &str = "//@";

fn syntax(code: &'static str, line: u32, message: String) -> CompilerError {
    CompilerError::new(ErrorKind::Syntax, Stage::Scan, code, message).with_line(line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Prelude,
    Args,
    Body,
    Done,
}

/// Extract the single function declaration from an annotated source file.
///
/// The scanner is a state machine over the fixed directive grammar and is
/// deliberately blind to the host language: arbitrary code before the
/// declaration, between directives, and after `//@ end` is skipped, and the
/// body between `//@ begin` and `//@ end` is captured verbatim.
pub fn scan_source(source: &str) -> Result<FunctionDecl, CompilerError> {
    let mut state = State::Prelude;
    let mut name: Option<(String, u32)> = None;
    let mut args: Vec<ArgDecl> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut body_line: u32 = 0;
    let mut begin_line: u32 = 0;

    for (i, raw) in source.lines().enumerate() {
        let line = (i + 1) as u32;
        let trimmed = raw.trim_start();
        let Some(directive) = trimmed.strip_prefix(DIRECTIVE_PREFIX) else {
            if state == State::Body {
                body_lines.push(raw);
            }
            continue;
        };
        let directive = directive.trim();
        let (keyword, rest) = match directive.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (directive, ""),
        };

        if keyword.is_empty() {
            return Err(syntax("MTK-SCAN-0012", line, "empty directive".to_string()));
        }

        if state == State::Body && keyword != "end" {
            return Err(syntax(
                "MTK-SCAN-0009",
                line,
                format!("directive //@ {keyword} inside function body"),
            ));
        }
        if state == State::Done {
            return Err(syntax(
                "MTK-SCAN-0010",
                line,
                format!("directive //@ {keyword} after //@ end (one function per file)"),
            ));
        }

        match keyword {
            "function" => {
                if state != State::Prelude {
                    return Err(syntax(
                        "MTK-SCAN-0017",
                        line,
                        "duplicate //@ function directive".to_string(),
                    ));
                }
                if rest.is_empty() || rest.split_whitespace().count() != 1 {
                    return Err(syntax(
                        "MTK-SCAN-0002",
                        line,
                        format!("expected `//@ function <name>`, got {directive:?}"),
                    ));
                }
                name = Some((rest.to_string(), line));
                state = State::Args;
            }
            "arg" => {
                if state == State::Prelude {
                    return Err(syntax(
                        "MTK-SCAN-0003",
                        line,
                        "//@ arg before //@ function".to_string(),
                    ));
                }
                let (arg_name, types) = parse_arg_directive(rest, line)?;
                if args.iter().any(|a| a.name == arg_name) {
                    return Err(syntax(
                        "MTK-SCAN-0005",
                        line,
                        format!("duplicate argument name: {arg_name:?}"),
                    ));
                }
                if args.len() >= language::limits::MAX_ARGS {
                    return Err(CompilerError::new(
                        ErrorKind::Configuration,
                        Stage::Scan,
                        "MTK-SCAN-0013",
                        format!(
                            "too many arguments: max_args={}",
                            language::limits::MAX_ARGS
                        ),
                    )
                    .with_line(line));
                }
                let index = args.len();
                args.push(ArgDecl {
                    name: arg_name,
                    types,
                    index,
                    line,
                });
            }
            "begin" => {
                if state == State::Prelude {
                    return Err(syntax(
                        "MTK-SCAN-0006",
                        line,
                        "//@ begin before //@ function".to_string(),
                    ));
                }
                if !rest.is_empty() {
                    return Err(syntax(
                        "MTK-SCAN-0016",
                        line,
                        format!("unexpected tokens after //@ begin: {rest:?}"),
                    ));
                }
                state = State::Body;
                begin_line = line;
                body_line = line + 1;
            }
            "end" => {
                if state != State::Body {
                    return Err(syntax(
                        "MTK-SCAN-0018",
                        line,
                        "//@ end without //@ begin".to_string(),
                    ));
                }
                if !rest.is_empty() {
                    return Err(syntax(
                        "MTK-SCAN-0016",
                        line,
                        format!("unexpected tokens after //@ end: {rest:?}"),
                    ));
                }
                state = State::Done;
            }
            other => {
                return Err(syntax(
                    "MTK-SCAN-0011",
                    line,
                    format!("unknown directive: //@ {other}"),
                ));
            }
        }
    }

    let Some((name, name_line)) = name else {
        return Err(CompilerError::new(
            ErrorKind::Syntax,
            Stage::Scan,
            "MTK-SCAN-0001",
            "no //@ function declaration found".to_string(),
        ));
    };
    match state {
        State::Args => Err(syntax(
            "MTK-SCAN-0007",
            name_line,
            format!("function {name:?} has no //@ begin body marker"),
        )),
        State::Body => Err(syntax(
            "MTK-SCAN-0008",
            begin_line,
            format!("function {name:?}: missing //@ end"),
        )),
        State::Done => Ok(FunctionDecl {
            name,
            line: name_line,
            args,
            body: body_lines.join("\n"),
            body_line,
        }),
        State::Prelude => unreachable!("name is set only after leaving Prelude"),
    }
}

fn parse_arg_directive(rest: &str, line: u32) -> Result<(String, RawArgTypes), CompilerError> {
    let Some((name_part, types_part)) = rest.split_once(':') else {
        return Err(syntax(
            "MTK-SCAN-0004",
            line,
            format!("expected `//@ arg <name> : <types>`, got {rest:?}"),
        ));
    };
    let name = name_part.trim();
    if name.is_empty() || name.split_whitespace().count() != 1 {
        return Err(syntax(
            "MTK-SCAN-0004",
            line,
            format!("expected a single argument name before ':', got {name_part:?}"),
        ));
    }
    let types_part = types_part.trim();
    if types_part.is_empty() {
        return Err(syntax(
            "MTK-SCAN-0014",
            line,
            format!("empty type list for argument {name:?}"),
        ));
    }

    let tokens: Vec<&str> = types_part
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| t.starts_with("match(")) || types_part.starts_with("match") {
        if tokens.len() != 1 {
            return Err(syntax(
                "MTK-SCAN-0015",
                line,
                format!("match(..) must be the only type entry for argument {name:?}"),
            ));
        }
        let target = types_part
            .strip_prefix("match(")
            .and_then(|t| t.strip_suffix(')'))
            .map(str::trim)
            .filter(|t| !t.is_empty() && t.split_whitespace().count() == 1);
        let Some(target) = target else {
            return Err(syntax(
                "MTK-SCAN-0015",
                line,
                format!("expected `match(<arg>)` for argument {name:?}, got {types_part:?}"),
            ));
        };
        return Ok((name.to_string(), RawArgTypes::Match(target.to_string())));
    }

    Ok((
        name.to_string(),
        RawArgTypes::Literals(tokens.into_iter().map(|t| t.to_string()).collect()),
    ))
}
