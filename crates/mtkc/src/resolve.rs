use crate::compile::{CompilerError, ErrorKind};
use crate::decl::{ArgSpec, FunctionDecl, FunctionSpec, RawArgTypes};
use crate::diagnostics::Stage;
use crate::types::ConcreteType;
use crate::validate;

fn err(kind: ErrorKind, code: &'static str, line: u32, message: String) -> CompilerError {
    CompilerError::new(kind, Stage::Resolve, code, message).with_line(line)
}

/// Turn raw token lists into concrete type sets, in declaration order.
///
/// A `match(x)` list copies `x`'s already-resolved set, which is why the
/// loop walks arguments in order: by the time a match-constraint is seen its
/// referent either exists (and is resolved) or the reference is an error.
pub fn resolve_decl(decl: FunctionDecl) -> Result<FunctionSpec, CompilerError> {
    validate::validate_c_identifier(&decl.name).map_err(|e| {
        err(
            ErrorKind::Syntax,
            "MTK-RES-0101",
            decl.line,
            format!("invalid function name: {e}"),
        )
    })?;

    let declared_names: Vec<String> = decl.args.iter().map(|a| a.name.clone()).collect();
    let mut args: Vec<ArgSpec> = Vec::with_capacity(decl.args.len());

    for arg in decl.args {
        validate::validate_arg_name(&arg.name).map_err(|e| {
            err(
                ErrorKind::Syntax,
                "MTK-RES-0102",
                arg.line,
                format!("invalid argument name: {e}"),
            )
        })?;

        let (types, matches) = match arg.types {
            RawArgTypes::Literals(tokens) => {
                let mut set: Vec<ConcreteType> = Vec::with_capacity(tokens.len());
                for tok in &tokens {
                    let Some(ty) = ConcreteType::parse_token(tok) else {
                        return Err(err(
                            ErrorKind::Syntax,
                            "MTK-RES-0103",
                            arg.line,
                            format!("unknown type token {tok:?} for argument {:?}", arg.name),
                        ));
                    };
                    // Dedup preserving first-occurrence order; `sparse_f32`
                    // and `csc_f32` collapse to one entry here.
                    if !set.contains(&ty) {
                        set.push(ty);
                    }
                }
                (set, None)
            }
            RawArgTypes::Match(target) => {
                if target == arg.name {
                    return Err(err(
                        ErrorKind::UnresolvedReference,
                        "MTK-RES-0106",
                        arg.line,
                        format!("argument {:?} cannot match itself", arg.name),
                    ));
                }
                let Some(referent) = args.iter().find(|a| a.name == target) else {
                    let code = if declared_names.iter().any(|n| *n == target) {
                        "MTK-RES-0105"
                    } else {
                        "MTK-RES-0104"
                    };
                    let what = if code == "MTK-RES-0105" {
                        "forward reference to"
                    } else {
                        "unknown"
                    };
                    return Err(err(
                        ErrorKind::UnresolvedReference,
                        code,
                        arg.line,
                        format!(
                            "argument {:?}: match({target}) {what} argument {target:?}",
                            arg.name
                        ),
                    ));
                };
                (referent.types.clone(), Some(referent.index))
            }
        };

        let index = arg.index;
        args.push(ArgSpec {
            name: arg.name,
            types,
            matches,
            index,
            line: arg.line,
        });
    }

    Ok(FunctionSpec {
        name: decl.name,
        args,
        body: decl.body,
        body_line: decl.body_line,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_decl;
    use crate::decl::{ArgDecl, FunctionDecl, RawArgTypes};
    use crate::types::{ConcreteType, Elem, SparseLayout};

    fn decl(args: Vec<(&str, RawArgTypes)>) -> FunctionDecl {
        FunctionDecl {
            name: "f".to_string(),
            line: 1,
            args: args
                .into_iter()
                .enumerate()
                .map(|(i, (name, types))| ArgDecl {
                    name: name.to_string(),
                    types,
                    index: i,
                    line: (i + 2) as u32,
                })
                .collect(),
            body: String::new(),
            body_line: 10,
        }
    }

    fn literals(tokens: &[&str]) -> RawArgTypes {
        RawArgTypes::Literals(tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let spec = resolve_decl(decl(vec![(
            "x",
            literals(&["f64", "f32", "f64", "sparse_f32", "csc_f32"]),
        )]))
        .expect("resolve");
        assert_eq!(
            spec.args[0].types,
            vec![
                ConcreteType::Dense(Elem::F64),
                ConcreteType::Dense(Elem::F32),
                ConcreteType::Sparse(SparseLayout::Csc, Elem::F32),
            ]
        );
    }

    #[test]
    fn match_copies_referent_set_exactly() {
        let spec = resolve_decl(decl(vec![
            ("a", literals(&["f32", "f64"])),
            ("b", RawArgTypes::Match("a".to_string())),
        ]))
        .expect("resolve");
        assert_eq!(spec.args[1].types, spec.args[0].types);
        assert_eq!(spec.args[1].matches, Some(0));
    }

    #[test]
    fn match_chains_resolve_transitively() {
        let spec = resolve_decl(decl(vec![
            ("a", literals(&["i32", "i64"])),
            ("b", RawArgTypes::Match("a".to_string())),
            ("c", RawArgTypes::Match("b".to_string())),
        ]))
        .expect("resolve");
        assert_eq!(spec.args[2].types, spec.args[0].types);
        assert_eq!(spec.args[2].matches, Some(1));
    }

    #[test]
    fn unresolved_references_fail() {
        let err = resolve_decl(decl(vec![("a", RawArgTypes::Match("zzz".to_string()))]))
            .expect_err("unknown target");
        assert_eq!(err.code, "MTK-RES-0104");

        let err = resolve_decl(decl(vec![
            ("a", RawArgTypes::Match("b".to_string())),
            ("b", literals(&["f32"])),
        ]))
        .expect_err("forward reference");
        assert_eq!(err.code, "MTK-RES-0105");
        assert_eq!(err.line, Some(2));

        let err = resolve_decl(decl(vec![("a", RawArgTypes::Match("a".to_string()))]))
            .expect_err("self reference");
        assert_eq!(err.code, "MTK-RES-0106");
    }

    #[test]
    fn unknown_token_and_bad_names_fail() {
        let err =
            resolve_decl(decl(vec![("a", literals(&["f16"]))])).expect_err("unknown token");
        assert_eq!(err.code, "MTK-RES-0103");

        let err = resolve_decl(decl(vec![("2x", literals(&["f32"]))])).expect_err("bad name");
        assert_eq!(err.code, "MTK-RES-0102");

        let err = resolve_decl(decl(vec![("argv", literals(&["f32"]))]))
            .expect_err("reserved name");
        assert_eq!(err.code, "MTK-RES-0102");

        let mut d = decl(vec![("a", literals(&["f32"]))]);
        d.name = "bad-name".to_string();
        let err = resolve_decl(d).expect_err("bad function name");
        assert_eq!(err.code, "MTK-RES-0101");
    }
}
