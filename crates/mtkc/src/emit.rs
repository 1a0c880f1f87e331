use crate::compile::GenerateOptions;
use crate::decl::FunctionSpec;
use crate::expand::{Combination, Expansion};
use crate::types::ConcreteType;

/// Emit the complete C translation unit for one function: N specialization
/// bodies, the runtime dispatcher, and the registration fragment, in that
/// order. Emission is pure text assembly; everything fallible happened in
/// the earlier stages.
pub fn emit_unit(spec: &FunctionSpec, expansion: &Expansion, options: &GenerateOptions) -> String {
    let mut e = Emitter {
        spec,
        expansion,
        options,
        out: String::new(),
    };
    e.emit_banner();
    e.emit_specializations();
    e.emit_dispatcher();
    e.emit_registration();
    e.out
}

struct Emitter<'a> {
    spec: &'a FunctionSpec,
    expansion: &'a Expansion,
    options: &'a GenerateOptions,
    out: String,
}

impl Emitter<'_> {
    fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn emit_banner(&mut self) {
        let version = env!("CARGO_PKG_VERSION");
        let options = self.options;
        match &options.source_name {
            Some(src) => self.line(&format!(
                "/* Generated by mtkc {version} from {src} -- do not edit. */"
            )),
            None => self.line(&format!("/* Generated by mtkc {version} -- do not edit. */")),
        }
        self.line("#include \"mtk_host.h\"");
        self.blank();
    }

    fn emit_specializations(&mut self) {
        let spec = self.spec;
        let expansion = self.expansion;
        self.line(&format!(
            "/* -- specializations for {} ({}) -- */",
            spec.name,
            expansion.table.entries.len()
        ));
        for combo in &expansion.table.entries {
            self.blank();
            self.emit_specialization(spec, combo);
        }
        self.blank();
    }

    fn emit_specialization(&mut self, spec: &FunctionSpec, combo: &Combination) {
        let mut params = vec!["mtk_ctx *ctx".to_string()];
        for (arg, ty) in spec.args.iter().zip(&combo.types) {
            let view = ty.c_view_ty();
            if view.ends_with('*') {
                params.push(format!("{view}{}", arg.name));
            } else {
                params.push(format!("{view} {}", arg.name));
            }
        }
        self.line(&format!(
            "static mtk_value *{}({}) {{",
            combo.specialized,
            params.join(", ")
        ));
        self.line("    (void)ctx;");
        let body = substitute_aliases(&spec.body, spec, &combo.types);
        self.push_str(&body);
        if !body.ends_with('\n') {
            self.blank();
        }
        self.line("}");
    }

    fn accepted_table_name(&self) -> String {
        format!("mtk_{}_accepted", self.spec.name)
    }

    fn emit_dispatcher(&mut self) {
        let spec = self.spec;
        let expansion = self.expansion;
        let fn_name = &spec.name;
        let argc = spec.args.len();
        let entries = &expansion.table.entries;

        let table = self.accepted_table_name();
        let mut accepted = String::new();
        accepted.push_str(&format!("static const char *const {table}[] = {{\n"));
        for combo in entries {
            let tokens: Vec<&str> = combo.types.iter().map(|t| t.token()).collect();
            accepted.push_str(&format!("    \"({})\",\n", tokens.join(", ")));
        }
        accepted.push_str("};\n");
        self.push_str(&accepted);
        self.blank();

        self.line(&format!(
            "mtk_value *mtk_dispatch_{fn_name}(mtk_ctx *ctx, int argc, const mtk_value *const *argv) {{"
        ));
        self.line(&format!("    if (argc != {argc}) {{"));
        self.line(&format!(
            "        return mtk_fail_arity(ctx, \"{fn_name}\", {argc}, argc);"
        ));
        self.line("    }");

        if argc == 0 {
            // A function with no typed arguments has exactly one
            // specialization; the arity check above is the only gate.
            self.line(&format!("    return {}(ctx);", entries[0].specialized));
            self.line("}");
            self.blank();
            return;
        }

        for i in 0..argc {
            self.line(&format!(
                "    const mtk_type_tag t{i} = mtk_value_tag(argv[{i}]);"
            ));
        }

        // Linear scan in generation order; first exact match wins.
        for combo in entries {
            let cond: Vec<String> = combo
                .types
                .iter()
                .enumerate()
                .map(|(i, ty)| format!("t{i} == {}", ty.c_tag()))
                .collect();
            self.line(&format!("    if ({}) {{", cond.join(" && ")));
            let mut call_args = vec!["ctx".to_string()];
            for (i, ty) in combo.types.iter().enumerate() {
                match ty.c_adapter() {
                    Some(adapter) => call_args.push(format!("{adapter}(argv[{i}])")),
                    None => call_args.push(format!("argv[{i}]")),
                }
            }
            self.line(&format!(
                "        return {}({});",
                combo.specialized,
                call_args.join(", ")
            ));
            self.line("    }");
        }

        self.line(&format!(
            "    return mtk_fail_no_match(ctx, \"{fn_name}\", {table}, {}, argc, argv);",
            entries.len()
        ));
        self.line("}");
        self.blank();
    }

    fn emit_registration(&mut self) {
        let spec = self.spec;
        let fn_name = &spec.name;
        self.line("/* -- registration -- */");
        self.blank();
        self.line(&format!(
            "const mtk_binding mtk_binding_{fn_name} = {{\"{fn_name}\", {}, mtk_dispatch_{fn_name}}};",
            spec.args.len()
        ));
    }
}

/// Replace `@T(<arg>)` and `@S(<arg>)` with the view/element C type the
/// argument is bound to in this combination. References to unknown names are
/// author territory and pass through verbatim.
fn substitute_aliases(body: &str, spec: &FunctionSpec, types: &[ConcreteType]) -> String {
    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'@' && i + 2 < bytes.len() && bytes[i + 2] == b'(' {
            let kind = bytes[i + 1];
            if kind == b'T' || kind == b'S' {
                if let Some(close) = body[i + 3..].find(')') {
                    let inner = body[i + 3..i + 3 + close].trim();
                    if let Some(pos) = spec.args.iter().position(|a| a.name == inner) {
                        let ty = types[pos];
                        out.push_str(if kind == b'T' {
                            ty.c_view_ty().trim_end()
                        } else {
                            ty.c_elem_ty().trim_end()
                        });
                        i += 3 + close + 1;
                        continue;
                    }
                }
            }
        }
        let ch = body[i..].chars().next().unwrap_or('\u{fffd}');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}
