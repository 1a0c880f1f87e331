use serde::Serialize;
use sha2::{Digest, Sha256};

use mtk_contracts::DISPATCH_MAP_SCHEMA_VERSION;

use crate::compile::{CompilerError, ErrorKind};
use crate::decl::FunctionSpec;
use crate::diagnostics::Stage;
use crate::types::ConcreteType;

/// Marker spliced into every specialization symbol. Author-declared function
/// names must not contain it, so generated symbols can never collide with a
/// hand-written one.
pub const SPEC_NAME_MARKER: &str = "__mtk_spec_v1__";

/// One equivalence class of arguments linked by match-constraints. `rep` is
/// the literal-bearing first member; the class's type set is its resolved set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClass {
    pub rep: usize,
    pub members: Vec<usize>,
    pub types: Vec<ConcreteType>,
}

/// One surviving element of the cross-product: exactly one concrete type per
/// argument, plus the derived specialization symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub types: Vec<ConcreteType>,
    pub specialized: String,
}

/// Combinations in generation order. The emitted dispatcher performs exactly
/// the scan [`DispatchTable::lookup`] performs here, so dispatch-order
/// properties are testable without compiling the generated C.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    pub function: String,
    pub entries: Vec<Combination>,
}

impl DispatchTable {
    /// First entry whose per-argument types all equal `actual` exactly.
    /// No widening or narrowing is attempted.
    pub fn lookup(&self, actual: &[ConcreteType]) -> Option<&Combination> {
        self.entries.iter().find(|c| c.types.as_slice() == actual)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DispatchLimitsV1 {
    pub max_combinations: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DispatchStatsV1 {
    pub type_classes: usize,
    pub combinations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchEntryV1 {
    pub types: Vec<String>,
    pub specialized: String,
}

/// Machine-readable record of one function's expansion, written next to the
/// generated C on request.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchMapV1 {
    pub schema_version: String,
    pub tool: String,
    pub tool_version: String,
    pub function: String,
    pub limits: DispatchLimitsV1,
    pub stats: DispatchStatsV1,
    pub entries: Vec<DispatchEntryV1>,
}

#[derive(Debug, Clone)]
pub struct Expansion {
    pub classes: Vec<TypeClass>,
    pub table: DispatchTable,
    pub map: DispatchMapV1,
}

fn sha256_hex8(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(8);
    for b in &digest[..4] {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Stable, deterministic symbol for one combination: the function name, the
/// marker, the canonical type tokens, and a short content hash.
pub fn mangle_specialized_name(function: &str, types: &[ConcreteType]) -> String {
    let tokens: Vec<&str> = types.iter().map(|t| t.token()).collect();
    let pretty = tokens.join("__");
    let hash8 = sha256_hex8(tokens.join(",").as_bytes());
    if types.is_empty() {
        return format!("{function}{SPEC_NAME_MARKER}void__h{hash8}");
    }
    format!("{function}{SPEC_NAME_MARKER}{pretty}__h{hash8}")
}

/// Partition arguments into type classes. A match-constraint always
/// references an earlier argument, so chasing one link lands on a class that
/// already exists; literal-bearing arguments open new classes in declaration
/// order.
fn build_classes(spec: &FunctionSpec) -> (Vec<TypeClass>, Vec<usize>) {
    let mut classes: Vec<TypeClass> = Vec::new();
    let mut class_of: Vec<usize> = Vec::with_capacity(spec.args.len());

    for arg in &spec.args {
        match arg.matches {
            Some(referent) => {
                let k = class_of[referent];
                classes[k].members.push(arg.index);
                class_of.push(k);
            }
            None => {
                class_of.push(classes.len());
                classes.push(TypeClass {
                    rep: arg.index,
                    members: vec![arg.index],
                    types: arg.types.clone(),
                });
            }
        }
    }

    (classes, class_of)
}

fn advance(idx: &mut [usize], classes: &[TypeClass]) -> bool {
    // Odometer: last class is the innermost loop.
    let mut k = classes.len();
    while k > 0 {
        k -= 1;
        idx[k] += 1;
        if idx[k] < classes[k].types.len() {
            return true;
        }
        idx[k] = 0;
    }
    false
}

/// Cross-product over type classes (never over raw arguments), enumerated in
/// a single deterministic order: first class outermost, types within a class
/// in resolved-set order. The combination count is checked against
/// `max_combinations` before anything is enumerated.
pub fn expand(spec: &FunctionSpec, max_combinations: usize) -> Result<Expansion, CompilerError> {
    if spec.name.contains(SPEC_NAME_MARKER) {
        return Err(CompilerError::new(
            ErrorKind::Syntax,
            Stage::Expand,
            "MTK-EXP-0201",
            format!("reserved function name: {:?}", spec.name),
        ));
    }

    let (classes, class_of) = build_classes(spec);

    let mut total: usize = 1;
    for class in &classes {
        let Some(t) = total.checked_mul(class.types.len()) else {
            return Err(CompilerError::new(
                ErrorKind::Configuration,
                Stage::Expand,
                "MTK-EXP-0202",
                format!(
                    "combination count overflows for function {:?} (max_combinations={max_combinations})",
                    spec.name
                ),
            ));
        };
        total = t;
    }
    if total > max_combinations {
        return Err(CompilerError::new(
            ErrorKind::Configuration,
            Stage::Expand,
            "MTK-EXP-0203",
            format!(
                "function {:?} expands to {total} combinations, exceeding max_combinations={max_combinations}",
                spec.name
            ),
        ));
    }

    let mut entries: Vec<Combination> = Vec::with_capacity(total);
    let mut idx = vec![0usize; classes.len()];
    loop {
        let types: Vec<ConcreteType> = spec
            .args
            .iter()
            .map(|arg| {
                let k = class_of[arg.index];
                classes[k].types[idx[k]]
            })
            .collect();
        let specialized = mangle_specialized_name(&spec.name, &types);
        entries.push(Combination { types, specialized });
        if !advance(&mut idx, &classes) {
            break;
        }
    }

    let map = DispatchMapV1 {
        schema_version: DISPATCH_MAP_SCHEMA_VERSION.to_string(),
        tool: "mtkc".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        function: spec.name.clone(),
        limits: DispatchLimitsV1 { max_combinations },
        stats: DispatchStatsV1 {
            type_classes: classes.len(),
            combinations: entries.len(),
        },
        entries: entries
            .iter()
            .map(|c| DispatchEntryV1 {
                types: c.types.iter().map(|t| t.token().to_string()).collect(),
                specialized: c.specialized.clone(),
            })
            .collect(),
    };

    Ok(Expansion {
        classes,
        table: DispatchTable {
            function: spec.name.clone(),
            entries,
        },
        map,
    })
}
