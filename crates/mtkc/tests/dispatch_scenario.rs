use mtkc::compile::{check_source, generate_bindings, ErrorKind, GenerateOptions};
use mtkc::expand::mangle_specialized_name;
use mtkc::types::{ConcreteType, Elem, OpaqueKind, SparseLayout};


const F32: ConcreteType = ConcreteType::Dense(Elem::F32);
const F64: ConcreteType = ConcreteType::Dense(Elem::F64);
const I32: ConcreteType = ConcreteType::Dense(Elem::I32);
const STR: ConcreteType = ConcreteType::Opaque(OpaqueKind::Str);
const INT: ConcreteType = ConcreteType::Opaque(OpaqueKind::Int);
const CSC_F32: ConcreteType = ConcreteType::Sparse(SparseLayout::Csc, Elem::F32);

fn foo_source() -> String {
    mtk_source::source(
        "foo",
        &[
            ("a", "f32, f64"),
            ("b", "match(a)"),
            ("c", "i32, i64"),
            ("d", "str"),
            ("e", "int"),
            ("f", "sparse_f32, sparse_f64"),
        ],
        "  return mtk_wrap_int(ctx, 0);",
    )
}

#[test]
fn matched_argument_collapses_into_referent_class() {
    let (spec, expansion) =
        check_source(&foo_source(), &GenerateOptions::default()).expect("check");
    assert_eq!(spec.args.len(), 6);
    // a/b share one class; c, d, e, f are their own.
    assert_eq!(expansion.classes.len(), 5);
    assert_eq!(expansion.classes[0].members, vec![0, 1]);
    // 2 * 2 * 1 * 1 * 2, with b contributing no factor.
    assert_eq!(expansion.table.entries.len(), 8);

    for combo in &expansion.table.entries {
        assert_eq!(combo.types[0], combo.types[1], "match-constraint violated");
        assert_eq!(combo.types[3], STR);
        assert_eq!(combo.types[4], INT);
    }
}

#[test]
fn actual_types_select_the_matching_specialization() {
    let (_, expansion) = check_source(&foo_source(), &GenerateOptions::default()).expect("check");

    let actual = [F64, F64, I32, STR, INT, CSC_F32];
    let hit = expansion.table.lookup(&actual).expect("must dispatch");
    assert_eq!(hit.specialized, mangle_specialized_name("foo", &actual));

    // Idempotent: a second lookup with the same actual types picks the same
    // specialization.
    let again = expansion.table.lookup(&actual).expect("must dispatch");
    assert_eq!(hit.specialized, again.specialized);

    // Every entry round-trips: declared type combination -> generated
    // specialization -> runtime match.
    for combo in &expansion.table.entries {
        let found = expansion.table.lookup(&combo.types).expect("round trip");
        assert_eq!(found.specialized, combo.specialized);
    }

    // A mixed a/b pair is absent from the table.
    assert!(expansion.table.lookup(&[F32, F64, I32, STR, INT, CSC_F32]).is_none());
}

#[test]
fn dispatch_order_follows_declaration_order() {
    let (_, expansion) = check_source(&foo_source(), &GenerateOptions::default()).expect("check");
    let first = &expansion.table.entries[0];
    // First declared type of every class: (f32, f32, i32, str, int, csc_f32).
    assert_eq!(first.types, vec![F32, F32, I32, STR, INT, CSC_F32]);
    let last = &expansion.table.entries[7];
    assert_eq!(last.types[0], F64);
    assert_eq!(last.types[2], ConcreteType::Dense(Elem::I64));
    assert_eq!(last.types[5], ConcreteType::Sparse(SparseLayout::Csc, Elem::F64));
}

#[test]
fn oversized_expansion_fails_before_emission() {
    let src = mtk_source::source(
        "big",
        &[
            ("a", "f32, f64, i32, i64"),
            ("b", "f32, f64, i32, i64"),
            ("c", "f32, f64, i32, i64"),
        ],
        "  return mtk_wrap_int(ctx, 0);",
    );
    let options = GenerateOptions {
        source_name: None,
        max_combinations: Some(16),
    };
    let err = generate_bindings(&src, &options).expect_err("64 > 16 must fail");
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert_eq!(err.code, "MTK-EXP-0203");
    assert!(err.message.contains("64"), "unexpected message: {err}");

    // The default cap admits the same function.
    generate_bindings(&src, &GenerateOptions::default()).expect("64 <= default cap");
}

#[test]
fn dispatch_map_records_the_expansion() {
    let out = generate_bindings(&foo_source(), &GenerateOptions::default()).expect("generate");
    let map = &out.dispatch_map;
    assert_eq!(map.function, "foo");
    assert_eq!(map.stats.type_classes, 5);
    assert_eq!(map.stats.combinations, 8);
    assert_eq!(map.entries.len(), 8);
    assert_eq!(
        map.entries[0].types,
        vec!["f32", "f32", "i32", "str", "int", "csc_f32"]
    );
    // The first emitted specialization is the first dispatch entry.
    assert_eq!(map.entries[0].specialized, first_specialization_symbol(&out.c_src));
}

fn first_specialization_symbol(c_src: &str) -> String {
    let marker = "static mtk_value *";
    let start = c_src.find(marker).expect("specialization present") + marker.len();
    let rest = &c_src[start..];
    let end = rest.find('(').expect("signature");
    rest[..end].to_string()
}
