use mtkc::compile::{generate_bindings, GenerateOptions};


#[test]
fn generated_unit_has_banner_specializations_dispatcher_registration() {
    let src = mtk_source::source(
        "dot",
        &[("x", "f32, f64"), ("y", "match(x)")],
        "  double acc = 0.0;\n  return mtk_wrap_num(ctx, acc);",
    );
    let options = GenerateOptions {
        source_name: Some("dot.mtk.c".to_string()),
        max_combinations: None,
    };
    let out = generate_bindings(&src, &options).expect("generate");
    let c = &out.c_src;

    assert!(c.starts_with("/* Generated by mtkc"));
    assert!(c.contains("from dot.mtk.c"));
    assert!(c.contains("#include \"mtk_host.h\""));

    // Two specializations (x/y share one class), each a static definition.
    assert_eq!(c.matches("static mtk_value *dot__mtk_spec_v1__").count(), 2);
    assert!(c.contains("mtk_dense_f32 x, mtk_dense_f32 y"));
    assert!(c.contains("mtk_dense_f64 x, mtk_dense_f64 y"));

    // Dispatcher: arity gate, one tag read per argument, exact-match arms in
    // generation order, explicit fallthrough.
    assert!(c.contains(
        "mtk_value *mtk_dispatch_dot(mtk_ctx *ctx, int argc, const mtk_value *const *argv)"
    ));
    assert!(c.contains("if (argc != 2)"));
    assert!(c.contains("return mtk_fail_arity(ctx, \"dot\", 2, argc);"));
    assert!(c.contains("const mtk_type_tag t0 = mtk_value_tag(argv[0]);"));
    assert!(c.contains("const mtk_type_tag t1 = mtk_value_tag(argv[1]);"));
    let f32_arm = c
        .find("t0 == MTK_TAG_DENSE_F32 && t1 == MTK_TAG_DENSE_F32")
        .expect("f32 arm");
    let f64_arm = c
        .find("t0 == MTK_TAG_DENSE_F64 && t1 == MTK_TAG_DENSE_F64")
        .expect("f64 arm");
    assert!(f32_arm < f64_arm, "arms must follow generation order");
    assert!(c.contains("mtk_as_dense_f32(argv[0])"));
    assert!(c.contains("return mtk_fail_no_match(ctx, \"dot\", mtk_dot_accepted, 2, argc, argv);"));

    // Accepted-combination table for the mismatch error.
    assert!(c.contains("static const char *const mtk_dot_accepted[] = {"));
    assert!(c.contains("\"(f32, f32)\""));
    assert!(c.contains("\"(f64, f64)\""));

    // Registration fragment.
    assert!(c.contains("const mtk_binding mtk_binding_dot = {\"dot\", 2, mtk_dispatch_dot};"));
}

#[test]
fn body_aliases_substitute_and_markers_survive() {
    let src = mtk_source::source(
        "scale",
        &[("m", "f32, f64"), ("k", "num")],
        "  @S(m) *out = (@S(m) *)mtk_alloc(ctx, 8);\n  @T(m) r = { out, m.rows, m.cols };\n  return mtk_move(ctx, r);",
    );
    let out = generate_bindings(&src, &GenerateOptions::default()).expect("generate");
    let c = &out.c_src;

    // Substituted per combination.
    assert!(c.contains("float *out = (float *)mtk_alloc(ctx, 8);"));
    assert!(c.contains("double *out = (double *)mtk_alloc(ctx, 8);"));
    assert!(c.contains("mtk_dense_f32 r = { out, m.rows, m.cols };"));
    assert!(c.contains("mtk_dense_f64 r = { out, m.rows, m.cols };"));
    // The move marker is preserved verbatim, never interpreted.
    assert_eq!(c.matches("return mtk_move(ctx, r);").count(), 2);
    // No alias syntax leaks into the output.
    assert!(!c.contains("@S("));
    assert!(!c.contains("@T("));
}

#[test]
fn opaque_arguments_check_tags_and_pass_through() {
    let src = mtk_source::source(
        "tagof",
        &[("v", "obj"), ("label", "str")],
        "  return mtk_wrap_int(ctx, (int64_t)mtk_value_tag(v));",
    );
    let out = generate_bindings(&src, &GenerateOptions::default()).expect("generate");
    let c = &out.c_src;

    // Exactly one combination; obj and str are each a single type.
    assert_eq!(out.stats.combinations, 1);
    assert!(c.contains("t0 == MTK_TAG_OBJ && t1 == MTK_TAG_STR"));
    // obj has no adapter: the raw value pointer is forwarded.
    assert!(c.contains("(ctx, argv[0], mtk_as_str(argv[1]))"));
    assert!(c.contains("const mtk_value *v"));
}

#[test]
fn zero_argument_function_dispatches_through_arity_gate_only() {
    let src = mtk_source::source("nop", &[], "  return mtk_wrap_int(ctx, 0);");
    let out = generate_bindings(&src, &GenerateOptions::default()).expect("generate");
    let c = &out.c_src;

    assert_eq!(out.stats.combinations, 1);
    assert!(c.contains("if (argc != 0)"));
    assert!(c.contains("return mtk_fail_arity(ctx, \"nop\", 0, argc);"));
    assert!(c.contains("nop__mtk_spec_v1__void__h"));
    assert!(c.contains("const mtk_binding mtk_binding_nop = {\"nop\", 0, mtk_dispatch_nop};"));
}

#[test]
fn sparse_views_are_bound_by_layout() {
    let src = mtk_source::source(
        "spsum",
        &[("m", "sparse_f32, csr_f32")],
        "  double acc = 0.0;\n  for (int64_t k = 0; k < m.nnz; k++) acc += (double)m.values[k];\n  return mtk_wrap_num(ctx, acc);",
    );
    let out = generate_bindings(&src, &GenerateOptions::default()).expect("generate");
    let c = &out.c_src;

    assert_eq!(out.stats.combinations, 2);
    // Declared order: the csc alias first, then explicit csr.
    let csc = c.find("mtk_sparse_csc_f32 m").expect("csc specialization");
    let csr = c.find("mtk_sparse_csr_f32 m").expect("csr specialization");
    assert!(csc < csr);
    assert!(c.contains("t0 == MTK_TAG_SPARSE_CSC_F32"));
    assert!(c.contains("mtk_as_sparse_csr_f32(argv[0])"));
}

#[test]
fn demo_sources_generate_cleanly() {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    for name in ["dot.mtk.c", "axpy.mtk.c", "spsum.mtk.c"] {
        let path = demos.join(name);
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
        let options = GenerateOptions {
            source_name: Some(name.to_string()),
            max_combinations: None,
        };
        let out = generate_bindings(&text, &options)
            .unwrap_or_else(|e| panic!("{name} must generate: {e}"));
        assert!(out.stats.combinations >= 1, "{name} generated nothing");
    }
}
