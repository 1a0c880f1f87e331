use crate::language;

/// Authoring guide served by `mtkc guide`.
pub fn guide_md() -> String {
    format!(
        r#"# MTK authoring guide ({lang_id})

An MTK source file is ordinary host C with one annotated function. Directives
are whole lines starting with `//@`; everything else is passed through or
ignored. One function per file, one generated translation unit per file.

## Directives

```
//@ function <name>
//@ arg <name> : <type tokens, comma or space separated>
//@ arg <name> : match(<earlier arg>)
//@ begin
    ... verbatim C body ...
//@ end
```

`<name>` must be a C identifier. Argument names `ctx`, `argc` and `argv` are
reserved by the generated code. `//@ arg` lines come after `//@ function` and
before `//@ begin`; `match(..)` must reference an argument declared above it
and is the only entry in its list.

## Type tokens

| tokens | meaning |
|---|---|
| `f32` `f64` `i32` `i64` | dense matrix views (`mtk_dense_*`) |
| `csr_f32` `csr_f64` `csr_i32` `csr_i64` | sparse CSR views |
| `csc_f32` `csc_f64` `csc_i32` `csc_i64` | sparse CSC views |
| `sparse_f32` `sparse_f64` `sparse_i32` `sparse_i64` | alias for the `csc_*` token |
| `str` | `mtk_str` (pointer + length, not NUL-terminated) |
| `bool` `int` `num` | plain C `bool` / `int64_t` / `double` |
| `obj` | opaque `const mtk_value *`, passed through untouched |

Duplicate tokens in one list collapse; order is otherwise preserved and
determines the generated dispatch order (first declared, first matched).

## Body aliases

Inside the body, `@T(x)` expands to the C view type argument `x` is bound to
in the current specialization, and `@S(x)` to its element type. Everything
else, including `mtk_move(..)` return-wrapping, is emitted verbatim.

```c
//@ function scale
//@ arg m : f32, f64
//@ arg k : num
//@ begin
  int64_t n = m.rows * m.cols;
  @S(m) *out = (@S(m) *)mtk_alloc(ctx, (size_t)n * sizeof(@S(m)));
  for (int64_t i = 0; i < n; i++) {{
    out[i] = (@S(m))(m.data[i] * k);
  }}
  @T(m) r = {{ out, m.rows, m.cols }};
  return mtk_move(ctx, r);
//@ end
```

## Expansion and dispatch

Each argument contributes its type set; `match(..)` folds arguments into one
type class. The generator emits one specialization per element of the
cross-product over classes (capped at {max} combinations; override with
`--max-combinations` or `MTK_MAX_COMBINATIONS`) plus one dispatcher that
checks the runtime tag of every incoming argument and calls the first exact
match in generation order. No implicit conversions: a `f32` array only ever
reaches a specialization declared for `f32`. When nothing matches, the
dispatcher raises a type-mismatch error listing every accepted combination.
"#,
        lang_id = language::LANG_ID,
        max = language::limits::MAX_COMBINATIONS,
    )
}
