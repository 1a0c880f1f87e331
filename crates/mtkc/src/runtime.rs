//! The embedded `mtk_host.h` text.
//!
//! The generated C units compile against this interface; the functions it
//! declares are implemented by the host adapter layer, which owns the value
//! representation, the zero-copy aliasing, and the interpreter registration
//! mechanics. Views borrow the caller's buffers for the duration of one call
//! and must not be retained past it except through `mtk_move`.

pub const MTK_HOST_H_FILE_NAME: &str = "mtk_host.h";

pub const MTK_HOST_H: &str = r#"#ifndef MTK_HOST_H
#define MTK_HOST_H

#include <stdbool.h>
#include <stddef.h>
#include <stdint.h>

#ifdef __cplusplus
extern "C" {
#endif

typedef struct mtk_ctx mtk_ctx;
typedef struct mtk_value mtk_value;

/* Runtime type tags, as reported by the host adapter for an incoming value.
 * Exactly one tag per value; dispatch compares tags for equality and never
 * widens or narrows. */
typedef enum mtk_type_tag {
    MTK_TAG_DENSE_F32 = 1,
    MTK_TAG_DENSE_F64,
    MTK_TAG_DENSE_I32,
    MTK_TAG_DENSE_I64,
    MTK_TAG_SPARSE_CSR_F32,
    MTK_TAG_SPARSE_CSR_F64,
    MTK_TAG_SPARSE_CSR_I32,
    MTK_TAG_SPARSE_CSR_I64,
    MTK_TAG_SPARSE_CSC_F32,
    MTK_TAG_SPARSE_CSC_F64,
    MTK_TAG_SPARSE_CSC_I32,
    MTK_TAG_SPARSE_CSC_I64,
    MTK_TAG_STR,
    MTK_TAG_BOOL,
    MTK_TAG_INT,
    MTK_TAG_NUM,
    MTK_TAG_OBJ
} mtk_type_tag;

/* Dense views alias the caller's buffer; no copy, no ownership. */
typedef struct mtk_dense_f32 { const float   *data; int64_t rows; int64_t cols; } mtk_dense_f32;
typedef struct mtk_dense_f64 { const double  *data; int64_t rows; int64_t cols; } mtk_dense_f64;
typedef struct mtk_dense_i32 { const int32_t *data; int64_t rows; int64_t cols; } mtk_dense_i32;
typedef struct mtk_dense_i64 { const int64_t *data; int64_t rows; int64_t cols; } mtk_dense_i64;

/* Sparse views expose the buffer triplet (values, inner indices, outer
 * pointers) of a compressed matrix, again without copying. For CSR the outer
 * dimension is rows, for CSC it is columns. */
#define MTK_SPARSE_VIEW(name, elem) \
    typedef struct name { \
        const elem    *values; \
        const int32_t *inner; \
        const int32_t *outer; \
        int64_t rows; \
        int64_t cols; \
        int64_t nnz; \
    } name

MTK_SPARSE_VIEW(mtk_sparse_csr_f32, float);
MTK_SPARSE_VIEW(mtk_sparse_csr_f64, double);
MTK_SPARSE_VIEW(mtk_sparse_csr_i32, int32_t);
MTK_SPARSE_VIEW(mtk_sparse_csr_i64, int64_t);
MTK_SPARSE_VIEW(mtk_sparse_csc_f32, float);
MTK_SPARSE_VIEW(mtk_sparse_csc_f64, double);
MTK_SPARSE_VIEW(mtk_sparse_csc_i32, int32_t);
MTK_SPARSE_VIEW(mtk_sparse_csc_i64, int64_t);

#undef MTK_SPARSE_VIEW

typedef struct mtk_str { const char *data; size_t len; } mtk_str;

/* -- adapters (host-implemented, zero-copy) ------------------------------ */

mtk_type_tag mtk_value_tag(const mtk_value *v);
const char *mtk_tag_name(mtk_type_tag tag);

mtk_dense_f32 mtk_as_dense_f32(const mtk_value *v);
mtk_dense_f64 mtk_as_dense_f64(const mtk_value *v);
mtk_dense_i32 mtk_as_dense_i32(const mtk_value *v);
mtk_dense_i64 mtk_as_dense_i64(const mtk_value *v);

mtk_sparse_csr_f32 mtk_as_sparse_csr_f32(const mtk_value *v);
mtk_sparse_csr_f64 mtk_as_sparse_csr_f64(const mtk_value *v);
mtk_sparse_csr_i32 mtk_as_sparse_csr_i32(const mtk_value *v);
mtk_sparse_csr_i64 mtk_as_sparse_csr_i64(const mtk_value *v);
mtk_sparse_csc_f32 mtk_as_sparse_csc_f32(const mtk_value *v);
mtk_sparse_csc_f64 mtk_as_sparse_csc_f64(const mtk_value *v);
mtk_sparse_csc_i32 mtk_as_sparse_csc_i32(const mtk_value *v);
mtk_sparse_csc_i64 mtk_as_sparse_csc_i64(const mtk_value *v);

mtk_str mtk_as_str(const mtk_value *v);
bool    mtk_as_bool(const mtk_value *v);
int64_t mtk_as_int(const mtk_value *v);
double  mtk_as_num(const mtk_value *v);

/* -- returning values back to the host ----------------------------------- */

/* Allocate a buffer owned by the host allocator. Buffers handed back through
 * mtk_move must come from here so the host can adopt them without copying. */
void *mtk_alloc(mtk_ctx *ctx, size_t bytes);

mtk_value *mtk_move_dense_f32(mtk_ctx *ctx, mtk_dense_f32 m);
mtk_value *mtk_move_dense_f64(mtk_ctx *ctx, mtk_dense_f64 m);
mtk_value *mtk_move_dense_i32(mtk_ctx *ctx, mtk_dense_i32 m);
mtk_value *mtk_move_dense_i64(mtk_ctx *ctx, mtk_dense_i64 m);
mtk_value *mtk_move_sparse_csr_f32(mtk_ctx *ctx, mtk_sparse_csr_f32 m);
mtk_value *mtk_move_sparse_csr_f64(mtk_ctx *ctx, mtk_sparse_csr_f64 m);
mtk_value *mtk_move_sparse_csr_i32(mtk_ctx *ctx, mtk_sparse_csr_i32 m);
mtk_value *mtk_move_sparse_csr_i64(mtk_ctx *ctx, mtk_sparse_csr_i64 m);
mtk_value *mtk_move_sparse_csc_f32(mtk_ctx *ctx, mtk_sparse_csc_f32 m);
mtk_value *mtk_move_sparse_csc_f64(mtk_ctx *ctx, mtk_sparse_csc_f64 m);
mtk_value *mtk_move_sparse_csc_i32(mtk_ctx *ctx, mtk_sparse_csc_i32 m);
mtk_value *mtk_move_sparse_csc_i64(mtk_ctx *ctx, mtk_sparse_csc_i64 m);

mtk_value *mtk_wrap_str(mtk_ctx *ctx, mtk_str s);
mtk_value *mtk_wrap_bool(mtk_ctx *ctx, bool b);
mtk_value *mtk_wrap_int(mtk_ctx *ctx, int64_t i);
mtk_value *mtk_wrap_num(mtk_ctx *ctx, double d);

/* Hand a native value back through a zero-copy view. Ownership of the
 * underlying buffers transfers to the host. */
#ifndef __cplusplus
#define mtk_move(ctx, v) _Generic((v), \
    mtk_dense_f32:      mtk_move_dense_f32, \
    mtk_dense_f64:      mtk_move_dense_f64, \
    mtk_dense_i32:      mtk_move_dense_i32, \
    mtk_dense_i64:      mtk_move_dense_i64, \
    mtk_sparse_csr_f32: mtk_move_sparse_csr_f32, \
    mtk_sparse_csr_f64: mtk_move_sparse_csr_f64, \
    mtk_sparse_csr_i32: mtk_move_sparse_csr_i32, \
    mtk_sparse_csr_i64: mtk_move_sparse_csr_i64, \
    mtk_sparse_csc_f32: mtk_move_sparse_csc_f32, \
    mtk_sparse_csc_f64: mtk_move_sparse_csc_f64, \
    mtk_sparse_csc_i32: mtk_move_sparse_csc_i32, \
    mtk_sparse_csc_i64: mtk_move_sparse_csc_i64 \
)(ctx, v)
#endif

/* -- error paths --------------------------------------------------------- */

/* Both raise a catchable error in the host interpreter and return NULL to
 * the caller of the dispatcher. */
mtk_value *mtk_fail_arity(mtk_ctx *ctx, const char *fn, int expected, int got);
mtk_value *mtk_fail_no_match(mtk_ctx *ctx, const char *fn,
                             const char *const *accepted, size_t accepted_count,
                             int argc, const mtk_value *const *argv);

/* -- registration -------------------------------------------------------- */

typedef mtk_value *(*mtk_cfunc)(mtk_ctx *ctx, int argc, const mtk_value *const *argv);

typedef struct mtk_binding {
    const char *name;
    int argc;
    mtk_cfunc fn;
} mtk_binding;

void mtk_register(mtk_ctx *ctx, const mtk_binding *binding);

#ifdef __cplusplus
}
#endif

#endif /* MTK_HOST_H */
"#;
