use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Elem {
    F32,
    F64,
    I32,
    I64,
}

impl Elem {
    pub fn as_str(self) -> &'static str {
        match self {
            Elem::F32 => "f32",
            Elem::F64 => "f64",
            Elem::I32 => "i32",
            Elem::I64 => "i64",
        }
    }

    pub fn c_scalar(self) -> &'static str {
        match self {
            Elem::F32 => "float",
            Elem::F64 => "double",
            Elem::I32 => "int32_t",
            Elem::I64 => "int64_t",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SparseLayout {
    Csr,
    Csc,
}

impl SparseLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            SparseLayout::Csr => "csr",
            SparseLayout::Csc => "csc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpaqueKind {
    Str,
    Bool,
    Int,
    Num,
    Obj,
}

/// One binding-relevant concrete type. The universe is closed: dense matrices
/// over the four element types, sparse matrices in the two compressed
/// layouts, and the opaque pass-through kinds (each a single type as far as
/// expansion and dispatch are concerned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConcreteType {
    Dense(Elem),
    Sparse(SparseLayout, Elem),
    Opaque(OpaqueKind),
}

impl ConcreteType {
    /// Fixed token table. `sparse_<elem>` is an alias for the CSC variant,
    /// the host interpreters' native sparse layout.
    pub fn parse_token(tok: &str) -> Option<Self> {
        let t = match tok {
            "f32" => ConcreteType::Dense(Elem::F32),
            "f64" => ConcreteType::Dense(Elem::F64),
            "i32" => ConcreteType::Dense(Elem::I32),
            "i64" => ConcreteType::Dense(Elem::I64),
            "csr_f32" => ConcreteType::Sparse(SparseLayout::Csr, Elem::F32),
            "csr_f64" => ConcreteType::Sparse(SparseLayout::Csr, Elem::F64),
            "csr_i32" => ConcreteType::Sparse(SparseLayout::Csr, Elem::I32),
            "csr_i64" => ConcreteType::Sparse(SparseLayout::Csr, Elem::I64),
            "csc_f32" | "sparse_f32" => ConcreteType::Sparse(SparseLayout::Csc, Elem::F32),
            "csc_f64" | "sparse_f64" => ConcreteType::Sparse(SparseLayout::Csc, Elem::F64),
            "csc_i32" | "sparse_i32" => ConcreteType::Sparse(SparseLayout::Csc, Elem::I32),
            "csc_i64" | "sparse_i64" => ConcreteType::Sparse(SparseLayout::Csc, Elem::I64),
            "str" => ConcreteType::Opaque(OpaqueKind::Str),
            "bool" => ConcreteType::Opaque(OpaqueKind::Bool),
            "int" => ConcreteType::Opaque(OpaqueKind::Int),
            "num" => ConcreteType::Opaque(OpaqueKind::Num),
            "obj" => ConcreteType::Opaque(OpaqueKind::Obj),
            _ => return None,
        };
        Some(t)
    }

    /// Canonical token, also used in mangled specialization symbols and in
    /// the accepted-combination strings baked into dispatchers.
    pub fn token(self) -> &'static str {
        match self {
            ConcreteType::Dense(e) => e.as_str(),
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F32) => "csr_f32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F64) => "csr_f64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I32) => "csr_i32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I64) => "csr_i64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F32) => "csc_f32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F64) => "csc_f64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I32) => "csc_i32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I64) => "csc_i64",
            ConcreteType::Opaque(OpaqueKind::Str) => "str",
            ConcreteType::Opaque(OpaqueKind::Bool) => "bool",
            ConcreteType::Opaque(OpaqueKind::Int) => "int",
            ConcreteType::Opaque(OpaqueKind::Num) => "num",
            ConcreteType::Opaque(OpaqueKind::Obj) => "obj",
        }
    }

    /// C type of the specialization formal parameter bound to this type: a
    /// zero-copy view struct for dense/sparse, plain C scalars and `mtk_str`
    /// for opaque kinds, and the raw host value pointer for `obj`.
    pub fn c_view_ty(self) -> &'static str {
        match self {
            ConcreteType::Dense(Elem::F32) => "mtk_dense_f32",
            ConcreteType::Dense(Elem::F64) => "mtk_dense_f64",
            ConcreteType::Dense(Elem::I32) => "mtk_dense_i32",
            ConcreteType::Dense(Elem::I64) => "mtk_dense_i64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F32) => "mtk_sparse_csr_f32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F64) => "mtk_sparse_csr_f64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I32) => "mtk_sparse_csr_i32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I64) => "mtk_sparse_csr_i64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F32) => "mtk_sparse_csc_f32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F64) => "mtk_sparse_csc_f64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I32) => "mtk_sparse_csc_i32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I64) => "mtk_sparse_csc_i64",
            ConcreteType::Opaque(OpaqueKind::Str) => "mtk_str",
            ConcreteType::Opaque(OpaqueKind::Bool) => "bool",
            ConcreteType::Opaque(OpaqueKind::Int) => "int64_t",
            ConcreteType::Opaque(OpaqueKind::Num) => "double",
            ConcreteType::Opaque(OpaqueKind::Obj) => "const mtk_value *",
        }
    }

    /// C element type substituted for `@S(<arg>)` in the author body.
    /// For opaque kinds this coincides with the parameter type.
    pub fn c_elem_ty(self) -> &'static str {
        match self {
            ConcreteType::Dense(e) | ConcreteType::Sparse(_, e) => e.c_scalar(),
            opaque => opaque.c_view_ty(),
        }
    }

    /// Runtime type tag constant checked by the emitted dispatcher.
    pub fn c_tag(self) -> &'static str {
        match self {
            ConcreteType::Dense(Elem::F32) => "MTK_TAG_DENSE_F32",
            ConcreteType::Dense(Elem::F64) => "MTK_TAG_DENSE_F64",
            ConcreteType::Dense(Elem::I32) => "MTK_TAG_DENSE_I32",
            ConcreteType::Dense(Elem::I64) => "MTK_TAG_DENSE_I64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F32) => "MTK_TAG_SPARSE_CSR_F32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F64) => "MTK_TAG_SPARSE_CSR_F64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I32) => "MTK_TAG_SPARSE_CSR_I32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I64) => "MTK_TAG_SPARSE_CSR_I64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F32) => "MTK_TAG_SPARSE_CSC_F32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F64) => "MTK_TAG_SPARSE_CSC_F64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I32) => "MTK_TAG_SPARSE_CSC_I32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I64) => "MTK_TAG_SPARSE_CSC_I64",
            ConcreteType::Opaque(OpaqueKind::Str) => "MTK_TAG_STR",
            ConcreteType::Opaque(OpaqueKind::Bool) => "MTK_TAG_BOOL",
            ConcreteType::Opaque(OpaqueKind::Int) => "MTK_TAG_INT",
            ConcreteType::Opaque(OpaqueKind::Num) => "MTK_TAG_NUM",
            ConcreteType::Opaque(OpaqueKind::Obj) => "MTK_TAG_OBJ",
        }
    }

    /// Zero-copy adapter the dispatcher arm calls to turn the host value into
    /// the specialization parameter. `obj` has none: the value pointer is
    /// passed through as-is.
    pub fn c_adapter(self) -> Option<&'static str> {
        let f = match self {
            ConcreteType::Dense(Elem::F32) => "mtk_as_dense_f32",
            ConcreteType::Dense(Elem::F64) => "mtk_as_dense_f64",
            ConcreteType::Dense(Elem::I32) => "mtk_as_dense_i32",
            ConcreteType::Dense(Elem::I64) => "mtk_as_dense_i64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F32) => "mtk_as_sparse_csr_f32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::F64) => "mtk_as_sparse_csr_f64",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I32) => "mtk_as_sparse_csr_i32",
            ConcreteType::Sparse(SparseLayout::Csr, Elem::I64) => "mtk_as_sparse_csr_i64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F32) => "mtk_as_sparse_csc_f32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::F64) => "mtk_as_sparse_csc_f64",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I32) => "mtk_as_sparse_csc_i32",
            ConcreteType::Sparse(SparseLayout::Csc, Elem::I64) => "mtk_as_sparse_csc_i64",
            ConcreteType::Opaque(OpaqueKind::Str) => "mtk_as_str",
            ConcreteType::Opaque(OpaqueKind::Bool) => "mtk_as_bool",
            ConcreteType::Opaque(OpaqueKind::Int) => "mtk_as_int",
            ConcreteType::Opaque(OpaqueKind::Num) => "mtk_as_num",
            ConcreteType::Opaque(OpaqueKind::Obj) => return None,
        };
        Some(f)
    }
}

impl Display for ConcreteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
