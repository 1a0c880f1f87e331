//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for the schema/version
//! strings that appear in machine-readable I/O (diagnostic reports, dispatch
//! maps, module manifests, build reports).

pub const MTK_DIAG_SCHEMA_VERSION: &str = "mtk.diag@0.1.0";

pub const MTKC_REPORT_SCHEMA_VERSION: &str = "mtkc.report@0.1.0";
pub const MTKC_BUILD_REPORT_SCHEMA_VERSION: &str = "mtkc.build.report@0.1.0";

pub const DISPATCH_MAP_SCHEMA_VERSION: &str = "mtk.dispatch-map@0.1.0";

pub const MODULE_MANIFEST_SCHEMA_VERSION: &str = "mtk.module@0.1.0";
pub const MODULE_MANIFEST_SCHEMA_VERSIONS_SUPPORTED: &[&str] = &[MODULE_MANIFEST_SCHEMA_VERSION];
