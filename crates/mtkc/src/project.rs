use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mtk_contracts::{MODULE_MANIFEST_SCHEMA_VERSIONS_SUPPORTED, MTKC_BUILD_REPORT_SCHEMA_VERSION};

use crate::compile::{self, GenerateOptions};
use crate::diagnostics::{Diagnostic, Severity, Stage};
use crate::runtime;
use crate::validate;

/// Declarative module manifest: one compiled host module from a list of
/// annotated sources. Paths are relative to the manifest file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub schema_version: String,
    pub module: String,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_combinations: Option<usize>,
}

pub fn load_module_manifest(path: &Path) -> Result<ModuleManifest> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read manifest: {}", path.display()))?;
    let manifest: ModuleManifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest JSON: {}", path.display()))?;
    if !MODULE_MANIFEST_SCHEMA_VERSIONS_SUPPORTED.contains(&manifest.schema_version.as_str()) {
        anyhow::bail!(
            "unsupported manifest schema_version {:?} (supported: {:?})",
            manifest.schema_version,
            MODULE_MANIFEST_SCHEMA_VERSIONS_SUPPORTED
        );
    }
    validate::validate_c_identifier(&manifest.module)
        .map_err(|e| anyhow::anyhow!("invalid module name: {e}"))?;
    if manifest.sources.is_empty() {
        anyhow::bail!("manifest lists no sources");
    }
    Ok(manifest)
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildFileReportV1 {
    pub source: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    pub combinations: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReportV1 {
    pub schema_version: String,
    pub module: String,
    pub ok: bool,
    pub out_dir: String,
    pub files: Vec<BuildFileReportV1>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generated: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildConfig {
    pub emit_dispatch_maps: bool,
}

/// Source stem for output naming: `kernels/axpy.mtk.c` -> `axpy`.
fn source_stem(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    stem.strip_suffix(".mtk").unwrap_or(&stem).to_string()
}

fn build_diagnostic(code: &str, source: &str, message: String) -> Diagnostic {
    Diagnostic {
        code: code.to_string(),
        severity: Severity::Error,
        stage: Stage::Build,
        message: format!("{source}: {message}"),
        loc: None,
    }
}

/// Generate every source listed by the manifest into `out_dir`.
///
/// A file that fails to generate is reported and skipped; the remaining
/// files, the module registration unit, and the adapter header are still
/// produced. A failed file writes nothing.
pub fn build_module(
    manifest_path: &Path,
    out_dir: &Path,
    cfg: &BuildConfig,
) -> Result<BuildReportV1> {
    let manifest = load_module_manifest(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create out dir: {}", out_dir.display()))?;

    let mut files: Vec<BuildFileReportV1> = Vec::with_capacity(manifest.sources.len());
    let mut generated: Vec<String> = Vec::new();
    let mut bound: BTreeMap<String, String> = BTreeMap::new();

    for source in &manifest.sources {
        let src_path = base.join(source);
        let text = match std::fs::read_to_string(&src_path) {
            Ok(text) => text,
            Err(err) => {
                files.push(BuildFileReportV1 {
                    source: source.clone(),
                    ok: false,
                    function: None,
                    out: None,
                    combinations: 0,
                    diagnostics: vec![build_diagnostic(
                        "MTK-BLD-0402",
                        source,
                        format!("read source: {err}"),
                    )],
                });
                continue;
            }
        };

        let options = GenerateOptions {
            source_name: Some(source.clone()),
            max_combinations: manifest.max_combinations,
        };
        let output = match compile::generate_bindings(&text, &options) {
            Ok(output) => output,
            Err(err) => {
                files.push(BuildFileReportV1 {
                    source: source.clone(),
                    ok: false,
                    function: None,
                    out: None,
                    combinations: 0,
                    diagnostics: vec![err.to_diagnostic(Some(source))],
                });
                continue;
            }
        };

        if let Some(prev) = bound.get(&output.function) {
            files.push(BuildFileReportV1 {
                source: source.clone(),
                ok: false,
                function: Some(output.function.clone()),
                out: None,
                combinations: 0,
                diagnostics: vec![build_diagnostic(
                    "MTK-BLD-0401",
                    source,
                    format!(
                        "function {:?} already bound by {prev}",
                        output.function
                    ),
                )],
            });
            continue;
        }
        bound.insert(output.function.clone(), source.clone());

        let stem = source_stem(source);
        let out_name = format!("{stem}.gen.c");
        let out_path = out_dir.join(&out_name);
        std::fs::write(&out_path, &output.c_src)
            .with_context(|| format!("write generated C: {}", out_path.display()))?;
        generated.push(out_name.clone());

        if cfg.emit_dispatch_maps {
            let map_name = format!("{stem}.dispatch.json");
            let map_path = out_dir.join(&map_name);
            let json = serde_json::to_string_pretty(&output.dispatch_map)
                .context("serialize dispatch map")?;
            std::fs::write(&map_path, json)
                .with_context(|| format!("write dispatch map: {}", map_path.display()))?;
            generated.push(map_name);
        }

        files.push(BuildFileReportV1 {
            source: source.clone(),
            ok: true,
            function: Some(output.function),
            out: Some(out_name),
            combinations: output.stats.combinations,
            diagnostics: Vec::new(),
        });
    }

    let header_path = out_dir.join(runtime::MTK_HOST_H_FILE_NAME);
    std::fs::write(&header_path, runtime::MTK_HOST_H)
        .with_context(|| format!("write adapter header: {}", header_path.display()))?;
    generated.push(runtime::MTK_HOST_H_FILE_NAME.to_string());

    let unit_name = format!("{}_module.c", manifest.module);
    let unit_path = out_dir.join(&unit_name);
    std::fs::write(&unit_path, module_unit(&manifest.module, &bound))
        .with_context(|| format!("write module unit: {}", unit_path.display()))?;
    generated.push(unit_name);

    Ok(BuildReportV1 {
        schema_version: MTKC_BUILD_REPORT_SCHEMA_VERSION.to_string(),
        module: manifest.module,
        ok: files.iter().all(|f| f.ok),
        out_dir: out_dir.display().to_string(),
        files,
        generated,
    })
}

/// The module registration unit: one extern per generated binding plus a
/// register-all entry point for the host adapter.
fn module_unit(module: &str, bound: &BTreeMap<String, String>) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let mut out = String::new();
    out.push_str(&format!(
        "/* Generated by mtkc {version} -- module {module} registration unit. Do not edit. */\n"
    ));
    out.push_str("#include \"mtk_host.h\"\n\n");

    for function in bound.keys() {
        out.push_str(&format!("extern const mtk_binding mtk_binding_{function};\n"));
    }
    out.push('\n');

    if bound.is_empty() {
        out.push_str(&format!(
            "const size_t mtk_module_{module}_binding_count = 0;\n\n"
        ));
        out.push_str(&format!(
            "void mtk_module_{module}_register(mtk_ctx *ctx) {{\n    (void)ctx;\n}}\n"
        ));
        return out;
    }

    out.push_str(&format!(
        "const mtk_binding *const mtk_module_{module}_bindings[] = {{\n"
    ));
    for function in bound.keys() {
        out.push_str(&format!("    &mtk_binding_{function},\n"));
    }
    out.push_str("};\n\n");
    out.push_str(&format!(
        "const size_t mtk_module_{module}_binding_count = {};\n\n",
        bound.len()
    ));
    out.push_str(&format!(
        "void mtk_module_{module}_register(mtk_ctx *ctx) {{\n"
    ));
    out.push_str(&format!(
        "    for (size_t i = 0; i < {}; i++) {{\n",
        bound.len()
    ));
    out.push_str(&format!(
        "        mtk_register(ctx, mtk_module_{module}_bindings[i]);\n"
    ));
    out.push_str("    }\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::source_stem;

    #[test]
    fn source_stem_strips_dialect_suffix() {
        assert_eq!(source_stem("kernels/axpy.mtk.c"), "axpy");
        assert_eq!(source_stem("spmv.c"), "spmv");
        assert_eq!(source_stem("plain"), "plain");
    }
}
