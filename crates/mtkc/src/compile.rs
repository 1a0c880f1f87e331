use crate::decl::FunctionSpec;
use crate::diagnostics::{Diagnostic, Severity, Span, Stage};
use crate::emit;
use crate::expand::{self, DispatchMapV1, Expansion};
use crate::language;
use crate::resolve;
use crate::scan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    UnresolvedReference,
    Configuration,
    Internal,
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub kind: ErrorKind,
    pub stage: Stage,
    pub code: &'static str,
    pub message: String,
    pub line: Option<u32>,
}

impl CompilerError {
    pub fn new(kind: ErrorKind, stage: Stage, code: &'static str, message: String) -> Self {
        Self {
            kind,
            stage,
            code,
            message,
            line: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn to_diagnostic(&self, file: Option<&str>) -> Diagnostic {
        Diagnostic {
            code: self.code.to_string(),
            severity: Severity::Error,
            stage: self.stage,
            message: self.message.clone(),
            loc: self.line.map(|line| Span {
                line,
                file: file.map(|f| f.to_string()),
            }),
        }
    }
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: line {}: {}", self.code, line, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Name recorded in the generated banner and diagnostics (usually the
    /// input file name).
    pub source_name: Option<String>,
    pub max_combinations: Option<usize>,
}

impl GenerateOptions {
    pub fn effective_max_combinations(&self) -> usize {
        self.max_combinations
            .unwrap_or_else(language::limits::max_combinations)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateStats {
    pub type_classes: usize,
    pub combinations: usize,
}

#[derive(Debug, Clone)]
pub struct GenerateOutput {
    pub c_src: String,
    pub function: String,
    pub arg_count: usize,
    pub dispatch_map: DispatchMapV1,
    pub stats: GenerateStats,
}

/// Scan + resolve + expand, no emission. This is the `check` path and the
/// front half of [`generate_bindings`].
pub fn check_source(
    source: &str,
    options: &GenerateOptions,
) -> Result<(FunctionSpec, Expansion), CompilerError> {
    if source.len() > language::limits::MAX_SOURCE_BYTES {
        return Err(CompilerError::new(
            ErrorKind::Configuration,
            Stage::Scan,
            "MTK-CFG-0301",
            format!(
                "source too large: max_source_bytes={} got {}",
                language::limits::MAX_SOURCE_BYTES,
                source.len()
            ),
        ));
    }

    let decl = scan::scan_source(source)?;
    let spec = resolve::resolve_decl(decl)?;
    let expansion = expand::expand(&spec, options.effective_max_combinations())?;
    Ok((spec, expansion))
}

/// Full pipeline for one annotated source file: scan -> resolve -> expand ->
/// emit. Any failure is fatal for the file; nothing partial is produced.
pub fn generate_bindings(
    source: &str,
    options: &GenerateOptions,
) -> Result<GenerateOutput, CompilerError> {
    let (spec, expansion) = check_source(source, options)?;
    let c_src = emit::emit_unit(&spec, &expansion, options);
    Ok(GenerateOutput {
        c_src,
        function: spec.name.clone(),
        arg_count: spec.args.len(),
        dispatch_map: expansion.map,
        stats: GenerateStats {
            type_classes: expansion.classes.len(),
            combinations: expansion.table.entries.len(),
        },
    })
}
