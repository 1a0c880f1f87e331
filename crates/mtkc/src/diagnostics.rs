use serde::{Deserialize, Serialize};

use mtk_contracts::MTK_DIAG_SCHEMA_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Scan,
    Resolve,
    Expand,
    Emit,
    Build,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn ok() -> Self {
        Self {
            schema_version: MTK_DIAG_SCHEMA_VERSION.to_string(),
            ok: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(|a, b| {
            let al = a.loc.as_ref().map(|l| l.line).unwrap_or(0);
            let bl = b.loc.as_ref().map(|l| l.line).unwrap_or(0);
            al.cmp(&bl)
                .then_with(|| a.code.cmp(&b.code))
                .then_with(|| a.message.cmp(&b.message))
        });
        self.ok = diagnostics.iter().all(|d| d.severity != Severity::Error);
        self.diagnostics = diagnostics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, Report, Severity, Span, Stage};

    fn diag(code: &str, line: u32, severity: Severity) -> Diagnostic {
        Diagnostic {
            code: code.to_string(),
            severity,
            stage: Stage::Scan,
            message: format!("{code} fired"),
            loc: Some(Span { line, file: None }),
        }
    }

    #[test]
    fn diagnostics_sort_by_line_then_code_and_errors_flip_ok() {
        let report = Report::ok().with_diagnostics(vec![
            diag("MTK-SCAN-0005", 9, Severity::Warning),
            diag("MTK-SCAN-0002", 3, Severity::Error),
            diag("MTK-SCAN-0001", 9, Severity::Warning),
        ]);
        assert!(!report.ok);
        let codes: Vec<&str> = report.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["MTK-SCAN-0002", "MTK-SCAN-0001", "MTK-SCAN-0005"]);

        let report = Report::ok().with_diagnostics(vec![diag("MTK-X", 1, Severity::Warning)]);
        assert!(report.ok, "warnings alone keep ok=true");
    }
}
