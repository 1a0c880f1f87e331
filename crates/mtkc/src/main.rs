use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mtk_contracts::MTKC_REPORT_SCHEMA_VERSION;
use mtkc::compile::{self, GenerateOptions};
use mtkc::diagnostics::{Diagnostic, Report};
use mtkc::guide;
use mtkc::language;
use mtkc::project;
use mtkc::runtime;

#[derive(Parser)]
#[command(name = "mtkc")]
#[command(about = "MTK binding generator (annotated C -> specializations + dispatcher).", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the dialect identifier.
    LangId,
    /// Print the authoring guide.
    Guide,
    /// Scan, resolve and expand one source without emitting code.
    Check {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_name = "N")]
        max_combinations: Option<usize>,
        #[arg(long)]
        report_json: bool,
    },
    /// Generate the C translation unit for one source.
    Generate {
        #[arg(long)]
        input: PathBuf,
        /// Output path; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        emit_dispatch_map: Option<PathBuf>,
        /// Write the host adapter header next to the output.
        #[arg(long, value_name = "PATH")]
        emit_header: Option<PathBuf>,
        #[arg(long, value_name = "N")]
        max_combinations: Option<usize>,
        #[arg(long)]
        report_json: bool,
    },
    /// Generate every source listed by a module manifest.
    Build {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long)]
        emit_dispatch_maps: bool,
        #[arg(long)]
        report_json: bool,
    },
}

#[derive(Debug, Serialize)]
struct MtkcToolReport {
    schema_version: &'static str,
    command: &'static str,
    ok: bool,
    r#in: String,
    diagnostics_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
    exit_code: u8,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn main() -> std::process::ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::LangId => {
            println!("{}", language::LANG_ID);
            Ok(std::process::ExitCode::SUCCESS)
        }
        Cmd::Guide => {
            println!("{}", guide::guide_md());
            Ok(std::process::ExitCode::SUCCESS)
        }
        Cmd::Check {
            input,
            max_combinations,
            report_json,
        } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("read input: {}", input.display()))?;
            let options = GenerateOptions {
                source_name: Some(input.display().to_string()),
                max_combinations,
            };
            match compile::check_source(&text, &options) {
                Ok((spec, expansion)) => {
                    if report_json {
                        print_json(&Report::ok())?;
                    } else {
                        println!(
                            "ok: {} ({} args, {} type classes, {} specializations)",
                            spec.name,
                            spec.args.len(),
                            expansion.classes.len(),
                            expansion.table.entries.len()
                        );
                    }
                    Ok(std::process::ExitCode::SUCCESS)
                }
                Err(err) => {
                    if report_json {
                        let diag = err.to_diagnostic(Some(&input.display().to_string()));
                        print_json(&Report::ok().with_diagnostics(vec![diag]))?;
                    } else {
                        eprintln!("{err}");
                    }
                    Ok(std::process::ExitCode::from(1))
                }
            }
        }
        Cmd::Generate {
            input,
            out,
            emit_dispatch_map,
            emit_header,
            max_combinations,
            report_json,
        } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("read input: {}", input.display()))?;
            let source_name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            let options = GenerateOptions {
                source_name: Some(source_name),
                max_combinations,
            };
            let output = match compile::generate_bindings(&text, &options) {
                Ok(output) => output,
                Err(err) => {
                    if report_json {
                        print_json(&MtkcToolReport {
                            schema_version: MTKC_REPORT_SCHEMA_VERSION,
                            command: "generate",
                            ok: false,
                            r#in: input.display().to_string(),
                            diagnostics_count: 1,
                            diagnostics: vec![
                                err.to_diagnostic(Some(&input.display().to_string()))
                            ],
                            exit_code: 1,
                        })?;
                    } else {
                        eprintln!("{err}");
                    }
                    return Ok(std::process::ExitCode::from(1));
                }
            };

            match &out {
                Some(path) => std::fs::write(path, &output.c_src)
                    .with_context(|| format!("write output: {}", path.display()))?,
                None => print!("{}", output.c_src),
            }
            if let Some(path) = &emit_dispatch_map {
                let json = serde_json::to_string_pretty(&output.dispatch_map)
                    .context("serialize dispatch map")?;
                std::fs::write(path, json)
                    .with_context(|| format!("write dispatch map: {}", path.display()))?;
            }
            if let Some(path) = &emit_header {
                std::fs::write(path, runtime::MTK_HOST_H)
                    .with_context(|| format!("write header: {}", path.display()))?;
            }
            if report_json {
                print_json(&MtkcToolReport {
                    schema_version: MTKC_REPORT_SCHEMA_VERSION,
                    command: "generate",
                    ok: true,
                    r#in: input.display().to_string(),
                    diagnostics_count: 0,
                    diagnostics: Vec::new(),
                    exit_code: 0,
                })?;
            } else if out.is_some() {
                eprintln!(
                    "generated {}: {} specializations",
                    output.function, output.stats.combinations
                );
            }
            Ok(std::process::ExitCode::SUCCESS)
        }
        Cmd::Build {
            manifest,
            out_dir,
            emit_dispatch_maps,
            report_json,
        } => {
            let cfg = project::BuildConfig { emit_dispatch_maps };
            let report = project::build_module(&manifest, &out_dir, &cfg)?;
            if report_json {
                print_json(&report)?;
            } else {
                for file in &report.files {
                    if file.ok {
                        println!(
                            "ok: {} -> {} ({} specializations)",
                            file.source,
                            file.out.as_deref().unwrap_or("-"),
                            file.combinations
                        );
                    } else {
                        for d in &file.diagnostics {
                            eprintln!("error: {}: {}", d.code, d.message);
                        }
                    }
                }
            }
            if report.ok {
                Ok(std::process::ExitCode::SUCCESS)
            } else {
                Ok(std::process::ExitCode::from(1))
            }
        }
    }
}
