use std::path::Path;
use std::process;

use willsuite_eval::{analyze_form, Severity};

use super::load_form_or_exit;
use crate::{print_json, OutputFormat};

pub(crate) fn cmd_check(form_path: &Path, output: OutputFormat, quiet: bool) {
    let form = load_form_or_exit(form_path, output, quiet);
    let findings = analyze_form(&form);
    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = findings.len() - errors;

    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "findings": findings,
            "errors": errors,
            "warnings": warnings,
        })),
        OutputFormat::Text => {
            if !quiet {
                for f in &findings {
                    match &f.field_id {
                        Some(id) => println!("{} [{}]: {}", f.severity.as_str(), id, f.message),
                        None => println!("{}: {}", f.severity.as_str(), f.message),
                    }
                }
                println!("{} error(s), {} warning(s)", errors, warnings);
            }
        }
    }

    if errors > 0 {
        process::exit(1);
    }
}
