use std::path::Path;
use std::process;

use crate::{read_json_or_exit, report_error, OutputFormat};

static FORM_SCHEMA_STR: &str = include_str!("../../../../docs/form-schema.json");

pub(crate) fn cmd_validate(form_path: &Path, output: OutputFormat, quiet: bool) {
    let schema: serde_json::Value = match serde_json::from_str(FORM_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("internal error: failed to parse embedded form schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("internal error: failed to compile schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc = read_json_or_exit(form_path, "form", output, quiet);
    let errors: Vec<String> = validator
        .iter_errors(&doc)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{{\"valid\": true}}"),
            }
        }
        return;
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("invalid form document");
                for err in &errors {
                    eprintln!("  - {}", err);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "valid": false, "errors": errors });
            eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
    }
    process::exit(1);
}
