use std::path::{Path, PathBuf};
use std::process;

use willsuite_interchange::{from_form_json, merge_documents};

use crate::{print_json, read_json_or_exit, report_error, OutputFormat};

pub(crate) fn cmd_merge(inputs: &[PathBuf], out: Option<&Path>, output: OutputFormat, quiet: bool) {
    let docs: Vec<serde_json::Value> = inputs
        .iter()
        .map(|p| read_json_or_exit(p, "form", output, quiet))
        .collect();
    let merged = merge_documents(docs);

    // the merged result must still be a usable form
    if let Err(e) = from_form_json(&merged) {
        report_error(&format!("error: merged document is not a valid form: {}", e), output, quiet);
        process::exit(1);
    }

    match out {
        None => print_json(&merged),
        Some(path) => {
            let text = serde_json::to_string_pretty(&merged)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            if let Err(e) = std::fs::write(path, text + "\n") {
                let msg = format!("error writing '{}': {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
            if !quiet {
                match output {
                    OutputFormat::Text => {
                        println!("merged {} documents into {}", inputs.len(), path.display())
                    }
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "merged": inputs.len(),
                        "out": path.display().to_string(),
                    })),
                }
            }
        }
    }
}
