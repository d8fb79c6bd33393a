use std::path::Path;

use willsuite_eval::{collect_clauses_traced, Diagnostics, UnresolvedPolicy};

use super::{load_answers_or_exit, load_form_or_exit};
use crate::{print_json, OutputFormat};

pub(crate) fn cmd_clauses(
    form_path: &Path,
    answers_path: &Path,
    drop_unresolved: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let form = load_form_or_exit(form_path, output, quiet);
    let answers = load_answers_or_exit(answers_path, output, quiet);
    let policy = if drop_unresolved {
        UnresolvedPolicy::Drop
    } else {
        UnresolvedPolicy::Keep
    };

    let mut diagnostics = Diagnostics::new();
    let clauses = collect_clauses_traced(&form, &answers, policy, &mut diagnostics);
    tracing::info!(count = clauses.len(), "rendered clauses");

    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "clauses": clauses,
            "diagnostics": diagnostics,
        })),
        OutputFormat::Text => {
            for (i, clause) in clauses.iter().enumerate() {
                println!("{}. {}", i + 1, clause.text);
            }
            if !quiet {
                for path in &diagnostics.unresolved_paths {
                    eprintln!("note: unresolved placeholder '{}'", path);
                }
                for reason in &diagnostics.malformed_conditions {
                    eprintln!("note: malformed condition: {}", reason);
                }
            }
        }
    }
}
