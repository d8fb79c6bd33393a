pub(crate) mod check;
pub(crate) mod clauses;
pub(crate) mod draft;
pub(crate) mod eval;
pub(crate) mod init;
pub(crate) mod merge;
pub(crate) mod people;
pub(crate) mod render;
pub(crate) mod validate;

use std::path::Path;
use std::process;

use willsuite_eval::AnswerStore;
use willsuite_interchange::{from_form_json, FormDocument};

use crate::{read_json_or_exit, report_error, OutputFormat};

/// Load and parse a form document, exiting with status 1 on failure.
pub(crate) fn load_form_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> FormDocument {
    let doc = read_json_or_exit(path, "form", output, quiet);
    match from_form_json(&doc) {
        Ok(form) => form,
        Err(e) => {
            report_error(&format!("error: {}: {}", path.display(), e), output, quiet);
            process::exit(1);
        }
    }
}

/// Load an answers file, exiting with status 1 on failure.
pub(crate) fn load_answers_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> AnswerStore {
    let doc = read_json_or_exit(path, "answers", output, quiet);
    match AnswerStore::from_json(&doc) {
        Ok(answers) => answers,
        Err(e) => {
            report_error(&format!("error: {}: {}", path.display(), e), output, quiet);
            process::exit(1);
        }
    }
}
