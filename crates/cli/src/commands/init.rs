use std::path::Path;

use willsuite_eval::initial_answers;

use super::load_form_or_exit;
use crate::{print_json, OutputFormat};

pub(crate) fn cmd_init(form_path: &Path, output: OutputFormat, quiet: bool) {
    let form = load_form_or_exit(form_path, output, quiet);
    // the answer store is JSON in both output modes
    print_json(&initial_answers(&form).to_json());
}
