use std::path::Path;
use std::process;

use willsuite_eval::{render_traced, Diagnostics};

use super::load_answers_or_exit;
use crate::{print_json, report_error, OutputFormat};

pub(crate) fn cmd_render(
    template: Option<&str>,
    template_file: Option<&Path>,
    answers_path: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let template = match (template, template_file) {
        (Some(t), _) => t.to_string(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                let msg = format!("error reading template file '{}': {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
        (None, None) => {
            report_error(
                "error: provide a template or --template-file",
                output,
                quiet,
            );
            process::exit(1);
        }
    };
    let answers = load_answers_or_exit(answers_path, output, quiet);

    let mut diagnostics = Diagnostics::new();
    let text = render_traced(&template, &answers, &mut diagnostics);

    match output {
        OutputFormat::Text => {
            println!("{}", text);
            if !quiet {
                for path in &diagnostics.unresolved_paths {
                    eprintln!("note: unresolved placeholder '{}'", path);
                }
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "text": text,
            "diagnostics": diagnostics,
        })),
    }
}
