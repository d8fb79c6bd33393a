use std::path::Path;

use willsuite_eval::{field_visibility, progress};

use super::{load_answers_or_exit, load_form_or_exit};
use crate::{print_json, OutputFormat};

pub(crate) fn cmd_eval(form_path: &Path, answers_path: &Path, output: OutputFormat, quiet: bool) {
    let form = load_form_or_exit(form_path, output, quiet);
    let answers = load_answers_or_exit(answers_path, output, quiet);

    let visibility = field_visibility(&form, &answers);
    let progress = progress(&form, &answers);

    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "visibility": visibility,
            "progress": progress,
        })),
        OutputFormat::Text => {
            if quiet {
                return;
            }
            for section in &progress.sections {
                let mark = if section.complete { "complete" } else { "incomplete" };
                println!("[{}] {} ({})", section.index + 1, section.title, mark);
                for id in &section.incomplete_fields {
                    println!("    missing: {}", id);
                }
            }
            let hidden: Vec<&str> = visibility
                .iter()
                .filter(|(_, visible)| !**visible)
                .map(|(id, _)| id.as_str())
                .collect();
            if !hidden.is_empty() {
                println!("hidden: {}", hidden.join(", "));
            }
            match progress.first_incomplete {
                None => println!("form complete"),
                Some(i) => println!("next step: {}", i + 1),
            }
        }
    }
}
