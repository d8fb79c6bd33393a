use std::path::Path;

use willsuite_eval::people::{all_people, autofill_options};

use super::load_answers_or_exit;
use crate::{print_json, OutputFormat};

pub(crate) fn cmd_people(answers_path: &Path, output: OutputFormat, quiet: bool) {
    let answers = load_answers_or_exit(answers_path, output, quiet);
    let people = all_people(&answers);
    let autofill = autofill_options(&answers);

    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "people": people,
            "autofill": autofill,
        })),
        OutputFormat::Text => {
            for p in &people {
                match &p.id {
                    Some(id) => println!("{}  ({}, id {})", p.label, p.source, id),
                    None => println!("{}  ({})", p.label, p.source),
                }
            }
            if !quiet && !autofill.is_empty() {
                println!("autofill: {}", autofill.join(", "));
            }
        }
    }
}
