use std::path::Path;
use std::process;

use willsuite_storage::{DraftStorage, FsDraftStorage, StorageError};

use crate::{print_json, read_json_or_exit, report_error, DraftCommands, OutputFormat};

pub(crate) fn cmd_draft(command: DraftCommands, dir: &Path, output: OutputFormat, quiet: bool) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("error: cannot start runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let storage = FsDraftStorage::new(dir);
    if let Err(e) = rt.block_on(run(command, &storage, output, quiet)) {
        report_error(&format!("error: {}", e), output, quiet);
        process::exit(1);
    }
}

async fn run(
    command: DraftCommands,
    storage: &FsDraftStorage,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), StorageError> {
    match command {
        DraftCommands::Save { id, answers, etag } => {
            let answers = read_json_or_exit(&answers, "answers", output, quiet);
            if !answers.is_object() {
                report_error("error: answers must be a JSON object", output, quiet);
                process::exit(1);
            }
            let record = storage.save_draft(&id, answers, etag.as_deref()).await?;
            tracing::info!(draft_id = %record.draft_id, "draft saved");
            match output {
                OutputFormat::Json => print_json(&serde_json::json!(record.summary())),
                OutputFormat::Text => {
                    if !quiet {
                        println!("saved {} (etag {})", record.draft_id, record.etag);
                    }
                }
            }
        }
        DraftCommands::Load { id } => {
            let record = storage.load_draft(&id).await?;
            match output {
                OutputFormat::Json => print_json(&serde_json::json!(record)),
                OutputFormat::Text => print_json(&record.answers),
            }
        }
        DraftCommands::List => {
            let drafts = storage.list_drafts().await?;
            match output {
                OutputFormat::Json => print_json(&serde_json::json!(drafts)),
                OutputFormat::Text => {
                    for d in &drafts {
                        println!("{}  {}  {}", d.draft_id, d.saved_at, d.etag);
                    }
                }
            }
        }
        DraftCommands::Delete { id } => {
            storage.delete_draft(&id).await?;
            if !quiet {
                match output {
                    OutputFormat::Json => {
                        print_json(&serde_json::json!({ "deleted": id }))
                    }
                    OutputFormat::Text => println!("deleted {}", id),
                }
            }
        }
    }
    Ok(())
}
