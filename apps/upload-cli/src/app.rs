//! Upload and status commands.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use searchhub_protocol::RemoteProgress;
use searchhub_transfer::{FileSubject, ProgressCallback};
use searchhub_uploader::{
    HttpStore, RemoteStore, SessionNegotiator, UploadController, UploadError, UploadHandle,
    UploadOutcome, UploadState,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;

/// Uploads `file`, pausing on Ctrl-C and resuming on Enter.
pub async fn upload(
    config: &Config,
    file: &Path,
    folder: Option<String>,
    add_to_index: bool,
) -> anyhow::Result<()> {
    let subject = FileSubject::open(file)
        .await
        .with_context(|| format!("cannot open {}", file.display()))?;
    let store: Arc<dyn RemoteStore> = Arc::new(HttpStore::with_timeout(
        config.server_url.clone(),
        config.request_timeout(),
    )?);

    let options = config.upload_options(folder, add_to_index);
    let mut controller = UploadController::new(store, Box::new(subject), options)?;
    let handle = controller.handle();

    tracing::info!(
        file = %file.display(),
        chunks = controller.plan().len(),
        server = %config.server_url,
        "starting upload"
    );

    let interrupts = tokio::spawn(watch_interrupts(handle.clone()));
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    let mut result = controller.upload(Some(progress_printer())).await;
    let result = loop {
        match result {
            Err(UploadError::Paused) => {
                eprintln!("\npaused; press Enter to resume or Ctrl-C to cancel");
                tokio::select! {
                    line = stdin.next_line() => {
                        // Without a terminal there is nobody to resume.
                        if !matches!(line, Ok(Some(_))) {
                            handle.cancel();
                        }
                    }
                    _ = handle.cancelled() => {}
                }
                result = controller.resume(Some(progress_printer())).await;
            }
            other => break other,
        }
    };
    interrupts.abort();
    eprintln!();

    let outcome = result?;
    for line in describe_outcome(&outcome) {
        println!("{line}");
    }
    Ok(())
}

/// Prints the server-side progress of a session.
pub async fn status(config: &Config, upload_id: &str) -> anyhow::Result<()> {
    let store = HttpStore::with_timeout(config.server_url.clone(), config.request_timeout())?;
    let progress = SessionNegotiator::new(&store)
        .query_progress(upload_id)
        .await?;
    println!("{}", describe_progress(upload_id, &progress));
    Ok(())
}

/// First Ctrl-C pauses, the next one cancels.
async fn watch_interrupts(handle: UploadHandle) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if handle.is_paused() || handle.state() == UploadState::Paused {
            tracing::info!("cancelling upload");
            handle.cancel();
            return;
        }
        tracing::info!("pausing after the current batch");
        handle.pause();
    }
}

fn progress_printer() -> ProgressCallback {
    Box::new(|percentage: f64, phase: &str| {
        eprint!("\r{phase}: {percentage:5.1}%");
        let _ = std::io::stderr().flush();
    })
}

fn describe_outcome(outcome: &UploadOutcome) -> Vec<String> {
    let mut lines = vec![outcome.message.clone()];
    if outcome.instant {
        lines.push(format!("fingerprint: {}", outcome.fingerprint));
        return lines;
    }
    if let Some(path) = &outcome.file_path {
        lines.push(format!("stored at: {path}"));
    }
    match outcome.indexed {
        Some(true) => lines.push("search index: registered".into()),
        Some(false) => lines.push("search index: registration failed".into()),
        None => {}
    }
    if let Some(output) = outcome.parse_output.as_deref().filter(|o| !o.is_empty()) {
        lines.push(format!("parser output:\n{output}"));
    }
    if outcome.multimodal_indexed == Some(true) {
        lines.push("multimodal index: updated".into());
    }
    lines
}

fn describe_progress(upload_id: &str, progress: &RemoteProgress) -> String {
    format!(
        "{upload_id}: {}/{} chunks, {}/{} bytes ({:.1}%){}",
        progress.uploaded_chunks,
        progress.total_chunks,
        progress.uploaded_size,
        progress.total_size,
        progress.percentage(),
        if progress.completed { ", completed" } else { "" }
    )
}
