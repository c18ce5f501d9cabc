// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::application::{
    open_note, project, AutosaveSettings, CommandDispatcher, EditingSession, NoteLoader,
    NotePersistence, SaveEvent, ToolbarAction,
};
use crate::cli::args::{Args, Command};
use crate::cli::script::{parse_script, ScriptStep};
use crate::domain::{template, DomainError, EditorCommand, NotePayload};
use crate::infrastructure::{media, Config, FileNoteStore, HttpNoteStore, NoteBackend};
use crate::ports::HtmlPresenter;

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting notedit with arguments");

    // Initialize infrastructure
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(store) = &args.store {
        config.store.path = store.display().to_string();
    }
    if let Some(remote) = &args.remote {
        config.store.remote_url = remote.clone();
    }
    let backend = build_backend(&config)?;
    let settings = config.autosave_settings();
    debug!(backend = %backend.describe(), ?settings, "Store selected");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        match args.command {
            Command::New {
                note_id,
                notebook,
                title,
            } => create_note(&backend, &note_id, &notebook, &title).await,
            Command::Show { note_id, json } => show_note(&backend, &note_id, json).await,
            Command::Edit { note_id, script } => {
                edit_note(backend, &note_id, &script, settings).await
            }
            Command::Render { note_id, output } => {
                render_note(&backend, &note_id, output.as_deref()).await
            }
        }
    })
}

pub fn build_backend(config: &Config) -> Result<NoteBackend> {
    Ok(match config.remote_url() {
        Some(url) => NoteBackend::Http(HttpNoteStore::new(url)),
        None => NoteBackend::File(FileNoteStore::new(config.store_dir()?)),
    })
}

pub async fn create_note<S: NoteLoader + NotePersistence>(
    store: &S,
    note_id: &str,
    notebook: &str,
    title: &str,
) -> Result<()> {
    if notebook.trim().is_empty() {
        bail!("A notebook id is required");
    }
    match store.load_note(note_id).await {
        Ok(_) => bail!("Note {note_id} already exists"),
        Err(DomainError::NoteNotFound(_)) => {}
        Err(e) => return Err(e).context("Failed to check for an existing note"),
    }

    let payload = NotePayload {
        title: title.to_string(),
        content: template::getting_started(),
        notebook_id: notebook.to_string(),
    };
    store
        .replace_note(note_id, &payload)
        .await
        .with_context(|| format!("Failed to create note {note_id}"))?;
    info!(note_id, notebook, "Note created");
    println!("{note_id}");
    Ok(())
}

pub async fn show_note<L: NoteLoader>(loader: &L, note_id: &str, json: bool) -> Result<()> {
    let note = open_note(loader, note_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }

    let dispatcher = CommandDispatcher::new(note.content.clone());
    let state = project(&dispatcher);
    let enabled: Vec<String> = ToolbarAction::all()
        .into_iter()
        .filter(|action| state.can(*action))
        .map(|action| action.to_string())
        .collect();

    println!("Title:    {}", note.title);
    println!("Notebook: {}", note.notebook_id.as_deref().unwrap_or("(none)"));
    println!("Blocks:   {}", note.content.text_block_count());
    println!("First:    {}", note.content.first_line());
    println!("Enabled:  {}", enabled.join(", "));
    Ok(())
}

pub async fn render_note<L: NoteLoader>(
    loader: &L,
    note_id: &str,
    output: Option<&Path>,
) -> Result<()> {
    let note = open_note(loader, note_id).await?;
    let html = HtmlPresenter::new().render(&note);
    debug!(bytes = html.len(), "Generated HTML");

    match output {
        Some(path) => {
            std::fs::write(path, &html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(?path, "HTML written");
        }
        None => println!("{html}"),
    }
    Ok(())
}

/// Replays `script` against the note through an autosaving session.
pub async fn edit_note<S: NoteLoader + NotePersistence>(
    store: S,
    note_id: &str,
    script: &Path,
    settings: AutosaveSettings,
) -> Result<()> {
    let source = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps = parse_script(&source)?;
    let note = open_note(&store, note_id).await?;

    let mut session = EditingSession::open(note, Arc::new(store), settings);
    let reporter = tokio::spawn(report_events(session.subscribe()));

    for (index, step) in steps.into_iter().enumerate() {
        debug!(step = index + 1, ?step, "Replaying");
        match step {
            ScriptStep::Command(command) => apply_step(&mut session, index, command),
            ScriptStep::Title(title) => session.set_title(title),
            ScriptStep::Select(selection) => session.select(selection),
            ScriptStep::Image(raw) => match media::image_source(&raw) {
                Ok(src) => apply_step(&mut session, index, EditorCommand::InsertImage { src }),
                Err(e) => warn!(step = index + 1, error = %e, "Image unreadable, step skipped"),
            },
            ScriptStep::Wait(duration) => tokio::time::sleep(duration).await,
        }
    }

    let note = session.close().await;
    if let Err(e) = reporter.await {
        warn!(error = %e, "Event reporter ended abnormally");
    }
    info!(note_id = %note.id, title = %note.title, "Edit finished");
    Ok(())
}

fn apply_step(session: &mut EditingSession, index: usize, command: EditorCommand) {
    let outcome = session.apply(command.clone());
    if !outcome.applicable {
        warn!(step = index + 1, %command, "Step not applicable here, skipped");
    }
}

async fn report_events(mut events: broadcast::Receiver<SaveEvent>) {
    loop {
        match events.recv().await {
            Ok(SaveEvent::Failed { note_id, error }) => {
                eprintln!("warning: saving note {note_id} failed: {error}");
            }
            Ok(SaveEvent::Rejected { note_id, reason }) => {
                eprintln!("warning: note {note_id} not saved: {reason}");
            }
            Ok(event) => debug!(?event, "Save event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Save events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
/// must be public to be used from integration tests
mod tests {
    use crate::util::testing;
    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }
}
