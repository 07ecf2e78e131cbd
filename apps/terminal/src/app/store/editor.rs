use super::AppStore;
use markpad_core::debounce::Debouncer;
use markpad_core::markdown::render_html;
use markpad_core::storage::KeyValueStore;
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EditorEvent {
    Line(String),
    Eof,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) commits: usize,
    pub(crate) discarded: bool,
}

/// Edits one document. Typed text lives in `local_content` and reaches the
/// store only through the debouncer.
pub(crate) struct EditorSession {
    doc_id: String,
    local_content: String,
    debounce: Debouncer<String>,
}

impl EditorSession {
    pub(crate) fn open<S: KeyValueStore>(app: &AppStore<S>) -> Option<Self> {
        let doc = app.documents.active_document()?;
        Some(Self {
            doc_id: doc.id.clone(),
            local_content: doc.content.clone(),
            debounce: Debouncer::new(doc.content.clone(), app.autosave_debounce),
        })
    }

    pub(crate) fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub(crate) fn local_content(&self) -> &str {
        &self.local_content
    }

    pub(crate) fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.debounce.time_until_due(now)
    }

    pub(crate) fn input_line(&mut self, line: &str, now: Instant) {
        self.local_content.push_str(line);
        self.local_content.push('\n');
        self.debounce.update(self.local_content.clone(), now);
    }

    pub(crate) fn clear(&mut self, now: Instant) {
        self.local_content.clear();
        self.debounce.update(String::new(), now);
    }

    /// Commits a settled value. Returns the committed length.
    pub(crate) fn tick<S: KeyValueStore>(
        &mut self,
        now: Instant,
        app: &mut AppStore<S>,
    ) -> Option<usize> {
        let content = self.debounce.poll(now)?;
        self.commit(&content, app)
    }

    /// Commits the pending edit right away.
    pub(crate) fn save<S: KeyValueStore>(&mut self, app: &mut AppStore<S>) -> Option<usize> {
        let content = self.debounce.flush()?;
        self.commit(&content, app)
    }

    pub(crate) fn discard(&mut self) {
        self.debounce.cancel();
    }

    fn commit<S: KeyValueStore>(&mut self, content: &str, app: &mut AppStore<S>) -> Option<usize> {
        if !app.documents.set_content(&self.doc_id, content) {
            tracing::warn!(id = %self.doc_id, "document disappeared while editing");
            return None;
        }
        Some(content.len())
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if self.debounce.is_pending() {
            tracing::debug!(id = %self.doc_id, "dropping pending edit");
        }
        self.debounce.cancel();
    }
}

/// Forwards lines from `input` over a channel so the session loop can wait
/// on input and the debounce deadline at once. The reader owns `input`;
/// nothing else may lock the same stream while it runs.
pub(crate) fn spawn_line_reader<R>(input: R) -> Receiver<EditorEvent>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(EditorEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(EditorEvent::Eof);
    });
    rx
}

/// Runs the edit loop until `:wq`, `:q!` or end of input.
///
/// `:wq` and end of input save the pending edit; `:q!` drops it.
pub(crate) fn run_session<S: KeyValueStore, W: Write>(
    app: &mut AppStore<S>,
    events: Receiver<EditorEvent>,
    out: &mut W,
) -> anyhow::Result<SessionSummary> {
    let Some(mut session) = EditorSession::open(app) else {
        writeln!(out, "{}", super::EMPTY_EDITOR_MESSAGE)?;
        return Ok(SessionSummary::default());
    };
    let mut summary = SessionSummary::default();

    writeln!(
        out,
        "Editing {} ({} bytes). :wq saves and quits, :q! discards, :clear empties, :preview renders.",
        session.doc_id(),
        session.local_content().len()
    )?;

    loop {
        if let Some(bytes) = session.tick(Instant::now(), app) {
            summary.commits += 1;
            writeln!(out, "saved {bytes} bytes")?;
            report_persist_error(app, out)?;
        }

        let event = match session.time_until_due(Instant::now()) {
            Some(wait) => match events.recv_timeout(wait) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => EditorEvent::Eof,
            },
            None => events.recv().unwrap_or(EditorEvent::Eof),
        };

        match event {
            EditorEvent::Line(line) => match line.trim_end() {
                ":wq" => {
                    if let Some(bytes) = session.save(app) {
                        summary.commits += 1;
                        writeln!(out, "saved {bytes} bytes")?;
                    }
                    break;
                }
                ":q!" => {
                    summary.discarded = session.time_until_due(Instant::now()).is_some();
                    session.discard();
                    break;
                }
                ":clear" => session.clear(Instant::now()),
                ":preview" => write!(out, "{}", render_html(session.local_content()))?,
                _ => session.input_line(&line, Instant::now()),
            },
            EditorEvent::Eof => {
                if let Some(bytes) = session.save(app) {
                    summary.commits += 1;
                    writeln!(out, "saved {bytes} bytes")?;
                }
                break;
            }
        }
    }

    report_persist_error(app, out)?;
    Ok(summary)
}

fn report_persist_error<S: KeyValueStore, W: Write>(
    app: &AppStore<S>,
    out: &mut W,
) -> std::io::Result<()> {
    if let Some(err) = app.documents.last_persist_error() {
        writeln!(out, "warning: {err}")?;
    }
    Ok(())
}
