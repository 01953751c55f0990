//! Event log observer: traces every event and optionally appends JSON lines

use std::path::{Path, PathBuf};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    events::{Event, EventKind, EventReceiver},
    state::SessionState,
    utils::format_remaining,
};

/// Turns the event stream into log records, tracking the previous state so
/// break starts and completions can be told apart
#[derive(Debug, Default)]
pub struct EventJournal {
    last_state: Option<SessionState>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (name, fields) produced by one event
    pub fn records(&mut self, event: &Event) -> Vec<(&'static str, Value)> {
        match event.kind {
            EventKind::StateChange => self.state_change_records(event),
            EventKind::Progress => Vec::new(),
            EventKind::IdleReset => vec![("idle_reset", json!({ "state": event.state }))],
            EventKind::IdleError => vec![(
                "idle_error",
                json!({ "state": event.state, "message": event.message }),
            )],
        }
    }

    fn state_change_records(&mut self, event: &Event) -> Vec<(&'static str, Value)> {
        let previous = self.last_state.replace(event.state);
        let remaining = format_remaining(event.remaining);
        let mut records = vec![(
            "state_change",
            json!({
                "from": previous,
                "to": event.state,
                "remaining": remaining,
                "strict": event.strict_mode,
            }),
        )];

        if event.state.is_break() {
            records.push((
                "break_start",
                json!({
                    "type": event.state,
                    "remaining": remaining,
                    "strict": event.strict_mode,
                }),
            ));
        }
        if let Some(from) = previous.filter(|s| s.is_break() && event.state == SessionState::Work) {
            records.push(("break_complete", json!({ "from": from })));
        }
        records
    }
}

/// One JSON object per line: `ts`, `event` and the record fields
pub fn format_line(name: &str, fields: Value) -> String {
    let mut payload = Map::new();
    payload.insert(
        "ts".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
    );
    payload.insert("event".to_string(), Value::String(name.to_string()));
    if let Value::Object(fields) = fields {
        payload.extend(fields);
    }
    let mut line = Value::Object(payload).to_string();
    line.push('\n');
    line
}

async fn open_log(path: &Path) -> Result<tokio::fs::File, AppError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| AppError::EventLog {
            path: path.to_path_buf(),
            source,
        })
}

/// Observer task: drains `events` until the keeper stops and the channel closes
pub async fn event_log_task(mut events: EventReceiver, log_path: Option<PathBuf>) {
    info!("Starting event log task");

    let mut file = match &log_path {
        Some(path) => match open_log(path).await {
            Ok(file) => {
                info!("Writing event log to {}", path.display());
                Some(file)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        },
        None => None,
    };

    let mut journal = EventJournal::new();
    while let Some(event) = events.recv().await {
        match event.kind {
            EventKind::Progress => debug!(
                "{} progress {:.0}%, {} left",
                event.state,
                event.progress * 100.0,
                format_remaining(event.remaining)
            ),
            EventKind::StateChange => info!(
                "State changed to {} ({} left, strict={})",
                event.state,
                format_remaining(event.remaining),
                event.strict_mode
            ),
            EventKind::IdleReset => info!("Idle reset while {}", event.state),
            EventKind::IdleError => warn!(
                "Idle detection error: {}",
                event.message.as_deref().unwrap_or("unknown")
            ),
        }

        let Some(out) = file.as_mut() else {
            continue;
        };
        for (name, fields) in journal.records(&event) {
            if let Err(e) = out.write_all(format_line(name, fields).as_bytes()).await {
                warn!("Failed to write event log: {}", e);
            }
        }
    }

    if let Some(mut out) = file {
        if let Err(e) = out.flush().await {
            warn!("Failed to flush event log: {}", e);
        }
    }
    info!("Event stream closed, event log task exiting");
}
