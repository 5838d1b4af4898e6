use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use org_recur::{ChangeBatch, EngineConfig, Host, HostAction, RepeatEngine};
use tracing::{info, warn};

const NOW_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub(crate) input: Option<PathBuf>,
    pub(crate) engine: EngineConfig,
    pub(crate) now: Option<NaiveDateTime>,
}

impl AppConfig {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("ORG_RECUR_INPUT") {
            config.input = Some(PathBuf::from(path));
        }
        if let Ok(margin) = std::env::var("ORG_RECUR_COMPLETION_MARGIN_SECS") {
            match margin.trim().parse::<i64>() {
                Ok(value) if value >= 0 => config.engine.completion_margin_secs = value,
                _ => warn!(%margin, "ignoring invalid completion margin"),
            }
        }
        if let Ok(cap) = std::env::var("ORG_RECUR_MAX_CYCLE_ITERATIONS") {
            match cap.trim().parse::<u32>() {
                Ok(value) => config.engine.max_cycle_iterations = value,
                Err(_) => warn!(%cap, "ignoring invalid cycle iteration cap"),
            }
        }
        if let Ok(dialect) = std::env::var("ORG_RECUR_DIALECT") {
            let dialect = dialect.trim();
            if !dialect.is_empty() {
                config.engine.dialect = dialect.to_string();
            }
        }
        if let Ok(now) = std::env::var("ORG_RECUR_NOW") {
            match parse_now(&now) {
                Some(value) => config.now = Some(value),
                None => warn!(%now, "ignoring invalid clock override, expected YYYY-MM-DD HH:MM"),
            }
        }
        Ok(config)
    }

    /// The first positional argument names the batch file.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        if let Some(path) = args.into_iter().next() {
            self.input = Some(PathBuf::from(path));
        }
        self
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

pub(crate) fn parse_now(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), NOW_FORMAT).ok()
}

/// Prints every host action as one JSON line.
pub struct JsonLinesHost<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesHost<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    fn emit(&mut self, action: HostAction) {
        let result = serde_json::to_writer(&mut self.out, &action)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => warn!(%err, "failed to write host action"),
        }
    }
}

impl<W: Write> Host for JsonLinesHost<W> {
    fn update_block(&mut self, uuid: &str, content: &str) {
        self.emit(HostAction::UpdateBlock {
            uuid: uuid.to_string(),
            content: content.to_string(),
        });
    }

    fn show_message(&mut self, text: &str) {
        self.emit(HostAction::ShowMessage {
            text: text.to_string(),
        });
    }
}

/// Decodes one change batch from `input` and writes the resulting actions to `output`.
pub fn replay(config: &AppConfig, mut input: impl Read, output: impl Write) -> Result<usize> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .context("failed to read change batch")?;
    let batch: ChangeBatch =
        serde_json::from_str(&raw).context("failed to decode change batch")?;

    let engine = RepeatEngine::new(config.engine.clone());
    let mut host = JsonLinesHost::new(output);
    engine.dispatch(&batch, config.now(), &mut host);
    info!(
        blocks = batch.blocks.len(),
        actions = host.written(),
        "replayed change batch"
    );
    Ok(host.written())
}

pub fn run(config: AppConfig) -> Result<()> {
    let stdout = io::stdout();
    match &config.input {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            replay(&config, file, stdout.lock())?;
        }
        None => {
            replay(&config, io::stdin().lock(), stdout.lock())?;
        }
    }
    Ok(())
}
