//! FileSink - writes updates to disk as JSON lines, one file per update kind

use contracts::{PipelineError, PipelineUpdate, UpdateSink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// Sink that appends updates as JSON lines under a per-run directory
pub struct FileSink {
    name: String,
    run_dir: PathBuf,
    writers: HashMap<&'static str, BufWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink
    ///
    /// Output lands in `<base_path>/run-<utc timestamp>/<kind>.jsonl`.
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let run_dir = config.base_path.join(format!("run-{stamp}"));
        fs::create_dir_all(&run_dir)?;

        Ok(Self {
            name: name.into(),
            run_dir,
            writers: HashMap::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    /// Directory this run writes into
    pub fn run_dir(&self) -> &PathBuf {
        &self.run_dir
    }

    fn writer_for(&mut self, kind: &'static str) -> std::io::Result<&mut BufWriter<File>> {
        use std::collections::hash_map::Entry;
        match self.writers.entry(kind) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.run_dir.join(format!("{kind}.jsonl"));
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(entry.insert(BufWriter::new(file)))
            }
        }
    }

    fn write_line(&mut self, update: &PipelineUpdate) -> std::io::Result<()> {
        let line = serde_json::to_string(update)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let writer = self.writer_for(update.kind())?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

impl UpdateSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, update),
        fields(sink = %self.name, kind = update.kind())
    )]
    async fn write(&mut self, update: &PipelineUpdate) -> Result<(), PipelineError> {
        self.write_line(update)
            .map_err(|e| PipelineError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), PipelineError> {
        for writer in self.writers.values_mut() {
            writer
                .flush()
                .map_err(|e| PipelineError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), PipelineError> {
        for (_, mut writer) in self.writers.drain() {
            writer
                .flush()
                .map_err(|e| PipelineError::sink_write(&self.name, e.to_string()))?;
        }
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
