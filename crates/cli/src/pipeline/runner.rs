//! Hub runner - opens the device, enables sensors and polls records.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{HubConfig, SensorKind, SensorPayload, SensorRecord};
use ingestion::{EvdevDevice, FileCalibrationStore, MonotonicClock, SysfsControl};
use sync_engine::SensorHub;
use tracing::{debug, info};

use super::RunStats;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Hub configuration
    pub hub: HubConfig,

    /// Sensors enabled before polling starts (on top of `startup_enable`)
    pub enable: Vec<SensorKind>,

    /// Maximum number of records (None = unlimited)
    pub max_records: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Record buffer capacity per read
    pub buffer: usize,

    /// Sleep between reads that returned nothing
    pub poll_interval: Duration,

    /// Print JSON lines instead of text
    pub json: bool,
}

/// Cooperative stop flag shared with the signal handler
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Blocking poll loop around a [`SensorHub`]
pub struct HubRunner {
    config: RunnerConfig,
    stop: StopHandle,
}

impl HubRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Open the hub from its configuration and poll it until a limit or a stop request
    pub fn run(self) -> Result<RunStats> {
        let hub = open_hub(&self.config.hub)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.poll(hub, &mut out)
    }

    /// Poll an already built hub, writing records to `out`
    pub fn poll<W: Write>(&self, mut hub: SensorHub, out: &mut W) -> Result<RunStats> {
        let start = Instant::now();

        for kind in &self.config.enable {
            hub.set_enable(kind.handle(), true)
                .with_context(|| format!("Failed to enable {kind}"))?;
        }
        info!(enabled = ?hub.enabled_kinds(), "Polling sensor hub");

        let mut buffer = vec![SensorRecord::default(); self.config.buffer.max(1)];
        let mut stats = RunStats::default();

        loop {
            if self.stop.is_requested() {
                info!("Stop requested");
                break;
            }
            if self.config.timeout.is_some_and(|t| start.elapsed() >= t) {
                info!("Timeout reached");
                break;
            }

            let n = hub.read_events(&mut buffer).context("Failed to read sensor events")?;
            stats.metrics.update(&buffer[..n]);
            for record in &buffer[..n] {
                write_record(out, record, self.config.json)?;
            }
            stats.records += n as u64;

            if self.config.max_records.is_some_and(|max| stats.records >= max) {
                info!(records = stats.records, "Record limit reached");
                break;
            }
            if n == 0 && !hub.has_pending_events() {
                std::thread::sleep(self.config.poll_interval);
            }
        }

        out.flush().context("Failed to flush output")?;
        stats.enabled = hub.enabled_kinds();
        stats.duration = start.elapsed();
        debug!(queued = hub.queued_events(), "Poll loop finished");
        Ok(stats)
    }
}

fn open_hub(config: &HubConfig) -> Result<SensorHub> {
    let device = EvdevDevice::open(&config.device.input_path).with_context(|| {
        format!(
            "Failed to open input device {}",
            config.device.input_path.display()
        )
    })?;
    let control = SysfsControl::open(&config.device.sysfs_root).with_context(|| {
        format!(
            "Failed to open control directory {}",
            config.device.sysfs_root.display()
        )
    })?;

    SensorHub::new(
        config.clone(),
        Box::new(device),
        Box::new(control),
        Box::new(FileCalibrationStore),
        Box::new(MonotonicClock),
    )
    .context("Failed to initialize sensor hub")
}

fn write_record<W: Write>(out: &mut W, record: &SensorRecord, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(out, "{line}")?;
        return Ok(());
    }

    write!(out, "{:>16} {:<28} ", record.timestamp, record.kind)?;
    match record.payload {
        SensorPayload::Vector(v) => writeln!(
            out,
            "x={:.4} y={:.4} z={:.4} status={}",
            v.x, v.y, v.z, v.status
        )?,
        SensorPayload::RotationVector(q) => writeln!(
            out,
            "x={:.4} y={:.4} z={:.4} w={:.4}",
            q.x, q.y, q.z, q.w
        )?,
        SensorPayload::Uncalibrated(u) => writeln!(
            out,
            "uncalib={:?} bias={:?}",
            u.uncalib, u.bias
        )?,
        SensorPayload::Scalar { value } => writeln!(out, "value={value:.4}")?,
        SensorPayload::StepCount { steps } => writeln!(out, "steps={steps}")?,
    }
    Ok(())
}
