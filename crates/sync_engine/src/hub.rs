//! Sensor hub facade.
//!
//! One read cycle serves queued synthetic records first, then tops up the
//! input reader and runs events through the demultiplexer, flushing a frame
//! on every sync marker until the output buffer is full or the queue is empty.

use std::sync::Arc;

use contracts::{
    CalibrationStore, Clock, ControlChannel, HubConfig, HubError, InputDevice, InputEventType,
    SensorHandle, SensorKind, SensorRecord,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::aggregator::flush_frame;
use crate::control::HubControl;
use crate::demux::{Demultiplexer, DemuxOutcome};
use crate::reader::InputReader;
use crate::sampler::InitialStateSampler;
use crate::slots::SlotTable;

const NS_PER_MS: i64 = 1_000_000;

/// Sensor hub
pub struct SensorHub {
    config: HubConfig,
    device: Box<dyn InputDevice>,
    control: Arc<HubControl>,
    clock: Box<dyn Clock>,
    table: SlotTable,
    demux: Demultiplexer,
    sampler: InitialStateSampler,
    reader: InputReader,
}

impl std::fmt::Debug for SensorHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorHub")
            .field("enabled", &self.table.enabled())
            .field("pending", &self.table.pending())
            .field("synthetic", &self.sampler.pending())
            .field("reader", &self.reader)
            .finish_non_exhaustive()
    }
}

impl SensorHub {
    /// Build a hub with its own control context
    pub fn new(
        config: HubConfig,
        device: Box<dyn InputDevice>,
        channel: Box<dyn ControlChannel>,
        store: Box<dyn CalibrationStore>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, HubError> {
        let control = Arc::new(HubControl::new(channel, store, config.calibration.clone()));
        Self::with_control(config, device, control, clock)
    }

    /// Build a hub on a shared control context
    ///
    /// Loads persisted calibration (when configured) and enables the startup
    /// sensors before returning.
    pub fn with_control(
        config: HubConfig,
        device: Box<dyn InputDevice>,
        control: Arc<HubControl>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, HubError> {
        let mut hub = Self {
            demux: Demultiplexer::new(config.scale),
            reader: InputReader::new(config.input_queue_len),
            table: SlotTable::new(),
            sampler: InitialStateSampler::new(),
            config,
            device,
            control,
            clock,
        };

        if hub.config.calibration.load_on_start {
            let load = hub.control.transaction()?.load_persisted_calibration();
            debug!(
                magnetic = load.magnetic,
                accelerometer = load.accelerometer,
                "persisted calibration load finished"
            );
        }

        for kind in hub.config.startup_enable.clone() {
            hub.enable_kind(kind, true)?;
        }

        info!(
            queue_len = hub.reader.capacity(),
            enabled = ?hub.table.enabled(),
            "sensor hub ready"
        );
        Ok(hub)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn control(&self) -> &Arc<HubControl> {
        &self.control
    }

    /// Fill `out` with complete records
    ///
    /// Returns the number written. An empty `out` is rejected with
    /// [`HubError::InvalidArgument`].
    #[instrument(
        level = "trace",
        name = "hub_read_events",
        skip(self, out),
        fields(capacity = out.len())
    )]
    pub fn read_events(&mut self, out: &mut [SensorRecord]) -> Result<usize, HubError> {
        if out.is_empty() {
            return Err(HubError::invalid_argument("output buffer has zero capacity"));
        }

        let now = self.clock.now_ns();
        let mut written = self.sampler.drain(&mut self.table, now, out);
        if written == out.len() {
            observability::record_read_batch(&out[..written]);
            return Ok(written);
        }

        if self.config.debug_fill_block {
            debug!(queued = self.reader.len(), "before input fill");
        }
        let filled = self.reader.fill(self.device.as_mut());
        if self.config.debug_fill_block {
            debug!(result = ?filled, queued = self.reader.len(), "after input fill");
        }
        if let Err(e) = filled {
            if written == 0 {
                return Err(HubError::Io(e));
            }
            warn!(error = %e, written, "input fill failed, returning synthetic records only");
            observability::record_read_batch(&out[..written]);
            return Ok(written);
        }

        while written < out.len() {
            let Some(event) = self.reader.next() else {
                break;
            };

            match event.event_type {
                InputEventType::Absolute => {
                    let outcome = self.demux.apply_abs(&mut self.table, event.code, event.value);
                    if outcome == DemuxOutcome::Unknown {
                        warn!(code = event.code, value = event.value, "unknown absolute event code");
                        observability::record_unknown_event("abs");
                    }
                }
                InputEventType::Relative => {
                    let outcome = self.demux.apply_rel(&mut self.table, event.code, event.value);
                    if outcome == DemuxOutcome::Unknown {
                        warn!(code = event.code, value = event.value, "unknown relative event code");
                        observability::record_unknown_event("rel");
                    }
                }
                InputEventType::Sync => {
                    let frame = flush_frame(&mut self.table, event.timestamp_ns(), &mut out[written..]);
                    written += frame.emitted;
                    for kind in frame.stale.iter() {
                        observability::record_stale_update_dropped(kind);
                    }
                    // applied before the next event so a re-fire in this batch is dropped
                    for kind in frame.self_disable.iter() {
                        self.disable_one_shot(kind);
                    }
                }
                InputEventType::Other(raw) => {
                    warn!(event_type = raw, code = event.code, "unknown input event type");
                    observability::record_unknown_event("other");
                }
            }
        }

        trace!(written, queued = self.reader.len(), "read cycle done");
        observability::record_read_batch(&out[..written]);
        Ok(written)
    }

    fn disable_one_shot(&mut self, kind: SensorKind) {
        debug!(kind = %kind, "one-shot sensor fired, disabling");
        if let Err(e) = self.enable_kind(kind, false) {
            warn!(kind = %kind, error = %e, "self-disable failed");
        }
    }

    /// Enable or disable the sensor behind `handle`
    ///
    /// Control-file failures are logged and absorbed. The enabled bit follows
    /// the request whenever the control file could be opened, even if the
    /// write itself failed.
    #[instrument(level = "debug", skip(self), fields(handle = handle.0))]
    pub fn set_enable(&mut self, handle: SensorHandle, on: bool) -> Result<(), HubError> {
        let kind = resolve(handle)?;
        self.enable_kind(kind, on)
    }

    /// [`SensorHub::set_enable`] by kind
    pub fn enable_kind(&mut self, kind: SensorKind, on: bool) -> Result<(), HubError> {
        let control = Arc::clone(&self.control);
        let mut tx = control.transaction()?;

        let was_enabled = self.table.is_enabled(kind);
        let descriptor_obtained = match tx.write_enable(kind, on) {
            Ok(()) => true,
            Err(fault) => fault.descriptor_obtained(),
        };

        if descriptor_obtained {
            if on && !was_enabled && kind.supports_initial_state() {
                self.sampler
                    .sample(kind, &mut self.table, self.device.as_ref(), self.demux.scale());
            }
            self.table.set_enabled(kind, on);
            if was_enabled != on {
                info!(kind = %kind, on, "sensor state changed");
            }
        }

        if !on && kind.saves_magnetic_calibration() && tx.persist_magnetic_calibration().is_err() {
            debug!(kind = %kind, "magnetic calibration not saved");
        }

        Ok(())
    }

    /// Set the sampling interval of the sensor behind `handle`
    ///
    /// The interval is written in whole milliseconds; a failed write is
    /// logged and ignored.
    #[instrument(level = "debug", skip(self), fields(handle = handle.0))]
    pub fn set_delay(&self, handle: SensorHandle, delay_ns: i64) -> Result<(), HubError> {
        let kind = resolve(handle)?;
        if delay_ns < 0 {
            return Err(HubError::invalid_argument(format!(
                "negative sampling interval {delay_ns} ns"
            )));
        }

        let interval_ms = delay_ns / NS_PER_MS;
        let mut tx = self.control.transaction()?;
        if tx.write_delay(kind, interval_ms).is_ok() {
            debug!(kind = %kind, interval_ms, "sampling interval set");
        }
        Ok(())
    }

    /// Whether `handle` is enabled; unknown handles are not
    pub fn is_enabled(&self, handle: SensorHandle) -> bool {
        SensorKind::from_handle(handle).is_some_and(|kind| self.table.is_enabled(kind))
    }

    /// Whether a synthetic record is waiting to be served
    pub fn has_pending_events(&self) -> bool {
        self.sampler.has_pending()
    }

    /// Enabled kinds in slot order
    pub fn enabled_kinds(&self) -> Vec<SensorKind> {
        self.table.enabled().iter().collect()
    }

    /// Slots with updates not yet committed by a sync marker
    pub fn pending_kinds(&self) -> Vec<SensorKind> {
        self.table.pending().iter().collect()
    }

    /// Events pulled from the device but not yet processed
    pub fn queued_events(&self) -> usize {
        self.reader.len()
    }
}

impl Drop for SensorHub {
    fn drop(&mut self) {
        let enabled: Vec<SensorKind> = self.table.enabled().iter().collect();
        if enabled.is_empty() {
            return;
        }

        match self.control.transaction() {
            Ok(mut tx) => {
                for &kind in &enabled {
                    // failures are logged by the transaction
                    let _ = tx.write_enable(kind, false);
                    self.table.set_enabled(kind, false);
                }
                if enabled.iter().any(|kind| kind.saves_magnetic_calibration())
                    && tx.persist_magnetic_calibration().is_err()
                {
                    debug!("magnetic calibration not saved on teardown");
                }
                debug!("all sensors disabled on teardown");
            }
            Err(e) => warn!(error = %e, "cannot disable sensors on teardown"),
        }
    }
}

fn resolve(handle: SensorHandle) -> Result<SensorKind, HubError> {
    SensorKind::from_handle(handle).ok_or(HubError::InvalidHandle { handle: handle.0 })
}
