//! Mock 协作者
//!
//! 用于无硬件环境的测试。所有 mock 都是共享句柄：clone 一份交给 hub，
//! 测试保留另一份用于注入事件和检查写入。

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    AbsQuery, CalibrationKind, CalibrationStore, Clock, ControlChannel, ControlFault, EventSource,
    HubError, RawInputEvent,
};
use tracing::trace;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct DeviceState {
    queue: VecDeque<RawInputEvent>,
    abs: HashMap<u16, i32>,
    read_calls: usize,
    fail_next_read: Option<io::ErrorKind>,
}

/// Mock 输入设备
///
/// 事件按注入顺序读出；`query_abs` 只对通过 [`MockInputDevice::set_abs`]
/// 设置过的代码成功。
#[derive(Debug, Clone, Default)]
pub struct MockInputDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MockInputDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注入一个事件
    pub fn push(&self, event: RawInputEvent) {
        lock(&self.state).queue.push_back(event);
    }

    /// 按顺序注入多个事件
    pub fn push_all(&self, events: impl IntoIterator<Item = RawInputEvent>) {
        lock(&self.state).queue.extend(events);
    }

    /// 设置轴的当前值
    pub fn set_abs(&self, code: u16, value: i32) {
        lock(&self.state).abs.insert(code, value);
    }

    /// 让轴查询失败
    pub fn clear_abs(&self, code: u16) {
        lock(&self.state).abs.remove(&code);
    }

    /// 下一次读取返回错误
    pub fn fail_next_read(&self, kind: io::ErrorKind) {
        lock(&self.state).fail_next_read = Some(kind);
    }

    /// 尚未被读走的事件数
    pub fn queued(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// `read_into` 调用次数
    pub fn read_calls(&self) -> usize {
        lock(&self.state).read_calls
    }
}

impl EventSource for MockInputDevice {
    fn read_into(&mut self, buf: &mut [RawInputEvent]) -> io::Result<usize> {
        let mut state = lock(&self.state);
        state.read_calls += 1;

        if let Some(kind) = state.fail_next_read.take() {
            return Err(io::Error::from(kind));
        }

        let count = buf.len().min(state.queue.len());
        for (slot, event) in buf.iter_mut().zip(state.queue.drain(..count)) {
            *slot = event;
        }
        trace!(count, "mock events read");
        Ok(count)
    }
}

impl AbsQuery for MockInputDevice {
    fn query_abs(&self, code: u16) -> io::Result<i32> {
        lock(&self.state)
            .abs
            .get(&code)
            .copied()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// 一次控制写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWrite {
    Enable { slot: usize, enabled: bool },
    Delay { slot: usize, interval_ms: i64 },
}

/// 控制通道故障注入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    /// 打不开控制文件
    Unavailable,
    /// 打开成功但写入失败
    WriteFailed,
}

#[derive(Debug, Default)]
struct ControlState {
    writes: Vec<ControlWrite>,
    attempts: usize,
    fault: Option<FaultMode>,
}

/// 记录型控制通道
#[derive(Debug, Clone)]
pub struct RecordingControl {
    state: Arc<Mutex<ControlState>>,
    root: PathBuf,
}

impl Default for RecordingControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingControl {
    pub const ROOT: &'static str = "/mock/sensor_hub";

    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            root: PathBuf::from(Self::ROOT),
        }
    }

    /// 成功的写入，按时间顺序
    pub fn writes(&self) -> Vec<ControlWrite> {
        lock(&self.state).writes.clone()
    }

    /// 成功的 enable 写入
    pub fn enable_writes(&self) -> Vec<(usize, bool)> {
        lock(&self.state)
            .writes
            .iter()
            .filter_map(|w| match *w {
                ControlWrite::Enable { slot, enabled } => Some((slot, enabled)),
                ControlWrite::Delay { .. } => None,
            })
            .collect()
    }

    /// 所有写入尝试次数（含失败）
    pub fn attempts(&self) -> usize {
        lock(&self.state).attempts
    }

    /// 设置或清除故障
    pub fn set_fault(&self, fault: Option<FaultMode>) {
        lock(&self.state).fault = fault;
    }

    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.writes.clear();
        state.attempts = 0;
    }

    fn record(&self, write: ControlWrite) -> Result<(), ControlFault> {
        let mut state = lock(&self.state);
        state.attempts += 1;
        match state.fault {
            Some(FaultMode::Unavailable) => Err(ControlFault::Unavailable(io::Error::from(
                io::ErrorKind::NotFound,
            ))),
            Some(FaultMode::WriteFailed) => Err(ControlFault::WriteFailed(io::Error::from(
                io::ErrorKind::BrokenPipe,
            ))),
            None => {
                state.writes.push(write);
                Ok(())
            }
        }
    }
}

impl ControlChannel for RecordingControl {
    fn write_enable(&mut self, slot: usize, enabled: bool) -> Result<(), ControlFault> {
        self.record(ControlWrite::Enable { slot, enabled })
    }

    fn write_delay_ms(&mut self, slot: usize, interval_ms: i64) -> Result<(), ControlFault> {
        self.record(ControlWrite::Delay { slot, interval_ms })
    }

    fn attribute_path(&self, attribute: &str) -> PathBuf {
        self.root.join(attribute)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    files: HashMap<PathBuf, Vec<i32>>,
    fail_writes: bool,
}

/// 内存校准存储
///
/// 读取时与文本存储一样校验长度：不足 `value_count()` 的数据被拒绝。
#[derive(Debug, Clone, Default)]
pub struct MemoryCalibrationStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryCalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, values: Vec<i32>) {
        lock(&self.state).files.insert(path.into(), values);
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<i32>> {
        lock(&self.state).files.get(path.as_ref()).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }
}

impl CalibrationStore for MemoryCalibrationStore {
    fn read(&mut self, kind: CalibrationKind, path: &Path) -> Result<Vec<i32>, HubError> {
        let state = lock(&self.state);
        let values = state
            .files
            .get(path)
            .ok_or_else(|| HubError::Io(io::Error::from(io::ErrorKind::NotFound)))?;

        let expected = kind.value_count();
        if values.len() < expected {
            return Err(HubError::calibration(
                kind,
                format!("expected {expected} values, got {}", values.len()),
            ));
        }
        Ok(values[..expected].to_vec())
    }

    fn write(&mut self, kind: CalibrationKind, path: &Path, values: &[i32]) -> Result<(), HubError> {
        let mut state = lock(&self.state);
        if state.fail_writes {
            return Err(HubError::Io(io::Error::from(io::ErrorKind::PermissionDenied)));
        }

        let expected = kind.value_count();
        if values.len() < expected {
            return Err(HubError::calibration(
                kind,
                format!("expected {expected} values, got {}", values.len()),
            ));
        }
        state
            .files
            .insert(path.to_path_buf(), values[..expected].to_vec());
        Ok(())
    }
}

/// 手动推进的时钟
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn new(now_ns: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_ns)),
        }
    }

    pub fn set(&self, now_ns: i64) {
        self.now.store(now_ns, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ns: i64) {
        self.now.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ns(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_reads_in_order() {
        let device = MockInputDevice::new();
        device.push_all([
            RawInputEvent::abs(0, 1),
            RawInputEvent::abs(1, 2),
            RawInputEvent::sync(10),
        ]);

        let mut reader = device.clone();
        let mut buf = [RawInputEvent::default(); 2];
        assert_eq!(reader.read_into(&mut buf).unwrap(), 2);
        assert_eq!(buf[1].value, 2);
        assert_eq!(device.queued(), 1);
        assert_eq!(reader.read_into(&mut buf).unwrap(), 1);
        assert_eq!(reader.read_into(&mut buf).unwrap(), 0);
        assert_eq!(device.read_calls(), 3);
    }

    #[test]
    fn test_abs_query() {
        let device = MockInputDevice::new();
        device.set_abs(0x0a, 4);
        assert_eq!(device.query_abs(0x0a).unwrap(), 4);
        device.clear_abs(0x0a);
        assert!(device.query_abs(0x0a).is_err());
    }

    #[test]
    fn test_control_faults() {
        let control = RecordingControl::new();
        let mut channel = control.clone();

        channel.write_enable(1, true).unwrap();
        control.set_fault(Some(FaultMode::WriteFailed));
        let err = channel.write_delay_ms(1, 20).unwrap_err();
        assert!(err.descriptor_obtained());

        assert_eq!(control.writes(), vec![ControlWrite::Enable { slot: 1, enabled: true }]);
        assert_eq!(control.attempts(), 2);
    }

    #[test]
    fn test_store_rejects_short_data() {
        let store = MemoryCalibrationStore::new();
        store.insert("/acc", vec![1, 2]);
        let mut handle = store.clone();
        assert!(handle
            .read(CalibrationKind::Accelerometer, Path::new("/acc"))
            .is_err());
        assert!(handle
            .read(CalibrationKind::Accelerometer, Path::new("/missing"))
            .is_err());
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(100);
        let shared = clock.clone();
        shared.advance(50);
        assert_eq!(clock.now_ns(), 150);
    }
}
