//! Hub evdev node
//!
//! Reads kernel `input_event` frames and answers current-value queries through
//! `EVIOCGABS`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use contracts::{AbsQuery, EventSource, InputEventType, RawInputEvent, TimeVal};
use tracing::{debug, trace, warn};

use crate::error::{IngestionError, Result};

/// Highest absolute axis code the kernel accepts
const ABS_MAX: u16 = 0x3f;

/// Kernel `struct input_event`
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct InputEventFrame {
    tv_sec: libc::time_t,
    tv_usec: libc::suseconds_t,
    kind: u16,
    code: u16,
    value: i32,
}

const _: () = assert!(mem::size_of::<InputEventFrame>() == mem::size_of::<libc::input_event>());

impl From<InputEventFrame> for RawInputEvent {
    fn from(frame: InputEventFrame) -> Self {
        RawInputEvent {
            time: TimeVal {
                sec: frame.tv_sec as i64,
                usec: frame.tv_usec as i64,
            },
            event_type: InputEventType::from_raw(frame.kind),
            code: frame.code,
            value: frame.value,
        }
    }
}

/// Kernel `struct input_absinfo`
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct AbsInfo {
    value: i32,
    minimum: i32,
    maximum: i32,
    fuzz: i32,
    flat: i32,
    resolution: i32,
}

/// `EVIOCGABS(code)` request number
fn eviocgabs(code: u16) -> libc::c_ulong {
    const IOC_READ: libc::c_ulong = 2;
    let size = mem::size_of::<AbsInfo>() as libc::c_ulong;
    (IOC_READ << 30) | (size << 16) | ((b'E' as libc::c_ulong) << 8) | (0x40 + code as libc::c_ulong)
}

/// Hub input device
#[derive(Debug)]
pub struct EvdevDevice {
    file: File,
    path: PathBuf,
    scratch: Vec<InputEventFrame>,
}

impl EvdevDevice {
    /// Open the node non-blocking; an empty queue reads as zero events
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| IngestionError::DeviceOpen {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "input device opened");
        Ok(Self {
            file,
            path,
            scratch: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for EvdevDevice {
    fn read_into(&mut self, buf: &mut [RawInputEvent]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.scratch.clear();
        self.scratch.resize(buf.len(), InputEventFrame::zeroed());

        let bytes = match self.file.read(bytemuck::cast_slice_mut(&mut self.scratch)) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(0),
            Err(e) => return Err(e),
        };

        let frame_size = mem::size_of::<InputEventFrame>();
        if bytes % frame_size != 0 {
            warn!(bytes, path = %self.path.display(), "partial input event frame");
            return Err(IngestionError::ShortRead { bytes }.into());
        }

        let count = bytes / frame_size;
        for (slot, frame) in buf.iter_mut().zip(&self.scratch[..count]) {
            *slot = RawInputEvent::from(*frame);
        }

        trace!(count, "input events read");
        Ok(count)
    }
}

impl AbsQuery for EvdevDevice {
    fn query_abs(&self, code: u16) -> io::Result<i32> {
        if code > ABS_MAX {
            return Err(IngestionError::AxisOutOfRange { code }.into());
        }

        let mut info = AbsInfo::zeroed();
        // SAFETY: EVIOCGABS writes exactly one input_absinfo into `info`, which
        // lives for the duration of the call.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                eviocgabs(code) as _,
                &mut info as *mut AbsInfo,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        trace!(code, value = info.value, "abs query");
        Ok(info.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviocgabs_matches_kernel_encoding() {
        // _IOR('E', 0x40 + ABS_X, struct input_absinfo)
        assert_eq!(eviocgabs(0x00), 0x8018_4540);
        assert_eq!(eviocgabs(0x0a), 0x8018_454a);
    }

    #[test]
    fn test_frame_conversion() {
        let frame = InputEventFrame {
            tv_sec: 3,
            tv_usec: 250,
            kind: InputEventType::EV_ABS,
            code: 0x0a,
            value: 7,
        };
        let event = RawInputEvent::from(frame);
        assert_eq!(event.event_type, InputEventType::Absolute);
        assert_eq!(event.timestamp_ns(), 3_000_250_000);
        assert_eq!(event.value, 7);
    }

    #[test]
    fn test_read_from_regular_file() {
        use std::io::Write;

        let frames = [
            InputEventFrame {
                tv_sec: 0,
                tv_usec: 1,
                kind: InputEventType::EV_ABS,
                code: 0x00,
                value: 1000,
            },
            InputEventFrame {
                tv_sec: 0,
                tv_usec: 2,
                kind: InputEventType::EV_SYN,
                code: 0,
                value: 0,
            },
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytemuck::cast_slice(&frames)).unwrap();

        let mut device = EvdevDevice::open(file.path()).unwrap();
        let mut buf = [RawInputEvent::default(); 4];
        assert_eq!(device.read_into(&mut buf).unwrap(), 2);
        assert_eq!(buf[0].value, 1000);
        assert_eq!(buf[1].event_type, InputEventType::Sync);
        assert_eq!(device.read_into(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_query_rejects_out_of_range_code() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let device = EvdevDevice::open(file.path()).unwrap();
        let err = device.query_abs(0x40).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_open_missing_device() {
        let err = EvdevDevice::open("/nonexistent/event99").unwrap_err();
        assert!(matches!(err, IngestionError::DeviceOpen { .. }));
    }
}
