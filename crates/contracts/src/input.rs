//! RawInputEvent - event source output
//!
//! One kernel input event as delivered by the hub's input device.

use serde::{Deserialize, Serialize};

const NS_PER_SEC: i64 = 1_000_000_000;
const NS_PER_USEC: i64 = 1_000;

/// Kernel event time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeVal {
    pub sec: i64,
    pub usec: i64,
}

impl TimeVal {
    /// Convert to nanoseconds
    #[inline]
    pub fn to_nanos(self) -> i64 {
        self.sec
            .saturating_mul(NS_PER_SEC)
            .saturating_add(self.usec.saturating_mul(NS_PER_USEC))
    }

    /// Build from nanoseconds (sub-microsecond precision is truncated)
    pub fn from_nanos(ns: i64) -> Self {
        Self {
            sec: ns.div_euclid(NS_PER_SEC),
            usec: ns.rem_euclid(NS_PER_SEC) / NS_PER_USEC,
        }
    }
}

/// Input event type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEventType {
    /// Synchronization marker (`EV_SYN`)
    #[default]
    Sync,
    /// Relative discrete signal (`EV_REL`)
    Relative,
    /// Absolute value update (`EV_ABS`)
    Absolute,
    /// Anything else the device produced
    Other(u16),
}

impl InputEventType {
    pub const EV_SYN: u16 = 0x00;
    pub const EV_REL: u16 = 0x02;
    pub const EV_ABS: u16 = 0x03;

    pub fn from_raw(raw: u16) -> Self {
        match raw {
            Self::EV_SYN => InputEventType::Sync,
            Self::EV_REL => InputEventType::Relative,
            Self::EV_ABS => InputEventType::Absolute,
            other => InputEventType::Other(other),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            InputEventType::Sync => Self::EV_SYN,
            InputEventType::Relative => Self::EV_REL,
            InputEventType::Absolute => Self::EV_ABS,
            InputEventType::Other(raw) => raw,
        }
    }
}

/// Raw input event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInputEvent {
    /// Kernel timestamp
    pub time: TimeVal,

    /// Event type
    pub event_type: InputEventType,

    /// Axis / signal code
    pub code: u16,

    /// Raw integer value
    pub value: i32,
}

impl RawInputEvent {
    /// Absolute axis update
    pub fn abs(code: u16, value: i32) -> Self {
        Self {
            time: TimeVal::default(),
            event_type: InputEventType::Absolute,
            code,
            value,
        }
    }

    /// Relative signal
    pub fn rel(code: u16, value: i32) -> Self {
        Self {
            time: TimeVal::default(),
            event_type: InputEventType::Relative,
            code,
            value,
        }
    }

    /// Sync marker at the given time (nanoseconds)
    pub fn sync(timestamp_ns: i64) -> Self {
        Self {
            time: TimeVal::from_nanos(timestamp_ns),
            event_type: InputEventType::Sync,
            code: 0,
            value: 0,
        }
    }

    /// Event time in nanoseconds
    #[inline]
    pub fn timestamp_ns(&self) -> i64 {
        self.time.to_nanos()
    }
}
