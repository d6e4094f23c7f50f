//! Ingestion 错误类型

use std::path::PathBuf;

use contracts::HubError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 设备节点打开失败
    #[error("failed to open input device {path}: {source}")]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 设备返回了不完整的事件帧
    #[error("short read from input device: {bytes} bytes is not a whole number of events")]
    ShortRead { bytes: usize },

    /// 轴代码超出内核范围
    #[error("absolute axis code {code:#x} out of range")]
    AxisOutOfRange { code: u16 },

    /// 控制目录不存在
    #[error("control directory {path} not found")]
    ControlRootMissing { path: PathBuf },
}

impl From<IngestionError> for HubError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::DeviceOpen { source, .. } => HubError::Io(source),
            other => HubError::Other(other.to_string()),
        }
    }
}

impl From<IngestionError> for std::io::Error {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::DeviceOpen { source, .. } => source,
            e @ IngestionError::AxisOutOfRange { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
            }
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
