//! Sensor Hub 指标收集模块
//!
//! 记录读取批次、合成记录、未知事件和控制通道失败等运行指标。

use std::collections::HashMap;

use contracts::{SensorKind, SensorRecord};
use metrics::{counter, histogram};

/// 记录一次 `read_events` 调用的输出
///
/// 每条记录按传感器类型计数，批大小进入直方图。
pub fn record_read_batch(records: &[SensorRecord]) {
    histogram!("sensorhub_read_batch_size").record(records.len() as f64);
    for record in records {
        record_record_emitted(record.kind);
    }
}

/// 记录一条输出记录
pub fn record_record_emitted(kind: SensorKind) {
    counter!("sensorhub_records_emitted_total", "kind" => kind.name()).increment(1);
}

/// 记录一条合成（初始状态）记录
pub fn record_synthetic_record(kind: SensorKind) {
    counter!("sensorhub_synthetic_records_total", "kind" => kind.name()).increment(1);
}

/// 记录被丢弃的未知事件
pub fn record_unknown_event(event_type: &'static str) {
    counter!("sensorhub_unknown_events_total", "type" => event_type).increment(1);
}

/// 记录禁用状态下被消耗的过期更新
pub fn record_stale_update_dropped(kind: SensorKind) {
    counter!("sensorhub_stale_updates_dropped_total", "kind" => kind.name()).increment(1);
}

/// 记录控制通道失败
pub fn record_control_failure(operation: &'static str) {
    counter!("sensorhub_control_failures_total", "operation" => operation).increment(1);
}

/// Hub 指标聚合器
///
/// 在内存中聚合指标，便于 CLI 输出摘要。
#[derive(Debug, Clone, Default)]
pub struct HubMetricsAggregator {
    /// `read_events` 调用次数
    pub total_reads: u64,

    /// 返回 0 条记录的调用次数
    pub empty_reads: u64,

    /// 记录总数
    pub total_records: u64,

    /// 批大小统计
    pub batch_stats: RunningStats,

    /// 各传感器记录数
    pub kind_counts: HashMap<SensorKind, u64>,

    /// 各传感器相邻记录间隔 (毫秒)
    pub interval_stats: HashMap<SensorKind, RunningStats>,

    last_timestamp: HashMap<SensorKind, i64>,
}

impl HubMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, records: &[SensorRecord]) {
        self.total_reads += 1;
        if records.is_empty() {
            self.empty_reads += 1;
        }
        self.total_records += records.len() as u64;
        self.batch_stats.push(records.len() as f64);

        for record in records {
            *self.kind_counts.entry(record.kind).or_insert(0) += 1;

            if let Some(prev) = self.last_timestamp.insert(record.kind, record.timestamp) {
                let delta_ms = (record.timestamp - prev) as f64 / 1_000_000.0;
                self.interval_stats
                    .entry(record.kind)
                    .or_default()
                    .push(delta_ms);
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let mut kind_counts: Vec<(SensorKind, u64)> =
            self.kind_counts.iter().map(|(k, v)| (*k, *v)).collect();
        kind_counts.sort_by_key(|(kind, _)| kind.slot());

        let mut intervals: Vec<(SensorKind, StatsSummary)> = self
            .interval_stats
            .iter()
            .map(|(k, v)| (*k, StatsSummary::from(v)))
            .collect();
        intervals.sort_by_key(|(kind, _)| kind.slot());

        MetricsSummary {
            total_reads: self.total_reads,
            empty_reads: self.empty_reads,
            total_records: self.total_records,
            empty_rate: if self.total_reads > 0 {
                self.empty_reads as f64 / self.total_reads as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_stats),
            kind_counts,
            interval_ms: intervals,
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_reads: u64,
    pub empty_reads: u64,
    pub total_records: u64,
    pub empty_rate: f64,
    pub batch_size: StatsSummary,
    /// 按槽位顺序排列
    pub kind_counts: Vec<(SensorKind, u64)>,
    /// 按槽位顺序排列
    pub interval_ms: Vec<(SensorKind, StatsSummary)>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sensor Hub Summary ===")?;
        writeln!(f, "Read calls: {}", self.total_reads)?;
        writeln!(
            f,
            "Empty reads: {} ({:.2}%)",
            self.empty_reads, self.empty_rate
        )?;
        writeln!(f, "Records: {}", self.total_records)?;
        writeln!(f, "Batch size: {}", self.batch_size)?;

        if !self.kind_counts.is_empty() {
            writeln!(f, "Records per sensor:")?;
            for (kind, count) in &self.kind_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        if !self.interval_ms.is_empty() {
            writeln!(f, "Record interval (ms):")?;
            for (kind, stats) in &self.interval_ms {
                writeln!(f, "  {}: {}", kind, stats)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
