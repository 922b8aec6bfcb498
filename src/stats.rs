use crate::packet::{ClassTable, TrafficClass};
use crate::qdisc::PolicyKind;

// ==========================================
// 每等级累计计数 (只增不减)
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounters {
    pub served: u64,
    pub dropped: u64,
}

impl ClassCounters {
    pub fn total(&self) -> u64 {
        self.served + self.dropped
    }

    // 分母为 0 时定义为 0%
    pub fn loss_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.dropped as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub policy: PolicyKind,
    pub served: ClassTable<u64>,
    pub dropped: ClassTable<u64>,
    pub occupancy: usize,
    pub loss_percent: ClassTable<f64>,
}

impl StatsSnapshot {
    pub fn new(policy: PolicyKind, counters: &ClassTable<ClassCounters>, occupancy: usize) -> Self {
        Self {
            policy,
            served: counters.map(|_, c| c.served),
            dropped: counters.map(|_, c| c.dropped),
            occupancy,
            loss_percent: counters.map(|_, c| c.loss_percent()),
        }
    }

    pub fn total_served(&self) -> u64 {
        self.served.values().iter().sum()
    }

    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().iter().sum()
    }

    pub fn accounted(&self, class: TrafficClass) -> u64 {
        self.served[class] + self.dropped[class]
    }
}

// 实时视图每步记一笔
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSample {
    pub gold_loss_percent: f64,
    pub occupancy: usize,
    pub bronze_dropped: u64,
}

// 单个 tick 内各等级的出队数，tick 开始时清零
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameThroughput {
    pub served: ClassTable<u64>,
}

impl FrameThroughput {
    pub fn total(&self) -> u64 {
        self.served.values().iter().sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouterHistory {
    pub steps: Vec<StepSample>,
    pub frames: Vec<FrameThroughput>,
}

impl RouterHistory {
    pub const DEFAULT_WINDOW: usize = 50;

    // 最近 n 个 tick，不足 n 个就全给
    pub fn frame_window(&self, n: usize) -> &[FrameThroughput] {
        let start = self.frames.len().saturating_sub(n);
        &self.frames[start..]
    }
}
