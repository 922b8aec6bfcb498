use tracing::{debug, info};

use crate::config::RouterConfig;
use crate::error::SimError;
use crate::packet::{ClassTable, Packet, TrafficClass};
use crate::qdisc::PolicyKind;
use crate::router::Router;
use crate::stats::{FrameThroughput, StatsSnapshot};
use crate::traffic::{BurstSchedule, ClassMix, TrafficGenerator};

// ==========================================
// 四个路由器并排跑同一份流量
// ==========================================
#[derive(Debug)]
pub struct Comparison {
    routers: Vec<Router>,
}

impl Comparison {
    pub fn new(config: &RouterConfig) -> Result<Self, SimError> {
        Self::with_policies(config, &PolicyKind::ALL)
    }

    pub fn with_policies(config: &RouterConfig, kinds: &[PolicyKind]) -> Result<Self, SimError> {
        let routers = kinds
            .iter()
            .map(|&kind| Router::new(kind, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routers })
    }

    pub fn with_history(mut self) -> Self {
        self.routers = self.routers.into_iter().map(Router::with_history).collect();
        self
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn router(&self, kind: PolicyKind) -> Option<&Router> {
        self.routers.iter().find(|r| r.kind() == kind)
    }

    // 每个策略拿到的是自己的深拷贝：WFQ 会改 finish_time
    pub fn feed(&mut self, packets: &[Packet]) {
        for router in &mut self.routers {
            for pkt in packets {
                router.process_step(pkt.clone());
            }
        }
    }

    pub fn begin_frame(&mut self) {
        self.routers.iter_mut().for_each(Router::begin_frame);
    }

    pub fn end_frame(&mut self) -> Vec<FrameThroughput> {
        self.routers.iter_mut().map(Router::end_frame).collect()
    }

    pub fn drain(&mut self) {
        for router in &mut self.routers {
            let drained = router.drain();
            debug!(policy = %router.kind(), drained, "flushed remaining buffer");
        }
    }

    pub fn snapshots(&self) -> Vec<StatsSnapshot> {
        self.routers.iter().map(Router::snapshot_stats).collect()
    }
}

// ==========================================
// 批量模式：一次性生成、喂完、排空
// ==========================================
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub total_packets: usize,
    pub arrivals: ClassTable<u64>,
    pub results: Vec<StatsSnapshot>,
}

impl BatchReport {
    pub fn result(&self, kind: PolicyKind) -> Option<&StatsSnapshot> {
        self.results.iter().find(|s| s.policy == kind)
    }

    pub fn gold_loss_percent(&self) -> Vec<(PolicyKind, f64)> {
        self.results
            .iter()
            .map(|s| (s.policy, s.loss_percent[TrafficClass::Gold]))
            .collect()
    }

    pub fn drops_by_class(&self) -> Vec<(PolicyKind, ClassTable<u64>)> {
        self.results.iter().map(|s| (s.policy, s.dropped)).collect()
    }
}

pub fn count_arrivals(packets: &[Packet]) -> ClassTable<u64> {
    let mut arrivals = ClassTable::default();
    for pkt in packets {
        arrivals[pkt.class()] += 1;
    }
    arrivals
}

pub fn run_batch(
    config: &RouterConfig,
    traffic: &mut TrafficGenerator,
    total_packets: usize,
) -> Result<BatchReport, SimError> {
    let mut comparison = Comparison::new(config)?;
    let packets = traffic.generate(total_packets, ClassMix::default())?;

    comparison.feed(&packets);
    comparison.drain();

    let report = BatchReport {
        total_packets,
        arrivals: count_arrivals(&packets),
        results: comparison.snapshots(),
    };

    for snap in &report.results {
        info!(
            policy = %snap.policy,
            served = snap.total_served(),
            dropped = snap.total_dropped(),
            gold_loss = format_args!("{:.2}%", snap.loss_percent[TrafficClass::Gold]),
            "batch run finished"
        );
    }
    Ok(report)
}

// ==========================================
// 实时模式：每个 tick 一块新流量，状态跨 tick 保留
// ==========================================
#[derive(Debug, Clone)]
pub struct TickEntry {
    pub snapshot: StatsSnapshot,
    pub frame: FrameThroughput,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub burst: bool,
    pub entries: Vec<TickEntry>,
}

#[derive(Debug)]
pub struct LiveSession {
    traffic: TrafficGenerator,
    comparison: Comparison,
    schedule: Option<BurstSchedule>,
    chunk: usize,
    tick: u64,
}

impl LiveSession {
    pub fn new(
        config: &RouterConfig,
        traffic: TrafficGenerator,
        chunk: usize,
    ) -> Result<Self, SimError> {
        Ok(Self {
            traffic,
            comparison: Comparison::new(config)?.with_history(),
            schedule: None,
            chunk,
            tick: 0,
        })
    }

    pub fn with_bursts(mut self, schedule: BurstSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        let tick = self.tick;
        let burst = self.schedule.is_some_and(|s| s.is_burst(tick));
        let mix = self
            .schedule
            .map(|s| s.mix_for(tick))
            .unwrap_or_default();

        let packets = self.traffic.generate(self.chunk, mix)?;
        if burst {
            debug!(tick, packets = packets.len(), "burst tick");
        }

        self.comparison.begin_frame();
        self.comparison.feed(&packets);
        let frames = self.comparison.end_frame();

        let entries = self
            .comparison
            .snapshots()
            .into_iter()
            .zip(frames)
            .map(|(snapshot, frame)| TickEntry { snapshot, frame })
            .collect();

        self.tick += 1;
        Ok(TickReport { tick, burst, entries })
    }
}
