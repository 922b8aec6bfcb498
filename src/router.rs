use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::config::RouterConfig;
use crate::error::SimError;
use crate::packet::{ClassTable, Packet, TrafficClass};
use crate::qdisc::{PolicyKind, Qdisc, Scheduler};
use crate::stats::{ClassCounters, FrameThroughput, RouterHistory, StatsSnapshot, StepSample};

// ==========================================
// 路由器：共享的服务步 + 统计平账，策略只管自己的缓冲区
// ==========================================
#[derive(Debug)]
pub struct Router {
    qdisc: Scheduler,
    buffer_size: usize,
    router_speed: f64,
    rng: StdRng,
    counters: ClassTable<ClassCounters>,
    frame: FrameThroughput,
    history: Option<RouterHistory>,
    steps: u64,
}

impl Router {
    pub fn new(kind: PolicyKind, config: &RouterConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            qdisc: Scheduler::new(kind, config),
            buffer_size: config.buffer_size,
            router_speed: config.router_speed,
            rng: StdRng::seed_from_u64(config.seed),
            counters: ClassTable::default(),
            frame: FrameThroughput::default(),
            history: None,
            steps: 0,
        })
    }

    // 实时视图需要逐步历史，批量跑不需要
    pub fn with_history(mut self) -> Self {
        self.history = Some(RouterHistory::default());
        self
    }

    pub fn kind(&self) -> PolicyKind {
        self.qdisc.kind()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.qdisc
    }

    pub fn occupancy(&self) -> usize {
        self.qdisc.len()
    }

    pub fn counters(&self, class: TrafficClass) -> ClassCounters {
        self.counters[class]
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn history(&self) -> Option<&RouterHistory> {
        self.history.as_ref()
    }

    // 每步先掷一次骰子，不管缓冲区里有没有包
    pub fn service(&mut self) -> Option<Packet> {
        let gate = self.rng.gen_bool(self.router_speed);
        if !gate {
            return None;
        }
        let pkt = self.qdisc.dequeue()?;
        self.record_served(&pkt);
        Some(pkt)
    }

    pub fn process_step(&mut self, pkt: Packet) {
        self.service();

        if let Err(rejected) = self.qdisc.enqueue(pkt) {
            trace!(policy = %self.kind(), id = rejected.id(), class = %rejected.class(), "packet dropped");
            self.counters[rejected.class()].dropped += 1;
        }
        self.flush_internal_drops();

        debug_assert!(
            self.qdisc.len() <= self.buffer_size,
            "{} buffer overflow: {} > {}",
            self.kind(),
            self.qdisc.len(),
            self.buffer_size
        );

        self.steps += 1;
        self.record_step();
    }

    // 批量跑完后把缓冲区剩余的包全部算作已服务
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while let Some(pkt) = self.qdisc.dequeue() {
            self.record_served(&pkt);
            drained += 1;
        }
        drained
    }

    pub fn begin_frame(&mut self) {
        self.frame = FrameThroughput::default();
    }

    pub fn end_frame(&mut self) -> FrameThroughput {
        let frame = self.frame;
        if let Some(history) = self.history.as_mut() {
            history.frames.push(frame);
        }
        frame
    }

    pub fn snapshot_stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(self.kind(), &self.counters, self.qdisc.len())
    }

    fn record_served(&mut self, pkt: &Packet) {
        self.counters[pkt.class()].served += 1;
        self.frame.served[pkt.class()] += 1;
    }

    // 队列内部挤掉的包 (WFQ 抢占) 在这里记账
    fn flush_internal_drops(&mut self) {
        for victim in self.qdisc.collect_dropped() {
            self.counters[victim.class()].dropped += 1;
        }
    }

    fn record_step(&mut self) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        history.steps.push(StepSample {
            gold_loss_percent: self.counters[TrafficClass::Gold].loss_percent(),
            occupancy: self.qdisc.len(),
            bronze_dropped: self.counters[TrafficClass::Bronze].dropped,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stalled(kind: PolicyKind, buffer_size: usize) -> Router {
        let cfg = RouterConfig::default()
            .with_buffer_size(buffer_size)
            .with_router_speed(0.0);
        Router::new(kind, &cfg).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = RouterConfig::default().with_buffer_size(0);
        assert_eq!(
            Router::new(PolicyKind::Baseline, &cfg).unwrap_err(),
            SimError::ZeroBuffer
        );
    }

    #[test]
    fn stalled_router_never_serves() {
        let mut router = stalled(PolicyKind::Baseline, 2);
        for id in 0..5 {
            router.process_step(Packet::new(id, TrafficClass::Silver, 1));
        }
        let snap = router.snapshot_stats();
        assert_eq!(snap.served[TrafficClass::Silver], 0);
        assert_eq!(snap.dropped[TrafficClass::Silver], 3);
        assert_eq!(snap.occupancy, 2);
    }

    #[test]
    fn full_speed_router_serves_every_step() {
        let cfg = RouterConfig::default().with_router_speed(1.0);
        let mut router = Router::new(PolicyKind::Baseline, &cfg).unwrap();
        for id in 0..10 {
            router.process_step(Packet::new(id, TrafficClass::Gold, 1));
        }
        // 每步先服务上一个包，再收下当前包
        assert_eq!(router.counters(TrafficClass::Gold).served, 9);
        assert_eq!(router.occupancy(), 1);
        assert_eq!(router.drain(), 1);
        assert_eq!(router.counters(TrafficClass::Gold).served, 10);
    }

    #[test]
    fn wfq_eviction_counted_as_bronze_drop() {
        let mut router = stalled(PolicyKind::Wfq, 2);
        router.process_step(Packet::new(0, TrafficClass::Bronze, 1));
        router.process_step(Packet::new(1, TrafficClass::Bronze, 1));
        router.process_step(Packet::new(2, TrafficClass::Gold, 1));

        assert_eq!(router.counters(TrafficClass::Bronze).dropped, 1);
        assert_eq!(router.counters(TrafficClass::Gold).dropped, 0);
        assert_eq!(router.occupancy(), 2);
    }

    #[test]
    fn history_records_each_step() {
        let mut router = stalled(PolicyKind::Baseline, 1).with_history();
        router.process_step(Packet::new(0, TrafficClass::Gold, 1));
        router.process_step(Packet::new(1, TrafficClass::Gold, 1));
        router.process_step(Packet::new(2, TrafficClass::Bronze, 1));

        let steps = &router.history().unwrap().steps;
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].gold_loss_percent, 0.0);
        assert_eq!(steps[1].gold_loss_percent, 100.0);
        assert_eq!(steps[2].bronze_dropped, 1);
        assert!(steps.iter().all(|s| s.occupancy == 1));
    }

    #[test]
    fn frame_counts_reset_per_tick() {
        let cfg = RouterConfig::default().with_router_speed(1.0);
        let mut router = Router::new(PolicyKind::Baseline, &cfg).unwrap().with_history();

        router.begin_frame();
        for id in 0..4 {
            router.process_step(Packet::new(id, TrafficClass::Silver, 1));
        }
        assert_eq!(router.end_frame().served[TrafficClass::Silver], 3);

        router.begin_frame();
        router.process_step(Packet::new(4, TrafficClass::Gold, 1));
        let frame = router.end_frame();
        assert_eq!(frame.served[TrafficClass::Silver], 1);
        assert_eq!(frame.served[TrafficClass::Gold], 0);
        assert_eq!(router.history().unwrap().frames.len(), 2);
    }
}
