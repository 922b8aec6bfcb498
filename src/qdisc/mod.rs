use std::fmt;

use crate::config::RouterConfig;
use crate::packet::Packet;
use crate::token_bucket::TokenBucket;

mod choke_qdisc;
mod fifo_qdisc;
mod token_bucket_qdisc;
mod wfq_qdisc;

pub use choke_qdisc::ChokeQdisc;
pub use fifo_qdisc::FifoQdisc;
pub use token_bucket_qdisc::TokenBucketQdisc;
pub use wfq_qdisc::WfqQdisc;

// enqueue 返回 Err 表示到达包被拒；队列内部挤掉的包进 collect_dropped
pub trait Qdisc {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    fn peek(&self) -> Option<&Packet>;
    fn dequeue(&mut self) -> Option<Packet>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn collect_dropped(&mut self) -> Vec<Packet> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Baseline,
    Choke,
    TokenBucket,
    Wfq,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Baseline,
        PolicyKind::Choke,
        PolicyKind::TokenBucket,
        PolicyKind::Wfq,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Baseline => "Baseline",
            PolicyKind::Choke => "Choke",
            PolicyKind::TokenBucket => "Token",
            PolicyKind::Wfq => "WFQ",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PolicyKind::Baseline => "Baseline (Shared Misery)",
            PolicyKind::Choke => "Choke (Gold Protected)",
            PolicyKind::TokenBucket => "Token Bucket (Shaping)",
            PolicyKind::Wfq => "WFQ (Prioritization)",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==========================================
// 四种策略是封闭集合，用枚举分发而不是 Box<dyn Qdisc>
// ==========================================
#[derive(Debug)]
pub enum Scheduler {
    Baseline(FifoQdisc),
    Choke(ChokeQdisc),
    TokenBucket(TokenBucketQdisc<TokenBucket>),
    Wfq(WfqQdisc),
}

impl Scheduler {
    pub fn new(kind: PolicyKind, config: &RouterConfig) -> Self {
        let limit = config.buffer_size;
        match kind {
            PolicyKind::Baseline => Scheduler::Baseline(FifoQdisc::new(limit)),
            PolicyKind::Choke => Scheduler::Choke(ChokeQdisc::new(
                limit,
                config.choke_threshold,
                config.choke_mode,
            )),
            PolicyKind::TokenBucket => Scheduler::TokenBucket(TokenBucketQdisc::new(
                limit,
                config.buckets.map(|_, spec| TokenBucket::new(*spec)),
            )),
            PolicyKind::Wfq => Scheduler::Wfq(WfqQdisc::new(limit, config.weights)),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Scheduler::Baseline(_) => PolicyKind::Baseline,
            Scheduler::Choke(_) => PolicyKind::Choke,
            Scheduler::TokenBucket(_) => PolicyKind::TokenBucket,
            Scheduler::Wfq(_) => PolicyKind::Wfq,
        }
    }

    fn inner(&self) -> &dyn Qdisc {
        match self {
            Scheduler::Baseline(q) => q,
            Scheduler::Choke(q) => q,
            Scheduler::TokenBucket(q) => q,
            Scheduler::Wfq(q) => q,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Qdisc {
        match self {
            Scheduler::Baseline(q) => q,
            Scheduler::Choke(q) => q,
            Scheduler::TokenBucket(q) => q,
            Scheduler::Wfq(q) => q,
        }
    }
}

impl Qdisc for Scheduler {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        self.inner_mut().enqueue(pkt)
    }

    fn peek(&self) -> Option<&Packet> {
        self.inner().peek()
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.inner_mut().dequeue()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn collect_dropped(&mut self) -> Vec<Packet> {
        self.inner_mut().collect_dropped()
    }
}
