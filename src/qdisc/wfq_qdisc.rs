use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::packet::{ClassTable, Packet, TrafficClass};
use crate::qdisc::Qdisc;

// 堆元素：按 (finish_time, id) 升序出队。BinaryHeap 是大顶堆，所以比较反过来
#[derive(Debug)]
struct WfqEntry(Packet);

impl Ord for WfqEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .finish_time()
            .total_cmp(&self.0.finish_time())
            .then_with(|| other.0.id().cmp(&self.0.id()))
    }
}

impl PartialOrd for WfqEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for WfqEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WfqEntry {}

// ==========================================
// 加权公平队列 + Gold 抢占 Bronze
// ==========================================
#[derive(Debug)]
pub struct WfqQdisc {
    heap: BinaryHeap<WfqEntry>,
    hard_limit: usize,
    weights: ClassTable<f64>,
    last_finish: ClassTable<f64>, // 每等级上一个包的虚拟完成时间，跨步保留
    occupancy: ClassTable<usize>, // 每等级在队数，没有 Bronze 时免扫描
    pending_dropped: Vec<Packet>, // 被抢占的受害者
}

impl WfqQdisc {
    pub fn new(hard_limit: usize, weights: ClassTable<f64>) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(hard_limit),
            hard_limit,
            weights,
            last_finish: ClassTable::default(),
            occupancy: ClassTable::default(),
            pending_dropped: Vec::new(),
        }
    }

    pub fn last_finish(&self, class: TrafficClass) -> f64 {
        self.last_finish[class]
    }

    pub fn occupancy(&self, class: TrafficClass) -> usize {
        self.occupancy[class]
    }

    // F = max(arrival, last_finish[c]) + size / weight[c]
    fn stamp(&mut self, pkt: &mut Packet) {
        let class = pkt.class();
        let start = (pkt.arrival_time() as f64).max(self.last_finish[class]);
        let finish = start + pkt.size() as f64 / self.weights[class];
        pkt.set_finish_time(finish);
        self.last_finish[class] = finish;
    }

    fn push(&mut self, pkt: Packet) {
        self.occupancy[pkt.class()] += 1;
        self.heap.push(WfqEntry(pkt));
    }

    // 踢掉存储顺序里第一个 Bronze (不一定是完成时间最大的那个)，然后重建堆。O(n)
    fn evict_first_bronze(&mut self) -> Option<Packet> {
        if self.occupancy[TrafficClass::Bronze] == 0 {
            return None;
        }

        let mut entries = std::mem::take(&mut self.heap).into_vec();
        let idx = entries.iter().position(|e| e.0.class() == TrafficClass::Bronze);
        let victim = idx.map(|idx| entries.remove(idx).0);
        self.heap = BinaryHeap::from(entries);

        if let Some(ref victim) = victim {
            self.occupancy[TrafficClass::Bronze] -= 1;
            debug!(victim = victim.id(), finish = victim.finish_time(), "WFQ evicted bronze packet");
        }
        victim
    }
}

impl Qdisc for WfqQdisc {
    fn enqueue(&mut self, mut pkt: Packet) -> Result<(), Packet> {
        // 即使最终被丢，完成时间也照样推进
        self.stamp(&mut pkt);

        if self.heap.len() < self.hard_limit {
            self.push(pkt);
            return Ok(());
        }

        if pkt.class() != TrafficClass::Gold {
            return Err(pkt);
        }

        match self.evict_first_bronze() {
            Some(victim) => {
                self.pending_dropped.push(victim);
                self.push(pkt);
                Ok(())
            }
            None => Err(pkt),
        }
    }

    fn peek(&self) -> Option<&Packet> {
        self.heap.peek().map(|e| &e.0)
    }

    fn dequeue(&mut self) -> Option<Packet> {
        let WfqEntry(pkt) = self.heap.pop()?;
        self.occupancy[pkt.class()] -= 1;
        Some(pkt)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn collect_dropped(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.pending_dropped)
    }
}
