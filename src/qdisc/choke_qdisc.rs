use tracing::debug;

use crate::config::ChokeMode;
use crate::packet::{Packet, TrafficClass};
use crate::qdisc::{FifoQdisc, Qdisc};

// ==========================================
// Choke：水位超过阈值后只放行 Gold
// ==========================================
#[derive(Debug)]
pub struct ChokeQdisc {
    inner: FifoQdisc,
    threshold: usize,
    mode: ChokeMode,
    congested: bool,
}

impl ChokeQdisc {
    pub fn new(hard_limit: usize, threshold: usize, mode: ChokeMode) -> Self {
        Self {
            inner: FifoQdisc::new(hard_limit),
            threshold,
            mode,
            congested: false,
        }
    }

    pub fn is_congested(&self) -> bool {
        self.congested
    }

    pub fn mode(&self) -> ChokeMode {
        self.mode
    }

    // 每个到达包先按当前水位刷新拥塞状态
    fn update_congestion(&mut self) {
        let occupancy = self.inner.len();
        let next = match self.mode {
            ChokeMode::Instantaneous => occupancy > self.threshold,
            ChokeMode::Hysteresis => {
                if occupancy > self.threshold {
                    true
                } else if occupancy * 2 < self.threshold {
                    false
                } else {
                    self.congested
                }
            }
        };

        if next != self.congested {
            debug!(occupancy, threshold = self.threshold, congested = next, "choke state changed");
            self.congested = next;
        }
    }
}

impl Qdisc for ChokeQdisc {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        self.update_congestion();

        if self.congested && pkt.class() != TrafficClass::Gold {
            return Err(pkt);
        }
        self.inner.enqueue(pkt)
    }

    fn peek(&self) -> Option<&Packet> {
        self.inner.peek()
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.inner.dequeue()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
