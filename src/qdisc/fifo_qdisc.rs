use std::collections::VecDeque;

use crate::{packet::Packet, qdisc::Qdisc};

// ==========================================
// 尾丢弃 FIFO：满了就拒绝新包，不分等级
// ==========================================
#[derive(Debug)]
pub struct FifoQdisc {
    queue: VecDeque<Packet>,
    hard_limit: usize,
}

impl FifoQdisc {
    pub fn new(hard_limit: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(hard_limit),
            hard_limit,
        }
    }

    pub fn has_room(&self) -> bool {
        self.queue.len() < self.hard_limit
    }
}

impl Qdisc for FifoQdisc {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if !self.has_room() {
            return Err(pkt);
        }
        self.queue.push_back(pkt);
        Ok(())
    }

    fn peek(&self) -> Option<&Packet> {
        self.queue.front()
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}
