use crate::packet::{ClassTable, Packet, TrafficClass};
use crate::qdisc::{FifoQdisc, Qdisc};
use crate::token_bucket::TokenBucketLimiter;

// 每个包固定扣 1 个令牌，与 size 无关
const TOKEN_COST: f64 = 1.0;

// ==========================================
// 每等级一个令牌桶做入口整形，后面接共享 FIFO
// ==========================================
#[derive(Debug)]
pub struct TokenBucketQdisc<B> {
    inner: FifoQdisc,
    buckets: ClassTable<B>,
}

impl<B> TokenBucketQdisc<B>
where
    B: TokenBucketLimiter,
{
    pub fn new(hard_limit: usize, buckets: ClassTable<B>) -> Self {
        Self {
            inner: FifoQdisc::new(hard_limit),
            buckets,
        }
    }

    pub fn bucket(&self, class: TrafficClass) -> &B {
        &self.buckets[class]
    }
}

impl<B> Qdisc for TokenBucketQdisc<B>
where
    B: TokenBucketLimiter,
{
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        // 一步一次：三个桶都补水，再只看自己那个桶
        for (_, bucket) in self.buckets.iter_mut() {
            bucket.refill();
        }

        let bucket = &mut self.buckets[pkt.class()];
        if !bucket.can_spend(TOKEN_COST) || !self.inner.has_room() {
            return Err(pkt);
        }
        bucket.consume(TOKEN_COST);
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
