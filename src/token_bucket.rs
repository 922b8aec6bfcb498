// ================= 按步补水的令牌桶 =================

// 为了解耦，令牌桶的 Trait 保留 (调度器只依赖它)
pub trait TokenBucketLimiter {
    fn refill(&mut self);
    fn can_spend(&self, cost: f64) -> bool;
    fn consume(&mut self, cost: f64) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketSpec {
    pub capacity: f64,
    pub refill_rate: f64, // 每个仿真步补充的令牌数
}

impl BucketSpec {
    pub const fn new(capacity: f64, refill_rate: f64) -> Self {
        Self { capacity, refill_rate }
    }
}

#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: f64,   // 当前余额，恒在 [0, capacity]
    rate: f64,     // 每步补充量
    capacity: f64, // 桶容量 (突发上限)
}

impl TokenBucket {
    pub fn new(spec: BucketSpec) -> Self {
        Self {
            tokens: spec.capacity, // 初始给满
            rate: spec.refill_rate,
            capacity: spec.capacity,
        }
    }

    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

impl TokenBucketLimiter for TokenBucket {
    // 仿真时间是离散的：每调用一次就是过了一步
    fn refill(&mut self) {
        self.tokens = (self.tokens + self.rate).min(self.capacity);
    }

    fn can_spend(&self, cost: f64) -> bool {
        self.tokens >= cost
    }

    fn consume(&mut self, cost: f64) -> bool {
        if self.can_spend(cost) {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }
}
