use crate::error::SimError;
use crate::packet::{ClassTable, TrafficClass};
use crate::token_bucket::BucketSpec;

pub const BUFFER_SIZE: usize = 20;
pub const ROUTER_SPEED: f64 = 0.7;
pub const CHOKE_THRESHOLD: usize = 8;
pub const WEIGHTS: ClassTable<f64> = ClassTable::new(4.0, 2.0, 1.0);
pub const BUCKETS: ClassTable<BucketSpec> = ClassTable::new(
    BucketSpec::new(10.0, 5.0),
    BucketSpec::new(5.0, 0.5),
    BucketSpec::new(2.0, 0.2),
);
pub const DEFAULT_SEED: u64 = 0x5EED;

// Choke 拥塞判定的两种口径，行为不同，不能混用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChokeMode {
    // 超过阈值进入拥塞，低于阈值一半才退出
    #[default]
    Hysteresis,
    // 每步重新判定 occupancy > threshold
    Instantaneous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    pub buffer_size: usize,
    pub router_speed: f64, // 每步成功服务的概率
    pub choke_threshold: usize,
    pub choke_mode: ChokeMode,
    pub weights: ClassTable<f64>,
    pub buckets: ClassTable<BucketSpec>,
    pub seed: u64, // 服务闸门的随机种子
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
            router_speed: ROUTER_SPEED,
            choke_threshold: CHOKE_THRESHOLD,
            choke_mode: ChokeMode::default(),
            weights: WEIGHTS,
            buckets: BUCKETS,
            seed: DEFAULT_SEED,
        }
    }
}

impl RouterConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_router_speed(mut self, router_speed: f64) -> Self {
        self.router_speed = router_speed;
        self
    }

    pub fn with_choke_threshold(mut self, threshold: usize) -> Self {
        self.choke_threshold = threshold;
        self
    }

    pub fn with_choke_mode(mut self, mode: ChokeMode) -> Self {
        self.choke_mode = mode;
        self
    }

    pub fn with_bucket(mut self, class: TrafficClass, spec: BucketSpec) -> Self {
        self.buckets[class] = spec;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.buffer_size == 0 {
            return Err(SimError::ZeroBuffer);
        }
        if !(0.0..=1.0).contains(&self.router_speed) {
            // NaN 也落在这里
            return Err(SimError::InvalidRouterSpeed(self.router_speed));
        }
        for (class, &weight) in self.weights.iter() {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(SimError::InvalidWeight(class, weight));
            }
        }
        for (class, spec) in self.buckets.iter() {
            let ok = spec.capacity.is_finite()
                && spec.refill_rate.is_finite()
                && spec.capacity >= 0.0
                && spec.refill_rate >= 0.0;
            if !ok {
                return Err(SimError::InvalidBucket(class, spec.capacity, spec.refill_rate));
            }
        }
        Ok(())
    }
}
