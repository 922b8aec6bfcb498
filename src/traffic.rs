use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SimError;
use crate::packet::{ClassTable, Packet, TrafficClass};

// 百分比权重：20% Gold, 30% Silver, 50% Bronze
pub const NORMAL_MIX: ClassMix = ClassMix(ClassTable::new(20, 30, 50));
// 压力突发：90% Gold
pub const BURST_MIX: ClassMix = ClassMix(ClassTable::new(90, 5, 5));

pub const PACKETS_PER_TICK: usize = 50;
pub const BATTLE_PACKETS_PER_TICK: usize = 30;
pub const BURST_PERIOD: u64 = 20;
pub const TOTAL_PACKETS: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMix(pub ClassTable<u32>);

impl ClassMix {
    pub const fn new(gold: u32, silver: u32, bronze: u32) -> Self {
        Self(ClassTable::new(gold, silver, bronze))
    }
}

impl Default for ClassMix {
    fn default() -> Self {
        NORMAL_MIX
    }
}

// 每 period 个 tick 切换一次突发权重 (tick 0 也算)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstSchedule {
    pub period: u64,
    pub normal: ClassMix,
    pub burst: ClassMix,
}

impl Default for BurstSchedule {
    fn default() -> Self {
        Self {
            period: BURST_PERIOD,
            normal: NORMAL_MIX,
            burst: BURST_MIX,
        }
    }
}

impl BurstSchedule {
    pub fn is_burst(&self, tick: u64) -> bool {
        self.period != 0 && tick % self.period == 0
    }

    pub fn mix_for(&self, tick: u64) -> ClassMix {
        if self.is_burst(tick) {
            self.burst
        } else {
            self.normal
        }
    }
}

// ==========================================
// 流量发生器：自带 RNG 与包序号，不依赖全局状态
// ==========================================
#[derive(Debug)]
pub struct TrafficGenerator {
    rng: StdRng,
    next_id: u64,
}

impl TrafficGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn generate(&mut self, n: usize, mix: ClassMix) -> Result<Vec<Packet>, SimError> {
        let dist = WeightedIndex::<u32>::new(mix.0.values()).map_err(|_| SimError::InvalidMix)?;

        let packets = (0..n)
            .map(|_| {
                let class = TrafficClass::ALL[dist.sample(&mut self.rng)];
                let size = self.rng.gen_range(Packet::MIN_SIZE..=Packet::MAX_SIZE);
                let packet = Packet::new(self.next_id, class, size);
                self.next_id += 1;
                packet
            })
            .collect();

        Ok(packets)
    }
}
