use std::fmt;
use std::ops::{Index, IndexMut};

// ==========================================
// 流量等级：金 / 银 / 铜
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrafficClass {
    Gold,
    Silver,
    Bronze,
}

impl TrafficClass {
    pub const ALL: [TrafficClass; 3] = [TrafficClass::Gold, TrafficClass::Silver, TrafficClass::Bronze];

    pub fn index(self) -> usize {
        match self {
            TrafficClass::Gold => 0,
            TrafficClass::Silver => 1,
            TrafficClass::Bronze => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrafficClass::Gold => "Gold",
            TrafficClass::Silver => "Silver",
            TrafficClass::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==========================================
// 按等级索引的定长表 (替代 {'Gold': .., 'Silver': .., 'Bronze': ..})
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassTable<T>([T; 3]);

impl<T> ClassTable<T> {
    pub const fn new(gold: T, silver: T, bronze: T) -> Self {
        Self([gold, silver, bronze])
    }

    pub fn from_fn(mut f: impl FnMut(TrafficClass) -> T) -> Self {
        Self([
            f(TrafficClass::Gold),
            f(TrafficClass::Silver),
            f(TrafficClass::Bronze),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrafficClass, &T)> {
        TrafficClass::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (TrafficClass, &mut T)> {
        TrafficClass::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn values(&self) -> &[T; 3] {
        &self.0
    }

    pub fn map<U>(&self, mut f: impl FnMut(TrafficClass, &T) -> U) -> ClassTable<U> {
        ClassTable::from_fn(|class| f(class, &self.0[class.index()]))
    }
}

impl<T> Index<TrafficClass> for ClassTable<T> {
    type Output = T;

    fn index(&self, class: TrafficClass) -> &T {
        &self.0[class.index()]
    }
}

impl<T> IndexMut<TrafficClass> for ClassTable<T> {
    fn index_mut(&mut self, class: TrafficClass) -> &mut T {
        &mut self.0[class.index()]
    }
}

// ==========================================
// 数据包：创建后只有 finish_time 可写 (仅 WFQ 使用)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    id: u64,
    class: TrafficClass,
    arrival_time: u64, // 全局创建序号，充当仿真时间戳
    size: u32,         // 服务代价，[1, 3]
    finish_time: f64,  // WFQ 虚拟完成时间，其它策略恒为 0
}

impl Packet {
    pub const MIN_SIZE: u32 = 1;
    pub const MAX_SIZE: u32 = 3;

    // arrival_time 与 id 相同，都是全局序号
    pub fn new(id: u64, class: TrafficClass, size: u32) -> Self {
        debug_assert!((Self::MIN_SIZE..=Self::MAX_SIZE).contains(&size));
        Self {
            id,
            class,
            arrival_time: id,
            size,
            finish_time: 0.0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn class(&self) -> TrafficClass {
        self.class
    }

    pub fn arrival_time(&self) -> u64 {
        self.arrival_time
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn finish_time(&self) -> f64 {
        self.finish_time
    }

    pub(crate) fn set_finish_time(&mut self, finish_time: f64) {
        self.finish_time = finish_time;
    }
}
