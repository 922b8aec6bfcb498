pub mod config;
pub mod error;
pub mod packet;
pub mod qdisc;
pub mod report;
pub mod router;
pub mod simulation;
pub mod stats;
pub mod token_bucket;
pub mod traffic;

pub use config::{ChokeMode, RouterConfig};
pub use error::SimError;
pub use packet::{ClassTable, Packet, TrafficClass};
pub use qdisc::{PolicyKind, Qdisc, Scheduler};
pub use router::Router;
pub use simulation::{BatchReport, Comparison, LiveSession, TickReport, run_batch};
pub use stats::{ClassCounters, StatsSnapshot};
pub use traffic::{BurstSchedule, ClassMix, TrafficGenerator};
