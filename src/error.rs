use thiserror::Error;

use crate::packet::TrafficClass;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("buffer size must be at least 1")]
    ZeroBuffer,
    #[error("router speed must be within [0, 1]: {0}")]
    InvalidRouterSpeed(f64),
    #[error("WFQ weight for {0} must be positive: {1}")]
    InvalidWeight(TrafficClass, f64),
    #[error("token bucket for {0} is invalid: capacity {1}, refill rate {2}")]
    InvalidBucket(TrafficClass, f64, f64), // class, capacity, rate
    #[error("traffic mix has no positive weight")]
    InvalidMix,
}
