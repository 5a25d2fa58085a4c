/// Errors raised by the scheduler, resource pools and model configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Negative (or non-finite) scheduling delay
    InvalidDelay { delay: f64 },
    /// Staffing a pool above its hard ceiling
    CapacityExceedsTotal {
        pool: String,
        requested: usize,
        total: usize,
    },
    /// Lowering a pool's ceiling below its current staffing or held slots
    TotalBelowCapacity {
        pool: String,
        requested: usize,
        capacity: usize,
        in_use: usize,
    },
    /// Release on a pool with no held slots
    ReleaseWithoutHold { pool: String },
    /// A duration sampler produced a negative or non-finite value
    NegativeSample { value: f64 },
    InvalidDistribution(String),
    InvalidConfig(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidDelay { delay } => {
                write!(f, "Invalid delay: {} (must be finite and >= 0)", delay)
            }
            SimError::CapacityExceedsTotal {
                pool,
                requested,
                total,
            } => write!(
                f,
                "Capacity {} for pool '{}' exceeds total capacity {}",
                requested, pool, total
            ),
            SimError::TotalBelowCapacity {
                pool,
                requested,
                capacity,
                in_use,
            } => write!(
                f,
                "Total capacity {} for pool '{}' is below current capacity {} or held slots {}",
                requested, pool, capacity, in_use
            ),
            SimError::ReleaseWithoutHold { pool } => {
                write!(f, "Release on pool '{}' with no held slots", pool)
            }
            SimError::NegativeSample { value } => {
                write!(f, "Duration sampler returned invalid value {}", value)
            }
            SimError::InvalidDistribution(msg) => write!(f, "Invalid distribution: {}", msg),
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}
