use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Create,
    Delete,
}

/// Workload profiles controlling the mix of operations the workers issue.
///
/// | Profile     | LIST % | CREATE % | DELETE % |
/// |-------------|--------|----------|----------|
/// | ReadHeavy   |   80   |    18    |    2     |
/// | Balanced    |   50   |    45    |    5     |
/// | WriteHeavy  |   20   |    70    |   10     |
/// | CreateOnly  |    0   |   100    |    0     |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadProfile {
    ReadHeavy,
    Balanced,
    WriteHeavy,
    CreateOnly,
}

impl WorkloadProfile {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "read-heavy" => Some(WorkloadProfile::ReadHeavy),
            "balanced" => Some(WorkloadProfile::Balanced),
            "write-heavy" => Some(WorkloadProfile::WriteHeavy),
            "create-only" => Some(WorkloadProfile::CreateOnly),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            WorkloadProfile::ReadHeavy => "read-heavy",
            WorkloadProfile::Balanced => "balanced",
            WorkloadProfile::WriteHeavy => "write-heavy",
            WorkloadProfile::CreateOnly => "create-only",
        }
    }

    /// Draw a random operation using `rng`.
    pub fn sample(&self, rng: &mut impl Rng) -> Op {
        let roll: u32 = rng.gen_range(0..100);
        self.op_for_roll(roll)
    }

    /// Map a roll in `0..100` to an `Op` according to the profile's percentages.
    /// Exposed for deterministic testing.
    pub fn op_for_roll(&self, roll: u32) -> Op {
        let (list, create) = match self {
            WorkloadProfile::ReadHeavy => (80, 98),
            WorkloadProfile::Balanced => (50, 95),
            WorkloadProfile::WriteHeavy => (20, 90),
            WorkloadProfile::CreateOnly => (0, 100),
        };
        if roll < list {
            Op::List
        } else if roll < create {
            Op::Create
        } else {
            Op::Delete
        }
    }
}
