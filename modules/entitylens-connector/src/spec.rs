use serde::{Deserialize, Serialize};

/// Execution phases, run in strict order: `Discovery → Structured → Enrichment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discovery,
    Structured,
    Enrichment,
}

impl Phase {
    pub const ORDER: [Phase; 3] = [Phase::Discovery, Phase::Structured, Phase::Enrichment];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Discovery => "DISCOVERY",
            Phase::Structured => "STRUCTURED",
            Phase::Enrichment => "ENRICHMENT",
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DISCOVERY" => Ok(Self::Discovery),
            "STRUCTURED" => Ok(Self::Structured),
            "ENRICHMENT" => Ok(Self::Enrichment),
            other => Err(format!("unknown phase: {other}")),
        }
    }
}

/// Static registration metadata for a connector, consulted by the Lens
/// Loader (Gate 3 — connector registry reference integrity) and by the
/// Planner (connector selection and budget estimation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub name: String,
    pub phase: Phase,
    pub trust_level: u8,
    pub cost_per_call_usd: f64,
    pub avg_latency_ms: u64,
    pub timeout_ms: u64,
    pub requires: Vec<String>,
    pub provides: Vec<String>,
}

impl ConnectorSpec {
    pub fn trust_cost_ratio(&self) -> f64 {
        self.trust_level as f64 / (self.cost_per_call_usd + f64::EPSILON)
    }
}
