//! Counter-cyclical policy instruments, grouped by whether they brake or accelerate
//! the economy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    Brake,
    Accelerate,
}

impl PolicyMode {
    pub fn color(self) -> &'static str {
        match self {
            PolicyMode::Brake => "#e74c3c",
            PolicyMode::Accelerate => "#27ae60",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PolicyMode::Brake => "Brake",
            PolicyMode::Accelerate => "Accelerate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInstrument {
    pub name: String,
    pub mode: PolicyMode,
}

impl PolicyInstrument {
    pub fn new(name: impl Into<String>, mode: PolicyMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }
}

pub fn default_instruments() -> Vec<PolicyInstrument> {
    vec![
        PolicyInstrument::new("Cut investment incentives", PolicyMode::Brake),
        PolicyInstrument::new("Tighten credit to overheating sectors", PolicyMode::Brake),
        PolicyInstrument::new("Raise public investment", PolicyMode::Accelerate),
        PolicyInstrument::new("Targeted credit incentives", PolicyMode::Accelerate),
    ]
}
