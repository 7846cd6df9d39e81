//! Rod element - two-node axial bar

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// An axially loaded rod joining two consecutive nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rod {
    /// Rod number
    pub id: i64,
    /// Length L (m)
    pub length: f64,
    /// Cross-sectional area A (m²)
    pub area: f64,
    /// Modulus of elasticity E (Pa)
    pub elastic_modulus: f64,
    /// Allowable stress [σ] (Pa), only used for strength checks
    pub allowable_stress: f64,
    /// Uniform distributed load q (N/m), positive = tension
    #[serde(default)]
    pub distributed_load: f64,
}

impl Rod {
    /// Create an unloaded rod
    pub fn new(id: i64, length: f64, area: f64, elastic_modulus: f64, allowable_stress: f64) -> Self {
        Self {
            id,
            length,
            area,
            elastic_modulus,
            allowable_stress,
            distributed_load: 0.0,
        }
    }

    /// Return a copy carrying a uniform distributed load
    pub fn with_distributed_load(self, q: f64) -> Self {
        Self {
            distributed_load: q,
            ..self
        }
    }

    /// Return a copy with a different elastic modulus
    pub fn with_elastic_modulus(self, e: f64) -> Self {
        Self {
            elastic_modulus: e,
            ..self
        }
    }

    /// Axial stiffness EA/L
    pub fn stiffness(&self) -> f64 {
        self.elastic_modulus * self.area / self.length
    }

    /// Axial rigidity EA
    pub fn rigidity(&self) -> f64 {
        self.elastic_modulus * self.area
    }

    /// Resultant of the distributed load, q·L
    pub fn total_distributed_load(&self) -> f64 {
        self.distributed_load * self.length
    }

    /// Reject non-positive or non-finite properties the engine depends on
    pub fn check_properties(&self) -> AnalysisResult<()> {
        let checks = [
            ("length", self.length),
            ("area", self.area),
            ("elastic modulus", self.elastic_modulus),
            ("allowable stress", self.allowable_stress),
        ];
        for (property, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::NumericRange {
                    rod: self.id,
                    property,
                    value,
                });
            }
        }
        if !self.distributed_load.is_finite() {
            return Err(AnalysisError::NumericRange {
                rod: self.id,
                property: "distributed load",
                value: self.distributed_load,
            });
        }
        Ok(())
    }
}
