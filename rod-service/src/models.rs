use rod_solver::analysis::AnalysisOptions;
use rod_solver::model::Structure;
use rod_solver::results::{DisplacementVector, ElementResult, EquilibriumCheck, NodeReaction};
use rod_solver::sampling::SectionSample;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Analysis request: a structure plus optional engine options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(flatten)]
    pub structure: Structure,
    #[serde(default)]
    pub options: Option<AnalysisOptions>,
}

/// Analysis response: the full result plus supports and balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub displacements: DisplacementVector,
    pub result_output: Vec<ElementResult>,
    pub reactions: Vec<NodeReaction>,
    pub equilibrium: EquilibriumCheck,
    /// Rod with the highest utilization
    pub critical_rod_id: Option<i64>,
    pub passes_strength_check: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsRequest {
    pub structure: Structure,
    pub step: f64,
    #[serde(default)]
    pub options: Option<AnalysisOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsResponse {
    pub step: f64,
    pub samples: Vec<SectionSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreated {
    pub project_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUploaded {
    pub project_id: Uuid,
    pub project: Structure,
}
