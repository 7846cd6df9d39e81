use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rod_solver::analysis::AnalysisOptions;
use rod_solver::error::AnalysisError;
use rod_solver::model::Structure;
use rod_solver::results::DisplacementVector;
use rod_solver::sampling::sample_uniform;
use rod_solver::validation;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::models::{
    AnalysisRequest, AnalysisResponse, ProjectCreated, ProjectUploaded, SectionsRequest,
    SectionsResponse, ValidationResponse,
};
use crate::spreadsheet::{self, SpreadsheetError};
use crate::store::ProjectStore;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Application state
pub struct AppState {
    store: ProjectStore,
    /// Chains with more nodes are rejected before assembly
    max_nodes: usize,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            store: ProjectStore::new(),
            max_nodes: config.max_nodes,
        }
    }

    /// Reject oversized chains, then run the full validator
    fn check_structure(&self, structure: &Structure) -> Result<(), ApiError> {
        let size = structure.num_nodes().max(structure.num_rods() + 1);
        if size > self.max_nodes {
            tracing::info!("Structure rejected: {} nodes exceeds {}", size, self.max_nodes);
            return Err(ApiError::Validation(vec![format!(
                "The structure has {} nodes; at most {} are accepted.",
                size, self.max_nodes
            )]));
        }

        let errors = validation::validate(structure);
        if errors.is_empty() {
            Ok(())
        } else {
            tracing::info!("Structure rejected with {} validation errors", errors.len());
            Err(ApiError::Validation(errors))
        }
    }

    fn run_analysis(
        &self,
        structure: &Structure,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResponse, ApiError> {
        self.check_structure(structure)?;

        let result = structure.analyze(options)?;
        let reactions = structure.reactions(&result.displacements)?;
        let equilibrium = structure.equilibrium(&result.displacements)?;

        tracing::info!(
            "Analysis finished: {} rods, residual {:e}",
            result.elements.len(),
            equilibrium.residual
        );

        Ok(AnalysisResponse {
            critical_rod_id: result.critical_element().map(|e| e.rod_id),
            passes_strength_check: result.passes_strength_check(),
            displacements: result.displacements,
            result_output: result.elements,
            reactions,
            equilibrium,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Build the API router
pub fn create_router(config: &ServiceConfig) -> Router {
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/v1/version", get(version_handler))
        .route("/api/v1/validate", post(validate_handler))
        .route("/api/v1/displacements", post(displacements_handler))
        .route("/api/v1/analyze", post(analyze_handler))
        .route("/api/v1/sections", post(sections_handler))
        .route("/api/v1/template", get(template_handler))
        .route("/api/v1/projects", post(create_project_handler))
        .route("/api/v1/projects/upload", post(upload_project_handler))
        .route(
            "/api/v1/projects/:id",
            get(get_project_handler).put(update_project_handler),
        )
        .route("/api/v1/projects/:id/analyze", post(analyze_project_handler))
        .route("/api/v1/projects/:id/export", get(export_project_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Root endpoint
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Rod Chain FEA Service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "description": "Axial analysis of straight rod chains",
        "formats": ["json", "xlsx"]
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "projects": state.store.len().await
    }))
}

/// Version endpoint
async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Rod Chain FEA Service",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "solver": "rod-solver (dense LU / Cholesky)"
    }))
}

/// Validate a structure without running analysis
async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Json(structure): Json<Structure>,
) -> Result<Json<ValidationResponse>, ApiError> {
    tracing::info!(
        "Validating structure: {} nodes, {} rods",
        structure.num_nodes(),
        structure.num_rods()
    );
    state.check_structure(&structure)?;

    Ok(Json(ValidationResponse {
        valid: true,
        message: "Structure validation passed".to_string(),
    }))
}

/// Nodal displacements only
async fn displacements_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<DisplacementVector>, ApiError> {
    state.check_structure(&request.structure)?;
    let options = request.options.unwrap_or_default();
    Ok(Json(request.structure.displacements(&options)?))
}

/// Run a full analysis on a posted structure
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    tracing::info!(
        "Received analysis request: {} nodes, {} rods",
        request.structure.num_nodes(),
        request.structure.num_rods()
    );
    let options = request.options.unwrap_or_default();
    state.run_analysis(&request.structure, &options).map(Json)
}

/// Sample every rod on a uniform grid
async fn sections_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SectionsRequest>,
) -> Result<Json<SectionsResponse>, ApiError> {
    state.check_structure(&request.structure)?;
    let options = request.options.unwrap_or_default();
    let result = request.structure.analyze(&options)?;
    let samples = sample_uniform(&result.elements, request.step)?;

    tracing::debug!("Produced {} section samples", samples.len());

    Ok(Json(SectionsResponse {
        step: request.step,
        samples,
    }))
}

/// Create a project; an empty body creates an empty project
async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ProjectCreated>), ApiError> {
    let structure = if body.iter().all(u8::is_ascii_whitespace) {
        Structure::default()
    } else {
        let structure: Structure = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid project JSON: {}", e)))?;
        state.check_structure(&structure)?;
        structure
    };

    let project_id = state.store.create(structure).await;
    tracing::info!("Created project {}", project_id);

    Ok((StatusCode::CREATED, Json(ProjectCreated { project_id })))
}

/// Fetch a stored project
async fn get_project_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Structure>, ApiError> {
    state.store.get(id).await.map(Json).ok_or(ApiError::NotFound(id))
}

/// Replace a project's structure; the new structure must validate
async fn update_project_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(structure): Json<Structure>,
) -> Result<Json<Structure>, ApiError> {
    if !state.store.exists(id).await {
        return Err(ApiError::NotFound(id));
    }
    state.check_structure(&structure)?;

    if !state.store.update(id, structure.clone()).await {
        return Err(ApiError::NotFound(id));
    }
    tracing::info!("Updated project {}", id);
    Ok(Json(structure))
}

/// Analyze a stored project, with optional analysis options as the body
async fn analyze_project_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    options: Option<Json<AnalysisOptions>>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let structure = state.store.get(id).await.ok_or(ApiError::NotFound(id))?;
    let options = options.map(|Json(o)| o).unwrap_or_default();

    tracing::info!("Analyzing project {}", id);
    state.run_analysis(&structure, &options).map(Json)
}

/// Import a project from a raw `.xlsx` request body
async fn upload_project_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ProjectUploaded>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let project = spreadsheet::read_structure(&body)?;
    state.check_structure(&project)?;

    let project_id = state.store.create(project.clone()).await;
    tracing::info!("Imported project {} from {} bytes", project_id, body.len());

    Ok((
        StatusCode::CREATED,
        Json(ProjectUploaded {
            project_id,
            project,
        }),
    ))
}

/// Download a project as an `.xlsx` workbook
async fn export_project_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let structure = state.store.get(id).await.ok_or(ApiError::NotFound(id))?;
    let bytes = spreadsheet::write_structure(&structure)?;
    Ok(xlsx_attachment(format!("project-{}.xlsx", id), bytes))
}

/// Download a filled-in example workbook
async fn template_handler() -> Result<Response, ApiError> {
    let bytes = spreadsheet::template()?;
    Ok(xlsx_attachment("template.xlsx".to_string(), bytes))
}

fn xlsx_attachment(filename: String, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// API Errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
    #[error("Project {0} not found")]
    NotFound(Uuid),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Analysis(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Spreadsheet(SpreadsheetError::Write(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Spreadsheet(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Analysis(e) => e.kind(),
            ApiError::Spreadsheet(_) => "spreadsheet",
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Validation(errors) => errors.clone(),
            _ => Vec::new(),
        };
        let message = match &self {
            ApiError::Validation(errors) => errors.first().cloned().unwrap_or_default(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("{}", message);
        }

        let body = Json(json!({
            "error": message,
            "kind": self.kind(),
            "details": details
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(&ServiceConfig::default())
    }

    fn cantilever_json() -> Value {
        json!({
            "rods": [{"id": 0, "length": 2.0, "area": 0.01, "elasticModulus": 2.1e11,
                      "allowableStress": 250e6, "distributedLoad": 0.0}],
            "nodes": [{"id": 0, "fixed": true, "externalForce": 0.0},
                      {"id": 1, "fixed": false, "externalForce": -10000.0}]
        })
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_and_version() {
        let app = app();
        let (status, body) = send_json(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["projects"], 0);

        let (status, body) = send_json(&app, empty_request("GET", "/api/v1/version")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["api_version"], "v1");
    }

    #[tokio::test]
    async fn analyze_cantilever() {
        let app = app();
        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/analyze", &cantilever_json())).await;

        assert_eq!(status, StatusCode::OK);
        let tip = body["displacements"][1].as_f64().unwrap();
        assert!((tip + 9.523_809_5e-6).abs() < 1e-12);

        let rod = &body["resultOutput"][0];
        assert_eq!(rod["rodId"], 0);
        assert!((rod["maxStressOnTheRod"].as_f64().unwrap() - 1.0e6).abs() < 1e-3);
        assert!((body["reactions"][0]["force"].as_f64().unwrap() - 10000.0).abs() < 1e-6);
        assert_eq!(body["passesStrengthCheck"], true);
    }

    #[tokio::test]
    async fn displacements_only() {
        let app = app();
        let (status, body) = send_json(
            &app,
            json_request("POST", "/api/v1/displacements", &cantilever_json()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0], 0.0);
    }

    #[tokio::test]
    async fn validation_errors_are_listed() {
        let app = app();
        let mut structure = cantilever_json();
        structure["nodes"][0]["fixed"] = json!(false);
        structure["rods"][0]["area"] = json!(0.0);

        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/validate", &structure)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["details"].as_array().unwrap().len(), 2);

        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/validate", &cantilever_json())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    async fn singular_system_is_unprocessable() {
        let app = app();
        let structure = json!({
            "rods": [
                {"id": 0, "length": 1.0, "area": 1.0, "elasticModulus": 1e30, "allowableStress": 1.0},
                {"id": 1, "length": 1.0, "area": 1.0, "elasticModulus": 1.0, "allowableStress": 1.0}
            ],
            "nodes": [{"id": 0, "fixed": true}, {"id": 1}, {"id": 2, "externalForce": 1.0}]
        });

        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/analyze", &structure)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "singular_system");
    }

    #[tokio::test]
    async fn sections_and_invalid_step() {
        let app = app();
        let request = json!({"structure": cantilever_json(), "step": 0.5});
        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/sections", &request)).await;
        assert_eq!(status, StatusCode::OK);
        let samples = body["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0]["isBoundary"], true);
        assert_eq!(samples[2]["x"], 1.0);

        let request = json!({"structure": cantilever_json(), "step": 0.0});
        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/sections", &request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_step");
    }

    #[tokio::test]
    async fn project_lifecycle() {
        let app = app();

        let (status, body) = send_json(&app, empty_request("POST", "/api/v1/projects")).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["projectId"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/projects/{}", id);

        let (status, body) = send_json(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rods"].as_array().unwrap().len(), 0);

        let (status, _) = send_json(&app, json_request("PUT", &uri, &cantilever_json())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send_json(&app, empty_request("POST", &format!("{}/analyze", uri))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resultOutput"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, empty_request("GET", &format!("{}/export", uri))).await;
        assert_eq!(status, StatusCode::OK);
        let exported = spreadsheet::read_structure(&body).unwrap();
        assert_eq!(exported, spreadsheet::template_structure());
    }

    #[tokio::test]
    async fn unknown_project() {
        let app = app();
        let uri = format!("/api/v1/projects/{}", Uuid::new_v4());

        let (status, body) = send_json(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, _) = send_json(&app, json_request("PUT", &uri, &cantilever_json())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_template() {
        let app = app();

        let (status, template) = send(&app, empty_request("GET", "/api/v1/template")).await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/projects/upload")
            .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
            .body(Body::from(template))
            .unwrap();
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["project"]["nodes"][1]["externalForce"], -10000.0);

        let (status, body) = send_json(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["projects"], 1);
    }

    #[tokio::test]
    async fn oversized_chain_is_rejected() {
        let config = ServiceConfig {
            max_nodes: 3,
            ..ServiceConfig::default()
        };
        let app = create_router(&config);
        let rods: Vec<Value> = (0..3)
            .map(|id| json!({"id": id, "length": 1.0, "area": 1.0, "elasticModulus": 1.0, "allowableStress": 1.0}))
            .collect();
        let structure = json!({
            "rods": rods,
            "nodes": [{"id": 0, "fixed": true}, {"id": 1}, {"id": 2}, {"id": 3, "externalForce": 1.0}]
        });

        for uri in ["/api/v1/validate", "/api/v1/analyze", "/api/v1/projects"] {
            let (status, body) = send_json(&app, json_request("POST", uri, &structure)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["kind"], "validation");
            assert!(body["error"].as_str().unwrap().contains("at most 3"));
        }

        let request = json!({"structure": structure, "step": 0.5});
        let (status, _) = send_json(&app, json_request("POST", "/api/v1/sections", &request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sample_count_is_capped() {
        let app = app();
        let rods: Vec<Value> = (0..50)
            .map(|id| json!({"id": id, "length": 2.0, "area": 1.0, "elasticModulus": 1.0, "allowableStress": 1.0}))
            .collect();
        let mut nodes: Vec<Value> = (0..51).map(|id| json!({"id": id})).collect();
        nodes[0]["fixed"] = json!(true);
        let request = json!({"structure": {"rods": rods, "nodes": nodes}, "step": 4e-4});

        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/sections", &request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_step");
    }

    #[tokio::test]
    async fn upload_garbage() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/projects/upload")
            .body(Body::from("definitely not a workbook"))
            .unwrap();
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "spreadsheet");
    }
}
