//! REST handlers and router.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AssessVitalsReq, AssessVitalsRes, CreatePatientReq, HealthRes, HealthService, ListVitalsRes,
    PatientRecord, RecordVitalsReq, RecordVitalsRes, RiskSummaryRes, VitalsRecord,
};
use mobimama_core::{
    CoreConfig, CoreError, IngestError, PatientService, RecordId, RecordStore, VitalSigns,
    VitalsHistory, VitalsIngestion, VitalsReadingInput,
};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers.
///
/// Every service holds the same record store.
#[derive(Clone)]
pub struct AppState {
    ingestion: VitalsIngestion,
    history: VitalsHistory,
    patients: PatientService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, cfg: &CoreConfig) -> Self {
        Self {
            ingestion: VitalsIngestion::from_config(store.clone(), cfg),
            history: VitalsHistory::new(store.clone()),
            patients: PatientService::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        assess_vitals,
        record_vitals,
        list_vitals,
        high_risk_vitals,
        risk_summary,
        create_patient,
        get_patient,
        patient_vitals,
    ),
    components(schemas(
        HealthRes,
        AssessVitalsReq,
        AssessVitalsRes,
        RecordVitalsReq,
        RecordVitalsRes,
        VitalsRecord,
        ListVitalsRes,
        RiskSummaryRes,
        CreatePatientReq,
        PatientRecord,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI/Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/vitals", get(list_vitals).post(record_vitals))
        .route("/vitals/assess", post(assess_vitals))
        .route("/vitals/high-risk", get(high_risk_vitals))
        .route("/vitals/summary", get(risk_summary))
        .route("/patients", post(create_patient))
        .route("/patients/:id", get(get_patient))
        .route("/patients/:id/vitals", get(patient_vitals))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_patient_id(id: &str) -> Result<RecordId, ApiError> {
    RecordId::parse(id).map_err(|e| {
        tracing::debug!("rejected patient id {:?}: {}", id, e);
        (StatusCode::BAD_REQUEST, "Invalid patient id")
    })
}

fn internal_error(context: &str, e: CoreError) -> ApiError {
    tracing::error!("{} error: {:?}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/vitals/assess",
    request_body = AssessVitalsReq,
    responses(
        (status = 200, description = "Risk assessment", body = AssessVitalsRes),
        (status = 400, description = "Bad request")
    )
)]
/// Assess a set of vitals without storing anything.
///
/// Lets a form show the tier before the reading is submitted.
#[axum::debug_handler]
async fn assess_vitals(
    State(_state): State<AppState>,
    Json(req): Json<AssessVitalsReq>,
) -> Result<Json<AssessVitalsRes>, ApiError> {
    let vitals = VitalSigns::try_from(req).map_err(|e| {
        tracing::debug!("invalid assess request: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid vitals")
    })?;
    Ok(Json(mobimama_core::score(&vitals).into()))
}

#[utoipa::path(
    post,
    path = "/vitals",
    request_body = RecordVitalsReq,
    responses(
        (status = 201, description = "Reading stored", body = RecordVitalsRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Reading could not be stored")
    )
)]
/// Record a vitals reading.
///
/// The tier is computed server side and stored with the reading. A `high` or `critical`
/// tier is also written to the patient's risk level; if that second write fails the
/// reading is still stored and the response carries a `warning`.
#[axum::debug_handler]
async fn record_vitals(
    State(state): State<AppState>,
    Json(req): Json<RecordVitalsReq>,
) -> Result<(StatusCode, Json<RecordVitalsRes>), ApiError> {
    let input = VitalsReadingInput::try_from(req).map_err(|e| {
        tracing::debug!("invalid vitals request: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid vitals reading")
    })?;

    match state.ingestion.ingest(input) {
        Ok(ingested) => Ok((StatusCode::CREATED, Json(ingested.into()))),
        Err(e @ IngestError::NonFiniteMeasurement { .. }) => {
            tracing::debug!("invalid vitals reading: {}", e);
            Err((StatusCode::BAD_REQUEST, "Invalid vitals reading"))
        }
        Err(e) => {
            tracing::error!("Record vitals error: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store vitals reading",
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/vitals",
    responses(
        (status = 200, description = "All readings, newest first", body = ListVitalsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_vitals(State(state): State<AppState>) -> Result<Json<ListVitalsRes>, ApiError> {
    state
        .history
        .all()
        .map(|readings| Json(readings.into()))
        .map_err(|e| internal_error("List vitals", e))
}

#[utoipa::path(
    get,
    path = "/vitals/high-risk",
    responses(
        (status = 200, description = "High and critical readings", body = ListVitalsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn high_risk_vitals(
    State(state): State<AppState>,
) -> Result<Json<ListVitalsRes>, ApiError> {
    state
        .history
        .high_risk()
        .map(|readings| Json(readings.into()))
        .map_err(|e| internal_error("High-risk vitals", e))
}

#[utoipa::path(
    get,
    path = "/vitals/summary",
    responses(
        (status = 200, description = "Reading counts by tier", body = RiskSummaryRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn risk_summary(State(state): State<AppState>) -> Result<Json<RiskSummaryRes>, ApiError> {
    state
        .history
        .summary()
        .map(|summary| Json(summary.into()))
        .map_err(|e| internal_error("Risk summary", e))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientRecord),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a minimal patient row so readings can be flagged against it.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    match state.patients.register(&req.first_name, &req.last_name) {
        Ok(patient) => Ok((StatusCode::CREATED, Json(patient.into()))),
        Err(CoreError::InvalidInput(_)) => Err((
            StatusCode::BAD_REQUEST,
            "first_name and last_name are required",
        )),
        Err(e) => Err(internal_error("Create patient", e)),
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id (32 lowercase hex)")),
    responses(
        (status = 200, description = "Patient", body = PatientRecord),
        (status = 400, description = "Invalid patient id"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientRecord>, ApiError> {
    let id = parse_patient_id(&id)?;
    match state.patients.get(&id) {
        Ok(Some(patient)) => Ok(Json(patient.into())),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Patient not found")),
        Err(e) => Err(internal_error("Get patient", e)),
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}/vitals",
    params(("id" = String, Path, description = "Patient id (32 lowercase hex)")),
    responses(
        (status = 200, description = "The patient's readings, newest first", body = ListVitalsRes),
        (status = 400, description = "Invalid patient id"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn patient_vitals(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ListVitalsRes>, ApiError> {
    let id = parse_patient_id(&id)?;
    state
        .history
        .for_patient(&id)
        .map(|readings| Json(readings.into()))
        .map_err(|e| internal_error("Patient vitals", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use mobimama_core::{MemoryStore, StoreBackend};
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let cfg = CoreConfig::new(StoreBackend::Memory, PathBuf::new(), 1)
            .expect("CoreConfig::new should succeed");
        router(AppState::new(Arc::new(MemoryStore::new()), &cfg))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_patient_id(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/patients",
            Some(json!({"first_name": "Amina", "last_name": "Yusuf"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().expect("id should be present").to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn test_assess_returns_tier_and_findings() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/vitals/assess",
            Some(json!({"systolic_bp": 85, "diastolic_bp": 55})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["risk_tier"], json!("medium"));
        assert_eq!(body["points"], json!(2));
        assert_eq!(body["findings"], json!(["hypotension"]));
    }

    #[tokio::test]
    async fn test_assess_rejects_unknown_protein_value() {
        let app = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/vitals/assess",
            Some(json!({"urine_protein": "lots"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_record_critical_reading_flags_patient() {
        let app = test_app();
        let patient_id = create_patient_id(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/vitals",
            Some(json!({
                "patient_id": patient_id,
                "systolic_bp": 170,
                "diastolic_bp": 120,
                "temperature_c": 39.0,
                "risk_tier": "low"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["reading"]["risk_tier"], json!("critical"));
        assert_eq!(body["patient_flag"], json!("applied"));
        assert_eq!(body["warning"], Value::Null);

        let (_, patient) = send(&app, "GET", &format!("/patients/{}", patient_id), None).await;
        assert_eq!(patient["risk_level"], json!("critical"));
    }

    #[tokio::test]
    async fn test_record_for_unknown_patient_stores_with_warning() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/vitals",
            Some(json!({
                "patient_id": "550e8400e29b41d4a716446655440000",
                "urine_protein": "strong",
                "hemoglobin_gdl": 9.5
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["reading"]["risk_tier"], json!("high"));
        assert_eq!(body["patient_flag"], json!("failed"));
        assert!(body["warning"].is_string());

        let (_, list) = send(&app, "GET", "/vitals", None).await;
        assert_eq!(list["readings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_rejects_invalid_patient_id() {
        let app = test_app();
        let (status, _) = send(&app, "POST", "/vitals", Some(json!({"patient_id": "p1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, "GET", "/vitals", None).await;
        assert!(list["readings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patient_vitals_high_risk_and_summary() {
        let app = test_app();
        let patient_id = create_patient_id(&app).await;

        for (day, reading) in [
            (1, json!({"fetal_heart_rate_bpm": 140})),
            (2, json!({"fetal_heart_rate_bpm": 105})),
            (3, json!({"systolic_bp": 165, "diastolic_bp": 95})),
        ] {
            let mut body = reading;
            body["patient_id"] = json!(patient_id);
            body["recorded_at"] = json!(format!("2026-10-0{}T09:00:00Z", day));
            let (status, _) = send(&app, "POST", "/vitals", Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, history) = send(
            &app,
            "GET",
            &format!("/patients/{}/vitals", patient_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let tiers: Vec<&str> = history["readings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["risk_tier"].as_str().unwrap())
            .collect();
        assert_eq!(tiers, vec!["high", "medium", "low"]);

        let (_, high_risk) = send(&app, "GET", "/vitals/high-risk", None).await;
        assert_eq!(high_risk["readings"].as_array().unwrap().len(), 1);

        let (_, summary) = send(&app, "GET", "/vitals/summary", None).await;
        assert_eq!(
            summary,
            json!({"high": 1, "medium": 1, "normal": 1, "total": 3})
        );
    }

    #[tokio::test]
    async fn test_patient_routes_validate_id() {
        let app = test_app();

        let (status, _) = send(&app, "GET", "/patients/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "GET",
            "/patients/550e8400e29b41d4a716446655440000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_patient_rejects_blank_names() {
        let app = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/patients",
            Some(json!({"first_name": " ", "last_name": "Yusuf"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
