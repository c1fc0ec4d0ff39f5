use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use leadlytics_core::config::{AuthMode, Config};
use leadlytics_core::model::{
    CloseStage, Company, Contact, Followup, Lead, OpenStage, Pipeline, Source,
};
use leadlytics_duckdb::DuckDbBackend;
use leadlytics_server::app::build_app;
use leadlytics_server::auth::jwt::encode_jwt;
use leadlytics_server::state::AppState;

const SECRET: &str = "test-secret";
const ORG: &str = "org_acme";

fn config(auth_mode: AuthMode, default_organization: Option<&str>) -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/leadlytics-test".to_string(),
        duckdb_memory_limit: "1GB".to_string(),
        auth_mode,
        default_organization: default_organization.map(str::to_string),
        fetch_timeout_ms: 5000,
        cors_origins: vec![],
    }
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn pipeline(id: &str, name: &str) -> Pipeline {
    Pipeline {
        id: id.to_string(),
        organization_id: ORG.to_string(),
        name: name.to_string(),
        open_stages: vec![OpenStage {
            name: "New".to_string(),
            color: None,
        }],
        close_stages: vec![
            CloseStage {
                name: "Won".to_string(),
                color: None,
                won: true,
                lost: false,
            },
            CloseStage {
                name: "Lost".to_string(),
                color: None,
                won: false,
                lost: true,
            },
        ],
    }
}

fn lead(id: &str, pipeline_id: &str, stage: &str, amount: f64, created_at: DateTime<Utc>) -> Lead {
    Lead {
        id: id.to_string(),
        organization_id: ORG.to_string(),
        title: format!("Deal {id}"),
        amount,
        stage: stage.to_string(),
        pipeline_id: pipeline_id.to_string(),
        source_id: None,
        contact_id: None,
        created_at,
    }
}

/// Three leads in "Sales" (won, lost, open) and one won lead in "Renewals".
async fn seeded_db() -> DuckDbBackend {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.seed_organization(ORG, "Acme").await.expect("org");
    db.insert_pipeline(&pipeline("pipe_sales", "Sales"))
        .await
        .expect("pipeline");
    db.insert_pipeline(&pipeline("pipe_renewals", "Renewals"))
        .await
        .expect("pipeline");
    db.insert_source(&Source {
        id: "src_ads".to_string(),
        organization_id: ORG.to_string(),
        name: "Ads".to_string(),
    })
    .await
    .expect("source");
    db.insert_company(&Company {
        id: "co_initech".to_string(),
        organization_id: ORG.to_string(),
        name: "Initech".to_string(),
    })
    .await
    .expect("company");
    db.insert_contact(&Contact {
        id: "ct_peter".to_string(),
        organization_id: ORG.to_string(),
        name: "Peter".to_string(),
        company_id: Some("co_initech".to_string()),
    })
    .await
    .expect("contact");

    let mut won = lead("l1", "pipe_sales", "Won", 100.0, at(2024, 1, 5, 9));
    won.source_id = Some("src_ads".to_string());
    won.contact_id = Some("ct_peter".to_string());
    for lead in [
        won,
        lead("l2", "pipe_sales", "Lost", 50.0, at(2024, 1, 5, 17)),
        lead("l3", "pipe_sales", "New", 30.0, at(2024, 1, 20, 8)),
        lead("l4", "pipe_renewals", "Won", 20.0, at(2024, 3, 2, 12)),
    ] {
        db.insert_lead(&lead).await.expect("lead");
    }

    db.insert_followup(&Followup {
        id: "f1".to_string(),
        organization_id: ORG.to_string(),
        stage: "Open".to_string(),
        followup_type: "Email".to_string(),
        followup_date: at(2024, 1, 6, 10),
    })
    .await
    .expect("followup");
    db
}

async fn jwt_app() -> axum::Router {
    let state = AppState::new(
        seeded_db().await,
        config(AuthMode::Jwt(SECRET.to_string()), None),
    );
    build_app(Arc::new(state))
}

fn token_for(org: &str) -> String {
    encode_jwt(SECRET, "user_1", org, chrono::Duration::hours(1)).expect("token")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("build request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

// ============================================================
// Auth: organization scope comes from the bearer token
// ============================================================
#[tokio::test]
async fn test_dashboard_requires_bearer_token() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get("/reports/dashboard", None))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_dashboard_rejects_token_signed_with_other_secret() {
    let app = jwt_app().await;
    let forged = encode_jwt("not-the-secret", "user_1", ORG, chrono::Duration::hours(1))
        .expect("token");

    let response = app
        .oneshot(get("/reports/dashboard", Some(&forged)))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_returns_full_report_shape() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get("/reports/dashboard", Some(&token_for(ORG))))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    for key in [
        "summary",
        "timeBasedReports",
        "sourceWiseReports",
        "pipelineWiseReports",
        "stageWiseReports",
        "companyWiseReports",
        "followupStats",
        "conversionRates",
        "pipelineFunnels",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    for key in ["daily", "weekly", "monthly", "yearly"] {
        assert!(json["timeBasedReports"][key].is_array(), "missing series {key}");
    }

    assert_eq!(json["summary"]["totalCount"], 4);
    assert_eq!(json["summary"]["totalAmount"], 200.0);
    assert_eq!(json["summary"]["wonCount"], 2);
    assert_eq!(json["summary"]["lostCount"], 1);
    assert_eq!(json["conversionRates"]["overall"], 50.0);

    let daily = json["timeBasedReports"]["daily"].as_array().expect("daily");
    assert_eq!(daily[0]["periodKey"], "2024-01-05");
    assert_eq!(daily[0]["count"], 2);

    let pipelines = json["pipelineWiseReports"].as_array().expect("pipelines");
    assert_eq!(pipelines[0]["key"], "pipe_sales");
    assert_eq!(pipelines[0]["label"], "Sales");
    assert_eq!(pipelines[0]["totalCount"], 3);

    assert_eq!(json["followupStats"][0]["emailCount"], 1);
}

#[tokio::test]
async fn test_dashboard_unknown_organization_is_404() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get("/reports/dashboard", Some(&token_for("org_ghost"))))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

// ============================================================
// Query parameters
// ============================================================
#[tokio::test]
async fn test_dashboard_filters_by_pipeline_and_dates() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get(
            "/reports/dashboard?pipelineId=pipe_sales&startDate=2024-01-05&endDate=2024-01-05",
            Some(&token_for(ORG)),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["summary"]["totalCount"], 2);
    assert_eq!(json["summary"]["wonCount"], 1);
    assert_eq!(json["conversionRates"]["overall"], 50.0);
}

#[tokio::test]
async fn test_dashboard_filters_by_company_through_contacts() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get(
            "/reports/dashboard?companyId=co_initech",
            Some(&token_for(ORG)),
        ))
        .await
        .expect("request");
    let json = json_body(response).await;
    assert_eq!(json["summary"]["totalCount"], 1);
    assert_eq!(json["companyWiseReports"][0]["label"], "Initech");
    assert_eq!(json["sourceWiseReports"][0]["label"], "Ads");
}

#[tokio::test]
async fn test_dashboard_ignores_lone_start_date() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get(
            "/reports/dashboard?startDate=2024-03-01",
            Some(&token_for(ORG)),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["summary"]["totalCount"], 4);
}

#[tokio::test]
async fn test_dashboard_rejects_malformed_date() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get(
            "/reports/dashboard?startDate=05-01-2024&endDate=2024-01-31",
            Some(&token_for(ORG)),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["field"], "startDate");
}

#[tokio::test]
async fn test_dashboard_rejects_reversed_range() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get(
            "/reports/dashboard?startDate=2024-02-01&endDate=2024-01-01",
            Some(&token_for(ORG)),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["field"], "endDate");
}

#[tokio::test]
async fn test_dashboard_empty_filter_result_is_zero_report() {
    let app = jwt_app().await;

    let response = app
        .oneshot(get(
            "/reports/dashboard?sourceId=src_missing",
            Some(&token_for(ORG)),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["summary"]["totalCount"], 0);
    assert_eq!(json["conversionRates"]["overall"], 0.0);
    assert_eq!(json["timeBasedReports"]["daily"], serde_json::json!([]));
}

// ============================================================
// Auth disabled: default organization
// ============================================================
#[tokio::test]
async fn test_auth_none_uses_default_organization() {
    let state = AppState::new(seeded_db().await, config(AuthMode::None, Some(ORG)));
    let app = build_app(Arc::new(state));

    let response = app
        .oneshot(get("/reports/dashboard", None))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["summary"]["totalCount"], 4);
}

#[tokio::test]
async fn test_auth_none_without_default_organization_is_401() {
    let state = AppState::new(seeded_db().await, config(AuthMode::None, None));
    let app = build_app(Arc::new(state));

    let response = app
        .oneshot(get("/reports/dashboard", None))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================
// Store failure surfaces as 500 without partial data
// ============================================================
#[tokio::test]
async fn test_store_failure_is_500_without_report() {
    let state = Arc::new(AppState::new(
        seeded_db().await,
        config(AuthMode::Jwt(SECRET.to_string()), None),
    ));
    state
        .db
        .conn_for_test()
        .await
        .execute_batch("DROP TABLE followups")
        .expect("drop table");
    let app = build_app(Arc::clone(&state));

    let response = app
        .oneshot(get("/reports/dashboard", Some(&token_for(ORG))))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "internal_error");
    assert_eq!(json["error"]["message"], "Internal server error");
    assert!(json.get("summary").is_none());
}
