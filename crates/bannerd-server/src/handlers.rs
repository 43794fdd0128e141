use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bannerd_auth::{AdminAuth, BearerAuth};
use bannerd_core::{BannerContent, BannerId, BannerPatch, FeatureId, NewBanner, TagId};
use bannerd_storage::BannerFilter;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Ready when the primary store answers and the read cache is reachable.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state
        .banners
        .list_for_admin(&BannerFilter::new().with_limit(1))
        .await
        .is_ok();
    let cache_ok = state.cache.is_available().await;

    if store_ok && cache_ok {
        (StatusCode::OK, Json(HealthResponse { status: "ready" }))
    } else {
        tracing::warn!(store_ok, cache_ok, "readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
            }),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UserBannerQuery {
    pub tag_id: TagId,
    pub feature_id: FeatureId,
    #[serde(default)]
    pub use_last_revision: bool,
}

/// `GET /user_banner`: the banner content for the caller's tag.
pub async fn user_banner(
    State(state): State<AppState>,
    BearerAuth(caller): BearerAuth,
    query: Result<Query<UserBannerQuery>, QueryRejection>,
) -> Result<Json<BannerContent>, ApiError> {
    let Query(query) = query?;
    if query.tag_id <= 0 || query.feature_id <= 0 {
        return Err(ApiError::bad_request(
            "tag_id and feature_id must be positive integers",
        ));
    }

    let banner = state
        .banners
        .get_one_for_user(
            &caller,
            query.feature_id,
            query.tag_id,
            query.use_last_revision,
        )
        .await?;
    Ok(Json(banner.content))
}

/// `GET /banner`: the catalog, filtered and paginated.
pub async fn list_banners(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    filter: Result<Query<BannerFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(filter) = filter?;
    let banners = state.banners.list_for_admin(&filter).await?;
    Ok(Json(banners))
}

/// `POST /banner`
pub async fn create_banner(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    body: Result<Json<NewBanner>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(banner) = body?;
    let created = state.banners.create(banner).await?;
    tracing::info!(banner_id = created.id, admin = %admin.name, "banner created");
    Ok((StatusCode::CREATED, Json(json!({ "banner_id": created.id }))))
}

/// `PATCH /banner/{id}`
pub async fn update_banner(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    id: Result<Path<BannerId>, PathRejection>,
    body: Result<Json<BannerPatch>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(patch) = body?;
    state.banners.update(id, patch).await?;
    tracing::info!(banner_id = id, admin = %admin.name, "banner updated");
    Ok(StatusCode::OK)
}

/// `DELETE /banner/{id}`
pub async fn delete_banner(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    id: Result<Path<BannerId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.banners.delete(id).await?;
    tracing::info!(banner_id = id, admin = %admin.name, "banner deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
}

/// `POST /signin`
pub async fn signin(
    State(state): State<AppState>,
    body: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<SigninResponse>, ApiError> {
    let Json(request) = body?;
    if request.name.is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    let token = state.signin.sign_in(&request.name).await?;
    Ok(Json(SigninResponse { token }))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AppConfig, StorageBackend};
    use crate::server::{build_app, build_state};

    async fn app() -> axum::Router {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::Memory;
        cfg.auth.secret = "handler-tests".into();
        let (state, _sync) = build_state(&cfg).await.unwrap();
        build_app(state, &cfg)
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let response = app()
            .await
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn user_banner_requires_a_token() {
        let response = app()
            .await
            .oneshot(
                Request::get("/user_banner?tag_id=1&feature_id=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signin_rejects_malformed_body() {
        let response = app()
            .await
            .oneshot(
                Request::post("/signin")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"nom\":1}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
