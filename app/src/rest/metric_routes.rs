use super::build_response;
use crate::analytics::AnalyticsService;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<AnalyticsService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    health(service.clone())
}

/// GET api/health
///
/// Returns a `HealthyDto` with the state of the irrigation data source
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Service state", body = HealthyDto))
)]
pub(super) fn health(
    service: Arc<AnalyticsService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::get())
        .and(warp::path!("api" / "health"))
        .and_then(|service: Arc<AnalyticsService>| async move {
            let state = service.source_state().await;
            let ret = dto::HealthyDto {
                healthy: state.is_ok(),
                database_state: state.err().unwrap_or_else(|| "ok".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                core_version: irrigation_core::CORE_VERSION.to_owned(),
            };
            build_response(Ok(ret))
        })
        .boxed()
}

pub mod dto {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct HealthyDto {
        pub healthy: bool,
        pub database_state: String,
        pub version: String,
        pub core_version: String,
    }
}

use dto::HealthyDto;
