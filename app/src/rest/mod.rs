use crate::analytics::AnalyticsService;
use crate::config::CONFIG;
use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

mod analytics_routes;
mod doc_routes;
mod metric_routes;
mod query;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponseDto {
    pub error: String,
}

pub fn routes(
    service: &Arc<AnalyticsService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    analytics_routes::routes(service)
        .or(metric_routes::routes(service))
        .or(doc_routes::swagger())
        .with(warp::trace::request())
}

/// Serves the api until `shutdown` is cancelled
pub async fn dispatch_server_daemon(service: Arc<AnalyticsService>, shutdown: CancellationToken) {
    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.server_port()));
    let server = warp::serve(routes(&service))
        .try_bind_with_graceful_shutdown(addr, async move { shutdown.cancelled().await });

    match server {
        Ok((bound, server)) => {
            info!("Starting webserver at: {}", bound);
            server.await;
            info!("Webserver stopped");
        }
        Err(e) => error!("Failed binding webserver to {}: {}", addr, e),
    }
}

fn build_response<T: serde::Serialize>(
    resp: Result<T, ServiceError>,
) -> Result<Response, warp::Rejection> {
    match resp {
        Ok(data) => Ok(warp::reply::json(&data).into_response()),
        Err(ServiceError::User(err)) => {
            warn!("{}", err);
            Ok(error_reply(err.to_string(), StatusCode::BAD_REQUEST))
        }
        Err(ServiceError::Internal(err)) => {
            error!("{}", err);
            Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(ServiceError::Unavailable(err)) => {
            warn!("{}", err);
            Ok(error_reply(err.to_string(), StatusCode::SERVICE_UNAVAILABLE))
        }
    }
}

fn error_reply(error: String, status: StatusCode) -> Response {
    let body = warp::reply::json(&ErrorResponseDto { error });
    warp::reply::with_status(body, status).into_response()
}
