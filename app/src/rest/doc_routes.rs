use super::analytics_routes::{self, dto as analytics_dto};
use super::metric_routes::{self, dto as metric_dto};
use super::ErrorResponseDto;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::Config;
use warp::Filter;
use warp::{
    http::Uri,
    hyper::{Response, StatusCode},
    path::{FullPath, Tail},
    Rejection, Reply,
};

#[derive(OpenApi)]
#[openapi(
    paths(analytics_routes::farm_analytics, metric_routes::health),
    components(schemas(
        analytics_dto::FarmAnalyticsDto,
        analytics_dto::PeriodDto,
        analytics_dto::SummaryDto,
        analytics_dto::TimeSeriesRowDto,
        metric_dto::HealthyDto,
        ErrorResponseDto
    )),
    tags(
        (name = "analytics", description = "Irrigation analytics per farm"),
        (name = "health", description = "Service state")
    )
)]
struct ApiDoc;

pub fn swagger() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = ApiDoc::openapi();
    let config = Arc::new(Config::from("/api/doc/api.json"));

    warp::path!("api" / "doc" / "api.json")
        .and(warp::get())
        .map(move || warp::reply::json(&api))
        .or(warp::path("api")
            .and(warp::path("doc"))
            .and(warp::get())
            .and(warp::path::full())
            .and(warp::path::tail())
            .and(warp::any().map(move || config.clone()))
            .and_then(serve_swagger))
}

async fn serve_swagger(
    full_path: FullPath,
    tail: Tail,
    config: Arc<Config<'static>>,
) -> Result<Box<dyn Reply + 'static>, Rejection> {
    if full_path.as_str() == "/api/doc" {
        return Ok(Box::new(warp::redirect::found(Uri::from_static(
            "/api/doc/",
        ))));
    }

    match utoipa_swagger_ui::serve(tail.as_str(), config) {
        Ok(Some(file)) => Ok(Box::new(
            Response::builder()
                .header("Content-Type", file.content_type)
                .body(file.bytes),
        )),
        Ok(None) => Ok(Box::new(StatusCode::NOT_FOUND)),
        Err(error) => Ok(Box::new(
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(error.to_string()),
        )),
    }
}
