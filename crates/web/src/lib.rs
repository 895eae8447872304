pub use crate::common::RouteResult;
pub use crate::config::WebConfig;

use axum::Router;
use stations::{database::Database, StationService};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod common;
pub mod config;

#[derive(Debug, Clone)]
pub struct WebState<D>
where
    D: Database + 'static,
{
    pub stations: StationService<D>,
}

impl<D: Database> WebState<D> {
    pub fn new(stations: StationService<D>) -> Self {
        Self { stations }
    }
}

pub fn router<D: Database + 'static>(state: WebState<D>) -> Router {
    api::routes(state).layer(TraceLayer::new_for_http())
}

pub async fn serve(listener: TcpListener, routes: Router) -> std::io::Result<()> {
    axum::serve(listener, routes.into_make_service()).await
}

pub async fn start_web_server<D: Database + 'static>(
    config: WebConfig,
    state: WebState<D>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.socket_address()).await?;
    log::info!("stations service running on {}", listener.local_addr()?);

    serve(listener, router(state)).await
}
