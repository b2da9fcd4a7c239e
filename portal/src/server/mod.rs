//! Edge server construction and middleware wiring.
//!
//! Every request passes the trace middleware first, then the route guard;
//! only requests the guard allows reach the health checks or the page
//! handler.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use portal::Trace;
use portal::inbound::http::{HealthState, live, page, ready};
use portal::middleware::RouteGuard;

fn build_app(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .wrap(RouteGuard::new(config.routes, &config.cookie_name))
        .wrap(Trace)
        .service(ready)
        .service(live)
        .default_service(web::to(page))
}

/// Construct the edge server using the provided health state and configuration.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let bind_addr = config.bind_addr();
    let routes = Arc::clone(&config.routes);
    let server = HttpServer::new(move || build_app(server_health_state.clone(), config.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "edge server listening");
    health_state.guard_installed(&routes);
    Ok(server)
}
