//! Request-time navigation guard.
//!
//! Runs before any handler. It only looks at the path and whether the
//! credential cookie is present; it never validates the credential, so a
//! stale cookie still passes until the session context notices and clears
//! it.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{GuardDecision, RouteTable};

/// Guard redirecting anonymous visitors away from protected paths and
/// signed-in visitors away from auth-only paths.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use portal::domain::RouteTable;
/// use portal::middleware::RouteGuard;
///
/// let app = App::new().wrap(RouteGuard::new(Arc::new(RouteTable::default()), "token"));
/// ```
#[derive(Clone)]
pub struct RouteGuard {
    table: Arc<RouteTable>,
    cookie_name: Rc<str>,
}

impl RouteGuard {
    /// Guard applying `table`, reading presence from `cookie_name`.
    pub fn new(table: Arc<RouteTable>, cookie_name: &str) -> Self {
        Self {
            table,
            cookie_name: Rc::from(cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service,
            table: Arc::clone(&self.table),
            cookie_name: Rc::clone(&self.cookie_name),
        }))
    }
}

/// Service wrapper produced by [`RouteGuard`].
pub struct RouteGuardMiddleware<S> {
    service: S,
    table: Arc<RouteTable>,
    cookie_name: Rc<str>,
}

impl<S> RouteGuardMiddleware<S> {
    fn has_credential(&self, req: &ServiceRequest) -> bool {
        req.cookie(&self.cookie_name)
            .is_some_and(|cookie| !cookie.value().trim().is_empty())
    }
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let has_credential = self.has_credential(&req);
        match self.table.decide(req.path(), has_credential) {
            GuardDecision::Allow => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            GuardDecision::Redirect { location } => {
                debug!(path = %req.path(), has_credential, %location, "route guard redirect");
                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, location))
                    .finish();
                let res = req.into_response(response).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the guard middleware.
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn call(path: &str, cookie: Option<&str>) -> (StatusCode, Option<String>) {
        let app = test::init_service(
            App::new()
                .wrap(RouteGuard::new(Arc::new(RouteTable::default()), "token"))
                .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let mut request = test::TestRequest::get().uri(path);
        if let Some(value) = cookie {
            request = request.cookie(Cookie::new("token", value.to_owned()));
        }
        let res = test::call_service(&app, request.to_request()).await;
        let location = res
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        (res.status(), location)
    }

    #[rstest]
    #[case("/dashboard", None, StatusCode::TEMPORARY_REDIRECT, Some("/auth/login"))]
    #[case("/profile/edit", None, StatusCode::TEMPORARY_REDIRECT, Some("/auth/login"))]
    #[case("/dashboard", Some(""), StatusCode::TEMPORARY_REDIRECT, Some("/auth/login"))]
    #[case("/dashboard", Some("abc"), StatusCode::OK, None)]
    #[case("/auth/login", Some("abc"), StatusCode::TEMPORARY_REDIRECT, Some("/dashboard"))]
    #[case("/auth/register", Some("abc"), StatusCode::TEMPORARY_REDIRECT, Some("/dashboard"))]
    #[case("/auth/login", None, StatusCode::OK, None)]
    #[case("/feed", None, StatusCode::OK, None)]
    #[case("/feed", Some("abc"), StatusCode::OK, None)]
    #[actix_web::test]
    async fn decisions_follow_the_route_table(
        #[case] path: &str,
        #[case] cookie: Option<&str>,
        #[case] status: StatusCode,
        #[case] location: Option<&str>,
    ) {
        let (actual_status, actual_location) = call(path, cookie).await;
        assert_eq!(actual_status, status);
        assert_eq!(actual_location.as_deref(), location);
    }

    #[actix_web::test]
    async fn other_cookies_do_not_count_as_a_session() {
        let app = test::init_service(
            App::new()
                .wrap(RouteGuard::new(Arc::new(RouteTable::default()), "token"))
                .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/dashboard")
            .cookie(Cookie::new("theme", "dark"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    }
}
