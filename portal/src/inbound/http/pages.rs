//! Placeholder page handler for paths the route guard lets through.
//!
//! Rendering is out of scope for the edge server; it answers with a small
//! JSON description of what would be served so the guard can be exercised
//! end to end.

use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::TraceId;

/// Body returned for an allowed navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// Requested path.
    pub path: String,
    /// Correlation identifier of the request, when tracing is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Default service answering every path that reached it.
pub async fn page(req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(PageView {
        path: req.path().to_owned(),
        trace_id: TraceId::current().map(|id| id.to_string()),
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::{App, test, web};

    #[actix_web::test]
    async fn echoes_the_requested_path() {
        let app = test::init_service(App::new().default_service(web::to(page))).await;
        let req = test::TestRequest::get().uri("/feed?page=2").to_request();
        let body: PageView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.path, "/feed");
        assert_eq!(body.trace_id, None);
    }
}
