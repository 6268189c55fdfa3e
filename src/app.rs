use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, courses};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/user", auth::router())
                .nest("/course", courses::router(state.clone()))
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(config: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{
            header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
            Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// `name=value` part of a `Set-Cookie` header, as a browser would send it back.
    fn cookie_pair(res: &Response) -> String {
        let raw = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signup_login_create_then_list() {
        let app = build_app(AppState::fake());

        let signup = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/user/signup",
                None,
                json!({
                    "name": "Admin",
                    "email": "admin@example.com",
                    "password": "hunter22",
                    "confirmPassword": "hunter22",
                    "role": "admin",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(signup.status(), StatusCode::CREATED);

        let login = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/user/login",
                None,
                json!({ "email": "admin@example.com", "password": "hunter22" }),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::CREATED);
        let cookie = cookie_pair(&login);
        assert!(cookie.starts_with("jwt="));

        let create = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/course/create",
                Some(cookie.as_str()),
                json!({
                    "title": "Async Rust",
                    "description": "Futures, executors and pinning",
                    "price": 79.99,
                    "image": "async.png",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::OK);

        let list = app
            .oneshot(Request::builder().uri("/api/course/get").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::OK);
        let body = body_json(list).await;
        let courses = body["courses"].as_array().unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0]["title"], "Async Rust");
        assert_eq!(courses[0]["price"], 79.99);
    }

    #[tokio::test]
    async fn logged_out_cookie_cannot_create() {
        let app = build_app(AppState::fake());

        let logout = app
            .clone()
            .oneshot(json_request("POST", "/api/user/logout", None, json!({})))
            .await
            .unwrap();
        assert_eq!(logout.status(), StatusCode::OK);
        let cleared = cookie_pair(&logout);
        assert_eq!(cleared, "jwt=");

        let create = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/course/create",
                Some(cleared.as_str()),
                json!({ "title": "t", "description": "d", "price": 1, "image": "i" }),
            ))
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(create).await["message"], "token not found");

        let list = app
            .oneshot(Request::builder().uri("/api/course/get").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(list).await["courses"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn update_and_delete_are_not_gated() {
        let app = build_app(AppState::fake());
        let id = uuid::Uuid::new_v4();
        let res = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/course/delete/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["message"], "course not found");
    }
}
