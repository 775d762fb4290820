use crate::models::ExternalResult;
use crate::utils::AppError;
use serde_json::Value;
use std::time::Duration;

const BAD_REQUEST_MESSAGE: &str = "Bad request!";
const TRANSPORT_FAILURE_MESSAGE: &str = "GET request to external API failed";
const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from external API";

/// Client for the third-party profile API (`GET {base_url}/{segment}`).
/// One instance is shared by all workers.
#[derive(Clone)]
pub struct ProfileClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProfileClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        // A 3xx is reported to the caller like any other non-200
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The segment is percent-encoded so a stored value can never add path levels or a query
    pub fn url_for(&self, segment: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(segment))
    }

    /// Single GET, no retry. Only status 200 with a JSON body succeeds.
    pub async fn fetch(&self, segment: &str) -> Result<ExternalResult, AppError> {
        let url = self.url_for(segment);

        log::info!("🌐 GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Request to {} failed: {}", url, e);
                AppError::Upstream {
                    status: 500,
                    message: TRANSPORT_FAILURE_MESSAGE.to_string(),
                }
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            log::warn!("⚠️ {} answered {}", url, status);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: BAD_REQUEST_MESSAGE.to_string(),
            });
        }

        let body = response.json::<Value>().await.map_err(|e| {
            log::error!("❌ Unreadable body from {}: {}", url, e);
            if e.is_decode() {
                AppError::Upstream {
                    status: 502,
                    message: INVALID_RESPONSE_MESSAGE.to_string(),
                }
            } else {
                AppError::Upstream {
                    status: 500,
                    message: TRANSPORT_FAILURE_MESSAGE.to_string(),
                }
            }
        })?;

        Ok(ExternalResult {
            response: body,
            code: status.as_u16(),
        })
    }
}

/// Local stand-in for the profile API, shared with the handler tests
#[cfg(test)]
pub mod stub {
    use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer};
    use std::net::TcpListener;

    /// `/films` answers JSON, `/maintenance` 503, `/plain` non-JSON 200,
    /// `/moved` a 301 to `/films`,
    /// and any other single segment echoes itself.
    pub async fn spawn_profile_api() -> (String, ServerHandle) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener addr");

        let server = HttpServer::new(|| {
            App::new()
                .route(
                    "/films",
                    web::get().to(|| async {
                        HttpResponse::Ok().json(serde_json::json!([
                            { "title": "Castle in the Sky", "release_date": "1986" }
                        ]))
                    }),
                )
                .route(
                    "/maintenance",
                    web::get().to(|| async { HttpResponse::ServiceUnavailable().finish() }),
                )
                .route(
                    "/moved",
                    web::get().to(|| async {
                        HttpResponse::MovedPermanently()
                            .insert_header(("Location", "/films"))
                            .finish()
                    }),
                )
                .route(
                    "/plain",
                    web::get().to(|| async { HttpResponse::Ok().body("not json") }),
                )
                .route(
                    "/{segment}",
                    web::get().to(|segment: web::Path<String>| async move {
                        HttpResponse::Ok().json(serde_json::json!({ "segment": segment.into_inner() }))
                    }),
                )
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .expect("listen stub server")
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        (format!("http://{}", addr), handle)
    }
}
