// File: src/client.rs
use crate::capability::EventBackend;
use crate::model::{
    EventId, EventRecord, NewEvent, ParticipationCounters, ParticipationStatus, UserId,
};

use bytes::Bytes;
use futures::future::LocalBoxFuture;
use http::{Method, Request, Uri, header};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use log::warn;
use serde_json::Value;

type HttpClient = Client<
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    Full<Bytes>,
>;

/// HTTP implementation of the [`EventBackend`] capability against the
/// fair-finder REST backend.
#[derive(Clone, Debug)]
pub struct EventsClient {
    http: HttpClient,
    base_url: String,
    auth_token: Option<String>,
}

impl EventsClient {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, String> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let _: Uri = base_url
            .parse()
            .map_err(|e: http::uri::InvalidUri| e.to_string())?;

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            // A plain-HTTP backend still works; only HTTPS needs roots.
            warn!("no usable system certificates found; HTTPS requests will fail");
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self {
            http,
            base_url,
            auth_token,
        })
    }

    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, String> {
        let uri: Uri = format!("{}{}", self.base_url, path)
            .parse()
            .map_err(|e: http::uri::InvalidUri| e.to_string())?;

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.auth_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(v.to_string()))),
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| e.to_string())?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?
            .to_bytes();

        if !status.is_success() {
            warn!("backend returned {} for {}", status, path);
            return Err(format!(
                "HTTP {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&bytes).trim()
            ));
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| format!("Invalid JSON from backend: {}", e))
    }

    // --- READ OPERATIONS ---

    pub async fn get_events(&self) -> Result<Vec<EventRecord>, String> {
        let v = self.request_json(Method::GET, "/events", None).await?;
        let items = v.as_array().ok_or("Expected a JSON array of events")?;
        let mut events = Vec::with_capacity(items.len());
        for item in items {
            match EventRecord::from_json(item) {
                Ok(event) => events.push(event),
                // One malformed record should not take the whole map down.
                Err(e) => warn!("skipping malformed event record: {}", e),
            }
        }
        Ok(events)
    }

    pub async fn get_participation(
        &self,
        event: EventId,
        user: UserId,
    ) -> Result<Option<ParticipationStatus>, String> {
        let path = format!("/participations/{}/{}", event, user);
        let v = self.request_json(Method::GET, &path, None).await?;
        // The backend answers `{}` when the user never expressed intent.
        Ok(v.get("status")
            .and_then(Value::as_str)
            .and_then(ParticipationStatus::parse))
    }

    // --- MUTATIONS ---

    pub async fn create_event(&self, payload: &NewEvent) -> Result<EventId, String> {
        let v = self
            .request_json(Method::POST, "/events", Some(payload.to_json()))
            .await?;
        v.get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| "Create response carried no event id".to_string())
    }

    pub async fn delete_event(&self, id: EventId) -> Result<(), String> {
        self.request_json(Method::DELETE, &format!("/events/{}", id), None)
            .await
            .map(|_| ())
    }

    pub async fn post_participation(
        &self,
        event: EventId,
        user: UserId,
        status: ParticipationStatus,
    ) -> Result<ParticipationCounters, String> {
        let body = serde_json::json!({
            "user_id": user,
            "event_id": event,
            "status": status.as_str(),
        });
        let v = self
            .request_json(Method::POST, "/participations", Some(body))
            .await?;
        // Updated counters ride along either nested or at the top level.
        Ok(v.get("participation")
            .map(ParticipationCounters::from_json)
            .unwrap_or_else(|| ParticipationCounters::from_json(&v)))
    }
}

impl EventBackend for EventsClient {
    fn list(&self) -> LocalBoxFuture<'_, Result<Vec<EventRecord>, String>> {
        Box::pin(self.get_events())
    }

    fn create(&self, payload: NewEvent) -> LocalBoxFuture<'_, Result<EventId, String>> {
        Box::pin(async move { self.create_event(&payload).await })
    }

    fn delete(&self, id: EventId) -> LocalBoxFuture<'_, Result<(), String>> {
        Box::pin(self.delete_event(id))
    }

    fn participation(
        &self,
        event: EventId,
        user: UserId,
    ) -> LocalBoxFuture<'_, Result<Option<ParticipationStatus>, String>> {
        Box::pin(self.get_participation(event, user))
    }

    fn set_participation(
        &self,
        event: EventId,
        user: UserId,
        status: ParticipationStatus,
    ) -> LocalBoxFuture<'_, Result<ParticipationCounters, String>> {
        Box::pin(self.post_participation(event, user, status))
    }
}
