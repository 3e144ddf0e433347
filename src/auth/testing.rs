// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test engines.
//!
//! `MockEngine` answers every call with a canned outcome and records what it
//! was given. `CredentialsEngine` plays a minimal credentials sign-in flow
//! with an unsigned base64 cookie, enough to drive the middleware end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Map, Value};
use url::{form_urlencoded, Url};

use super::engine::{AuthEngine, EngineError};
use super::options::{AuthConfig, JwtParams};
use super::session::{AdapterUser, Jwt, Session, SessionParams};

pub const SESSION_COOKIE: &str = "authjs.session-token";
pub const CSRF_COOKIE: &str = "authjs.csrf-token";
const CSRF_TOKEN: &str = "csrf-token-for-tests";

/// A session bundle whose token carries `name` and `email`.
pub fn session_params(name: &str, email: &str) -> SessionParams {
    let mut token = Map::new();
    token.insert("name".into(), json!(name));
    token.insert("email".into(), json!(email));
    SessionParams {
        session: Session {
            user: Some(json!({ "name": name, "email": email })),
            expires: Some("2099-01-01T00:00:00.000Z".to_string()),
            extra: Map::new(),
        },
        token: Some(token),
        user: None,
    }
}

/// What the mock engine saw.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

enum Behavior {
    Session(SessionParams),
    Fixed(StatusCode, &'static str),
    Fail,
}

pub struct MockEngine {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<SeenRequest>>,
    last_config: Mutex<Option<AuthConfig>>,
    last_session_body: Mutex<Option<Session>>,
}

impl MockEngine {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            last_config: Mutex::new(None),
            last_session_body: Mutex::new(None),
        }
    }

    /// Serve a live session, running the session callback like a real engine.
    pub fn with_session(params: SessionParams) -> Self {
        Self::new(Behavior::Session(params))
    }

    /// Serve `null` from the session endpoint.
    pub fn null_session() -> Self {
        Self::responding(StatusCode::OK, "null")
    }

    /// Answer every request with `status` and `body`, plus an `x-engine` header.
    pub fn responding(status: StatusCode, body: &'static str) -> Self {
        Self::new(Behavior::Fixed(status, body))
    }

    /// Fail every request at the transport level.
    pub fn failing() -> Self {
        Self::new(Behavior::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_config(&self) -> Option<AuthConfig> {
        self.last_config.lock().unwrap().clone()
    }

    pub fn last_session_body(&self) -> Option<Session> {
        self.last_session_body.lock().unwrap().clone()
    }
}

impl AuthEngine for MockEngine {
    async fn handle(&self, request: Request, config: AuthConfig) -> Result<Response, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(SeenRequest {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        });
        *self.last_config.lock().unwrap() = Some(config.clone());

        match &self.behavior {
            Behavior::Session(params) => {
                let session = match &config.callbacks.session {
                    Some(callback) => callback(params),
                    None => params.session.clone(),
                };
                *self.last_session_body.lock().unwrap() = Some(session.clone());
                Ok(Json(session).into_response())
            }
            Behavior::Fixed(status, body) => Ok((
                *status,
                [("x-engine", "mock"), (CONTENT_TYPE.as_str(), "application/json")],
                *body,
            )
                .into_response()),
            Behavior::Fail => Err(EngineError::Transport("connection refused".into())),
        }
    }
}

/// Minimal credentials flow: `/csrf`, `/signin`, `/callback/credentials`, `/session`.
pub struct CredentialsEngine {
    password: String,
    user: AdapterUser,
}

impl CredentialsEngine {
    pub fn new(password: &str, name: &str, email: &str) -> Self {
        Self {
            password: password.to_string(),
            user: AdapterUser {
                id: "user-1".to_string(),
                email: email.to_string(),
                email_verified: None,
                name: Some(name.to_string()),
                image: None,
                extra: Map::new(),
            },
        }
    }

    fn sign_in(&self, origin: &str, base: &str, form: &[u8], cookies: &HeaderMap, config: &AuthConfig) -> Response {
        let fields: Map<String, Value> = form_urlencoded::parse(form)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        let csrf_ok = fields.get("csrfToken").and_then(Value::as_str) == Some(CSRF_TOKEN)
            && cookie(cookies, CSRF_COOKIE).as_deref() == Some(CSRF_TOKEN);
        let password_ok = fields.get("password").and_then(Value::as_str) == Some(self.password.as_str());

        if !csrf_ok || !password_ok {
            let location = format!("{origin}{base}/signin?error=CredentialsSignin&code=credentials");
            return (StatusCode::FOUND, [(LOCATION, location)]).into_response();
        }

        let mut token = Jwt::new();
        token.insert("name".into(), json!(self.user.name));
        token.insert("email".into(), json!(self.user.email));
        token.insert("sub".into(), json!(self.user.id));
        if let Some(jwt) = &config.callbacks.jwt {
            token = jwt(JwtParams {
                token,
                user: Some(self.user.clone()),
            });
        }
        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&token).unwrap());

        let mut response = (StatusCode::FOUND, [(LOCATION, origin.to_string())]).into_response();
        let headers = response.headers_mut();
        headers.append(SET_COOKIE, format!("{CSRF_COOKIE}={CSRF_TOKEN}; Path=/").parse().unwrap());
        headers.append(
            SET_COOKIE,
            format!("{SESSION_COOKIE}={encoded}; Path=/; HttpOnly").parse().unwrap(),
        );
        response
    }

    fn session(&self, cookies: &HeaderMap, config: &AuthConfig) -> Response {
        let token = cookie(cookies, SESSION_COOKIE)
            .and_then(|raw| URL_SAFE_NO_PAD.decode(raw).ok())
            .and_then(|bytes| serde_json::from_slice::<Jwt>(&bytes).ok());
        let Some(token) = token else {
            return Json(Value::Null).into_response();
        };

        let params = SessionParams {
            session: Session {
                user: Some(json!({ "name": token["name"], "email": token["email"] })),
                expires: Some("2099-01-01T00:00:00.000Z".to_string()),
                extra: Map::new(),
            },
            token: Some(token),
            user: None,
        };
        let session = match &config.callbacks.session {
            Some(callback) => callback(&params),
            None => params.session.clone(),
        };
        Json(session).into_response()
    }
}

impl AuthEngine for CredentialsEngine {
    async fn handle(&self, request: Request, config: AuthConfig) -> Result<Response, EngineError> {
        let url = Url::parse(&request.uri().to_string())
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        let origin = url.origin().ascii_serialization();
        let base = config.base_path().to_string();
        let action = url.path().strip_prefix(base.as_str()).unwrap_or("").to_string();
        let method = request.method().clone();
        let (parts, body) = request.into_parts();

        let response = match (method, action.as_str()) {
            (Method::GET, "/csrf") => {
                let mut response = Json(json!({ "csrfToken": CSRF_TOKEN })).into_response();
                response.headers_mut().insert(
                    SET_COOKIE,
                    format!("{CSRF_COOKIE}={CSRF_TOKEN}; Path=/").parse().unwrap(),
                );
                response
            }
            (Method::GET, "/signin") => {
                let html = format!(
                    r#"<form action="{origin}{base}/callback/credentials" method="POST"></form>"#
                );
                ([(CONTENT_TYPE, "text/html")], html).into_response()
            }
            (Method::POST, "/callback/credentials") => {
                let form = to_bytes(body, usize::MAX)
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;
                self.sign_in(&origin, &base, &form, &parts.headers, &config)
            }
            (Method::GET, "/session") => self.session(&parts.headers, &config),
            _ => (StatusCode::NOT_FOUND, Body::from("Not Found")).into_response(),
        };
        Ok(response)
    }
}

/// Read one cookie from the `Cookie` headers.
fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}
