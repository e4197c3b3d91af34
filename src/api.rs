//! The HTTP contract of the equation service, without a network listener.
//!
//! `route` maps a method and request target to a `Response`; `handle_solve` and
//! `handle_root` implement the two endpoints. A server only has to copy
//! `Response::status`, `Response::headers` and `Response::body_text` onto the wire.
//!
//! | Request | Status | Body |
//! |---|---|---|
//! | `GET /` | 200 | `{"message": "Equation API. Try /solve?equation=1+1"}` |
//! | `GET /solve?equation=…` | 200 | `{"result": "…"}` |
//! | `GET /solve` without `equation` | 400 | `{"error": "Missing 'equation' query parameter"}` |
//! | `GET /solve?equation=…` that fails | 400 | `{"error": "…"}` |
//! | `OPTIONS` anything | 204 | empty |
//!
//! Every response carries permissive CORS headers.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::SolverConfig;
use crate::equation::solve_equation;
use crate::errors::EquationError;

/// Body of `GET /`.
pub const ROOT_MESSAGE: &str = "Equation API. Try /solve?equation=1+1";

/// Headers added to every response.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// JSON body of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    Result { result: String },
    Error { error: String },
    Message { message: String },
}

/// A response ready to be written by any HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// `None` for bodiless responses such as preflight replies
    pub body: Option<Body>,
}

impl Response {
    fn new(status: u16, body: Option<Body>) -> Self {
        let mut headers: Vec<(String, String)> = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    /// A 200 response carrying a result.
    pub fn result(result: String) -> Self {
        Self::new(200, Some(Body::Result { result }))
    }

    /// An error response with the given status.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            status,
            Some(Body::Error {
                error: message.into(),
            }),
        )
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The serialised body, empty for bodiless responses.
    pub fn body_text(&self) -> Result<String, serde_json::Error> {
        match &self.body {
            Some(body) => serde_json::to_string(body),
            None => Ok(String::new()),
        }
    }
}

/// `GET /`: a static usage message.
pub fn handle_root() -> Response {
    Response::new(
        200,
        Some(Body::Message {
            message: ROOT_MESSAGE.to_string(),
        }),
    )
}

/// `GET /solve`: runs the pipeline on the `equation` parameter.
///
/// The parameter is trimmed first; a missing or blank parameter is rejected
/// before the pipeline runs. Every pipeline error becomes a 400 carrying the
/// error's message.
///
/// # Example
/// ```
/// use evalexpr_solve::api::handle_solve;
/// use evalexpr_solve::SolverConfig;
///
/// let response = handle_solve(Some("x + 1 = 5"), &SolverConfig::default());
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body_text().unwrap(), r#"{"result":"x = 4.0000"}"#);
/// ```
pub fn handle_solve(equation: Option<&str>, config: &SolverConfig) -> Response {
    let Some(equation) = equation.map(str::trim).filter(|e| !e.is_empty()) else {
        return Response::error(400, EquationError::EmptyEquation.to_string());
    };
    match solve_equation(equation, config) {
        Ok(result) => {
            log::debug!("solved {equation:?}");
            Response::result(result)
        }
        Err(err) => {
            log::debug!("rejected {equation:?}: {err}");
            Response::error(400, err.to_string())
        }
    }
}

/// Routes a request by method and target (path plus optional query string).
///
/// Query values are form-decoded, so `+` stands for a space and `%2B` for a plus sign.
pub fn route(method: &str, target: &str, config: &SolverConfig) -> Response {
    if method.eq_ignore_ascii_case("OPTIONS") {
        return Response::new(204, None);
    }
    if !method.eq_ignore_ascii_case("GET") {
        return Response::error(405, "Method Not Allowed");
    }

    let url = match Url::parse("http://localhost/").and_then(|base| base.join(target)) {
        Ok(url) => url,
        Err(err) => return Response::error(400, format!("Invalid request target: {err}")),
    };
    log::debug!("{method} {}", url.path());

    match url.path() {
        "/" => handle_root(),
        "/solve" => {
            let equation = url
                .query_pairs()
                .find(|(key, _)| key == "equation")
                .map(|(_, value)| value.into_owned());
            handle_solve(equation.as_deref(), config)
        }
        _ => Response::error(404, "Not Found"),
    }
}
