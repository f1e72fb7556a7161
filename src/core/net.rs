use crate::core::{FetchError, FetchOptions, RequestBody, RequestDescriptor};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How a successful response body is decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolveMode {
    /// Parse as JSON. (Default)
    #[default]
    Json,
    /// Read as UTF-8 text.
    Text,
    /// Raw bytes along with the response content type.
    Blob,
    /// Raw bytes.
    ArrayBuffer,
}

impl ResolveMode {
    /// The wire name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            ResolveMode::Json => "json",
            ResolveMode::Text => "text",
            ResolveMode::Blob => "blob",
            ResolveMode::ArrayBuffer => "arrayBuffer",
        }
    }
}

/// A decoded response body. This is what the cache stores.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Blob {
        content_type: Option<String>,
        data: Vec<u8>,
    },
    ArrayBuffer(Vec<u8>),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The raw bytes of a `Blob` or `ArrayBuffer` body.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ResponseBody::Blob { data, .. } | ResponseBody::ArrayBuffer(data) => Some(data),
            _ => None,
        }
    }

    /// Deserialize a JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Data`] if the body was not resolved as JSON and
    /// [`FetchError::Json`] if it does not match `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        match self {
            ResponseBody::Json(v) => Ok(serde_json::from_value(v)?),
            other => Err(FetchError::Data(format!(
                "expected a json body, got {}",
                other.kind()
            ))),
        }
    }

    /// The resolution mode that produced this body.
    pub const fn mode(&self) -> ResolveMode {
        match self {
            ResponseBody::Json(_) => ResolveMode::Json,
            ResponseBody::Text(_) => ResolveMode::Text,
            ResponseBody::Blob { .. } => ResolveMode::Blob,
            ResponseBody::ArrayBuffer(_) => ResolveMode::ArrayBuffer,
        }
    }

    fn kind(&self) -> &'static str {
        self.mode().as_str()
    }
}

/// Issue exactly one request and decode its body.
///
/// A non-2xx status is returned as [`FetchError::Status`] carrying the response
/// status, headers, and body. No retries happen here.
pub(crate) async fn execute(
    http: &Client,
    request: &RequestDescriptor,
    options: &FetchOptions,
) -> Result<ResponseBody, FetchError> {
    let mut req = http
        .request(request.method.clone(), request.url.clone())
        .headers(options.headers.clone());
    if let Some(t) = options.timeout {
        req = req.timeout(t);
    }
    req = match &request.body {
        Some(RequestBody::Text(s)) => req.body(s.clone()),
        Some(RequestBody::Json(v)) => req.json(v),
        None => req,
    };

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let url = resp.url().to_string();
        let headers = resp.headers().clone();
        let body = match resp.text().await {
            Ok(text) => Some(text),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_e, status = status.as_u16(), "error response body unreadable");
                None
            }
        };
        return Err(FetchError::Status {
            status: status.as_u16(),
            url,
            headers,
            body,
        });
    }

    resolve_body(resp, options.resolve).await
}

async fn resolve_body(
    resp: reqwest::Response,
    mode: ResolveMode,
) -> Result<ResponseBody, FetchError> {
    Ok(match mode {
        ResolveMode::Json => {
            let text = resp.text().await?;
            ResponseBody::Json(serde_json::from_str(&text)?)
        }
        ResolveMode::Text => ResponseBody::Text(resp.text().await?),
        ResolveMode::Blob => {
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            ResponseBody::Blob {
                content_type,
                data: resp.bytes().await?.to_vec(),
            }
        }
        ResolveMode::ArrayBuffer => ResponseBody::ArrayBuffer(resp.bytes().await?.to_vec()),
    })
}
