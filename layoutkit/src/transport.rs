//! Remote I/O boundary.
//!
//! The core never talks to the network itself. Option fetches, form submits
//! and table searches go through a [`Transport`] supplied by the caller.
//! `get` failures are plain errors; `post` reports failures as an [`ErrorSet`]
//! of field messages so they can be shown next to the offending inputs.

use std::{collections::BTreeMap, fmt, future::Future};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Field keyed error messages returned by a failed post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSet(pub BTreeMap<String, String>);

impl ErrorSet {
    /// An error set holding one message under `key`.
    pub fn single(key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(key.into(), message.into());
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build an error set from a server body of the form `{"errors": {..}}`.
    ///
    /// List values are joined with `"; "`, other scalars are stringified.
    /// Returns `None` when the body has no `errors` object.
    pub fn from_body(body: &Value) -> Option<Self> {
        let errors = body.get("errors")?.as_object()?;
        let map = errors
            .iter()
            .map(|(k, v)| {
                let msg = match v {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items
                        .iter()
                        .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                        .collect::<Vec<_>>()
                        .join("; "),
                    other => other.to_string(),
                };
                (k.clone(), msg)
            })
            .collect();
        Some(Self(map))
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorSet {}

impl From<TransportError> for ErrorSet {
    fn from(e: TransportError) -> Self {
        ErrorSet::single("err", e.to_string())
    }
}

/// Failure of a remote fetch.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to '{url}' failed: {message}")]
    Request { url: String, message: String },
    #[error("'{url}' returned status {status}")]
    Status { url: String, status: u16 },
    #[error("response from '{url}' could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote fetch/post capability.
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the decoded body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Value, TransportError>> + Send;

    /// Post `payload` to `url`. A rejected request yields the server's error set.
    fn post(&self, url: &str, payload: &Value) -> impl Future<Output = Result<Value, ErrorSet>> + Send;
}

/// Fetch `url` and decode the body as `T`.
///
/// # Errors
///
/// Transport failures and decode failures are returned as is; nothing is retried.
pub async fn fetch<T, X>(transport: &X, url: &str) -> Result<T, TransportError>
where
    T: DeserializeOwned,
    X: Transport + ?Sized,
{
    let body = transport.get(url).await?;
    serde_json::from_value(body).map_err(|source| TransportError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Serialize `payload`, post it to `url` and decode the response as `T`.
///
/// Serialization and decode failures are reported under the `err` key.
pub async fn post<P, T, X>(transport: &X, url: &str, payload: &P) -> Result<T, ErrorSet>
where
    P: Serialize + ?Sized,
    T: DeserializeOwned,
    X: Transport + ?Sized,
{
    let payload = serde_json::to_value(payload).map_err(|e| ErrorSet::single("err", e.to_string()))?;
    let body = transport.post(url, &payload).await?;
    serde_json::from_value(body).map_err(|e| ErrorSet::single("err", e.to_string()))
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{testing::StubTransport, *};

    #[test]
    fn test_error_set_from_body() {
        let body = json!({"errors": {"email": ["taken", "too long"], "name": "blank", "code": 3}});
        let set = ErrorSet::from_body(&body).unwrap();
        assert_eq!(set.get("email"), Some("taken; too long"));
        assert_eq!(set.get("name"), Some("blank"));
        assert_eq!(set.get("code"), Some("3"));
        assert!(ErrorSet::from_body(&json!({"message": "x"})).is_none());
    }

    #[tokio::test]
    async fn test_fetch_decode_error_surfaces() {
        let t = StubTransport::new().on_get("/n", json!("not a number"));
        let err = fetch::<u32, _>(&t, "/n").await.unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_post_round() {
        let t = StubTransport::new()
            .on_post("/ok", Ok(json!({"id": 4})))
            .on_post("/bad", Err(ErrorSet::single("name", "required")));

        let v: Value = post(&t, "/ok", &json!({"a": 1})).await.unwrap();
        assert_eq!(v, json!({"id": 4}));

        let e = post::<_, Value, _>(&t, "/bad", &json!({})).await.unwrap_err();
        assert_eq!(e.to_string(), "name: required");
        assert_eq!(t.calls().len(), 2);
    }
}
