use anyhow::Context;
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use crate::student::StudentId;
use crate::types::Verb;

/// Where the record id goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// /api/students/:id
    Path,
    /// /studentapi/ with {"id": ..} in the body
    Body,
}

/// Status and decoded body of a server reply
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub body: Value,
}

impl ClientResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin HTTP client for the student endpoints
#[derive(Debug, Clone)]
pub struct StudentClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    addressing: Addressing,
}

impl StudentClient {
    pub fn new(base_url: &str, token: Option<String>, addressing: Addressing) -> anyhow::Result<Self> {
        // A trailing slash keeps Url::join from dropping the last path segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base = Url::parse(&normalized).with_context(|| format!("invalid server URL: {}", base_url))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token,
            addressing,
        })
    }

    /// Target URL and JSON body for a request
    pub fn prepare(
        &self,
        verb: Verb,
        id: Option<StudentId>,
        payload: Option<Map<String, Value>>,
    ) -> anyhow::Result<(Url, Option<Value>)> {
        match self.addressing {
            Addressing::Path => {
                let path = match id {
                    Some(id) => format!("api/students/{}", id),
                    None => "api/students".to_string(),
                };
                let body = match verb {
                    Verb::Post | Verb::Put | Verb::Patch => Some(Value::Object(payload.unwrap_or_default())),
                    Verb::Get | Verb::Delete => None,
                };
                Ok((self.base.join(&path)?, body))
            }
            Addressing::Body => {
                let mut body = payload.unwrap_or_default();
                if let Some(id) = id {
                    body.insert("id".to_string(), Value::from(id));
                }
                Ok((self.base.join("studentapi/")?, Some(Value::Object(body))))
            }
        }
    }

    pub async fn send(
        &self,
        verb: Verb,
        id: Option<StudentId>,
        payload: Option<Map<String, Value>>,
    ) -> anyhow::Result<ClientResponse> {
        let (url, body) = self.prepare(verb, id, payload)?;
        let method = match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        };

        tracing::debug!("{} {}", method, url);
        let mut request = self.http.request(method, url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ClientResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn path_addressing_puts_id_in_url() {
        let client = StudentClient::new("http://localhost:3000", None, Addressing::Path).unwrap();
        let (url, body) = client.prepare(Verb::Patch, Some(4), Some(payload(json!({"city": "x"})))).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/students/4");
        assert_eq!(body, Some(json!({"city": "x"})));

        let (url, body) = client.prepare(Verb::Get, None, None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/students");
        assert!(body.is_none());
    }

    #[test]
    fn body_addressing_puts_id_in_payload() {
        let client = StudentClient::new("http://localhost:3000/", None, Addressing::Body).unwrap();
        let (url, body) = client.prepare(Verb::Delete, Some(7), None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/studentapi/");
        assert_eq!(body, Some(json!({"id": 7})));
    }

    #[test]
    fn base_path_is_preserved() {
        let client = StudentClient::new("http://example.com/school", None, Addressing::Path).unwrap();
        let (url, _) = client.prepare(Verb::Get, Some(1), None).unwrap();
        assert_eq!(url.as_str(), "http://example.com/school/api/students/1");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(StudentClient::new("not a url", None, Addressing::Path).is_err());
    }
}
