use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::from_str;

use crate::config::Config;
use crate::error::{Error, Result};

/// Thin JSON-over-HTTP wrapper shared by the embedding, generation and
/// Qdrant clients. One `reqwest::Client` is built per process and cloned.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    bearer: Option<String>,
}

impl HttpClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client, bearer: None })
    }

    /// Same connection pool, but every request carries `Authorization: Bearer`.
    pub fn with_bearer(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            bearer: Some(token.to_string()),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send(self.request(Method::GET, url), "GET", url).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let req = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send(req, "POST", url).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let req = self
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send(req, "PUT", url).await
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, verb: &str, url: &str) -> Result<T> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Http(format!("{} {}: {}", verb, url, e)))?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        from_str::<T>(&text)
            .map_err(|e| Error::Decode(format!("{} {} decode failed: {} | {}", verb, url, e, text)))
    }
}
