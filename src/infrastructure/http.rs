use crate::domain::cart::{ProductId, Quantity};
use crate::domain::ports::{Catalog, PurchaseError, PurchaseService};
use crate::domain::product::{Product, ProductQuery};
use crate::error::{CartError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Serialize)]
struct PurchaseRequest {
    quantity: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the remote sweets API.
///
/// Attaches `Authorization: Bearer <token>` to every request when a token is
/// configured. Token acquisition and refresh happen elsewhere.
#[derive(Clone)]
pub struct HttpStorefront {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpStorefront {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CartError::ValidationError(format!("Invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CartError::ValidationError(format!(
                "Invalid API URL {base_url}: not a base URL"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl PurchaseService for HttpStorefront {
    #[instrument(skip_all, fields(product_id = %product_id, quantity = quantity.get()))]
    async fn purchase(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> std::result::Result<(), PurchaseError> {
        let url = self.endpoint(&["sweets", product_id.as_str(), "purchase"]);
        let request = self.client.post(url).json(&PurchaseRequest {
            quantity: quantity.get(),
        });

        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::warn!("Purchase request got no response: {e}");
            PurchaseError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        tracing::debug!(%status, ?message, "Purchase rejected");

        if status == StatusCode::UNAUTHORIZED {
            Err(PurchaseError::Unauthorized { message })
        } else {
            Err(PurchaseError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl Catalog for HttpStorefront {
    #[instrument(skip(self))]
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let url = self.endpoint(&["sweets", "search"]);
        let request = self.client.get(url).query(query);
        let products = self
            .authorize(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Product>>()
            .await?;
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single HTTP request with `status` and `body`, returning the raw
    /// request text once it has been served.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/api"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn client(base: &str, token: Option<&str>) -> HttpStorefront {
        HttpStorefront::new(base, token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpStorefront::new("not a url", None, DEFAULT_TIMEOUT),
            Err(CartError::ValidationError(_))
        ));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let storefront = client(DEFAULT_API_URL, Some("  "));
        assert!(!storefront.has_token());
    }

    #[tokio::test]
    async fn test_purchase_success_sends_bearer_and_body() {
        let (base, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let storefront = client(&base, Some("tok123"));

        storefront
            .purchase(&ProductId::from("abc"), Quantity::new(3))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/sweets/abc/purchase "));
        assert!(request.to_lowercase().contains("authorization: bearer tok123"));
        assert!(request.ends_with(r#"{"quantity":3}"#));
    }

    #[tokio::test]
    async fn test_purchase_rejection_carries_server_message() {
        let (base, _server) = serve_once("400 Bad Request", r#"{"message":"out of stock"}"#).await;
        let storefront = client(&base, Some("tok"));

        let err = storefront
            .purchase(&ProductId::from("abc"), Quantity::MIN)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PurchaseError::Rejected {
                status: 400,
                message: Some("out of stock".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_purchase_unauthorized() {
        let (base, _server) = serve_once("401 Unauthorized", r#"{"message":"Token expired"}"#).await;
        let storefront = client(&base, Some("stale"));

        let err = storefront
            .purchase(&ProductId::from("abc"), Quantity::MIN)
            .await
            .unwrap_err();

        assert!(matches!(err, PurchaseError::Unauthorized { .. }));
        assert_eq!(err.server_message(), Some("Token expired"));
    }

    #[tokio::test]
    async fn test_purchase_rejection_without_json_body() {
        let (base, _server) = serve_once("500 Internal Server Error", "oops").await;
        let storefront = client(&base, None);

        let err = storefront
            .purchase(&ProductId::from("abc"), Quantity::MIN)
            .await
            .unwrap_err();

        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_purchase_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let storefront = client(&format!("http://{addr}/api"), None);
        let err = storefront
            .purchase(&ProductId::from("abc"), Quantity::MIN)
            .await
            .unwrap_err();

        assert!(matches!(err, PurchaseError::Network(_)));
    }

    #[tokio::test]
    async fn test_search_sends_query_parameters() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"_id":"1","name":"Ladoo","category":"Indian","price":10,"quantity":4}]"#,
        )
        .await;
        let storefront = client(&base, None);

        let query = ProductQuery {
            q: Some("lad".to_string()),
            min_price: Some(dec!(5)),
            ..Default::default()
        };
        let products = storefront.search(&query).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Ladoo");

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /api/sweets/search?"));
        assert!(request_line.contains("q=lad"));
        assert!(request_line.contains("minPrice=5"));
        assert!(!request_line.contains("category"));
    }
}
