//! Conversions from external infrastructure errors into pipeline errors.

use clinicflow_core::{HttpMethod, TransportError, TransportErrorCode};
use reqwest::Error as HttpError;

/// Extension trait to make the conversion logic explicit in tests and within
/// the HTTP transport.
pub(crate) trait IntoTransportError {
    fn into_transport(self, method: HttpMethod, url: &str) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self, method: HttpMethod, url: &str) -> TransportError {
        if self.is_timeout() {
            return TransportError::network(
                method,
                url,
                TransportErrorCode::Timeout,
                "HTTP request timed out",
            );
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return TransportError::network(
                method,
                url,
                TransportErrorCode::NetworkUnreachable,
                format!("HTTP connection failure: {self}"),
            );
        }

        if let Some(status) = self.status() {
            return TransportError::http(method, url, status.as_u16(), None);
        }

        if self.is_body() || self.is_decode() {
            return TransportError::network(
                method,
                url,
                TransportErrorCode::ConnectionAborted,
                format!("HTTP response body interrupted: {self}"),
            );
        }

        TransportError::network(method, url, TransportErrorCode::NetworkUnreachable, self.to_string())
    }
}

/// Map a reqwest failure for `method url` into a [`TransportError`]
pub fn transport_error(err: HttpError, method: HttpMethod, url: &str) -> TransportError {
    err.into_transport(method, url)
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_network_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{addr}");

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(&url).send().await.unwrap_err();

        let mapped = transport_error(error, HttpMethod::Get, &url);
        assert_eq!(mapped.code, Some(TransportErrorCode::NetworkUnreachable));
        assert_eq!(mapped.status, None);
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            Client::builder().no_proxy().timeout(Duration::from_millis(50)).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();

        let mapped = transport_error(error, HttpMethod::Get, &server.uri());
        assert_eq!(mapped.code, Some(TransportErrorCode::Timeout));
    }

    #[tokio::test]
    async fn status_errors_keep_the_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped = transport_error(error, HttpMethod::Get, &server.uri());
        assert_eq!(mapped.status, Some(401));
        assert_eq!(mapped.code, None);
    }
}
