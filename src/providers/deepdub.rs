use std::time::Duration;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{SpeechProvider, SynthesisRequest};

/// One response message from the synthesis stream.
///
/// `generationId` and `isFinished` are required; a message without them is a
/// protocol violation. `data` carries a base64 payload on audio-bearing
/// messages and is absent on bookkeeping ones.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisChunk {
    /// Server-side generation identifier
    pub generation_id: String,

    /// Chunk index within the generation
    #[serde(default)]
    pub index: Option<u64>,

    /// Base64-encoded audio payload
    #[serde(default)]
    pub data: Option<String>,

    /// Terminal flag: no further messages follow for this request
    pub is_finished: bool,
}

/// Deepdub client speaking the WebSocket synthesis protocol.
///
/// One connection serves every request of a run; requests are issued
/// strictly one at a time and fully drained before the next is sent.
#[derive(Debug)]
pub struct DeepdubClient {
    /// The live WebSocket connection
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,

    /// Bound on each inbound read
    recv_timeout: Duration,
}

impl DeepdubClient {
    /// Connect to the synthesis endpoint with the static credential header
    pub async fn connect(
        endpoint: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let url = Url::parse(endpoint)
            .map_err(|e| ProviderError::ConnectionFailed(format!("Invalid endpoint: {}", e)))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ProviderError::ConnectionFailed(format!(
                "Endpoint must be a ws:// or wss:// URL, got: {}",
                endpoint
            )));
        }

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;
        let header_value = HeaderValue::from_str(api_key).map_err(|_| {
            ProviderError::AuthenticationError("API key is not a valid header value".to_string())
        })?;
        request.headers_mut().insert("x-api-key", header_value);

        let timeout = Duration::from_secs(timeout_secs.max(1));
        let connect = tokio::time::timeout(timeout, connect_async(request))
            .await
            .map_err(|_| {
                ProviderError::ConnectionFailed(format!(
                    "Handshake timed out after {} s",
                    timeout.as_secs()
                ))
            })?;

        let (ws, _response) = connect.map_err(|e| match e {
            tokio_tungstenite::tungstenite::Error::Http(response)
                if response.status().as_u16() == 401 || response.status().as_u16() == 403 =>
            {
                ProviderError::AuthenticationError(format!(
                    "Server rejected credentials ({})",
                    response.status()
                ))
            }
            other => ProviderError::ConnectionFailed(other.to_string()),
        })?;

        debug!("Connected to synthesis endpoint {}", url);
        Ok(DeepdubClient {
            ws,
            recv_timeout: timeout,
        })
    }

    /// Receive the next WebSocket message within the configured timeout
    async fn next_message(&mut self) -> Result<Option<Message>, ProviderError> {
        let received = tokio::time::timeout(self.recv_timeout, self.ws.next())
            .await
            .map_err(|_| {
                ProviderError::TransportFailure(format!(
                    "No response within {} s",
                    self.recv_timeout.as_secs()
                ))
            })?;

        match received {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(e)) => Err(ProviderError::TransportFailure(e.to_string())),
            None => Ok(None),
        }
    }

    /// Parse one text frame into a chunk
    fn parse_chunk(payload: &str) -> Result<SynthesisChunk, ProviderError> {
        serde_json::from_str::<SynthesisChunk>(payload).map_err(|e| {
            ProviderError::ProtocolViolation(format!("Unparseable response message: {}", e))
        })
    }
}

#[async_trait]
impl SpeechProvider for DeepdubClient {
    async fn synthesize(&mut self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let payload = serde_json::to_string(request).map_err(|e| {
            ProviderError::ProtocolViolation(format!("Failed to encode request: {}", e))
        })?;

        self.ws
            .send(Message::Text(payload))
            .await
            .map_err(|e| ProviderError::TransportFailure(e.to_string()))?;

        let mut audio = Vec::new();

        // Drain response messages until the terminal flag. A stream that ends
        // before the flag is a protocol violation, never a silent hang.
        loop {
            let message = match self.next_message().await? {
                Some(message) => message,
                None => {
                    return Err(ProviderError::ProtocolViolation(
                        "Response stream ended before the terminal flag".to_string(),
                    ));
                }
            };

            match message {
                Message::Text(text) => {
                    let chunk = Self::parse_chunk(&text)?;
                    debug!(
                        "Received chunk {} - {}",
                        chunk.generation_id,
                        chunk.index.unwrap_or(0)
                    );

                    if let Some(data) = &chunk.data {
                        let bytes = BASE64.decode(data).map_err(|e| {
                            ProviderError::ProtocolViolation(format!(
                                "Audio payload is not valid base64: {}",
                                e
                            ))
                        })?;
                        audio.extend_from_slice(&bytes);
                    }

                    if chunk.is_finished {
                        break;
                    }
                }
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Close(_) => {
                    return Err(ProviderError::ProtocolViolation(
                        "Connection closed before the terminal flag".to_string(),
                    ));
                }
                other => {
                    warn!("Ignoring unexpected frame type: {:?}", other);
                }
            }
        }

        Ok(audio)
    }

    async fn close(&mut self) -> Result<(), ProviderError> {
        // A failed close frame is not worth surfacing; the run is over.
        let _ = self.ws.close(None).await;
        Ok(())
    }
}
