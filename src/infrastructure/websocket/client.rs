use crate::application::stream_ingestion::StreamConnector;
use crate::domain::{
    errors::{AppError, AppResult},
    events::StreamTopic,
    logging::LogComponent,
};
use crate::log_info;
use futures::stream::{LocalBoxStream, StreamExt};
use gloo_net::websocket::{Message, futures::WebSocket};
use gloo_timers::future::sleep;
use std::time::Duration;

/// WebSocket коннектор: открывает `{base_url}/{topic}` через gloo
#[derive(Debug, Clone)]
pub struct GlooStreamConnector {
    base_url: String,
}

impl GlooStreamConnector {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn topic_url(&self, topic: StreamTopic) -> String {
        format!("{}/{}", self.base_url, topic)
    }
}

fn frame_text(message: Message) -> AppResult<String> {
    match message {
        Message::Text(text) => Ok(text),
        Message::Bytes(bytes) => String::from_utf8(bytes)
            .map_err(|e| AppError::Decode(format!("binary frame is not UTF-8: {e}"))),
    }
}

impl StreamConnector for GlooStreamConnector {
    type Stream = LocalBoxStream<'static, AppResult<String>>;

    async fn connect(&self, topic: StreamTopic) -> AppResult<Self::Stream> {
        let url = self.topic_url(topic);
        log_info!(LogComponent::Stream(topic.into()), "🔌 Connecting to {}", url);
        // Подключаемся к каналу
        let socket = WebSocket::open(&url)
            .map_err(|e| AppError::Stream(format!("failed to open {url}: {e:?}")))?;
        Ok(socket
            .map(|frame| match frame {
                Ok(message) => frame_text(message),
                Err(e) => Err(AppError::Stream(format!("{e:?}"))),
            })
            .boxed_local())
    }

    async fn wait(&self, delay: Duration) {
        sleep(delay).await;
    }
}
