//! Flow event stream (server-sent events).
//!
//! `open` performs the HTTP handshake on the caller's task; once the server
//! has answered 2xx, a background task owns the response body, parses the
//! SSE framing, and pushes decoded messages into a bounded channel. Sends
//! wait while the channel is full, so a slow consumer slows the reader
//! instead of losing events.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use urlencoding::encode;

use super::client::{check_response, FlowdockClient};
use crate::error::{Error, Result};
use crate::models::Message;

/// Live event stream of one flow.
///
/// Yields `Ok(message)` per event. A payload that fails to decode yields
/// `Err(Error::Decode)` and the stream keeps going; a transport error yields
/// `Err(Error::Stream)` and ends it. Dropping the handle closes the
/// connection.
pub struct MessageStream {
    flow: String,
    rx: mpsc::Receiver<Result<Message>>,
    task: JoinHandle<()>,
}

pub(crate) async fn open(
    client: &FlowdockClient,
    token: &str,
    org: &str,
    flow: &str,
) -> Result<MessageStream> {
    let mut url = client.stream_endpoint(&format!("flows/{}/{}", encode(org), encode(flow)))?;
    url.query_pairs_mut().append_pair("access_token", token);

    let label = format!("{}/{}", org, flow);
    tracing::info!("Connecting event stream for {}", label);

    let resp = client
        .http()
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await?;
    let resp = check_response(resp).await?;

    tracing::info!("Event stream for {} connected (status={})", label, resp.status());

    let (tx, rx) = mpsc::channel(client.stream_buffer());
    let task = tokio::spawn(read_events(resp, tx, label.clone()));

    Ok(MessageStream {
        flow: label,
        rx,
        task,
    })
}

async fn read_events(resp: reqwest::Response, tx: mpsc::Sender<Result<Message>>, label: String) {
    let events = resp.bytes_stream().eventsource();
    tokio::pin!(events);

    while let Some(event) = events.next().await {
        let item = match event {
            // Keep-alives and comment-only events carry no data
            Ok(event) if event.data.is_empty() => continue,
            Ok(event) => decode_event(&event.data),
            Err(e) => {
                tracing::warn!("Event stream {} failed: {}", label, e);
                let _ = tx.send(Err(Error::Stream(e.to_string()))).await;
                break;
            }
        };

        if let Err(e) = &item {
            tracing::warn!("Undecodable event on {}: {}", label, e);
        }

        if tx.send(item).await.is_err() {
            tracing::debug!("Receiver for {} dropped", label);
            break;
        }
    }

    tracing::info!("Event stream for {} closed", label);
}

/// Parse an event's `data` into a message whose content is known to decode.
fn decode_event(data: &str) -> Result<Message> {
    let message: Message = serde_json::from_str(data)?;
    message.content()?;
    Ok(message)
}

impl MessageStream {
    /// `org/flow` this stream belongs to.
    pub fn flow(&self) -> &str {
        &self.flow
    }

    /// Next event. `None` once the stream is closed and drained.
    pub async fn recv(&mut self) -> Option<Result<Message>> {
        self.rx.recv().await
    }

    /// Stop reading and release the connection. Events already buffered
    /// can still be received.
    pub fn close(&mut self) {
        self.task.abort();
        self.rx.close();
    }

    /// The reader has stopped (server closed, error, or `close`).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStream")
            .field("flow", &self.flow)
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl Stream for MessageStream {
    type Item = Result<Message>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_event() {
        let msg = decode_event(r#"{"event":"message","content":"hello"}"#).unwrap();
        assert_eq!(msg.content().unwrap().to_string(), "hello");
    }

    #[test]
    fn test_decode_event_errors() {
        assert!(matches!(decode_event("{not json"), Err(Error::Decode(_))));
        assert!(matches!(
            decode_event(r#"{"content":"no event"}"#),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_event(r#"{"event":"comment","content":"not an object"}"#),
            Err(Error::Decode(_))
        ));
    }
}
