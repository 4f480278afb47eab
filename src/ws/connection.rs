//! WebSocket connection loop.
//!
//! One task per client. It decodes inbound frames and dispatches them to
//! the [`Broker`] in arrival order, and drains the connection's mailbox to
//! the socket in enqueue order. When either side ends, the broker is told
//! to tear the connection down.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::ClientMessage;
use crate::domain::{ConnectionId, Mailbox};
use crate::error::BrokerError;
use crate::service::Broker;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(socket: WebSocket, broker: Arc<Broker>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (mailbox, mut outbound) = Mailbox::channel();
    let connection = broker.connect(mailbox.clone()).await;

    loop {
        tokio::select! {
            // Incoming frame from the client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&broker, connection, &mailbox, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => handle_frame(&broker, connection, &mailbox, text).await,
                        Err(err) => {
                            report(&mailbox, connection, &BrokerError::MalformedMessage(err.to_string()));
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::warn!(%connection, error = %err, "ws receive failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Event queued for this client
            event = outbound.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%connection, event = event.name(), error = %err, "failed to encode event");
                    }
                }
            }
        }
    }

    broker.disconnect(connection).await;
    tracing::debug!(%connection, "ws connection closed");
}

/// Decodes and dispatches one frame, reporting failures to the sender.
async fn handle_frame(broker: &Broker, connection: ConnectionId, mailbox: &Mailbox, frame: &str) {
    let result = match ClientMessage::decode(frame) {
        Ok(msg) => {
            tracing::trace!(%connection, command = msg.name(), "frame received");
            dispatch(broker, connection, msg).await
        }
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        report(mailbox, connection, &err);
    }
}

/// Routes a decoded command to the matching broker operation.
async fn dispatch(
    broker: &Broker,
    connection: ConnectionId,
    msg: ClientMessage,
) -> Result<(), BrokerError> {
    match msg {
        ClientMessage::Register { code } => broker.register(connection, code).await,
        ClientMessage::RequestPairing {
            target_code,
            sender_code,
        } => {
            broker
                .request_pairing(connection, target_code, sender_code)
                .await
        }
        ClientMessage::PairingResponse {
            accepted,
            sender_connection,
        } => {
            broker
                .respond_to_pairing(connection, sender_connection, accepted)
                .await
        }
        ClientMessage::Signal {
            payload,
            target_code,
        } => broker.relay_signal(connection, payload, target_code).await,
        ClientMessage::ControlEvent { event, target_code } => {
            broker.relay_control(connection, event, target_code).await
        }
        ClientMessage::ClosePair => broker.close_pair(connection).await,
    }
}

fn report(mailbox: &Mailbox, connection: ConnectionId, err: &BrokerError) {
    tracing::warn!(%connection, code = err.error_code(), error = %err, "client command rejected");
    mailbox.deliver(err.to_event());
}
