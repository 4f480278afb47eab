//! Relay of opaque signaling and control payloads.
//!
//! Payloads are moved, never inspected. If the destination connection has
//! already gone away the payload is dropped; telling the surviving side is
//! the disconnect path's job.

use super::Broker;
use super::broker::BrokerState;
use crate::domain::{ConnectionId, PairingCode, ServerEvent};
use crate::error::BrokerError;

impl Broker {
    /// Relays a signaling payload from `connection`.
    ///
    /// A paired sender always reaches its peer; `target`, if given, must
    /// name that peer. An unpaired sender must name a `target` explicitly,
    /// which is how handshake messages flow before the bridge exists.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::NotYourPeer`] if a paired sender names another code.
    /// - [`BrokerError::NotPaired`] if an unpaired sender gives no target.
    pub async fn relay_signal(
        &self,
        connection: ConnectionId,
        payload: serde_json::Value,
        target: Option<PairingCode>,
    ) -> Result<(), BrokerError> {
        let state = self.lock().await;
        let from_code = state.registry.code_of(connection).cloned();
        let paired_peer = from_code
            .as_ref()
            .and_then(|code| state.pairs.peer_of(code))
            .cloned();

        let destination = match (paired_peer, target) {
            (Some(peer), Some(target)) if peer != target => {
                return Err(BrokerError::NotYourPeer(target.to_string()));
            }
            (Some(peer), _) => peer,
            (None, Some(target)) => target,
            (None, None) => return Err(BrokerError::NotPaired),
        };

        let event = ServerEvent::Signal {
            payload,
            from: connection,
            from_code,
        };
        forward(&state, connection, &destination, event);
        Ok(())
    }

    /// Relays a control-input event from `connection` to its paired peer.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::NotPaired`] if the sender has no active pair.
    /// - [`BrokerError::NotYourPeer`] if `target` names another code.
    pub async fn relay_control(
        &self,
        connection: ConnectionId,
        event: serde_json::Value,
        target: Option<PairingCode>,
    ) -> Result<(), BrokerError> {
        let state = self.lock().await;
        let peer = state
            .registry
            .code_of(connection)
            .and_then(|code| state.pairs.peer_of(code))
            .cloned()
            .ok_or(BrokerError::NotPaired)?;
        if let Some(target) = target
            && target != peer
        {
            return Err(BrokerError::NotYourPeer(target.to_string()));
        }

        forward(&state, connection, &peer, ServerEvent::ControlEvent { event });
        Ok(())
    }
}

/// Delivers `event` to whoever holds `destination`, or drops it.
fn forward(
    state: &BrokerState,
    from: ConnectionId,
    destination: &PairingCode,
    event: ServerEvent,
) {
    let kind = event.name();
    match state.registry.lookup(destination) {
        Some(to) => {
            if state.send(to, event) {
                tracing::debug!(%from, %destination, kind, "payload relayed");
            }
        }
        None => {
            tracing::debug!(%from, %destination, kind, "relay target gone; payload dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::super::test_support::{TestClient, bridged_pair, code};
    use super::*;

    #[tokio::test]
    async fn signal_reaches_peer_exactly_once() {
        let broker = Broker::default();
        let (mut a, mut b) = bridged_pair(&broker, "111111111", "222222222").await;
        let mut bystander = TestClient::registered(&broker, "333333333").await;

        let offer = json!({"type": "offer", "sdp": "v=0"});
        assert!(broker.relay_signal(a.id, offer.clone(), None).await.is_ok());

        assert_eq!(
            b.drain(),
            vec![ServerEvent::Signal {
                payload: offer,
                from: a.id,
                from_code: Some(code("111111111")),
            }]
        );
        assert!(a.drain().is_empty());
        assert!(bystander.drain().is_empty());
    }

    #[tokio::test]
    async fn signals_preserve_sender_order() {
        let broker = Broker::default();
        let (a, mut b) = bridged_pair(&broker, "1", "2").await;

        for seq in 0..50 {
            assert!(
                broker
                    .relay_signal(a.id, json!({"candidate": seq}), Some(code("2")))
                    .await
                    .is_ok()
            );
        }

        let received: Vec<_> = b
            .drain()
            .into_iter()
            .map(|event| match event {
                ServerEvent::Signal { payload, .. } => payload["candidate"].clone(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        let expected: Vec<_> = (0..50).map(|seq| json!(seq)).collect();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn paired_sender_cannot_address_third_party() {
        let broker = Broker::default();
        let (a, mut b) = bridged_pair(&broker, "1", "2").await;
        let mut c = TestClient::registered(&broker, "3").await;

        let result = broker.relay_signal(a.id, json!("x"), Some(code("3"))).await;
        assert!(matches!(result, Err(BrokerError::NotYourPeer(_))));
        assert!(b.drain().is_empty());
        assert!(c.drain().is_empty());
    }

    #[tokio::test]
    async fn unpaired_signal_routes_by_explicit_target() {
        let broker = Broker::default();
        let a = TestClient::registered(&broker, "1").await;
        let mut b = TestClient::registered(&broker, "2").await;

        assert!(broker.relay_signal(a.id, json!({"sdp": 1}), Some(code("2"))).await.is_ok());
        assert_eq!(b.drain().len(), 1);

        let result = broker.relay_signal(a.id, json!({"sdp": 2}), None).await;
        assert!(matches!(result, Err(BrokerError::NotPaired)));
    }

    #[tokio::test]
    async fn signal_to_departed_target_is_dropped_silently() {
        let broker = Broker::default();
        let a = TestClient::registered(&broker, "1").await;
        let b = TestClient::registered(&broker, "2").await;
        broker.disconnect(b.id).await;

        let result = broker.relay_signal(a.id, json!({}), Some(code("2"))).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn control_event_requires_pair() {
        let broker = Broker::default();
        let lonely = TestClient::registered(&broker, "9").await;
        let result = broker.relay_control(lonely.id, json!({"x": 1}), None).await;
        assert!(matches!(result, Err(BrokerError::NotPaired)));
    }

    #[tokio::test]
    async fn control_event_forwarded_unmodified() {
        let broker = Broker::default();
        let (mut a, mut b) = bridged_pair(&broker, "1", "2").await;
        let input = json!({"type": "mousemove", "x": 0.25, "y": 0.75});

        assert!(
            broker
                .relay_control(a.id, input.clone(), Some(code("2")))
                .await
                .is_ok()
        );
        assert_eq!(b.drain(), vec![ServerEvent::ControlEvent { event: input }]);
        assert!(a.drain().is_empty());
    }
}
