//! Service wiring behind the HTTP handlers.

use std::{convert::Infallible, sync::Arc, thread, time::Duration};

use anyhow::Context;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use storefront_infra::{InventoryContext, InventoryEnvelope};

/// Message pushed to realtime (SSE) subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub sequence_number: u64,
    pub payload: serde_json::Value,
}

impl RealtimeMessage {
    fn from_envelope(env: &InventoryEnvelope) -> Self {
        Self {
            topic: env.event_type().to_string(),
            sequence_number: env.sequence_number(),
            payload: serde_json::to_value(env.payload()).unwrap_or(serde_json::Value::Null),
        }
    }
}

pub struct AppServices {
    ctx: Arc<InventoryContext>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn ctx(&self) -> &InventoryContext {
        &self.ctx
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }
}

/// Wire the HTTP services around a shared context.
///
/// A background thread forwards bus events to the realtime broadcast; it
/// exits once the bus goes away.
pub fn build_services(ctx: Arc<InventoryContext>) -> anyhow::Result<AppServices> {
    // Realtime channel (SSE): lossy broadcast, no backpressure on the inventory.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    {
        let sub = ctx.subscribe();
        let realtime_tx = realtime_tx.clone();
        thread::Builder::new()
            .name("realtime-bridge".to_string())
            .spawn(move || {
                while let Ok(env) = sub.recv() {
                    // No listeners is fine.
                    let _ = realtime_tx.send(RealtimeMessage::from_envelope(&env));
                }
            })
            .context("failed to spawn realtime bridge")?;
    }

    Ok(AppServices { ctx, realtime_tx })
}

pub fn sse_stream(services: &AppServices) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>> + use<>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(m) => {
            let data = serde_json::to_string(&m).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        // Lagged receivers skip what they missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
