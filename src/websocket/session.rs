//! WebSocket session actor and the `/ws` route.
//!
//! Connection lifecycle: register in the [`ConnectionRegistry`], replay the
//! persisted history privately to this client, then relay inbound
//! `new-message` events — persist first, fan out the stored record to every
//! connection afterwards. Broadcast order therefore follows persistence
//! completion order, not arrival order. Disconnection only releases the
//! registry entry.

use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::db::chat_repo;
use crate::metrics::{CHAT_MESSAGES_DROPPED_TOTAL, CHAT_MESSAGES_TOTAL};
use crate::resilience::{with_retry, RetryConfig};
use crate::state::AppState;
use crate::websocket::message_types::{WsInboundEvent, WsOutboundEvent};
use crate::websocket::{ConnectionRegistry, SubscriberId};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Frame pushed into the session's WebSocket.
#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Outbound(pub String);

pub struct WsSession {
    subscriber_id: SubscriberId,
    registry: ConnectionRegistry,
    db: PgPool,
    hb: Instant,
}

impl WsSession {
    pub fn new(subscriber_id: SubscriberId, registry: ConnectionRegistry, db: PgPool) -> Self {
        Self {
            subscriber_id,
            registry,
            db,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!("chat client missed heartbeats, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// Load the persisted history and deliver it to this client only.
    /// A load failure is logged and the client simply starts without a
    /// snapshot; the connection stays up.
    fn send_history(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let db = self.db.clone();
        let addr = ctx.address();

        actix::spawn(async move {
            match chat_repo::list_history(&db).await {
                Ok(messages) => {
                    match serde_json::to_string(&WsOutboundEvent::HistorySnapshot { messages }) {
                        Ok(json) => addr.do_send(Outbound(json)),
                        Err(e) => tracing::error!(error = %e, "failed to encode chat history"),
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to load chat history"),
            }
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("chat client connected");
        self.hb(ctx);
        self.send_history(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("chat client disconnected");

        let registry = self.registry.clone();
        let subscriber_id = self.subscriber_id;
        actix::spawn(async move {
            registry.remove_subscriber(subscriber_id).await;
        });
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(WsInboundEvent::NewMessage {
                    sender,
                    user_name,
                    text,
                }) => {
                    let db = self.db.clone();
                    let registry = self.registry.clone();
                    let addr = ctx.address();
                    actix::spawn(async move {
                        persist_and_broadcast(db, registry, addr, sender, user_name, text).await;
                    });
                }
                Err(e) => {
                    tracing::warn!("failed to parse chat event: {e}");
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(?reason, "chat client sent close");
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// Persist the message (with bounded retry), then fan the stored record out
/// to all connections. On persistence failure the message is dropped from
/// the fan-out path and only the offending client is told.
async fn persist_and_broadcast(
    db: PgPool,
    registry: ConnectionRegistry,
    addr: actix::Addr<WsSession>,
    sender: Uuid,
    user_name: String,
    text: String,
) {
    let persisted = with_retry(persist_retry_config(), || {
        chat_repo::insert_message(&db, sender, &user_name, &text)
    })
    .await;

    match persisted {
        Ok(message) => {
            CHAT_MESSAGES_TOTAL.inc();
            match serde_json::to_string(&WsOutboundEvent::MessageBroadcast { message }) {
                Ok(json) => registry.broadcast(json).await,
                Err(e) => tracing::error!(error = %e, "failed to encode chat message"),
            }
        }
        Err(e) => {
            CHAT_MESSAGES_DROPPED_TOTAL.inc();
            tracing::error!(error = %e, "failed to persist chat message, dropping it");
            if let Ok(json) = serde_json::to_string(&WsOutboundEvent::Error {
                message: "message could not be saved".into(),
            }) {
                addr.do_send(Outbound(json));
            }
        }
    }
}

fn persist_retry_config() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(50),
        max_backoff: Duration::from_millis(500),
        backoff_multiplier: 2.0,
        jitter: true,
    }
}

#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (subscriber_id, mut rx) = state.registry.add_subscriber().await;

    let session = WsSession::new(subscriber_id, state.registry.clone(), state.db.clone());
    let (addr, resp) = match ws::WsResponseBuilder::new(session, &req, stream).start_with_addr() {
        Ok(started) => started,
        Err(e) => {
            // Handshake failed before the actor existed; release the slot.
            state.registry.remove_subscriber(subscriber_id).await;
            return Err(e);
        }
    };

    // Bridge the registry's channel into the session actor.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            addr.do_send(Outbound(msg));
        }
    });

    Ok(resp)
}
