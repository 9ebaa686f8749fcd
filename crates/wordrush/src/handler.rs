//! Per-connection handler: session registration and request routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Mint a `PlayerId` from the connection id, register a session
//!   2. Spawn the outbound pump (the socket's only writer)
//!   3. Push the `welcome` frame
//!   4. Loop: decode requests → dispatch → queue reply frames
//!   5. On exit, the drop guard closes the session and leaves the room

use std::sync::Arc;

use tokio::sync::mpsc;
use wordrush_protocol::{ClientEvent, Codec, Frame, PlayerId, Request, ServerEvent};
use wordrush_room::PlayerSender;
use wordrush_transport::{Connection, WebSocketConnection};

use crate::WordrushError;
use crate::server::{PROTOCOL_VERSION, ServerState};

/// Drop guard that cleans up a player's session and room membership
/// when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async locks.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let record = {
                let mut sessions = state.sessions.lock().await;
                sessions.remove(player_id)
            };
            match record {
                Ok(session) => {
                    if let Some(room) = session.room {
                        let left = {
                            let mut rooms = state.rooms.lock().await;
                            rooms.leave(&room, player_id).await
                        };
                        if left {
                            tracing::debug!(
                                %player_id, room = %room,
                                "left room on disconnect"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "no session to close");
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), WordrushError> {
    // The connection id doubles as the player identity: ids are minted
    // from a process-wide counter and never reused while a socket is open.
    let player_id = PlayerId(conn.id().into_inner());
    tracing::debug!(%player_id, "handling new connection");

    {
        let mut sessions = state.sessions.lock().await;
        sessions.create(player_id)?;
    }
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    // All outbound traffic goes through this channel: room broadcasts
    // hold a clone of `tx`, and the pump below is the socket's single
    // writer. It exits once every sender is gone or the peer hangs up.
    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
    let pump_conn = conn.clone();
    let pump_state = Arc::clone(&state);
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let bytes = match pump_state.codec.encode(&frame) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound frame");
                    continue;
                }
            };
            if let Err(e) = pump_conn.send(&bytes).await {
                tracing::debug!(error = %e, "outbound send failed");
                break;
            }
        }
        let _ = pump_conn.close().await;
    });

    let _ = tx.send(Frame::event(ServerEvent::Welcome {
        player_id,
        protocol_version: PROTOCOL_VERSION,
    }));

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let request: Request = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "rejecting undecodable request");
                // Salvage the seq if the bytes were at least JSON, so
                // the client's pending call fails instead of hanging.
                if let Some(seq) = salvage_seq(&data) {
                    let _ = tx.send(Frame::reply(seq, ServerEvent::Ack { success: false }));
                }
                continue;
            }
        };

        handle_request(&state, &tx, player_id, request).await;
    }

    // _guard drops here → session close and room leave fire.
    Ok(())
}

/// Dispatches one decoded request and queues its reply, if the request
/// type has one.
async fn handle_request<C: Codec>(
    state: &Arc<ServerState<C>>,
    tx: &PlayerSender,
    player_id: PlayerId,
    request: Request,
) {
    let Request { seq, event } = request;

    // PERF: every request takes the global registry lock for the length
    // of one actor round-trip. Revisit if room counts grow past a few
    // hundred.
    match event {
        ClientEvent::JoinRoom {
            room_id,
            player_name,
        } => {
            let previous = {
                let mut sessions = state.sessions.lock().await;
                if let Err(e) = sessions.set_name(player_id, &player_name) {
                    tracing::debug!(%player_id, error = %e, "join without a session");
                    let _ = tx.send(Frame::reply(
                        seq,
                        ServerEvent::Joined {
                            success: false,
                            is_owner: false,
                        },
                    ));
                    return;
                }
                sessions.room_of(&player_id)
            };

            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms
                    .create_or_join(&room_id, player_id, &player_name, tx.clone(), previous)
                    .await
            };

            match result {
                Ok(outcome) => {
                    let mut sessions = state.sessions.lock().await;
                    let _ = sessions.set_room(player_id, Some(room_id));
                    let _ = tx.send(Frame::reply(
                        seq,
                        ServerEvent::Joined {
                            success: true,
                            is_owner: outcome.is_owner,
                        },
                    ));
                }
                Err(e) => {
                    tracing::debug!(%player_id, room = %room_id, error = %e, "join failed");
                    let _ = tx.send(Frame::reply(
                        seq,
                        ServerEvent::Joined {
                            success: false,
                            is_owner: false,
                        },
                    ));
                }
            }
        }

        ClientEvent::LeaveRoom { room_id } => {
            let removed = {
                let mut rooms = state.rooms.lock().await;
                rooms.leave(&room_id, player_id).await
            };
            if removed {
                let mut sessions = state.sessions.lock().await;
                let _ = sessions.set_room(player_id, None);
            }
            let _ = tx.send(Frame::reply(seq, ServerEvent::Ack { success: removed }));
        }

        ClientEvent::StartGame { room_id } => {
            let started = state.rooms.lock().await.start(&room_id, player_id).await;
            let _ = tx.send(Frame::reply(seq, ServerEvent::Ack { success: started }));
        }

        ClientEvent::EndGame { room_id } => {
            let ended = state
                .rooms
                .lock()
                .await
                .force_end(&room_id, player_id)
                .await;
            let _ = tx.send(Frame::reply(seq, ServerEvent::Ack { success: ended }));
        }

        ClientEvent::SubmitWord {
            room_id,
            word,
            time_remaining,
        } => {
            // The client's timer is authoritative: a non-positive
            // remainder means the turn expired before the word arrived.
            let out_of_time = time_remaining <= 0.0;
            let outcome = state
                .rooms
                .lock()
                .await
                .submit(&room_id, player_id, word, out_of_time)
                .await;
            let _ = tx.send(Frame::reply(
                seq,
                ServerEvent::WordResult {
                    correct: outcome.correct,
                    feedback: outcome.feedback,
                    lives_left: outcome.lives_left,
                    is_eliminated: outcome.is_eliminated,
                },
            ));
        }

        ClientEvent::GetRoomPlayers { room_id } => {
            let (players, owner_id) = state.rooms.lock().await.snapshot(&room_id).await;
            let _ = tx.send(Frame::reply(
                seq,
                ServerEvent::RoomPlayers { players, owner_id },
            ));
        }

        ClientEvent::PlayerTyping {
            room_id,
            input,
            time_remaining,
        } => {
            // Fire-and-forget: typing previews get no reply.
            state
                .rooms
                .lock()
                .await
                .typing(&room_id, player_id, input, time_remaining)
                .await;
        }
    }
}

/// Pulls the `seq` out of bytes that failed to decode as a request, so
/// a failure reply can still be correlated.
fn salvage_seq(data: &[u8]) -> Option<u64> {
    serde_json::from_slice::<serde_json::Value>(data)
        .ok()?
        .get("seq")?
        .as_u64()
}
