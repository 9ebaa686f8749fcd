//! Integration tests for the server, handler, and full connection flow,
//! driven through real WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use wordrush::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
///
/// The word list is tiny and every word contains "in", which is also the
/// only sequence frequent enough to be dealt: challenges are
/// deterministic.
async fn start_server() -> String {
    let lexicon = Lexicon::from_words(
        ["ring", "sing", "king", "wind", "fine"],
        LexiconConfig {
            min_sequence_len: 2,
            max_sequence_len: 2,
            min_occurrences: 5,
        },
    )
    .expect("lexicon should build");

    let server = WordrushServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(Arc::new(lexicon))
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

/// Connects and consumes the `welcome` frame, returning the identity the
/// server minted for this connection.
async fn connect_player(addr: &str) -> (ClientWs, PlayerId) {
    let mut ws = connect(addr).await;
    let frame = recv_frame(&mut ws).await;
    match frame.event {
        ServerEvent::Welcome {
            player_id,
            protocol_version,
        } => {
            assert_eq!(protocol_version, PROTOCOL_VERSION);
            (ws, player_id)
        }
        other => panic!("expected welcome, got {other:?}"),
    }
}

async fn send_request(ws: &mut ClientWs, seq: u64, event: ClientEvent) {
    let bytes = serde_json::to_vec(&Request::new(seq, event)).expect("encode");
    ws.send(Message::Binary(bytes.into())).await.expect("send");
}

async fn recv_frame(ws: &mut ClientWs) -> Frame {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Binary(data) => {
                return serde_json::from_slice(&data).expect("decode frame");
            }
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("decode frame");
            }
            _ => continue, // ping/pong
        }
    }
}

/// Reads frames until one matches, returning it. Bails out after a few
/// unrelated frames so a missing event fails loudly instead of hanging.
async fn recv_until(
    ws: &mut ClientWs,
    mut pred: impl FnMut(&ServerEvent) -> bool,
) -> Frame {
    for _ in 0..10 {
        let frame = recv_frame(ws).await;
        if pred(&frame.event) {
            return frame;
        }
    }
    panic!("expected event did not arrive within 10 frames");
}

fn join(code: &str, name: &str) -> ClientEvent {
    ClientEvent::JoinRoom {
        room_id: RoomCode::new(code),
        player_name: name.into(),
    }
}

fn room(code: &str) -> RoomCode {
    RoomCode::new(code)
}

// =========================================================================
// Connection lifecycle
// =========================================================================

#[tokio::test]
async fn test_welcome_frame_on_connect() {
    let addr = start_server().await;
    // connect_player asserts the protocol version inside.
    let (_ws, player_id) = connect_player(&addr).await;
    assert!(player_id.0 > 0);
}

#[tokio::test]
async fn test_disconnect_broadcasts_player_left() {
    let addr = start_server().await;
    let (mut ws1, _p1) = connect_player(&addr).await;
    let (mut ws2, p2) = connect_player(&addr).await;

    send_request(&mut ws1, 1, join("GAME", "ana")).await;
    recv_until(&mut ws1, |e| matches!(e, ServerEvent::Joined { .. })).await;
    send_request(&mut ws2, 1, join("GAME", "ben")).await;
    recv_until(&mut ws2, |e| matches!(e, ServerEvent::Joined { .. })).await;

    ws2.close(None).await.expect("close");

    // Disconnect cleanup runs asynchronously after the socket closes.
    let frame =
        recv_until(&mut ws1, |e| matches!(e, ServerEvent::PlayerLeft { .. })).await;
    assert!(matches!(
        frame.event,
        ServerEvent::PlayerLeft { player_id } if player_id == p2
    ));
    let frame =
        recv_until(&mut ws1, |e| matches!(e, ServerEvent::RoomPlayers { .. })).await;
    match frame.event {
        ServerEvent::RoomPlayers { players, .. } => assert_eq!(players.len(), 1),
        _ => unreachable!(),
    }
}

// =========================================================================
// Room membership
// =========================================================================

#[tokio::test]
async fn test_join_room_pushes_state_then_reply() {
    let addr = start_server().await;
    let (mut ws, me) = connect_player(&addr).await;

    send_request(&mut ws, 1, join("ABC123", "ana")).await;

    // Room state lands before the reply: room-joined, room-players, joined.
    let frame = recv_frame(&mut ws).await;
    assert!(matches!(
        frame.event,
        ServerEvent::RoomJoined { ref room_id, is_owner: true }
            if room_id.as_str() == "ABC123"
    ));

    let frame = recv_frame(&mut ws).await;
    match frame.event {
        ServerEvent::RoomPlayers { players, owner_id } => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].id, me);
            assert_eq!(players[0].name, "ana");
            assert_eq!(owner_id, Some(me));
        }
        other => panic!("expected room-players, got {other:?}"),
    }

    let frame = recv_frame(&mut ws).await;
    assert_eq!(frame.reply_to, Some(1));
    assert!(matches!(
        frame.event,
        ServerEvent::Joined {
            success: true,
            is_owner: true
        }
    ));
}

#[tokio::test]
async fn test_second_join_broadcasts_to_first() {
    let addr = start_server().await;
    let (mut ws1, p1) = connect_player(&addr).await;
    let (mut ws2, p2) = connect_player(&addr).await;

    send_request(&mut ws1, 1, join("GAME", "ana")).await;
    recv_until(&mut ws1, |e| matches!(e, ServerEvent::Joined { .. })).await;

    send_request(&mut ws2, 1, join("GAME", "ben")).await;
    let frame = recv_until(&mut ws2, |e| matches!(e, ServerEvent::Joined { .. })).await;
    assert!(matches!(
        frame.event,
        ServerEvent::Joined {
            success: true,
            is_owner: false
        }
    ));

    // The first player hears about the newcomer and gets a fresh roster,
    // ordered by join time and still owned by the creator.
    recv_until(&mut ws1, |e| {
        matches!(e, ServerEvent::PlayerJoined { player_id } if *player_id == p2)
    })
    .await;
    let frame =
        recv_until(&mut ws1, |e| matches!(e, ServerEvent::RoomPlayers { .. })).await;
    match frame.event {
        ServerEvent::RoomPlayers { players, owner_id } => {
            let ids: Vec<_> = players.iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![p1, p2]);
            assert_eq!(owner_id, Some(p1));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_leave_room_acks_and_clears_membership() {
    let addr = start_server().await;
    let (mut ws, me) = connect_player(&addr).await;

    send_request(&mut ws, 1, join("GAME", "ana")).await;
    recv_until(&mut ws, |e| matches!(e, ServerEvent::Joined { .. })).await;

    // Snapshot on demand.
    send_request(&mut ws, 2, ClientEvent::GetRoomPlayers { room_id: room("GAME") }).await;
    let frame = recv_frame(&mut ws).await;
    assert_eq!(frame.reply_to, Some(2));
    match frame.event {
        ServerEvent::RoomPlayers { players, owner_id } => {
            assert_eq!(players.len(), 1);
            assert_eq!(owner_id, Some(me));
        }
        other => panic!("expected room-players, got {other:?}"),
    }

    send_request(&mut ws, 3, ClientEvent::LeaveRoom { room_id: room("GAME") }).await;
    let frame = recv_until(&mut ws, |e| matches!(e, ServerEvent::Ack { .. })).await;
    assert_eq!(frame.reply_to, Some(3));
    assert!(matches!(frame.event, ServerEvent::Ack { success: true }));

    // Second leave: no membership left to remove.
    send_request(&mut ws, 4, ClientEvent::LeaveRoom { room_id: room("GAME") }).await;
    let frame = recv_until(&mut ws, |e| matches!(e, ServerEvent::Ack { .. })).await;
    assert!(matches!(frame.event, ServerEvent::Ack { success: false }));
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_start_game_requires_owner() {
    let addr = start_server().await;
    let (mut ws1, _p1) = connect_player(&addr).await;
    let (mut ws2, _p2) = connect_player(&addr).await;

    send_request(&mut ws1, 1, join("GAME", "ana")).await;
    recv_until(&mut ws1, |e| matches!(e, ServerEvent::Joined { .. })).await;
    send_request(&mut ws2, 1, join("GAME", "ben")).await;
    recv_until(&mut ws2, |e| matches!(e, ServerEvent::Joined { .. })).await;

    // Not the owner: refused, and nothing is broadcast.
    send_request(&mut ws2, 2, ClientEvent::StartGame { room_id: room("GAME") }).await;
    let frame = recv_until(&mut ws2, |e| matches!(e, ServerEvent::Ack { .. })).await;
    assert_eq!(frame.reply_to, Some(2));
    assert!(matches!(frame.event, ServerEvent::Ack { success: false }));

    // The owner: the broadcast reaches both connections before the ack.
    send_request(&mut ws1, 2, ClientEvent::StartGame { room_id: room("GAME") }).await;
    let frame =
        recv_until(&mut ws1, |e| matches!(e, ServerEvent::GameStarted { .. })).await;
    match frame.event {
        ServerEvent::GameStarted {
            players,
            current_letters,
            ..
        } => {
            assert_eq!(players.len(), 2);
            assert!(players.iter().all(|p| p.lives == 2 && !p.is_spectator));
            assert_eq!(current_letters, "in");
        }
        _ => unreachable!(),
    }
    let frame = recv_until(&mut ws1, |e| matches!(e, ServerEvent::Ack { .. })).await;
    assert_eq!(frame.reply_to, Some(2));
    assert!(matches!(frame.event, ServerEvent::Ack { success: true }));

    recv_until(&mut ws2, |e| matches!(e, ServerEvent::GameStarted { .. })).await;
}

#[tokio::test]
async fn test_turn_timeout_costs_a_life_over_the_wire() {
    let addr = start_server().await;
    let (mut ws1, p1) = connect_player(&addr).await;
    let (mut ws2, p2) = connect_player(&addr).await;

    send_request(&mut ws1, 1, join("GAME", "ana")).await;
    recv_until(&mut ws1, |e| matches!(e, ServerEvent::Joined { .. })).await;
    send_request(&mut ws2, 1, join("GAME", "ben")).await;
    recv_until(&mut ws2, |e| matches!(e, ServerEvent::Joined { .. })).await;

    send_request(&mut ws1, 2, ClientEvent::StartGame { room_id: room("GAME") }).await;
    let frame =
        recv_until(&mut ws1, |e| matches!(e, ServerEvent::GameStarted { .. })).await;
    let current = match frame.event {
        ServerEvent::GameStarted { current_player, .. } => current_player,
        _ => unreachable!(),
    };

    // Route the timed-out submission through whichever socket holds the
    // turn.
    let (holder, holder_id) = if current == p1 {
        (&mut ws1, p1)
    } else {
        (&mut ws2, p2)
    };
    send_request(
        holder,
        3,
        ClientEvent::SubmitWord {
            room_id: room("GAME"),
            word: String::new(),
            time_remaining: 0.0,
        },
    )
    .await;

    let frame = recv_until(holder, |e| matches!(e, ServerEvent::WordResult { .. })).await;
    assert_eq!(frame.reply_to, Some(3));
    match frame.event {
        ServerEvent::WordResult {
            correct,
            feedback,
            lives_left,
            is_eliminated,
        } => {
            assert!(!correct);
            assert_eq!(feedback, "time ran out");
            assert_eq!(lives_left, 1);
            assert!(!is_eliminated);
        }
        _ => unreachable!(),
    }

    // The other connection sees the life loss and the turn moving on.
    let watcher = if current == p1 { &mut ws2 } else { &mut ws1 };
    let frame =
        recv_until(watcher, |e| matches!(e, ServerEvent::PlayerLostLife { .. })).await;
    assert!(matches!(
        frame.event,
        ServerEvent::PlayerLostLife { player_id, lives_left: 1 } if player_id == holder_id
    ));
    let frame = recv_until(watcher, |e| matches!(e, ServerEvent::NextTurn { .. })).await;
    match frame.event {
        ServerEvent::NextTurn {
            current_player,
            current_letters,
        } => {
            assert_ne!(current_player, holder_id);
            assert_eq!(current_letters, "in");
        }
        _ => unreachable!(),
    }

    // Now it is the watcher's turn; a dictionary word containing the
    // sequence lands.
    send_request(
        watcher,
        4,
        ClientEvent::SubmitWord {
            room_id: room("GAME"),
            word: "ring".into(),
            time_remaining: 3.2,
        },
    )
    .await;
    let frame = recv_until(watcher, |e| matches!(e, ServerEvent::WordResult { .. })).await;
    match frame.event {
        ServerEvent::WordResult { correct, feedback, .. } => {
            assert!(correct, "got feedback {feedback:?}");
            assert_eq!(feedback, "correct!");
        }
        _ => unreachable!(),
    }
}

// =========================================================================
// Protocol robustness
// =========================================================================

#[tokio::test]
async fn test_malformed_request_gets_failure_ack() {
    let addr = start_server().await;
    let (mut ws, _) = connect_player(&addr).await;

    ws.send(Message::Text(r#"{"seq":9,"type":"no-such-thing"}"#.into()))
        .await
        .expect("send");

    let frame = recv_frame(&mut ws).await;
    assert_eq!(frame.reply_to, Some(9));
    assert!(matches!(frame.event, ServerEvent::Ack { success: false }));
}

#[tokio::test]
async fn test_garbage_frame_keeps_connection_alive() {
    let addr = start_server().await;
    let (mut ws, _) = connect_player(&addr).await;

    ws.send(Message::Binary(b"not json".to_vec().into()))
        .await
        .expect("send");

    // No reply is possible without a seq; the connection still works,
    // and a snapshot of an absent room is empty rather than an error.
    send_request(&mut ws, 1, ClientEvent::GetRoomPlayers { room_id: room("NOPE") }).await;
    let frame = recv_frame(&mut ws).await;
    assert_eq!(frame.reply_to, Some(1));
    assert!(matches!(
        frame.event,
        ServerEvent::RoomPlayers { ref players, owner_id: None } if players.is_empty()
    ));
}

#[tokio::test]
async fn test_typing_gets_no_reply() {
    let addr = start_server().await;
    let (mut ws, _) = connect_player(&addr).await;

    send_request(&mut ws, 1, join("GAME", "ana")).await;
    recv_until(&mut ws, |e| matches!(e, ServerEvent::Joined { .. })).await;

    // No game is running, so the keystrokes vanish and no reply is owed.
    send_request(
        &mut ws,
        2,
        ClientEvent::PlayerTyping {
            room_id: room("GAME"),
            input: "ri".into(),
            time_remaining: 4.0,
        },
    )
    .await;

    // The next reply on the wire correlates to the follow-up request,
    // not the typing.
    send_request(&mut ws, 3, ClientEvent::GetRoomPlayers { room_id: room("GAME") }).await;
    let frame = recv_frame(&mut ws).await;
    assert_eq!(frame.reply_to, Some(3));
}
