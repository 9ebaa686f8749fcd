//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. All mutations of a room's roster and turn
//! state happen inside its actor, so events for the same room never
//! interleave and rooms never contend with each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use wordrush_dict::Dictionary;
use wordrush_protocol::{Frame, PlayerId, PlayerInfo, Recipient, RoomCode, ServerEvent};

use crate::roster::Roster;
use crate::turn::{TurnState, WordOutcome};
use crate::{GameConfig, RoomError};

/// Channel sender for delivering outbound frames to a player's
/// connection.
pub type PlayerSender = mpsc::UnboundedSender<Frame>;

/// Result of joining a room.
#[derive(Debug, Clone, Copy)]
pub struct JoinOutcome {
    /// Whether the joiner is the room's current owner.
    pub is_owner: bool,
}

/// Result of leaving a room.
#[derive(Debug, Clone, Copy)]
pub struct LeaveOutcome {
    /// Whether the player was actually a member.
    pub removed: bool,
    /// Whether the room is now empty and should be destroyed.
    pub now_empty: bool,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in most variants is a reply channel: the
/// caller sends a command and awaits the response on it.
pub(crate) enum RoomCommand {
    /// Add a player, or refresh an existing membership.
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<JoinOutcome>,
    },

    /// Remove a player.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// Start a game. Owner only.
    Start {
        player_id: PlayerId,
        reply: oneshot::Sender<bool>,
    },

    /// Forcibly end the running game. Owner only.
    ForceEnd {
        player_id: PlayerId,
        reply: oneshot::Sender<bool>,
    },

    /// Judge a word submission for the current turn.
    Submit {
        player_id: PlayerId,
        word: String,
        out_of_time: bool,
        reply: oneshot::Sender<WordOutcome>,
    },

    /// Relay the turn-holder's typing to the rest of the room.
    /// Fire-and-forget.
    Typing {
        player_id: PlayerId,
        input: String,
        time_remaining: f64,
    },

    /// Read the current roster and owner.
    Snapshot {
        reply: oneshot::Sender<(Vec<PlayerInfo>, Option<PlayerId>)>,
    },

    /// Shut down the room.
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone; the registry holds
/// one per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<JoinOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            name,
            sender,
            reply: reply_tx,
        })
        .await?;
        self.await_reply(reply_rx).await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        self.await_reply(reply_rx).await
    }

    pub async fn start(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Start {
            player_id,
            reply: reply_tx,
        })
        .await?;
        self.await_reply(reply_rx).await
    }

    pub async fn force_end(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::ForceEnd {
            player_id,
            reply: reply_tx,
        })
        .await?;
        self.await_reply(reply_rx).await
    }

    pub async fn submit(
        &self,
        player_id: PlayerId,
        word: String,
        out_of_time: bool,
    ) -> Result<WordOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Submit {
            player_id,
            word,
            out_of_time,
            reply: reply_tx,
        })
        .await?;
        self.await_reply(reply_rx).await
    }

    pub async fn typing(
        &self,
        player_id: PlayerId,
        input: String,
        time_remaining: f64,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Typing {
            player_id,
            input,
            time_remaining,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<(Vec<PlayerInfo>, Option<PlayerId>), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        self.await_reply(reply_rx).await
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn await_reply<T>(&self, reply: oneshot::Receiver<T>) -> Result<T, RoomError> {
        reply
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    config: GameConfig,
    dict: Arc<dyn Dictionary>,
    roster: Roster,
    /// Present exactly while a game is running.
    turn: Option<TurnState>,
    /// Per-player outbound channels, in lockstep with the roster.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let outcome = self.handle_join(player_id, &name, sender);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let outcome = self.handle_leave(player_id);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Start { player_id, reply } => {
                    let _ = reply.send(self.handle_start(player_id));
                }
                RoomCommand::ForceEnd { player_id, reply } => {
                    let _ = reply.send(self.handle_force_end(player_id));
                }
                RoomCommand::Submit {
                    player_id,
                    word,
                    out_of_time,
                    reply,
                } => {
                    let outcome = self.handle_submit(player_id, &word, out_of_time);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Typing {
                    player_id,
                    input,
                    time_remaining,
                } => {
                    self.handle_typing(player_id, input, time_remaining);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send((self.roster.infos(), self.roster.owner()));
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.code, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    fn handle_join(&mut self, player_id: PlayerId, name: &str, sender: PlayerSender) -> JoinOutcome {
        // Joining a running game means spectating until the next one.
        let newly_added = if self.turn.is_some() && !self.roster.contains(player_id) {
            self.roster.join(player_id, name, 0, true)
        } else {
            self.roster
                .join(player_id, name, self.config.starting_lives, false)
        };
        self.senders.insert(player_id, sender);

        let is_owner = self.roster.is_owner(player_id);
        self.send_to(
            player_id,
            ServerEvent::RoomJoined {
                room_id: self.code.clone(),
                is_owner,
            },
        );
        if newly_added {
            self.broadcast_except(player_id, ServerEvent::PlayerJoined { player_id });
        }
        self.broadcast(self.roster.snapshot_event());

        tracing::info!(
            room = %self.code,
            %player_id,
            players = self.roster.len(),
            "player joined"
        );
        JoinOutcome { is_owner }
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        if !self.roster.contains(player_id) {
            return LeaveOutcome {
                removed: false,
                now_empty: self.roster.is_empty(),
            };
        }

        // Confirm to the leaver while their channel is still wired up.
        self.send_to(
            player_id,
            ServerEvent::RoomLeft {
                room_id: self.code.clone(),
            },
        );
        self.roster.remove(player_id);
        self.senders.remove(&player_id);

        self.broadcast(ServerEvent::PlayerLeft { player_id });
        self.broadcast(self.roster.snapshot_event());

        if let Some(turn) = self.turn.as_mut() {
            let (events, ended) =
                turn.handle_departure(&self.roster, self.dict.as_ref(), player_id);
            if ended {
                self.turn = None;
            }
            self.dispatch(events);
        }

        tracing::info!(
            room = %self.code,
            %player_id,
            players = self.roster.len(),
            "player left"
        );
        LeaveOutcome {
            removed: true,
            now_empty: self.roster.is_empty(),
        }
    }

    fn handle_start(&mut self, player_id: PlayerId) -> bool {
        if !self.roster.is_owner(player_id) {
            tracing::debug!(room = %self.code, %player_id, "start rejected: not owner");
            return false;
        }
        if self.turn.is_some() {
            return false;
        }
        match TurnState::start(&mut self.roster, self.dict.as_ref(), &self.config) {
            Some((turn, events)) => {
                tracing::info!(
                    room = %self.code,
                    players = self.roster.len(),
                    "game started"
                );
                self.turn = Some(turn);
                self.dispatch(events);
                true
            }
            None => false,
        }
    }

    fn handle_force_end(&mut self, player_id: PlayerId) -> bool {
        if !self.roster.is_owner(player_id) {
            return false;
        }
        let Some(turn) = self.turn.take() else {
            return false;
        };
        let events = turn.force_end(&self.roster);
        self.dispatch(events);
        tracing::info!(room = %self.code, "game ended by owner");
        true
    }

    fn handle_submit(&mut self, player_id: PlayerId, word: &str, out_of_time: bool) -> WordOutcome {
        let lives = self.roster.get(player_id).map(|p| p.lives).unwrap_or(0);
        let Some(turn) = self.turn.as_mut() else {
            return WordOutcome::rejected("no game in progress", lives, false);
        };

        let (outcome, events, ended) =
            turn.submit(&mut self.roster, self.dict.as_ref(), player_id, word, out_of_time);
        if ended {
            tracing::info!(room = %self.code, "game over");
            self.turn = None;
        }
        self.dispatch(events);
        outcome
    }

    fn handle_typing(&self, player_id: PlayerId, input: String, time_remaining: f64) {
        // Only the player actually holding the turn may broadcast
        // keystrokes.
        let holder = self.turn.as_ref().and_then(|t| t.current_player());
        if holder != Some(player_id) {
            return;
        }
        self.broadcast_except(
            player_id,
            ServerEvent::PlayerTypingUpdate {
                player_id,
                input,
                time_remaining,
            },
        );
    }

    /// Fans a batch of turn-engine events out to their recipients.
    fn dispatch(&self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => self.broadcast(event),
                Recipient::Player(player_id) => self.send_to(player_id, event),
                Recipient::AllExcept(excluded) => self.broadcast_except(excluded, event),
            }
        }
    }

    fn broadcast(&self, event: ServerEvent) {
        for id in self.senders.keys() {
            self.send_frame(*id, Frame::event(event.clone()));
        }
    }

    fn broadcast_except(&self, excluded: PlayerId, event: ServerEvent) {
        for id in self.senders.keys() {
            if *id != excluded {
                self.send_frame(*id, Frame::event(event.clone()));
            }
        }
    }

    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        self.send_frame(player_id, Frame::event(event));
    }

    /// Delivers one frame, silently dropping it if the player's
    /// connection is gone.
    fn send_frame(&self, player_id: PlayerId, frame: Frame) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(frame);
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel; senders wait when it
/// fills up.
pub(crate) fn spawn_room(
    code: RoomCode,
    config: GameConfig,
    dict: Arc<dyn Dictionary>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        code: code.clone(),
        config,
        dict,
        roster: Roster::new(),
        turn: None,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
