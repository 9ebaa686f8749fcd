//! The turn engine: rotation, word checking, lives, and game end.
//!
//! A `TurnState` exists exactly while a game is running. It snapshots
//! the member order at start and never mutates it; players who are
//! eliminated or leave mid-game keep their seat in the order but are
//! skipped when the turn rotates. Game flow:
//!
//! ```text
//! start ──→ submit/timeout ──→ advance ──┐
//!             ↑                          │
//!             └──────────────────────────┘── ≤1 alive ──→ game over
//! ```
//!
//! The challenge persists across turns until somebody solves it; a
//! correct word retires it and the following turn draws a fresh one.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use wordrush_dict::Dictionary;
use wordrush_protocol::{PlayerId, Recipient, ServerEvent};

use crate::config::GameConfig;
use crate::roster::Roster;

/// The verdict on one `submit-word` request, returned to the submitting
/// player only. Broadcast side effects travel separately as events.
#[derive(Debug, Clone, PartialEq)]
pub struct WordOutcome {
    pub correct: bool,
    pub feedback: String,
    pub lives_left: u8,
    pub is_eliminated: bool,
}

impl WordOutcome {
    /// A rejection; nothing about the game changed.
    pub fn rejected(feedback: impl Into<String>, lives_left: u8, is_eliminated: bool) -> Self {
        Self {
            correct: false,
            feedback: feedback.into(),
            lives_left,
            is_eliminated,
        }
    }

    fn accepted(lives_left: u8) -> Self {
        Self {
            correct: true,
            feedback: "correct!".into(),
            lives_left,
            is_eliminated: false,
        }
    }
}

/// State of one running game.
pub struct TurnState {
    /// Member ids in join order, snapshotted at game start. Never
    /// mutated; departed and eliminated players are skipped on advance.
    order: Vec<PlayerId>,
    /// Seat index of the player whose turn it is.
    current: usize,
    /// The letter sequence words must contain. `None` after a correct
    /// word, until the next advance draws a replacement.
    challenge: Option<String>,
    /// Accepted words, lowercased. Each word is playable once per game.
    used_words: HashSet<String>,
    /// Game start, epoch milliseconds.
    started_at: u64,
}

impl TurnState {
    /// Begins a game: resets lives, snapshots the turn order, picks a
    /// random first player, and draws the opening challenge.
    ///
    /// Returns `None` when the room has too few players. On success the
    /// events are a roster snapshot followed by `game-started`.
    pub fn start(
        roster: &mut Roster,
        dict: &dyn Dictionary,
        config: &GameConfig,
    ) -> Option<(Self, Vec<(Recipient, ServerEvent)>)> {
        if roster.len() < config.min_players {
            return None;
        }

        roster.reset_for_game(config.starting_lives);

        let order = roster.ids();
        let current = rand::rng().random_range(0..order.len());
        let challenge = dict.generate_challenge();
        let started_at = epoch_millis();

        let turn = Self {
            current,
            challenge: Some(challenge.clone()),
            used_words: HashSet::new(),
            started_at,
            order,
        };

        let events = vec![
            (Recipient::All, roster.snapshot_event()),
            (
                Recipient::All,
                ServerEvent::GameStarted {
                    players: roster.infos(),
                    start_time: turn.started_at,
                    current_player: turn.order[turn.current],
                    current_letters: challenge,
                },
            ),
        ];

        Some((turn, events))
    }

    /// Judges one submission from `player`.
    ///
    /// A timeout (`out_of_time`) costs a life no matter what was typed.
    /// Otherwise the word must be in the dictionary, unused this game,
    /// and contain the challenge, checked in that order; the first
    /// failure rejects without a life loss or turn advance.
    ///
    /// Returns the submitter's verdict, events to broadcast, and
    /// whether the game just ended (the caller drops the turn state).
    pub fn submit(
        &mut self,
        roster: &mut Roster,
        dict: &dyn Dictionary,
        player: PlayerId,
        word: &str,
        out_of_time: bool,
    ) -> (WordOutcome, Vec<(Recipient, ServerEvent)>, bool) {
        let lives_now = roster.get(player).map(|p| p.lives).unwrap_or(0);
        let spectating = roster.get(player).is_some_and(|p| p.spectator);

        if self.current_player() != Some(player) {
            let outcome = WordOutcome::rejected("not your turn", lives_now, spectating);
            return (outcome, Vec::new(), false);
        }
        if spectating {
            let outcome = WordOutcome::rejected("spectators cannot play", lives_now, true);
            return (outcome, Vec::new(), false);
        }

        if out_of_time {
            return self.lose_life(roster, dict, player);
        }

        let challenge = self.challenge_or_generate(dict);
        let submitted = word.trim().to_lowercase();

        if !dict.is_valid_word(word) {
            let outcome = WordOutcome::rejected("not a valid word", lives_now, false);
            return (outcome, Vec::new(), false);
        }
        if self.used_words.contains(&submitted) {
            let outcome = WordOutcome::rejected("word already used", lives_now, false);
            return (outcome, Vec::new(), false);
        }
        if !submitted.contains(&challenge.to_lowercase()) {
            let outcome = WordOutcome::rejected(
                format!("word must contain \"{challenge}\""),
                lives_now,
                false,
            );
            return (outcome, Vec::new(), false);
        }

        self.used_words.insert(submitted);
        // Solved; the next turn draws a fresh challenge.
        self.challenge = None;

        let mut events = Vec::new();
        let ended = self.advance_or_end(roster, dict, &mut events);
        (WordOutcome::accepted(lives_now), events, ended)
    }

    /// Reconciles the turn after `departed` was removed from the
    /// roster. Departed players count as dead: the game ends if at most
    /// one live player remains, and a departing turn-holder hands the
    /// turn on immediately.
    pub fn handle_departure(
        &mut self,
        roster: &Roster,
        dict: &dyn Dictionary,
        departed: PlayerId,
    ) -> (Vec<(Recipient, ServerEvent)>, bool) {
        let mut events = Vec::new();
        if !self.order.contains(&departed) {
            // mid-game joiners never held a seat
            return (events, false);
        }

        if self.current_player() == Some(departed) {
            let ended = self.advance_or_end(roster, dict, &mut events);
            return (events, ended);
        }

        if self.alive_in_order(roster).len() <= 1 {
            events.push(self.game_over_event(roster));
            return (events, true);
        }
        (events, false)
    }

    /// Ends the game on the owner's order. The win goes to the player
    /// with the most lives left, earliest join breaking ties.
    pub fn force_end(&self, roster: &Roster) -> Vec<(Recipient, ServerEvent)> {
        let mut best: Option<(PlayerId, u8)> = None;
        for id in &self.order {
            let Some(player) = roster.get(*id) else {
                continue;
            };
            if best.is_none_or(|(_, lives)| player.lives > lives) {
                best = Some((*id, player.lives));
            }
        }

        vec![(
            Recipient::All,
            ServerEvent::GameEnded {
                winner: best.map(|(id, _)| id),
                scores: self.scores(roster),
            },
        )]
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.order.get(self.current).copied()
    }

    /// Takes a life from the turn-holder and moves the game on.
    fn lose_life(
        &mut self,
        roster: &mut Roster,
        dict: &dyn Dictionary,
        player: PlayerId,
    ) -> (WordOutcome, Vec<(Recipient, ServerEvent)>, bool) {
        let lives = match roster.get_mut(player) {
            Some(p) => {
                p.lives = p.lives.saturating_sub(1);
                if p.lives == 0 {
                    p.spectator = true;
                }
                p.lives
            }
            None => 0,
        };

        let mut events = Vec::new();
        if lives == 0 {
            events.push((
                Recipient::All,
                ServerEvent::PlayerEliminated { player_id: player },
            ));
            // spectator flag changed, everyone sees the new roster
            events.push((Recipient::All, roster.snapshot_event()));
        } else {
            events.push((
                Recipient::All,
                ServerEvent::PlayerLostLife {
                    player_id: player,
                    lives_left: lives,
                },
            ));
        }

        let ended = self.advance_or_end(roster, dict, &mut events);
        let outcome = WordOutcome {
            correct: false,
            feedback: "time ran out".into(),
            lives_left: lives,
            is_eliminated: lives == 0,
        };
        (outcome, events, ended)
    }

    /// Moves the turn to the next live player, or ends the game when at
    /// most one remains. Returns whether the game ended.
    fn advance_or_end(
        &mut self,
        roster: &Roster,
        dict: &dyn Dictionary,
        events: &mut Vec<(Recipient, ServerEvent)>,
    ) -> bool {
        if self.alive_in_order(roster).len() <= 1 {
            events.push(self.game_over_event(roster));
            return true;
        }

        // Rotate to the next seat held by a live player. Terminates
        // since at least two are alive.
        loop {
            self.current = (self.current + 1) % self.order.len();
            let seat = self.order[self.current];
            if roster.get(seat).is_some_and(|p| p.lives > 0) {
                break;
            }
        }

        let letters = self.challenge_or_generate(dict);
        events.push((
            Recipient::All,
            ServerEvent::NextTurn {
                current_player: self.order[self.current],
                current_letters: letters,
            },
        ));
        false
    }

    /// The current challenge, drawing a fresh one if the last was
    /// solved.
    fn challenge_or_generate(&mut self, dict: &dyn Dictionary) -> String {
        match &self.challenge {
            Some(letters) => letters.clone(),
            None => {
                let fresh = dict.generate_challenge();
                self.challenge = Some(fresh.clone());
                fresh
            }
        }
    }

    /// Seated players still alive, in seat order. Departed players are
    /// not in the roster and therefore count as dead.
    fn alive_in_order(&self, roster: &Roster) -> Vec<PlayerId> {
        self.order
            .iter()
            .copied()
            .filter(|id| roster.get(*id).is_some_and(|p| p.lives > 0))
            .collect()
    }

    /// Final lives per seated player still present.
    fn scores(&self, roster: &Roster) -> std::collections::HashMap<PlayerId, u8> {
        self.order
            .iter()
            .filter_map(|id| roster.get(*id).map(|p| (*id, p.lives)))
            .collect()
    }

    fn game_over_event(&self, roster: &Roster) -> (Recipient, ServerEvent) {
        let winner = self.alive_in_order(roster).first().copied();
        (
            Recipient::All,
            ServerEvent::GameEnded {
                winner,
                scores: self.scores(roster),
            },
        )
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================
