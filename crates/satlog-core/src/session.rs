//! Player session reconstruction.
//!
//! Each player moves between `Offline` and `Online` as joins and leaves are
//! observed. State lives in a [`SessionReconstructor`] scoped to one log file,
//! so sessions never span files.
//!
//! # Rules
//!
//! - Join while offline opens a session at the join time.
//! - Join with the same timestamp as the player's most recent join is a
//!   duplicate log line and is ignored, whether or not a leave came between.
//! - Any other join while online means a leave was missed: the open session
//!   is closed at the new join's timestamp (estimated) and a new one opens.
//! - Leave while online closes the session exactly at the leave time.
//! - At end of file every open session is closed at the timestamp of the last
//!   timestamped event in the file (estimated).
//!
//! Events without a timestamp are ignored here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventKind, LogEvent};

/// One continuous interval a player was connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub player: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub source_file: String,
    /// `true` when `end_time` was inferred rather than read from a leave line.
    pub end_estimated: bool,
}

#[derive(Debug, Clone, Copy)]
enum PlayerState {
    Offline {
        /// End of the player's previous session in this file.
        last_end: Option<DateTime<Utc>>,
        /// Timestamp on the join line that opened that session.
        last_join: Option<DateTime<Utc>>,
    },
    Online {
        /// Timestamp on the join line, used to spot duplicates.
        joined_at: DateTime<Utc>,
        /// Session start, never earlier than the previous session's end.
        started_at: DateTime<Utc>,
    },
}

/// Per-file session state machine.
#[derive(Debug)]
pub struct SessionReconstructor {
    source_file: String,
    players: BTreeMap<String, PlayerState>,
    last_timestamp: Option<DateTime<Utc>>,
    closed: Vec<PlayerSession>,
}

impl SessionReconstructor {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            players: BTreeMap::new(),
            last_timestamp: None,
            closed: Vec::new(),
        }
    }

    /// Feeds the next event from the file, in line order.
    pub fn observe(&mut self, event: &LogEvent) {
        let Some(ts) = event.timestamp else {
            return;
        };
        self.last_timestamp = Some(ts);

        match &event.kind {
            EventKind::Join { player } => self.on_join(player, ts),
            EventKind::Leave { player } => self.on_leave(player, ts),
            _ => {}
        }
    }

    fn on_join(&mut self, player: &str, ts: DateTime<Utc>) {
        let state = self
            .players
            .get(player)
            .copied()
            .unwrap_or(PlayerState::Offline {
                last_end: None,
                last_join: None,
            });

        let started_at = match state {
            PlayerState::Offline { last_join, .. } if last_join == Some(ts) => {
                tracing::trace!(player, %ts, "ignoring duplicate join after leave");
                return;
            }
            PlayerState::Online { joined_at, .. } if joined_at == ts => {
                tracing::trace!(player, %ts, "ignoring duplicate join");
                return;
            }
            PlayerState::Offline { last_end, .. } => last_end.map_or(ts, |end| end.max(ts)),
            PlayerState::Online { started_at, .. } => {
                tracing::debug!(
                    player,
                    file = %self.source_file,
                    %ts,
                    "join without leave, closing previous session"
                );
                self.close(player, started_at, ts, true)
            }
        };

        self.players.insert(
            player.to_string(),
            PlayerState::Online {
                joined_at: ts,
                started_at,
            },
        );
    }

    fn on_leave(&mut self, player: &str, ts: DateTime<Utc>) {
        match self.players.get(player).copied() {
            Some(PlayerState::Online {
                joined_at,
                started_at,
            }) => {
                let end = self.close(player, started_at, ts, false);
                self.players.insert(
                    player.to_string(),
                    PlayerState::Offline {
                        last_end: Some(end),
                        last_join: Some(joined_at),
                    },
                );
            }
            _ => {
                tracing::debug!(player, file = %self.source_file, %ts, "leave for offline player");
            }
        }
    }

    /// Records a finished session and returns its (possibly clamped) end.
    fn close(
        &mut self,
        player: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        estimated: bool,
    ) -> DateTime<Utc> {
        // Clock went backwards; keep start <= end.
        let (end, estimated) = if end < start {
            (start, true)
        } else {
            (end, estimated)
        };

        self.closed.push(PlayerSession {
            player: player.to_string(),
            start_time: start,
            end_time: end,
            duration_seconds: (end - start).num_seconds(),
            source_file: self.source_file.clone(),
            end_estimated: estimated,
        });
        end
    }

    /// Closes any sessions still open at end of file and returns every
    /// session in the order it was closed.
    pub fn finish(mut self) -> Vec<PlayerSession> {
        let open: Vec<(String, DateTime<Utc>)> = self
            .players
            .iter()
            .filter_map(|(player, state)| match state {
                PlayerState::Online { started_at, .. } => Some((player.clone(), *started_at)),
                PlayerState::Offline { .. } => None,
            })
            .collect();

        for (player, started_at) in open {
            // An online player implies at least one timestamped event.
            let end = self.last_timestamp.unwrap_or(started_at);
            self.close(&player, started_at, end, true);
        }

        self.closed
    }
}

/// Reconstructs all sessions in one file's events.
pub fn reconstruct_sessions<'a, I>(source_file: &str, events: I) -> Vec<PlayerSession>
where
    I: IntoIterator<Item = &'a LogEvent>,
{
    let mut reconstructor = SessionReconstructor::new(source_file);
    for event in events {
        reconstructor.observe(event);
    }
    reconstructor.finish()
}
