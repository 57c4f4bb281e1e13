//! Default capabilities: identifiers, invocation contract and the handler registry.
//!
//! The resolver maps default triggers to a [`CapabilityId`]; the dispatcher hands the match to
//! whatever [`CapabilityHandler`] is registered for that id. New capabilities are new handler
//! implementations, never new branches in the dispatcher.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::User;

use crate::error::{CommandError, Result};

/// Built-in capabilities reachable through default triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityId {
    Commands,
    Regulars,
    Uptime,
    FollowAge,
    Game,
    ViewerCount,
    RandomViewer,
    QuoteOfTheDay,
    StatLookup,
    EightBall,
    LastSeen,
    FirstSeen,
    SongList,
    SongCache,
    CurrentSong,
    Volume,
    Play,
    Pause,
    SkipSong,
    WrongSong,
    RemoveSong,
    Promote,
    Shuffle,
    SongRequest,
    PlaylistRequest,
}

impl CapabilityId {
    pub const ALL: [CapabilityId; 25] = [
        CapabilityId::Commands,
        CapabilityId::Regulars,
        CapabilityId::Uptime,
        CapabilityId::FollowAge,
        CapabilityId::Game,
        CapabilityId::ViewerCount,
        CapabilityId::RandomViewer,
        CapabilityId::QuoteOfTheDay,
        CapabilityId::StatLookup,
        CapabilityId::EightBall,
        CapabilityId::LastSeen,
        CapabilityId::FirstSeen,
        CapabilityId::SongList,
        CapabilityId::SongCache,
        CapabilityId::CurrentSong,
        CapabilityId::Volume,
        CapabilityId::Play,
        CapabilityId::Pause,
        CapabilityId::SkipSong,
        CapabilityId::WrongSong,
        CapabilityId::RemoveSong,
        CapabilityId::Promote,
        CapabilityId::Shuffle,
        CapabilityId::SongRequest,
        CapabilityId::PlaylistRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityId::Commands => "commands",
            CapabilityId::Regulars => "regulars",
            CapabilityId::Uptime => "uptime",
            CapabilityId::FollowAge => "followage",
            CapabilityId::Game => "game",
            CapabilityId::ViewerCount => "viewers",
            CapabilityId::RandomViewer => "winner",
            CapabilityId::QuoteOfTheDay => "qotd",
            CapabilityId::StatLookup => "bf4stats",
            CapabilityId::EightBall => "8ball",
            CapabilityId::LastSeen => "lastseen",
            CapabilityId::FirstSeen => "firstseen",
            CapabilityId::SongList => "songlist",
            CapabilityId::SongCache => "songcache",
            CapabilityId::CurrentSong => "currentsong",
            CapabilityId::Volume => "volume",
            CapabilityId::Play => "play",
            CapabilityId::Pause => "pause",
            CapabilityId::SkipSong => "skipsong",
            CapabilityId::WrongSong => "wrongsong",
            CapabilityId::RemoveSong => "removesong",
            CapabilityId::Promote => "promote",
            CapabilityId::Shuffle => "shuffle",
            CapabilityId::SongRequest => "songrequest",
            CapabilityId::PlaylistRequest => "playlistrequest",
        }
    }

    /// The canonical default trigger, e.g. `!uptime`.
    pub fn trigger(&self) -> String {
        format!("!{}", self.as_str())
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a capability handler gets for one default-trigger match.
#[derive(Debug, Clone)]
pub struct CapabilityInvocation {
    pub capability: CapabilityId,
    pub channel: String,
    pub invoker: User,
    /// Default trigger the capability was reached through, after alias resolution.
    pub trigger: String,
    /// Message tokens after the trigger.
    pub args: Vec<String>,
}

/// Executes one capability. Returns the text to deliver, or `None` when the handler replies on
/// its own or has nothing to say.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn handle(&self, invocation: &CapabilityInvocation) -> Result<Option<String>>;
}

/// Maps capability ids to their handlers.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    handlers: HashMap<CapabilityId, Arc<dyn CapabilityHandler>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the handler for `id`.
    pub fn register(mut self, id: CapabilityId, handler: Arc<dyn CapabilityHandler>) -> Self {
        self.handlers.insert(id, handler);
        self
    }

    pub fn is_registered(&self, id: CapabilityId) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Capabilities that have no handler; each one is a wiring defect.
    pub fn unhandled(&self) -> Vec<CapabilityId> {
        CapabilityId::ALL
            .into_iter()
            .filter(|id| !self.is_registered(*id))
            .collect()
    }

    /// Runs the registered handler, or fails with [`CommandError::UnhandledCapability`].
    pub async fn invoke(&self, invocation: &CapabilityInvocation) -> Result<Option<String>> {
        match self.handlers.get(&invocation.capability) {
            Some(handler) => handler.handle(invocation).await,
            None => Err(CommandError::UnhandledCapability(invocation.capability)),
        }
    }
}
