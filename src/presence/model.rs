//! Lanyard response model
//!
//! Only the fields the card renders are modelled; everything else in the
//! payload is ignored. Missing fields fall back to defaults so a partial
//! payload still renders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format_time;

const DISCORD_CDN: &str = "https://cdn.discordapp.com";
const SPOTIFY_FALLBACK_ART: &str =
    "https://i.scdn.co/image/ab67616d0000b273e5a25ed08d1e7e0fdd82ac29";
const ROBLOX_ICON: &str = "https://dcdn.dstn.to/app-icons/1005469189907173486";
const VSCODE_ICON: &str =
    "https://cdn.discordapp.com/app-assets/383226320970055681/1359299282380918886.png";

/// Fetching or decoding presence failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    /// Request never produced a response
    Network(String),
    /// Non-2xx HTTP status
    Http(u16),
    /// Body was not the expected JSON
    Malformed(String),
    /// API answered with `success: false`
    Unsuccessful(Option<String>),
}

impl fmt::Display for PresenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceError::Network(msg) => write!(f, "presence request failed: {msg}"),
            PresenceError::Http(status) => write!(f, "presence request returned HTTP {status}"),
            PresenceError::Malformed(msg) => write!(f, "malformed presence payload: {msg}"),
            PresenceError::Unsuccessful(Some(msg)) => write!(f, "presence unavailable: {msg}"),
            PresenceError::Unsuccessful(None) => write!(f, "presence unavailable"),
        }
    }
}

impl std::error::Error for PresenceError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Top-level API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Presence>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Online status. Anything unrecognised counts as offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Idle,
    Dnd,
    #[default]
    #[serde(other)]
    Offline,
}

impl Status {
    /// Indicator dot class
    pub fn color_class(&self) -> &'static str {
        match self {
            Status::Online => "bg-green-500",
            Status::Idle => "bg-yellow-500",
            Status::Dnd => "bg-red-500",
            Status::Offline => "bg-gray-500",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub discriminator: Option<String>,
}

impl DiscordUser {
    /// Custom avatar, or one of the five default avatars
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) if !hash.is_empty() => {
                format!("{DISCORD_CDN}/avatars/{}/{hash}.png", self.id)
            }
            _ => {
                let discriminator = self
                    .discriminator
                    .as_deref()
                    .and_then(|d| d.trim().parse::<u32>().ok())
                    .unwrap_or(0);
                format!("{DISCORD_CDN}/embed/avatars/{}.png", discriminator % 5)
            }
        }
    }
}

/// Epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Timestamps {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Assets {
    pub large_image: Option<String>,
    pub large_text: Option<String>,
    pub small_image: Option<String>,
    pub small_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Activity {
    /// 0 playing, 2 listening, 4 custom status, ...
    #[serde(rename = "type")]
    pub kind: i64,
    pub name: String,
    pub state: Option<String>,
    pub details: Option<String>,
    pub timestamps: Option<Timestamps>,
    pub assets: Option<Assets>,
    pub application_id: Option<String>,
}

impl Activity {
    pub const PLAYING: i64 = 0;
    pub const CUSTOM: i64 = 4;

    /// Replacement when no icon loads
    pub const FALLBACK_ICON: &'static str = "https://cdn.discordapp.com/embed/avatars/0.png";

    fn app_asset(&self, image: Option<&String>) -> Option<String> {
        let app = self.application_id.as_deref()?;
        let image = image?;
        Some(format!("{DISCORD_CDN}/app-assets/{app}/{image}.png"))
    }

    /// Large icon: known apps first, then the application asset
    pub fn icon_url(&self) -> Option<String> {
        let name = self.name.to_lowercase();
        if name.contains("spotify") {
            return Some(SPOTIFY_FALLBACK_ART.to_string());
        }
        if name.contains("roblox") {
            return Some(ROBLOX_ICON.to_string());
        }
        if name.contains("visual studio code") {
            return Some(VSCODE_ICON.to_string());
        }
        self.app_asset(self.assets.as_ref().and_then(|a| a.large_image.as_ref()))
    }

    pub fn small_icon_url(&self) -> Option<String> {
        self.app_asset(self.assets.as_ref().and_then(|a| a.small_image.as_ref()))
    }

    /// Main line: details, else the app name
    pub fn headline(&self) -> &str {
        self.details.as_deref().unwrap_or(&self.name)
    }

    /// "m:ss elapsed" since the activity started
    pub fn elapsed(&self, now_ms: i64) -> Option<String> {
        let start = self.timestamps?.start?;
        Some(format!("{} elapsed", format_time(now_ms.saturating_sub(start) as f64 / 1000.0)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Spotify {
    pub track_id: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_art_url: Option<String>,
    pub timestamps: Option<Timestamps>,
}

impl Spotify {
    pub fn song(&self) -> &str {
        self.song.as_deref().unwrap_or("Loading...")
    }

    pub fn artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("Artist")
    }

    pub fn album_art(&self) -> &str {
        self.album_art_url.as_deref().unwrap_or(SPOTIFY_FALLBACK_ART)
    }

    pub fn track_url(&self) -> Option<String> {
        self.track_id
            .as_deref()
            .map(|id| format!("https://open.spotify.com/track/{id}"))
    }

    fn span(&self) -> Option<(i64, i64)> {
        let ts = self.timestamps?;
        Some((ts.start?, ts.end?))
    }

    /// Playback progress in percent, clamped to [0, 100]
    pub fn progress(&self, now_ms: i64) -> f64 {
        match self.span() {
            Some((start, end)) if end > start => {
                let elapsed = now_ms.saturating_sub(start) as f64;
                (elapsed / end.saturating_sub(start) as f64 * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    pub fn elapsed_label(&self, now_ms: i64) -> String {
        match self.span() {
            Some((start, end)) => {
                format_time(now_ms.min(end).saturating_sub(start) as f64 / 1000.0)
            }
            None => format_time(0.0),
        }
    }

    pub fn total_label(&self) -> String {
        match self.span() {
            Some((start, end)) => format_time(end.saturating_sub(start) as f64 / 1000.0),
            None => format_time(0.0),
        }
    }
}

/// One user's presence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Presence {
    pub discord_status: Status,
    pub discord_user: DiscordUser,
    pub activities: Vec<Activity>,
    pub listening_to_spotify: bool,
    pub spotify: Option<Spotify>,
}

impl Presence {
    /// Custom status text; hidden while offline
    pub fn custom_status(&self) -> Option<&str> {
        if self.discord_status == Status::Offline {
            return None;
        }
        self.activities
            .iter()
            .find(|a| a.kind == Activity::CUSTOM)
            .and_then(|a| a.state.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Activities of the "playing" type
    pub fn playing(&self) -> impl Iterator<Item = &Activity> {
        self.activities
            .iter()
            .filter(|a| a.kind == Activity::PLAYING)
    }

    /// Spotify block, only while listening
    pub fn now_playing(&self) -> Option<&Spotify> {
        if self.listening_to_spotify {
            self.spotify.as_ref()
        } else {
            None
        }
    }

    /// Whether the activity section has anything to show
    pub fn has_activity(&self) -> bool {
        self.listening_to_spotify || self.playing().next().is_some()
    }

    pub fn display_name(&self) -> &str {
        if self.discord_user.username.is_empty() {
            "czch"
        } else {
            self.discord_user.username.as_str()
        }
    }

    /// Profile link; `fallback_id` when the payload has no user id
    pub fn profile_url(&self, fallback_id: &str) -> String {
        let id = if self.discord_user.id.is_empty() {
            fallback_id
        } else {
            self.discord_user.id.as_str()
        };
        format!("https://discord.com/users/{id}")
    }
}

/// Decode an API response body
pub fn parse_envelope(body: &str) -> Result<Presence, PresenceError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| PresenceError::Malformed(e.to_string()))?;

    if !envelope.success {
        return Err(PresenceError::Unsuccessful(
            envelope.error.map(|e| e.message).filter(|m| !m.is_empty()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| PresenceError::Malformed("success without data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "success": true,
        "data": {
            "discord_status": "dnd",
            "discord_user": {
                "id": "42",
                "username": "czch",
                "avatar": "abc123",
                "discriminator": "0"
            },
            "activities": [
                {"type": 4, "name": "Custom Status", "state": "building things"},
                {
                    "type": 0,
                    "name": "Visual Studio Code",
                    "details": "Editing main.rs",
                    "application_id": "383226320970055681",
                    "timestamps": {"start": 1000},
                    "assets": {"large_image": "big", "small_image": "small"}
                }
            ],
            "listening_to_spotify": true,
            "spotify": {
                "track_id": "xyz",
                "song": "Song",
                "artist": "Band",
                "timestamps": {"start": 0, "end": 200000}
            },
            "kv": {}
        }
    }"#;

    #[test]
    fn test_parse_full_payload() {
        let presence = parse_envelope(SAMPLE).unwrap();
        assert_eq!(presence.discord_status, Status::Dnd);
        assert_eq!(presence.custom_status(), Some("building things"));
        assert_eq!(presence.playing().count(), 1);
        assert!(presence.has_activity());
        assert_eq!(
            presence.discord_user.avatar_url(),
            "https://cdn.discordapp.com/avatars/42/abc123.png"
        );
        assert_eq!(presence.profile_url("1"), "https://discord.com/users/42");

        let spotify = presence.now_playing().unwrap();
        assert_eq!(spotify.progress(100_000), 50.0);
        assert_eq!(spotify.progress(900_000), 100.0);
        assert_eq!(spotify.progress(-5), 0.0);
        assert_eq!(spotify.total_label(), "3:20");
        assert_eq!(spotify.track_url().unwrap(), "https://open.spotify.com/track/xyz");
    }

    #[test]
    fn test_unknown_status_is_offline() {
        let presence: Presence =
            serde_json::from_str(r#"{"discord_status": "invisible"}"#).unwrap();
        assert_eq!(presence.discord_status, Status::Offline);
        assert_eq!(presence.display_name(), "czch");
        assert_eq!(presence.profile_url("7"), "https://discord.com/users/7");
    }

    #[test]
    fn test_custom_status_hidden_when_offline() {
        let presence = Presence {
            discord_status: Status::Offline,
            activities: vec![Activity {
                kind: Activity::CUSTOM,
                state: Some("away".into()),
                ..Activity::default()
            }],
            ..Presence::default()
        };
        assert_eq!(presence.custom_status(), None);
    }

    #[test]
    fn test_odd_activity_type_keeps_card() {
        let presence = parse_envelope(
            r#"{"success": true, "data": {"discord_status": "online",
                "activities": [{"type": 4096, "name": "future"},
                               {"type": 0, "name": "Game"}]}}"#,
        )
        .unwrap();
        assert_eq!(presence.activities[0].kind, 4096);
        assert_eq!(presence.playing().count(), 1);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let activity = Activity {
            timestamps: Some(Timestamps {
                start: Some(i64::MIN),
                end: None,
            }),
            ..Activity::default()
        };
        assert!(activity.elapsed(i64::MAX).is_some());

        let spotify = Spotify {
            timestamps: Some(Timestamps {
                start: Some(i64::MIN),
                end: Some(i64::MAX),
            }),
            ..Spotify::default()
        };
        assert!((0.0..=100.0).contains(&spotify.progress(i64::MAX)));
        assert!(!spotify.elapsed_label(0).is_empty());
        assert!(!spotify.total_label().is_empty());
    }

    #[test]
    fn test_unsuccessful_and_malformed() {
        assert_eq!(
            parse_envelope(r#"{"success": false}"#),
            Err(PresenceError::Unsuccessful(None))
        );
        assert_eq!(
            parse_envelope(
                r#"{"success": false, "error": {"code": "user_not_monitored", "message": "not monitored"}}"#
            ),
            Err(PresenceError::Unsuccessful(Some("not monitored".into())))
        );
        assert!(matches!(
            parse_envelope("<html>"),
            Err(PresenceError::Malformed(_))
        ));
        assert!(matches!(
            parse_envelope(r#"{"success": true}"#),
            Err(PresenceError::Malformed(_))
        ));
    }

    #[test]
    fn test_default_avatar_by_discriminator() {
        let user = DiscordUser {
            id: "1".into(),
            discriminator: Some("1337".into()),
            ..DiscordUser::default()
        };
        assert_eq!(
            user.avatar_url(),
            "https://cdn.discordapp.com/embed/avatars/2.png"
        );
    }

    #[test]
    fn test_activity_icons() {
        let game = Activity {
            name: "Some Game".into(),
            application_id: Some("99".into()),
            assets: Some(Assets {
                large_image: Some("cover".into()),
                ..Assets::default()
            }),
            ..Activity::default()
        };
        assert_eq!(
            game.icon_url().unwrap(),
            "https://cdn.discordapp.com/app-assets/99/cover.png"
        );
        assert_eq!(game.small_icon_url(), None);
        assert_eq!(game.headline(), "Some Game");

        let roblox = Activity {
            name: "ROBLOX".into(),
            ..Activity::default()
        };
        assert_eq!(roblox.icon_url().unwrap(), ROBLOX_ICON);
        assert_eq!(Activity::default().icon_url(), None);
    }

    #[test]
    fn test_activity_elapsed() {
        let activity = Activity {
            timestamps: Some(Timestamps {
                start: Some(0),
                end: None,
            }),
            ..Activity::default()
        };
        assert_eq!(activity.elapsed(65_000).unwrap(), "1:05 elapsed");
        assert_eq!(Activity::default().elapsed(65_000), None);
    }
}
