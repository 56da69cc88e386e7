//! Live status card backed by the Lanyard presence API

pub mod card;
pub mod model;

pub use card::StatusCard;
pub use model::{
    Activity, Assets, DiscordUser, Envelope, Presence, PresenceError, Spotify, Status,
    Timestamps, parse_envelope,
};

/// Account shown on the card
pub const DEFAULT_USER_ID: &str = "1146944562951106721";

/// Endpoint for one user's presence
pub fn presence_url(user_id: &str) -> String {
    format!("{}/{}", crate::consts::LANYARD_API, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_url() {
        assert_eq!(
            presence_url(DEFAULT_USER_ID),
            "https://api.lanyard.rest/v1/users/1146944562951106721"
        );
    }
}
