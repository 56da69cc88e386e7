//! Status card state across polls

use super::model::{Activity, Presence, PresenceError, Spotify};
use crate::ui::escape_html;

const SKELETON: &str = "<div class=\"status-row\"><div class=\"skeleton avatar\"></div>\
<div class=\"skeleton-lines\"><div class=\"skeleton line-wide\"></div>\
<div class=\"skeleton line-narrow\"></div></div></div>";

/// What the card currently shows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatusCard {
    /// First request still in flight
    #[default]
    Loading,
    /// Last poll failed; placeholder until the next success
    Unavailable,
    Live(Presence),
}

impl StatusCard {
    /// Fold one poll result into the card. Returns true when the visible
    /// state changed and the card needs re-rendering.
    pub fn apply(&mut self, result: Result<Presence, PresenceError>) -> bool {
        match result {
            Ok(presence) => {
                if matches!(self, StatusCard::Live(current) if *current == presence) {
                    return false;
                }
                *self = StatusCard::Live(presence);
                true
            }
            Err(e) => {
                log::debug!("Status card placeholder: {}", e);
                if matches!(self, StatusCard::Unavailable) {
                    return false;
                }
                *self = StatusCard::Unavailable;
                true
            }
        }
    }

    pub fn presence(&self) -> Option<&Presence> {
        match self {
            StatusCard::Live(presence) => Some(presence),
            _ => None,
        }
    }

    /// Loading skeleton is shown
    pub fn is_placeholder(&self) -> bool {
        self.presence().is_none()
    }

    /// Card markup at `now_ms` (elapsed times are relative to it)
    pub fn to_html(&self, now_ms: i64, fallback_id: &str) -> String {
        match self.presence() {
            Some(presence) => live_html(presence, now_ms, fallback_id),
            None => SKELETON.to_string(),
        }
    }
}

fn live_html(presence: &Presence, now_ms: i64, fallback_id: &str) -> String {
    let user = &presence.discord_user;
    let mut html = format!(
        "<div class=\"status-row\"><div class=\"avatar-wrap\">\
         <img class=\"avatar\" src=\"{}\" alt=\"Discord Avatar\">\
         <span class=\"status-dot {}\"></span></div>\
         <div class=\"status-text\"><a class=\"status-name\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        escape_html(&user.avatar_url()),
        presence.discord_status.color_class(),
        escape_html(&presence.profile_url(fallback_id)),
        escape_html(presence.display_name()),
    );
    if let Some(status) = presence.custom_status() {
        html.push_str(&format!(
            "<span class=\"custom-status\">{}</span>",
            escape_html(status)
        ));
    }
    html.push_str("</div></div>");

    if presence.has_activity() {
        html.push_str("<div class=\"activities\">");
        if let Some(spotify) = presence.now_playing() {
            html.push_str(&spotify_html(spotify, now_ms));
        }
        for activity in presence.playing() {
            html.push_str(&activity_html(activity, now_ms));
        }
        html.push_str("</div>");
    }
    html
}

fn spotify_html(spotify: &Spotify, now_ms: i64) -> String {
    let title = match spotify.track_url() {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            escape_html(&url),
            escape_html(spotify.song())
        ),
        None => escape_html(spotify.song()),
    };
    format!(
        "<div class=\"activity spotify\"><img class=\"activity-icon\" src=\"{}\" alt=\"Album Art\">\
         <div class=\"activity-text\"><div class=\"truncate\">{} • {}</div>\
         <div class=\"progress-row\"><span>{}</span>\
         <div class=\"progress\"><div class=\"progress-fill\" style=\"width: {:.1}%\"></div></div>\
         <span>{}</span></div></div></div>",
        escape_html(spotify.album_art()),
        title,
        escape_html(spotify.artist()),
        spotify.elapsed_label(now_ms),
        spotify.progress(now_ms),
        spotify.total_label(),
    )
}

fn activity_html(activity: &Activity, now_ms: i64) -> String {
    let icon = activity
        .icon_url()
        .unwrap_or_else(|| Activity::FALLBACK_ICON.to_string());
    let mut html = format!(
        "<div class=\"activity\"><div class=\"activity-icons\">\
         <img class=\"activity-icon\" src=\"{}\" alt=\"{}\" onerror=\"this.src='{}'\">",
        escape_html(&icon),
        escape_html(&activity.name),
        Activity::FALLBACK_ICON,
    );
    if let Some(small) = activity.small_icon_url() {
        html.push_str(&format!(
            "<img class=\"activity-badge\" src=\"{}\" alt=\"Small icon\" onerror=\"this.style.display='none'\">",
            escape_html(&small)
        ));
    }
    html.push_str(&format!(
        "</div><div class=\"activity-text\"><div class=\"truncate\"><span class=\"headline\">{}</span>",
        escape_html(activity.headline())
    ));
    if let Some(state) = &activity.state {
        html.push_str(&format!("<span> • {}</span>", escape_html(state)));
    }
    html.push_str("</div>");
    if let Some(elapsed) = activity.elapsed(now_ms) {
        html.push_str(&format!("<div class=\"elapsed\">{elapsed}</div>"));
    }
    html.push_str("</div></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::model::{Status, parse_envelope};

    const ONLINE: &str =
        r#"{"success":true,"data":{"discord_status":"online","discord_user":{"id":"1","username":"czch"}}}"#;
    const IDLE: &str =
        r#"{"success":true,"data":{"discord_status":"idle","discord_user":{"id":"1","username":"czch"}}}"#;

    #[test]
    fn test_failure_then_success() {
        let mut card = StatusCard::default();
        assert!(card.is_placeholder());

        assert!(card.apply(parse_envelope(r#"{"success":false}"#)));
        assert_eq!(card, StatusCard::Unavailable);
        assert!(card.is_placeholder());

        assert!(card.apply(parse_envelope(ONLINE)));
        assert_eq!(card.presence().unwrap().discord_status, Status::Online);
    }

    #[test]
    fn test_identical_poll_is_not_a_change() {
        let mut card = StatusCard::default();
        assert!(card.apply(parse_envelope(ONLINE)));
        assert!(!card.apply(parse_envelope(ONLINE)));
        assert!(card.apply(parse_envelope(IDLE)));
        assert_eq!(card.presence().unwrap().discord_status, Status::Idle);
    }

    #[test]
    fn test_html_views() {
        let mut card = StatusCard::default();
        assert!(card.to_html(0, "1").contains("skeleton"));

        card.apply(parse_envelope(
            r#"{"success":true,"data":{
                "discord_status":"online",
                "discord_user":{"id":"1","username":"<czch>"},
                "activities":[
                    {"type":4,"state":"hi"},
                    {"type":0,"name":"Game","state":"Lobby","timestamps":{"start":0}}
                ]}}"#,
        ));
        let html = card.to_html(61_000, "1");
        assert!(html.contains("&lt;czch&gt;"));
        assert!(html.contains("bg-green-500"));
        assert!(html.contains("custom-status\">hi<"));
        assert!(html.contains("1:01 elapsed"));
        assert!(html.contains(" • Lobby"));
        assert!(!html.contains("spotify"));
    }

    #[test]
    fn test_error_after_live_shows_placeholder() {
        let mut card = StatusCard::default();
        card.apply(parse_envelope(ONLINE));
        assert!(card.apply(Err(PresenceError::Network("offline".into()))));
        assert!(card.is_placeholder());
        assert!(!card.apply(Err(PresenceError::Http(502))));
    }
}
