//! Playlist music player
//!
//! `MusicPlayer` owns transport state; the actual decoding and output are
//! behind `MediaElement` (an `<audio>` element in the browser).

use std::fmt;

use crate::format_time;

/// Duration shown before metadata arrives (3:33)
pub const DEFAULT_DURATION_SECS: f64 = 213.0;

/// `previous` restarts the current track past this point
const RESTART_THRESHOLD_SECS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub src: String,
}

impl Track {
    pub fn new(title: &str, artist: &str, cover_url: &str, src: &str) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            cover_url: cover_url.to_string(),
            src: src.to_string(),
        }
    }
}

/// Tracks bundled with the page
pub fn default_playlist() -> Vec<Track> {
    vec![Track::new(
        "Track from Spotify",
        "Artist Name",
        "https://i.scdn.co/image/ab67616d0000b273e5a25ed08d1e7e0fdd82ac29",
        "/sounds/track.mp3",
    )]
}

/// Media backend failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Source could not be loaded or decoded
    Load(String),
    /// `play()` was refused (autoplay policy, no user gesture)
    PlayRejected(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::Load(msg) => write!(f, "could not load track: {msg}"),
            MediaError::PlayRejected(msg) => write!(f, "playback refused: {msg}"),
        }
    }
}

impl std::error::Error for MediaError {}

/// Audio resource the player drives
pub trait MediaElement {
    fn load(&mut self, src: &str);
    /// Start playback. Backends that only learn the outcome later report a
    /// refusal through `take_failure`.
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// 0.0 - 1.0
    fn set_volume(&mut self, volume: f64);
    /// Failure reported since the last call, if any
    fn take_failure(&mut self) -> Option<MediaError> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct MusicPlayer {
    playlist: Vec<Track>,
    index: usize,
    pub playing: bool,
    pub current_time: f64,
    pub duration: f64,
    /// 0 - 100
    pub volume: u8,
    /// Set once the media pipeline fails; transport is disabled
    pub error: Option<MediaError>,
}

impl MusicPlayer {
    pub fn new(playlist: Vec<Track>, volume: u8) -> Self {
        Self {
            playlist,
            index: 0,
            playing: false,
            current_time: 0.0,
            duration: DEFAULT_DURATION_SECS,
            volume: volume.min(100),
            error: None,
        }
    }

    /// Point the media element at the current track and volume
    pub fn attach(&self, media: &mut dyn MediaElement) {
        if let Some(track) = self.current_track() {
            media.load(&track.src);
        }
        media.set_volume(self.volume as f64 / 100.0);
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    /// Transport buttons are live
    pub fn is_enabled(&self) -> bool {
        self.error.is_none() && !self.playlist.is_empty()
    }

    /// Play/pause. Returns the new playing state.
    pub fn toggle_play(&mut self, media: &mut dyn MediaElement) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if self.playing {
            media.pause();
            self.playing = false;
        } else {
            self.start(media);
        }
        self.playing
    }

    fn start(&mut self, media: &mut dyn MediaElement) {
        match media.play() {
            Ok(()) => self.playing = true,
            Err(e) => self.on_error(e),
        }
    }

    /// Pick up a failure the media backend reported after the fact (a
    /// rejected play promise). Returns true when the state changed.
    pub fn sync_media(&mut self, media: &mut dyn MediaElement) -> bool {
        match media.take_failure() {
            Some(error) => {
                self.on_error(error);
                true
            }
            None => false,
        }
    }

    fn switch_to(&mut self, index: usize, media: &mut dyn MediaElement) {
        self.index = index;
        self.current_time = 0.0;
        self.duration = DEFAULT_DURATION_SECS;
        if let Some(track) = self.playlist.get(index) {
            log::info!("Now playing {} - {}", track.artist, track.title);
            media.load(&track.src);
        }
        if self.playing {
            self.start(media);
        }
    }

    /// Skip forward, wrapping to the first track
    pub fn next(&mut self, media: &mut dyn MediaElement) {
        if !self.is_enabled() {
            return;
        }
        let index = (self.index + 1) % self.playlist.len();
        self.switch_to(index, media);
    }

    /// Restart the track if it is a few seconds in, else skip back (wrapping)
    pub fn previous(&mut self, media: &mut dyn MediaElement) {
        if !self.is_enabled() {
            return;
        }
        if self.current_time > RESTART_THRESHOLD_SECS {
            self.current_time = 0.0;
            media.seek(0.0);
            return;
        }
        let len = self.playlist.len();
        self.switch_to((self.index + len - 1) % len, media);
    }

    /// Seek from a click `x` pixels into a progress bar `width` wide
    pub fn seek_fraction(&mut self, x: f64, width: f64, media: &mut dyn MediaElement) {
        if !self.is_enabled() || !(width > 0.0) {
            return;
        }
        let fraction = (x / width).clamp(0.0, 1.0);
        self.current_time = fraction * self.duration;
        media.seek(self.current_time);
    }

    pub fn set_volume(&mut self, volume: i32, media: &mut dyn MediaElement) {
        self.volume = volume.clamp(0, 100) as u8;
        media.set_volume(self.volume as f64 / 100.0);
    }

    /// `loadedmetadata`
    pub fn on_metadata(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
    }

    /// `timeupdate`
    pub fn on_time_update(&mut self, current_time: f64) {
        if current_time.is_finite() {
            self.current_time = current_time.max(0.0);
        }
    }

    /// `ended`: advance, or stop after the last track
    pub fn on_ended(&mut self, media: &mut dyn MediaElement) {
        if self.index + 1 < self.playlist.len() {
            self.switch_to(self.index + 1, media);
        } else {
            self.playing = false;
            self.current_time = 0.0;
        }
    }

    /// `error`: the element cannot play this source
    pub fn on_error(&mut self, error: MediaError) {
        log::warn!("Music player disabled: {}", error);
        self.playing = false;
        self.error = Some(error);
    }

    /// Inline error line shown while the transport is disabled
    pub fn error_text(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Progress bar fill, 0 - 100
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.current_time)
    }

    pub fn duration_label(&self) -> String {
        format_time(self.duration)
    }

    /// Text copied by the share button
    pub fn share_text(&self) -> Option<String> {
        self.current_track()
            .map(|t| format!("Listening to {} by {}", t.title, t.artist))
    }

    /// Source URL and suggested file name for the download action
    pub fn download(&self) -> Option<(String, String)> {
        let track = self.current_track()?;
        let extension = track
            .src
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
            .unwrap_or("mp3");
        let name: String = format!("{} - {}", track.artist, track.title)
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                _ => c,
            })
            .collect();
        Some((track.src.clone(), format!("{name}.{extension}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeMedia {
        loaded: Vec<String>,
        plays: u32,
        pauses: u32,
        position: f64,
        volume: f64,
        refuse_play: bool,
        /// Rejection delivered on the next `take_failure`, as a browser
        /// play promise would
        deferred_rejection: Option<MediaError>,
    }

    impl MediaElement for FakeMedia {
        fn load(&mut self, src: &str) {
            self.loaded.push(src.to_string());
        }
        fn play(&mut self) -> Result<(), MediaError> {
            if self.refuse_play {
                return Err(MediaError::PlayRejected("NotAllowedError".into()));
            }
            self.plays += 1;
            Ok(())
        }
        fn pause(&mut self) {
            self.pauses += 1;
        }
        fn seek(&mut self, seconds: f64) {
            self.position = seconds;
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn take_failure(&mut self) -> Option<MediaError> {
            self.deferred_rejection.take()
        }
    }

    fn three_tracks() -> MusicPlayer {
        let tracks = ["a", "b", "c"]
            .iter()
            .map(|name| Track::new(name, "artist", "", &format!("/{name}.mp3")))
            .collect();
        MusicPlayer::new(tracks, 50)
    }

    #[test]
    fn test_toggle_play_pause() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        player.attach(&mut media);
        assert_eq!(media.loaded, vec!["/a.mp3"]);
        assert_eq!(media.volume, 0.5);

        assert!(player.toggle_play(&mut media));
        assert!(!player.toggle_play(&mut media));
        assert_eq!((media.plays, media.pauses), (1, 1));
    }

    #[test]
    fn test_refused_play_disables_transport() {
        let mut player = three_tracks();
        let mut media = FakeMedia {
            refuse_play: true,
            ..FakeMedia::default()
        };
        assert!(!player.toggle_play(&mut media));
        assert!(!player.playing);
        assert!(matches!(player.error, Some(MediaError::PlayRejected(_))));
        assert!(!player.is_enabled());
    }

    #[test]
    fn test_deferred_play_rejection() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        assert!(!player.sync_media(&mut media));

        assert!(player.toggle_play(&mut media));
        media.deferred_rejection = Some(MediaError::PlayRejected("NotAllowedError".into()));

        assert!(player.sync_media(&mut media));
        assert!(!player.playing);
        assert!(!player.is_enabled());
        assert_eq!(
            player.error_text().as_deref(),
            Some("playback refused: NotAllowedError")
        );
        assert!(!player.toggle_play(&mut media));
        assert_eq!(media.plays, 1);
        assert!(!player.sync_media(&mut media));
    }

    #[test]
    fn test_next_and_previous() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        player.toggle_play(&mut media);

        player.next(&mut media);
        assert_eq!(player.current_track().unwrap().title, "b");
        assert_eq!(media.plays, 2);

        // a few seconds in restarts the track
        player.on_time_update(10.0);
        player.previous(&mut media);
        assert_eq!(player.index(), 1);
        assert_eq!(media.position, 0.0);

        player.previous(&mut media);
        assert_eq!(player.index(), 0);
        player.previous(&mut media);
        assert_eq!(player.index(), 2);
        player.next(&mut media);
        assert_eq!(player.index(), 0);
    }

    #[test]
    fn test_ended_advances_then_stops() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        player.toggle_play(&mut media);

        player.on_ended(&mut media);
        player.on_ended(&mut media);
        assert_eq!(player.index(), 2);
        assert!(player.playing);

        player.on_ended(&mut media);
        assert!(!player.playing);
        assert_eq!(player.index(), 2);
    }

    #[test]
    fn test_seek_and_metadata() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        assert_eq!(player.duration_label(), "3:33");

        player.on_metadata(f64::NAN);
        assert_eq!(player.duration, DEFAULT_DURATION_SECS);
        player.on_metadata(200.0);

        player.seek_fraction(50.0, 200.0, &mut media);
        assert_eq!(player.current_time, 50.0);
        assert_eq!(media.position, 50.0);
        assert_eq!(player.progress(), 25.0);
        assert_eq!(player.elapsed_label(), "0:50");

        player.seek_fraction(10.0, 0.0, &mut media);
        assert_eq!(player.current_time, 50.0);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        player.set_volume(140, &mut media);
        assert_eq!(player.volume, 100);
        assert_eq!(media.volume, 1.0);
        player.set_volume(-3, &mut media);
        assert_eq!(player.volume, 0);
    }

    #[test]
    fn test_error_disables_transport() {
        let mut player = three_tracks();
        let mut media = FakeMedia::default();
        player.toggle_play(&mut media);
        player.on_error(MediaError::Load("404".into()));
        assert!(!player.playing);
        assert!(!player.toggle_play(&mut media));
        player.next(&mut media);
        assert_eq!(player.index(), 0);
    }

    #[test]
    fn test_share_text() {
        let player = MusicPlayer::new(default_playlist(), 50);
        assert_eq!(
            player.share_text().unwrap(),
            "Listening to Track from Spotify by Artist Name"
        );
        assert_eq!(MusicPlayer::new(Vec::new(), 50).share_text(), None);
    }

    #[test]
    fn test_download_name() {
        let player = MusicPlayer::new(
            vec![Track::new("What? Now", "AC/DC", "", "/sounds/track.ogg")],
            50,
        );
        assert_eq!(
            player.download(),
            Some(("/sounds/track.ogg".to_string(), "AC_DC - What_ Now.ogg".to_string()))
        );

        let player = MusicPlayer::new(vec![Track::new("t", "a", "", "/stream")], 50);
        assert_eq!(player.download().unwrap().1, "a - t.mp3");
        assert_eq!(MusicPlayer::new(Vec::new(), 50).download(), None);
    }
}
