//! Web Audio plumbing for the music player
//!
//! `HtmlAudio` drives an `<audio>` element for the player transport, and
//! `AudioAnalyser` taps the same element for the reactive background.
//! Both degrade quietly: when the audio graph cannot be built, the page
//! keeps working without reactivity.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, AudioContextState, HtmlAudioElement, HtmlMediaElement};

use crate::particles::SpectrumSource;
use crate::platform::web::js_error;
use crate::player::{MediaElement, MediaError};

/// FFT size for the analyser (128 frequency bins)
const FFT_SIZE: u32 = 256;
const SMOOTHING: f64 = 0.8;

/// `MediaElement` backed by an `<audio>` element
pub struct HtmlAudio {
    element: HtmlAudioElement,
    /// Written by the play promise when it rejects
    failure: Rc<RefCell<Option<MediaError>>>,
}

impl HtmlAudio {
    pub fn new(element: HtmlAudioElement) -> Self {
        Self {
            element,
            failure: Rc::new(RefCell::new(None)),
        }
    }

    pub fn element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

impl MediaElement for HtmlAudio {
    fn load(&mut self, src: &str) {
        self.element.set_src(src);
        self.element.load();
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let promise = self
            .element
            .play()
            .map_err(|e| MediaError::PlayRejected(js_error(e).to_string()))?;
        // Autoplay refusals arrive asynchronously
        let failure = self.failure.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                // A pause or track change interrupting the request is not a failure
                if error_name(&e).as_deref() == Some("AbortError") {
                    return;
                }
                let message = js_error(e).to_string();
                log::warn!("Playback refused: {}", message);
                *failure.borrow_mut() = Some(MediaError::PlayRejected(message));
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            log::warn!("Pause failed: {}", js_error(e));
        }
    }

    fn seek(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume.clamp(0.0, 1.0));
    }

    fn take_failure(&mut self) -> Option<MediaError> {
        self.failure.borrow_mut().take()
    }
}

/// `DOMException.name` of a rejection value
fn error_name(err: &JsValue) -> Option<String> {
    js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
}

/// Frequency analyser attached to a media element
pub struct AudioAnalyser {
    ctx: AudioContext,
    analyser: AnalyserNode,
}

impl AudioAnalyser {
    /// Route `element` through an analyser to the speakers. `None` when
    /// Web Audio is unavailable (insecure context, old browser).
    pub fn connect(element: &HtmlMediaElement) -> Option<Self> {
        let ctx = match AudioContext::new() {
            Ok(ctx) => ctx,
            Err(e) => {
                log::warn!(
                    "Failed to create AudioContext - reactive mode disabled: {}",
                    js_error(e)
                );
                return None;
            }
        };

        let graph = (|| {
            let source = ctx.create_media_element_source(element)?;
            let analyser = ctx.create_analyser()?;
            analyser.set_fft_size(FFT_SIZE);
            analyser.set_smoothing_time_constant(SMOOTHING);
            source.connect_with_audio_node(&analyser)?;
            analyser.connect_with_audio_node(&ctx.destination())?;
            Ok::<_, wasm_bindgen::JsValue>(analyser)
        })();

        match graph {
            Ok(analyser) => {
                log::info!("Audio analyser connected");
                Some(Self { ctx, analyser })
            }
            Err(e) => {
                log::warn!("Audio graph unavailable - reactive mode disabled: {}", js_error(e));
                let _ = ctx.close();
                None
            }
        }
    }

    /// Resume the context (required after a user gesture)
    pub fn resume(&self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }
}

impl SpectrumSource for AudioAnalyser {
    fn frequency_data(&mut self, out: &mut Vec<u8>) -> bool {
        if self.ctx.state() != AudioContextState::Running {
            return false;
        }
        out.resize(self.analyser.frequency_bin_count() as usize, 0);
        self.analyser.get_byte_frequency_data(out);
        true
    }
}
