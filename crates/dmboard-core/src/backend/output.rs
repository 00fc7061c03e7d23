//! Native audio output via rodio, one `Sink` per channel.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use parking_lot::Mutex;
use rodio::{Decoder, OutputStreamHandle, Sink, Source};

use super::{AudioBackend, Channel};

pub use rodio::OutputStream;

struct ChannelSlot {
    sink: Option<Sink>,
    volume: f32,
}

impl ChannelSlot {
    fn new() -> Self {
        Self {
            sink: None,
            volume: 1.0,
        }
    }
}

/// Plays through the system's default output device.
pub struct RodioBackend {
    handle: OutputStreamHandle,
    channels: [Mutex<ChannelSlot>; 2],
}

impl RodioBackend {
    /// Open the default output device. The returned `OutputStream` must
    /// be kept alive for as long as the backend plays; dropping it
    /// silences everything.
    pub fn new() -> Result<(Self, OutputStream), rodio::StreamError> {
        let (stream, handle) = OutputStream::try_default()?;
        let backend = Self {
            handle,
            channels: [Mutex::new(ChannelSlot::new()), Mutex::new(ChannelSlot::new())],
        };
        Ok((backend, stream))
    }

    fn slot(&self, channel: Channel) -> &Mutex<ChannelSlot> {
        &self.channels[channel.index()]
    }
}

impl AudioBackend for RodioBackend {
    fn play(&self, channel: Channel, path: &Path, looped: bool) {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                log::error!("dmboard: cannot open {}: {}", path.display(), e);
                return;
            }
        };
        let source = match Decoder::new(BufReader::new(file)) {
            Ok(s) => s,
            Err(e) => {
                log::error!("dmboard: cannot decode {}: {}", path.display(), e);
                return;
            }
        };
        let sink = match Sink::try_new(&self.handle) {
            Ok(s) => s,
            Err(e) => {
                log::error!("dmboard: cannot open sink: {}", e);
                return;
            }
        };

        let mut slot = self.slot(channel).lock();
        if let Some(old) = slot.sink.take() {
            old.stop();
        }
        sink.set_volume(slot.volume);
        if looped {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        slot.sink = Some(sink);
    }

    fn stop(&self, channel: Channel) {
        if let Some(sink) = self.slot(channel).lock().sink.take() {
            sink.stop();
        }
    }

    fn pause(&self, channel: Channel) {
        if let Some(sink) = &self.slot(channel).lock().sink {
            sink.pause();
        }
    }

    fn resume(&self, channel: Channel) {
        if let Some(sink) = &self.slot(channel).lock().sink {
            sink.play();
        }
    }

    fn set_volume(&self, channel: Channel, volume: f32) {
        let mut slot = self.slot(channel).lock();
        slot.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &slot.sink {
            sink.set_volume(slot.volume);
        }
    }

    fn volume(&self, channel: Channel) -> f32 {
        self.slot(channel).lock().volume
    }

    fn is_busy(&self, channel: Channel) -> bool {
        self.slot(channel)
            .lock()
            .sink
            .as_ref()
            .map(|s| !s.empty())
            .unwrap_or(false)
    }

    fn track_length(&self, path: &Path) -> Option<Duration> {
        probe_track_length(path)
    }
}

/// Read the duration from a file's container metadata.
fn probe_track_length(path: &Path) -> Option<Duration> {
    let tagged = Probe::open(path).and_then(|p| p.read()).ok()?;
    let duration = tagged.properties().duration();
    if duration.is_zero() {
        log::warn!(
            "dmboard: no duration in metadata for {}, auto-advance disabled",
            path.display()
        );
        None
    } else {
        Some(duration)
    }
}
