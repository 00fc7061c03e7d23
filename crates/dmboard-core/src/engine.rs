//! Ambient playback engine.
//!
//! Owns a catalog + audio backend. One looping ambient track, a FIFO
//! queue of upcoming categories, a one-shot timer that advances the
//! queue at loop boundaries, and background threads for volume fades.
//!
//! Lock ordering: the timer lock may take the state lock (scheduling
//! reads remaining time), so the state lock is never held across a
//! timer operation — callers drop state first.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::backend::{AudioBackend, Channel};
use crate::catalog::{SoundCatalog, SoundKind};
use crate::error::EngineError;
use crate::models::{CurrentTrack, EngineSnapshot, PlaybackState};
use crate::timer::OneShot;

/// Number of volume steps in a fade ramp.
const FADE_STEPS: u32 = 100;

/// Default crossfade length.
const DEFAULT_FADE: Duration = Duration::from_secs(3);

const MIN_FADE_SECS: f32 = 1.0;
const MAX_FADE_SECS: f32 = 10.0;

/// Handle to the engine. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct AmbientEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    catalog: SoundCatalog,
    audio: Arc<dyn AudioBackend>,
    state: Mutex<PlaybackState>,
    queue: Mutex<VecDeque<String>>,
    fading: AtomicBool,
    timer: Mutex<TimerSlot>,
    fade_duration: Mutex<Duration>,
}

/// The pending auto-advance, if any. The generation counter makes
/// superseded callbacks inert: every schedule or cancel bumps it, and
/// a firing callback that carries a stale generation does nothing.
#[derive(Default)]
struct TimerSlot {
    generation: u64,
    handle: Option<OneShot>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().handle.take() {
            handle.cancel();
        }
    }
}

impl AmbientEngine {
    pub fn new(catalog: SoundCatalog, audio: Arc<dyn AudioBackend>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                catalog,
                audio,
                state: Mutex::new(PlaybackState::default()),
                queue: Mutex::new(VecDeque::new()),
                fading: AtomicBool::new(false),
                timer: Mutex::new(TimerSlot::default()),
                fade_duration: Mutex::new(DEFAULT_FADE),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Ambient channel
    // ------------------------------------------------------------------

    /// Start a new looping ambient track at the current volume,
    /// replacing whatever was playing. Arms the auto-advance timer.
    pub fn play_ambient(&self, name: &str) -> Result<(), EngineError> {
        play_ambient(&self.inner, name)
    }

    /// Append a category to the queue. Starts playing immediately when
    /// the board is idle.
    pub fn queue_ambient(&self, name: &str) {
        queue_ambient(&self.inner, name);
    }

    /// Pop the queue head and play it; go idle when the queue is empty.
    pub fn play_next_in_queue(&self) {
        play_next_in_queue(&self.inner);
    }

    /// Advance as a loop boundary would: play the queue head, or keep
    /// looping the current track and re-arm for the next cycle.
    pub fn transition_to_next(&self) {
        transition_to_next(&self.inner);
    }

    /// Drop the current track and cut straight to the next queued one,
    /// or stop when the queue is empty.
    pub fn skip_to_next(&self) {
        skip_to_next(&self.inner);
    }

    /// Pause or resume the ambient track. No-op when nothing plays.
    pub fn toggle_pause_resume(&self) {
        toggle_pause_resume(&self.inner);
    }

    /// Hard stop: silence the ambient channel, clear the queue, reset
    /// playback state.
    pub fn stop_ambient(&self) {
        stop_ambient(&self.inner);
    }

    /// Drop all queued categories. The current track keeps looping.
    pub fn clear_queue(&self) {
        clear_queue(&self.inner);
    }

    /// Fade a new ambient track in from silence over the configured
    /// fade duration. The ramp runs on a background thread.
    pub fn fade_in_ambient(&self, name: &str) -> Result<(), EngineError> {
        fade_in_ambient(&self.inner, name)
    }

    /// Fade the current track out to silence, then advance to the next
    /// queued track if any. The ramp runs on a background thread.
    pub fn fade_out_ambient(&self) {
        fade_out_ambient(&self.inner);
    }

    // ------------------------------------------------------------------
    // Effect channel
    // ------------------------------------------------------------------

    /// Fire a one-shot effect. Independent of the ambient channel.
    pub fn play_effect(&self, name: &str) -> Result<(), EngineError> {
        let path = resolve(&self.inner, SoundKind::Effect, name)?;
        self.inner.audio.play(Channel::Effect, &path, false);
        log::info!("dmboard: playing effect {:?}", name);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Volume and fade config
    // ------------------------------------------------------------------

    /// Set the ambient baseline volume, 0.0 to 1.0. Takes effect
    /// immediately; a running fade picks it up on its next step.
    pub fn set_ambient_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.inner.state.lock().ambient_volume = volume;
        self.inner.audio.set_volume(Channel::Ambient, volume);
    }

    /// Set the effect channel volume, 0.0 to 1.0.
    pub fn set_effect_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.inner.state.lock().effect_volume = volume;
        self.inner.audio.set_volume(Channel::Effect, volume);
    }

    /// Set the fade ramp length in seconds, clamped to 1..=10.
    /// Non-finite input is ignored.
    pub fn set_fade_duration(&self, seconds: f32) {
        if !seconds.is_finite() {
            log::warn!("dmboard: ignoring non-finite fade duration");
            return;
        }
        let seconds = seconds.clamp(MIN_FADE_SECS, MAX_FADE_SECS);
        *self.inner.fade_duration.lock() = Duration::from_secs_f32(seconds);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn current_name(&self) -> Option<String> {
        self.inner.state.lock().current.as_ref().map(|t| t.name.clone())
    }

    pub fn queued(&self) -> Vec<String> {
        self.inner.queue.lock().iter().cloned().collect()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.lock().paused
    }

    pub fn is_fading(&self) -> bool {
        self.inner.fading.load(Ordering::SeqCst)
    }

    pub fn ambient_volume(&self) -> f32 {
        self.inner.state.lock().ambient_volume
    }

    pub fn effect_volume(&self) -> f32 {
        self.inner.state.lock().effect_volume
    }

    pub fn fade_duration(&self) -> Duration {
        *self.inner.fade_duration.lock()
    }

    /// Whether an auto-advance is armed.
    pub fn has_pending_advance(&self) -> bool {
        self.inner.timer.lock().handle.is_some()
    }

    pub fn catalog(&self) -> &SoundCatalog {
        &self.inner.catalog
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.inner.state.lock();
        EngineSnapshot {
            current: state.current.as_ref().map(|t| t.name.clone()),
            queued: self.inner.queue.lock().iter().cloned().collect(),
            paused: state.paused,
            fading: self.inner.fading.load(Ordering::SeqCst),
            ambient_volume: state.ambient_volume,
            effect_volume: state.effect_volume,
            fade_duration: *self.inner.fade_duration.lock(),
        }
    }
}

// ----------------------------------------------------------------------
// Core operations. Free functions over the shared inner so timer and
// fade threads can call them through a Weak upgrade.
// ----------------------------------------------------------------------

fn resolve(inner: &EngineInner, kind: SoundKind, name: &str) -> Result<std::path::PathBuf, EngineError> {
    inner.catalog.resolve(kind, name).map_err(|e| {
        log::warn!("dmboard: {}", e);
        e
    })
}

fn play_ambient(inner: &Arc<EngineInner>, name: &str) -> Result<(), EngineError> {
    let path = resolve(inner, SoundKind::Ambient, name)?;
    let length = inner.audio.track_length(&path);

    inner.audio.stop(Channel::Ambient);
    inner.audio.play(Channel::Ambient, &path, true);

    {
        let mut state = inner.state.lock();
        inner.audio.set_volume(Channel::Ambient, state.ambient_volume);
        state.current = Some(CurrentTrack {
            name: name.to_string(),
            path,
            length,
        });
        state.started_at = Some(Instant::now());
        state.paused = false;
        state.paused_at = None;
    }

    schedule_next_track(inner);
    log::info!("dmboard: playing ambient {:?}", name);
    Ok(())
}

fn queue_ambient(inner: &Arc<EngineInner>, name: &str) {
    let was_empty = {
        let mut queue = inner.queue.lock();
        let was_empty = queue.is_empty();
        queue.push_back(name.to_string());
        was_empty
    };
    log::info!("dmboard: queued {:?}", name);

    let idle = inner.state.lock().current.is_none();
    if idle {
        play_next_in_queue(inner);
    } else if was_empty && inner.timer.lock().handle.is_none() {
        // The timer disarms when the queue drains while a track keeps
        // looping with an unknown length; re-arm for the new entry.
        schedule_next_track(inner);
    }
}

/// Pop and play the queue head; go idle when the queue is empty.
fn play_next_in_queue(inner: &Arc<EngineInner>) {
    loop {
        let next = inner.queue.lock().pop_front();
        match next {
            Some(name) => {
                // Failure was already logged; fall through to the next
                // entry so one bad category cannot strand the rest of
                // the queue.
                if play_ambient(inner, &name).is_ok() {
                    return;
                }
            }
            None => {
                {
                    let mut state = inner.state.lock();
                    state.current = None;
                    state.started_at = None;
                    state.paused = false;
                    state.paused_at = None;
                }
                cancel_timer(inner);
                log::info!("dmboard: queue drained, going idle");
                return;
            }
        }
    }
}

/// Arm the auto-advance timer for the remaining time in the current
/// loop cycle. Replaces any pending timer.
fn schedule_next_track(inner: &Arc<EngineInner>) {
    let mut timer = inner.timer.lock();
    timer.generation += 1;
    let generation = timer.generation;
    if let Some(old) = timer.handle.take() {
        old.cancel();
    }

    let remaining = {
        let state = inner.state.lock();
        if state.paused || state.current.is_none() {
            return;
        }
        match state.remaining_in_cycle() {
            Some(r) => r,
            None => {
                log::debug!("dmboard: track length unknown, auto-advance not armed");
                return;
            }
        }
    };

    let weak = Arc::downgrade(inner);
    timer.handle = Some(OneShot::start(remaining, move || {
        on_advance_timer(&weak, generation);
    }));
}

fn on_advance_timer(weak: &Weak<EngineInner>, generation: u64) {
    let inner = match weak.upgrade() {
        Some(inner) => inner,
        None => return,
    };
    {
        let mut timer = inner.timer.lock();
        if timer.generation != generation {
            return; // superseded
        }
        timer.handle = None;
    }
    transition_to_next(&inner);
}

/// Loop boundary reached: play the queue head, or keep looping the
/// current track and re-arm for the next cycle.
fn transition_to_next(inner: &Arc<EngineInner>) {
    if inner.queue.lock().is_empty() {
        schedule_next_track(inner);
    } else {
        play_next_in_queue(inner);
    }
}

fn toggle_pause_resume(inner: &Arc<EngineInner>) {
    let resumed = {
        let mut state = inner.state.lock();
        if state.current.is_none() {
            return;
        }
        if state.paused {
            inner.audio.resume(Channel::Ambient);
            state.paused = false;
            // Shift the cycle origin forward by the pause length so the
            // remaining time in the loop is preserved.
            if let (Some(started), Some(paused_at)) = (state.started_at, state.paused_at.take()) {
                state.started_at = Some(started + paused_at.elapsed());
            }
            true
        } else {
            inner.audio.pause(Channel::Ambient);
            state.paused = true;
            state.paused_at = Some(Instant::now());
            false
        }
    };

    if resumed {
        schedule_next_track(inner);
        log::info!("dmboard: resumed");
    } else {
        cancel_timer(inner);
        log::info!("dmboard: paused");
    }
}

fn skip_to_next(inner: &Arc<EngineInner>) {
    if inner.queue.lock().is_empty() {
        stop_ambient(inner);
        return;
    }
    {
        let mut state = inner.state.lock();
        state.paused = false;
        state.paused_at = None;
    }
    transition_to_next(inner);
}

fn stop_ambient(inner: &Arc<EngineInner>) {
    inner.audio.stop(Channel::Ambient);
    {
        let mut state = inner.state.lock();
        inner.audio.set_volume(Channel::Ambient, state.ambient_volume);
        state.current = None;
        state.started_at = None;
        state.paused = false;
        state.paused_at = None;
    }
    cancel_timer(inner);
    inner.queue.lock().clear();
    log::info!("dmboard: stopped ambient");
}

fn clear_queue(inner: &Arc<EngineInner>) {
    inner.queue.lock().clear();
    cancel_timer(inner);
    log::info!("dmboard: cleared queue");
}

fn cancel_timer(inner: &EngineInner) {
    let mut timer = inner.timer.lock();
    timer.generation += 1;
    if let Some(handle) = timer.handle.take() {
        handle.cancel();
    }
}

// ----------------------------------------------------------------------
// Fades. One ramp at a time; a second request while one runs is ignored.
// ----------------------------------------------------------------------

fn fade_in_ambient(inner: &Arc<EngineInner>, name: &str) -> Result<(), EngineError> {
    let path = resolve(inner, SoundKind::Ambient, name)?;
    let length = inner.audio.track_length(&path);

    {
        let mut state = inner.state.lock();
        state.current = Some(CurrentTrack {
            name: name.to_string(),
            path: path.clone(),
            length,
        });
        state.paused = false;
        state.paused_at = None;
    }

    // No auto-advance may fire while the ramp runs; the ramp re-arms
    // when it completes.
    cancel_timer(inner);

    let task_inner = Arc::clone(inner);
    std::thread::spawn(move || run_fade_in(&task_inner, &path));
    Ok(())
}

fn run_fade_in(inner: &Arc<EngineInner>, path: &std::path::Path) {
    if inner
        .fading
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        log::debug!("dmboard: fade already in progress, ignoring fade-in");
        return;
    }

    inner.audio.stop(Channel::Ambient);
    inner.audio.set_volume(Channel::Ambient, 0.0);
    inner.audio.play(Channel::Ambient, path, true);
    inner.state.lock().started_at = Some(Instant::now());

    let step = *inner.fade_duration.lock() / FADE_STEPS;
    for i in 0..=FADE_STEPS {
        // Baseline re-read each step so slider moves mid-fade land.
        let target = inner.state.lock().ambient_volume;
        inner
            .audio
            .set_volume(Channel::Ambient, target * i as f32 / FADE_STEPS as f32);
        if i < FADE_STEPS {
            std::thread::sleep(step);
        }
    }

    inner.fading.store(false, Ordering::SeqCst);
    schedule_next_track(inner);
}

fn fade_out_ambient(inner: &Arc<EngineInner>) {
    if inner.state.lock().current.is_none() {
        return;
    }
    // A loop boundary landing inside the ramp must not hard-cut to the
    // queue head; the ramp advances the queue itself when it finishes.
    cancel_timer(inner);

    let task_inner = Arc::clone(inner);
    std::thread::spawn(move || run_fade_out(&task_inner));
}

fn run_fade_out(inner: &Arc<EngineInner>) {
    if inner
        .fading
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        log::debug!("dmboard: fade already in progress, ignoring fade-out");
        return;
    }

    let start = inner.audio.volume(Channel::Ambient);
    let step = *inner.fade_duration.lock() / FADE_STEPS;
    for i in 0..=FADE_STEPS {
        inner
            .audio
            .set_volume(Channel::Ambient, start * (1.0 - i as f32 / FADE_STEPS as f32));
        if i < FADE_STEPS {
            std::thread::sleep(step);
        }
    }

    inner.audio.stop(Channel::Ambient);
    let baseline = {
        let mut state = inner.state.lock();
        state.current = None;
        state.started_at = None;
        state.paused = false;
        state.paused_at = None;
        state.ambient_volume
    };
    // The channel comes back at the baseline, not the silenced level.
    inner.audio.set_volume(Channel::Ambient, baseline);
    inner.fading.store(false, Ordering::SeqCst);

    play_next_in_queue(inner);
}
