//! Streams pre-recorded frames from disk with a sliding window and a
//! single-slot background prefetch (§4.G), grounded in
//! `FrameBufferManager::{loadWindowAround,shiftWindow,stepForward,
//! startPreloadingNextFrame}`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::frame as frame_io;
use crate::error::AdsilError;
use crate::frame::{Frame, FrameWindow};
use crate::observer::ObserverList;

#[derive(Default)]
struct PreloadState {
    frame: Option<Frame>,
    index: Option<usize>,
}

struct PreloadSlot {
    state: Mutex<PreloadState>,
    ready: AtomicBool,
    in_progress: AtomicBool,
}

impl PreloadSlot {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PreloadState::default()),
            ready: AtomicBool::new(false),
            in_progress: AtomicBool::new(false),
        })
    }
}

pub struct FrameBufferPlayer {
    dir: PathBuf,
    suffix: String,
    total_frames: usize,
    cursor: usize,
    k: usize,
    window: FrameWindow,
    rate_fps: f32,
    playing: bool,
    accumulator: f32,
    preload: Arc<PreloadSlot>,
    observers: ObserverList,
}

impl FrameBufferPlayer {
    /// Scans `dir` for `frame_XXXXX<suffix>` files, counts `N`, and loads
    /// the initial window around index 0.
    pub fn new(dir: PathBuf, suffix: impl Into<String>, k: usize, rate_fps: f32) -> Result<Self, AdsilError> {
        let suffix = suffix.into();
        let total_frames = frame_io::count_frames(&dir, &suffix);
        let mut player = Self {
            dir,
            suffix,
            total_frames,
            cursor: 0,
            k,
            window: FrameWindow::new(k),
            rate_fps,
            playing: false,
            accumulator: 0.0,
            preload: PreloadSlot::new(),
            observers: ObserverList::new(),
        };
        player.load_window_around(0)?;
        player.start_preloading_next_frame();
        Ok(player)
    }

    pub fn observers_mut(&mut self) -> &mut ObserverList {
        &mut self.observers
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn window(&self) -> &FrameWindow {
        &self.window
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn can_advance(&self, direction: i64) -> bool {
        let target = self.cursor as i64 + direction;
        target >= 0 && target < self.total_frames as i64
    }

    /// Reload the entire window around `center` (any index, even out of
    /// `[0, N)` — out-of-range slots become empty sentinels, §8 property 9).
    fn load_window_around(&mut self, center: i64) -> Result<(), AdsilError> {
        let k = self.k as i64;
        let mut window = FrameWindow::new(self.k);
        for (slot, offset) in (-k..=k).enumerate() {
            let index = center + offset;
            let frame = if index >= 0 && index < self.total_frames as i64 {
                frame_io::load_frame_sync(&self.dir, index as usize, &self.suffix)?
            } else {
                Frame::empty()
            };
            window.set(slot, frame);
        }
        self.window = window;
        Ok(())
    }

    fn invalidate_preload(&mut self) {
        let mut state = self.preload.state.lock().unwrap();
        *state = PreloadState::default();
        self.preload.ready.store(false, Ordering::SeqCst);
    }

    /// Launch a background task (if one isn't already in flight and a
    /// Tokio runtime is available) loading `frame_{cursor+K+1}`. Outside a
    /// runtime — e.g. in a synchronous test — this is a no-op; the next
    /// `step_forward` simply falls back to a synchronous load.
    fn start_preloading_next_frame(&self) {
        let next_index = self.cursor + self.k + 1;
        if next_index >= self.total_frames {
            return;
        }
        if self.preload.in_progress.swap(true, Ordering::SeqCst) {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            self.preload.in_progress.store(false, Ordering::SeqCst);
            return;
        }

        let dir = self.dir.clone();
        let suffix = self.suffix.clone();
        let slot = Arc::clone(&self.preload);
        tokio::task::spawn_blocking(move || {
            match frame_io::load_frame_sync(&dir, next_index, &suffix) {
                Ok(frame) => {
                    let mut state = slot.state.lock().unwrap();
                    state.frame = Some(frame);
                    state.index = Some(next_index);
                    slot.ready.store(true, Ordering::SeqCst);
                }
                Err(e) => {
                    tracing::warn!(error = %e, index = next_index, "failed to preload frame");
                }
            }
            slot.in_progress.store(false, Ordering::SeqCst);
        });
    }

    /// Use the prefetched frame if it matches `index`; otherwise load it
    /// synchronously on the foreground (§4.G prefetch policy).
    fn take_frame(&mut self, index: usize) -> Result<Frame, AdsilError> {
        if self.preload.ready.load(Ordering::SeqCst) {
            let mut state = self.preload.state.lock().unwrap();
            if state.index == Some(index) {
                let frame = state.frame.take().expect("ready implies frame is set");
                state.index = None;
                drop(state);
                self.preload.ready.store(false, Ordering::SeqCst);
                return Ok(frame);
            }
        }
        frame_io::load_frame_sync(&self.dir, index, &self.suffix)
    }

    fn notify(&mut self) {
        let frame = self.window.center().clone();
        self.observers.notify(&frame);
    }

    /// Advance the cursor by one, slide the window, and notify observers.
    /// Returns `false` (without effect) if already at the last frame.
    pub fn step_forward(&mut self) -> Result<bool, AdsilError> {
        if !self.can_advance(1) {
            return Ok(false);
        }
        self.cursor += 1;
        self.window.slide_forward();

        let new_slot_index = self.cursor + self.k;
        let new_frame = if new_slot_index < self.total_frames {
            self.take_frame(new_slot_index)?
        } else {
            Frame::empty()
        };
        let last_slot = self.window.len() - 1;
        self.window.set(last_slot, new_frame);

        self.start_preloading_next_frame();
        self.notify();
        Ok(true)
    }

    /// Reload the entire window around `j`, invalidate the prefetch slot,
    /// and notify observers — even if `j` is out of `[0, N)` (§8 property 9).
    pub fn seek(&mut self, j: usize) -> Result<(), AdsilError> {
        self.cursor = j;
        self.load_window_around(j as i64)?;
        self.invalidate_preload();
        self.start_preloading_next_frame();
        self.notify();
        Ok(())
    }

    /// Drive playback: accumulate `dt`, then step forward once per whole
    /// `1/rate` interval that fits, stopping early (and pausing) if the
    /// corpus runs out.
    pub fn update(&mut self, dt: f32) -> Result<(), AdsilError> {
        if !self.playing || self.rate_fps <= 0.0 {
            return Ok(());
        }
        self.accumulator += dt;
        let interval = 1.0 / self.rate_fps;
        while self.accumulator >= interval {
            if !self.can_advance(1) {
                self.playing = false;
                break;
            }
            self.accumulator -= interval;
            self.step_forward()?;
        }
        Ok(())
    }
}
