/// Game loop timing and control system
///
/// Implements a fixed timestep game loop with variable rendering.
/// Logic and physics advance in whole steps of a configured length while
/// rendering runs once per frame.
use std::time::{Duration, Instant};

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Elapsed simulated time as seen by game logic.
///
/// Advanced by the engine once per logic update; animations read it instead
/// of the wall clock so a halted or paused engine freezes them too.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    elapsed_ms: u64,
    ticks: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt_ms: u32) {
        self.elapsed_ms += dt_ms as u64;
        self.ticks += 1;
    }

    /// Milliseconds of simulated time so far
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Number of updates the clock has seen
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Game loop timing state
pub struct GameLoop {
    /// Fixed update step
    timestep: Duration,

    /// Maximum number of fixed steps per frame to prevent spiral of death
    max_steps: u32,

    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Whether the game is paused
    paused: bool,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl GameLoop {
    /// Create a new game loop with a fixed step of `timestep_ms`
    pub fn new(timestep_ms: u32, max_steps: u32) -> Self {
        Self {
            timestep: Duration::from_millis(timestep_ms.max(1) as u64),
            max_steps: max_steps.max(1),
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            paused: false,
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            update_count: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame from the wall clock, returns the number of fixed
    /// updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Account for `frame_time` of elapsed time, returns the number of fixed
    /// updates to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        // Store frame time for FPS calculation
        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        // If paused, don't accumulate time for updates
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= self.timestep && updates < self.max_steps {
            self.accumulator -= self.timestep;
            updates += 1;
        }

        // Drop the backlog a capped frame could not catch up on
        if updates == self.max_steps && self.accumulator >= self.timestep {
            log::debug!("Dropping {:?} of frame backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Fixed step length in milliseconds
    pub fn timestep_ms(&self) -> u32 {
        self.timestep.as_millis() as u32
    }

    /// Get the interpolation alpha for smooth rendering between updates
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep.as_secs_f32()
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Check if game is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the game
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Game paused");
        }
    }

    /// Resume the game
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Game resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(16, 5)
    }
}
