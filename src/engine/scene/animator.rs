// Sprite sheet animation driven by the engine clock

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::{EngineError, Result};
use crate::engine::renderer::Rect;

use super::arena::GameObjectId;

/// Frame range of one named animation on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationRange {
    /// First frame index (row-major over the sheet)
    pub start: u32,
    /// Last frame index, inclusive
    pub end: u32,
    /// Frames per second
    pub fps: u32,
}

impl AnimationRange {
    pub fn frame_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Layout of a sprite sheet and the animations it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSheet {
    pub sprite_width: u32,
    pub sprite_height: u32,
    pub columns: u32,
    pub rows: u32,
    /// Sheet image name in the textures directory
    #[serde(default)]
    pub texture: Option<String>,
    pub animations: HashMap<String, AnimationRange>,
}

impl AnimationSheet {
    /// Parse and validate a sheet description
    pub fn from_json_str(json: &str) -> Result<Self> {
        let sheet: AnimationSheet = serde_json::from_str(json)?;
        sheet.validate()?;
        Ok(sheet)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(EngineError::Scene(
                "animation sheet needs at least one row and column".to_string(),
            ));
        }
        let frames = self.columns * self.rows;
        for (name, range) in &self.animations {
            if range.start > range.end || range.end >= frames || range.fps == 0 {
                return Err(EngineError::Scene(format!(
                    "animation '{}' has an invalid range {}..={} @ {} fps",
                    name, range.start, range.end, range.fps
                )));
            }
        }
        Ok(())
    }

    /// Source rectangle of a frame index
    pub fn frame_rect(&self, frame: u32) -> Rect {
        let col = frame % self.columns;
        let row = frame / self.columns;
        Rect::new(
            (col * self.sprite_width) as f32,
            (row * self.sprite_height) as f32,
            self.sprite_width as f32,
            self.sprite_height as f32,
        )
    }

    pub fn animation(&self, name: &str) -> Option<&AnimationRange> {
        self.animations.get(name)
    }
}

/// Playback mode of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationMode {
    /// Play once and hold the last frame
    Single,
    /// Repeat from the first frame
    Loop,
}

#[derive(Debug, Clone)]
struct Playback {
    name: String,
    range: AnimationRange,
    mode: AnimationMode,
    /// Clock time the first frame was shown
    started_at_ms: u64,
    current_frame: u32,
}

/// Picks the current frame of a sheet animation from elapsed clock time
#[derive(Debug, Clone, Default)]
pub struct Animator {
    pub(crate) owner: Option<GameObjectId>,
    sheet: Option<AnimationSheet>,
    playback: Option<Playback>,
    stopped: bool,
    /// Frames already shown, applied to the start time at the next update
    resume_offset: Option<u32>,
    autoplay: Option<(String, AnimationMode)>,
}

impl Animator {
    /// Animator with no sheet; renders nothing of its own
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(sheet: AnimationSheet) -> Self {
        Self {
            sheet: Some(sheet),
            ..Self::default()
        }
    }

    /// Builder: animation started when the object starts
    pub fn autoplay(mut self, name: &str, mode: AnimationMode) -> Self {
        self.autoplay = Some((name.to_string(), mode));
        self
    }

    pub fn sheet(&self) -> Option<&AnimationSheet> {
        self.sheet.as_ref()
    }

    pub fn set_sheet(&mut self, sheet: AnimationSheet) {
        self.sheet = Some(sheet);
        self.playback = None;
    }

    pub(crate) fn start(&mut self) {
        if let Some((name, mode)) = self.autoplay.clone() {
            if let Err(e) = self.start_animation(&name, mode) {
                warn!("Autoplay failed: {}", e);
            }
        }
    }

    /// Play `name` from its first frame. Timing starts at the next update.
    pub fn start_animation(&mut self, name: &str, mode: AnimationMode) -> Result<()> {
        let range = self
            .sheet
            .as_ref()
            .and_then(|sheet| sheet.animation(name))
            .copied()
            .ok_or_else(|| EngineError::Scene(format!("unknown animation '{}'", name)))?;

        self.playback = Some(Playback {
            name: name.to_string(),
            range,
            mode,
            started_at_ms: 0,
            current_frame: range.start,
        });
        self.stopped = false;
        self.resume_offset = Some(0);
        Ok(())
    }

    /// Name of the animation being played, if any
    pub fn current_animation(&self) -> Option<&str> {
        self.playback.as_ref().map(|p| p.name.as_str())
    }

    pub fn current_frame(&self) -> Option<u32> {
        self.playback.as_ref().map(|p| p.current_frame)
    }

    /// Freeze on the current frame
    pub fn stop_animation(&mut self) {
        self.stopped = true;
        self.resume_offset = None;
    }

    /// Continue from the frame the animation was stopped on
    pub fn continue_animation(&mut self) {
        if !self.stopped {
            return;
        }
        self.stopped = false;
        self.resume_offset = self
            .playback
            .as_ref()
            .map(|p| p.current_frame - p.range.start);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance to the frame matching `now_ms` on the engine clock
    pub(crate) fn update(&mut self, now_ms: u64) {
        if self.stopped {
            return;
        }
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let frame_ms = 1000 / playback.range.fps.max(1) as u64;

        if let Some(offset) = self.resume_offset.take() {
            playback.started_at_ms = now_ms.saturating_sub(offset as u64 * frame_ms);
        }

        let elapsed = now_ms.saturating_sub(playback.started_at_ms);
        let step = elapsed * playback.range.fps as u64 / 1000;
        let count = playback.range.frame_count() as u64;
        let index = match playback.mode {
            AnimationMode::Loop => step % count,
            AnimationMode::Single => step.min(count - 1),
        };
        playback.current_frame = playback.range.start + index as u32;
    }

    /// Source rectangle of the current frame
    pub fn frame_rect(&self) -> Option<Rect> {
        let sheet = self.sheet.as_ref()?;
        let playback = self.playback.as_ref()?;
        Some(sheet.frame_rect(playback.current_frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"{
        "sprite_width": 32,
        "sprite_height": 32,
        "columns": 4,
        "rows": 2,
        "animations": {
            "idle": { "start": 0, "end": 3, "fps": 10 },
            "run":  { "start": 4, "end": 6, "fps": 10 }
        }
    }"#;

    fn animator() -> Animator {
        Animator::with_sheet(AnimationSheet::from_json_str(SHEET).unwrap())
    }

    #[test]
    fn test_parse_sheet() {
        let sheet = AnimationSheet::from_json_str(SHEET).unwrap();
        assert_eq!(sheet.animations.len(), 2);
        assert_eq!(sheet.animation("run").unwrap().frame_count(), 3);
        assert_eq!(sheet.frame_rect(5), Rect::new(32.0, 32.0, 32.0, 32.0));
    }

    #[test]
    fn test_invalid_sheet_rejected() {
        let json = r#"{"sprite_width":8,"sprite_height":8,"columns":2,"rows":1,
            "animations":{"bad":{"start":0,"end":5,"fps":10}}}"#;
        assert!(matches!(
            AnimationSheet::from_json_str(json),
            Err(EngineError::Scene(_))
        ));
        assert!(AnimationSheet::from_json_str("{").is_err());
    }

    #[test]
    fn test_loop_wraps_with_clock() {
        let mut animator = animator();
        animator.start_animation("idle", AnimationMode::Loop).unwrap();
        animator.update(1000);
        assert_eq!(animator.current_frame(), Some(0));

        animator.update(1250);
        assert_eq!(animator.current_frame(), Some(2));

        animator.update(1450);
        assert_eq!(animator.current_frame(), Some(0));
    }

    #[test]
    fn test_single_holds_last_frame() {
        let mut animator = animator();
        animator.start_animation("run", AnimationMode::Single).unwrap();
        animator.update(0);
        animator.update(5000);
        assert_eq!(animator.current_frame(), Some(6));
        assert_eq!(animator.current_animation(), Some("run"));
    }

    #[test]
    fn test_stop_and_continue() {
        let mut animator = animator();
        animator.start_animation("idle", AnimationMode::Loop).unwrap();
        animator.update(0);
        animator.update(100);
        assert_eq!(animator.current_frame(), Some(1));

        animator.stop_animation();
        animator.update(300);
        assert_eq!(animator.current_frame(), Some(1));

        animator.continue_animation();
        animator.update(1000);
        assert_eq!(animator.current_frame(), Some(1));
        animator.update(1100);
        assert_eq!(animator.current_frame(), Some(2));
    }

    #[test]
    fn test_unknown_animation() {
        let mut animator = animator();
        assert!(animator
            .start_animation("fly", AnimationMode::Loop)
            .is_err());
        assert!(Animator::new()
            .start_animation("idle", AnimationMode::Loop)
            .is_err());
        assert!(animator.frame_rect().is_none());
    }

    #[test]
    fn test_autoplay_on_start() {
        let mut animator = animator().autoplay("run", AnimationMode::Loop);
        animator.start();
        assert_eq!(animator.current_animation(), Some("run"));
        assert_eq!(animator.frame_rect(), Some(Rect::new(0.0, 32.0, 32.0, 32.0)));
    }
}
