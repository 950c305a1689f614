//! Player preferences
//!
//! Kept in memory for the session only; nothing is written to storage.

use serde::{Deserialize, Serialize};

/// How much gets drawn per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Next preset in Low, Medium, High order, wrapping around
    pub fn next(self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 96,
            QualityPreset::Medium => 256,
            QualityPreset::High => 512,
        }
    }

    /// Triangles per full circle
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 24,
            QualityPreset::High => 40,
        }
    }

    /// Whether to draw the translucent background circles
    pub fn backdrop_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Session preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Draw the swipe ribbon
    pub trails: bool,
    /// Emit slice and miss sparks
    pub particles: bool,
    pub muted: bool,
    /// 0.0 to 1.0
    pub master_volume: f32,
    /// False once the browser refused to give us an audio context
    pub audio_available: bool,
}

/// Volume change per key press
pub const VOLUME_STEP: f32 = 0.1;

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            particles: true,
            muted: false,
            master_volume: 0.8,
            audio_available: true,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Flip mute, returning the new state. Stays muted without audio.
    pub fn toggle_mute(&mut self) -> bool {
        if !self.audio_available {
            log::info!("Audio unavailable, staying muted");
            self.muted = true;
            return true;
        }
        self.muted = !self.muted;
        log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    /// Record that audio cannot play this session
    pub fn mark_audio_unavailable(&mut self) {
        self.audio_available = false;
        self.muted = true;
    }

    /// Nudge the volume by `delta`, returning the clamped result
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.master_volume = (self.master_volume + delta).clamp(0.0, 1.0);
        log::info!("Volume {:.0}%", self.master_volume * 100.0);
        self.master_volume
    }

    pub fn toggle_trails(&mut self) -> bool {
        self.trails = !self.trails;
        self.trails
    }

    pub fn toggle_particles(&mut self) -> bool {
        self.particles = !self.particles;
        self.particles
    }

    /// Particle cap after the sparks toggle
    pub fn max_particles(&self) -> usize {
        match self.particles {
            true => self.quality.max_particles(),
            false => 0,
        }
    }

    /// Step to the next quality preset, returning it
    pub fn cycle_quality(&mut self) -> QualityPreset {
        self.quality = self.quality.next();
        log::info!("Quality set to {:?}", self.quality);
        self.quality
    }

    /// Glyph for the mute button
    pub fn mute_label(&self) -> &'static str {
        if self.muted { "🔇" } else { "🔊" }
    }
}
