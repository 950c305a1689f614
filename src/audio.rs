//! Slice and miss sounds, synthesized with Web Audio
//!
//! Every sound is built from oscillators on demand and left to stop itself.

use web_sys::{AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

use crate::sim::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEffect {
    /// Note sliced, pitched by where it was cut
    Pluck { frequency: f32 },
    /// Note fell out unsliced
    Miss,
}

impl SoundEffect {
    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Sliced { frequency, .. } => Some(SoundEffect::Pluck {
                frequency: *frequency,
            }),
            GameEvent::Missed { .. } => Some(SoundEffect::Miss),
            GameEvent::GameOver { .. } => None,
        }
    }
}

/// Owns the audio context and the volume controls
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Context creation failed once; never retried
    unavailable: bool,
    volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            ctx: None,
            unavailable: false,
            volume: 0.8,
            muted: false,
        }
    }

    /// Create the audio context on first use (browsers want a user gesture first)
    fn ensure_context(&mut self) -> Option<&AudioContext> {
        if self.ctx.is_none() && !self.unavailable {
            match AudioContext::new() {
                Ok(ctx) => self.ctx = Some(ctx),
                Err(e) => {
                    log::warn!("No AudioContext ({:?}), staying silent", e);
                    self.unavailable = true;
                }
            }
        }
        self.ctx.as_ref()
    }

    /// False once the context could not be created
    pub fn is_available(&self) -> bool {
        !self.unavailable
    }

    /// Prime the context from a user gesture
    pub fn resume(&mut self) {
        if let Some(ctx) = self.ensure_context() {
            let _ = ctx.resume();
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Fire and forget; does nothing while muted
    pub fn play(&mut self, effect: SoundEffect) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let vol = self.volume;
        let Some(ctx) = self.ensure_context() else {
            return;
        };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Pluck { frequency } => play_pluck(ctx, frequency, vol),
            SoundEffect::Miss => play_miss(ctx, vol),
        }
    }
}

/// Oscillator wired through its own gain to the speakers
fn voice(ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
    let (osc, gain) = (ctx.create_oscillator().ok()?, ctx.create_gain().ok()?);
    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain)
        .and_then(|_| gain.connect_with_audio_node(&ctx.destination()))
        .ok()?;
    Some((osc, gain))
}

/// Pluck - sine through a resonant bandpass, fast attack and half-second tail
fn play_pluck(ctx: &AudioContext, frequency: f32, vol: f32) {
    let (Ok(osc), Ok(filter), Ok(gain)) = (
        ctx.create_oscillator(),
        ctx.create_biquad_filter(),
        ctx.create_gain(),
    ) else {
        return;
    };
    let t = ctx.current_time();

    osc.set_type(OscillatorType::Sine);
    osc.frequency().set_value(frequency);
    filter.set_type(BiquadFilterType::Bandpass);
    filter.frequency().set_value(frequency * 1.8);
    filter.q().set_value(4.0);

    if osc.connect_with_audio_node(&filter).is_err()
        || filter.connect_with_audio_node(&gain).is_err()
        || gain.connect_with_audio_node(&ctx.destination()).is_err()
    {
        return;
    }

    let level = gain.gain();
    let _ = level.set_value_at_time(0.0001, t);
    let _ = level.exponential_ramp_to_value_at_time(0.5 * vol, t + 0.01);
    let _ = level.exponential_ramp_to_value_at_time(0.001, t + 0.5);
    let _ = osc.start_with_when(t);
    let _ = osc.stop_with_when(t + 0.5);
}

/// Miss - low square buzz
fn play_miss(ctx: &AudioContext, vol: f32) {
    let Some((osc, gain)) = voice(ctx, 120.0, OscillatorType::Square) else {
        return;
    };
    let t = ctx.current_time();
    let level = gain.gain();
    let _ = level.set_value_at_time(0.2 * vol, t);
    let _ = level.exponential_ramp_to_value_at_time(0.001, t + 0.5);
    let _ = osc.start_with_when(t);
    let _ = osc.stop_with_when(t + 0.6);
}
