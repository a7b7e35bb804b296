//! Audio system using Web Audio API
//!
//! Procedurally generated blips and chimes. Every Web Audio call may fail
//! (no AudioContext, autoplay policy); failures are ignored and the page
//! stays silent.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::session::SessionEffect;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Memory card turned over
    CardFlip,
    /// Pair found
    PairMatch,
    /// Pair did not match
    PairMiss,
    /// Memory round cleared
    RoundWon,
    /// Reaction target appeared
    TargetShown,
    /// Reaction target clicked
    ReactionHit,
    /// New personal best
    NewRecord,
    /// Achievement unlocked
    Achievement,
    /// Secret code accepted
    Secret,
}

impl SoundEffect {
    /// Sound for a session effect, if it has one
    pub fn for_effect(effect: &SessionEffect) -> Option<Self> {
        match effect {
            SessionEffect::Game(event) => match event {
                GameEvent::CardRevealed { .. } => Some(SoundEffect::CardFlip),
                GameEvent::PairMatched { .. } => Some(SoundEffect::PairMatch),
                GameEvent::PairMismatched { .. } => Some(SoundEffect::PairMiss),
                GameEvent::RoundWon { .. } => Some(SoundEffect::RoundWon),
                GameEvent::TargetShown => Some(SoundEffect::TargetShown),
                GameEvent::ReactionRecorded { .. } => Some(SoundEffect::ReactionHit),
                GameEvent::PairReverted { .. } | GameEvent::FlipsUnlocked => None,
            },
            SessionEffect::AchievementUnlocked(_) => Some(SoundEffect::Achievement),
            SessionEffect::NewReactionBest { .. } | SessionEffect::NewMemoryBest { .. } => {
                Some(SoundEffect::NewRecord)
            }
            SessionEffect::MatrixRain { .. } | SessionEffect::Party => Some(SoundEffect::Secret),
            SessionEffect::MatrixEnded
            | SessionEffect::ProgressReset
            | SessionEffect::NotificationExpired { .. } => None,
        }
    }
}

/// Audio manager for the page
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl AudioManager {
    pub fn new(volume: f32) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Set volume (0.0 - 1.0); 0 mutes
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::CardFlip => {
                self.tone(ctx, 520.0, 0.06, OscillatorType::Triangle, vol * 0.3)
            }
            SoundEffect::PairMatch => self.arpeggio(ctx, &[660.0, 880.0], 0.08, vol * 0.35),
            SoundEffect::PairMiss => self.sweep(ctx, 300.0, 150.0, 0.18, vol * 0.3),
            SoundEffect::RoundWon => {
                self.arpeggio(ctx, &[523.0, 659.0, 784.0, 1047.0], 0.12, vol * 0.4)
            }
            SoundEffect::TargetShown => {
                self.tone(ctx, 880.0, 0.1, OscillatorType::Square, vol * 0.2)
            }
            SoundEffect::ReactionHit => self.sweep(ctx, 400.0, 1200.0, 0.1, vol * 0.3),
            SoundEffect::NewRecord => self.arpeggio(ctx, &[784.0, 988.0, 1175.0], 0.1, vol * 0.4),
            SoundEffect::Achievement => {
                self.arpeggio(ctx, &[587.0, 740.0, 880.0, 1175.0], 0.09, vol * 0.35)
            }
            SoundEffect::Secret => self.sweep(ctx, 80.0, 2400.0, 0.5, vol * 0.25),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Single decaying tone
    fn tone(&self, ctx: &AudioContext, freq: f32, len: f64, osc_type: OscillatorType, vol: f32) {
        self.tone_at(ctx, freq, ctx.current_time(), len, osc_type, vol);
    }

    fn tone_at(
        &self,
        ctx: &AudioContext,
        freq: f32,
        t: f64,
        len: f64,
        osc_type: OscillatorType,
        vol: f32,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };

        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain().linear_ramp_to_value_at_time(vol, t + 0.01).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + len + 0.02).ok();
    }

    /// Rising notes, one after another
    fn arpeggio(&self, ctx: &AudioContext, notes: &[f32], step: f64, vol: f32) {
        let t = ctx.current_time();
        for (i, &freq) in notes.iter().enumerate() {
            let start = t + i as f64 * step;
            self.tone_at(ctx, freq, start, step * 1.5, OscillatorType::Sine, vol);
        }
    }

    /// Frequency glide
    fn sweep(&self, ctx: &AudioContext, from: f32, to: f32, len: f64, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + len)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + len + 0.02).ok();
    }
}
