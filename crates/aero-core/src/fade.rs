//! Background music loop with stepped fades.
//!
//! [`MusicLoop`] is a pure scheduler: the host feeds it media events and
//! clock ticks and executes the [`MediaCommand`]s it returns against a real
//! audio element. Keeping it free of platform types lets the timing be tested
//! on the host.

use smallvec::SmallVec;

pub const FADE_DURATION_MS: f64 = 5000.0;
pub const FADE_STEPS: u32 = 40;
pub const LOOP_GAP_MS: f64 = 5000.0;
pub const MUSIC_VOLUME: f64 = 0.1;
pub const EFFECT_VOLUME: f64 = 0.3;
pub const MENU_EXTRA_DELAY_MS: i32 = 200;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeConfig {
    pub fade_ms: f64,
    pub steps: u32,
    pub gap_ms: f64,
    pub target_volume: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            fade_ms: FADE_DURATION_MS,
            steps: FADE_STEPS,
            gap_ms: LOOP_GAP_MS,
            target_volume: MUSIC_VOLUME,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaCommand {
    Play,
    Pause,
    Rewind,
    SetVolume(f64),
}

pub type Commands = SmallVec<[MediaCommand; 4]>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Fade {
    None,
    In { started_ms: f64 },
    Out { started_ms: f64, from: f64, pause_after: bool },
}

#[derive(Debug)]
pub struct MusicLoop {
    config: FadeConfig,
    looping: bool,
    audible: bool,
    user_interacted: bool,
    awaiting_gesture: bool,
    faded_out_this_pass: bool,
    volume: f64,
    fade: Fade,
    next_play_at: Option<f64>,
}

impl Default for MusicLoop {
    fn default() -> Self {
        Self::new(FadeConfig::default())
    }
}

impl MusicLoop {
    pub fn new(config: FadeConfig) -> Self {
        Self {
            config,
            looping: false,
            audible: false,
            user_interacted: false,
            awaiting_gesture: false,
            faded_out_this_pass: false,
            volume: 0.0,
            fade: Fade::None,
            next_play_at: None,
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn target_volume(&self) -> f64 {
        self.config.target_volume
    }

    pub fn awaiting_gesture(&self) -> bool {
        self.awaiting_gesture
    }

    pub fn is_fading(&self) -> bool {
        self.fade != Fade::None
    }

    /// Whether the host should keep calling [`MusicLoop::tick`].
    pub fn needs_tick(&self) -> bool {
        self.is_fading() || self.next_play_at.is_some()
    }

    fn begin_play(&mut self) -> Commands {
        self.volume = 0.0;
        self.faded_out_this_pass = false;
        self.awaiting_gesture = false;
        let mut out = Commands::new();
        out.push(MediaCommand::SetVolume(0.0));
        out.push(MediaCommand::Rewind);
        out.push(MediaCommand::Play);
        out
    }

    pub fn start(&mut self) -> Commands {
        if self.looping {
            return Commands::new();
        }
        self.looping = true;
        if self.user_interacted {
            self.begin_play()
        } else {
            self.awaiting_gesture = true;
            log::debug!("[music] waiting for a user gesture before playing");
            Commands::new()
        }
    }

    pub fn stop(&mut self, now_ms: f64) -> Commands {
        self.looping = false;
        self.next_play_at = None;
        self.awaiting_gesture = false;
        if self.audible {
            self.fade = Fade::Out {
                started_ms: now_ms,
                from: self.volume,
                pause_after: true,
            };
        }
        Commands::new()
    }

    /// First pointer/key/touch interaction on the page.
    pub fn user_gesture(&mut self) -> Commands {
        self.user_interacted = true;
        if self.awaiting_gesture && self.looping {
            self.begin_play()
        } else {
            Commands::new()
        }
    }

    /// The play request resolved.
    pub fn play_started(&mut self, now_ms: f64) {
        self.audible = true;
        if self.looping {
            self.fade = Fade::In { started_ms: now_ms };
        }
    }

    /// The play request was rejected. Autoplay blocks park the loop until
    /// the next gesture; anything else is logged and dropped.
    pub fn play_failed(&mut self, autoplay_blocked: bool) {
        if autoplay_blocked {
            log::warn!("[music] autoplay blocked, will start on first interaction");
            self.awaiting_gesture = true;
            self.user_interacted = false;
        } else {
            log::error!("[music] playback failed");
        }
    }

    /// Playback position update; starts the tail fade near the end.
    pub fn time_update(&mut self, now_ms: f64, position_s: f64, duration_s: f64) {
        if !self.looping || self.faded_out_this_pass || !duration_s.is_finite() || duration_s <= 0.0 {
            return;
        }
        if position_s >= duration_s - self.config.fade_ms / 1000.0 {
            self.faded_out_this_pass = true;
            self.fade = Fade::Out {
                started_ms: now_ms,
                from: self.volume,
                pause_after: false,
            };
        }
    }

    pub fn ended(&mut self, now_ms: f64) {
        self.audible = false;
        if self.looping {
            self.next_play_at = Some(now_ms + self.config.gap_ms);
        }
    }

    pub fn set_volume(&mut self, volume: f64) -> Commands {
        let v = volume.clamp(0.0, 1.0);
        self.config.target_volume = v;
        self.volume = v;
        let mut out = Commands::new();
        out.push(MediaCommand::SetVolume(v));
        out
    }

    fn step_index(&self, started_ms: f64, now_ms: f64) -> u32 {
        let steps = self.config.steps.max(1);
        let step_ms = self.config.fade_ms / steps as f64;
        let n = ((now_ms - started_ms) / step_ms).floor().max(0.0) as u32;
        n.min(steps)
    }

    /// Advance fades and the re-play timer.
    pub fn tick(&mut self, now_ms: f64) -> Commands {
        let mut out = Commands::new();
        if let Some(at) = self.next_play_at {
            if now_ms >= at {
                self.next_play_at = None;
                if self.looping {
                    out.extend(self.begin_play());
                }
            }
        }
        let steps = self.config.steps.max(1);
        match self.fade {
            Fade::None => {}
            Fade::In { started_ms } => {
                if !self.looping {
                    self.fade = Fade::None;
                    return out;
                }
                let n = self.step_index(started_ms, now_ms);
                let target = self.config.target_volume;
                let v = if n >= steps {
                    self.fade = Fade::None;
                    target
                } else {
                    (n as f64 * target / steps as f64).min(target)
                };
                if v != self.volume {
                    self.volume = v;
                    out.push(MediaCommand::SetVolume(v));
                }
            }
            Fade::Out {
                started_ms,
                from,
                pause_after,
            } => {
                let n = self.step_index(started_ms, now_ms);
                let v = (from - n as f64 * from / steps as f64).max(0.0);
                if n >= steps || v <= 0.0 {
                    self.fade = Fade::None;
                    self.volume = 0.0;
                    out.push(MediaCommand::SetVolume(0.0));
                    if pause_after {
                        self.audible = false;
                        out.push(MediaCommand::Pause);
                        out.push(MediaCommand::Rewind);
                    }
                } else if v != self.volume {
                    self.volume = v;
                    out.push(MediaCommand::SetVolume(v));
                }
            }
        }
        out
    }
}
