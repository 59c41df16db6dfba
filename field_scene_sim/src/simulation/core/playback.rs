// field_scene_sim/src/simulation/core/playback.rs

use bevy::prelude::*;
use field_scene_core::field::Field;
use std::time::Duration;

use crate::simulation::config::{PlaybackConfig, ScenarioConfig};

const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// The scenario timeline and the position of the playhead.
#[derive(Resource, Debug, Clone)]
pub struct Playback {
    frames: Vec<Field>,
    current: usize,
    timer: Timer,
    looping: bool,
    transition: Duration,
    finished: bool,
}

impl Playback {
    pub fn new(frames: Vec<Field>, config: &PlaybackConfig) -> Self {
        let frames = if frames.is_empty() {
            vec![Field::default()]
        } else {
            frames
        };
        Self {
            frames,
            current: 0,
            timer: Timer::new(
                config.frame_interval_seconds.max(MIN_FRAME_INTERVAL),
                TimerMode::Repeating,
            ),
            looping: config.looping,
            transition: config.transition_seconds,
            finished: false,
        }
    }

    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        Self::new(scenario.frames.clone(), &scenario.playback)
    }

    pub fn current(&self) -> &Field {
        &self.frames[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration for pose changes between two frames.
    pub fn transition(&self) -> Duration {
        self.transition
    }

    /// True once a non-looping timeline has shown its last frame.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Moves the playhead by `delta` of wall time.
    ///
    /// Returns the frame to show if the playhead landed on a different frame.
    /// Several intervals elapsing at once skip straight to the latest frame.
    pub fn advance(&mut self, delta: Duration) -> Option<&Field> {
        if self.finished || self.frames.len() < 2 {
            return None;
        }
        self.timer.tick(delta);
        let steps = self.timer.times_finished_this_tick() as usize;
        if steps == 0 {
            return None;
        }

        let last = self.frames.len() - 1;
        let next = if self.looping {
            (self.current + steps) % self.frames.len()
        } else {
            (self.current + steps).min(last)
        };
        if !self.looping && next == last {
            self.finished = true;
        }
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(&self.frames[next])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_scene_core::field::BallState;

    fn frames(count: usize) -> Vec<Field> {
        (0..count)
            .map(|i| Field {
                ball: Some(BallState::on_ground(i as f64, 0.0)),
                ..Default::default()
            })
            .collect()
    }

    fn config(looping: bool) -> PlaybackConfig {
        PlaybackConfig {
            frame_interval_seconds: Duration::from_millis(100),
            transition_seconds: Duration::from_millis(50),
            looping,
        }
    }

    fn ball_x(field: Option<&Field>) -> Option<f64> {
        field.and_then(|f| f.ball).map(|b| b.position.x)
    }

    #[test]
    fn steps_once_per_interval() {
        let mut playback = Playback::new(frames(3), &config(true));
        assert_eq!(playback.advance(Duration::from_millis(60)), None);
        assert_eq!(ball_x(playback.advance(Duration::from_millis(60))), Some(1.0));
        assert_eq!(playback.index(), 1);
        assert_eq!(playback.transition(), Duration::from_millis(50));
    }

    #[test]
    fn looping_wraps_around() {
        let mut playback = Playback::new(frames(3), &config(true));
        assert_eq!(ball_x(playback.advance(Duration::from_millis(200))), Some(2.0));
        assert_eq!(ball_x(playback.advance(Duration::from_millis(100))), Some(0.0));
        assert!(!playback.is_finished());
    }

    #[test]
    fn non_looping_stops_on_the_last_frame() {
        let mut playback = Playback::new(frames(3), &config(false));
        assert_eq!(ball_x(playback.advance(Duration::from_millis(250))), Some(2.0));
        assert!(playback.is_finished());
        assert_eq!(playback.advance(Duration::from_secs(1)), None);
        assert_eq!(playback.index(), 2);
    }

    #[test]
    fn empty_timeline_shows_an_empty_pitch() {
        let mut playback = Playback::new(Vec::new(), &config(true));
        assert_eq!(playback.len(), 1);
        assert_eq!(playback.current(), &Field::default());
        assert_eq!(playback.advance(Duration::from_secs(5)), None);
    }
}
