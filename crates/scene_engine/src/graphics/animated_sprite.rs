//! Animated sprite - a sprite that steps through texture regions over time

use crate::core::SceneError;
use crate::foundation::math::{Mat4, Vec3};
use crate::graphics::effect::Effect;
use crate::graphics::sprite::Sprite;
use crate::graphics::texture::TextureInfo;
use crate::scene::{DrawableEntity, Entity, UpdateableEntity};

/// Horizontal mirror in progress
#[derive(Debug, Clone, Copy)]
struct Swap {
    duration: f32,
    remaining: f32,
    start: f32,
    end: f32,
}

/// Sprite cycling through frames at a fixed rate
///
/// The animation loops with period `frame_count / frame_rate`. Each update
/// shows the last frame whose start time lies strictly before the current
/// animation time.
#[derive(Debug, Clone)]
pub struct AnimatedSprite {
    sprite: Sprite,
    frames: Vec<TextureInfo>,
    frame_rate: f32,
    animation_time: f32,
    current_frame: Option<usize>,
    swap: Option<Swap>,
}

impl AnimatedSprite {
    /// Create an animation from frames played at `frame_rate` frames per second
    pub fn new(frames: Vec<TextureInfo>, frame_rate: f32) -> Self {
        let sprite = match frames.first() {
            Some(first) => Sprite::from_texture_info(first),
            None => Sprite::new(None),
        };

        Self { sprite, frames, frame_rate, animation_time: 0.0, current_frame: None, swap: None }
    }

    /// Underlying sprite
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    /// Mutable underlying sprite
    pub fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    /// Frames in playback order
    pub fn frames(&self) -> &[TextureInfo] {
        &self.frames
    }

    /// Append a frame
    pub fn push_frame(&mut self, frame: TextureInfo) {
        self.frames.push(frame);
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Change the playback rate
    pub fn set_frame_rate(&mut self, frame_rate: f32) {
        self.frame_rate = frame_rate;
    }

    /// Length of one loop in seconds, or zero when nothing can play
    #[allow(clippy::cast_precision_loss)]
    pub fn animation_length(&self) -> f32 {
        if self.frames.is_empty() || self.frame_rate <= 0.0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.frame_rate
    }

    /// Index of the frame currently shown
    pub fn current_frame(&self) -> Option<usize> {
        self.current_frame
    }

    /// Whether a swap is still moving the sprite
    pub fn is_swapping(&self) -> bool {
        self.swap.is_some()
    }

    /// Mirror the X position about the origin over `duration` seconds
    ///
    /// Ignored while X is zero or another swap is running.
    pub fn swap(&mut self, duration: f32) {
        let x = self.sprite.transform().x();
        if x == 0.0 || self.swap.is_some() {
            return;
        }

        self.swap = Some(Swap { duration, remaining: duration, start: x, end: -x });
    }

    #[allow(clippy::cast_precision_loss)]
    fn advance_animation(&mut self, delta: f32) {
        let length = self.animation_length();
        if length <= 0.0 {
            return;
        }

        self.animation_time = (self.animation_time + delta) % length;
        let frame_duration = 1.0 / self.frame_rate;

        for index in 0..self.frames.len() {
            if self.animation_time <= frame_duration * index as f32 {
                break;
            }
            self.current_frame = Some(index);
        }

        if let Some(frame) = self.current_frame.and_then(|index| self.frames.get(index)) {
            self.sprite.set_texture_coordinates(frame.left, frame.top, frame.right, frame.bottom);
            self.sprite.set_texture(frame.texture.clone());
        }
    }

    fn advance_swap(&mut self, delta: f32) {
        let Some(mut swap) = self.swap else {
            return;
        };

        let transform = self.sprite.transform_mut();
        if swap.duration <= 0.0 {
            transform.set_x(swap.end);
            self.swap = None;
            return;
        }

        transform.set_x(transform.x() - (swap.start - swap.end) / swap.duration * delta);
        swap.remaining -= delta;

        if swap.remaining <= 0.0 {
            transform.set_x(swap.end);
            self.swap = None;
        } else {
            self.swap = Some(swap);
        }
    }
}

impl Entity for AnimatedSprite {
    fn name(&self) -> &str {
        self.sprite.name()
    }

    fn time_created(&self) -> f32 {
        self.sprite.time_created()
    }
}

impl UpdateableEntity for AnimatedSprite {
    fn enable_updates(&self) -> bool {
        self.sprite.enable_updates()
    }

    fn update(&mut self, delta: f32) {
        self.advance_animation(delta);
        self.advance_swap(delta);
        self.sprite.update(delta);
    }
}

impl DrawableEntity for AnimatedSprite {
    fn position(&self) -> Vec3 {
        self.sprite.position()
    }

    fn enable_drawing(&self) -> bool {
        self.sprite.enable_drawing()
    }

    fn draw(&mut self, effect: &mut dyn Effect) {
        self.sprite.draw(effect);
    }

    fn is_in_view(&self, view: &Mat4, projection: &Mat4) -> Result<bool, SceneError> {
        self.sprite.is_in_view(view, projection)
    }
}
