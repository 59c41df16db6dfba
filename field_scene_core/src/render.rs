// field_scene_core/src/render.rs

//! Rendering a synchronized scene through a camera node.
//!
//! Drawing itself is the job of an external [`Renderer`]. This module owns what
//! surrounds it: output defaults, antialiasing negotiation, keeping the camera
//! in the scene only while it is used, and a bounded pool of BGRA pixel buffers.

use crate::error::RenderError;
use crate::scene::graph::SceneGraph;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Options ==
// =========================================================================

/// Multisample antialiasing levels a caller may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Antialiasing {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "2x")]
    Multisample2x,
    #[serde(rename = "4x")]
    Multisample4x,
    #[serde(rename = "8x")]
    Multisample8x,
    #[serde(rename = "16x")]
    Multisample16x,
}

impl Antialiasing {
    pub fn sample_count(self) -> u32 {
        match self {
            Antialiasing::None => 1,
            Antialiasing::Multisample2x => 2,
            Antialiasing::Multisample4x => 4,
            Antialiasing::Multisample8x => 8,
            Antialiasing::Multisample16x => 16,
        }
    }
}

/// The sample count to render with: the requested one, halved until
/// `supports` accepts it. One sample is always accepted.
pub fn resolve_sample_count(antialiasing: Antialiasing, supports: impl Fn(u32) -> bool) -> u32 {
    let requested = antialiasing.sample_count();
    let mut samples = requested;
    while samples > 1 && !supports(samples) {
        samples /= 2;
    }
    if samples != requested {
        log::debug!(
            "{} samples per pixel unsupported, rendering with {}",
            requested,
            samples
        );
    }
    samples
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub antialiasing: Antialiasing,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            antialiasing: Antialiasing::None,
        }
    }
}

// =========================================================================
// == Pixel Buffers ==
// =========================================================================

/// A tightly packed 8-bit BGRA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// A fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * Self::BYTES_PER_PIXEL],
        }
    }

    /// Wraps existing BGRA bytes, checking they cover `width` x `height`.
    pub fn from_bgra(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RenderError> {
        if data.len() != width as usize * height as usize * Self::BYTES_PER_PIXEL {
            return Err(RenderError::InvalidBuffer {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Fills every pixel with one BGRA value.
    pub fn fill(&mut self, bgra: [u8; 4]) {
        for pixel in self.data.chunks_exact_mut(Self::BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&bgra);
        }
    }

    /// Converts to an RGBA image, swapping the blue and red channels.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, RenderError> {
        let mut rgba = self.data.clone();
        for pixel in rgba.chunks_exact_mut(Self::BYTES_PER_PIXEL) {
            pixel.swap(0, 2);
        }
        RgbaImage::from_raw(self.width, self.height, rgba).ok_or(RenderError::InvalidBuffer {
            width: self.width,
            height: self.height,
            len: self.data.len(),
        })
    }
}

pub const DEFAULT_POOL_CAPACITY: usize = 30;

/// A bounded set of same-sized pixel buffers.
///
/// At most `capacity` buffers are handed out at once. Buffers come back through
/// [`PixelBufferPool::recycle`] and are reused instead of reallocated.
#[derive(Debug)]
pub struct PixelBufferPool {
    width: u32,
    height: u32,
    capacity: usize,
    free: Vec<PixelBuffer>,
    outstanding: usize,
}

impl PixelBufferPool {
    pub fn new(width: u32, height: u32, capacity: usize) -> Self {
        assert!(capacity > 0, "a pixel buffer pool needs room for at least one buffer");
        Self {
            width,
            height,
            capacity,
            free: Vec::new(),
            outstanding: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffers handed out and not yet recycled.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn acquire(&mut self) -> Result<PixelBuffer, RenderError> {
        if self.outstanding >= self.capacity {
            return Err(RenderError::PoolExhausted {
                capacity: self.capacity,
            });
        }
        self.outstanding += 1;
        Ok(self
            .free
            .pop()
            .unwrap_or_else(|| PixelBuffer::new(self.width, self.height)))
    }

    /// Returns a buffer obtained from [`acquire`](Self::acquire).
    ///
    /// Buffers of other dimensions are dropped rather than pooled.
    pub fn recycle(&mut self, buffer: PixelBuffer) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if (buffer.width, buffer.height) == (self.width, self.height)
            && self.free.len() < self.capacity
        {
            self.free.push(buffer);
        }
    }

    /// Changes the dimensions of future buffers, discarding pooled ones.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.free.clear();
        }
    }
}

// =========================================================================
// == Rendering ==
// =========================================================================

/// Something that can draw a scene graph from one of its camera nodes.
pub trait Renderer<G: SceneGraph + ?Sized> {
    fn supports_sample_count(&self, samples: u32) -> bool;

    /// Draws `scene` as seen from `point_of_view` into `target`.
    ///
    /// The camera node is attached for the duration of the call.
    fn draw(
        &mut self,
        scene: &G,
        point_of_view: G::Node,
        target: &mut PixelBuffer,
        sample_count: u32,
    ) -> Result<(), RenderError>;
}

/// Attaches `camera`, draws, then detaches it whatever the outcome.
fn draw_through<G, R>(
    scene: &mut G,
    renderer: &mut R,
    camera: G::Node,
    target: &mut PixelBuffer,
    antialiasing: Antialiasing,
) -> Result<(), RenderError>
where
    G: SceneGraph + ?Sized,
    R: Renderer<G> + ?Sized,
{
    let samples = resolve_sample_count(antialiasing, |n| renderer.supports_sample_count(n));
    scene.attach(camera);
    let result = renderer.draw(scene, camera, target, samples);
    scene.detach(camera);
    result
}

/// Renders one image of `scene` through `camera` with a freshly allocated
/// buffer.
pub fn render_image<G, R>(
    scene: &mut G,
    renderer: &mut R,
    camera: G::Node,
    options: &RenderOptions,
) -> Result<RgbaImage, RenderError>
where
    G: SceneGraph + ?Sized,
    R: Renderer<G> + ?Sized,
{
    let mut buffer = PixelBuffer::new(options.width, options.height);
    draw_through(scene, renderer, camera, &mut buffer, options.antialiasing)?;
    buffer.to_rgba_image()
}

/// A renderer paired with its output options and a pixel buffer pool.
#[derive(Debug)]
pub struct FieldRenderer<R> {
    renderer: R,
    options: RenderOptions,
    pool: PixelBufferPool,
}

impl<R> FieldRenderer<R> {
    pub fn new(renderer: R, options: RenderOptions) -> Self {
        Self::with_pool_capacity(renderer, options, DEFAULT_POOL_CAPACITY)
    }

    pub fn with_pool_capacity(renderer: R, options: RenderOptions, capacity: usize) -> Self {
        Self {
            pool: PixelBufferPool::new(options.width, options.height, capacity),
            renderer,
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.pool.resize(options.width, options.height);
        self.options = options;
    }

    pub fn pool(&self) -> &PixelBufferPool {
        &self.pool
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Hands a buffer from [`render_pixel_buffer`](Self::render_pixel_buffer)
    /// back to the pool.
    pub fn recycle(&mut self, buffer: PixelBuffer) {
        self.pool.recycle(buffer);
    }

    /// Renders into a pooled buffer. The caller must [`recycle`](Self::recycle)
    /// it once done.
    pub fn render_pixel_buffer<G>(
        &mut self,
        scene: &mut G,
        camera: G::Node,
    ) -> Result<PixelBuffer, RenderError>
    where
        G: SceneGraph + ?Sized,
        R: Renderer<G>,
    {
        let mut buffer = self.pool.acquire()?;
        match draw_through(
            scene,
            &mut self.renderer,
            camera,
            &mut buffer,
            self.options.antialiasing,
        ) {
            Ok(()) => Ok(buffer),
            Err(err) => {
                self.pool.recycle(buffer);
                Err(err)
            }
        }
    }

    pub fn render_image<G>(&mut self, scene: &mut G, camera: G::Node) -> Result<RgbaImage, RenderError>
    where
        G: SceneGraph + ?Sized,
        R: Renderer<G>,
    {
        let buffer = self.render_pixel_buffer(scene, camera)?;
        let image = buffer.to_rgba_image();
        self.pool.recycle(buffer);
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{FieldCamera, Perspective};
    use crate::field::Field;
    use crate::scene::memory::{MemoryScene, NodeId};

    const BLUE_BGRA: [u8; 4] = [255, 0, 0, 255];

    /// Paints the target blue and records what the scene looked like.
    struct RecordingRenderer {
        supported: Vec<u32>,
        fail: bool,
        draws: Vec<(u32, bool)>,
    }

    impl RecordingRenderer {
        fn new(supported: &[u32]) -> Self {
            Self {
                supported: supported.to_vec(),
                fail: false,
                draws: Vec::new(),
            }
        }
    }

    impl Renderer<MemoryScene> for RecordingRenderer {
        fn supports_sample_count(&self, samples: u32) -> bool {
            self.supported.contains(&samples)
        }

        fn draw(
            &mut self,
            scene: &MemoryScene,
            point_of_view: NodeId,
            target: &mut PixelBuffer,
            sample_count: u32,
        ) -> Result<(), RenderError> {
            self.draws.push((sample_count, scene.is_attached(point_of_view)));
            if self.fail {
                return Err(RenderError::Backend("device lost".to_string()));
            }
            target.fill(BLUE_BGRA);
            Ok(())
        }
    }

    fn scene_with_camera() -> (MemoryScene, NodeId) {
        let mut scene = MemoryScene::default();
        let camera = FieldCamera::new(&mut scene, Perspective::Sky, &Field::default());
        (scene, camera.node())
    }

    fn small(antialiasing: Antialiasing) -> RenderOptions {
        RenderOptions {
            width: 4,
            height: 2,
            antialiasing,
        }
    }

    #[test]
    fn defaults_are_full_hd_without_antialiasing() {
        let options = RenderOptions::default();
        assert_eq!((options.width, options.height), (1920, 1080));
        assert_eq!(options.antialiasing, Antialiasing::None);
    }

    #[test]
    fn sample_count_is_halved_until_supported() {
        let supported = [1, 2, 4];
        let supports = |n: u32| supported.contains(&n);
        assert_eq!(resolve_sample_count(Antialiasing::Multisample16x, supports), 4);
        assert_eq!(resolve_sample_count(Antialiasing::Multisample2x, supports), 2);
        assert_eq!(resolve_sample_count(Antialiasing::Multisample8x, |_| false), 1);
        assert_eq!(resolve_sample_count(Antialiasing::None, |_| false), 1);
    }

    #[test]
    fn camera_is_attached_only_while_drawing() {
        let (mut scene, camera) = scene_with_camera();
        let mut renderer = RecordingRenderer::new(&[1, 2, 4, 8]);

        let image = render_image(
            &mut scene,
            &mut renderer,
            camera,
            &small(Antialiasing::Multisample16x),
        )
        .unwrap();

        assert_eq!(renderer.draws, vec![(8, true)]);
        assert!(!scene.is_attached(camera));
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(3, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn failing_render_still_detaches_camera_and_returns_buffer() {
        let (mut scene, camera) = scene_with_camera();
        let mut renderer = RecordingRenderer::new(&[1]);
        renderer.fail = true;
        let mut field_renderer = FieldRenderer::new(renderer, small(Antialiasing::None));

        let result = field_renderer.render_image(&mut scene, camera);

        assert!(matches!(result, Err(RenderError::Backend(_))));
        assert!(!scene.is_attached(camera));
        assert_eq!(field_renderer.pool().outstanding(), 0);
        assert_eq!(field_renderer.renderer().draws, vec![(1, true)]);
    }

    #[test]
    fn pool_exhaustion_is_reported_until_a_buffer_returns() {
        let (mut scene, camera) = scene_with_camera();
        let mut field_renderer =
            FieldRenderer::with_pool_capacity(RecordingRenderer::new(&[1]), small(Antialiasing::None), 2);

        let first = field_renderer.render_pixel_buffer(&mut scene, camera).unwrap();
        let _second = field_renderer.render_pixel_buffer(&mut scene, camera).unwrap();
        match field_renderer.render_pixel_buffer(&mut scene, camera) {
            Err(RenderError::PoolExhausted { capacity }) => assert_eq!(capacity, 2),
            other => panic!("expected pool exhaustion, got {:?}", other),
        }

        assert_eq!(first.as_bytes()[..4], BLUE_BGRA);
        field_renderer.recycle(first);
        assert!(field_renderer.render_pixel_buffer(&mut scene, camera).is_ok());
    }

    #[test]
    fn resizing_drops_pooled_buffers_of_the_old_size() {
        let mut pool = PixelBufferPool::new(4, 2, DEFAULT_POOL_CAPACITY);
        let buffer = pool.acquire().unwrap();
        pool.resize(8, 8);
        pool.recycle(buffer);

        let fresh = pool.acquire().unwrap();
        assert_eq!((fresh.width(), fresh.height()), (8, 8));
        assert_eq!(fresh.bytes_per_row(), 32);
    }

    #[test]
    fn short_buffers_are_rejected() {
        match PixelBuffer::from_bgra(2, 2, vec![0; 15]) {
            Err(RenderError::InvalidBuffer { width, height, len }) => {
                assert_eq!((width, height, len), (2, 2, 15));
            }
            other => panic!("expected an invalid buffer error, got {:?}", other),
        }
    }
}
