//! # Turntable Preview
//!
//! Spins a finished mesh the way the demo viewer does: `+0.01` rad around
//! x and around y every frame, applied in x-then-y Euler order. There is no
//! GPU here; each frame transforms every vertex on the CPU and tracks the
//! rotated bounds, which is enough to time the per-frame cost and confirm
//! the mesh stays centred.

use std::time::{Duration, Instant};

use voxsphere_mesh::MergedMesh;

/// Rotation added around x and y each frame, in radians.
pub const ROTATION_STEP: f32 = 0.01;

/// Frame rate the preview aims for.
pub const TARGET_FPS: f32 = 60.0;

/// Row-major 3x3 rotation.
pub type Mat3 = [[f32; 3]; 3];

/// Accumulates the model rotation frame by frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Turntable {
    rotation_x: f32,
    rotation_y: f32,
    step: f32,
    frame: u64,
}

impl Default for Turntable {
    fn default() -> Self {
        Self::new(ROTATION_STEP)
    }
}

impl Turntable {
    /// Creates a turntable that turns by `step` radians per frame.
    #[must_use]
    pub const fn new(step: f32) -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            step,
            frame: 0,
        }
    }

    /// Advances one frame.
    pub fn advance(&mut self) {
        self.rotation_x += self.step;
        self.rotation_y += self.step;
        self.frame += 1;
    }

    /// Rotation around x so far.
    #[must_use]
    pub const fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    /// Rotation around y so far.
    #[must_use]
    pub const fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Frames advanced.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Model rotation `Rx * Ry`.
    #[must_use]
    pub fn model_matrix(&self) -> Mat3 {
        let (sx, cx) = self.rotation_x.sin_cos();
        let (sy, cy) = self.rotation_y.sin_cos();
        [
            [cy, 0.0, sy],
            [sx * sy, cx, -sx * cy],
            [-cx * sy, sx, cx * cy],
        ]
    }
}

/// Applies a rotation to a point.
#[inline]
#[must_use]
pub fn rotate(m: &Mat3, p: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * p[0] + m[0][1] * p[1] + m[0][2] * p[2],
        m[1][0] * p[0] + m[1][1] * p[1] + m[1][2] * p[2],
        m[2][0] * p[0] + m[2][1] * p[1] + m[2][2] * p[2],
    ]
}

/// Timing over a run of preview frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Frames recorded.
    pub frames: u32,
    /// Triangles transformed per frame.
    pub triangles: usize,
    /// Sum of frame times.
    pub total_time: Duration,
    /// Fastest frame.
    pub min_frame_time: Duration,
    /// Slowest frame.
    pub max_frame_time: Duration,
}

impl FrameStats {
    /// Records one frame.
    pub fn record(&mut self, frame_time: Duration) {
        if self.frames == 0 || frame_time < self.min_frame_time {
            self.min_frame_time = frame_time;
        }
        self.max_frame_time = self.max_frame_time.max(frame_time);
        self.total_time += frame_time;
        self.frames += 1;
    }

    /// Mean frame time in milliseconds.
    #[must_use]
    pub fn average_frame_ms(&self) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_time.as_secs_f32() * 1000.0 / self.frames as f32
        }
    }

    /// Returns FPS calculated from the mean frame time.
    #[must_use]
    pub fn fps(&self) -> f32 {
        let frame_ms = self.average_frame_ms();
        if frame_ms > 0.0 {
            1000.0 / frame_ms
        } else {
            0.0
        }
    }

    /// Returns true if meeting the frame rate target.
    #[must_use]
    pub fn meets_target(&self) -> bool {
        self.fps() >= TARGET_FPS
    }
}

/// Largest distance of any rotated vertex from the origin.
fn rotated_extent(mesh: &MergedMesh, m: &Mat3) -> f32 {
    mesh.vertices()
        .iter()
        .map(|&v| {
            let r = rotate(m, v);
            (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt()
        })
        .fold(0.0, f32::max)
}

/// Spins `mesh` for `frames` frames and times each one.
///
/// Returns the timing and the turntable's final state.
#[must_use]
pub fn run_preview(mesh: &MergedMesh, frames: u32) -> (FrameStats, Turntable) {
    let mut turntable = Turntable::default();
    let mut stats = FrameStats {
        triangles: mesh.triangle_count(),
        ..FrameStats::default()
    };

    for _ in 0..frames {
        let start = Instant::now();
        turntable.advance();
        let extent = rotated_extent(mesh, &turntable.model_matrix());
        stats.record(start.elapsed());

        if turntable.frame() % 60 == 0 {
            tracing::debug!("frame {}: extent {extent:.3}", turntable.frame());
        }
    }
    (stats, turntable)
}
