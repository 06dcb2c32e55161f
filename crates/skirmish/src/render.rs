//! The render seam: where each frame's player positions go.

use skirmish_frame::FrameInfo;
use skirmish_session::Marker;

/// Something that can draw one frame of markers.
///
/// The client calls [`draw`](Self::draw) once per frame, after prediction,
/// with every known player sorted by id. Implementations own whatever
/// window or canvas they paint on; the client never touches it.
pub trait RenderSurface {
    fn draw(&mut self, frame: &FrameInfo, markers: &[Marker]);
}

/// Discards every frame. For headless clients such as bots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn draw(&mut self, _frame: &FrameInfo, _markers: &[Marker]) {}
}

/// Logs every marker at `trace` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceSurface;

impl RenderSurface for TraceSurface {
    fn draw(&mut self, frame: &FrameInfo, markers: &[Marker]) {
        for marker in markers {
            tracing::trace!(
                frame = frame.frame,
                player_id = %marker.id,
                x = marker.x,
                y = marker.y,
                "marker"
            );
        }
    }
}

/// Mutable references draw through to the surface they point at, so a
/// caller can keep ownership of its surface while the client runs.
impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn draw(&mut self, frame: &FrameInfo, markers: &[Marker]) {
        (**self).draw(frame, markers);
    }
}
