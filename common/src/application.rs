use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::context::GlContext;

pub trait Application: Sized {
    type Config;

    fn new(
        config: Self::Config,
        window: &Window,
        context: &GlContext,
        event_loop: &ActiveEventLoop,
    ) -> color_eyre::Result<Self>;

    fn window_event(
        &mut self,
        event: WindowEvent,
        event_loop: &ActiveEventLoop,
        window: &Window,
        context: &GlContext,
    );

    /// Releases GL objects while the context is still current.
    fn destroy(self, context: &GlContext);
}
