use color_eyre::Result;
use color_eyre::eyre::eyre;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowAttributes;

use crate::application::Application;
use crate::context::{GlSettings, OpenGLContext};

pub fn run<A: Application>(
    window_attributes: WindowAttributes,
    settings: GlSettings,
    config: A::Config,
) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| eyre!("Failed to create event loop: {err}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut opengl_context = OpenGLContext::<A>::new(window_attributes, settings, config);
    event_loop
        .run_app(&mut opengl_context)
        .map_err(|err| eyre!("Event loop terminated abnormally: {err}"))?;

    opengl_context.into_result()
}
