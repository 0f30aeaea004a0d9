use std::ffi::CString;
use std::num::NonZeroU32;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::raw_window_handle::HasWindowHandle;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::application::Application;
use crate::graphics::GlApi;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlSettings {
    pub major: u8,
    pub minor: u8,
    pub vsync: bool,
}

impl Default for GlSettings {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            vsync: true,
        }
    }
}

/// A current OpenGL core profile context bound to a window surface.
pub struct GlContext {
    pub api: GlApi,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlContext {
    fn create(
        event_loop: &ActiveEventLoop,
        window_attributes: WindowAttributes,
        settings: GlSettings,
    ) -> Result<(Window, Self)> {
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));
        let (window, gl_config) = display_builder
            .build(event_loop, ConfigTemplateBuilder::new(), pick_config)
            .map_err(|err| eyre!("Failed to create window: {err}"))?;
        let window = window.ok_or_else(|| eyre!("Display builder returned no window"))?;

        let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                settings.major,
                settings.minor,
            ))))
            .with_profile(GlProfile::Core)
            .build(raw_window_handle);

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .wrap_err_with(|| {
                format!(
                    "Failed to create an OpenGL {}.{} core context",
                    settings.major, settings.minor
                )
            })?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .wrap_err("Failed to describe window surface")?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .wrap_err("Failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .wrap_err("Failed to make context current")?;

        let interval = if settings.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            log::warn!("Could not set swap interval: {err}");
        }

        let api = GlApi::load(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(&symbol),
            Err(_) => std::ptr::null(),
        });

        Ok((
            window,
            Self {
                api,
                surface,
                context,
            },
        ))
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .wrap_err("Failed to swap buffers")
    }

    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
        }
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("glutin offers at least one config")
}

pub struct OpenGLContext<A: Application> {
    window: Option<Window>,
    context: Option<GlContext>,
    application: Option<A>,
    config: Option<A::Config>,
    window_attributes: WindowAttributes,
    settings: GlSettings,
    error: Option<color_eyre::Report>,
}

impl<A: Application> OpenGLContext<A> {
    pub fn new(window_attributes: WindowAttributes, settings: GlSettings, config: A::Config) -> Self {
        Self {
            window: None,
            context: None,
            application: None,
            config: Some(config),
            window_attributes,
            settings,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: color_eyre::Report) {
        log::error!("{error:#}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn set_up(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (window, context) =
            GlContext::create(event_loop, self.window_attributes.clone(), self.settings)?;

        log::info!("OpenGL {}", context.api.version());
        log::info!("Renderer {}", context.api.renderer());

        let config = self
            .config
            .take()
            .ok_or_else(|| eyre!("Application already started"))?;
        let application = A::new(config, &window, &context, event_loop)?;

        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.application = Some(application);

        Ok(())
    }
}

impl<A: Application> ApplicationHandler for OpenGLContext<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(error) = self.set_up(event_loop) {
            self.fail(event_loop, error);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(context), Some(application)) = (
            self.window.as_ref(),
            self.context.as_ref(),
            self.application.as_mut(),
        ) else {
            return;
        };

        if window_id != window.id() {
            return;
        }

        if let WindowEvent::Resized(size) = event {
            context.resize(size.width, size.height);
        }

        let redraw = matches!(event, WindowEvent::RedrawRequested);
        application.window_event(event, event_loop, window, context);

        if redraw {
            if let Err(error) = context.swap_buffers() {
                self.fail(event_loop, error);
                return;
            }
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let (Some(application), Some(context)) = (self.application.take(), self.context.as_ref())
        {
            application.destroy(context);
        }
    }
}
