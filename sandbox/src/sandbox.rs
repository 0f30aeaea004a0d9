use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use common::application::Application;
use common::colors::ColorPulse;
use common::context::GlContext;
use common::{GlApi, LinkedProgram, build_program, guarded_call, split_shader_bundle};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

use crate::config::SandboxConfig;
use crate::quad::QuadMesh;

/// What to do when a guarded GL call reports an error.
#[derive(Copy, Clone, Debug)]
pub struct ErrorPolicy {
    break_on_error: bool,
}

impl ErrorPolicy {
    pub fn new(break_on_error: bool) -> Self {
        Self { break_on_error }
    }

    #[track_caller]
    pub fn check(&self, clean: bool) {
        if clean {
            return;
        }
        if self.break_on_error {
            panic!("OpenGL call failed, see the error log above");
        }
        log::warn!(
            "Continuing after OpenGL error at {}",
            std::panic::Location::caller()
        );
    }
}

pub struct Sandbox {
    program: LinkedProgram,
    color_location: i32,
    quad: QuadMesh,
    pulse: ColorPulse,
    clear_color: [f32; 4],
    policy: ErrorPolicy,
}

impl Application for Sandbox {
    type Config = SandboxConfig;

    fn new(
        config: SandboxConfig,
        window: &Window,
        context: &GlContext,
        _event_loop: &ActiveEventLoop,
    ) -> Result<Self> {
        let api = &context.api;
        let policy = ErrorPolicy::new(config.break_on_gl_error());

        let bundle = split_shader_bundle(&config.shader)?;
        let program = build_program(api, &bundle).wrap_err_with(|| {
            format!("Failed to build shader program from {}", config.shader.display())
        })?;

        let Some(color_location) = program.uniform_location(api, "u_Color") else {
            program.delete(api);
            return Err(eyre!(
                "{} does not declare a used `uniform vec4 u_Color`",
                config.shader.display()
            ));
        };

        let quad = QuadMesh::new(api, &policy);

        let size = window.inner_size();
        set_viewport(api, &policy, size.width, size.height);

        Ok(Self {
            program,
            color_location,
            quad,
            pulse: ColorPulse::new(config.pulse.color(), config.pulse.step),
            clear_color: config.clear_color,
            policy,
        })
    }

    fn window_event(
        &mut self,
        event: WindowEvent,
        event_loop: &ActiveEventLoop,
        _window: &Window,
        context: &GlContext,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                set_viewport(&context.api, &self.policy, new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => self.render(&context.api),
            _ => (),
        }
    }

    fn destroy(self, context: &GlContext) {
        self.program.delete(&context.api);
        self.quad.delete(&context.api);
        log::info!("Released GL objects");
    }
}

impl Sandbox {
    fn render(&mut self, api: &GlApi) {
        let [red, green, blue, alpha] = self.clear_color;
        self.policy.check(guarded_call(api, "glClearColor(...)", || unsafe {
            gl::ClearColor(red, green, blue, alpha)
        }));
        self.policy.check(guarded_call(api, "glClear(GL_COLOR_BUFFER_BIT)", || unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT)
        }));

        self.policy.check(self.program.bind(api));
        let [red, green, blue, alpha] = self.pulse.components();
        let location = self.color_location;
        self.policy.check(guarded_call(api, "glUniform4f(location, r, g, b, a)", || unsafe {
            gl::Uniform4f(location, red, green, blue, alpha)
        }));

        self.quad.draw(api, &self.policy);

        self.pulse.advance();
    }
}

fn set_viewport(api: &GlApi, policy: &ErrorPolicy, width: u32, height: u32) {
    policy.check(guarded_call(api, "glViewport(0, 0, width, height)", || unsafe {
        gl::Viewport(0, 0, width as i32, height as i32)
    }));
}
