use std::mem;

use common::{GlApi, guarded_call};
use gl::types::{GLsizei, GLsizeiptr, GLuint};

use crate::sandbox::ErrorPolicy;

pub const POSITIONS: [f32; 8] = [
    -0.5, -0.5, // 0
    0.5, -0.5, // 1
    0.5, 0.5, // 2
    -0.5, 0.5, // 3
];

pub const INDICES: [u32; 6] = [
    0, 1, 2, //
    2, 3, 0,
];

/// Two triangles forming a square, uploaded once.
#[derive(Debug)]
pub struct QuadMesh {
    vao: GLuint,
    vbo: GLuint,
    ibo: GLuint,
}

impl QuadMesh {
    pub fn new(api: &GlApi, policy: &ErrorPolicy) -> Self {
        let mut vao = 0;
        let mut vbo = 0;
        let mut ibo = 0;

        // Core profile has no default vertex array object
        policy.check(guarded_call(api, "glGenVertexArrays(1, &vao)", || unsafe {
            gl::GenVertexArrays(1, &mut vao)
        }));
        policy.check(guarded_call(api, "glBindVertexArray(vao)", || unsafe {
            gl::BindVertexArray(vao)
        }));

        policy.check(guarded_call(api, "glGenBuffers(1, &vbo)", || unsafe {
            gl::GenBuffers(1, &mut vbo)
        }));
        policy.check(guarded_call(api, "glBindBuffer(GL_ARRAY_BUFFER, vbo)", || unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo)
        }));
        policy.check(guarded_call(
            api,
            "glBufferData(GL_ARRAY_BUFFER, positions, GL_STATIC_DRAW)",
            || unsafe {
                gl::BufferData(
                    gl::ARRAY_BUFFER,
                    mem::size_of_val(&POSITIONS) as GLsizeiptr,
                    POSITIONS.as_ptr().cast(),
                    gl::STATIC_DRAW,
                )
            },
        ));

        policy.check(guarded_call(api, "glEnableVertexAttribArray(0)", || unsafe {
            gl::EnableVertexAttribArray(0)
        }));
        policy.check(guarded_call(
            api,
            "glVertexAttribPointer(0, 2, GL_FLOAT, GL_FALSE, 8, 0)",
            || unsafe {
                gl::VertexAttribPointer(
                    0,
                    2,
                    gl::FLOAT,
                    gl::FALSE,
                    (2 * mem::size_of::<f32>()) as GLsizei,
                    std::ptr::null(),
                )
            },
        ));

        policy.check(guarded_call(api, "glGenBuffers(1, &ibo)", || unsafe {
            gl::GenBuffers(1, &mut ibo)
        }));
        policy.check(guarded_call(api, "glBindBuffer(GL_ELEMENT_ARRAY_BUFFER, ibo)", || unsafe {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ibo)
        }));
        policy.check(guarded_call(
            api,
            "glBufferData(GL_ELEMENT_ARRAY_BUFFER, indices, GL_STATIC_DRAW)",
            || unsafe {
                gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    mem::size_of_val(&INDICES) as GLsizeiptr,
                    INDICES.as_ptr().cast(),
                    gl::STATIC_DRAW,
                )
            },
        ));

        // Unbind the array first so the index buffer binding stays recorded in it
        policy.check(guarded_call(api, "glBindVertexArray(0)", || unsafe {
            gl::BindVertexArray(0)
        }));
        policy.check(guarded_call(api, "glBindBuffer(GL_ARRAY_BUFFER, 0)", || unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, 0)
        }));
        policy.check(guarded_call(api, "glBindBuffer(GL_ELEMENT_ARRAY_BUFFER, 0)", || unsafe {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0)
        }));

        log::debug!("Uploaded quad: vao {vao}, vbo {vbo}, ibo {ibo}");
        Self { vao, vbo, ibo }
    }

    pub fn draw(&self, api: &GlApi, policy: &ErrorPolicy) {
        policy.check(guarded_call(api, "glBindVertexArray(vao)", || unsafe {
            gl::BindVertexArray(self.vao)
        }));
        policy.check(guarded_call(api, "glBindBuffer(GL_ELEMENT_ARRAY_BUFFER, ibo)", || unsafe {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.ibo)
        }));
        policy.check(guarded_call(
            api,
            "glDrawElements(GL_TRIANGLES, 6, GL_UNSIGNED_INT, nullptr)",
            || unsafe {
                gl::DrawElements(
                    gl::TRIANGLES,
                    INDICES.len() as GLsizei,
                    gl::UNSIGNED_INT,
                    std::ptr::null(),
                )
            },
        ));
    }

    pub fn delete(self, api: &GlApi) {
        guarded_call(api, "glDeleteBuffers(vbo, ibo)", || unsafe {
            gl::DeleteBuffers(2, [self.vbo, self.ibo].as_ptr())
        });
        guarded_call(api, "glDeleteVertexArrays(1, &vao)", || unsafe {
            gl::DeleteVertexArrays(1, &self.vao)
        });
    }
}
