use palette::Srgba;

/// Colour whose red channel bounces between 0 and 1, one step per frame.
#[derive(Copy, Clone, Debug)]
pub struct ColorPulse {
    color: Srgba,
    step: f32,
    increment: f32,
}

impl ColorPulse {
    pub fn new(color: Srgba, step: f32) -> Self {
        let step = step.abs();
        Self {
            color,
            step,
            increment: step,
        }
    }

    pub fn components(&self) -> [f32; 4] {
        [
            self.color.red,
            self.color.green,
            self.color.blue,
            self.color.alpha,
        ]
    }

    /// Moves red one step, turning around once it has left `0.0..=1.0`.
    pub fn advance(&mut self) {
        if self.color.red > 1.0 {
            self.increment = -self.step;
        } else if self.color.red < 0.0 {
            self.increment = self.step;
        }

        self.color.red += self.increment;
    }
}
