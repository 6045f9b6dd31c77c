//! Equal-power stereo panner

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Places a mono input in the stereo field at a fixed position.
///
/// The signal is split between the ears with an equal-power law, so a hard
/// pan (-1.0 or 1.0) puts all of it in one ear and nothing in the other.
pub struct StereoPanner {
    pan: f32,
}

impl StereoPanner {
    /// -1.0 = hard left, 0.0 = centre, 1.0 = hard right
    pub fn new(pan: f32) -> Self {
        Self { pan: pan.clamp(-1.0, 1.0) }
    }

    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// (left, right) gains for a mono source at `pan`
    #[inline]
    pub fn mono_gains(pan: f32) -> (f32, f32) {
        let x = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
        let angle = x * core::f32::consts::FRAC_PI_2;
        (angle.cos(), angle.sin())
    }
}

impl AudioNode for StereoPanner {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let [left_out, right_out] = outputs else {
            return;
        };
        let Some(mono) = inputs.first().and_then(|input| input.buffers().first()) else {
            left_out.iter_mut().for_each(|s| *s = 0.0);
            right_out.iter_mut().for_each(|s| *s = 0.0);
            return;
        };

        let (gl, gr) = Self::mono_gains(self.pan);
        for ((l, r), &s) in left_out.iter_mut().zip(right_out.iter_mut()).zip(mono.iter()) {
            *l = s * gl;
            *r = s * gr;
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}
