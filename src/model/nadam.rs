//! Nadam optimizer (Adam with Nesterov momentum)
//!
//! Nadam folds the Nesterov lookahead into Adam's first-moment estimate
//! (Dozat, 2016), which corrects plain momentum's lag on the current
//! gradient:
//!
//! ```text
//! m_t = β₁·m_{t-1} + (1-β₁)·g_t
//! v_t = β₂·v_{t-1} + (1-β₂)·g_t²
//! m̂_t = β₁·m_t/(1-β₁^(t+1)) + (1-β₁)·g_t/(1-β₁^t)
//! v̂_t = v_t/(1-β₂^t)
//! θ_t = θ_{t-1} - lr·m̂_t/(√v̂_t + ε)
//! ```
//!
//! Parameters live in the caller as flat `f32` slices; the optimizer keeps
//! one lazily sized moment pair per slot index. Call
//! [`Nadam::begin_step`] once per optimization step, then
//! [`Nadam::update`] once per parameter slot.

/// Nadam optimizer over flat parameter slices
#[derive(Clone, Debug)]
pub struct Nadam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    moments: Vec<Slot>,
}

/// First/second moment buffers for one parameter slot
#[derive(Clone, Debug, Default)]
struct Slot {
    m: Vec<f32>,
    v: Vec<f32>,
}

impl Nadam {
    /// Create a Nadam optimizer with the standard betas (0.9, 0.999).
    pub fn new(lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            moments: Vec::new(),
        }
    }

    /// Override the exponential decay rates.
    #[must_use]
    pub fn with_betas(mut self, beta1: f32, beta2: f32) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    /// Current learning rate
    #[must_use]
    pub fn lr(&self) -> f32 {
        self.lr
    }

    /// Set the learning rate
    pub fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    /// Optimization steps taken so far
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Advance the step counter. Call once before the slot updates of a
    /// step so bias correction sees a consistent `t` across slots.
    pub fn begin_step(&mut self) {
        self.t += 1;
    }

    /// Apply one Nadam update to the parameter slot `slot`.
    ///
    /// Moment buffers are created on first use and keyed by slot index, so
    /// a model updates e.g. slot 0 for weights and slot 1 for bias every
    /// step. `param` and `grad` must have equal length.
    pub fn update(&mut self, slot: usize, param: &mut [f32], grad: &[f32]) {
        debug_assert_eq!(param.len(), grad.len(), "param/grad length mismatch");
        if self.moments.len() <= slot {
            self.moments.resize_with(slot + 1, Slot::default);
        }
        let state = &mut self.moments[slot];
        if state.m.is_empty() {
            state.m = vec![0.0; param.len()];
            state.v = vec![0.0; param.len()];
        }

        // A missing begin_step would make the correction terms divide by
        // zero; treat it as the first step instead.
        let t = self.t.max(1) as i32;
        let m_correction = 1.0 - self.beta1.powi(t);
        let m_next_correction = 1.0 - self.beta1.powi(t + 1);
        let v_correction = 1.0 - self.beta2.powi(t);

        for i in 0..param.len() {
            let g = grad[i];
            state.m[i] = self.beta1 * state.m[i] + (1.0 - self.beta1) * g;
            state.v[i] = self.beta2 * state.v[i] + (1.0 - self.beta2) * g * g;

            let m_hat =
                self.beta1 * state.m[i] / m_next_correction + (1.0 - self.beta1) * g / m_correction;
            let v_hat = state.v[i] / v_correction;

            param[i] -= self.lr * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}
