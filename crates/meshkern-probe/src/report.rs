//! Comparison of GPU output against the CPU reference.

use std::fmt;

/// Outcome of one kernel check.
#[derive(Debug, Clone)]
pub struct Check {
    pub kernel: &'static str,
    pub elements: usize,
    pub max_error: f32,
    pub tolerance: f32,
}

impl Check {
    pub fn floats(kernel: &'static str, gpu: &[f32], cpu: &[f32], tolerance: f32) -> Self {
        let max_error = if gpu.len() != cpu.len() {
            f32::INFINITY
        } else {
            gpu.iter()
                .zip(cpu)
                .map(|(g, c)| (g - c).abs())
                .fold(0.0, f32::max)
        };
        Self {
            kernel,
            elements: cpu.len(),
            max_error,
            tolerance,
        }
    }

    /// Exact comparison; the error is the number of mismatching elements.
    pub fn exact<T: PartialEq>(kernel: &'static str, gpu: &[T], cpu: &[T]) -> Self {
        let mismatches = if gpu.len() != cpu.len() {
            cpu.len().max(1)
        } else {
            gpu.iter().zip(cpu).filter(|(g, c)| g != c).count()
        };
        Self {
            kernel,
            elements: cpu.len(),
            max_error: mismatches as f32,
            tolerance: 0.0,
        }
    }

    pub fn passed(&self) -> bool {
        self.max_error <= self.tolerance
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<14} {:>8} elements  max error {:<12.3e} {}",
            self.kernel,
            self.elements,
            self.max_error,
            if self.passed() { "ok" } else { "FAILED" }
        )
    }
}
