//! Error types for the flowfield core.
//!
//! Every variant except [`FlowError::Io`] is a configuration error: it is
//! raised when a config or command is accepted, never from inside a tick.

use thiserror::Error;

/// Errors produced while configuring a simulation.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Display extent or grid dimensions were zero, negative or non-finite.
    #[error("invalid dimensions: width and height must be positive")]
    InvalidDimensions,

    /// Field scale must be a finite value greater than zero.
    #[error("invalid field scale {0}: must be finite and > 0")]
    InvalidFieldScale(f64),

    /// A charge or potential field was configured without any sources.
    #[error("{field} field requires at least one source")]
    EmptySources { field: &'static str },

    /// Step multiplier or fixed step was negative or non-finite.
    #[error("invalid step size {0}: must be finite and >= 0")]
    InvalidStepMultiplier(f64),

    /// Finite-difference epsilon must be finite and strictly positive.
    #[error("invalid epsilon {0}: must be finite and > 0")]
    InvalidEpsilon(f64),

    /// Lifespan range was empty or inverted.
    #[error("invalid lifespan range [{min}, {max})")]
    InvalidLifespan { min: u32, max: u32 },

    /// Target particle count above the supported ceiling.
    #[error("invalid target count {count}: must be <= {max}")]
    InvalidTargetCount { count: usize, max: usize },

    /// Grid sampling resolution must be finite and > 0.
    #[error("invalid sampling resolution {0}: must be finite and > 0")]
    InvalidResolution(f64),

    /// Frame rate must be finite and > 0.
    #[error("invalid frame rate {0}: must be finite and > 0")]
    InvalidFrameRate(f64),

    /// A tick schedule that would never age or never move particles.
    #[error("invalid tick schedule: age increment and repeats must be >= 1")]
    InvalidSchedule,

    /// A numeric parameter that must be finite was not.
    #[error("parameter '{0}' must be finite")]
    NonFinite(&'static str),

    /// A structured parameter (a point or a source list) had the wrong shape.
    #[error("parameter '{0}' is malformed")]
    MalformedParam(&'static str),

    /// A source index in a command did not exist in the active field.
    #[error("source index {index} out of range for {len} sources")]
    SourceIndexOutOfRange { index: usize, len: usize },

    /// The active field kind does not support the requested command.
    #[error("command not supported by the active field: {0}")]
    UnsupportedCommand(String),

    #[error("unknown equation: {0}")]
    UnknownEquation(String),

    #[error("unknown integrator: {0}")]
    UnknownIntegrator(String),

    #[error("unknown noise backend: {0}")]
    UnknownNoiseBackend(String),

    #[error("unknown direction mode: {0}")]
    UnknownDirectionMode(String),

    #[error("unknown scene: {0}")]
    UnknownScene(String),

    /// A raster buffer length did not match its declared dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// Asset loading or snapshot writing failed.
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_scale_includes_value() {
        let msg = FlowError::InvalidFieldScale(-2.5).to_string();
        assert!(msg.contains("-2.5"), "missing value in: {msg}");
    }

    #[test]
    fn target_count_error_includes_ceiling() {
        let msg = FlowError::InvalidTargetCount {
            count: 1_000_000,
            max: 100_000,
        }
        .to_string();
        assert!(msg.contains("1000000") && msg.contains("100000"), "got: {msg}");
    }

    #[test]
    fn empty_sources_names_the_field() {
        let msg = FlowError::EmptySources { field: "charge" }.to_string();
        assert!(msg.contains("charge"), "missing field name in: {msg}");
    }

    #[test]
    fn lifespan_error_includes_range() {
        let msg = FlowError::InvalidLifespan { min: 600, max: 300 }.to_string();
        assert!(msg.contains("600") && msg.contains("300"), "got: {msg}");
    }

    #[test]
    fn source_index_error_includes_index_and_len() {
        let msg = FlowError::SourceIndexOutOfRange { index: 7, len: 2 }.to_string();
        assert!(msg.contains('7'), "missing index in: {msg}");
        assert!(msg.contains('2'), "missing len in: {msg}");
    }

    #[test]
    fn unknown_lookups_include_name() {
        let cases = [
            FlowError::UnknownEquation("warp".into()),
            FlowError::UnknownIntegrator("rk9".into()),
            FlowError::UnknownNoiseBackend("worley".into()),
            FlowError::UnknownDirectionMode("sideways".into()),
            FlowError::UnknownScene("mandelbrot".into()),
        ];
        for (err, name) in cases
            .iter()
            .zip(["warp", "rk9", "worley", "sideways", "mandelbrot"])
        {
            let msg = err.to_string();
            assert!(msg.contains(name), "expected '{name}' in: {msg}");
        }
    }

    #[test]
    fn dimension_mismatch_includes_all_dimensions() {
        let err = FlowError::DimensionMismatch {
            lhs_w: 10,
            lhs_h: 20,
            rhs_w: 30,
            rhs_h: 40,
        };
        let msg = format!("{err}");
        for n in ["10", "20", "30", "40"] {
            assert!(msg.contains(n), "missing {n} in: {msg}");
        }
    }

    #[test]
    fn flow_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlowError>();
    }

    #[test]
    fn flow_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<FlowError>();
    }
}
