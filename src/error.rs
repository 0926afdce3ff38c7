use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised while building or minimizing a likelihood objective.
///
/// Input validation variants are returned before the minimizer runs. A
/// `NonPositiveRate` raised by any objective evaluation aborts the fit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("No observations to fit.")]
    EmptyObservations,

    #[error("Length mismatch for {what}: expected {expected}, got {got}.")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid initial guess for parameter {index}: {value}.")]
    InvalidInitialGuess { index: usize, value: f64 },

    #[error("Invalid bounds for parameter {index}: lower={lower}, upper={upper:?}.")]
    InvalidBounds {
        index: usize,
        lower: f64,
        upper: Option<f64>,
    },

    #[error("Model rate must be positive and finite; got {rate} at n={index}.")]
    NonPositiveRate { index: usize, rate: f64 },

    #[error("Minimizer returned an unusable result: {0}")]
    Minimizer(String),
}

impl FitError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::EmptyObservations => 3,
            FitError::LengthMismatch { .. }
            | FitError::InvalidInitialGuess { .. }
            | FitError::InvalidBounds { .. } => 2,
            FitError::NonPositiveRate { .. } | FitError::Minimizer(_) => 4,
        }
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

/// Errors raised while loading or rendering images.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    #[error("Failed to read image '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Line {line}: cannot parse '{token}' as a number.")]
    Parse { line: usize, token: String },

    #[error("Line {line}: expected {expected} value(s), got {got}.")]
    Ragged {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("Image has no finite values.")]
    Empty,

    #[error("No images to show.")]
    NoImages,

    #[error("Image data length {got} does not match {rows}x{cols}.")]
    Shape { rows: usize, cols: usize, got: usize },

    #[error("Histogram bin width must be positive and finite; got {0}.")]
    InvalidBinWidth(f64),

    #[error("Histogram would need {requested} bins; at most {max} are allowed.")]
    TooManyBins { requested: f64, max: usize },
}

impl ImageError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ImageError::Empty => 3,
            _ => 2,
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
