use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShipmentError {
    #[error("Input is not valid Shift-JIS: malformed byte sequence at offset {offset}")]
    DecodeError { offset: usize },

    #[error("CSV syntax error at line {line}: {message}")]
    RecordSyntaxError { line: u64, message: String },

    #[error("Malformed record at line {line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Invalid quantity at line {line}: failed to parse {value:?}")]
    InvalidQuantity { line: u64, value: String },

    #[error("Total quantity of order {order_id} overflows when adding {value} at line {line}")]
    QuantityOverflow {
        line: u64,
        order_id: String,
        value: u64,
    },

    #[error("Continuation row at line {line} has no preceding order")]
    ContinuationWithoutPredecessor { line: u64 },

    #[error("Failed to write {format} row {row:?}: {reason}")]
    SerializationWriteError {
        format: &'static str,
        row: Vec<String>,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigError { field: String, message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ShipmentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShipmentError::DecodeError { .. }
            | ShipmentError::RecordSyntaxError { .. }
            | ShipmentError::MalformedRecord { .. }
            | ShipmentError::InvalidQuantity { .. }
            | ShipmentError::QuantityOverflow { .. }
            | ShipmentError::ContinuationWithoutPredecessor { .. } => ErrorCategory::Input,
            ShipmentError::SerializationWriteError { .. } => ErrorCategory::Output,
            ShipmentError::ConfigError { .. }
            | ShipmentError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ShipmentError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ShipmentError::DecodeError { .. } => {
                "Export the order file again as Shift-JIS (CP932) without converting it"
            }
            ShipmentError::RecordSyntaxError { .. } | ShipmentError::MalformedRecord { .. } => {
                "Make sure the file is an unmodified order export with 17 columns per row"
            }
            ShipmentError::InvalidQuantity { .. } => {
                "Check the quantity column of the reported line; it must be a whole number"
            }
            ShipmentError::QuantityOverflow { .. } => {
                "Check the quantity columns of the reported order; the values are far too large"
            }
            ShipmentError::ContinuationWithoutPredecessor { .. } => {
                "The first order row of the export must not be a continuation row"
            }
            ShipmentError::SerializationWriteError { .. } => {
                "Remove characters the selected output encoding cannot represent, or choose a UTF-8 target"
            }
            ShipmentError::IoError(_) => "Check that the output directory exists and is writable",
            ShipmentError::ConfigError { .. } | ShipmentError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line flags and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The uploaded order file could not be read: {}", self),
            ErrorCategory::Output => format!("Output files could not be generated: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShipmentError>;
