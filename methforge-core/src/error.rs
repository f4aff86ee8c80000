use thiserror::Error;

#[derive(Debug, Error)]
pub enum MethforgeError {
    #[error("Stream '{0}' is not part of the plant network")]
    UnknownStream(u16),

    #[error("Component '{0}' has no entry in the property tables")]
    UnknownComponent(String),

    #[error("Missing property record for {kind} '{key}'")]
    MissingProperty { kind: &'static str, key: String },

    #[error("Variable '{0}' is not declared in the model")]
    UnknownVariable(String),

    #[error("Variable '{0}' is declared twice")]
    DuplicateVariable(String),

    #[error("Constraint '{0}' is declared twice")]
    DuplicateConstraint(String),

    #[error("Flow x[{stream}, {component}] is defined twice ({first} and {second})")]
    DuplicateDefinition {
        stream: u16,
        component: &'static str,
        first: String,
        second: String,
    },

    #[error("Flow x[{stream}, {component}] has no defining relation ({expected})")]
    MissingDefinition {
        stream: u16,
        component: &'static str,
        expected: String,
    },

    #[error("Technology family '{family}' cannot be resolved: {reason}")]
    SelectionConflict { family: &'static str, reason: String },

    #[error("Big-M for '{family}' is {configured:e}, below the plausible maximum {required:e}")]
    BigMTooSmall {
        family: String,
        configured: f64,
        required: f64,
    },

    #[error("Invalid bounds for '{name}': [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },

    #[error("Numerical domain error in {0}")]
    NumericalDomain(String),

    #[error("Steam table lookup failed: {0}")]
    SteamTable(String),

    #[error("Model has no objective")]
    MissingObjective,

    #[error("Solver '{solver}' finished with status {status}: {message}")]
    SolverFailure {
        solver: String,
        status: String,
        message: String,
    },

    #[error("Solver returned {found} values for a model with {expected} variables")]
    SolutionShape { expected: usize, found: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}
