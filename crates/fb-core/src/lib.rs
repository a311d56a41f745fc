pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod registry;
pub mod validation;

pub use id::{FieldId, FormId};
pub use layout::{CanvasLayout, CanvasMetrics, ResolvedBounds, ViewMode, resolve_layout};
pub use lint::{LintDiagnostic, LintSeverity, lint_schema};
pub use model::*;
pub use registry::{FieldType, FieldTypeDefinition, UnknownFieldType};
pub use validation::{
    FieldError, FieldValue, FileUpload, SubmissionValues, ValidationEdit, ValidationKey,
    ValidationRules, validate_field, validate_submission,
};
