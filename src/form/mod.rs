mod controller;
mod schema;
mod validation;


pub use controller::{
    FieldMeta, FormController, FormError, FormOptions, FormResult, FormSnapshot,
    SubmitError, SubmitOutcome, SubmitState, ValidationMode,
};
pub use expensesync_form_derive::FormModel;
pub use schema::{Rule, Schema, rules};
pub use validation::{
    ErrorCode, FieldError, FieldKey, FieldLens, FormModel, ValidationResult,
};
