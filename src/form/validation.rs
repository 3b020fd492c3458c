use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        self.0
    }
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

/// A struct whose fields can be addressed through lenses or by name.
///
/// Usually derived with `#[derive(FormModel)]`.
pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Field keys in declaration order.
    fn field_keys() -> &'static [FieldKey];

    /// Mutable access to a `String` field by name, for text inputs that only
    /// know their field name.
    fn text_field_mut(&mut self, name: &str) -> Option<&mut String>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    Required,
    InvalidEmail,
    TooShort { min: usize },
    Mismatch { other: FieldKey },
}

impl ErrorCode {
    pub fn message_key(&self) -> &'static str {
        match self {
            ErrorCode::Required => "validation.required",
            ErrorCode::InvalidEmail => "validation.invalid_email",
            ErrorCode::TooShort { .. } => "validation.too_short",
            ErrorCode::Mismatch { .. } => "validation.mismatch",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    field: FieldKey,
    code: ErrorCode,
    message: String,
}

impl FieldError {
    pub fn new(field: FieldKey, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }

    pub fn field(&self) -> FieldKey {
        self.field
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-field verdict of one schema evaluation. Every field the schema knows
/// about is present; `None` means the field passed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationResult {
    fields: BTreeMap<FieldKey, Option<FieldError>>,
}

impl ValidationResult {
    pub(super) fn insert(&mut self, key: FieldKey, error: Option<FieldError>) {
        self.fields.insert(key, error);
    }

    pub fn is_valid(&self) -> bool {
        self.fields.values().all(Option::is_none)
    }

    pub fn error(&self, key: &str) -> Option<&FieldError> {
        self.fields.get(key).and_then(Option::as_ref)
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.error(key).map(FieldError::message)
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.fields.values().filter_map(Option::as_ref)
    }

    pub fn error_fields(&self) -> Vec<FieldKey> {
        self.errors().map(FieldError::field).collect()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn contains_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, Option<&FieldError>)> {
        self.fields.iter().map(|(key, error)| (*key, error.as_ref()))
    }
}
