use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::validation::{ErrorCode, FieldError, FieldKey, FieldLens, ValidationResult};
use crate::i18n::I18nManager;

// Dot-atom local part and hostname labels, as accepted by the HTML email input.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

type Predicate<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;
type FieldCheck<T> = Arc<dyn Fn(&T) -> Option<ErrorCode> + Send + Sync>;
type ModelPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A predicate over a single field value paired with the error it reports.
pub struct Rule<V> {
    code: ErrorCode,
    predicate: Predicate<V>,
}

impl<V> Clone for Rule<V> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<V> Rule<V> {
    pub fn new(code: ErrorCode, predicate: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        Self {
            code,
            predicate: Arc::new(predicate),
        }
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn check(&self, value: &V) -> Result<(), ErrorCode> {
        if (self.predicate)(value) {
            Ok(())
        } else {
            Err(self.code.clone())
        }
    }
}

pub mod rules {
    use super::{EMAIL_PATTERN, Rule};
    use crate::form::validation::ErrorCode;

    /// Non-blank after trimming whitespace.
    pub fn required() -> Rule<String> {
        Rule::new(ErrorCode::Required, |value: &String| {
            !value.trim().is_empty()
        })
    }

    pub fn email() -> Rule<String> {
        Rule::new(ErrorCode::InvalidEmail, |value: &String| {
            is_plausible_email(value)
        })
    }

    /// At least `min` characters, counted as entered.
    pub fn min_length(min: usize) -> Rule<String> {
        Rule::new(ErrorCode::TooShort { min }, move |value: &String| {
            value.chars().count() >= min
        })
    }

    /// Checks the value exactly as entered. Surrounding whitespace fails.
    pub fn is_plausible_email(value: &str) -> bool {
        if value.len() > 254 {
            return false;
        }
        let Some((local, _)) = value.split_once('@') else {
            return false;
        };
        if local.len() > 64 || local.starts_with('.') || local.ends_with('.') {
            return false;
        }
        !local.contains("..") && EMAIL_PATTERN.is_match(value)
    }
}

struct FieldEntry<T> {
    key: FieldKey,
    check: FieldCheck<T>,
}

struct CrossFieldEntry<T> {
    target: FieldKey,
    code: ErrorCode,
    applies: ModelPredicate<T>,
    holds: ModelPredicate<T>,
}

/// Declarative rule set for one form.
///
/// Each field lists its rules in order and reports only the first one that
/// fails. Cross-field rules run after the field rules and only touch fields
/// that are still clean.
pub struct Schema<T> {
    name: &'static str,
    order: Vec<FieldKey>,
    fields: Vec<FieldEntry<T>>,
    cross_field: Vec<CrossFieldEntry<T>>,
    i18n: I18nManager,
}

impl<T: 'static> Schema<T> {
    pub fn new(name: &'static str, i18n: I18nManager) -> Self {
        Self {
            name,
            order: Vec::new(),
            fields: Vec::new(),
            cross_field: Vec::new(),
            i18n,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn i18n(&self) -> &I18nManager {
        &self.i18n
    }

    pub fn field<L>(mut self, lens: L, rules: impl IntoIterator<Item = Rule<L::Value>>) -> Self
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let rules = rules.into_iter().collect::<Vec<_>>();
        let check: FieldCheck<T> = Arc::new(move |model: &T| {
            let value = lens.get(model);
            rules.iter().find_map(|rule| rule.check(value).err())
        });
        self.remember(key);
        self.fields.push(FieldEntry { key, check });
        self
    }

    /// `target` must equal `source` once both hold a value.
    pub fn must_match<A, B>(mut self, target: A, source: B) -> Self
    where
        A: FieldLens<T, Value = String>,
        B: FieldLens<T, Value = String>,
    {
        self.remember(target.key());
        self.remember(source.key());
        self.cross_field.push(CrossFieldEntry {
            target: target.key(),
            code: ErrorCode::Mismatch {
                other: source.key(),
            },
            applies: Arc::new(move |model: &T| {
                !target.get(model).is_empty() && !source.get(model).is_empty()
            }),
            holds: Arc::new(move |model: &T| target.get(model) == source.get(model)),
        });
        self
    }

    /// Field keys in the order they were declared.
    pub fn field_keys(&self) -> &[FieldKey] {
        &self.order
    }

    pub fn evaluate(&self, model: &T) -> ValidationResult {
        let mut result = ValidationResult::default();
        for key in &self.order {
            result.insert(*key, None);
        }

        for entry in &self.fields {
            if result.error(entry.key.as_str()).is_some() {
                continue;
            }
            if let Some(code) = (entry.check)(model) {
                result.insert(entry.key, Some(self.field_error(entry.key, code)));
            }
        }

        for rule in &self.cross_field {
            if result.error(rule.target.as_str()).is_some() || !(rule.applies)(model) {
                continue;
            }
            if !(rule.holds)(model) {
                result.insert(
                    rule.target,
                    Some(self.field_error(rule.target, rule.code.clone())),
                );
            }
        }

        log::debug!(
            "schema `{}` evaluated: {} error(s)",
            self.name,
            result.error_count()
        );
        result
    }

    pub fn first_error(&self, result: &ValidationResult) -> Option<FieldKey> {
        self.order
            .iter()
            .copied()
            .find(|key| result.error(key.as_str()).is_some())
    }

    pub fn label(&self, key: FieldKey) -> String {
        let label_key = format!("field.{key}");
        if self.i18n.has_key(&label_key) {
            self.i18n.t(&label_key)
        } else {
            key.as_str().to_string()
        }
    }

    fn field_error(&self, key: FieldKey, code: ErrorCode) -> FieldError {
        let label = self.label(key);
        let message = match &code {
            ErrorCode::Required | ErrorCode::InvalidEmail => {
                self.i18n.t_with(code.message_key(), &[("field", &label)])
            }
            ErrorCode::TooShort { min } => self.i18n.t_with(
                code.message_key(),
                &[("field", &label), ("min", &min.to_string())],
            ),
            ErrorCode::Mismatch { other } => {
                let other_label = self.label(*other);
                self.i18n.t_with(
                    code.message_key(),
                    &[("field", &label), ("other", &other_label)],
                )
            }
        };
        FieldError::new(key, code, message)
    }

    fn remember(&mut self, key: FieldKey) {
        if !self.order.contains(&key) {
            self.order.push(key);
        }
    }
}
