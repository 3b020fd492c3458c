use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;
use thiserror::Error;

use super::schema::Schema;
use super::validation::{FieldError, FieldKey, FieldLens, FormModel, ValidationResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

/// What a single `submit` call did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the action was not called.
    Invalid,
    /// Another submission was in flight; nothing happened.
    Ignored,
    Succeeded,
    Failed(String),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
    #[default]
    All,
}

impl ValidationMode {
    fn on_change(self) -> bool {
        matches!(self, ValidationMode::OnChange | ValidationMode::All)
    }

    fn on_blur(self) -> bool {
        matches!(self, ValidationMode::OnBlur | ValidationMode::All)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldMeta {
    pub dirty: bool,
    pub touched: bool,
    pub error: Option<FieldError>,
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub result: ValidationResult,
    pub field_meta: BTreeMap<FieldKey, FieldMeta>,
    pub last_outcome: Option<SubmitOutcome>,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("unknown form field `{0}`")]
    UnknownField(String),
}

pub type FormResult<T> = Result<T, FormError>;

/// Failure reported by a submission action.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{reason}")]
pub struct SubmitError {
    reason: String,
}

impl SubmitError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

pub(super) struct FormState<T> {
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) dirty_fields: BTreeSet<FieldKey>,
    pub(super) touched_fields: BTreeSet<FieldKey>,
    pub(super) result: ValidationResult,
    pub(super) last_outcome: Option<SubmitOutcome>,
}

/// Holds field values, the current validation result and the submission flag
/// for one form. Clones share state, so a clone can be moved into input
/// callbacks.
#[derive(Clone)]
pub struct FormController<T>
where
    T: FormModel,
{
    options: FormOptions,
    schema: Arc<Schema<T>>,
    state: Arc<RwLock<FormState<T>>>,
}

impl<T> FormController<T>
where
    T: FormModel,
{
    pub fn new(initial: T, schema: Schema<T>, options: FormOptions) -> Self {
        Self {
            options,
            schema: Arc::new(schema),
            state: Arc::new(RwLock::new(FormState {
                initial_model: initial.clone(),
                model: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                dirty_fields: BTreeSet::new(),
                touched_fields: BTreeSet::new(),
                result: ValidationResult::default(),
                last_outcome: None,
            })),
        }
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "writing form model")?;
        lens.set(&mut state.model, value);
        let is_dirty = lens.get(&state.model) != lens.get(&state.initial_model);
        self.record_change(&mut state, key, is_dirty);
        Ok(())
    }

    /// Sets a text field addressed by name, as a rendered input would.
    pub fn set_text(&self, name: &str, value: impl Into<String>) -> FormResult<()> {
        let key = known_key::<T>(name)?;
        let mut guard = write_lock(&self.state, "writing text field")?;
        let state = &mut *guard;
        let slot = state
            .model
            .text_field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value.into();
        let current = slot.clone();
        let is_dirty = state
            .initial_model
            .text_field_mut(name)
            .is_none_or(|initial| *initial != current);
        self.record_change(state, key, is_dirty);
        Ok(())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        self.touch_key(lens.key())
    }

    pub fn touch_by_name(&self, name: &str) -> FormResult<()> {
        self.touch_key(known_key::<T>(name)?)
    }

    /// Runs the whole schema against the current values.
    pub fn validate(&self) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "validating form")?;
        state.result = self.schema.evaluate(&state.model);
        Ok(state.result.is_valid())
    }

    /// Validates, then hands a copy of the values to `action` when they pass.
    ///
    /// The state is back to `Idle` once this resolves or is dropped, whatever
    /// the action did. A call made while another submission is pending
    /// returns [`SubmitOutcome::Ignored`].
    pub async fn submit<F, Fut>(&self, action: F) -> FormResult<SubmitOutcome>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), SubmitError>>,
    {
        let model = {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submit_state == SubmitState::Submitting {
                log::debug!("form `{}`: submit ignored, already submitting", self.schema.name());
                return Ok(SubmitOutcome::Ignored);
            }
            state.submit_count = state.submit_count.saturating_add(1);
            state.result = self.schema.evaluate(&state.model);
            if !state.result.is_valid() {
                log::debug!(
                    "form `{}`: submit rejected, invalid fields {:?}",
                    self.schema.name(),
                    state.result.error_fields()
                );
                state.last_outcome = Some(SubmitOutcome::Invalid);
                return Ok(SubmitOutcome::Invalid);
            }
            set_submit_state(&mut state, SubmitState::Submitting);
            state.model.clone()
        };

        let guard = SubmittingGuard { state: &self.state };
        let result = action(model).await;
        drop(guard);

        let outcome = match result {
            Ok(()) => SubmitOutcome::Succeeded,
            Err(error) => {
                log::warn!("form `{}`: submission failed: {error}", self.schema.name());
                SubmitOutcome::Failed(error.reason().to_string())
            }
        };
        write_lock(&self.state, "recording submit outcome")?.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(self.submit_state()? == SubmitState::Submitting)
    }

    pub fn last_outcome(&self) -> FormResult<Option<SubmitOutcome>> {
        Ok(read_lock(&self.state, "reading last outcome")?
            .last_outcome
            .clone())
    }

    pub fn validation_result(&self) -> FormResult<ValidationResult> {
        Ok(read_lock(&self.state, "reading validation result")?
            .result
            .clone())
    }

    /// First invalid field in schema order, for focusing after a failed submit.
    pub fn first_error(&self) -> FormResult<Option<FieldKey>> {
        let state = read_lock(&self.state, "reading first error key")?;
        Ok(self.schema.first_error(&state.result))
    }

    /// The error a renderer should show for the field. Errors stay hidden
    /// until the field is touched or a submit has been attempted.
    pub fn visible_error<L>(&self, lens: L) -> FormResult<Option<String>>
    where
        L: FieldLens<T>,
    {
        self.visible_error_by_name(lens.key().as_str())
    }

    pub fn visible_error_by_name(&self, name: &str) -> FormResult<Option<String>> {
        let state = read_lock(&self.state, "reading display error message")?;
        if !state.touched_fields.contains(name) && state.submit_count == 0 {
            return Ok(None);
        }
        Ok(state.result.message(name).map(str::to_string))
    }

    pub fn field_meta<L>(&self, lens: L) -> FormResult<FieldMeta>
    where
        L: FieldLens<T>,
    {
        let state = read_lock(&self.state, "reading field meta")?;
        Ok(meta_for(&state, lens.key()))
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.model = state.initial_model.clone();
        state.submit_count = 0;
        state.dirty_fields.clear();
        state.touched_fields.clear();
        state.result = ValidationResult::default();
        state.last_outcome = None;
        Ok(())
    }

    pub fn reset_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "resetting field")?;
        let initial_value = lens.get(&state.initial_model).clone();
        lens.set(&mut state.model, initial_value);
        state.dirty_fields.remove(&key);
        state.touched_fields.remove(&key);
        if self.options.validate_mode.on_change() {
            state.result = self.schema.evaluate(&state.model);
        } else {
            state.result.insert(key, None);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        let field_meta = self
            .schema
            .field_keys()
            .iter()
            .map(|key| (*key, meta_for(&state, *key)))
            .collect();
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid: state.result.is_valid(),
            result: state.result.clone(),
            field_meta,
            last_outcome: state.last_outcome.clone(),
        })
    }

    fn record_change(&self, state: &mut FormState<T>, key: FieldKey, is_dirty: bool) {
        if is_dirty {
            state.dirty_fields.insert(key);
        } else {
            state.dirty_fields.remove(&key);
        }
        if self.options.validate_mode.on_change() {
            state.result = self.schema.evaluate(&state.model);
        }
    }

    fn touch_key(&self, key: FieldKey) -> FormResult<()> {
        let mut state = write_lock(&self.state, "touching field")?;
        state.touched_fields.insert(key);
        if self.options.validate_mode.on_blur() {
            state.result = self.schema.evaluate(&state.model);
        }
        Ok(())
    }
}

/// Puts the form back to `Idle` when the submission ends, including when the
/// submit future is dropped mid-flight.
struct SubmittingGuard<'a, T> {
    state: &'a RwLock<FormState<T>>,
}

impl<T> Drop for SubmittingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        set_submit_state(&mut state, SubmitState::Idle);
    }
}

fn known_key<T: FormModel>(name: &str) -> FormResult<FieldKey> {
    T::field_keys()
        .iter()
        .copied()
        .find(|key| key.as_str() == name)
        .ok_or_else(|| FormError::UnknownField(name.to_string()))
}

fn meta_for<T>(state: &FormState<T>, key: FieldKey) -> FieldMeta {
    FieldMeta {
        dirty: state.dirty_fields.contains(&key),
        touched: state.touched_fields.contains(&key),
        error: state.result.error(key.as_str()).cloned(),
    }
}

fn set_submit_state<T>(state: &mut FormState<T>, next: SubmitState) {
    if state.submit_state != next {
        log::debug!("submit state {:?} -> {next:?}", state.submit_state);
        state.submit_state = next;
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
