use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};

use super::errors::ErrorBag;
use super::events::{FormEvent, Listeners};
use super::model::{FieldLens, FormModel, Visit};
use super::options::FormOptions;
use crate::http::{HttpClient, HttpError};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

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

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T> {
    pub model: T,
    pub errors: ErrorBag,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_submitting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    AlreadySubmitting,
    Serialize(String),
    Http(HttpError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
            FormError::Serialize(error) => write!(f, "failed to serialize form data: {error}"),
            FormError::Http(error) => write!(f, "form submit failed: {error}"),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Http(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(value: serde_json::Error) -> Self {
        FormError::Serialize(value.to_string())
    }
}

pub type FormResult<T> = Result<T, FormError>;

pub(super) struct FormState<T> {
    pub(super) original: T,
    pub(super) model: T,
    pub(super) errors: ErrorBag,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) in_flight: usize,
}

impl<T> FormState<T>
where
    T: FormModel,
{
    pub(super) fn is_dirty(&self) -> bool {
        T::field_keys()
            .iter()
            .any(|key| !self.model.field_eq(&self.original, key.as_str()))
    }
}

/// Live form values, their last settled snapshot and the errors the server reported.
///
/// `Form` is a handle: clones share the same state, so a clone can be moved into UI
/// callbacks or into a spawned submit while the original keeps being read.
#[derive(Clone)]
pub struct Form<T>
where
    T: FormModel,
{
    pub(super) id: FormId,
    pub(super) defaults: Arc<T>,
    pub(super) options: Arc<FormOptions>,
    pub(super) client: Arc<dyn HttpClient>,
    pub(super) state: Arc<RwLock<FormState<T>>>,
    pub(super) listeners: Arc<RwLock<Listeners>>,
}

impl<T> Form<T>
where
    T: FormModel,
{
    pub fn new(initial: T, client: impl HttpClient + 'static) -> Self {
        Self::with_options(initial, client, FormOptions::default())
    }

    pub fn with_options(initial: T, client: impl HttpClient + 'static, options: FormOptions) -> Self {
        Self {
            id: FormId::next(),
            defaults: Arc::new(initial.clone()),
            options: Arc::new(options),
            client: Arc::new(client),
            state: Arc::new(RwLock::new(FormState {
                original: initial.clone(),
                model: initial,
                errors: ErrorBag::new(),
                submit_state: SubmitState::Idle,
                submit_count: 0,
                in_flight: 0,
            })),
            listeners: Arc::new(RwLock::new(Listeners::default())),
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// The values the form was constructed with. They never change.
    pub fn defaults(&self) -> &T {
        &self.defaults
    }

    /// Walks the fields in declaration order with their current values.
    ///
    /// The visitor stops the walk by returning `false` or `ControlFlow::Break(())`. It runs
    /// on a copy of the model, so it may call back into the form.
    pub fn each<F, R>(&self, mut visitor: F) -> FormResult<&Self>
    where
        F: FnMut(FieldKey, Value) -> R,
        R: Visit,
    {
        let model = self.model()?;
        for key in T::field_keys() {
            let value = model.field_value(key.as_str())?.unwrap_or(Value::Null);
            if !visitor(*key, value).keep_going() {
                break;
            }
        }
        Ok(self)
    }

    /// Current values as a JSON object, in field order.
    pub fn data(&self) -> FormResult<Map<String, Value>> {
        let state = read_lock(&self.state, "collecting form data")?;
        model_data(&state.model)
    }

    pub fn has(&self, field: &str) -> bool {
        T::has_field(field)
    }

    /// Value of `field` at the last settled point (construction or reset).
    pub fn old(&self, field: &str) -> FormResult<Option<Value>> {
        let state = read_lock(&self.state, "reading original value")?;
        Ok(state.original.field_value(field)?)
    }

    /// True when any field differs from its original value.
    pub fn changed(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "checking changed fields")?.is_dirty())
    }

    pub fn field_changed(&self, field: &str) -> FormResult<bool> {
        let state = read_lock(&self.state, "checking changed field")?;
        Ok(!state.model.field_eq(&state.original, field))
    }

    /// Restores every field and the original snapshot from the defaults and clears errors.
    pub fn reset(&self) -> FormResult<&Self> {
        self.apply_reset(&self.defaults)
    }

    /// Like [`reset`](Self::reset) but takes the values from `source`, which also becomes the
    /// new original snapshot.
    pub fn reset_to(&self, source: T) -> FormResult<&Self> {
        self.apply_reset(&source)
    }

    /// Resets from a loosely typed source. Fields missing from `source`, or whose value does
    /// not fit the field type, take their default value.
    pub fn reset_with(&self, source: &Map<String, Value>) -> FormResult<&Self> {
        let mut resolved = (*self.defaults).clone();
        for key in T::field_keys() {
            let Some(value) = source.get(key.as_str()) else {
                continue;
            };
            if let Err(error) = resolved.set_field_value(key.as_str(), value.clone()) {
                log::debug!(
                    "{}: ignoring reset value for `{key}`: {error}",
                    self.id
                );
            }
        }
        self.apply_reset(&resolved)
    }

    fn apply_reset(&self, source: &T) -> FormResult<&Self> {
        {
            let mut state = write_lock(&self.state, "resetting form")?;
            state.errors.clear();
            for key in T::field_keys() {
                state.model.copy_field(source, key.as_str());
                state.original.copy_field(source, key.as_str());
            }
            state.submit_state = SubmitState::Idle;
        }
        log::trace!("{}: reset", self.id);
        self.emit(FormEvent::Reset)?;
        Ok(self)
    }

    pub fn get<L>(&self, lens: L) -> FormResult<L::Value>
    where
        L: FieldLens<T>,
    {
        let state = read_lock(&self.state, "reading field value")?;
        Ok(lens.get(&state.model).clone())
    }

    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        {
            let mut state = write_lock(&self.state, "writing field value")?;
            lens.set(&mut state.model, value);
        }
        self.emit(FormEvent::FieldsChanged)
    }

    /// Mutates the live model.
    ///
    /// `f` runs on a copy without holding the state lock, so it may call back into the form.
    /// The copy replaces the live model afterwards, overwriting field writes made from inside
    /// `f`.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> FormResult<R> {
        let mut model = self.model()?;
        let result = f(&mut model);
        write_lock(&self.state, "updating form model")?.model = model;
        self.emit(FormEvent::FieldsChanged)?;
        Ok(result)
    }

    pub fn model(&self) -> FormResult<T> {
        Ok(read_lock(&self.state, "reading form model")?.model.clone())
    }

    pub fn original(&self) -> FormResult<T> {
        Ok(read_lock(&self.state, "reading original model")?
            .original
            .clone())
    }

    pub fn errors(&self) -> FormResult<ErrorBag> {
        Ok(read_lock(&self.state, "reading errors")?.errors.clone())
    }

    /// Runs `f` on a copy of the error bag, outside the state lock.
    pub fn with_errors<R>(&self, f: impl FnOnce(&ErrorBag) -> R) -> FormResult<R> {
        let errors = self.errors()?;
        Ok(f(&errors))
    }

    pub fn add_error(&self, field: impl Into<String>, message: impl Into<String>) -> FormResult<()> {
        self.mutate_errors("adding error", |errors| errors.add(field, message))
    }

    pub fn clear_errors(&self) -> FormResult<()> {
        self.mutate_errors("clearing all errors", ErrorBag::clear)
    }

    pub fn clear_field_errors(&self, field: &str) -> FormResult<()> {
        self.mutate_errors("clearing field errors", |errors| errors.clear_field(field))
    }

    pub(super) fn mutate_errors(
        &self,
        context: &'static str,
        f: impl FnOnce(&mut ErrorBag),
    ) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, context)?;
            f(&mut state.errors);
        }
        self.emit(FormEvent::ErrorsChanged)
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submit state")?.in_flight > 0)
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            model: state.model.clone(),
            errors: state.errors.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: state.is_dirty(),
            is_submitting: state.in_flight > 0,
        })
    }
}

pub(super) fn model_data<T>(model: &T) -> FormResult<Map<String, Value>>
where
    T: FormModel,
{
    let mut data = Map::new();
    for key in T::field_keys() {
        if let Some(value) = model.field_value(key.as_str())? {
            data.insert(key.as_str().to_owned(), value);
        }
    }
    Ok(data)
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
