use std::ops::ControlFlow;

use serde_json::Value;

use super::controller::FieldKey;

/// Typed access to a single field of a form model.
///
/// Lenses are generated by `#[derive(FormModel)]`; `ProfileForm::fields().email()` yields the
/// lens for the `email` field.
pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

/// A form schema: a struct whose named fields are the fields of the form.
///
/// The field set is fixed by the type. Name-based methods take `&str` so that field names
/// coming from a server response can be looked up; unknown names are never an error.
pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Field keys in declaration order.
    fn field_keys() -> &'static [FieldKey];

    /// JSON value of the named field, `Ok(None)` when the model has no such field.
    fn field_value(&self, key: &str) -> serde_json::Result<Option<Value>>;

    /// Overwrites the named field from a JSON value. Returns `Ok(false)` for unknown fields.
    fn set_field_value(&mut self, key: &str, value: Value) -> serde_json::Result<bool>;

    /// Compares one field of two models. Unknown fields compare equal.
    fn field_eq(&self, other: &Self, key: &str) -> bool;

    fn copy_field(&mut self, source: &Self, key: &str) -> bool;

    fn has_field(key: &str) -> bool {
        Self::field_keys().iter().any(|field| field.as_str() == key)
    }
}

/// Result of a visitor passed to [`Form::each`](super::Form::each).
///
/// Returning `()` keeps walking; `false` or `ControlFlow::Break` stops the walk.
pub trait Visit {
    fn keep_going(self) -> bool;
}

impl Visit for () {
    fn keep_going(self) -> bool {
        true
    }
}

impl Visit for bool {
    fn keep_going(self) -> bool {
        self
    }
}

impl Visit for ControlFlow<()> {
    fn keep_going(self) -> bool {
        self.is_continue()
    }
}
