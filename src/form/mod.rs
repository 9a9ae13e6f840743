mod controller;
mod errors;
mod events;
mod model;
mod options;
mod submit;


pub use controller::{FieldKey, Form, FormError, FormId, FormResult, FormSnapshot, SubmitState};
pub use errors::{ErrorBag, MessageList};
pub use events::{FormEvent, SubscriptionId};
pub use formbag_derive::FormModel;
pub use model::{FieldLens, FormModel, Visit};
pub use options::{
    FormOptions, GENERAL_FIELD, StatusMatcher, SubmitOverlap, UNPROCESSABLE_ENTITY,
};
pub use submit::{ResponseMode, Submitted};
