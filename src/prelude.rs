pub use crate::form::{
    ErrorBag, FieldLens, Form, FormError, FormEvent, FormModel, FormOptions, FormResult,
    ResponseMode, StatusMatcher, SubmitOverlap, SubmitState, Submitted,
};
pub use crate::http::{BoxedHttpFuture, HttpClient, HttpError, HttpResponse, Method};
