//! Client-side form state: live values tracked against their original snapshot, submitted
//! through an [`HttpClient`](http::HttpClient), with server-side validation errors collected
//! in an [`ErrorBag`](form::ErrorBag).

pub mod form;
pub mod http;
pub mod prelude;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
