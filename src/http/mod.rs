//! The HTTP collaborator a form submits through.
//!
//! This crate does not ship a transport. Applications implement [`HttpClient`] over whatever
//! client they already use and hand it to [`Form::new`](crate::form::Form::new).

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A settled response: decoded body, numeric status and reason phrase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub data: Value,
    pub status: u16,
    pub status_text: String,
}

impl HttpResponse {
    pub fn new(status: u16, status_text: impl Into<String>, data: Value) -> Self {
        Self {
            data,
            status,
            status_text: status_text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A rejected request.
///
/// `response` is set whenever the server answered, whatever the status. Transport failures
/// (refused connection, DNS, timeouts enforced by the client) carry only a message.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpError {
    pub response: Option<HttpResponse>,
    pub message: String,
}

impl HttpError {
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            message: format!(
                "request failed with status {} {}",
                response.status, response.status_text
            ),
            response: Some(response),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            response: None,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|response| response.status)
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpResult = Result<HttpResponse, HttpError>;

pub type BoxedHttpFuture<'a> = Pin<Box<dyn Future<Output = HttpResult> + Send + 'a>>;

/// Sends requests on behalf of a form.
///
/// Implementations resolve with the response for 2xx statuses and reject with
/// [`HttpError::from_response`] for every other status the server answered with.
pub trait HttpClient: Send + Sync {
    fn request<'a>(&'a self, method: Method, url: &'a str, body: Option<Value>)
    -> BoxedHttpFuture<'a>;

    fn post<'a>(&'a self, url: &'a str, body: Option<Value>) -> BoxedHttpFuture<'a> {
        self.request(Method::Post, url, body)
    }

    fn put<'a>(&'a self, url: &'a str, body: Option<Value>) -> BoxedHttpFuture<'a> {
        self.request(Method::Put, url, body)
    }

    fn patch<'a>(&'a self, url: &'a str, body: Option<Value>) -> BoxedHttpFuture<'a> {
        self.request(Method::Patch, url, body)
    }

    fn delete<'a>(&'a self, url: &'a str, body: Option<Value>) -> BoxedHttpFuture<'a> {
        self.request(Method::Delete, url, body)
    }
}

impl<C> HttpClient for Arc<C>
where
    C: HttpClient + ?Sized,
{
    fn request<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        body: Option<Value>,
    ) -> BoxedHttpFuture<'a> {
        (**self).request(method, url, body)
    }
}

impl<C> HttpClient for &C
where
    C: HttpClient + ?Sized,
{
    fn request<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        body: Option<Value>,
    ) -> BoxedHttpFuture<'a> {
        (**self).request(method, url, body)
    }
}
