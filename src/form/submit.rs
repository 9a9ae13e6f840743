use serde_json::Value;

use super::controller::{Form, FormError, FormResult, SubmitState, model_data, write_lock};
use super::events::FormEvent;
use super::model::FormModel;
use super::options::SubmitOverlap;
use crate::http::{HttpResponse, Method};

/// What a successful submit resolves with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ResponseMode {
    /// Only the response body.
    #[default]
    DataOnly,
    /// The whole response, status included.
    Full,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Submitted {
    Data(Value),
    Response(HttpResponse),
}

impl Submitted {
    pub fn data(&self) -> &Value {
        match self {
            Submitted::Data(data) => data,
            Submitted::Response(response) => &response.data,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Submitted::Data(data) => data,
            Submitted::Response(response) => response.data,
        }
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Submitted::Data(_) => None,
            Submitted::Response(response) => Some(response),
        }
    }
}

impl<T> Form<T>
where
    T: FormModel,
{
    pub async fn post(&self, url: &str, mode: ResponseMode) -> FormResult<Submitted> {
        self.submit(Method::Post, url, mode, true).await
    }

    pub async fn put(&self, url: &str, mode: ResponseMode) -> FormResult<Submitted> {
        self.submit(Method::Put, url, mode, true).await
    }

    pub async fn patch(&self, url: &str, mode: ResponseMode) -> FormResult<Submitted> {
        self.submit(Method::Patch, url, mode, true).await
    }

    /// Sends a DELETE without a body.
    pub async fn delete(&self, url: &str, mode: ResponseMode) -> FormResult<Submitted> {
        self.submit(Method::Delete, url, mode, false).await
    }

    /// Sends the form through the HTTP client.
    ///
    /// With `send_data` the current [`data`](Self::data) is the request body. A rejected
    /// request is recorded into the error bag through [`on_fail`](Self::on_fail) and then
    /// returned as `FormError::Http` carrying the client's error unchanged. A successful
    /// request leaves the values and the original snapshot alone.
    pub async fn submit(
        &self,
        method: Method,
        url: &str,
        mode: ResponseMode,
        send_data: bool,
    ) -> FormResult<Submitted> {
        let (body, mut in_flight) = self.begin_submit(send_data)?;
        self.emit(FormEvent::SubmitStateChanged(SubmitState::Submitting))?;
        log::debug!("{}: submitting {method} {url}", self.id);

        let result = self.client.request(method, url, body).await;
        in_flight.outcome = match result {
            Ok(_) => SubmitState::Succeeded,
            Err(_) => SubmitState::Failed,
        };
        match result {
            Ok(response) => {
                log::debug!(
                    "{}: {method} {url} settled with {} {}",
                    self.id,
                    response.status,
                    response.status_text
                );
                drop(in_flight);
                Ok(match mode {
                    ResponseMode::DataOnly => Submitted::Data(response.data),
                    ResponseMode::Full => Submitted::Response(response),
                })
            }
            Err(error) => {
                log::warn!("{}: {method} {url} failed: {error}", self.id);
                match &error.response {
                    Some(response) => {
                        self.on_fail(&response.data, response.status, &response.status_text)?;
                    }
                    None => {
                        let general = self.options.general_field.to_string();
                        let message = error.message.clone();
                        self.mutate_errors("recording transport failure", |errors| {
                            errors.record([(general, message)]);
                        })?;
                    }
                }
                drop(in_flight);
                Err(FormError::Http(error))
            }
        }
    }

    /// Records a failed response into the error bag.
    ///
    /// Validation statuses (422 unless configured otherwise) carry a field map in their body,
    /// which replaces the recorded errors. Any other status replaces them with a single
    /// `"<status> <status_text>"` message on the general field.
    pub fn on_fail(&self, body: &Value, status: u16, status_text: &str) -> FormResult<&Self> {
        if self.options.validation_status.matches(status) {
            let fields = match &self.options.errors_key {
                Some(key) => body.get(key.as_str()),
                None => Some(body),
            };
            log::trace!("{}: recording validation errors from {status}", self.id);
            self.mutate_errors("recording validation errors", |errors| match fields {
                Some(fields) => errors.record_value(fields),
                None => errors.clear(),
            })?;
        } else {
            let general = self.options.general_field.to_string();
            let message = format!("{status} {status_text}");
            self.mutate_errors("recording general error", |errors| {
                errors.record([(general, message)]);
            })?;
        }
        Ok(self)
    }

    fn begin_submit(&self, send_data: bool) -> FormResult<(Option<Value>, InFlight<'_, T>)> {
        let mut state = write_lock(&self.state, "preparing submit")?;
        if self.options.overlap == SubmitOverlap::Reject && state.in_flight > 0 {
            return Err(FormError::AlreadySubmitting);
        }
        let body = if send_data {
            Some(Value::Object(model_data(&state.model)?))
        } else {
            None
        };
        state.in_flight += 1;
        state.submit_count = state.submit_count.saturating_add(1);
        state.submit_state = SubmitState::Submitting;
        Ok((
            body,
            InFlight {
                form: self,
                outcome: SubmitState::Idle,
            },
        ))
    }
}

/// One request in flight. Dropping it settles the form's submit bookkeeping, so a submit
/// future dropped before the client answers counts as settled with `outcome` still `Idle`.
struct InFlight<'a, T>
where
    T: FormModel,
{
    form: &'a Form<T>,
    outcome: SubmitState,
}

impl<T> Drop for InFlight<'_, T>
where
    T: FormModel,
{
    fn drop(&mut self) {
        let settled = match write_lock(&self.form.state, "completing submit") {
            Ok(mut state) => {
                state.in_flight = state.in_flight.saturating_sub(1);
                if state.in_flight == 0 {
                    state.submit_state = self.outcome;
                    true
                } else {
                    false
                }
            }
            Err(error) => {
                log::warn!("{}: {error}", self.form.id);
                false
            }
        };
        if self.outcome == SubmitState::Idle {
            log::debug!("{}: submit dropped before it settled", self.form.id);
        }
        if !settled {
            return;
        }
        if let Err(error) = self.form.emit(FormEvent::SubmitStateChanged(self.outcome)) {
            log::warn!("{}: {error}", self.form.id);
        }
    }
}
