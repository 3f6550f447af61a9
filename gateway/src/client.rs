//! HTTP gateway implementation.

use crate::payloads::{
    event_form, file_part, profile_form, ErrorBody, EventsResponse, LoginRequest,
    LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse, UploadResponse,
};
use evently_core::{
    Booking, Error, Event, EventDraft, EventFilters, EventId, EventPage, Gateway, ImageFile,
    LoginOutcome, ProfileUpdate, Result, SessionHandle, User, UserId,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;

/// Environment variable holding the API base URL
pub const API_URL_VAR: &str = "EVENTLY_API_URL";

/// What a 404 on this call refers to, for error reporting
#[derive(Clone, Copy)]
enum Missing {
    Event,
    User,
    None,
}

/// HTTP client for the Evently API
///
/// The single egress point for all remote calls. Attaches the bearer token
/// from the shared [`SessionHandle`] to every request; on an unauthorized
/// response the session (memory and durable storage) is cleared before the
/// error reaches the caller. Calls are fire-once: no retries, no queuing.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<SessionHandle>,
}

impl HttpGateway {
    /// Create a gateway talking to the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: Arc<SessionHandle>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    /// Create a gateway with the base URL from `EVENTLY_API_URL`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is not set.
    pub fn from_env(session: Arc<SessionHandle>) -> Result<Self> {
        let base_url = std::env::var(API_URL_VAR)
            .map_err(|_| Error::Config(format!("{API_URL_VAR} is not set")))?;
        Ok(Self::new(base_url, session))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token when a session is active
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    /// Extract the server's error message, falling back to the status line
    async fn error_message(response: Response) -> String {
        let status = response.status();
        let fallback = format!("HTTP {}", status.as_u16());
        match response.json::<ErrorBody>().await {
            Ok(body) => body.into_message(fallback),
            Err(_) => fallback,
        }
    }

    /// Map a non-success response to the error taxonomy
    ///
    /// An unauthorized status means the token is no longer valid: the
    /// session is cleared here so every caller sees a consistent world,
    /// then the error propagates for the UI to redirect to login.
    async fn fail(&self, response: Response, missing: Missing, id: &str) -> Error {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Unauthorized response, clearing session");
            self.session.clear();
            return Error::Unauthenticated;
        }

        let message = Self::error_message(response).await;
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::Validation(message)
            },
            StatusCode::CONFLICT => Error::Conflict(message),
            StatusCode::NOT_FOUND => match missing {
                Missing::Event => Error::not_found("Event", id),
                Missing::User => Error::not_found("User", id),
                Missing::None => Error::Api {
                    status: status.as_u16(),
                    message,
                },
            },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| Error::ResponseParseFailed(e.to_string()))
    }
}

impl Gateway for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        tracing::debug!(email, "Logging in");
        let response = self
            .dispatch(
                self.client
                    .post(self.url("/login"))
                    .json(&LoginRequest { email, password }),
            )
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: LoginResponse = Self::decode(response).await?;
                Ok(LoginOutcome {
                    user: body.user,
                    token: body.token,
                })
            },
            // Bad credentials, whatever shape the server reports them in
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                Err(Error::Auth)
            },
            status => {
                let message = Self::error_message(response).await;
                Err(Error::Api {
                    status: status.as_u16(),
                    message,
                })
            },
        }
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        tracing::debug!(email, "Registering");
        let response = self
            .dispatch(self.client.post(self.url("/register")).json(&RegisterRequest {
                name,
                email,
                password,
            }))
            .await?;

        if response.status().is_success() {
            let body: RegisterResponse = Self::decode(response).await?;
            tracing::debug!(message = ?body.message, status = ?body.status, "Registered");
            return Ok(());
        }

        let message = Self::error_message(response).await;
        Err(Error::Registration(message))
    }

    async fn list_events(
        &self,
        page: u32,
        page_size: u32,
        filters: &EventFilters,
    ) -> Result<EventPage> {
        let request = self
            .authorize(self.client.get(self.url("/events")))
            .query(&[("page", page.to_string()), ("limit", page_size.to_string())])
            .query(&filters.query_pairs(self.session.is_authenticated()));

        let response = self.dispatch(request).await?;
        if response.status() == StatusCode::OK {
            let body: EventsResponse = Self::decode(response).await?;
            Ok(body.into_page(page_size))
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }

    async fn get_event(&self, id: &EventId) -> Result<Option<Event>> {
        let response = self
            .dispatch(self.authorize(self.client.get(self.url(&format!("/events/{id}")))))
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(Self::decode(response).await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(self.fail(response, Missing::None, "").await),
        }
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        let form = event_form(draft)?;
        let response = self
            .dispatch(self.authorize(self.client.post(self.url("/events")).multipart(form)))
            .await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> Result<Event> {
        let form = event_form(draft)?;
        let response = self
            .dispatch(
                self.authorize(
                    self.client
                        .put(self.url(&format!("/events/{id}")))
                        .multipart(form),
                ),
            )
            .await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(self.fail(response, Missing::Event, id.as_str()).await)
        }
    }

    async fn delete_event(&self, id: &EventId) -> Result<()> {
        let response = self
            .dispatch(self.authorize(self.client.delete(self.url(&format!("/events/{id}")))))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.fail(response, Missing::Event, id.as_str()).await)
        }
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>> {
        let response = self
            .dispatch(self.authorize(self.client.get(self.url("/events/bookings"))))
            .await?;

        if response.status() == StatusCode::OK {
            Self::decode(response).await
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }

    async fn book_event(&self, id: &EventId) -> Result<Booking> {
        tracing::debug!(event = %id, "Booking event");
        let response = self
            .dispatch(
                self.authorize(self.client.post(self.url(&format!("/events/book/{id}")))),
            )
            .await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(self.fail(response, Missing::Event, id.as_str()).await)
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let response = self
            .dispatch(self.authorize(self.client.get(self.url("/"))))
            .await?;

        if response.status() == StatusCode::OK {
            Self::decode(response).await
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }

    async fn toggle_role(&self, id: &UserId) -> Result<User> {
        let response = self
            .dispatch(self.authorize(self.client.patch(self.url(&format!("/{id}/role")))))
            .await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(self.fail(response, Missing::User, id.as_str()).await)
        }
    }

    async fn upload_profile_image(&self, file: &ImageFile) -> Result<String> {
        let form = reqwest::multipart::Form::new().part("file", file_part(file)?);
        let response = self
            .dispatch(
                self.authorize(
                    self.client
                        .post(self.url("/upload/profile-image"))
                        .multipart(form),
                ),
            )
            .await?;

        if response.status().is_success() {
            let body: UploadResponse = Self::decode(response).await?;
            tracing::debug!(message = ?body.message, "Profile image uploaded");
            Ok(body.url)
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let form = profile_form(update)?;
        let response = self
            .dispatch(self.authorize(self.client.put(self.url("/")).multipart(form)))
            .await?;

        if response.status().is_success() {
            let body: ProfileResponse = Self::decode(response).await?;
            Ok(body.user)
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }

    async fn delete_account(&self) -> Result<()> {
        let response = self
            .dispatch(self.authorize(self.client.delete(self.url("/account"))))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.fail(response, Missing::None, "").await)
        }
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
