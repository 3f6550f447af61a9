//! Wire payloads and multipart form builders for the HTTP gateway.

use evently_core::{Error, Event, EventDraft, EventPage, ImageFile, ImageSource, PageCursor, ProfileUpdate, User};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

/// Login request body
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login response body: `{token, user}`
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Registration request body
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration response body: `{message, status?}`
///
/// Carries no session; a successful registration is followed by a login.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pagination block of the events listing response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePagination {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub has_more: bool,
}

/// Events listing response: `{events, pagination}`
#[derive(Debug, Deserialize)]
pub(crate) struct EventsResponse {
    pub events: Vec<Event>,
    pub pagination: WirePagination,
}

impl EventsResponse {
    /// Convert into the domain page, keeping the requested page size
    pub(crate) fn into_page(self, page_size: u32) -> EventPage {
        EventPage {
            events: self.events,
            cursor: PageCursor {
                current_page: self.pagination.current_page,
                page_size,
                total_pages: self.pagination.total_pages,
                total_events: self.pagination.total_events,
                has_more: self.pagination.has_more,
            },
        }
    }
}

/// Profile image upload response: `{url, message}`
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Profile update response: `{message, user}`
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

/// Error response body; servers vary between `message` and `error`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self, fallback: String) -> String {
        self.message.or(self.error).unwrap_or(fallback)
    }
}

/// Build the multipart file part for an image upload
///
/// # Errors
///
/// Returns [`Error::Validation`] when the declared content type is not a
/// valid MIME string.
pub(crate) fn file_part(file: &ImageFile) -> Result<Part, Error> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match &file.content_type {
        Some(content_type) => part
            .mime_str(content_type)
            .map_err(|e| Error::Validation(format!("invalid content type: {e}"))),
        None => Ok(part),
    }
}

/// Attach an image to a form: binary uploads become the `file` part,
/// URLs become the `imageUrl` field
fn with_image(mut form: Form, image: Option<&ImageSource>) -> Result<Form, Error> {
    match image {
        Some(ImageSource::File(file)) => {
            form = form.part("file", file_part(file)?);
        },
        Some(ImageSource::Url(url)) => {
            form = form.text("imageUrl", url.clone());
        },
        None => {},
    }
    Ok(form)
}

/// Build the multipart form for an event create/update submission
///
/// # Errors
///
/// Returns [`Error::Validation`] when the image content type is malformed.
pub(crate) fn event_form(draft: &EventDraft) -> Result<Form, Error> {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("category", draft.category.clone())
        .text("date", draft.date.to_rfc3339())
        .text("venue", draft.venue.clone())
        .text("price", draft.price.to_string());

    if let Some(created_by) = &draft.created_by {
        form = form.text("createdBy", created_by.to_string());
    }

    with_image(form, draft.image.as_ref())
}

/// Build the multipart form for a profile update submission
///
/// # Errors
///
/// Returns [`Error::Validation`] when the image content type is malformed.
pub(crate) fn profile_form(update: &ProfileUpdate) -> Result<Form, Error> {
    let form = Form::new().text("name", update.name.clone());
    with_image(form, update.image.as_ref())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_message_over_error() {
        let body = ErrorBody {
            message: Some("Email already in use".to_string()),
            error: Some("conflict".to_string()),
        };
        assert_eq!(
            body.into_message("fallback".to_string()),
            "Email already in use"
        );
    }

    #[test]
    fn error_body_falls_back_when_empty() {
        let body = ErrorBody::default();
        assert_eq!(body.into_message("HTTP 500".to_string()), "HTTP 500");
    }

    #[test]
    fn events_response_preserves_requested_page_size() {
        let json = r#"{
            "events": [],
            "pagination": {"currentPage": 2, "totalPages": 5, "totalEvents": 28, "hasMore": true}
        }"#;
        let response: EventsResponse = serde_json::from_str(json).unwrap();
        let page = response.into_page(6);
        assert_eq!(page.cursor.page_size, 6);
        assert_eq!(page.cursor.current_page, 2);
        assert!(page.cursor.has_more);
    }

    #[test]
    fn file_part_rejects_bad_mime() {
        let file = ImageFile {
            file_name: "poster.jpg".to_string(),
            bytes: vec![1, 2, 3],
            content_type: Some("not a mime".to_string()),
        };
        assert!(matches!(file_part(&file), Err(Error::Validation(_))));
    }
}
