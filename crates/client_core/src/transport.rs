use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::StudentId,
    protocol::{
        delete_student_path, update_student_path, ActionResponse, StudentForm, UpdateMarksForm,
        CREATE_STUDENT_PATH,
    },
};
use tracing::debug;

use crate::{
    error::TransportError,
    settings::{ControllerSettings, TokenTransport},
};

/// Anti-forgery token read from the rendered page.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(***)")
    }
}

#[async_trait]
pub trait StudentApi: Send + Sync {
    async fn create_student(
        &self,
        form: &StudentForm,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError>;

    async fn update_marks(
        &self,
        student_id: StudentId,
        form: UpdateMarksForm,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError>;

    async fn delete_student(
        &self,
        student_id: StudentId,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError>;
}

pub struct HttpStudentApi {
    http: Client,
    server_url: String,
    token_transport: TokenTransport,
    csrf_field_name: String,
    csrf_header_name: String,
}

impl HttpStudentApi {
    pub fn new(settings: &ControllerSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: &ControllerSettings) -> Self {
        Self {
            http,
            server_url: settings.server_url.trim_end_matches('/').to_string(),
            token_transport: settings.token_transport,
            csrf_field_name: settings.csrf_field_name.clone(),
            csrf_header_name: settings.csrf_header_name.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// One form-encoded POST. The status code is not checked: the server
    /// answers validation failures with a JSON body too, so only the body
    /// decides the outcome.
    async fn post_form(
        &self,
        path: &str,
        mut fields: Vec<(String, String)>,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError> {
        let mut request = self.http.post(self.endpoint(path));
        match self.token_transport {
            TokenTransport::Header => {
                request = request.header(self.csrf_header_name.as_str(), token.expose());
            }
            TokenTransport::FormField => {
                fields.push((self.csrf_field_name.clone(), token.expose().to_string()));
            }
        }

        let response = request.form(&fields).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(path, status = status.as_u16(), bytes = body.len(), "student endpoint responded");

        serde_json::from_slice(&body).map_err(|source| TransportError::Decode {
            status: status.as_u16(),
            source,
        })
    }
}

#[async_trait]
impl StudentApi for HttpStudentApi {
    async fn create_student(
        &self,
        form: &StudentForm,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError> {
        self.post_form(CREATE_STUDENT_PATH, form.fields(), token)
            .await
    }

    async fn update_marks(
        &self,
        student_id: StudentId,
        form: UpdateMarksForm,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError> {
        self.post_form(&update_student_path(student_id), form.fields(), token)
            .await
    }

    async fn delete_student(
        &self,
        student_id: StudentId,
        token: &CsrfToken,
    ) -> Result<ActionResponse, TransportError> {
        self.post_form(&delete_student_path(student_id), Vec::new(), token)
            .await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
