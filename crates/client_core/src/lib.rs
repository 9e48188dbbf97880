//! Page controller for the student marks dashboard.
//!
//! The controller owns the add/edit/delete workflows of a rendered student
//! table. It talks to the page through the [`page::Page`] capability and to
//! the server through [`transport::StudentApi`], so the same workflows drive
//! the in-memory [`document::Document`] used by the CLI and tests.

pub mod controller;
pub mod document;
pub mod error;
pub mod notify;
pub mod page;
pub mod row;
pub mod settings;
pub mod transport;
pub mod validation;

pub use controller::{PageContext, PageEvent, StudentController};
pub use document::Document;
pub use error::{ControllerError, TransportError};
pub use settings::{load_settings, ControllerSettings, TokenTransport};
pub use transport::{CsrfToken, HttpStudentApi, StudentApi};
