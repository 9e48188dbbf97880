use serde::{Deserialize, Serialize};

use crate::{
    domain::{Marks, StudentId},
    error::ServerRejection,
};

pub const CREATE_STUDENT_PATH: &str = "/student/add/";

pub fn update_student_path(student_id: StudentId) -> String {
    format!("/student/{}/update/", student_id.0)
}

pub fn delete_student_path(student_id: StudentId) -> String {
    format!("/student/{}/delete/", student_id.0)
}

/// Body of every student endpoint response: `{ "success": bool, "errors"?: [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
        }
    }

    pub fn into_result(self) -> Result<(), ServerRejection> {
        if self.success {
            Ok(())
        } else {
            Err(ServerRejection::new(self.errors))
        }
    }
}

/// Field values of the add-student form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentForm {
    pub name: String,
    pub subject_name: String,
    pub marks: String,
}

impl StudentForm {
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("name".to_string(), self.name.clone()),
            ("subject_name".to_string(), self.subject_name.clone()),
            ("marks".to_string(), self.marks.clone()),
        ]
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.subject_name.is_empty() && self.marks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpdateMarksForm {
    pub marks: Marks,
}

impl UpdateMarksForm {
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![("marks".to_string(), self.marks.to_string())]
    }
}
