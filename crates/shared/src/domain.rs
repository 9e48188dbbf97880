use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(StudentId);
id_newtype!(NotificationId);

pub const MIN_MARKS: f64 = 0.0;
pub const MAX_MARKS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("marks must be between 0 and 100, got {0}")]
pub struct MarksOutOfRange(pub f64);

/// A score that is known to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Marks(f64);

impl Marks {
    pub fn new(value: f64) -> Result<Self, MarksOutOfRange> {
        if !value.is_finite() || !(MIN_MARKS..=MAX_MARKS).contains(&value) {
            return Err(MarksOutOfRange(value));
        }
        // Adding +0.0 folds -0 into 0.
        Ok(Self(value + 0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn grade(self) -> Grade {
        Grade::from_marks(self)
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64 Display already drops a trailing ".0", so 100 renders as "100".
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Marks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Marks::new(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    F,
}

impl Grade {
    /// Lower bounds are inclusive: 90 is an A+, 89.99 is an A.
    pub fn from_marks(marks: Marks) -> Self {
        let value = marks.value();
        if value >= 90.0 {
            Grade::APlus
        } else if value >= 80.0 {
            Grade::A
        } else if value >= 70.0 {
            Grade::B
        } else if value >= 60.0 {
            Grade::C
        } else {
            Grade::F
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }

    pub fn tone(self) -> BadgeTone {
        match self {
            Grade::APlus => BadgeTone::Success,
            Grade::A => BadgeTone::Info,
            Grade::B => BadgeTone::Primary,
            Grade::C => BadgeTone::Warning,
            Grade::F => BadgeTone::Danger,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Success,
    Info,
    Primary,
    Warning,
    Danger,
}

impl BadgeTone {
    pub fn css_class(self) -> &'static str {
        match self {
            BadgeTone::Success => "bg-success",
            BadgeTone::Info => "bg-info",
            BadgeTone::Primary => "bg-primary",
            BadgeTone::Warning => "bg-warning",
            BadgeTone::Danger => "bg-danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBadge {
    pub grade: Grade,
    pub tone: BadgeTone,
}

impl GradeBadge {
    pub fn for_marks(marks: Marks) -> Self {
        let grade = marks.grade();
        Self {
            grade,
            tone: grade.tone(),
        }
    }

    pub fn class_name(&self) -> String {
        format!("badge {}", self.tone.css_class())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Success => "alert-success",
            Severity::Warning => "alert-warning",
            Severity::Danger => "alert-danger",
        }
    }
}
