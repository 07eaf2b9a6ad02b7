use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Classes the brain tumor model predicts, in output-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TumorClass {
    Glioma,
    Meningioma,
    NoTumor,
    Pituitary,
}

impl TumorClass {
    pub const ALL: [TumorClass; 4] = [
        TumorClass::Glioma,
        TumorClass::Meningioma,
        TumorClass::NoTumor,
        TumorClass::Pituitary,
    ];

    /// Index of the class in the model output.
    pub const fn code(self) -> i64 {
        match self {
            TumorClass::Glioma => 0,
            TumorClass::Meningioma => 1,
            TumorClass::NoTumor => 2,
            TumorClass::Pituitary => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TumorClass::Glioma => "Glioma",
            TumorClass::Meningioma => "Meningioma",
            TumorClass::NoTumor => "No tumor",
            TumorClass::Pituitary => "Pituitary",
        }
    }

    /// Folder in the labeled image bucket holding samples of this class.
    pub const fn folder_prefix(self) -> &'static str {
        match self {
            TumorClass::Glioma => "glioma/",
            TumorClass::Meningioma => "meningioma/",
            TumorClass::NoTumor => "notumor/",
            TumorClass::Pituitary => "pituitary/",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.code() == code)
    }
}

impl Display for TumorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Human readable label for a model output index, `None` outside 0..=3.
pub fn label_from_class(code: i64) -> Option<&'static str> {
    TumorClass::from_code(code).map(TumorClass::label)
}
