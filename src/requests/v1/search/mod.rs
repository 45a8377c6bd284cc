use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::security::{Field, Rule, Screened};

#[derive(Clone, Debug, Default, Deserialize, Serialize, IntoParams, PartialEq, Eq)]
pub struct SearchQuery {
    /// Substring of the username, matched literally
    #[serde(default)]
    #[param(example = "john")]
    pub q: String,
}

impl SearchQuery {
    pub fn is_blank(&self) -> bool {
        self.q.trim().is_empty()
    }
}

impl Screened for SearchQuery {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("q", &self.q, Rule::SearchQuery)]
    }
}
