use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RRuleFrequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

/// Recurrence rule options carried as plain data.
///
/// The facade never expands a rule into occurrences itself, that is the
/// job of the recurrence engine behind the `Occurrence Store`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RRuleOptions {
    pub freq: RRuleFrequency,
    pub interval: isize,
    pub count: Option<i32>,
    pub until: Option<i64>,
}

impl Default for RRuleOptions {
    fn default() -> Self {
        Self {
            freq: RRuleFrequency::Daily,
            interval: 1,
            count: None,
            until: None,
        }
    }
}
