//! A single credit applicant, keyed by the dataset's column names.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const AGE: &str = "Age";
pub const SEX: &str = "Sex";
pub const JOB: &str = "Job";
pub const HOUSING: &str = "Housing";
pub const SAVING_ACCOUNTS: &str = "Saving accounts";
pub const CHECKING_ACCOUNT: &str = "Checking account";
pub const CREDIT_AMOUNT: &str = "Credit amount";
pub const DURATION: &str = "Duration";
pub const PURPOSE: &str = "Purpose";

/// Feature columns in dataset order, excluding the index and label
pub const RECORD_COLUMNS: [&str; 9] = [
    AGE,
    SEX,
    JOB,
    HOUSING,
    SAVING_ACCOUNTS,
    CHECKING_ACCOUNT,
    CREDIT_AMOUNT,
    DURATION,
    PURPOSE,
];

/// One applicant.
///
/// Serialises with the dataset's own column names (`"Saving accounts"`),
/// which differ from the HTTP payload names (`"Saving_accounts"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRecord {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Job")]
    pub job: i64,
    #[serde(rename = "Housing")]
    pub housing: String,
    #[serde(rename = "Saving accounts", default)]
    pub saving_accounts: Option<String>,
    #[serde(rename = "Checking account", default)]
    pub checking_account: Option<String>,
    #[serde(rename = "Credit amount")]
    pub credit_amount: f64,
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "Purpose")]
    pub purpose: String,
}

impl CreditRecord {
    /// One-row frame with the training column names.
    ///
    /// Optional accounts become typed string nulls so the categorical branch
    /// imputes them rather than seeing a `Null` dtype column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(AGE.into(), [self.age]),
            Column::new(SEX.into(), [self.sex.as_str()]),
            Column::new(JOB.into(), [self.job]),
            Column::new(HOUSING.into(), [self.housing.as_str()]),
            Column::new(SAVING_ACCOUNTS.into(), [self.saving_accounts.as_deref()]),
            Column::new(CHECKING_ACCOUNT.into(), [self.checking_account.as_deref()]),
            Column::new(CREDIT_AMOUNT.into(), [self.credit_amount]),
            Column::new(DURATION.into(), [self.duration]),
            Column::new(PURPOSE.into(), [self.purpose.as_str()]),
        ])
    }
}
