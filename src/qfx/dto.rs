use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::QfxDate;
use crate::errors::{RewriteError, RewriteResult};
use crate::xml::{Element, pretty_print};

#[derive(Debug, Deserialize)]
pub(super) struct StmtTrnRaw {
    #[serde(rename = "TRNTYPE", default)]
    trn_type: Option<String>,
    #[serde(rename = "DTPOSTED", default)]
    dt_posted: Option<QfxDate>,
    #[serde(rename = "TRNAMT", default)]
    amount: Option<String>,
    #[serde(rename = "FITID", default)]
    fitid: Option<String>,
    #[serde(rename = "NAME", default)]
    name: Option<String>,
    #[serde(rename = "MEMO", default)]
    memo: Option<String>,
}

/// Typed view of a `STMTTRN` node, used for log lines and error context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionInfo {
    pub trn_type: Option<String>,
    pub posted: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub fitid: Option<String>,
    pub name: Option<String>,
    pub memo: Option<String>,
}

impl TransactionInfo {
    /// Read the standard transaction fields out of a `STMTTRN` element.
    pub fn from_element(element: &Element) -> RewriteResult<Self> {
        let xml = pretty_print(element)?;
        let raw: StmtTrnRaw = serde_xml_rs::from_str(&xml)
            .map_err(|e| RewriteError::ParseFailed(format!("transaction fields: {e}")))?;
        raw.try_into()
    }

    /// Short human label, e.g. `FITID 201910040001 on 2019-10-04 (-10.00)`.
    pub fn label(&self) -> String {
        let mut label = format!("FITID {}", self.fitid.as_deref().unwrap_or("?"));
        if let Some(posted) = self.posted {
            label.push_str(&format!(" on {posted}"));
        }
        if let Some(amount) = self.amount {
            label.push_str(&format!(" ({amount})"));
        }
        label
    }
}

impl TryFrom<StmtTrnRaw> for TransactionInfo {
    type Error = RewriteError;

    fn try_from(raw: StmtTrnRaw) -> Result<Self, Self::Error> {
        let posted = raw
            .dt_posted
            .as_ref()
            .map(NaiveDate::try_from)
            .transpose()?;
        let amount = raw
            .amount
            .as_deref()
            .map(|a| Decimal::from_str(a.trim()))
            .transpose()
            .map_err(|e| RewriteError::ParseFailed(format!("Invalid amount: {e}")))?;

        Ok(TransactionInfo {
            trn_type: raw.trn_type,
            posted,
            amount,
            fitid: raw.fitid,
            name: raw.name,
            memo: raw.memo,
        })
    }
}
