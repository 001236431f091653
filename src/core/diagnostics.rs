use crate::domain::model::{Actor, Address, City, Province};
use serde::Serialize;
use std::fmt;

/// Issues a reconciliation can run into. None of them is an error: each one
/// is a handled branch with a well-defined outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconcileIssue {
    LocalLookupEmpty,
    ExternalLookupFailed,
    BothFailed,
    /// Advisory only; the first candidate is still returned.
    AmbiguousLocalMatch,
    IncomparableProvinceData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// The arm of the decision procedure that produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Branch {
    BothFailed,
    LocalMiss,
    ExternalMiss,
    NameMismatch,
    IncomparableProvince,
    Agreement,
    AmbiguousAgreement,
    ProvinceMismatch,
}

impl Branch {
    pub fn severity(self) -> Severity {
        match self {
            Branch::BothFailed => Severity::Error,
            Branch::Agreement => Severity::Info,
            _ => Severity::Warn,
        }
    }

    pub fn issue(self) -> Option<ReconcileIssue> {
        match self {
            Branch::BothFailed => Some(ReconcileIssue::BothFailed),
            Branch::LocalMiss => Some(ReconcileIssue::LocalLookupEmpty),
            Branch::ExternalMiss => Some(ReconcileIssue::ExternalLookupFailed),
            Branch::IncomparableProvince => Some(ReconcileIssue::IncomparableProvinceData),
            Branch::AmbiguousAgreement => Some(ReconcileIssue::AmbiguousLocalMatch),
            Branch::NameMismatch | Branch::Agreement | Branch::ProvinceMismatch => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Branch::BothFailed => {
                "Both the local lookup and the geocoder failed. Returning nothing."
            }
            Branch::LocalMiss => {
                "The local lookup failed, but the geocoder succeeded. Returning the geocoded city."
            }
            Branch::ExternalMiss => {
                "The geocoder failed, but the local lookup succeeded. Returning the local city."
            }
            Branch::NameMismatch => {
                "The city name differs between the local store and the geocoder. Returning the geocoded city."
            }
            Branch::IncomparableProvince => {
                "Province data is missing on one side and cannot be compared. Returning the geocoded city."
            }
            Branch::Agreement => "City name and province agree. Returning the local city.",
            Branch::AmbiguousAgreement => {
                "More than one local city shares this name and province. Returning the first one."
            }
            Branch::ProvinceMismatch => {
                "City name matches but province does not. Returning the geocoded city."
            }
        }
    }
}

/// Everything needed to debug a reconciliation after the fact. Built once per
/// call and shared by whichever branch logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub city_name: String,
    pub province_id: Option<i64>,
    pub postal_code: String,
    pub candidate_count: usize,
    pub candidates: Vec<City>,
    pub local_match: Option<City>,
    pub local_province: Option<Province>,
    pub external_address: Option<Address>,
    pub actor: Option<Actor>,
}

impl Diagnostics {
    pub fn new(
        city_name: &str,
        province_id: Option<i64>,
        postal_code: &str,
        candidates: &[City],
        external_address: Option<&Address>,
        actor: Option<&Actor>,
    ) -> Self {
        let local_match = candidates.first().cloned();
        Self {
            city_name: city_name.to_string(),
            province_id,
            postal_code: postal_code.to_string(),
            candidate_count: candidates.len(),
            candidates: candidates.to_vec(),
            local_province: local_match.as_ref().and_then(|c| c.province().cloned()),
            local_match,
            external_address: external_address.cloned(),
            actor: actor.cloned(),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
