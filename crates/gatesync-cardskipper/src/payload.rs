//! Cardskipper wire types and their flattening into [`MembershipRecord`].
//!
//! The vendor nests each member's validity inside
//! `Organisations/Organisation/Roles/Role`. All of that is collapsed here;
//! the engine only ever sees the flat record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use gatesync_core::record::MembershipRecord;

use crate::{Error, Result};

// ─── Vendor timestamps ───────────────────────────────────────────────────────

/// Cardskipper timestamps carry no zone designator (`2025-02-07T23:59:59`).
/// They are treated uniformly as UTC on the way in and out.
const VENDOR_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_vendor_dt(s: &str) -> Result<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(s, VENDOR_DT_FORMAT)
    .map(|naive| naive.and_utc())
    .map_err(|_| Error::Timestamp(s.to_string()))
}

// ─── Export request ──────────────────────────────────────────────────────────

/// Body of the `POST /Member/Export` search request.
#[derive(Debug, Serialize)]
#[serde(rename = "SearchCriteriaMember")]
pub struct SearchCriteria {
  #[serde(rename = "OrganisationId")]
  pub organisation_id: i64,
}

// ─── Export response ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MemberExport {
  #[serde(rename = "Members", default)]
  pub members: MemberList,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberList {
  #[serde(rename = "Member", default)]
  pub members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
pub struct Member {
  #[serde(rename = "OrganisationMemberId")]
  pub organisation_member_id: String,
  #[serde(rename = "Firstname", default)]
  pub firstname: String,
  #[serde(rename = "Lastname", default)]
  pub lastname: String,
  #[serde(rename = "MemberCode", default)]
  pub member_code: Option<String>,
  #[serde(rename = "ContactInfo", default)]
  pub contact_info: Option<ContactInfo>,
  #[serde(rename = "Organisations", default)]
  pub organisations: Option<Organisations>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactInfo {
  #[serde(rename = "EMail", default)]
  pub email: Option<String>,
  #[serde(rename = "CellPhone1", default)]
  pub cell_phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Organisations {
  #[serde(rename = "Organisation", default)]
  pub organisations: Vec<Organisation>,
}

#[derive(Debug, Deserialize)]
pub struct Organisation {
  #[serde(rename = "@Id", default)]
  pub id: Option<i64>,
  #[serde(rename = "Roles", default)]
  pub roles: Option<Roles>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Roles {
  #[serde(rename = "Role", default)]
  pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct Role {
  #[serde(rename = "@Name", default)]
  pub name: Option<String>,
  #[serde(rename = "@StartDate")]
  pub start_date: String,
  #[serde(rename = "@EndDate")]
  pub end_date: String,
}

// ─── Flattening ──────────────────────────────────────────────────────────────

/// Collapse one vendor member into a [`MembershipRecord`].
///
/// When a member holds several roles, the one with the latest end date
/// carries the membership. Returns `Ok(None)` for members the sync cannot
/// use: no email, no role, or no role valid at `now`.
pub fn to_record(
  member: &Member,
  now: DateTime<Utc>,
) -> Result<Option<MembershipRecord>> {
  let Some(email) = member
    .contact_info
    .as_ref()
    .and_then(|c| c.email.clone())
    .filter(|e| !e.trim().is_empty())
  else {
    return Ok(None);
  };

  let mut best: Option<(DateTime<Utc>, DateTime<Utc>, Option<String>)> = None;
  for organisation in member
    .organisations
    .iter()
    .flat_map(|o| &o.organisations)
  {
    for role in organisation.roles.iter().flat_map(|r| &r.roles) {
      let start = parse_vendor_dt(&role.start_date)?;
      let end = parse_vendor_dt(&role.end_date)?;
      if best.as_ref().is_none_or(|(current, _, _)| end > *current) {
        best = Some((end, start, role.name.clone()));
      }
    }
  }

  let Some((valid_until, valid_from, role_name)) = best else {
    return Ok(None);
  };
  if valid_until <= now {
    return Ok(None);
  }

  Ok(Some(MembershipRecord {
    email,
    member_id: member.organisation_member_id.clone(),
    first_name: member.firstname.clone(),
    last_name: member.lastname.clone(),
    valid_from,
    valid_until,
    member_code: member.member_code.clone(),
    role_name,
    phone: member
      .contact_info
      .as_ref()
      .and_then(|c| c.cell_phone.clone())
      .filter(|p| !p.trim().is_empty()),
  }))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
