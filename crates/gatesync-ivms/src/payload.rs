//! IVMS wire types (ISAPI-style JSON) and their conversion to
//! [`AccessIdentity`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use gatesync_core::record::AccessIdentity;

use crate::{Error, Result};

// ─── Vendor timestamps ───────────────────────────────────────────────────────

/// IVMS timestamps carry no zone designator (`2025-02-07T23:59:59`). They
/// are treated uniformly as UTC on the way in and out.
const VENDOR_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_vendor_dt(s: &str) -> Result<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(s, VENDOR_DT_FORMAT)
    .map(|naive| naive.and_utc())
    .map_err(|_| Error::Timestamp(s.to_string()))
}

pub fn format_vendor_dt(dt: DateTime<Utc>) -> String {
  dt.format(VENDOR_DT_FORMAT).to_string()
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// `POST /ISAPI/AccessControl/UserInfo/Search` request body.
#[derive(Debug, Serialize)]
pub struct UserInfoSearchRequest {
  #[serde(rename = "UserInfoSearchCond")]
  pub cond: UserInfoSearchCond,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoSearchCond {
  #[serde(rename = "searchID")]
  pub search_id:              String,
  pub search_result_position: u32,
  pub max_results:            u32,
}

impl UserInfoSearchRequest {
  pub fn page(search_id: &str, position: u32, max_results: u32) -> Self {
    Self {
      cond: UserInfoSearchCond {
        search_id: search_id.to_string(),
        search_result_position: position,
        max_results,
      },
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct UserInfoSearchResponse {
  #[serde(rename = "UserInfoSearchResult")]
  pub result: UserInfoSearchResult,
}

#[derive(Debug, Deserialize)]
pub struct UserInfoSearchResult {
  #[serde(rename = "responseStatusStrg", default)]
  pub response_status: Option<String>,
  #[serde(rename = "numOfMatches", default)]
  pub num_of_matches:  u32,
  #[serde(rename = "totalMatches", default)]
  pub total_matches:   u32,
  #[serde(rename = "UserInfo", default)]
  pub user_info:       Vec<UserInfo>,
}

/// One identity as the terminal reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
  #[serde(rename = "employeeNo")]
  pub employee_no: String,
  #[serde(default)]
  pub name:        Option<String>,
  #[serde(default)]
  pub email:       Option<String>,
  #[serde(rename = "phoneNo", default)]
  pub phone_no:    Option<String>,
  #[serde(rename = "Valid")]
  pub valid:       ValidPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidPeriod {
  pub enable:     bool,
  #[serde(rename = "beginTime")]
  pub begin_time: String,
  #[serde(rename = "endTime")]
  pub end_time:   String,
}

// ─── Modify ──────────────────────────────────────────────────────────────────

/// `PUT /ISAPI/AccessControl/UserInfo/Modify` request body.
#[derive(Debug, Serialize)]
pub struct UserInfoModifyRequest {
  #[serde(rename = "UserInfo")]
  pub user_info: UserInfoModify,
}

#[derive(Debug, Serialize)]
pub struct UserInfoModify {
  #[serde(rename = "employeeNo")]
  pub employee_no: String,
  #[serde(rename = "Valid")]
  pub valid:       ValidPeriod,
}

impl UserInfoModifyRequest {
  pub fn new(
    employee_no: &str,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
  ) -> Self {
    Self {
      user_info: UserInfoModify {
        employee_no: employee_no.to_string(),
        valid:       ValidPeriod {
          enable:     true,
          begin_time: format_vendor_dt(valid_from),
          end_time:   format_vendor_dt(valid_until),
        },
      },
    }
  }
}

/// Outcome envelope returned by write endpoints.
#[derive(Debug, Deserialize)]
pub struct ResponseStatus {
  #[serde(rename = "statusCode", default)]
  pub status_code:   i32,
  #[serde(rename = "statusString", default)]
  pub status_string: Option<String>,
  #[serde(rename = "subStatusCode", default)]
  pub sub_status_code: Option<String>,
}

impl ResponseStatus {
  /// ISAPI reports success as `statusCode == 1`.
  pub fn is_ok(&self) -> bool { self.status_code == 1 }
}

// ─── Conversion ──────────────────────────────────────────────────────────────

/// Convert one vendor user into an [`AccessIdentity`]. A blank email is
/// normalised to `None`; the matcher never sees empty strings as keys.
pub fn to_identity(user: UserInfo) -> Result<AccessIdentity> {
  let valid_from = parse_vendor_dt(&user.valid.begin_time)?;
  let valid_until = parse_vendor_dt(&user.valid.end_time)?;
  Ok(AccessIdentity {
    identity_id: user.employee_no,
    email: user.email.filter(|e| !e.trim().is_empty()),
    valid_from,
    valid_until,
    enabled: user.valid.enable,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const SAMPLE: &str = r#"
{
  "UserInfoSearchResult": {
    "searchID": "c4f1c1f4",
    "responseStatusStrg": "OK",
    "numOfMatches": 2,
    "totalMatches": 2,
    "UserInfo": [
      {
        "employeeNo": "00000051",
        "name": "Luka Starcevic",
        "gender": "male",
        "email": "luka.starcevic@example.com",
        "phoneNo": "",
        "Valid": {
          "enable": true,
          "beginTime": "2025-02-04T00:00:00",
          "endTime": "2025-03-06T23:59:59"
        }
      },
      {
        "employeeNo": "00000058",
        "name": "Gregor Kos",
        "gender": "male",
        "email": "",
        "phoneNo": "+38671234567",
        "Valid": {
          "enable": false,
          "beginTime": "2024-01-01T00:00:00",
          "endTime": "2024-06-01T00:00:00"
        }
      }
    ]
  }
}
"#;

  #[test]
  fn deserializes_search_response() {
    let resp: UserInfoSearchResponse = serde_json::from_str(SAMPLE).unwrap();
    assert_eq!(resp.result.total_matches, 2);
    assert_eq!(resp.result.user_info.len(), 2);
    assert_eq!(resp.result.user_info[0].employee_no, "00000051");
  }

  #[test]
  fn converts_user_to_identity() {
    let resp: UserInfoSearchResponse = serde_json::from_str(SAMPLE).unwrap();
    let identity = to_identity(resp.result.user_info[0].clone()).unwrap();

    assert_eq!(identity.identity_id, "00000051");
    assert_eq!(identity.email.as_deref(), Some("luka.starcevic@example.com"));
    assert!(identity.enabled);
    assert_eq!(
      identity.valid_until,
      "2025-03-06T23:59:59Z".parse::<DateTime<Utc>>().unwrap()
    );
  }

  #[test]
  fn blank_email_becomes_none() {
    let resp: UserInfoSearchResponse = serde_json::from_str(SAMPLE).unwrap();
    let identity = to_identity(resp.result.user_info[1].clone()).unwrap();
    assert_eq!(identity.email, None);
    assert!(!identity.enabled);
  }

  #[test]
  fn garbled_valid_period_is_an_error() {
    let user = UserInfo {
      employee_no: "00000099".to_string(),
      name:        None,
      email:       None,
      phone_no:    None,
      valid:       ValidPeriod {
        enable:     true,
        begin_time: "not-a-date".to_string(),
        end_time:   "2025-03-06T23:59:59".to_string(),
      },
    };
    assert!(matches!(to_identity(user).unwrap_err(), Error::Timestamp(_)));
  }

  #[test]
  fn modify_request_serializes_to_vendor_shape() {
    let req = UserInfoModifyRequest::new(
      "00000051",
      "2025-02-04T00:00:00Z".parse().unwrap(),
      "2025-03-06T23:59:59Z".parse().unwrap(),
    );

    assert_eq!(
      serde_json::to_value(&req).unwrap(),
      json!({
        "UserInfo": {
          "employeeNo": "00000051",
          "Valid": {
            "enable": true,
            "beginTime": "2025-02-04T00:00:00",
            "endTime": "2025-03-06T23:59:59"
          }
        }
      })
    );
  }

  #[test]
  fn search_request_serializes_to_vendor_shape() {
    let req = UserInfoSearchRequest::page("abc", 30, 50);
    assert_eq!(
      serde_json::to_value(&req).unwrap(),
      json!({
        "UserInfoSearchCond": {
          "searchID": "abc",
          "searchResultPosition": 30,
          "maxResults": 50
        }
      })
    );
  }

  #[test]
  fn response_status_ok_detection() {
    let ok: ResponseStatus =
      serde_json::from_value(json!({ "statusCode": 1, "statusString": "OK" }))
        .unwrap();
    assert!(ok.is_ok());

    let failed: ResponseStatus = serde_json::from_value(
      json!({ "statusCode": 4, "statusString": "Invalid Operation", "subStatusCode": "notSupport" }),
    )
    .unwrap();
    assert!(!failed.is_ok());
  }
}
