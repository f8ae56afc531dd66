use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Event body sent to the calendar API on create and patch. Absent fields
/// are left out of the JSON so a patch only touches what was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conference_data: Option<ConferenceData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

impl EventTime {
    pub fn new(date_time: &str, time_zone: &str) -> Self {
        Self {
            date_time: date_time.to_string(),
            time_zone: time_zone.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attendee {
    pub email: String,
}

pub fn attendees(emails: &[String]) -> Vec<Attendee> {
    emails
        .iter()
        .map(|email| Attendee {
            email: email.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: CreateConferenceRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    pub conference_solution_key: ConferenceSolutionKey,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ConferenceData {
    /// Ask the API to attach a new Meet conference.
    pub fn hangouts_meet() -> Self {
        Self {
            create_request: CreateConferenceRequest {
                conference_solution_key: ConferenceSolutionKey {
                    kind: "hangoutsMeet".to_string(),
                },
                request_id: Uuid::new_v4().simple().to_string(),
            },
        }
    }
}

/// `conferenceDataVersion` query value.
pub fn conference_data_version(include_meet: bool) -> &'static str {
    if include_meet { "1" } else { "0" }
}

/// Event resource as returned by the API. Only the fields we project are read.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEventList {
    #[serde(default)]
    pub items: Vec<RemoteEvent>,
}

/// Listing entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<RemoteEvent> for EventSummary {
    fn from(event: RemoteEvent) -> Self {
        Self {
            id: event.id,
            summary: event.summary,
            start: event.start,
            end: event.end,
            location: event.location,
        }
    }
}
