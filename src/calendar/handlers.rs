//! The four calendar operations.
//!
//! Each exported handler follows the plugin convention: read one JSON blob
//! from the host input, make one call to the calendar API, write one JSON
//! blob to the host output, and return 0 on success or 1 on failure. The
//! work itself is done by a function returning `Result<Value, ToolError>`;
//! the ambient wrapper only moves text in and out.

use chrono::{SecondsFormat, TimeDelta, Utc};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::args::{
    self, CreateEventArgs, DeleteEventArgs, ListEventsArgs, UpdateEventArgs, present,
};
use super::event::{
    ConferenceData, EventBody, EventSummary, EventTime, RemoteEvent, RemoteEventList, attendees,
    conference_data_version,
};
use super::http::{HttpRequest, HttpResponse};
use crate::config::{CalendarSettings, CredentialMode};
use crate::error::ToolError;
use crate::plugin::host::PluginHost;
use crate::tools::catalog::ToolId;

/// Handler signature shared by all four operations.
pub type HandlerFn = fn(&PluginHost) -> i32;

pub const DEFAULT_MAX_RESULTS: u32 = 10;

pub fn list_events(host: &PluginHost) -> i32 {
    run(host, ToolId::ListEvents, fetch_events)
}

pub fn create_event(host: &PluginHost) -> i32 {
    run(host, ToolId::CreateEvent, insert_event)
}

pub fn update_event(host: &PluginHost) -> i32 {
    run(host, ToolId::UpdateEvent, patch_event)
}

pub fn delete_event(host: &PluginHost) -> i32 {
    run(host, ToolId::DeleteEvent, remove_event)
}

/// The handler registered for each tool.
pub fn handler_for(id: ToolId) -> HandlerFn {
    match id {
        ToolId::ListEvents => list_events,
        ToolId::CreateEvent => create_event,
        ToolId::UpdateEvent => update_event,
        ToolId::DeleteEvent => delete_event,
    }
}

fn run<T, F>(host: &PluginHost, id: ToolId, op: F) -> i32
where
    T: DeserializeOwned,
    F: FnOnce(&PluginHost, T) -> Result<Value, ToolError>,
{
    let outcome = host
        .input_string()
        .map_err(|e| {
            tracing::debug!(tool = %id, error = %e, "no input for handler");
            ToolError::Input("Invalid JSON input".to_string())
        })
        .and_then(|input| args::from_input::<T>(id, &input))
        .and_then(|parsed| op(host, parsed));

    match outcome {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            host.output_string(&text);
            0
        }
        Err(err) => {
            host.output_string(&json!({ "error": err.to_string() }).to_string());
            1
        }
    }
}

pub fn fetch_events(host: &PluginHost, args: ListEventsArgs) -> Result<Value, ToolError> {
    let token = access_token(host, &args.access_token)?;

    let max_results = args.max_results()?.unwrap_or(DEFAULT_MAX_RESULTS);

    let now = Utc::now();
    let days_back = args.days_back.unwrap_or(0.0);
    let time_min = day_span(days_back)
        .and_then(|d| now.checked_sub_signed(d))
        .ok_or_else(|| ToolError::Input(format!("daysBack out of range: {days_back}")))?;

    let mut query = vec![
        ("orderBy", "startTime".to_string()),
        ("singleEvents", "true".to_string()),
        ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Millis, true)),
    ];
    if let Some(days_forward) = args.days_forward {
        let time_max = day_span(days_forward)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| ToolError::Input(format!("daysForward out of range: {days_forward}")))?;
        query.push(("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    if max_results > 0 {
        query.push(("maxResults", max_results.to_string()));
    }

    let url = events_url(host.settings(), None, &query)?;
    let response = send(
        host,
        ToolId::ListEvents,
        HttpRequest {
            method: Method::GET,
            url,
            headers: auth_headers(token, false),
            body: None,
        },
    )?;

    let list: RemoteEventList = parse_body(&response)?;
    let events: Vec<EventSummary> = list.items.into_iter().map(Into::into).collect();
    Ok(json!({
        "count": events.len(),
        "events": events,
    }))
}

pub fn insert_event(host: &PluginHost, args: CreateEventArgs) -> Result<Value, ToolError> {
    let (summary, start, end) = args.required()?;
    let token = access_token(host, &args.access_token)?;
    let settings = host.settings();
    let include_meet = args.include_google_meet_details.unwrap_or(false);

    let body = EventBody {
        summary: Some(summary.to_string()),
        location: args.location.clone(),
        description: args.description.clone(),
        start: Some(EventTime::new(start, &settings.time_zone)),
        end: Some(EventTime::new(end, &settings.time_zone)),
        attendees: Some(attendees(args.attendees.as_deref().unwrap_or_default())),
        conference_data: include_meet.then(ConferenceData::hangouts_meet),
    };

    let url = events_url(
        settings,
        None,
        &[(
            "conferenceDataVersion",
            conference_data_version(include_meet).to_string(),
        )],
    )?;
    let response = send(
        host,
        ToolId::CreateEvent,
        json_request(Method::POST, url, token, &body)?,
    )?;

    let created: RemoteEvent = parse_body(&response)?;
    Ok(json!({
        "id": created.id,
        "message": "Event created successfully",
    }))
}

pub fn patch_event(host: &PluginHost, args: UpdateEventArgs) -> Result<Value, ToolError> {
    let event_id = args.event_id()?;
    let token = access_token(host, &args.access_token)?;
    let settings = host.settings();
    let include_meet = args.include_google_meet_details.unwrap_or(false);

    // Conference data is left alone on update; the flag only selects the API version.
    let body = EventBody {
        summary: args.summary.clone(),
        location: args.location.clone(),
        description: args.description.clone(),
        start: args
            .start
            .as_deref()
            .map(|s| EventTime::new(s, &settings.time_zone)),
        end: args
            .end
            .as_deref()
            .map(|e| EventTime::new(e, &settings.time_zone)),
        attendees: args.attendees.as_deref().map(attendees),
        conference_data: None,
    };

    let url = events_url(
        settings,
        Some(event_id),
        &[(
            "conferenceDataVersion",
            conference_data_version(include_meet).to_string(),
        )],
    )?;
    let response = send(
        host,
        ToolId::UpdateEvent,
        json_request(Method::PATCH, url, token, &body)?,
    )?;

    let updated: RemoteEvent = parse_body(&response)?;
    Ok(json!({
        "id": updated.id,
        "message": "Event updated successfully",
    }))
}

pub fn remove_event(host: &PluginHost, args: DeleteEventArgs) -> Result<Value, ToolError> {
    let event_id = args.event_id()?;
    let token = access_token(host, &args.access_token)?;

    let url = events_url(host.settings(), Some(event_id), &[])?;
    // Success bodies are empty (204) and never read.
    send(
        host,
        ToolId::DeleteEvent,
        HttpRequest {
            method: Method::DELETE,
            url,
            headers: auth_headers(token, false),
            body: None,
        },
    )?;

    Ok(json!({ "message": "Event deleted successfully" }))
}

/// A possibly fractional number of days, to millisecond precision.
fn day_span(days: f64) -> Option<TimeDelta> {
    let millis = (days * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

/// Resolve the bearer token for this call according to the credential mode.
fn access_token<'a>(
    host: &'a PluginHost,
    from_args: &'a Option<String>,
) -> Result<&'a str, ToolError> {
    let settings = host.settings();
    args::check_token_argument(from_args, settings.credential_mode)?;
    match settings.credential_mode {
        CredentialMode::PerCall => present(from_args).ok_or_else(|| ToolError::missing("accessToken")),
        CredentialMode::ProcessConfig => host
            .config_get(&settings.credential_key)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ToolError::Input(format!(
                    "Missing access token: {} is not configured",
                    settings.credential_key
                ))
            }),
    }
}

/// `{api_base}/calendars/{calendar}/events[/{event_id}]?{query}`
fn events_url(
    settings: &CalendarSettings,
    event_id: Option<&str>,
    query: &[(&str, String)],
) -> Result<String, ToolError> {
    let mut url = Url::parse(&settings.api_base)
        .map_err(|e| ToolError::Internal(format!("invalid calendar API base url: {e}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ToolError::Internal("calendar API base url cannot be a base".to_string()))?;
        segments
            .pop_if_empty()
            .extend(["calendars", settings.calendar_id.as_str(), "events"]);
        if let Some(id) = event_id {
            segments.push(id);
        }
    }
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url.to_string())
}

fn auth_headers(token: &str, json_body: bool) -> Vec<(String, String)> {
    let mut headers = vec![("Authorization".to_string(), format!("Bearer {token}"))];
    if json_body {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

fn json_request<B: Serialize>(
    method: Method,
    url: String,
    token: &str,
    body: &B,
) -> Result<HttpRequest, ToolError> {
    let body = serde_json::to_string(body)
        .map_err(|e| ToolError::Internal(format!("failed to encode event: {e}")))?;
    Ok(HttpRequest {
        method,
        url,
        headers: auth_headers(token, true),
        body: Some(body),
    })
}

/// Exactly one outbound request. Non-2xx is a remote error; nothing is retried.
fn send(host: &PluginHost, id: ToolId, request: HttpRequest) -> Result<HttpResponse, ToolError> {
    tracing::debug!(tool = %id, method = %request.method, "calling calendar API");
    let response = host
        .http()
        .request(&request)
        .map_err(|e| ToolError::Transport {
            op: id.operation(),
            message: e.to_string(),
        })?;
    tracing::debug!(tool = %id, status = response.status, "calendar API responded");

    if !response.is_success() {
        return Err(ToolError::Remote {
            op: id.operation(),
            status: response.status,
            body: response.body,
        });
    }
    Ok(response)
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ToolError> {
    serde_json::from_str(&response.body).map_err(|_| ToolError::ResponseParse)
}
