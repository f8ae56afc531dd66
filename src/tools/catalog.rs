use std::fmt;
use std::str::FromStr;

/// The four calendar operations, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

impl ToolId {
    pub const ALL: [ToolId; 4] = [
        ToolId::ListEvents,
        ToolId::CreateEvent,
        ToolId::UpdateEvent,
        ToolId::DeleteEvent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::ListEvents => "list_events",
            ToolId::CreateEvent => "create_event",
            ToolId::UpdateEvent => "update_event",
            ToolId::DeleteEvent => "delete_event",
        }
    }

    /// Human phrase used in error messages, e.g. "Failed to create event".
    pub fn operation(self) -> &'static str {
        match self {
            ToolId::ListEvents => "fetch events",
            ToolId::CreateEvent => "create event",
            ToolId::UpdateEvent => "update event",
            ToolId::DeleteEvent => "delete event",
        }
    }
}

impl FromStr for ToolId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    StringArray,
}

impl ParamKind {
    pub fn json_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::StringArray => "array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub optional: bool,
}

const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
        optional: false,
    }
}

const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
        optional: true,
    }
}

/// Only present in per-call credential mode.
pub const ACCESS_TOKEN_PARAM: ParamSpec = required(
    "accessToken",
    ParamKind::String,
    "Google API access token",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub label: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

static CATALOG: [ToolDescriptor; 4] = [
    ToolDescriptor {
        id: ToolId::ListEvents,
        label: "List Calendar Events",
        description: "Lists upcoming events from the user's Google Calendar",
        params: &[
            optional(
                "maxResults",
                ParamKind::Number,
                "Maximum number of events to return (default: 10)",
            ),
            optional(
                "daysBack",
                ParamKind::Number,
                "Number of days to look back (default: 0 for today)",
            ),
            optional(
                "daysForward",
                ParamKind::Number,
                "Number of days to look forward",
            ),
        ],
    },
    ToolDescriptor {
        id: ToolId::CreateEvent,
        label: "Create Calendar Event",
        description: "Creates a new event in the user's Google Calendar",
        params: &[
            required("summary", ParamKind::String, "Event title"),
            optional("location", ParamKind::String, "Event location"),
            optional("description", ParamKind::String, "Event description"),
            required("start", ParamKind::String, "Start time (ISO 8601)"),
            required("end", ParamKind::String, "End time (ISO 8601)"),
            optional(
                "attendees",
                ParamKind::StringArray,
                "List of attendee email addresses",
            ),
            optional(
                "includeGoogleMeetDetails",
                ParamKind::Boolean,
                "Whether to include Google Meet video conference details",
            ),
        ],
    },
    ToolDescriptor {
        id: ToolId::UpdateEvent,
        label: "Update Calendar Event",
        description: "Updates an existing event in the user's Google Calendar",
        params: &[
            required("eventId", ParamKind::String, "ID of the event to update"),
            optional("summary", ParamKind::String, "New event title"),
            optional("location", ParamKind::String, "New event location"),
            optional("description", ParamKind::String, "New event description"),
            optional("start", ParamKind::String, "New start time (ISO 8601)"),
            optional("end", ParamKind::String, "New end time (ISO 8601)"),
            optional(
                "attendees",
                ParamKind::StringArray,
                "New list of attendee email addresses",
            ),
            optional(
                "includeGoogleMeetDetails",
                ParamKind::Boolean,
                "Whether to include Google Meet video conference details",
            ),
        ],
    },
    ToolDescriptor {
        id: ToolId::DeleteEvent,
        label: "Delete Calendar Event",
        description: "Deletes an event from the user's Google Calendar",
        params: &[required(
            "eventId",
            ParamKind::String,
            "ID of the event to delete",
        )],
    },
];

/// All tools, in declaration order.
pub fn list_descriptors() -> &'static [ToolDescriptor] {
    &CATALOG
}
