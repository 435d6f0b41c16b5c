use crate::domain::status::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

/// Unique numeric identifier of a ticket (`idTicket`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub i64);

impl TicketId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for TicketId {
    type Err = std::num::ParseIntError;

    /// Parses the string form drag sources and drop targets carry
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a user acting on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A support ticket as delivered by the backend
///
/// Only the identity and the status code are typed. Every other field the
/// backend sends (title, description, priority, timestamps, reporter and
/// assignee references) stays in `fields` exactly as received, explicit
/// nulls and absent keys included, and is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "idTicket")]
    pub id: TicketId,
    #[serde(rename = "estado")]
    pub status: StatusCode,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

const TITLE: &str = "titulo";
const DESCRIPTION: &str = "descripcion";
const PRIORITY: &str = "prioridad";

impl Ticket {
    /// Creates a ticket with the given ID, status and title
    pub fn new(id: TicketId, status: StatusCode, title: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TITLE.to_string(), Value::String(title.into()));
        Self { id, status, fields }
    }

    /// Returns a copy placed under a different status code
    pub fn with_status(&self, status: StatusCode) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Title, if the backend sent one as a string
    pub fn title(&self) -> Option<&str> {
        self.attribute(TITLE).and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.attribute(DESCRIPTION).and_then(Value::as_str)
    }

    pub fn priority(&self) -> Option<i64> {
        self.attribute(PRIORITY).and_then(Value::as_i64)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.fields.insert(TITLE.to_string(), Value::String(title.into()));
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.fields
            .insert(DESCRIPTION.to_string(), Value::String(description.into()));
    }

    /// Looks up a backend field other than the id and status code
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
