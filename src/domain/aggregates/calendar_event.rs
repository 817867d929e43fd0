//! Calendar entries (supplier deliveries, vet appointments, store events)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "pedido")] Order,
    #[serde(rename = "cita")] Appointment,
    #[serde(rename = "evento")] Event,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self { Self::Order => "pedido", Self::Appointment => "cita", Self::Event => "evento" }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl CalendarEvent {
    pub fn is_on(&self, day: NaiveDate) -> bool { self.date == day }
}
