use chrono::NaiveDate;
use uuid::Uuid;

use super::Ledger;
use crate::domain::aggregates::{CalendarEvent, EventKind};
use crate::sheet::{self, Row};
use crate::{LedgerError, Result};

#[derive(Debug, Clone)]
pub struct CalendarEventDraft {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub kind: EventKind,
}

impl CalendarEventDraft {
    fn into_event(self, id: String) -> CalendarEvent {
        CalendarEvent { id, date: self.date, title: self.title.trim().to_string(), description: self.description.trim().to_string(), kind: self.kind }
    }
}

impl Ledger {
    /// All events, earliest first.
    pub fn calendar(&self) -> Vec<CalendarEvent> {
        let mut events = self.stores.calendar.list();
        events.sort_by_key(|e| e.date);
        events
    }

    pub fn events_on(&self, day: NaiveDate) -> Vec<CalendarEvent> {
        self.calendar().into_iter().filter(|e| e.is_on(day)).collect()
    }

    #[tracing::instrument(skip(self, draft), fields(date = %draft.date))]
    pub async fn create_event(&self, draft: CalendarEventDraft) -> Result<CalendarEvent> {
        let _guard = self.write.lock().await;
        let hex = Uuid::new_v4().simple().to_string();
        let event = draft.into_event(format!("evt-{}", &hex[..8]));
        self.stores.calendar.append(event.clone());
        tracing::info!(event_id = %event.id, "calendar event added");
        Ok(event)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update_event(&self, event_id: &str, draft: CalendarEventDraft) -> Result<CalendarEvent> {
        let _guard = self.write.lock().await;
        let event = draft.into_event(event_id.to_string());
        if !self.stores.calendar.replace(event.clone()) {
            return Err(LedgerError::EventNotFound(event_id.to_string()));
        }
        Ok(event)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        let _guard = self.write.lock().await;
        self.stores.calendar.remove(event_id).ok_or_else(|| LedgerError::EventNotFound(event_id.to_string()))?;
        Ok(())
    }

    pub fn export_calendar(&self) -> Vec<Row> {
        sheet::calendar_rows(&self.calendar())
    }
}
