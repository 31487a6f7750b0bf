use chrono::{Duration, Utc};
use ics::{
    escape_text,
    parameters::TzIDParam,
    properties::{Categories, Description, DtEnd, DtStart, Location, RRule, Summary, TzName},
    Daylight, Standard, TimeZone,
};

use crate::google::DEFAULT_DURATION_HOURS;
use crate::time::REFERENCE_ZONE;
use crate::Event;

/// Feed of the given events with a VTIMEZONE for the reference zone.
#[must_use]
pub fn to_ics<'a>(name: &'a str, events: &'a [Event]) -> ics::ICalendar<'a> {
    let mut est_standard = Standard::new("19701101T020000", "-0400", "-0500");
    est_standard.push(TzName::new("EST"));
    est_standard.push(RRule::new("FREQ=YEARLY;BYMONTH=11;BYDAY=1SU"));

    let mut edt_daylight = Daylight::new("19700308T020000", "-0500", "-0400");
    edt_daylight.push(TzName::new("EDT"));
    edt_daylight.push(RRule::new("FREQ=YEARLY;BYMONTH=3;BYDAY=2SU"));

    let mut timezone = TimeZone::daylight(REFERENCE_ZONE.name(), edt_daylight);
    timezone.add_standard(est_standard);

    let mut icalendar = ics::ICalendar::new("2.0", name);
    icalendar.add_timezone(timezone);

    for event in events {
        icalendar.add_event(event.to_ics());
    }

    icalendar
}

impl Event {
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start_at = self.date.and_time(self.time);
        let end_at = start_at + Duration::try_hours(DEFAULT_DURATION_HOURS).unwrap_or_default();

        let start = start_at.format("%Y%m%dT%H%M%S").to_string();
        let end = end_at.format("%Y%m%dT%H%M%S").to_string();

        // DTSTAMP is always UTC
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let mut ics_event = ics::Event::new(format!("{}@chessclub", self.id), stamp);

        let mut dtstart = DtStart::new(start);
        dtstart.add(TzIDParam::new(REFERENCE_ZONE.name()));
        ics_event.push(dtstart);

        let mut dtend = DtEnd::new(end);
        dtend.add(TzIDParam::new(REFERENCE_ZONE.name()));
        ics_event.push(dtend);

        ics_event.push(Summary::new(escape_text(self.title.as_str())));
        ics_event.push(Location::new(escape_text(self.location.as_str())));
        ics_event.push(Categories::new(self.category.label()));

        if !self.description.is_empty() {
            ics_event.push(Description::new(escape_text(self.description.as_str())));
        }

        ics_event
    }
}
