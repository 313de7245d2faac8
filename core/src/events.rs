use api_types::{Event, EventRequest, EventStatus, EventType, UserSummary};
use tracing::info;

use crate::api::events;
use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::http::ApiClient;
use crate::location::Coordinates;
use crate::session::Session;
use crate::validation::{validate_event, EventForm};

/// The caller's relation to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    Owner,
    Participant,
    Visitor,
}

impl Participation {
    pub fn of(event: &Event, user_id: &str) -> Self {
        if event.owner_id == user_id {
            Participation::Owner
        } else if event.participants.iter().any(|p| p.id == user_id) {
            Participation::Participant
        } else {
            Participation::Visitor
        }
    }
}

/// Case-insensitive match on title, description or category.
pub fn search<'e>(events: &'e [Event], query: &str) -> Vec<&'e Event> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return events.iter().collect();
    }
    events
        .iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&query)
                || e.description.to_lowercase().contains(&query)
                || e.kind.as_str().to_lowercase().contains(&query)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events the caller owns.
    Mine,
    /// Events the caller takes part in.
    Going,
}

impl EventFilter {
    pub fn matches(&self, event: &Event, user_id: &str) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Mine => event.owner_id == user_id,
            EventFilter::Going => event.participants.iter().any(|p| p.id == user_id),
        }
    }

    pub fn apply<'e>(&self, events: &'e [Event], user_id: &str) -> Vec<&'e Event> {
        events.iter().filter(|e| self.matches(e, user_id)).collect()
    }
}

impl std::str::FromStr for EventFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(EventFilter::All),
            "mine" | "my" => Ok(EventFilter::Mine),
            "going" => Ok(EventFilter::Going),
            other => Err(format!("unknown filter {other}")),
        }
    }
}

/// Where to pin an event, preferring its own coordinates over its address.
pub fn coordinates(event: &Event) -> Option<Coordinates> {
    let (latitude, longitude) = match (event.latitude, event.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            let a = event.address.as_ref()?;
            (a.latitude, a.longitude)
        }
    };
    (latitude != 0.0 && longitude != 0.0).then_some(Coordinates {
        latitude,
        longitude,
    })
}

/// Events that can be placed on a map.
pub fn mappable(events: &[Event]) -> Vec<(&Event, Coordinates)> {
    events
        .iter()
        .filter_map(|e| coordinates(e).map(|c| (e, c)))
        .collect()
}

/// The first `max` participants and how many more there are.
pub fn participant_preview(event: &Event, max: usize) -> (&[UserSummary], usize) {
    let shown = event.participants.len().min(max);
    (&event.participants[..shown], event.participants.len() - shown)
}

pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Event reads and mutations for a logged-in user.
pub struct EventService<'a> {
    api: &'a ApiClient,
    cache: &'a QueryCache,
    session: &'a Session,
}

impl<'a> EventService<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a QueryCache, session: &'a Session) -> Self {
        Self {
            api,
            cache,
            session,
        }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        self.cache
            .fetch(QueryKey::Events, || events::list(self.api))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Event> {
        self.cache
            .fetch(QueryKey::Event(id.to_string()), || events::get(self.api, id))
            .await
    }

    /// Events of the selected categories. The unfiltered listing is cached
    /// under its own key; an empty selection makes no request.
    pub async fn by_types(&self, types: &[EventType]) -> Result<Vec<Event>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }
        let all = self
            .cache
            .fetch(QueryKey::EventsByType, || events::list(self.api))
            .await?;
        Ok(events::of_types(all, types))
    }

    pub async fn participation(&self, id: &str) -> Result<Participation> {
        let event = self.get(id).await?;
        Ok(Participation::of(&event, self.session.user_id()))
    }

    pub async fn join(&self, id: &str) -> Result<()> {
        events::participate(self.api, id, self.session.user_id()).await?;
        info!(event_id = %id, "joined event");
        self.invalidate(id);
        Ok(())
    }

    pub async fn leave(&self, id: &str) -> Result<()> {
        events::leave(self.api, id, self.session.user_id()).await?;
        info!(event_id = %id, "left event");
        self.invalidate(id);
        Ok(())
    }

    /// Join when not participating, leave otherwise. Owners are always
    /// participants and cannot toggle. Returns the new participation.
    pub async fn toggle(&self, id: &str) -> Result<Participation> {
        match self.participation(id).await? {
            Participation::Owner => Ok(Participation::Owner),
            Participation::Participant => {
                self.leave(id).await?;
                Ok(Participation::Visitor)
            }
            Participation::Visitor => {
                self.join(id).await?;
                Ok(Participation::Participant)
            }
        }
    }

    pub async fn create(&self, form: &EventForm) -> Result<Event> {
        let request = self.request_from(form)?;
        let event = events::create(self.api, &request).await?;
        info!(event_id = %event.id, slug = %event.slug, "event created");
        self.cache
            .invalidate(&[QueryKey::Events, QueryKey::EventsByType]);
        Ok(event)
    }

    pub async fn update(&self, id: &str, form: &EventForm) -> Result<Event> {
        let request = self.request_from(form)?;
        let event = events::update(self.api, id, &request).await?;
        self.invalidate(id);
        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        events::delete(self.api, id).await?;
        info!(event_id = %id, "event deleted");
        self.invalidate(id);
        Ok(())
    }

    fn request_from(&self, form: &EventForm) -> Result<EventRequest> {
        validate_event(form)?;
        Ok(EventRequest {
            title: form.title.clone(),
            description: form.description.clone(),
            start_date: form.start_date,
            end_date: form.end_date,
            slug: slugify(&form.title),
            status: EventStatus::Pending,
            kind: form.kind,
            owner_id: self.session.user_id().to_string(),
            cover_image: form.cover_image.clone(),
            address: form.address.clone(),
        })
    }

    fn invalidate(&self, id: &str) {
        self.cache.invalidate(&[
            QueryKey::Event(id.to_string()),
            QueryKey::Events,
            QueryKey::EventsByType,
        ]);
    }
}
