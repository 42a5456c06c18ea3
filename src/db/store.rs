//! The credential store: every relational read and write the services need.
//!
//! `CredentialStore` is the seam between the service layer and the database,
//! so tests can swap in an in-memory implementation and count queries. The
//! production implementation is [`SqliteStore`] over a sqlx pool.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;

use crate::db::models::{
    Enrollment, Event, HotelWithRooms, Room, Session, TicketStatus, TicketType, TicketWithType,
    User,
};
use crate::db::DbPool;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> sqlx::Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> sqlx::Result<Option<User>>;
    /// `password_hash` is None for OAuth-provisioned accounts.
    async fn create_user(&self, email: &str, password_hash: Option<&str>) -> sqlx::Result<User>;

    async fn create_session(&self, user_id: i64, token: &str) -> sqlx::Result<Session>;
    async fn find_session_by_token(&self, token: &str) -> sqlx::Result<Option<Session>>;

    async fn find_first_event(&self) -> sqlx::Result<Option<Event>>;

    async fn find_enrollment_by_user_id(&self, user_id: i64) -> sqlx::Result<Option<Enrollment>>;
    async fn find_ticket_by_enrollment_id(
        &self,
        enrollment_id: i64,
    ) -> sqlx::Result<Option<TicketWithType>>;

    async fn find_hotels_with_rooms(&self) -> sqlx::Result<Vec<HotelWithRooms>>;
    async fn find_hotel_with_rooms(&self, hotel_id: i64) -> sqlx::Result<Option<HotelWithRooms>>;
}

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Flat row for the ticket + ticket type join.
#[derive(FromRow)]
struct TicketRow {
    id: i64,
    enrollment_id: i64,
    status: TicketStatus,
    type_id: i64,
    type_name: String,
    price: i64,
    is_remote: bool,
    includes_hotel: bool,
}

impl From<TicketRow> for TicketWithType {
    fn from(row: TicketRow) -> Self {
        Self {
            id: row.id,
            enrollment_id: row.enrollment_id,
            status: row.status,
            ticket_type: TicketType {
                id: row.type_id,
                name: row.type_name,
                price: row.price,
                is_remote: row.is_remote,
                includes_hotel: row.includes_hotel,
            },
        }
    }
}

#[derive(FromRow)]
struct HotelRow {
    id: i64,
    name: String,
    image: String,
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_user_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_id(&self, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_user(&self, email: &str, password_hash: Option<&str>) -> sqlx::Result<User> {
        let now = Utc::now().to_rfc3339();
        sqlx::query_as(
            "INSERT INTO users (email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_session(&self, user_id: i64, token: &str) -> sqlx::Result<Session> {
        let now = Utc::now().to_rfc3339();
        sqlx::query_as(
            "INSERT INTO sessions (user_id, token, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(token)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_session_by_token(&self, token: &str) -> sqlx::Result<Option<Session>> {
        sqlx::query_as("SELECT * FROM sessions WHERE token = ? LIMIT 1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_first_event(&self) -> sqlx::Result<Option<Event>> {
        sqlx::query_as("SELECT * FROM events ORDER BY id ASC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_enrollment_by_user_id(&self, user_id: i64) -> sqlx::Result<Option<Enrollment>> {
        sqlx::query_as("SELECT * FROM enrollments WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_ticket_by_enrollment_id(
        &self,
        enrollment_id: i64,
    ) -> sqlx::Result<Option<TicketWithType>> {
        let row: Option<TicketRow> = sqlx::query_as(
            "SELECT t.id, t.enrollment_id, t.status, \
                    tt.id AS type_id, tt.name AS type_name, tt.price, tt.is_remote, tt.includes_hotel \
             FROM tickets t \
             JOIN ticket_types tt ON tt.id = t.ticket_type_id \
             WHERE t.enrollment_id = ? \
             ORDER BY t.id ASC LIMIT 1",
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TicketWithType::from))
    }

    async fn find_hotels_with_rooms(&self) -> sqlx::Result<Vec<HotelWithRooms>> {
        let hotels: Vec<HotelRow> = sqlx::query_as("SELECT id, name, image FROM hotels ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let rooms: Vec<Room> = sqlx::query_as(
            "SELECT id, name, capacity, hotel_id FROM rooms ORDER BY hotel_id, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(hotels
            .into_iter()
            .map(|hotel| {
                let rooms = rooms
                    .iter()
                    .filter(|room| room.hotel_id == hotel.id)
                    .cloned()
                    .collect();
                HotelWithRooms {
                    id: hotel.id,
                    name: hotel.name,
                    image: hotel.image,
                    rooms,
                }
            })
            .collect())
    }

    async fn find_hotel_with_rooms(&self, hotel_id: i64) -> sqlx::Result<Option<HotelWithRooms>> {
        let hotel: Option<HotelRow> =
            sqlx::query_as("SELECT id, name, image FROM hotels WHERE id = ?")
                .bind(hotel_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(hotel) = hotel else {
            return Ok(None);
        };

        let rooms: Vec<Room> = sqlx::query_as(
            "SELECT id, name, capacity, hotel_id FROM rooms WHERE hotel_id = ? ORDER BY id",
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(HotelWithRooms {
            id: hotel.id,
            name: hotel.name,
            image: hotel.image,
            rooms,
        }))
    }
}

/// Fixture helpers for tests; these are the writes an external admin/seed
/// process would perform in production.
#[cfg(test)]
impl SqliteStore {
    pub(crate) async fn insert_event(
        &self,
        title: &str,
        starts_at: &str,
        ends_at: &str,
    ) -> sqlx::Result<Event> {
        let now = Utc::now().to_rfc3339();
        sqlx::query_as(
            "INSERT INTO events (title, logo_image_url, background_image_url, starts_at, ends_at, created_at, updated_at) \
             VALUES (?, '', '', ?, ?, ?, ?) RETURNING *",
        )
        .bind(title)
        .bind(starts_at)
        .bind(ends_at)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
    }

    pub(crate) async fn insert_enrollment(
        &self,
        user_id: i64,
        address: &str,
    ) -> sqlx::Result<Enrollment> {
        let now = Utc::now().to_rfc3339();
        sqlx::query_as(
            "INSERT INTO enrollments (user_id, address, created_at, updated_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(address)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
    }

    pub(crate) async fn insert_ticket_type(
        &self,
        name: &str,
        is_remote: bool,
        includes_hotel: bool,
    ) -> sqlx::Result<i64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO ticket_types (name, price, is_remote, includes_hotel, created_at, updated_at) \
             VALUES (?, 250, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(is_remote)
        .bind(includes_hotel)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn insert_ticket(
        &self,
        enrollment_id: i64,
        ticket_type_id: i64,
        status: TicketStatus,
    ) -> sqlx::Result<i64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO tickets (enrollment_id, ticket_type_id, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(enrollment_id)
        .bind(ticket_type_id)
        .bind(status)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn insert_hotel(&self, name: &str, image: &str) -> sqlx::Result<i64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO hotels (name, image, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(image)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn insert_room(
        &self,
        hotel_id: i64,
        name: &str,
        capacity: i64,
    ) -> sqlx::Result<i64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO rooms (name, capacity, hotel_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(capacity)
        .bind(hotel_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store for service-level unit tests, with query counters so
    //! cache behavior can be asserted.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        users: Mutex<Vec<User>>,
        pub sessions: Mutex<Vec<Session>>,
        event: Mutex<Option<Event>>,
        enrollments: Mutex<Vec<Enrollment>>,
        tickets: Mutex<Vec<TicketWithType>>,
        hotels: Mutex<Vec<HotelWithRooms>>,
        pub event_queries: AtomicUsize,
        pub hotel_queries: AtomicUsize,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_user(&self, email: &str, password_hash: Option<&str>) -> User {
            let mut users = self.users.lock().unwrap();
            let user = User {
                id: users.len() as i64 + 1,
                email: email.to_string(),
                password_hash: password_hash.map(str::to_string),
                created_at: Utc::now().to_rfc3339(),
                updated_at: Utc::now().to_rfc3339(),
            };
            users.push(user.clone());
            user
        }

        pub fn set_event(&self, starts_at: &str, ends_at: &str) -> Event {
            let event = Event {
                id: 1,
                title: "Conference".to_string(),
                logo_image_url: "https://example.org/logo.png".to_string(),
                background_image_url: "https://example.org/bg.png".to_string(),
                starts_at: starts_at.to_string(),
                ends_at: ends_at.to_string(),
                created_at: Utc::now().to_rfc3339(),
                updated_at: Utc::now().to_rfc3339(),
            };
            *self.event.lock().unwrap() = Some(event.clone());
            event
        }

        pub fn add_enrollment(&self, user_id: i64) -> Enrollment {
            let mut enrollments = self.enrollments.lock().unwrap();
            let enrollment = Enrollment {
                id: enrollments.len() as i64 + 1,
                user_id,
                address: "1 Main St".to_string(),
                created_at: Utc::now().to_rfc3339(),
                updated_at: Utc::now().to_rfc3339(),
            };
            enrollments.push(enrollment.clone());
            enrollment
        }

        pub fn add_ticket(
            &self,
            enrollment_id: i64,
            status: TicketStatus,
            is_remote: bool,
            includes_hotel: bool,
        ) -> TicketWithType {
            let mut tickets = self.tickets.lock().unwrap();
            let ticket = TicketWithType {
                id: tickets.len() as i64 + 1,
                enrollment_id,
                status,
                ticket_type: TicketType {
                    id: tickets.len() as i64 + 1,
                    name: "Standard".to_string(),
                    price: 250,
                    is_remote,
                    includes_hotel,
                },
            };
            tickets.push(ticket.clone());
            ticket
        }

        pub fn add_hotel(&self, id: i64, name: &str, rooms: Vec<Room>) -> HotelWithRooms {
            let hotel = HotelWithRooms {
                id,
                name: name.to_string(),
                image: "https://example.org/hotel.png".to_string(),
                rooms,
            };
            self.hotels.lock().unwrap().push(hotel.clone());
            hotel
        }

        pub fn session_count(&self) -> usize {
            self.sessions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn find_user_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_user_by_id(&self, id: i64) -> sqlx::Result<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            password_hash: Option<&str>,
        ) -> sqlx::Result<User> {
            Ok(self.add_user(email, password_hash))
        }

        async fn create_session(&self, user_id: i64, token: &str) -> sqlx::Result<Session> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = Session {
                id: sessions.len() as i64 + 1,
                user_id,
                token: token.to_string(),
                created_at: Utc::now().to_rfc3339(),
            };
            sessions.push(session.clone());
            Ok(session)
        }

        async fn find_session_by_token(&self, token: &str) -> sqlx::Result<Option<Session>> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.token == token)
                .cloned())
        }

        async fn find_first_event(&self) -> sqlx::Result<Option<Event>> {
            self.event_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.event.lock().unwrap().clone())
        }

        async fn find_enrollment_by_user_id(
            &self,
            user_id: i64,
        ) -> sqlx::Result<Option<Enrollment>> {
            Ok(self
                .enrollments
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.user_id == user_id)
                .cloned())
        }

        async fn find_ticket_by_enrollment_id(
            &self,
            enrollment_id: i64,
        ) -> sqlx::Result<Option<TicketWithType>> {
            Ok(self
                .tickets
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.enrollment_id == enrollment_id)
                .cloned())
        }

        async fn find_hotels_with_rooms(&self) -> sqlx::Result<Vec<HotelWithRooms>> {
            self.hotel_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.hotels.lock().unwrap().clone())
        }

        async fn find_hotel_with_rooms(
            &self,
            hotel_id: i64,
        ) -> sqlx::Result<Option<HotelWithRooms>> {
            self.hotel_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .hotels
                .lock()
                .unwrap()
                .iter()
                .find(|h| h.id == hotel_id)
                .cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[tokio::test]
    async fn user_round_trip_and_unique_email() {
        let store = SqliteStore::new(init_in_memory().await);

        let user = store
            .create_user("kim@example.org", Some("$argon2id$stub"))
            .await
            .unwrap();
        assert!(user.id > 0);

        let found = store.find_user_by_email("kim@example.org").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);

        assert!(store
            .find_user_by_email("nobody@example.org")
            .await
            .unwrap()
            .is_none());

        // Unique constraint on email
        assert!(store.create_user("kim@example.org", None).await.is_err());
    }

    #[tokio::test]
    async fn first_event_is_the_lowest_id() {
        let store = SqliteStore::new(init_in_memory().await);
        assert!(store.find_first_event().await.unwrap().is_none());

        let first = store
            .insert_event("Conference 2026", "2026-09-01T00:00:00Z", "2026-09-22T00:00:00Z")
            .await
            .unwrap();
        store
            .insert_event("Afterparty", "2026-09-22T00:00:00Z", "2026-09-23T00:00:00Z")
            .await
            .unwrap();

        let found = store.find_first_event().await.unwrap().expect("event");
        assert_eq!(found.id, first.id);
        assert_eq!(found.title, "Conference 2026");
    }

    #[tokio::test]
    async fn session_round_trip() {
        let store = SqliteStore::new(init_in_memory().await);
        let user = store.create_user("kim@example.org", None).await.unwrap();

        let session = store.create_session(user.id, "tok-123").await.unwrap();
        assert_eq!(session.user_id, user.id);

        let found = store.find_session_by_token("tok-123").await.unwrap();
        assert_eq!(found.unwrap().id, session.id);
        assert!(store
            .find_session_by_token("tok-456")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn ticket_join_carries_its_type() {
        let store = SqliteStore::new(init_in_memory().await);
        let user = store.create_user("kim@example.org", None).await.unwrap();
        let enrollment = store.insert_enrollment(user.id, "1 Main St").await.unwrap();
        let type_id = store
            .insert_ticket_type("Presential + Hotel", false, true)
            .await
            .unwrap();
        store
            .insert_ticket(enrollment.id, type_id, TicketStatus::Paid)
            .await
            .unwrap();

        let ticket = store
            .find_ticket_by_enrollment_id(enrollment.id)
            .await
            .unwrap()
            .expect("ticket");
        assert_eq!(ticket.status, TicketStatus::Paid);
        assert_eq!(ticket.ticket_type.id, type_id);
        assert!(ticket.ticket_type.includes_hotel);
        assert!(!ticket.ticket_type.is_remote);
    }

    #[tokio::test]
    async fn hotels_nest_their_rooms() {
        let store = SqliteStore::new(init_in_memory().await);
        let hotel_a = store.insert_hotel("Palace", "palace.png").await.unwrap();
        let hotel_b = store.insert_hotel("Lodge", "lodge.png").await.unwrap();
        store.insert_room(hotel_a, "101", 2).await.unwrap();
        store.insert_room(hotel_a, "102", 3).await.unwrap();
        store.insert_room(hotel_b, "201", 1).await.unwrap();

        let hotels = store.find_hotels_with_rooms().await.unwrap();
        assert_eq!(hotels.len(), 2);
        assert_eq!(hotels[0].rooms.len(), 2);
        assert_eq!(hotels[1].rooms.len(), 1);

        let palace = store
            .find_hotel_with_rooms(hotel_a)
            .await
            .unwrap()
            .expect("hotel");
        assert_eq!(palace.name, "Palace");
        assert_eq!(palace.rooms.len(), 2);

        assert!(store.find_hotel_with_rooms(999).await.unwrap().is_none());
    }
}
