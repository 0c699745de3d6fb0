// src/testing.rs
// Implementações em memória das stores e dos clientes externos (somente testes).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sha2::Sha256;
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};
use uuid::Uuid;

use crate::{
    clients::{
        stripe::CheckoutSession, CheckoutSessionRequest, CompletionClient, CompletionError, Mailer, OutgoingEmail,
        PaymentGateway,
    },
    common::error::AppError,
    db::{
        AgreementParties, AgreementStore, BookingStore, ConversationStore, FavoriteStore, NotificationStore,
        PaymentStore, PropertyStore, RoleStore, StatsStore,
    },
    models::{
        agreement::{GenerateAgreementPayload, RentAgreement},
        auth::{AppRole, User},
        booking::{Booking, BookingCheckoutInfo, BookingStatus, BookingWithProperty, NewBooking},
        favorite::{FavoriteWithProperty, SavedSearch},
        messaging::{Conversation, Message, NewConversation, NewMessage},
        notification::{NewNotification, Notification},
        payment::{NewPendingPayment, Payment, PaymentStatus, SessionTransition},
        property::{
            CreatePropertyPayload, Property, PropertyImage, PropertySearchQuery, PropertyStatus, PropertyType,
            UpdatePropertyPayload,
        },
        stats::{DayWindow, OwnerStat, PropertyOwner, TrackedEvent},
    },
};

pub fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "tenant@example.com".into(),
        password_hash: String::new(),
        full_name: Some("Ana Tenant".into()),
        phone: None,
        avatar_url: None,
        bio: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Monta um header `Stripe-Signature` válido para `payload`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

struct StoredEvent {
    property_id: Uuid,
    event: TrackedEvent,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    bookings: Vec<Booking>,
    titles: HashMap<Uuid, String>,
    payments: Vec<Payment>,
    notifications: Vec<Notification>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    touches: HashMap<Uuid, usize>,
    properties: Vec<PropertyOwner>,
    events: Vec<StoredEvent>,
    owner_stats: Vec<OwnerStat>,
    failing_properties: HashSet<Uuid>,
    listings: Vec<Property>,
    admins: HashSet<Uuid>,
    favorites: Vec<(Uuid, Uuid, Uuid)>,
    saved_searches: Vec<SavedSearch>,
    agreements: Vec<RentAgreement>,
}

fn sample_listing(owner_id: Uuid) -> Property {
    Property {
        id: Uuid::new_v4(),
        owner_id,
        title: "Sunny 2BHK".into(),
        description: None,
        property_type: PropertyType::Apartment,
        status: PropertyStatus::Available,
        price: Decimal::from(25000),
        city: "Pune".into(),
        address: "Baner Road, 12".into(),
        bedrooms: 2,
        bathrooms: 1,
        area: None,
        amenities: vec!["parking".into()],
        images: Vec::new(),
        is_promoted: false,
        latitude: None,
        longitude: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Uma "base" em memória que implementa todas as stores.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn seed_booking(&self, user_id: Uuid, title: &str, status: BookingStatus) -> Uuid {
        let mut state = self.state.lock().unwrap();
        let booking = Booking {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            user_id,
            visit_date: Utc::now(),
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.titles.insert(booking.property_id, title.to_string());
        let id = booking.id;
        state.bookings.push(booking);
        id
    }

    pub fn seed_booking_at(&self, property_id: Uuid, created_at: DateTime<Utc>) {
        self.state.lock().unwrap().bookings.push(Booking {
            id: Uuid::new_v4(),
            property_id,
            user_id: Uuid::new_v4(),
            visit_date: created_at,
            status: BookingStatus::Pending,
            notes: None,
            created_at,
            updated_at: created_at,
        });
    }

    pub fn seed_payment(&self, booking_id: Uuid, user_id: Uuid, session_id: &str) {
        self.state.lock().unwrap().payments.push(Payment {
            id: Uuid::new_v4(),
            booking_id: Some(booking_id),
            user_id,
            amount: 25000,
            currency: "INR".into(),
            status: PaymentStatus::Pending,
            stripe_session_id: Some(session_id.to_string()),
            stripe_payment_intent: None,
            created_at: Utc::now(),
        });
    }

    pub fn seed_conversation(&self, created_by: Uuid, participant_ids: Vec<Uuid>) -> Uuid {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            created_by,
            property_id: None,
            title: None,
            participant_ids,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = conversation.id;
        self.state.lock().unwrap().conversations.push(conversation);
        id
    }

    pub fn seed_property_owner(&self, owner_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().properties.push(PropertyOwner { id, owner_id });
        id
    }

    pub fn seed_event(&self, property_id: Uuid, event: TrackedEvent, created_at: DateTime<Utc>) {
        self.state
            .lock()
            .unwrap()
            .events
            .push(StoredEvent { property_id, event, created_at });
    }

    pub fn fail_counts_for(&self, property_id: Uuid) {
        self.state.lock().unwrap().failing_properties.insert(property_id);
    }

    pub fn seed_listing(&self, owner_id: Uuid) -> Uuid {
        let listing = sample_listing(owner_id);
        let id = listing.id;
        self.state.lock().unwrap().listings.push(listing);
        id
    }

    pub fn grant_admin(&self, user_id: Uuid) {
        self.state.lock().unwrap().admins.insert(user_id);
    }

    pub fn seed_agreement(&self, property_id: Uuid, tenant_id: Uuid, landlord_id: Uuid, storage_path: &str) -> Uuid {
        let agreement = RentAgreement {
            id: Uuid::new_v4(),
            property_id,
            tenant_id,
            landlord_id,
            monthly_rent: Decimal::from(25000),
            security_deposit: Decimal::from(50000),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            terms: None,
            storage_path: storage_path.to_string(),
            signed: false,
            signed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = agreement.id;
        self.state.lock().unwrap().agreements.push(agreement);
        id
    }

    pub fn transfer_listing(&self, property_id: Uuid, new_owner: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(listing) = state.listings.iter_mut().find(|p| p.id == property_id) {
            listing.owner_id = new_owner;
        }
    }

    pub fn listing(&self, id: Uuid) -> Option<Property> {
        self.state.lock().unwrap().listings.iter().find(|p| p.id == id).cloned()
    }

    pub fn agreements(&self) -> Vec<RentAgreement> {
        self.state.lock().unwrap().agreements.clone()
    }

    pub fn saved_searches(&self) -> Vec<SavedSearch> {
        self.state.lock().unwrap().saved_searches.clone()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().unwrap().bookings.clone()
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.state.lock().unwrap().bookings.iter().find(|b| b.id == id).cloned()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state.lock().unwrap().payments.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn conversation(&self, id: Uuid) -> Option<Conversation> {
        self.state.lock().unwrap().conversations.iter().find(|c| c.id == id).cloned()
    }

    pub fn touch_count(&self, id: Uuid) -> usize {
        self.state.lock().unwrap().touches.get(&id).copied().unwrap_or(0)
    }

    pub fn owner_stats(&self) -> Vec<OwnerStat> {
        self.state.lock().unwrap().owner_stats.clone()
    }

    fn with_property(&self, state: &State, booking: &Booking) -> BookingWithProperty {
        BookingWithProperty {
            booking: booking.clone(),
            property_title: state.titles.get(&booking.property_id).cloned().unwrap_or_default(),
            property_city: "Pune".into(),
            property_price: Decimal::from(25000),
        }
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        let booking = Booking {
            id: Uuid::new_v4(),
            property_id: new.property_id,
            user_id: new.user_id,
            visit_date: new.visit_date,
            status: BookingStatus::Pending,
            notes: new.notes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find_for_checkout(&self, booking_id: Uuid) -> Result<Option<BookingCheckoutInfo>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.bookings.iter().find(|b| b.id == booking_id).map(|b| BookingCheckoutInfo {
            booking_id: b.id,
            user_id: b.user_id,
            status: b.status,
            property_title: state.titles.get(&b.property_id).cloned().unwrap_or_default(),
        }))
    }

    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<Option<Booking>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.bookings.iter_mut().find(|b| b.id == booking_id).map(|b| {
            b.status = status;
            b.updated_at = Utc::now();
            b.clone()
        }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| self.with_property(&state, b))
            .collect())
    }

    async fn list_for_owner(&self, _owner_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError> {
        Ok(Vec::new())
    }

    async fn find_for_user(&self, booking_id: Uuid, user_id: Uuid) -> Result<Option<Booking>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .iter()
            .find(|b| b.id == booking_id && b.user_id == user_id)
            .cloned())
    }

    async fn delete_pending(&self, booking_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.bookings.len();
        state
            .bookings
            .retain(|b| !(b.id == booking_id && b.user_id == user_id && b.status == BookingStatus::Pending));
        Ok(state.bookings.len() < before)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert_pending(&self, new: NewPendingPayment) -> Result<Payment, AppError> {
        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: Some(new.booking_id),
            user_id: new.user_id,
            amount: new.amount,
            currency: new.currency,
            status: PaymentStatus::Pending,
            stripe_session_id: Some(new.stripe_session_id),
            stripe_payment_intent: None,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().payments.push(payment.clone());
        Ok(payment)
    }

    async fn complete_session(
        &self,
        session_id: &str,
        payment_intent: Option<&str>,
    ) -> Result<SessionTransition, AppError> {
        let mut state = self.state.lock().unwrap();
        let mut matched = false;
        let mut transitioned = false;

        for payment in state
            .payments
            .iter_mut()
            .filter(|p| p.stripe_session_id.as_deref() == Some(session_id))
        {
            matched = true;
            transitioned |= payment.status != PaymentStatus::Succeeded;
            payment.status = PaymentStatus::Succeeded;
            if let Some(intent) = payment_intent {
                payment.stripe_payment_intent = Some(intent.to_string());
            }
        }

        Ok(match (matched, transitioned) {
            (false, _) => SessionTransition::NoMatch,
            (true, true) => SessionTransition::Transitioned,
            (true, false) => SessionTransition::AlreadySucceeded,
        })
    }

    async fn set_status_by_intent(&self, payment_intent: &str, status: PaymentStatus) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for payment in state
            .payments
            .iter_mut()
            .filter(|p| p.stripe_payment_intent.as_deref() == Some(payment_intent))
        {
            payment.status = status;
            updated += 1;
        }
        Ok(updated)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.payments.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, new: NewNotification) -> Result<Notification, AppError> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            body: new.body,
            link: new.link,
            is_read: false,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.notifications.iter().filter(|n| n.user_id == user_id).cloned().collect())
    }

    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<Option<Notification>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for n in state.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(&self, new: NewConversation) -> Result<Conversation, AppError> {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            created_by: new.created_by,
            property_id: new.property_id,
            title: new.title,
            participant_ids: new.participant_ids,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>, AppError> {
        Ok(self.conversation(conversation_id))
    }

    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.conversations.iter().filter(|c| c.is_member(user_id)).cloned().collect())
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message, AppError> {
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: new.conversation_id,
            sender_id: new.sender_id,
            body: new.body,
            attachments: sqlx::types::Json(new.attachments),
            is_read: false,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().messages.push(message.clone());
        Ok(message)
    }

    async fn touch_conversation(&self, conversation_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(c) = state.conversations.iter_mut().find(|c| c.id == conversation_id) {
            c.updated_at = Utc::now();
        }
        *state.touches.entry(conversation_id).or_default() += 1;
        Ok(())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.messages.iter().filter(|m| m.conversation_id == conversation_id).cloned().collect())
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for m in state
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id != reader_id && !m.is_read)
        {
            m.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn list_property_owners(&self) -> Result<Vec<PropertyOwner>, AppError> {
        Ok(self.state.lock().unwrap().properties.clone())
    }

    async fn count_events(
        &self,
        property_id: Uuid,
        event: TrackedEvent,
        window: &DayWindow,
    ) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        if state.failing_properties.contains(&property_id) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("falha simulada")));
        }
        Ok(state
            .events
            .iter()
            .filter(|e| {
                e.property_id == property_id
                    && e.event == event
                    && e.created_at >= window.start
                    && e.created_at < window.end
            })
            .count() as i64)
    }

    async fn count_bookings(&self, property_id: Uuid, window: &DayWindow) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.property_id == property_id && b.created_at >= window.start && b.created_at < window.end)
            .count() as i64)
    }

    async fn upsert_owner_stat(&self, stat: &OwnerStat) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        match state.owner_stats.iter_mut().find(|s| {
            s.owner_id == stat.owner_id && s.property_id == stat.property_id && s.date == stat.date
        }) {
            Some(existing) => *existing = stat.clone(),
            None => state.owner_stats.push(stat.clone()),
        }
        Ok(())
    }

    async fn record_event(
        &self,
        event: TrackedEvent,
        property_id: Option<Uuid>,
        _user_id: Option<Uuid>,
        _metadata: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        if let Some(property_id) = property_id {
            self.seed_event(property_id, event, Utc::now());
        }
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid, since: NaiveDate) -> Result<Vec<OwnerStat>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .owner_stats
            .iter()
            .filter(|s| s.owner_id == owner_id && s.date >= since)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool, AppError> {
        Ok(role == AppRole::Admin && self.state.lock().unwrap().admins.contains(&user_id))
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn search(&self, query: &PropertySearchQuery) -> Result<Vec<Property>, AppError> {
        let state = self.state.lock().unwrap();
        let city = query.city.as_deref().map(str::to_lowercase);
        let mut found: Vec<Property> = state
            .listings
            .iter()
            .filter(|p| p.status == PropertyStatus::Available)
            .filter(|p| city.as_deref().is_none_or(|c| p.city.to_lowercase().contains(c)))
            .filter(|p| query.property_type.is_none_or(|t| p.property_type == t))
            .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| query.min_bedrooms.is_none_or(|min| p.bedrooms >= min))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.is_promoted.cmp(&a.is_promoted).then(b.created_at.cmp(&a.created_at)));
        Ok(found
            .into_iter()
            .skip(query.effective_offset() as usize)
            .take(query.effective_limit() as usize)
            .collect())
    }

    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<Property>, AppError> {
        Ok(self.listing(property_id))
    }

    async fn list_images(&self, _property_id: Uuid) -> Result<Vec<PropertyImage>, AppError> {
        Ok(Vec::new())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.listings.iter().filter(|p| p.owner_id == owner_id).cloned().collect())
    }

    async fn create(&self, owner_id: Uuid, payload: &CreatePropertyPayload) -> Result<Property, AppError> {
        let property = Property {
            title: payload.title.clone(),
            description: payload.description.clone(),
            property_type: payload.property_type,
            price: payload.price,
            city: payload.city.clone(),
            address: payload.address.clone(),
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            area: payload.area,
            amenities: payload.amenities.clone(),
            images: payload.images.clone(),
            is_promoted: payload.is_promoted,
            latitude: payload.latitude,
            longitude: payload.longitude,
            ..sample_listing(owner_id)
        };
        self.state.lock().unwrap().listings.push(property.clone());
        Ok(property)
    }

    async fn update(&self, property_id: Uuid, payload: &UpdatePropertyPayload) -> Result<Option<Property>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.listings.iter_mut().find(|p| p.id == property_id).map(|p| {
            if let Some(title) = &payload.title {
                p.title = title.clone();
            }
            if let Some(price) = payload.price {
                p.price = price;
            }
            if let Some(bedrooms) = payload.bedrooms {
                p.bedrooms = bedrooms;
            }
            if let Some(amenities) = &payload.amenities {
                p.amenities = amenities.clone();
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn set_status(&self, property_id: Uuid, status: PropertyStatus) -> Result<Option<Property>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.listings.iter_mut().find(|p| p.id == property_id).map(|p| {
            p.status = status;
            p.clone()
        }))
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<FavoriteWithProperty>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .favorites
            .iter()
            .filter(|(_, owner, _)| *owner == user_id)
            .filter_map(|(id, _, property_id)| {
                let p = state.listings.iter().find(|p| p.id == *property_id)?;
                Some(FavoriteWithProperty {
                    id: *id,
                    property_id: p.id,
                    created_at: Utc::now(),
                    title: p.title.clone(),
                    city: p.city.clone(),
                    price: p.price,
                    bedrooms: p.bedrooms,
                    bathrooms: p.bathrooms,
                    area: p.area,
                    images: p.images.clone(),
                    property_type: p.property_type,
                })
            })
            .collect())
    }

    async fn add_favorite(&self, user_id: Uuid, property_id: Uuid) -> Result<Uuid, AppError> {
        let mut state = self.state.lock().unwrap();
        if !state.listings.iter().any(|p| p.id == property_id) {
            return Err(AppError::NotFound("Imóvel".into()));
        }
        if state.favorites.iter().any(|(_, u, p)| *u == user_id && *p == property_id) {
            return Err(AppError::UniqueConstraintViolation("Imóvel já está nos favoritos.".into()));
        }
        let id = Uuid::new_v4();
        state.favorites.push((id, user_id, property_id));
        Ok(id)
    }

    async fn remove_favorite(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.favorites.len();
        state.favorites.retain(|(_, u, p)| !(*u == user_id && *p == property_id));
        Ok(state.favorites.len() < before)
    }

    async fn list_saved_searches(&self, user_id: Uuid) -> Result<Vec<SavedSearch>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.saved_searches.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn create_saved_search(
        &self,
        user_id: Uuid,
        name: &str,
        filters: &serde_json::Value,
        bounds: Option<&serde_json::Value>,
    ) -> Result<SavedSearch, AppError> {
        let search = SavedSearch {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            filters: sqlx::types::Json(filters.clone()),
            bounds: bounds.cloned().map(sqlx::types::Json),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().saved_searches.push(search.clone());
        Ok(search)
    }

    async fn delete_saved_search(&self, search_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.saved_searches.len();
        state.saved_searches.retain(|s| !(s.id == search_id && s.user_id == user_id));
        Ok(state.saved_searches.len() < before)
    }
}

#[async_trait]
impl AgreementStore for MemoryStore {
    async fn load_parties(
        &self,
        property_id: Uuid,
        _landlord_id: Uuid,
        _tenant_id: Uuid,
    ) -> Result<Option<AgreementParties>, AppError> {
        Ok(self.listing(property_id).map(|p| AgreementParties {
            address: p.address,
            city: p.city,
            property_type: p.property_type,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            owner_id: p.owner_id,
            landlord_name: None,
            tenant_name: None,
        }))
    }

    async fn insert(
        &self,
        agreement_id: Uuid,
        payload: &GenerateAgreementPayload,
        storage_path: &str,
    ) -> Result<RentAgreement, AppError> {
        let agreement = RentAgreement {
            id: agreement_id,
            property_id: payload.property_id,
            tenant_id: payload.tenant_id,
            landlord_id: payload.landlord_id,
            monthly_rent: payload.monthly_rent,
            security_deposit: payload.security_deposit,
            start_date: payload.start_date,
            end_date: payload.end_date,
            terms: payload.terms.clone(),
            storage_path: storage_path.to_string(),
            signed: false,
            signed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().agreements.push(agreement.clone());
        Ok(agreement)
    }

    async fn find_by_id(&self, agreement_id: Uuid) -> Result<Option<RentAgreement>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.agreements.iter().find(|a| a.id == agreement_id).cloned())
    }

    async fn property_owner(&self, property_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self.listing(property_id).map(|p| p.owner_id))
    }
}

/// Provedor de pagamentos falso: um cliente por e-mail, sessões `cs_test_N`.
#[derive(Default)]
pub struct FakeGateway {
    fail: bool,
    customers: Mutex<HashMap<String, String>>,
    sessions: Mutex<Vec<CheckoutSessionRequest>>,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn customer_count(&self) -> usize {
        self.customers.lock().unwrap().len()
    }

    pub fn last_session_request(&self) -> Option<CheckoutSessionRequest> {
        self.sessions.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn find_or_create_customer(&self, email: &str, _user_id: Uuid) -> Result<String, AppError> {
        if self.fail {
            return Err(AppError::UpstreamError("Stripe respondeu 500".into()));
        }
        let mut customers = self.customers.lock().unwrap();
        let next = format!("cus_{}", customers.len() + 1);
        Ok(customers.entry(email.to_string()).or_insert(next).clone())
    }

    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(request);
        let id = format!("cs_test_{}", sessions.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.stripe.test/{}", id)),
            id,
        })
    }
}

#[derive(Default)]
pub struct FakeMailer {
    fail: bool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl FakeMailer {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::UpstreamError("SMTP indisponível".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Gateway de IA que devolve sempre a mesma resposta.
pub struct FakeCompletion {
    reply: Mutex<Option<Result<Option<String>, CompletionError>>>,
}

impl FakeCompletion {
    pub fn new(reply: Result<Option<String>, CompletionError>) -> Self {
        Self { reply: Mutex::new(Some(reply)) }
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> Result<Option<String>, CompletionError> {
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(CompletionError::Transport("sem resposta configurada".into())))
    }
}
