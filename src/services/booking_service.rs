// src/services/booking_service.rs

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    clients::{Mailer, OutgoingEmail},
    common::{error::AppError, text::escape_html},
    db::BookingStore,
    models::{
        auth::User,
        booking::{BookVisitPayload, BookVisitResponse, Booking, BookingStatus, BookingWithProperty, NewBooking},
    },
    services::realtime::{ChangeEvent, ChangeFeed, ChangeKind},
};

#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    mailer: Option<Arc<dyn Mailer>>,
    feed: ChangeFeed,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingStore>, mailer: Option<Arc<dyn Mailer>>, feed: ChangeFeed) -> Self {
        Self { bookings, mailer, feed }
    }

    /// Registra a visita como `pending` e avisa dono e visitante por e-mail.
    /// Falhas de e-mail nunca derrubam a requisição.
    pub async fn book_visit(&self, caller: &User, payload: BookVisitPayload) -> Result<BookVisitResponse, AppError> {
        if payload.user_id != caller.id {
            return Err(AppError::Forbidden("Só é possível agendar visitas para si mesmo.".into()));
        }

        let booking = self
            .bookings
            .insert_booking(NewBooking {
                property_id: payload.property_id,
                user_id: payload.user_id,
                visit_date: payload.visit_date,
                notes: payload.notes.clone(),
            })
            .await?;

        tracing::info!("✅ Visita agendada: {}", booking.id);
        self.feed
            .publish(ChangeEvent::new("bookings", ChangeKind::Insert, Some(booking.user_id), &booking));

        if let (Some(mailer), Some(owner_email)) = (&self.mailer, payload.owner_email.as_deref()) {
            let (to_owner, to_visitor) = visit_emails(&payload, owner_email);

            if let Err(e) = mailer.send(to_owner).await {
                tracing::warn!("Falha ao enviar e-mail ao proprietário: {}", e);
            }
            if let Err(e) = mailer.send(to_visitor).await {
                tracing::warn!("Falha ao enviar e-mail ao visitante: {}", e);
            }
        }

        Ok(BookVisitResponse { success: true, booking })
    }

    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError> {
        self.bookings.list_for_user(user_id).await
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError> {
        self.bookings.list_for_owner(owner_id).await
    }

    /// Cancelamento = remoção física, apenas enquanto `pending`.
    pub async fn cancel(&self, user_id: Uuid, booking_id: Uuid) -> Result<(), AppError> {
        let booking: Booking = self
            .bookings
            .find_for_user(booking_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva".into()))?;

        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidInput("Apenas reservas pendentes podem ser canceladas.".into()));
        }

        if !self.bookings.delete_pending(booking_id, user_id).await? {
            // Mudou de status entre a leitura e o delete
            return Err(AppError::InvalidInput("Apenas reservas pendentes podem ser canceladas.".into()));
        }

        self.feed
            .publish(ChangeEvent::new("bookings", ChangeKind::Delete, Some(user_id), &booking));
        Ok(())
    }
}

pub(crate) fn format_visit_date(visit_date: &DateTime<Utc>) -> String {
    visit_date.format("%A, %-d %B %Y, %I:%M %p").to_string()
}

// (e-mail ao proprietário, confirmação ao visitante)
fn visit_emails(payload: &BookVisitPayload, owner_email: &str) -> (OutgoingEmail, OutgoingEmail) {
    let title = escape_html(&payload.property_title);
    let when = format_visit_date(&payload.visit_date);
    let notes = payload
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(escape_html);

    let owner_name = payload.owner_name.as_deref().map(escape_html).unwrap_or_else(|| "Property Owner".into());
    let visitor_name = payload.user_name.as_deref().map(escape_html);

    let owner_notes = notes
        .as_ref()
        .map(|n| format!("<p><strong>Notes:</strong> {}</p>", n))
        .unwrap_or_default();
    let visitor_notes = notes
        .as_ref()
        .map(|n| format!("<p><strong>Your Notes:</strong> {}</p>", n))
        .unwrap_or_default();

    let to_owner = OutgoingEmail {
        to: owner_email.to_string(),
        subject: format!("New Visit Request for {}", payload.property_title),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #333; border-bottom: 2px solid #007bff; padding-bottom: 10px;">New Visit Request</h1>
  <p>Hello {owner_name},</p>
  <p>You have received a new visit request for your property:</p>
  <div style="background: #f5f5f5; padding: 15px; border-radius: 8px; margin: 20px 0;">
    <h3 style="margin-top: 0; color: #007bff;">{title}</h3>
    <p><strong>Visitor Name:</strong> {visitor}</p>
    <p><strong>Visitor Email:</strong> {email}</p>
    <p><strong>Requested Date:</strong> {when}</p>
    {owner_notes}
  </div>
  <p>Please log in to your RoadBed dashboard to confirm or reschedule this visit.</p>
  <p style="color: #666; font-size: 12px; margin-top: 30px;">This is an automated message from RoadBed. Please do not reply directly to this email.</p>
</div>"#,
            visitor = visitor_name.clone().unwrap_or_else(|| "Not specified".into()),
            email = escape_html(&payload.user_email),
        ),
    };

    let to_visitor = OutgoingEmail {
        to: payload.user_email.clone(),
        subject: format!("Visit Scheduled - {}", payload.property_title),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #333; border-bottom: 2px solid #28a745; padding-bottom: 10px;">Visit Scheduled!</h1>
  <p>Hello {visitor},</p>
  <p>Your visit request has been submitted successfully!</p>
  <div style="background: #f5f5f5; padding: 15px; border-radius: 8px; margin: 20px 0;">
    <h3 style="margin-top: 0; color: #28a745;">{title}</h3>
    <p><strong>Scheduled Date:</strong> {when}</p>
    {visitor_notes}
  </div>
  <p>The property owner will confirm your visit shortly. We'll notify you once confirmed.</p>
  <p style="color: #666; font-size: 12px; margin-top: 30px;">Thank you for using RoadBed!</p>
</div>"#,
            visitor = visitor_name.unwrap_or_else(|| "there".into()),
        ),
    };

    (to_owner, to_visitor)
}
