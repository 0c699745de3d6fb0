pub mod agreement_service;
pub mod auth;
pub mod booking_service;
pub mod checkout_service;
pub mod document_service;
pub mod favorite_service;
pub mod kyc_service;
pub mod message_service;
pub mod notification_service;
pub mod prediction_service;
pub mod property_service;
pub mod realtime;
pub mod stats_service;
pub mod webhook_service;
