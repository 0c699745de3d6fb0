pub mod agreement;
pub mod auth;
pub mod booking;
pub mod favorite;
pub mod kyc;
pub mod messaging;
pub mod notification;
pub mod payment;
pub mod prediction;
pub mod property;
pub mod stats;
