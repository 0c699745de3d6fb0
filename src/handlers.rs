pub mod agreements;
pub mod auth;
pub mod bookings;
pub mod favorites;
pub mod kyc;
pub mod messaging;
pub mod notifications;
pub mod payments;
pub mod predictions;
pub mod properties;
pub mod realtime;
pub mod stats;
