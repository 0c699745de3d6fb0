pub mod ai_gateway;
pub mod mailer;
pub mod stripe;

pub use ai_gateway::{AiGatewayClient, CompletionClient, CompletionError};
pub use mailer::{Mailer, OutgoingEmail, SmtpMailer};
pub use stripe::{CheckoutSessionRequest, PaymentGateway, StripeClient};
