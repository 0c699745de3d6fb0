pub mod user_repo;
pub use user_repo::{RoleStore, UserRepository};
pub mod booking_repo;
pub use booking_repo::{BookingRepository, BookingStore};
pub mod payment_repo;
pub use payment_repo::{PaymentRepository, PaymentStore};
pub mod notification_repo;
pub use notification_repo::{NotificationRepository, NotificationStore};
pub mod conversation_repo;
pub use conversation_repo::{ConversationRepository, ConversationStore};
pub mod stats_repo;
pub use stats_repo::{StatsRepository, StatsStore};
pub mod property_repo;
pub use property_repo::{PropertyRepository, PropertyStore};
pub mod favorite_repo;
pub use favorite_repo::{FavoriteRepository, FavoriteStore};
pub mod kyc_repo;
pub use kyc_repo::KycRepository;
pub mod agreement_repo;
pub use agreement_repo::{AgreementParties, AgreementRepository, AgreementStore};
