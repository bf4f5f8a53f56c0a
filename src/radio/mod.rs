/// Radio session manager
pub mod link;
/// RN2483 serial modem driver
pub mod rn2483;
/// Transport and clock abstractions
pub mod traits;

pub use link::{LinkState, NoIndicator, RadioLink, RadioSession, SessionLink, TxFailure, TxOutcome};
pub use rn2483::Rn2483;
pub use traits::{Clock, DelayClock, Transport};
