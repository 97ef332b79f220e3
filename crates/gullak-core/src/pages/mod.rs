//! Page controllers
//!
//! One controller per page, each driving the same loop: session change
//! comes in, the page re-enters `Loading`, tears down and reopens its
//! subscriptions, and resolves to demo or live data. Mutations go
//! through optimistic splices with rollback on failed writes.

mod chat;
mod community;
mod dashboard;
mod goals;
mod investments;

pub use chat::{ChatPage, ChatTurn};
pub use community::CommunityPage;
pub use dashboard::DashboardPage;
pub use goals::GoalsPage;
pub use investments::InvestmentsPage;
