//! Provider-side objects as returned by the billing API.

mod catalog;
mod clock;
mod customer;
mod invoice;
mod list;
mod subscription;

pub use catalog::{Coupon, Price, Product};
pub use clock::{ClockStatus, TestClock};
pub use customer::{CreateCustomer, Customer};
pub use invoice::Invoice;
pub use list::{Expandable, List};
pub use subscription::{
    CreateSubscription, PaymentBehavior, Plan, ProrationBehavior, Subscription,
    SubscriptionItem, SubscriptionStatus, UpgradeSubscription,
};
