// Benefit system
//
// Order-time evaluation of automatic discounts, campaigns, and coupons,
// plus the admin surface for configuring them. The evaluator itself is
// pure; repositories load its inputs, the usage recorder applies its
// outbox after the order commits.

pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod types;
pub mod usage;

pub use error::{BenefitError, BenefitResult};
pub use evaluator::{
    AppliedCampaign, AppliedCoupon, AppliedDiscount, BenefitEvaluator, BenefitOutcome,
    CouponCandidate, CustomerProfile, EvaluationContext, EvaluationItem,
};
pub use models::{AutomaticDiscount, Campaign, Coupon};
pub use repository::BenefitRepository;
pub use usage::{UsageAction, UsageRecorder};
