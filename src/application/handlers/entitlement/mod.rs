//! Entitlement handlers.

mod check_entitlement;
mod get_usage;
mod redeem_wizard_pass;
mod run_metered;

pub use check_entitlement::{CheckEntitlementHandler, CheckEntitlementQuery};
pub use get_usage::{GetUsageHandler, GetUsageQuery, UsageView};
pub use redeem_wizard_pass::{RedeemWizardPassHandler, RedeemWizardPassCommand};
pub use run_metered::{MeteredError, MeteredOutcome, MeteredRequest, RunMeteredOperationHandler};
