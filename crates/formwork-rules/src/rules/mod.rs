//! Built-in rule set.

pub mod checkbox;
pub mod date;
pub mod email;
pub mod month_year;
pub mod number;
pub mod password;
pub mod payment_card;
pub mod select;

use formwork_model::ClientDefaults;

use crate::registry::RuleRegistry;

/// Register every built-in primitive, format and controltype.
pub fn register_builtins(registry: &mut RuleRegistry, defaults: &ClientDefaults) {
    number::register(registry);
    checkbox::register(registry);
    email::register(registry);
    payment_card::register(registry, defaults);
    password::register(registry);
    select::register(registry);
    date::register(registry);
    month_year::register(registry);
    tracing::debug!(rules = registry.len(), "registered built-in rules");
}
