pub mod redundant_capital_w;

use super::registry::CopRegistry;

pub fn register_all(registry: &mut CopRegistry) {
    registry.register(Box::new(redundant_capital_w::RedundantCapitalW));
}
