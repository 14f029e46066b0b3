pub mod day;
pub mod pricing;
pub mod sales;
pub mod session;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(session::definitions())
        .chain(sales::definitions())
        .chain(day::definitions())
        .chain(pricing::definitions())
    {
        registry.register(entry);
    }
}
