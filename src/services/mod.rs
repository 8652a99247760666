// mediafocus services
// Services provide page-side media control and settings persistence.

pub mod settings_store;
pub mod site_adapter;
