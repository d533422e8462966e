// Command implementations invoked through the `/api/invoke` proxy

pub mod catalog;
pub mod wizard;
