/// Router Module Index
///
/// Routing is split by access level so the admin guard is applied once, at the layer,
/// instead of being repeated in each handler.

/// Routes accessible to anonymous clients: read-only listings, the contact form and login.
pub mod public;

/// Routes restricted to the admin identity. Wrapped in the `AuthAdmin` middleware.
pub mod admin;
