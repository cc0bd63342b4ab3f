// ============================================================================
// Payment Domain - Business Logic for Payment Aggregate
// ============================================================================
//
// This module contains ALL Payment-specific code:
// - Value objects (Currency, PaymentStatus and its state machine)
// - Events (PaymentInitiated, PaymentLinkGenerated, etc.)
// - Commands (GenerateLink, Succeed, etc.)
// - Errors (PaymentError enum)
// - Aggregate (PaymentAggregate with business logic)
// - Command Handler (PaymentCommandHandler)
//
// This is completely separate from the generic event sourcing infrastructure.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
