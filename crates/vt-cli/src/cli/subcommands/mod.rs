mod catalog;
mod diagnostic;
mod movement;
mod preparation;
mod review;
mod validator;

pub use catalog::CatalogCommands;
pub use diagnostic::DiagnosticCommands;
pub use movement::MovementCommands;
pub use preparation::PreparationCommands;
pub use review::ReviewCommands;
pub use validator::ValidatorCommands;
