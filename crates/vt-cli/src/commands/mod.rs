pub mod catalog;
pub mod diagnostic;
pub mod dispatch;
pub mod movement;
pub mod preparation;
pub mod review;
pub mod schema;
pub mod shared;
pub mod validator;
