mod user;

pub use user::{RegistrationMethod, User, UserResponse};
