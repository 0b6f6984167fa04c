pub mod chat;
pub mod game;
pub mod user;

pub use chat::ChatMessage;
pub use game::GameRecord;
pub use user::AuthenticatedUser;
